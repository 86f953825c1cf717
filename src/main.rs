use std::any::Any;
use std::env;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use log::{error, info, warn};
use pollster::block_on;
use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use spiral_sketch::{print_summary, Renderer, Sketch, SketchConfig};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse(env::args().skip(1))?;
    let mut config = match options.config.as_deref() {
        Some(path) => SketchConfig::load(path)?,
        None => SketchConfig::default(),
    };
    if options.seed.is_some() {
        config.seed = options.seed;
    }
    let sketch = Sketch::new(config)?;

    if options.summary_only {
        return run_headless(sketch, options.frames);
    }

    match open_event_loop() {
        Ok(event_loop) => run_interactive(event_loop, sketch, options.frames),
        Err(err) => {
            eprintln!(
                "{err}. Falling back to --summary-only mode (set DISPLAY or install X11 libs to enable rendering)."
            );
            run_headless(sketch, options.frames)
        }
    }
}

fn run_headless(mut sketch: Sketch, frames: u64) -> Result<()> {
    for _ in 0..frames {
        sketch.advance();
    }
    print_summary(&sketch, frames);
    Ok(())
}

fn open_event_loop() -> Result<EventLoop<()>, WindowInitError> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    event_loop
        .map_err(|panic| WindowInitError::from_panic("event loop", panic))?
        .map_err(|err| WindowInitError::from_error("event loop", err))
}

fn run_interactive(event_loop: EventLoop<()>, sketch: Sketch, frames: u64) -> Result<()> {
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut app = SketchApp {
        sketch,
        renderer: None,
        frame_limit: (frames > 0).then_some(frames),
        frames_drawn: 0,
        last_error: None,
    };
    event_loop
        .run_app(&mut app)
        .context("event loop terminated abnormally")?;

    if let Some(err) = app.last_error {
        return Err(err);
    }
    print_summary(&app.sketch, app.frames_drawn);
    Ok(())
}

struct SketchApp {
    sketch: Sketch,
    renderer: Option<Renderer>,
    frame_limit: Option<u64>,
    frames_drawn: u64,
    last_error: Option<anyhow::Error>,
}

#[derive(Debug, Error)]
#[error("failed to initialize {stage}: {message}")]
struct WindowInitError {
    stage: &'static str,
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &'static str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            stage,
            message: panic_message(panic),
        }
    }

    fn from_error(stage: &'static str, err: impl std::fmt::Display) -> Self {
        Self {
            stage,
            message: err.to_string(),
        }
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

impl ApplicationHandler for SketchApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }
        if let Err(err) = self.init_renderer(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Err(err) = self.process_event(event_loop, window_id, event) {
            self.fail(event_loop, err);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(renderer) = self.renderer.as_ref() {
            renderer.window().request_redraw();
        }
    }
}

impl SketchApp {
    fn init_renderer(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let config = self.sketch.config();
        let attributes = Window::default_attributes()
            .with_title("Spiral")
            .with_inner_size(LogicalSize::new(config.width as f64, config.height as f64));
        let window = Arc::new(
            event_loop
                .create_window(attributes)
                .map_err(|err| WindowInitError::from_error("window", err))?,
        );

        let renderer = block_on(Renderer::new(
            Arc::clone(&window),
            self.sketch.mesh(),
            self.sketch.scene(),
        ))?;
        let size = renderer.size();
        self.sketch.resize(size.width, size.height);
        renderer.update_surface(&self.sketch.surface_params());
        info!("Controls: Space toggles playback, R resets the playhead, Escape quits");

        self.renderer = Some(renderer);
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!("{err:?}");
        self.last_error = Some(err);
        event_loop.exit();
    }

    fn process_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) -> Result<()> {
        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(());
        };
        if window_id != renderer.window_id() {
            return Ok(());
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                renderer.resize(size);
                self.sketch.resize(size.width, size.height);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match key {
                KeyCode::Escape => event_loop.exit(),
                KeyCode::Space => {
                    let playing = self.sketch.playhead_mut().toggle();
                    info!("Playback: {}", if playing { "playing" } else { "paused" });
                }
                KeyCode::KeyR => {
                    self.sketch.playhead_mut().reset();
                    info!("Playhead reset");
                }
                _ => {}
            },
            WindowEvent::RedrawRequested => {
                let playhead = self.sketch.advance();
                renderer.update_globals(
                    &self.sketch.camera_params(),
                    &self.sketch.light_params(),
                    playhead,
                );
                match renderer.render() {
                    Ok(()) => self.frames_drawn += 1,
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = renderer.window().inner_size();
                        renderer.resize(size);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        return Err(anyhow!("GPU is out of memory"));
                    }
                    Err(err) => {
                        warn!("Surface error {err:?}; retrying next frame");
                    }
                }
                if self
                    .frame_limit
                    .is_some_and(|limit| self.frames_drawn >= limit)
                {
                    event_loop.exit();
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[derive(Debug, Default, PartialEq)]
struct CliOptions {
    config: Option<String>,
    seed: Option<u64>,
    frames: u64,
    summary_only: bool,
}

const USAGE: &str =
    "Usage: spiral-sketch [--config <sketch.xml>] [--seed <n>] [--frames <n>] [--summary-only]";

impl CliOptions {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut options = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let path = args
                        .next()
                        .ok_or_else(|| anyhow!("--config needs a path. {USAGE}"))?;
                    options.config = Some(path);
                }
                "--seed" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--seed needs a value. {USAGE}"))?;
                    options.seed = Some(
                        value
                            .parse()
                            .with_context(|| format!("invalid seed {value:?}"))?,
                    );
                }
                "--frames" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--frames needs a value. {USAGE}"))?;
                    options.frames = value
                        .parse()
                        .with_context(|| format!("invalid frame count {value:?}"))?;
                }
                "--summary-only" => options.summary_only = true,
                "-h" | "--help" => return Err(anyhow!(USAGE)),
                other => {
                    return Err(anyhow!("Unknown argument: {other}. {USAGE}"));
                }
            }
        }
        Ok(options)
    }
}
