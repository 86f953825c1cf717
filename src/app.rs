use anyhow::{Context, Result};
use glam::{Vec2, Vec3};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::SketchConfig;
use crate::geometry::{build_parametric, SpiralSurface, SurfaceMesh};
use crate::palette::{Palette, PALETTE_SIZE};
use crate::playhead::Playhead;
use crate::render::{CameraParams, LightParams, SurfaceParams};
use crate::scene::Scene;
use crate::shading::{
    fragment_color, palette_slot, row_index, row_random, Material, ROW_COUNT,
};

/// Color node evaluated at one surface point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowSample {
    pub row: u32,
    /// Palette entry the band settles on.
    pub slot: usize,
    /// Linear RGB.
    pub color: Vec3,
    pub roughness: f32,
}

/// State of the running sketch, independent of any window or GPU.
#[derive(Debug, Clone)]
pub struct Sketch {
    config: SketchConfig,
    scene: Scene,
    palette: Palette,
    playhead: Playhead,
    mesh: SurfaceMesh,
}

impl Sketch {
    /// Picks the palette, builds the scene and generates the spiral mesh.
    pub fn new(config: SketchConfig) -> Result<Self> {
        config.validate()?;
        let palette = match (config.palette, config.seed) {
            (Some(palette), _) => palette,
            (None, Some(seed)) => Palette::random(&mut StdRng::seed_from_u64(seed)),
            (None, None) => Palette::random(&mut rand::thread_rng()),
        };
        info!("palette {palette}");

        let mesh = build_parametric(&SpiralSurface, config.slices, config.stacks)
            .context("failed to build spiral mesh")?;
        info!(
            "generated spiral mesh with {} vertices and {} triangles",
            mesh.vertex_count(),
            mesh.triangle_count()
        );

        let mut scene = Scene::from_config(&config);
        scene.camera.set_viewport(config.width, config.height);

        Ok(Self {
            scene,
            palette,
            playhead: Playhead::new(config.speed),
            mesh,
            config,
        })
    }

    pub fn config(&self) -> &SketchConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn playhead(&self) -> &Playhead {
        &self.playhead
    }

    pub fn playhead_mut(&mut self) -> &mut Playhead {
        &mut self.playhead
    }

    pub fn mesh(&self) -> &SurfaceMesh {
        &self.mesh
    }

    /// Keeps the camera aspect in step with the drawable size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.scene.camera.set_viewport(width, height);
    }

    /// Advances the animation by one frame and returns the playhead value.
    pub fn advance(&mut self) -> f32 {
        self.playhead.advance()
    }

    pub fn camera_params(&self) -> CameraParams {
        CameraParams {
            view_proj: self.scene.camera.view_projection(),
            position: self.scene.camera.position,
        }
    }

    pub fn light_params(&self) -> LightParams {
        LightParams {
            sun_direction: self.scene.sun.direction(),
            sun_color: self.scene.sun.color,
            sun_intensity: self.scene.sun.intensity,
            ambient_color: self.scene.ambient.color,
            ambient_intensity: self.scene.ambient.intensity,
            environment: self.scene.environment,
        }
    }

    pub fn surface_params(&self) -> SurfaceParams {
        SurfaceParams {
            model: self.scene.model_matrix(),
            normal: self.scene.normal_matrix(),
            palette: self.palette.linear(),
            metalness: self.scene.material.metalness,
        }
    }

    /// Evaluates the color node at `uv` for the current playhead.
    pub fn row_sample(&self, uv: Vec2) -> RowSample {
        let playhead = self.playhead.value();
        let row = row_index(uv.y, playhead);
        let color = fragment_color(&self.palette, uv, playhead);
        RowSample {
            row: row as u32,
            slot: palette_slot(row_random(row)),
            color,
            roughness: Material::node_roughness(color),
        }
    }

    /// How many of the color bands land on each palette entry.
    ///
    /// This is the CPU reference. The band hash amplifies tiny differences
    /// in `sin`, so a GPU may settle some bands on a neighbouring entry.
    pub fn band_usage(&self) -> [usize; PALETTE_SIZE] {
        let mut usage = [0; PALETTE_SIZE];
        for row in 0..ROW_COUNT as u32 {
            usage[palette_slot(row_random(row as f32))] += 1;
        }
        usage
    }
}

/// Prints the headless summary of a sketch.
pub fn print_summary(sketch: &Sketch, frames: u64) {
    let mesh = sketch.mesh();
    println!(
        "Spiral mesh: {} vertices, {} triangles",
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    if let Some((min, max)) = mesh.bounds() {
        println!(
            "Bounds: min=({:.2}, {:.2}, {:.2}) max=({:.2}, {:.2}, {:.2})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
    }
    println!("Palette: {}", sketch.palette());
    let usage = sketch.band_usage();
    println!(
        "Band usage: {}",
        usage
            .iter()
            .map(|count| count.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    );
    let sample = sketch.row_sample(Vec2::ZERO);
    println!(
        "Row sample: row {} -> #{:06x} color=({:.3}, {:.3}, {:.3}) roughness={:.3}",
        sample.row,
        sketch.palette().srgb()[sample.slot],
        sample.color.x,
        sample.color.y,
        sample.color.z,
        sample.roughness
    );
    println!(
        "Playhead: {:.3} after {frames} frame(s)",
        sketch.playhead().value()
    );
}
