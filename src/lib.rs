//! A single-scene sketch: a flared spiral surface shaded by a banded
//! palette ramp that scrolls with a per-frame playhead.
//!
//! Everything except [`render`] is plain data and math so the sketch can be
//! built, animated and inspected without a window or GPU.

pub mod app;
pub mod camera;
pub mod config;
pub mod geometry;
pub mod palette;
pub mod playhead;
pub mod render;
pub mod scene;
pub mod shading;

pub use app::{print_summary, RowSample, Sketch};
pub use camera::PerspectiveCamera;
pub use config::SketchConfig;
pub use geometry::{build_parametric, ParametricSurface, SpiralSurface, SurfaceMesh};
pub use palette::{Palette, PaletteError};
pub use playhead::Playhead;
pub use render::{CameraParams, LightParams, Renderer, SurfaceParams};
pub use scene::Scene;
