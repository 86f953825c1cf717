mod native;
mod shared;

pub use native::Renderer;
pub use shared::{CameraParams, LightParams, SurfaceParams};
