use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Perspective camera looking down -Z from a fixed position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self {
            fov: 35.0,
            aspect: 1.0,
            near: 0.01,
            far: 100.0,
            position: Vec3::new(0.0, -1.0, 20.0),
        }
    }
}

impl PerspectiveCamera {
    /// Updates the aspect ratio for a viewport, treating zero sizes as one pixel.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_translation(-self.position)
    }

    /// Projection into wgpu clip space (depth in `[0, 1]`).
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
