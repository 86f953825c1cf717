use glam::{Mat3, Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::camera::PerspectiveCamera;
use crate::config::SketchConfig;
use crate::palette::srgb_to_linear;
use crate::shading::Material;

/// Light evenly added to every surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbientLight {
    pub color: Vec3,
    pub intensity: f32,
}

/// Light arriving from a fixed direction, as if from infinitely far away.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    /// Position of the light; it shines from here towards the origin.
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl DirectionalLight {
    /// Unit vector pointing from the surface towards the light.
    pub fn direction(&self) -> Vec3 {
        self.position.try_normalize().unwrap_or(Vec3::Z)
    }
}

/// Everything drawn in the single sketch scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub camera: PerspectiveCamera,
    /// Euler angles of the spiral in radians, applied in XYZ order.
    pub mesh_rotation: Vec3,
    pub material: Material,
    pub ambient: AmbientLight,
    pub sun: DirectionalLight,
    /// Strength of the neutral room reflection around the mesh.
    pub environment: f32,
    /// Linear clear color.
    pub clear_color: Vec3,
}

impl Default for Scene {
    fn default() -> Self {
        Self::from_config(&SketchConfig::default())
    }
}

impl Scene {
    pub fn from_config(config: &SketchConfig) -> Self {
        Self {
            camera: PerspectiveCamera {
                fov: config.fov,
                position: config.camera_position,
                ..PerspectiveCamera::default()
            },
            mesh_rotation: config.mesh_rotation,
            material: Material {
                metalness: config.metalness,
                double_sided: true,
            },
            ambient: AmbientLight {
                color: Vec3::ONE,
                intensity: 0.5,
            },
            sun: DirectionalLight {
                position: Vec3::new(0.5, 0.0, 0.866),
                color: Vec3::ONE,
                intensity: 0.5,
            },
            environment: config.environment,
            clear_color: Vec3::new(
                srgb_to_linear(config.clear_color.x),
                srgb_to_linear(config.clear_color.y),
                srgb_to_linear(config.clear_color.z),
            ),
        }
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_x(self.mesh_rotation.x)
            * Mat4::from_rotation_y(self.mesh_rotation.y)
            * Mat4::from_rotation_z(self.mesh_rotation.z)
    }

    /// Inverse transpose of the model matrix, for transforming normals.
    pub fn normal_matrix(&self) -> Mat3 {
        Mat3::from_mat4(self.model_matrix()).inverse().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scene_matches_sketch_layout() {
        let scene = Scene::default();
        assert_eq!(scene.camera.fov, 35.0);
        assert_eq!(scene.camera.position, Vec3::new(0.0, -1.0, 20.0));
        assert_eq!(scene.mesh_rotation, Vec3::new(-1.0, -0.5, 0.0));
        assert!((scene.clear_color - Vec3::ONE).abs().max_element() < 1e-5);
        assert_eq!(scene.material.metalness, 0.2);
    }

    #[test]
    fn rotation_applies_x_then_y_as_intrinsic_euler() {
        let scene = Scene {
            mesh_rotation: Vec3::new(std::f32::consts::FRAC_PI_2, std::f32::consts::FRAC_PI_2, 0.0),
            ..Scene::default()
        };
        // Rx * Ry maps +X to Rx(-Z) = +Y.
        let mapped = scene.model_matrix().transform_vector3(Vec3::X);
        assert!((mapped - Vec3::Y).length() < 1e-5, "{mapped:?}");
    }

    #[test]
    fn normal_matrix_of_rotation_is_the_rotation() {
        let scene = Scene::default();
        let rotation = Mat3::from_mat4(scene.model_matrix());
        let normal = scene.normal_matrix();
        for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
            assert!((rotation * axis - normal * axis).length() < 1e-5);
        }
    }

    #[test]
    fn sun_direction_is_normalized() {
        let scene = Scene::default();
        assert!((scene.sun.direction().length() - 1.0).abs() < 1e-6);
    }
}
