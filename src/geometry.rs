use std::f64::consts::TAU;

use bytemuck::{Pod, Zeroable};
use glam::{DVec3, Vec3};
use thiserror::Error;

/// Step used when estimating surface tangents by finite differences.
const TANGENT_EPSILON: f64 = 1e-5;

/// Control values of the cubic radius curve, from the wide mouth to the tip.
const RADIUS_CONTROLS: [f64; 4] = [70.0, 1.0, 1.0, 1.0];

/// Length of the spiral along its axis.
const SPIRAL_LENGTH: f64 = 15.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("surface needs at least one slice and one stack (got {slices}x{stacks})")]
    EmptyGrid { slices: u32, stacks: u32 },
    #[error("surface grid {slices}x{stacks} exceeds the 32-bit index range")]
    TooLarge { slices: u32, stacks: u32 },
}

/// Cubic blend of four control values.
///
/// The weights are the bare Bernstein monomials without their binomial
/// coefficients, which is what gives the spiral its sharp flare.
pub fn bezier(a: f64, b: f64, c: f64, d: f64, t: f64) -> f64 {
    let one_minus_t = 1.0 - t;
    a * one_minus_t * one_minus_t * one_minus_t
        + b * t * one_minus_t * one_minus_t
        + c * t * t * one_minus_t
        + d * t * t * t
}

/// Radius of the spiral at height `v` in `[0, 1]`.
pub fn spiral_radius(v: f64) -> f64 {
    let [a, b, c, d] = RADIUS_CONTROLS;
    bezier(a, b, c, d, v)
}

/// A surface described by a closed-form function of two parameters.
pub trait ParametricSurface {
    fn evaluate(&self, u: f64, v: f64) -> DVec3;
}

impl<F> ParametricSurface for F
where
    F: Fn(f64, f64) -> DVec3,
{
    fn evaluate(&self, u: f64, v: f64) -> DVec3 {
        self(u, v)
    }
}

/// The flared spiral swept around the z axis.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpiralSurface;

impl ParametricSurface for SpiralSurface {
    fn evaluate(&self, u: f64, v: f64) -> DVec3 {
        let r = spiral_radius(v);
        let angle = u * TAU;
        DVec3::new(angle.sin() * r, angle.cos() * r, (v - 0.5) * SPIRAL_LENGTH)
    }
}

/// Interleaved vertex consumed by the render pipeline.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SurfaceVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Indexed triangle mesh produced from a parametric surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceMesh {
    pub vertices: Vec<SurfaceVertex>,
    pub indices: Vec<u32>,
}

impl SurfaceMesh {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Axis aligned bounds of the mesh positions, `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut positions = self.vertices.iter().map(|v| Vec3::from(v.position));
        let first = positions.next()?;
        Some(positions.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }
}

/// Samples `surface` on a `slices` x `stacks` grid and triangulates it.
///
/// `u` runs along the slices and `v` along the stacks; both span `[0, 1]`
/// inclusive so the seam column is duplicated.
pub fn build_parametric<S>(
    surface: &S,
    slices: u32,
    stacks: u32,
) -> Result<SurfaceMesh, GeometryError>
where
    S: ParametricSurface + ?Sized,
{
    if slices == 0 || stacks == 0 {
        return Err(GeometryError::EmptyGrid { slices, stacks });
    }
    let columns = slices as u64 + 1;
    let rows = stacks as u64 + 1;
    if columns * rows > u32::MAX as u64 {
        return Err(GeometryError::TooLarge { slices, stacks });
    }

    let mut vertices = Vec::with_capacity((columns * rows) as usize);
    for i in 0..=stacks {
        let v = i as f64 / stacks as f64;
        for j in 0..=slices {
            let u = j as f64 / slices as f64;
            let position = surface.evaluate(u, v);
            let normal = surface_normal(surface, u, v, position);
            vertices.push(SurfaceVertex {
                position: position.as_vec3().into(),
                normal: normal.as_vec3().into(),
                uv: [u as f32, v as f32],
            });
        }
    }

    let row_stride = slices + 1;
    let mut indices = Vec::with_capacity(slices as usize * stacks as usize * 6);
    for i in 0..stacks {
        for j in 0..slices {
            let a = i * row_stride + j;
            let b = i * row_stride + j + 1;
            let c = (i + 1) * row_stride + j + 1;
            let d = (i + 1) * row_stride + j;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }

    Ok(SurfaceMesh { vertices, indices })
}

fn surface_normal<S>(surface: &S, u: f64, v: f64, p0: DVec3) -> DVec3
where
    S: ParametricSurface + ?Sized,
{
    let pu = if u - TANGENT_EPSILON >= 0.0 {
        p0 - surface.evaluate(u - TANGENT_EPSILON, v)
    } else {
        surface.evaluate(u + TANGENT_EPSILON, v) - p0
    };
    let pv = if v - TANGENT_EPSILON >= 0.0 {
        p0 - surface.evaluate(u, v - TANGENT_EPSILON)
    } else {
        surface.evaluate(u, v + TANGENT_EPSILON) - p0
    };
    pu.cross(pv).normalize_or_zero()
}
