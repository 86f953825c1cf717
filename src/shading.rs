//! CPU mirror of the procedural color node evaluated by the fragment shader.
//!
//! The surface is cut into horizontal bands along `uv.y`. Each band hashes
//! its index into a pseudo random value, and that value picks a palette
//! entry through a ladder of thresholds. Scrolling the playhead shifts which
//! band a fragment falls into.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::palette::{Palette, PALETTE_SIZE};

/// Number of color bands around the surface.
pub const ROW_COUNT: f32 = 57.0;

/// Random value at which each palette entry after the first takes over.
pub const PALETTE_THRESHOLDS: [f32; PALETTE_SIZE - 1] = [0.2, 0.4, 0.6, 0.8];

const HASH_FREQUENCY: f32 = 123.0;
const HASH_AMPLITUDE: f32 = 456_789.123;

/// GLSL/WGSL style fractional part, always in `[0, 1)`.
pub fn fract(x: f32) -> f32 {
    x - x.floor()
}

/// `1.0` when `x >= edge`, `0.0` otherwise.
pub fn step(edge: f32, x: f32) -> f32 {
    if x >= edge {
        1.0
    } else {
        0.0
    }
}

/// Band index for a fragment at `uv_y` with the given playhead.
pub fn row_index(uv_y: f32, playhead: f32) -> f32 {
    (fract(uv_y + playhead) * ROW_COUNT).floor()
}

/// Hash of a band index into `[0, 1)`.
pub fn row_random(row: f32) -> f32 {
    fract((row * HASH_FREQUENCY).sin() * HASH_AMPLITUDE)
}

/// Threshold ladder over linear palette colors.
pub fn palette_mix(colors: &[Vec3; PALETTE_SIZE], random: f32) -> Vec3 {
    colors[1..]
        .iter()
        .zip(PALETTE_THRESHOLDS)
        .fold(colors[0], |color, (next, edge)| mix(color, *next, step(edge, random)))
}

/// Index of the palette entry the threshold ladder settles on.
pub fn palette_slot(random: f32) -> usize {
    PALETTE_THRESHOLDS
        .iter()
        .filter(|&&edge| random >= edge)
        .count()
}

fn mix(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a * (1.0 - t) + b * t
}

/// Color produced for a fragment, in linear RGB.
pub fn fragment_color(palette: &Palette, uv: Vec2, playhead: f32) -> Vec3 {
    let random = row_random(row_index(uv.y, playhead));
    palette_mix(&palette.linear(), random)
}

/// Surface parameters of the physical material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub metalness: f32,
    /// Draw back faces too instead of culling them.
    pub double_sided: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            metalness: 0.2,
            double_sided: true,
        }
    }
}

impl Material {
    /// Roughness driven by the color node: the red channel of the band color.
    /// There is no base roughness; the node always decides.
    pub fn node_roughness(color: Vec3) -> f32 {
        color.x
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> [Vec3; PALETTE_SIZE] {
        [0.0, 1.0, 2.0, 3.0, 4.0].map(Vec3::splat)
    }

    #[test]
    fn fract_wraps_negative_values() {
        assert!((fract(-0.25) - 0.75).abs() < 1e-6);
        assert_eq!(fract(2.0), 0.0);
    }

    #[test]
    fn thresholds_select_palette_entries() {
        let colors = ramp();
        assert_eq!(palette_mix(&colors, 0.0), colors[0]);
        assert_eq!(palette_mix(&colors, 0.19), colors[0]);
        assert_eq!(palette_mix(&colors, 0.2), colors[1]);
        assert_eq!(palette_mix(&colors, 0.5), colors[2]);
        assert_eq!(palette_mix(&colors, 0.79), colors[3]);
        assert_eq!(palette_mix(&colors, 0.99), colors[4]);
    }

    #[test]
    fn slot_agrees_with_mix() {
        let colors = ramp();
        for random in [0.0, 0.2, 0.35, 0.6, 0.81, 0.999] {
            assert_eq!(palette_mix(&colors, random), colors[palette_slot(random)]);
        }
    }

    #[test]
    fn rows_cover_the_band_range() {
        assert_eq!(row_index(0.0, 0.0), 0.0);
        assert_eq!(row_index(0.999, 0.0), 56.0);
        assert_eq!(row_index(0.25, -0.5), 42.0);
        assert_eq!(row_index(1.0, 0.0), 0.0);
    }

    #[test]
    fn row_random_stays_in_unit_range() {
        for row in 0..57 {
            let value = row_random(row as f32);
            assert!((0.0..1.0).contains(&value), "row {row} -> {value}");
        }
        assert_eq!(row_random(0.0), 0.0);
    }

    #[test]
    fn fragments_in_one_band_share_a_color() {
        let palette = Palette::default();
        let a = fragment_color(&palette, Vec2::new(0.1, 0.300), 0.0);
        let b = fragment_color(&palette, Vec2::new(0.9, 0.305), 0.0);
        assert_eq!(a, b);
    }

    #[test]
    fn color_is_always_a_palette_entry() {
        let palette = Palette::default();
        let entries = palette.linear();
        for step_index in 0..200 {
            let y = step_index as f32 / 200.0;
            let color = fragment_color(&palette, Vec2::new(0.0, y), -0.37);
            assert!(entries.contains(&color));
        }
    }

    #[test]
    fn node_roughness_uses_red_channel() {
        assert_eq!(Material::node_roughness(Vec3::new(0.3, 0.9, 0.1)), 0.3);
    }
}
