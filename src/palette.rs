use std::fmt;

use glam::Vec3;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of colors in every palette.
pub const PALETTE_SIZE: usize = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaletteError {
    #[error("a palette needs exactly 5 colors, got {0}")]
    WrongLength(usize),
    #[error("invalid hex color {0:?}")]
    InvalidHex(String),
}

/// Five sRGB colors stored as `0xRRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    colors: [u32; PALETTE_SIZE],
}

impl Palette {
    pub const fn new(colors: [u32; PALETTE_SIZE]) -> Self {
        Self { colors }
    }

    /// Parses five `#rrggbb` (or bare `rrggbb`) strings.
    pub fn from_hex<S: AsRef<str>>(values: &[S]) -> Result<Self, PaletteError> {
        if values.len() != PALETTE_SIZE {
            return Err(PaletteError::WrongLength(values.len()));
        }
        let mut colors = [0u32; PALETTE_SIZE];
        for (slot, value) in colors.iter_mut().zip(values) {
            *slot = parse_hex(value.as_ref())?;
        }
        Ok(Self { colors })
    }

    /// Parses a whitespace or comma separated list of hex colors.
    pub fn parse_list(list: &str) -> Result<Self, PaletteError> {
        let values: Vec<&str> = list
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|part| !part.is_empty())
            .collect();
        Self::from_hex(&values)
    }

    pub fn srgb(&self) -> [u32; PALETTE_SIZE] {
        self.colors
    }

    /// Palette colors converted to linear RGB for shading.
    pub fn linear(&self) -> [Vec3; PALETTE_SIZE] {
        self.colors.map(hex_to_linear)
    }

    /// Picks one palette from the built-in collection.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        *BUILTIN_PALETTES
            .choose(rng)
            .unwrap_or(&BUILTIN_PALETTES[0])
    }
}

impl Default for Palette {
    fn default() -> Self {
        BUILTIN_PALETTES[0]
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, color) in self.colors.iter().enumerate() {
            if index > 0 {
                f.write_str(" ")?;
            }
            write!(f, "#{color:06x}")?;
        }
        Ok(())
    }
}

fn parse_hex(value: &str) -> Result<u32, PaletteError> {
    let digits = value.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(PaletteError::InvalidHex(value.to_string()));
    }
    u32::from_str_radix(digits, 16).map_err(|_| PaletteError::InvalidHex(value.to_string()))
}

/// Converts a single sRGB channel in `[0, 1]` to linear light.
pub fn srgb_to_linear(channel: f32) -> f32 {
    if channel < 0.04045 {
        channel * 0.0773993808
    } else {
        (channel * 0.9478672986 + 0.0521327014).powf(2.4)
    }
}

pub fn hex_to_linear(hex: u32) -> Vec3 {
    let r = ((hex >> 16) & 0xff) as f32 / 255.0;
    let g = ((hex >> 8) & 0xff) as f32 / 255.0;
    let b = (hex & 0xff) as f32 / 255.0;
    Vec3::new(srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b))
}

/// Curated five-color palettes.
pub const BUILTIN_PALETTES: &[Palette] = &[
    Palette::new([0x69d2e7, 0xa7dbd8, 0xe0e4cc, 0xf38630, 0xfa6900]),
    Palette::new([0xfe4365, 0xfc9d9a, 0xf9cdad, 0xc8c8a9, 0x83af9b]),
    Palette::new([0xecd078, 0xd95b43, 0xc02942, 0x542437, 0x53777a]),
    Palette::new([0x556270, 0x4ecdc4, 0xc7f464, 0xff6b6b, 0xc44d58]),
    Palette::new([0x774f38, 0xe08e79, 0xf1d4af, 0xece5ce, 0xc5e0dc]),
    Palette::new([0xe8ddcb, 0xcdb380, 0x036564, 0x033649, 0x031634]),
    Palette::new([0x490a3d, 0xbd1550, 0xe97f02, 0xf8ca00, 0x8a9b0f]),
    Palette::new([0x594f4f, 0x547980, 0x45ada8, 0x9de0ad, 0xe5fcc2]),
    Palette::new([0x00a0b0, 0x6a4a3c, 0xcc333f, 0xeb6841, 0xedc951]),
    Palette::new([0xe94e77, 0xd68189, 0xc6a49a, 0xc6e5d9, 0xf4ead5]),
    Palette::new([0x3fb8af, 0x7fc7af, 0xdad8a7, 0xff9e9d, 0xff3d7f]),
    Palette::new([0xd9ceb2, 0x948c75, 0xd5ded9, 0x7a6a53, 0x99b2b7]),
    Palette::new([0xffffff, 0xcbe86b, 0xf2e9e1, 0x1c140d, 0xcbe86b]),
    Palette::new([0xefffcd, 0xdce9be, 0x555152, 0x2e2633, 0x99173c]),
    Palette::new([0x343838, 0x005f6b, 0x008c9e, 0x00b4cc, 0x00dffc]),
    Palette::new([0x413e4a, 0x73626e, 0xb38184, 0xf0b49e, 0xf7e4be]),
    Palette::new([0xff4e50, 0xfc913a, 0xf9d423, 0xede574, 0xe1f5c4]),
    Palette::new([0x99b898, 0xfecea8, 0xff847c, 0xe84a5f, 0x2a363b]),
    Palette::new([0x655643, 0x80bca3, 0xf6f7bd, 0xe6ac27, 0xbf4d28]),
    Palette::new([0x00a8c6, 0x40c0cb, 0xf9f2e7, 0xaee239, 0x8fbe00]),
];

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn parses_hex_with_and_without_hash() {
        let palette =
            Palette::from_hex(&["#69d2e7", "a7dbd8", "#E0E4CC", "#f38630", "fa6900"]).unwrap();
        assert_eq!(palette, BUILTIN_PALETTES[0]);
    }

    #[test]
    fn parse_list_accepts_commas_and_spaces() {
        let palette = Palette::parse_list("#000000, #ffffff  #ff0000,#00ff00 #0000ff").unwrap();
        assert_eq!(
            palette.srgb(),
            [0x000000, 0xffffff, 0xff0000, 0x00ff00, 0x0000ff]
        );
    }

    #[test]
    fn rejects_wrong_length() {
        assert_eq!(
            Palette::from_hex(&["#000000"; 4]),
            Err(PaletteError::WrongLength(4))
        );
    }

    #[test]
    fn rejects_bad_hex() {
        let err = Palette::from_hex(&["#000000", "#zzzzzz", "#000000", "#000000", "#000000"])
            .unwrap_err();
        assert_eq!(err, PaletteError::InvalidHex("#zzzzzz".into()));
        assert!(Palette::parse_list("#fff #000 #111 #222 #333").is_err());
    }

    #[test]
    fn display_round_trips_through_parse_list() {
        let palette = BUILTIN_PALETTES[3];
        assert_eq!(palette.to_string(), "#556270 #4ecdc4 #c7f464 #ff6b6b #c44d58");
        assert_eq!(Palette::parse_list(&palette.to_string()).unwrap(), palette);
    }

    #[test]
    fn linear_conversion_keeps_extremes() {
        let linear = Palette::new([0x000000, 0xffffff, 0xff0000, 0x808080, 0x0000ff]).linear();
        assert_eq!(linear[0], Vec3::ZERO);
        assert!((linear[1] - Vec3::ONE).abs().max_element() < 1e-5);
        assert!((linear[2] - Vec3::X).abs().max_element() < 1e-5);
        // mid grey is darker in linear light
        assert!((linear[3].x - 0.2158).abs() < 1e-3);
    }

    #[test]
    fn seeded_selection_is_reproducible() {
        let a = Palette::random(&mut StdRng::seed_from_u64(42));
        let b = Palette::random(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
        assert!(BUILTIN_PALETTES.contains(&a));
    }
}
