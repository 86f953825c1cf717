use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use glam::Vec3;
use roxmltree::{Document, Node};
use serde::{Deserialize, Serialize};

use crate::palette::Palette;

/// Tunable values of the sketch. Defaults reproduce the stock spiral.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchConfig {
    /// Seed for palette selection; a fresh random palette when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Fixed palette, bypassing random selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub palette: Option<Palette>,
    pub slices: u32,
    pub stacks: u32,
    /// Playhead change per frame.
    pub speed: f32,
    /// Clear color as sRGB in `[0, 1]`.
    pub clear_color: Vec3,
    pub fov: f32,
    pub camera_position: Vec3,
    pub mesh_rotation: Vec3,
    pub environment: f32,
    pub metalness: f32,
    pub width: u32,
    pub height: u32,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            seed: None,
            palette: None,
            slices: 325,
            stacks: 325,
            speed: 0.001,
            clear_color: Vec3::ONE,
            fov: 35.0,
            camera_position: Vec3::new(0.0, -1.0, 20.0),
            mesh_rotation: Vec3::new(-1.0, -0.5, 0.0),
            environment: 1.0,
            metalness: 0.2,
            width: 1280,
            height: 720,
        }
    }
}

impl SketchConfig {
    /// Reads and parses an XML config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let xml = fs::read_to_string(path)
            .with_context(|| format!("unable to read config {}", path.display()))?;
        Self::from_xml(&xml).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Parses a `<sketch>` document; every element is optional.
    pub fn from_xml(xml: &str) -> Result<Self> {
        let document = Document::parse(xml).context("invalid config XML")?;
        let root = document.root_element();
        if !root.has_tag_name("sketch") {
            return Err(anyhow!(
                "expected <sketch> root element, found <{}>",
                root.tag_name().name()
            ));
        }

        let defaults = Self::default();
        let (slices, stacks) = parse_segments(optional_text(&root, "segments"))?
            .unwrap_or((defaults.slices, defaults.stacks));

        let config = Self {
            seed: optional_text(&root, "seed")
                .map(|seed| seed.parse::<u64>())
                .transpose()
                .map_err(|err| anyhow!("failed to parse seed: {err}"))?,
            palette: optional_text(&root, "palette")
                .map(|list| Palette::parse_list(&list))
                .transpose()?,
            slices,
            stacks,
            speed: parse_f32(optional_text(&root, "speed"), defaults.speed)?,
            clear_color: parse_color(optional_text(&root, "clear"), defaults.clear_color)?,
            fov: parse_f32(optional_text(&root, "fov"), defaults.fov)?,
            camera_position: parse_vec3(optional_text(&root, "camera"), defaults.camera_position)?,
            mesh_rotation: parse_vec3(optional_text(&root, "rotation"), defaults.mesh_rotation)?,
            environment: parse_f32(optional_text(&root, "environment"), defaults.environment)?,
            metalness: parse_f32(optional_text(&root, "metalness"), defaults.metalness)?,
            width: parse_u32(optional_text(&root, "width"), defaults.width)?,
            height: parse_u32(optional_text(&root, "height"), defaults.height)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.slices == 0 || self.stacks == 0 {
            return Err(anyhow!(
                "segments must be positive, got {}x{}",
                self.slices,
                self.stacks
            ));
        }
        if !self.speed.is_finite() {
            return Err(anyhow!("speed must be a finite number, got {}", self.speed));
        }
        if !(self.fov.is_finite() && self.fov > 0.0 && self.fov < 180.0) {
            return Err(anyhow!("fov must be between 0 and 180 degrees, got {}", self.fov));
        }
        if !(self.environment.is_finite() && self.environment >= 0.0) {
            return Err(anyhow!(
                "environment must be a non-negative number, got {}",
                self.environment
            ));
        }
        if !(0.0..=1.0).contains(&self.metalness) {
            return Err(anyhow!("metalness must be in [0, 1], got {}", self.metalness));
        }
        Ok(())
    }
}

fn optional_text(node: &Node<'_, '_>, tag: &str) -> Option<String> {
    node.children()
        .find(|child| child.has_tag_name(tag))
        .and_then(|child| child.text())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
}

fn parse_components(value: &str, expected: usize, what: &str) -> Result<Vec<f32>> {
    let numbers = value
        .split_whitespace()
        .map(|component| {
            component
                .parse::<f32>()
                .map_err(|err| anyhow!("invalid {what} component {component:?}: {err}"))
        })
        .collect::<Result<Vec<_>>>()?;
    if numbers.len() != expected {
        return Err(anyhow!(
            "{what} needs {expected} components, got {}",
            numbers.len()
        ));
    }
    Ok(numbers)
}

fn parse_vec3(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let numbers = parse_components(&value, 3, "vector")?;
    Ok(Vec3::new(numbers[0], numbers[1], numbers[2]))
}

fn parse_color(value: Option<String>, default: Vec3) -> Result<Vec3> {
    let Some(value) = value else {
        return Ok(default);
    };
    let numbers = parse_components(&value, 3, "color")?;
    Ok(Vec3::new(numbers[0], numbers[1], numbers[2]).clamp(Vec3::ZERO, Vec3::splat(255.0)) / 255.0)
}

fn parse_segments(value: Option<String>) -> Result<Option<(u32, u32)>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let mut parts = value.split_whitespace().map(|part| {
        part.parse::<u32>()
            .map_err(|err| anyhow!("invalid segment count {part:?}: {err}"))
    });
    let slices = parts
        .next()
        .ok_or_else(|| anyhow!("segments are missing"))??;
    let stacks = parts.next().transpose()?.unwrap_or(slices);
    if parts.next().is_some() {
        return Err(anyhow!("segments take at most two values"));
    }
    Ok(Some((slices, stacks)))
}

fn parse_f32(value: Option<String>, default: f32) -> Result<f32> {
    match value {
        Some(value) => value
            .parse::<f32>()
            .map_err(|err| anyhow!("failed to parse float: {err}")),
        None => Ok(default),
    }
}

fn parse_u32(value: Option<String>, default: u32) -> Result<u32> {
    match value {
        Some(value) => value
            .parse::<u32>()
            .map_err(|err| anyhow!("failed to parse integer: {err}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    const SAMPLE: &str = r#"
    <sketch>
        <seed>7</seed>
        <palette>#000000 #111111 #222222 #333333 #444444</palette>
        <segments>64 32</segments>
        <speed>-0.002</speed>
        <clear>0 0 255</clear>
        <fov>50</fov>
        <camera>0 0 30</camera>
        <rotation>0 0 1.5</rotation>
    </sketch>
    "#;

    #[test]
    fn parses_every_field() {
        let config = SketchConfig::from_xml(SAMPLE).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.palette.unwrap().srgb()[4], 0x444444);
        assert_eq!((config.slices, config.stacks), (64, 32));
        assert_eq!(config.speed, -0.002);
        assert_eq!(config.clear_color, Vec3::Z);
        assert_eq!(config.fov, 50.0);
        assert_eq!(config.camera_position, Vec3::new(0.0, 0.0, 30.0));
        assert_eq!(config.mesh_rotation, Vec3::new(0.0, 0.0, 1.5));
        assert_eq!(config.metalness, 0.2);
    }

    #[test]
    fn empty_document_keeps_defaults() {
        let config = SketchConfig::from_xml("<sketch/>").unwrap();
        assert_eq!(config, SketchConfig::default());
    }

    #[test]
    fn single_segment_value_is_square() {
        let config = SketchConfig::from_xml("<sketch><segments>10</segments></sketch>").unwrap();
        assert_eq!((config.slices, config.stacks), (10, 10));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(SketchConfig::from_xml("<scene/>").is_err());
        assert!(SketchConfig::from_xml("<sketch><segments>0 4</segments></sketch>").is_err());
        assert!(SketchConfig::from_xml("<sketch><camera>1 2</camera></sketch>").is_err());
        assert!(SketchConfig::from_xml("<sketch><palette>#fff</palette></sketch>").is_err());
        assert!(SketchConfig::from_xml("<sketch><fov>0</fov></sketch>").is_err());
        assert!(SketchConfig::from_xml("<sketch><seed>-1</seed></sketch>").is_err());
    }

    #[test]
    fn rejects_non_finite_numbers() {
        for xml in [
            "<sketch><speed>NaN</speed></sketch>",
            "<sketch><speed>inf</speed></sketch>",
            "<sketch><fov>NaN</fov></sketch>",
            "<sketch><environment>inf</environment></sketch>",
            "<sketch><environment>-0.5</environment></sketch>",
        ] {
            assert!(SketchConfig::from_xml(xml).is_err(), "{xml} was accepted");
        }
        let err = SketchConfig::from_xml("<sketch><speed>NaN</speed></sketch>").unwrap_err();
        assert!(err.to_string().contains("speed must be a finite number"));
        assert!(SketchConfig::from_xml("<sketch><environment>0</environment></sketch>").is_ok());
    }

    #[test]
    fn loads_from_disk() {
        let mut file = NamedTempFile::new().expect("temp config");
        file.write_all(b"<sketch><speed>0.01</speed></sketch>")
            .expect("write config");
        let config = SketchConfig::load(file.path()).unwrap();
        assert_eq!(config.speed, 0.01);
        assert!(SketchConfig::load(file.path().with_extension("missing")).is_err());
    }
}
