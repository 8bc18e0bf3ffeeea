//! Materials referenced by scene nodes.
//!
//! A material is either a `Standard` surface that regions tint in place, or an
//! `Emissive` glow material that replaces a DRL node's surface wholesale.

use crate::region::SemanticRegion;
use std::fmt;
use std::str::FromStr;

/// Opacity forced onto glass surfaces.
pub const GLASS_OPACITY: f32 = 0.7;
/// Multiplier applied to the DRL base color before it reaches the glow shader.
pub const DRL_COLOR_BOOST: f32 = 1.5;
/// Strength of the white fresnel rim on DRL surfaces.
pub const DRL_GLOW_INTENSITY: f32 = 0.5;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ColorError {
    #[error("expected 6 hex digits, got {0:?}")]
    Length(String),
    #[error("invalid hex digits in {0:?}")]
    Digits(String),
}

/// 24-bit RGB color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Parse `#rrggbb` (the leading `#` is optional, digits are case-insensitive).
    pub fn from_hex(value: &str) -> Result<Self, ColorError> {
        let digits = value.trim().trim_start_matches('#');
        if digits.len() != 6 {
            return Err(ColorError::Length(value.to_string()));
        }
        if !digits.bytes().all(|byte| byte.is_ascii_hexdigit()) {
            return Err(ColorError::Digits(value.to_string()));
        }
        let packed =
            u32::from_str_radix(digits, 16).map_err(|_| ColorError::Digits(value.to_string()))?;
        Ok(Self::from_rgb8(
            ((packed >> 16) & 0xFF) as u8,
            ((packed >> 8) & 0xFF) as u8,
            (packed & 0xFF) as u8,
        ))
    }

    pub fn to_rgb8(&self) -> [u8; 3] {
        let quantize = |channel: f32| (channel.clamp(0.0, 1.0) * 255.0).round() as u8;
        [quantize(self.r), quantize(self.g), quantize(self.b)]
    }

    /// Lowercase `#rrggbb`; channels above 1.0 saturate.
    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::from_hex(value)
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Index of a material in the scene's material arena.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct MaterialId(pub usize);

/// Where a material came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum Provenance {
    /// Authored in the asset.
    #[default]
    Original,
    /// Duplicated from `source` so `region` can be colored in isolation.
    Cloned {
        source: MaterialId,
        region: SemanticRegion,
    },
    /// Built by the configurator, never present in the asset.
    Synthetic { region: SemanticRegion },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum Side {
    #[default]
    Front,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Blending {
    Normal,
    Additive,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StandardParams {
    pub color: Color,
    #[serde(default)]
    pub metalness: f32,
    #[serde(default = "default_roughness")]
    pub roughness: f32,
    #[serde(default)]
    pub clearcoat: f32,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default)]
    pub transparent: bool,
    #[serde(default)]
    pub side: Side,
}

fn default_roughness() -> f32 {
    1.0
}

fn default_opacity() -> f32 {
    1.0
}

impl StandardParams {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            metalness: 0.0,
            roughness: default_roughness(),
            clearcoat: 0.0,
            opacity: default_opacity(),
            transparent: false,
            side: Side::Front,
        }
    }
}

/// Parameters of the fresnel rim-lit glow used for daytime running lights.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EmissiveParams {
    pub base_color: Color,
    pub color_boost: f32,
    pub glow_intensity: f32,
    pub blending: Blending,
    pub depth_write: bool,
}

impl EmissiveParams {
    pub fn drl(color: Color, depth_write: bool) -> Self {
        Self {
            base_color: color,
            color_boost: DRL_COLOR_BOOST,
            glow_intensity: DRL_GLOW_INTENSITY,
            blending: Blending::Additive,
            depth_write,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Shading {
    Standard(StandardParams),
    Emissive(EmissiveParams),
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Material {
    pub name: String,
    #[serde(default)]
    pub provenance: Provenance,
    pub shading: Shading,
}

impl Material {
    pub fn standard(name: impl Into<String>, color: Color) -> Self {
        Self {
            name: name.into(),
            provenance: Provenance::Original,
            shading: Shading::Standard(StandardParams::new(color)),
        }
    }

    pub fn drl_glow(name: impl Into<String>, color: Color, depth_write: bool) -> Self {
        Self {
            name: name.into(),
            provenance: Provenance::Synthetic {
                region: SemanticRegion::Drl,
            },
            shading: Shading::Emissive(EmissiveParams::drl(color, depth_write)),
        }
    }

    /// Deep copy renamed with the region's clone suffix.
    pub fn clone_for(&self, source: MaterialId, region: SemanticRegion) -> Self {
        self.clone_with_suffix(source, region, &region.clone_suffix())
    }

    pub fn clone_with_suffix(
        &self,
        source: MaterialId,
        region: SemanticRegion,
        suffix: &str,
    ) -> Self {
        Self {
            name: format!("{}{suffix}", self.name),
            provenance: Provenance::Cloned { source, region },
            shading: self.shading,
        }
    }

    /// Visible base color, for either shading model.
    pub fn color(&self) -> Color {
        match &self.shading {
            Shading::Standard(params) => params.color,
            Shading::Emissive(params) => params.base_color,
        }
    }

    pub fn standard_params(&self) -> Option<&StandardParams> {
        match &self.shading {
            Shading::Standard(params) => Some(params),
            Shading::Emissive(_) => None,
        }
    }

    pub fn standard_params_mut(&mut self) -> Option<&mut StandardParams> {
        match &mut self.shading {
            Shading::Standard(params) => Some(params),
            Shading::Emissive(_) => None,
        }
    }

    pub fn is_clone_for(&self, region: SemanticRegion) -> bool {
        matches!(self.provenance, Provenance::Cloned { region: r, .. } if r == region)
    }
}
