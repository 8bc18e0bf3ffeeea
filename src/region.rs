use crate::material::Color;
use std::fmt;

/// Car part categories the configurator lets a user recolor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SemanticRegion {
    Body,
    Wheel,
    Drl,
    InteriorPrimary,
    InteriorSecondary,
    Glass,
}

impl SemanticRegion {
    pub const ALL: [SemanticRegion; 6] = [
        SemanticRegion::Body,
        SemanticRegion::Wheel,
        SemanticRegion::Drl,
        SemanticRegion::InteriorPrimary,
        SemanticRegion::InteriorSecondary,
        SemanticRegion::Glass,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SemanticRegion::Body => "body",
            SemanticRegion::Wheel => "wheel",
            SemanticRegion::Drl => "drl",
            SemanticRegion::InteriorPrimary => "interior_primary",
            SemanticRegion::InteriorSecondary => "interior_secondary",
            SemanticRegion::Glass => "glass",
        }
    }

    /// Name suffix given to materials cloned on behalf of this region.
    pub fn clone_suffix(self) -> String {
        format!("_{}_clone", self.label())
    }

    /// Swatch shown when the asset has no node for this region.
    pub fn fallback_color(self) -> Color {
        match self {
            SemanticRegion::Body => Color::from_rgb8(0xcc, 0xcc, 0xcc),
            SemanticRegion::Wheel => Color::from_rgb8(0x33, 0x33, 0x33),
            SemanticRegion::Drl => Color::WHITE,
            SemanticRegion::InteriorPrimary => Color::BLACK,
            SemanticRegion::InteriorSecondary => Color::from_rgb8(0x33, 0x33, 0x33),
            SemanticRegion::Glass => Color::BLACK,
        }
    }
}

impl fmt::Display for SemanticRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// One selected color per region, as handed over by the UI.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RegionColors {
    pub body: Color,
    pub wheel: Color,
    pub drl: Color,
    pub interior_primary: Color,
    pub interior_secondary: Color,
    pub glass: Color,
}

impl RegionColors {
    pub fn fallbacks() -> Self {
        Self {
            body: SemanticRegion::Body.fallback_color(),
            wheel: SemanticRegion::Wheel.fallback_color(),
            drl: SemanticRegion::Drl.fallback_color(),
            interior_primary: SemanticRegion::InteriorPrimary.fallback_color(),
            interior_secondary: SemanticRegion::InteriorSecondary.fallback_color(),
            glass: SemanticRegion::Glass.fallback_color(),
        }
    }

    pub fn get(&self, region: SemanticRegion) -> Color {
        match region {
            SemanticRegion::Body => self.body,
            SemanticRegion::Wheel => self.wheel,
            SemanticRegion::Drl => self.drl,
            SemanticRegion::InteriorPrimary => self.interior_primary,
            SemanticRegion::InteriorSecondary => self.interior_secondary,
            SemanticRegion::Glass => self.glass,
        }
    }

    pub fn set(&mut self, region: SemanticRegion, color: Color) {
        let slot = match region {
            SemanticRegion::Body => &mut self.body,
            SemanticRegion::Wheel => &mut self.wheel,
            SemanticRegion::Drl => &mut self.drl,
            SemanticRegion::InteriorPrimary => &mut self.interior_primary,
            SemanticRegion::InteriorSecondary => &mut self.interior_secondary,
            SemanticRegion::Glass => &mut self.glass,
        };
        *slot = color;
    }
}

impl Default for RegionColors {
    fn default() -> Self {
        Self::fallbacks()
    }
}
