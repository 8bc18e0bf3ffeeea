//! Baseline colors captured right after a vehicle loads, before the first
//! user-driven paint.

use crate::catalog::RegionCatalogEntry;
use crate::material::Color;
use crate::region::{RegionColors, SemanticRegion};
use crate::resolve::Resolution;
use crate::scene::Scene;

#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize)]
pub struct AppearanceSnapshot {
    body: Option<Color>,
    wheel: Option<Color>,
    drl: Option<Color>,
    interior_primary: Option<Color>,
    interior_secondary: Option<Color>,
    glass: Option<Color>,
}

impl AppearanceSnapshot {
    /// Record the authored color of every region that resolved.
    ///
    /// The last node of a region in traversal order decides, reading its
    /// first material. DRL lamps are usually dark when unlit, so a resolved
    /// DRL always records white. When the entry forces an initial glass color
    /// it is written onto every glass material here and recorded as the
    /// baseline.
    pub fn capture(scene: &mut Scene, entry: &RegionCatalogEntry, resolution: &Resolution) -> Self {
        let order = scene.traverse();
        let mut snapshot = Self::default();

        for region in SemanticRegion::ALL {
            let last = order
                .iter()
                .filter(|node| resolution.region_of(**node) == Some(region))
                .filter_map(|node| {
                    let material = *scene.node(*node)?.material.ids().first()?;
                    scene.material(material).map(|material| material.color())
                })
                .last();
            *snapshot.slot(region) = match region {
                SemanticRegion::Drl => last.map(|_| Color::WHITE),
                _ => last,
            };
        }

        if let Some(glass) = entry.initial_glass_color {
            let glass_nodes = resolution.nodes(SemanticRegion::Glass);
            if !glass_nodes.is_empty() {
                for node in glass_nodes {
                    let ids = match scene.node(node) {
                        Some(node) => node.material.ids().to_vec(),
                        None => continue,
                    };
                    for id in ids {
                        if let Some(params) = scene
                            .material_mut(id)
                            .and_then(|material| material.standard_params_mut())
                        {
                            params.color = glass;
                        }
                    }
                }
                log::debug!("Forced initial glass color {glass}");
                snapshot.glass = Some(glass);
            }
        }

        log::info!(
            "Captured baseline colors for {} of {} regions",
            SemanticRegion::ALL
                .iter()
                .filter(|region| snapshot.get(**region).is_some())
                .count(),
            SemanticRegion::ALL.len()
        );
        snapshot
    }

    fn slot(&mut self, region: SemanticRegion) -> &mut Option<Color> {
        match region {
            SemanticRegion::Body => &mut self.body,
            SemanticRegion::Wheel => &mut self.wheel,
            SemanticRegion::Drl => &mut self.drl,
            SemanticRegion::InteriorPrimary => &mut self.interior_primary,
            SemanticRegion::InteriorSecondary => &mut self.interior_secondary,
            SemanticRegion::Glass => &mut self.glass,
        }
    }

    /// Baseline color of `region`, `None` when nothing resolved to it.
    pub fn get(&self, region: SemanticRegion) -> Option<Color> {
        match region {
            SemanticRegion::Body => self.body,
            SemanticRegion::Wheel => self.wheel,
            SemanticRegion::Drl => self.drl,
            SemanticRegion::InteriorPrimary => self.interior_primary,
            SemanticRegion::InteriorSecondary => self.interior_secondary,
            SemanticRegion::Glass => self.glass,
        }
    }

    /// Colors a reset applies: the baseline where one was captured, the
    /// region fallback otherwise. Glass falls back to the entry's default.
    pub fn reset_colors(&self, entry: &RegionCatalogEntry) -> RegionColors {
        let mut colors = RegionColors::fallbacks();
        colors.glass = entry.default_glass_color();
        for region in SemanticRegion::ALL {
            if let Some(color) = self.get(region) {
                colors.set(region, color);
            }
        }
        colors
    }
}
