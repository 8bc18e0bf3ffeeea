//! Classification of mesh nodes into semantic regions.
//!
//! Each node is tested against a fixed cascade, first match wins:
//!
//! 1. DRL mesh filter (exact node name)
//! 2. DRL token (node name substring), only without a DRL rule
//! 3. Region overrides, in list order
//! 4. Wheel: key, token, mesh list or additional materials
//! 5. Glass key
//! 6. Body, interior-primary, interior-secondary keys
//!
//! DRL and wheel sit above the generic keys because some assets reuse material
//! name fragments across unrelated parts.

use crate::catalog::{RegionCatalogEntry, RegionOverride};
use crate::region::SemanticRegion;
use crate::scene::{NodeId, Scene};
use std::collections::BTreeMap;

/// Cascade step that classified a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    DrlMeshFilter,
    DrlToken,
    Override,
    WheelKey,
    WheelToken,
    WheelMeshList,
    WheelMaterialList,
    GlassKey,
    BodyKey,
    InteriorPrimaryKey,
    InteriorSecondaryKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct RegionMatch {
    pub region: SemanticRegion,
    pub rule: MatchRule,
    /// The node must get its own material clone before it is tinted.
    pub isolate: bool,
}

impl RegionMatch {
    fn new(region: SemanticRegion, rule: MatchRule) -> Self {
        Self {
            region,
            rule,
            isolate: false,
        }
    }

    fn isolated(mut self, isolate: bool) -> Self {
        self.isolate = isolate;
        self
    }

    /// Suffix for materials cloned on behalf of this node. Interior nodes
    /// carved out by an override are seats.
    pub fn clone_suffix(&self) -> String {
        match (self.rule, self.region) {
            (MatchRule::Override, SemanticRegion::InteriorPrimary) => "_seat_clone".to_string(),
            (_, region) => region.clone_suffix(),
        }
    }
}

/// Node to region mapping for one pass over a scene.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Resolution {
    matches: BTreeMap<NodeId, RegionMatch>,
}

impl Resolution {
    pub fn get(&self, node: NodeId) -> Option<&RegionMatch> {
        self.matches.get(&node)
    }

    pub fn region_of(&self, node: NodeId) -> Option<SemanticRegion> {
        self.get(node).map(|found| found.region)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &RegionMatch)> {
        self.matches.iter().map(|(node, found)| (*node, found))
    }

    /// Nodes of `region`, in id order.
    pub fn nodes(&self, region: SemanticRegion) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, found)| found.region == region)
            .map(|(node, _)| node)
            .collect()
    }

    pub fn contains_region(&self, region: SemanticRegion) -> bool {
        self.matches.values().any(|found| found.region == region)
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Classify every mesh node of `scene`. Reads only; nodes without a material
/// are skipped.
pub fn resolve(scene: &Scene, entry: &RegionCatalogEntry) -> Resolution {
    let mut matches = BTreeMap::new();
    for id in scene.mesh_nodes() {
        let Some(node) = scene.node(id) else {
            continue;
        };
        if node.material.is_empty() {
            log::trace!("Skipping mesh {:?}: no material", node.name);
            continue;
        }
        let materials = scene.material_names(id);
        match classify(entry, &node.name, &materials) {
            Some(found) => {
                match found.region {
                    SemanticRegion::Glass | SemanticRegion::Drl => log::debug!(
                        "Found {} mesh {:?} (materials {:?}) via {:?}",
                        found.region,
                        node.name,
                        materials,
                        found.rule
                    ),
                    _ => log::debug!(
                        "Mesh {:?} -> {} via {:?}",
                        node.name,
                        found.region,
                        found.rule
                    ),
                }
                matches.insert(id, found);
            }
            None => log::trace!("Mesh {:?} matches no region", node.name),
        }
    }
    Resolution { matches }
}

fn classify(entry: &RegionCatalogEntry, name: &str, materials: &[&str]) -> Option<RegionMatch> {
    let keys = &entry.regions;
    let material_is = |key: &str| materials.iter().any(|material| *material == key);

    match &entry.drl {
        Some(drl) if drl.mesh_filter.iter().any(|mesh| mesh == name) => {
            return Some(RegionMatch::new(SemanticRegion::Drl, MatchRule::DrlMeshFilter));
        }
        None if !keys.drl.is_empty() && name.contains(keys.drl.as_str()) => {
            return Some(RegionMatch::new(SemanticRegion::Drl, MatchRule::DrlToken));
        }
        _ => {}
    }

    if let Some(rule) = entry.overrides.iter().find(|rule| rule.applies_to(name)) {
        return match rule {
            RegionOverride::Isolate { region, .. } => {
                Some(RegionMatch::new(*region, MatchRule::Override).isolated(true))
            }
            RegionOverride::Exclude { .. } => None,
        };
    }

    let wheel_rule = if name == keys.wheel || (entry.is_material_keyed() && material_is(&keys.wheel))
    {
        Some(MatchRule::WheelKey)
    } else if let Some(wheel) = &entry.wheel {
        if !wheel.material_token.is_empty() && name.contains(wheel.material_token.as_str()) {
            Some(MatchRule::WheelToken)
        } else if wheel.mesh_names.iter().any(|mesh| mesh == name) {
            Some(MatchRule::WheelMeshList)
        } else if wheel.additional_materials.iter().any(|extra| material_is(extra)) {
            Some(MatchRule::WheelMaterialList)
        } else {
            None
        }
    } else {
        None
    };
    if let Some(rule) = wheel_rule {
        let isolate = entry.wheel.as_ref().is_some_and(|wheel| wheel.requires_cloning);
        return Some(RegionMatch::new(SemanticRegion::Wheel, rule).isolated(isolate));
    }

    if let Some(glass) = &keys.glass {
        if name == glass || (entry.is_material_keyed() && material_is(glass)) {
            return Some(RegionMatch::new(SemanticRegion::Glass, MatchRule::GlassKey));
        }
    }

    let key_matches = |key: &str| {
        if entry.is_material_keyed() {
            material_is(key)
        } else {
            name == key
        }
    };
    if key_matches(&keys.body) {
        Some(RegionMatch::new(SemanticRegion::Body, MatchRule::BodyKey))
    } else if keys.interior_main.names().into_iter().any(|key| key_matches(key)) {
        Some(RegionMatch::new(
            SemanticRegion::InteriorPrimary,
            MatchRule::InteriorPrimaryKey,
        ))
    } else if key_matches(&keys.interior_secondary) {
        Some(RegionMatch::new(
            SemanticRegion::InteriorSecondary,
            MatchRule::InteriorSecondaryKey,
        ))
    } else {
        None
    }
}
