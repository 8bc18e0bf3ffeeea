//! Per-vehicle rules describing where each semantic region lives inside an
//! externally authored asset.
//!
//! Assets are authored inconsistently, so entries are free to key on node
//! names or on material names, and to carry asset-specific wheel, DRL and
//! override lists. Optional rules left out mean "use the generic fallback".

mod builtin;
pub mod lint;

pub use lint::Ambiguity;

use crate::material::Color;
use crate::region::SemanticRegion;
use glam::Vec3;
use std::collections::BTreeMap;

/// Node known to share its material with non-seat geometry in every
/// affected asset.
pub const SHARED_SEAT_NODE: &str = "Object_42";

/// A single name or a list of accepted names.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum NameSet {
    One(String),
    Many(Vec<String>),
}

impl NameSet {
    pub fn contains(&self, name: &str) -> bool {
        match self {
            NameSet::One(key) => key == name,
            NameSet::Many(keys) => keys.iter().any(|key| key == name),
        }
    }

    pub fn names(&self) -> Vec<&str> {
        match self {
            NameSet::One(key) => vec![key.as_str()],
            NameSet::Many(keys) => keys.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for NameSet {
    fn from(name: &str) -> Self {
        NameSet::One(name.to_string())
    }
}

impl From<&[&str]> for NameSet {
    fn from(names: &[&str]) -> Self {
        NameSet::Many(names.iter().map(|name| name.to_string()).collect())
    }
}

/// Which name the generic rules compare region keys against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKey {
    #[default]
    NodeName,
    MaterialName,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RegionKeys {
    pub body: String,
    pub wheel: String,
    /// Substring token for DRL nodes when the entry has no DRL rule.
    pub drl: String,
    pub interior_main: NameSet,
    pub interior_secondary: String,
    #[serde(default)]
    pub glass: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WheelRule {
    /// Node names containing this token are wheels.
    pub material_token: String,
    #[serde(default)]
    pub mesh_names: Vec<String>,
    /// Clone wheel materials on first touch instead of tinting the shared one.
    #[serde(default)]
    pub requires_cloning: bool,
    #[serde(default)]
    pub additional_materials: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DrlRenderOptions {
    pub render_order: i32,
    #[serde(default)]
    pub depth_write: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DrlRule {
    pub mesh_filter: Vec<String>,
    /// Authored DRL material, kept for reference when onboarding assets.
    #[serde(default)]
    pub material_name: Option<String>,
    /// Set on assets where the glow z-fights with neighbouring glass.
    #[serde(default)]
    pub render: Option<DrlRenderOptions>,
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PaintFinish {
    pub metalness: f32,
    pub roughness: f32,
    pub clearcoat: f32,
}

/// Asset-specific transform and camera hints.
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Placement {
    pub scale: Option<f32>,
    pub position: Option<Vec3>,
    pub rotation_deg: Option<Vec3>,
    pub camera_position: Option<Vec3>,
}

/// Asset-specific rule evaluated ahead of the wheel, glass and generic rules.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegionOverride {
    /// Nodes resolve to `region` and always get their own material clone.
    Isolate {
        nodes: Vec<String>,
        region: SemanticRegion,
    },
    /// Nodes are withheld from region logic.
    Exclude { nodes: Vec<String> },
}

impl RegionOverride {
    pub fn seat_isolation() -> Self {
        RegionOverride::Isolate {
            nodes: vec![SHARED_SEAT_NODE.to_string()],
            region: SemanticRegion::InteriorPrimary,
        }
    }

    pub fn nodes(&self) -> &[String] {
        match self {
            RegionOverride::Isolate { nodes, .. } | RegionOverride::Exclude { nodes } => nodes,
        }
    }

    pub fn applies_to(&self, node_name: &str) -> bool {
        self.nodes().iter().any(|name| name == node_name)
    }
}

fn default_overrides() -> Vec<RegionOverride> {
    vec![RegionOverride::seat_isolation()]
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RegionCatalogEntry {
    pub model_file: String,
    pub regions: RegionKeys,
    #[serde(default)]
    pub match_by: MatchKey,
    #[serde(default)]
    pub wheel: Option<WheelRule>,
    #[serde(default)]
    pub drl: Option<DrlRule>,
    /// Forced onto glass during the snapshot pass, before first paint.
    #[serde(default)]
    pub initial_glass_color: Option<Color>,
    /// Extra body paint properties, set in place alongside the color.
    #[serde(default)]
    pub paint: Option<PaintFinish>,
    #[serde(default)]
    pub placement: Placement,
    #[serde(default = "default_overrides")]
    pub overrides: Vec<RegionOverride>,
}

impl RegionCatalogEntry {
    pub fn new(model_file: impl Into<String>, regions: RegionKeys) -> Self {
        Self {
            model_file: model_file.into(),
            regions,
            match_by: MatchKey::NodeName,
            wheel: None,
            drl: None,
            initial_glass_color: None,
            paint: None,
            placement: Placement::default(),
            overrides: default_overrides(),
        }
    }

    pub fn is_material_keyed(&self) -> bool {
        self.match_by == MatchKey::MaterialName
    }

    /// Glass color used until the user picks one.
    pub fn default_glass_color(&self) -> Color {
        self.initial_glass_color
            .unwrap_or_else(|| SemanticRegion::Glass.fallback_color())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("default vehicle {0:?} has no catalog entry")]
    MissingDefault(String),
}

/// On-disk layout of a catalog.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CatalogFile {
    pub default: String,
    pub entries: BTreeMap<String, RegionCatalogEntry>,
}

/// Vehicle key to catalog entry. Always holds an entry for its default key,
/// so lookups never fail.
#[derive(Debug, Clone)]
pub struct RegionCatalog {
    entries: BTreeMap<String, RegionCatalogEntry>,
    default_key: String,
}

impl RegionCatalog {
    pub fn new(
        default_key: impl Into<String>,
        entries: BTreeMap<String, RegionCatalogEntry>,
    ) -> Result<Self, CatalogError> {
        let default_key = default_key.into();
        if !entries.contains_key(&default_key) {
            return Err(CatalogError::MissingDefault(default_key));
        }
        Ok(Self {
            entries,
            default_key,
        })
    }

    /// The vehicles shipped with the configurator.
    pub fn builtin() -> Self {
        Self {
            entries: builtin::entries(),
            default_key: builtin::DEFAULT_VEHICLE.to_string(),
        }
    }

    pub fn from_file(file: CatalogFile) -> Result<Self, CatalogError> {
        Self::new(file.default, file.entries)
    }

    pub fn to_file(&self) -> CatalogFile {
        CatalogFile {
            default: self.default_key.clone(),
            entries: self.entries.clone(),
        }
    }

    pub fn vehicle_key(brand: &str, model: &str) -> String {
        format!("{brand}_{model}")
    }

    pub fn default_key(&self) -> &str {
        &self.default_key
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Exact lookup, without the default fallback.
    pub fn entry(&self, key: &str) -> Option<&RegionCatalogEntry> {
        self.entries.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, entry: RegionCatalogEntry) {
        self.entries.insert(key.into(), entry);
    }

    /// Key actually served for `key`: itself when known, the default otherwise.
    pub fn resolve_key<'a>(&'a self, key: &'a str) -> &'a str {
        if self.entries.contains_key(key) {
            key
        } else {
            log::warn!(
                "No catalog entry for vehicle {key:?}, falling back to {:?}",
                self.default_key
            );
            &self.default_key
        }
    }

    pub fn lookup(&self, key: &str) -> &RegionCatalogEntry {
        &self.entries[self.resolve_key(key)]
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CatalogError, MatchKey, NameSet, RegionCatalog, RegionCatalogEntry, RegionKeys,
        RegionOverride,
    };
    use crate::region::SemanticRegion;
    use std::collections::BTreeMap;

    fn keys() -> RegionKeys {
        RegionKeys {
            body: "paint".to_string(),
            wheel: "rim".to_string(),
            drl: "DRL".to_string(),
            interior_main: NameSet::from("seat"),
            interior_secondary: "trim".to_string(),
            glass: None,
        }
    }

    #[test]
    fn unknown_vehicle_falls_back_to_default_entry() {
        let catalog = RegionCatalog::builtin();
        assert_eq!(catalog.resolve_key("Audi_A4"), "BMW_M3");
        assert_eq!(catalog.lookup("Audi_A4"), catalog.entry("BMW_M3").unwrap());
        assert_eq!(catalog.resolve_key("BMW_M8"), "BMW_M8");
    }

    #[test]
    fn vehicle_key_joins_brand_and_model() {
        assert_eq!(RegionCatalog::vehicle_key("BMW", "M3"), "BMW_M3");
    }

    #[test]
    fn catalog_requires_its_default_entry() {
        let mut entries = BTreeMap::new();
        entries.insert("A".to_string(), RegionCatalogEntry::new("a.gltf", keys()));
        assert_eq!(
            RegionCatalog::new("B", entries.clone()).err(),
            Some(CatalogError::MissingDefault("B".to_string()))
        );
        assert!(RegionCatalog::new("A", entries).is_ok());
    }

    #[test]
    fn entries_carry_seat_isolation_by_default() {
        let entry = RegionCatalogEntry::new("a.gltf", keys());
        assert_eq!(entry.overrides, vec![RegionOverride::seat_isolation()]);

        let json = r#"{
            "model_file": "a.gltf",
            "regions": {
                "body": "paint", "wheel": "rim", "drl": "DRL",
                "interior_main": ["leather_a", "leather_b"],
                "interior_secondary": "trim"
            },
            "match_by": "material_name"
        }"#;
        let parsed: RegionCatalogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.overrides, vec![RegionOverride::seat_isolation()]);
        assert_eq!(parsed.match_by, MatchKey::MaterialName);
        assert!(parsed.regions.interior_main.contains("leather_b"));
        assert!(!parsed.regions.interior_main.contains("leather"));
    }

    #[test]
    fn overrides_deserialize_from_tagged_json() {
        let json = r#"[
            { "kind": "isolate", "nodes": ["Object_9"], "region": "wheel" },
            { "kind": "exclude", "nodes": ["Object_1", "Object_2"] }
        ]"#;
        let overrides: Vec<RegionOverride> = serde_json::from_str(json).unwrap();
        assert_eq!(
            overrides[0],
            RegionOverride::Isolate {
                nodes: vec!["Object_9".to_string()],
                region: SemanticRegion::Wheel
            }
        );
        assert!(overrides[1].applies_to("Object_2"));
        assert!(!overrides[1].applies_to("Object_9"));
    }

    #[test]
    fn builtin_catalog_has_every_shipped_vehicle() {
        let catalog = RegionCatalog::builtin();
        for key in [
            "BMW_M2",
            "BMW_M3",
            "BMW_M4",
            "BMW_M8",
            "Mercedes_A45",
            "Mercedes_C63",
            "Nissan_GT-R",
            "Toyota_Supra",
        ] {
            assert!(catalog.contains(key), "missing {key}");
        }
        assert_eq!(catalog.default_key(), "BMW_M3");
    }
}
