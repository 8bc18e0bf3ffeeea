//! Detection of catalog entries whose rules overlap.
//!
//! The resolver settles overlaps by cascade order, but an entry that depends
//! on that order usually hides a misconfigured key, so onboarding tooling
//! reports them.

use super::RegionCatalogEntry;
use crate::region::SemanticRegion;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ambiguity {
    /// The same key is configured for several regions; the earliest cascade
    /// step wins.
    SharedKey {
        key: String,
        regions: Vec<SemanticRegion>,
    },
    /// Without a DRL rule every node whose name contains the DRL token is a
    /// DRL, including nodes named after another region's key.
    DrlTokenInKey {
        token: String,
        region: SemanticRegion,
        key: String,
    },
    /// A mesh listed both as wheel and as DRL resolves as DRL.
    WheelMeshIsDrl { mesh: String },
}

impl fmt::Display for Ambiguity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ambiguity::SharedKey { key, regions } => {
                let labels: Vec<&str> = regions.iter().map(|region| region.label()).collect();
                write!(f, "key {key:?} is shared by {}", labels.join(", "))
            }
            Ambiguity::DrlTokenInKey { token, region, key } => {
                write!(f, "DRL token {token:?} is contained in {region} key {key:?}")
            }
            Ambiguity::WheelMeshIsDrl { mesh } => {
                write!(f, "mesh {mesh:?} is listed as both wheel and DRL")
            }
        }
    }
}

impl RegionCatalogEntry {
    fn region_keys(&self) -> Vec<(SemanticRegion, &str)> {
        let regions = &self.regions;
        let mut keys = vec![
            (SemanticRegion::Body, regions.body.as_str()),
            (SemanticRegion::Wheel, regions.wheel.as_str()),
        ];
        keys.extend(
            regions
                .interior_main
                .names()
                .into_iter()
                .map(|name| (SemanticRegion::InteriorPrimary, name)),
        );
        keys.push((
            SemanticRegion::InteriorSecondary,
            regions.interior_secondary.as_str(),
        ));
        if let Some(glass) = &regions.glass {
            keys.push((SemanticRegion::Glass, glass.as_str()));
        }
        keys
    }

    /// Rules of this entry that can match the same node.
    pub fn ambiguities(&self) -> Vec<Ambiguity> {
        let mut findings = Vec::new();

        let mut by_key: BTreeMap<&str, Vec<SemanticRegion>> = BTreeMap::new();
        for (region, key) in self.region_keys() {
            let regions = by_key.entry(key).or_default();
            if !regions.contains(&region) {
                regions.push(region);
            }
        }
        for (key, regions) in by_key {
            if regions.len() > 1 {
                findings.push(Ambiguity::SharedKey {
                    key: key.to_string(),
                    regions,
                });
            }
        }

        let token = self.regions.drl.as_str();
        if self.drl.is_none() && !token.is_empty() {
            for (region, key) in self.region_keys() {
                if key.contains(token) {
                    findings.push(Ambiguity::DrlTokenInKey {
                        token: token.to_string(),
                        region,
                        key: key.to_string(),
                    });
                }
            }
        }

        if let (Some(drl), Some(wheel)) = (&self.drl, &self.wheel) {
            for mesh in &wheel.mesh_names {
                if drl.mesh_filter.contains(mesh) {
                    findings.push(Ambiguity::WheelMeshIsDrl { mesh: mesh.clone() });
                }
            }
        }

        findings
    }
}
