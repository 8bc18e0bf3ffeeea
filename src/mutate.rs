//! Applies region colors to a resolved scene.
//!
//! Only regions the user has colored are written. A material shared by
//! nodes of different regions stays with one owner: regions that were never
//! colored keep their originals, otherwise the first region in node order
//! keeps it. Every other region gets one clone per (material, region) before
//! the first write, so a color change never leaks into another region.
//! Wheels of entries with `requires_cloning` and nodes matched by an
//! isolating override are always cloned. DRL nodes get their material
//! replaced by a glow material.

use crate::catalog::{PaintFinish, RegionCatalogEntry};
use crate::material::{Color, Material, MaterialId, Provenance, GLASS_OPACITY};
use crate::region::{RegionColors, SemanticRegion};
use crate::resolve::{RegionMatch, Resolution};
use crate::scene::{MaterialBinding, NodeId, Scene};
use std::collections::{BTreeSet, HashMap};

/// What one pass changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct MutationReport {
    /// Material writes that changed a value.
    pub writes: usize,
    /// Writes skipped because the material already had the requested state.
    pub skipped: usize,
    pub clones_created: usize,
    /// DRL glow materials installed or rebuilt.
    pub replaced: usize,
}

impl MutationReport {
    pub fn changed(&self) -> bool {
        self.writes + self.clones_created + self.replaced > 0
    }
}

/// Region that keeps each material, in node order. Untouched regions claim
/// first. Among touched regions, DRL nodes and nodes that always isolate do
/// not claim.
fn material_owners(
    scene: &Scene,
    resolution: &Resolution,
    touched: &BTreeSet<SemanticRegion>,
) -> HashMap<MaterialId, SemanticRegion> {
    let mut owners = HashMap::new();
    for painted in [false, true] {
        for (node, found) in resolution.iter() {
            if touched.contains(&found.region) != painted {
                continue;
            }
            if painted && (found.region == SemanticRegion::Drl || found.isolate) {
                continue;
            }
            let Some(node) = scene.node(node) else {
                continue;
            };
            for id in node.material.ids() {
                owners.entry(*id).or_insert(found.region);
            }
        }
    }
    owners
}

/// Write `colors` onto the resolved nodes of the `touched` regions. Nodes of
/// other regions keep their materials.
pub fn apply_colors(
    scene: &mut Scene,
    entry: &RegionCatalogEntry,
    resolution: &Resolution,
    colors: &RegionColors,
    touched: &BTreeSet<SemanticRegion>,
) -> MutationReport {
    let owners = material_owners(scene, resolution, touched);
    let mut report = MutationReport::default();

    for (node, found) in resolution.iter() {
        if !touched.contains(&found.region) {
            continue;
        }
        let color = colors.get(found.region);
        if found.region == SemanticRegion::Drl {
            install_glow(scene, entry, node, color, &mut report);
            continue;
        }
        for id in isolate(scene, node, found, &owners, &mut report) {
            if let Some(material) = scene.material_mut(id) {
                tint(material, found.region, color, entry.paint, &mut report);
            }
        }
    }

    log::debug!(
        "Applied colors: {} writes, {} unchanged, {} clones, {} glow materials",
        report.writes,
        report.skipped,
        report.clones_created,
        report.replaced
    );
    report
}

/// Rebind `node` to region-private clones where needed; returns the
/// materials to tint.
fn isolate(
    scene: &mut Scene,
    node: NodeId,
    found: &RegionMatch,
    owners: &HashMap<MaterialId, SemanticRegion>,
    report: &mut MutationReport,
) -> Vec<MaterialId> {
    let mut targets = match scene.node(node) {
        Some(node) => node.material.ids().to_vec(),
        None => return Vec::new(),
    };

    for slot in targets.iter_mut() {
        let id = *slot;
        let Some(material) = scene.material(id) else {
            continue;
        };
        let claimed_elsewhere = owners.get(&id).is_some_and(|owner| *owner != found.region);
        if material.is_clone_for(found.region) || !(found.isolate || claimed_elsewhere) {
            continue;
        }
        *slot = match scene.find_clone(id, found.region) {
            Some(clone) => clone,
            None => {
                let copy = material.clone_with_suffix(id, found.region, &found.clone_suffix());
                log::debug!("Cloned material {:?} as {:?}", material.name, copy.name);
                report.clones_created += 1;
                scene.add_material(copy)
            }
        };
    }

    if let Some(node) = scene.node_mut(node) {
        node.material
            .ids_mut()
            .iter_mut()
            .zip(&targets)
            .for_each(|(bound, target)| *bound = *target);
    }
    targets
}

fn tint(
    material: &mut Material,
    region: SemanticRegion,
    color: Color,
    paint: Option<PaintFinish>,
    report: &mut MutationReport,
) {
    let Some(params) = material.standard_params_mut() else {
        log::trace!("Material {:?} is not tintable", material.name);
        report.skipped += 1;
        return;
    };

    let mut next = *params;
    next.color = color;
    match region {
        SemanticRegion::Glass => {
            next.transparent = true;
            next.opacity = GLASS_OPACITY;
        }
        SemanticRegion::Body => {
            if let Some(paint) = paint {
                next.metalness = paint.metalness;
                next.roughness = paint.roughness;
                next.clearcoat = paint.clearcoat;
            }
        }
        _ => {}
    }

    if next == *params {
        report.skipped += 1;
    } else {
        *params = next;
        report.writes += 1;
    }
}

/// Give a DRL node a glow material in `color`. The first pass allocates the
/// material; later passes rebuild it in place.
fn install_glow(
    scene: &mut Scene,
    entry: &RegionCatalogEntry,
    node: NodeId,
    color: Color,
    report: &mut MutationReport,
) {
    let render = entry.drl.as_ref().and_then(|drl| drl.render);
    let depth_write = render.map_or(true, |render| render.depth_write);

    let (name, existing) = match scene.node(node) {
        Some(current) => {
            let existing = match current.material {
                MaterialBinding::Single(id) => scene.material(id).and_then(|material| {
                    let synthetic = Provenance::Synthetic {
                        region: SemanticRegion::Drl,
                    };
                    (material.provenance == synthetic).then_some(id)
                }),
                _ => None,
            };
            (format!("{}_drl_glow", current.name), existing)
        }
        None => return,
    };
    let glow = Material::drl_glow(name, color, depth_write);

    match existing {
        Some(id) => {
            if let Some(slot) = scene.material_mut(id) {
                if *slot == glow {
                    report.skipped += 1;
                } else {
                    *slot = glow;
                    report.replaced += 1;
                }
            }
        }
        None => {
            let id = scene.add_material(glow);
            if let Some(current) = scene.node_mut(node) {
                current.material = MaterialBinding::Single(id);
            }
            report.replaced += 1;
        }
    }

    if let Some(render) = render {
        if let Some(current) = scene.node_mut(node) {
            current.render_order = render.render_order;
        }
    }
}
