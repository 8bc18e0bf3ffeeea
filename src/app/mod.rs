//! Configurator lifecycle: vehicle load, color selection, reset and
//! per-frame motion.

mod timing;

pub use timing::{AutoRotate, FrameClock};

use crate::catalog::{RegionCatalog, RegionCatalogEntry};
use crate::material::Color;
use crate::mutate::{apply_colors, MutationReport};
use crate::region::{RegionColors, SemanticRegion};
use crate::render::{normalize, CameraFlyIn, CameraPlacement, Framing};
use crate::resolve::{resolve, Resolution};
use crate::scene::Scene;
use crate::snapshot::AppearanceSnapshot;
use glam::Quat;
use std::collections::BTreeSet;
use std::time::Instant;

/// How far back the fly-in starts, as a multiple of the framed distance.
const FLY_IN_PULL_BACK: f32 = 2.5;

/// Viewer options read from a settings file. Missing fields keep their
/// defaults.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    /// Vertical field of view used to fit the camera.
    pub camera_fov_deg: f32,
    pub fit_margin: f32,
    pub auto_rotate_deg_per_sec: Option<f32>,
    pub fly_in_secs: Option<f32>,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            camera_fov_deg: 50.0,
            fit_margin: 1.2,
            auto_rotate_deg_per_sec: None,
            fly_in_secs: None,
        }
    }
}

/// One loaded vehicle: its scene plus everything derived from it.
///
/// Dropped wholesale when another vehicle is selected.
pub struct ConfiguratorSession {
    vehicle: String,
    entry: RegionCatalogEntry,
    scene: Scene,
    resolution: Resolution,
    snapshot: AppearanceSnapshot,
    framing: Framing,
    colors: RegionColors,
    touched: BTreeSet<SemanticRegion>,
    clock: FrameClock,
    base_rotation: Quat,
    auto_rotate: Option<AutoRotate>,
    fly_in: Option<CameraFlyIn>,
    camera: CameraPlacement,
}

impl ConfiguratorSession {
    /// Resolve, snapshot and normalize a freshly loaded scene, in that order.
    /// Colors start at the snapshot's reset values; nothing is painted yet.
    pub fn load(
        vehicle: impl Into<String>,
        entry: RegionCatalogEntry,
        mut scene: Scene,
        settings: &ViewerSettings,
    ) -> Self {
        let vehicle = vehicle.into();
        for finding in entry.ambiguities() {
            log::warn!("Catalog entry {vehicle}: {finding}");
        }

        let resolution = resolve(&scene, &entry);
        let snapshot = AppearanceSnapshot::capture(&mut scene, &entry, &resolution);
        let framing = normalize(
            &mut scene,
            &entry.placement,
            settings.camera_fov_deg,
            settings.fit_margin,
        );
        let colors = snapshot.reset_colors(&entry);

        let fly_in = settings
            .fly_in_secs
            .map(|secs| CameraFlyIn::new(framing.camera, FLY_IN_PULL_BACK, secs));
        let camera = fly_in.map_or(framing.camera, |fly_in| fly_in.current());

        log::info!(
            "Loaded {vehicle}: {} of {} meshes resolved",
            resolution.len(),
            scene.mesh_nodes().len()
        );
        for region in SemanticRegion::ALL {
            if !resolution.contains_region(region) {
                log::debug!("{vehicle} has no {region} nodes");
            }
        }

        Self {
            vehicle,
            entry,
            scene,
            resolution,
            snapshot,
            base_rotation: framing.root.rotation,
            framing,
            colors,
            touched: BTreeSet::new(),
            clock: FrameClock::new(),
            auto_rotate: settings.auto_rotate_deg_per_sec.map(AutoRotate::new),
            fly_in,
            camera,
        }
    }

    pub fn vehicle(&self) -> &str {
        &self.vehicle
    }

    pub fn entry(&self) -> &RegionCatalogEntry {
        &self.entry
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn into_scene(self) -> Scene {
        self.scene
    }

    /// Mapping from the most recent resolver pass.
    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    pub fn snapshot(&self) -> &AppearanceSnapshot {
        &self.snapshot
    }

    pub fn framing(&self) -> &Framing {
        &self.framing
    }

    pub fn colors(&self) -> &RegionColors {
        &self.colors
    }

    pub fn camera(&self) -> CameraPlacement {
        self.camera
    }

    /// Regions the user has colored since load or the last reset.
    pub fn touched(&self) -> &BTreeSet<SemanticRegion> {
        &self.touched
    }

    /// Choose a color for `region` without painting yet.
    pub fn select(&mut self, region: SemanticRegion, color: Color) {
        self.colors.set(region, color);
        self.touched.insert(region);
    }

    pub fn set_color(&mut self, region: SemanticRegion, color: Color) -> MutationReport {
        self.select(region, color);
        self.apply()
    }

    /// Replace the whole selection. Only regions whose color differs from
    /// the current selection count as colored.
    pub fn set_colors(&mut self, colors: RegionColors) -> MutationReport {
        for region in SemanticRegion::ALL {
            if colors.get(region) != self.colors.get(region) {
                self.touched.insert(region);
            }
        }
        self.colors = colors;
        self.apply()
    }

    /// Re-resolve and write the selection of every colored region onto the
    /// scene.
    pub fn apply(&mut self) -> MutationReport {
        self.resolution = resolve(&self.scene, &self.entry);
        apply_colors(
            &mut self.scene,
            &self.entry,
            &self.resolution,
            &self.colors,
            &self.touched,
        )
    }

    /// Restore the baseline captured at load on every colored region.
    pub fn reset(&mut self) -> MutationReport {
        log::info!("Resetting {} to its original colors", self.vehicle);
        self.colors = self.snapshot.reset_colors(&self.entry);
        let report = self.apply();
        self.touched.clear();
        report
    }

    /// Advance frame-driven motion by `dt` seconds and return the camera.
    pub fn tick(&mut self, dt: f32) -> CameraPlacement {
        if let Some(spin) = self.auto_rotate.as_mut() {
            let rotation = spin.advance(dt) * self.base_rotation;
            let root = self.scene.root();
            if let Some(node) = self.scene.node_mut(root) {
                node.transform.rotation = rotation;
            }
        }
        if let Some(fly_in) = self.fly_in.as_mut() {
            self.camera = fly_in.advance(dt);
            if fly_in.is_finished() {
                log::debug!("Camera fly-in finished for {}", self.vehicle);
                self.fly_in = None;
            }
        }
        self.camera
    }

    /// Advance frame-driven motion to the frame presented at `now`.
    pub fn tick_at(&mut self, now: Instant) -> CameraPlacement {
        let dt = self.clock.update(now);
        self.tick(dt)
    }

    pub fn frame_clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn is_flying_in(&self) -> bool {
        self.fly_in.is_some()
    }
}

/// Owns the catalog and at most one active vehicle session.
pub struct Configurator {
    catalog: RegionCatalog,
    settings: ViewerSettings,
    session: Option<ConfiguratorSession>,
}

impl Configurator {
    pub fn new(catalog: RegionCatalog, settings: ViewerSettings) -> Self {
        Self {
            catalog,
            settings,
            session: None,
        }
    }

    pub fn catalog(&self) -> &RegionCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &ViewerSettings {
        &self.settings
    }

    pub fn session(&self) -> Option<&ConfiguratorSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut ConfiguratorSession> {
        self.session.as_mut()
    }

    /// Replace the active session with `scene` configured for `key`.
    /// Unknown keys use the catalog's default entry.
    pub fn load_vehicle(&mut self, key: &str, scene: Scene) -> &mut ConfiguratorSession {
        if let Some(previous) = self.session.take() {
            log::info!("Unloading {}", previous.vehicle());
        }
        let vehicle = self.catalog.resolve_key(key).to_string();
        let entry = self.catalog.lookup(&vehicle).clone();
        self.session
            .insert(ConfiguratorSession::load(vehicle, entry, scene, &self.settings))
    }

    pub fn unload(&mut self) -> Option<Scene> {
        self.session.take().map(ConfiguratorSession::into_scene)
    }
}
