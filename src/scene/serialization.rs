use crate::app::ViewerSettings;
use crate::catalog::{CatalogError, CatalogFile, RegionCatalog};
use crate::scene::{Scene, SceneError};
use serde::de::DeserializeOwned;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid scene: {0}")]
    Scene(#[from] SceneError),
    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),
}

pub type Result<T> = std::result::Result<T, SerializationError>;

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

pub fn save_scene_to_file(scene: &Scene, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(scene)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Scene files come from outside the builder API, so they are checked for
/// dangling node and material references before use.
pub fn load_scene_from_file(path: &Path) -> Result<Scene> {
    let scene: Scene = read_json(path)?;
    scene.validate()?;
    log::debug!(
        "Loaded scene {} ({} nodes, {} materials)",
        path.display(),
        scene.nodes().len(),
        scene.materials().len()
    );
    Ok(scene)
}

pub fn save_catalog_to_file(catalog: &RegionCatalog, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&catalog.to_file())?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_catalog_from_file(path: &Path) -> Result<RegionCatalog> {
    let file: CatalogFile = read_json(path)?;
    let catalog = RegionCatalog::from_file(file)?;
    log::info!(
        "Loaded catalog {} with {} vehicles",
        path.display(),
        catalog.len()
    );
    Ok(catalog)
}

pub fn load_settings_from_file(path: &Path) -> Result<ViewerSettings> {
    read_json(path)
}

#[cfg(test)]
mod tests {
    use super::{
        load_catalog_from_file, load_scene_from_file, load_settings_from_file,
        save_catalog_to_file, save_scene_to_file, SerializationError,
    };
    use crate::catalog::RegionCatalog;
    use crate::material::{Color, Material, MaterialId};
    use crate::scene::{Geometry, MaterialBinding, Scene, SceneError};
    use glam::Vec3;

    fn sample_scene() -> Scene {
        let mut scene = Scene::new("Sketchfab_model");
        let paint = scene.add_material(Material::standard("Paint1Mtl", Color::from_rgb8(200, 0, 0)));
        let rim = scene.add_material(Material::standard("MesheswheeI0051Mtl", Color::WHITE));
        let body = scene.add_group(scene.root(), "Body");
        scene.add_mesh(
            body,
            "Object_12",
            Geometry::new(vec![Vec3::ZERO, Vec3::new(4.0, 1.3, 1.8)]),
            MaterialBinding::Single(paint),
        );
        scene.add_mesh(
            body,
            "Object_105",
            Geometry::new(vec![Vec3::ZERO, Vec3::ONE]),
            MaterialBinding::Multi(vec![rim, paint]),
        );
        scene
    }

    #[test]
    fn scene_survives_a_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        let scene = sample_scene();

        save_scene_to_file(&scene, &path).unwrap();
        let loaded = load_scene_from_file(&path).unwrap();
        assert_eq!(loaded, scene);
    }

    #[test]
    fn dangling_material_is_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        let mut scene = sample_scene();
        let node = scene.mesh_nodes()[0];
        scene.node_mut(node).unwrap().material = MaterialBinding::Single(MaterialId(42));
        save_scene_to_file(&scene, &path).unwrap();

        match load_scene_from_file(&path) {
            Err(SerializationError::Scene(SceneError::DanglingMaterial { missing, .. })) => {
                assert_eq!(missing, 42)
            }
            other => panic!("Expected dangling material error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_json_reports_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.json");
        std::fs::write(&path, "{ \"nodes\": [").unwrap();
        assert!(matches!(
            load_scene_from_file(&path),
            Err(SerializationError::Json(_))
        ));
    }

    #[test]
    fn missing_file_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_scene_from_file(&dir.path().join("nope.json")),
            Err(SerializationError::Io(_))
        ));
    }

    #[test]
    fn builtin_catalog_round_trips_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let catalog = RegionCatalog::builtin();

        save_catalog_to_file(&catalog, &path).unwrap();
        let loaded = load_catalog_from_file(&path).unwrap();
        assert_eq!(loaded.len(), catalog.len());
        assert_eq!(loaded.default_key(), catalog.default_key());
        for key in catalog.keys() {
            assert_eq!(loaded.entry(key), catalog.entry(key), "entry {key}");
        }
    }

    #[test]
    fn catalog_without_its_default_entry_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, r#"{ "default": "BMW_M3", "entries": {} }"#).unwrap();
        assert!(matches!(
            load_catalog_from_file(&path),
            Err(SerializationError::Catalog(_))
        ));
    }

    #[test]
    fn settings_fill_missing_fields_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "camera_fov_deg": 35.0 }"#).unwrap();
        let settings = load_settings_from_file(&path).unwrap();
        assert_eq!(settings.camera_fov_deg, 35.0);
        assert_eq!(settings.fit_margin, 1.2);
        assert!(settings.auto_rotate_deg_per_sec.is_none());
    }
}
