//! Scene fixtures shared by the unit tests.

use crate::catalog::{NameSet, RegionCatalogEntry, RegionKeys};
use crate::material::{Color, Material, MaterialId};
use crate::scene::{Geometry, MaterialBinding, NodeId, Scene};
use glam::Vec3;
use std::collections::HashMap;

/// Node-keyed entry: body `Body`, wheel `Rim`, DRL token `DRL`, interior
/// `Seat` / `Trim`, no glass, seat isolation override only.
pub fn node_keyed_entry() -> RegionCatalogEntry {
    RegionCatalogEntry::new(
        "test.gltf",
        RegionKeys {
            body: "Body".to_string(),
            wheel: "Rim".to_string(),
            drl: "DRL".to_string(),
            interior_main: NameSet::from("Seat"),
            interior_secondary: "Trim".to_string(),
            glass: None,
        },
    )
}

pub fn unit_cube() -> Geometry {
    Geometry::new(vec![Vec3::splat(-0.5), Vec3::splat(0.5)])
}

/// Builds flat scenes where materials are shared by name.
pub struct SceneBuilder {
    scene: Scene,
    materials: HashMap<String, MaterialId>,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self {
            scene: Scene::new("root"),
            materials: HashMap::new(),
        }
    }

    /// Register `name` with a specific color; later meshes reuse it.
    pub fn material(&mut self, name: &str, color: Color) -> MaterialId {
        let id = self.scene.add_material(Material::standard(name, color));
        self.materials.insert(name.to_string(), id);
        id
    }

    fn material_id(&mut self, name: &str) -> MaterialId {
        match self.materials.get(name) {
            Some(id) => *id,
            None => self.material(name, Color::from_rgb8(0x80, 0x80, 0x80)),
        }
    }

    /// Mesh bound to one material per listed name, created on first use.
    pub fn mesh(&mut self, name: &str, materials: &[&str]) -> NodeId {
        let ids: Vec<MaterialId> = materials
            .iter()
            .map(|material| self.material_id(material))
            .collect();
        let binding = match ids.len() {
            0 => MaterialBinding::None,
            1 => MaterialBinding::Single(ids[0]),
            _ => MaterialBinding::Multi(ids),
        };
        self.mesh_with_binding(name, binding)
    }

    pub fn mesh_with_binding(&mut self, name: &str, binding: MaterialBinding) -> NodeId {
        let root = self.scene.root();
        self.scene.add_mesh(root, name, unit_cube(), binding)
    }

    pub fn group(&mut self, name: &str) -> NodeId {
        let root = self.scene.root();
        self.scene.add_group(root, name)
    }

    pub fn finish(self) -> Scene {
        self.scene
    }
}
