pub mod serialization;

use crate::material::{Material, MaterialId, Provenance};
use crate::region::SemanticRegion;
use glam::{Mat4, Quat, Vec3};

/// Stable index of a node inside its scene.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct NodeId(pub usize);

/// Materials a node renders with: nothing, one material, or one per submesh.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum MaterialBinding {
    #[default]
    None,
    Single(MaterialId),
    Multi(Vec<MaterialId>),
}

impl MaterialBinding {
    pub fn ids(&self) -> &[MaterialId] {
        match self {
            MaterialBinding::None => &[],
            MaterialBinding::Single(id) => std::slice::from_ref(id),
            MaterialBinding::Multi(ids) => ids,
        }
    }

    pub fn ids_mut(&mut self) -> &mut [MaterialId] {
        match self {
            MaterialBinding::None => &mut [],
            MaterialBinding::Single(id) => std::slice::from_mut(id),
            MaterialBinding::Multi(ids) => ids,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ids().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self { min: first, max: first }, |bounds, point| Self {
            min: bounds.min.min(point),
            max: bounds.max.max(point),
        }))
    }

    pub fn merge(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

/// Vertex data of a mesh node, in the node's local space.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Geometry {
    pub positions: Vec<Vec3>,
    #[serde(skip)]
    pub bounding_sphere: Option<BoundingSphere>,
}

impl Geometry {
    pub fn new(positions: Vec<Vec3>) -> Self {
        Self {
            positions,
            bounding_sphere: None,
        }
    }

    pub fn local_bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.positions.iter().copied())
    }

    /// Sphere centered on the box center, reaching the farthest vertex.
    pub fn compute_bounding_sphere(&mut self) {
        self.bounding_sphere = self.local_bounds().map(|bounds| {
            let center = bounds.center();
            let radius = self
                .positions
                .iter()
                .map(|position| position.distance_squared(center))
                .fold(0.0_f32, f32::max)
                .sqrt();
            BoundingSphere { center, radius }
        });
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneNode {
    pub id: NodeId,
    pub name: String,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub material: MaterialBinding,
    #[serde(default)]
    pub parent: Option<NodeId>,
    #[serde(default)]
    pub children: Vec<NodeId>,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub render_order: i32,
}

impl SceneNode {
    pub fn is_mesh(&self) -> bool {
        self.geometry.is_some()
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("scene has no root node")]
    MissingRoot,
    #[error("root node must not have a parent")]
    RootHasParent,
    #[error("node at index {index} carries id {id}")]
    MisplacedId { index: usize, id: usize },
    #[error("node {node} references missing node {missing}")]
    DanglingNode { node: usize, missing: usize },
    #[error("node {node} references missing material {missing}")]
    DanglingMaterial { node: usize, missing: usize },
    #[error("node {child} is listed under {listed} but its parent is {actual:?}")]
    ParentMismatch {
        child: usize,
        listed: usize,
        actual: Option<usize>,
    },
    #[error("node {0} is not reachable from the root")]
    Unreachable(usize),
}

/// A loaded asset: a node tree rooted at `NodeId(0)` plus the materials it
/// references. Nodes never own materials, several may share one id.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Scene {
    nodes: Vec<SceneNode>,
    materials: Vec<Material>,
}

impl Scene {
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            nodes: vec![SceneNode {
                id: NodeId(0),
                name: root_name.into(),
                geometry: None,
                material: MaterialBinding::None,
                parent: None,
                children: Vec::new(),
                transform: Transform::IDENTITY,
                render_order: 0,
            }],
            materials: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn add_group(&mut self, parent: NodeId, name: impl Into<String>) -> NodeId {
        self.push_node(parent, name.into(), None, MaterialBinding::None)
    }

    pub fn add_mesh(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        geometry: Geometry,
        material: MaterialBinding,
    ) -> NodeId {
        self.push_node(parent, name.into(), Some(geometry), material)
    }

    fn push_node(
        &mut self,
        parent: NodeId,
        name: String,
        geometry: Option<Geometry>,
        material: MaterialBinding,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode {
            id,
            name,
            geometry,
            material,
            parent: Some(parent),
            children: Vec::new(),
            transform: Transform::IDENTITY,
            render_order: 0,
        });
        if let Some(parent_node) = self.nodes.get_mut(parent.0) {
            parent_node.children.push(id);
        }
        id
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    pub fn material_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(id.0)
    }

    /// Depth-first, parent before children, children in insertion order.
    pub fn traverse(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            if std::mem::replace(&mut visited[id.0], true) {
                continue;
            }
            order.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        order
    }

    pub fn mesh_nodes(&self) -> Vec<NodeId> {
        self.traverse()
            .into_iter()
            .filter(|id| self.nodes[id.0].is_mesh())
            .collect()
    }

    /// Name the asset gave a material. Clones report their source's name so
    /// name-keyed rules keep matching after isolation.
    pub fn authored_name(&self, id: MaterialId) -> Option<&str> {
        let mut material = self.material(id)?;
        for _ in 0..self.materials.len() {
            match material.provenance {
                Provenance::Cloned { source, .. } => match self.material(source) {
                    Some(parent) => material = parent,
                    None => break,
                },
                _ => break,
            }
        }
        Some(material.name.as_str())
    }

    /// Authored names of the materials bound to `id`, in slot order.
    pub fn material_names(&self, id: NodeId) -> Vec<&str> {
        self.node(id)
            .map(|node| {
                node.material
                    .ids()
                    .iter()
                    .filter_map(|material| self.authored_name(*material))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The clone of `source` already made for `region`, if any.
    pub fn find_clone(&self, source: MaterialId, region: SemanticRegion) -> Option<MaterialId> {
        self.materials
            .iter()
            .position(|material| {
                matches!(
                    material.provenance,
                    Provenance::Cloned { source: s, region: r }
                        if s == source && r == region
                )
            })
            .map(MaterialId)
    }

    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = Some(id);
        // Bounded by node count so a malformed parent chain cannot spin forever.
        for _ in 0..self.nodes.len() {
            let Some(node) = current.and_then(|id| self.node(id)) else {
                break;
            };
            matrix = node.transform.to_matrix() * matrix;
            current = node.parent;
        }
        matrix
    }

    /// World-space box around every mesh vertex, `None` without geometry.
    pub fn world_bounds(&self) -> Option<Aabb> {
        let mut merged: Option<Aabb> = None;
        for id in self.mesh_nodes() {
            let Some(geometry) = self.nodes[id.0].geometry.as_ref() else {
                continue;
            };
            let world = self.world_matrix(id);
            let bounds = Aabb::from_points(
                geometry
                    .positions
                    .iter()
                    .map(|position| world.transform_point3(*position)),
            );
            merged = match (merged, bounds) {
                (Some(existing), Some(bounds)) => Some(existing.merge(&bounds)),
                (existing, bounds) => existing.or(bounds),
            };
        }
        merged
    }

    /// Structural checks for scenes that did not come from the builder API.
    pub fn validate(&self) -> Result<(), SceneError> {
        let root = self.nodes.first().ok_or(SceneError::MissingRoot)?;
        if root.parent.is_some() {
            return Err(SceneError::RootHasParent);
        }
        for (index, node) in self.nodes.iter().enumerate() {
            if node.id.0 != index {
                return Err(SceneError::MisplacedId {
                    index,
                    id: node.id.0,
                });
            }
            if let Some(parent) = node.parent {
                if parent.0 >= self.nodes.len() {
                    return Err(SceneError::DanglingNode {
                        node: index,
                        missing: parent.0,
                    });
                }
            }
            for child in &node.children {
                let child_node = self.nodes.get(child.0).ok_or(SceneError::DanglingNode {
                    node: index,
                    missing: child.0,
                })?;
                if child_node.parent != Some(node.id) {
                    return Err(SceneError::ParentMismatch {
                        child: child.0,
                        listed: index,
                        actual: child_node.parent.map(|parent| parent.0),
                    });
                }
            }
            if let Some(missing) = node
                .material
                .ids()
                .iter()
                .find(|material| material.0 >= self.materials.len())
            {
                return Err(SceneError::DanglingMaterial {
                    node: index,
                    missing: missing.0,
                });
            }
        }
        let reached = self.traverse();
        if reached.len() != self.nodes.len() {
            let mut seen = vec![false; self.nodes.len()];
            for id in reached {
                seen[id.0] = true;
            }
            if let Some(index) = seen.iter().position(|seen| !seen) {
                return Err(SceneError::Unreachable(index));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Geometry, MaterialBinding, NodeId, Scene, SceneError};
    use crate::material::{Color, Material};
    use crate::region::SemanticRegion;
    use glam::{Quat, Vec3};

    fn unit_box() -> Geometry {
        Geometry::new(vec![Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 2.0, 1.0)])
    }

    #[test]
    fn traversal_is_depth_first_in_insertion_order() {
        let mut scene = Scene::new("root");
        let body = scene.add_group(scene.root(), "body");
        let wheels = scene.add_group(scene.root(), "wheels");
        let door = scene.add_mesh(body, "door", unit_box(), MaterialBinding::None);
        let rim = scene.add_mesh(wheels, "rim", unit_box(), MaterialBinding::None);
        assert_eq!(
            scene.traverse(),
            vec![NodeId(0), body, door, wheels, rim]
        );
        assert_eq!(scene.mesh_nodes(), vec![door, rim]);
    }

    #[test]
    fn world_bounds_follow_parent_transforms() {
        let mut scene = Scene::new("root");
        let group = scene.add_group(scene.root(), "group");
        scene.add_mesh(group, "mesh", unit_box(), MaterialBinding::None);
        scene.node_mut(group).unwrap().transform.translation = Vec3::new(10.0, 0.0, 0.0);
        scene.node_mut(scene.root()).unwrap().transform.scale = Vec3::splat(2.0);

        let bounds = scene.world_bounds().unwrap();
        assert!((bounds.min - Vec3::new(18.0, 0.0, -2.0)).length() < 1e-4);
        assert!((bounds.max - Vec3::new(22.0, 4.0, 2.0)).length() < 1e-4);
    }

    #[test]
    fn world_bounds_apply_rotation() {
        let mut scene = Scene::new("root");
        scene.add_mesh(
            scene.root(),
            "bar",
            Geometry::new(vec![Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0)]),
            MaterialBinding::None,
        );
        scene.node_mut(scene.root()).unwrap().transform.rotation =
            Quat::from_rotation_y(90_f32.to_radians());
        let size = scene.world_bounds().unwrap().size();
        assert!(size.x.abs() < 1e-4);
        assert!((size.z - 4.0).abs() < 1e-4);
    }

    #[test]
    fn empty_scene_has_no_bounds() {
        let scene = Scene::new("root");
        assert!(scene.world_bounds().is_none());
    }

    #[test]
    fn bounding_sphere_reaches_farthest_vertex() {
        let mut geometry = unit_box();
        geometry.compute_bounding_sphere();
        let sphere = geometry.bounding_sphere.unwrap();
        assert_eq!(sphere.center, Vec3::new(0.0, 1.0, 0.0));
        assert!((sphere.radius - 3_f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn find_clone_matches_source_and_region() {
        let mut scene = Scene::new("root");
        let paint = scene.add_material(Material::standard("paint", Color::WHITE));
        let clone = scene.add_material(
            scene.material(paint).unwrap().clone_for(paint, SemanticRegion::Wheel),
        );
        assert_eq!(scene.find_clone(paint, SemanticRegion::Wheel), Some(clone));
        assert_eq!(scene.find_clone(paint, SemanticRegion::Body), None);
        assert_eq!(scene.find_clone(clone, SemanticRegion::Wheel), None);
    }

    #[test]
    fn clones_report_their_authored_name() {
        let mut scene = Scene::new("root");
        let rim = scene.add_material(Material::standard("Rim", Color::WHITE));
        let clone = scene.add_material(
            scene.material(rim).unwrap().clone_for(rim, SemanticRegion::Wheel),
        );
        let node = scene.add_mesh(
            scene.root(),
            "wheel",
            unit_box(),
            MaterialBinding::Single(clone),
        );
        assert_eq!(scene.material(clone).unwrap().name, "Rim_wheel_clone");
        assert_eq!(scene.authored_name(clone), Some("Rim"));
        assert_eq!(scene.material_names(node), vec!["Rim"]);
    }

    #[test]
    fn validate_rejects_dangling_material() {
        let mut scene = Scene::new("root");
        let paint = scene.add_material(Material::standard("paint", Color::WHITE));
        scene.add_mesh(
            scene.root(),
            "door",
            unit_box(),
            MaterialBinding::Multi(vec![paint, crate::material::MaterialId(9)]),
        );
        assert_eq!(
            scene.validate(),
            Err(SceneError::DanglingMaterial { node: 1, missing: 9 })
        );
    }

    #[test]
    fn builder_scenes_validate() {
        let mut scene = Scene::new("root");
        let group = scene.add_group(scene.root(), "group");
        scene.add_mesh(group, "mesh", unit_box(), MaterialBinding::None);
        assert_eq!(scene.validate(), Ok(()));
    }
}
