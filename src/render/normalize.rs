//! Per-asset placement: scale, rotation, grounding and camera fit.

use super::camera::{fit_distance, CameraPlacement};
use crate::catalog::Placement;
use crate::material::Side;
use crate::scene::{Aabb, Scene, Transform};
use glam::{EulerRot, Quat, Vec3};

/// Camera distance used when the scene has no measurable extent.
pub const FALLBACK_CAMERA_DISTANCE: f32 = 3.0;

/// Result of fitting a loaded model into view.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Framing {
    /// Root transform after normalization.
    pub root: Transform,
    /// World bounds measured with the root translation zeroed.
    pub bounds: Option<Aabb>,
    pub camera: CameraPlacement,
}

/// Compute bounding spheres and force front-face rendering on every mesh.
pub fn prepare_meshes(scene: &mut Scene) {
    let mut materials = Vec::new();
    for id in scene.mesh_nodes() {
        let Some(node) = scene.node_mut(id) else {
            continue;
        };
        if let Some(geometry) = node.geometry.as_mut() {
            geometry.compute_bounding_sphere();
        }
        materials.extend_from_slice(node.material.ids());
    }
    for id in materials {
        if let Some(params) = scene
            .material_mut(id)
            .and_then(|material| material.standard_params_mut())
        {
            params.side = Side::Front;
        }
    }
}

/// Euler angles in degrees, applied X then Y then Z.
pub fn rotation_from_degrees(degrees: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::XYZ,
        degrees.x.to_radians(),
        degrees.y.to_radians(),
        degrees.z.to_radians(),
    )
}

/// Apply `placement` to the scene root and compute the camera framing.
///
/// Without a configured position the model is centered horizontally and
/// its lowest point rests on `y = 0`.
pub fn normalize(scene: &mut Scene, placement: &Placement, fov_deg: f32, fit_margin: f32) -> Framing {
    prepare_meshes(scene);

    let root = scene.root();
    let mut transform = scene
        .node(root)
        .map(|node| node.transform)
        .unwrap_or_default();
    if let Some(scale) = placement.scale {
        transform.scale = Vec3::splat(scale);
    }
    if let Some(degrees) = placement.rotation_deg {
        transform.rotation = rotation_from_degrees(degrees);
    }
    transform.translation = Vec3::ZERO;
    set_root_transform(scene, transform);

    let bounds = scene.world_bounds();
    transform.translation = match (placement.position, bounds) {
        (Some(position), _) => position,
        (None, Some(bounds)) => {
            let center = bounds.center();
            Vec3::new(-center.x, -bounds.min.y, -center.z)
        }
        (None, None) => Vec3::ZERO,
    };
    set_root_transform(scene, transform);

    let size = bounds.map(|bounds| bounds.size()).unwrap_or(Vec3::ZERO);
    let look_at = Vec3::new(0.0, size.y / 4.0, 0.0);
    let camera = match placement.camera_position {
        Some(position) => CameraPlacement { position, look_at },
        None => CameraPlacement::diagonal(
            fit_distance(size.max_element(), fov_deg, fit_margin, FALLBACK_CAMERA_DISTANCE),
            look_at,
        ),
    };

    log::info!(
        "Normalized model: scale {:.3}, translation {:?}, camera at {:?}",
        transform.scale.x,
        transform.translation,
        camera.position
    );
    if bounds.is_none() {
        log::warn!("Model has no geometry, using default camera distance");
    }

    Framing {
        root: transform,
        bounds,
        camera,
    }
}

fn set_root_transform(scene: &mut Scene, transform: Transform) {
    let root = scene.root();
    if let Some(node) = scene.node_mut(root) {
        node.transform = transform;
    }
}
