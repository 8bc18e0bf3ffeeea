use super::{
    DrlRenderOptions, DrlRule, MatchKey, NameSet, Placement, RegionCatalogEntry, RegionKeys,
    WheelRule,
};
use crate::material::Color;
use glam::Vec3;
use std::collections::BTreeMap;

pub(super) const DEFAULT_VEHICLE: &str = "BMW_M3";

fn regions(
    body: &str,
    wheel: &str,
    drl: &str,
    interior_main: NameSet,
    interior_secondary: &str,
    glass: Option<&str>,
) -> RegionKeys {
    RegionKeys {
        body: body.to_string(),
        wheel: wheel.to_string(),
        drl: drl.to_string(),
        interior_main,
        interior_secondary: interior_secondary.to_string(),
        glass: glass.map(str::to_string),
    }
}

fn placement(
    scale: f32,
    position: Option<Vec3>,
    rotation_deg: Vec3,
    camera_position: Vec3,
) -> Placement {
    Placement {
        scale: Some(scale),
        position,
        rotation_deg: Some(rotation_deg),
        camera_position: Some(camera_position),
    }
}

fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn drl_filter(meshes: &[&str], material: &str, render_order: Option<i32>) -> DrlRule {
    DrlRule {
        mesh_filter: names(meshes),
        material_name: Some(material.to_string()),
        render: render_order.map(|render_order| DrlRenderOptions {
            render_order,
            depth_write: false,
        }),
    }
}

const AMG_LEATHER: &[&str] = &[
    "Meshesleather0081Mtl",
    "Meshesleather0071Mtl",
    "Meshesleather0011Mtl",
    "Meshesleather0031Mtl",
];

/// Shared layout of the two AMG assets, which come from the same source pack.
fn amg(model_file: &str, render_order: Option<i32>, placement: Placement) -> RegionCatalogEntry {
    RegionCatalogEntry {
        match_by: MatchKey::MaterialName,
        wheel: Some(WheelRule {
            material_token: "MesheswheeI0051Mtl".to_string(),
            mesh_names: names(&["Object_105", "Object_106", "Object_107", "Object_108"]),
            requires_cloning: true,
            additional_materials: names(&["MesheswheeI0021Mtl"]),
        }),
        drl: Some(drl_filter(&["Object_83", "Object_80"], "material_7", render_order)),
        initial_glass_color: Some(Color::BLACK),
        placement,
        ..RegionCatalogEntry::new(
            model_file,
            regions(
                "Paint1Mtl",
                "MesheswheeI0051Mtl",
                "Object_83",
                NameSet::from(AMG_LEATHER),
                "Meshesperforation1Mtl",
                Some("material_37"),
            ),
        )
    }
}

pub(super) fn entries() -> BTreeMap<String, RegionCatalogEntry> {
    let front_camera = Vec3::new(0.0, 1.0, 5.0);
    let mut entries = BTreeMap::new();

    entries.insert(
        "BMW_M2".to_string(),
        RegionCatalogEntry {
            placement: placement(100.0, Some(Vec3::ZERO), Vec3::ZERO, front_camera),
            ..RegionCatalogEntry::new(
                "/models/bmw/m2/m2_lci/m2_lci.gltf",
                regions(
                    "bBMW_M2Competition_2018Paint_Material1",
                    "Wheel",
                    "DRL",
                    NameSet::from("InteriorMain"),
                    "InteriorSecondary",
                    None,
                ),
            )
        },
    );

    entries.insert(
        "BMW_M3".to_string(),
        RegionCatalogEntry::new(
            "/models/bmw/m3/m3_f80/m3_f80.gltf",
            regions(
                "ARm4_body_ARm4_main_0",
                "ARm4_common_black",
                "ARm4_runninglight",
                NameSet::from("ARm4_buckedseat_R_ARm4_color_interior_0"),
                "ARm4_buckedseat_R_ARm4_INTER_tcz_0",
                None,
            ),
        ),
    );

    entries.insert(
        "BMW_M4".to_string(),
        RegionCatalogEntry {
            placement: placement(1.0, Some(Vec3::ZERO), Vec3::ZERO, front_camera),
            ..RegionCatalogEntry::new(
                "/models/bmw/4series/m4/m4_f82/m4_f82.gltf",
                regions(
                    "ARm4_body_ARm4_main_0",
                    "ARm4_vt_wheel",
                    "ARm4_runninglight",
                    NameSet::from("ARm4_buckedseat_R_ARm4_color_interior_0"),
                    "ARm4_buckedseat_R_ARm4_INTER_tcz_0",
                    None,
                ),
            )
        },
    );

    entries.insert(
        "BMW_M8".to_string(),
        RegionCatalogEntry {
            match_by: MatchKey::MaterialName,
            initial_glass_color: Some(Color::BLACK),
            placement: placement(1.0, Some(Vec3::ZERO), Vec3::ZERO, front_camera),
            ..RegionCatalogEntry::new(
                "/models/bmw/8series/m8/m8_f92/m8_f92.gltf",
                regions(
                    "m8f92_CarPaint",
                    "m8f92_SpecularTintA",
                    "m8f92_runninglight3",
                    NameSet::from(&["m8f92_InteriorColourZone", "m8f92_InteriorColor2"][..]),
                    "m8f92_InteriorTillingColourZone",
                    Some("m8f92_glass"),
                ),
            )
        },
    );

    // Both AMG assets center themselves, so they carry no fixed position.
    entries.insert(
        "Mercedes_A45".to_string(),
        amg(
            "/models/mercedes/a-class/a45_amg/a45_amg.gltf",
            None,
            placement(0.2, None, Vec3::ZERO, front_camera),
        ),
    );
    entries.insert(
        "Mercedes_C63".to_string(),
        amg(
            "/models/mercedes/c-class/c63/c63_amg/c63_amg.gltf",
            Some(2),
            placement(
                0.24,
                None,
                Vec3::new(0.0, 180.0, 0.0),
                Vec3::new(0.0, 1.5, 5.0),
            ),
        ),
    );

    entries.insert(
        "Nissan_GT-R".to_string(),
        RegionCatalogEntry {
            drl: Some(drl_filter(&["Object_5"], "material_11", None)),
            initial_glass_color: Some(Color::BLACK),
            placement: placement(0.01, Some(Vec3::ZERO), Vec3::ZERO, front_camera),
            ..RegionCatalogEntry::new(
                "/models/nissan/gt-r/r35/nismo/gt-r_r35_nismo.gltf",
                regions(
                    "Object_23",
                    "Object_64",
                    "Object_5",
                    NameSet::from("material"),
                    "Object_4",
                    Some("Object_10"),
                ),
            )
        },
    );

    entries.insert(
        "Toyota_Supra".to_string(),
        RegionCatalogEntry {
            match_by: MatchKey::MaterialName,
            drl: Some(drl_filter(&["Object_60"], "headlight", Some(2))),
            initial_glass_color: Some(Color::BLACK),
            placement: placement(
                1.4,
                Some(Vec3::ZERO),
                Vec3::ZERO,
                Vec3::new(0.0, 0.5, 3.0),
            ),
            ..RegionCatalogEntry::new(
                "/models/toyota/Supra/gr_supra/gr_supra.gltf",
                regions(
                    "body.012",
                    "glossy_black.003",
                    "headlight",
                    NameSet::from("glossy_black.003"),
                    "grillg",
                    Some("Glass.013"),
                ),
            )
        },
    );

    entries
}
