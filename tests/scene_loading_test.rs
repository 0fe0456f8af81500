mod common;

use cgmath::{Point3, Vector3};
use common::test_utils::{
    glb, model, pagoda_glb, split_meshes_glb, standard_of, triangle_bin, water,
};
use pagoda_viewer::{
    config::{MODEL, ModelPlacement},
    data_structures::scene_graph::{SceneNode, find_by_name, world_bounds},
    resources::{parse_scene, reflectivity_from_ior},
    viewer::{composer::center_model, patch::patch_scene},
};

fn assert_point_close(actual: Point3<f32>, expected: Point3<f32>) {
    let delta = actual - expected;
    assert!(
        delta.x.abs() < 1e-4 && delta.y.abs() < 1e-4 && delta.z.abs() < 1e-4,
        "{:?} != {:?}",
        actual,
        expected
    );
}

#[test]
fn materials_expose_only_the_properties_their_kind_has() {
    let scene = parse_scene(&pagoda_glb()).expect("valid scene");
    let root = scene.root.as_ref();

    let glass = standard_of(root, "WaterPool");
    assert_eq!(glass.params().reflectivity, Some(reflectivity_from_ior(1.5)));
    assert_eq!(glass.params().transmission, Some(0.8));
    assert_eq!(glass.params().refraction_ratio, None);
    assert!(glass.is_transparent());

    let stone = standard_of(root, "Rock01");
    assert_eq!(stone.params().base_color, [0.5, 0.5, 0.5, 1.0]);
    assert_eq!(stone.params().reflectivity, None);
    assert_eq!(stone.params().transmission, None);

    let paper = standard_of(root, "Lamp");
    assert!(paper.params().unlit);
    assert_eq!(paper.params().reflectivity, Some(1.0));
    assert_eq!(paper.params().refraction_ratio, Some(0.98));
    assert_eq!(paper.params().transmission, None);
}

#[test]
fn primitives_without_material_get_a_default_one() {
    let scene = parse_scene(&pagoda_glb()).expect("valid scene");
    let roof = standard_of(scene.root.as_ref(), "Roof");
    assert_eq!(roof.name, "default");
    assert_eq!(roof.params().reflectivity, None);
}

#[test]
fn loaded_scene_keeps_names_and_transforms() {
    let scene = parse_scene(&pagoda_glb()).expect("valid scene");
    let root = scene.root.as_ref();

    assert_eq!(root.name(), "Pagoda");
    assert_eq!(root.get_children().len(), 4);
    let rock = model(root, "Rock01");
    assert_eq!(rock.get_local_transform().position, Vector3::new(2.0, 0.0, 0.0));
    assert_eq!(rock.primitives[0].geometry.vertices.len(), 3);
    // Normals are computed for geometry that has none
    assert_eq!(rock.primitives[0].geometry.vertices[0].normal, [0.0, 0.0, 1.0]);
}

#[test]
fn every_load_gets_its_own_scene_id() {
    let bytes = pagoda_glb();
    let first = parse_scene(&bytes).expect("valid scene");
    let second = parse_scene(&bytes).expect("valid scene");
    assert_ne!(first.id(), second.id());
}

#[test]
fn patching_a_loaded_scene() {
    let water = water();
    let mut scene = parse_scene(&pagoda_glb()).expect("valid scene");
    let glass = standard_of(scene.root.as_ref(), "WaterPool");

    let report = patch_scene(scene.root.as_mut(), "Water", &water);

    assert_eq!(report.meshes_visited, 4);
    assert_eq!(report.water_meshes, 1);
    // Glass and paper have environment properties, stone and the default do not
    assert_eq!(report.materials_neutralized, 2);
    assert_eq!(glass.params().transmission, Some(0.0));
    assert!(!glass.is_transparent());
    let paper = standard_of(scene.root.as_ref(), "Lamp");
    assert_eq!(paper.params().reflectivity, Some(0.0));
    assert_eq!(paper.params().refraction_ratio, Some(0.0));
}

#[test]
fn invalid_files_are_rejected() {
    assert!(parse_scene(b"definitely not a scene").is_err());
}

#[test]
fn missing_external_buffers_are_reported() {
    let json = r#"{
        "asset": { "version": "2.0" },
        "scenes": [{ "nodes": [] }],
        "buffers": [{ "byteLength": 36, "uri": "pagoda.bin" }]
    }"#;
    let error = match parse_scene(&glb(json, &[])) {
        Ok(_) => panic!("the external buffer was never provided"),
        Err(error) => error,
    };
    assert!(format!("{:#}", error).contains("pagoda.bin"));
}

#[test]
fn truncated_binary_chunk_is_rejected() {
    let json = r#"{
        "asset": { "version": "2.0" },
        "scenes": [{ "nodes": [] }],
        "buffers": [{ "byteLength": 72 }]
    }"#;
    assert!(parse_scene(&glb(json, &triangle_bin())).is_err());
}

#[test]
fn centring_puts_the_bounds_centre_at_the_anchor() {
    let scene = parse_scene(&pagoda_glb()).expect("valid scene");

    let centred = center_model(scene.root, &MODEL);

    let bounds = world_bounds(&centred).expect("scene has vertices");
    assert_point_close(bounds.center(), Point3::from(MODEL.center_at));
    assert!(find_by_name(&centred, "Pagoda").is_some());
}

#[test]
fn centring_applies_the_model_scale() {
    let scene = parse_scene(&pagoda_glb()).expect("valid scene");
    let before = {
        let mut root = scene.root;
        root.update_world_transforms(&Default::default());
        let bounds = world_bounds(root.as_ref()).expect("scene has vertices");
        (bounds.max - bounds.min, root)
    };
    let placement = ModelPlacement {
        scale: 0.5,
        position: [10.0, 0.0, 0.0],
        center_at: [-3.0, 2.0, 1.0],
    };

    let centred = center_model(before.1, &placement);

    let bounds = world_bounds(&centred).expect("scene has vertices");
    let size = bounds.max - bounds.min;
    assert!((size.x - before.0.x * 0.5).abs() < 1e-4);
    assert!((size.y - before.0.y * 0.5).abs() < 1e-4);
    assert_point_close(bounds.center(), Point3::new(-3.0, 2.0, 1.0));
}

#[test]
fn multi_primitive_meshes_are_split_and_named_after_the_mesh() {
    let scene = parse_scene(&split_meshes_glb()).expect("valid scene");
    let root = scene.root.as_ref();

    let pool = find_by_name(root, "Pool").expect("node kept");
    assert!(pool.as_model().is_none());
    let names: Vec<&str> = pool.get_children().iter().map(|child| child.name()).collect();
    assert_eq!(names, ["WaterSurface", "WaterSurface_1"]);
    assert_eq!(pool.get_local_transform().position, Vector3::new(0.0, 2.0, 0.0));
    assert_eq!(model(root, "WaterSurface_1").primitives.len(), 1);

    assert!(find_by_name(root, "WaterPond").is_some_and(|node| node.as_model().is_none()));
    assert!(find_by_name(root, "Plane").is_some());
    assert!(find_by_name(root, "Plane_1").is_some());
}

#[test]
fn water_matching_uses_mesh_names_of_split_meshes() {
    let water = water();
    let mut scene = parse_scene(&split_meshes_glb()).expect("valid scene");

    let report = patch_scene(scene.root.as_mut(), "Water", &water);

    assert_eq!(report.meshes_visited, 4);
    assert_eq!(report.water_meshes, 2);
    let root = scene.root.as_ref();
    for name in ["WaterSurface", "WaterSurface_1"] {
        assert!(model(root, name).materials().all(|m| m.is_water_instance(&water)));
    }
    for name in ["Plane", "Plane_1"] {
        assert!(model(root, name).materials().all(|m| !m.is_water_instance(&water)));
    }
}

#[test]
fn other_physical_extensions_expose_reflectivity_and_transmission() {
    let scene = parse_scene(&split_meshes_glb()).expect("valid scene");
    let root = scene.root.as_ref();

    for name in ["WaterSurface", "WaterSurface_1"] {
        let material = standard_of(root, name);
        assert_eq!(material.params().reflectivity, Some(reflectivity_from_ior(1.5)));
        assert_eq!(material.params().transmission, Some(0.0));
        assert_eq!(material.params().refraction_ratio, None);
    }
    assert_eq!(standard_of(root, "Plane").params().reflectivity, None);
}
