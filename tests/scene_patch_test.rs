mod common;

use std::rc::Rc;

use common::test_utils::{group, mesh, model, reflective, standard, standard_of, water};
use pagoda_viewer::{
    data_structures::{
        material::{MaterialRef, StandardParams},
        scene_graph::{LoadedScene, SceneNode},
    },
    viewer::patch::{PatchReport, ScenePatcher, patch_scene},
};

fn pool_and_rock() -> Box<dyn SceneNode> {
    Box::new(group(
        "Scene",
        vec![
            Box::new(mesh("WaterPool", Some(reflective("pool").into()))),
            Box::new(mesh("Rock01", Some(reflective("rock").into()))),
        ],
    ))
}

#[test]
fn water_prefix_gets_the_shared_water_material() {
    let water = water();
    let mut root = pool_and_rock();
    let rock = standard_of(root.as_ref(), "Rock01");

    let report = patch_scene(root.as_mut(), "Water", &water);

    assert_eq!(
        report,
        PatchReport {
            meshes_visited: 2,
            materials_neutralized: 2,
            water_meshes: 1,
        }
    );
    let pool = model(root.as_ref(), "WaterPool");
    assert!(pool.materials().all(|m| m.is_water_instance(&water)));

    let params = rock.params();
    assert_eq!(params.reflectivity, Some(0.0));
    assert_eq!(params.refraction_ratio, Some(0.0));
    assert_eq!(params.transmission, Some(0.0));
    // The rock still uses its original material
    assert!(Rc::ptr_eq(&standard_of(root.as_ref(), "Rock01"), &rock));
}

#[test]
fn every_water_mesh_shares_one_material() {
    let water = water();
    let mut root = group(
        "Scene",
        vec![
            Box::new(mesh("Water_Pond", Some(reflective("a").into()))),
            Box::new(group(
                "Garden",
                vec![Box::new(mesh("WaterFall", Some(reflective("b").into())))],
            )),
        ],
    );

    let report = patch_scene(&mut root, "Water", &water);

    assert_eq!(report.water_meshes, 2);
    let pond = model(&root, "Water_Pond").materials().next().cloned();
    let fall = model(&root, "WaterFall").materials().next().cloned();
    match (pond, fall) {
        (Some(pond), Some(fall)) => assert!(pond.same_as(&fall)),
        _ => panic!("water meshes lost their material"),
    }
}

#[test]
fn prefix_is_case_sensitive_and_anchored() {
    let water = water();
    let mut root = group(
        "Scene",
        vec![
            Box::new(mesh("water_lower", Some(reflective("a").into()))),
            Box::new(mesh("PondWater", Some(reflective("b").into()))),
        ],
    );

    let report = patch_scene(&mut root, "Water", &water);

    assert_eq!(report.water_meshes, 0);
    assert_eq!(report.materials_neutralized, 2);
    for name in ["water_lower", "PondWater"] {
        assert!(model(&root, name).materials().all(|m| !m.is_water_instance(&water)));
    }
}

#[test]
fn absent_properties_stay_absent() {
    let water = water();
    let plain = standard("plain", StandardParams::default());
    let mut root = group("Scene", vec![Box::new(mesh("Roof", Some(plain.clone().into())))]);

    let report = patch_scene(&mut root, "Water", &water);

    assert_eq!(report.meshes_visited, 1);
    assert_eq!(report.materials_neutralized, 0);
    let params = plain.params();
    assert_eq!(params.reflectivity, None);
    assert_eq!(params.refraction_ratio, None);
    assert_eq!(params.transmission, None);
}

#[test]
fn shared_materials_are_counted_once() {
    let water = water();
    let shared = reflective("shared");
    let mut root = group(
        "Scene",
        vec![
            Box::new(mesh("Pillar01", Some(shared.clone().into()))),
            Box::new(mesh("Pillar02", Some(shared.clone().into()))),
        ],
    );

    let report = patch_scene(&mut root, "Water", &water);

    assert_eq!(report.meshes_visited, 2);
    assert_eq!(report.materials_neutralized, 1);
}

#[test]
fn meshes_without_material_are_skipped() {
    let water = water();
    let mut root = group(
        "Scene",
        vec![
            Box::new(mesh("WaterGhost", None)),
            Box::new(mesh("Rock01", Some(reflective("rock").into()))),
        ],
    );

    let report = patch_scene(&mut root, "Water", &water);

    assert_eq!(report.meshes_visited, 1);
    assert_eq!(report.water_meshes, 0);
    assert_eq!(model(&root, "WaterGhost").materials().count(), 0);
}

#[test]
fn scene_without_water_is_only_neutralized() {
    let water = water();
    let mut root = group(
        "Scene",
        vec![Box::new(mesh("Rock01", Some(reflective("rock").into())))],
    );

    let report = patch_scene(&mut root, "Water", &water);

    assert_eq!(report.water_meshes, 0);
    assert_eq!(report.materials_neutralized, 1);
}

#[test]
fn patching_is_idempotent() {
    let water = water();
    let mut root = pool_and_rock();
    patch_scene(root.as_mut(), "Water", &water);

    let again = patch_scene(root.as_mut(), "Water", &water);

    assert_eq!(again.water_meshes, 1);
    assert_eq!(again.meshes_visited, 2);
    let rock = standard_of(root.as_ref(), "Rock01");
    assert_eq!(rock.params().reflectivity, Some(0.0));
    assert!(
        model(root.as_ref(), "WaterPool")
            .materials()
            .all(|m| m.is_water_instance(&water))
    );
}

#[test]
fn patcher_runs_once_per_scene() {
    let water = water();
    let mut patcher = ScenePatcher::new("Water");
    let mut first = LoadedScene::new(pool_and_rock());

    assert!(patcher.patch_once(first.id(), first.root.as_mut(), &water).is_some());
    assert!(patcher.patch_once(first.id(), first.root.as_mut(), &water).is_none());

    let mut second = LoadedScene::new(pool_and_rock());
    let report = patcher.patch_once(second.id(), second.root.as_mut(), &water);
    assert_eq!(report.map(|r| r.water_meshes), Some(1));
}

#[test]
fn patcher_repatches_for_a_new_water_material() {
    let first_water = water();
    let second_water = water();
    let mut patcher = ScenePatcher::new("Water");
    let mut scene = LoadedScene::new(pool_and_rock());

    patcher.patch_once(scene.id(), scene.root.as_mut(), &first_water);
    let report = patcher.patch_once(scene.id(), scene.root.as_mut(), &second_water);

    assert!(report.is_some());
    let pool = model(scene.root.as_ref(), "WaterPool");
    assert!(pool.materials().all(|m| m.is_water_instance(&second_water)));
    assert!(!pool.materials().any(|m| m.is_water_instance(&first_water)));
}

#[test]
fn water_material_reference_is_shared_not_copied() {
    let water = water();
    let mut root = pool_and_rock();

    patch_scene(root.as_mut(), "Water", &water);

    let pool = model(root.as_ref(), "WaterPool");
    assert!(matches!(
        pool.materials().next(),
        Some(MaterialRef::Water(shared)) if Rc::ptr_eq(shared, &water)
    ));
}

#[test]
fn only_changed_materials_are_marked_for_upload() {
    let water = water();
    let plain = standard("plain", StandardParams::default());
    let rock = reflective("rock");
    let mut root = group(
        "Scene",
        vec![
            Box::new(mesh("Roof", Some(plain.clone().into()))),
            Box::new(mesh("Rock01", Some(rock.clone().into()))),
        ],
    );
    assert!(!plain.needs_upload());
    assert!(!rock.needs_upload());

    patch_scene(&mut root, "Water", &water);

    assert!(!plain.needs_upload());
    assert!(rock.needs_upload());
}
