//! Material fixes applied to every freshly loaded scene.

use std::{collections::HashSet, rc::Rc};

use crate::data_structures::{
    material::{MaterialRef, StandardMaterial, WaterMaterial},
    scene_graph::{SceneId, SceneNode, visit_meshes_mut},
};

/// What one patch pass changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatchReport {
    /// Meshes with at least one material.
    pub meshes_visited: usize,
    /// Distinct standard materials that had an environment property.
    pub materials_neutralized: usize,
    /// Meshes now shaded with the water material.
    pub water_meshes: usize,
}

/**
 * Zeroes reflectivity, refraction ratio and transmission of all materials
 * that have them and gives every mesh whose name starts with `prefix` the
 * shared water material.
 *
 * Meshes without a material are skipped. Geometry and hierarchy stay as
 * they are.
 */
pub fn patch_scene(root: &mut dyn SceneNode, prefix: &str, water: &Rc<WaterMaterial>) -> PatchReport {
    let mut neutralized: HashSet<*const StandardMaterial> = HashSet::new();
    let mut water_meshes = 0;
    let meshes_visited = visit_meshes_mut(
        root,
        |mesh| mesh.has_material(),
        |mesh| {
            for material in mesh.materials().filter_map(MaterialRef::as_standard) {
                if material.neutralize_environment() {
                    neutralized.insert(Rc::as_ptr(material));
                }
            }
            if mesh.name().starts_with(prefix) {
                mesh.replace_material(MaterialRef::Water(water.clone()));
                water_meshes += 1;
            }
        },
    );
    PatchReport {
        meshes_visited,
        materials_neutralized: neutralized.len(),
        water_meshes,
    }
}

/// Runs [`patch_scene`] once per pair of loaded scene and water material.
#[derive(Debug)]
pub struct ScenePatcher {
    prefix: String,
    last: Option<(SceneId, Rc<WaterMaterial>)>,
}

impl ScenePatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            last: None,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// `None` if this scene was already patched with this water material.
    pub fn patch_once(
        &mut self,
        scene: SceneId,
        root: &mut dyn SceneNode,
        water: &Rc<WaterMaterial>,
    ) -> Option<PatchReport> {
        if let Some((id, patched_with)) = &self.last {
            if *id == scene && Rc::ptr_eq(patched_with, water) {
                return None;
            }
        }
        let report = patch_scene(root, &self.prefix, water);
        self.last = Some((scene, water.clone()));
        Some(report)
    }
}
