#![allow(dead_code)]

use std::rc::Rc;

use pagoda_viewer::{
    config::WATER,
    data_structures::{
        instance::Instance,
        material::{MaterialRef, StandardMaterial, StandardParams, WaterMaterial, WaterParams},
        mesh::{Geometry, ModelVertex, Primitive},
        scene_graph::{ContainerNode, ModelNode, SceneNode, find_by_name},
    },
};

pub(crate) fn water() -> Rc<WaterMaterial> {
    Rc::new(WaterMaterial::new(
        WaterParams::from_config(&WATER).expect("water config colours are valid"),
    ))
}

pub(crate) fn standard(name: &str, params: StandardParams) -> Rc<StandardMaterial> {
    Rc::new(StandardMaterial::new(name, params, None))
}

/// A material with all three environment properties set.
pub(crate) fn reflective(name: &str) -> Rc<StandardMaterial> {
    standard(
        name,
        StandardParams {
            reflectivity: Some(0.5),
            refraction_ratio: Some(0.98),
            transmission: Some(0.3),
            ..Default::default()
        },
    )
}

/// One triangle spanning `min` to `max` in the XY plane.
pub(crate) fn triangle(name: &str, min: [f32; 2], max: [f32; 2]) -> Rc<Geometry> {
    let vertex = |x: f32, y: f32| ModelVertex {
        position: [x, y, 0.0],
        ..Default::default()
    };
    Rc::new(Geometry::new(
        name,
        vec![
            vertex(min[0], min[1]),
            vertex(max[0], min[1]),
            vertex(max[0], max[1]),
        ],
        None,
    ))
}

pub(crate) fn mesh(name: &str, material: Option<MaterialRef>) -> ModelNode {
    ModelNode::new(
        name,
        Instance::new(),
        vec![Primitive::new(triangle(name, [0.0, 0.0], [1.0, 1.0]), material)],
    )
}

pub(crate) fn group(name: &str, children: Vec<Box<dyn SceneNode>>) -> ContainerNode {
    ContainerNode::new(name, Instance::new()).with_children(children)
}

pub(crate) fn model<'a>(root: &'a dyn SceneNode, name: &str) -> &'a ModelNode {
    find_by_name(root, name)
        .and_then(|node| node.as_model())
        .unwrap_or_else(|| panic!("no mesh named {}", name))
}

/// The first standard material of the mesh called `name`.
pub(crate) fn standard_of(root: &dyn SceneNode, name: &str) -> Rc<StandardMaterial> {
    model(root, name)
        .materials()
        .find_map(MaterialRef::as_standard)
        .cloned()
        .unwrap_or_else(|| panic!("{} has no standard material", name))
}

/**
 * Packs a glTF JSON document and its binary chunk into a `.glb` file.
 * Both chunks are padded to four bytes as the container format requires. An
 * empty `bin` leaves the binary chunk out.
 */
pub(crate) fn glb(json: &str, bin: &[u8]) -> Vec<u8> {
    let mut json = json.as_bytes().to_vec();
    while json.len() % 4 != 0 {
        json.push(b' ');
    }
    let mut bin = bin.to_vec();
    while bin.len() % 4 != 0 {
        bin.push(0);
    }
    let bin_chunk = if bin.is_empty() { 0 } else { 8 + bin.len() };
    let total = 12 + 8 + json.len() + bin_chunk;

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(b"glTF");
    out.extend_from_slice(&2u32.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(b"JSON");
    out.extend_from_slice(&json);
    if !bin.is_empty() {
        out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        out.extend_from_slice(b"BIN\0");
        out.extend_from_slice(&bin);
    }
    out
}

/// Vertex positions of one triangle as little endian floats.
pub(crate) fn triangle_bin() -> Vec<u8> {
    [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]
        .iter()
        .flat_map(|f| f.to_le_bytes())
        .collect()
}

/// A scene with a water pool, a rock and a lamp, each with its own material.
pub(crate) fn pagoda_glb() -> Vec<u8> {
    let json = r#"{
        "asset": { "version": "2.0" },
        "extensionsUsed": ["KHR_materials_ior", "KHR_materials_transmission", "KHR_materials_unlit"],
        "scene": 0,
        "scenes": [{ "name": "Pagoda", "nodes": [0, 1, 2, 3] }],
        "nodes": [
            { "name": "WaterPool", "mesh": 0 },
            { "name": "Rock01", "mesh": 1, "translation": [2.0, 0.0, 0.0] },
            { "name": "Lamp", "mesh": 2 },
            { "name": "Roof", "mesh": 3, "scale": [2.0, 2.0, 2.0] }
        ],
        "meshes": [
            { "name": "WaterPool", "primitives": [{ "attributes": { "POSITION": 0 }, "material": 0 }] },
            { "name": "Rock01", "primitives": [{ "attributes": { "POSITION": 0 }, "material": 1 }] },
            { "name": "Lamp", "primitives": [{ "attributes": { "POSITION": 0 }, "material": 2 }] },
            { "name": "Roof", "primitives": [{ "attributes": { "POSITION": 0 } }] }
        ],
        "materials": [
            {
                "name": "Glass",
                "extensions": {
                    "KHR_materials_ior": { "ior": 1.5 },
                    "KHR_materials_transmission": { "transmissionFactor": 0.8 }
                }
            },
            { "name": "Stone", "pbrMetallicRoughness": { "baseColorFactor": [0.5, 0.5, 0.5, 1.0] } },
            { "name": "Paper", "extensions": { "KHR_materials_unlit": {} } }
        ],
        "buffers": [{ "byteLength": 36 }],
        "bufferViews": [{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }],
        "accessors": [{
            "bufferView": 0,
            "componentType": 5126,
            "count": 3,
            "type": "VEC3",
            "min": [0.0, 0.0, 0.0],
            "max": [1.0, 1.0, 0.0]
        }]
    }"#;
    glb(json, &triangle_bin())
}

/**
 * Two nodes whose meshes have two primitives each: node `Pool` shows mesh
 * `WaterSurface`, node `WaterPond` shows mesh `Plane`. Materials 0 and 1 use
 * extensions that have no typed accessor.
 */
pub(crate) fn split_meshes_glb() -> Vec<u8> {
    let json = r#"{
        "asset": { "version": "2.0" },
        "extensionsUsed": ["KHR_materials_clearcoat", "KHR_materials_sheen"],
        "scene": 0,
        "scenes": [{ "name": "Garden", "nodes": [0, 1] }],
        "nodes": [
            { "name": "Pool", "mesh": 0, "translation": [0.0, 2.0, 0.0] },
            { "name": "WaterPond", "mesh": 1 }
        ],
        "meshes": [
            {
                "name": "WaterSurface",
                "primitives": [
                    { "attributes": { "POSITION": 0 }, "material": 0 },
                    { "attributes": { "POSITION": 0 }, "material": 1 }
                ]
            },
            {
                "name": "Plane",
                "primitives": [
                    { "attributes": { "POSITION": 0 }, "material": 2 },
                    { "attributes": { "POSITION": 0 }, "material": 2 }
                ]
            }
        ],
        "materials": [
            { "name": "Lacquer", "extensions": { "KHR_materials_clearcoat": { "clearcoatFactor": 1.0 } } },
            { "name": "Silk", "extensions": { "KHR_materials_sheen": { "sheenColorFactor": [1.0, 1.0, 1.0] } } },
            { "name": "Moss" }
        ],
        "buffers": [{ "byteLength": 36 }],
        "bufferViews": [{ "buffer": 0, "byteOffset": 0, "byteLength": 36 }],
        "accessors": [{
            "bufferView": 0,
            "componentType": 5126,
            "count": 3,
            "type": "VEC3",
            "min": [0.0, 0.0, 0.0],
            "max": [1.0, 1.0, 0.0]
        }]
    }"#;
    glb(json, &triangle_bin())
}
