//! Viewer data structures: scene graph, meshes, materials, textures and instances.
//!
//! - `scene_graph` holds the node tree of a loaded scene and its traversals
//! - `mesh` holds vertex data, geometry buffers and primitives
//! - `material` holds the scene file's materials and the water material
//! - `texture` wraps GPU textures (depth buffer, base colour maps)
//! - `instance` holds node transforms and their GPU layout

pub mod instance;
pub mod material;
pub mod mesh;
pub mod scene_graph;
pub mod texture;
