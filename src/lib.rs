//! pagoda-viewer
//!
//! A small glTF scene viewer for native windows and the browser (WASM). It
//! loads one `.glb` scene, gives every mesh whose name starts with `Water` a
//! shared animated water material, removes environment reflections from the
//! remaining materials and shows a loading bar while the scene is fetched.
//!
//! High-level modules
//! - `camera`: orbit camera, its mouse controller and the view/projection uniform
//! - `color`: hex colour parsing and sRGB to linear conversion
//! - `config`: compile-time settings of the viewer
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `data_structures`: scene graph, materials, meshes, instances and textures
//! - `flow`: flow control and the event loop
//! - `pipelines`: render pipelines (standard, transparent, water, overlay) and lights
//! - `resources`: fetching and converting glTF scenes
//! - `render`: render composition for efficient pipeline reuse
//! - `viewer`: the flows making up the viewer
//!

pub mod camera;
pub mod color;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod viewer;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Entry point of the web build.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    viewer::run_viewer().map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}
