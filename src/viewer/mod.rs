//! The water viewer built on the flow engine.
//!
//! - `composer` loads, patches and draws the scene
//! - `overlay` draws the loading indicator
//! - `patch` rewrites materials of a loaded scene
//! - `frame_clock` feeds the water animation time
//! - `progress` tracks pending loads and estimates their progress

pub mod composer;
pub mod frame_clock;
pub mod overlay;
pub mod patch;
pub mod progress;

use std::rc::Rc;

use crate::{
    color::LinearColor,
    config::{BACKGROUND, OVERLAY, PROGRESS, SCENE_ASSET, WATER},
    data_structures::{
        material::{WaterMaterial, WaterParams},
        scene_graph::LoadedScene,
    },
    flow::{self, FlowConstructor, GraphicsFlow},
    viewer::{composer::WaterScene, overlay::ProgressOverlay, progress::LoadTracker},
};

/// State shared by the viewer's flows.
#[derive(Debug, Default)]
pub struct ViewerState {
    pub loads: LoadTracker,
}

pub enum ViewerEvent {
    SceneLoaded(anyhow::Result<LoadedScene>),
}

/// Opens the window (or binds the canvas) and runs the viewer until it is closed.
pub fn run_viewer() -> anyhow::Result<()> {
    let background = LinearColor::from_hex(BACKGROUND)?;
    let water = Rc::new(WaterMaterial::new(WaterParams::from_config(&WATER)?));
    let overlay = ProgressOverlay::new(&PROGRESS, &OVERLAY)?;

    let composer: FlowConstructor<ViewerState, ViewerEvent> = Box::new(move || {
        Box::pin(async move {
            Box::new(WaterScene::new(SCENE_ASSET, background, water))
                as Box<dyn GraphicsFlow<ViewerState, ViewerEvent>>
        })
    });
    let overlay: FlowConstructor<ViewerState, ViewerEvent> = Box::new(move || {
        Box::pin(async move { Box::new(overlay) as Box<dyn GraphicsFlow<ViewerState, ViewerEvent>> })
    });

    flow::run(vec![composer, overlay])
}
