//! The viewer's main flow: loads the scene, patches it, centres it and keeps
//! the water animated.

use std::rc::Rc;

use cgmath::{EuclideanSpace, Point3, Vector3};
use instant::Duration;

use crate::{
    color::LinearColor,
    config::{MODEL, ModelPlacement, WATER_MESH_PREFIX},
    context::Context,
    data_structures::{
        instance::Instance,
        material::WaterMaterial,
        scene_graph::{ContainerNode, LoadedScene, SceneId, SceneNode, world_bounds},
    },
    flow::{GraphicsFlow, Out},
    render::Render,
    resources::load_scene,
    viewer::{
        ViewerEvent, ViewerState,
        frame_clock::FrameClock,
        patch::ScenePatcher,
    },
};

/**
 * Wraps `model` so that it is scaled and placed as `placement` says and the
 * centre of its world bounding box ends up at `placement.center_at`.
 *
 * The returned group has up-to-date world transforms.
 */
pub fn center_model(model: Box<dyn SceneNode>, placement: &ModelPlacement) -> ContainerNode {
    let mut placed = ContainerNode::new(
        "model",
        Instance::from_translation(placement.position.into()).with_uniform_scale(placement.scale),
    )
    .with_children(vec![model]);
    placed.update_world_transforms(&Instance::new());
    let center = world_bounds(&placed)
        .map(|bounds| bounds.center())
        .unwrap_or_else(Point3::origin);

    let offset = ContainerNode::new("center_offset", Instance::from_translation(-center.to_vec()))
        .with_children(vec![Box::new(placed)]);
    let mut group = ContainerNode::new(
        "center",
        Instance::from_translation(Vector3::from(placement.center_at)),
    )
    .with_children(vec![Box::new(offset)]);
    group.update_world_transforms(&Instance::new());
    group
}

struct MountedScene {
    id: SceneId,
    root: ContainerNode,
}

pub struct WaterScene {
    scene_file: String,
    background: LinearColor,
    water: Rc<WaterMaterial>,
    patcher: ScenePatcher,
    clock: FrameClock,
    scene: Option<MountedScene>,
}

impl WaterScene {
    pub fn new(scene_file: impl Into<String>, background: LinearColor, water: Rc<WaterMaterial>) -> Self {
        Self {
            scene_file: scene_file.into(),
            background,
            water,
            patcher: ScenePatcher::new(WATER_MESH_PREFIX),
            clock: FrameClock::new(),
            scene: None,
        }
    }

    fn mount(&mut self, scene: LoadedScene) {
        let id = scene.id();
        let root = center_model(scene.root, &MODEL);
        log::info!("Scene {} mounted", self.scene_file);
        self.scene = Some(MountedScene { id, root });
    }
}

impl GraphicsFlow<ViewerState, ViewerEvent> for WaterScene {
    fn on_init(&mut self, ctx: &mut Context, state: &mut ViewerState) -> Out<ViewerEvent> {
        ctx.clear_colour = self.background.to_wgpu();

        // Natively the engine resolves this future before the first frame, so the
        // loading ramp only animates in the browser.
        state.loads.begin();
        let file = self.scene_file.clone();
        log::info!("Loading scene {}", file);
        let loading: Box<dyn Future<Output = ViewerEvent>> = Box::new(async move {
            ViewerEvent::SceneLoaded(load_scene(&file).await)
        });
        Out::FutEvent(vec![loading])
    }

    fn on_update(
        &mut self,
        ctx: &Context,
        _state: &mut ViewerState,
        _dt: Duration,
    ) -> Out<ViewerEvent> {
        if let Some(scene) = &mut self.scene {
            if let Some(report) = self.patcher.patch_once(scene.id, &mut scene.root, &self.water) {
                log::info!(
                    "Patched {} meshes: {} materials neutralized, {} water surfaces",
                    report.meshes_visited,
                    report.materials_neutralized,
                    report.water_meshes
                );
            }
        }

        self.clock.tick(Some(&self.water));
        self.water.write_to_buffer(ctx);

        if let Some(scene) = &mut self.scene {
            scene.root.write_to_buffers(ctx);
        }
        Out::Empty
    }

    fn on_custom_events(
        &mut self,
        _ctx: &Context,
        state: &mut ViewerState,
        event: ViewerEvent,
    ) -> Option<ViewerEvent> {
        match event {
            ViewerEvent::SceneLoaded(Ok(scene)) => self.mount(scene),
            ViewerEvent::SceneLoaded(Err(e)) => {
                log::error!("Scene {} could not be loaded: {:#}", self.scene_file, e)
            }
        }
        state.loads.finish();
        None
    }

    fn on_render(&self) -> Render<'_> {
        match &self.scene {
            Some(scene) => scene.root.get_render(),
            None => Render::None,
        }
    }
}
