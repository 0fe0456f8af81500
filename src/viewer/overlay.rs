use instant::{Duration, Instant};
use wgpu::util::DeviceExt;

use crate::{
    config::{OverlayConfig, ProgressConfig},
    context::Context,
    flow::{GraphicsFlow, Out},
    pipelines::{
        overlay::{FULLSCREEN_VERTICES, OverlayUniform},
        uniform_bind_group,
    },
    render::{Flat, Render},
    viewer::{
        ViewerEvent, ViewerState,
        progress::LoadingProgress,
    },
};

struct OverlayGpu {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Full-screen loading indicator driven by the state's [`LoadTracker`](super::progress::LoadTracker).
pub struct ProgressOverlay {
    progress: LoadingProgress,
    uniform: OverlayUniform,
    bar_size: [f32; 2],
    gpu: Option<OverlayGpu>,
}

impl ProgressOverlay {
    pub fn new(progress: &ProgressConfig, overlay: &OverlayConfig) -> anyhow::Result<Self> {
        Ok(Self {
            progress: LoadingProgress::new(*progress),
            uniform: OverlayUniform::from_config(overlay)?,
            bar_size: overlay.bar_size,
            gpu: None,
        })
    }

    pub fn progress(&self) -> &LoadingProgress {
        &self.progress
    }

    /**
     * Updates the progress and the uniform without touching the GPU.
     *
     * `viewport` is in physical pixels, `scale_factor` converts the configured
     * bar size from logical to physical pixels.
     */
    pub fn observe(&mut self, loading: bool, now: Instant, viewport: (u32, u32), scale_factor: f32) {
        let value = self.progress.observe(loading, now);
        self.uniform.set_progress(value.min(100.0));
        self.uniform.set_viewport(viewport.0, viewport.1);
        let scale = if scale_factor > 0.0 { scale_factor } else { 1.0 };
        self.uniform
            .set_bar_size(self.bar_size[0] * scale, self.bar_size[1] * scale);
    }

    pub fn uniform(&self) -> &OverlayUniform {
        &self.uniform
    }
}

impl GraphicsFlow<ViewerState, ViewerEvent> for ProgressOverlay {
    fn on_init(&mut self, ctx: &mut Context, state: &mut ViewerState) -> Out<ViewerEvent> {
        self.observe(state.loads.is_active(), Instant::now(), ctx.viewport(), ctx.scale_factor());
        let buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Overlay Buffer"),
                contents: bytemuck::cast_slice(&[self.uniform]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let bind_group =
            uniform_bind_group(&ctx.device, &ctx.layouts.overlay, &buffer, "overlay_bind_group");
        self.gpu = Some(OverlayGpu { buffer, bind_group });
        Out::Empty
    }

    fn on_update(
        &mut self,
        ctx: &Context,
        state: &mut ViewerState,
        _dt: Duration,
    ) -> Out<ViewerEvent> {
        let loading = state.loads.is_active();
        // Once hidden and idle there is nothing left to animate
        if !loading && !self.progress.is_ramping() && !self.progress.is_visible() {
            return Out::Empty;
        }
        self.observe(loading, Instant::now(), ctx.viewport(), ctx.scale_factor());
        if let Some(gpu) = &self.gpu {
            ctx.queue
                .write_buffer(&gpu.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
        }
        Out::Empty
    }

    fn on_custom_events(
        &mut self,
        _ctx: &Context,
        _state: &mut ViewerState,
        event: ViewerEvent,
    ) -> Option<ViewerEvent> {
        Some(event)
    }

    fn on_render(&self) -> Render<'_> {
        match &self.gpu {
            Some(gpu) if self.progress.is_visible() => Render::Overlay(Flat {
                group: &gpu.bind_group,
                vertices: FULLSCREEN_VERTICES,
            }),
            _ => Render::None,
        }
    }
}
