//! Full-screen overlay pipeline used by the loading indicator.
//!
//! The overlay is a single triangle covering the viewport; the fragment shader
//! draws the backdrop and the rounded progress bar from [`OverlayUniform`].
//! It is drawn last and ignores the depth buffer.

use crate::{
    color::LinearColor,
    config::OverlayConfig,
    data_structures::texture,
};

/// Vertices of the full-screen triangle, generated in the vertex shader.
pub const FULLSCREEN_VERTICES: u32 = 3;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OverlayUniform {
    backdrop: [f32; 4],
    track: [f32; 4],
    fill: [f32; 4],
    viewport: [f32; 2],
    bar_size: [f32; 2],
    /// Filled share of the bar in [0, 1].
    progress: f32,
    corner_radius: f32,
    _padding: [f32; 2],
}

impl OverlayUniform {
    pub fn from_config(config: &OverlayConfig) -> anyhow::Result<Self> {
        Ok(Self {
            backdrop: LinearColor::from_hex(config.backdrop)?.with_alpha(config.backdrop_alpha),
            track: LinearColor::BLACK.with_alpha(config.track_alpha),
            fill: LinearColor::from_hex(config.fill)?.with_alpha(1.0),
            viewport: [1.0, 1.0],
            bar_size: config.bar_size,
            progress: 0.0,
            // Fully rounded ends
            corner_radius: config.bar_size[1] * 0.5,
            _padding: [0.0; 2],
        })
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = [width.max(1) as f32, height.max(1) as f32];
    }

    /// Bar size in physical pixels. The ends stay fully rounded.
    pub fn set_bar_size(&mut self, width: f32, height: f32) {
        self.bar_size = [width, height];
        self.corner_radius = height * 0.5;
    }

    pub fn bar_size(&self) -> [f32; 2] {
        self.bar_size
    }

    /// `percent` is clamped to [0, 100].
    pub fn set_progress(&mut self, percent: f32) {
        self.progress = percent.clamp(0.0, 100.0) / 100.0;
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }
}

fn mk_pipeline_layout(
    device: &wgpu::Device,
    overlay_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::PipelineLayout {
    device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Overlay Render Pipeline Layout"),
        bind_group_layouts: &[overlay_bind_group_layout],
        ..Default::default()
    })
}

fn mk_render_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    render_pipeline_layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Overlay Render Pipeline"),
        layout: Some(render_pipeline_layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: config.format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        // The pass has a depth attachment, so the pipeline declares it but never uses it
        depth_stencil: Some(wgpu::DepthStencilState {
            format: texture::Texture::DEPTH_FORMAT,
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::Always,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview_mask: None,
        cache: None,
    })
}

pub fn mk_overlay_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    overlay_bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("Overlay Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("overlay.wgsl").into()),
    });
    let render_pipeline_layout = mk_pipeline_layout(device, overlay_bind_group_layout);
    mk_render_pipeline(device, config, &render_pipeline_layout, &shader)
}
