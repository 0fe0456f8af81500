use crate::{
    data_structures::{instance::InstanceRaw, mesh::ModelVertex, texture::Texture},
    pipelines::{
        Layouts,
        basic::{Surface, mk_render_pipeline, mk_scene_pipeline_layout},
    },
};

/**
 * Pipeline of the animated water material.
 *
 * Both faces are drawn (the back side has its own colour), the result is alpha
 * blended and the depth buffer is tested but never written.
 */
pub fn mk_water_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    layouts: &Layouts,
) -> wgpu::RenderPipeline {
    let render_pipeline_layout =
        mk_scene_pipeline_layout(device, &layouts.water, layouts, "Water Pipeline Layout");
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Water Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("water.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &render_pipeline_layout,
        config.format,
        Some(wgpu::BlendState::ALPHA_BLENDING),
        Some(Texture::DEPTH_FORMAT),
        Surface {
            cull_mode: None,
            depth_write: false,
        },
        &[ModelVertex::desc(), InstanceRaw::desc()],
        shader,
    )
}
