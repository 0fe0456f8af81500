use crate::{
    data_structures::{instance::InstanceRaw, mesh::ModelVertex, texture::Texture},
    pipelines::{
        Layouts,
        basic::{Surface, mk_render_pipeline, mk_scene_pipeline_layout},
    },
};

/**
 * Pipeline for blended and transmissive standard materials.
 *
 * Same shader as the opaque pipeline, but alpha blended and without depth
 * writes so that transparent surfaces behind each other all stay visible.
 */
pub fn mk_transparent_pipeline(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    layouts: &Layouts,
    double_sided: bool,
) -> wgpu::RenderPipeline {
    let render_pipeline_layout = mk_scene_pipeline_layout(
        device,
        &layouts.standard,
        layouts,
        "Transparent Pipeline Layout",
    );
    let shader = wgpu::ShaderModuleDescriptor {
        label: Some("Transparent Shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("standard.wgsl").into()),
    };
    mk_render_pipeline(
        device,
        &render_pipeline_layout,
        config.format,
        Some(wgpu::BlendState::ALPHA_BLENDING),
        Some(Texture::DEPTH_FORMAT),
        Surface {
            cull_mode: (!double_sided).then_some(wgpu::Face::Back),
            depth_write: false,
        },
        &[ModelVertex::desc(), InstanceRaw::desc()],
        shader,
    )
}
