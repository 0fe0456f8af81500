//! Render pipelines and the bind group layouts they share.
//!
//! Every 3D pipeline uses the same bind group slots: group 0 is the material,
//! group 1 the camera and group 2 the lights. The overlay pipeline only binds
//! its own uniform in group 0.

pub mod basic;
pub mod light;
pub mod overlay;
pub mod transparent;
pub mod water;

#[derive(Debug)]
pub struct Layouts {
    pub standard: wgpu::BindGroupLayout,
    pub water: wgpu::BindGroupLayout,
    pub overlay: wgpu::BindGroupLayout,
    pub camera: wgpu::BindGroupLayout,
    pub light: wgpu::BindGroupLayout,
}

impl Layouts {
    pub fn new(device: &wgpu::Device) -> Self {
        let visible = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;
        Self {
            standard: basic::standard_material_layout(device),
            water: uniform_layout(device, visible, "water_bind_group_layout"),
            overlay: uniform_layout(device, visible, "overlay_bind_group_layout"),
            camera: uniform_layout(device, visible, "camera_bind_group_layout"),
            light: uniform_layout(device, visible, "light_bind_group_layout"),
        }
    }
}

#[derive(Debug)]
pub struct Pipelines {
    pub opaque: wgpu::RenderPipeline,
    pub opaque_double_sided: wgpu::RenderPipeline,
    pub transparent: wgpu::RenderPipeline,
    pub transparent_double_sided: wgpu::RenderPipeline,
    pub water: wgpu::RenderPipeline,
    pub overlay: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn new(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        layouts: &Layouts,
    ) -> Self {
        Self {
            opaque: basic::mk_basic_pipeline(device, config, layouts, false),
            opaque_double_sided: basic::mk_basic_pipeline(device, config, layouts, true),
            transparent: transparent::mk_transparent_pipeline(device, config, layouts, false),
            transparent_double_sided: transparent::mk_transparent_pipeline(
                device, config, layouts, true,
            ),
            water: water::mk_water_pipeline(device, config, layouts),
            overlay: overlay::mk_overlay_pipeline(device, config, &layouts.overlay),
        }
    }
}

/// A layout with a single uniform buffer at binding 0.
pub fn uniform_layout(
    device: &wgpu::Device,
    visibility: wgpu::ShaderStages,
    label: &str,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some(label),
    })
}

/// Bind group over a single uniform buffer created with [`uniform_layout`].
pub fn uniform_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    label: &str,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
        label: Some(label),
    })
}
