use wgpu::util::DeviceExt;

use crate::{
    color::LinearColor,
    config::LightingConfig,
    pipelines::uniform_bind_group,
};

#[derive(Debug)]
pub struct LightResources {
    pub uniform: LightUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

impl LightResources {
    pub fn new(
        uniform: LightUniform,
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let buffer = mk_buffer(device, uniform);
        let bind_group = uniform_bind_group(device, layout, &buffer, "light_bind_group");
        Self {
            uniform,
            buffer,
            bind_group,
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DirectionalLightRaw {
    /// The light shines from this point towards the origin.
    pub position: [f32; 3],
    pub intensity: f32,
    pub color: [f32; 3],
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use a padding field here
    _padding: u32,
}

/// Hemisphere light, two directional lights and the tone mapping exposure.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub sky_color: [f32; 3],
    pub hemisphere_intensity: f32,
    pub ground_color: [f32; 3],
    pub exposure: f32,
    pub directional: [DirectionalLightRaw; 2],
}

impl LightUniform {
    pub fn from_config(config: &LightingConfig) -> anyhow::Result<Self> {
        let directional = |index: usize| -> anyhow::Result<DirectionalLightRaw> {
            let light = &config.directional[index];
            Ok(DirectionalLightRaw {
                position: light.position,
                intensity: light.intensity,
                color: LinearColor::from_hex(light.color)?.to_array(),
                _padding: 0,
            })
        };
        Ok(Self {
            sky_color: LinearColor::from_hex(config.sky_color)?.to_array(),
            hemisphere_intensity: config.hemisphere_intensity,
            ground_color: LinearColor::from_hex(config.ground_color)?.to_array(),
            exposure: config.exposure,
            directional: [directional(0)?, directional(1)?],
        })
    }
}

pub fn mk_buffer(device: &wgpu::Device, light_uniform: LightUniform) -> wgpu::Buffer {
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Light Buffer"),
        contents: bytemuck::cast_slice(&[light_uniform]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    })
}
