//! Materials: the scene file's standard materials and the animated water material.
//!
//! Materials are shared between meshes, so meshes hold a [`MaterialRef`] (an
//! `Rc`) and identity is pointer identity. CPU-side parameters live behind
//! `Cell`/`RefCell`; the GPU uniform buffer and bind group are created once,
//! on the first [`write_to_buffer`](StandardMaterial::write_to_buffer), and
//! refreshed through `queue.write_buffer` afterwards.

use std::{
    cell::{Cell, OnceCell, Ref, RefCell},
    rc::Rc,
};

use wgpu::util::DeviceExt;

use crate::{
    color::LinearColor,
    config::WaterConfig,
    context::Context,
    data_structures::texture::{Texture, create_default_sampler},
};

/// Uniform buffer plus the bind group exposing it (and textures) to shaders.
#[derive(Debug)]
pub struct MaterialGpu {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AlphaMode {
    Opaque,
    Mask(f32),
    Blend,
}

/// Parameters of a material coming from the scene file.
///
/// `reflectivity`, `refraction_ratio` and `transmission` are `None` when the
/// material kind has no such property at all, which is different from a
/// property that exists and is zero.
#[derive(Clone, Debug, PartialEq)]
pub struct StandardParams {
    pub base_color: [f32; 4],
    pub alpha_mode: AlphaMode,
    pub double_sided: bool,
    /// Shaded with the base colour only, no lighting.
    pub unlit: bool,
    pub reflectivity: Option<f32>,
    pub refraction_ratio: Option<f32>,
    pub transmission: Option<f32>,
}

impl Default for StandardParams {
    fn default() -> Self {
        Self {
            base_color: [1.0, 1.0, 1.0, 1.0],
            alpha_mode: AlphaMode::Opaque,
            double_sided: false,
            unlit: false,
            reflectivity: None,
            refraction_ratio: None,
            transmission: None,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct StandardUniform {
    base_color: [f32; 4],
    reflectivity: f32,
    refraction_ratio: f32,
    transmission: f32,
    // Negative when alpha masking is off
    alpha_cutoff: f32,
    unlit: u32,
    _padding: [u32; 3],
}

pub struct StandardMaterial {
    pub name: String,
    params: RefCell<StandardParams>,
    base_color_image: Option<image::DynamicImage>,
    gpu: OnceCell<MaterialGpu>,
    dirty: Cell<bool>,
}

impl StandardMaterial {
    pub fn new(
        name: impl Into<String>,
        params: StandardParams,
        base_color_image: Option<image::DynamicImage>,
    ) -> Self {
        Self {
            name: name.into(),
            params: RefCell::new(params),
            base_color_image,
            gpu: OnceCell::new(),
            dirty: Cell::new(false),
        }
    }

    pub fn params(&self) -> Ref<'_, StandardParams> {
        self.params.borrow()
    }

    pub fn update(&self, mutation: impl FnOnce(&mut StandardParams)) {
        mutation(&mut self.params.borrow_mut());
        self.dirty.set(true);
    }

    /**
     * Forces every environment property the material actually has to zero.
     * Properties the material does not have stay absent.
     *
     * Returns whether at least one property existed.
     */
    pub fn neutralize_environment(&self) -> bool {
        let mut touched = false;
        let mut guard = self.params.borrow_mut();
        let params = &mut *guard;
        for property in [
            &mut params.reflectivity,
            &mut params.refraction_ratio,
            &mut params.transmission,
        ] {
            if let Some(value) = property {
                *value = 0.0;
                touched = true;
            }
        }
        if touched {
            self.dirty.set(true);
        }
        touched
    }

    /// True if parameters changed since the last upload.
    pub fn needs_upload(&self) -> bool {
        self.dirty.get()
    }

    /// Blended and transmissive materials go through the transparent pipeline.
    pub fn is_transparent(&self) -> bool {
        let params = self.params();
        params.alpha_mode == AlphaMode::Blend || params.transmission.is_some_and(|t| t > 0.0)
    }

    pub fn uniform(&self) -> StandardUniform {
        let params = self.params();
        StandardUniform {
            base_color: params.base_color,
            reflectivity: params.reflectivity.unwrap_or(0.0),
            refraction_ratio: params.refraction_ratio.unwrap_or(0.0),
            transmission: params.transmission.unwrap_or(0.0),
            alpha_cutoff: match params.alpha_mode {
                AlphaMode::Mask(cutoff) => cutoff,
                _ => -1.0,
            },
            unlit: params.unlit as u32,
            _padding: [0; 3],
        }
    }

    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu.get().map(|gpu| &gpu.bind_group)
    }

    pub fn write_to_buffer(&self, ctx: &Context) {
        match self.gpu.get() {
            Some(gpu) => {
                if self.dirty.replace(false) {
                    ctx.queue
                        .write_buffer(&gpu.buffer, 0, bytemuck::cast_slice(&[self.uniform()]));
                }
            }
            None => {
                let gpu = self.create_gpu(ctx);
                self.dirty.set(false);
                let _ = self.gpu.set(gpu);
            }
        }
    }

    fn create_gpu(&self, ctx: &Context) -> MaterialGpu {
        let buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} material buffer", self.name)),
                contents: bytemuck::cast_slice(&[self.uniform()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let texture = self
            .base_color_image
            .as_ref()
            .and_then(|img| {
                Texture::from_image(&ctx.device, &ctx.queue, img, Some(&self.name))
                .inspect_err(|e| {
                    log::warn!(
                        "Base colour texture of material '{}' was dropped: {}",
                        self.name,
                        e
                    )
                })
                .ok()
            })
            .unwrap_or_else(|| ctx.white_texture.clone());
        let sampler = texture
            .sampler
            .clone()
            .unwrap_or_else(|| create_default_sampler(&ctx.device));
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &ctx.layouts.standard,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&texture.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
            label: Some(&format!("{} material bind group", self.name)),
        });
        MaterialGpu { buffer, bind_group }
    }
}

impl std::fmt::Debug for StandardMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandardMaterial")
            .field("name", &self.name)
            .field("params", &*self.params())
            .field("textured", &self.base_color_image.is_some())
            .finish()
    }
}

/// The tunable values of the water shader, colours already in linear space.
#[derive(Clone, Debug, PartialEq)]
pub struct WaterParams {
    pub color_deep: LinearColor,
    pub color_shallow: LinearColor,
    pub color_foam: LinearColor,
    pub color_back: LinearColor,
    pub opacity: f32,
    pub wave_amp: f32,
    pub wave_freq: f32,
    pub wave_speed: f32,
}

impl WaterParams {
    pub fn from_config(config: &WaterConfig) -> anyhow::Result<Self> {
        Ok(Self {
            color_deep: LinearColor::from_hex(config.color_deep)?,
            color_shallow: LinearColor::from_hex(config.color_shallow)?,
            color_foam: LinearColor::from_hex(config.color_foam)?,
            color_back: LinearColor::from_hex(config.color_back)?,
            opacity: config.opacity,
            wave_amp: config.wave_amp,
            wave_freq: config.wave_freq,
            wave_speed: config.wave_speed,
        })
    }
}

/**
 * Must match `WaterUniform` in water.wgsl. Every vec3 is followed by a scalar
 * so the struct packs into five 16 byte rows.
 */
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct WaterUniform {
    color_deep: [f32; 3],
    time: f32,
    color_shallow: [f32; 3],
    opacity: f32,
    color_foam: [f32; 3],
    wave_amp: f32,
    color_back: [f32; 3],
    wave_freq: f32,
    wave_speed: f32,
    _padding: [f32; 3],
}

/// The animated water surface shared by every water mesh of a scene.
///
/// Drawn transparent, double-sided and without depth writes, see
/// [`crate::pipelines::water`].
pub struct WaterMaterial {
    params: WaterParams,
    time: Cell<f32>,
    gpu: OnceCell<MaterialGpu>,
}

impl WaterMaterial {
    pub fn new(params: WaterParams) -> Self {
        Self {
            params,
            time: Cell::new(0.0),
            gpu: OnceCell::new(),
        }
    }

    pub fn params(&self) -> &WaterParams {
        &self.params
    }

    /// Elapsed seconds driving the wave animation.
    pub fn time(&self) -> f32 {
        self.time.get()
    }

    pub fn set_time(&self, seconds: f32) {
        self.time.set(seconds);
    }

    pub fn uniform(&self) -> WaterUniform {
        let p = &self.params;
        WaterUniform {
            color_deep: p.color_deep.to_array(),
            time: self.time(),
            color_shallow: p.color_shallow.to_array(),
            opacity: p.opacity,
            color_foam: p.color_foam.to_array(),
            wave_amp: p.wave_amp,
            color_back: p.color_back.to_array(),
            wave_freq: p.wave_freq,
            wave_speed: p.wave_speed,
            _padding: [0.0; 3],
        }
    }

    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu.get().map(|gpu| &gpu.bind_group)
    }

    /// Uploads the uniform. The time changes every frame so there is no dirty tracking.
    pub fn write_to_buffer(&self, ctx: &Context) {
        match self.gpu.get() {
            Some(gpu) => {
                ctx.queue
                    .write_buffer(&gpu.buffer, 0, bytemuck::cast_slice(&[self.uniform()]));
            }
            None => self.ensure_uploaded(ctx),
        }
    }

    /// Creates the GPU resources if they do not exist yet, without rewriting them.
    pub fn ensure_uploaded(&self, ctx: &Context) {
        if self.gpu.get().is_some() {
            return;
        }
        let buffer = ctx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Water material buffer"),
                contents: bytemuck::cast_slice(&[self.uniform()]),
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            });
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &ctx.layouts.water,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("Water material bind group"),
        });
        let _ = self.gpu.set(MaterialGpu { buffer, bind_group });
    }
}

impl std::fmt::Debug for WaterMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaterMaterial")
            .field("params", &self.params)
            .field("time", &self.time())
            .finish()
    }
}

/// A mesh's reference to a (possibly shared) material.
#[derive(Clone, Debug)]
pub enum MaterialRef {
    Standard(Rc<StandardMaterial>),
    Water(Rc<WaterMaterial>),
}

impl MaterialRef {
    pub fn as_standard(&self) -> Option<&Rc<StandardMaterial>> {
        match self {
            MaterialRef::Standard(material) => Some(material),
            MaterialRef::Water(_) => None,
        }
    }

    /// True if this refers to exactly `water`, not merely an equal material.
    pub fn is_water_instance(&self, water: &Rc<WaterMaterial>) -> bool {
        match self {
            MaterialRef::Water(material) => Rc::ptr_eq(material, water),
            MaterialRef::Standard(_) => false,
        }
    }

    pub fn same_as(&self, other: &MaterialRef) -> bool {
        match (self, other) {
            (MaterialRef::Standard(a), MaterialRef::Standard(b)) => Rc::ptr_eq(a, b),
            (MaterialRef::Water(a), MaterialRef::Water(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// The water uniform is owned by the frame driver, here it is only created.
    pub fn write_to_buffer(&self, ctx: &Context) {
        match self {
            MaterialRef::Standard(material) => material.write_to_buffer(ctx),
            MaterialRef::Water(material) => material.ensure_uploaded(ctx),
        }
    }

    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        match self {
            MaterialRef::Standard(material) => material.bind_group(),
            MaterialRef::Water(material) => material.bind_group(),
        }
    }
}

impl From<Rc<StandardMaterial>> for MaterialRef {
    fn from(material: Rc<StandardMaterial>) -> Self {
        MaterialRef::Standard(material)
    }
}

impl From<Rc<WaterMaterial>> for MaterialRef {
    fn from(material: Rc<WaterMaterial>) -> Self {
        MaterialRef::Water(material)
    }
}
