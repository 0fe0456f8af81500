//! Mesh geometry and primitives.
//!
//! Geometry keeps its vertices on the CPU (bounds, tests) and creates its
//! vertex/index buffers on the first upload.

use std::{cell::OnceCell, rc::Rc};

use wgpu::util::DeviceExt;

use crate::data_structures::material::MaterialRef;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub normal: [f32; 3],
}

impl ModelVertex {
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

#[derive(Debug)]
pub struct GeometryGpu {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
}

#[derive(Debug)]
pub struct Geometry {
    pub name: String,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    gpu: OnceCell<GeometryGpu>,
}

impl Geometry {
    /// Non-indexed input gets a trivial `0..n` index list so every draw is indexed.
    pub fn new(name: impl Into<String>, vertices: Vec<ModelVertex>, indices: Option<Vec<u32>>) -> Self {
        let indices = indices.unwrap_or_else(|| (0..vertices.len() as u32).collect());
        Self {
            name: name.into(),
            vertices,
            indices,
            gpu: OnceCell::new(),
        }
    }

    pub fn gpu(&self) -> Option<&GeometryGpu> {
        self.gpu.get()
    }

    pub fn write_to_buffers(&self, device: &wgpu::Device) {
        if self.gpu.get().is_some() || self.indices.is_empty() {
            return;
        }
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Vertex Buffer", self.name)),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Index Buffer", self.name)),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let _ = self.gpu.set(GeometryGpu {
            vertex_buffer,
            index_buffer,
            num_elements: self.indices.len() as u32,
        });
    }
}

/// One draw of a mesh: geometry plus the material it is shaded with.
#[derive(Clone, Debug)]
pub struct Primitive {
    pub geometry: Rc<Geometry>,
    pub material: Option<MaterialRef>,
}

impl Primitive {
    pub fn new(geometry: Rc<Geometry>, material: Option<MaterialRef>) -> Self {
        Self { geometry, material }
    }
}
