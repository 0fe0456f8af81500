//! Render composition and pipeline batching.
//!
//! Scene nodes and flows describe what they want drawn as a [`Render`] tree.
//! Each frame the trees of all flows are sorted into [`Batches`], one per
//! pipeline, which are then drawn in a fixed order: opaque, transparent,
//! water and finally the overlay.
//!
//! # Key types
//!
//! - [`Render<'a>`] is the enum describing render operations
//! - [`Instanced<'a>`] is one mesh primitive: geometry, material and instance buffer
//! - [`Flat<'a>`] is a screen-space draw without vertex buffers (the overlay)

use crate::{context::Context, data_structures::mesh::GeometryGpu};

/// A geometry drawn `amount` times with one material.
pub struct Instanced<'a> {
    pub instance: &'a wgpu::Buffer,
    pub geometry: &'a GeometryGpu,
    pub material: &'a wgpu::BindGroup,
    pub amount: usize,
}

/// A draw whose vertices are generated in the vertex shader.
pub struct Flat<'a> {
    pub group: &'a wgpu::BindGroup,
    pub vertices: u32,
}

/// Specifies how a scene object should be rendered.
///
/// - `None` renders nothing
/// - `Default` is opaque, back faces culled
/// - `DoubleSided` is opaque with both faces drawn
/// - `Transparent` is blended, back faces culled
/// - `TransparentDoubleSided` is blended with both faces drawn
/// - `Water` uses the water pipeline
/// - `Overlay` is drawn on top of everything else
/// - `Composed` groups any of the above
pub enum Render<'a> {
    None,
    Default(Instanced<'a>),
    DoubleSided(Instanced<'a>),
    Transparent(Instanced<'a>),
    TransparentDoubleSided(Instanced<'a>),
    Water(Instanced<'a>),
    Overlay(Flat<'a>),
    Composed(Vec<Render<'a>>),
}

/// Draw lists, one per pipeline.
#[derive(Default)]
pub struct Batches<'a> {
    pub opaque: Vec<Instanced<'a>>,
    pub opaque_double_sided: Vec<Instanced<'a>>,
    pub transparent: Vec<Instanced<'a>>,
    pub transparent_double_sided: Vec<Instanced<'a>>,
    pub water: Vec<Instanced<'a>>,
    pub overlays: Vec<Flat<'a>>,
}

impl<'a> Batches<'a> {
    pub fn is_empty(&self) -> bool {
        self.opaque.is_empty()
            && self.opaque_double_sided.is_empty()
            && self.transparent.is_empty()
            && self.transparent_double_sided.is_empty()
            && self.water.is_empty()
            && self.overlays.is_empty()
    }
}

impl<'a> Render<'a> {
    pub(crate) fn set_pipelines(self, batches: &mut Batches<'a>) {
        match self {
            Render::Default(instanced) => batches.opaque.push(instanced),
            Render::DoubleSided(instanced) => batches.opaque_double_sided.push(instanced),
            Render::Transparent(instanced) => batches.transparent.push(instanced),
            Render::TransparentDoubleSided(instanced) => {
                batches.transparent_double_sided.push(instanced)
            }
            Render::Water(instanced) => batches.water.push(instanced),
            Render::Overlay(flat) => batches.overlays.push(flat),
            Render::Composed(renders) => renders
                .into_iter()
                .for_each(|render| render.set_pipelines(batches)),
            Render::None => (),
        }
    }
}

fn draw_instanced(render_pass: &mut wgpu::RenderPass<'_>, ctx: &Context, instanced: &[Instanced]) {
    for instanced in instanced {
        if instanced.amount == 0 || instanced.instance.size() == 0 {
            log::warn!("you attemted to render something with zero instances");
            continue;
        }
        let geometry = instanced.geometry;
        render_pass.set_bind_group(0, instanced.material, &[]);
        render_pass.set_bind_group(1, &ctx.camera.bind_group, &[]);
        render_pass.set_bind_group(2, &ctx.light.bind_group, &[]);
        render_pass.set_vertex_buffer(0, geometry.vertex_buffer.slice(..));
        render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
        render_pass.set_index_buffer(geometry.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..geometry.num_elements, 0, 0..instanced.amount as u32);
    }
}

/// Records all batches into `render_pass`, skipping pipelines with nothing to draw.
pub(crate) fn draw_batches(render_pass: &mut wgpu::RenderPass<'_>, ctx: &Context, batches: &Batches) {
    let pipelines = &ctx.pipelines;
    let passes = [
        (&pipelines.opaque, &batches.opaque),
        (&pipelines.opaque_double_sided, &batches.opaque_double_sided),
        (&pipelines.transparent, &batches.transparent),
        (&pipelines.transparent_double_sided, &batches.transparent_double_sided),
        (&pipelines.water, &batches.water),
    ];
    for (pipeline, instanced) in passes {
        if instanced.is_empty() {
            continue;
        }
        render_pass.set_pipeline(pipeline);
        draw_instanced(render_pass, ctx, instanced);
    }

    if !batches.overlays.is_empty() {
        render_pass.set_pipeline(&pipelines.overlay);
        for flat in &batches.overlays {
            render_pass.set_bind_group(0, flat.group, &[]);
            render_pass.draw(0..flat.vertices, 0..1);
        }
    }
}
