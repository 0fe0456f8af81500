//! Scene graph and hierarchical scene organization.
//!
//! A loaded scene is a tree of [`SceneNode`]s: [`ContainerNode`]s only carry a
//! transform and children, [`ModelNode`]s additionally own drawable
//! primitives. Traversal helpers visit the tree depth-first, parents before
//! children, and are the only way the viewer mutates a loaded scene.

use std::sync::atomic::{AtomicU64, Ordering};

use cgmath::Point3;
use wgpu::util::DeviceExt;

use crate::{
    context::Context,
    data_structures::{
        instance::Instance,
        material::MaterialRef,
        mesh::Primitive,
    },
    render::{Instanced, Render},
};

pub trait SceneNode {
    /// The node's name from the scene file. May be empty and is not unique.
    fn name(&self) -> &str;

    fn get_local_transform(&self) -> &Instance;

    fn get_world_transform(&self) -> &Instance;

    /// Recomputes the world transforms of this subtree below `parent`.
    fn update_world_transforms(&mut self, parent: &Instance);

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>>;

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>>;

    fn as_model(&self) -> Option<&ModelNode> {
        None
    }

    fn as_model_mut(&mut self) -> Option<&mut ModelNode> {
        None
    }

    /// Creates missing GPU resources of this subtree and uploads changed ones.
    fn write_to_buffers(&mut self, ctx: &Context);

    /// Everything in this subtree that is ready to be drawn.
    fn get_render(&self) -> Render<'_>;
}

/// Name, transforms and children shared by every node kind.
struct NodeBase {
    name: String,
    local: Instance,
    world: Instance,
    children: Vec<Box<dyn SceneNode>>,
}

impl NodeBase {
    fn new(name: impl Into<String>, local: Instance) -> Self {
        let world = local.clone();
        Self {
            name: name.into(),
            local,
            world,
            children: Vec::new(),
        }
    }

    fn update_world_transforms(&mut self, parent: &Instance) {
        self.world = parent * &self.local;
        for child in self.children.iter_mut() {
            child.update_world_transforms(&self.world);
        }
    }

    fn children_render(&self) -> Vec<Render<'_>> {
        self.children.iter().map(|child| child.get_render()).collect()
    }
}

pub struct ContainerNode {
    base: NodeBase,
}

impl ContainerNode {
    pub fn new(name: impl Into<String>, local: Instance) -> Self {
        Self {
            base: NodeBase::new(name, local),
        }
    }

    pub fn with_children(mut self, children: Vec<Box<dyn SceneNode>>) -> Self {
        self.base.children = children;
        self
    }
}

impl SceneNode for ContainerNode {
    fn name(&self) -> &str {
        &self.base.name
    }

    fn get_local_transform(&self) -> &Instance {
        &self.base.local
    }

    fn get_world_transform(&self) -> &Instance {
        &self.base.world
    }

    fn update_world_transforms(&mut self, parent: &Instance) {
        self.base.update_world_transforms(parent);
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.base.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.base.children
    }

    fn write_to_buffers(&mut self, ctx: &Context) {
        self.base
            .children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(ctx));
    }

    fn get_render(&self) -> Render<'_> {
        Render::Composed(self.base.children_render())
    }
}

pub struct ModelNode {
    base: NodeBase,
    pub primitives: Vec<Primitive>,
    instance_buffer: Option<wgpu::Buffer>,
    uploaded_world: Option<Instance>,
}

impl ModelNode {
    pub fn new(name: impl Into<String>, local: Instance, primitives: Vec<Primitive>) -> Self {
        Self {
            base: NodeBase::new(name, local),
            primitives,
            instance_buffer: None,
            uploaded_world: None,
        }
    }

    pub fn with_children(mut self, children: Vec<Box<dyn SceneNode>>) -> Self {
        self.base.children = children;
        self
    }

    /// True if at least one primitive is shaded by some material.
    pub fn has_material(&self) -> bool {
        self.primitives.iter().any(|p| p.material.is_some())
    }

    /// The material references of all primitives, in primitive order.
    pub fn materials(&self) -> impl Iterator<Item = &MaterialRef> {
        self.primitives.iter().filter_map(|p| p.material.as_ref())
    }

    /// Points every primitive at `material`, dropping what was there before.
    pub fn replace_material(&mut self, material: MaterialRef) {
        for primitive in self.primitives.iter_mut() {
            primitive.material = Some(material.clone());
        }
    }

    fn write_instance_buffer(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        if self.uploaded_world.as_ref() == Some(&self.base.world) {
            return;
        }
        let raw = [self.base.world.to_raw()];
        match &self.instance_buffer {
            Some(buffer) => queue.write_buffer(buffer, 0, bytemuck::cast_slice(&raw)),
            None => {
                self.instance_buffer = Some(device.create_buffer_init(
                    &wgpu::util::BufferInitDescriptor {
                        label: Some(&format!("{} Instance Buffer", self.base.name)),
                        contents: bytemuck::cast_slice(&raw),
                        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    },
                ))
            }
        }
        self.uploaded_world = Some(self.base.world.clone());
    }

    fn primitive_render<'a>(&'a self, instance: &'a wgpu::Buffer, primitive: &'a Primitive) -> Render<'a> {
        let (Some(geometry), Some(material)) = (primitive.geometry.gpu(), primitive.material.as_ref())
        else {
            return Render::None;
        };
        let Some(bind_group) = material.bind_group() else {
            return Render::None;
        };
        let instanced = Instanced {
            instance,
            geometry,
            material: bind_group,
            amount: 1,
        };
        match material {
            MaterialRef::Water(_) => Render::Water(instanced),
            MaterialRef::Standard(standard) => {
                let double_sided = standard.params().double_sided;
                match (standard.is_transparent(), double_sided) {
                    (false, false) => Render::Default(instanced),
                    (false, true) => Render::DoubleSided(instanced),
                    (true, false) => Render::Transparent(instanced),
                    (true, true) => Render::TransparentDoubleSided(instanced),
                }
            }
        }
    }
}

impl SceneNode for ModelNode {
    fn name(&self) -> &str {
        &self.base.name
    }

    fn get_local_transform(&self) -> &Instance {
        &self.base.local
    }

    fn get_world_transform(&self) -> &Instance {
        &self.base.world
    }

    fn update_world_transforms(&mut self, parent: &Instance) {
        self.base.update_world_transforms(parent);
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.base.children
    }

    fn get_children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.base.children
    }

    fn as_model(&self) -> Option<&ModelNode> {
        Some(self)
    }

    fn as_model_mut(&mut self) -> Option<&mut ModelNode> {
        Some(self)
    }

    fn write_to_buffers(&mut self, ctx: &Context) {
        self.write_instance_buffer(&ctx.device, &ctx.queue);
        for primitive in &self.primitives {
            primitive.geometry.write_to_buffers(&ctx.device);
            if let Some(material) = &primitive.material {
                material.write_to_buffer(ctx);
            }
        }
        self.base
            .children
            .iter_mut()
            .for_each(|child| child.write_to_buffers(ctx));
    }

    fn get_render(&self) -> Render<'_> {
        let mut renders = self.base.children_render();
        if let Some(instance) = &self.instance_buffer {
            renders.extend(
                self.primitives
                    .iter()
                    .map(|primitive| self.primitive_render(instance, primitive)),
            );
        }
        Render::Composed(renders)
    }
}

/// Visits `node` and all of its descendants, parents first.
pub fn traverse(node: &dyn SceneNode, visit: &mut dyn FnMut(&dyn SceneNode)) {
    visit(node);
    for child in node.get_children() {
        traverse(child.as_ref(), visit);
    }
}

/// Mutable depth-first traversal, parents first.
pub fn traverse_mut(node: &mut dyn SceneNode, visit: &mut dyn FnMut(&mut dyn SceneNode)) {
    visit(&mut *node);
    for child in node.get_children_mut() {
        traverse_mut(child.as_mut(), visit);
    }
}

/**
 * Applies `mutation` to every mesh for which `predicate` holds and returns how
 * many meshes were mutated. Hierarchy and geometry are never touched here.
 */
pub fn visit_meshes_mut(
    root: &mut dyn SceneNode,
    predicate: impl Fn(&ModelNode) -> bool,
    mut mutation: impl FnMut(&mut ModelNode),
) -> usize {
    let mut mutated = 0;
    traverse_mut(root, &mut |node| {
        if let Some(model) = node.as_model_mut() {
            if predicate(model) {
                mutation(model);
                mutated += 1;
            }
        }
    });
    mutated
}

/// Finds the first node with exactly this name.
pub fn find_by_name<'a>(root: &'a dyn SceneNode, name: &str) -> Option<&'a dyn SceneNode> {
    if root.name() == name {
        return Some(root);
    }
    root.get_children()
        .iter()
        .find_map(|child| find_by_name(child.as_ref(), name))
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Aabb {
    pub fn from_point(point: Point3<f32>) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    pub fn extend(&mut self, point: Point3<f32>) {
        self.min = Point3::new(
            self.min.x.min(point.x),
            self.min.y.min(point.y),
            self.min.z.min(point.z),
        );
        self.max = Point3::new(
            self.max.x.max(point.x),
            self.max.y.max(point.y),
            self.max.z.max(point.z),
        );
    }

    pub fn center(&self) -> Point3<f32> {
        Point3::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }
}

/**
 * Bounding box of all mesh vertices in world space.
 *
 * Uses the stored world transforms, so call `update_world_transforms` first.
 * Returns `None` for a tree without any vertices.
 */
pub fn world_bounds(root: &dyn SceneNode) -> Option<Aabb> {
    let mut bounds: Option<Aabb> = None;
    traverse(root, &mut |node| {
        let Some(model) = node.as_model() else {
            return;
        };
        let world = model.get_world_transform();
        for primitive in &model.primitives {
            for vertex in &primitive.geometry.vertices {
                let point = world.transform_point(vertex.position.into());
                match bounds.as_mut() {
                    Some(aabb) => aabb.extend(point),
                    None => bounds = Some(Aabb::from_point(point)),
                }
            }
        }
    });
    bounds
}

static NEXT_SCENE_ID: AtomicU64 = AtomicU64::new(1);

/// Distinguishes loaded scenes from each other, even if their content is equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SceneId(u64);

/// A scene graph produced by one load of a scene file.
pub struct LoadedScene {
    id: SceneId,
    pub root: Box<dyn SceneNode>,
}

impl LoadedScene {
    pub fn new(root: Box<dyn SceneNode>) -> Self {
        Self {
            id: SceneId(NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed)),
            root,
        }
    }

    pub fn id(&self) -> SceneId {
        self.id
    }
}
