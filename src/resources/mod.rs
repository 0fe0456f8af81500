//! Loading of the packaged scene file.
//!
//! Natively files are read from `./assets/`, in the browser they are fetched
//! from `<origin>/assets/`. A `.glb` is parsed with the `gltf` crate into a
//! [`LoadedScene`]: one [`ModelNode`] per mesh node, materials shared between
//! all primitives that reference them.

use std::{collections::HashMap, rc::Rc};

use anyhow::{Context, bail};
use cgmath::InnerSpace;

use crate::data_structures::{
    instance::Instance,
    material::{AlphaMode, MaterialRef, StandardMaterial, StandardParams},
    mesh::{Geometry, ModelVertex, Primitive},
    scene_graph::{ContainerNode, LoadedScene, ModelNode, SceneNode},
};

/// Reflectivity of unlit materials, which expose it without an IOR.
const UNLIT_REFLECTIVITY: f32 = 1.0;
const UNLIT_REFRACTION_RATIO: f32 = 0.98;
/// IOR assumed by physical materials that do not declare one.
const DEFAULT_IOR: f32 = 1.5;
/// Material extensions without typed accessors that still make a material physical.
const PHYSICAL_EXTENSIONS: [&str; 5] = [
    "KHR_materials_clearcoat",
    "KHR_materials_sheen",
    "KHR_materials_iridescence",
    "KHR_materials_anisotropy",
    "KHR_materials_dispersion",
];

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    let window = web_sys::window().context("No browser window")?;
    let origin = window
        .location()
        .origin()
        .map_err(|_| anyhow::anyhow!("The page origin is not readable"))?;
    let base = reqwest::Url::parse(&format!("{}/assets/", origin))?;
    Ok(base.join(file_name)?)
}

pub async fn load_binary(file_name: &str) -> anyhow::Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(file_name)?;
        reqwest::get(url)
            .await?
            .error_for_status()?
            .bytes()
            .await?
            .to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = {
        let path = std::path::Path::new("./").join("assets").join(file_name);
        tokio::fs::read(&path)
            .await
            .with_context(|| format!("Cannot read {}", path.display()))?
    };

    Ok(data)
}

/// Resolves a URI found inside a scene file against the scene file's directory.
pub fn resolve_uri(scene_file: &str, uri: &str) -> String {
    match scene_file.rfind('/') {
        Some(index) => format!("{}{}", &scene_file[..=index], uri),
        None => uri.to_string(),
    }
}

/// Fetches the scene file and every external buffer or image it references.
pub async fn load_scene(file_name: &str) -> anyhow::Result<LoadedScene> {
    let bytes = load_binary(file_name)
        .await
        .with_context(|| format!("Loading scene {} failed", file_name))?;
    let gltf = gltf::Gltf::from_slice(&bytes)
        .with_context(|| format!("{} is not a valid glTF file", file_name))?;

    let uris: Vec<&str> = gltf
        .buffers()
        .filter_map(|buffer| match buffer.source() {
            gltf::buffer::Source::Uri(uri) => Some(uri),
            gltf::buffer::Source::Bin => None,
        })
        .chain(gltf.images().filter_map(|image| match image.source() {
            gltf::image::Source::Uri { uri, .. } => Some(uri),
            gltf::image::Source::View { .. } => None,
        }))
        .collect();
    let mut external = HashMap::new();
    for uri in uris {
        if uri.starts_with("data:") {
            continue;
        }
        let data = load_binary(&resolve_uri(file_name, uri))
            .await
            .with_context(|| format!("Loading {} referenced by {} failed", uri, file_name))?;
        external.insert(uri.to_string(), data);
    }

    scene_from_gltf(gltf, &external)
}

/// Parses a self-contained `.glb` (no external buffers or images).
pub fn parse_scene(bytes: &[u8]) -> anyhow::Result<LoadedScene> {
    let gltf = gltf::Gltf::from_slice(bytes).context("Not a valid glTF file")?;
    scene_from_gltf(gltf, &HashMap::new())
}

fn scene_from_gltf(
    gltf: gltf::Gltf,
    external: &HashMap<String, Vec<u8>>,
) -> anyhow::Result<LoadedScene> {
    let gltf::Gltf { document, blob } = gltf;

    let mut buffers = Vec::new();
    for buffer in document.buffers() {
        let data = match buffer.source() {
            gltf::buffer::Source::Bin => blob
                .clone()
                .context("The scene references a binary chunk it does not contain")?,
            gltf::buffer::Source::Uri(uri) => match external.get(uri) {
                Some(data) => data.clone(),
                None => bail!("Buffer {} is not available", uri),
            },
        };
        if data.len() < buffer.length() {
            bail!(
                "Buffer {} holds {} bytes, {} expected",
                buffer.index(),
                data.len(),
                buffer.length()
            );
        }
        buffers.push(data);
    }

    let images: Vec<Option<image::DynamicImage>> = document
        .images()
        .map(|image| decode_image(&image, &buffers, external))
        .collect();

    let materials: Vec<Rc<StandardMaterial>> = document
        .materials()
        .map(|material| Rc::new(standard_material(&material, &images)))
        .collect();
    let mut loader = NodeLoader {
        buffers: &buffers,
        materials: &materials,
        meshes: HashMap::new(),
        default_material: None,
    };

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .context("The file contains no scene")?;
    let children: Vec<Box<dyn SceneNode>> = scene
        .nodes()
        .map(|node| loader.to_scene_node(&node))
        .collect();
    let root = ContainerNode::new(scene.name().unwrap_or_default(), Instance::new())
        .with_children(children);

    log::info!(
        "Loaded scene with {} materials and {} meshes",
        materials.len(),
        loader.meshes.len()
    );
    Ok(LoadedScene::new(Box::new(root)))
}

fn decode_image(
    image: &gltf::Image,
    buffers: &[Vec<u8>],
    external: &HashMap<String, Vec<u8>>,
) -> Option<image::DynamicImage> {
    let bytes = match image.source() {
        gltf::image::Source::View { view, .. } => buffers
            .get(view.buffer().index())
            .and_then(|buffer| buffer.get(view.offset()..view.offset() + view.length())),
        gltf::image::Source::Uri { uri, .. } => external.get(uri).map(Vec::as_slice),
    };
    let Some(bytes) = bytes else {
        log::warn!("Image {} has no data and is ignored", image.index());
        return None;
    };
    image::load_from_memory(bytes)
        .inspect_err(|e| log::warn!("Image {} could not be decoded: {}", image.index(), e))
        .ok()
}

/// Reflectivity of a physical material with the given index of refraction.
pub fn reflectivity_from_ior(ior: f32) -> f32 {
    (2.5 * (ior - 1.0) / (ior + 1.0)).clamp(0.0, 1.0)
}

/**
 * Maps a glTF material onto [`StandardParams`].
 *
 * Unlit materials expose reflectivity and refraction ratio, physical ones
 * (IOR, transmission, specular, volume, clearcoat, sheen, iridescence,
 * anisotropy or dispersion extension) reflectivity and transmission, plain
 * metallic-roughness materials none of the three.
 */
pub fn standard_params(material: &gltf::Material) -> StandardParams {
    let pbr = material.pbr_metallic_roughness();
    let alpha_mode = match material.alpha_mode() {
        gltf::material::AlphaMode::Opaque => AlphaMode::Opaque,
        gltf::material::AlphaMode::Mask => AlphaMode::Mask(material.alpha_cutoff().unwrap_or(0.5)),
        gltf::material::AlphaMode::Blend => AlphaMode::Blend,
    };
    let unlit = material.unlit();
    let ior = material.ior();
    let transmission = material.transmission().map(|t| t.transmission_factor());
    let physical = ior.is_some()
        || transmission.is_some()
        || material.specular().is_some()
        || material.volume().is_some()
        || PHYSICAL_EXTENSIONS
            .iter()
            .any(|name| material.extension_value(name).is_some());

    let mut params = StandardParams {
        base_color: pbr.base_color_factor(),
        alpha_mode,
        double_sided: material.double_sided(),
        unlit,
        ..Default::default()
    };
    if unlit {
        params.reflectivity = Some(UNLIT_REFLECTIVITY);
        params.refraction_ratio = Some(UNLIT_REFRACTION_RATIO);
    } else if physical {
        params.reflectivity = Some(reflectivity_from_ior(ior.unwrap_or(DEFAULT_IOR)));
        params.transmission = Some(transmission.unwrap_or(0.0));
    }
    params
}

fn standard_material(
    material: &gltf::Material,
    images: &[Option<image::DynamicImage>],
) -> StandardMaterial {
    let base_color_image = material
        .pbr_metallic_roughness()
        .base_color_texture()
        .and_then(|info| images.get(info.texture().source().index()).cloned().flatten());
    let name = material
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("material_{}", material.index().unwrap_or_default()));
    StandardMaterial::new(name, standard_params(material), base_color_image)
}

struct NodeLoader<'a> {
    buffers: &'a [Vec<u8>],
    materials: &'a [Rc<StandardMaterial>],
    // Meshes used by several nodes share their geometry
    meshes: HashMap<usize, Vec<Primitive>>,
    default_material: Option<Rc<StandardMaterial>>,
}

impl NodeLoader<'_> {
    fn to_scene_node(&mut self, node: &gltf::Node) -> Box<dyn SceneNode> {
        let (translation, rotation, scale) = node.transform().decomposed();
        let local = Instance {
            position: translation.into(),
            rotation: cgmath::Quaternion::new(rotation[3], rotation[0], rotation[1], rotation[2]),
            scale: scale.into(),
        };
        let children: Vec<Box<dyn SceneNode>> = node
            .children()
            .map(|child| self.to_scene_node(&child))
            .collect();

        match node.mesh() {
            Some(mesh) if mesh.primitives().len() > 1 => {
                // One mesh per primitive, named after the glTF mesh, grouped under the node
                let mesh_name = mesh
                    .name()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("mesh_{}", mesh.index()));
                let parts = self
                    .primitives(&mesh)
                    .into_iter()
                    .enumerate()
                    .map(|(i, primitive)| {
                        let name = match i {
                            0 => mesh_name.clone(),
                            i => format!("{}_{}", mesh_name, i),
                        };
                        Box::new(ModelNode::new(name, Instance::new(), vec![primitive]))
                            as Box<dyn SceneNode>
                    });
                let children: Vec<Box<dyn SceneNode>> = parts.chain(children).collect();
                Box::new(
                    ContainerNode::new(node.name().unwrap_or_default(), local)
                        .with_children(children),
                )
            }
            Some(mesh) => {
                let name = node.name().or(mesh.name()).unwrap_or_default();
                let primitives = self.primitives(&mesh);
                Box::new(ModelNode::new(name, local, primitives).with_children(children))
            }
            None => Box::new(
                ContainerNode::new(node.name().unwrap_or_default(), local).with_children(children),
            ),
        }
    }

    fn primitives(&mut self, mesh: &gltf::Mesh) -> Vec<Primitive> {
        if let Some(primitives) = self.meshes.get(&mesh.index()) {
            return primitives.clone();
        }
        let mesh_name = mesh.name().unwrap_or("unknown_mesh");
        let primitives: Vec<Primitive> = mesh
            .primitives()
            .filter_map(|primitive| {
                let geometry = read_geometry(mesh_name, &primitive, self.buffers)
                    .inspect_err(|e| {
                        log::warn!(
                            "Primitive {} of mesh {} is skipped: {}",
                            primitive.index(),
                            mesh_name,
                            e
                        )
                    })
                    .ok()?;
                let material = match primitive.material().index() {
                    Some(index) => self.materials.get(index).cloned(),
                    None => Some(self.default_material()),
                };
                Some(Primitive::new(
                    Rc::new(geometry),
                    material.map(MaterialRef::from),
                ))
            })
            .collect();
        self.meshes.insert(mesh.index(), primitives.clone());
        primitives
    }

    /// Shared by every primitive without a material.
    fn default_material(&mut self) -> Rc<StandardMaterial> {
        self.default_material
            .get_or_insert_with(|| {
                Rc::new(StandardMaterial::new("default", StandardParams::default(), None))
            })
            .clone()
    }
}

fn read_geometry(
    name: &str,
    primitive: &gltf::Primitive,
    buffers: &[Vec<u8>],
) -> anyhow::Result<Geometry> {
    if primitive.mode() != gltf::mesh::Mode::Triangles {
        bail!("only triangle lists are supported, found {:?}", primitive.mode());
    }
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

    let mut vertices: Vec<ModelVertex> = reader
        .read_positions()
        .context("no vertex positions")?
        .map(|position| ModelVertex {
            position,
            ..Default::default()
        })
        .collect();
    if let Some(tex_coords) = reader.read_tex_coords(0) {
        vertices
            .iter_mut()
            .zip(tex_coords.into_f32())
            .for_each(|(vertex, tex_coords)| vertex.tex_coords = tex_coords);
    }
    let indices = reader
        .read_indices()
        .map(|indices| indices.into_u32().collect::<Vec<u32>>());
    if let Some(indices) = &indices {
        if let Some(out_of_range) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            bail!("index {} exceeds {} vertices", out_of_range, vertices.len());
        }
    }

    let geometry_name = format!("{}#{}", name, primitive.index());
    let mut geometry = Geometry::new(geometry_name, vertices, indices);
    match reader.read_normals() {
        Some(normals) => geometry
            .vertices
            .iter_mut()
            .zip(normals)
            .for_each(|(vertex, normal)| vertex.normal = normal),
        None => compute_normals(&mut geometry),
    }
    Ok(geometry)
}

/// Smooth normals from the triangle faces, for geometry that ships without normals.
pub fn compute_normals(geometry: &mut Geometry) {
    let mut normals = vec![cgmath::Vector3::new(0.0f32, 0.0, 0.0); geometry.vertices.len()];
    for triangle in geometry.indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        let pa: cgmath::Vector3<f32> = geometry.vertices[a].position.into();
        let pb: cgmath::Vector3<f32> = geometry.vertices[b].position.into();
        let pc: cgmath::Vector3<f32> = geometry.vertices[c].position.into();
        let face = (pb - pa).cross(pc - pa);
        for index in [a, b, c] {
            normals[index] += face;
        }
    }
    for (vertex, normal) in geometry.vertices.iter_mut().zip(normals) {
        if normal.magnitude2() > 0.0 {
            vertex.normal = normal.normalize().into();
        }
    }
}
