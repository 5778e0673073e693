//! glTF model import.
//!
//! Flattens the default scene into world-space triangle lists, one per mesh
//! primitive, keeping each primitive's base colour factor and base colour
//! texture. Other material channels are ignored; the mesh pass only does
//! diffuse lighting.

use std::path::Path;

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3};

use crate::error::AssetError;
use crate::textures::TextureData;

/// Interleaved vertex uploaded to the mesh pipeline.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// One drawable primitive in world space.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshPrimitive {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u32>,
    /// Linear RGBA multiplier.
    pub base_colour: [f32; 4],
    /// Index into [`ModelData::textures`].
    pub texture: Option<usize>,
}

/// A whole imported model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelData {
    pub primitives: Vec<MeshPrimitive>,
    /// Images referenced by primitives, converted to RGBA8. `None` for
    /// pixel formats the renderer does not handle.
    pub textures: Vec<Option<TextureData>>,
}

impl ModelData {
    /// Import a `.gltf` or `.glb` file with its external buffers and images.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let (document, buffers, images) = gltf::import(path)?;
        let model = Self::from_gltf(&document, &buffers, &images);
        if model.primitives.is_empty() {
            return Err(AssetError::EmptyModel(path.to_path_buf()));
        }
        log::info!(
            "loaded model {} ({} primitives, {} triangles)",
            path.display(),
            model.primitives.len(),
            model.triangle_count()
        );
        Ok(model)
    }

    /// Import a self-contained glTF/GLB held in memory.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, AssetError> {
        let (document, buffers, images) = gltf::import_slice(bytes)?;
        Ok(Self::from_gltf(&document, &buffers, &images))
    }

    fn from_gltf(
        document: &gltf::Document,
        buffers: &[gltf::buffer::Data],
        images: &[gltf::image::Data],
    ) -> Self {
        let mut model = ModelData {
            primitives: Vec::new(),
            textures: images.iter().map(convert_image).collect(),
        };

        let scene = document.default_scene().or_else(|| document.scenes().next());
        match scene {
            Some(scene) => {
                for node in scene.nodes() {
                    model.visit_node(&node, Mat4::IDENTITY, buffers);
                }
            }
            None => log::warn!("glTF document has no scenes"),
        }
        model
    }

    fn visit_node(&mut self, node: &gltf::Node, parent: Mat4, buffers: &[gltf::buffer::Data]) {
        let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
        if let Some(mesh) = node.mesh() {
            for primitive in mesh.primitives() {
                if let Some(p) = read_primitive(&primitive, world, buffers) {
                    self.primitives.push(p);
                }
            }
        }
        for child in node.children() {
            self.visit_node(&child, world, buffers);
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.primitives.iter().map(|p| p.indices.len() / 3).sum()
    }

    /// Axis-aligned bounds over every vertex, `None` if empty.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self
            .primitives
            .iter()
            .flat_map(|p| p.vertices.iter())
            .map(|v| Vec3::from_array(v.position));
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }
}

fn read_primitive(
    primitive: &gltf::Primitive,
    world: Mat4,
    buffers: &[gltf::buffer::Data],
) -> Option<MeshPrimitive> {
    if primitive.mode() != gltf::mesh::Mode::Triangles {
        log::debug!("skipping non-triangle primitive ({:?})", primitive.mode());
        return None;
    }

    let reader = primitive.reader(|buf| buffers.get(buf.index()).map(|d| &d.0[..]));
    let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
    if positions.is_empty() {
        return None;
    }
    let indices: Vec<u32> = match reader.read_indices() {
        Some(it) => it.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };
    if indices.len() < 3 {
        return None;
    }
    let normals: Vec<[f32; 3]> = match reader.read_normals() {
        Some(it) => it.collect(),
        None => smooth_normals(&positions, &indices),
    };

    let material = primitive.material();
    let pbr = material.pbr_metallic_roughness();
    let (texture, tex_coord_set) = match pbr.base_color_texture() {
        Some(info) => (Some(info.texture().source().index()), info.tex_coord()),
        None => (None, 0),
    };
    let uvs: Vec<[f32; 2]> = reader
        .read_tex_coords(tex_coord_set)
        .map(|tc| tc.into_f32().collect())
        .unwrap_or_default();

    let normal_matrix = Mat3::from_mat4(world).inverse().transpose();
    let vertices = positions
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let n = normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]);
            MeshVertex {
                position: world.transform_point3(Vec3::from_array(*p)).to_array(),
                normal: (normal_matrix * Vec3::from_array(n))
                    .normalize_or_zero()
                    .to_array(),
                uv: uvs.get(i).copied().unwrap_or([0.0, 0.0]),
            }
        })
        .collect();

    Some(MeshPrimitive {
        vertices,
        indices,
        base_colour: pbr.base_color_factor(),
        texture,
    })
}

/// Area-weighted vertex normals for meshes that ship without them.
pub fn smooth_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let (Some(pa), Some(pb), Some(pc)) = (positions.get(a), positions.get(b), positions.get(c))
        else {
            continue;
        };
        let (pa, pb, pc) = (Vec3::from_array(*pa), Vec3::from_array(*pb), Vec3::from_array(*pc));
        let face = (pb - pa).cross(pc - pa);
        acc[a] += face;
        acc[b] += face;
        acc[c] += face;
    }
    acc.into_iter()
        .map(|n| {
            let n = n.normalize_or_zero();
            let n = if n == Vec3::ZERO { Vec3::Y } else { n };
            n.to_array()
        })
        .collect()
}

fn convert_image(image: &gltf::image::Data) -> Option<TextureData> {
    use gltf::image::Format;

    let pixels = &image.pixels;
    let data: Vec<u8> = match image.format {
        Format::R8G8B8A8 => pixels.clone(),
        Format::R8G8B8 => pixels
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        Format::R8G8 => pixels
            .chunks_exact(2)
            .flat_map(|p| [p[0], p[0], p[0], p[1]])
            .collect(),
        Format::R8 => pixels.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        other => {
            log::warn!("unsupported glTF image format {:?}, texture ignored", other);
            return None;
        }
    };
    Some(TextureData::from_rgba(data, image.width, image.height))
}
