//! Lit model pass.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::model::{MeshVertex, ModelData};
use crate::shader::MESH_SOURCE;
use crate::textures::TextureData;

use super::texture::{create_sampler, texture_layout_entries, upload_texture, DEPTH_FORMAT};

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 3] =
    wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct MaterialUniforms {
    base_colour: [f32; 4],
}

struct GpuPrimitive {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    material: wgpu::BindGroup,
}

/// Opaque glTF geometry shaded with the scene lights.
pub struct MeshRenderer {
    pipeline: wgpu::RenderPipeline,
    primitives: Vec<GpuPrimitive>,
}

impl MeshRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        frame_layout: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
        sample_count: u32,
        model: &ModelData,
    ) -> Self {
        let [texture_entry, sampler_entry] =
            texture_layout_entries(1, wgpu::TextureViewDimension::D2);
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                texture_entry,
                sampler_entry,
            ],
        });

        let sampler = create_sampler(device, "Material Sampler");
        let white = upload_texture(
            device,
            queue,
            &TextureData::from_rgba(vec![255; 4], 1, 1),
            "White Texture",
        );
        let textures: Vec<Option<wgpu::TextureView>> = model
            .textures
            .iter()
            .enumerate()
            .map(|(i, tex)| {
                tex.as_ref()
                    .map(|t| upload_texture(device, queue, t, &format!("Model Texture {}", i)))
            })
            .collect();

        let primitives = model
            .primitives
            .iter()
            .enumerate()
            .map(|(i, prim)| {
                let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("Mesh {} Vertex Buffer", i)),
                    contents: bytemuck::cast_slice(&prim.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("Mesh {} Index Buffer", i)),
                    contents: bytemuck::cast_slice(&prim.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
                let material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("Mesh {} Material", i)),
                    contents: bytemuck::bytes_of(&MaterialUniforms {
                        base_colour: prim.base_colour,
                    }),
                    usage: wgpu::BufferUsages::UNIFORM,
                });
                let view = prim
                    .texture
                    .and_then(|t| textures.get(t))
                    .and_then(Option::as_ref)
                    .unwrap_or(&white);
                let material = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("Mesh {} Material Bind Group", i)),
                    layout: &material_layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: material_buffer.as_entire_binding(),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(view),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: wgpu::BindingResource::Sampler(&sampler),
                        },
                    ],
                });
                GpuPrimitive {
                    vertex_buffer,
                    index_buffer,
                    index_count: prim.indices.len() as u32,
                    material,
                }
            })
            .collect();

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(MESH_SOURCE.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Mesh Pipeline Layout"),
            bind_group_layouts: &[frame_layout, &material_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Mesh Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &VERTEX_ATTRIBUTES,
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            // Materials may be double-sided.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: sample_count,
                ..Default::default()
            },
            multiview: None,
            cache: None,
        });

        Self { pipeline, primitives }
    }

    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, frame_bind_group: &wgpu::BindGroup) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, frame_bind_group, &[]);
        for prim in &self.primitives {
            pass.set_bind_group(1, &prim.material, &[]);
            pass.set_vertex_buffer(0, prim.vertex_buffer.slice(..));
            pass.set_index_buffer(prim.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..prim.index_count, 0, 0..1);
        }
    }
}
