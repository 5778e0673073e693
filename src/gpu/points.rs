//! Point-sprite pass for the particle system.
//!
//! Each attribute stream gets its own instance-rate vertex buffer, mirroring
//! the CPU-side [`AttributeBuffers`]. Every particle is drawn as a six-vertex
//! quad expanded in the vertex shader, textured with the sprite and tinted by
//! the particle colour. Depth is tested but not written so sprites never
//! occlude each other; correct overlap comes from the back-to-front sort.

use crate::buffers::{AttributeBuffer, AttributeBuffers};
use crate::shader::POINTS_SOURCE;
use crate::textures::TextureData;
use crate::visuals::BlendMode;

use super::texture::{create_sampler, texture_layout_entries, upload_texture, DEPTH_FORMAT};

/// Smallest buffer allocation, in particles.
const MIN_CAPACITY: usize = 16;

const POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
const SIZE_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32];
const COLOUR_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32x4];

/// One GPU vertex buffer backing an [`AttributeBuffer`].
struct AttributeStream {
    buffer: wgpu::Buffer,
    /// Capacity in particles.
    capacity: usize,
    item_size: usize,
    label: String,
}

impl AttributeStream {
    fn new(device: &wgpu::Device, attr: &AttributeBuffer, capacity: usize) -> Self {
        let label = stream_label(attr);
        let item_size = attr.item_size();
        let buffer = Self::allocate(device, &label, item_size, capacity);
        Self {
            buffer,
            capacity,
            item_size,
            label,
        }
    }

    fn allocate(device: &wgpu::Device, label: &str, item_size: usize, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: (capacity * item_size * std::mem::size_of::<f32>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Copy dirty data to the GPU, growing the buffer if needed.
    fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, attr: &mut AttributeBuffer) {
        let count = attr.count();
        let Some(data) = attr.take_update() else {
            return;
        };
        if count > self.capacity {
            self.capacity = count.next_power_of_two();
            self.buffer = Self::allocate(device, &self.label, self.item_size, self.capacity);
            log::debug!("{} grown to {} particles", self.label, self.capacity);
        }
        if !data.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(data));
        }
    }
}

/// Renders the published particle buffers as textured point sprites.
pub struct PointRenderer {
    pipeline: wgpu::RenderPipeline,
    sprite_bind_group: wgpu::BindGroup,
    position: AttributeStream,
    size: AttributeStream,
    colour: AttributeStream,
    instance_count: u32,
}

impl PointRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        frame_layout: &wgpu::BindGroupLayout,
        surface_format: wgpu::TextureFormat,
        sample_count: u32,
        sprite: &TextureData,
        blend: BlendMode,
        buffers: &AttributeBuffers,
    ) -> Self {
        let sprite_view = upload_texture(device, queue, sprite, "Sprite Texture");
        let sampler = create_sampler(device, "Sprite Sampler");

        let sprite_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Sprite Bind Group Layout"),
            entries: &texture_layout_entries(0, wgpu::TextureViewDimension::D2),
        });

        let sprite_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sprite Bind Group"),
            layout: &sprite_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&sprite_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Point Sprite Shader"),
            source: wgpu::ShaderSource::Wgsl(POINTS_SOURCE.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Point Sprite Pipeline Layout"),
            bind_group_layouts: &[frame_layout, &sprite_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Point Sprite Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[
                    instance_layout(AttributeBuffers::POSITION_STRIDE, &POSITION_ATTRIBUTES),
                    instance_layout(AttributeBuffers::SIZE_STRIDE, &SIZE_ATTRIBUTES),
                    instance_layout(AttributeBuffers::COLOUR_STRIDE, &COLOUR_ATTRIBUTES),
                ],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(blend.to_wgpu()),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
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

        Self {
            pipeline,
            sprite_bind_group,
            position: AttributeStream::new(device, &buffers.position, MIN_CAPACITY),
            size: AttributeStream::new(device, &buffers.size, MIN_CAPACITY),
            colour: AttributeStream::new(device, &buffers.colour, MIN_CAPACITY),
            instance_count: 0,
        }
    }

    /// Push any republished attribute streams to the GPU.
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, buffers: &mut AttributeBuffers) {
        self.instance_count = buffers.len() as u32;
        self.position.upload(device, queue, &mut buffers.position);
        self.size.upload(device, queue, &mut buffers.size);
        self.colour.upload(device, queue, &mut buffers.colour);
    }

    /// Record the draw. Must come after opaque geometry.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, frame_bind_group: &wgpu::BindGroup) {
        if self.instance_count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, frame_bind_group, &[]);
        pass.set_bind_group(1, &self.sprite_bind_group, &[]);
        pass.set_vertex_buffer(0, self.position.buffer.slice(..));
        pass.set_vertex_buffer(1, self.size.buffer.slice(..));
        pass.set_vertex_buffer(2, self.colour.buffer.slice(..));
        pass.draw(0..6, 0..self.instance_count);
    }
}

fn stream_label(attr: &AttributeBuffer) -> String {
    format!("Particle {} Buffer", attr.name())
}

fn instance_layout(
    item_size: usize,
    attributes: &'static [wgpu::VertexAttribute],
) -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: (item_size * std::mem::size_of::<f32>()) as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes,
    }
}
