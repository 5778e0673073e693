//! GPU state and frame rendering.
//!
//! [`Renderer`] owns the surface, device and the shared frame uniforms, plus
//! one sub-renderer per pass. A frame draws the skybox, then the model, then
//! the sorted particle sprites into a single render pass.

mod mesh;
mod points;
mod skybox;
mod texture;

use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::error::GpuError;
use crate::scene::{Scene, SceneAssets};
use crate::shader::FrameUniforms;

use mesh::MeshRenderer;
use points::PointRenderer;
use skybox::SkyboxRenderer;
use texture::{create_depth_texture, create_msaa_target, DEPTH_FORMAT};

/// Background when no skybox could be loaded.
const CLEAR_COLOUR: wgpu::Color = wgpu::Color::BLACK;

pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    sample_count: u32,
    msaa_view: Option<wgpu::TextureView>,
    depth_view: wgpu::TextureView,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    points: PointRenderer,
    skybox: Option<SkyboxRenderer>,
    mesh: Option<MeshRenderer>,
}

impl Renderer {
    /// `sample_count` is the requested MSAA level; it drops to 1 when the
    /// adapter cannot multisample the surface or depth format at that count.
    pub async fn new(
        window: Arc<Window>,
        scene: &Scene,
        assets: &SceneAssets,
        sample_count: u32,
    ) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;
        log::info!("using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format =
            pick_surface_format(&surface_caps.formats).ok_or(GpuError::NoSurfaceFormat)?;
        if surface_format.is_srgb() {
            log::warn!("no linear surface format available, output will be sRGB encoded");
        }
        let requested_samples = sample_count;
        let sample_count = resolve_sample_count(requested_samples, |count| {
            [surface_format, DEPTH_FORMAT].iter().all(|&format| {
                adapter
                    .get_texture_format_features(format)
                    .flags
                    .sample_count_supported(count)
            })
        });
        if sample_count != requested_samples {
            log::warn!("{}x msaa unsupported, rendering without antialiasing", requested_samples);
        }
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_view = create_depth_texture(&device, &config, sample_count);
        let msaa_view = create_msaa_target(&device, &config, sample_count);

        let uniforms = FrameUniforms::new(&scene.camera, &scene.lighting, config.width, config.height, 0.0);
        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Frame Uniform Buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let points = PointRenderer::new(
            &device,
            &queue,
            &frame_layout,
            surface_format,
            sample_count,
            &assets.sprite,
            scene.blend,
            scene.particles().buffers(),
        );
        let skybox = assets
            .skybox
            .as_ref()
            .map(|cube| {
                SkyboxRenderer::new(&device, &queue, &frame_layout, surface_format, sample_count, cube)
            });
        let mesh = assets
            .model
            .as_ref()
            .map(|model| {
                MeshRenderer::new(&device, &queue, &frame_layout, surface_format, sample_count, model)
            });

        log::info!(
            "renderer ready: {}x{} {:?} {}x msaa, skybox={}, model={}",
            config.width,
            config.height,
            surface_format,
            sample_count,
            skybox.is_some(),
            mesh.is_some()
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            sample_count,
            msaa_view,
            depth_view,
            frame_buffer,
            frame_bind_group,
            points,
            skybox,
            mesh,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_texture(&self.device, &self.config, self.sample_count);
            self.msaa_view = create_msaa_target(&self.device, &self.config, self.sample_count);
        }
    }

    /// Reconfigure the surface at its current size after it was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Upload this frame's uniforms and particle buffers, then draw.
    pub fn render(&mut self, scene: &mut Scene, elapsed: f32) -> Result<(), wgpu::SurfaceError> {
        let uniforms = FrameUniforms::new(
            &scene.camera,
            &scene.lighting,
            self.config.width,
            self.config.height,
            elapsed,
        );
        self.queue
            .write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&uniforms));
        self.points
            .upload(&self.device, &self.queue, scene.particles_mut().buffers_mut());

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        // With MSAA the pass draws into the multisampled target and resolves
        // into the swapchain image.
        let (target, resolve_target) = match &self.msaa_view {
            Some(msaa) => (msaa, Some(&view)),
            None => (&view, None),
        };

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOUR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(skybox) = &self.skybox {
                skybox.draw(&mut pass, &self.frame_bind_group);
            }
            if let Some(mesh) = &self.mesh {
                mesh.draw(&mut pass, &self.frame_bind_group);
            }
            self.points.draw(&mut pass, &self.frame_bind_group);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

/// Prefer a linear (non-sRGB) swapchain format so colours reach the screen
/// exactly as shaded.
fn pick_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .find(|f| !f.is_srgb())
        .or_else(|| formats.first())
        .copied()
}

fn resolve_sample_count(requested: u32, supported: impl Fn(u32) -> bool) -> u32 {
    if requested > 1 && supported(requested) {
        requested
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::TextureFormat;

    #[test]
    fn test_surface_format_prefers_linear() {
        let formats = [TextureFormat::Bgra8UnormSrgb, TextureFormat::Bgra8Unorm];
        assert_eq!(pick_surface_format(&formats), Some(TextureFormat::Bgra8Unorm));
    }

    #[test]
    fn test_surface_format_falls_back_to_srgb() {
        let formats = [TextureFormat::Rgba8UnormSrgb];
        assert_eq!(pick_surface_format(&formats), Some(TextureFormat::Rgba8UnormSrgb));
    }

    #[test]
    fn test_no_surface_formats() {
        assert_eq!(pick_surface_format(&[]), None);
    }

    #[test]
    fn test_sample_count_resolution() {
        assert_eq!(resolve_sample_count(4, |_| true), 4);
        assert_eq!(resolve_sample_count(4, |_| false), 1);
        assert_eq!(resolve_sample_count(1, |_| true), 1);
    }
}
