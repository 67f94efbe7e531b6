//! Window output: draws the material onto a winit window surface.

use crate::gpu_context::GpuContext;
use crate::material::{fit_transform, MaterialRenderer, VideoTextureMaterial};
use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use winit::dpi::PhysicalSize;
use winit::window::Window;

/// Handles window rendering state.
pub struct WindowRenderer {
    gpu: GpuContext,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    material_renderer: MaterialRenderer,
    content_size: Option<(u32, u32)>,
}

impl WindowRenderer {
    /// Creates a new window renderer.
    pub fn new(window: Arc<Window>) -> Result<Self> {
        let (gpu, surface) = GpuContext::for_window(&window)?;
        let size = window.inner_size();
        let config = gpu.surface_config(&surface, size.width, size.height)?;
        surface.configure(&gpu.device, &config);
        info!("Surface configured: {:?} {}x{}", config.format, config.width, config.height);

        let material_renderer = MaterialRenderer::new(&gpu.device, &gpu.queue, config.format);

        Ok(Self {
            gpu,
            surface,
            config,
            material_renderer,
            content_size: None,
        })
    }

    /// Device and queue, for creating textures the material can bind.
    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    /// Size of the bound video frame; the quad is letterboxed to it.
    pub fn set_content_size(&mut self, width: u32, height: u32) {
        self.content_size = Some((width, height));
        self.update_transform();
    }

    /// Resizes the surface.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.gpu.device, &self.config);
            self.update_transform();
        }
    }

    /// Renders one frame of `material` to the window.
    pub fn render(&mut self, material: &VideoTextureMaterial<wgpu::TextureView>) -> Result<()> {
        self.material_renderer
            .prepare(&self.gpu.device, &self.gpu.queue, material);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Window Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Window Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            self.material_renderer.draw(&mut render_pass);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn update_transform(&self) {
        let viewport = (self.config.width, self.config.height);
        let content = self.content_size.unwrap_or(viewport);
        self.material_renderer
            .set_transform(&self.gpu.queue, fit_transform(content, viewport));
    }
}
