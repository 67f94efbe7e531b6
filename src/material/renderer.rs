//! wgpu side of the video texture material.

use super::VideoTextureMaterial;
use crate::frame::QuadVertex;
use crate::shader::{MaterialUniforms, TransformUniforms, FRAGMENT_SHADER, VERTEX_SHADER};
use glam::{Mat4, Vec3};
use std::borrow::Cow;
use tracing::debug;
use wgpu::util::DeviceExt;

/// Owns the pipeline, uniform buffers and bind group for one material.
///
/// Call [`MaterialRenderer::prepare`] before [`MaterialRenderer::draw`] each
/// frame so the GPU sees the material's current state.
pub struct MaterialRenderer {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    transform_buffer: wgpu::Buffer,
    material_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,
    // Bound while the material has no texture
    fallback_view: wgpu::TextureView,
    bind_group: Option<wgpu::BindGroup>,
    uploaded_uniform_revision: Option<u64>,
    bound_texture_revision: Option<u64>,
}

impl MaterialRenderer {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, target_format: wgpu::TextureFormat) -> Self {
        let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Material Vertex Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(VERTEX_SHADER)),
        });

        let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Material Fragment Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(FRAGMENT_SHADER)),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Material Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Material Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some("vs_main"),
                buffers: &[QuadVertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: target_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material Vertex Buffer"),
            contents: bytemuck::cast_slice(QuadVertex::VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material Index Buffer"),
            contents: bytemuck::cast_slice(QuadVertex::INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        let transform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material Transform Buffer"),
            contents: bytemuck::bytes_of(&TransformUniforms::new(Mat4::IDENTITY)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Material Uniform Buffer"),
            contents: bytemuck::bytes_of(&MaterialUniforms::new(1.0)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Material Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let fallback_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Material Fallback Texture"),
            size: wgpu::Extent3d { width: 1, height: 1, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &fallback_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &[0, 0, 0, 255],
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4),
                rows_per_image: Some(1),
            },
            wgpu::Extent3d { width: 1, height: 1, depth_or_array_layers: 1 },
        );

        Self {
            pipeline,
            bind_group_layout,
            vertex_buffer,
            index_buffer,
            transform_buffer,
            material_buffer,
            sampler,
            fallback_view: fallback_texture.create_view(&wgpu::TextureViewDescriptor::default()),
            bind_group: None,
            uploaded_uniform_revision: None,
            bound_texture_revision: None,
        }
    }

    pub fn set_transform(&self, queue: &wgpu::Queue, matrix: Mat4) {
        queue.write_buffer(&self.transform_buffer, 0, bytemuck::bytes_of(&TransformUniforms::new(matrix)));
    }

    /// Push the material's uniform block and texture binding to the GPU if
    /// either changed since the last call.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        material: &VideoTextureMaterial<wgpu::TextureView>,
    ) {
        let uniform_revision = material.uniform_revision();
        if self.uploaded_uniform_revision != Some(uniform_revision) {
            queue.write_buffer(&self.material_buffer, 0, bytemuck::bytes_of(material.uniforms()));
            self.uploaded_uniform_revision = Some(uniform_revision);
        }

        let texture_revision = material.texture_revision();
        if self.bind_group.is_none() || self.bound_texture_revision != Some(texture_revision) {
            let view = match material.texture() {
                Some(view) => view,
                None => {
                    debug!("Material has no texture, binding fallback");
                    &self.fallback_view
                }
            };

            self.bind_group = Some(device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("Material Bind Group"),
                layout: &self.bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry { binding: 0, resource: self.transform_buffer.as_entire_binding() },
                    wgpu::BindGroupEntry { binding: 1, resource: self.material_buffer.as_entire_binding() },
                    wgpu::BindGroupEntry { binding: 2, resource: wgpu::BindingResource::TextureView(view) },
                    wgpu::BindGroupEntry { binding: 3, resource: wgpu::BindingResource::Sampler(&self.sampler) },
                ],
            }));
            self.bound_texture_revision = Some(texture_revision);
        }
    }

    /// Record the quad draw. Does nothing before the first `prepare`.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        let Some(bind_group) = &self.bind_group else {
            return;
        };
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        render_pass.draw_indexed(0..QuadVertex::INDICES.len() as u32, 0, 0..1);
    }
}

/// Scale that letterboxes `content` inside `viewport`, keeping its aspect ratio.
pub fn fit_transform(content: (u32, u32), viewport: (u32, u32)) -> Mat4 {
    let content_aspect = content.0 as f32 / content.1.max(1) as f32;
    let viewport_aspect = viewport.0 as f32 / viewport.1.max(1) as f32;
    let (sx, sy) = if content_aspect > viewport_aspect {
        (1.0, viewport_aspect / content_aspect)
    } else {
        (content_aspect / viewport_aspect, 1.0)
    };
    Mat4::from_scale(Vec3::new(sx, sy, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn test_fit_same_aspect_is_identity() {
        assert_eq!(fit_transform((1920, 1080), (1280, 720)), Mat4::IDENTITY);
    }

    #[test]
    fn test_fit_wide_content_letterboxes() {
        let m = fit_transform((200, 100), (100, 100));
        let corner = m * Vec4::new(1.0, 1.0, 0.0, 1.0);
        assert!((corner.x - 1.0).abs() < 1e-6);
        assert!((corner.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_fit_tall_content_pillarboxes() {
        let m = fit_transform((100, 200), (100, 100));
        let corner = m * Vec4::new(1.0, 1.0, 0.0, 1.0);
        assert!((corner.x - 0.5).abs() < 1e-6);
        assert!((corner.y - 1.0).abs() < 1e-6);
    }
}
