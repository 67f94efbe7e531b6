//! Frame data handed to the video texture, and the quad it is drawn on.

use crate::error::{Error, Result};
use bytemuck::{Pod, Zeroable};
use std::path::Path;

/// An RGBA8 frame.
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Tightly packed RGBA pixels, row major
    pub data: Vec<u8>,
}

impl VideoFrame {
    pub fn from_data(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data,
        }
    }

    /// A frame filled with one color.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let data = rgba.repeat((width as usize) * (height as usize));
        Self::from_data(width, height, data)
    }

    /// Checkerboard with a horizontal gradient, used when no image is given.
    pub fn test_card(width: u32, height: u32) -> Self {
        const CELL: u32 = 64;
        let mut data = Vec::with_capacity((width as usize) * (height as usize) * 4);
        for y in 0..height {
            for x in 0..width {
                let shade = (x * 255 / width.max(1)) as u8;
                if (x / CELL + y / CELL) % 2 == 0 {
                    data.extend_from_slice(&[shade, 255 - shade, 64, 255]);
                } else {
                    data.extend_from_slice(&[32, 32, 32, 255]);
                }
            }
        }
        Self::from_data(width, height, data)
    }

    /// Decode an image file into a frame.
    pub fn from_image(path: &Path) -> Result<Self> {
        let rgba = image::open(path)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        tracing::debug!("Loaded {:?} ({}x{})", path, width, height);
        Ok(Self::from_data(width, height, rgba.into_raw()))
    }

    /// RGBA of the pixel at (x, y).
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        self.data.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }

    /// Scale down so neither side exceeds `max_dimension`, keeping the
    /// aspect ratio. Frames already within the limit are returned as is.
    pub fn scale_to_fit(self, max_dimension: u32) -> Result<Self> {
        let longest = self.width.max(self.height);
        if longest <= max_dimension {
            return Ok(self);
        }

        let scale = max_dimension as f32 / longest as f32;
        let new_width = ((self.width as f32 * scale) as u32).clamp(1, max_dimension);
        let new_height = ((self.height as f32 * scale) as u32).clamp(1, max_dimension);

        let (width, height, len) = (self.width, self.height, self.data.len());
        let img = image::RgbaImage::from_raw(width, height, self.data)
            .ok_or(Error::FrameDataLength { width, height, len })?;
        let resized = image::imageops::resize(
            &img,
            new_width,
            new_height,
            image::imageops::FilterType::Triangle,
        );
        tracing::info!(
            "Scaled frame {}x{} -> {}x{} to fit texture limit {}",
            width,
            height,
            new_width,
            new_height,
            max_dimension
        );
        Ok(Self::from_data(new_width, new_height, resized.into_raw()))
    }
}

/// Vertex of the quad the material is drawn on.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
    pub tex_coords: [f32; 2],
}

impl QuadVertex {
    /// Unit quad spanning clip space before the transform is applied.
    pub const VERTICES: &'static [QuadVertex] = &[
        QuadVertex { position: [-1.0, -1.0], tex_coords: [0.0, 1.0] },
        QuadVertex { position: [1.0, -1.0], tex_coords: [1.0, 1.0] },
        QuadVertex { position: [1.0, 1.0], tex_coords: [1.0, 0.0] },
        QuadVertex { position: [-1.0, 1.0], tex_coords: [0.0, 0.0] },
    ];

    /// Indices for the quad (two triangles).
    pub const INDICES: &'static [u16] = &[0, 1, 2, 2, 3, 0];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}
