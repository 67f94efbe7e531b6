//! GPU texture the video frames are written into.
//!
//! The texture is owned here, not by the material: the material only gets a
//! view of it, and frame uploads never touch the material.
//!
//! Frames hold display-encoded bytes and are stored as `Rgba8Unorm`, so the
//! shader mixes them with the placeholder without an sRGB decode.

use crate::error::{Error, Result};
use crate::frame::VideoFrame;

pub struct VideoTexture {
    texture: wgpu::Texture,
    width: u32,
    height: u32,
}

/// Rejects sizes wgpu would panic on: zero sides or sides above the
/// device's `max_texture_dimension_2d`.
pub fn check_texture_size(width: u32, height: u32, max: u32) -> Result<()> {
    if width == 0 || height == 0 || width > max || height > max {
        return Err(Error::InvalidTextureSize { width, height, max });
    }
    Ok(())
}

impl VideoTexture {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Result<Self> {
        check_texture_size(width, height, device.limits().max_texture_dimension_2d)?;

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Video Texture"),
            size: wgpu::Extent3d { width, height, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        Ok(Self { texture, width, height })
    }

    /// Create a texture sized to `frame` and upload it.
    pub fn from_frame(device: &wgpu::Device, queue: &wgpu::Queue, frame: &VideoFrame) -> Result<Self> {
        let texture = Self::new(device, frame.width, frame.height)?;
        texture.upload(queue, frame)?;
        Ok(texture)
    }

    /// Overwrite the texture contents with `frame`.
    pub fn upload(&self, queue: &wgpu::Queue, frame: &VideoFrame) -> Result<()> {
        if frame.width != self.width || frame.height != self.height {
            return Err(Error::FrameSizeMismatch {
                width: self.width,
                height: self.height,
                got_width: frame.width,
                got_height: frame.height,
            });
        }

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &frame.data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(frame.width * 4),
                rows_per_image: Some(frame.height),
            },
            wgpu::Extent3d {
                width: frame.width,
                height: frame.height,
                depth_or_array_layers: 1,
            },
        );
        Ok(())
    }

    /// A new view onto the texture, suitable for binding to a material.
    pub fn view(&self) -> wgpu::TextureView {
        self.texture.create_view(&wgpu::TextureViewDescriptor::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_size_within_limit() {
        assert!(check_texture_size(1, 1, 2048).is_ok());
        assert!(check_texture_size(2048, 1080, 2048).is_ok());
    }

    #[test]
    fn test_zero_sized_texture_is_rejected() {
        assert!(matches!(
            check_texture_size(0, 720, 2048),
            Err(Error::InvalidTextureSize { width: 0, height: 720, max: 2048 })
        ));
        assert!(check_texture_size(1280, 0, 2048).is_err());
    }

    #[test]
    fn test_oversized_texture_is_rejected() {
        let err = check_texture_size(4096, 2160, 2048).unwrap_err();
        assert!(matches!(err, Error::InvalidTextureSize { max: 2048, .. }));
        assert!(check_texture_size(1920, 2049, 2048).is_err());
    }
}
