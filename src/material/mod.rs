//! Video texture material.
//!
//! Holds the texture handle plus the blend flag and requested opacity, and
//! keeps the uniform block the GPU samples in step with them. GPU objects
//! live in [`MaterialRenderer`], which reads the material each frame.

mod renderer;

pub use renderer::{fit_transform, MaterialRenderer};

use crate::config::MaterialSettings;
use crate::shader::MaterialUniforms;
use tracing::{debug, warn};

/// Requested opacity used when none is given.
pub const DEFAULT_REQUESTED_OPACITY: f32 = 0.5;

/// Construction options. Absent fields take the documented defaults.
#[derive(Debug, Clone)]
pub struct MaterialOptions<T> {
    /// Initially bound texture
    pub texture: Option<T>,
    /// Initial blend mode (default `false`)
    pub blend_enabled: Option<bool>,
    /// Initial requested opacity (default 0.5)
    pub requested_opacity: Option<f32>,
}

impl<T> Default for MaterialOptions<T> {
    fn default() -> Self {
        Self {
            texture: None,
            blend_enabled: None,
            requested_opacity: None,
        }
    }
}

/// Material blending a video texture with a placeholder color.
///
/// `T` is the texture handle; the material never owns the texture itself.
#[derive(Debug)]
pub struct VideoTextureMaterial<T> {
    texture: Option<T>,
    blend_enabled: bool,
    requested_opacity: f32,
    uniforms: MaterialUniforms,
    uniform_revision: u64,
    texture_revision: u64,
}

impl<T> VideoTextureMaterial<T> {
    pub fn new(options: MaterialOptions<T>) -> Self {
        let requested_opacity = options
            .requested_opacity
            .and_then(sanitize_opacity)
            .unwrap_or(DEFAULT_REQUESTED_OPACITY);
        let blend_enabled = options.blend_enabled.unwrap_or(false);

        let mut material = Self {
            texture: options.texture,
            blend_enabled,
            requested_opacity,
            uniforms: MaterialUniforms::new(1.0),
            uniform_revision: 0,
            texture_revision: 0,
        };
        material.update_uniforms();
        material
    }

    pub fn texture(&self) -> Option<&T> {
        self.texture.as_ref()
    }

    /// Replace the bound texture. The uniform block is left alone.
    pub fn set_texture(&mut self, texture: T) {
        self.texture = Some(texture);
        self.texture_revision += 1;
    }

    /// Unbind the texture and hand it back.
    pub fn take_texture(&mut self) -> Option<T> {
        let texture = self.texture.take();
        if texture.is_some() {
            self.texture_revision += 1;
        }
        texture
    }

    pub fn blend_enabled(&self) -> bool {
        self.blend_enabled
    }

    pub fn set_blend_enabled(&mut self, blend_enabled: bool) {
        self.blend_enabled = blend_enabled;
        self.update_uniforms();
    }

    pub fn requested_opacity(&self) -> f32 {
        self.requested_opacity
    }

    /// Set the opacity used while blending.
    /// Out-of-range values are clamped to `[0, 1]`; NaN is ignored.
    pub fn set_requested_opacity(&mut self, opacity: f32) {
        let Some(opacity) = sanitize_opacity(opacity) else {
            return;
        };
        self.requested_opacity = opacity;
        self.update_uniforms();
    }

    /// Opacity the fragment stage actually uses.
    pub fn effective_opacity(&self) -> f32 {
        self.uniforms.video_opacity
    }

    pub fn uniforms(&self) -> &MaterialUniforms {
        &self.uniforms
    }

    /// Bumped every time the uniform block is rewritten.
    pub fn uniform_revision(&self) -> u64 {
        self.uniform_revision
    }

    /// Bumped every time the bound texture changes.
    pub fn texture_revision(&self) -> u64 {
        self.texture_revision
    }

    /// Apply blend and opacity from a (re)loaded config.
    pub fn apply(&mut self, settings: &MaterialSettings) {
        if let Some(opacity) = settings.requested_opacity {
            self.set_requested_opacity(opacity);
        }
        self.set_blend_enabled(settings.blend_enabled);
    }

    fn update_uniforms(&mut self) {
        let video_opacity = if self.blend_enabled {
            self.requested_opacity
        } else {
            1.0
        };
        self.uniforms = MaterialUniforms::new(video_opacity);
        self.uniform_revision += 1;
        debug!(
            "Material uniforms updated: blend={}, video_opacity={}",
            self.blend_enabled, video_opacity
        );
    }
}

impl<T> Default for VideoTextureMaterial<T> {
    fn default() -> Self {
        Self::new(MaterialOptions::default())
    }
}

fn sanitize_opacity(opacity: f32) -> Option<f32> {
    if opacity.is_nan() {
        warn!("Ignoring NaN video opacity");
        return None;
    }
    let clamped = opacity.clamp(0.0, 1.0);
    if clamped != opacity {
        warn!("Video opacity {} out of range, clamped to {}", opacity, clamped);
    }
    Some(clamped)
}

#[cfg(test)]
mod tests {
    use super::*;

    type Material = VideoTextureMaterial<&'static str>;

    fn with(blend: Option<bool>, opacity: Option<f32>) -> Material {
        VideoTextureMaterial::new(MaterialOptions {
            texture: Some("video"),
            blend_enabled: blend,
            requested_opacity: opacity,
        })
    }

    #[test]
    fn test_blend_off_is_fully_opaque() {
        let material = with(Some(false), None);
        assert_eq!(material.effective_opacity(), 1.0);
    }

    #[test]
    fn test_blend_on_uses_requested_opacity() {
        let material = with(Some(true), Some(0.3));
        assert_eq!(material.effective_opacity(), 0.3);
    }

    #[test]
    fn test_blend_on_defaults_to_half() {
        let material = with(Some(true), None);
        assert_eq!(material.effective_opacity(), 0.5);
        assert_eq!(material.requested_opacity(), DEFAULT_REQUESTED_OPACITY);
    }

    #[test]
    fn test_default_material() {
        let material = Material::default();
        assert!(material.texture().is_none());
        assert!(!material.blend_enabled());
        assert_eq!(material.requested_opacity(), 0.5);
        assert_eq!(material.effective_opacity(), 1.0);
    }

    #[test]
    fn test_blend_off_ignores_requested_opacity() {
        for v in [0.0, 0.1, 0.5, 0.9, 1.0] {
            let material = with(Some(false), Some(v));
            assert_eq!(material.effective_opacity(), 1.0);
        }
    }

    #[test]
    fn test_blend_on_matches_any_in_range_opacity() {
        for i in 0..=20 {
            let v = i as f32 / 20.0;
            let mut material = with(Some(true), None);
            material.set_requested_opacity(v);
            assert_eq!(material.effective_opacity(), v);
        }
    }

    #[test]
    fn test_explicit_zero_opacity_is_kept() {
        let material = with(Some(true), Some(0.0));
        assert_eq!(material.effective_opacity(), 0.0);
    }

    #[test]
    fn test_toggle_sequence() {
        let mut material = Material::default();
        material.set_blend_enabled(true);
        material.set_requested_opacity(0.8);
        assert_eq!(material.effective_opacity(), 0.8);
        material.set_blend_enabled(false);
        assert_eq!(material.effective_opacity(), 1.0);
    }

    #[test]
    fn test_opacity_remembered_while_blend_off() {
        let mut material = with(Some(false), None);
        material.set_requested_opacity(0.25);
        assert_eq!(material.effective_opacity(), 1.0);
        material.set_blend_enabled(true);
        assert_eq!(material.effective_opacity(), 0.25);
    }

    #[test]
    fn test_blend_round_trip_restores_exactly_one() {
        let mut material = with(Some(false), Some(0.37));
        for _ in 0..10 {
            material.set_blend_enabled(true);
            material.set_blend_enabled(false);
        }
        assert_eq!(material.effective_opacity(), 1.0);
    }

    #[test]
    fn test_texture_and_opacity_are_independent() {
        let mut material = with(Some(true), Some(0.4));
        material.set_texture("other");
        assert_eq!(material.effective_opacity(), 0.4);

        material.set_blend_enabled(false);
        material.set_requested_opacity(0.9);
        material.set_blend_enabled(true);
        assert_eq!(material.texture(), Some(&"other"));
    }

    #[test]
    fn test_uniform_block_tracks_effective_opacity() {
        let mut material = Material::default();
        let ops: [fn(&mut Material); 4] = [
            |m| m.set_blend_enabled(true),
            |m| m.set_requested_opacity(0.6),
            |m| m.set_texture("next"),
            |m| m.set_blend_enabled(false),
        ];
        for op in ops {
            op(&mut material);
            let expected = if material.blend_enabled() {
                material.requested_opacity()
            } else {
                1.0
            };
            assert_eq!(material.uniforms().video_opacity, expected);
            assert_eq!(material.effective_opacity(), expected);
        }
    }

    #[test]
    fn test_out_of_range_opacity_is_clamped() {
        let mut material = with(Some(true), Some(1.5));
        assert_eq!(material.requested_opacity(), 1.0);
        material.set_requested_opacity(-0.2);
        assert_eq!(material.effective_opacity(), 0.0);
    }

    #[test]
    fn test_nan_opacity_is_ignored() {
        let mut material = with(Some(true), Some(f32::NAN));
        assert_eq!(material.effective_opacity(), DEFAULT_REQUESTED_OPACITY);
        material.set_requested_opacity(0.7);
        material.set_requested_opacity(f32::NAN);
        assert_eq!(material.effective_opacity(), 0.7);
    }

    #[test]
    fn test_revisions() {
        let mut material = Material::default();
        let uniforms = material.uniform_revision();
        let textures = material.texture_revision();

        material.set_texture("a");
        assert_eq!(material.texture_revision(), textures + 1);
        assert_eq!(material.uniform_revision(), uniforms);

        material.set_blend_enabled(true);
        assert_eq!(material.uniform_revision(), uniforms + 1);
        assert_eq!(material.texture_revision(), textures + 1);

        assert_eq!(material.take_texture(), Some("a"));
        assert_eq!(material.take_texture(), None);
        assert_eq!(material.texture_revision(), textures + 2);
    }

    #[test]
    fn test_apply_settings() {
        let mut material = Material::default();
        material.apply(&MaterialSettings {
            blend_enabled: true,
            requested_opacity: Some(0.2),
        });
        assert_eq!(material.effective_opacity(), 0.2);

        material.apply(&MaterialSettings {
            blend_enabled: false,
            requested_opacity: None,
        });
        assert_eq!(material.effective_opacity(), 1.0);
        assert_eq!(material.requested_opacity(), 0.2);
    }
}
