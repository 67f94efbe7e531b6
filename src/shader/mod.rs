//! Shader programs and uniform layouts for the video texture material.

/// Color shown where the video is faded out (mid-tone blue).
pub const PLACEHOLDER_COLOR: [f32; 3] = [0.0, 0.7, 1.0];

/// Vertex stage: applies the transform and passes the UV through.
pub const VERTEX_SHADER: &str = r#"
struct Transform {
    matrix: mat4x4<f32>,
}

@group(0) @binding(0) var<uniform> transform: Transform;

struct VertexInput {
    @location(0) position: vec2<f32>,
    @location(1) tex_coords: vec2<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) tex_coords: vec2<f32>,
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = transform.matrix * vec4<f32>(in.position, 0.0, 1.0);
    out.tex_coords = in.tex_coords;
    return out;
}
"#;

/// Fragment stage: mixes the placeholder color with the sampled texel.
pub const FRAGMENT_SHADER: &str = r#"
struct MaterialUniforms {
    video_opacity: f32,
    pad0: f32,
    pad1: f32,
    pad2: f32,
}

@group(0) @binding(1) var<uniform> material: MaterialUniforms;
@group(0) @binding(2) var t_map: texture_2d<f32>;
@group(0) @binding(3) var s_map: sampler;

const PLACEHOLDER: vec3<f32> = vec3<f32>(0.0, 0.7, 1.0);

@fragment
fn fs_main(@location(0) tex_coords: vec2<f32>) -> @location(0) vec4<f32> {
    let texel = textureSample(t_map, s_map, tex_coords).rgb;
    let e = material.video_opacity;
    return vec4<f32>((1.0 - e) * PLACEHOLDER + e * texel, 1.0);
}
"#;

/// Uniform block read by the fragment stage.
/// Layout must match `MaterialUniforms` in [`FRAGMENT_SHADER`].
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniforms {
    pub video_opacity: f32,
    pub _pad: [f32; 3],
}

impl MaterialUniforms {
    pub fn new(video_opacity: f32) -> Self {
        Self {
            video_opacity,
            _pad: [0.0; 3],
        }
    }
}

/// Uniform block read by the vertex stage.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniforms {
    pub matrix: [[f32; 4]; 4],
}

impl TransformUniforms {
    pub fn new(matrix: glam::Mat4) -> Self {
        Self {
            matrix: matrix.to_cols_array_2d(),
        }
    }
}

/// CPU version of the fragment stage, for previews and tests.
pub fn shade(texel: [f32; 3], video_opacity: f32) -> [f32; 4] {
    let mix = |placeholder: f32, sampled: f32| (1.0 - video_opacity) * placeholder + video_opacity * sampled;
    [
        mix(PLACEHOLDER_COLOR[0], texel[0]),
        mix(PLACEHOLDER_COLOR[1], texel[1]),
        mix(PLACEHOLDER_COLOR[2], texel[2]),
        1.0,
    ]
}
