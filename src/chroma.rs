//! Chroma keying: the GLSL program the compositor runs and a CPU mirror of
//! the same math, plus the per-frame decision of whether to upload a frame.

use serde::Deserialize;

use crate::error::{FxError, Result};

/// `HTMLMediaElement.HAVE_CURRENT_DATA`.
pub const HAVE_CURRENT_DATA: u16 = 2;

/// Brightness kept by a fully keyed-out pixel; edges darken toward this.
pub const EDGE_SHADE: f32 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChromaKeyConfig {
    pub key_color: [f32; 3],
    pub similarity: f32,
    pub smoothness: f32,
    pub spill: f32,
}

impl Default for ChromaKeyConfig {
    fn default() -> Self {
        Self {
            key_color: [0.0, 0.85, 0.0],
            similarity: 0.35,
            smoothness: 0.12,
            spill: 0.5,
        }
    }
}

impl ChromaKeyConfig {
    pub fn validate(&self) -> Result<()> {
        if self.key_color.iter().any(|c| !(0.0..=1.0).contains(c)) {
            return Err(FxError::invalid("chroma.keyColor", "components must be in [0, 1]"));
        }
        for (field, v) in [
            ("chroma.similarity", self.similarity),
            ("chroma.smoothness", self.smoothness),
            ("chroma.spill", self.spill),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(FxError::invalid(field, format!("{v} is outside [0, 1]")));
            }
        }
        Ok(())
    }
}

/// Projects RGB onto the Cb/Cr plane (BT.601), dropping luma.
pub fn rgb_to_chroma(rgb: [f32; 3]) -> [f32; 2] {
    let [r, g, b] = rgb;
    [
        -0.168_736 * r - 0.331_264 * g + 0.5 * b,
        0.5 * r - 0.418_688 * g - 0.081_312 * b,
    ]
}

pub fn chroma_distance(a: [f32; 3], b: [f32; 3]) -> f32 {
    let [au, av] = rgb_to_chroma(a);
    let [bu, bv] = rgb_to_chroma(b);
    (au - bu).hypot(av - bv)
}

fn smoothstep(e0: f32, e1: f32, x: f32) -> f32 {
    if e1 <= e0 {
        return if x < e0 { 0.0 } else { 1.0 };
    }
    let t = ((x - e0) / (e1 - e0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Keys a single straight-alpha RGB pixel. Output is `[r, g, b, a]`.
///
/// Matches `FRAGMENT_SHADER`, except the shader premultiplies its output for
/// the canvas compositor.
pub fn key_pixel(rgb: [f32; 3], cfg: &ChromaKeyConfig) -> [f32; 4] {
    let dist = chroma_distance(rgb, cfg.key_color);
    let lo = cfg.similarity;
    let hi = cfg.similarity + cfg.smoothness;
    let alpha = smoothstep(lo, hi, dist);

    let [r, mut g, b] = rgb;
    let proximity = 1.0 - smoothstep(lo, hi + cfg.spill, dist);
    let pull = (cfg.spill * proximity).clamp(0.0, 1.0);
    let floor = r.min(b);
    if g > floor {
        g = mix(g, floor, pull);
    }

    let shade = mix(EDGE_SHADE, 1.0, alpha);
    [r * shade, g * shade, b * shade, alpha]
}

/// Keys an RGBA8 buffer in place.
pub fn key_frame(rgba: &mut [u8], cfg: &ChromaKeyConfig) {
    for px in rgba.chunks_exact_mut(4) {
        let rgb = [
            px[0] as f32 / 255.0,
            px[1] as f32 / 255.0,
            px[2] as f32 / 255.0,
        ];
        let out = key_pixel(rgb, cfg);
        for (dst, v) in px.iter_mut().zip(out) {
            *dst = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
    }
}

pub const VERTEX_SHADER: &str = r#"#version 300 es
in vec2 a_position;
out vec2 v_uv;
void main() {
    // video rows arrive top first
    v_uv = vec2(a_position.x * 0.5 + 0.5, 0.5 - a_position.y * 0.5);
    gl_Position = vec4(a_position, 0.0, 1.0);
}
"#;

pub const FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;
uniform sampler2D u_video;
uniform vec3 u_key;
uniform float u_similarity;
uniform float u_smoothness;
uniform float u_spill;
in vec2 v_uv;
out vec4 out_color;

vec2 to_chroma(vec3 c) {
    return vec2(
        -0.168736 * c.r - 0.331264 * c.g + 0.5 * c.b,
        0.5 * c.r - 0.418688 * c.g - 0.081312 * c.b
    );
}

void main() {
    vec4 src = texture(u_video, v_uv);
    float dist = distance(to_chroma(src.rgb), to_chroma(u_key));
    float lo = u_similarity;
    float hi = u_similarity + u_smoothness;
    float alpha = smoothstep(lo, hi, dist);

    vec3 rgb = src.rgb;
    float proximity = 1.0 - smoothstep(lo, hi + u_spill, dist);
    float pull = clamp(u_spill * proximity, 0.0, 1.0);
    float floor_g = min(rgb.r, rgb.b);
    if (rgb.g > floor_g) {
        rgb.g = mix(rgb.g, floor_g, pull);
    }

    rgb *= mix(0.85, 1.0, alpha);
    out_color = vec4(rgb * alpha, alpha);
}
"#;

/// What the compositor observed about its video this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VideoStatus {
    pub ready_state: u16,
    pub paused: bool,
    pub ended: bool,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePlan {
    /// Keep the previous frame and try again next tick.
    Skip,
    /// Upload and draw; resize the surface first when set.
    Draw { resize: Option<(u32, u32)> },
}

/// Decides whether a frame can be drawn onto a surface of `surface` size.
pub fn plan_frame(status: VideoStatus, surface: (u32, u32)) -> FramePlan {
    if status.paused || status.ended || status.ready_state < HAVE_CURRENT_DATA {
        return FramePlan::Skip;
    }
    if status.width == 0 || status.height == 0 {
        return FramePlan::Skip;
    }
    let native = (status.width, status.height);
    FramePlan::Draw {
        resize: (native != surface).then_some(native),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_similarity() {
        let cfg = ChromaKeyConfig {
            similarity: 1.5,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn key_color_itself_is_transparent() {
        let cfg = ChromaKeyConfig::default();
        assert_eq!(key_pixel(cfg.key_color, &cfg)[3], 0.0);
    }
}
