//! Decorative particle field: spring-anchored dots that scatter from the
//! cursor and stitch faint lines between neighbours near it.

use serde::Deserialize;

use crate::error::{FxError, Result};
use crate::math::{approach_vec, Vec2, REFERENCE_FPS};
use crate::signals::{Pointer, Signals};
use crate::theme::Theme;

pub type Rgb = [u8; 3];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParticleConfig {
    /// Square pixels of viewport per particle.
    pub area_per_particle: f64,
    pub max_count: usize,
    /// Rest positions cover this many viewport heights.
    pub span_viewports: f64,
    pub repel_radius: f64,
    /// Pixels per reference frame at zero distance.
    pub repel_strength: f64,
    pub spring: f64,
    pub drift_speed: f64,
    pub wobble_amplitude: f64,
    /// Radians per second.
    pub wobble_speed: f64,
    pub highlight_multiplier: f64,
    pub link_pointer_multiplier: f64,
    pub link_distance: f64,
    pub min_size: f64,
    pub max_size: f64,
    pub min_opacity: f64,
    pub max_opacity: f64,
    /// Radians per reference frame.
    pub max_rotation_speed: f64,
    /// Pixels beyond the viewport that still count as visible.
    pub cull_margin: f64,
    pub palette_light: Vec<Rgb>,
    pub palette_dark: Vec<Rgb>,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            area_per_particle: 14_000.0,
            max_count: 120,
            span_viewports: 3.0,
            repel_radius: 120.0,
            repel_strength: 6.0,
            spring: 0.04,
            drift_speed: 0.15,
            wobble_amplitude: 4.0,
            wobble_speed: 0.6,
            highlight_multiplier: 1.8,
            link_pointer_multiplier: 2.0,
            link_distance: 110.0,
            min_size: 1.0,
            max_size: 3.0,
            min_opacity: 0.2,
            max_opacity: 0.7,
            max_rotation_speed: 0.02,
            cull_margin: 40.0,
            palette_light: vec![[99, 102, 241], [14, 165, 233], [236, 72, 153]],
            palette_dark: vec![[165, 180, 252], [125, 211, 252], [244, 114, 182]],
        }
    }
}

impl ParticleConfig {
    pub fn validate(&self) -> Result<()> {
        if self.area_per_particle <= 0.0 {
            return Err(FxError::invalid("particles.areaPerParticle", "must be positive"));
        }
        if self.max_count == 0 {
            return Err(FxError::invalid("particles.maxCount", "must be at least 1"));
        }
        if self.spring <= 0.0 || self.spring > 1.0 {
            return Err(FxError::invalid("particles.spring", "must be in (0, 1]"));
        }
        if self.min_size > self.max_size || self.min_opacity > self.max_opacity {
            return Err(FxError::invalid("particles", "min must not exceed max"));
        }
        if self.palette_light.is_empty() || self.palette_dark.is_empty() {
            return Err(FxError::invalid("particles.palette", "must not be empty"));
        }
        Ok(())
    }

    pub fn palette(&self, theme: Theme) -> &[Rgb] {
        match theme {
            Theme::Light => &self.palette_light,
            Theme::Dark => &self.palette_dark,
        }
    }
}

/// Pool size for a viewport.
pub fn particle_count(config: &ParticleConfig, width: f64, height: f64) -> usize {
    let area = (width * height).max(0.0);
    ((area / config.area_per_particle).floor() as usize).min(config.max_count)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Filled circle, optionally with a glow ring.
    Dot { glow: bool },
    Dash,
    /// Small dot with a thin ring around it.
    RingDot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Document coordinates.
    pub position: Vec2,
    pub rest: Vec2,
    pub velocity: Vec2,
    pub size: f64,
    pub opacity: f64,
    pub color: usize,
    pub shape: Shape,
    pub rotation: f64,
    pub rotation_speed: f64,
}

/// Drawing surface the field renders onto.
pub trait ParticleCanvas {
    fn clear(&mut self, width: f64, height: f64);
    fn circle(&mut self, center: Vec2, radius: f64, color: Rgb, alpha: f64);
    fn ring(&mut self, center: Vec2, radius: f64, width: f64, color: Rgb, alpha: f64);
    fn dash(&mut self, center: Vec2, length: f64, angle: f64, width: f64, color: Rgb, alpha: f64);
    fn line(&mut self, from: Vec2, to: Vec2, width: f64, color: Rgb, alpha: f64);
}

pub struct ParticleField {
    config: ParticleConfig,
    particles: Vec<Particle>,
    width: f64,
    height: f64,
    theme: Theme,
    rng: fastrand::Rng,
}

impl ParticleField {
    pub fn new(config: ParticleConfig, width: f64, height: f64, theme: Theme, seed: u64) -> Self {
        let mut field = Self {
            config,
            particles: Vec::new(),
            width,
            height,
            theme,
            rng: fastrand::Rng::with_seed(seed),
        };
        field.reset(width, height);
        field
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Recolours in place; indices into the palette survive a theme change.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Discards the pool and rebuilds it for a new viewport. O(count).
    pub fn reset(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        let count = particle_count(&self.config, width, height);
        let cfg = &self.config;
        let rng = &mut self.rng;
        let palette_len = cfg.palette_light.len().min(cfg.palette_dark.len()).max(1);
        let span = height * cfg.span_viewports;

        let mut range = |lo: f64, hi: f64| lo + (hi - lo) * rng.f64();
        let mut particles = Vec::with_capacity(count);
        for _ in 0..count {
            let rest = Vec2::new(range(0.0, width), range(0.0, span));
            let velocity = Vec2::new(
                range(-cfg.drift_speed, cfg.drift_speed),
                range(-cfg.drift_speed, cfg.drift_speed),
            );
            let size = range(cfg.min_size, cfg.max_size);
            let opacity = range(cfg.min_opacity, cfg.max_opacity);
            let rotation = range(0.0, std::f64::consts::TAU);
            let rotation_speed = range(-cfg.max_rotation_speed, cfg.max_rotation_speed);
            let pick = range(0.0, 3.0) as usize;
            let shape = match pick {
                0 => Shape::Dot {
                    glow: size > (cfg.min_size + cfg.max_size) * 0.5,
                },
                1 => Shape::Dash,
                _ => Shape::RingDot,
            };
            let color = (range(0.0, palette_len as f64) as usize).min(palette_len - 1);
            particles.push(Particle {
                position: rest,
                rest,
                velocity,
                size,
                opacity,
                color,
                shape,
                rotation,
                rotation_speed,
            });
        }
        self.particles = particles;
        log::debug!("particle pool reset: {count} particles for {width}x{height}");
    }

    fn visible(&self, p: &Particle, scroll_y: f64) -> bool {
        let m = self.config.cull_margin;
        p.position.y >= scroll_y - m && p.position.y <= scroll_y + self.height + m
    }

    fn doc_pointer(pointer: Pointer, scroll_y: f64) -> Option<Vec2> {
        pointer.position().map(|p| Vec2::new(p.x, p.y + scroll_y))
    }

    /// Advances physics for the particles inside the scroll window.
    pub fn step(&mut self, dt: f64, signals: &Signals) {
        let scroll_y = signals.scroll.scroll;
        let pointer = Self::doc_pointer(signals.pointer, scroll_y);
        let frames = dt.max(0.0) * REFERENCE_FPS;
        let cfg = &self.config;
        let m = cfg.cull_margin;
        let (top, bottom) = (scroll_y - m, scroll_y + self.height + m);

        for p in self.particles.iter_mut() {
            if p.position.y < top || p.position.y > bottom {
                continue;
            }
            if let Some(ptr) = pointer {
                let away = p.position - ptr;
                let dist = away.length();
                if dist < cfg.repel_radius {
                    let push = (1.0 - dist / cfg.repel_radius) * cfg.repel_strength * frames;
                    p.position += away.normalized() * push;
                }
            }

            let wobble = (signals.time * cfg.wobble_speed + p.rest.y * 0.01).sin() * cfg.wobble_amplitude;
            let anchor = Vec2::new(p.rest.x + wobble, p.rest.y);
            p.position += p.velocity * frames;
            p.position = approach_vec(p.position, anchor, cfg.spring, dt);
            p.rotation = (p.rotation + p.rotation_speed * frames) % std::f64::consts::TAU;
        }
    }

    /// Draws the visible particles and the pointer-local links.
    pub fn render(&self, canvas: &mut impl ParticleCanvas, signals: &Signals) {
        canvas.clear(self.width, self.height);
        let scroll_y = signals.scroll.scroll;
        let pointer = Self::doc_pointer(signals.pointer, scroll_y);
        let cfg = &self.config;
        let palette = cfg.palette(self.theme);
        let highlight = cfg.repel_radius * cfg.highlight_multiplier;
        let link_reach = cfg.repel_radius * cfg.link_pointer_multiplier;
        let to_screen = |v: Vec2| Vec2::new(v.x, v.y - scroll_y);

        let mut linkable: Vec<&Particle> = Vec::new();
        for p in self.particles.iter().filter(|p| self.visible(p, scroll_y)) {
            let color = palette[p.color % palette.len()];
            let mut alpha = p.opacity;
            if let Some(ptr) = pointer {
                let d = p.position.distance(ptr);
                if d < highlight {
                    alpha = (alpha + (1.0 - d / highlight) * 0.5).min(1.0);
                }
                if d < link_reach {
                    linkable.push(p);
                }
            }

            let c = to_screen(p.position);
            match p.shape {
                Shape::Dot { glow } => {
                    canvas.circle(c, p.size, color, alpha);
                    if glow {
                        canvas.ring(c, p.size * 2.5, 1.0, color, alpha * 0.3);
                    }
                }
                Shape::Dash => canvas.dash(c, p.size * 4.0, p.rotation, p.size * 0.6, color, alpha),
                Shape::RingDot => {
                    canvas.circle(c, p.size * 0.6, color, alpha);
                    canvas.ring(c, p.size * 1.8, 0.75, color, alpha * 0.6);
                }
            }
        }

        for (i, a) in linkable.iter().enumerate() {
            for b in &linkable[i + 1..] {
                let d = a.position.distance(b.position);
                if d < cfg.link_distance {
                    let alpha = (1.0 - d / cfg.link_distance) * 0.35;
                    let color = palette[a.color % palette.len()];
                    canvas.line(to_screen(a.position), to_screen(b.position), 0.6, color, alpha);
                }
            }
        }
    }
}
