//! Floating mascot that rides from its hero anchor to a corner as the page
//! scrolls, shies away from the cursor and flees when clicked.

use serde::Deserialize;

use crate::error::{FxError, Result};
use crate::layout::{clamp_to_viewport, fallback_anchor, Transform};
use crate::math::{approach, decay, lerp, Vec2};
use crate::signals::{Signals, Viewport};
use crate::theme::Theme;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MascotConfig {
    /// Unscaled edge length of the (square) sprite in pixels.
    pub size: f64,
    pub hero_scale: f64,
    pub float_scale: f64,
    /// Floating centre, measured in from the right and bottom edges.
    pub float_inset: Vec2,
    pub margin: f64,
    pub avoid_radius: f64,
    pub push_strength: f64,
    /// Push multiplier once fully floating (`p == 1`).
    pub float_push_boost: f64,
    pub push_smoothing: f64,
    /// Offsets smaller than this many pixels snap to zero.
    pub rest_epsilon: f64,
    pub bob_amplitude: f64,
    pub sway_amplitude: f64,
    /// Radians per second.
    pub bob_speed: f64,
    /// Degrees of tilt per pixel of scroll velocity.
    pub tilt_per_velocity: f64,
    pub max_tilt: f64,
    pub tilt_smoothing: f64,
    pub flee_distance: f64,
    pub flee_vertical: f64,
    pub flee_decay: f64,
    /// Seconds.
    pub bubble_cooldown: f64,
    pub bubble_duration: f64,
    pub greeting_delay: f64,
    pub greeting: String,
    pub messages: Vec<String>,
}

impl Default for MascotConfig {
    fn default() -> Self {
        Self {
            size: 220.0,
            hero_scale: 1.0,
            float_scale: 0.45,
            float_inset: Vec2::new(90.0, 110.0),
            margin: 12.0,
            avoid_radius: 160.0,
            push_strength: 70.0,
            float_push_boost: 1.8,
            push_smoothing: 0.12,
            rest_epsilon: 0.05,
            bob_amplitude: 8.0,
            sway_amplitude: 5.0,
            bob_speed: 2.2,
            tilt_per_velocity: 0.35,
            max_tilt: 12.0,
            tilt_smoothing: 0.08,
            flee_distance: 240.0,
            flee_vertical: 120.0,
            flee_decay: 0.9,
            bubble_cooldown: 6.0,
            bubble_duration: 2.5,
            greeting_delay: 1.5,
            greeting: "Hi there! Welcome aboard.".into(),
            messages: vec![
                "Hey, personal space!".into(),
                "You can't catch me!".into(),
                "Scroll down, there's more.".into(),
                "Careful, I'm ticklish.".into(),
                "Psst, check out the projects.".into(),
            ],
        }
    }
}

impl MascotConfig {
    pub fn validate(&self) -> Result<()> {
        for (field, v) in [
            ("mascot.size", self.size),
            ("mascot.heroScale", self.hero_scale),
            ("mascot.floatScale", self.float_scale),
            ("mascot.avoidRadius", self.avoid_radius),
        ] {
            if v <= 0.0 {
                return Err(FxError::invalid(field, "must be positive"));
            }
        }
        for (field, v) in [
            ("mascot.pushSmoothing", self.push_smoothing),
            ("mascot.tiltSmoothing", self.tilt_smoothing),
        ] {
            if v <= 0.0 || v > 1.0 {
                return Err(FxError::invalid(field, "must be in (0, 1]"));
            }
        }
        if !(0.0..1.0).contains(&self.flee_decay) {
            return Err(FxError::invalid("mascot.fleeDecay", "must be in [0, 1)"));
        }
        if self.max_tilt < 0.0 {
            return Err(FxError::invalid("mascot.maxTilt", "must not be negative"));
        }
        Ok(())
    }

    /// Sprite scale for scroll progress `p`.
    pub fn scale_at(&self, p: f64) -> f64 {
        lerp(self.hero_scale, self.float_scale, p.clamp(0.0, 1.0))
    }

    pub fn floating_position(&self, viewport: Viewport) -> Vec2 {
        Vec2::new(
            viewport.width - self.float_inset.x,
            viewport.height - self.float_inset.y,
        )
    }
}

/// CSS `filter` for the sprite glow.
pub fn glow_filter(theme: Theme) -> &'static str {
    match theme {
        Theme::Dark => "drop-shadow(0 0 18px rgba(120, 200, 255, 0.55))",
        Theme::Light => "drop-shadow(0 6px 14px rgba(0, 0, 0, 0.25))",
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Bubble {
    text: String,
    remaining: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MascotFrame {
    pub transform: Transform,
    /// Set when the speech bubble appeared, changed or disappeared.
    pub bubble_changed: bool,
}

pub struct Mascot {
    config: MascotConfig,
    push: Vec2,
    flee: Vec2,
    tilt: f64,
    phase: f64,
    since_mount: f64,
    greeted: bool,
    cooldown: f64,
    bubble: Option<Bubble>,
    rng: fastrand::Rng,
}

impl Mascot {
    pub fn new(config: MascotConfig, seed: u64) -> Self {
        Self {
            config,
            push: Vec2::ZERO,
            flee: Vec2::ZERO,
            tilt: 0.0,
            phase: 0.0,
            since_mount: 0.0,
            greeted: false,
            cooldown: 0.0,
            bubble: None,
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    pub fn config(&self) -> &MascotConfig {
        &self.config
    }

    pub fn push(&self) -> Vec2 {
        self.push
    }

    pub fn flee(&self) -> Vec2 {
        self.flee
    }

    pub fn tilt(&self) -> f64 {
        self.tilt
    }

    pub fn bubble(&self) -> Option<&str> {
        self.bubble.as_ref().map(|b| b.text.as_str())
    }

    /// Click on the sprite: jump toward the half of the viewport the pointer
    /// is not in, with a random vertical component.
    pub fn on_click(&mut self, pointer_x: f64, viewport: Viewport) -> Vec2 {
        let side = if pointer_x < viewport.width * 0.5 { 1.0 } else { -1.0 };
        let vertical = (self.rng.f64() * 2.0 - 1.0) * self.config.flee_vertical;
        self.flee = Vec2::new(side * self.config.flee_distance, vertical);
        log::debug!("mascot flees by {:?}", self.flee);
        self.flee
    }

    fn show_bubble(&mut self, text: String) {
        self.bubble = Some(Bubble {
            text,
            remaining: self.config.bubble_duration,
        });
    }

    /// Advances one frame. `anchor` is the centre of the hero anchor element
    /// in viewport pixels, if it exists.
    pub fn tick(&mut self, dt: f64, signals: &Signals, anchor: Option<Vec2>) -> MascotFrame {
        let cfg = &self.config;
        let viewport = signals.viewport;
        let p = signals.scroll.progress.clamp(0.0, 1.0);

        let anchor = anchor.unwrap_or_else(|| fallback_anchor(viewport));
        let base = anchor.lerp(cfg.floating_position(viewport), p);

        // cursor repulsion, strongest once floating
        let max_push = cfg.push_strength * lerp(1.0, cfg.float_push_boost, p);
        let mut near = false;
        let force = match signals.pointer.position() {
            Some(pointer) => {
                let away = base - pointer;
                let dist = away.length();
                if dist < cfg.avoid_radius {
                    near = true;
                    away.normalized() * ((1.0 - dist / cfg.avoid_radius) * max_push)
                } else {
                    Vec2::ZERO
                }
            }
            None => Vec2::ZERO,
        };
        self.push = Vec2::new(
            approach(self.push.x, force.x, cfg.push_smoothing, dt),
            approach(self.push.y, force.y, cfg.push_smoothing, dt),
        )
        .clamp_length(max_push);
        if force == Vec2::ZERO && self.push.length() < cfg.rest_epsilon {
            self.push = Vec2::ZERO;
        }

        self.phase = (self.phase + dt * cfg.bob_speed) % std::f64::consts::TAU;
        let idle = Vec2::new(
            (self.phase * 0.5).sin() * cfg.sway_amplitude * p,
            self.phase.sin() * cfg.bob_amplitude * p,
        );

        let target_tilt = (-signals.scroll.velocity * cfg.tilt_per_velocity)
            .clamp(-cfg.max_tilt, cfg.max_tilt);
        self.tilt = approach(self.tilt, target_tilt, cfg.tilt_smoothing, dt)
            .clamp(-cfg.max_tilt, cfg.max_tilt);

        self.flee = self.flee * decay(cfg.flee_decay, dt);
        if self.flee.length() < cfg.rest_epsilon {
            self.flee = Vec2::ZERO;
        }

        let scale = cfg.scale_at(p);
        let half = Vec2::new(cfg.size * scale * 0.5, cfg.size * scale * 0.5);
        let position = clamp_to_viewport(base + idle + self.push + self.flee, half, cfg.margin, viewport);

        let bubble_changed = self.update_bubble(dt, near);

        MascotFrame {
            transform: Transform {
                position,
                scale,
                rotation: self.tilt,
            },
            bubble_changed,
        }
    }

    fn update_bubble(&mut self, dt: f64, near: bool) -> bool {
        let mut changed = false;
        self.since_mount += dt;
        self.cooldown = (self.cooldown - dt).max(0.0);

        if let Some(bubble) = self.bubble.as_mut() {
            bubble.remaining -= dt;
            if bubble.remaining <= 0.0 {
                self.bubble = None;
                changed = true;
            }
        }

        if !self.greeted && self.since_mount >= self.config.greeting_delay {
            self.greeted = true;
            let greeting = self.config.greeting.clone();
            self.show_bubble(greeting);
            self.cooldown = self.config.bubble_cooldown;
            return true;
        }

        if near && self.cooldown <= 0.0 && !self.config.messages.is_empty() {
            let pick = self.rng.usize(..self.config.messages.len());
            let text = self.config.messages[pick].clone();
            self.show_bubble(text);
            self.cooldown = self.config.bubble_cooldown;
            changed = true;
        }
        changed
    }
}
