//! One-shot load animation: spin in the middle of the screen, fly to the
//! hero anchor, fade out, report completion.

use serde::Deserialize;

use crate::error::{FxError, Result};
use crate::layout::{fallback_anchor, Transform};
use crate::math::{ease_in_out_cubic, lerp, smoothstep, Vec2};
use crate::signals::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IntroConfig {
    /// Seconds spent spinning.
    pub spin_duration: f64,
    /// Seconds until completion is reported.
    pub total_duration: f64,
    /// Degrees per second while spinning.
    pub spin_speed: f64,
    pub fly_scale: f64,
    /// Fraction of the fly phase after which the fade starts.
    pub fade_start: f64,
}

impl Default for IntroConfig {
    fn default() -> Self {
        Self {
            spin_duration: 1.8,
            total_duration: 2.66,
            spin_speed: 540.0,
            fly_scale: 0.85,
            fade_start: 0.6,
        }
    }
}

impl IntroConfig {
    pub fn validate(&self) -> Result<()> {
        if self.spin_duration <= 0.0 {
            return Err(FxError::invalid("intro.spinDuration", "must be positive"));
        }
        if self.total_duration <= self.spin_duration {
            return Err(FxError::invalid(
                "intro.totalDuration",
                "must be longer than spinDuration",
            ));
        }
        if !(0.0..1.0).contains(&self.fade_start) {
            return Err(FxError::invalid("intro.fadeStart", "must be in [0, 1)"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntroPhase {
    Spin,
    Fly,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntroFrame {
    pub transform: Transform,
    pub opacity: f64,
    /// True on exactly one frame: the one that reaches `Done`.
    pub completed: bool,
}

pub struct IntroSequence {
    config: IntroConfig,
    phase: IntroPhase,
    elapsed: f64,
    center: Vec2,
    target: Vec2,
    viewport: Viewport,
    /// Rotation at the moment the fly phase began.
    fly_rotation: f64,
}

impl IntroSequence {
    pub fn new(config: IntroConfig, viewport: Viewport, target: Option<Vec2>) -> Self {
        Self {
            config,
            phase: IntroPhase::Spin,
            elapsed: 0.0,
            center: viewport.center(),
            target: target.unwrap_or_else(|| fallback_anchor(viewport)),
            viewport,
            fly_rotation: 0.0,
        }
    }

    pub fn phase(&self) -> IntroPhase {
        self.phase
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn center(&self) -> Vec2 {
        self.center
    }

    /// Viewport resize. Positions only move while still spinning.
    pub fn relayout(&mut self, viewport: Viewport, target: Option<Vec2>) {
        if self.phase != IntroPhase::Spin {
            return;
        }
        self.viewport = viewport;
        self.center = viewport.center();
        self.target = target.unwrap_or_else(|| fallback_anchor(viewport));
    }

    /// Advances by `dt` seconds. `locate_target` is asked for the target
    /// again at the spin to fly transition so late layout shifts are picked up.
    pub fn tick(&mut self, dt: f64, locate_target: impl FnOnce() -> Option<Vec2>) -> IntroFrame {
        let cfg = self.config;
        if self.phase == IntroPhase::Done {
            return IntroFrame {
                transform: Transform {
                    position: self.target,
                    scale: cfg.fly_scale,
                    rotation: 0.0,
                },
                opacity: 0.0,
                completed: false,
            };
        }

        self.elapsed += dt.max(0.0);

        if self.phase == IntroPhase::Spin {
            if self.elapsed < cfg.spin_duration {
                return IntroFrame {
                    transform: Transform {
                        position: self.center,
                        scale: 1.0,
                        rotation: (self.elapsed * cfg.spin_speed) % 360.0,
                    },
                    opacity: 1.0,
                    completed: false,
                };
            }
            self.fly_rotation = (cfg.spin_duration * cfg.spin_speed) % 360.0;
            self.target = locate_target().unwrap_or_else(|| fallback_anchor(self.viewport));
            self.phase = IntroPhase::Fly;
            log::debug!("intro: spin -> fly toward {:?}", self.target);
        }

        let span = cfg.total_duration - cfg.spin_duration;
        let t = ((self.elapsed - cfg.spin_duration) / span).clamp(0.0, 1.0);
        let e = ease_in_out_cubic(t);
        let completed = t >= 1.0;
        if completed {
            self.phase = IntroPhase::Done;
            log::debug!("intro: done");
        }

        IntroFrame {
            transform: Transform {
                position: self.center.lerp(self.target, e),
                scale: lerp(1.0, cfg.fly_scale, e),
                rotation: lerp(self.fly_rotation, 0.0, e),
            },
            opacity: 1.0 - smoothstep(cfg.fade_start, 1.0, t),
            completed,
        }
    }
}
