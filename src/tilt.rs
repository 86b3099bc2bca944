use serde::Deserialize;

use crate::error::{FxError, Result};
use crate::math::{approach, Rect, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TiltConfig {
    /// Degrees.
    pub max_angle: f64,
    pub smoothing: f64,
    pub perspective: f64,
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self {
            max_angle: 10.0,
            smoothing: 0.1,
            perspective: 1000.0,
        }
    }
}

impl TiltConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=90.0).contains(&self.max_angle) {
            return Err(FxError::invalid("tilt.maxAngle", "must be in [0, 90]"));
        }
        if self.smoothing <= 0.0 || self.smoothing > 1.0 {
            return Err(FxError::invalid("tilt.smoothing", "must be in (0, 1]"));
        }
        Ok(())
    }
}

/// Rotation about X and Y in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rotation {
    pub x: f64,
    pub y: f64,
}

pub struct Tilt {
    config: TiltConfig,
    current: Rotation,
    target: Rotation,
}

impl Tilt {
    pub fn new(config: TiltConfig) -> Self {
        Self {
            config,
            current: Rotation::default(),
            target: Rotation::default(),
        }
    }

    pub fn target(&self) -> Rotation {
        self.target
    }

    pub fn current(&self) -> Rotation {
        self.current
    }

    pub fn pointer_moved(&mut self, pointer: Vec2, bounds: Rect) {
        if bounds.width <= 0.0 || bounds.height <= 0.0 {
            return;
        }
        let c = bounds.center();
        let nx = ((pointer.x - c.x) / (bounds.width * 0.5)).clamp(-1.0, 1.0);
        let ny = ((pointer.y - c.y) / (bounds.height * 0.5)).clamp(-1.0, 1.0);
        self.target = Rotation {
            x: -ny * self.config.max_angle,
            y: nx * self.config.max_angle,
        };
    }

    pub fn pointer_left(&mut self) {
        self.target = Rotation::default();
    }

    pub fn tick(&mut self, dt: f64) -> Rotation {
        let k = self.config.smoothing;
        self.current = Rotation {
            x: approach(self.current.x, self.target.x, k, dt),
            y: approach(self.current.y, self.target.y, k, dt),
        };
        self.current
    }

    pub fn to_css(&self) -> String {
        format!(
            "perspective({}px) rotateX({:.3}deg) rotateY({:.3}deg)",
            self.config.perspective, self.current.x, self.current.y
        )
    }
}
