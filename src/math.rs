//! Small vector and interpolation helpers shared by every controller.

use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use serde::Deserialize;

/// Reference frame rate the per-frame smoothing factors are tuned for.
pub const REFERENCE_FPS: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Vec2) -> f64 {
        (self - other).length()
    }

    /// Unit vector, or zero for a (near) zero input.
    pub fn normalized(self) -> Vec2 {
        let len = self.length();
        if len < f64::EPSILON {
            Vec2::ZERO
        } else {
            self * (1.0 / len)
        }
    }

    /// Rescales the vector so its length never exceeds `max`.
    pub fn clamp_length(self, max: f64) -> Vec2 {
        let len = self.length();
        if len > max && len > 0.0 {
            self * (max / len)
        } else {
            self
        }
    }

    pub fn lerp(self, to: Vec2, t: f64) -> Vec2 {
        Vec2::new(lerp(self.x, to.x, t), lerp(self.y, to.y, t))
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Axis-aligned rectangle in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }
}

/// Linear interpolation written so that `t == 0` and `t == 1` return the
/// endpoints exactly.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// Fraction of the remaining distance covered in `dt` seconds when `rate`
/// is the fraction covered per reference frame.
pub fn smoothing_step(rate: f64, dt: f64) -> f64 {
    let rate = rate.clamp(0.0, 1.0);
    if rate >= 1.0 {
        return 1.0;
    }
    1.0 - (1.0 - rate).powf(dt.max(0.0) * REFERENCE_FPS)
}

/// Exponential approach of `current` toward `target`. Never overshoots.
pub fn approach(current: f64, target: f64, rate: f64, dt: f64) -> f64 {
    current + (target - current) * smoothing_step(rate, dt)
}

pub fn approach_vec(current: Vec2, target: Vec2, rate: f64, dt: f64) -> Vec2 {
    let k = smoothing_step(rate, dt);
    current + (target - current) * k
}

/// Per-frame multiplicative decay (`factor` per reference frame).
pub fn decay(factor: f64, dt: f64) -> f64 {
    factor.clamp(0.0, 1.0).powf(dt.max(0.0) * REFERENCE_FPS)
}

pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

pub fn ease_out_expo(t: f64) -> f64 {
    if t >= 1.0 {
        1.0
    } else {
        1.0 - 2f64.powf(-10.0 * t.max(0.0))
    }
}

pub fn ease_in_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_hits_endpoints_exactly() {
        assert_eq!(lerp(0.62, 0.35, 0.0), 0.62);
        assert_eq!(lerp(0.62, 0.35, 1.0), 0.35);
    }

    #[test]
    fn approach_matches_rate_at_reference_frame() {
        let v = approach(0.0, 10.0, 0.1, 1.0 / REFERENCE_FPS);
        assert!((v - 1.0).abs() < 1e-9);
    }

    #[test]
    fn expo_out_is_monotonic() {
        let mut last = 0.0;
        for i in 0..=100 {
            let v = ease_out_expo(i as f64 / 100.0);
            assert!(v >= last);
            last = v;
        }
        assert_eq!(last, 1.0);
    }
}
