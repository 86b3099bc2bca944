//! Placement helpers shared by the mascot and the intro sequence.

use crate::math::Vec2;
use crate::signals::Viewport;

/// Where the mascot sits when its hero anchor element is missing: right of
/// centre, a little above the fold.
pub fn fallback_anchor(viewport: Viewport) -> Vec2 {
    Vec2::new(viewport.width * 0.72, viewport.height * 0.45)
}

/// Keeps a box of `half_extent` around `p` inside the viewport with `margin`.
pub fn clamp_to_viewport(p: Vec2, half_extent: Vec2, margin: f64, viewport: Viewport) -> Vec2 {
    let clamp_axis = |v: f64, half: f64, size: f64| {
        let lo = margin + half;
        let hi = size - margin - half;
        if hi < lo {
            size * 0.5
        } else {
            v.clamp(lo, hi)
        }
    };
    Vec2::new(
        clamp_axis(p.x, half_extent.x, viewport.width),
        clamp_axis(p.y, half_extent.y, viewport.height),
    )
}

/// Screen-space transform written to an element's style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Centre of the element in viewport pixels.
    pub position: Vec2,
    pub scale: f64,
    /// Degrees, clockwise.
    pub rotation: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            scale: 1.0,
            rotation: 0.0,
        }
    }
}

impl Transform {
    /// CSS for a fixed-position element whose origin is its top-left corner
    /// and whose unscaled size is `size`.
    pub fn to_css(&self, size: Vec2) -> String {
        let x = self.position.x - size.x * 0.5;
        let y = self.position.y - size.y * 0.5;
        format!(
            "translate3d({x:.2}px, {y:.2}px, 0) rotate({:.2}deg) scale({:.4})",
            self.rotation, self.scale
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn css_uses_top_left_origin() {
        let t = Transform {
            position: Vec2::new(100.0, 50.0),
            scale: 0.5,
            rotation: -3.0,
        };
        assert_eq!(
            t.to_css(Vec2::new(40.0, 20.0)),
            "translate3d(80.00px, 40.00px, 0) rotate(-3.00deg) scale(0.5000)"
        );
    }

    #[test]
    fn clamp_falls_back_to_centre_when_box_is_too_big() {
        let p = clamp_to_viewport(
            Vec2::new(-50.0, 10.0),
            Vec2::new(300.0, 10.0),
            16.0,
            Viewport::new(400.0, 300.0),
        );
        assert_eq!(p, Vec2::new(200.0, 26.0));
    }
}
