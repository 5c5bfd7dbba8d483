use serde::{Deserialize, Serialize};

use crate::foundation::core::{Point, Vec2};

/// Tunable constants of the damped rotational title motion.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionParams {
    /// Initial scatter radius scale in pixels.
    pub amplitude: f64,
    /// Additive term of the damping denominator; `d(0) = 1 / damping_bias`.
    pub damping_bias: f64,
    /// Exponent of `t` in the damping denominator.
    pub damping_exponent: f64,
    /// Scale of the rotation angle applied on top of the phase angle.
    pub rotation_gain: f64,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            amplitude: 400.0,
            damping_bias: 0.3,
            damping_exponent: 8.0,
            rotation_gain: 0.5,
        }
    }
}

impl MotionParams {
    /// `d(t) = 1 / (bias + t^exponent)`.
    pub fn damping(&self, t: f64) -> f64 {
        1.0 / (self.damping_bias + t.max(0.0).powf(self.damping_exponent))
    }
}

/// Rotate `v` by `angle` radians using the screen-space convention (y down).
pub fn rotate(v: Vec2, angle: f64) -> Vec2 {
    let (s, c) = angle.sin_cos();
    Vec2::new(c * v.x + s * v.y, -s * v.x + c * v.y)
}

/// Deterministic motion of one glyph towards its resting position.
///
/// Depends only on the glyph index, the glyph count and the motion constants.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trajectory {
    /// Resting top-left position of the glyph.
    pub base: Point,
    /// Glyph index in discovery order.
    pub index: usize,
    /// Total glyph count of the title.
    pub count: usize,
    /// Motion constants.
    pub params: MotionParams,
}

impl Trajectory {
    /// Phase angle `a = i * pi / n`.
    pub fn phase(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.index as f64 * std::f64::consts::PI / self.count as f64
    }

    /// Unit scatter direction: `(-1, 0)` rotated by the phase, mirrored vertically on odd indices.
    pub fn direction(&self) -> Vec2 {
        let mut v = rotate(Vec2::new(-1.0, 0.0), self.phase());
        if self.index % 2 == 1 {
            v.y = -v.y;
        }
        v
    }

    /// Displacement from the resting position at `t` seconds.
    pub fn offset_at(&self, t: f64) -> Vec2 {
        let d = self.params.damping(t);
        let spin = self.params.rotation_gain * d * self.phase();
        rotate(self.direction(), spin) * (self.params.amplitude * d)
    }

    /// Absolute top-left position at `t` seconds.
    pub fn position_at(&self, t: f64) -> Point {
        self.base + self.offset_at(t)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/title/trajectory.rs"]
mod tests;
