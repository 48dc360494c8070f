//! Quadratic bézier curves.
//!
//! The rasterizer only deals with cubic curves, so quadratic segments are
//! degree-elevated as soon as they enter a path.

use crate::traits::Transformation;
use crate::{CubicBezierSegment, Point, Vector};

/// A 2d curve segment defined by three points: the beginning of the segment, a control
/// point and the end of the segment.
///
/// The curve is defined by equation:
/// ```∀ t ∈ [0..1],  P(t) = (1 - t)² * from + 2 * (1 - t) * t * ctrl + t² * to```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct QuadraticBezierSegment {
    pub from: Point,
    pub ctrl: Point,
    pub to: Point,
}

impl QuadraticBezierSegment {
    /// Sample the curve at t (expecting t between 0 and 1).
    pub fn sample(&self, t: f32) -> Point {
        let t2 = t * t;
        let one_t = 1.0 - t;
        let one_t2 = one_t * one_t;

        self.from * one_t2 + self.ctrl.to_vector() * 2.0 * one_t * t + self.to.to_vector() * t2
    }

    /// Sample the curve's derivative at t (expecting t between 0 and 1).
    pub fn derivative(&self, t: f32) -> Vector {
        ((self.ctrl - self.from) * (1.0 - t) + (self.to - self.ctrl) * t) * 2.0
    }

    /// Elevates the curve to an equivalent cubic bézier segment.
    ///
    /// Degree elevation is exact: both curves trace the same points.
    pub fn to_cubic(&self) -> CubicBezierSegment {
        CubicBezierSegment {
            from: self.from,
            ctrl1: (self.from + self.ctrl.to_vector() * 2.0) / 3.0,
            ctrl2: (self.to + self.ctrl.to_vector() * 2.0) / 3.0,
            to: self.to,
        }
    }

    /// Applies the transform to this curve and returns the results.
    #[inline]
    pub fn transformed<T: Transformation>(&self, transform: &T) -> Self {
        QuadraticBezierSegment {
            from: transform.transform_point(self.from),
            ctrl: transform.transform_point(self.ctrl),
            to: transform.transform_point(self.to),
        }
    }
}

#[test]
fn elevation_traces_the_same_curve() {
    use crate::point;

    let quadratic = QuadraticBezierSegment {
        from: point(0.0, 0.0),
        ctrl: point(6.0, 9.0),
        to: point(12.0, 0.0),
    };
    let cubic = quadratic.to_cubic();

    assert_eq!(cubic.from, quadratic.from);
    assert_eq!(cubic.to, quadratic.to);
    for i in 0..=10 {
        let t = i as f32 / 10.0;
        assert!((cubic.sample(t) - quadratic.sample(t)).length() < 1e-4);
    }
}
