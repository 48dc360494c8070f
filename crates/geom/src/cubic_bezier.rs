use crate::traits::Transformation;
use crate::{Box2D, LineSegment, Point, QuadraticBezierSegment, Vector};

use core::ops::Range;

/// Upper bound on the number of line segments a single curve is flattened into.
///
/// Keeps pathological inputs (huge curves with a tiny tolerance) from allocating
/// unbounded amounts of memory.
pub const MAX_FLATTENING_SEGMENTS: u32 = 1 << 12;

/// A 2d curve segment defined by four points: the beginning of the segment, two control
/// points and the end of the segment.
///
/// The curve is defined by equation:
/// ```∀ t ∈ [0..1],  P(t) = (1 - t)³ * from + 3 * (1 - t)² * t * ctrl1 + 3 * t² * (1 - t) * ctrl2 + t³ * to```
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct CubicBezierSegment {
    pub from: Point,
    pub ctrl1: Point,
    pub ctrl2: Point,
    pub to: Point,
}

impl CubicBezierSegment {
    /// Sample the curve at t (expecting t between 0 and 1).
    pub fn sample(&self, t: f32) -> Point {
        let t2 = t * t;
        let t3 = t2 * t;
        let one_t = 1.0 - t;
        let one_t2 = one_t * one_t;
        let one_t3 = one_t2 * one_t;

        self.from * one_t3
            + self.ctrl1.to_vector() * 3.0 * one_t2 * t
            + self.ctrl2.to_vector() * 3.0 * one_t * t2
            + self.to.to_vector() * t3
    }

    /// Sample the curve's derivative at t (expecting t between 0 and 1).
    pub fn derivative(&self, t: f32) -> Vector {
        let t2 = t * t;
        let c0 = -3.0 * t2 + 6.0 * t - 3.0;
        let c1 = 9.0 * t2 - 12.0 * t + 3.0;
        let c2 = -9.0 * t2 + 6.0 * t;
        let c3 = 3.0 * t2;

        self.from.to_vector() * c0
            + self.ctrl1.to_vector() * c1
            + self.ctrl2.to_vector() * c2
            + self.to.to_vector() * c3
    }

    /// Return the sub-curve inside a given range of t.
    ///
    /// This is equivalent to splitting at the range's end points.
    pub fn split_range(&self, t_range: Range<f32>) -> Self {
        let (t0, t1) = (t_range.start, t_range.end);
        let from = self.sample(t0);
        let to = self.sample(t1);

        let d = QuadraticBezierSegment {
            from: (self.ctrl1 - self.from).to_point(),
            ctrl: (self.ctrl2 - self.ctrl1).to_point(),
            to: (self.to - self.ctrl2).to_point(),
        };

        let dt = t1 - t0;
        let ctrl1 = from + d.sample(t0).to_vector() * dt;
        let ctrl2 = to - d.sample(t1).to_vector() * dt;

        CubicBezierSegment {
            from,
            ctrl1,
            ctrl2,
            to,
        }
    }

    /// Split this curve into two sub-curves.
    pub fn split(&self, t: f32) -> (CubicBezierSegment, CubicBezierSegment) {
        let ctrl1a = self.from.lerp(self.ctrl1, t);
        let ctrl2a = self.ctrl1.lerp(self.ctrl2, t);
        let ctrl3a = self.ctrl2.lerp(self.to, t);
        let ctrl1aa = ctrl1a.lerp(ctrl2a, t);
        let ctrl2aa = ctrl2a.lerp(ctrl3a, t);
        let split_point = ctrl1aa.lerp(ctrl2aa, t);

        (
            CubicBezierSegment {
                from: self.from,
                ctrl1: ctrl1a,
                ctrl2: ctrl1aa,
                to: split_point,
            },
            CubicBezierSegment {
                from: split_point,
                ctrl1: ctrl2aa,
                ctrl2: ctrl3a,
                to: self.to,
            },
        )
    }

    /// Returns the line segment from the curve's start to its end.
    #[inline]
    pub fn baseline(&self) -> LineSegment {
        LineSegment {
            from: self.from,
            to: self.to,
        }
    }

    /// Returns whether all four points are within `tolerance` of the start point.
    pub fn is_a_point(&self, tolerance: f32) -> bool {
        let tolerance_squared = tolerance * tolerance;
        (self.from - self.to).square_length() <= tolerance_squared
            && (self.from - self.ctrl1).square_length() <= tolerance_squared
            && (self.to - self.ctrl2).square_length() <= tolerance_squared
    }

    /// Applies the transform to this curve and returns the results.
    #[inline]
    pub fn transformed<T: Transformation>(&self, transform: &T) -> Self {
        CubicBezierSegment {
            from: transform.transform_point(self.from),
            ctrl1: transform.transform_point(self.ctrl1),
            ctrl2: transform.transform_point(self.ctrl2),
            to: transform.transform_point(self.to),
        }
    }

    /// Swap the direction of the segment.
    pub fn flip(&self) -> Self {
        CubicBezierSegment {
            from: self.to,
            ctrl1: self.ctrl2,
            ctrl2: self.ctrl1,
            to: self.from,
        }
    }

    /// Returns a conservative bounding box for the curve.
    ///
    /// The curve lies inside the hull of its control points, so the box is
    /// cheap to compute but may be larger than the tight bounds.
    pub fn fast_bounding_box(&self) -> Box2D {
        Box2D {
            min: self.from.min(self.ctrl1).min(self.ctrl2.min(self.to)),
            max: self.from.max(self.ctrl1).max(self.ctrl2.max(self.to)),
        }
    }

    /// Number of line segments needed so that the polyline stays within
    /// `tolerance` of the curve.
    ///
    /// Uses Wang's formula on the second differences of the control polygon,
    /// clamped to `[1, MAX_FLATTENING_SEGMENTS]`.
    pub fn num_flattening_segments(&self, tolerance: f32) -> u32 {
        debug_assert!(tolerance > 0.0);

        let dd0 = self.from.to_vector() - self.ctrl1.to_vector() * 2.0 + self.ctrl2.to_vector();
        let dd1 = self.ctrl1.to_vector() - self.ctrl2.to_vector() * 2.0 + self.to.to_vector();
        let dd = dd0.length().max(dd1.length());

        let n = (0.75 * dd / tolerance).sqrt().ceil();
        if !n.is_finite() || n < 1.0 {
            return 1;
        }

        (n as u32).min(MAX_FLATTENING_SEGMENTS)
    }

    /// Iterates through the curve invoking a callback at each point.
    pub fn for_each_flattened<F: FnMut(&LineSegment)>(&self, tolerance: f32, callback: &mut F) {
        let mut from = self.from;
        for to in self.flattened(tolerance) {
            callback(&LineSegment { from, to });
            from = to;
        }
    }

    /// Returns the flattened representation of the curve as an iterator, starting *after* the
    /// current point.
    pub fn flattened(&self, tolerance: f32) -> Flattened {
        Flattened::new(self, tolerance)
    }

    /// Approximates the length of the curve by summing the lengths of its
    /// flattened segments.
    pub fn approximate_length(&self, tolerance: f32) -> f32 {
        let mut length = 0.0;

        self.for_each_flattened(tolerance, &mut |line| {
            length += line.length();
        });

        length
    }
}

/// An iterator over the points of a flattened cubic bézier segment.
///
/// The start point is not yielded, the end point always is.
pub struct Flattened {
    curve: CubicBezierSegment,
    num_segments: u32,
    current: u32,
}

impl Flattened {
    pub(crate) fn new(curve: &CubicBezierSegment, tolerance: f32) -> Self {
        Flattened {
            curve: *curve,
            num_segments: curve.num_flattening_segments(tolerance),
            current: 0,
        }
    }
}

impl Iterator for Flattened {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.current >= self.num_segments {
            return None;
        }

        self.current += 1;
        if self.current == self.num_segments {
            return Some(self.curve.to);
        }

        Some(self.curve.sample(self.current as f32 / self.num_segments as f32))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.num_segments - self.current) as usize;
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
use crate::point;

#[cfg(test)]
fn wavy() -> CubicBezierSegment {
    CubicBezierSegment {
        from: point(0.0, 0.0),
        ctrl1: point(10.0, 40.0),
        ctrl2: point(30.0, -40.0),
        to: point(40.0, 0.0),
    }
}

#[test]
fn split_matches_sample() {
    let curve = wavy();
    let (a, b) = curve.split(0.3);

    assert_eq!(a.from, curve.from);
    assert_eq!(b.to, curve.to);
    assert!((a.to - curve.sample(0.3)).length() < 1e-4);
    assert!((a.sample(0.5) - curve.sample(0.15)).length() < 1e-3);
    assert!((b.sample(0.5) - curve.sample(0.65)).length() < 1e-3);

    let sub = curve.split_range(0.25..0.75);
    assert!((sub.from - curve.sample(0.25)).length() < 1e-4);
    assert!((sub.to - curve.sample(0.75)).length() < 1e-4);
    assert!((sub.sample(0.5) - curve.sample(0.5)).length() < 1e-3);
}

#[test]
fn derivative_of_a_line() {
    let curve = CubicBezierSegment {
        from: point(0.0, 0.0),
        ctrl1: point(1.0, 0.0),
        ctrl2: point(2.0, 0.0),
        to: point(3.0, 0.0),
    };

    for i in 0..=4 {
        let d = curve.derivative(i as f32 / 4.0);
        assert!((d.x - 3.0).abs() < 1e-5);
        assert!(d.y.abs() < 1e-5);
    }
}

#[test]
fn flattening_stays_within_tolerance() {
    let curve = wavy();
    let tolerance = 0.1;

    let mut count = 0;
    let mut last = curve.from;
    curve.for_each_flattened(tolerance, &mut |segment| {
        assert_eq!(segment.from, last);
        // The midpoint of each chord must lie close to the curve.
        let mid = segment.sample(0.5);
        let mut closest = f32::MAX;
        for i in 0..=1000 {
            closest = closest.min((curve.sample(i as f32 / 1000.0) - mid).length());
        }
        assert!(closest <= tolerance * 1.5, "{:?}", closest);
        last = segment.to;
        count += 1;
    });

    assert_eq!(last, curve.to);
    assert_eq!(count, curve.num_flattening_segments(tolerance));

    let points: Vec<Point> = curve.flattened(tolerance).collect();
    assert_eq!(points.len() as u32, count);
    assert_eq!(points.last(), Some(&curve.to));
}

#[test]
fn flat_curve_is_one_segment() {
    let curve = CubicBezierSegment {
        from: point(0.0, 0.0),
        ctrl1: point(1.0, 1.0),
        ctrl2: point(2.0, 2.0),
        to: point(3.0, 3.0),
    };

    assert_eq!(curve.num_flattening_segments(0.25), 1);
    assert!((curve.approximate_length(0.25) - 18.0f32.sqrt()).abs() < 1e-4);
}

#[test]
fn fast_bounding_box_contains_curve() {
    let curve = wavy();
    let bounds = curve.fast_bounding_box();
    assert_eq!(bounds.min, point(0.0, -40.0));
    assert_eq!(bounds.max, point(40.0, 40.0));
    for i in 0..=20 {
        let p = curve.sample(i as f32 / 20.0);
        assert!(p.x >= bounds.min.x && p.x <= bounds.max.x);
        assert!(p.y >= bounds.min.y && p.y <= bounds.max.y);
    }
}
