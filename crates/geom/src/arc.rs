//! Elliptic arc related maths and tools.
//!
//! Arcs never reach the rasterizer as such: they are converted into cubic bézier
//! segments, at most one per quarter turn.

use crate::{point, vector, Angle, CubicBezierSegment, LineSegment, Point, Rotation, Vector};
use arrayvec::ArrayVec;

use core::f32::consts::{FRAC_PI_2, PI};

/// An elliptic arc curve segment using the SVG's end-point notation.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct SvgArc {
    pub from: Point,
    pub to: Point,
    pub radii: Vector,
    pub x_rotation: Angle,
    pub flags: ArcFlags,
}

/// An elliptic arc curve segment.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Arc {
    pub center: Point,
    pub radii: Vector,
    pub start_angle: Angle,
    pub sweep_angle: Angle,
    pub x_rotation: Angle,
}

/// Flag parameters for arcs as described by the SVG specification.
///
/// For most situations using the SVG arc notation, there are four different arcs
/// (two different ellipses, each with two different arc sweeps) that satisfy the
/// arc parameters. The `large_arc` and `sweep` flags indicate which one of the
/// four arcs are drawn.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct ArcFlags {
    /// Of the four candidate arc sweeps, two will represent an arc sweep of greater
    /// than or equal to 180 degrees (the "large-arc"), and two will represent an arc
    /// sweep of less than or equal to 180 degrees (the "small arc"). If `large_arc`
    /// is true, then one of the two larger arc sweeps will be chosen; otherwise one of
    /// the smaller arc sweeps will be chosen.
    pub large_arc: bool,
    /// If `sweep` is true, then the arc will be drawn in a "positive-angle" direction
    /// (the angle increases as the arc is drawn).
    pub sweep: bool,
}

impl Arc {
    /// A full circle, starting and ending at `center + (radius, 0)`.
    pub fn circle(center: Point, radius: f32) -> Self {
        Arc {
            center,
            radii: vector(radius, radius),
            start_angle: Angle::zero(),
            sweep_angle: Angle::two_pi(),
            x_rotation: Angle::zero(),
        }
    }

    /// Converts an SVG end-point arc into its center parameterization.
    ///
    /// Radii that are too small to connect both end points are scaled up
    /// uniformly. The caller is expected to have checked
    /// `SvgArc::is_straight_line` first.
    pub fn from_svg_arc(arc: &SvgArc) -> Arc {
        debug_assert!(!arc.is_straight_line());

        let mut rx = arc.radii.x.abs();
        let mut ry = arc.radii.y.abs();

        let rotation = Rotation::new(arc.x_rotation);
        let half_delta = (arc.from - arc.to) / 2.0;
        let p = rotation.inverse().transform_vector(half_delta);

        let lambda = (p.x * p.x) / (rx * rx) + (p.y * p.y) / (ry * ry);
        if lambda > 1.0 {
            let s = lambda.sqrt();
            rx *= s;
            ry *= s;
        }

        let rx2 = rx * rx;
        let ry2 = ry * ry;
        let num = rx2 * ry2 - rx2 * p.y * p.y - ry2 * p.x * p.x;
        let den = rx2 * p.y * p.y + ry2 * p.x * p.x;
        let mut coef = if den > 0.0 { (num / den).max(0.0).sqrt() } else { 0.0 };
        if arc.flags.large_arc == arc.flags.sweep {
            coef = -coef;
        }

        let center_prime = vector(coef * rx * p.y / ry, -coef * ry * p.x / rx);
        let mid = arc.from.lerp(arc.to, 0.5);
        let center = mid + rotation.transform_vector(center_prime);

        let u = vector((p.x - center_prime.x) / rx, (p.y - center_prime.y) / ry);
        let v = vector((-p.x - center_prime.x) / rx, (-p.y - center_prime.y) / ry);

        let start_angle = u.y.atan2(u.x);
        let mut sweep_angle = u.cross(v).atan2(u.dot(v));
        if arc.flags.sweep && sweep_angle < 0.0 {
            sweep_angle += 2.0 * PI;
        } else if !arc.flags.sweep && sweep_angle > 0.0 {
            sweep_angle -= 2.0 * PI;
        }

        Arc {
            center,
            radii: vector(rx, ry),
            start_angle: Angle::radians(start_angle),
            sweep_angle: Angle::radians(sweep_angle),
            x_rotation: arc.x_rotation,
        }
    }

    /// Sample the curve at t (expecting t between 0 and 1).
    #[inline]
    pub fn sample(&self, t: f32) -> Point {
        self.center + self.offset_at_angle(self.get_angle(t))
    }

    /// Sample the curve's tangent at t (expecting t between 0 and 1).
    #[inline]
    pub fn sample_tangent(&self, t: f32) -> Vector {
        self.tangent_at_angle(self.get_angle(t)) * self.sweep_angle.radians
    }

    /// Sample the curve's angle at t (expecting t between 0 and 1).
    #[inline]
    pub fn get_angle(&self, t: f32) -> Angle {
        self.start_angle + Angle::radians(self.sweep_angle.radians * t)
    }

    #[inline]
    pub fn end_angle(&self) -> Angle {
        self.start_angle + self.sweep_angle
    }

    #[inline]
    pub fn from(&self) -> Point {
        self.sample(0.0)
    }

    #[inline]
    pub fn to(&self) -> Point {
        self.sample(1.0)
    }

    /// Approximates the arc with cubic bézier segments.
    ///
    /// Each segment covers at most a quarter turn. Sweeps beyond a full turn
    /// are clamped to a full turn, so at most four segments are produced.
    pub fn to_cubic_beziers(&self) -> ArrayVec<CubicBezierSegment, 4> {
        let mut result = ArrayVec::new();

        let sweep = self.sweep_angle.radians.max(-2.0 * PI).min(2.0 * PI);
        if sweep == 0.0 || !sweep.is_finite() {
            return result;
        }

        let n = ((sweep.abs() / FRAC_PI_2).ceil() as usize).max(1).min(4);
        let step = sweep / n as f32;
        // Length of the control arms for a unit circle arc of angle `step`.
        let k = 4.0 / 3.0 * (step / 4.0).tan();

        let mut a0 = self.start_angle.radians;
        let mut from = self.center + self.offset_at_angle(Angle::radians(a0));
        for i in 0..n {
            let a1 = if i + 1 == n {
                self.start_angle.radians + sweep
            } else {
                a0 + step
            };
            let to = self.center + self.offset_at_angle(Angle::radians(a1));

            result.push(CubicBezierSegment {
                from,
                ctrl1: from + self.tangent_at_angle(Angle::radians(a0)) * k,
                ctrl2: to - self.tangent_at_angle(Angle::radians(a1)) * k,
                to,
            });

            a0 = a1;
            from = to;
        }

        result
    }

    /// Iterates through the cubic bézier segments approximating the arc.
    pub fn for_each_cubic_bezier<F>(&self, cb: &mut F)
    where
        F: FnMut(&CubicBezierSegment),
    {
        for curve in &self.to_cubic_beziers() {
            cb(curve);
        }
    }

    fn offset_at_angle(&self, angle: Angle) -> Vector {
        let (sin, cos) = angle.sin_cos();
        Rotation::new(self.x_rotation)
            .transform_vector(vector(self.radii.x * cos, self.radii.y * sin))
    }

    // Derivative of the ellipse with respect to the angle.
    fn tangent_at_angle(&self, angle: Angle) -> Vector {
        let (sin, cos) = angle.sin_cos();
        Rotation::new(self.x_rotation)
            .transform_vector(vector(-self.radii.x * sin, self.radii.y * cos))
    }
}

impl SvgArc {
    /// Per SVG, an arc with coincident end points draws nothing and an arc with a
    /// zero radius is drawn as a straight line.
    pub fn is_straight_line(&self) -> bool {
        self.radii.x.abs() <= 1e-5 || self.radii.y.abs() <= 1e-5 || self.from == self.to
    }

    /// Converts the arc into its center parameterization.
    pub fn to_arc(&self) -> Arc {
        Arc::from_svg_arc(self)
    }

    /// Returns the arc as a line segment when it degenerates into one.
    pub fn to_line_segment(&self) -> Option<LineSegment> {
        if self.is_straight_line() {
            return Some(LineSegment {
                from: self.from,
                to: self.to,
            });
        }

        None
    }

    /// Iterates through the cubic bézier segments approximating the arc.
    ///
    /// Degenerate arcs produce nothing; use `to_line_segment` for them.
    pub fn for_each_cubic_bezier<F>(&self, cb: &mut F)
    where
        F: FnMut(&CubicBezierSegment),
    {
        if self.is_straight_line() {
            return;
        }

        self.to_arc().for_each_cubic_bezier(cb);
    }
}

#[cfg(test)]
fn assert_close(a: Point, b: Point) {
    assert!((a - b).length() < 1e-3, "{:?} != {:?}", a, b);
}

#[test]
fn full_circle_is_four_cubics() {
    let arc = Arc::circle(point(10.0, 10.0), 5.0);
    let curves = arc.to_cubic_beziers();

    assert_eq!(curves.len(), 4);
    assert_close(curves[0].from, point(15.0, 10.0));
    assert_close(curves[3].to, point(15.0, 10.0));
    for curve in &curves {
        // Quarter circle cubics deviate from the circle by less than 0.03%.
        let mid = curve.sample(0.5);
        assert!(((mid - point(10.0, 10.0)).length() - 5.0).abs() < 5.0 * 3e-4);
    }
}

#[test]
fn small_sweep_is_one_cubic() {
    let arc = Arc {
        center: point(0.0, 0.0),
        radii: vector(1.0, 1.0),
        start_angle: Angle::zero(),
        sweep_angle: Angle::radians(-0.5),
        x_rotation: Angle::zero(),
    };

    let mut count = 0;
    arc.for_each_cubic_bezier(&mut |curve| {
        assert_close(curve.from, arc.from());
        assert_close(curve.to, arc.to());
        count += 1;
    });
    assert_eq!(count, 1);
}

#[test]
fn svg_arc_end_points() {
    let svg = SvgArc {
        from: point(0.0, 0.0),
        to: point(10.0, 0.0),
        radii: vector(5.0, 5.0),
        x_rotation: Angle::zero(),
        flags: ArcFlags {
            large_arc: false,
            sweep: true,
        },
    };

    let arc = svg.to_arc();
    assert_close(arc.center, point(5.0, 0.0));
    assert!((arc.sweep_angle.radians - PI).abs() < 1e-4);
    assert_close(arc.from(), svg.from);
    assert_close(arc.to(), svg.to);
}

#[test]
fn svg_arc_radii_scaled_up() {
    let svg = SvgArc {
        from: point(0.0, 0.0),
        to: point(10.0, 0.0),
        radii: vector(1.0, 1.0),
        x_rotation: Angle::zero(),
        flags: ArcFlags::default(),
    };

    let arc = svg.to_arc();
    assert!((arc.radii.x - 5.0).abs() < 1e-4);
    assert_close(arc.from(), svg.from);
    assert_close(arc.to(), svg.to);
}

#[test]
fn degenerate_svg_arc() {
    let svg = SvgArc {
        from: point(0.0, 0.0),
        to: point(10.0, 3.0),
        radii: vector(0.0, 4.0),
        x_rotation: Angle::zero(),
        flags: ArcFlags::default(),
    };

    assert!(svg.is_straight_line());
    assert_eq!(
        svg.to_line_segment(),
        Some(LineSegment {
            from: point(0.0, 0.0),
            to: point(10.0, 3.0)
        })
    );
    let mut count = 0;
    svg.for_each_cubic_bezier(&mut |_| count += 1);
    assert_eq!(count, 0);
}
