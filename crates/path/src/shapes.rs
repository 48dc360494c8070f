//! Builders for common shapes.
//!
//! Every closed shape is added as a new closed sub-path, oriented according to
//! the requested `Winding`.

use crate::geom::Arc;
use crate::math::*;
use crate::{Path, Winding};

use core::f32::consts::PI;

// https://spencermortensen.com/articles/bezier-circle/
const CIRCLE_FACTOR: f32 = 0.55191505;

// Control arm length (relative to the radius) of a single cubic approximating
// a quadrant of the superellipse |x|⁴ + |y|⁴ = 1: the cubic's midpoint lands on
// the superellipse's diagonal point (2^-1/4, 2^-1/4).
const SQUIRCLE_FACTOR: f32 = 0.90893;

/// The radius of each corner of a rounded rectangle.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct BorderRadii {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_left: f32,
    pub bottom_right: f32,
}

impl BorderRadii {
    pub fn new(radius: f32) -> Self {
        let r = radius.abs();
        BorderRadii {
            top_left: r,
            top_right: r,
            bottom_left: r,
            bottom_right: r,
        }
    }
}

impl std::fmt::Display for BorderRadii {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // In the order of a well known convention (CSS) clockwise from top left
        write!(
            f,
            "BorderRadii({}, {}, {}, {})",
            self.top_left, self.top_right, self.bottom_right, self.bottom_left
        )
    }
}

impl Path {
    /// Adds an axis-aligned rectangle.
    pub fn add_rect(&mut self, rect: &Box2D, winding: Winding) {
        let corners = [
            rect.min,
            point(rect.max.x, rect.min.y),
            rect.max,
            point(rect.min.x, rect.max.y),
        ];

        self.add_closed_polygon(&corners, winding);
    }

    /// Adds an axis-aligned rectangle with rounded corners.
    ///
    /// Radii that do not fit in the rectangle are scaled down. With `squircle`
    /// set, the corners follow a superellipse instead of a quarter circle,
    /// which gives a smoother transition between the edges and the corners.
    pub fn add_round_rect(
        &mut self,
        rect: &Box2D,
        radii: &BorderRadii,
        squircle: bool,
        winding: Winding,
    ) {
        let w = rect.width();
        let h = rect.height();
        let x_min = rect.min.x;
        let y_min = rect.min.y;
        let x_max = rect.max.x;
        let y_max = rect.max.y;
        let min_wh = w.min(h);
        let mut tl = radii.top_left.abs().min(min_wh);
        let mut tr = radii.top_right.abs().min(min_wh);
        let mut bl = radii.bottom_left.abs().min(min_wh);
        let mut br = radii.bottom_right.abs().min(min_wh);

        // clamp border radii if they don't fit in the rectangle.
        if tl + tr > w {
            let x = (tl + tr - w) * 0.5;
            tl -= x;
            tr -= x;
        }
        if bl + br > w {
            let x = (bl + br - w) * 0.5;
            bl -= x;
            br -= x;
        }
        if tr + br > h {
            let x = (tr + br - h) * 0.5;
            tr -= x;
            br -= x;
        }
        if tl + bl > h {
            let x = (tl + bl - h) * 0.5;
            tl -= x;
            bl -= x;
        }

        let factor = if squircle {
            SQUIRCLE_FACTOR
        } else {
            CIRCLE_FACTOR
        };
        // Distance from the corner to the control points along each edge.
        let tl_d = tl * (1.0 - factor);
        let tr_d = tr * (1.0 - factor);
        let br_d = br * (1.0 - factor);
        let bl_d = bl * (1.0 - factor);

        let tl_corner = point(x_min, y_min);
        let tr_corner = point(x_max, y_min);
        let br_corner = point(x_max, y_max);
        let bl_corner = point(x_min, y_max);

        // Each corner: curve start, two control points, curve end, in the
        // positive (clockwise on screen) order.
        let corners = [
            (
                tl,
                [
                    tl_corner + vector(0.0, tl),
                    tl_corner + vector(0.0, tl_d),
                    tl_corner + vector(tl_d, 0.0),
                    tl_corner + vector(tl, 0.0),
                ],
            ),
            (
                tr,
                [
                    tr_corner + vector(-tr, 0.0),
                    tr_corner + vector(-tr_d, 0.0),
                    tr_corner + vector(0.0, tr_d),
                    tr_corner + vector(0.0, tr),
                ],
            ),
            (
                br,
                [
                    br_corner + vector(0.0, -br),
                    br_corner + vector(0.0, -br_d),
                    br_corner + vector(-br_d, 0.0),
                    br_corner + vector(-br, 0.0),
                ],
            ),
            (
                bl,
                [
                    bl_corner + vector(bl, 0.0),
                    bl_corner + vector(bl_d, 0.0),
                    bl_corner + vector(0.0, -bl_d),
                    bl_corner + vector(0.0, -bl),
                ],
            ),
        ];

        match winding {
            Winding::Positive => {
                self.move_to(corners[0].1[0]);
                for (i, (radius, p)) in corners.iter().enumerate() {
                    if i > 0 {
                        self.line_to(p[0]);
                    }
                    if *radius > 0.0 {
                        self.cubic_to(p[1], p[2], p[3]);
                    }
                }
            }
            Winding::Negative => {
                self.move_to(corners[3].1[3]);
                for (i, (radius, p)) in corners.iter().rev().enumerate() {
                    if i > 0 {
                        self.line_to(p[3]);
                    }
                    if *radius > 0.0 {
                        self.cubic_to(p[2], p[1], p[0]);
                    }
                }
            }
        }

        self.close();
    }

    /// Adds an ellipse, approximated with four cubic bézier curves.
    pub fn add_ellipse(
        &mut self,
        center: Point,
        radii: Vector,
        x_rotation: Angle,
        winding: Winding,
    ) {
        let sweep = match winding {
            Winding::Positive => Angle::two_pi(),
            Winding::Negative => -Angle::two_pi(),
        };

        let arc = Arc {
            center,
            radii: vector(radii.x.abs(), radii.y.abs()),
            start_angle: Angle::zero(),
            sweep_angle: sweep,
            x_rotation,
        };

        self.add_arc(&arc, true);
        self.close();
    }

    /// Adds a circle, approximated with four cubic bézier curves.
    pub fn add_circle(&mut self, center: Point, radius: f32, winding: Winding) {
        let r = radius.abs();
        let d = r * CIRCLE_FACTOR;
        let dir = match winding {
            Winding::Positive => 1.0,
            Winding::Negative => -1.0,
        };

        self.move_to(center + vector(r, 0.0));
        self.cubic_to(
            center + vector(r, d * dir),
            center + vector(d, r * dir),
            center + vector(0.0, r * dir),
        );
        self.cubic_to(
            center + vector(-d, r * dir),
            center + vector(-r, d * dir),
            center + vector(-r, 0.0),
        );
        self.cubic_to(
            center + vector(-r, -d * dir),
            center + vector(-d, -r * dir),
            center + vector(0.0, -r * dir),
        );
        self.cubic_to(
            center + vector(d, -r * dir),
            center + vector(r, -d * dir),
            center + vector(r, 0.0),
        );
        self.close();
    }

    /// Adds a closed polygon through the given points, in order.
    ///
    /// Nothing is added for an empty slice.
    pub fn add_polygon(&mut self, points: &[Point]) {
        self.add_polyline(points);
        if !points.is_empty() {
            self.close();
        }
    }

    /// Adds an open polyline through the given points, in order.
    pub fn add_polyline(&mut self, points: &[Point]) {
        let mut iter = points.iter();
        if let Some(first) = iter.next() {
            self.move_to(*first);
            for p in iter {
                self.line_to(*p);
            }
        }
    }

    /// Adds a regular star with `num_points` tips.
    ///
    /// The tips lie on the circle of radius `outer_radius` and the inner
    /// vertices on the circle of radius `inner_radius`. The first tip is at
    /// `start_angle`, vertices follow in the positive direction. Fewer than
    /// two tips add nothing.
    pub fn add_polystar(
        &mut self,
        center: Point,
        num_points: u32,
        outer_radius: f32,
        inner_radius: f32,
        start_angle: Angle,
    ) {
        if num_points < 2 {
            return;
        }

        let step = PI / num_points as f32;
        let vertices: Vec<Point> = (0..num_points * 2)
            .map(|i| {
                let radius = if i % 2 == 0 {
                    outer_radius
                } else {
                    inner_radius
                };
                let (sin, cos) = (start_angle.radians + step * i as f32).sin_cos();
                center + vector(cos, sin) * radius
            })
            .collect();

        self.add_polygon(&vertices);
    }

    fn add_closed_polygon(&mut self, points: &[Point], winding: Winding) {
        match winding {
            Winding::Positive => {
                self.add_polygon(points);
            }
            Winding::Negative => {
                let reversed: Vec<Point> = points.iter().rev().copied().collect();
                self.add_polygon(&reversed);
            }
        }
    }
}

#[cfg(test)]
fn signed_area(path: &Path) -> f32 {
    // Shoelace formula over the flattened path.
    let flattened = path.flattened(0.01);
    let mut area = 0.0;
    for contour in flattened.contours() {
        let points = flattened.contour_points(contour);
        for i in 0..points.len() {
            let a = points[i];
            let b = points[(i + 1) % points.len()];
            area += a.x * b.y - b.x * a.y;
        }
    }

    area * 0.5
}

#[test]
fn rect_winding() {
    let mut path = Path::new();
    path.add_rect(&box2d(0.0, 0.0, 10.0, 5.0), Winding::Positive);
    assert!(path.is_closed());
    assert_eq!(signed_area(&path), 50.0);

    let mut path = Path::new();
    path.add_rect(&box2d(0.0, 0.0, 10.0, 5.0), Winding::Negative);
    assert_eq!(signed_area(&path), -50.0);
}

#[test]
fn circle_area() {
    let mut path = Path::new();
    path.add_circle(point(0.0, 0.0), 10.0, Winding::Positive);
    let area = signed_area(&path);
    assert!((area - PI * 100.0).abs() < 1.0, "{}", area);

    let mut path = Path::new();
    path.add_ellipse(point(0.0, 0.0), vector(10.0, 10.0), Angle::zero(), Winding::Negative);
    let area = signed_area(&path);
    assert!((area + PI * 100.0).abs() < 1.0, "{}", area);
}

#[test]
fn round_rect_radii() {
    let rect = box2d(0.0, 0.0, 20.0, 10.0);

    let mut sharp = Path::new();
    sharp.add_round_rect(&rect, &BorderRadii::new(0.0), false, Winding::Positive);
    assert!((signed_area(&sharp) - 200.0).abs() < 1e-3);

    let mut round = Path::new();
    round.add_round_rect(&rect, &BorderRadii::new(4.0), false, Winding::Positive);
    let round_area = signed_area(&round);
    // Each corner removes r² - πr²/4 from the rectangle.
    let expected = 200.0 - 4.0 * (16.0 - PI * 4.0);
    assert!((round_area - expected).abs() < 0.2, "{}", round_area);

    let mut squircle = Path::new();
    squircle.add_round_rect(&rect, &BorderRadii::new(4.0), true, Winding::Positive);
    let squircle_area = signed_area(&squircle);
    assert!(squircle_area > round_area);
    assert!(squircle_area < 200.0);

    let mut negative = Path::new();
    negative.add_round_rect(&rect, &BorderRadii::new(4.0), false, Winding::Negative);
    assert!((signed_area(&negative) + round_area).abs() < 1e-2);

    // Radii larger than the rectangle are clamped.
    let mut pill = Path::new();
    pill.add_round_rect(&rect, &BorderRadii::new(100.0), false, Winding::Positive);
    let bounds = pill.bounding_box_approx();
    assert_eq!(bounds, rect);
}

#[test]
fn polystar_and_polyline() {
    let mut star = Path::new();
    star.add_polystar(point(0.0, 0.0), 5, 10.0, 4.0, Angle::zero());
    assert_eq!(star.points().len(), 10);
    assert!(star.is_closed());
    assert_eq!(star.points()[0], point(10.0, 0.0));
    assert!(signed_area(&star) > 0.0);

    let mut line = Path::new();
    line.add_polyline(&[point(0.0, 0.0), point(1.0, 0.0), point(1.0, 1.0)]);
    assert!(!line.is_closed());
    assert_eq!(line.elements().len(), 3);

    let mut nothing = Path::new();
    nothing.add_polygon(&[]);
    nothing.add_polystar(point(0.0, 0.0), 1, 10.0, 4.0, Angle::zero());
    assert!(nothing.is_empty());
}
