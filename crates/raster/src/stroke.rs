//! Conversion of strokes into fillable outlines.
//!
//! The outline is a union of simple pieces: one quadrilateral per segment of
//! the flattened path, one piece per join and one per cap. Every piece is a
//! closed sub-path with a positive orientation, so filling the outline with
//! the non-zero rule covers the union of the pieces, overlaps included.

use crate::geom::{Line, COLLINEAR_EPSILON};
use crate::math::*;
use crate::path::Path;
use crate::{LineCap, LineJoin, StrokeOptions};

use core::f32::consts::PI;

/// Builds the outline of the stroke of `path`, to be filled with
/// `FillRule::NonZero`.
///
/// The dash pattern of the options, if any, is applied first. Strokes with a
/// zero, negative or non-finite width produce an empty path.
pub fn stroke_to_path(path: &Path, options: &StrokeOptions) -> Path {
    let mut output = Path::new();
    if !options.line_width.is_finite() || options.line_width <= 0.0 {
        log::debug!("Stroke width {} produces no outline.", options.line_width);
        return output;
    }

    let dashed;
    let source = if options.dash_array.is_empty() {
        path
    } else {
        dashed = path.dashed_with_tolerance(
            &options.dash_array,
            options.dash_offset,
            options.tolerance,
        );
        &dashed
    };

    let flattened = source.flattened(options.tolerance);

    let mut stroker = Stroker {
        options,
        half_width: options.line_width * 0.5,
        output: &mut output,
    };

    let mut points = Vec::new();
    for (contour, closed) in flattened.iter() {
        points.clear();
        for p in contour {
            if points.last() != Some(p) {
                points.push(*p);
            }
        }

        if closed && points.len() > 1 && points.first() == points.last() {
            points.pop();
        }

        match points.len() {
            0 => {}
            // A lone move-to draws nothing, other zero length sub-paths get a dot.
            1 if contour.len() > 1 || closed => stroker.dot(points[0]),
            1 => {}
            _ => stroker.contour(&points, closed),
        }
    }

    output
}

struct Stroker<'l> {
    options: &'l StrokeOptions,
    half_width: f32,
    output: &'l mut Path,
}

impl<'l> Stroker<'l> {
    fn contour(&mut self, points: &[Point], closed: bool) {
        let n = points.len();
        let num_segments = if closed { n } else { n - 1 };
        let tangent = |i: usize| (points[(i + 1) % n] - points[i]).normalize();

        for i in 0..num_segments {
            self.segment(points[i], points[(i + 1) % n]);
        }

        if closed {
            for i in 0..n {
                self.join(points[i], tangent((i + n - 1) % n), tangent(i));
            }
        } else {
            for i in 1..n - 1 {
                self.join(points[i], tangent(i - 1), tangent(i));
            }

            self.cap(points[0], -tangent(0));
            self.cap(points[n - 1], tangent(n - 2));
        }
    }

    fn segment(&mut self, from: Point, to: Point) {
        let offset = normal((to - from).normalize()) * self.half_width;
        add_oriented_polygon(
            self.output,
            &[from + offset, to + offset, to - offset, from - offset],
        );
    }

    fn join(&mut self, at: Point, t0: Vector, t1: Vector) {
        let cross = t0.cross(t1);
        if cross.abs() < COLLINEAR_EPSILON && t0.dot(t1) > 0.0 {
            return;
        }

        // The join goes on the outer side of the turn.
        let side: f32 = if cross > 0.0 { -1.0 } else { 1.0 };
        let n0 = normal(t0) * side;
        let n1 = normal(t1) * side;
        let hw = self.half_width;

        match self.options.line_join {
            LineJoin::Bevel => self.bevel(at, n0, n1),
            LineJoin::Miter => {
                // The tip is where the outer offset edges meet.
                let edge0 = Line {
                    point: at + n0 * hw,
                    vector: t0,
                };
                let edge1 = Line {
                    point: at + n1 * hw,
                    vector: t1,
                };

                match edge0.intersection(&edge1) {
                    Some(miter) if (miter - at).length() <= self.options.miter_limit * hw => {
                        add_oriented_polygon(self.output, &[at, edge0.point, miter, edge1.point]);
                    }
                    _ => self.bevel(at, n0, n1),
                }
            }
            LineJoin::Round => {
                let mut start = n0;
                let mut sweep = n0.cross(n1).atan2(n0.dot(n1));
                if sweep < 0.0 {
                    start = n1;
                    sweep = -sweep;
                }

                self.output.move_to(at);
                self.output.arc_to(
                    at,
                    vector(hw, hw),
                    Angle::radians(start.y.atan2(start.x)),
                    Angle::radians(sweep),
                    false,
                );
                self.output.close();
            }
        }
    }

    fn bevel(&mut self, at: Point, n0: Vector, n1: Vector) {
        let hw = self.half_width;
        add_oriented_polygon(self.output, &[at, at + n0 * hw, at + n1 * hw]);
    }

    /// `direction` points away from the sub-path.
    fn cap(&mut self, at: Point, direction: Vector) {
        let hw = self.half_width;
        let n = normal(direction) * hw;
        match self.options.line_cap {
            LineCap::Butt => {}
            LineCap::Square => {
                let d = direction * hw;
                add_oriented_polygon(self.output, &[at + n, at + n + d, at - n + d, at - n]);
            }
            LineCap::Round => {
                let start = -n;
                self.output.arc_to(
                    at,
                    vector(hw, hw),
                    Angle::radians(start.y.atan2(start.x)),
                    Angle::radians(PI),
                    true,
                );
                self.output.close();
            }
        }
    }

    fn dot(&mut self, at: Point) {
        let hw = self.half_width;
        match self.options.line_cap {
            LineCap::Butt => {}
            LineCap::Square => {
                let rect = box2d(at.x - hw, at.y - hw, at.x + hw, at.y + hw);
                self.output.add_rect(&rect, crate::path::Winding::Positive);
            }
            LineCap::Round => {
                self.output.add_circle(at, hw, crate::path::Winding::Positive);
            }
        }
    }
}

#[inline]
fn normal(tangent: Vector) -> Vector {
    vector(-tangent.y, tangent.x)
}

fn signed_area(points: &[Point]) -> f32 {
    let mut area = 0.0;
    let mut prev = match points.last() {
        Some(p) => *p,
        None => return 0.0,
    };
    for p in points {
        area += prev.to_vector().cross(p.to_vector());
        prev = *p;
    }

    area * 0.5
}

/// Adds a closed polygon with a positive orientation, reversing the points if
/// needed. Degenerate polygons are skipped.
fn add_oriented_polygon(output: &mut Path, points: &[Point]) {
    let area = signed_area(points);
    if area.abs() < 1e-6 || !area.is_finite() {
        return;
    }

    if area > 0.0 {
        output.add_polygon(points);
    } else {
        let mut reversed = points.to_vec();
        reversed.reverse();
        output.add_polygon(&reversed);
    }
}

#[cfg(test)]
fn line(from: Point, to: Point) -> Path {
    let mut path = Path::new();
    path.move_to(from);
    path.line_to(to);
    path
}

#[cfg(test)]
fn assert_positive_pieces(outline: &Path) {
    for (points, closed) in outline.flattened(0.01).iter() {
        assert!(closed);
        assert!(signed_area(points) > 0.0, "{:?}", points);
    }
}

#[cfg(test)]
fn assert_box_eq(a: Box2D, b: Box2D) {
    assert!((a.min - b.min).length() < 1e-3, "{:?} != {:?}", a, b);
    assert!((a.max - b.max).length() < 1e-3, "{:?} != {:?}", a, b);
}

#[test]
fn butt_line() {
    let path = line(point(0.0, 5.0), point(10.0, 5.0));
    let outline = stroke_to_path(&path, &StrokeOptions::default().with_line_width(2.0));

    assert_box_eq(outline.bounding_box_approx(), box2d(0.0, 4.0, 10.0, 6.0));
    assert_positive_pieces(&outline);
}

#[test]
fn caps() {
    let path = line(point(0.0, 5.0), point(10.0, 5.0));

    let square = StrokeOptions::default()
        .with_line_width(2.0)
        .with_line_cap(LineCap::Square);
    let outline = stroke_to_path(&path, &square);
    assert_box_eq(outline.bounding_box_approx(), box2d(-1.0, 4.0, 11.0, 6.0));
    assert_positive_pieces(&outline);

    let round = square.clone().with_line_cap(LineCap::Round);
    let outline = stroke_to_path(&path, &round);
    let bounds = outline.flattened(0.01).bounding_box().unwrap();
    assert_box_eq(bounds, box2d(-1.0, 4.0, 11.0, 6.0));
    assert_positive_pieces(&outline);
}

#[test]
fn zero_length_subpaths() {
    let mut path = Path::new();
    path.move_to(point(5.0, 5.0));
    path.line_to(point(5.0, 5.0));

    let butt = StrokeOptions::default().with_line_width(2.0);
    assert!(stroke_to_path(&path, &butt).is_empty());

    let square = butt.clone().with_line_cap(LineCap::Square);
    let outline = stroke_to_path(&path, &square);
    assert_box_eq(outline.bounding_box_approx(), box2d(4.0, 4.0, 6.0, 6.0));

    let round = butt.clone().with_line_cap(LineCap::Round);
    let outline = stroke_to_path(&path, &round);
    let bounds = outline.flattened(0.01).bounding_box().unwrap();
    assert_box_eq(bounds, box2d(4.0, 4.0, 6.0, 6.0));
    assert_positive_pieces(&outline);

    // A lone move-to draws nothing, whatever the cap.
    let mut path = Path::new();
    path.move_to(point(5.0, 5.0));
    assert!(stroke_to_path(&path, &round).is_empty());
}

#[test]
fn invalid_width() {
    let path = line(point(0.0, 0.0), point(10.0, 0.0));
    assert!(stroke_to_path(&path, &StrokeOptions::default().with_line_width(0.0)).is_empty());
    assert!(stroke_to_path(&path, &StrokeOptions::default().with_line_width(-1.0)).is_empty());
    assert!(stroke_to_path(&path, &StrokeOptions::default().with_line_width(f32::NAN)).is_empty());
}

#[test]
fn joins() {
    let mut path = Path::new();
    path.move_to(point(0.0, 0.0));
    path.line_to(point(10.0, 0.0));
    path.line_to(point(10.0, 10.0));

    let miter = StrokeOptions::default().with_line_width(2.0);
    let outline = stroke_to_path(&path, &miter);
    // The miter reaches the outer corner of the turn.
    assert_box_eq(outline.bounding_box_approx(), box2d(0.0, -1.0, 11.0, 10.0));
    assert_positive_pieces(&outline);
    assert_eq!(outline.flattened(0.1).contours().len(), 3);

    // The miter of a right angle is sqrt(2) half widths long.
    let bevel = miter.clone().with_miter_limit(1.2);
    let outline = stroke_to_path(&path, &bevel);
    let flattened = outline.flattened(0.1);
    assert!(!flattened.points().contains(&point(11.0, -1.0)));
    assert_eq!(flattened.contours().len(), 3);
    assert_positive_pieces(&outline);

    let round = miter.clone().with_line_join(LineJoin::Round);
    let outline = stroke_to_path(&path, &round);
    let flattened = outline.flattened(0.01);
    // Only the join reaches into the outer quadrant of the corner, along a
    // circle of one half width.
    let corner = point(10.0, 0.0);
    let outer: Vec<Point> = flattened
        .points()
        .iter()
        .filter(|p| p.x > 10.0 && p.y < 0.0)
        .copied()
        .collect();
    assert!(!outer.is_empty());
    for p in outer {
        assert!(((p - corner).length() - 1.0).abs() < 1e-3, "{:?}", p);
    }
    assert_positive_pieces(&outline);
}

#[test]
fn collinear_points_need_no_join() {
    let mut path = Path::new();
    path.move_to(point(0.0, 0.0));
    path.line_to(point(5.0, 0.0));
    path.line_to(point(10.0, 0.0));

    let outline = stroke_to_path(&path, &StrokeOptions::default());
    assert_eq!(outline.flattened(0.1).contours().len(), 2);
}

#[test]
fn closed_contours_join_every_vertex() {
    let mut path = Path::new();
    path.add_polygon(&[point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0), point(0.0, 10.0)]);

    let outline = stroke_to_path(&path, &StrokeOptions::default().with_line_width(2.0));
    // Four sides and four miters, no caps.
    assert_eq!(outline.flattened(0.1).contours().len(), 8);
    assert_box_eq(outline.bounding_box_approx(), box2d(-1.0, -1.0, 11.0, 11.0));
    assert_positive_pieces(&outline);
}

#[test]
fn dashed_stroke() {
    let path = line(point(0.0, 0.0), point(10.0, 0.0));
    let options = StrokeOptions::default().with_dashes(&[2.0, 3.0], 0.0);

    let outline = stroke_to_path(&path, &options);
    // Dashes at [0, 2] and [5, 7].
    assert_eq!(outline.flattened(0.1).contours().len(), 2);
    assert_box_eq(outline.bounding_box_approx(), box2d(0.0, -0.5, 7.0, 0.5));
}
