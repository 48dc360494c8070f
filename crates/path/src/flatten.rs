//! Approximation of paths with polylines.
//!
//! A `FlattenedPath` stores one polyline per sub-path in a shared point
//! buffer. Curves are subdivided so that the polyline stays within the
//! tolerance of the curve.

use crate::geom::CubicBezierSegment;
use crate::math::*;
use crate::{Path, PathEvent};

use core::ops::Range;

/// Smallest tolerance used when flattening. Smaller (or invalid) values are
/// clamped to it.
pub const MIN_TOLERANCE: f32 = 1e-3;

/// A polyline in a `FlattenedPath`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FlattenedContour {
    pub start: u32,
    pub end: u32,
    /// Whether the sub-path ended with a `Close` element.
    pub closed: bool,
}

impl FlattenedContour {
    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }

    #[inline]
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// The polyline approximation of a `Path`.
#[derive(Clone, Debug, Default)]
pub struct FlattenedPath {
    points: Vec<Point>,
    contours: Vec<FlattenedContour>,
}

impl FlattenedPath {
    pub fn new() -> Self {
        FlattenedPath::default()
    }

    /// Flattens `path` with the given tolerance.
    pub fn from_path(path: &Path, tolerance: f32) -> Self {
        let mut flattened = FlattenedPath::new();
        flattened.rebuild(path, tolerance);
        flattened
    }

    /// Replaces the content with the flattened `path`, reusing the allocations.
    pub fn rebuild(&mut self, path: &Path, tolerance: f32) {
        self.clear();
        let tolerance = tolerance.max(MIN_TOLERANCE);

        let mut start = 0;
        for event in path.iter() {
            match event {
                PathEvent::Begin { at } => {
                    start = self.points.len();
                    self.points.push(at);
                }
                PathEvent::Line { to, .. } => {
                    self.points.push(to);
                }
                PathEvent::Cubic {
                    from,
                    ctrl1,
                    ctrl2,
                    to,
                } => {
                    let points = &mut self.points;
                    CubicBezierSegment {
                        from,
                        ctrl1,
                        ctrl2,
                        to,
                    }
                    .for_each_flattened(tolerance, &mut |segment| {
                        points.push(segment.to);
                    });
                }
                PathEvent::End { close, .. } => {
                    self.contours.push(FlattenedContour {
                        start: start as u32,
                        end: self.points.len() as u32,
                        closed: close,
                    });
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.contours.clear();
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[inline]
    pub fn contours(&self) -> &[FlattenedContour] {
        &self.contours
    }

    #[inline]
    pub fn contour_points(&self, contour: &FlattenedContour) -> &[Point] {
        &self.points[contour.range()]
    }

    /// Iterates over the polylines along with their `closed` flag.
    pub fn iter(&self) -> impl Iterator<Item = (&[Point], bool)> + '_ {
        self.contours
            .iter()
            .map(move |contour| (self.contour_points(contour), contour.closed))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    /// Returns the tight bounding box of the polylines, or `None` without points.
    pub fn bounding_box(&self) -> Option<Box2D> {
        let mut points = self.points.iter();
        let first = *points.next()?;
        let mut bounds = Box2D {
            min: first,
            max: first,
        };
        for p in points {
            bounds.min = bounds.min.min(*p);
            bounds.max = bounds.max.max(*p);
        }

        Some(bounds)
    }
}

impl Path {
    /// Returns the polyline approximation of this path.
    pub fn flattened(&self, tolerance: f32) -> FlattenedPath {
        FlattenedPath::from_path(self, tolerance)
    }
}

#[test]
fn flatten_contours() {
    let mut path = Path::new();
    path.move_to(point(0.0, 0.0));
    path.line_to(point(10.0, 0.0));
    path.cubic_to(point(15.0, 0.0), point(15.0, 10.0), point(10.0, 10.0));
    path.close();
    path.move_to(point(20.0, 20.0));
    path.move_to(point(30.0, 30.0));
    path.line_to(point(40.0, 30.0));

    let flattened = path.flattened(0.1);
    let contours = flattened.contours();
    assert_eq!(contours.len(), 3);

    assert!(contours[0].closed);
    let first = flattened.contour_points(&contours[0]);
    assert_eq!(first[0], point(0.0, 0.0));
    assert_eq!(first[1], point(10.0, 0.0));
    assert_eq!(*first.last().unwrap(), point(10.0, 10.0));
    assert!(first.len() > 3);

    // A lone move-to is a single point contour.
    assert_eq!(contours[1].len(), 1);
    assert!(!contours[1].closed);

    let (points, closed) = flattened.iter().last().unwrap();
    assert_eq!(points, &[point(30.0, 30.0), point(40.0, 30.0)]);
    assert!(!closed);

    let bounds = flattened.bounding_box().unwrap();
    assert_eq!(bounds.max, point(40.0, 30.0));
    assert!(bounds.min.x == 0.0 && bounds.min.y == 0.0);
}

#[test]
fn invalid_tolerance_is_clamped() {
    let mut path = Path::new();
    path.move_to(point(0.0, 0.0));
    path.cubic_to(point(0.0, 10.0), point(10.0, 10.0), point(10.0, 0.0));

    let a = path.flattened(f32::NAN);
    let b = path.flattened(-1.0);
    assert_eq!(a.points(), b.points());
    assert!(FlattenedPath::new().bounding_box().is_none());
}

#[test]
fn curves_flatten_like_their_segments() {
    let curve = CubicBezierSegment {
        from: point(0.0, 0.0),
        ctrl1: point(0.0, 10.0),
        ctrl2: point(10.0, 10.0),
        to: point(10.0, 0.0),
    };

    let mut path = Path::new();
    path.move_to(curve.from);
    path.cubic_to(curve.ctrl1, curve.ctrl2, curve.to);

    let flattened = path.flattened(0.05);
    let mut expected = vec![curve.from];
    expected.extend(curve.flattened(0.05));
    assert_eq!(flattened.points(), &expected[..]);
}
