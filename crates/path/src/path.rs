//! The path data structure.
//!

use crate::geom::traits::Transformation;
use crate::geom::{Arc, ArcFlags, CubicBezierSegment, QuadraticBezierSegment, SvgArc};
use crate::math::*;
use crate::{PathEvent, DEFAULT_TOLERANCE};

use core::fmt;
use core::slice;

/// The commands stored in a `Path`.
///
/// `MoveTo` and `LineTo` consume one point, `CubicTo` three (two control
/// points followed by the end point) and `Close` none.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Element {
    MoveTo,
    LineTo,
    CubicTo,
    Close,
}

impl Element {
    #[inline]
    pub fn num_points(self) -> usize {
        match self {
            Element::MoveTo | Element::LineTo => 1,
            Element::CubicTo => 3,
            Element::Close => 0,
        }
    }
}

/// A mutable sequence of sub-paths made of lines and cubic bézier curves.
///
/// # Representation
///
/// Paths contain two buffers:
/// - a buffer of elements (MoveTo, LineTo, CubicTo or Close),
/// - and a buffer of points, consumed in order by the elements.
///
/// ```ascii
///  ___________________________________
/// |        |        |         |       |
/// | MoveTo | LineTo | CubicTo | Close | ...
/// |________|________|_________|_______|
///  _________________________________________________
/// |         |         |          |          |       |
/// | start   | to      | ctrl1    | ctrl2    | to    | ...
/// |_________|_________|__________|__________|_______|
/// ```
///
/// Every `LineTo`, `CubicTo` and `Close` belongs to a sub-path opened by a
/// `MoveTo`. Drawing commands issued without a current sub-path insert a
/// `MoveTo` to the end of the previous sub-path (its start point after a
/// `Close`), or to the origin for an empty path.
///
/// # Length cache
///
/// `length` stores its result in the path. Every mutation clears it;
/// `cached_length` reads the stored value without computing anything.
#[derive(Clone, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Path {
    elements: Vec<Element>,
    points: Vec<Point>,
    // Start of the most recent sub-path.
    start: Point,
    in_subpath: bool,
    #[cfg_attr(feature = "serialization", serde(skip))]
    length: Option<f32>,
}

impl Path {
    /// Creates an empty `Path`.
    #[inline]
    pub fn new() -> Path {
        Path::default()
    }

    /// Creates an empty `Path` with room for a number of elements and points.
    pub fn with_capacity(elements: usize, points: usize) -> Path {
        Path {
            elements: Vec::with_capacity(elements),
            points: Vec::with_capacity(points),
            ..Path::default()
        }
    }

    #[inline]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns whether the last element is a `Close`.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.elements.last() == Some(&Element::Close)
    }

    /// The current point: where the next drawing command starts.
    pub fn current_position(&self) -> Option<Point> {
        match self.elements.last() {
            None => None,
            Some(Element::Close) => Some(self.start),
            Some(_) => self.points.last().copied(),
        }
    }

    /// Removes every element and point.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.points.clear();
        self.start = point(0.0, 0.0);
        self.in_subpath = false;
        self.length = None;
    }

    pub fn reserve(&mut self, elements: usize, points: usize) {
        self.elements.reserve(elements);
        self.points.reserve(points);
    }

    /// Starts a new sub-path at `to`.
    pub fn move_to(&mut self, to: Point) {
        nan_check(to);
        self.invalidate();
        self.elements.push(Element::MoveTo);
        self.points.push(to);
        self.start = to;
        self.in_subpath = true;
    }

    pub fn line_to(&mut self, to: Point) {
        nan_check(to);
        self.ensure_subpath();
        self.invalidate();
        self.elements.push(Element::LineTo);
        self.points.push(to);
    }

    /// Adds a quadratic bézier curve, stored as the equivalent cubic curve.
    pub fn quadratic_to(&mut self, ctrl: Point, to: Point) {
        self.ensure_subpath();
        let from = self.points.last().copied().unwrap_or(self.start);
        let cubic = QuadraticBezierSegment { from, ctrl, to }.to_cubic();
        self.cubic_to(cubic.ctrl1, cubic.ctrl2, cubic.to);
    }

    pub fn cubic_to(&mut self, ctrl1: Point, ctrl2: Point, to: Point) {
        nan_check(ctrl1);
        nan_check(ctrl2);
        nan_check(to);
        self.ensure_subpath();
        self.invalidate();
        self.elements.push(Element::CubicTo);
        self.points.push(ctrl1);
        self.points.push(ctrl2);
        self.points.push(to);
    }

    /// Closes the current sub-path, connecting it back to its start.
    pub fn close(&mut self) {
        self.ensure_subpath();
        self.invalidate();
        self.elements.push(Element::Close);
        self.in_subpath = false;
    }

    /// Adds an arc of the ellipse centered at `center` with the given radii,
    /// approximated with cubic bézier curves.
    ///
    /// The arc starts at `start_angle` and sweeps `sweep_angle` (positive angles
    /// go clockwise on screen). The current point is connected to the start of
    /// the arc with a line, unless there is no current sub-path or
    /// `force_move_to` is set, in which case a new sub-path starts there.
    pub fn arc_to(
        &mut self,
        center: Point,
        radii: Vector,
        start_angle: Angle,
        sweep_angle: Angle,
        force_move_to: bool,
    ) {
        let arc = Arc {
            center,
            radii,
            start_angle,
            sweep_angle,
            x_rotation: Angle::zero(),
        };
        self.add_arc(&arc, force_move_to);
    }

    /// Adds an elliptic arc from the current point to `to`, using SVG's
    /// end-point parameterization.
    ///
    /// Arcs with a zero radius are drawn as a straight line, per SVG.
    pub fn svg_arc_to(&mut self, radii: Vector, x_rotation: Angle, flags: ArcFlags, to: Point) {
        self.ensure_subpath();
        let from = self.current_position().unwrap_or(self.start);
        let svg_arc = SvgArc {
            from,
            to,
            radii,
            x_rotation,
            flags,
        };

        if svg_arc.is_straight_line() {
            if from != to {
                self.line_to(to);
            }
            return;
        }

        svg_arc.for_each_cubic_bezier(&mut |curve| {
            self.cubic_to(curve.ctrl1, curve.ctrl2, curve.to);
        });
    }

    pub(crate) fn add_arc(&mut self, arc: &Arc, force_move_to: bool) {
        let start = arc.from();
        if force_move_to || !self.in_subpath {
            self.move_to(start);
        } else if self.current_position() != Some(start) {
            self.line_to(start);
        }

        arc.for_each_cubic_bezier(&mut |curve| {
            self.cubic_to(curve.ctrl1, curve.ctrl2, curve.to);
        });
    }

    /// Appends all of the sub-paths of `other`, optionally transformed.
    pub fn add_path(&mut self, other: &Path, transform: Option<&Transform>) {
        if other.is_empty() {
            return;
        }

        self.invalidate();
        self.elements.extend_from_slice(&other.elements);
        match transform {
            Some(transform) => self
                .points
                .extend(other.points.iter().map(|p| transform.transform_point(*p))),
            None => self.points.extend_from_slice(&other.points),
        }

        self.in_subpath = other.in_subpath;
        self.start = match transform {
            Some(transform) => transform.transform_point(other.start),
            None => other.start,
        };
    }

    /// Applies a transform to every point of the path, in place.
    pub fn transform<T: Transformation>(&mut self, transform: &T) {
        self.invalidate();
        for p in &mut self.points {
            *p = transform.transform_point(*p);
        }
        self.start = transform.transform_point(self.start);
    }

    /// Returns a transformed copy of this path.
    pub fn transformed<T: Transformation>(&self, transform: &T) -> Self {
        let mut path = self.clone();
        path.transform(transform);
        path
    }

    /// Returns an iterator over the path's events.
    pub fn iter(&self) -> Iter {
        Iter::new(&self.elements, &self.points)
    }

    /// Total arc length of the path, including the closing segments of closed
    /// sub-paths.
    ///
    /// The result is stored until the next mutation.
    pub fn length(&mut self) -> f32 {
        if let Some(length) = self.length {
            return length;
        }

        let length = self.approximate_length(DEFAULT_TOLERANCE);
        self.length = Some(length);

        length
    }

    /// The length stored by the last call to `length`, if the path has not
    /// been modified since.
    #[inline]
    pub fn cached_length(&self) -> Option<f32> {
        self.length
    }

    /// Clears the stored length.
    #[inline]
    pub fn invalidate(&mut self) {
        self.length = None;
    }

    /// Computes the arc length of the path by summing the lengths of its
    /// flattened segments.
    pub fn approximate_length(&self, tolerance: f32) -> f32 {
        let mut length = 0.0;
        for event in self.iter() {
            match event {
                PathEvent::Line { from, to } => {
                    length += (to - from).length();
                }
                PathEvent::Cubic {
                    from,
                    ctrl1,
                    ctrl2,
                    to,
                } => {
                    length += CubicBezierSegment {
                        from,
                        ctrl1,
                        ctrl2,
                        to,
                    }
                    .approximate_length(tolerance);
                }
                PathEvent::End {
                    last,
                    first,
                    close: true,
                } => {
                    length += (first - last).length();
                }
                _ => {}
            }
        }

        length
    }

    /// A fast bounding box over all stored points, control points included.
    ///
    /// The box contains the path but may be larger than its tight bounds.
    /// An empty path has an empty box.
    pub fn bounding_box_approx(&self) -> Box2D {
        let mut points = self.points.iter();
        let first = match points.next() {
            Some(p) => *p,
            None => return Box2D::zero(),
        };

        let mut min = first;
        let mut max = first;
        for p in points {
            min = min.min(*p);
            max = max.max(*p);
        }

        Box2D { min, max }
    }

    fn ensure_subpath(&mut self) {
        if self.in_subpath {
            return;
        }

        let at = if self.is_empty() {
            point(0.0, 0.0)
        } else {
            self.start
        };
        self.move_to(at);
    }
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements && self.points == other.points
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "\"")?;
        for event in self.iter() {
            match event {
                PathEvent::Begin { at } => write!(formatter, " M {:?} {:?}", at.x, at.y)?,
                PathEvent::Line { to, .. } => write!(formatter, " L {:?} {:?}", to.x, to.y)?,
                PathEvent::Cubic { ctrl1, ctrl2, to, .. } => write!(
                    formatter,
                    " C {:?} {:?} {:?} {:?} {:?} {:?}",
                    ctrl1.x, ctrl1.y, ctrl2.x, ctrl2.y, to.x, to.y
                )?,
                PathEvent::End { close: true, .. } => write!(formatter, " Z")?,
                PathEvent::End { close: false, .. } => {}
            }
        }
        write!(formatter, "\"")
    }
}

impl FromIterator<PathEvent> for Path {
    fn from_iter<T: IntoIterator<Item = PathEvent>>(iter: T) -> Path {
        let mut path = Path::new();
        for event in iter {
            match event {
                PathEvent::Begin { at } => path.move_to(at),
                PathEvent::Line { to, .. } => path.line_to(to),
                PathEvent::Cubic {
                    ctrl1, ctrl2, to, ..
                } => path.cubic_to(ctrl1, ctrl2, to),
                PathEvent::End { close: true, .. } => path.close(),
                PathEvent::End { close: false, .. } => {}
            }
        }

        path
    }
}

impl<'l> IntoIterator for &'l Path {
    type Item = PathEvent;
    type IntoIter = Iter<'l>;

    fn into_iter(self) -> Iter<'l> {
        self.iter()
    }
}

#[inline]
fn nan_check(p: Point) {
    debug_assert!(!p.x.is_nan());
    debug_assert!(!p.y.is_nan());
}

/// An iterator over the events of a `Path`.
///
/// Every sub-path is reported as a `Begin` event, its edges, and an `End`
/// event.
#[derive(Clone)]
pub struct Iter<'l> {
    elements: slice::Iter<'l, Element>,
    points: slice::Iter<'l, Point>,
    current: Point,
    first: Point,
    in_subpath: bool,
    pending_begin: Option<Point>,
}

impl<'l> Iter<'l> {
    fn new(elements: &'l [Element], points: &'l [Point]) -> Self {
        Iter {
            elements: elements.iter(),
            points: points.iter(),
            current: point(0.0, 0.0),
            first: point(0.0, 0.0),
            in_subpath: false,
            pending_begin: None,
        }
    }

    #[inline]
    fn next_point(&mut self) -> Point {
        // The element and point buffers are kept in sync by `Path`.
        self.points.next().copied().unwrap_or(self.current)
    }

    fn begin(&mut self, at: Point) -> PathEvent {
        self.in_subpath = true;
        self.first = at;
        self.current = at;
        PathEvent::Begin { at }
    }
}

impl<'l> Iterator for Iter<'l> {
    type Item = PathEvent;

    fn next(&mut self) -> Option<PathEvent> {
        if let Some(at) = self.pending_begin.take() {
            return Some(self.begin(at));
        }

        match self.elements.next() {
            Some(Element::MoveTo) => {
                let at = self.next_point();
                if self.in_subpath {
                    self.in_subpath = false;
                    self.pending_begin = Some(at);
                    return Some(PathEvent::End {
                        last: self.current,
                        first: self.first,
                        close: false,
                    });
                }

                Some(self.begin(at))
            }
            Some(Element::LineTo) => {
                let from = self.current;
                self.current = self.next_point();
                Some(PathEvent::Line {
                    from,
                    to: self.current,
                })
            }
            Some(Element::CubicTo) => {
                let from = self.current;
                let ctrl1 = self.next_point();
                let ctrl2 = self.next_point();
                self.current = self.next_point();
                Some(PathEvent::Cubic {
                    from,
                    ctrl1,
                    ctrl2,
                    to: self.current,
                })
            }
            Some(Element::Close) => {
                let last = self.current;
                self.in_subpath = false;
                self.current = self.first;
                Some(PathEvent::End {
                    last,
                    first: self.first,
                    close: true,
                })
            }
            None => {
                if self.in_subpath {
                    self.in_subpath = false;
                    return Some(PathEvent::End {
                        last: self.current,
                        first: self.first,
                        close: false,
                    });
                }

                None
            }
        }
    }
}

#[test]
fn implicit_move_to() {
    let mut path = Path::new();
    path.line_to(point(1.0, 1.0));
    assert_eq!(path.elements(), &[Element::MoveTo, Element::LineTo]);
    assert_eq!(path.points(), &[point(0.0, 0.0), point(1.0, 1.0)]);

    path.move_to(point(5.0, 5.0));
    path.line_to(point(6.0, 5.0));
    path.close();
    assert!(path.is_closed());
    assert_eq!(path.current_position(), Some(point(5.0, 5.0)));

    // After a close, drawing resumes from the start of the closed sub-path.
    path.line_to(point(7.0, 7.0));
    assert!(!path.is_closed());
    assert_eq!(
        &path.elements()[3..],
        &[Element::Close, Element::MoveTo, Element::LineTo]
    );
    assert_eq!(path.points()[path.points().len() - 2], point(5.0, 5.0));
}

#[test]
fn close_without_subpath() {
    let mut path = Path::new();
    path.close();
    assert_eq!(path.elements(), &[Element::MoveTo, Element::Close]);
    assert_eq!(path.points(), &[point(0.0, 0.0)]);
}

#[test]
fn quadratic_is_elevated() {
    let mut path = Path::new();
    path.move_to(point(0.0, 0.0));
    path.quadratic_to(point(3.0, 3.0), point(6.0, 0.0));
    assert_eq!(path.elements(), &[Element::MoveTo, Element::CubicTo]);
    assert_eq!(path.points()[1], point(2.0, 2.0));
    assert_eq!(path.points()[2], point(4.0, 2.0));
    assert_eq!(path.points()[3], point(6.0, 0.0));
}

#[test]
fn events() {
    let mut path = Path::new();
    path.move_to(point(0.0, 0.0));
    path.line_to(point(1.0, 0.0));
    path.close();
    path.move_to(point(5.0, 5.0));
    path.move_to(point(10.0, 10.0));
    path.cubic_to(point(11.0, 10.0), point(12.0, 11.0), point(12.0, 12.0));

    let events: Vec<PathEvent> = path.iter().collect();
    assert_eq!(
        events,
        vec![
            PathEvent::Begin { at: point(0.0, 0.0) },
            PathEvent::Line {
                from: point(0.0, 0.0),
                to: point(1.0, 0.0)
            },
            PathEvent::End {
                last: point(1.0, 0.0),
                first: point(0.0, 0.0),
                close: true
            },
            PathEvent::Begin { at: point(5.0, 5.0) },
            PathEvent::End {
                last: point(5.0, 5.0),
                first: point(5.0, 5.0),
                close: false
            },
            PathEvent::Begin {
                at: point(10.0, 10.0)
            },
            PathEvent::Cubic {
                from: point(10.0, 10.0),
                ctrl1: point(11.0, 10.0),
                ctrl2: point(12.0, 11.0),
                to: point(12.0, 12.0)
            },
            PathEvent::End {
                last: point(12.0, 12.0),
                first: point(10.0, 10.0),
                close: false
            },
        ]
    );

    let rebuilt: Path = path.iter().collect();
    assert_eq!(rebuilt, path);
}

#[test]
fn length_cache() {
    let mut path = Path::new();
    path.move_to(point(0.0, 0.0));
    path.line_to(point(3.0, 4.0));
    assert_eq!(path.cached_length(), None);
    assert_eq!(path.length(), 5.0);
    assert_eq!(path.cached_length(), Some(5.0));

    // Closing adds the segment back to the start.
    path.close();
    assert_eq!(path.cached_length(), None);
    assert_eq!(path.length(), 10.0);

    path.transform(&Scale::new(2.0));
    assert_eq!(path.cached_length(), None);
    assert_eq!(path.length(), 20.0);

    path.invalidate();
    assert_eq!(path.cached_length(), None);
}

#[test]
fn arc_to_connects_with_a_line() {
    let mut path = Path::new();
    path.move_to(point(0.0, 0.0));
    path.arc_to(
        point(10.0, 0.0),
        vector(5.0, 5.0),
        Angle::radians(core::f32::consts::PI),
        Angle::radians(core::f32::consts::PI),
        false,
    );

    assert_eq!(path.elements()[0], Element::MoveTo);
    assert_eq!(path.elements()[1], Element::LineTo);
    assert_eq!(path.elements().len(), 4);
    let end = path.current_position().unwrap();
    assert!((end - point(15.0, 0.0)).length() < 1e-4);

    let mut path = Path::new();
    path.arc_to(
        point(0.0, 0.0),
        vector(1.0, 1.0),
        Angle::zero(),
        Angle::two_pi(),
        true,
    );
    assert_eq!(path.elements().len(), 5);
    assert_eq!(path.elements()[0], Element::MoveTo);
}

#[test]
fn svg_arc_to_straight_line() {
    let mut path = Path::new();
    path.move_to(point(0.0, 0.0));
    path.svg_arc_to(
        vector(0.0, 0.0),
        Angle::zero(),
        ArcFlags::default(),
        point(10.0, 0.0),
    );
    assert_eq!(path.elements(), &[Element::MoveTo, Element::LineTo]);

    path.svg_arc_to(
        vector(5.0, 5.0),
        Angle::zero(),
        ArcFlags {
            large_arc: false,
            sweep: true,
        },
        point(20.0, 0.0),
    );
    assert_eq!(path.elements().len(), 4);
    let end = path.current_position().unwrap();
    assert!((end - point(20.0, 0.0)).length() < 1e-4);
}

#[test]
fn add_path_and_bounds() {
    let mut a = Path::new();
    a.move_to(point(0.0, 0.0));
    a.cubic_to(point(5.0, -5.0), point(10.0, 15.0), point(10.0, 10.0));

    let mut b = Path::new();
    assert_eq!(b.bounding_box_approx(), Box2D::zero());
    b.add_path(&a, Some(&Transform::translation(100.0, 0.0)));
    b.add_path(&a, None);

    assert_eq!(b.elements().len(), 4);
    let bounds = b.bounding_box_approx();
    assert_eq!(bounds.min, point(0.0, -5.0));
    assert_eq!(bounds.max, point(110.0, 15.0));
}
