use crate::traits::Transformation;
use crate::{Box2D, Point, Vector};

/// A linear segment.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct LineSegment {
    pub from: Point,
    pub to: Point,
}

impl LineSegment {
    /// Sample the segment at t (expecting t between 0 and 1).
    #[inline]
    pub fn sample(&self, t: f32) -> Point {
        self.from.lerp(self.to, t)
    }

    /// Sample the x coordinate of the segment at t (expecting t between 0 and 1).
    #[inline]
    pub fn x(&self, t: f32) -> f32 {
        self.from.x * (1.0 - t) + self.to.x * t
    }

    /// Sample the y coordinate of the segment at t (expecting t between 0 and 1).
    #[inline]
    pub fn y(&self, t: f32) -> f32 {
        self.from.y * (1.0 - t) + self.to.y * t
    }

    /// Returns the parameter at which the segment reaches `x`.
    ///
    /// Vertical segments return zero.
    pub fn solve_t_for_x(&self, x: f32) -> f32 {
        let dx = self.to.x - self.from.x;
        if dx == 0.0 {
            return 0.0;
        }

        (x - self.from.x) / dx
    }

    /// Returns the parameter at which the segment reaches `y`.
    ///
    /// Horizontal segments return zero.
    pub fn solve_t_for_y(&self, y: f32) -> f32 {
        let dy = self.to.y - self.from.y;
        if dy == 0.0 {
            return 0.0;
        }

        (y - self.from.y) / dy
    }

    /// Returns an inverted version of this segment where the beginning and the end
    /// points are swapped.
    #[inline]
    pub fn flip(&self) -> Self {
        LineSegment {
            from: self.to,
            to: self.from,
        }
    }

    /// Split this segment into two sub-segments at t.
    #[inline]
    pub fn split(&self, t: f32) -> (Self, Self) {
        let split_point = self.sample(t);
        (
            LineSegment {
                from: self.from,
                to: split_point,
            },
            LineSegment {
                from: split_point,
                to: self.to,
            },
        )
    }

    /// Returns the vector between this segment's `from` and `to` points.
    #[inline]
    pub fn to_vector(&self) -> Vector {
        self.to - self.from
    }

    /// Returns the line containing this segment.
    #[inline]
    pub fn to_line(&self) -> Line {
        Line {
            point: self.from,
            vector: self.to - self.from,
        }
    }

    /// Computes the length of this segment.
    #[inline]
    pub fn length(&self) -> f32 {
        self.to_vector().length()
    }

    /// Computes the squared length of this segment.
    #[inline]
    pub fn square_length(&self) -> f32 {
        self.to_vector().square_length()
    }

    /// Returns the unit tangent of the segment, or `None` if it is degenerate.
    pub fn tangent(&self) -> Option<Vector> {
        let v = self.to_vector();
        let len = v.length();
        if len <= f32::EPSILON || !len.is_finite() {
            return None;
        }

        Some(v / len)
    }

    /// Returns the smallest box containing both endpoints.
    #[inline]
    pub fn bounding_box(&self) -> Box2D {
        Box2D {
            min: self.from.min(self.to),
            max: self.from.max(self.to),
        }
    }

    /// Applies the transform to this segment and returns the result.
    #[inline]
    pub fn transformed<T: Transformation>(&self, transform: &T) -> Self {
        LineSegment {
            from: transform.transform_point(self.from),
            to: transform.transform_point(self.to),
        }
    }
}

/// An infinite line defined by a point and a vector.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Line {
    pub point: Point,
    pub vector: Vector,
}

impl Line {
    /// Intersection of two lines, `None` when they are (very close to) parallel.
    pub fn intersection(&self, other: &Self) -> Option<Point> {
        let det = self.vector.cross(other.vector);
        if det.abs() <= 1e-6 {
            return None;
        }

        // Solve self.point + self.vector * t = other.point + other.vector * u for t.
        let t = (other.point - self.point).cross(other.vector) / det;

        Some(self.point + self.vector * t)
    }

    pub fn signed_distance_to_point(&self, p: &Point) -> f32 {
        let v = *p - self.point;
        self.vector.cross(v) / self.vector.length()
    }

    pub fn distance_to_point(&self, p: &Point) -> f32 {
        self.signed_distance_to_point(p).abs()
    }
}

#[cfg(test)]
use crate::{point, vector};

#[test]
fn split_segment() {
    let segment = LineSegment {
        from: point(0.0, 0.0),
        to: point(4.0, 2.0),
    };

    let (a, b) = segment.split(0.5);
    assert_eq!(a.to, point(2.0, 1.0));
    assert_eq!(b.from, point(2.0, 1.0));
    assert_eq!(b.to, segment.to);
    assert_eq!(segment.solve_t_for_x(1.0), 0.25);
    assert_eq!(segment.solve_t_for_y(1.0), 0.5);
}

#[test]
fn degenerate_tangent() {
    let segment = LineSegment {
        from: point(3.0, 3.0),
        to: point(3.0, 3.0),
    };
    assert!(segment.tangent().is_none());

    let segment = LineSegment {
        from: point(0.0, 0.0),
        to: point(0.0, 5.0),
    };
    assert_eq!(segment.tangent(), Some(vector(0.0, 1.0)));
}

#[test]
fn line_intersection() {
    let l1 = Line {
        point: point(0.0, 1.0),
        vector: vector(1.0, 0.0),
    };
    let l2 = Line {
        point: point(3.0, -5.0),
        vector: vector(0.0, 2.0),
    };

    let p = l1.intersection(&l2).unwrap();
    assert!((p - point(3.0, 1.0)).length() < 1e-5);

    let parallel = Line {
        point: point(0.0, 4.0),
        vector: vector(-2.0, 0.0),
    };
    assert!(l1.intersection(&parallel).is_none());
}

#[test]
fn distance_to_point() {
    let l = Line {
        point: point(0.0, 0.0),
        vector: vector(2.0, 0.0),
    };

    assert_eq!(l.signed_distance_to_point(&point(1.0, 3.0)), 3.0);
    assert_eq!(l.signed_distance_to_point(&point(1.0, -3.0)), -3.0);
    assert_eq!(l.distance_to_point(&point(1.0, -3.0)), 3.0);
}
