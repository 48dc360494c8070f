#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::excessive_precision)]
#![allow(clippy::many_single_char_names)]

//! Simple 2D geometric primitives on top of euclid.
//!
//! This crate is reexported in [pathmask](../pathmask/index.html).
//!
//! # Overview.
//!
//! This crate implements the maths the rasterizer needs to work with:
//!
//! - lines and line segments,
//! - quadratic and cubic bézier curves,
//! - circular and elliptic arcs (approximated with cubic bézier curves).
//!
//! # Flattening
//!
//! Flattening is the action of approximating a curve with a succession of line segments.
//!
//! The tolerance threshold taken as input by the flattening algorithms corresponds
//! to the maximum distance between the curve and its linear approximation.
//! The smaller the tolerance is, the more precise the approximation and the more segments
//! are generated. Since the rasterizer works in device pixels, a tolerance of a
//! fraction of a pixel (divided by the device pixel ratio when paths are expressed in
//! logical units) is typically enough.

// Reexport dependencies.
pub use arrayvec;
pub use euclid;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub mod arc;
pub mod cubic_bezier;
mod line;
pub mod quadratic_bezier;

#[doc(inline)]
pub use crate::arc::{Arc, ArcFlags, SvgArc};
#[doc(inline)]
pub use crate::cubic_bezier::CubicBezierSegment;
#[doc(inline)]
pub use crate::line::{Line, LineSegment};
#[doc(inline)]
pub use crate::quadratic_bezier::QuadraticBezierSegment;

/// Alias for `euclid::default::Point2D<f32>`.
pub type Point = euclid::default::Point2D<f32>;

/// Alias for `euclid::default::Vector2D<f32>`.
pub type Vector = euclid::default::Vector2D<f32>;

/// Alias for `euclid::default::Size2D<f32>`.
pub type Size = euclid::default::Size2D<f32>;

/// Alias for `euclid::default::Box2D<f32>`.
pub type Box2D = euclid::default::Box2D<f32>;

/// Integer box in pixel space. `min` is inclusive and `max` exclusive.
pub type IntBox2D = euclid::default::Box2D<i32>;

/// Alias for `euclid::default::Transform2D<f32>`.
pub type Transform = euclid::default::Transform2D<f32>;

/// Alias for `euclid::default::Rotation2D<f32>`.
pub type Rotation = euclid::default::Rotation2D<f32>;

/// Alias for `euclid::default::Translation2D<f32>`.
pub type Translation = euclid::Translation2D<f32, euclid::UnknownUnit, euclid::UnknownUnit>;

/// Alias for `euclid::default::Scale<f32>`.
pub type Scale = euclid::default::Scale<f32>;

/// An angle in radians (f32).
pub type Angle = euclid::Angle<f32>;

/// Shorthand for `Vector::new(x, y)`.
#[inline]
pub fn vector(x: f32, y: f32) -> Vector {
    Vector::new(x, y)
}

/// Shorthand for `Point::new(x, y)`.
#[inline]
pub fn point(x: f32, y: f32) -> Point {
    Point::new(x, y)
}

/// Shorthand for `Size::new(w, h)`.
#[inline]
pub fn size(w: f32, h: f32) -> Size {
    Size::new(w, h)
}

/// Shorthand for a floating point box from its corner coordinates.
#[inline]
pub fn box2d(x0: f32, y0: f32, x1: f32, y1: f32) -> Box2D {
    Box2D::new(point(x0, y0), point(x1, y1))
}

/// Shorthand for a pixel box from its corner coordinates.
#[inline]
pub fn int_box2d(x0: i32, y0: i32, x1: i32, y1: i32) -> IntBox2D {
    IntBox2D::new(euclid::default::Point2D::new(x0, y0), euclid::default::Point2D::new(x1, y1))
}

/// Cross product of the two unit normals of consecutive edges below which
/// they are considered to be aligned.
pub const COLLINEAR_EPSILON: f32 = 1e-4;

pub mod traits {
    use crate::{Point, Rotation, Scale, Transform, Translation, Vector};

    /// Anything that can move points and vectors around the plane.
    pub trait Transformation {
        fn transform_point(&self, p: Point) -> Point;
        fn transform_vector(&self, v: Vector) -> Vector;
    }

    impl Transformation for Transform {
        fn transform_point(&self, p: Point) -> Point {
            self.transform_point(p)
        }

        fn transform_vector(&self, v: Vector) -> Vector {
            self.transform_vector(v)
        }
    }

    impl Transformation for Rotation {
        fn transform_point(&self, p: Point) -> Point {
            self.transform_point(p)
        }

        fn transform_vector(&self, v: Vector) -> Vector {
            self.transform_vector(v)
        }
    }

    impl Transformation for Translation {
        fn transform_point(&self, p: Point) -> Point {
            self.transform_point(p)
        }

        fn transform_vector(&self, v: Vector) -> Vector {
            v
        }
    }

    impl Transformation for Scale {
        fn transform_point(&self, p: Point) -> Point {
            (*self).transform_point(p)
        }

        fn transform_vector(&self, v: Vector) -> Vector {
            (*self).transform_vector(v)
        }
    }

    impl<'l, T: Transformation> Transformation for &'l T {
        #[inline]
        fn transform_point(&self, p: Point) -> Point {
            (*self).transform_point(p)
        }

        #[inline]
        fn transform_vector(&self, v: Vector) -> Vector {
            (*self).transform_vector(v)
        }
    }
}
