#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::match_like_matches_macro)]

//! Data structures and utilities to work with paths (vector graphics).
//!
//! This crate is reexported in [pathmask](../pathmask/index.html).
//!
//! # Examples
//!
//! ```
//! use pathmask_path::Path;
//! use pathmask_path::math::point;
//!
//! let mut path = Path::new();
//! path.move_to(point(0.0, 0.0));
//! path.line_to(point(1.0, 2.0));
//! path.line_to(point(2.0, 0.0));
//! path.cubic_to(point(2.0, 1.0), point(1.5, 1.0), point(1.0, 1.0));
//! path.close();
//!
//! for event in path.iter() {
//!     println!("{:?}", event);
//! }
//! ```

pub use pathmask_geom as geom;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub mod dash;
mod events;
pub mod flatten;
pub mod path;
pub mod shapes;

pub use crate::events::*;
pub use crate::geom::ArcFlags;
#[doc(inline)]
pub use crate::flatten::{FlattenedContour, FlattenedPath};
#[doc(inline)]
pub use crate::path::{Element, Path};
#[doc(inline)]
pub use crate::shapes::BorderRadii;

/// Default maximum distance between a curve and its flattened approximation,
/// in path units.
pub const DEFAULT_TOLERANCE: f32 = 0.1;

pub mod math {
    //! f32 version of the pathmask_geom types used everywhere. The other
    //! pathmask crates reexport them.

    pub use crate::geom::{
        box2d, int_box2d, point, size, vector, Angle, Box2D, IntBox2D, Point, Rotation, Scale,
        Size, Transform, Translation, Vector,
    };
}

/// The fill rule defines how to determine what is inside and what is outside of the shape.
///
/// See the SVG specification.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum FillRule {
    EvenOdd,
    #[default]
    NonZero,
}

impl FillRule {
    #[inline]
    pub fn is_in(&self, winding_number: i16) -> bool {
        match *self {
            FillRule::EvenOdd => winding_number % 2 != 0,
            FillRule::NonZero => winding_number != 0,
        }
    }

    #[inline]
    pub fn is_out(&self, winding_number: i16) -> bool {
        !self.is_in(winding_number)
    }

    /// Maps an accumulated signed coverage value to a coverage in `[0, 1]`.
    ///
    /// This is the antialiased counterpart of `is_in`: integer winding numbers
    /// map to 0 or 1 exactly.
    #[inline]
    pub fn coverage(&self, accumulated: f32) -> f32 {
        match *self {
            FillRule::NonZero => accumulated.abs().min(1.0),
            FillRule::EvenOdd => {
                let a = accumulated.abs() % 2.0;
                if a > 1.0 {
                    2.0 - a
                } else {
                    a
                }
            }
        }
    }
}

/// The two possible orientations for the edges of a shape to be built in.
///
/// Positive winding corresponds to a positive signed area, which is the
/// clockwise direction on screen (where the y axis points down).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Winding {
    Positive,
    Negative,
}

#[test]
fn fill_rule_coverage() {
    assert_eq!(FillRule::NonZero.coverage(-2.0), 1.0);
    assert_eq!(FillRule::NonZero.coverage(0.25), 0.25);
    assert_eq!(FillRule::EvenOdd.coverage(2.0), 0.0);
    assert_eq!(FillRule::EvenOdd.coverage(-1.0), 1.0);
    assert_eq!(FillRule::EvenOdd.coverage(1.25), 0.75);
    assert!(FillRule::EvenOdd.is_in(3));
    assert!(FillRule::EvenOdd.is_out(-2));
    assert!(FillRule::NonZero.is_in(-1));
}
