#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::float_cmp)]
#![allow(clippy::too_many_arguments)]

//! Antialiased rasterization of paths into coverage masks.
//!
//! This crate is reexported in [pathmask](../pathmask/index.html).
//!
//! # Overview
//!
//! Paths are turned into coverage in a few steps:
//!
//! - strokes are first converted into a fillable outline by the [stroker](stroke/index.html),
//! - the path is flattened into polylines,
//! - the [rasterizer](rasterizer/index.html) accumulates the signed area covered by the
//!   polylines in each pixel and applies the fill rule,
//! - the result is a run-length encoded mask, [Rle](rle/struct.Rle.html), one span per run of
//!   identical coverage in a row.
//!
//! Masks can be combined with boolean operations (`Rle::binary`), and re-encoded into
//! deduplicated 4x4 tiles with [PreparedPath](prepared/struct.PreparedPath.html), the form
//! in which clip masks are uploaded as sprites.
//!
//! ```
//! use pathmask_raster::{FillOptions, Rasterizer};
//! use pathmask_raster::path::{Path, Winding};
//! use pathmask_raster::math::box2d;
//!
//! let mut path = Path::new();
//! path.add_rect(&box2d(0.0, 0.0, 2.0, 2.0), Winding::Positive);
//!
//! let mut rasterizer = Rasterizer::new();
//! let rle = rasterizer.fill(&path, &FillOptions::default(), None).unwrap();
//! assert_eq!(rle.spans().len(), 2);
//! ```
//!
//! # Tolerance
//!
//! The flattening tolerance of the options is the maximum distance between a curve and
//! the polyline that approximates it, in pixels. The default (0.1) is below what can be
//! told apart after quantization for most content.

pub use pathmask_path as path;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub mod counters;
mod error;
pub mod prepared;
pub mod rasterizer;
pub mod rle;
pub mod stroke;

#[cfg(test)]
mod raster_tests;

pub use crate::counters::RasterCounters;
pub use crate::error::*;
pub use crate::path::geom;
pub use crate::path::math;
pub use crate::path::FillRule;
pub use crate::prepared::{Patch, PatchData, PreparedPath};
pub use crate::rasterizer::Rasterizer;
pub use crate::rle::{BinaryOp, Rle, Span};
pub use crate::stroke::stroke_to_path;

/// Line cap as defined by the SVG specification.
///
/// See: <https://svgwg.org/specs/strokes/#StrokeLinecapProperty>
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum LineCap {
    /// The stroke for each sub-path does not extend beyond its two endpoints.
    /// A zero length sub-path will therefore not have any stroke.
    Butt,
    /// At the end of each sub-path, the shape representing the stroke will be
    /// extended by a rectangle with the same width as the stroke width and
    /// whose length is half of the stroke width. If a sub-path has zero length,
    /// then the resulting effect is that the stroke for that sub-path consists
    /// solely of a square with side length equal to the stroke width, centered
    /// at the sub-path's point.
    Square,
    /// At each end of each sub-path, the shape representing the stroke will be extended
    /// by a half circle with a radius equal to the stroke width.
    /// If a sub-path has zero length, then the resulting effect is that the stroke for
    /// that sub-path consists solely of a full circle centered at the sub-path's point.
    Round,
}

/// Line join as defined by the SVG specification.
///
/// See: <https://svgwg.org/specs/strokes/#StrokeLinejoinProperty>
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum LineJoin {
    /// A sharp corner is to be used to join path segments, unless the miter
    /// length exceeds the miter limit, in which case a bevel join is used.
    Miter,
    /// A round corner is to be used to join path segments.
    Round,
    /// A beveled corner is to be used to join path segments.
    /// The bevel shape is a triangle that fills the area between the two stroked
    /// segments.
    Bevel,
}

/// Parameters for strokes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct StrokeOptions {
    /// What cap to use at both ends of each open sub-path.
    ///
    /// Default value: `LineCap::Butt`.
    pub line_cap: LineCap,

    /// See the SVG specification.
    ///
    /// Default value: `LineJoin::Miter`.
    pub line_join: LineJoin,

    /// Line width
    ///
    /// Default value: `StrokeOptions::DEFAULT_LINE_WIDTH`.
    pub line_width: f32,

    /// See the SVG specification.
    ///
    /// Must be greater than or equal to 1.0.
    /// Default value: `StrokeOptions::DEFAULT_MITER_LIMIT`.
    pub miter_limit: f32,

    /// Alternating lengths of dashes and gaps. An empty array means a solid
    /// stroke.
    ///
    /// Default value: empty.
    pub dash_array: Vec<f32>,

    /// Distance into the dash pattern at which the stroke starts.
    ///
    /// Default value: 0.
    pub dash_offset: f32,

    /// Maximum allowed distance to the path when building an approximation.
    ///
    /// Default value: `StrokeOptions::DEFAULT_TOLERANCE`.
    pub tolerance: f32,
}

impl StrokeOptions {
    /// Minimum miter limit as defined by the SVG specification.
    ///
    /// See [StrokeMiterLimitProperty](https://svgwg.org/specs/strokes/#StrokeMiterlimitProperty)
    pub const MINIMUM_MITER_LIMIT: f32 = 1.0;
    /// Default miter limit as defined by the SVG specification.
    ///
    /// See [StrokeMiterLimitProperty](https://svgwg.org/specs/strokes/#StrokeMiterlimitProperty)
    pub const DEFAULT_MITER_LIMIT: f32 = 4.0;
    pub const DEFAULT_LINE_CAP: LineCap = LineCap::Butt;
    pub const DEFAULT_LINE_JOIN: LineJoin = LineJoin::Miter;
    pub const DEFAULT_LINE_WIDTH: f32 = 1.0;
    pub const DEFAULT_TOLERANCE: f32 = 0.1;

    pub const DEFAULT: Self = StrokeOptions {
        line_cap: Self::DEFAULT_LINE_CAP,
        line_join: Self::DEFAULT_LINE_JOIN,
        line_width: Self::DEFAULT_LINE_WIDTH,
        miter_limit: Self::DEFAULT_MITER_LIMIT,
        dash_array: Vec::new(),
        dash_offset: 0.0,
        tolerance: Self::DEFAULT_TOLERANCE,
    };

    #[inline]
    pub fn tolerance(tolerance: f32) -> Self {
        Self::DEFAULT.with_tolerance(tolerance)
    }

    #[inline]
    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[inline]
    pub fn with_line_cap(mut self, cap: LineCap) -> Self {
        self.line_cap = cap;
        self
    }

    #[inline]
    pub fn with_line_join(mut self, join: LineJoin) -> Self {
        self.line_join = join;
        self
    }

    #[inline]
    pub fn with_line_width(mut self, width: f32) -> Self {
        self.line_width = width;
        self
    }

    /// Limits below `MINIMUM_MITER_LIMIT` are raised to it.
    #[inline]
    pub fn with_miter_limit(mut self, limit: f32) -> Self {
        self.miter_limit = limit.max(Self::MINIMUM_MITER_LIMIT);
        self
    }

    #[inline]
    pub fn with_dashes(mut self, dash_array: &[f32], dash_offset: f32) -> Self {
        self.dash_array = dash_array.to_vec();
        self.dash_offset = dash_offset;
        self
    }
}

impl Default for StrokeOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Parameters for fills.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct FillOptions {
    /// Maximum allowed distance to the path when building an approximation.
    ///
    /// Default value: `FillOptions::DEFAULT_TOLERANCE`.
    pub tolerance: f32,

    /// Set the fill rule.
    ///
    /// See the [SVG specification](https://www.w3.org/TR/SVG/painting.html#FillRuleProperty).
    ///
    /// Default value: `NonZero`.
    pub fill_rule: FillRule,
}

impl FillOptions {
    /// Default flattening tolerance.
    pub const DEFAULT_TOLERANCE: f32 = 0.1;
    /// Default Fill rule.
    pub const DEFAULT_FILL_RULE: FillRule = FillRule::NonZero;

    pub const DEFAULT: Self = FillOptions {
        tolerance: Self::DEFAULT_TOLERANCE,
        fill_rule: Self::DEFAULT_FILL_RULE,
    };

    #[inline]
    pub fn even_odd() -> Self {
        Self::DEFAULT.with_fill_rule(FillRule::EvenOdd)
    }

    #[inline]
    pub fn tolerance(tolerance: f32) -> Self {
        Self::DEFAULT.with_tolerance(tolerance)
    }

    #[inline]
    pub fn non_zero() -> Self {
        Self::DEFAULT.with_fill_rule(FillRule::NonZero)
    }

    #[inline]
    pub const fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[inline]
    pub const fn with_fill_rule(mut self, rule: FillRule) -> Self {
        self.fill_rule = rule;
        self
    }
}

impl Default for FillOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[test]
fn options_builders() {
    let stroke = StrokeOptions::tolerance(0.5)
        .with_line_width(3.0)
        .with_line_cap(LineCap::Round)
        .with_line_join(LineJoin::Bevel)
        .with_miter_limit(0.5)
        .with_dashes(&[1.0, 2.0], 0.5);

    assert_eq!(stroke.tolerance, 0.5);
    assert_eq!(stroke.line_width, 3.0);
    assert_eq!(stroke.miter_limit, StrokeOptions::MINIMUM_MITER_LIMIT);
    assert_eq!(stroke.dash_array, vec![1.0, 2.0]);
    assert_eq!(StrokeOptions::default().line_cap, LineCap::Butt);

    assert_eq!(FillOptions::default().fill_rule, FillRule::NonZero);
    assert_eq!(FillOptions::even_odd().fill_rule, FillRule::EvenOdd);
}
