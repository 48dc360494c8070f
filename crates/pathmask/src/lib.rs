#![deny(bare_trait_objects)]

//! Antialiased rasterization of 2D paths into coverage masks, and boolean
//! operations on those masks for clip path composition.
//!
//! # Crates
//!
//! This meta-crate (`pathmask`) reexports the following sub-crates for convenience:
//!
//! * **pathmask_raster** - The scanline rasterizer, the stroker, run-length encoded masks
//!   and their tiled form.
//! * **pathmask_path** - Path storage, shape builders, flattening and dashing.
//! * **pathmask_geom** - Line segments, bézier curves and arcs.
//!
//! Each `pathmask_<name>` crate is reexported as a `<name>` module in `pathmask`. For example:
//!
//! ```ignore
//! extern crate pathmask_raster;
//! use pathmask_raster::Rasterizer;
//! ```
//!
//! Is equivalent to:
//!
//! ```ignore
//! extern crate pathmask;
//! use pathmask::raster::Rasterizer;
//! ```
//!
//! # Feature flags
//!
//! serialization using serde can be enabled on each crate using the
//! `serialization` feature flag (disabled by default).
//!
//! # Examples
//!
//! ## Rasterizing a rounded rectangle
//!
//! ```
//! use pathmask::math::box2d;
//! use pathmask::path::{BorderRadii, Path, Winding};
//! use pathmask::raster::{FillOptions, Rasterizer};
//!
//! let mut path = Path::new();
//! path.add_round_rect(
//!     &box2d(0.0, 0.0, 100.0, 50.0),
//!     &BorderRadii {
//!         top_left: 10.0,
//!         top_right: 5.0,
//!         bottom_left: 20.0,
//!         bottom_right: 25.0,
//!     },
//!     false,
//!     Winding::Positive,
//! );
//!
//! let mut rasterizer = Rasterizer::new();
//! let mask = rasterizer.fill(&path, &FillOptions::tolerance(0.1), None).unwrap();
//!
//! // One coverage byte per pixel of the bounding rectangle, ready to be
//! // uploaded as a sprite.
//! let rect = mask.bounding_rect();
//! let sprite = mask.to_sprite();
//! assert_eq!(sprite.len(), (rect.width() * rect.height()) as usize);
//! ```
//!
//! ## Composing clip paths
//!
//! ```
//! use pathmask::math::{box2d, int_box2d, point};
//! use pathmask::path::{Path, Winding};
//! use pathmask::raster::{BinaryOp, FillOptions, PreparedPath, Rasterizer, Rle};
//!
//! let mut circle = Path::new();
//! circle.add_circle(point(32.0, 32.0), 24.0, Winding::Positive);
//!
//! let mut rasterizer = Rasterizer::new();
//! let clip = int_box2d(0, 0, 64, 64);
//! let circle = rasterizer.fill(&circle, &FillOptions::default(), Some(&clip)).unwrap();
//!
//! let mut band = Path::new();
//! band.add_rect(&box2d(0.0, 24.0, 64.0, 40.0), Winding::Positive);
//! let band = rasterizer.fill(&band, &FillOptions::default(), Some(&clip)).unwrap();
//!
//! // With run-length encoded masks...
//! let clipped = Rle::binary(&circle, &band, BinaryOp::And);
//!
//! // ...or with the tiled form.
//! let tiled = PreparedPath::intersection(
//!     &PreparedPath::from_rle(&circle),
//!     &PreparedPath::from_rle(&band),
//! );
//!
//! assert_eq!(tiled.to_rle(), clipped);
//! ```

pub extern crate pathmask_raster;

pub use pathmask_raster::geom;
pub use pathmask_raster::math;
pub use pathmask_raster::path;

pub mod raster {
    pub use pathmask_raster::*;
}
