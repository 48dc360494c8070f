//! Scanline conversion of paths into coverage masks.
//!
//! The rasterizer works on the flattened path. Every line segment deposits,
//! in the cells of a row accumulation buffer, the signed area it covers to the
//! right of itself within the row. A prefix sum over the row then gives the
//! signed coverage of each pixel, which the fill rule folds into `[0, 1]`.
//!
//! Rows are processed from top to bottom with a list of the edges crossing the
//! current row, so only one row of accumulation is kept in memory. Rows that
//! no edge crosses are skipped.
//!
//! Edges are split where they cross the left and right sides of the rasterized
//! region. The pieces outside of the region are projected onto its sides as
//! vertical edges: what lies left of the region still covers every pixel to
//! its right, and what lies right of it cannot affect any visible pixel.

use crate::counters::RasterCounters;
use crate::math::*;
use crate::path::{FillRule, FlattenedPath, Path};
use crate::rle::{BinaryOp, Rle, SpanBuilder};
use crate::stroke::stroke_to_path;
use crate::{FillOptions, RasterResult, StrokeOptions, UnsupportedParameter};

use std::sync::Arc;
use std::time::Instant;

/// Converts paths into coverage masks.
///
/// A rasterizer keeps its scratch buffers between calls, so reusing the same
/// instance for many paths avoids most allocations.
///
/// ```
/// use pathmask_raster::{FillOptions, Rasterizer, StrokeOptions};
/// use pathmask_raster::path::Path;
/// use pathmask_raster::math::{int_box2d, point};
///
/// let mut path = Path::new();
/// path.move_to(point(0.0, 0.0));
/// path.line_to(point(100.0, 20.0));
/// path.line_to(point(40.0, 80.0));
/// path.close();
///
/// let mut rasterizer = Rasterizer::new();
/// let clip = int_box2d(0, 0, 50, 50);
/// let fill = rasterizer.fill(&path, &FillOptions::default(), Some(&clip)).unwrap();
/// let outline = rasterizer.stroke(&path, &StrokeOptions::default(), None).unwrap();
///
/// assert!(clip.contains_box(&fill.bounding_rect()));
/// assert!(!outline.is_empty());
/// ```
#[derive(Default)]
pub struct Rasterizer {
    flattened: FlattenedPath,
    edges: Vec<Edge>,
    active: Vec<usize>,
    accumulator: Vec<f32>,
    counters: Option<Arc<RasterCounters>>,
}

impl Rasterizer {
    pub fn new() -> Self {
        Rasterizer::default()
    }

    /// Creates a rasterizer that adds the time it spends to `counters`.
    pub fn with_counters(counters: Arc<RasterCounters>) -> Self {
        Rasterizer {
            counters: Some(counters),
            ..Rasterizer::default()
        }
    }

    pub fn counters(&self) -> Option<&Arc<RasterCounters>> {
        self.counters.as_ref()
    }

    /// Computes the coverage of the inside of a path.
    ///
    /// Open sub-paths are implicitly closed. Nothing is produced outside of
    /// `clip` when it is provided.
    pub fn fill(
        &mut self,
        path: &Path,
        options: &FillOptions,
        clip: Option<&IntBox2D>,
    ) -> RasterResult<Rle> {
        let start = Instant::now();
        validate_path(path)?;
        validate_tolerance(options.tolerance)?;

        self.flattened.rebuild(path, options.tolerance);
        let rle = self.rasterize_flattened(options.fill_rule, clip);

        self.add_rasterize_time(start);

        Ok(rle)
    }

    /// Computes the coverage of the outline of a path.
    ///
    /// Strokes with a zero or negative width produce an empty mask.
    pub fn stroke(
        &mut self,
        path: &Path,
        options: &StrokeOptions,
        clip: Option<&IntBox2D>,
    ) -> RasterResult<Rle> {
        let start = Instant::now();
        validate_path(path)?;
        validate_tolerance(options.tolerance)?;
        if !options.line_width.is_finite() {
            return Err(UnsupportedParameter::InvalidLineWidth.into());
        }

        if options.line_width <= 0.0 {
            log::debug!("Stroke width {} covers nothing.", options.line_width);
            return Ok(Rle::new());
        }

        let outline = stroke_to_path(path, options);
        self.flattened.rebuild(&outline, options.tolerance);
        let rle = self.rasterize_flattened(FillRule::NonZero, clip);

        self.add_rasterize_time(start);

        Ok(rle)
    }

    /// Computes the union of the fill and the stroke of a path.
    pub fn draw(
        &mut self,
        path: &Path,
        fill_options: &FillOptions,
        stroke_options: &StrokeOptions,
        clip: Option<&IntBox2D>,
    ) -> RasterResult<Rle> {
        let fill = self.fill(path, fill_options, clip)?;
        let stroke = self.stroke(path, stroke_options, clip)?;

        Ok(Rle::binary(&fill, &stroke, BinaryOp::Or))
    }

    fn rasterize_flattened(&mut self, fill_rule: FillRule, clip: Option<&IntBox2D>) -> Rle {
        let region = match compute_region(&self.flattened, clip) {
            Some(region) => region,
            None => {
                log::debug!("Nothing to rasterize within {:?}.", clip);
                return Rle::new();
            }
        };

        build_edges(&self.flattened, &region, &mut self.edges);
        log::trace!("Rasterizing {} edges in {:?}", self.edges.len(), region);

        if self.edges.is_empty() {
            return Rle::new();
        }

        let start = Instant::now();
        let rle = self.scan(&region, fill_rule);
        if let Some(counters) = &self.counters {
            counters.add_scanline_time(start.elapsed());
        }

        rle
    }

    fn scan(&mut self, region: &IntBox2D, fill_rule: FillRule) -> Rle {
        let width = region.width() as usize;
        let width_f = width as f32;
        let Rasterizer {
            edges,
            active,
            accumulator,
            ..
        } = self;

        // Two extra cells: segments touching the right side write one and two
        // cells past the last pixel.
        accumulator.clear();
        accumulator.resize(width + 2, 0.0);
        active.clear();

        let mut builder = SpanBuilder::with_capacity(region.height() as usize);
        let mut next_edge = 0;
        let mut y = region.min.y;
        while y < region.max.y {
            let row_top = y as f32;
            let row_bottom = row_top + 1.0;

            active.retain(|&idx| edges[idx].y1 > row_top);
            while next_edge < edges.len() && edges[next_edge].y0 < row_bottom {
                active.push(next_edge);
                next_edge += 1;
            }

            if active.is_empty() {
                match edges.get(next_edge) {
                    Some(edge) => {
                        y = (edge.y0.floor() as i32).max(y + 1);
                        continue;
                    }
                    None => break,
                }
            }

            for &idx in active.iter() {
                let edge = &edges[idx];
                let top = edge.y0.max(row_top);
                let bottom = edge.y1.min(row_bottom);
                if bottom <= top {
                    continue;
                }

                let x0 = edge.x_at(top).max(0.0).min(width_f);
                let x1 = edge.x_at(bottom).max(0.0).min(width_f);
                accumulate(accumulator, x0, x1, (bottom - top) * edge.winding);
            }

            emit_row(accumulator, width, y, region.min.x, fill_rule, &mut builder);
            y += 1;
        }

        builder.build()
    }

    fn add_rasterize_time(&self, start: Instant) {
        if let Some(counters) = &self.counters {
            counters.add_rasterize_time(start.elapsed());
        }
    }
}

/// A line segment going down, with `x` relative to the left of the region.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Edge {
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    // 1 if the segment goes down in the path, -1 if it goes up.
    winding: f32,
}

impl Edge {
    #[inline]
    fn x_at(&self, y: f32) -> f32 {
        let t = (y - self.y0) / (self.y1 - self.y0);
        self.x0 + (self.x1 - self.x0) * t
    }
}

fn validate_path(path: &Path) -> RasterResult<()> {
    if path.points().iter().all(|p| p.x.is_finite() && p.y.is_finite()) {
        return Ok(());
    }

    log::warn!("Rejecting a path with non-finite coordinates.");

    Err(UnsupportedParameter::PositionIsNaN.into())
}

fn validate_tolerance(tolerance: f32) -> RasterResult<()> {
    if tolerance.is_finite() {
        Ok(())
    } else {
        Err(UnsupportedParameter::ToleranceIsNaN.into())
    }
}

/// The pixels the path can cover, limited to the clip and to the 16 bits
/// coordinate range of the spans.
fn compute_region(flattened: &FlattenedPath, clip: Option<&IntBox2D>) -> Option<IntBox2D> {
    let bounds = flattened.bounding_box()?;
    let mut region = int_box2d(
        bounds.min.x.floor() as i32,
        bounds.min.y.floor() as i32,
        bounds.max.x.ceil() as i32,
        bounds.max.y.ceil() as i32,
    );

    if let Some(clip) = clip {
        region = region.intersection_unchecked(clip);
    }

    let limits = int_box2d(
        i16::MIN as i32,
        i16::MIN as i32,
        i16::MAX as i32,
        i16::MAX as i32,
    );
    region = region.intersection_unchecked(&limits);

    if region.is_empty() {
        return None;
    }

    Some(region)
}

fn build_edges(flattened: &FlattenedPath, region: &IntBox2D, edges: &mut Vec<Edge>) {
    edges.clear();

    let origin = vector(region.min.x as f32, 0.0);
    let width = region.width() as f32;
    let top = region.min.y as f32;
    let bottom = region.max.y as f32;

    for (points, _) in flattened.iter() {
        let last = match points.last() {
            Some(last) if points.len() > 1 => *last,
            _ => continue,
        };

        // Filling closes every sub-path.
        let mut prev = last - origin;
        for p in points {
            let p = *p - origin;
            add_edge(edges, prev, p, width, top, bottom);
            prev = p;
        }
    }

    edges.sort_by(|a, b| a.y0.total_cmp(&b.y0));
}

fn add_edge(edges: &mut Vec<Edge>, from: Point, to: Point, width: f32, top: f32, bottom: f32) {
    if from.y == to.y {
        return;
    }

    let (winding, a, b) = if from.y < to.y {
        (1.0, from, to)
    } else {
        (-1.0, to, from)
    };

    if b.y <= top || a.y >= bottom {
        return;
    }

    let mut splits = [0.0, 1.0, 1.0, 1.0];
    let mut count = 1;
    for side in [0.0, width] {
        if (a.x - side) * (b.x - side) < 0.0 {
            splits[count] = (side - a.x) / (b.x - a.x);
            count += 1;
        }
    }
    splits[count] = 1.0;
    if count == 3 && splits[1] > splits[2] {
        splits.swap(1, 2);
    }

    for t in splits[..=count].windows(2) {
        let p0 = a.lerp(b, t[0]);
        let p1 = a.lerp(b, t[1]);
        if p1.y <= p0.y {
            continue;
        }

        edges.push(Edge {
            x0: p0.x.max(0.0).min(width),
            y0: p0.y,
            x1: p1.x.max(0.0).min(width),
            y1: p1.y,
            winding,
        });
    }
}

/// Adds the signed area covered by a segment spanning `d` vertically within a
/// row, from `x` to `xnext`.
fn accumulate(acc: &mut [f32], x: f32, xnext: f32, d: f32) {
    let (x0, x1) = if x < xnext { (x, xnext) } else { (xnext, x) };
    let x0floor = x0.floor();
    let x0i = x0floor as usize;
    let x1ceil = x1.ceil();
    let x1i = x1ceil as usize;

    if x1i <= x0i + 1 {
        // The segment stays within a single pixel.
        let xmf = 0.5 * (x + xnext) - x0floor;
        acc[x0i] += d - d * xmf;
        acc[x0i + 1] += d * xmf;
        return;
    }

    let s = (x1 - x0).recip();
    let x0f = x0 - x0floor;
    let a0 = 0.5 * s * (1.0 - x0f) * (1.0 - x0f);
    let x1f = x1 - x1ceil + 1.0;
    let am = 0.5 * s * x1f * x1f;

    acc[x0i] += d * a0;
    if x1i == x0i + 2 {
        acc[x0i + 1] += d * (1.0 - a0 - am);
    } else {
        let a1 = s * (1.5 - x0f);
        acc[x0i + 1] += d * (a1 - a0);
        for cell in &mut acc[x0i + 2..x1i - 1] {
            *cell += d * s;
        }
        let a2 = a1 + (x1i - x0i - 3) as f32 * s;
        acc[x1i - 1] += d * (1.0 - a2 - am);
    }
    acc[x1i] += d * am;
}

fn emit_row(
    acc: &mut [f32],
    width: usize,
    y: i32,
    x_offset: i32,
    fill_rule: FillRule,
    builder: &mut SpanBuilder,
) {
    let mut sum = 0.0;
    let mut run_start = 0;
    let mut run_coverage = 0;
    for (x, cell) in acc[..width].iter().enumerate() {
        sum += *cell;
        let coverage = quantize(fill_rule.coverage(sum));
        if coverage != run_coverage {
            builder.push(y, x_offset + run_start as i32, x_offset + x as i32, run_coverage);
            run_start = x;
            run_coverage = coverage;
        }
    }
    builder.push(y, x_offset + run_start as i32, x_offset + width as i32, run_coverage);

    acc.fill(0.0);
}

/// Rounds a coverage in `[0, 1]` to 8 bits, half-way values rounding up.
#[inline]
fn quantize(coverage: f32) -> u8 {
    (coverage.max(0.0).min(1.0) * 255.0 + 0.5).floor() as u8
}

#[test]
fn accumulated_rows_sum_to_winding() {
    // A segment crossing a whole row adds its winding to the cells right of it.
    let mut acc = vec![0.0; 6];
    accumulate(&mut acc, 0.5, 3.5, 1.0);
    assert!((acc.iter().sum::<f32>() - 1.0).abs() < 1e-5);

    let mut acc = vec![0.0; 4];
    accumulate(&mut acc, 1.0, 1.0, -1.0);
    assert_eq!(acc, vec![0.0, -1.0, 0.0, 0.0]);
}

#[test]
fn quantization_rounds_half_up() {
    assert_eq!(quantize(0.0), 0);
    assert_eq!(quantize(1.0), 255);
    assert_eq!(quantize(0.25), 64);
    assert_eq!(quantize(1.5), 255);
    assert_eq!(quantize(-0.5), 0);
}

#[test]
fn edges_are_split_at_the_region_sides() {
    let mut edges = Vec::new();
    add_edge(&mut edges, point(-2.0, 0.0), point(6.0, 8.0), 4.0, 0.0, 8.0);

    assert_eq!(edges.len(), 3);
    // Left of the region: projected onto its left side.
    assert_eq!((edges[0].x0, edges[0].x1), (0.0, 0.0));
    assert!((edges[0].y1 - 2.0).abs() < 1e-5);
    // Inside.
    assert!((edges[1].x1 - 4.0).abs() < 1e-5);
    // Right of the region: projected onto its right side.
    assert_eq!((edges[2].x0, edges[2].x1), (4.0, 4.0));
    assert!(edges.iter().all(|e| e.winding == 1.0));
}

#[test]
fn pixel_aligned_square() {
    let mut path = Path::new();
    path.add_rect(&box2d(1.0, 1.0, 4.0, 3.0), crate::path::Winding::Negative);

    let rle = Rasterizer::new()
        .fill(&path, &FillOptions::default(), None)
        .unwrap();

    assert_eq!(rle.bounding_rect(), int_box2d(1, 1, 4, 3));
    assert_eq!(rle.spans().len(), 2);
    assert!(rle.spans().iter().all(|span| span.len == 3 && span.coverage == 255));
}

#[test]
fn partial_coverage() {
    let mut path = Path::new();
    path.add_rect(&box2d(0.5, 0.5, 1.5, 1.5), crate::path::Winding::Positive);

    let rle = Rasterizer::new()
        .fill(&path, &FillOptions::default(), None)
        .unwrap();

    assert_eq!(rle.bounding_rect(), int_box2d(0, 0, 2, 2));
    for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
        assert_eq!(rle.coverage_at(x, y), 64);
    }
}

#[test]
fn counters_are_updated() {
    let counters = Arc::new(RasterCounters::new());
    let mut rasterizer = Rasterizer::with_counters(counters.clone());
    assert!(rasterizer.counters().is_some());

    let mut path = Path::new();
    path.add_circle(point(50.0, 50.0), 40.0, crate::path::Winding::Positive);
    rasterizer.fill(&path, &FillOptions::default(), None).unwrap();

    assert!(counters.rasterize_time() >= counters.scanline_time());
    assert!(counters.rasterize_time() > std::time::Duration::ZERO);
}
