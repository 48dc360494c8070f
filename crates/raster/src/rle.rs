//! Run-length encoded coverage masks.
//!
//! An `Rle` is a list of horizontal spans sorted by row and then by column.
//! Each span covers `len` pixels of a single row with the same coverage.
//! Pixels not covered by any span have a coverage of zero.

use crate::math::{int_box2d, IntBox2D};
use crate::{RasterError, RasterResult};

use core::cmp::Ordering;

/// A run of pixels with the same coverage on a single row.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Span {
    pub x: i16,
    pub y: i16,
    pub len: i16,
    /// Coverage in `[1, 255]`, 255 meaning fully covered.
    pub coverage: u8,
}

impl Span {
    /// One past the last pixel of the span.
    #[inline]
    pub fn end(&self) -> i32 {
        self.x as i32 + self.len as i32
    }
}

/// The boolean operations that combine two coverage masks.
///
/// Coverages are treated as fuzzy sets: with `a` and `b` in `[0, 1]`,
/// `And` computes `a·b`, `AndNot` `a·(1 - b)`, `Or` `a + b - a·b` and
/// `Xor` `a + b - 2·a·b`. For fully opaque or fully transparent pixels these
/// are the usual boolean operations.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum BinaryOp {
    And,
    AndNot,
    Or,
    Xor,
}

impl BinaryOp {
    /// Combines two 8-bit coverages.
    #[inline]
    pub fn apply(self, a: u8, b: u8) -> u8 {
        let a = a as u32;
        let b = b as u32;
        let result = match self {
            BinaryOp::And => div255(a * b),
            BinaryOp::AndNot => div255(a * (255 - b)),
            BinaryOp::Or => (a + b).saturating_sub(div255(a * b)),
            BinaryOp::Xor => (a + b).saturating_sub(2 * div255(a * b)),
        };

        result.min(255) as u8
    }

    /// Whether a row (or tile) present only in the first operand is kept.
    #[inline]
    pub fn keeps_first_only(self) -> bool {
        self != BinaryOp::And
    }

    /// Whether a row (or tile) present only in the second operand is kept.
    #[inline]
    pub fn keeps_second_only(self) -> bool {
        match self {
            BinaryOp::Or | BinaryOp::Xor => true,
            BinaryOp::And | BinaryOp::AndNot => false,
        }
    }
}

/// `x / 255` rounded to the nearest integer, for `x` in `[0, 255 * 255]`.
#[inline]
pub fn div255(x: u32) -> u32 {
    let x = x + 128;
    (x + (x >> 8)) >> 8
}

/// A coverage mask, stored as sorted horizontal spans.
///
/// Spans are sorted by `(y, x)`, never overlap and never have a zero coverage.
/// The bounding rectangle is computed when the mask is created.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Rle {
    spans: Vec<Span>,
    bounds: IntBox2D,
}

impl Default for Rle {
    fn default() -> Self {
        Rle::new()
    }
}

impl Rle {
    /// An empty mask.
    pub fn new() -> Self {
        Rle {
            spans: Vec::new(),
            bounds: IntBox2D::zero(),
        }
    }

    /// Creates a mask from spans, checking that they are sorted, non-empty,
    /// non-overlapping and have a non-zero coverage.
    pub fn from_spans(spans: Vec<Span>) -> RasterResult<Self> {
        for (index, span) in spans.iter().enumerate() {
            if span.len <= 0 || span.coverage == 0 {
                return Err(RasterError::InvalidSpans { index });
            }

            if index > 0 {
                let prev = &spans[index - 1];
                let in_order = match prev.y.cmp(&span.y) {
                    Ordering::Less => true,
                    Ordering::Equal => prev.end() <= span.x as i32,
                    Ordering::Greater => false,
                };
                if !in_order {
                    return Err(RasterError::InvalidSpans { index });
                }
            }
        }

        Ok(Rle::from_sorted_spans(spans))
    }

    /// Creates a mask from spans that are known to be valid.
    pub(crate) fn from_sorted_spans(spans: Vec<Span>) -> Self {
        let bounds = compute_bounds(&spans);
        Rle { spans, bounds }
    }

    #[inline]
    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// The smallest rectangle containing every span, `max` excluded.
    ///
    /// Empty masks have an empty rectangle at the origin.
    #[inline]
    pub fn bounding_rect(&self) -> IntBox2D {
        self.bounds
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Coverage of the pixel at `(x, y)`, zero outside of the spans.
    pub fn coverage_at(&self, x: i32, y: i32) -> u8 {
        let idx = self.spans.partition_point(|span| {
            (span.y as i32) < y || (span.y as i32 == y && span.end() <= x)
        });

        match self.spans.get(idx) {
            Some(span) if span.y as i32 == y && span.x as i32 <= x => span.coverage,
            _ => 0,
        }
    }

    /// Iterates over the rows of the mask, as slices of spans sharing the same `y`.
    pub fn rows(&self) -> Rows {
        Rows { spans: &self.spans }
    }

    /// Returns a copy of the mask moved by `(dx, dy)` pixels.
    ///
    /// Parts of the mask moved outside of the 16 bits coordinate range are
    /// discarded.
    pub fn translated(&self, dx: i32, dy: i32) -> Rle {
        let mut builder = SpanBuilder::with_capacity(self.spans.len());
        for span in &self.spans {
            builder.push(
                span.y as i32 + dy,
                span.x as i32 + dx,
                span.end() + dx,
                span.coverage,
            );
        }

        builder.build()
    }

    /// Expands the mask into an 8-bit single channel image covering
    /// `bounding_rect()`, in row-major order with no padding.
    ///
    /// The image is `width * height` bytes; empty masks give an empty image.
    pub fn to_sprite(&self) -> Vec<u8> {
        let bounds = self.bounds;
        let width = bounds.width().max(0) as usize;
        let height = bounds.height().max(0) as usize;
        let mut sprite = vec![0; width * height];

        for span in &self.spans {
            let row = (span.y as i32 - bounds.min.y) as usize;
            let start = row * width + (span.x as i32 - bounds.min.x) as usize;
            let end = start + span.len as usize;
            sprite[start..end].fill(span.coverage);
        }

        sprite
    }

    /// Combines two masks with a boolean operation.
    ///
    /// Rows are combined run by run. A row present in only one of the masks
    /// is copied or dropped depending on the operation: `And` drops it,
    /// `AndNot` keeps it only when it comes from `a`, `Or` and `Xor` copy it.
    pub fn binary(a: &Rle, b: &Rle, op: BinaryOp) -> Rle {
        let mut builder = SpanBuilder::with_capacity(a.spans.len() + b.spans.len());
        let mut rows_a = a.rows().peekable();
        let mut rows_b = b.rows().peekable();

        loop {
            let ordering = match (rows_a.peek(), rows_b.peek()) {
                (Some(ra), Some(rb)) => ra[0].y.cmp(&rb[0].y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => break,
            };

            match ordering {
                Ordering::Less => {
                    if let Some(row) = rows_a.next() {
                        if op.keeps_first_only() {
                            builder.extend_row(row, |c| op.apply(c, 0));
                        }
                    }
                }
                Ordering::Greater => {
                    if let Some(row) = rows_b.next() {
                        if op.keeps_second_only() {
                            builder.extend_row(row, |c| op.apply(0, c));
                        }
                    }
                }
                Ordering::Equal => {
                    if let (Some(ra), Some(rb)) = (rows_a.next(), rows_b.next()) {
                        combine_rows(ra, rb, op, &mut builder);
                    }
                }
            }
        }

        builder.build()
    }
}

/// Iterator over the rows of an `Rle`.
pub struct Rows<'l> {
    spans: &'l [Span],
}

impl<'l> Iterator for Rows<'l> {
    type Item = &'l [Span];

    fn next(&mut self) -> Option<&'l [Span]> {
        let y = self.spans.first()?.y;
        let len = self.spans.partition_point(|span| span.y == y);
        let (row, rest) = self.spans.split_at(len);
        self.spans = rest;

        Some(row)
    }
}

// Sweeps both rows from left to right, emitting one run per interval between
// two consecutive span boundaries.
fn combine_rows(ra: &[Span], rb: &[Span], op: BinaryOp, builder: &mut SpanBuilder) {
    let y = ra[0].y as i32;
    let mut i = 0;
    let mut j = 0;
    let mut x = i32::MIN;

    loop {
        while i < ra.len() && ra[i].end() <= x {
            i += 1;
        }
        while j < rb.len() && rb[j].end() <= x {
            j += 1;
        }

        let (ca, next_a) = run_at(ra.get(i), x);
        let (cb, next_b) = run_at(rb.get(j), x);
        if i == ra.len() && j == rb.len() {
            break;
        }

        let next = next_a.min(next_b);
        if ca != 0 || cb != 0 {
            builder.push(y, x, next, op.apply(ca, cb));
        }
        x = next;
    }
}

// Coverage at `x` and the position of the next boundary.
#[inline]
fn run_at(span: Option<&Span>, x: i32) -> (u8, i32) {
    match span {
        Some(span) if span.x as i32 <= x => (span.coverage, span.end()),
        Some(span) => (0, span.x as i32),
        None => (0, i32::MAX),
    }
}

fn compute_bounds(spans: &[Span]) -> IntBox2D {
    let (first, last) = match (spans.first(), spans.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return IntBox2D::zero(),
    };

    let mut x_min = i32::MAX;
    let mut x_max = i32::MIN;
    for span in spans {
        x_min = x_min.min(span.x as i32);
        x_max = x_max.max(span.end());
    }

    int_box2d(x_min, first.y as i32, x_max, last.y as i32 + 1)
}

/// Accumulates runs in `(y, x)` order into spans.
///
/// Adjacent runs with the same coverage are merged, zero runs are skipped and
/// runs are clipped to the 16 bits coordinate range.
pub(crate) struct SpanBuilder {
    spans: Vec<Span>,
}

impl SpanBuilder {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        SpanBuilder {
            spans: Vec::with_capacity(capacity),
        }
    }

    /// Adds the run `[x0, x1)` on row `y`.
    pub(crate) fn push(&mut self, y: i32, x0: i32, x1: i32, coverage: u8) {
        let x0 = x0.max(i16::MIN as i32);
        let x1 = x1.min(i16::MAX as i32);
        if coverage == 0 || x1 <= x0 || y < i16::MIN as i32 || y > i16::MAX as i32 {
            return;
        }

        if let Some(last) = self.spans.last_mut() {
            let len = x1 - last.x as i32;
            if last.y as i32 == y
                && last.end() == x0
                && last.coverage == coverage
                && len <= i16::MAX as i32
            {
                last.len = len as i16;
                return;
            }
        }

        // Runs longer than the 16 bits span length are split.
        let mut x = x0;
        while x < x1 {
            let len = (x1 - x).min(i16::MAX as i32);
            self.spans.push(Span {
                x: x as i16,
                y: y as i16,
                len: len as i16,
                coverage,
            });
            x += len;
        }
    }

    fn extend_row<F: Fn(u8) -> u8>(&mut self, row: &[Span], coverage: F) {
        for span in row {
            self.push(span.y as i32, span.x as i32, span.end(), coverage(span.coverage));
        }
    }

    pub(crate) fn build(self) -> Rle {
        Rle::from_sorted_spans(self.spans)
    }
}

#[cfg(test)]
fn span(x: i16, y: i16, len: i16, coverage: u8) -> Span {
    Span { x, y, len, coverage }
}

#[test]
fn div255_rounds_to_nearest() {
    for x in 0..=(255 * 255) {
        let expected = (x as f64 / 255.0 + 0.5).floor() as u32;
        assert_eq!(div255(x), expected, "{}", x);
    }
}

#[test]
fn binary_op_formulas() {
    assert_eq!(BinaryOp::And.apply(255, 255), 255);
    assert_eq!(BinaryOp::And.apply(255, 0), 0);
    assert_eq!(BinaryOp::And.apply(128, 128), 64);
    assert_eq!(BinaryOp::AndNot.apply(255, 255), 0);
    assert_eq!(BinaryOp::AndNot.apply(255, 0), 255);
    assert_eq!(BinaryOp::Or.apply(255, 255), 255);
    assert_eq!(BinaryOp::Or.apply(0, 100), 100);
    assert_eq!(BinaryOp::Xor.apply(255, 255), 0);
    assert_eq!(BinaryOp::Xor.apply(255, 0), 255);
    assert_eq!(BinaryOp::Xor.apply(0, 7), 7);
}

#[test]
fn from_spans_validation() {
    let rle = Rle::from_spans(vec![
        span(0, 0, 2, 255),
        span(3, 0, 1, 10),
        span(-5, 1, 1, 1),
    ])
    .unwrap();
    assert_eq!(rle.bounding_rect(), int_box2d(-5, 0, 4, 2));

    assert_eq!(
        Rle::from_spans(vec![span(0, 0, 2, 255), span(1, 0, 1, 10)]),
        Err(RasterError::InvalidSpans { index: 1 })
    );
    assert_eq!(
        Rle::from_spans(vec![span(0, 1, 2, 255), span(0, 0, 1, 10)]),
        Err(RasterError::InvalidSpans { index: 1 })
    );
    assert_eq!(
        Rle::from_spans(vec![span(0, 0, 0, 255)]),
        Err(RasterError::InvalidSpans { index: 0 })
    );
    assert_eq!(
        Rle::from_spans(vec![span(0, 0, 1, 0)]),
        Err(RasterError::InvalidSpans { index: 0 })
    );

    let empty = Rle::from_spans(Vec::new()).unwrap();
    assert!(empty.is_empty());
    assert!(empty.bounding_rect().is_empty());
}

#[test]
fn coverage_lookup() {
    let rle = Rle::from_spans(vec![
        span(0, 0, 2, 255),
        span(4, 0, 2, 10),
        span(1, 2, 1, 20),
    ])
    .unwrap();

    assert_eq!(rle.coverage_at(0, 0), 255);
    assert_eq!(rle.coverage_at(1, 0), 255);
    assert_eq!(rle.coverage_at(2, 0), 0);
    assert_eq!(rle.coverage_at(5, 0), 10);
    assert_eq!(rle.coverage_at(6, 0), 0);
    assert_eq!(rle.coverage_at(1, 1), 0);
    assert_eq!(rle.coverage_at(1, 2), 20);
    assert_eq!(rle.coverage_at(-1, 2), 0);
}

#[test]
fn sprite_and_translation() {
    let rle = Rle::from_spans(vec![span(2, 5, 2, 255), span(3, 6, 1, 100)]).unwrap();
    assert_eq!(rle.to_sprite(), vec![255, 255, 0, 100]);

    let moved = rle.translated(-10, 1);
    assert_eq!(moved.spans()[0], span(-8, 6, 2, 255));
    assert_eq!(moved.bounding_rect(), int_box2d(-8, 6, -6, 8));
    assert_eq!(moved.to_sprite(), rle.to_sprite());

    assert!(Rle::new().to_sprite().is_empty());
}

#[test]
fn binary_merges_runs() {
    let a = Rle::from_spans(vec![span(0, 0, 4, 255)]).unwrap();
    let b = Rle::from_spans(vec![span(4, 0, 4, 255)]).unwrap();

    // Touching runs of the same coverage are merged.
    let union = Rle::binary(&a, &b, BinaryOp::Or);
    assert_eq!(union.spans(), &[span(0, 0, 8, 255)]);

    let c = Rle::from_spans(vec![span(2, 0, 4, 255)]).unwrap();
    let xor = Rle::binary(&a, &c, BinaryOp::Xor);
    assert_eq!(xor.spans(), &[span(0, 0, 2, 255), span(4, 0, 2, 255)]);

    let and = Rle::binary(&a, &c, BinaryOp::And);
    assert_eq!(and.spans(), &[span(2, 0, 2, 255)]);
    assert_eq!(and.bounding_rect(), int_box2d(2, 0, 4, 1));

    let and_not = Rle::binary(&a, &c, BinaryOp::AndNot);
    assert_eq!(and_not.spans(), &[span(0, 0, 2, 255)]);
}

#[test]
fn binary_partial_coverage() {
    let a = Rle::from_spans(vec![span(0, 0, 2, 128)]).unwrap();
    let b = Rle::from_spans(vec![span(1, 0, 2, 128)]).unwrap();

    let or = Rle::binary(&a, &b, BinaryOp::Or);
    assert_eq!(or.spans(), &[span(0, 0, 1, 128), span(1, 0, 1, 192), span(2, 0, 1, 128)]);

    let and = Rle::binary(&a, &b, BinaryOp::And);
    assert_eq!(and.spans(), &[span(1, 0, 1, 64)]);
}
