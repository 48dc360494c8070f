//! Coverage masks encoded as deduplicated 4x4 tiles.
//!
//! A `PreparedPath` is the form in which masks are handed to the renderer:
//! a list of screen aligned tiles ("patches"), each pointing into a table of
//! unique 16 bytes coverage blocks. The fully covered block is always the
//! first entry of the table, so the inside of large shapes shares a single
//! block.
//!
//! Only pixels with non-negative coordinates can be encoded. Coverage at
//! negative coordinates is off screen and is dropped.

use crate::math::{int_box2d, IntBox2D};
use crate::rle::{BinaryOp, Rle, SpanBuilder};

use rustc_hash::FxHashMap;

use core::cmp::Ordering;
use std::sync::OnceLock;
use std::collections::BTreeMap;

/// Width and height of a patch, in pixels.
pub const TILE_SIZE: i32 = 4;

const LANES: usize = (TILE_SIZE * TILE_SIZE) as usize;

/// The coverage of the 16 pixels of a patch, row by row.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct PatchData(pub [u8; LANES]);

impl PatchData {
    pub const FILLED: Self = PatchData([255; LANES]);
    pub const EMPTY: Self = PatchData([0; LANES]);

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0 == [0; LANES]
    }

    #[inline]
    pub fn is_filled(&self) -> bool {
        *self == Self::FILLED
    }

    /// Coverage of the pixel at `(x, y)` within the patch.
    #[inline]
    pub fn coverage(&self, x: usize, y: usize) -> u8 {
        self.0[y * TILE_SIZE as usize + x]
    }

    /// Applies a boolean operation lane by lane, with the same arithmetic as
    /// `Rle::binary`.
    pub fn combine(&self, op: BinaryOp, other: &PatchData) -> PatchData {
        let mut result = [0; LANES];
        for (lane, (a, b)) in result.iter_mut().zip(self.0.iter().zip(other.0.iter())) {
            *lane = op.apply(*a, *b);
        }

        PatchData(result)
    }

    /// Lane-wise maximum.
    pub fn max(&self, other: &PatchData) -> PatchData {
        let mut result = self.0;
        for (lane, b) in result.iter_mut().zip(other.0.iter()) {
            *lane = (*lane).max(*b);
        }

        PatchData(result)
    }
}

/// A 4x4 tile of a `PreparedPath`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Patch {
    /// Horizontal position, in tiles.
    pub x: u16,
    /// Vertical position, in tiles.
    pub y: u16,
    /// Index of the patch's coverage in `PreparedPath::patch_data`.
    pub offset: u32,
}

impl Patch {
    #[inline]
    fn key(&self) -> (u16, u16) {
        (self.y, self.x)
    }
}

/// A coverage mask as sorted, non-empty patches and a table of unique
/// coverage blocks.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct PreparedPath {
    patches: Vec<Patch>,
    data: Vec<PatchData>,
    #[cfg_attr(feature = "serialization", serde(skip))]
    bounds: OnceLock<IntBox2D>,
}

impl Default for PreparedPath {
    fn default() -> Self {
        PatchTable::new().build(Vec::new())
    }
}

impl PreparedPath {
    /// Splits a mask into patches.
    pub fn from_rle(rle: &Rle) -> Self {
        let mut table = PatchTable::new();
        let mut patches = Vec::new();
        let mut row: BTreeMap<u16, PatchData> = BTreeMap::new();
        let mut tile_y = None;

        for span in rle.spans() {
            let y = span.y as i32;
            if y < 0 {
                continue;
            }

            let ty = (y / TILE_SIZE) as u16;
            if tile_y != Some(ty) {
                if let Some(prev) = tile_y {
                    table.flush_row(prev, &mut row, &mut patches);
                }
                tile_y = Some(ty);
            }

            let lane_y = (y % TILE_SIZE) as usize;
            for x in (span.x as i32).max(0)..span.end() {
                let tile = row
                    .entry((x / TILE_SIZE) as u16)
                    .or_insert(PatchData::EMPTY);
                tile.0[lane_y * TILE_SIZE as usize + (x % TILE_SIZE) as usize] = span.coverage;
            }
        }

        if let Some(ty) = tile_y {
            table.flush_row(ty, &mut row, &mut patches);
        }

        table.build(patches)
    }

    /// Encodes a fully covered rectangle, in pixels.
    ///
    /// This gives the same result as rasterizing the rectangle and encoding
    /// the mask, without going through either.
    pub fn from_rect(rect: &IntBox2D) -> Self {
        let limit = i16::MAX as i32;
        let rect = rect.intersection_unchecked(&int_box2d(0, 0, limit, limit));
        let mut table = PatchTable::new();
        if rect.is_empty() {
            return table.build(Vec::new());
        }

        let mut patches = Vec::new();
        for ty in rect.min.y / TILE_SIZE..=(rect.max.y - 1) / TILE_SIZE {
            for tx in rect.min.x / TILE_SIZE..=(rect.max.x - 1) / TILE_SIZE {
                let mut data = PatchData::EMPTY;
                for (lane, coverage) in data.0.iter_mut().enumerate() {
                    let x = tx * TILE_SIZE + lane as i32 % TILE_SIZE;
                    let y = ty * TILE_SIZE + lane as i32 / TILE_SIZE;
                    if x >= rect.min.x && x < rect.max.x && y >= rect.min.y && y < rect.max.y {
                        *coverage = 255;
                    }
                }

                patches.push(Patch {
                    x: tx as u16,
                    y: ty as u16,
                    offset: table.insert(data),
                });
            }
        }

        table.build(patches)
    }

    /// Combines two prepared paths patch by patch.
    ///
    /// A patch present in only one of the operands is kept or dropped with
    /// the same rules as the rows of `Rle::binary`, and patches left without
    /// coverage are removed.
    pub fn boolean_op(op: BinaryOp, a: &PreparedPath, b: &PreparedPath) -> PreparedPath {
        Self::zip_patches(a, b, |pa, pb| match (pa, pb) {
            (Some(pa), Some(pb)) => Some(pa.combine(op, pb)),
            (Some(pa), None) if op.keeps_first_only() => Some(pa.combine(op, &PatchData::EMPTY)),
            (None, Some(pb)) if op.keeps_second_only() => Some(PatchData::EMPTY.combine(op, pb)),
            _ => None,
        })
    }

    pub fn union(a: &PreparedPath, b: &PreparedPath) -> PreparedPath {
        Self::boolean_op(BinaryOp::Or, a, b)
    }

    pub fn intersection(a: &PreparedPath, b: &PreparedPath) -> PreparedPath {
        Self::boolean_op(BinaryOp::And, a, b)
    }

    pub fn difference(a: &PreparedPath, b: &PreparedPath) -> PreparedPath {
        Self::boolean_op(BinaryOp::AndNot, a, b)
    }

    pub fn symmetric_difference(a: &PreparedPath, b: &PreparedPath) -> PreparedPath {
        Self::boolean_op(BinaryOp::Xor, a, b)
    }

    /// Overlays two prepared paths, keeping the highest coverage of each pixel.
    pub fn merge(a: &PreparedPath, b: &PreparedPath) -> PreparedPath {
        Self::zip_patches(a, b, |pa, pb| match (pa, pb) {
            (Some(pa), Some(pb)) => Some(pa.max(pb)),
            (Some(p), None) | (None, Some(p)) => Some(*p),
            (None, None) => None,
        })
    }

    fn zip_patches<F>(a: &PreparedPath, b: &PreparedPath, mut combine: F) -> PreparedPath
    where
        F: FnMut(Option<&PatchData>, Option<&PatchData>) -> Option<PatchData>,
    {
        let mut table = PatchTable::new();
        let mut patches = Vec::with_capacity(a.patches.len().max(b.patches.len()));
        let mut i = 0;
        let mut j = 0;

        loop {
            let (pa, pb) = match (a.patches.get(i), b.patches.get(j)) {
                (None, None) => break,
                (Some(pa), None) => (Some(pa), None),
                (None, Some(pb)) => (None, Some(pb)),
                (Some(pa), Some(pb)) => match pa.key().cmp(&pb.key()) {
                    Ordering::Less => (Some(pa), None),
                    Ordering::Greater => (None, Some(pb)),
                    Ordering::Equal => (Some(pa), Some(pb)),
                },
            };

            let (x, y) = match (pa, pb) {
                (Some(p), _) | (None, Some(p)) => (p.x, p.y),
                (None, None) => break,
            };
            if pa.is_some() {
                i += 1;
            }
            if pb.is_some() {
                j += 1;
            }

            let data = combine(pa.map(|p| a.data_of(p)), pb.map(|p| b.data_of(p)));
            match data {
                Some(data) if !data.is_empty() => patches.push(Patch {
                    x,
                    y,
                    offset: table.insert(data),
                }),
                _ => {}
            }
        }

        table.build(patches)
    }

    #[inline]
    pub fn patches(&self) -> &[Patch] {
        &self.patches
    }

    /// The table of unique coverage blocks the patches point into.
    ///
    /// The first entry is always `PatchData::FILLED`.
    #[inline]
    pub fn patch_data(&self) -> &[PatchData] {
        &self.data
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// The pixel rectangle covered by the patches, `max` excluded.
    ///
    /// Computed on the first call.
    pub fn patch_bounds(&self) -> IntBox2D {
        *self.bounds.get_or_init(|| {
            let mut patches = self.patches.iter();
            let first = match patches.next() {
                Some(first) => first,
                None => return IntBox2D::zero(),
            };

            let mut min = (first.x, first.y);
            let mut max = min;
            for patch in patches {
                min = (min.0.min(patch.x), min.1.min(patch.y));
                max = (max.0.max(patch.x), max.1.max(patch.y));
            }

            int_box2d(
                min.0 as i32 * TILE_SIZE,
                min.1 as i32 * TILE_SIZE,
                (max.0 as i32 + 1) * TILE_SIZE,
                (max.1 as i32 + 1) * TILE_SIZE,
            )
        })
    }

    /// Expands the patches back into a run-length encoded mask.
    pub fn to_rle(&self) -> Rle {
        let mut builder = SpanBuilder::with_capacity(self.patches.len() * 2);
        let mut rest = &self.patches[..];

        while let Some(first) = rest.first() {
            let len = rest.partition_point(|patch| patch.y == first.y);
            let (row, next) = rest.split_at(len);
            rest = next;

            for lane_y in 0..TILE_SIZE as usize {
                let y = first.y as i32 * TILE_SIZE + lane_y as i32;
                for patch in row {
                    let data = self.data_of(patch);
                    for lane_x in 0..TILE_SIZE as usize {
                        let x = patch.x as i32 * TILE_SIZE + lane_x as i32;
                        builder.push(y, x, x + 1, data.coverage(lane_x, lane_y));
                    }
                }
            }
        }

        builder.build()
    }

    #[inline]
    fn data_of(&self, patch: &Patch) -> &PatchData {
        &self.data[patch.offset as usize]
    }
}

/// Deduplicates coverage blocks while patches are produced.
struct PatchTable {
    data: Vec<PatchData>,
    offsets: FxHashMap<PatchData, u32>,
}

impl PatchTable {
    fn new() -> Self {
        let mut offsets = FxHashMap::default();
        offsets.insert(PatchData::FILLED, 0);

        PatchTable {
            data: vec![PatchData::FILLED],
            offsets,
        }
    }

    fn insert(&mut self, data: PatchData) -> u32 {
        if let Some(offset) = self.offsets.get(&data) {
            return *offset;
        }

        let offset = self.data.len() as u32;
        self.data.push(data);
        self.offsets.insert(data, offset);

        offset
    }

    fn flush_row(&mut self, y: u16, row: &mut BTreeMap<u16, PatchData>, patches: &mut Vec<Patch>) {
        for (x, data) in std::mem::take(row) {
            if data.is_empty() {
                continue;
            }
            patches.push(Patch {
                x,
                y,
                offset: self.insert(data),
            });
        }
    }

    fn build(self, patches: Vec<Patch>) -> PreparedPath {
        PreparedPath {
            patches,
            data: self.data,
            bounds: OnceLock::new(),
        }
    }
}

#[cfg(test)]
use crate::rle::Span;

#[cfg(test)]
fn rle(spans: &[(i16, i16, i16, u8)]) -> Rle {
    let spans = spans
        .iter()
        .map(|&(x, y, len, coverage)| Span { x, y, len, coverage })
        .collect();

    Rle::from_spans(spans).unwrap()
}

#[test]
fn rect_tiles() {
    let prepared = PreparedPath::from_rect(&int_box2d(0, 0, 8, 4));
    assert_eq!(prepared.patch_data(), &[PatchData::FILLED]);
    assert_eq!(
        prepared.patches(),
        &[Patch { x: 0, y: 0, offset: 0 }, Patch { x: 1, y: 0, offset: 0 }]
    );

    let prepared = PreparedPath::from_rect(&int_box2d(2, 2, 6, 6));
    assert_eq!(prepared.patches().len(), 4);
    // Four different corners.
    assert_eq!(prepared.patch_data().len(), 5);
    let top_left = prepared.patch_data()[prepared.patches()[0].offset as usize];
    assert_eq!(top_left.coverage(1, 1), 0);
    assert_eq!(top_left.coverage(2, 2), 255);
    assert_eq!(top_left.coverage(3, 3), 255);

    assert!(PreparedPath::from_rect(&int_box2d(-8, -8, 0, 0)).is_empty());
    assert!(PreparedPath::from_rect(&int_box2d(4, 4, 4, 8)).is_empty());
}

#[test]
fn identical_blocks_are_shared() {
    let mask = rle(&[(0, 0, 1, 100), (8, 0, 1, 100), (8, 5, 1, 50)]);
    let prepared = PreparedPath::from_rle(&mask);

    assert_eq!(prepared.patches().len(), 3);
    assert_eq!(prepared.patches()[0].offset, prepared.patches()[1].offset);
    assert_ne!(prepared.patches()[1].offset, prepared.patches()[2].offset);
    assert_eq!(prepared.patch_data().len(), 3);
    assert_eq!(prepared.to_rle(), mask);
}

#[test]
fn negative_coordinates_are_dropped() {
    let mask = rle(&[(-3, -1, 5, 255), (-2, 0, 4, 255)]);
    let prepared = PreparedPath::from_rle(&mask);

    assert_eq!(prepared.to_rle(), rle(&[(0, 0, 2, 255)]));
    assert_eq!(prepared.patch_bounds(), int_box2d(0, 0, 4, 4));
}

#[test]
fn bounds_are_in_pixels() {
    let mask = rle(&[(5, 3, 1, 255), (13, 9, 2, 255)]);
    let prepared = PreparedPath::from_rle(&mask);

    assert_eq!(prepared.patch_bounds(), int_box2d(4, 0, 16, 12));
    assert_eq!(prepared.patch_bounds(), int_box2d(4, 0, 16, 12));
    assert_eq!(PreparedPath::default().patch_bounds(), IntBox2D::zero());
}

#[test]
fn shared_between_threads() {
    use std::sync::Arc;

    let clip = Arc::new(PreparedPath::from_rect(&int_box2d(2, 2, 10, 6)));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let clip = Arc::clone(&clip);
            std::thread::spawn(move || clip.patch_bounds())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), int_box2d(0, 0, 12, 8));
    }
}

#[test]
fn opaque_boolean_ops() {
    let a = PreparedPath::from_rect(&int_box2d(0, 0, 8, 4));
    let b = PreparedPath::from_rect(&int_box2d(4, 0, 12, 4));

    let union = PreparedPath::union(&a, &b);
    assert_eq!(union.patches().len(), 3);
    assert!(union.patches().iter().all(|p| p.offset == 0));

    let intersection = PreparedPath::intersection(&a, &b);
    assert_eq!(intersection.patches(), &[Patch { x: 1, y: 0, offset: 0 }]);

    let difference = PreparedPath::difference(&a, &b);
    assert_eq!(difference.patches(), &[Patch { x: 0, y: 0, offset: 0 }]);

    let xor = PreparedPath::symmetric_difference(&a, &b);
    assert_eq!(
        xor.patches(),
        &[Patch { x: 0, y: 0, offset: 0 }, Patch { x: 2, y: 0, offset: 0 }]
    );

    assert!(PreparedPath::difference(&a, &a).is_empty());
    assert!(PreparedPath::intersection(&a, &PreparedPath::default()).is_empty());
}

#[test]
fn merge_keeps_the_highest_coverage() {
    let a = PreparedPath::from_rle(&rle(&[(0, 0, 2, 100)]));
    let b = PreparedPath::from_rle(&rle(&[(1, 0, 2, 200), (0, 6, 1, 10)]));

    let merged = PreparedPath::merge(&a, &b);
    assert_eq!(
        merged.to_rle(),
        rle(&[(0, 0, 1, 100), (1, 0, 2, 200), (0, 6, 1, 10)])
    );
}

#[test]
fn patch_data_lanes() {
    let mut a = PatchData::EMPTY;
    a.0[0] = 255;
    a.0[1] = 128;
    let b = PatchData::FILLED;

    assert!(a.combine(BinaryOp::And, &b) == a);
    assert!(a.combine(BinaryOp::AndNot, &b).is_empty());
    assert!(a.combine(BinaryOp::Or, &b).is_filled());
    assert_eq!(a.combine(BinaryOp::Xor, &b).0[0], 0);
    assert_eq!(a.max(&PatchData::EMPTY), a);
}
