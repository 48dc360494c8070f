//! Dashing: splitting paths into the "on" intervals of a dash pattern.
//!
//! The path is walked by accumulated arc length. The walker alternates
//! between "on" intervals, emitted as independent open sub-paths, and "off"
//! gaps, which are skipped. The phase of the pattern carries over from one
//! sub-path to the next.
//!
//! On a closed sub-path, the last and first dashes meet at the first vertex
//! when both are on, and are emitted as a single dash. A closed sub-path that
//! is on along its whole length stays closed.

use crate::flatten::FlattenedPath;
use crate::math::*;
use crate::{Path, DEFAULT_TOLERANCE};

/// A validated dash pattern with its starting phase.
#[derive(Clone, Debug, PartialEq)]
pub struct DashPattern {
    intervals: Vec<f32>,
    start_index: usize,
    start_remaining: f32,
}

impl DashPattern {
    /// Validates a pattern of alternating on/off lengths.
    ///
    /// An odd number of intervals is repeated once to make it even. The
    /// offset is wrapped modulo the pattern's total length, negative offsets
    /// included. Returns `None` for empty patterns and for patterns with
    /// negative or non-finite intervals or a zero total length.
    pub fn new(intervals: &[f32], offset: f32) -> Option<Self> {
        if intervals.is_empty() || intervals.iter().any(|i| !i.is_finite() || *i < 0.0) {
            return None;
        }

        let mut intervals = intervals.to_vec();
        if intervals.len() % 2 == 1 {
            intervals.extend_from_within(..);
        }

        let total: f32 = intervals.iter().sum();
        if total <= 0.0 || !total.is_finite() {
            return None;
        }

        let mut phase = if offset.is_finite() {
            offset.rem_euclid(total)
        } else {
            0.0
        };

        let mut start_index = 0;
        while phase >= intervals[start_index] && phase > 0.0 {
            phase -= intervals[start_index];
            start_index = (start_index + 1) % intervals.len();
        }

        Some(DashPattern {
            start_remaining: intervals[start_index] - phase,
            intervals,
            start_index,
        })
    }

    #[inline]
    pub fn intervals(&self) -> &[f32] {
        &self.intervals
    }

    /// Dashes an already flattened path.
    pub fn apply(&self, flattened: &FlattenedPath) -> Path {
        let mut dasher = Dasher {
            pattern: &self.intervals,
            index: self.start_index,
            remaining: self.start_remaining,
            dash: Vec::new(),
            head: None,
            hold_head: false,
            output: Path::new(),
        };

        for (points, closed) in flattened.iter() {
            dasher.contour(points, closed);
        }

        dasher.output
    }
}

struct Dasher<'l> {
    pattern: &'l [f32],
    index: usize,
    // Length left in the current interval.
    remaining: f32,
    // Points of the dash being built.
    dash: Vec<Point>,
    // First dash of a closed contour, emitted once the contour is done.
    head: Option<Vec<Point>>,
    hold_head: bool,
    output: Path,
}

impl<'l> Dasher<'l> {
    #[inline]
    fn is_on(&self) -> bool {
        self.index % 2 == 0
    }

    fn contour(&mut self, points: &[Point], closed: bool) {
        let first = match points.first() {
            Some(p) => *p,
            None => return,
        };

        // A dash running through the first vertex of a closed contour is
        // one dash, joined at that vertex.
        self.hold_head = closed && self.is_on();
        if self.is_on() {
            self.start_dash(first);
        }

        for segment in points.windows(2) {
            self.edge(segment[0], segment[1]);
        }

        if !closed {
            self.end_dash();
            return;
        }

        if let Some(last) = points.last() {
            self.edge(*last, first);
        }

        match self.head.take() {
            Some(head) => {
                if self.is_on() {
                    self.dash.extend(head.iter().skip(1));
                    self.end_dash();
                } else if head.len() > 1 {
                    self.emit(&head);
                }
            }
            None if self.hold_head && self.is_on() => {
                // Never switched off: the whole contour is on.
                let mut ring = std::mem::take(&mut self.dash);
                ring.pop();
                if ring.len() > 1 {
                    self.emit(&ring);
                    self.output.close();
                }
            }
            None => {}
        }

        self.hold_head = false;
        self.end_dash();
    }

    fn edge(&mut self, from: Point, to: Point) {
        let d = (to - from).length();
        if d <= 0.0 {
            return;
        }

        let mut pos = 0.0;
        while pos < d {
            let left = d - pos;
            if self.remaining > left {
                self.remaining -= left;
                if self.is_on() {
                    self.dash.push(to);
                }
                return;
            }

            pos += self.remaining;
            let p = from.lerp(to, (pos / d).min(1.0));
            if self.is_on() {
                self.dash.push(p);
                self.end_dash();
            }

            self.index = (self.index + 1) % self.pattern.len();
            self.remaining = self.pattern[self.index];

            if self.is_on() {
                self.start_dash(p);
            }
        }
    }

    fn start_dash(&mut self, at: Point) {
        self.dash.clear();
        self.dash.push(at);
    }

    fn end_dash(&mut self) {
        if self.hold_head {
            self.hold_head = false;
            self.head = Some(std::mem::take(&mut self.dash));
            return;
        }

        if self.dash.len() > 1 {
            let dash = std::mem::take(&mut self.dash);
            self.emit(&dash);
        }
        self.dash.clear();
    }

    fn emit(&mut self, points: &[Point]) {
        if let Some((first, rest)) = points.split_first() {
            self.output.move_to(*first);
            for p in rest {
                self.output.line_to(*p);
            }
        }
    }
}

impl Path {
    /// Splits the path into the "on" intervals of a dash pattern.
    ///
    /// See `DashPattern::new` for the rules applied to `pattern` and
    /// `offset`. Invalid patterns return the path unchanged.
    pub fn dashed(&self, pattern: &[f32], offset: f32) -> Path {
        self.dashed_with_tolerance(pattern, offset, DEFAULT_TOLERANCE)
    }

    /// Same as `dashed`, with the tolerance used to flatten curves.
    pub fn dashed_with_tolerance(&self, pattern: &[f32], offset: f32, tolerance: f32) -> Path {
        match DashPattern::new(pattern, offset) {
            Some(pattern) => pattern.apply(&self.flattened(tolerance)),
            None => {
                log::debug!("Degenerate dash pattern {:?}, path left undashed.", pattern);
                self.clone()
            }
        }
    }
}

#[cfg(test)]
fn dashes(path: &Path) -> Vec<Vec<Point>> {
    let flattened = path.flattened(0.1);
    flattened
        .iter()
        .filter(|(points, _)| points.len() > 1)
        .map(|(points, _)| points.to_vec())
        .collect()
}

#[cfg(test)]
fn assert_dash(dash: &[Point], expected: &[Point]) {
    assert_eq!(dash.len(), expected.len(), "{:?} != {:?}", dash, expected);
    for (a, b) in dash.iter().zip(expected) {
        assert!((*a - *b).length() < 1e-4, "{:?} != {:?}", dash, expected);
    }
}

#[cfg(test)]
fn horizontal_line(length: f32) -> Path {
    let mut path = Path::new();
    path.move_to(point(0.0, 0.0));
    path.line_to(point(length, 0.0));
    path
}

#[test]
fn simple_dashes() {
    let dashed = horizontal_line(10.0).dashed(&[2.0, 1.0], 0.0);
    let dashes = dashes(&dashed);

    assert_eq!(dashes.len(), 4);
    assert_dash(&dashes[0], &[point(0.0, 0.0), point(2.0, 0.0)]);
    assert_dash(&dashes[1], &[point(3.0, 0.0), point(5.0, 0.0)]);
    assert_dash(&dashes[2], &[point(6.0, 0.0), point(8.0, 0.0)]);
    assert_dash(&dashes[3], &[point(9.0, 0.0), point(10.0, 0.0)]);
    assert!(dashed.iter().all(|e| !matches!(e, crate::PathEvent::End { close: true, .. })));
}

#[test]
fn dash_offset() {
    let dashed = horizontal_line(10.0).dashed(&[2.0, 2.0], 1.0);
    let dashes = dashes(&dashed);
    assert_dash(&dashes[0], &[point(0.0, 0.0), point(1.0, 0.0)]);
    assert_dash(&dashes[1], &[point(3.0, 0.0), point(5.0, 0.0)]);

    // Negative offsets wrap around the pattern.
    let dashed = horizontal_line(10.0).dashed(&[2.0, 2.0], -1.0);
    let dashes = self::dashes(&dashed);
    assert_dash(&dashes[0], &[point(1.0, 0.0), point(3.0, 0.0)]);

    // Offsets larger than the pattern wrap too.
    let a = horizontal_line(10.0).dashed(&[2.0, 2.0], 5.0);
    let b = horizontal_line(10.0).dashed(&[2.0, 2.0], 1.0);
    assert_eq!(a, b);
}

#[test]
fn odd_pattern_is_repeated() {
    let pattern = DashPattern::new(&[1.0, 2.0, 3.0], 0.0).unwrap();
    assert_eq!(pattern.intervals(), &[1.0, 2.0, 3.0, 1.0, 2.0, 3.0]);

    let dashed = horizontal_line(12.0).dashed(&[1.0], 0.0);
    let dashes = dashes(&dashed);
    assert_eq!(dashes.len(), 6);
    assert_dash(&dashes[1], &[point(2.0, 0.0), point(3.0, 0.0)]);
}

#[test]
fn degenerate_patterns() {
    let path = horizontal_line(10.0);
    assert_eq!(path.dashed(&[], 0.0), path);
    assert_eq!(path.dashed(&[0.0, 0.0], 0.0), path);
    assert_eq!(path.dashed(&[1.0, -1.0], 0.0), path);
    assert_eq!(path.dashed(&[1.0, f32::NAN], 0.0), path);
}

#[test]
fn dash_phase_continues_across_corners_and_subpaths() {
    let mut path = Path::new();
    path.move_to(point(0.0, 0.0));
    path.line_to(point(3.0, 0.0));
    path.line_to(point(3.0, 3.0));
    path.move_to(point(10.0, 0.0));
    path.line_to(point(13.0, 0.0));

    let dashed = path.dashed(&[4.0, 2.0], 0.0);
    let dashes = dashes(&dashed);

    // The first dash turns the corner.
    assert_dash(&dashes[0], &[point(0.0, 0.0), point(3.0, 0.0), point(3.0, 1.0)]);
    // The gap ends exactly at the end of the first sub-path; the second
    // sub-path starts with a new dash.
    assert_eq!(dashes.len(), 2);
    assert_dash(&dashes[1], &[point(10.0, 0.0), point(13.0, 0.0)]);
}

#[test]
fn closed_subpaths_dash_the_closing_edge() {
    let mut path = Path::new();
    path.add_polygon(&[point(0.0, 0.0), point(4.0, 0.0), point(4.0, 4.0), point(0.0, 4.0)]);

    let total: f32 = dashes(&path.dashed(&[1.0, 1.0], 0.0))
        .iter()
        .map(|dash| dash.windows(2).map(|w| (w[1] - w[0]).length()).sum::<f32>())
        .sum();

    assert!((total - 8.0).abs() < 1e-4);
}

#[test]
fn dashes_meet_at_the_start_of_closed_subpaths() {
    let mut path = Path::new();
    path.add_polygon(&[point(0.0, 0.0), point(4.0, 0.0), point(4.0, 4.0), point(0.0, 4.0)]);

    // On intervals at 0..3, 5..8, 10..13 and 15..16, the last one running
    // into the first.
    let dashed = path.dashed(&[3.0, 2.0], 0.0);
    let dashes = dashes(&dashed);

    assert_eq!(dashes.len(), 3);
    assert_dash(&dashes[0], &[point(4.0, 1.0), point(4.0, 4.0)]);
    assert_dash(&dashes[1], &[point(2.0, 4.0), point(0.0, 4.0), point(0.0, 3.0)]);
    assert_dash(&dashes[2], &[point(0.0, 1.0), point(0.0, 0.0), point(3.0, 0.0)]);
}

#[test]
fn closed_subpath_without_gaps_stays_closed() {
    let mut path = Path::new();
    path.add_polygon(&[point(0.0, 0.0), point(4.0, 0.0), point(4.0, 4.0), point(0.0, 4.0)]);

    let dashed = path.dashed(&[20.0, 1.0], 0.0);
    let flattened = dashed.flattened(0.1);

    assert_eq!(flattened.contours().len(), 1);
    assert!(flattened.contours()[0].closed);
    assert_dash(
        flattened.contour_points(&flattened.contours()[0]),
        &[point(0.0, 0.0), point(4.0, 0.0), point(4.0, 4.0), point(0.0, 4.0)],
    );
}
