//! Time spent rasterizing, for profiling.
//!
//! Counters are owned by the caller and shared with one or several
//! rasterizers through an `Arc`:
//!
//! ```
//! use std::sync::Arc;
//! use pathmask_raster::{FillOptions, Rasterizer, RasterCounters};
//! use pathmask_raster::path::Path;
//!
//! let counters = Arc::new(RasterCounters::new());
//! let mut rasterizer = Rasterizer::with_counters(counters.clone());
//! rasterizer.fill(&Path::new(), &FillOptions::default(), None).unwrap();
//! println!("{:?}", counters.rasterize_time());
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Accumulated nanoseconds spent in the rasterizer.
#[derive(Debug, Default)]
pub struct RasterCounters {
    scanline_ns: AtomicU64,
    rasterize_ns: AtomicU64,
}

impl RasterCounters {
    pub fn new() -> Self {
        RasterCounters::default()
    }

    /// Time spent converting edges into spans.
    pub fn scanline_time(&self) -> Duration {
        Duration::from_nanos(self.scanline_ns.load(Ordering::Relaxed))
    }

    /// Time spent in whole rasterization calls, flattening and stroking included.
    pub fn rasterize_time(&self) -> Duration {
        Duration::from_nanos(self.rasterize_ns.load(Ordering::Relaxed))
    }

    pub fn reset(&self) {
        self.scanline_ns.store(0, Ordering::Relaxed);
        self.rasterize_ns.store(0, Ordering::Relaxed);
    }

    pub(crate) fn add_scanline_time(&self, time: Duration) {
        self.scanline_ns.fetch_add(nanos(time), Ordering::Relaxed);
    }

    pub(crate) fn add_rasterize_time(&self, time: Duration) {
        self.rasterize_ns.fetch_add(nanos(time), Ordering::Relaxed);
    }
}

fn nanos(time: Duration) -> u64 {
    u64::try_from(time.as_nanos()).unwrap_or(u64::MAX)
}

#[test]
fn accumulate_and_reset() {
    let counters = RasterCounters::new();
    counters.add_scanline_time(Duration::from_nanos(10));
    counters.add_scanline_time(Duration::from_nanos(5));
    counters.add_rasterize_time(Duration::from_micros(1));

    assert_eq!(counters.scanline_time(), Duration::from_nanos(15));
    assert_eq!(counters.rasterize_time(), Duration::from_nanos(1000));

    counters.reset();
    assert_eq!(counters.scanline_time(), Duration::ZERO);
}
