//! Ranking of corner response peaks.

use std::cmp::Ordering;

/// Local maximum of a response map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    /// X coordinate (column) of the peak.
    pub x: usize,
    /// Y coordinate (row) of the peak.
    pub y: usize,
    /// Response value at the peak.
    pub score: f32,
}

fn peak_cmp_desc(a: &Peak, b: &Peak) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.y.cmp(&a.y))
        .then_with(|| b.x.cmp(&a.x))
}

/// Sorts peaks by descending score; ties go to the later pixel in raster order.
pub(crate) fn sort_peaks_desc(peaks: &mut [Peak]) {
    peaks.sort_by(peak_cmp_desc);
}

/// Bounded collector that keeps the `k` best peaks in ranking order.
pub struct TopK {
    k: usize,
    ranked: Vec<Peak>,
}

impl TopK {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ranked: Vec::with_capacity(k.min(64)),
        }
    }

    /// Inserts `peak` at its rank; the weakest peak falls off once `k` are held.
    pub fn push(&mut self, peak: Peak) {
        let pos = self
            .ranked
            .partition_point(|kept| peak_cmp_desc(kept, &peak) == Ordering::Less);
        if pos >= self.k {
            return;
        }
        self.ranked.insert(pos, peak);
        self.ranked.truncate(self.k);
    }

    /// Returns the kept peaks, strongest first.
    pub fn into_sorted_desc(self) -> Vec<Peak> {
        self.ranked
    }
}
