//! Distance-based suppression of corner candidates.

use crate::candidate::topk::{sort_peaks_desc, Peak};

/// Greedy suppression using Euclidean distance.
///
/// Peaks are sorted by descending score and kept if they are at least
/// `min_distance` away from every previously kept peak. At most `limit` peaks
/// are returned.
pub fn suppress_within(peaks: &mut [Peak], min_distance: f32, limit: usize) -> Vec<Peak> {
    sort_peaks_desc(peaks);
    let min_sq = min_distance * min_distance;
    let mut kept: Vec<Peak> = Vec::new();

    'outer: for peak in peaks.iter().copied() {
        if kept.len() >= limit {
            break;
        }
        for kept_peak in kept.iter() {
            let dx = peak.x as f32 - kept_peak.x as f32;
            let dy = peak.y as f32 - kept_peak.y as f32;
            if dx * dx + dy * dy < min_sq {
                continue 'outer;
            }
        }
        kept.push(peak);
    }

    kept
}

#[cfg(test)]
mod tests {
    use super::suppress_within;
    use crate::candidate::topk::Peak;

    #[test]
    fn drops_weaker_neighbors() {
        let mut peaks = vec![
            Peak { x: 10, y: 10, score: 2.0 },
            Peak { x: 12, y: 10, score: 1.5 },
            Peak { x: 30, y: 10, score: 1.0 },
        ];
        let kept = suppress_within(&mut peaks, 5.0, 10);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[1].x, 30);
    }
}
