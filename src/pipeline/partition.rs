//! Splitting the input into contiguous chunks for the worker pool.

use std::ops::Range;

/// Batches smaller than this run on the sequential path.
pub const SEQUENTIAL_BELOW: usize = 50;
const LARGE_BATCH: usize = 500;
const MEDIUM_BATCH_WORKERS: usize = 4;
const LARGE_BATCH_WORKERS: usize = 8;
const MIN_CHUNK_SIZE: usize = 10;

/// Worker count for a batch of `total` records given `available` cores.
pub fn worker_budget_for(total: usize, available: usize) -> usize {
    let available = available.max(1);
    if total < SEQUENTIAL_BELOW {
        1
    } else if total < LARGE_BATCH {
        MEDIUM_BATCH_WORKERS.min(available)
    } else {
        LARGE_BATCH_WORKERS.min(available)
    }
}

pub fn chunk_size_for(total: usize, worker_budget: usize, configured: Option<usize>) -> usize {
    match configured {
        Some(n) if n > 0 => n,
        _ => (total / (worker_budget.max(1) * 2)).max(MIN_CHUNK_SIZE),
    }
}

/// Contiguous, non-empty ranges covering `0..total` in order. A trailing
/// remainder shorter than half a chunk joins the previous chunk.
pub fn partition(total: usize, worker_budget: usize, configured: Option<usize>) -> Vec<Range<usize>> {
    if total == 0 {
        return Vec::new();
    }
    let size = chunk_size_for(total, worker_budget, configured);
    let mut ranges: Vec<Range<usize>> = (0..total)
        .step_by(size)
        .map(|start| start..(start + size).min(total))
        .collect();

    let n = ranges.len();
    if n >= 2 && ranges[n - 1].len() < size / 2 {
        ranges.pop();
        ranges[n - 2].end = total;
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_covers(ranges: &[Range<usize>], total: usize) {
        let mut next = 0;
        for r in ranges {
            assert_eq!(r.start, next, "gap or overlap at {r:?}");
            assert!(!r.is_empty());
            next = r.end;
        }
        assert_eq!(next, total);
    }

    #[test]
    fn ranges_cover_input_exactly() {
        for total in [1, 9, 10, 11, 49, 50, 99, 100, 101, 499, 500, 1234, 10_007] {
            for budget in [0, 1, 2, 4, 8] {
                for configured in [None, Some(0), Some(1), Some(7), Some(25), Some(5000)] {
                    assert_covers(&partition(total, budget, configured), total);
                }
            }
        }
    }

    #[test]
    fn empty_input_has_no_chunks() {
        assert!(partition(0, 4, None).is_empty());
        assert!(partition(0, 4, Some(10)).is_empty());
    }

    #[test]
    fn auto_chunk_size() {
        assert_eq!(chunk_size_for(100, 4, None), 12);
        assert_eq!(chunk_size_for(30, 4, None), 10);
        assert_eq!(chunk_size_for(1000, 8, None), 62);
        assert_eq!(chunk_size_for(1000, 8, Some(0)), 62);
        assert_eq!(chunk_size_for(1000, 8, Some(40)), 40);
    }

    #[test]
    fn small_remainder_is_merged() {
        // 100 / 12: nine chunks, the last of 4 records folds into the eighth.
        let ranges = partition(100, 4, None);
        assert_eq!(ranges.len(), 8);
        assert_eq!(ranges.last(), Some(&(84..100)));

        assert_eq!(partition(60, 4, Some(25)), vec![0..25, 25..60]);
        // 15 is not less than half of 25, so it stays on its own.
        assert_eq!(partition(65, 4, Some(25)), vec![0..25, 25..50, 50..65]);
    }

    #[test]
    fn single_short_chunk_is_kept() {
        assert_eq!(partition(5, 1, None), vec![0..5]);
        assert_eq!(partition(3, 1, Some(10)), vec![0..3]);
    }

    #[test]
    fn worker_budget_tiers() {
        assert_eq!(worker_budget_for(0, 16), 1);
        assert_eq!(worker_budget_for(49, 16), 1);
        assert_eq!(worker_budget_for(50, 16), 4);
        assert_eq!(worker_budget_for(50, 2), 2);
        assert_eq!(worker_budget_for(499, 16), 4);
        assert_eq!(worker_budget_for(500, 16), 8);
        assert_eq!(worker_budget_for(500, 3), 3);
        assert_eq!(worker_budget_for(1000, 0), 1);
    }
}
