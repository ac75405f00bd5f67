//! Free-window detection between existing calendar commitments.
//!
//! Computes the complement of the busy intervals inside a working day.

use super::interval::{Interval, WorkingDay};

/// Detector for finding open windows in a day
pub struct TimeGapDetector {
    /// Minimum window duration to report (in minutes)
    min_gap_minutes: u32,
}

impl TimeGapDetector {
    /// Create a new detector that reports every non-empty window
    pub fn new() -> Self {
        Self { min_gap_minutes: 1 }
    }

    /// Set the minimum window duration
    pub fn with_min_gap(mut self, minutes: u32) -> Self {
        self.min_gap_minutes = minutes.max(1);
        self
    }

    /// Find open windows in a working day
    ///
    /// # Arguments
    /// * `day` - Working-day boundary to search within
    /// * `busy` - Existing commitments, in any order, possibly overlapping
    ///
    /// # Returns
    /// Windows sorted by start time, pairwise disjoint and never adjacent
    pub fn find_windows(&self, day: &WorkingDay, busy: &[Interval]) -> Vec<Interval> {
        let merged = merge_intervals(busy, &day.bounds());
        let mut windows = Vec::with_capacity(merged.len() + 1);
        let mut last_end = day.start();

        for interval in &merged {
            if interval.start() > last_end {
                self.push_window(&mut windows, last_end, interval.start());
            }
            last_end = last_end.max(interval.end());
        }

        // Window after the last commitment
        if last_end < day.end() {
            self.push_window(&mut windows, last_end, day.end());
        }

        windows
    }

    fn push_window(&self, windows: &mut Vec<Interval>, start: u32, end: u32) {
        if end - start < self.min_gap_minutes {
            return;
        }
        if let Ok(window) = Interval::new(start, end) {
            windows.push(window);
        }
    }
}

impl Default for TimeGapDetector {
    fn default() -> Self {
        Self::new()
    }
}

/// Sort, clip to `bounds` and merge overlapping or adjacent intervals.
///
/// The input slice is left untouched.
pub fn merge_intervals(intervals: &[Interval], bounds: &Interval) -> Vec<Interval> {
    let mut sorted: Vec<Interval> = intervals.iter().filter_map(|i| i.clip(bounds)).collect();
    sorted.sort();

    let mut merged: Vec<Interval> = Vec::with_capacity(sorted.len());
    for interval in sorted {
        match merged.last_mut() {
            Some(last) if last.touches(&interval) => {
                if interval.end() > last.end() {
                    // Both come from clipped valid intervals, so start < end holds.
                    if let Ok(joined) = Interval::new(last.start(), interval.end()) {
                        *last = joined;
                    }
                }
            }
            _ => merged.push(interval),
        }
    }
    merged
}

/// Total minutes covered by a set of disjoint windows.
pub fn total_minutes(windows: &[Interval]) -> u32 {
    windows.iter().map(Interval::duration_minutes).sum()
}

/// Convenience function to find windows with default settings
pub fn free_windows(day: &WorkingDay, busy: &[Interval]) -> Vec<Interval> {
    TimeGapDetector::new().find_windows(day, busy)
}
