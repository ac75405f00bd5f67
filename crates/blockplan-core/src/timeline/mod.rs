//! Day timeline primitives.
//!
//! This module provides:
//! - Minute-of-day intervals and working-day bounds
//! - Busy events read from an existing calendar
//! - Free-window detection between busy events

mod gap;
mod interval;

pub use gap::{free_windows, merge_intervals, total_minutes, TimeGapDetector};
pub use interval::{format_clock, parse_clock, BusyEvent, Interval, WorkingDay, MINUTES_PER_DAY};
