//! Minute-of-day intervals, busy events and working-day bounds.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Minutes in one day; the exclusive upper bound of every interval.
pub const MINUTES_PER_DAY: u32 = 1440;

/// A half-open span `[start, end)` on a single day, in minutes from midnight.
///
/// Always satisfies `0 <= start < end <= 1440`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct Interval {
    start: u32,
    end: u32,
}

#[derive(Deserialize)]
struct RawInterval {
    start: u32,
    end: u32,
}

impl TryFrom<RawInterval> for Interval {
    type Error = ValidationError;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        Interval::new(raw.start, raw.end)
    }
}

impl Interval {
    /// Create an interval, rejecting empty, reversed or out-of-day spans.
    pub fn new(start: u32, end: u32) -> Result<Self, ValidationError> {
        if start >= end || end > MINUTES_PER_DAY {
            return Err(ValidationError::InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Get duration in minutes
    pub fn duration_minutes(&self) -> u32 {
        self.end - self.start
    }

    /// True when `other` lies entirely inside this interval.
    pub fn contains(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True when the two intervals share at least one minute.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True when the intervals overlap or meet end-to-start.
    pub fn touches(&self, other: &Interval) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Intersection with `other`, if non-empty.
    pub fn clip(&self, other: &Interval) -> Option<Interval> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(Interval { start, end })
    }

    /// The parts of this interval not covered by `cut`, in order.
    pub fn subtract(&self, cut: &Interval) -> Vec<Interval> {
        if !self.overlaps(cut) {
            return vec![*self];
        }
        let mut rest = Vec::with_capacity(2);
        if self.start < cut.start {
            rest.push(Interval { start: self.start, end: cut.start });
        }
        if cut.end < self.end {
            rest.push(Interval { start: cut.end, end: self.end });
        }
        rest
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", format_clock(self.start), format_clock(self.end))
    }
}

impl FromStr for Interval {
    type Err = ValidationError;

    /// Parse `HH:MM-HH:MM` (24-hour clock, `24:00` allowed as the end).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidValue {
            field: "interval".to_string(),
            message: format!("expected HH:MM-HH:MM, got '{s}'"),
        };
        let (start, end) = s.split_once('-').ok_or_else(invalid)?;
        let start = parse_clock(start.trim()).ok_or_else(invalid)?;
        let end = parse_clock(end.trim()).ok_or_else(invalid)?;
        Interval::new(start, end)
    }
}

/// Parse a 24-hour `HH:MM` clock string into minutes from midnight.
///
/// `24:00` is accepted and maps to the end of the day.
pub fn parse_clock(s: &str) -> Option<u32> {
    let (hour, minute) = s.split_once(':')?;
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;
    if minute > 59 {
        return None;
    }
    match hour {
        0..=23 => Some(hour * 60 + minute),
        24 if minute == 0 => Some(MINUTES_PER_DAY),
        _ => None,
    }
}

/// Format minutes from midnight as `HH:MM`.
pub fn format_clock(minute: u32) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

/// An existing calendar commitment for the target day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyEvent {
    #[serde(default)]
    pub title: Option<String>,
    pub interval: Interval,
}

impl BusyEvent {
    pub fn new(interval: Interval) -> Self {
        Self {
            title: None,
            interval,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// The target date together with the working-day boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingDay {
    pub date: NaiveDate,
    start: u32,
    end: u32,
}

impl WorkingDay {
    /// Create a working day bounded by `[start, end]` minutes.
    pub fn new(date: NaiveDate, start: u32, end: u32) -> Result<Self, ValidationError> {
        if start >= end || end > MINUTES_PER_DAY {
            return Err(ValidationError::InvalidWorkingDay { start, end });
        }
        Ok(Self { date, start, end })
    }

    /// The whole calendar day, 00:00 to 24:00.
    pub fn full(date: NaiveDate) -> Self {
        Self {
            date,
            start: 0,
            end: MINUTES_PER_DAY,
        }
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// The boundary as an interval.
    pub fn bounds(&self) -> Interval {
        Interval {
            start: self.start,
            end: self.end,
        }
    }
}
