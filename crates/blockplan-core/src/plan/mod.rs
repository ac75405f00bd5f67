//! Plan items parsed from free-form daily plan text.
//!
//! The extractor finds candidate lines in a journal entry and the parser
//! turns each line into a [`PlanItem`].

pub mod extractor;
pub mod parser;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;
use crate::timeline::{Interval, MINUTES_PER_DAY};

pub use extractor::{PlanExtractor, RawPlanLine, DEFAULT_TRIGGER_PHRASES};
pub use parser::{parse_line, PlanParser};

/// Priority tag taken from inline `[HIGH]` / `[LOW]` markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Normal,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Normal => "normal",
            Self::Low => "low",
        }
    }

    /// Inline marker that produces this priority, if any.
    pub fn marker(&self) -> Option<&'static str> {
        match self {
            Self::High => Some("[HIGH]"),
            Self::Normal => None,
            Self::Low => Some("[LOW]"),
        }
    }
}

/// Where a plan item came from.
///
/// Only duration heuristics look at this: inferred items get category caps
/// applied to their suggested durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemOrigin {
    /// Written by the user in their plan
    #[default]
    Written,
    /// Suggested by an upstream planner
    Inferred,
}

/// How a plan item is anchored in the day.
///
/// All times are minutes from midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlanItemKind {
    /// Absolute start and end, e.g. `9:00-10:30: Deep work`
    ExplicitRange { start: u32, end: u32 },
    /// Absolute start plus a duration, e.g. `14:00: Review PRs (1 hour)`
    ExplicitStart { start: u32, duration: u32 },
    /// Duration only; placed in order of appearance
    SequentialDuration { duration: u32 },
    /// Could not be parsed; kept for diagnostics only
    Unparsed,
}

impl PlanItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExplicitRange { .. } => "explicit_range",
            Self::ExplicitStart { .. } => "explicit_start",
            Self::SequentialDuration { .. } => "sequential_duration",
            Self::Unparsed => "unparsed",
        }
    }
}

/// One task extracted from plan text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanItem {
    pub label: String,
    pub kind: PlanItemKind,
    #[serde(default)]
    pub priority: Priority,
    /// Source line index in the original text
    #[serde(default)]
    pub line: Option<usize>,
    #[serde(default)]
    pub origin: ItemOrigin,
}

impl PlanItem {
    fn with_kind(label: impl Into<String>, kind: PlanItemKind) -> Self {
        Self {
            label: label.into(),
            kind,
            priority: Priority::default(),
            line: None,
            origin: ItemOrigin::default(),
        }
    }

    pub fn range(label: impl Into<String>, start: u32, end: u32) -> Self {
        Self::with_kind(label, PlanItemKind::ExplicitRange { start, end })
    }

    pub fn starting_at(label: impl Into<String>, start: u32, duration: u32) -> Self {
        Self::with_kind(label, PlanItemKind::ExplicitStart { start, duration })
    }

    pub fn sequential(label: impl Into<String>, duration: u32) -> Self {
        Self::with_kind(label, PlanItemKind::SequentialDuration { duration })
    }

    pub fn unparsed(label: impl Into<String>) -> Self {
        Self::with_kind(label, PlanItemKind::Unparsed)
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn inferred(mut self) -> Self {
        self.origin = ItemOrigin::Inferred;
        self
    }

    /// Fixed items carry a user-stated start time.
    pub fn is_fixed(&self) -> bool {
        matches!(
            self.kind,
            PlanItemKind::ExplicitRange { .. } | PlanItemKind::ExplicitStart { .. }
        )
    }

    pub fn is_unparsed(&self) -> bool {
        matches!(self.kind, PlanItemKind::Unparsed)
    }

    /// Check that the fields are consistent with the kind.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let invalid = |message: String| ValidationError::InvalidPlanItem {
            label: self.label.clone(),
            message,
        };

        if self.label.trim().is_empty() {
            return Err(invalid("label is empty".to_string()));
        }

        match self.kind {
            PlanItemKind::ExplicitRange { start, end } => {
                Interval::new(start, end).map_err(|e| invalid(e.to_string()))?;
            }
            PlanItemKind::ExplicitStart { start, duration } => {
                if start >= MINUTES_PER_DAY {
                    return Err(invalid(format!("start {start} is past the end of the day")));
                }
                if duration == 0 {
                    return Err(invalid("duration is zero".to_string()));
                }
            }
            PlanItemKind::SequentialDuration { duration } => {
                if duration == 0 {
                    return Err(invalid("duration is zero".to_string()));
                }
            }
            PlanItemKind::Unparsed => {}
        }
        Ok(())
    }

    /// Canonical plan line for this item.
    ///
    /// Parsing the rendered line yields an item of the same kind.
    pub fn render(&self) -> String {
        let body = match self.kind {
            PlanItemKind::ExplicitRange { start, end } => {
                format!("{}-{}: {}", render_clock(start), render_clock(end), self.label)
            }
            PlanItemKind::ExplicitStart { start, duration } => {
                format!("{}: {} ({} min)", render_clock(start), self.label, duration)
            }
            PlanItemKind::SequentialDuration { duration } => {
                format!("{} {} min", self.label, duration)
            }
            PlanItemKind::Unparsed => self.label.clone(),
        };
        match self.priority.marker() {
            Some(marker) => format!("{marker} {body}"),
            None => body,
        }
    }
}

impl fmt::Display for PlanItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// 12-hour clock with an explicit suffix, so no disambiguation applies on
/// re-parse. The end of the day renders as `24:00`.
fn render_clock(minute: u32) -> String {
    if minute >= MINUTES_PER_DAY {
        return "24:00".to_string();
    }
    let hour = minute / 60;
    let suffix = if hour < 12 { "am" } else { "pm" };
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02}{}", hour12, minute % 60, suffix)
}
