//! Duration heuristics for plan items.
//!
//! Maps a task label (and an optional stated duration) to concrete minutes
//! using keyword categories, and splits long deep-work items into blocks.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::timeline::MINUTES_PER_DAY;

/// Tunables for duration resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DurationConfig {
    /// Duration for labels that match no category
    pub default_minutes: u32,
    /// Lower clamp applied to every result
    pub min_minutes: u32,
    /// Upper clamp applied to every result
    pub max_minutes: u32,
    /// Duration for review/check tasks
    pub review_minutes: u32,
    /// Length of one deep-work block
    pub deep_work_block_minutes: u32,
    /// Maximum number of blocks one deep-work item is split into
    pub deep_work_max_blocks: u32,
    /// Cap for internship/application/outreach tasks
    pub outreach_cap_minutes: u32,
}

impl Default for DurationConfig {
    fn default() -> Self {
        Self {
            default_minutes: 60,
            min_minutes: 5,
            max_minutes: 480,
            review_minutes: 30,
            deep_work_block_minutes: 60,
            deep_work_max_blocks: 2,
            outreach_cap_minutes: 60,
        }
    }
}

impl DurationConfig {
    /// Clamp into `[min_minutes, max_minutes]` without panicking on an
    /// inverted range.
    pub fn clamp(&self, minutes: u32) -> u32 {
        minutes.max(self.min_minutes).min(self.max_minutes)
    }

    /// Every resolved duration must land in `[1, 1440]`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let invalid = |field: &str, message: String| ValidationError::InvalidValue {
            field: format!("durations.{field}"),
            message,
        };

        if self.min_minutes < 1 {
            return Err(invalid("min_minutes", "must be at least 1".to_string()));
        }
        if self.min_minutes > self.max_minutes {
            return Err(invalid(
                "min_minutes",
                format!("{} exceeds max_minutes {}", self.min_minutes, self.max_minutes),
            ));
        }
        if self.max_minutes > MINUTES_PER_DAY {
            return Err(invalid(
                "max_minutes",
                format!("{} is longer than a day", self.max_minutes),
            ));
        }
        if self.deep_work_block_minutes < 1 {
            return Err(invalid("deep_work_block_minutes", "must be at least 1".to_string()));
        }
        if self.deep_work_max_blocks < 1 {
            return Err(invalid("deep_work_max_blocks", "must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Keyword category of a task label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    Review,
    DeepWork,
    Outreach,
    General,
}

const REVIEW_KEYWORDS: &[&str] = &["review", "check"];
const DEEP_WORK_KEYWORDS: &[&str] = &["deep work", "focus"];
const OUTREACH_KEYWORDS: &[&str] = &["internship", "application", "outreach"];

impl TaskCategory {
    /// Classify by case-insensitive substring match, first category wins.
    pub fn classify(label: &str) -> Self {
        let lower = label.to_lowercase();
        let hit = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));

        if hit(REVIEW_KEYWORDS) {
            Self::Review
        } else if hit(DEEP_WORK_KEYWORDS) {
            Self::DeepWork
        } else if hit(OUTREACH_KEYWORDS) {
            Self::Outreach
        } else {
            Self::General
        }
    }
}

/// Resolve a concrete duration for a label.
///
/// A stated duration wins and is only clamped; otherwise the label's
/// category decides.
pub fn resolve_duration(label: &str, explicit: Option<u32>, config: &DurationConfig) -> u32 {
    let minutes = match explicit {
        Some(minutes) => minutes,
        None => match TaskCategory::classify(label) {
            TaskCategory::Review => config.review_minutes,
            TaskCategory::DeepWork => config.deep_work_block_minutes,
            TaskCategory::Outreach => config.default_minutes.min(config.outreach_cap_minutes),
            TaskCategory::General => config.default_minutes,
        },
    };
    config.clamp(minutes)
}

/// Resolve a duration suggested by an upstream planner rather than written
/// by the user. Outreach suggestions are capped even when longer.
pub fn resolve_inferred_duration(
    label: &str,
    suggested: Option<u32>,
    config: &DurationConfig,
) -> u32 {
    let suggested = match TaskCategory::classify(label) {
        TaskCategory::Outreach => suggested.map(|m| m.min(config.outreach_cap_minutes)),
        _ => suggested,
    };
    resolve_duration(label, suggested, config)
}

/// Split a resolved duration into calendar blocks.
///
/// Deep-work items longer than one block become consecutive blocks of
/// `deep_work_block_minutes`, at most `deep_work_max_blocks` of them; the
/// last block takes whatever remains. Other items stay whole.
pub fn split_blocks(label: &str, minutes: u32, config: &DurationConfig) -> Vec<u32> {
    let block = config.deep_work_block_minutes.max(1);
    let max_blocks = config.deep_work_max_blocks.max(1);

    if TaskCategory::classify(label) != TaskCategory::DeepWork || minutes <= block || max_blocks == 1
    {
        return vec![minutes];
    }

    let count = minutes.div_ceil(block).min(max_blocks);
    (0..count)
        .map(|i| {
            if i + 1 < count {
                block
            } else {
                minutes - block * (count - 1)
            }
        })
        .collect()
}
