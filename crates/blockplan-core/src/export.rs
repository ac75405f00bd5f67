//! Calendar event drafts for placed blocks.
//!
//! Drafts carry a deterministic id so a calendar writer can upsert them
//! instead of creating duplicates on re-runs.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scheduler::{ScheduleBlock, ScheduleResult};

/// Namespace for draft ids.
const DRAFT_NAMESPACE: Uuid = Uuid::from_u128(0x6b1f_4c2e_9a0d_4f3b_8e57_2d9c_b1a0_e4f7);

/// An event ready to be written to a calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    pub id: Uuid,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub description: String,
}

/// Drafts for every placed block, in chronological order.
pub fn event_drafts(result: &ScheduleResult, date: NaiveDate) -> Vec<EventDraft> {
    result
        .blocks()
        .iter()
        .map(|block| draft_for(block, date))
        .collect()
}

fn draft_for(block: &ScheduleBlock, date: NaiveDate) -> EventDraft {
    let title = block.title();
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    let start = midnight + Duration::minutes(i64::from(block.interval.start()));
    let end = midnight + Duration::minutes(i64::from(block.interval.end()));

    let key = format!("{}|{}|{}", date, title, block.interval);
    let mut description = format!("Planned block ({} min)", block.duration_minutes());
    if let Some(marker) = block.priority.marker() {
        description.push_str(&format!(", priority {marker}"));
    }

    EventDraft {
        id: Uuid::new_v5(&DRAFT_NAMESPACE, key.as_bytes()),
        title,
        start,
        end,
        description,
    }
}
