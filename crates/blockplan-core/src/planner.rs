//! End-to-end planning of one day.
//!
//! [`DayPlanner`] chains extraction, parsing, free-window detection and
//! allocation so callers only deal with text in and a [`DayPlan`] out.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::export::{event_drafts, EventDraft};
use crate::plan::{PlanExtractor, PlanItem, PlanParser, RawPlanLine, DEFAULT_TRIGGER_PHRASES};
use crate::scheduler::{Allocator, AllocatorConfig, DurationConfig, ScheduleResult};
use crate::timeline::{BusyEvent, Interval, TimeGapDetector, WorkingDay, MINUTES_PER_DAY};

/// Engine configuration for a planning run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerConfig {
    pub day_start: u32,
    pub day_end: u32,
    pub sequential_start: u32,
    pub durations: DurationConfig,
    pub gap_warning_minutes: u32,
    pub trigger_phrases: Vec<String>,
    pub ignore_phrases: Vec<String>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            day_start: 0,
            day_end: MINUTES_PER_DAY,
            sequential_start: 480,
            durations: DurationConfig::default(),
            gap_warning_minutes: 0,
            trigger_phrases: DEFAULT_TRIGGER_PHRASES.iter().map(|p| p.to_string()).collect(),
            ignore_phrases: Vec::new(),
        }
    }
}

/// Everything a planning run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPlan {
    pub date: NaiveDate,
    pub lines: Vec<RawPlanLine>,
    pub items: Vec<PlanItem>,
    /// Free windows before allocation
    pub windows: Vec<Interval>,
    pub result: ScheduleResult,
}

impl DayPlan {
    /// Calendar drafts for the placed blocks.
    pub fn event_drafts(&self) -> Vec<EventDraft> {
        event_drafts(&self.result, self.date)
    }
}

/// Plans a single date.
pub struct DayPlanner {
    day: WorkingDay,
    extractor: PlanExtractor,
    parser: PlanParser,
    allocator: Allocator,
}

impl DayPlanner {
    /// # Errors
    /// Returns a validation error if the working-day bounds or the duration
    /// bounds are invalid.
    pub fn new(date: NaiveDate, config: PlannerConfig) -> Result<Self> {
        let day = WorkingDay::new(date, config.day_start, config.day_end)?;
        config.durations.validate()?;
        let extractor = PlanExtractor::new()
            .with_triggers(config.trigger_phrases.iter().cloned())
            .with_ignored(config.ignore_phrases.iter().cloned());
        let parser = PlanParser::new(config.durations.clone());
        let allocator = Allocator::with_config(
            AllocatorConfig {
                sequential_start: config.sequential_start,
                durations: config.durations,
                gap_warning_minutes: config.gap_warning_minutes,
                ..AllocatorConfig::default()
            }
            .with_working_day(&day),
        );

        Ok(Self {
            day,
            extractor,
            parser,
            allocator,
        })
    }

    pub fn working_day(&self) -> &WorkingDay {
        &self.day
    }

    /// Extract and parse the plan lines without scheduling them.
    pub fn parse(&self, text: &str) -> (Vec<RawPlanLine>, Vec<PlanItem>) {
        let lines = self.extractor.extract(text);
        let items = self.parser.parse_lines(&lines);
        (lines, items)
    }

    /// Free windows left by the busy events.
    pub fn windows(&self, busy: &[BusyEvent]) -> Vec<Interval> {
        let intervals: Vec<Interval> = busy.iter().map(|e| e.interval).collect();
        TimeGapDetector::new().find_windows(&self.day, &intervals)
    }

    /// Run the whole pipeline for `text` against the day's busy events.
    ///
    /// # Errors
    /// Fails only if the parsed items or computed windows are malformed.
    pub fn plan(&self, text: &str, busy: &[BusyEvent]) -> Result<DayPlan> {
        let (lines, items) = self.parse(text);
        let mut plan = self.plan_items(items, busy)?;
        plan.lines = lines;
        Ok(plan)
    }

    /// Schedule already-structured items, such as those suggested by an
    /// upstream planner, skipping extraction and parsing.
    ///
    /// # Errors
    /// Fails if an item or the computed windows are malformed.
    pub fn plan_items(&self, items: Vec<PlanItem>, busy: &[BusyEvent]) -> Result<DayPlan> {
        let windows = self.windows(busy);
        let result = self.allocator.allocate_with_events(&items, &windows, busy)?;

        info!(
            date = %self.day.date,
            items = items.len(),
            windows = windows.len(),
            "planned day"
        );

        Ok(DayPlan {
            date: self.day.date,
            lines: Vec::new(),
            items,
            windows,
            result,
        })
    }
}
