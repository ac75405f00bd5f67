//! Allocation of plan items into free windows.
//!
//! This module turns parsed plan items into calendar blocks:
//! - Places explicitly timed items at their stated time, surfacing conflicts
//! - Packs duration-only items back-to-back from the configured start
//! - Skips busy time for packed items and reports what did not fit
//! - Produces a chronological [`ScheduleResult`]

pub mod duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

use crate::error::{Result, ValidationError};
use crate::plan::{ItemOrigin, PlanItem, PlanItemKind, Priority};
use crate::timeline::{format_clock, BusyEvent, Interval, WorkingDay, MINUTES_PER_DAY};

pub use duration::{
    resolve_duration, resolve_inferred_duration, split_blocks, DurationConfig, TaskCategory,
};

/// Trailing ` (k/n)` added to the titles of split parts.
static RE_PART_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\(\d+/\d+\)\s*$").unwrap());

/// Position of a block within a split deep-work item, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockPart {
    pub index: u32,
    pub of: u32,
}

/// A placed block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleBlock {
    pub label: String,
    pub interval: Interval,
    /// Index of the producing item in the allocator input
    pub source: usize,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part: Option<BlockPart>,
}

impl ScheduleBlock {
    /// Get total duration in minutes
    pub fn duration_minutes(&self) -> u32 {
        self.interval.duration_minutes()
    }

    /// Label with a `(k/n)` suffix for split parts.
    pub fn title(&self) -> String {
        match self.part {
            Some(part) => format!("{} ({}/{})", self.label, part.index, part.of),
            None => self.label.clone(),
        }
    }
}

/// Why an item did not end up on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnplacedReason {
    /// No remaining window could hold the item
    NoAvailableWindow,
    /// The item is longer than all the time the day has to offer
    DurationExceedsAvailableTime,
    /// The calendar already holds this item
    DuplicateOfExistingEvent,
    /// The plan line could not be parsed
    Unparsed,
}

impl UnplacedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoAvailableWindow => "NO_AVAILABLE_WINDOW",
            Self::DurationExceedsAvailableTime => "DURATION_EXCEEDS_AVAILABLE_TIME",
            Self::DuplicateOfExistingEvent => "DUPLICATE_OF_EXISTING_EVENT",
            Self::Unparsed => "UNPARSED",
        }
    }
}

impl fmt::Display for UnplacedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An item that was not placed, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnplacedItem {
    pub item: PlanItem,
    pub source: usize,
    pub reason: UnplacedReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Fixed item overlaps an existing calendar event
    Conflict,
    /// Fixed item overlaps another planned block
    Overlap,
    /// Fixed item lies outside the working day
    OutsideWorkingDay,
    /// A stated duration was clamped or capped
    DurationAdjusted,
    /// Item skipped because the calendar already has it
    Duplicate,
    /// Long stretch of unscheduled time
    IdleGap,
}

/// Human-readable diagnostic attached to a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleWarning {
    pub kind: WarningKind,
    pub message: String,
}

impl ScheduleWarning {
    fn new(kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ScheduleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Outcome of one allocation run.
///
/// Blocks are chronological; unplaced items follow input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleResult {
    blocks: Vec<ScheduleBlock>,
    unplaced: Vec<UnplacedItem>,
    warnings: Vec<ScheduleWarning>,
}

impl ScheduleResult {
    pub fn blocks(&self) -> &[ScheduleBlock] {
        &self.blocks
    }

    pub fn unplaced(&self) -> &[UnplacedItem] {
        &self.unplaced
    }

    pub fn warnings(&self) -> &[ScheduleWarning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.unplaced.is_empty() && self.warnings.is_empty()
    }

    /// Minutes covered by placed blocks.
    pub fn scheduled_minutes(&self) -> u32 {
        self.blocks.iter().map(ScheduleBlock::duration_minutes).sum()
    }
}

/// Allocator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatorConfig {
    /// Where sequential packing begins (minutes from midnight)
    pub sequential_start: u32,
    /// Working-day start
    pub day_start: u32,
    /// Working-day end; explicit starts may not run past it
    pub day_end: u32,
    pub durations: DurationConfig,
    /// Warn about idle gaps longer than this; 0 disables
    pub gap_warning_minutes: u32,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            sequential_start: 480,
            day_start: 0,
            day_end: MINUTES_PER_DAY,
            durations: DurationConfig::default(),
            gap_warning_minutes: 0,
        }
    }
}

impl AllocatorConfig {
    /// Take the working-day bounds from `day`.
    pub fn with_working_day(mut self, day: &WorkingDay) -> Self {
        self.day_start = day.start();
        self.day_end = day.end();
        self
    }
}

/// Mutable bookkeeping for one run. Windows are replaced, never edited.
struct Allocation<'a> {
    original: &'a [Interval],
    existing: &'a [BusyEvent],
    windows: Vec<Interval>,
    blocks: Vec<ScheduleBlock>,
    unplaced: Vec<UnplacedItem>,
    warnings: Vec<ScheduleWarning>,
}

impl Allocation<'_> {
    fn reject(&mut self, source: usize, item: &PlanItem, reason: UnplacedReason) {
        warn!(label = %item.label, %reason, "plan item not placed");
        self.unplaced.push(UnplacedItem {
            item: item.clone(),
            source,
            reason,
        });
    }

    fn warn(&mut self, kind: WarningKind, message: String) {
        self.warnings.push(ScheduleWarning::new(kind, message));
    }
}

/// Places plan items into free windows
pub struct Allocator {
    config: AllocatorConfig,
}

impl Allocator {
    /// Create a new allocator with default config
    pub fn new() -> Self {
        Self {
            config: AllocatorConfig::default(),
        }
    }

    /// Create with custom config
    pub fn with_config(config: AllocatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    /// Allocate items into free windows.
    ///
    /// # Arguments
    /// * `items` - Plan items in source order
    /// * `windows` - Free windows, sorted and disjoint
    ///
    /// # Errors
    /// Fails only on malformed input: an item whose fields contradict its
    /// kind, or windows that are unsorted or overlapping.
    pub fn allocate(&self, items: &[PlanItem], windows: &[Interval]) -> Result<ScheduleResult> {
        self.allocate_with_events(items, windows, &[])
    }

    /// Allocate items, using the existing events for conflict titles and
    /// duplicate detection.
    pub fn allocate_with_events(
        &self,
        items: &[PlanItem],
        windows: &[Interval],
        existing: &[BusyEvent],
    ) -> Result<ScheduleResult> {
        self.config.durations.validate()?;
        for item in items {
            item.validate()?;
        }
        validate_windows(windows)?;

        let mut run = Allocation {
            original: windows,
            existing,
            windows: windows.to_vec(),
            blocks: Vec::new(),
            unplaced: Vec::new(),
            warnings: Vec::new(),
        };

        // 1. Fixed items claim their stated time first
        for (source, item) in items.iter().enumerate().filter(|(_, i)| i.is_fixed()) {
            self.place_fixed(&mut run, source, item)?;
        }

        // 2. Sequential items pack into what remains, in source order
        let capacity = self.sequential_capacity(&run.windows);
        let mut cursor = self.config.sequential_start;
        for (source, item) in items.iter().enumerate() {
            if let PlanItemKind::SequentialDuration { duration } = item.kind {
                self.place_sequential(&mut run, source, item, duration, capacity, &mut cursor);
            }
        }

        // 3. Unparsed lines are only reported
        for (source, item) in items.iter().enumerate().filter(|(_, i)| i.is_unparsed()) {
            run.reject(source, item, UnplacedReason::Unparsed);
        }

        self.gap_warnings(&mut run);

        let Allocation {
            mut blocks,
            mut unplaced,
            warnings,
            ..
        } = run;
        blocks.sort_by_key(|b| (b.interval.start(), b.interval.end(), b.source));
        unplaced.sort_by_key(|u| u.source);

        info!(
            placed = blocks.len(),
            unplaced = unplaced.len(),
            warnings = warnings.len(),
            "allocation finished"
        );

        Ok(ScheduleResult {
            blocks,
            unplaced,
            warnings,
        })
    }

    fn place_fixed(&self, run: &mut Allocation<'_>, source: usize, item: &PlanItem) -> Result<()> {
        let interval = match item.kind {
            PlanItemKind::ExplicitRange { start, end } => Interval::new(start, end)?,
            PlanItemKind::ExplicitStart { start, duration } => {
                let minutes = self.resolved_minutes(item, duration);
                let end = match start.checked_add(minutes) {
                    Some(end) if end <= self.config.day_end => end,
                    _ => {
                        note_adjustment(run, item, duration, minutes);
                        run.reject(source, item, UnplacedReason::DurationExceedsAvailableTime);
                        return Ok(());
                    }
                };
                Interval::new(start, end)?
            }
            _ => return Ok(()),
        };

        // Same title at an overlapping time: the calendar already has it.
        if let Some(event) = run
            .existing
            .iter()
            .find(|e| e.interval.overlaps(&interval) && same_title(e.title.as_deref(), &item.label))
        {
            run.warn(
                WarningKind::Duplicate,
                format!("Skipped '{}': already on the calendar at {}", item.label, event.interval),
            );
            run.reject(source, item, UnplacedReason::DuplicateOfExistingEvent);
            return Ok(());
        }

        if let PlanItemKind::ExplicitStart { duration, .. } = item.kind {
            note_adjustment(run, item, duration, interval.duration_minutes());
        }

        let fits = run.windows.iter().any(|w| w.contains(&interval));
        if !fits {
            self.diagnose_fixed_conflict(run, item, &interval);
        }

        debug!(label = %item.label, %interval, fits, "placed fixed item");
        run.windows = consume(&run.windows, &interval);
        run.blocks.push(ScheduleBlock {
            label: item.label.clone(),
            interval,
            source,
            priority: item.priority,
            part: None,
        });
        Ok(())
    }

    /// Explain why a fixed interval did not fit a single free window.
    fn diagnose_fixed_conflict(&self, run: &mut Allocation<'_>, item: &PlanItem, interval: &Interval) {
        let bounds = Interval::new(self.config.day_start, self.config.day_end).ok();
        let inside = bounds.and_then(|b| interval.clip(&b));

        // Minutes inside the working day that were never free are busy.
        let hits_busy = inside.is_some_and(|part| {
            !run.original
                .iter()
                .fold(vec![part], |rest, w| consume(&rest, w))
                .is_empty()
        });

        if hits_busy {
            let titles: Vec<String> = run
                .existing
                .iter()
                .filter(|e| e.interval.overlaps(interval))
                .map(|e| match &e.title {
                    Some(title) => format!("'{}' ({})", title, e.interval),
                    None => format!("({})", e.interval),
                })
                .collect();
            let with = if titles.is_empty() {
                String::new()
            } else {
                format!(" {}", titles.join(", "))
            };
            warn!(label = %item.label, %interval, "fixed item conflicts with calendar");
            run.warn(
                WarningKind::Conflict,
                format!(
                    "WARNING: conflict with existing calendar event{}: '{}' kept at {}",
                    with, item.label, interval
                ),
            );
        }

        let overlapped: Vec<String> = run
            .blocks
            .iter()
            .filter(|b| b.interval.overlaps(interval))
            .map(|b| format!("'{}' ({})", b.label, b.interval))
            .collect();
        if !overlapped.is_empty() {
            run.warn(
                WarningKind::Overlap,
                format!(
                    "'{}' at {} overlaps planned block {}",
                    item.label,
                    interval,
                    overlapped.join(", ")
                ),
            );
        }

        if bounds.map_or(true, |b| !b.contains(interval)) {
            run.warn(
                WarningKind::OutsideWorkingDay,
                format!(
                    "'{}' at {} falls outside the working day {}-{}",
                    item.label,
                    interval,
                    format_clock(self.config.day_start),
                    format_clock(self.config.day_end)
                ),
            );
        }
    }

    fn place_sequential(
        &self,
        run: &mut Allocation<'_>,
        source: usize,
        item: &PlanItem,
        stated: u32,
        capacity: u32,
        cursor: &mut u32,
    ) {
        if let Some(event) = run
            .existing
            .iter()
            .find(|e| same_title(e.title.as_deref(), &item.label))
        {
            run.warn(
                WarningKind::Duplicate,
                format!("Skipped '{}': already on the calendar at {}", item.label, event.interval),
            );
            run.reject(source, item, UnplacedReason::DuplicateOfExistingEvent);
            return;
        }

        let minutes = self.resolved_minutes(item, stated);
        note_adjustment(run, item, stated, minutes);

        if minutes > capacity {
            run.reject(source, item, UnplacedReason::DurationExceedsAvailableTime);
            return;
        }

        // All parts fit or none are placed.
        let parts = split_blocks(&item.label, minutes, &self.config.durations);
        let mut windows = run.windows.clone();
        let mut next = *cursor;
        let mut placed = Vec::with_capacity(parts.len());
        for part in &parts {
            match find_slot(&windows, next, *part) {
                Some(slot) => {
                    windows = consume(&windows, &slot);
                    next = slot.end();
                    placed.push(slot);
                }
                None => {
                    run.reject(source, item, UnplacedReason::NoAvailableWindow);
                    return;
                }
            }
        }

        let of = placed.len() as u32;
        for (i, interval) in placed.into_iter().enumerate() {
            debug!(label = %item.label, %interval, "placed sequential item");
            run.blocks.push(ScheduleBlock {
                label: item.label.clone(),
                interval,
                source,
                priority: item.priority,
                part: (of > 1).then_some(BlockPart {
                    index: i as u32 + 1,
                    of,
                }),
            });
        }
        run.windows = windows;
        *cursor = next;
    }

    /// Stated duration after clamping and category caps.
    fn resolved_minutes(&self, item: &PlanItem, stated: u32) -> u32 {
        let durations = &self.config.durations;
        match item.origin {
            ItemOrigin::Written => resolve_duration(&item.label, Some(stated), durations),
            ItemOrigin::Inferred => resolve_inferred_duration(&item.label, Some(stated), durations),
        }
    }

    /// Free minutes from the sequential start to the end of the day.
    fn sequential_capacity(&self, windows: &[Interval]) -> u32 {
        let Ok(span) = Interval::new(self.config.sequential_start, self.config.day_end) else {
            return 0;
        };
        windows
            .iter()
            .filter_map(|w| w.clip(&span))
            .map(|w| w.duration_minutes())
            .sum()
    }

    fn gap_warnings(&self, run: &mut Allocation<'_>) {
        let threshold = self.config.gap_warning_minutes;
        if threshold == 0 || run.blocks.is_empty() {
            return;
        }
        // Free time before the first block or busy event is not idle.
        let first_occupied = run
            .blocks
            .iter()
            .map(|b| b.interval.start())
            .chain(run.existing.iter().map(|e| e.interval.start()))
            .min()
            .unwrap_or(self.config.day_end);
        let gaps: Vec<Interval> = run
            .windows
            .iter()
            .filter(|w| w.end() > first_occupied && w.duration_minutes() > threshold)
            .copied()
            .collect();
        for gap in gaps {
            let message = if gap.end() == self.config.day_end {
                format!(
                    "Day ends with an unscheduled gap of {} minutes after the last commitment ({})",
                    gap.duration_minutes(),
                    gap
                )
            } else {
                format!("Gap of {} minutes with nothing scheduled ({})", gap.duration_minutes(), gap)
            };
            run.warn(WarningKind::IdleGap, message);
        }
    }
}

impl Default for Allocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Windows must be sorted and pairwise disjoint.
pub fn validate_windows(windows: &[Interval]) -> Result<(), ValidationError> {
    match windows.windows(2).find(|pair| pair[0].end() > pair[1].start()) {
        Some(pair) => Err(ValidationError::InvalidValue {
            field: "windows".to_string(),
            message: format!("{} and {} are unsorted or overlapping", pair[0], pair[1]),
        }),
        None => Ok(()),
    }
}

/// New window list with `taken` removed.
pub fn consume(windows: &[Interval], taken: &Interval) -> Vec<Interval> {
    windows.iter().flat_map(|w| w.subtract(taken)).collect()
}

/// First slot of `minutes` at or after `cursor` inside a single window.
fn find_slot(windows: &[Interval], cursor: u32, minutes: u32) -> Option<Interval> {
    windows
        .iter()
        .filter(|w| w.end() > cursor)
        .find_map(|w| {
            let start = cursor.max(w.start());
            let end = start.checked_add(minutes)?;
            (end <= w.end()).then(|| Interval::new(start, end).ok()).flatten()
        })
}

fn note_adjustment(run: &mut Allocation<'_>, item: &PlanItem, stated: u32, minutes: u32) {
    if minutes != stated {
        run.warn(
            WarningKind::DurationAdjusted,
            format!("'{}': duration adjusted from {} to {} min", item.label, stated, minutes),
        );
    }
}

/// Event title without a ` (k/n)` part suffix, lowercased.
fn base_title(title: &str) -> String {
    RE_PART_SUFFIX.replace(title.trim(), "").trim().to_lowercase()
}

/// Case-insensitive title equality ignoring part suffixes. Untitled events
/// never match.
fn same_title(title: Option<&str>, label: &str) -> bool {
    let Some(title) = title else {
        return false;
    };
    let title = base_title(title);
    !title.is_empty() && title == base_title(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(start: u32, end: u32) -> Interval {
        Interval::new(start, end).unwrap()
    }

    fn spans(result: &ScheduleResult) -> Vec<(u32, u32)> {
        result
            .blocks()
            .iter()
            .map(|b| (b.interval.start(), b.interval.end()))
            .collect()
    }

    #[test]
    fn test_build_blocks_packing() {
        let items = vec![
            PlanItem::sequential("Meet with Chris", 120),
            PlanItem::sequential("accounting homework", 60),
            PlanItem::sequential("python homework", 60),
            PlanItem::sequential("internship applications", 60),
        ];

        let result = Allocator::new().allocate(&items, &[iv(0, 1440)]).unwrap();

        assert_eq!(spans(&result), vec![(480, 600), (600, 660), (660, 720), (720, 780)]);
        let labels: Vec<_> = result.blocks().iter().map(|b| b.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Meet with Chris", "accounting homework", "python homework", "internship applications"]
        );
        assert!(result.unplaced().is_empty());
        assert!(result.warnings().is_empty());
    }

    #[test]
    fn test_fixed_conflict_is_kept_and_reported() {
        // Busy 10:00-11:00 leaves these windows.
        let windows = vec![iv(0, 600), iv(660, 1440)];
        let items = vec![PlanItem::range("task", 630, 690)];

        let result = Allocator::new().allocate(&items, &windows).unwrap();

        assert_eq!(spans(&result), vec![(630, 690)]);
        assert_eq!(result.warnings().len(), 1);
        assert_eq!(result.warnings()[0].kind, WarningKind::Conflict);
        assert!(result.warnings()[0]
            .message
            .starts_with("WARNING: conflict with existing calendar event"));
    }

    #[test]
    fn test_conflict_names_existing_event() {
        let busy = vec![BusyEvent::new(iv(600, 660)).with_title("Standup")];
        let windows = vec![iv(0, 600), iv(660, 1440)];
        let items = vec![PlanItem::range("Deep work", 630, 690)];

        let result = Allocator::new()
            .allocate_with_events(&items, &windows, &busy)
            .unwrap();

        assert!(result.warnings()[0].message.contains("'Standup' (10:00-11:00)"));
    }

    #[test]
    fn test_fixed_item_splits_window() {
        let items = vec![
            PlanItem::range("Lunch", 720, 780),
            PlanItem::sequential("Read", 240),
            PlanItem::sequential("Write", 60),
        ];

        let result = Allocator::new().allocate(&items, &[iv(480, 1080)]).unwrap();

        // Read needs 240 min: 08:00-12:00 fits exactly before lunch.
        assert_eq!(spans(&result), vec![(480, 720), (720, 780), (780, 840)]);
        assert!(result.warnings().is_empty());
    }

    #[test]
    fn test_sequential_skips_busy_time() {
        let windows = vec![iv(480, 540), iv(600, 1440)];
        let items = vec![
            PlanItem::sequential("Gym", 45),
            PlanItem::sequential("Homework", 60),
        ];

        let result = Allocator::new().allocate(&items, &windows).unwrap();

        // Homework does not fit in the 15 minutes left before 9:00.
        assert_eq!(spans(&result), vec![(480, 525), (600, 660)]);
    }

    #[test]
    fn test_unplaceable_item_does_not_cascade() {
        let windows = vec![iv(480, 720)];
        let items = vec![
            PlanItem::sequential("Meet with Chris", 120),
            PlanItem::sequential("Accounting", 90),
            PlanItem::sequential("Python", 60),
            PlanItem::sequential("Email", 30),
        ];

        let result = Allocator::new().allocate(&items, &windows).unwrap();

        assert_eq!(spans(&result), vec![(480, 600), (600, 690), (690, 720)]);
        assert_eq!(result.unplaced().len(), 1);
        assert_eq!(result.unplaced()[0].item.label, "Python");
        assert_eq!(result.unplaced()[0].reason, UnplacedReason::NoAvailableWindow);
    }

    #[test]
    fn test_duration_exceeding_day_capacity() {
        let windows = vec![iv(480, 600)];
        let items = vec![PlanItem::sequential("Marathon study", 180)];

        let result = Allocator::new().allocate(&items, &windows).unwrap();

        assert!(result.blocks().is_empty());
        assert_eq!(result.unplaced()[0].reason, UnplacedReason::DurationExceedsAvailableTime);
    }

    #[test]
    fn test_explicit_start_past_day_end() {
        let config = AllocatorConfig {
            day_end: 1200,
            ..AllocatorConfig::default()
        };
        let items = vec![PlanItem::starting_at("Late call", 1170, 60)];

        let result = Allocator::with_config(config)
            .allocate(&items, &[iv(480, 1200)])
            .unwrap();

        assert!(result.blocks().is_empty());
        assert_eq!(result.unplaced()[0].reason, UnplacedReason::DurationExceedsAvailableTime);
    }

    #[test]
    fn test_fixed_items_allocated_before_sequential() {
        let items = vec![
            PlanItem::sequential("Emails", 60),
            PlanItem::starting_at("Standup", 480, 30),
        ];

        let result = Allocator::new().allocate(&items, &[iv(0, 1440)]).unwrap();

        assert_eq!(spans(&result), vec![(480, 510), (510, 570)]);
        assert_eq!(result.blocks()[0].label, "Standup");
        assert_eq!(result.blocks()[0].source, 1);
    }

    #[test]
    fn test_overlapping_fixed_items_warn() {
        let items = vec![
            PlanItem::range("Deep work", 540, 660),
            PlanItem::range("Call", 600, 630),
        ];

        let result = Allocator::new().allocate(&items, &[iv(0, 1440)]).unwrap();

        assert_eq!(result.blocks().len(), 2);
        assert_eq!(result.warnings().len(), 1);
        assert_eq!(result.warnings()[0].kind, WarningKind::Overlap);
    }

    #[test]
    fn test_fixed_outside_working_day_warns() {
        let config = AllocatorConfig {
            day_start: 480,
            day_end: 1200,
            ..AllocatorConfig::default()
        };
        let items = vec![PlanItem::range("Early run", 360, 420)];

        let result = Allocator::with_config(config)
            .allocate(&items, &[iv(480, 1200)])
            .unwrap();

        assert_eq!(result.blocks().len(), 1);
        assert_eq!(result.warnings().len(), 1);
        assert_eq!(result.warnings()[0].kind, WarningKind::OutsideWorkingDay);
    }

    #[test]
    fn test_deep_work_split_into_parts() {
        let items = vec![PlanItem::sequential("Deep work on parser", 120)];

        let result = Allocator::new().allocate(&items, &[iv(0, 1440)]).unwrap();

        assert_eq!(spans(&result), vec![(480, 540), (540, 600)]);
        assert_eq!(result.blocks()[0].title(), "Deep work on parser (1/2)");
        assert_eq!(result.blocks()[1].part, Some(BlockPart { index: 2, of: 2 }));
    }

    #[test]
    fn test_split_parts_use_separate_windows() {
        let windows = vec![iv(480, 540), iv(600, 700)];
        let items = vec![PlanItem::sequential("Focus sprint", 120)];

        let result = Allocator::new().allocate(&items, &windows).unwrap();

        assert_eq!(spans(&result), vec![(480, 540), (600, 660)]);
    }

    #[test]
    fn test_clamped_duration_warns() {
        let items = vec![PlanItem::sequential("Hackathon", 600)];

        let result = Allocator::new().allocate(&items, &[iv(0, 1440)]).unwrap();

        assert_eq!(spans(&result), vec![(480, 960)]);
        assert_eq!(result.warnings()[0].kind, WarningKind::DurationAdjusted);
    }

    #[test]
    fn test_inferred_outreach_is_capped() {
        let items = vec![PlanItem::sequential("Internship outreach", 120).inferred()];

        let result = Allocator::new().allocate(&items, &[iv(0, 1440)]).unwrap();

        assert_eq!(spans(&result), vec![(480, 540)]);
    }

    #[test]
    fn test_duplicates_are_skipped() {
        let busy = vec![
            BusyEvent::new(iv(540, 630)).with_title("Deep work on accounting system"),
            BusyEvent::new(iv(480, 540)).with_title("python homework"),
        ];
        let windows = vec![iv(0, 480), iv(630, 1440)];
        let items = vec![
            PlanItem::range("Deep work on accounting system", 540, 630),
            PlanItem::sequential("Python homework", 60),
            PlanItem::sequential("Accounting", 60),
        ];

        let result = Allocator::new()
            .allocate_with_events(&items, &windows, &busy)
            .unwrap();

        assert_eq!(spans(&result), vec![(630, 690)]);
        assert_eq!(result.unplaced().len(), 2);
        assert!(result
            .unplaced()
            .iter()
            .all(|u| u.reason == UnplacedReason::DuplicateOfExistingEvent));
    }

    #[test]
    fn test_split_parts_are_duplicates_on_rerun() {
        let items = vec![PlanItem::sequential("Deep work on parser", 120)];
        let windows = vec![iv(0, 1440)];
        let first = Allocator::new().allocate(&items, &windows).unwrap();
        assert_eq!(first.blocks().len(), 2);

        let calendar: Vec<BusyEvent> = first
            .blocks()
            .iter()
            .map(|b| BusyEvent::new(b.interval).with_title(b.title()))
            .collect();
        let second = Allocator::new()
            .allocate_with_events(&items, &[iv(0, 480), iv(600, 1440)], &calendar)
            .unwrap();

        assert!(second.blocks().is_empty());
        assert_eq!(
            second.unplaced()[0].reason,
            UnplacedReason::DuplicateOfExistingEvent
        );
    }

    #[test]
    fn test_fixed_item_with_shorter_title_is_a_conflict() {
        let busy = vec![BusyEvent::new(iv(600, 660)).with_title("Call with recruiter")];
        let items = vec![PlanItem::range("Call", 630, 690)];

        let result = Allocator::new()
            .allocate_with_events(&items, &[iv(0, 600), iv(660, 1440)], &busy)
            .unwrap();

        assert_eq!(spans(&result), vec![(630, 690)]);
        assert!(result.unplaced().is_empty());
        assert_eq!(result.warnings().len(), 1);
        assert_eq!(result.warnings()[0].kind, WarningKind::Conflict);
    }

    #[test]
    fn test_fixed_duplicate_needs_overlap() {
        let busy = vec![BusyEvent::new(iv(600, 660)).with_title("Standup")];
        let items = vec![PlanItem::range("standup", 900, 930)];

        let result = Allocator::new()
            .allocate_with_events(&items, &[iv(0, 600), iv(660, 1440)], &busy)
            .unwrap();

        assert_eq!(spans(&result), vec![(900, 930)]);
    }

    #[test]
    fn test_duplicate_skips_duration_adjustment_warning() {
        let busy = vec![BusyEvent::new(iv(480, 960)).with_title("Marathon")];
        let items = vec![
            PlanItem::sequential("Marathon", 600),
            PlanItem::starting_at("Marathon", 480, 600),
        ];

        let result = Allocator::new()
            .allocate_with_events(&items, &[iv(0, 480), iv(960, 1440)], &busy)
            .unwrap();

        assert_eq!(result.unplaced().len(), 2);
        assert!(result
            .warnings()
            .iter()
            .all(|w| w.kind == WarningKind::Duplicate));
    }

    #[test]
    fn test_unusable_duration_config_is_an_error() {
        let config = AllocatorConfig {
            durations: DurationConfig {
                min_minutes: u32::MAX,
                max_minutes: u32::MAX,
                ..DurationConfig::default()
            },
            ..AllocatorConfig::default()
        };
        let items = vec![PlanItem::starting_at("Call", 600, 30)];

        assert!(Allocator::with_config(config)
            .allocate(&items, &[iv(0, 1440)])
            .is_err());
    }

    #[test]
    fn test_start_running_past_midnight_is_rejected() {
        let config = AllocatorConfig {
            durations: DurationConfig {
                max_minutes: MINUTES_PER_DAY,
                ..DurationConfig::default()
            },
            ..AllocatorConfig::default()
        };
        let items = vec![PlanItem::starting_at("Overnight", 1380, MINUTES_PER_DAY)];

        let result = Allocator::with_config(config)
            .allocate(&items, &[iv(0, 1440)])
            .unwrap();

        assert!(result.blocks().is_empty());
        assert_eq!(
            result.unplaced()[0].reason,
            UnplacedReason::DurationExceedsAvailableTime
        );
    }

    #[test]
    fn test_leading_window_gap_is_not_reported() {
        let config = AllocatorConfig {
            day_start: 0,
            day_end: 1200,
            gap_warning_minutes: 60,
            ..AllocatorConfig::default()
        };
        let items = vec![PlanItem::range("Call", 720, 750)];

        let result = Allocator::with_config(config)
            .allocate(&items, &[iv(480, 1200)])
            .unwrap();

        let gaps: Vec<_> = result
            .warnings()
            .iter()
            .filter(|w| w.kind == WarningKind::IdleGap)
            .collect();
        assert_eq!(gaps.len(), 1);
        assert!(gaps[0].message.starts_with("Day ends with an unscheduled gap of 450 minutes"));
    }

    #[test]
    fn test_unparsed_items_are_reported() {
        let items = vec![PlanItem::unparsed("call mom"), PlanItem::sequential("Read", 30)];

        let result = Allocator::new().allocate(&items, &[iv(0, 1440)]).unwrap();

        assert_eq!(result.blocks().len(), 1);
        assert_eq!(result.unplaced()[0].reason, UnplacedReason::Unparsed);
        assert_eq!(result.unplaced()[0].source, 0);
    }

    #[test]
    fn test_empty_items_yield_empty_result() {
        let result = Allocator::new().allocate(&[], &[iv(0, 1440)]).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_gap_warnings() {
        let config = AllocatorConfig {
            day_start: 480,
            day_end: 1200,
            gap_warning_minutes: 60,
            ..AllocatorConfig::default()
        };
        let items = vec![
            PlanItem::sequential("Write", 60),
            PlanItem::range("Call", 720, 750),
        ];

        let result = Allocator::with_config(config)
            .allocate(&items, &[iv(480, 1200)])
            .unwrap();

        let gaps: Vec<_> = result
            .warnings()
            .iter()
            .filter(|w| w.kind == WarningKind::IdleGap)
            .collect();
        assert_eq!(gaps.len(), 2);
        assert!(gaps[1].message.starts_with("Day ends with an unscheduled gap of 450 minutes"));
    }

    #[test]
    fn test_invalid_input_is_rejected() {
        let bad_item = vec![PlanItem::range("Backwards", 600, 540)];
        assert!(Allocator::new().allocate(&bad_item, &[iv(0, 1440)]).is_err());

        let bad_windows = vec![iv(600, 700), iv(480, 650)];
        assert!(Allocator::new().allocate(&[], &bad_windows).is_err());
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let items = vec![PlanItem::sequential("Read", 30)];
        let windows = vec![iv(480, 600)];
        let (items_before, windows_before) = (items.clone(), windows.clone());

        let _ = Allocator::new().allocate(&items, &windows).unwrap();

        assert_eq!(items, items_before);
        assert_eq!(windows, windows_before);
    }

    #[test]
    fn test_reason_codes_serialize_screaming_snake_case() {
        let json = serde_json::to_string(&UnplacedReason::NoAvailableWindow).unwrap();
        assert_eq!(json, "\"NO_AVAILABLE_WINDOW\"");
    }
}
