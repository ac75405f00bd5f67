//! # Blockplan Core Library
//!
//! This library turns a free-form daily plan into non-overlapping calendar
//! blocks that fit around existing commitments. All operations are exposed
//! through the standalone `blockplan-cli` binary, a thin layer over this
//! crate.
//!
//! ## Architecture
//!
//! - **Plan**: Extracts the plan section from journal text and parses each
//!   line into a timed or duration-only item
//! - **Timeline**: Minute-of-day intervals and free-window detection
//! - **Scheduler**: Duration heuristics and the allocator that places items
//! - **Export**: Calendar event drafts with stable ids
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`DayPlanner`]: Runs the whole pipeline for one date
//! - [`PlanParser`]: Single-line time-expression parser
//! - [`Allocator`]: Places items into free windows
//! - [`Config`]: Application configuration management

pub mod error;
pub mod export;
pub mod plan;
pub mod planner;
pub mod scheduler;
pub mod storage;
pub mod timeline;

pub use error::{ConfigError, CoreError, ValidationError};
pub use export::{event_drafts, EventDraft};
pub use plan::{parse_line, PlanExtractor, PlanItem, PlanItemKind, PlanParser, Priority, RawPlanLine};
pub use planner::{DayPlan, DayPlanner, PlannerConfig};
pub use scheduler::{
    Allocator, AllocatorConfig, DurationConfig, ScheduleBlock, ScheduleResult, ScheduleWarning,
    UnplacedItem, UnplacedReason, WarningKind,
};
pub use storage::Config;
pub use timeline::{free_windows, BusyEvent, Interval, TimeGapDetector, WorkingDay};
