//! End-to-end tests: plan text and busy events in, schedule out.

use blockplan_core::{
    free_windows, parse_line, Allocator, BusyEvent, DayPlanner, Interval, PlanItemKind,
    PlannerConfig, UnplacedReason, WarningKind, WorkingDay,
};
use chrono::NaiveDate;
use indoc::indoc;

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
}

fn planner() -> DayPlanner {
    DayPlanner::new(date(), PlannerConfig::default()).unwrap()
}

fn iv(start: u32, end: u32) -> Interval {
    Interval::new(start, end).unwrap()
}

fn schedule(plan: &blockplan_core::DayPlan) -> Vec<(String, u32, u32)> {
    plan.result
        .blocks()
        .iter()
        .map(|b| (b.title(), b.interval.start(), b.interval.end()))
        .collect()
}

const BUILD_BLOCKS: &str = indoc! {"
    ## Wins
    Finished the report

    Build Blocks (Tomorrow's System)
    Task — X min
    Meet with Chris 2 hours
    accounting homework 1 hour
    python homework 1 hour
    internship applications 1 hour + SEO 30 min
"};

#[test]
fn build_blocks_pack_the_morning() {
    let plan = planner().plan(BUILD_BLOCKS, &[]).unwrap();

    assert_eq!(
        schedule(&plan),
        vec![
            ("Meet with Chris".to_string(), 480, 600),
            ("accounting homework".to_string(), 600, 660),
            ("python homework".to_string(), 660, 720),
            ("internship applications".to_string(), 720, 780),
        ]
    );
    assert!(plan.result.unplaced().is_empty());
    assert!(plan.result.warnings().is_empty());
}

#[test]
fn plus_fragment_is_dropped() {
    let item = parse_line("internship applications 1 hour + SEO 30 min");
    assert_eq!(item.label, "internship applications");
    assert_eq!(item.kind, PlanItemKind::SequentialDuration { duration: 60 });
}

#[test]
fn explicit_range_conflicting_with_calendar_is_kept() {
    let busy = [BusyEvent::new(iv(600, 660))];
    let plan = planner().plan("10:30-11:30: task", &busy).unwrap();

    assert_eq!(schedule(&plan), vec![("task".to_string(), 630, 690)]);
    let warnings = plan.result.warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].kind, WarningKind::Conflict);
    assert!(warnings[0]
        .message
        .starts_with("WARNING: conflict with existing calendar event"));
}

#[test]
fn sequential_items_flow_around_commitments() {
    let text = indoc! {"
        # Plan for tomorrow
        - [HIGH] Write proposal 90 min
        - 10:00-11:00: Team sync
        - Deep work on parser 2 hours
        - Review PRs
    "};
    let busy = [BusyEvent::new(iv(720, 780)).with_title("Lunch")];

    let plan = planner().plan(text, &busy).unwrap();

    assert_eq!(
        schedule(&plan),
        vec![
            ("Write proposal".to_string(), 480, 570),
            ("Team sync".to_string(), 600, 660),
            ("Deep work on parser (1/2)".to_string(), 660, 720),
            ("Deep work on parser (2/2)".to_string(), 780, 840),
        ]
    );
    // "Review PRs" carries no duration and no clock: it stays unparsed.
    assert_eq!(plan.result.unplaced().len(), 1);
    assert_eq!(plan.result.unplaced()[0].reason, UnplacedReason::Unparsed);
}

#[test]
fn unplaceable_item_leaves_later_items_alone() {
    let config = PlannerConfig {
        day_end: 720,
        ..PlannerConfig::default()
    };
    let text = "Meet with Chris 2 hours\nAccounting 90 min\nPython 1 hour\nEmail 30 min\n";

    let plan = DayPlanner::new(date(), config).unwrap().plan(text, &[]).unwrap();

    let labels: Vec<_> = schedule(&plan).into_iter().map(|(label, ..)| label).collect();
    assert_eq!(labels, vec!["Meet with Chris", "Accounting", "Email"]);
    assert_eq!(plan.result.unplaced()[0].item.label, "Python");
    assert_eq!(plan.result.unplaced()[0].reason, UnplacedReason::NoAvailableWindow);
}

#[test]
fn empty_text_gives_empty_result() {
    let plan = planner().plan("", &[BusyEvent::new(iv(540, 600))]).unwrap();
    assert!(plan.result.blocks().is_empty());
    assert!(plan.result.unplaced().is_empty());
    assert!(plan.result.warnings().is_empty());
}

#[test]
fn allocation_is_deterministic() {
    let busy = [BusyEvent::new(iv(600, 660)).with_title("Standup")];
    let first = planner().plan(BUILD_BLOCKS, &busy).unwrap();
    let second = planner().plan(BUILD_BLOCKS, &busy).unwrap();

    assert_eq!(first.result, second.result);
    assert_eq!(first.event_drafts(), second.event_drafts());
}

#[test]
fn rerun_against_own_output_adds_nothing() {
    let first = planner().plan(BUILD_BLOCKS, &[]).unwrap();
    let calendar: Vec<BusyEvent> = first
        .result
        .blocks()
        .iter()
        .map(|b| BusyEvent::new(b.interval).with_title(b.title()))
        .collect();

    let second = planner().plan(BUILD_BLOCKS, &calendar).unwrap();

    assert!(second.result.blocks().is_empty());
    assert!(second
        .result
        .unplaced()
        .iter()
        .all(|u| u.reason == UnplacedReason::DuplicateOfExistingEvent));
}

#[test]
fn rerun_with_split_deep_work_adds_nothing() {
    let text = "Deep work on parser 2 hours\nEmail 30 min\n";
    let first = planner().plan(text, &[]).unwrap();
    assert_eq!(first.result.blocks().len(), 3);
    let calendar: Vec<BusyEvent> = first
        .result
        .blocks()
        .iter()
        .map(|b| BusyEvent::new(b.interval).with_title(b.title()))
        .collect();

    let second = planner().plan(text, &calendar).unwrap();

    assert!(second.result.blocks().is_empty());
    assert_eq!(second.result.unplaced().len(), 2);
}

#[test]
fn timed_item_sharing_a_word_with_calendar_is_kept() {
    let busy = [BusyEvent::new(iv(600, 660)).with_title("Call with recruiter")];

    let plan = planner().plan("10:30-11:30: Call", &busy).unwrap();

    assert_eq!(schedule(&plan), vec![("Call".to_string(), 630, 690)]);
    assert_eq!(plan.result.warnings()[0].kind, WarningKind::Conflict);
}

#[test]
fn journal_sentences_do_not_open_the_plan() {
    let text = indoc! {"
        ## Reflection
        I want to rest tomorrow
        Slept 7 hours

        ## Build Blocks
        Read 30 min
    "};

    let plan = planner().plan(text, &[]).unwrap();

    assert_eq!(schedule(&plan), vec![("Read".to_string(), 480, 510)]);
}

#[test]
fn blocks_never_overlap_each_other_or_busy_time() {
    let day = WorkingDay::new(date(), 420, 1260).unwrap();
    let busy = [iv(540, 600), iv(690, 750), iv(900, 960)];
    let windows = free_windows(&day, &busy);
    let items: Vec<_> = [
        "Email 30 min",
        "Write chapter 2 hours",
        "Gym 1 hour",
        "Call bank 15 min",
        "Read 45 min",
    ]
    .iter()
    .map(|line| parse_line(line))
    .collect();

    let result = Allocator::new().allocate(&items, &windows).unwrap();

    let blocks = result.blocks();
    assert_eq!(blocks.len(), items.len());
    for (i, a) in blocks.iter().enumerate() {
        assert!(windows.iter().any(|w| w.contains(&a.interval)));
        for b in &blocks[i + 1..] {
            assert!(!a.interval.overlaps(&b.interval));
        }
    }
}
