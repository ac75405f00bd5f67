use std::path::{Path, PathBuf};

use blockplan_core::{DayPlan, Interval, PlanItem, PlanItemKind};
use clap::Args;

use super::input::{load_config, read_text, DayArgs};

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Plan text file, stdin when omitted or "-"
    pub file: Option<PathBuf>,
    #[command(flatten)]
    pub day: DayArgs,
    /// Input is a JSON array of structured plan items instead of plan text
    #[arg(long)]
    pub items: bool,
    /// Print the schedule result as JSON
    #[arg(long, conflicts_with = "events")]
    pub json: bool,
    /// Print calendar event drafts as JSON
    #[arg(long)]
    pub events: bool,
}

pub fn run(args: PlanArgs, config: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config)?;
    let planner = args.day.planner(&config)?;
    let text = read_text(args.file.as_deref())?;
    let busy = args.day.busy_events()?;

    let plan = if args.items {
        let items: Vec<PlanItem> = serde_json::from_str(&text)?;
        planner.plan_items(items, &busy)?
    } else {
        planner.plan(&text, &busy)?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan.result)?);
    } else if args.events {
        println!("{}", serde_json::to_string_pretty(&plan.event_drafts())?);
    } else {
        print_agenda(&plan);
    }
    Ok(())
}

fn print_agenda(plan: &DayPlan) {
    let result = &plan.result;
    println!("Plan for {}", plan.date);

    if result.blocks().is_empty() {
        println!("  (nothing scheduled)");
    }
    for block in result.blocks() {
        let marker = block
            .priority
            .marker()
            .map(|m| format!("{m} "))
            .unwrap_or_default();
        println!("  {}  {}{}", block.interval, marker, block.title());
    }

    if !result.unplaced().is_empty() {
        println!();
        println!("Unplaced:");
        for unplaced in result.unplaced() {
            let wanted = match unplaced.item.kind {
                PlanItemKind::ExplicitRange { start, end } => Interval::new(start, end)
                    .map(|i| format!(" [{i}]"))
                    .unwrap_or_default(),
                PlanItemKind::ExplicitStart { duration, .. }
                | PlanItemKind::SequentialDuration { duration } => format!(" [{duration} min]"),
                PlanItemKind::Unparsed => String::new(),
            };
            println!("  {}{} ({})", unplaced.item.label, wanted, unplaced.reason);
        }
    }

    if !result.warnings().is_empty() {
        println!();
        println!("Warnings:");
        for warning in result.warnings() {
            println!("  {warning}");
        }
    }
}
