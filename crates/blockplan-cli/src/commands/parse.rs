use std::path::{Path, PathBuf};

use blockplan_core::{PlanItem, RawPlanLine};
use clap::Args;
use serde::Serialize;

use super::input::{load_config, read_text, DayArgs};

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Plan text file, stdin when omitted or "-"
    pub file: Option<PathBuf>,
    /// Print extracted lines and items as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ParsedLine<'a> {
    line: &'a RawPlanLine,
    item: &'a PlanItem,
}

pub fn run(args: ParseArgs, config: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config)?;
    let planner = DayArgs::default().planner(&config)?;
    let text = read_text(args.file.as_deref())?;

    let (lines, items) = planner.parse(&text);

    if args.json {
        let parsed: Vec<ParsedLine<'_>> = lines
            .iter()
            .zip(&items)
            .map(|(line, item)| ParsedLine { line, item })
            .collect();
        println!("{}", serde_json::to_string_pretty(&parsed)?);
        return Ok(());
    }

    for (line, item) in lines.iter().zip(&items) {
        println!("{:>4}  {:<20} {}", line.index + 1, item.kind.as_str(), item.render());
    }
    Ok(())
}
