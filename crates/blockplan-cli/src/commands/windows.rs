use std::path::Path;

use blockplan_core::timeline::total_minutes;
use clap::Args;

use super::input::{load_config, DayArgs};

#[derive(Args, Debug)]
pub struct WindowsArgs {
    #[command(flatten)]
    pub day: DayArgs,
    /// Print windows as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: WindowsArgs, config: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config)?;
    let planner = args.day.planner(&config)?;
    let busy = args.day.busy_events()?;

    let windows = planner.windows(&busy);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&windows)?);
        return Ok(());
    }

    for window in &windows {
        println!("{}  ({} min)", window, window.duration_minutes());
    }
    println!("{} min free", total_minutes(&windows));
    Ok(())
}
