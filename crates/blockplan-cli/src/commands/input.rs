//! Shared argument handling: plan text, busy events, config and date.

use std::io::Read;
use std::path::{Path, PathBuf};

use blockplan_core::{BusyEvent, Config, DayPlanner, Interval};
use chrono::NaiveDate;
use clap::Args;
use serde::Deserialize;

/// Arguments describing the day to plan against.
#[derive(Args, Debug, Clone, Default)]
pub struct DayArgs {
    /// Target date (YYYY-MM-DD), defaults to tomorrow
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// Busy interval as HH:MM-HH:MM, optionally followed by =Title
    #[arg(long = "busy", value_name = "HH:MM-HH:MM[=TITLE]")]
    pub busy: Vec<String>,
    /// JSON file with busy events: [{"title": "...", "start": "HH:MM", "end": "HH:MM"}]
    #[arg(long, value_name = "PATH")]
    pub busy_file: Option<PathBuf>,
}

#[derive(Deserialize)]
struct BusyEntry {
    #[serde(default)]
    title: Option<String>,
    start: String,
    end: String,
}

impl DayArgs {
    pub fn date(&self) -> Result<NaiveDate, Box<dyn std::error::Error>> {
        match self.date {
            Some(date) => Ok(date),
            None => chrono::Local::now()
                .date_naive()
                .succ_opt()
                .ok_or_else(|| "cannot compute tomorrow's date".into()),
        }
    }

    /// Busy events from `--busy` flags followed by `--busy-file` entries.
    pub fn busy_events(&self) -> Result<Vec<BusyEvent>, Box<dyn std::error::Error>> {
        let mut events = self
            .busy
            .iter()
            .map(|spec| parse_busy_spec(spec))
            .collect::<Result<Vec<_>, _>>()?;

        if let Some(path) = &self.busy_file {
            let content = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
            let entries: Vec<BusyEntry> = serde_json::from_str(&content)?;
            for entry in entries {
                let interval: Interval = format!("{}-{}", entry.start, entry.end).parse()?;
                let event = BusyEvent::new(interval);
                events.push(match entry.title {
                    Some(title) => event.with_title(title),
                    None => event,
                });
            }
        }
        Ok(events)
    }

    /// Planner for the target date using `config`.
    pub fn planner(&self, config: &Config) -> Result<DayPlanner, Box<dyn std::error::Error>> {
        Ok(DayPlanner::new(self.date()?, config.to_planner_config()?)?)
    }
}

/// Parse `HH:MM-HH:MM[=Title]`.
pub fn parse_busy_spec(spec: &str) -> Result<BusyEvent, Box<dyn std::error::Error>> {
    let (range, title) = match spec.split_once('=') {
        Some((range, title)) => (range, Some(title.trim())),
        None => (spec, None),
    };
    let event = BusyEvent::new(range.trim().parse()?);
    Ok(match title {
        Some(title) if !title.is_empty() => event.with_title(title),
        _ => event,
    })
}

/// Read plan text from a file, or stdin when absent or `-`.
pub fn read_text(file: Option<&Path>) -> std::io::Result<String> {
    match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path),
        _ => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Config file selected by `--config`, or the default location.
pub fn config_path(path: Option<&Path>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(Config::path()?),
    }
}

pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    Ok(Config::load_from(&config_path(path)?)?)
}
