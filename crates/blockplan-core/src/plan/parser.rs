//! Time-expression parser for single plan lines.
//!
//! Grammars are tried in a fixed order, first match wins:
//! 1. `9:00-10:30: Deep work`, `2pm-4pm Customer calls`
//! 2. `14:00: Review PRs (1 hour)`, `3pm: Team sync`
//! 3. `accounting homework 1 hour`, `Deep work session — 90 min`
//!
//! Anything else becomes [`PlanItemKind::Unparsed`]. Parsing never fails.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use super::{PlanItem, PlanItemKind, Priority, RawPlanLine};
use crate::scheduler::duration::{resolve_duration, DurationConfig};
use crate::timeline::MINUTES_PER_DAY;

const TIME: &str = r"(?P<{h}>\d{1,2})(?::(?P<{m}>\d{2}))?\s*(?P<{s}>a\.m\.|p\.m\.|am\b|pm\b)?";
const UNIT: &str = r"hours?|hrs?|h|minutes?|mins?|m";

fn time_pattern(suffix: &str) -> String {
    TIME.replace("{h}", &format!("h{suffix}"))
        .replace("{m}", &format!("m{suffix}"))
        .replace("{s}", &format!("s{suffix}"))
}

static RE_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^{}\s*(?:-|–|—|\bto\b)\s*{}\s*(?P<sep>[:\-–—])?\s*(?P<desc>.+)$",
        time_pattern("1"),
        time_pattern("2"),
    ))
    .unwrap()
});

static RE_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^{}\s*(?P<sep>[:\-–—])?\s*(?P<desc>.+)$",
        time_pattern("1"),
    ))
    .unwrap()
});

static RE_DURATION_TAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)^(?P<label>.*?)\s*(?:[—–:\-]\s*)?(?:\(\s*(?P<pn>\d+(?:\.\d+)?)\s*(?P<pu>{UNIT})\s*\)|(?P<n>\d+(?:\.\d+)?)\s*(?P<u>{UNIT}))\.?$"
    ))
    .unwrap()
});

static RE_LEADING_UNIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i)^(?:{UNIT})\b")).unwrap());

static RE_PRIORITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\[\s*(high|normal|low)\s*\]").unwrap());

static RE_JOINER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s\+").unwrap());

/// A grammar: cleaned line in, label and anchoring out.
type Matcher = fn(&str, &DurationConfig) -> Option<(String, PlanItemKind)>;

const MATCHERS: &[Matcher] = &[match_range, match_start, match_sequential];

/// Parser for plan lines.
///
/// Holds the duration settings used when an explicit start time has no
/// written duration.
#[derive(Debug, Clone, Default)]
pub struct PlanParser {
    durations: DurationConfig,
}

impl PlanParser {
    pub fn new(durations: DurationConfig) -> Self {
        Self { durations }
    }

    /// Parse one line into a plan item.
    pub fn parse(&self, line: &str) -> PlanItem {
        let (text, priority) = preprocess(line);

        for matcher in MATCHERS {
            if let Some((label, kind)) = matcher(&text, &self.durations) {
                return PlanItem::with_kind(label, kind).with_priority(priority);
            }
        }

        debug!(line = %line.trim(), "no grammar matched plan line");
        let label = if text.is_empty() { line.trim() } else { text.as_str() };
        let label = if label.is_empty() { "<empty line>" } else { label };
        PlanItem::unparsed(label).with_priority(priority)
    }

    /// Parse extracted lines, keeping their source line indexes.
    pub fn parse_lines(&self, lines: &[RawPlanLine]) -> Vec<PlanItem> {
        lines
            .iter()
            .map(|raw| self.parse(&raw.text).with_line(raw.index))
            .collect()
    }
}

/// Parse one line with default duration settings.
pub fn parse_line(line: &str) -> PlanItem {
    PlanParser::default().parse(line)
}

/// Drop everything from the first whitespace-led `+`, pull out priority
/// markers and collapse whitespace.
fn preprocess(line: &str) -> (String, Priority) {
    let head = match RE_JOINER.find(line) {
        Some(joiner) => &line[..joiner.start()],
        None => line,
    };

    let mut priority = Priority::Normal;
    for caps in RE_PRIORITY.captures_iter(head) {
        priority = match caps[1].to_lowercase().as_str() {
            "high" => Priority::High,
            "low" => Priority::Low,
            _ => Priority::Normal,
        };
    }

    let stripped = RE_PRIORITY.replace_all(head, " ");
    let text = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    (text, priority)
}

fn match_range(text: &str, _: &DurationConfig) -> Option<(String, PlanItemKind)> {
    let caps = RE_RANGE.captures(text)?;
    let desc = caps.name("desc")?.as_str();

    // "1-2 hours reading" is a duration, not a range.
    if RE_LEADING_UNIT.is_match(desc) {
        return None;
    }
    // "2-3 chapters" needs some sign that it is a clock range.
    let clock_like = caps.name("m1").is_some()
        || caps.name("s1").is_some()
        || caps.name("m2").is_some()
        || caps.name("s2").is_some()
        || caps.name("sep").is_some();
    if !clock_like {
        return None;
    }

    let label = clean_label(desc)?;
    let (start, end) = range_minutes(&caps)?;
    Some((label, PlanItemKind::ExplicitRange { start, end }))
}

fn match_start(text: &str, durations: &DurationConfig) -> Option<(String, PlanItemKind)> {
    // A range that failed validation (e.g. crossing midnight) must not be
    // re-read as a start time followed by a description.
    if RE_RANGE.is_match(text) {
        return None;
    }
    let caps = RE_START.captures(text)?;
    if caps.name("m1").is_none() && caps.name("s1").is_none() {
        return None;
    }

    let start = clock_minutes(
        number(&caps, "h1")?,
        optional_number(&caps, "m1")?,
        suffix(&caps, "s1"),
    )?;
    let desc = caps.name("desc")?.as_str();

    let (label, duration) = match split_duration_tail(desc) {
        Some((label, minutes)) => (label, minutes),
        None => {
            let label = clean_label(desc)?;
            let minutes = resolve_duration(&label, None, durations);
            (label, minutes)
        }
    };
    Some((label, PlanItemKind::ExplicitStart { start, duration }))
}

fn match_sequential(text: &str, _: &DurationConfig) -> Option<(String, PlanItemKind)> {
    let (label, duration) = split_duration_tail(text)?;
    Some((label, PlanItemKind::SequentialDuration { duration }))
}

/// Split `label [—] N unit` or `label (N unit)` into label and minutes.
fn split_duration_tail(text: &str) -> Option<(String, u32)> {
    let caps = RE_DURATION_TAIL.captures(text)?;
    let label = clean_label(caps.name("label")?.as_str())?;
    let (amount, unit) = match (caps.name("pn"), caps.name("pu")) {
        (Some(n), Some(u)) => (n.as_str(), u.as_str()),
        _ => (caps.name("n")?.as_str(), caps.name("u")?.as_str()),
    };
    let minutes = duration_minutes(amount, unit)?;
    Some((label, minutes))
}

fn duration_minutes(amount: &str, unit: &str) -> Option<u32> {
    let amount: f64 = amount.parse().ok()?;
    let per_unit = if unit.to_lowercase().starts_with('h') { 60.0 } else { 1.0 };
    let minutes = (amount * per_unit).round();
    if minutes < 1.0 || minutes > f64::from(MINUTES_PER_DAY) {
        return None;
    }
    Some(minutes as u32)
}

/// Start/end of a range match. A missing first suffix borrows the second
/// one when that keeps the range forward (`10-11pm` is 22:00-23:00).
fn range_minutes(caps: &Captures<'_>) -> Option<(u32, u32)> {
    let h1 = number(caps, "h1")?;
    let m1 = optional_number(caps, "m1")?;
    let h2 = number(caps, "h2")?;
    let m2 = optional_number(caps, "m2")?;
    let s1 = suffix(caps, "s1");
    let s2 = suffix(caps, "s2");

    let end = if h2 == 24 && m2 == 0 && s2.is_none() {
        MINUTES_PER_DAY
    } else {
        clock_minutes(h2, m2, s2)?
    };

    if s1.is_none() && s2.is_some() {
        if let Some(start) = clock_minutes(h1, m1, s2) {
            if start < end {
                return Some((start, end));
            }
        }
    }

    let start = clock_minutes(h1, m1, s1)?;
    (start < end).then_some((start, end))
}

/// Convert clock components to minutes from midnight.
///
/// Without a suffix, hours 1-7 are afternoon (a bare `4:00` in an evening
/// plan means 16:00), 8-23 are taken literally and 0 is midnight.
fn clock_minutes(hour: u32, minute: u32, suffix: Option<Meridiem>) -> Option<u32> {
    if minute > 59 {
        return None;
    }
    let hour = match suffix {
        Some(meridiem) => {
            if !(1..=12).contains(&hour) {
                return None;
            }
            match (hour, meridiem) {
                (12, Meridiem::Am) => 0,
                (12, Meridiem::Pm) => 12,
                (h, Meridiem::Am) => h,
                (h, Meridiem::Pm) => h + 12,
            }
        }
        None => match hour {
            0 => 0,
            1..=7 => hour + 12,
            8..=23 => hour,
            _ => return None,
        },
    };
    Some(hour * 60 + minute)
}

#[derive(Debug, Clone, Copy)]
enum Meridiem {
    Am,
    Pm,
}

fn suffix(caps: &Captures<'_>, name: &str) -> Option<Meridiem> {
    let raw = caps.name(name)?.as_str().to_lowercase();
    if raw.starts_with('p') {
        Some(Meridiem::Pm)
    } else {
        Some(Meridiem::Am)
    }
}

fn number(caps: &Captures<'_>, name: &str) -> Option<u32> {
    caps.name(name)?.as_str().parse().ok()
}

/// `Some(0)` when the group is absent, `None` when it is present but bad.
fn optional_number(caps: &Captures<'_>, name: &str) -> Option<u32> {
    match caps.name(name) {
        Some(m) => m.as_str().parse().ok(),
        None => Some(0),
    }
}

/// Trim whitespace and dangling separators; `None` when nothing is left.
fn clean_label(raw: &str) -> Option<String> {
    let label = raw
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, ':' | '-' | '–' | '—'))
        .to_string();
    (!label.is_empty()).then_some(label)
}
