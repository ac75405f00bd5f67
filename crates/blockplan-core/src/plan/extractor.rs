//! Plan-section extraction from free-form journal text.
//!
//! Finds the heading that opens the plan for the next day, collects the
//! lines under it and drops template placeholders, so only candidate task
//! lines reach the parser.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Heading phrases that open a planning section.
pub const DEFAULT_TRIGGER_PHRASES: &[&str] = &[
    "build blocks",
    "tomorrow's system",
    "tomorrow",
    "next day",
    "plan for",
    "schedule",
    "to do",
    "tasks for",
];

/// A candidate task line and its 0-based index in the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPlanLine {
    pub index: usize,
    pub text: String,
}

static RE_BULLET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[-*•·▪◦]\s*|\d{1,2}[.)]\s+)?(?:\[[ xX]?\]\s*|[☐☑✅]\s*)?").unwrap()
});

static RE_EMPTY_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[-*•·▪◦]|\d{1,2}[.)]|\[[ xX]?\]|[☐☑]|\s)*$").unwrap());

static RE_WRAPPED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[*_]*\(.*\)[*_]*|[*_]*\[.*\][*_]*|<.*>)$").unwrap()
});

static RE_PLACEHOLDER_DURATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b[xn]\s*(?:hours?|hrs?|minutes?|mins?)\b").unwrap());

/// Locates and cleans the plan section of a journal entry.
#[derive(Debug, Clone)]
pub struct PlanExtractor {
    trigger_phrases: Vec<String>,
    ignore_phrases: Vec<String>,
}

impl PlanExtractor {
    /// Create an extractor with the default trigger phrases
    pub fn new() -> Self {
        Self {
            trigger_phrases: DEFAULT_TRIGGER_PHRASES.iter().map(|p| p.to_string()).collect(),
            ignore_phrases: Vec::new(),
        }
    }

    /// Replace the heading trigger phrases
    pub fn with_triggers<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trigger_phrases = phrases.into_iter().map(|p| p.into().to_lowercase()).collect();
        self
    }

    /// Additional phrases marking template lines to drop
    pub fn with_ignored<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_phrases = phrases.into_iter().map(|p| p.into().to_lowercase()).collect();
        self
    }

    /// Extract candidate task lines in source order.
    ///
    /// When no trigger heading is present the whole text is treated as the
    /// plan, since callers often pass an already-extracted section.
    pub fn extract(&self, text: &str) -> Vec<RawPlanLine> {
        let lines: Vec<&str> = text.lines().collect();

        let section = match lines
            .iter()
            .position(|line| self.is_heading(line) && self.has_trigger(line))
        {
            Some(heading) => {
                let start = heading + 1;
                let end = lines[start..]
                    .iter()
                    .position(|line| self.is_heading(line) && !self.has_trigger(line))
                    .map_or(lines.len(), |offset| start + offset);
                debug!(heading = %lines[heading].trim(), start, end, "found plan section");
                start..end
            }
            None => 0..lines.len(),
        };

        lines[section.clone()]
            .iter()
            .zip(section)
            .filter(|(line, _)| !(self.is_heading(line) && self.has_trigger(line)))
            .filter_map(|(line, index)| {
                let cleaned = self.clean(line)?;
                Some(RawPlanLine {
                    index,
                    text: cleaned,
                })
            })
            .collect()
    }

    /// Strip bullet markers; `None` for noise lines.
    fn clean(&self, line: &str) -> Option<String> {
        let trimmed = line.trim();
        if trimmed.is_empty() || RE_EMPTY_MARKER.is_match(trimmed) {
            return None;
        }

        let body = RE_BULLET.replace(trimmed, "");
        let body = body.trim();
        if body.is_empty() || self.is_noise(body) {
            debug!(line = %trimmed, "dropped template line");
            return None;
        }
        Some(body.to_string())
    }

    fn is_noise(&self, body: &str) -> bool {
        if RE_WRAPPED.is_match(body) || RE_PLACEHOLDER_DURATION.is_match(body) {
            return true;
        }
        let lower = body.to_lowercase();
        self.ignore_phrases.iter().any(|p| lower.contains(p.as_str()))
    }

    fn has_trigger(&self, line: &str) -> bool {
        let lower = line.to_lowercase().replace('’', "'");
        self.trigger_phrases.iter().any(|p| lower.contains(p.as_str()))
    }

    /// Markdown headings and digit-free labels ending in `:`, plus
    /// heading-shaped lines that carry a trigger phrase. Lines with digits
    /// are task candidates.
    fn is_heading(&self, line: &str) -> bool {
        let trimmed = line.trim();
        if trimmed.starts_with('#') {
            return true;
        }
        if trimmed.chars().any(|c| c.is_ascii_digit()) {
            return false;
        }
        trimmed.ends_with(':') || self.is_title_line(trimmed)
    }

    /// A trigger line that reads as a title rather than a sentence: no
    /// closing punctuation, and every word of four or more letters is
    /// capitalised or belongs to a trigger phrase.
    fn is_title_line(&self, line: &str) -> bool {
        if !self.has_trigger(line) || line.ends_with(['.', '!', '?']) {
            return false;
        }
        let lower = line.to_lowercase().replace('’', "'");
        let trigger_words: Vec<&str> = self
            .trigger_phrases
            .iter()
            .filter(|p| lower.contains(p.as_str()))
            .flat_map(|p| p.split_whitespace())
            .collect();

        line.split_whitespace()
            .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|word| word.chars().filter(|c| c.is_alphabetic()).count() >= 4)
            .all(|word| {
                word.chars().next().is_some_and(char::is_uppercase)
                    || trigger_words.contains(&word.to_lowercase().replace('’', "'").as_str())
            })
    }
}

impl Default for PlanExtractor {
    fn default() -> Self {
        Self::new()
    }
}
