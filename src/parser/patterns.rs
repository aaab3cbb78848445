use std::sync::LazyLock;

use regex::Regex;

static LEADING_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\w+").unwrap());
static PERCENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(-?[\d.]+)%").unwrap());
static CALENDAR_TIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^calendar-day\s+current\s+(\S.*)$").unwrap());

/// First word of a gauge heading, e.g. "Trees" from "Trees (Moderate)".
pub fn leading_word(text: &str) -> Option<&str> {
    LEADING_WORD_RE.find(text.trim()).map(|m| m.as_str())
}

/// Number right before the first `%` in a style string such as `left: 80%`.
/// `None` when there is no match or the digits do not form a number. A leading
/// minus is kept so the caller's range check sees it.
pub fn percent_before_sign(style: &str) -> Option<f64> {
    let caps = PERCENT_RE.captures(style)?;
    caps[1].parse::<f64>().ok()
}

/// Tier from a calendar cell class list (`calendar-day current high` -> `high`).
/// Filler cells from neighbouring months lack `current` and yield `None`.
pub fn calendar_tier(class_attr: &str) -> Option<String> {
    let normalized = class_attr.split_whitespace().collect::<Vec<_>>().join(" ");
    CALENDAR_TIER_RE
        .captures(&normalized)
        .map(|caps| caps[1].trim().to_string())
}
