use std::fmt;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyCountRecord {
    pub date: NaiveDate,
    pub pollen_count: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributorRecord {
    pub date: NaiveDate,
    pub contributor_type: String,
    pub contributor_name: String,
    #[serde(serialize_with = "shortest_decimal")]
    pub severity_percent: f64,
    pub severity_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeverityCalendarRecord {
    pub date: NaiveDate,
    pub severity_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    /// Server answered with a non-200 status.
    Transport,
    /// Request never completed.
    Network,
    /// Page loaded but carried no daily count.
    MissingData,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorKind::Transport => "Request status",
            ErrorKind::Network => "Request failed",
            ErrorKind::MissingData => "Pollen count not available",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub date: NaiveDate,
    pub error_kind: ErrorKind,
    pub detail: String,
}

/// One row of the counts file: a daily count with its calendar tier, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountRow {
    pub date: NaiveDate,
    pub pollen_count: String,
    pub severity_level: Option<String>,
}

/// A record type written as one delimited file.
pub trait Table: Serialize {
    const HEADER: &'static [&'static str];
}

impl Table for CountRow {
    const HEADER: &'static [&'static str] = &["date", "pollen_count", "severity_level"];
}

impl Table for ContributorRecord {
    const HEADER: &'static [&'static str] = &[
        "date",
        "contributor_type",
        "contributor_name",
        "severity_percent",
        "severity_label",
    ];
}

impl Table for ErrorRecord {
    const HEADER: &'static [&'static str] = &["date", "error_kind", "detail"];
}

/// `80.0` is written as `80`, `12.5` stays `12.5`.
fn shortest_decimal<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
