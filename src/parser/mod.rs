pub mod document;
pub mod extract;
pub mod patterns;

use thiserror::Error;

use crate::records::{ContributorRecord, SeverityCalendarRecord};

pub use extract::extract_day;

/// The page no longer has the shape the extractor expects.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    #[error("gauge heading has no leading word: {0:?}")]
    Heading(String),
    #[error("missing {0}")]
    MissingElement(&'static str),
    #[error("no percentage in needle style {0:?}")]
    SeverityPercent(String),
    #[error("needle percentage {0} outside 0-100")]
    PercentOutOfRange(f64),
    #[error("calendar day number is not a number: {0:?}")]
    DayNumber(String),
    #[error("calendar day {day} does not exist in {year}-{month:02}")]
    CalendarDate { year: i32, month: u32, day: u32 },
}

/// Everything pulled from one day's page.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DayExtract {
    /// `None` when the page has no daily count (weekends, holidays).
    pub count: Option<String>,
    pub contributors: Vec<ContributorRecord>,
    pub severities: Vec<SeverityCalendarRecord>,
}
