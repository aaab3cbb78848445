use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use scraper::{ElementRef, Selector};

use super::document::{attr, first_within, text_of, Page};
use super::patterns::{calendar_tier, leading_word, percent_before_sign};
use super::{DayExtract, ExtractError};
use crate::records::{ContributorRecord, SeverityCalendarRecord};

static POLLEN_NUM: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body .pollen-num").unwrap());
static GAUGE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".gauge").unwrap());
static HEADING: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h5").unwrap());
static DESCRIPTION: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());
static NEEDLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".needle").unwrap());
static ACTIVE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".active").unwrap());
static CALENDAR_DAY: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".calendar-day").unwrap());
static DAY_NUM: LazyLock<Selector> = LazyLock::new(|| Selector::parse(".day-num").unwrap());

/// Mold gauges are rendered without a heading or description.
const HEADINGLESS_CATEGORY: &str = "Mold";

/// Pull the count, contributors and (when `calendar` is set) the month's
/// severity tiers out of one day's page.
pub fn extract_day(date: NaiveDate, raw: &str, calendar: bool) -> Result<DayExtract, ExtractError> {
    let page = Page::parse(raw);
    let mut out = DayExtract::default();

    if let Some(num) = page.find_first(&POLLEN_NUM) {
        out.count = Some(text_of(num));
        for gauge in page.find_all(&GAUGE) {
            out.contributors.push(read_gauge(date, gauge)?);
        }
    }

    // The calendar renders even when the day itself has no count.
    if calendar {
        out.severities = read_calendar(date, &page)?;
    }

    Ok(out)
}

fn read_gauge(date: NaiveDate, gauge: ElementRef<'_>) -> Result<ContributorRecord, ExtractError> {
    let (contributor_type, contributor_name) = match first_within(gauge, &HEADING) {
        Some(heading) => {
            let heading = text_of(heading);
            let kind = leading_word(&heading)
                .ok_or_else(|| ExtractError::Heading(heading.clone()))?
                .to_string();
            let name = first_within(gauge, &DESCRIPTION)
                .map(text_of)
                .ok_or(ExtractError::MissingElement("gauge description"))?;
            (kind, name)
        }
        None => (HEADINGLESS_CATEGORY.to_string(), HEADINGLESS_CATEGORY.to_string()),
    };

    let style = first_within(gauge, &NEEDLE)
        .ok_or(ExtractError::MissingElement("gauge needle"))
        .map(|needle| attr(needle, "style").unwrap_or_default())?;
    let severity_percent =
        percent_before_sign(style).ok_or_else(|| ExtractError::SeverityPercent(style.to_string()))?;
    if !(0.0..=100.0).contains(&severity_percent) {
        return Err(ExtractError::PercentOutOfRange(severity_percent));
    }

    let severity_label = first_within(gauge, &ACTIVE)
        .map(text_of)
        .ok_or(ExtractError::MissingElement("active severity label"))?;

    Ok(ContributorRecord {
        date,
        contributor_type,
        contributor_name,
        severity_percent,
        severity_label,
    })
}

/// Cells belong to the month of `date`; neighbouring-month filler cells are skipped.
fn read_calendar(date: NaiveDate, page: &Page) -> Result<Vec<SeverityCalendarRecord>, ExtractError> {
    let mut records = Vec::new();

    for cell in page.find_all(&CALENDAR_DAY) {
        let Some(severity_level) = attr(cell, "class").and_then(calendar_tier) else {
            continue;
        };

        let day_text = first_within(cell, &DAY_NUM)
            .map(text_of)
            .ok_or(ExtractError::MissingElement("calendar day number"))?;
        let day: u32 = day_text
            .parse()
            .map_err(|_| ExtractError::DayNumber(day_text.clone()))?;
        let cell_date = NaiveDate::from_ymd_opt(date.year(), date.month(), day).ok_or(
            ExtractError::CalendarDate {
                year: date.year(),
                month: date.month(),
                day,
            },
        )?;

        records.push(SeverityCalendarRecord {
            date: cell_date,
            severity_level,
        });
    }

    Ok(records)
}
