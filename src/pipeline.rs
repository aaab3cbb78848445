use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::dates::DateRange;
use crate::fetch::PageSource;
use crate::parser::{extract_day, DayExtract, ExtractError};
use crate::records::{
    ContributorRecord, DailyCountRecord, ErrorKind, ErrorRecord, SeverityCalendarRecord,
};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("page for {date} ({url}) could not be parsed: {source}")]
    Extraction {
        date: NaiveDate,
        url: String,
        #[source]
        source: ExtractError,
    },
    #[error("{total} day(s) without exactly one count or error, first {first}")]
    Coverage { first: NaiveDate, total: usize },
}

/// Everything collected over one run, in date order.
#[derive(Debug, Default)]
pub struct RunResults {
    pub counts: Vec<DailyCountRecord>,
    pub contributors: Vec<ContributorRecord>,
    pub severities: Vec<SeverityCalendarRecord>,
    pub errors: Vec<ErrorRecord>,
}

impl RunResults {
    /// Fold one parsed page into the collections.
    pub fn absorb(&mut self, date: NaiveDate, day: DayExtract) {
        match day.count {
            Some(pollen_count) => {
                self.counts.push(DailyCountRecord { date, pollen_count });
                self.contributors.extend(day.contributors);
            }
            None => self.errors.push(ErrorRecord {
                date,
                error_kind: ErrorKind::MissingData,
                detail: "page has no daily count".to_string(),
            }),
        }
        self.severities.extend(day.severities);
    }

    pub fn record_error(&mut self, date: NaiveDate, error_kind: ErrorKind, detail: String) {
        self.errors.push(ErrorRecord {
            date,
            error_kind,
            detail,
        });
    }

    /// Days that do not have exactly one count or one error.
    pub fn coverage_gaps(&self, range: &DateRange) -> Vec<NaiveDate> {
        let mut seen: HashMap<NaiveDate, usize> = HashMap::new();
        let dates = self
            .counts
            .iter()
            .map(|c| c.date)
            .chain(self.errors.iter().map(|e| e.date));
        for date in dates {
            *seen.entry(date).or_default() += 1;
        }
        range
            .iter()
            .filter(|date| seen.get(date).copied().unwrap_or(0) != 1)
            .collect()
    }
}

/// Walk the range one day at a time: fetch, extract, accumulate.
pub async fn run<S: PageSource>(
    source: &S,
    range: &DateRange,
    delay: Duration,
) -> Result<RunResults, PipelineError> {
    let mut results = RunResults::default();

    let pb = ProgressBar::new(range.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    info!("Scraping {} days ({} to {})", range.len(), range.start(), range.end());

    for (i, date) in range.iter().enumerate() {
        pb.set_message(date.to_string());
        debug!("Starting {}", date);

        match source.fetch(date).await {
            Ok(page) => {
                let day = extract_day(date, &page, range.is_trigger(date)).map_err(|source_err| {
                    let url = source.locate(date);
                    error!("Extraction failed for {} ({}): {}", date, url, source_err);
                    PipelineError::Extraction {
                        date,
                        url,
                        source: source_err,
                    }
                })?;
                if day.count.is_none() {
                    warn!("{}: no pollen count on page", date);
                }
                results.absorb(date, day);
            }
            Err(e) => {
                warn!("{}: fetch failed: {}", date, e);
                results.record_error(date, e.kind(), e.to_string());
            }
        }

        pb.inc(1);
        if i + 1 < range.len() && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    pb.finish_and_clear();

    let gaps = results.coverage_gaps(range);
    if let Some(&first) = gaps.first() {
        return Err(PipelineError::Coverage {
            first,
            total: gaps.len(),
        });
    }

    info!(
        "Collected {} counts, {} contributors, {} calendar entries, {} errors",
        results.counts.len(),
        results.contributors.len(),
        results.severities.len(),
        results.errors.len()
    );
    Ok(results)
}
