use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, info};

use crate::dates::DateRange;
use crate::pipeline::RunResults;
use crate::records::{CountRow, DailyCountRecord, SeverityCalendarRecord, Table};

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("calendar gives {date} two severity levels: {first:?} and {second:?}")]
    ConflictingSeverity {
        date: NaiveDate,
        first: String,
        second: String,
    },
    #[error("writing {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("creating {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Paths written by `write_all`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    pub counts: PathBuf,
    pub contributors: PathBuf,
    pub errors: PathBuf,
}

impl OutputFiles {
    pub fn for_range(dir: &Path, range: &DateRange) -> Self {
        let suffix = range.file_suffix();
        OutputFiles {
            counts: dir.join(format!("pollen_count_{}.csv", suffix)),
            contributors: dir.join(format!("pollen_count_contributors_{}.csv", suffix)),
            errors: dir.join(format!("pollen_count_errors_{}.csv", suffix)),
        }
    }
}

/// One severity level per date. Month-end and range-end pages can both report
/// the same day; identical repeats collapse, disagreements are an error.
pub fn dedupe_severities(
    severities: &[SeverityCalendarRecord],
) -> Result<BTreeMap<NaiveDate, &str>, OutputError> {
    let mut by_date: BTreeMap<NaiveDate, &str> = BTreeMap::new();
    for s in severities {
        match by_date.get(&s.date) {
            Some(existing) if *existing == s.severity_level => {
                debug!("duplicate calendar entry for {} dropped", s.date);
            }
            Some(existing) => {
                return Err(OutputError::ConflictingSeverity {
                    date: s.date,
                    first: existing.to_string(),
                    second: s.severity_level.clone(),
                });
            }
            None => {
                by_date.insert(s.date, &s.severity_level);
            }
        }
    }
    Ok(by_date)
}

/// Left join of daily counts onto calendar severity levels. Each count yields
/// exactly one row because `dedupe_severities` leaves at most one level per date.
pub fn join_severity(
    counts: &[DailyCountRecord],
    severities: &[SeverityCalendarRecord],
) -> Result<Vec<CountRow>, OutputError> {
    let by_date = dedupe_severities(severities)?;

    Ok(counts
        .iter()
        .map(|c| CountRow {
            date: c.date,
            pollen_count: c.pollen_count.clone(),
            severity_level: by_date.get(&c.date).map(|s| s.to_string()),
        })
        .collect())
}

/// Join, then write the counts, contributors and errors files into `dir`.
pub fn write_all(results: &RunResults, range: &DateRange, dir: &Path) -> Result<OutputFiles, OutputError> {
    let rows = join_severity(&results.counts, &results.severities)?;

    fs::create_dir_all(dir).map_err(|source| OutputError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let files = OutputFiles::for_range(dir, range);
    write_csv(&files.counts, &rows)?;
    write_csv(&files.contributors, &results.contributors)?;
    write_csv(&files.errors, &results.errors)?;

    info!(
        "Wrote {} count rows, {} contributor rows, {} error rows to {}",
        rows.len(),
        results.contributors.len(),
        results.errors.len(),
        dir.display()
    );
    Ok(files)
}

fn write_csv<T: Table>(path: &Path, rows: &[T]) -> Result<(), OutputError> {
    let wrap = |source: csv::Error| OutputError::Csv {
        path: path.to_path_buf(),
        source,
    };
    // Explicit header so an empty collection still gets one.
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(wrap)?;
    writer.write_record(T::HEADER).map_err(wrap)?;
    for row in rows {
        writer.serialize(row).map_err(wrap)?;
    }
    writer.flush().map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{ContributorRecord, ErrorKind, ErrorRecord};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn count(date: NaiveDate, n: &str) -> DailyCountRecord {
        DailyCountRecord {
            date,
            pollen_count: n.into(),
        }
    }

    fn level(date: NaiveDate, s: &str) -> SeverityCalendarRecord {
        SeverityCalendarRecord {
            date,
            severity_level: s.into(),
        }
    }

    #[test]
    fn left_join_keeps_every_count() {
        let counts = vec![count(d(2012, 4, 29), "88"), count(d(2012, 4, 30), "120")];
        let severities = vec![level(d(2012, 4, 28), "low"), level(d(2012, 4, 30), "high")];
        let rows = join_severity(&counts, &severities).unwrap();
        assert_eq!(rows.len(), counts.len());
        assert_eq!(rows[0].severity_level, None);
        assert_eq!(rows[1].severity_level.as_deref(), Some("high"));
    }

    #[test]
    fn identical_duplicates_collapse() {
        let counts = vec![count(d(2012, 4, 30), "120")];
        let severities = vec![level(d(2012, 4, 30), "high"), level(d(2012, 4, 30), "high")];
        let rows = join_severity(&counts, &severities).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].severity_level.as_deref(), Some("high"));
    }

    #[test]
    fn conflicting_duplicates_rejected() {
        let severities = vec![level(d(2012, 4, 30), "high"), level(d(2012, 4, 30), "low")];
        let err = dedupe_severities(&severities).unwrap_err();
        assert!(matches!(
            err,
            OutputError::ConflictingSeverity { ref first, ref second, .. } if first == "high" && second == "low"
        ));
    }

    #[test]
    fn conflicting_duplicates_fail_the_join() {
        let counts = vec![count(d(2012, 4, 30), "120")];
        let severities = vec![
            level(d(2012, 4, 30), "high"),
            level(d(2012, 4, 30), "high"),
            level(d(2012, 4, 30), "medium"),
        ];
        let err = join_severity(&counts, &severities).unwrap_err();
        assert!(matches!(err, OutputError::ConflictingSeverity { date, .. } if date == d(2012, 4, 30)));
    }

    #[test]
    fn conflicting_duplicates_block_writing() {
        let tmp = tempfile::tempdir().unwrap();
        let date = d(2012, 4, 30);
        let range = DateRange::new(date, date).unwrap();
        let results = RunResults {
            counts: vec![count(date, "120")],
            severities: vec![level(date, "high"), level(date, "low")],
            ..Default::default()
        };
        assert!(write_all(&results, &range, tmp.path()).is_err());
        assert!(!OutputFiles::for_range(tmp.path(), &range).counts.exists());
    }

    #[test]
    fn file_names_follow_range() {
        let dir = Path::new("data");
        let year = DateRange::new(d(2012, 1, 1), d(2012, 12, 31)).unwrap();
        let files = OutputFiles::for_range(dir, &year);
        assert_eq!(files.counts, dir.join("pollen_count_2012.csv"));
        assert_eq!(files.contributors, dir.join("pollen_count_contributors_2012.csv"));
        assert_eq!(files.errors, dir.join("pollen_count_errors_2012.csv"));

        let part = DateRange::new(d(2012, 3, 1), d(2012, 5, 31)).unwrap();
        let files = OutputFiles::for_range(dir, &part);
        assert_eq!(
            files.counts,
            dir.join("pollen_count_2012-03-01_to_2012-05-31.csv")
        );
        assert_eq!(
            files.contributors,
            dir.join("pollen_count_contributors_2012-03-01_to_2012-05-31.csv")
        );
    }

    #[test]
    fn writes_all_three_files() {
        let tmp = tempfile::tempdir().unwrap();
        let date = d(2012, 4, 17);
        let range = DateRange::new(date, d(2012, 4, 18)).unwrap();
        let results = RunResults {
            counts: vec![count(date, "45")],
            contributors: vec![
                ContributorRecord {
                    date,
                    contributor_type: "Trees".into(),
                    contributor_name: "Oak".into(),
                    severity_percent: 80.0,
                    severity_label: "High".into(),
                },
                ContributorRecord {
                    date,
                    contributor_type: "Weeds".into(),
                    contributor_name: "Ragweed, Plantain".into(),
                    severity_percent: 12.5,
                    severity_label: "Low".into(),
                },
            ],
            severities: vec![],
            errors: vec![ErrorRecord {
                date: d(2012, 4, 18),
                error_kind: ErrorKind::Transport,
                detail: "404 - Not Found".into(),
            }],
        };

        let out = tmp.path().join("nested");
        let files = write_all(&results, &range, &out).unwrap();

        let counts = std::fs::read_to_string(&files.counts).unwrap();
        assert_eq!(counts, "date,pollen_count,severity_level\n2012-04-17,45,\n");

        let contributors = std::fs::read_to_string(&files.contributors).unwrap();
        assert_eq!(
            contributors,
            "date,contributor_type,contributor_name,severity_percent,severity_label\n\
             2012-04-17,Trees,Oak,80,High\n\
             2012-04-17,Weeds,\"Ragweed, Plantain\",12.5,Low\n"
        );

        let errors = std::fs::read_to_string(&files.errors).unwrap();
        assert_eq!(
            errors,
            "date,error_kind,detail\n2012-04-18,Transport,404 - Not Found\n"
        );
    }

    #[test]
    fn empty_run_still_writes_headers() {
        let tmp = tempfile::tempdir().unwrap();
        let range = DateRange::new(d(2012, 4, 17), d(2012, 4, 17)).unwrap();
        let files = write_all(&RunResults::default(), &range, tmp.path()).unwrap();
        let counts = std::fs::read_to_string(&files.counts).unwrap();
        assert_eq!(counts, "date,pollen_count,severity_level\n");
    }
}
