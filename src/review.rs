use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

const NO_LEVEL: &str = "(none)";

#[derive(Debug, Clone, Deserialize)]
pub struct CountFileRow {
    pub date: NaiveDate,
    pub pollen_count: String,
    pub severity_level: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelSummary {
    pub records: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub min_count: Option<u64>,
    pub max_count: Option<u64>,
}

#[derive(Debug, Default)]
pub struct Review {
    pub total: usize,
    pub by_level: BTreeMap<String, LevelSummary>,
}

/// Counts files in `dir`, skipping the contributor and error outputs.
pub fn count_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("reading {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| {
                    name.starts_with("pollen_count_")
                        && name.ends_with(".csv")
                        && !name.contains("contributors")
                        && !name.contains("errors")
                })
        })
        .collect();
    files.sort();
    Ok(files)
}

pub fn load_rows(files: &[PathBuf]) -> Result<Vec<CountFileRow>> {
    let mut rows = Vec::new();
    for path in files {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("opening {}", path.display()))?;
        let before = rows.len();
        for row in reader.deserialize() {
            let row: CountFileRow = row.with_context(|| format!("parsing {}", path.display()))?;
            rows.push(row);
        }
        info!("{}: {} rows (running total {})", path.display(), rows.len() - before, rows.len());
    }
    Ok(rows)
}

/// Thousands separators are dropped; anything else non-numeric is ignored.
fn numeric_count(raw: &str) -> Option<u64> {
    raw.trim().replace(',', "").parse().ok()
}

pub fn summarize(rows: &[CountFileRow]) -> Review {
    let mut review = Review {
        total: rows.len(),
        ..Default::default()
    };

    for row in rows {
        let level = row
            .severity_level
            .as_deref()
            .filter(|l| !l.is_empty())
            .unwrap_or(NO_LEVEL);
        let count = numeric_count(&row.pollen_count);

        let entry = review
            .by_level
            .entry(level.to_string())
            .or_insert(LevelSummary {
                records: 0,
                first_date: row.date,
                last_date: row.date,
                min_count: None,
                max_count: None,
            });
        entry.records += 1;
        entry.first_date = entry.first_date.min(row.date);
        entry.last_date = entry.last_date.max(row.date);
        if let Some(c) = count {
            entry.min_count = Some(entry.min_count.map_or(c, |m| m.min(c)));
            entry.max_count = Some(entry.max_count.map_or(c, |m| m.max(c)));
        }
    }

    review
}

impl Review {
    pub fn print(&self) {
        println!("Total records: {}\n", self.total);
        println!(
            "{:<14} | {:>7} | {:<10} | {:<10} | {:>6} | {:>6}",
            "Severity", "Records", "First", "Last", "Min", "Max"
        );
        println!("{}", "-".repeat(68));
        for (level, s) in &self.by_level {
            let fmt = |v: Option<u64>| v.map(|n| n.to_string()).unwrap_or_else(|| "-".into());
            println!(
                "{:<14} | {:>7} | {:<10} | {:<10} | {:>6} | {:>6}",
                level,
                s.records,
                s.first_date,
                s.last_date,
                fmt(s.min_count),
                fmt(s.max_count)
            );
        }
    }
}
