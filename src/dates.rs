use chrono::{Datelike, NaiveDate};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum RangeError {
    #[error("end date {end} is before start date {start}")]
    Inverted { start: NaiveDate, end: NaiveDate },
}

/// Inclusive span of calendar days processed by one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, RangeError> {
        if end < start {
            return Err(RangeError::Inverted { start, end });
        }
        Ok(DateRange { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days in the range, both endpoints included.
    pub fn len(&self) -> usize {
        ((self.end - self.start).num_days() + 1) as usize
    }

    pub fn iter(&self) -> Days {
        Days {
            next: Some(self.start),
            end: self.end,
        }
    }

    /// The calendar widget is read on the last day of each month and on the final day of the run.
    pub fn is_trigger(&self, date: NaiveDate) -> bool {
        is_month_end(date) || date == self.end
    }

    /// `Some(year)` when the range is exactly Jan 1 - Dec 31 of one year.
    pub fn full_year(&self) -> Option<i32> {
        let year = self.start.year();
        let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)?;
        let dec31 = NaiveDate::from_ymd_opt(year, 12, 31)?;
        (self.start == jan1 && self.end == dec31).then_some(year)
    }

    /// Suffix used in output file names.
    pub fn file_suffix(&self) -> String {
        match self.full_year() {
            Some(year) => year.to_string(),
            None => format!("{}_to_{}", self.start, self.end),
        }
    }
}

impl IntoIterator for &DateRange {
    type Item = NaiveDate;
    type IntoIter = Days;

    fn into_iter(self) -> Days {
        self.iter()
    }
}

/// Day-by-day walk over a `DateRange`.
pub struct Days {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl Iterator for Days {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next.filter(|d| *d <= self.end)?;
        self.next = current.succ_opt();
        Some(current)
    }
}

pub fn is_month_end(date: NaiveDate) -> bool {
    date.succ_opt().map_or(true, |next| next.month() != date.month())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn inverted_range_rejected() {
        let err = DateRange::new(d("2012-03-02"), d("2012-03-01")).unwrap_err();
        assert_eq!(
            err,
            RangeError::Inverted {
                start: d("2012-03-02"),
                end: d("2012-03-01")
            }
        );
    }

    #[test]
    fn single_day_range() {
        let r = DateRange::new(d("2012-06-18"), d("2012-06-18")).unwrap();
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![d("2012-06-18")]);
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn crosses_leap_day_and_year_end() {
        let r = DateRange::new(d("2011-12-30"), d("2012-03-01")).unwrap();
        let days: Vec<_> = r.iter().collect();
        assert_eq!(days.len(), r.len());
        assert_eq!(days.len(), 63);
        assert_eq!(days.first(), Some(&d("2011-12-30")));
        assert_eq!(days.last(), Some(&d("2012-03-01")));
        assert!(days.contains(&d("2012-02-29")));
        for pair in days.windows(2) {
            assert_eq!(pair[0].succ_opt(), Some(pair[1]));
        }
    }

    #[test]
    fn iteration_is_restartable() {
        let r = DateRange::new(d("2013-01-30"), d("2013-02-02")).unwrap();
        let first: Vec<_> = r.iter().collect();
        let second: Vec<_> = (&r).into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn month_end_detection() {
        assert!(is_month_end(d("2012-02-29")));
        assert!(!is_month_end(d("2013-02-27")));
        assert!(is_month_end(d("2013-02-28")));
        assert!(is_month_end(d("2012-12-31")));
        assert!(!is_month_end(d("2012-04-15")));
    }

    #[test]
    fn trigger_on_range_end() {
        let r = DateRange::new(d("2012-04-01"), d("2012-04-10")).unwrap();
        assert!(!r.is_trigger(d("2012-04-09")));
        assert!(r.is_trigger(d("2012-04-10")));
    }

    #[test]
    fn file_suffix_full_year() {
        let r = DateRange::new(d("2012-01-01"), d("2012-12-31")).unwrap();
        assert_eq!(r.full_year(), Some(2012));
        assert_eq!(r.file_suffix(), "2012");
    }

    #[test]
    fn file_suffix_partial_range() {
        let r = DateRange::new(d("2012-01-01"), d("2012-12-30")).unwrap();
        assert_eq!(r.full_year(), None);
        assert_eq!(r.file_suffix(), "2012-01-01_to_2012-12-30");

        let r = DateRange::new(d("2012-01-01"), d("2013-12-31")).unwrap();
        assert_eq!(r.file_suffix(), "2012-01-01_to_2013-12-31");
    }
}
