use chrono::{Duration, NaiveDate};
use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint, Ranged};
use std::ops::Range;

/// A date x axis whose labels sit exactly on a precomputed tick list.
#[derive(Debug, Clone, PartialEq)]
pub struct TickedDateRange {
    start: NaiveDate,
    end: NaiveDate,
    ticks: Vec<NaiveDate>,
}

impl TickedDateRange {
    /// Span `first..=last` (at least one day wide) labeled at `ticks`.
    pub fn new(first: NaiveDate, last: NaiveDate, ticks: Vec<NaiveDate>) -> Self {
        let end = if last > first {
            last
        } else {
            first + Duration::days(1)
        };
        Self {
            start: first,
            end,
            ticks,
        }
    }

    pub fn ticks(&self) -> &[NaiveDate] {
        &self.ticks
    }
}

impl Ranged for TickedDateRange {
    type FormatOption = DefaultFormatting;
    type ValueType = NaiveDate;

    fn map(&self, value: &NaiveDate, limit: (i32, i32)) -> i32 {
        let span = (self.end - self.start).num_days() as f64;
        let offset = (*value - self.start).num_days() as f64;
        limit.0 + ((limit.1 - limit.0) as f64 * offset / span).round() as i32
    }

    fn key_points<Hint: KeyPointHint>(&self, _hint: Hint) -> Vec<NaiveDate> {
        self.ticks.clone()
    }

    fn range(&self) -> Range<NaiveDate> {
        self.start..self.end
    }
}
