//! Shared date axis and "zoom" cutoff for a set of location series.
//!
//! Locations with very different outbreak timing are drawn from a common
//! start date: the first day any of them crosses a case threshold. A strict
//! threshold is tried first and looser ones after it, so a set of low-volume
//! locations still gets a useful start date.

use chrono::NaiveDate;
use cv19_core::record::Metric;
use log::{debug, info};
use std::collections::BTreeSet;

use crate::series::Series;

/// Thresholds tried in order when picking the cutoff.
pub const DEFAULT_THRESHOLDS: [f64; 2] = [5.0, 1.0];

/// Sorted, de-duplicated dates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DateAxis(Vec<NaiveDate>);

impl DateAxis {
    /// The union of every series' dates.
    pub fn from_series(series: &[Series]) -> DateAxis {
        let dates: BTreeSet<NaiveDate> = series.iter().flat_map(|s| s.dates()).collect();
        DateAxis(dates.into_iter().collect())
    }

    pub fn from_dates<I: IntoIterator<Item = NaiveDate>>(dates: I) -> DateAxis {
        let dates: BTreeSet<NaiveDate> = dates.into_iter().collect();
        DateAxis(dates.into_iter().collect())
    }

    pub fn as_slice(&self) -> &[NaiveDate] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<NaiveDate> {
        self.0.first().copied()
    }

    pub fn last(&self) -> Option<NaiveDate> {
        self.0.last().copied()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.0.binary_search(&date).is_ok()
    }

    /// The dates on or after `cutoff`.
    pub fn narrowed(&self, cutoff: NaiveDate) -> DateAxis {
        DateAxis(self.0.iter().copied().filter(|d| *d >= cutoff).collect())
    }
}

/// Result of aligning a set of series.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    /// Every date seen across the series.
    pub axis: DateAxis,
    /// Date the chart starts from, `None` to use the whole axis.
    pub cutoff: Option<NaiveDate>,
}

impl Alignment {
    /// The axis narrowed to the cutoff.
    pub fn truncated_axis(&self) -> DateAxis {
        match self.cutoff {
            Some(cutoff) => self.axis.narrowed(cutoff),
            None => self.axis.clone(),
        }
    }
}

/// The sorted union of all dates in `series`.
pub fn combine_date_ranges(series: &[Series]) -> DateAxis {
    DateAxis::from_series(series)
}

/// Earliest date on which any series' `metric` is strictly above
/// `threshold`.
///
/// A candidate equal to the latest date across all series means nothing
/// crossed before the data ran out, and is treated as no cutoff.
pub fn find_cutoff(series: &[Series], metric: Metric, threshold: f64) -> Option<NaiveDate> {
    let latest = series.iter().map(|s| s.last_date()).max()?;
    let earliest_crossing = series
        .iter()
        .filter_map(|s| s.first_date_exceeding(metric, threshold))
        .min()?;
    if earliest_crossing == latest {
        debug!(
            "find_cutoff: {} > {} only on the last day ({})",
            metric.field_name(),
            threshold,
            latest
        );
        return None;
    }
    Some(earliest_crossing)
}

/// Build the shared axis and pick the cutoff, trying `thresholds` in order.
pub fn align(series: &[Series], metric: Metric, thresholds: &[f64]) -> Alignment {
    let axis = combine_date_ranges(series);
    let cutoff = thresholds.iter().find_map(|&threshold| {
        let cutoff = find_cutoff(series, metric, threshold)?;
        info!(
            "align: {} series start at {} ({} > {})",
            series.len(),
            cutoff,
            metric.field_name(),
            threshold
        );
        Some(cutoff)
    });
    if cutoff.is_none() {
        info!(
            "align: no {} threshold crossed, using all {} dates",
            metric.field_name(),
            axis.len()
        );
    }
    Alignment { axis, cutoff }
}
