use chrono::NaiveDate;
use cv19_core::{
    record::{DailyRecord, Metric},
    Cv19Error, Result,
};
use log::{debug, warn};
use std::{collections::BTreeMap, str::FromStr};

use crate::{align::DateAxis, dataset::Dataset};

/// The daily rows of one location, oldest first. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub fips: u32,
    records: Vec<DailyRecord>,
}

impl Series {
    /// Build a series from rows of one location; `None` if there are no rows.
    pub fn new(fips: u32, mut records: Vec<DailyRecord>) -> Option<Series> {
        if records.is_empty() {
            return None;
        }
        records.sort_by_key(|r| r.date);
        Some(Series { fips, records })
    }

    pub fn records(&self) -> &[DailyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn county(&self) -> &str {
        &self.records[0].county
    }

    pub fn state(&self) -> &str {
        &self.records[0].state
    }

    /// "county,state"
    pub fn label(&self) -> String {
        self.records[0].label()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.records.iter().map(|r| r.date)
    }

    pub fn first_date(&self) -> NaiveDate {
        self.records[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.records[self.records.len() - 1].date
    }

    /// First date on which `metric` is strictly greater than `threshold`.
    pub fn first_date_exceeding(&self, metric: Metric, threshold: f64) -> Option<NaiveDate> {
        self.records
            .iter()
            .find(|r| r.value(metric).is_some_and(|v| v > threshold))
            .map(|r| r.date)
    }

    /// `(date, value)` pairs of `metric`; unknown values stay `None`.
    pub fn points(&self, metric: Metric) -> Vec<(NaiveDate, Option<f64>)> {
        self.records
            .iter()
            .map(|r| (r.date, r.value(metric)))
            .collect()
    }

    /// Rows keyed by date.
    pub fn by_date(&self) -> BTreeMap<NaiveDate, &DailyRecord> {
        self.records.iter().map(|r| (r.date, r)).collect()
    }

    /// A copy without the rows before `cutoff`; `None` if no row is left.
    pub fn truncated(&self, cutoff: NaiveDate) -> Option<Series> {
        let kept: Vec<DailyRecord> = self
            .records
            .iter()
            .filter(|r| r.date >= cutoff)
            .cloned()
            .collect();
        Series::new(self.fips, kept)
    }

    /// A copy with a zero-valued row for each axis date `policy` covers and
    /// this location has no row for. Existing rows are never changed.
    pub fn fill_gaps(&self, axis: &DateAxis, policy: GapFill) -> Series {
        let first = self.first_date();
        let template = &self.records[0];
        let missing: Vec<DailyRecord> = axis
            .iter()
            .filter(|d| match policy {
                GapFill::Off => false,
                GapFill::Leading => *d < first,
                GapFill::All => true,
            })
            .filter(|d| self.records.binary_search_by_key(d, |r| r.date).is_err())
            .map(|d| template.zero_like(d))
            .collect();
        if missing.is_empty() {
            return self.clone();
        }
        debug!(
            "fill_gaps: {} zero rows ({:?}) for {}",
            missing.len(),
            policy,
            self.label()
        );
        let mut records = missing;
        records.extend(self.records.iter().cloned());
        Series::new(self.fips, records).unwrap_or_else(|| self.clone())
    }
}

/// Which axis dates missing from a location get a zero-valued row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GapFill {
    /// Leave the series as reported.
    Off,
    /// Only dates before the location's first report.
    Leading,
    /// Every axis date the location did not report.
    #[default]
    All,
}

impl FromStr for GapFill {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "off" => Ok(GapFill::Off),
            "leading" => Ok(GapFill::Leading),
            "all" => Ok(GapFill::All),
            other => Err(format!("unknown gap fill '{}', expected off, leading or all", other)),
        }
    }
}

/// Pull the series for each id out of `dataset`, in the order asked for.
///
/// Ids without rows are skipped. If none of them has rows the result is
/// [`Cv19Error::NoDataAvailable`].
pub fn select(dataset: &Dataset, location_ids: &[u32]) -> Result<Vec<Series>> {
    let mut selected = Vec::with_capacity(location_ids.len());
    for &fips in location_ids {
        match Series::new(fips, dataset.records_for(fips).cloned().collect()) {
            Some(series) => selected.push(series),
            None => debug!("select: no rows for {}", fips),
        }
    }
    if selected.is_empty() {
        warn!("select: no data for any of {:?}", location_ids);
        return Err(Cv19Error::NoDataAvailable);
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::DateAxis;
    use crate::fixtures::{self, ALPINE, COOK, SAN_DIEGO};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_select_preserves_request_order() {
        let dataset = fixtures::dataset();
        let selected = select(&dataset, &[SAN_DIEGO, COOK]).unwrap();
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].fips, SAN_DIEGO);
        assert_eq!(selected[0].label(), "San Diego,California");
        assert_eq!(selected[1].fips, COOK);
        assert_eq!(selected[1].county(), "Cook");
        assert_eq!(selected[1].state(), "Illinois");
    }

    #[test]
    fn test_select_skips_unknown_ids() {
        let dataset = fixtures::dataset();
        let selected = select(&dataset, &[999999999, COOK, 42]).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].fips, COOK);
        assert_eq!(selected[0].len(), 40);
    }

    #[test]
    fn test_select_nothing_is_no_data() {
        let dataset = fixtures::dataset();
        assert!(select(&dataset, &[999999999]).unwrap_err().is_no_data());
        assert!(select(&dataset, &[]).unwrap_err().is_no_data());
    }

    #[test]
    fn test_first_date_exceeding_is_strict() {
        let dataset = fixtures::dataset();
        let alpine = &select(&dataset, &[ALPINE]).unwrap()[0];
        assert_eq!(alpine.first_date_exceeding(Metric::Cases, 5.0), None);
        assert_eq!(alpine.first_date_exceeding(Metric::Cases, 2.0), Some(ymd(2020, 3, 30)));
        assert_eq!(alpine.first_date_exceeding(Metric::Cases, 1.0), Some(ymd(2020, 3, 20)));
        // unknown per-capita values never exceed anything
        assert_eq!(alpine.first_date_exceeding(Metric::CasesPerCapita, -1.0), None);
    }

    #[test]
    fn test_truncated() {
        let dataset = fixtures::dataset();
        let cook = &select(&dataset, &[COOK]).unwrap()[0];
        let truncated = cook.truncated(ymd(2020, 4, 1)).unwrap();
        assert_eq!(truncated.len(), 9);
        assert_eq!(truncated.first_date(), ymd(2020, 4, 1));
        assert_eq!(truncated.last_date(), cook.last_date());
        // cook itself is untouched
        assert_eq!(cook.len(), 40);
        assert!(cook.truncated(ymd(2020, 5, 1)).is_none());
    }

    #[test]
    fn test_fill_leading_gaps() {
        let dataset = fixtures::dataset();
        let selected = select(&dataset, &[COOK, SAN_DIEGO]).unwrap();
        let axis = DateAxis::from_series(&selected);
        let filled = selected[1].fill_gaps(&axis, GapFill::Leading);
        assert_eq!(filled.len(), 40);
        assert_eq!(filled.first_date(), ymd(2020, 3, 1));
        let leading: Vec<&DailyRecord> = filled.records().iter().take(4).collect();
        assert!(leading.iter().all(|r| r.cases == 0 && r.new_cases == 0));
        assert!(leading.iter().all(|r| r.cases_per_capita == Some(0.0)));
        assert_eq!(filled.records()[4], selected[1].records()[0]);

        // already starts on the first axis date: nothing to fill
        assert_eq!(selected[0].fill_gaps(&axis, GapFill::Leading), selected[0]);
        assert_eq!(selected[1].fill_gaps(&axis, GapFill::Off), selected[1]);
    }

    #[test]
    fn test_fill_interior_and_trailing_gaps() {
        let dataset = fixtures::dataset();
        let alpine = &select(&dataset, &[ALPINE]).unwrap()[0];
        let kept: Vec<DailyRecord> = alpine
            .records()
            .iter()
            .filter(|r| r.date != ymd(2020, 3, 11) && r.date < ymd(2020, 4, 8))
            .cloned()
            .collect();
        let gappy = Series::new(ALPINE, kept).unwrap();
        let axis = DateAxis::from_dates([
            ymd(2020, 3, 10),
            ymd(2020, 3, 11),
            ymd(2020, 3, 12),
            ymd(2020, 4, 8),
            ymd(2020, 4, 9),
        ]);

        // leading only: the gap on 03-11 and the missing tail stay open
        let leading = gappy.fill_gaps(&axis, GapFill::Leading);
        assert_eq!(leading, gappy);

        let filled = gappy.fill_gaps(&axis, GapFill::All);
        assert_eq!(filled.len(), gappy.len() + 3);
        let by_date = filled.by_date();
        assert_eq!(by_date[&ymd(2020, 3, 11)].cases, 0);
        assert_eq!(by_date[&ymd(2020, 3, 11)].county, "Alpine");
        assert_eq!(by_date[&ymd(2020, 4, 8)].cases, 0);
        assert_eq!(by_date[&ymd(2020, 3, 12)].cases, 1);
        assert!(filled.dates().collect::<Vec<_>>().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(filled.last_date(), ymd(2020, 4, 9));
    }

    #[test]
    fn test_gap_fill_from_str() {
        assert_eq!("all".parse::<GapFill>(), Ok(GapFill::All));
        assert_eq!("leading".parse::<GapFill>(), Ok(GapFill::Leading));
        assert_eq!("off".parse::<GapFill>(), Ok(GapFill::Off));
        assert!("some".parse::<GapFill>().is_err());
        assert_eq!(GapFill::default(), GapFill::All);
    }

    #[test]
    fn test_points_and_by_date() {
        let dataset = fixtures::dataset();
        let alpine = &select(&dataset, &[ALPINE]).unwrap()[0];
        let points = alpine.points(Metric::CasesPerCapita);
        assert_eq!(points.len(), 31);
        assert!(points.iter().all(|(_, v)| v.is_none()));

        let by_date = alpine.by_date();
        assert_eq!(by_date[&ymd(2020, 3, 20)].cases, 2);
        assert_eq!(by_date.keys().next(), Some(&ymd(2020, 3, 10)));
    }
}
