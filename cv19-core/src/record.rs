use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{Cv19Error, Result};

/// Date format used by the county feed: "YYYY-MM-DD"
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Aggregate regions the feed publishes without a county id, keyed by
/// (state, county), with the id the location directory lists them under.
pub const KNOWN_AGGREGATE_IDS: [(&str, &str, u32); 2] = [
    ("New York", "New York City", 36061),
    ("Missouri", "Kansas City", 29095),
];

/// The subset of [`KNOWN_AGGREGATE_IDS`] repaired when the feed is loaded.
/// Kansas City is left out: its directory id belongs to Jackson County,
/// which the feed reports separately.
pub const REPAIRED_FEED_IDS: [(&str, &str, u32); 1] = [("New York", "New York City", 36061)];

/// The directory id of a known aggregate region.
pub fn aggregate_id(state: &str, county: &str) -> Option<u32> {
    lookup_id(&KNOWN_AGGREGATE_IDS, state, county)
}

/// Returns the id a feed row is stored under, substituting the fixed id of
/// New York City when the feed left it blank.
pub fn canonical_fips(state: &str, county: &str, fips: Option<u32>) -> Option<u32> {
    fips.or_else(|| lookup_id(&REPAIRED_FEED_IDS, state, county))
}

fn lookup_id(table: &[(&str, &str, u32)], state: &str, county: &str) -> Option<u32> {
    table
        .iter()
        .find(|(s, c, _)| *s == state && *c == county)
        .map(|(_, _, id)| *id)
}

/// A quantity that can be plotted or thresholded for a location.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Metric {
    Cases,
    Deaths,
    NewCases,
    NewDeaths,
    CasesPerCapita,
    DeathsPerCapita,
}

impl Metric {
    pub fn field_name(&self) -> &'static str {
        match self {
            Metric::Cases => "cases",
            Metric::Deaths => "deaths",
            Metric::NewCases => "new_cases",
            Metric::NewDeaths => "new_deaths",
            Metric::CasesPerCapita => "cases_pc",
            Metric::DeathsPerCapita => "deaths_pc",
        }
    }
}

/// One row of the feed exactly as published:
/// `date,county,state,fips,cases,deaths`
#[derive(Debug, Clone, Deserialize)]
pub struct FeedRow {
    pub date: String,
    pub county: String,
    pub state: String,
    pub fips: Option<u32>,
    pub cases: Option<i64>,
    pub deaths: Option<i64>,
}

/// A single day of data for one location, with the derived columns.
///
/// `new_cases`/`new_deaths` are first differences within the location's own
/// series. The per-capita fields are `None` when the population is unknown.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub county: String,
    pub state: String,
    pub fips: Option<u32>,
    pub cases: i64,
    pub deaths: i64,
    pub new_cases: i64,
    pub new_deaths: i64,
    pub population: Option<u64>,
    pub cases_per_capita: Option<f64>,
    pub deaths_per_capita: Option<f64>,
}

impl DailyRecord {
    /// Convert a raw feed row read from `line` into a record with the id
    /// repaired and derived columns zeroed.
    pub fn from_feed_row(row: FeedRow, line: u64) -> Result<DailyRecord> {
        let date = NaiveDate::parse_from_str(row.date.trim(), DATE_FORMAT).map_err(|e| {
            Cv19Error::Parse {
                line,
                reason: format!("bad date {:?}: {}", row.date, e),
            }
        })?;
        let fips = canonical_fips(&row.state, &row.county, row.fips);
        Ok(DailyRecord {
            date,
            county: row.county,
            state: row.state,
            fips,
            cases: row.cases.unwrap_or(0),
            deaths: row.deaths.unwrap_or(0),
            new_cases: 0,
            new_deaths: 0,
            population: None,
            cases_per_capita: None,
            deaths_per_capita: None,
        })
    }

    /// A zero-count placeholder for a date on which this location has no row.
    pub fn zero_like(&self, date: NaiveDate) -> DailyRecord {
        let per_capita = self.population.map(|_| 0.0);
        DailyRecord {
            date,
            county: self.county.clone(),
            state: self.state.clone(),
            fips: self.fips,
            cases: 0,
            deaths: 0,
            new_cases: 0,
            new_deaths: 0,
            population: self.population,
            cases_per_capita: per_capita,
            deaths_per_capita: per_capita,
        }
    }

    /// Set the population and the per-capita columns that depend on it.
    pub fn set_population(&mut self, population: Option<u64>) {
        let population = population.filter(|p| *p > 0);
        self.population = population;
        self.cases_per_capita = population.map(|p| self.cases as f64 / p as f64);
        self.deaths_per_capita = population.map(|p| self.deaths as f64 / p as f64);
    }

    /// The value of `metric` on this day, `None` if it is unknown.
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Cases => Some(self.cases as f64),
            Metric::Deaths => Some(self.deaths as f64),
            Metric::NewCases => Some(self.new_cases as f64),
            Metric::NewDeaths => Some(self.new_deaths as f64),
            Metric::CasesPerCapita => self.cases_per_capita,
            Metric::DeathsPerCapita => self.deaths_per_capita,
        }
    }

    /// "county,state", the label the location is drawn under.
    pub fn label(&self) -> String {
        format!("{},{}", self.county, self.state)
    }
}
