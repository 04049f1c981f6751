//! The in-memory county dataset.
//!
//! # CSV Format
//!
//! The feed has headers and one row per (location, date):
//!
//! ```text
//! date,county,state,fips,cases,deaths
//! 2020-03-01,Cook,Illinois,17031,2,0
//! 2020-03-01,New York City,New York,,10,0
//! ```
//!
//! `cases` and `deaths` are cumulative. `fips` is blank for a handful of
//! aggregate regions; the ones we know how to chart are repaired on load.

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use cv19_core::{
    lookup::{LocationInfo, PopulationTable},
    record::{DailyRecord, FeedRow, DATE_FORMAT},
    Cv19Error, Result,
};
use log::info;
use std::{collections::HashMap, fs::File, io::Read, path::Path, time::Instant};

/// Every row of the feed with its derived columns, ordered by date.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    records: Vec<DailyRecord>,
    /// fips -> positions in `records`, ascending by date
    by_fips: HashMap<u32, Vec<usize>>,
    latest_date: Option<String>,
}

/// Running state of one (state, county) group during the delta scan.
struct GroupState {
    cases: i64,
    deaths: i64,
    population: Option<u64>,
}

impl Dataset {
    /// Parse the county feed and join it with `population`.
    ///
    /// Rows are sorted by date (stable, so feed order breaks ties) before
    /// `new_cases`/`new_deaths` are computed as first differences within each
    /// (state, county) group; the first row of a group gets 0.
    pub fn load<R: Read>(feed: R, population: &PopulationTable) -> Result<Dataset> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(feed);
        let headers = rdr.headers()?.clone();

        let mut records = Vec::new();
        let mut raw = StringRecord::new();
        while rdr.read_record(&mut raw)? {
            let line = raw.position().map(|p| p.line()).unwrap_or_default();
            let row: FeedRow = raw
                .deserialize(Some(&headers))
                .map_err(|e| Cv19Error::Parse {
                    line,
                    reason: e.to_string(),
                })?;
            records.push(DailyRecord::from_feed_row(row, line)?);
        }
        records.sort_by_key(|r| r.date);

        let mut groups: HashMap<(String, String), GroupState> = HashMap::new();
        for record in records.iter_mut() {
            let key = (record.state.clone(), record.county.clone());
            let group = groups.entry(key).or_insert_with(|| GroupState {
                cases: record.cases,
                deaths: record.deaths,
                population: population.get(&record.state, &record.county),
            });
            record.new_cases = record.cases - group.cases;
            record.new_deaths = record.deaths - group.deaths;
            group.cases = record.cases;
            group.deaths = record.deaths;
            record.set_population(group.population);
        }

        let mut by_fips: HashMap<u32, Vec<usize>> = HashMap::new();
        for (index, record) in records.iter().enumerate() {
            if let Some(fips) = record.fips {
                by_fips.entry(fips).or_default().push(index);
            }
        }
        let latest_date = records
            .last()
            .map(|r| r.date.format(DATE_FORMAT).to_string());

        log::debug!(
            "dataset: {} rows, {} locations with ids, {} groups",
            records.len(),
            by_fips.len(),
            groups.len()
        );
        Ok(Dataset {
            records,
            by_fips,
            latest_date,
        })
    }

    /// Load the population table and the feed from disk.
    pub fn from_paths<P: AsRef<Path>, Q: AsRef<Path>>(
        counties_csv: P,
        population_csv: Q,
    ) -> Result<Dataset> {
        let start = Instant::now();
        info!(
            "Loading covid-19 data by county from {}...",
            counties_csv.as_ref().display()
        );
        let population = PopulationTable::from_path(population_csv)?;
        let dataset = Dataset::load(File::open(counties_csv)?, &population)?;
        info!(
            "Done. Loaded {} rows through {} in {:.3} seconds",
            dataset.len(),
            dataset.latest_date().unwrap_or("-"),
            start.elapsed().as_secs_f64()
        );
        Ok(dataset)
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

    /// Most recent date in the feed, "YYYY-MM-DD".
    pub fn latest_date(&self) -> Option<&str> {
        self.latest_date.as_deref()
    }

    /// All rows for `fips`, oldest first.
    pub fn records_for(&self, fips: u32) -> impl Iterator<Item = &DailyRecord> + '_ {
        self.by_fips
            .get(&fips)
            .into_iter()
            .flatten()
            .map(move |&index| &self.records[index])
    }

    /// Name, region and population of a location, if the feed has it.
    pub fn lookup(&self, fips: u32) -> Option<LocationInfo> {
        self.records_for(fips).last().map(|r| LocationInfo {
            fips,
            county: r.county.clone(),
            state: r.state.clone(),
            population: r.population,
        })
    }

    /// Ids with at least one row, ascending.
    pub fn location_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.by_fips.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Dates present for `fips`.
    pub fn dates_for(&self, fips: u32) -> Vec<NaiveDate> {
        self.records_for(fips).map(|r| r.date).collect()
    }
}
