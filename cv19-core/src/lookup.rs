//! Lookup tables that sit beside the county feed.
//!
//! # CSV/JSON Formats
//!
//! - **Population** (has headers): `state,county,population`
//! - **Location directory** (JSON object): `{"California - San Diego": 6073, ...}`

use csv::{ReaderBuilder, Trim};
use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fs::File,
    io::{Read, Write},
    path::Path,
};

use crate::error::Result;
use crate::record::{aggregate_id, DailyRecord};

/// What the rest of the system knows about one location id.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationInfo {
    pub fips: u32,
    pub county: String,
    pub state: String,
    pub population: Option<u64>,
}

/// Population per (state, county).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopulationTable {
    populations: HashMap<(String, String), u64>,
}

impl PopulationTable {
    /// Parse a `state,county,population` CSV. Rows whose population is
    /// blank or not a whole number are left out of the table.
    pub fn from_reader<R: Read>(reader: R) -> Result<PopulationTable> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(reader);
        let mut populations = HashMap::new();
        let mut skipped = 0u32;
        for row in rdr.records() {
            let record = row?;
            let state = record.get(0).unwrap_or("");
            let county = record.get(1).unwrap_or("");
            match record.get(2).and_then(|p| p.parse::<u64>().ok()) {
                Some(population) if !state.is_empty() && !county.is_empty() => {
                    populations.insert((state.to_string(), county.to_string()), population);
                }
                _ => skipped += 1,
            }
        }
        log::debug!(
            "population table: {} locations, skipped {} rows without a population",
            populations.len(),
            skipped
        );
        Ok(PopulationTable { populations })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<PopulationTable> {
        PopulationTable::from_reader(File::open(path)?)
    }

    pub fn get(&self, state: &str, county: &str) -> Option<u64> {
        self.populations
            .get(&(state.to_string(), county.to_string()))
            .copied()
    }

    pub fn len(&self) -> usize {
        self.populations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.populations.is_empty()
    }
}

/// The "region - location" display name used by selection lists.
pub fn place_name(state: &str, county: &str) -> String {
    format!("{} - {}", state, county)
}

/// Display name to location id, as offered to users picking locations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationDirectory {
    /// Sorted display name to id.
    pub places: BTreeMap<String, u32>,
    /// Places that appear in the feed without any id.
    pub unknowns: BTreeSet<String>,
    /// Most recent date seen while building the directory.
    pub latest_date: Option<String>,
}

impl LocationDirectory {
    pub fn from_records<'a, I>(records: I) -> LocationDirectory
    where
        I: IntoIterator<Item = &'a DailyRecord>,
    {
        let mut directory = LocationDirectory::default();
        let mut latest = None;
        for record in records {
            let place = place_name(&record.state, &record.county);
            match record
                .fips
                .or_else(|| aggregate_id(&record.state, &record.county))
            {
                Some(fips) => {
                    directory.places.insert(place, fips);
                }
                None => {
                    directory.unknowns.insert(place);
                }
            }
            latest = latest.max(Some(record.date));
        }
        directory.latest_date = latest.map(|d| d.format(crate::record::DATE_FORMAT).to_string());
        directory
    }

    pub fn get(&self, place: &str) -> Option<u32> {
        self.places.get(place).copied()
    }

    /// Write the name to id mapping as a JSON object with sorted keys.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, &self.places)?;
        Ok(())
    }

    /// Read a mapping previously written with [`write_json`](Self::write_json).
    pub fn read_json<R: Read>(reader: R) -> Result<LocationDirectory> {
        let places: BTreeMap<String, u32> = serde_json::from_reader(reader)?;
        Ok(LocationDirectory {
            places,
            ..LocationDirectory::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FeedRow;

    const POPULATION_CSV: &str = "\
state,county,population
California,San Diego,3338330
Illinois,Cook,5150233
Rhode Island,Unknown,
Texas,Loving,n/a
";

    fn record(date: &str, county: &str, state: &str, fips: Option<u32>) -> DailyRecord {
        let row = FeedRow {
            date: date.to_string(),
            county: county.to_string(),
            state: state.to_string(),
            fips,
            cases: Some(1),
            deaths: Some(0),
        };
        DailyRecord::from_feed_row(row, 1).unwrap()
    }

    #[test]
    fn test_population_table() {
        let table = PopulationTable::from_reader(POPULATION_CSV.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("California", "San Diego"), Some(3338330));
        assert_eq!(table.get("Illinois", "Cook"), Some(5150233));
        assert_eq!(table.get("Rhode Island", "Unknown"), None);
        assert_eq!(table.get("Texas", "Loving"), None);
    }

    #[test]
    fn test_directory_from_records() {
        let records = vec![
            record("2020-03-01", "Cook", "Illinois", Some(17031)),
            record("2020-03-02", "New York City", "New York", None),
            record("2020-03-03", "Unknown", "Rhode Island", None),
            record("2020-03-02", "Cook", "Illinois", Some(17031)),
        ];
        let directory = LocationDirectory::from_records(&records);
        assert_eq!(directory.get("Illinois - Cook"), Some(17031));
        assert_eq!(directory.get("New York - New York City"), Some(36061));
        assert_eq!(directory.places.len(), 2);
        assert!(!directory.unknowns.contains("New York - New York City"));
        assert!(directory.unknowns.contains("Rhode Island - Unknown"));
        assert_eq!(directory.latest_date.as_deref(), Some("2020-03-03"));
    }

    #[test]
    fn test_directory_json_round_trip() {
        let records = vec![
            record("2020-03-01", "San Diego", "California", Some(6073)),
            record("2020-03-01", "Cook", "Illinois", Some(17031)),
        ];
        let directory = LocationDirectory::from_records(&records);
        let mut buffer = Vec::new();
        directory.write_json(&mut buffer).unwrap();
        let text = String::from_utf8(buffer.clone()).unwrap();
        // keys are written in sorted order
        assert!(text.find("California - San Diego") < text.find("Illinois - Cook"));

        let read_back = LocationDirectory::read_json(buffer.as_slice()).unwrap();
        assert_eq!(read_back.places, directory.places);
    }

    #[test]
    fn test_directory_lists_kansas_city_beside_jackson() {
        let records = vec![
            record("2020-03-20", "Jackson", "Missouri", Some(29095)),
            record("2020-03-20", "Kansas City", "Missouri", None),
        ];
        let directory = LocationDirectory::from_records(&records);
        assert_eq!(directory.get("Missouri - Jackson"), Some(29095));
        assert_eq!(directory.get("Missouri - Kansas City"), Some(29095));
        assert!(directory.unknowns.is_empty());
    }
}
