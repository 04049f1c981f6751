//! Data processing for county COVID-19 series.
//!
//! This crate turns the raw county feed into the forms the chart renderer
//! consumes:
//!
//! - [`dataset`]: parse the feed, repair ids, derive deltas and per-capita columns
//! - [`shared`]: a reloadable handle that swaps whole datasets in
//! - [`series`]: pick per-location series out of a dataset, fill date gaps
//! - [`align`]: the shared date axis and the "zoom" cutoff date
//! - [`ticks`]: decimate a long date axis into readable tick labels

pub mod align;
pub mod dataset;
pub mod series;
pub mod shared;
pub mod ticks;

pub use align::{align, Alignment, DateAxis};
pub use dataset::Dataset;
pub use series::{select, GapFill, Series};
pub use shared::SharedDataset;
pub use ticks::decimate;

/// Sample feed and population table used across this crate's tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use cv19_core::lookup::PopulationTable;

    use crate::Dataset;

    pub const COUNTIES_CSV: &str = include_str!("../../fixtures/us-counties-sample.csv");
    pub const POPULATION_CSV: &str = include_str!("../../fixtures/countypops-sample.csv");

    pub const COOK: u32 = 17031;
    pub const SAN_DIEGO: u32 = 6073;
    pub const ALPINE: u32 = 6003;
    pub const NEW_YORK_CITY: u32 = 36061;

    pub fn dataset() -> Dataset {
        let population = PopulationTable::from_reader(POPULATION_CSV.as_bytes()).unwrap();
        Dataset::load(COUNTIES_CSV.as_bytes(), &population).unwrap()
    }
}
