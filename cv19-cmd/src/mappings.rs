//! Generate the "state - county" to location id mapping.

use cv19_core::lookup::LocationDirectory;
use cv19_data::Dataset;
use log::info;
use std::{
    fs,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::DataArgs;

pub const DEFAULT_MAPPING_PATH: &str = "static/fips_county_mapping.json";

/// Build the directory from `dataset` and write it to `output` as JSON.
pub fn write_mappings(dataset: &Dataset, output: &Path) -> anyhow::Result<LocationDirectory> {
    let directory = LocationDirectory::from_records(dataset.records());
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(output)?);
    directory.write_json(&mut writer)?;
    writer.flush()?;

    info!("latest date: {}", directory.latest_date.as_deref().unwrap_or("-"));
    info!("places without an id: {:?}", directory.unknowns);
    info!(
        "wrote {} places to {}",
        directory.places.len(),
        output.display()
    );
    Ok(directory)
}

pub fn run_mappings(data: &DataArgs, output: &Path) -> anyhow::Result<LocationDirectory> {
    let dataset = Dataset::from_paths(&data.counties_csv, &data.population_csv)?;
    write_mappings(&dataset, output)
}
