//! Long-lived chart rendering over a reloadable dataset.

use cv19_chart::{render_spec, RenderOptions};
use cv19_core::{chart_spec::ChartSpec, Result};
use cv19_data::{select, Dataset, SharedDataset};
use log::info;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use crate::{ChartArgs, DataArgs};

pub struct ChartService {
    data: SharedDataset,
    counties_csv: PathBuf,
    population_csv: PathBuf,
    output_dir: PathBuf,
    options: RenderOptions,
    sequence: AtomicU64,
}

impl ChartService {
    /// Load the tables named in `data` and get ready to write charts.
    pub fn open(data: &DataArgs, chart: &ChartArgs) -> Result<ChartService> {
        let dataset = Dataset::from_paths(&data.counties_csv, &data.population_csv)?;
        ChartService::with_dataset(
            dataset,
            &data.counties_csv,
            &data.population_csv,
            &chart.output_dir,
            chart.render_options(),
        )
    }

    /// Wrap an already loaded dataset. The paths are only used by
    /// [`reload`](Self::reload).
    pub fn with_dataset(
        dataset: Dataset,
        counties_csv: &Path,
        population_csv: &Path,
        output_dir: &Path,
        options: RenderOptions,
    ) -> Result<ChartService> {
        fs::create_dir_all(output_dir)?;
        Ok(ChartService {
            data: SharedDataset::new(dataset),
            counties_csv: counties_csv.to_path_buf(),
            population_csv: population_csv.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            options,
            sequence: AtomicU64::new(0),
        })
    }

    /// Draw `chart_type` for `location_ids` and return the file written.
    ///
    /// The chart type is checked before any data is touched. Every call
    /// gets its own file name, so concurrent callers never share an
    /// artifact.
    pub fn render_chart(&self, location_ids: &[u32], chart_type: Option<&str>) -> Result<PathBuf> {
        let spec = ChartSpec::lookup(chart_type)?;
        let dataset = self.data.snapshot();
        let series = select(&dataset, location_ids)?;
        let path = self.artifact_path(spec, location_ids);
        render_spec(&series, spec, &path, &self.options)?;
        Ok(path)
    }

    fn artifact_path(&self, spec: &ChartSpec, location_ids: &[u32]) -> PathBuf {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        self.output_dir
            .join(format!("{}-{}-{}.svg", spec.key, ids_part(location_ids), seq))
    }

    /// Re-read both tables and swap the new dataset in. On failure the
    /// dataset already loaded keeps serving requests.
    pub fn reload(&self) -> Result<Arc<Dataset>> {
        info!("reload: {}", self.counties_csv.display());
        self.data
            .reload_with(|| Dataset::from_paths(&self.counties_csv, &self.population_csv))
    }

    pub fn latest_date(&self) -> Option<String> {
        self.data.snapshot().latest_date().map(str::to_string)
    }

    pub fn dataset(&self) -> Arc<Dataset> {
        self.data.snapshot()
    }
}

/// Most ids spelled out in an artifact name; the rest are only counted.
const MAX_NAMED_IDS: usize = 4;

/// `6073_17031`, or `6073_17031_6003_36061_and_57_more` for long selections,
/// so file names stay well under the usual 255 byte limit.
fn ids_part(location_ids: &[u32]) -> String {
    let named: Vec<String> = location_ids
        .iter()
        .take(MAX_NAMED_IDS)
        .map(u32::to_string)
        .collect();
    let mut part = named.join("_");
    if location_ids.len() > MAX_NAMED_IDS {
        part.push_str(&format!("_and_{}_more", location_ids.len() - MAX_NAMED_IDS));
    }
    part
}
