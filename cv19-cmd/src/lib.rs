//! Command implementations for the cv19 CLI.
//!
//! Provides subcommands for drawing county charts, generating the location
//! mapping, downloading the county feed and running a long-lived chart
//! session that can reload its data.

use clap::{Args, Subcommand};
use cv19_chart::RenderOptions;
use cv19_core::chart_spec::{ChartSpec, CHART_SPECS};
use cv19_data::{align::DEFAULT_THRESHOLDS, ticks::MAX_TICKS, GapFill};
use std::path::PathBuf;

pub mod fetch;
pub mod mappings;
pub mod service;
pub mod session;

pub use service::ChartService;

/// Where the source tables live.
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// County feed CSV (`date,county,state,fips,cases,deaths`)
    #[arg(short = 'c', long, default_value = "us-counties.csv")]
    pub counties_csv: PathBuf,

    /// Population CSV (`state,county,population`)
    #[arg(short = 'p', long, default_value = "countypops.csv")]
    pub population_csv: PathBuf,
}

/// How charts are drawn and where they go.
#[derive(Args, Debug, Clone)]
pub struct ChartArgs {
    /// Directory chart files are written to
    #[arg(short = 'o', long, default_value = "static")]
    pub output_dir: PathBuf,

    /// Most date labels on the x axis
    #[arg(long, default_value_t = MAX_TICKS)]
    pub max_ticks: usize,

    #[arg(long, default_value_t = 1024)]
    pub width: u32,

    #[arg(long, default_value_t = 768)]
    pub height: u32,

    /// Missing dates padded with zero rows: off, leading or all
    #[arg(long, default_value = "all")]
    pub fill_gaps: GapFill,
}

impl ChartArgs {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            max_ticks: self.max_ticks,
            thresholds: DEFAULT_THRESHOLDS.to_vec(),
            gap_fill: self.fill_gaps,
            width: self.width,
            height: self.height,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Draw one chart for a set of locations
    Chart {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        chart: ChartArgs,

        /// Comma separated location ids, e.g. 6073,17031
        #[arg(short = 'f', long, value_delimiter = ',', required = true)]
        fips: Vec<u32>,

        /// Chart type key (see `chart-types`)
        #[arg(short = 't', long)]
        chart_type: Option<String>,
    },

    /// Write the "state - county" to id mapping as JSON
    Mappings {
        #[command(flatten)]
        data: DataArgs,

        /// Output path for the mapping JSON
        #[arg(short = 'o', long, default_value = mappings::DEFAULT_MAPPING_PATH)]
        output: PathBuf,
    },

    /// Download the county feed and check that it loads
    Fetch {
        /// Output path for the downloaded feed
        #[arg(short = 'c', long, default_value = "us-counties.csv")]
        counties_csv: PathBuf,

        #[arg(long, default_value = fetch::DEFAULT_FEED_URL)]
        url: String,
    },

    /// List the chart types
    ChartTypes,

    /// Serve chart requests read from stdin until `quit`
    Session {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        chart: ChartArgs,
    },
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Chart {
            data,
            chart,
            fips,
            chart_type,
        } => {
            let service = ChartService::open(&data, &chart)?;
            let path = service.render_chart(&fips, chart_type.as_deref())?;
            println!("{}", path.display());
            Ok(())
        }
        Command::Mappings { data, output } => {
            mappings::run_mappings(&data, &output)?;
            Ok(())
        }
        Command::Fetch { counties_csv, url } => {
            fetch::run_fetch(&url, &counties_csv).await?;
            Ok(())
        }
        Command::ChartTypes => {
            for spec in CHART_SPECS.iter() {
                println!("{}", describe(spec));
            }
            Ok(())
        }
        Command::Session { data, chart } => {
            let service = ChartService::open(&data, &chart)?;
            let stdin = std::io::stdin();
            session::run_session(&service, stdin.lock(), std::io::stdout())
        }
    }
}

fn describe(spec: &ChartSpec) -> String {
    let scale = if spec.log_scale { " (log)" } else { "" };
    format!("{:<18} {}{}", spec.key, spec.title, scale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(subcommand)]
        command: Command,
    }

    #[test]
    fn test_chart_args_defaults() {
        let cli = TestCli::try_parse_from(["cv19", "chart", "--fips", "6073,17031"]).unwrap();
        let Command::Chart {
            data,
            chart,
            fips,
            chart_type,
        } = cli.command
        else {
            panic!("expected chart");
        };
        assert_eq!(fips, vec![6073, 17031]);
        assert_eq!(chart_type, None);
        assert_eq!(data.counties_csv, PathBuf::from("us-counties.csv"));
        assert_eq!(data.population_csv, PathBuf::from("countypops.csv"));
        assert_eq!(chart.output_dir, PathBuf::from("static"));
        assert_eq!(chart.render_options(), RenderOptions::default());
    }

    #[test]
    fn test_chart_requires_fips() {
        assert!(TestCli::try_parse_from(["cv19", "chart"]).is_err());
        assert!(TestCli::try_parse_from(["cv19", "chart", "--fips", "San Diego"]).is_err());
    }

    #[test]
    fn test_chart_overrides() {
        let cli = TestCli::try_parse_from([
            "cv19",
            "chart",
            "-f",
            "17031",
            "-t",
            "cases_log",
            "--max-ticks",
            "10",
            "--fill-gaps",
            "leading",
        ])
        .unwrap();
        let Command::Chart {
            chart, chart_type, ..
        } = cli.command
        else {
            panic!("expected chart");
        };
        assert_eq!(chart_type.as_deref(), Some("cases_log"));
        let options = chart.render_options();
        assert_eq!(options.max_ticks, 10);
        assert_eq!(options.gap_fill, GapFill::Leading);
    }

    #[test]
    fn test_mappings_default_output() {
        let cli = TestCli::try_parse_from(["cv19", "mappings"]).unwrap();
        let Command::Mappings { output, .. } = cli.command else {
            panic!("expected mappings");
        };
        assert_eq!(output, PathBuf::from("static/fips_county_mapping.json"));
    }

    #[test]
    fn test_describe() {
        let line = describe(&CHART_SPECS[1]);
        assert!(line.starts_with("cases_log"));
        assert!(line.ends_with("(log)"));
        assert!(!describe(&CHART_SPECS[0]).contains("(log)"));
    }
}
