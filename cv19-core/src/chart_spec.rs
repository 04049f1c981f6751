//! The fixed vocabulary of chart types.
//!
//! Chart type keys are part of the external interface (form fields, URLs,
//! CLI flags), so they are plain strings resolved through [`ChartSpec::lookup`].

use crate::error::{Cv19Error, Result};
use crate::record::Metric;

/// Chart drawn when the caller does not name one.
pub const DEFAULT_CHART_TYPE: &str = "cases";

/// Static description of one chart type.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct ChartSpec {
    pub key: &'static str,
    pub title: &'static str,
    /// The metric drawn on the y axis.
    pub metric: Metric,
    pub y_label: &'static str,
    pub log_scale: bool,
    /// The metric whose threshold crossing picks the chart's start date.
    pub align_metric: Metric,
}

pub static CHART_SPECS: [ChartSpec; 7] = [
    ChartSpec {
        key: "cases",
        title: "COVID19 Total Cases",
        metric: Metric::Cases,
        y_label: "Total Cases",
        log_scale: false,
        align_metric: Metric::Cases,
    },
    ChartSpec {
        key: "cases_log",
        title: "COVID19 Total Cases",
        metric: Metric::Cases,
        y_label: "Total Cases (log scale)",
        log_scale: true,
        align_metric: Metric::Cases,
    },
    ChartSpec {
        key: "deaths",
        title: "COVID19 Total Deaths",
        metric: Metric::Deaths,
        y_label: "Total Deaths",
        log_scale: false,
        align_metric: Metric::Cases,
    },
    ChartSpec {
        key: "new_cases",
        title: "COVID19 New Cases",
        metric: Metric::NewCases,
        y_label: "New Cases",
        log_scale: false,
        align_metric: Metric::Cases,
    },
    ChartSpec {
        key: "new_deaths",
        title: "COVID19 New Deaths",
        metric: Metric::NewDeaths,
        y_label: "New Deaths",
        log_scale: false,
        align_metric: Metric::Cases,
    },
    ChartSpec {
        key: "cases_per_capita",
        title: "Cases per Capita",
        metric: Metric::CasesPerCapita,
        y_label: "Cases p/c",
        log_scale: false,
        align_metric: Metric::Cases,
    },
    ChartSpec {
        key: "deaths_per_capita",
        title: "Deaths per Capita",
        metric: Metric::DeathsPerCapita,
        y_label: "Deaths p/c",
        log_scale: false,
        align_metric: Metric::Cases,
    },
];

impl ChartSpec {
    /// Resolve a chart type key. `None` or an empty key selects
    /// [`DEFAULT_CHART_TYPE`].
    pub fn lookup(chart_type: Option<&str>) -> Result<&'static ChartSpec> {
        let key = match chart_type.map(str::trim) {
            None | Some("") => DEFAULT_CHART_TYPE,
            Some(key) => key,
        };
        CHART_SPECS
            .iter()
            .find(|spec| spec.key == key)
            .ok_or_else(|| Cv19Error::InvalidChartType(key.to_string()))
    }

    pub fn keys() -> impl Iterator<Item = &'static str> {
        CHART_SPECS.iter().map(|spec| spec.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_keys() {
        for key in [
            "cases",
            "cases_log",
            "deaths",
            "new_cases",
            "new_deaths",
            "cases_per_capita",
            "deaths_per_capita",
        ] {
            let spec = ChartSpec::lookup(Some(key)).unwrap();
            assert_eq!(spec.key, key);
        }
        assert!(ChartSpec::lookup(Some("cases_log")).unwrap().log_scale);
        assert_eq!(
            ChartSpec::lookup(Some("deaths_per_capita")).unwrap().metric,
            Metric::DeathsPerCapita
        );
    }

    #[test]
    fn test_lookup_defaults() {
        assert_eq!(ChartSpec::lookup(None).unwrap().key, DEFAULT_CHART_TYPE);
        assert_eq!(ChartSpec::lookup(Some("")).unwrap().key, DEFAULT_CHART_TYPE);
    }

    #[test]
    fn test_lookup_unknown_key() {
        match ChartSpec::lookup(Some("not_a_real_type")) {
            Err(Cv19Error::InvalidChartType(key)) => assert_eq!(key, "not_a_real_type"),
            other => panic!("expected InvalidChartType, got {other:?}"),
        }
    }

    #[test]
    fn test_every_chart_aligns_on_cases() {
        assert!(CHART_SPECS.iter().all(|s| s.align_metric == Metric::Cases));
        assert_eq!(ChartSpec::keys().count(), CHART_SPECS.len());
    }
}
