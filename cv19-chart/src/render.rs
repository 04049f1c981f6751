use chrono::NaiveDate;
use cv19_core::{chart_spec::ChartSpec, Cv19Error, Result};
use cv19_data::{
    align, align::DEFAULT_THRESHOLDS, decimate, ticks::MAX_TICKS, Alignment, GapFill, Series,
};
use log::{debug, info};
use plotters::coord::ranged1d::{AsRangedCoord, ValueFormatter};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

use crate::axis::TickedDateRange;

/// Knobs for one render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Upper bound on x axis labels.
    pub max_ticks: usize,
    /// Case thresholds tried in order when picking the start date.
    pub thresholds: Vec<f64>,
    /// Which missing dates get zero rows before drawing.
    pub gap_fill: GapFill,
    pub width: u32,
    pub height: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_ticks: MAX_TICKS,
            thresholds: DEFAULT_THRESHOLDS.to_vec(),
            gap_fill: GapFill::All,
            width: 1024,
            height: 768,
        }
    }
}

/// One location's line, split wherever a value cannot be drawn.
#[derive(Debug, Clone, PartialEq)]
struct PlotLine {
    label: String,
    segments: Vec<Vec<(NaiveDate, f64)>>,
}

impl PlotLine {
    fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.segments.iter().flatten().map(|(_, v)| *v)
    }
}

/// Split `points` into drawable runs. Unknown values, and non-positive
/// values on a log axis, end the current run.
fn split_segments(
    points: Vec<(NaiveDate, Option<f64>)>,
    log_scale: bool,
) -> Vec<Vec<(NaiveDate, f64)>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for (date, value) in points {
        match value.filter(|v| v.is_finite() && (!log_scale || *v > 0.0)) {
            Some(v) => current.push((date, v)),
            None => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Render `series` as the chart named by `chart_type` into `output_path`.
///
/// `None` draws the default chart type. Fails with
/// [`Cv19Error::InvalidChartType`] for an unknown key and
/// [`Cv19Error::NoDataAvailable`] when `series` is empty.
pub fn render(
    series: &[Series],
    chart_type: Option<&str>,
    output_path: &Path,
    options: &RenderOptions,
) -> Result<()> {
    let spec = ChartSpec::lookup(chart_type)?;
    render_spec(series, spec, output_path, options)
}

/// Render with an already resolved [`ChartSpec`].
pub fn render_spec(
    series: &[Series],
    spec: &ChartSpec,
    output_path: &Path,
    options: &RenderOptions,
) -> Result<()> {
    let alignment = align(series, spec.align_metric, &options.thresholds);
    let axis = alignment.truncated_axis();
    let (Some(first), Some(last)) = (axis.first(), axis.last()) else {
        return Err(Cv19Error::NoDataAvailable);
    };
    let ticks = decimate(axis.as_slice(), options.max_ticks);
    debug!("render: {} dates, {} ticks", axis.len(), ticks.len());

    let lines = plot_lines(series, spec, &alignment, options);

    let x = TickedDateRange::new(first, last, ticks);
    let root = SVGBackend::new(output_path, (options.width, options.height)).into_drawing_area();
    let drawn = if spec.log_scale {
        let (lo, hi) = log_bounds(&lines);
        draw_chart(&root, spec, x, (lo..hi).log_scale(), &lines)
    } else {
        let (lo, hi) = linear_bounds(&lines);
        draw_chart(&root, spec, x, lo..hi, &lines)
    };
    drawn.map_err(|e| Cv19Error::Render(e.to_string()))?;

    info!(
        "render: {} chart of {} locations written to {}",
        spec.key,
        lines.len(),
        output_path.display()
    );
    Ok(())
}

/// Fill, truncate at the cutoff and split each series into drawable runs.
fn plot_lines(
    series: &[Series],
    spec: &ChartSpec,
    alignment: &Alignment,
    options: &RenderOptions,
) -> Vec<PlotLine> {
    series
        .iter()
        .map(|s| {
            let filled = s.fill_gaps(&alignment.axis, options.gap_fill);
            let visible = match alignment.cutoff {
                Some(cutoff) => filled.truncated(cutoff),
                None => Some(filled),
            };
            let points = visible.map(|v| v.points(spec.metric)).unwrap_or_default();
            PlotLine {
                label: s.label(),
                segments: split_segments(points, spec.log_scale),
            }
        })
        .collect()
}

fn linear_bounds(lines: &[PlotLine]) -> (f64, f64) {
    let (lo, hi) = lines
        .iter()
        .flat_map(PlotLine::values)
        .fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if hi > lo {
        (lo, hi + (hi - lo) * 0.05)
    } else {
        (lo, lo + 1.0)
    }
}

fn log_bounds(lines: &[PlotLine]) -> (f64, f64) {
    let positive = lines.iter().flat_map(PlotLine::values).filter(|v| *v > 0.0);
    let (lo, hi) = positive.fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if lo > hi {
        (1.0, 10.0)
    } else if hi > lo {
        (lo, hi * 1.1)
    } else {
        (lo, lo * 10.0)
    }
}

fn draw_chart<DB, Y>(
    root: &DrawingArea<DB, Shift>,
    spec: &ChartSpec,
    x: TickedDateRange,
    y: Y,
    lines: &[PlotLine],
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>>
where
    DB: DrawingBackend,
    Y: AsRangedCoord<Value = f64>,
    Y::CoordDescType: ValueFormatter<f64>,
{
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(root)
        .caption(spec.title, ("sans-serif", 28).into_font())
        .margin(20)
        .x_label_area_size(90)
        .y_label_area_size(80)
        .build_cartesian_2d(x, y)?;

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc(spec.y_label)
        .x_label_style(
            ("sans-serif", 12)
                .into_font()
                .transform(FontTransform::Rotate90),
        )
        .draw()?;

    for (index, line) in lines.iter().enumerate() {
        let style = Palette99::pick(index).stroke_width(2);
        let mut segments = line.segments.iter();
        // the first draw carries the legend entry, even if the line is empty
        let first = segments.next().cloned().unwrap_or_default();
        chart
            .draw_series(LineSeries::new(first, style))?
            .label(line.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
        for segment in segments {
            chart.draw_series(LineSeries::new(segment.iter().copied(), style))?;
        }
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}
