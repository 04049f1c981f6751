//! Line oriented chart session.
//!
//! Each input line is one request:
//!
//! - `chart <type> <id,id,...>`: render and print the artifact path
//! - `reload`: re-read the source tables
//! - `latest`: print the most recent date in the data
//! - `quit`: stop
//!
//! Request failures are reported on the output and the session goes on.

use cv19_core::Cv19Error;
use log::{debug, warn};
use std::io::{BufRead, Write};

use crate::service::ChartService;

#[derive(Debug, PartialEq)]
enum Request {
    Chart { chart_type: String, ids: Vec<u32> },
    Reload,
    Latest,
    Quit,
}

fn parse_request(line: &str) -> Result<Option<Request>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let request = match verb {
        "chart" => {
            let chart_type = words.next().ok_or("usage: chart <type> <id,id,...>")?;
            let ids = words
                .next()
                .ok_or("usage: chart <type> <id,id,...>")?
                .split(',')
                .filter(|id| !id.is_empty())
                .map(|id| {
                    id.trim()
                        .parse::<u32>()
                        .map_err(|_| format!("bad location id '{}'", id))
                })
                .collect::<Result<Vec<u32>, String>>()?;
            Request::Chart {
                chart_type: chart_type.to_string(),
                ids,
            }
        }
        "reload" => Request::Reload,
        "latest" => Request::Latest,
        "quit" | "exit" => Request::Quit,
        other => return Err(format!("unknown command '{}'", other)),
    };
    Ok(Some(request))
}

/// Serve requests from `input` until `quit` or end of input.
pub fn run_session<R: BufRead, W: Write>(
    service: &ChartService,
    input: R,
    mut output: W,
) -> anyhow::Result<()> {
    for line in input.lines() {
        let line = line?;
        let request = match parse_request(&line) {
            Ok(Some(request)) => request,
            Ok(None) => continue,
            Err(message) => {
                writeln!(output, "error: {}", message)?;
                continue;
            }
        };
        debug!("session: {:?}", request);
        match request {
            Request::Chart { chart_type, ids } => {
                match service.render_chart(&ids, Some(&chart_type)) {
                    Ok(path) => writeln!(output, "{}", path.display())?,
                    Err(e) => {
                        if !matches!(
                            e,
                            Cv19Error::NoDataAvailable | Cv19Error::InvalidChartType(_)
                        ) {
                            warn!("session: render failed: {}", e);
                        }
                        writeln!(output, "error: {}", e)?
                    }
                }
            }
            Request::Reload => match service.reload() {
                Ok(dataset) => writeln!(
                    output,
                    "reloaded {} rows through {}",
                    dataset.len(),
                    dataset.latest_date().unwrap_or("-")
                )?,
                Err(e) => writeln!(output, "error: {}", e)?,
            },
            Request::Latest => {
                let latest = service.latest_date();
                writeln!(output, "{}", latest.as_deref().unwrap_or("-"))?
            }
            Request::Quit => break,
        }
        output.flush()?;
    }
    Ok(())
}
