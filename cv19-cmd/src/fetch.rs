//! Download the county feed.

use cv19_core::lookup::PopulationTable;
use cv19_data::Dataset;
use log::{info, warn};
use reqwest::{Client, StatusCode};
use std::{fs, path::Path, time::Duration};
use tokio::time::sleep;

pub const DEFAULT_FEED_URL: &str =
    "https://raw.githubusercontent.com/nytimes/covid-19-data/master/us-counties.csv";

/// Maximum number of retry attempts for a download
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Initial delay between retries in milliseconds (doubles each retry)
const INITIAL_RETRY_DELAY_MS: u64 = 1000;

/// Fetch the feed body, retrying with exponential backoff.
///
/// Bad statuses, unreadable bodies and bodies too short to hold a header
/// all count as failed attempts.
pub async fn fetch_feed(client: &Client, url: &str) -> anyhow::Result<String> {
    let mut sleep_millis = INITIAL_RETRY_DELAY_MS;
    for attempt in 1..=MAX_RETRY_ATTEMPTS {
        match client.get(url).send().await {
            Ok(response) if response.status() != StatusCode::OK => {
                warn!(
                    "Attempt {}/{}: Bad response status for {}: {}",
                    attempt,
                    MAX_RETRY_ATTEMPTS,
                    url,
                    response.status()
                );
            }
            Ok(response) => match response.text().await {
                Ok(body) if body.len() <= 2 => {
                    warn!("Attempt {}/{}: Empty response for {}", attempt, MAX_RETRY_ATTEMPTS, url);
                }
                Ok(body) => return Ok(body),
                Err(e) => {
                    warn!(
                        "Attempt {}/{}: Failed to read response body for {}: {}",
                        attempt, MAX_RETRY_ATTEMPTS, url, e
                    );
                }
            },
            Err(e) => {
                warn!(
                    "Attempt {}/{}: Request failed for {}: {}",
                    attempt, MAX_RETRY_ATTEMPTS, url, e
                );
            }
        }

        if attempt < MAX_RETRY_ATTEMPTS {
            info!("Sleeping for {} milliseconds before retry", sleep_millis);
            sleep(Duration::from_millis(sleep_millis)).await;
            sleep_millis *= 2;
        }
    }
    anyhow::bail!("all {} attempts to fetch {} failed", MAX_RETRY_ATTEMPTS, url)
}

/// Check that `body` loads as a county feed, then write it to `path`.
/// Nothing is written when the body does not load.
pub fn save_feed(body: &str, path: &Path) -> anyhow::Result<Dataset> {
    let dataset = Dataset::load(body.as_bytes(), &PopulationTable::default())?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, body)?;
    info!(
        "Saved {} rows through {} to {}",
        dataset.len(),
        dataset.latest_date().unwrap_or("-"),
        path.display()
    );
    Ok(dataset)
}

pub async fn run_fetch(url: &str, counties_csv: &Path) -> anyhow::Result<Dataset> {
    let client = Client::builder().timeout(Duration::from_secs(120)).build()?;
    info!("Fetching county feed from {}", url);
    let body = fetch_feed(&client, url).await?;
    save_feed(&body, counties_csv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::tests::COUNTIES_CSV;

    #[test]
    fn test_save_feed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("us-counties.csv");
        let dataset = save_feed(COUNTIES_CSV, &path).unwrap();
        assert_eq!(dataset.len(), 157);
        assert_eq!(fs::read_to_string(&path).unwrap(), COUNTIES_CSV);
    }

    #[test]
    fn test_bad_feed_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("us-counties.csv");
        let body = "date,county,state,fips,cases,deaths\n2020-13-45,Cook,Illinois,17031,2,0\n";
        let err = save_feed(body, &path).unwrap_err();
        let err = err.downcast::<cv19_core::Cv19Error>().unwrap();
        assert!(err.is_parse_error());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_unreachable_host_fails_after_retries() {
        let client = Client::builder()
            .timeout(Duration::from_millis(200))
            .build()
            .unwrap();
        let result = fetch_feed(&client, "http://127.0.0.1:9/us-counties.csv").await;
        assert!(result.is_err());
    }
}
