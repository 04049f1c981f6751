/// Error types for the cv19 pipeline
use thiserror::Error;

/// Main error type for loading, selecting and rendering county data
#[derive(Error, Debug)]
pub enum Cv19Error {
    /// A row of a source table could not be parsed
    #[error("Failed to parse line {line}: {reason}")]
    Parse { line: u64, reason: String },

    /// CSV reader failure that is not tied to a row
    #[error("Failed to read CSV: {0}")]
    Csv(csv::Error),

    /// None of the requested locations has any data
    #[error("No data available for the requested locations")]
    NoDataAvailable,

    /// Chart type key is not in the registry
    #[error("Invalid chart type: {0}")]
    InvalidChartType(String),

    /// The plotting backend failed
    #[error("Failed to render chart: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Cv19Error {
    /// True for malformed source data, which aborts a load.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Cv19Error::Parse { .. } | Cv19Error::Csv(_))
    }

    /// True when a selection came back empty.
    pub fn is_no_data(&self) -> bool {
        matches!(self, Cv19Error::NoDataAvailable)
    }
}

impl From<csv::Error> for Cv19Error {
    fn from(err: csv::Error) -> Self {
        match err.position() {
            Some(position) => Cv19Error::Parse {
                line: position.line(),
                reason: err.to_string(),
            },
            None => Cv19Error::Csv(err),
        }
    }
}

/// Type alias for Results using Cv19Error
pub type Result<T> = std::result::Result<T, Cv19Error>;

#[cfg(test)]
mod tests {
    use super::Cv19Error;

    #[test]
    fn csv_errors_with_a_position_become_parse_errors() {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader("a,b\n1,2\n3\n".as_bytes());
        let err = rdr
            .records()
            .find_map(|r| r.err())
            .expect("ragged row should fail");
        let err: Cv19Error = err.into();
        assert!(err.is_parse_error());
        match err {
            Cv19Error::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn taxonomy_predicates() {
        assert!(Cv19Error::NoDataAvailable.is_no_data());
        assert!(!Cv19Error::NoDataAvailable.is_parse_error());
        let invalid = Cv19Error::InvalidChartType("bogus".to_string());
        assert!(!invalid.is_no_data());
        assert_eq!(invalid.to_string(), "Invalid chart type: bogus");
    }
}
