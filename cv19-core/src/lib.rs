//! Core types shared by the cv19 crates.
//!
//! - [`record`]: one typed row of the county feed plus the metrics derived from it
//! - [`chart_spec`]: the static registry of chart types
//! - [`lookup`]: population table and the "region - location" directory
//! - [`error`]: the error taxonomy for the whole pipeline

pub mod chart_spec;
pub mod error;
pub mod lookup;
pub mod record;

pub use error::{Cv19Error, Result};
