//! Chart rendering for county series.
//!
//! [`render`] runs the alignment and tick decimation from `cv19-data` and
//! draws one line per location with `plotters`, writing an SVG file.

pub mod axis;
pub mod render;

pub use render::{render, render_spec, RenderOptions};
