//! Domain types used throughout the tool.
//!
//! This module defines:
//!
//! - generation parameters for the synthetic fallback (`SeriesSpec`, `SeriesMode`)
//! - loaded/generated data shapes (`GeneratedSeries`, `PredictionTable`, `Dataset`)
//! - display taxonomy (`Sector`, `Zone`, `PriceMarket`, `MapeClass`)

pub mod types;

pub use types::*;
