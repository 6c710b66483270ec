//! Input/output helpers.
//!
//! - CSV ingest + validation of the four model exports (`load`)
//! - demo dataset exports (CSV + JSON summary) (`export`)

pub mod export;
pub mod load;

pub use export::*;
pub use load::*;
