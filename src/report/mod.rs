//! Terminal report rendering.
//!
//! Formatting code is kept in one place so:
//! - data/statistics code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

pub mod format;

pub use format::*;
