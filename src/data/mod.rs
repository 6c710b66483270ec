//! Data acquisition: the variable catalog and the synthetic fallback generator.

pub mod catalog;
pub mod synthetic;

pub use catalog::*;
pub use synthetic::*;
