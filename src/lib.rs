//! `proyecta-gas` library crate.
//!
//! Terminal analytics over pre-computed natural-gas demand and international
//! price forecasting exports. The binary (`proyecta`) is a thin wrapper around
//! this library so that:
//!
//! - core logic (synthetic generation, ingest, stats) is testable without
//!   spawning processes
//! - modules are reusable (e.g., future web front-end, notebooks, etc.)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
pub mod stats;
pub mod tui;
