//! Command-line parsing for the gas demand/price dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the data/report code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::domain::{PriceMarket, Sector};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "proyecta",
    version,
    about = "ProyectaGAS - dashboard de demanda y precios de gas natural"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the executive summary (best sectors, prices, classification table).
    Summary(ViewArgs),
    /// Print the national total demand report.
    Demand(ViewArgs),
    /// Print the Costa vs Interior zone report.
    Zones(ViewArgs),
    /// Print one consumption sector's report.
    Sector(SectorArgs),
    /// Print the international prices report.
    Prices(PricesArgs),
    /// Export a synthetic dataset as the four model CSVs.
    Demo(DemoArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same dataset pipeline as the report subcommands, but
    /// renders the five views as tabs using Ratatui.
    Tui(ViewArgs),
}

/// Common options shared by every view.
#[derive(Debug, Args, Clone)]
pub struct ViewArgs {
    /// Directory holding the four model export CSVs.
    #[arg(short = 'd', long, default_value = "data", value_name = "DIR")]
    pub data_dir: PathBuf,

    /// Base random seed for synthetic data (per-variable streams derive from it).
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Projection horizon in days for synthetic data.
    #[arg(long, default_value_t = 590)]
    pub horizon: usize,

    /// First projected date (YYYY-MM-DD) for synthetic data.
    #[arg(long, default_value = "2024-01-01")]
    pub start_date: NaiveDate,

    /// Use synthetic demo data even when the CSV exports exist.
    #[arg(long)]
    pub synthetic: bool,

    /// Render an ASCII chart under the report (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the ASCII chart.
    #[arg(long)]
    pub no_plot: bool,

    /// Chart width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Chart height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Plot every k-th day only.
    #[arg(long, default_value_t = 3)]
    pub sample_step: usize,
}

/// Options for the sector report.
#[derive(Debug, Args)]
pub struct SectorArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Sector to analyze.
    #[arg(short = 's', long, value_enum, default_value_t = Sector::Residencial)]
    pub sector: Sector,
}

/// Options for the prices report.
#[derive(Debug, Args)]
pub struct PricesArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Restrict to one market; omit for both plus the comparison table.
    #[arg(short = 'm', long, value_enum)]
    pub market: Option<PriceMarket>,
}

/// Options for the demo export.
#[derive(Debug, Args)]
pub struct DemoArgs {
    #[command(flatten)]
    pub view: ViewArgs,

    /// Destination directory for the four CSVs (created if missing).
    #[arg(short = 'o', long, default_value = "data", value_name = "DIR")]
    pub out: PathBuf,

    /// Also write a JSON summary of the generated dataset.
    #[arg(long, value_name = "JSON")]
    pub json: Option<PathBuf>,
}
