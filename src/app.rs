//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the dataset (CSV exports or synthetic demo data)
//! - prints reports/charts
//! - launches the TUI or writes the demo exports

use clap::Parser;

use crate::cli::{Command, DemoArgs, PricesArgs, SectorArgs, ViewArgs};
use crate::domain::{Dataset, PriceMarket, RunConfig, Sector};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `proyecta` binary.
pub fn run() -> Result<(), AppError> {
    // We want `proyecta` and `proyecta --synthetic` to behave like
    // `proyecta tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of
    // the argv list before parsing. This preserves a clean clap structure
    // while retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Summary(args) => handle_report(args, View::Summary),
        Command::Demand(args) => handle_report(args, View::Demand),
        Command::Zones(args) => handle_report(args, View::Zones),
        Command::Sector(SectorArgs { view, sector }) => handle_report(view, View::Sector(sector)),
        Command::Prices(PricesArgs { view, market }) => handle_report(view, View::Prices(market)),
        Command::Demo(args) => handle_demo(args),
        Command::Tui(args) => handle_tui(args),
    }
}

#[derive(Debug, Clone, Copy)]
enum View {
    Summary,
    Demand,
    Zones,
    Sector(Sector),
    Prices(Option<PriceMarket>),
}

fn handle_report(args: ViewArgs, view: View) -> Result<(), AppError> {
    let config = run_config_from_args(&args, false);
    let dataset = pipeline::load_or_generate(&config)?;

    let report = match view {
        View::Summary => crate::report::format_executive_summary(&dataset)?,
        View::Demand => crate::report::format_demand_report(&dataset)?,
        View::Zones => crate::report::format_zones_report(&dataset)?,
        View::Sector(sector) => crate::report::format_sector_report(&dataset, sector)?,
        View::Prices(market) => crate::report::format_prices_report(&dataset, market)?,
    };
    println!("{report}");

    if config.plot {
        if let Some((series, dates)) = chart_series(&dataset, view) {
            let plot = crate::plot::render_series_plot(
                series,
                dates,
                config.plot_width,
                config.plot_height,
                config.sample_step,
            );
            println!("{plot}");
        }
    }

    Ok(())
}

/// Pick the series charted under each report, if any.
fn chart_series(dataset: &Dataset, view: View) -> Option<(&crate::domain::PairedSeries, &[chrono::NaiveDate])> {
    match view {
        View::Summary | View::Zones => None,
        View::Demand => dataset
            .model1
            .get("Demanda_Total")
            .map(|s| (s, dataset.model1.dates.as_slice())),
        View::Sector(sector) => dataset
            .model2
            .get(sector.column_name())
            .map(|s| (s, dataset.model2.dates.as_slice())),
        View::Prices(market) => {
            let market = market.unwrap_or(PriceMarket::HenryHub);
            dataset
                .model1
                .get(market.column_name())
                .map(|s| (s, dataset.model1.dates.as_slice()))
        }
    }
}

fn handle_demo(args: DemoArgs) -> Result<(), AppError> {
    let mut config = run_config_from_args(&args.view, false);
    config.synthetic = true;

    let dataset = crate::data::synthetic::generate_dataset(&config)?;
    let written = crate::io::export::write_demo_exports(&args.out, &dataset)?;
    for path in &written {
        println!("Escrito: {}", path.display());
    }
    if let Some(json) = &args.json {
        crate::io::export::write_summary_json(json, &dataset)?;
        println!("Escrito: {}", json.display());
    }
    Ok(())
}

fn handle_tui(args: ViewArgs) -> Result<(), AppError> {
    // The TUI falls back to demo data instead of hard-stopping when the
    // exports are missing.
    let config = run_config_from_args(&args, true);
    crate::tui::run(config)
}

pub fn run_config_from_args(args: &ViewArgs, fallback: bool) -> RunConfig {
    RunConfig {
        data_dir: args.data_dir.clone(),
        horizon_days: args.horizon,
        start_date: args.start_date,
        seed: args.seed,
        synthetic: args.synthetic,
        fallback,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        sample_step: args.sample_step,
    }
}

/// Rewrite argv so `proyecta` defaults to `proyecta tui`.
///
/// Rules:
/// - `proyecta`                     -> `proyecta tui`
/// - `proyecta --synthetic ...`     -> `proyecta tui --synthetic ...`
/// - `proyecta --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(
        arg1.as_str(),
        "summary" | "demand" | "zones" | "sector" | "prices" | "demo" | "tui"
    );
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewritten(args: &[&str]) -> Vec<String> {
        rewrite_args(args.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn bare_invocation_defaults_to_tui() {
        assert_eq!(rewritten(&["proyecta"]), vec!["proyecta", "tui"]);
    }

    #[test]
    fn leading_flag_is_routed_to_tui() {
        assert_eq!(
            rewritten(&["proyecta", "--synthetic"]),
            vec!["proyecta", "tui", "--synthetic"]
        );
    }

    #[test]
    fn explicit_subcommands_and_help_pass_through() {
        assert_eq!(
            rewritten(&["proyecta", "summary", "--synthetic"]),
            vec!["proyecta", "summary", "--synthetic"]
        );
        assert_eq!(rewritten(&["proyecta", "--help"]), vec!["proyecta", "--help"]);
    }

    #[test]
    fn cli_parses_every_subcommand() {
        for argv in [
            vec!["proyecta", "summary"],
            vec!["proyecta", "demand", "--no-plot"],
            vec!["proyecta", "zones", "-d", "exports"],
            vec!["proyecta", "sector", "-s", "generacion-termica"],
            vec!["proyecta", "prices", "-m", "ttf"],
            vec!["proyecta", "demo", "-o", "out", "--json", "summary.json"],
            vec!["proyecta", "tui", "--seed", "7", "--horizon", "90"],
        ] {
            crate::cli::Cli::try_parse_from(&argv)
                .unwrap_or_else(|e| panic!("{argv:?}: {e}"));
        }
    }

    #[test]
    fn start_date_flag_parses_iso_dates() {
        let cli = crate::cli::Cli::try_parse_from([
            "proyecta",
            "demand",
            "--start-date",
            "2025-06-15",
        ])
        .unwrap();
        let Command::Demand(args) = cli.command else {
            panic!("wrong subcommand");
        };
        assert_eq!(
            args.start_date,
            chrono::NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
        );
    }
}
