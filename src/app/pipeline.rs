//! Shared dataset pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! check exports -> load CSVs (or generate synthetic demo data) -> Dataset
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use crate::data::synthetic::generate_dataset;
use crate::domain::{Dataset, RunConfig};
use crate::error::AppError;
use crate::io::load::{check_required_files, load_dataset};

/// Resolve the dataset for one run.
///
/// `--synthetic` forces demo data. Otherwise the four CSV exports are
/// required; when they are missing the TUI (`fallback`) switches to demo
/// data while the report subcommands hard-stop with the remediation
/// message.
pub fn load_or_generate(config: &RunConfig) -> Result<Dataset, AppError> {
    if config.synthetic {
        return generate_dataset(config);
    }

    match check_required_files(&config.data_dir) {
        Ok(()) => load_dataset(&config.data_dir),
        Err(_) if config.fallback => generate_dataset(config),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DataSource;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn config(dir: PathBuf) -> RunConfig {
        RunConfig {
            data_dir: dir,
            horizon_days: 30,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            seed: 42,
            synthetic: false,
            fallback: false,
            plot: false,
            plot_width: 80,
            plot_height: 20,
            sample_step: 3,
        }
    }

    #[test]
    fn missing_exports_hard_stop_without_fallback() {
        let dir = std::env::temp_dir().join("proyecta-pipeline-missing");
        let err = load_or_generate(&config(dir)).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn missing_exports_fall_back_when_allowed() {
        let dir = std::env::temp_dir().join("proyecta-pipeline-fallback");
        let mut cfg = config(dir);
        cfg.fallback = true;
        let dataset = load_or_generate(&cfg).unwrap();
        assert_eq!(dataset.source, DataSource::Synthetic);
        assert_eq!(dataset.model1.n_days(), 30);
    }

    #[test]
    fn synthetic_flag_skips_the_file_check() {
        let dir = std::env::temp_dir().join("proyecta-pipeline-synth");
        let mut cfg = config(dir);
        cfg.synthetic = true;
        let dataset = load_or_generate(&cfg).unwrap();
        assert_eq!(dataset.source, DataSource::Synthetic);
    }
}
