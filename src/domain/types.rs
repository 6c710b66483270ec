//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory while building reports and TUI views
//! - exported to CSV/JSON (the `demo` subcommand)
//! - reloaded later from the real model exports

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How a synthetic series interprets its amplitude/trend/floor parameters.
///
/// Demand series are parameterized as *fractions of the mean level* and are
/// floored at `0.3 × mean_level`. The two international price benchmarks use
/// absolute USD amounts instead, with a fixed USD floor and a shorter
/// smoothing window. Both run through the same generation code path; this
/// enum is the mode flag that selects the constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesMode {
    /// Amplitude and trend are fractions of `mean_level`; floor at 30% of mean.
    Fractional,
    /// Amplitude and trend are absolute amounts (USD/MMBtu); fixed floor.
    Absolute { floor: f64 },
}

impl SeriesMode {
    /// Lower bound applied to the generated "actual" series.
    pub fn floor(self, mean_level: f64) -> f64 {
        match self {
            SeriesMode::Fractional => 0.3 * mean_level,
            SeriesMode::Absolute { floor } => floor,
        }
    }

    /// Centered moving-average window applied to the raw prediction.
    ///
    /// Price series smooth less aggressively than demand series.
    pub fn smoothing_window(self) -> usize {
        match self {
            SeriesMode::Fractional => 7,
            SeriesMode::Absolute { .. } => 5,
        }
    }
}

/// Generation parameters for a single named variable.
///
/// Constructed once (catalog constants), immutable, consumed per generation
/// call. `name` is the prediction-column base name, e.g.
/// `Demanda_Residencial_Total_MBTUD` or `Henry_Hub`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesSpec {
    pub name: String,
    /// Baseline magnitude. Must be positive.
    pub mean_level: f64,
    /// Annual sine-wave swing; fraction of mean (fractional mode) or
    /// absolute units (absolute mode).
    pub seasonal_amplitude: f64,
    /// Linear drift over the horizon; same units convention as amplitude.
    pub trend: f64,
    /// Target mean absolute percentage error (%) of predicted vs actual.
    pub target_mape: f64,
    pub mode: SeriesMode,
}

impl SeriesSpec {
    /// Validate the spec before any entropy is consumed.
    ///
    /// Returns a human-readable reason when the parameters cannot produce a
    /// meaningful series.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Series name must be non-empty.".to_string());
        }
        if !(self.mean_level.is_finite() && self.mean_level > 0.0) {
            return Err(format!(
                "`mean_level` must be finite and > 0 (got {}) for '{}'.",
                self.mean_level, self.name
            ));
        }
        if !(self.seasonal_amplitude.is_finite() && self.seasonal_amplitude >= 0.0) {
            return Err(format!(
                "`seasonal_amplitude` must be finite and >= 0 (got {}) for '{}'.",
                self.seasonal_amplitude, self.name
            ));
        }
        if !self.trend.is_finite() {
            return Err(format!("`trend` must be finite for '{}'.", self.name));
        }
        if !(self.target_mape.is_finite() && self.target_mape >= 0.0) {
            return Err(format!(
                "`target_mape` must be finite and >= 0 (got {}) for '{}'.",
                self.target_mape, self.name
            ));
        }
        if let SeriesMode::Absolute { floor } = self.mode {
            if !(floor.is_finite() && floor >= 0.0) {
                return Err(format!(
                    "Absolute floor must be finite and >= 0 (got {floor}) for '{}'.",
                    self.name
                ));
            }
        }
        Ok(())
    }
}

/// The generated (actual, predicted) pair for one variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedSeries {
    pub name: String,
    /// Consecutive calendar days, closed interval `[start, start + horizon - 1]`.
    pub dates: Vec<NaiveDate>,
    pub actual: Vec<f64>,
    pub predicted: Vec<f64>,
}

impl GeneratedSeries {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Externally supplied accuracy summary for one variable.
///
/// These figures come from the model's held-out test partition; the tool
/// displays them verbatim and never recomputes them from the prediction
/// tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub variable: String,
    /// MAPE on the test partition (%).
    pub mape: f64,
    /// Coefficient of determination on the test partition.
    pub r2: f64,
    /// Mean absolute error (variable units).
    pub mae: f64,
    /// Root mean squared error (variable units).
    pub rmse: f64,
}

/// Fixed MAPE classification buckets used across the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapeClass {
    Excelente,
    Bueno,
    Aceptable,
    Desafiante,
}

impl MapeClass {
    /// Classify a MAPE figure: `<5` best, `<10` good, `<20` acceptable,
    /// otherwise challenging.
    pub fn classify(mape: f64) -> Self {
        if mape < 5.0 {
            MapeClass::Excelente
        } else if mape < 10.0 {
            MapeClass::Bueno
        } else if mape < 20.0 {
            MapeClass::Aceptable
        } else {
            MapeClass::Desafiante
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            MapeClass::Excelente => "Excelente",
            MapeClass::Bueno => "Bueno",
            MapeClass::Aceptable => "Aceptable",
            MapeClass::Desafiante => "Desafiante",
        }
    }
}

/// The eight disaggregated consumption sectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Sector {
    Residencial,
    Petrolero,
    Gnvc,
    Refineria,
    Industrial,
    Comercial,
    #[value(name = "generacion-termica")]
    GeneracionTermica,
    Compresora,
}

impl Sector {
    pub const ALL: [Sector; 8] = [
        Sector::Residencial,
        Sector::Petrolero,
        Sector::Gnvc,
        Sector::Refineria,
        Sector::Industrial,
        Sector::Comercial,
        Sector::GeneracionTermica,
        Sector::Compresora,
    ];

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Sector::Residencial => "Residencial",
            Sector::Petrolero => "Petrolero",
            Sector::Gnvc => "GNVC",
            Sector::Refineria => "Refinería",
            Sector::Industrial => "Industrial",
            Sector::Comercial => "Comercial",
            Sector::GeneracionTermica => "Generación Térmica",
            Sector::Compresora => "Compresora",
        }
    }

    /// Prediction-column base name / metrics-table variable name.
    pub fn column_name(self) -> &'static str {
        match self {
            Sector::Residencial => "Demanda_Residencial_Total_MBTUD",
            Sector::Petrolero => "Demanda_Petrolero_Total_MBTUD",
            Sector::Gnvc => "Demanda_GNVC_Total_MBTUD",
            Sector::Refineria => "Demanda_Refineria_Total_MBTUD",
            Sector::Industrial => "Demanda_Industrial_Total_MBTUD",
            Sector::Comercial => "Demanda_Comercial_Total_MBTUD",
            Sector::GeneracionTermica => "Demanda_GeneracionTermica_Total_MBTUD",
            Sector::Compresora => "Demanda_Compresora_Total_MBTUD",
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Geographic demand zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Costa,
    Interior,
}

impl Zone {
    pub const ALL: [Zone; 2] = [Zone::Costa, Zone::Interior];

    pub fn display_name(self) -> &'static str {
        match self {
            Zone::Costa => "Costa Atlántica",
            Zone::Interior => "Interior",
        }
    }

    pub fn column_name(self) -> &'static str {
        match self {
            Zone::Costa => "Demanda_Costa_Total_MBTUD",
            Zone::Interior => "Demanda_Interior_Total_MBTUD",
        }
    }
}

/// International price benchmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PriceMarket {
    #[value(name = "henry-hub")]
    HenryHub,
    Ttf,
}

impl PriceMarket {
    pub const ALL: [PriceMarket; 2] = [PriceMarket::HenryHub, PriceMarket::Ttf];

    pub fn display_name(self) -> &'static str {
        match self {
            PriceMarket::HenryHub => "Henry Hub (EE.UU.)",
            PriceMarket::Ttf => "TTF (Europa)",
        }
    }

    /// Prediction-column base name.
    pub fn column_name(self) -> &'static str {
        match self {
            PriceMarket::HenryHub => "Henry_Hub",
            PriceMarket::Ttf => "TTF",
        }
    }

    /// Variable name used in the aggregated metrics table.
    pub fn metrics_name(self) -> &'static str {
        match self {
            PriceMarket::HenryHub => "Henry Hub",
            PriceMarket::Ttf => "TTF",
        }
    }

    pub fn next(self) -> Self {
        match self {
            PriceMarket::HenryHub => PriceMarket::Ttf,
            PriceMarket::Ttf => PriceMarket::HenryHub,
        }
    }
}

/// A paired real/predicted daily series for one variable.
#[derive(Debug, Clone)]
pub struct PairedSeries {
    pub name: String,
    pub real: Vec<f64>,
    pub pred: Vec<f64>,
}

/// One prediction table: one row per calendar day, paired columns per variable.
#[derive(Debug, Clone, Default)]
pub struct PredictionTable {
    pub dates: Vec<NaiveDate>,
    pub series: Vec<PairedSeries>,
}

impl PredictionTable {
    pub fn get(&self, name: &str) -> Option<&PairedSeries> {
        self.series.iter().find(|s| s.name == name)
    }

    pub fn n_days(&self) -> usize {
        self.dates.len()
    }
}

/// Where the loaded dataset came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    /// Real model exports read from `data_dir`.
    Files,
    /// Synthetic demo data (exports were unavailable or `--synthetic` was set).
    Synthetic,
}

impl DataSource {
    pub fn display_name(self) -> &'static str {
        match self {
            DataSource::Files => "exportaciones del modelo",
            DataSource::Synthetic => "datos sintéticos (demo)",
        }
    }
}

/// Everything the views consume, loaded once per process run.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Aggregated model metrics: `Demanda`, `Henry Hub`, `TTF`.
    pub metrics_agg: Vec<MetricsRecord>,
    /// Disaggregated model metrics: zones + sectors.
    pub metrics_disagg: Vec<MetricsRecord>,
    /// Aggregated model predictions (total demand + prices).
    pub model1: PredictionTable,
    /// Disaggregated model predictions (zones + sectors).
    pub model2: PredictionTable,
    pub source: DataSource,
    /// Non-fatal ingest notes (skipped rows etc.), surfaced in report headers.
    pub load_notes: Vec<String>,
}

impl Dataset {
    pub fn metrics_for(&self, variable: &str) -> Option<&MetricsRecord> {
        self.metrics_agg
            .iter()
            .chain(self.metrics_disagg.iter())
            .find(|m| m.variable == variable)
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory holding the four CSV exports.
    pub data_dir: PathBuf,
    /// Number of consecutive calendar days in a synthetic run.
    pub horizon_days: usize,
    /// First date of a synthetic run.
    pub start_date: NaiveDate,
    /// Base seed; per-variable streams are derived from it by name.
    pub seed: u64,
    /// Force synthetic demo data even when the exports exist.
    pub synthetic: bool,
    /// Fall back to synthetic data when the exports are missing
    /// (TUI convenience; CLI reports hard-stop instead).
    pub fallback: bool,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    /// Plot every k-th day to keep dense horizons readable.
    pub sample_step: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mape_classification_buckets() {
        assert_eq!(MapeClass::classify(3.07), MapeClass::Excelente);
        assert_eq!(MapeClass::classify(4.99), MapeClass::Excelente);
        assert_eq!(MapeClass::classify(5.0), MapeClass::Bueno);
        assert_eq!(MapeClass::classify(9.04), MapeClass::Bueno);
        assert_eq!(MapeClass::classify(10.52), MapeClass::Aceptable);
        assert_eq!(MapeClass::classify(19.99), MapeClass::Aceptable);
        assert_eq!(MapeClass::classify(33.55), MapeClass::Desafiante);
        assert_eq!(MapeClass::classify(53.23), MapeClass::Desafiante);
    }

    #[test]
    fn spec_validation_rejects_bad_mean_level() {
        let spec = SeriesSpec {
            name: "X".to_string(),
            mean_level: 0.0,
            seasonal_amplitude: 0.1,
            trend: 0.0,
            target_mape: 5.0,
            mode: SeriesMode::Fractional,
        };
        assert!(spec.validate().is_err());
    }

    #[test]
    fn spec_validation_rejects_negative_mape() {
        let spec = SeriesSpec {
            name: "X".to_string(),
            mean_level: 100.0,
            seasonal_amplitude: 0.1,
            trend: 0.0,
            target_mape: -1.0,
            mode: SeriesMode::Fractional,
        };
        assert!(spec.validate().is_err());
    }

    #[test]
    fn sector_cycling_wraps() {
        assert_eq!(Sector::Compresora.next(), Sector::Residencial);
        assert_eq!(Sector::Residencial.prev(), Sector::Compresora);
    }

    #[test]
    fn mode_floor_and_window() {
        assert!((SeriesMode::Fractional.floor(171_000.0) - 51_300.0).abs() < 1e-9);
        assert!((SeriesMode::Absolute { floor: 1.5 }.floor(3.5) - 1.5).abs() < 1e-12);
        assert_eq!(SeriesMode::Fractional.smoothing_window(), 7);
        assert_eq!(SeriesMode::Absolute { floor: 1.5 }.smoothing_window(), 5);
    }
}
