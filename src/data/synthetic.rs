//! Synthetic (actual, predicted) series generation for demo/fallback mode.
//!
//! The generator produces a daily "actual" series with annual seasonality, a
//! weekly ripple, linear drift, and Gaussian noise, then derives a "predicted"
//! series whose deviation from the actual is statistically consistent with the
//! spec's target MAPE. A centered moving average models the tendency of the
//! underlying model to under-react to short-term spikes.
//!
//! Demand and price variables share one code path; `SeriesMode` selects the
//! fractional-vs-absolute parameter interpretation, the floor, and the
//! smoothing window.

use std::collections::hash_map::DefaultHasher;
use std::f64::consts::TAU;
use std::hash::{Hash, Hasher};

use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::data::catalog::{TableSlot, catalog};
use crate::domain::{
    DataSource, Dataset, GeneratedSeries, PairedSeries, PredictionTable, RunConfig, SeriesMode,
    SeriesSpec,
};
use crate::error::AppError;

/// Weekly ripple amplitude, as a fraction of the mean level.
const WEEKLY_AMPLITUDE: f64 = 0.03;
/// Daily Gaussian noise std dev on the actual series, as a fraction of the mean.
const NOISE_FRACTION: f64 = 0.02;
/// Annual cycle length (days) for the seasonal component.
const ANNUAL_PERIOD: f64 = 365.0;

/// Generate the paired (actual, predicted) series for one variable.
///
/// The RNG stream is derived from `base_seed` and the variable name, so
/// generation is per-variable reproducible and independent of call order.
pub fn generate(
    spec: &SeriesSpec,
    horizon_days: usize,
    start_date: NaiveDate,
    base_seed: u64,
) -> Result<GeneratedSeries, AppError> {
    spec.validate().map_err(AppError::config)?;
    if horizon_days == 0 {
        return Err(AppError::config("Horizon must be at least one day."));
    }

    let mut rng = StdRng::seed_from_u64(series_seed(base_seed, &spec.name));
    let unit_normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::runtime(format!("Noise distribution error: {e}")))?;

    let n = horizon_days;
    let mean = spec.mean_level;
    // Fractional parameters scale with the mean level; absolute ones are USD.
    let scale = match spec.mode {
        SeriesMode::Fractional => mean,
        SeriesMode::Absolute { .. } => 1.0,
    };
    let floor = spec.mode.floor(mean);

    let mut dates = Vec::with_capacity(n);
    let mut actual = Vec::with_capacity(n);

    for day in 0..n {
        // Normalized time index over the horizon.
        let t = if n > 1 { day as f64 / (n as f64 - 1.0) } else { 0.0 };

        let base = mean + spec.trend * scale * t;
        // Seasonal frequency is tied to horizon/365, inherited as-is: a fixed
        // 590-day horizon yields roughly 1.6 annual cycles.
        let seasonal =
            spec.seasonal_amplitude * scale * (TAU * t * n as f64 / ANNUAL_PERIOD).sin();
        let weekly = WEEKLY_AMPLITUDE * mean * (TAU * day as f64 / 7.0).sin();
        let noise = unit_normal.sample(&mut rng) * NOISE_FRACTION * mean;

        // Clamp (not reflect): values below the floor are truncated, which
        // skews the lower tail. Accepted behavior.
        let value = (base + seasonal + weekly + noise).max(floor);

        dates.push(start_date + Duration::days(day as i64));
        actual.push(value);
    }

    // Heteroscedastic prediction error: std scales with the day's actual level.
    let mut raw_predicted = Vec::with_capacity(n);
    for &a in &actual {
        let err_std = (spec.target_mape / 100.0) * a;
        raw_predicted.push(a + unit_normal.sample(&mut rng) * err_std);
    }

    let predicted = moving_average(&raw_predicted, spec.mode.smoothing_window());

    Ok(GeneratedSeries {
        name: spec.name.clone(),
        dates,
        actual,
        predicted,
    })
}

/// Generate the full demo dataset: all catalog variables routed into the two
/// prediction tables, with the catalog's published metrics attached.
pub fn generate_dataset(config: &RunConfig) -> Result<Dataset, AppError> {
    let mut metrics_agg = Vec::new();
    let mut metrics_disagg = Vec::new();
    let mut model1 = PredictionTable::default();
    let mut model2 = PredictionTable::default();

    for entry in catalog() {
        let series = generate(&entry.spec, config.horizon_days, config.start_date, config.seed)?;
        let paired = PairedSeries {
            name: series.name.clone(),
            real: series.actual,
            pred: series.predicted,
        };
        let table = match entry.slot {
            TableSlot::Aggregated => &mut model1,
            TableSlot::Disaggregated => &mut model2,
        };
        if table.dates.is_empty() {
            table.dates = series.dates;
        }
        table.series.push(paired);

        match entry.slot {
            TableSlot::Aggregated => metrics_agg.push(entry.fallback_metrics()),
            TableSlot::Disaggregated => metrics_disagg.push(entry.fallback_metrics()),
        }
    }

    Ok(Dataset {
        metrics_agg,
        metrics_disagg,
        model1,
        model2,
        source: DataSource::Synthetic,
        load_notes: Vec::new(),
    })
}

/// Derive a per-variable seed from the base seed and the variable name.
///
/// Keeping the derivation deterministic makes generation order-independent:
/// two runs with the same base seed produce bit-identical series for every
/// variable, regardless of which other variables were generated first.
fn series_seed(base_seed: u64, name: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    base_seed.hash(&mut hasher);
    name.hash(&mut hasher);
    hasher.finish()
}

/// Centered moving average with nearest-value edge extension.
///
/// `window` is forced odd (centered) and at least 1; a window of 1 is the
/// identity.
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    if n == 0 || window <= 1 {
        return values.to_vec();
    }
    let window = if window % 2 == 0 { window + 1 } else { window };
    let half = (window / 2) as isize;

    let mut out = Vec::with_capacity(n);
    for i in 0..n as isize {
        let mut sum = 0.0;
        for j in (i - half)..=(i + half) {
            let idx = j.clamp(0, n as isize - 1) as usize;
            sum += values[idx];
        }
        out.push(sum / window as f64);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats;

    fn residencial_spec() -> SeriesSpec {
        SeriesSpec {
            name: "Demanda_Residencial_Total_MBTUD".to_string(),
            mean_level: 171_000.0,
            seasonal_amplitude: 0.22,
            trend: 0.01,
            target_mape: 3.07,
            mode: SeriesMode::Fractional,
        }
    }

    fn compresora_spec() -> SeriesSpec {
        SeriesSpec {
            name: "Demanda_Compresora_Total_MBTUD".to_string(),
            mean_level: 49_000.0,
            seasonal_amplitude: 0.28,
            trend: 0.0,
            target_mape: 53.23,
            mode: SeriesMode::Fractional,
        }
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn lengths_match_horizon() {
        let s = generate(&residencial_spec(), 590, start(), 42).unwrap();
        assert_eq!(s.dates.len(), 590);
        assert_eq!(s.actual.len(), 590);
        assert_eq!(s.predicted.len(), 590);
    }

    #[test]
    fn dates_are_consecutive_days() {
        let s = generate(&residencial_spec(), 30, start(), 42).unwrap();
        for w in s.dates.windows(2) {
            assert_eq!((w[1] - w[0]).num_days(), 1);
        }
        assert_eq!((s.dates[29] - s.dates[0]).num_days(), 29);
    }

    #[test]
    fn actual_respects_fractional_floor() {
        // High-noise spec so the floor actually engages.
        let spec = compresora_spec();
        let s = generate(&spec, 590, start(), 42).unwrap();
        let floor = 0.3 * spec.mean_level;
        for &v in &s.actual {
            assert!(v >= floor - 1e-9, "value {v} below floor {floor}");
        }
    }

    #[test]
    fn price_series_respects_absolute_floor() {
        let spec = SeriesSpec {
            name: "Henry_Hub".to_string(),
            mean_level: 3.5,
            seasonal_amplitude: 0.55,
            trend: 0.25,
            target_mape: 8.20,
            mode: SeriesMode::Absolute { floor: 1.5 },
        };
        let s = generate(&spec, 590, start(), 42).unwrap();
        for &v in &s.actual {
            assert!(v >= 1.5 - 1e-9);
        }
    }

    #[test]
    fn same_seed_is_bit_identical() {
        let a = generate(&residencial_spec(), 590, start(), 42).unwrap();
        let b = generate(&residencial_spec(), 590, start(), 42).unwrap();
        assert_eq!(a.actual, b.actual);
        assert_eq!(a.predicted, b.predicted);
    }

    #[test]
    fn generation_is_order_independent() {
        // Generating another variable in between must not disturb the stream.
        let alone = generate(&residencial_spec(), 590, start(), 42).unwrap();
        let _other = generate(&compresora_spec(), 590, start(), 42).unwrap();
        let after = generate(&residencial_spec(), 590, start(), 42).unwrap();
        assert_eq!(alone.actual, after.actual);
        assert_eq!(alone.predicted, after.predicted);
    }

    #[test]
    fn different_seeds_differ() {
        let a = generate(&residencial_spec(), 590, start(), 42).unwrap();
        let b = generate(&residencial_spec(), 590, start(), 43).unwrap();
        assert_ne!(a.actual, b.actual);
    }

    #[test]
    fn residencial_scenario_levels_and_mape() {
        let spec = residencial_spec();
        let s = generate(&spec, 590, start(), 42).unwrap();

        let floor = 0.3 * spec.mean_level;
        let max = s.actual.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let min = s.actual.iter().cloned().fold(f64::INFINITY, f64::min);
        assert!(min >= floor - 1e-9);
        // Seasonal peak plus ripple/noise stays in a plausible band.
        assert!(max < 240_000.0, "max {max} implausibly high");
        assert!(max > 180_000.0, "max {max} implausibly low for 22% amplitude");

        // Single-draw realized MAPE approximates the target within a few points.
        let mape = stats::mape(&s.actual, &s.predicted).unwrap();
        assert!(
            (mape - spec.target_mape).abs() < 3.0,
            "realized MAPE {mape:.2} too far from target {}",
            spec.target_mape
        );
    }

    #[test]
    fn mape_sample_mean_converges_across_runs() {
        let spec = residencial_spec();
        let mut sum = 0.0;
        let runs = 8u64;
        for seed in 0..runs {
            let s = generate(&spec, 590, start(), seed).unwrap();
            sum += stats::mape(&s.actual, &s.predicted).unwrap();
        }
        let mean_mape = sum / runs as f64;
        // Tighter band for the across-runs average.
        assert!(
            (mean_mape - spec.target_mape).abs() < 2.0,
            "mean realized MAPE {mean_mape:.2} vs target {}",
            spec.target_mape
        );
    }

    #[test]
    fn compresora_scenario_shows_wide_dispersion() {
        let spec = compresora_spec();
        let s = generate(&spec, 590, start(), 42).unwrap();

        let over_30 = s
            .actual
            .iter()
            .zip(&s.predicted)
            .filter(|(a, p)| ((*p - *a) / *a).abs() > 0.30)
            .count();
        // A 53% target should frequently produce >30% daily deviations even
        // after smoothing.
        assert!(
            over_30 as f64 / s.actual.len() as f64 > 0.05,
            "only {over_30} of {} days exceeded 30% deviation",
            s.actual.len()
        );

        let mape = stats::mape(&s.actual, &s.predicted).unwrap();
        assert!(mape > 15.0, "realized MAPE {mape:.2} suspiciously tight");
    }

    #[test]
    fn smoothing_reduces_first_difference_variance() {
        let spec = compresora_spec();
        let s = generate(&spec, 590, start(), 42).unwrap();

        // Reconstruct an unsmoothed prediction with identical error draws by
        // comparing variances of day-over-day changes: the published series
        // must be strictly smoother than a fresh raw (unsmoothed) draw of the
        // same error magnitude.
        let raw: Vec<f64> = {
            let mut rng = StdRng::seed_from_u64(7);
            let unit = Normal::new(0.0, 1.0).unwrap();
            s.actual
                .iter()
                .map(|&a| a + unit.sample(&mut rng) * (spec.target_mape / 100.0) * a)
                .collect()
        };
        let smoothed = moving_average(&raw, spec.mode.smoothing_window());

        let var_raw = stats::variance(&first_diffs(&raw)).unwrap();
        let var_smoothed = stats::variance(&first_diffs(&smoothed)).unwrap();
        assert!(
            var_smoothed < var_raw,
            "smoothing did not reduce local variance ({var_smoothed} >= {var_raw})"
        );
    }

    fn first_diffs(values: &[f64]) -> Vec<f64> {
        values.windows(2).map(|w| w[1] - w[0]).collect()
    }

    #[test]
    fn moving_average_identity_for_window_one() {
        let v = vec![1.0, 2.0, 3.0];
        assert_eq!(moving_average(&v, 1), v);
    }

    #[test]
    fn moving_average_constant_series_is_unchanged() {
        let v = vec![5.0; 20];
        for x in moving_average(&v, 7) {
            assert!((x - 5.0).abs() < 1e-12);
        }
    }

    #[test]
    fn moving_average_edges_use_nearest_value() {
        // With nearest-value extension, a step series keeps its endpoints
        // biased toward the edge value rather than toward zero.
        let v = vec![10.0, 10.0, 10.0, 0.0, 0.0, 0.0];
        let sm = moving_average(&v, 3);
        assert!((sm[0] - 10.0).abs() < 1e-12);
        assert!((sm[5] - 0.0).abs() < 1e-12);
    }

    #[test]
    fn zero_horizon_is_rejected() {
        let err = generate(&residencial_spec(), 0, start(), 42).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn invalid_spec_is_rejected_before_generation() {
        let mut spec = residencial_spec();
        spec.mean_level = -1.0;
        let err = generate(&spec, 590, start(), 42).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn zero_target_mape_tracks_smoothed_actual() {
        let mut spec = residencial_spec();
        spec.target_mape = 0.0;
        let s = generate(&spec, 590, start(), 42).unwrap();
        // With no prediction error, predicted is exactly the smoothed actual.
        let expected = moving_average(&s.actual, spec.mode.smoothing_window());
        assert_eq!(s.predicted, expected);
    }

    #[test]
    fn dataset_covers_all_variables() {
        let config = RunConfig {
            data_dir: "data".into(),
            horizon_days: 60,
            start_date: start(),
            seed: 42,
            synthetic: true,
            fallback: false,
            plot: false,
            plot_width: 80,
            plot_height: 20,
            sample_step: 3,
        };
        let ds = generate_dataset(&config).unwrap();
        assert_eq!(ds.model1.series.len(), 3);
        assert_eq!(ds.model2.series.len(), 10);
        assert_eq!(ds.model1.n_days(), 60);
        assert_eq!(ds.model2.n_days(), 60);
        assert_eq!(ds.metrics_agg.len(), 3);
        assert_eq!(ds.metrics_disagg.len(), 10);
        assert_eq!(ds.source, DataSource::Synthetic);
        assert!(ds.model1.get("Henry_Hub").is_some());
        assert!(ds.metrics_for("Henry Hub").is_some());
    }
}
