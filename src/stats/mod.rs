//! Display statistics over daily series.
//!
//! Everything here is a pure function over slices; `None` means the input was
//! empty or mis-shaped (mismatched pair lengths), which callers surface as a
//! data error rather than a panic.

use serde::Serialize;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn variance(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    if values.len() < 2 {
        return Some(0.0);
    }
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some(ss / (values.len() as f64 - 1.0))
}

pub fn std_dev(values: &[f64]) -> Option<f64> {
    variance(values).map(f64::sqrt)
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Linear-interpolated quantile, `q` in `[0, 1]`.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let pos = q * (sorted.len() as f64 - 1.0);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let frac = pos - lo as f64;
    Some(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

/// Mean absolute percentage error (%) of `predicted` vs `actual`.
///
/// Days where `actual` is ~0 are skipped to avoid division blow-ups.
pub fn mape(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    if actual.is_empty() || actual.len() != predicted.len() {
        return None;
    }
    let mut sum = 0.0;
    let mut n = 0usize;
    for (a, p) in actual.iter().zip(predicted) {
        if a.abs() > 1e-9 {
            sum += ((p - a) / a).abs();
            n += 1;
        }
    }
    if n == 0 {
        return None;
    }
    Some(100.0 * sum / n as f64)
}

/// Mean absolute error in the variable's own units.
pub fn mae(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    if actual.is_empty() || actual.len() != predicted.len() {
        return None;
    }
    let sum: f64 = actual.iter().zip(predicted).map(|(a, p)| (p - a).abs()).sum();
    Some(sum / actual.len() as f64)
}

/// Root mean squared error in the variable's own units.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    if actual.is_empty() || actual.len() != predicted.len() {
        return None;
    }
    let sum: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (p - a) * (p - a))
        .sum();
    Some((sum / actual.len() as f64).sqrt())
}

/// Coefficient of determination of `predicted` against `actual`, relative to
/// predicting the mean.
pub fn r_squared(actual: &[f64], predicted: &[f64]) -> Option<f64> {
    if actual.len() < 2 || actual.len() != predicted.len() {
        return None;
    }
    let m = mean(actual)?;
    let ss_tot: f64 = actual.iter().map(|a| (a - m) * (a - m)).sum();
    if ss_tot <= 0.0 {
        return None;
    }
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p) * (a - p))
        .sum();
    Some(1.0 - ss_res / ss_tot)
}

/// Level summary for one series (the "Estadísticas" panels).
#[derive(Debug, Clone, Serialize)]
pub struct SeriesStats {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
    /// Coefficient of variation (%).
    pub cv_pct: f64,
    pub p05: f64,
    pub p95: f64,
}

impl SeriesStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mean = mean(values)?;
        let std_dev = std_dev(values)?;
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        if !(min.is_finite() && max.is_finite()) {
            return None;
        }
        Some(Self {
            mean,
            median: median(values)?,
            min,
            max,
            std_dev,
            cv_pct: if mean.abs() > 1e-12 { 100.0 * std_dev / mean } else { 0.0 },
            p05: quantile(values, 0.05)?,
            p95: quantile(values, 0.95)?,
        })
    }
}

/// Percentage-error distribution of predicted vs real (the "Distribución de
/// Errores" panel).
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDistribution {
    /// Mean signed percentage error.
    pub mean_pct: f64,
    /// Std dev of the signed percentage errors.
    pub std_pct: f64,
    /// Largest absolute percentage error.
    pub max_abs_pct: f64,
    /// Share of days within ±10% (as a percentage of days).
    pub within_10_pct: f64,
}

impl ErrorDistribution {
    pub fn from_pairs(real: &[f64], pred: &[f64]) -> Option<Self> {
        if real.is_empty() || real.len() != pred.len() {
            return None;
        }
        let errors: Vec<f64> = real
            .iter()
            .zip(pred)
            .filter(|(a, _)| a.abs() > 1e-9)
            .map(|(a, p)| 100.0 * (p - a) / a)
            .collect();
        if errors.is_empty() {
            return None;
        }
        let within = errors.iter().filter(|e| e.abs() < 10.0).count();
        Some(Self {
            mean_pct: mean(&errors)?,
            std_pct: std_dev(&errors)?,
            max_abs_pct: errors.iter().fold(0.0_f64, |acc, e| acc.max(e.abs())),
            within_10_pct: 100.0 * within as f64 / errors.len() as f64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mape_basic() {
        let actual = vec![100.0, 200.0];
        let predicted = vec![110.0, 180.0];
        // (10% + 10%) / 2
        let m = mape(&actual, &predicted).unwrap();
        assert!((m - 10.0).abs() < 1e-9);
    }

    #[test]
    fn mape_skips_near_zero_actuals() {
        let actual = vec![0.0, 100.0];
        let predicted = vec![5.0, 110.0];
        let m = mape(&actual, &predicted).unwrap();
        assert!((m - 10.0).abs() < 1e-9);
    }

    #[test]
    fn mape_rejects_mismatched_lengths() {
        assert!(mape(&[1.0], &[1.0, 2.0]).is_none());
    }

    #[test]
    fn mae_rmse_basic() {
        let actual = vec![1.0, 2.0, 3.0];
        let predicted = vec![2.0, 2.0, 1.0];
        assert!((mae(&actual, &predicted).unwrap() - 1.0).abs() < 1e-12);
        let expected_rmse = ((1.0 + 0.0 + 4.0) / 3.0_f64).sqrt();
        assert!((rmse(&actual, &predicted).unwrap() - expected_rmse).abs() < 1e-12);
    }

    #[test]
    fn r_squared_perfect_prediction_is_one() {
        let actual = vec![1.0, 2.0, 3.0, 4.0];
        let r2 = r_squared(&actual, &actual).unwrap();
        assert!((r2 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn r_squared_mean_prediction_is_zero() {
        let actual = vec![1.0, 2.0, 3.0, 4.0];
        let pred = vec![2.5; 4];
        let r2 = r_squared(&actual, &pred).unwrap();
        assert!(r2.abs() < 1e-12);
    }

    #[test]
    fn quantile_interpolates() {
        let v = vec![1.0, 2.0, 3.0, 4.0];
        assert!((quantile(&v, 0.0).unwrap() - 1.0).abs() < 1e-12);
        assert!((quantile(&v, 1.0).unwrap() - 4.0).abs() < 1e-12);
        assert!((median(&v).unwrap() - 2.5).abs() < 1e-12);
    }

    #[test]
    fn series_stats_constant_series() {
        let s = SeriesStats::from_values(&[7.0; 10]).unwrap();
        assert!((s.mean - 7.0).abs() < 1e-12);
        assert!((s.std_dev - 0.0).abs() < 1e-12);
        assert!((s.cv_pct - 0.0).abs() < 1e-12);
    }

    #[test]
    fn error_distribution_counts_within_band() {
        let real = vec![100.0, 100.0, 100.0, 100.0];
        let pred = vec![105.0, 95.0, 120.0, 100.0];
        let d = ErrorDistribution::from_pairs(&real, &pred).unwrap();
        assert!((d.within_10_pct - 75.0).abs() < 1e-9);
        assert!((d.max_abs_pct - 20.0).abs() < 1e-9);
    }

    #[test]
    fn empty_inputs_yield_none() {
        assert!(mean(&[]).is_none());
        assert!(mape(&[], &[]).is_none());
        assert!(SeriesStats::from_values(&[]).is_none());
    }
}
