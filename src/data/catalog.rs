//! Hardcoded catalog of the 13 tracked variables.
//!
//! Each entry carries the generation parameters for the synthetic fallback and
//! the published test-partition metrics used when no metrics CSVs are present.
//! Levels are MBTUD for demand variables and USD/MMBtu for the two price
//! benchmarks; the constants are consistent with the real model exports.

use crate::domain::{MetricsRecord, SeriesMode, SeriesSpec};

/// Which prediction table a variable belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSlot {
    /// Model 1: total demand + international prices.
    Aggregated,
    /// Model 2: zones + consumption sectors.
    Disaggregated,
}

/// One catalog row: generation spec + fallback metrics + routing.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub spec: SeriesSpec,
    /// `Variable` value in the corresponding metrics table (differs from the
    /// prediction-column base name for the aggregated model).
    pub metrics_name: &'static str,
    pub slot: TableSlot,
    /// Published test-partition metrics, used verbatim in demo mode.
    pub mape: f64,
    pub r2: f64,
    pub mae: f64,
    pub rmse: f64,
}

impl CatalogEntry {
    pub fn fallback_metrics(&self) -> MetricsRecord {
        MetricsRecord {
            variable: self.metrics_name.to_string(),
            mape: self.mape,
            r2: self.r2,
            mae: self.mae,
            rmse: self.rmse,
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn demand(
    column: &'static str,
    metrics_name: &'static str,
    slot: TableSlot,
    mean_level: f64,
    seasonal_amplitude: f64,
    trend: f64,
    mape: f64,
    r2: f64,
    mae: f64,
    rmse: f64,
) -> CatalogEntry {
    CatalogEntry {
        spec: SeriesSpec {
            name: column.to_string(),
            mean_level,
            seasonal_amplitude,
            trend,
            target_mape: mape,
            mode: SeriesMode::Fractional,
        },
        metrics_name,
        slot,
        mape,
        r2,
        mae,
        rmse,
    }
}

#[allow(clippy::too_many_arguments)]
fn price(
    column: &'static str,
    metrics_name: &'static str,
    mean_level: f64,
    seasonal_amplitude: f64,
    trend: f64,
    floor: f64,
    mape: f64,
    r2: f64,
    mae: f64,
    rmse: f64,
) -> CatalogEntry {
    CatalogEntry {
        spec: SeriesSpec {
            name: column.to_string(),
            mean_level,
            seasonal_amplitude,
            trend,
            target_mape: mape,
            mode: SeriesMode::Absolute { floor },
        },
        metrics_name,
        slot: TableSlot::Aggregated,
        mape,
        r2,
        mae,
        rmse,
    }
}

/// The full 13-variable catalog: 11 demand (national total, two zones, eight
/// sectors) plus two price benchmarks.
pub fn catalog() -> Vec<CatalogEntry> {
    vec![
        // Aggregated model (includes prices as exogenous features).
        demand(
            "Demanda_Total",
            "Demanda",
            TableSlot::Aggregated,
            1_020_000.0,
            0.12,
            0.015,
            4.77,
            0.812,
            38_900.0,
            52_400.0,
        ),
        price("Henry_Hub", "Henry Hub", 3.5, 0.55, 0.25, 1.5, 8.20, 0.570, 0.26, 0.34),
        price("TTF", "TTF", 11.0, 2.2, -0.8, 4.0, 6.67, 0.555, 0.68, 0.92),
        // Disaggregated model: geographic zones.
        demand(
            "Demanda_Costa_Total_MBTUD",
            "Demanda_Costa_Total_MBTUD",
            TableSlot::Disaggregated,
            522_000.0,
            0.10,
            0.012,
            16.32,
            0.214,
            68_500.0,
            84_100.0,
        ),
        demand(
            "Demanda_Interior_Total_MBTUD",
            "Demanda_Interior_Total_MBTUD",
            TableSlot::Disaggregated,
            498_000.0,
            0.14,
            0.018,
            9.04,
            0.468,
            36_200.0,
            47_800.0,
        ),
        // Disaggregated model: consumption sectors.
        demand(
            "Demanda_Residencial_Total_MBTUD",
            "Demanda_Residencial_Total_MBTUD",
            TableSlot::Disaggregated,
            171_000.0,
            0.22,
            0.01,
            3.07,
            0.734,
            4_300.0,
            5_600.0,
        ),
        demand(
            "Demanda_Petrolero_Total_MBTUD",
            "Demanda_Petrolero_Total_MBTUD",
            TableSlot::Disaggregated,
            18_500.0,
            0.03,
            0.0,
            4.85,
            0.412,
            780.0,
            1_020.0,
        ),
        demand(
            "Demanda_GNVC_Total_MBTUD",
            "Demanda_GNVC_Total_MBTUD",
            TableSlot::Disaggregated,
            62_000.0,
            0.08,
            0.13,
            6.44,
            0.621,
            3_400.0,
            4_400.0,
        ),
        demand(
            "Demanda_Refineria_Total_MBTUD",
            "Demanda_Refineria_Total_MBTUD",
            TableSlot::Disaggregated,
            107_000.0,
            0.09,
            -0.01,
            12.18,
            0.183,
            11_400.0,
            14_900.0,
        ),
        demand(
            "Demanda_Industrial_Total_MBTUD",
            "Demanda_Industrial_Total_MBTUD",
            TableSlot::Disaggregated,
            122_000.0,
            0.07,
            0.02,
            8.76,
            0.352,
            9_200.0,
            12_100.0,
        ),
        demand(
            "Demanda_Comercial_Total_MBTUD",
            "Demanda_Comercial_Total_MBTUD",
            TableSlot::Disaggregated,
            60_000.0,
            0.18,
            0.015,
            7.93,
            0.584,
            4_100.0,
            5_300.0,
        ),
        demand(
            "Demanda_GeneracionTermica_Total_MBTUD",
            "Demanda_GeneracionTermica_Total_MBTUD",
            TableSlot::Disaggregated,
            290_000.0,
            0.35,
            0.0,
            33.55,
            0.071,
            74_000.0,
            96_500.0,
        ),
        demand(
            "Demanda_Compresora_Total_MBTUD",
            "Demanda_Compresora_Total_MBTUD",
            TableSlot::Disaggregated,
            49_000.0,
            0.28,
            0.0,
            53.23,
            0.018,
            18_700.0,
            24_300.0,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_thirteen_valid_entries() {
        let cat = catalog();
        assert_eq!(cat.len(), 13);
        for entry in &cat {
            entry
                .spec
                .validate()
                .unwrap_or_else(|e| panic!("invalid catalog spec: {e}"));
        }
    }

    #[test]
    fn catalog_routing_matches_models() {
        let cat = catalog();
        let agg: Vec<_> = cat.iter().filter(|e| e.slot == TableSlot::Aggregated).collect();
        let disagg: Vec<_> = cat
            .iter()
            .filter(|e| e.slot == TableSlot::Disaggregated)
            .collect();
        // Model 1 carries total demand and both prices; model 2 the rest.
        assert_eq!(agg.len(), 3);
        assert_eq!(disagg.len(), 10);
        assert!(agg.iter().any(|e| e.spec.name == "Demanda_Total"));
        assert!(agg.iter().any(|e| e.spec.name == "Henry_Hub"));
        assert!(disagg.iter().any(|e| e.spec.name == "Demanda_Compresora_Total_MBTUD"));
    }

    #[test]
    fn catalog_names_are_unique() {
        let cat = catalog();
        for (i, a) in cat.iter().enumerate() {
            for b in cat.iter().skip(i + 1) {
                assert_ne!(a.spec.name, b.spec.name);
            }
        }
    }

    #[test]
    fn price_entries_use_absolute_mode() {
        for entry in catalog() {
            let is_price = entry.spec.name == "Henry_Hub" || entry.spec.name == "TTF";
            let is_absolute = matches!(entry.spec.mode, SeriesMode::Absolute { .. });
            assert_eq!(is_price, is_absolute, "{}", entry.spec.name);
        }
    }
}
