//! Demo dataset exports.
//!
//! The `demo` subcommand materializes a synthetic dataset as the same four
//! CSV files the real model pipeline exports, so downstream consumers (and
//! this tool itself) see the production schema. A JSON summary export is
//! also available for scripting.

use std::fs::{File, create_dir_all};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{DataSource, Dataset, MapeClass, MetricsRecord, PairedSeries, PredictionTable};
use crate::error::AppError;
use crate::io::load::{
    METRICS_AGG_FILE, METRICS_DISAGG_FILE, PRED_MODEL1_FILE, PRED_MODEL2_FILE,
};
use crate::stats::{self, SeriesStats};

/// Write the four CSV exports under `data_dir`, returning the paths written.
pub fn write_demo_exports(data_dir: &Path, dataset: &Dataset) -> Result<Vec<PathBuf>, AppError> {
    create_dir_all(data_dir).map_err(|e| {
        AppError::config(format!(
            "No se pudo crear la carpeta '{}': {e}",
            data_dir.display()
        ))
    })?;

    let mut written = Vec::with_capacity(4);
    for (name, records) in [
        (METRICS_AGG_FILE, &dataset.metrics_agg),
        (METRICS_DISAGG_FILE, &dataset.metrics_disagg),
    ] {
        let path = data_dir.join(name);
        write_metrics_csv(&path, records)?;
        written.push(path);
    }
    for (name, table) in [
        (PRED_MODEL1_FILE, &dataset.model1),
        (PRED_MODEL2_FILE, &dataset.model2),
    ] {
        let path = data_dir.join(name);
        write_predictions_csv(&path, table)?;
        written.push(path);
    }
    Ok(written)
}

/// Write a metrics table with the production column names.
pub fn write_metrics_csv(path: &Path, records: &[MetricsRecord]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::config(format!("No se pudo crear '{}': {e}", path.display())))?;

    writer
        .write_record(["Variable", "MAPE_Test", "R2_Test", "MAE_Test", "RMSE_Test"])
        .map_err(|e| AppError::config(format!("Error escribiendo '{}': {e}", path.display())))?;

    for r in records {
        writer
            .write_record([
                r.variable.clone(),
                format!("{:.4}", r.mape),
                format!("{:.4}", r.r2),
                format!("{:.4}", r.mae),
                format!("{:.4}", r.rmse),
            ])
            .map_err(|e| AppError::config(format!("Error escribiendo '{}': {e}", path.display())))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::config(format!("Error escribiendo '{}': {e}", path.display())))?;
    Ok(())
}

/// Write a prediction table: `Fecha` plus paired `<var>_real` / `<var>_pred`
/// columns, one row per day.
pub fn write_predictions_csv(path: &Path, table: &PredictionTable) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::config(format!("No se pudo crear '{}': {e}", path.display())))?;

    let mut header = vec!["Fecha".to_string()];
    for s in &table.series {
        header.push(format!("{}_real", s.name));
        header.push(format!("{}_pred", s.name));
    }
    writer
        .write_record(&header)
        .map_err(|e| AppError::config(format!("Error escribiendo '{}': {e}", path.display())))?;

    for (day, date) in table.dates.iter().enumerate() {
        let mut row = vec![date.format("%Y-%m-%d").to_string()];
        for s in &table.series {
            row.push(format!("{:.4}", s.real[day]));
            row.push(format!("{:.4}", s.pred[day]));
        }
        writer
            .write_record(&row)
            .map_err(|e| AppError::config(format!("Error escribiendo '{}': {e}", path.display())))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::config(format!("Error escribiendo '{}': {e}", path.display())))?;
    Ok(())
}

/// Machine-readable summary of a loaded/generated dataset.
#[derive(Debug, Serialize)]
pub struct SummaryFile {
    pub tool: String,
    pub source: String,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub n_days: usize,
    pub variables: Vec<VariableSummary>,
}

#[derive(Debug, Serialize)]
pub struct VariableSummary {
    pub variable: String,
    pub mape: f64,
    pub r2: f64,
    pub classification: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub levels: Option<SeriesStats>,
    /// MAPE realized by this generated draw (synthetic datasets only; the
    /// published `mape` stays the displayed figure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realized_mape: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub realized_r2: Option<f64>,
}

/// Write the JSON summary export.
pub fn write_summary_json(path: &Path, dataset: &Dataset) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::config(format!("No se pudo crear '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &build_summary(dataset))
        .map_err(|e| AppError::config(format!("Error escribiendo '{}': {e}", path.display())))?;
    Ok(())
}

pub fn build_summary(dataset: &Dataset) -> SummaryFile {
    let synthetic = dataset.source == DataSource::Synthetic;
    let mut variables = Vec::new();
    for m in dataset.metrics_agg.iter().chain(&dataset.metrics_disagg) {
        let paired = lookup_series(dataset, &m.variable);
        let levels = paired.and_then(|p| SeriesStats::from_values(&p.real));
        // Realized figures only make sense for a generated draw; file-mode
        // metrics come from the test partition, not from these tables.
        let (realized_mape, realized_r2) = match (synthetic, paired) {
            (true, Some(p)) => (
                stats::mape(&p.real, &p.pred),
                stats::r_squared(&p.real, &p.pred),
            ),
            _ => (None, None),
        };
        variables.push(VariableSummary {
            variable: m.variable.clone(),
            mape: m.mape,
            r2: m.r2,
            classification: MapeClass::classify(m.mape).display_name().to_string(),
            levels,
            realized_mape,
            realized_r2,
        });
    }

    SummaryFile {
        tool: "proyecta".to_string(),
        source: dataset.source.display_name().to_string(),
        first_date: dataset.model1.dates.first().copied(),
        last_date: dataset.model1.dates.last().copied(),
        n_days: dataset.model1.n_days(),
        variables,
    }
}

/// Metrics-table names differ from prediction-column names for the aggregated
/// model (`Demanda` vs `Demanda_Total`, `Henry Hub` vs `Henry_Hub`).
fn lookup_series<'a>(dataset: &'a Dataset, metrics_name: &str) -> Option<&'a PairedSeries> {
    let column = match metrics_name {
        "Demanda" => "Demanda_Total",
        "Henry Hub" => "Henry_Hub",
        other => other,
    };
    dataset
        .model1
        .get(column)
        .or_else(|| dataset.model2.get(column))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic::generate_dataset;
    use crate::domain::RunConfig;
    use crate::io::load::{load_dataset, load_metrics, load_predictions};

    fn demo_config(dir: PathBuf) -> RunConfig {
        RunConfig {
            data_dir: dir,
            horizon_days: 30,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            seed: 42,
            synthetic: true,
            fallback: false,
            plot: false,
            plot_width: 80,
            plot_height: 20,
            sample_step: 3,
        }
    }

    #[test]
    fn demo_exports_round_trip_through_loader() {
        let dir = std::env::temp_dir().join(format!("proyecta-export-{}", std::process::id()));
        let config = demo_config(dir.clone());
        let dataset = generate_dataset(&config).unwrap();

        let written = write_demo_exports(&dir, &dataset).unwrap();
        assert_eq!(written.len(), 4);

        // The exported files must satisfy this tool's own ingest schema.
        let loaded = load_dataset(&dir).unwrap();
        assert_eq!(loaded.model1.n_days(), 30);
        assert_eq!(loaded.model2.series.len(), 10);
        assert!(loaded.load_notes.is_empty());

        let (metrics, _) = load_metrics(&dir.join(METRICS_AGG_FILE)).unwrap();
        assert!(metrics.iter().any(|m| m.variable == "Henry Hub"));

        let (table, _) = load_predictions(&dir.join(PRED_MODEL2_FILE)).unwrap();
        let res = table.get("Demanda_Residencial_Total_MBTUD").unwrap();
        assert_eq!(res.real.len(), 30);
    }

    #[test]
    fn summary_covers_all_metrics_rows() {
        let dir = std::env::temp_dir().join("proyecta-summary");
        let dataset = generate_dataset(&demo_config(dir)).unwrap();
        let summary = build_summary(&dataset);
        assert_eq!(summary.variables.len(), 13);
        assert_eq!(summary.n_days, 30);
        let total = summary
            .variables
            .iter()
            .find(|v| v.variable == "Demanda")
            .unwrap();
        assert!(total.levels.is_some());
        assert_eq!(total.classification, "Excelente");
        // Synthetic datasets carry the realized figures of this draw.
        assert!(total.realized_mape.is_some());
        assert!(total.realized_r2.is_some());
    }
}
