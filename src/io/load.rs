//! CSV ingest and normalization of the four model exports.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (no hidden randomness)
//! - **Separation of concerns**: no statistics or rendering here

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::{DataSource, Dataset, MetricsRecord, PairedSeries, PredictionTable};
use crate::error::AppError;

/// Aggregated-model metrics: one row per high-level variable.
pub const METRICS_AGG_FILE: &str = "xgboost_metricas.csv";
/// Disaggregated-model metrics: one row per zone/sector variable.
pub const METRICS_DISAGG_FILE: &str = "xgboost_metricas_desagregadas.csv";
/// Aggregated-model predictions: total demand + prices, one row per day.
pub const PRED_MODEL1_FILE: &str = "predicciones_modelo1_xgboost.csv";
/// Disaggregated-model predictions: zones + sectors, one row per day.
pub const PRED_MODEL2_FILE: &str = "predicciones_modelo2_desagregado.csv";

pub const REQUIRED_FILES: [&str; 4] = [
    METRICS_AGG_FILE,
    METRICS_DISAGG_FILE,
    PRED_MODEL1_FILE,
    PRED_MODEL2_FILE,
];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Verify all four exports exist, or fail with a remediation message naming
/// every expected file and the directory searched.
pub fn check_required_files(data_dir: &Path) -> Result<(), AppError> {
    let missing: Vec<&str> = REQUIRED_FILES
        .iter()
        .copied()
        .filter(|f| !data_dir.join(f).is_file())
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    let mut msg = format!(
        "Faltan archivos de predicción en '{}':\n",
        data_dir.display()
    );
    for f in &missing {
        msg.push_str(&format!("  - {f}\n"));
    }
    msg.push_str("Los cuatro archivos esperados son:\n");
    for f in REQUIRED_FILES {
        msg.push_str(&format!("  - {f}\n"));
    }
    msg.push_str("Copia las exportaciones del modelo a esa carpeta, o ejecuta con --synthetic para usar datos de demostración.");
    Err(AppError::config(msg))
}

/// Load the full dataset from `data_dir`.
///
/// Performed once per process run; every view shares the result.
pub fn load_dataset(data_dir: &Path) -> Result<Dataset, AppError> {
    check_required_files(data_dir)?;

    let mut notes = Vec::new();

    let (metrics_agg, errs) = load_metrics(&data_dir.join(METRICS_AGG_FILE))?;
    push_notes(&mut notes, METRICS_AGG_FILE, &errs);

    let (metrics_disagg, errs) = load_metrics(&data_dir.join(METRICS_DISAGG_FILE))?;
    push_notes(&mut notes, METRICS_DISAGG_FILE, &errs);

    let (model1, errs) = load_predictions(&data_dir.join(PRED_MODEL1_FILE))?;
    push_notes(&mut notes, PRED_MODEL1_FILE, &errs);

    let (model2, errs) = load_predictions(&data_dir.join(PRED_MODEL2_FILE))?;
    push_notes(&mut notes, PRED_MODEL2_FILE, &errs);

    Ok(Dataset {
        metrics_agg,
        metrics_disagg,
        model1,
        model2,
        source: DataSource::Files,
        load_notes: notes,
    })
}

fn push_notes(notes: &mut Vec<String>, file: &str, errs: &[RowError]) {
    for e in errs {
        notes.push(format!("{file}:{}: {}", e.line, e.message));
    }
}

/// Load a metrics table (`Variable`, `MAPE_Test`, `R2_Test`, `MAE_Test`,
/// `RMSE_Test`).
pub fn load_metrics(path: &Path) -> Result<(Vec<MetricsRecord>, Vec<RowError>), AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::config(format!("No se pudo abrir '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::config(format!("Cabeceras inválidas en '{}': {e}", path.display())))?
        .clone();
    let header_map = build_header_map(&headers);

    for required in ["variable", "mape_test", "r2_test", "mae_test", "rmse_test"] {
        if !header_map.contains_key(required) {
            return Err(AppError::config(format!(
                "Columna requerida `{required}` ausente en '{}'.",
                path.display()
            )));
        }
    }

    let mut records = Vec::new();
    let mut row_errors = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header row, CSV lines are 1-based.
        let line = idx + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("Error de formato CSV: {e}"),
                });
                continue;
            }
        };

        match parse_metrics_row(&record, &header_map) {
            Ok(rec) => records.push(rec),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if records.is_empty() {
        return Err(AppError::no_data(format!(
            "Ninguna fila válida de métricas en '{}'.",
            path.display()
        )));
    }

    Ok((records, row_errors))
}

fn parse_metrics_row(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
) -> Result<MetricsRecord, String> {
    let variable = get_required(record, header_map, "variable")?.to_string();
    let mape = parse_f64(get_required(record, header_map, "mape_test")?, "MAPE_Test")?;
    let r2 = parse_f64(get_required(record, header_map, "r2_test")?, "R2_Test")?;
    let mae = parse_f64(get_required(record, header_map, "mae_test")?, "MAE_Test")?;
    let rmse = parse_f64(get_required(record, header_map, "rmse_test")?, "RMSE_Test")?;

    if mape < 0.0 || mae < 0.0 || rmse < 0.0 {
        return Err("Métricas negativas (MAPE/MAE/RMSE deben ser >= 0).".to_string());
    }

    Ok(MetricsRecord {
        variable,
        mape,
        r2,
        mae,
        rmse,
    })
}

/// Load a prediction table: a `Fecha` column plus paired `<var>_real` /
/// `<var>_pred` columns.
pub fn load_predictions(path: &Path) -> Result<(PredictionTable, Vec<RowError>), AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::config(format!("No se pudo abrir '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::config(format!("Cabeceras inválidas en '{}': {e}", path.display())))?
        .clone();
    let header_map = build_header_map(&headers);

    let date_idx = *header_map
        .get("fecha")
        .ok_or_else(|| AppError::config(format!("Columna `Fecha` ausente en '{}'.", path.display())))?;

    // Pair every `<var>_real` with its `<var>_pred`; unpaired columns are a
    // schema error (a half-exported variable is worse than a missing one).
    let mut pairs: Vec<(String, usize, usize)> = Vec::new();
    for (name, &real_idx) in &header_map {
        if let Some(base) = name.strip_suffix("_real") {
            let pred_idx = header_map.get(&format!("{base}_pred")).copied().ok_or_else(|| {
                AppError::config(format!(
                    "Columna `{base}_pred` ausente en '{}' (pareja de `{base}_real`).",
                    path.display()
                ))
            })?;
            // Recover the original casing from the raw headers.
            let original = headers
                .get(real_idx)
                .map(normalize_bom)
                .and_then(|h| h.strip_suffix("_real").map(str::to_string))
                .unwrap_or_else(|| base.to_string());
            pairs.push((original, real_idx, pred_idx));
        }
    }
    if pairs.is_empty() {
        return Err(AppError::config(format!(
            "Sin columnas `<variable>_real`/`<variable>_pred` en '{}'.",
            path.display()
        )));
    }
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    let mut dates = Vec::new();
    let mut columns: Vec<Vec<(f64, f64)>> = vec![Vec::new(); pairs.len()];
    let mut row_errors = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("Error de formato CSV: {e}"),
                });
                continue;
            }
        };

        let date = match record.get(date_idx).map(str::trim) {
            Some(s) if !s.is_empty() => match parse_date(s) {
                Ok(d) => d,
                Err(message) => {
                    row_errors.push(RowError { line, message });
                    continue;
                }
            },
            _ => {
                row_errors.push(RowError {
                    line,
                    message: "Valor de `Fecha` vacío.".to_string(),
                });
                continue;
            }
        };

        // Whole-row semantics: any unparsable value skips the day for all
        // variables so the table stays rectangular.
        let mut row_values = Vec::with_capacity(pairs.len());
        let mut bad: Option<String> = None;
        for (base, real_idx, pred_idx) in &pairs {
            let real = record.get(*real_idx).and_then(parse_opt_f64);
            let pred = record.get(*pred_idx).and_then(parse_opt_f64);
            match (real, pred) {
                (Some(r), Some(p)) => row_values.push((r, p)),
                _ => {
                    bad = Some(format!("Valor inválido para `{base}`."));
                    break;
                }
            }
        }
        if let Some(message) = bad {
            row_errors.push(RowError { line, message });
            continue;
        }

        dates.push(date);
        for (col, v) in columns.iter_mut().zip(row_values) {
            col.push(v);
        }
    }

    if dates.is_empty() {
        return Err(AppError::no_data(format!(
            "Ninguna fila válida de predicciones en '{}'.",
            path.display()
        )));
    }

    let series = pairs
        .into_iter()
        .zip(columns)
        .map(|((name, _, _), values)| {
            let (real, pred) = values.into_iter().unzip();
            PairedSeries { name, real, pred }
        })
        .collect();

    Ok((PredictionTable { dates, series }, row_errors))
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_bom(name).to_ascii_lowercase(), idx))
        .collect()
}

fn normalize_bom(name: &str) -> &str {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header (e.g. "﻿Fecha"). If we don't strip it, schema validation
    // will incorrectly report missing columns.
    name.trim().trim_start_matches('\u{feff}')
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // Pandas exports ISO dates, but hand-touched files often use slashes or
    // day-first ordering. Accept a small deterministic set of formats.
    const FMTS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Fecha inválida '{s}'. Formatos aceptados: YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY, YYYY/MM/DD."
    ))
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Columna requerida `{name}` ausente."))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Valor requerido `{name}` vacío."))
}

fn parse_f64(s: &str, label: &str) -> Result<f64, String> {
    let v: f64 = s
        .parse()
        .map_err(|_| format!("Valor numérico inválido para `{label}`: '{s}'."))?;
    if !v.is_finite() {
        return Err(format!("Valor no finito para `{label}`."));
    }
    Ok(v)
}

fn parse_opt_f64(s: &str) -> Option<f64> {
    let v = s.trim().parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(name: &str, contents: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("proyecta-test-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn metrics_happy_path() {
        let path = write_temp(
            "m.csv",
            "Variable,MAPE_Test,R2_Test,MAE_Test,RMSE_Test\n\
             Demanda,10.52,0.044,38900,52400\n\
             Henry Hub,8.20,0.570,0.26,0.34\n",
        );
        let (records, errs) = load_metrics(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert!(errs.is_empty());
        assert_eq!(records[0].variable, "Demanda");
        assert!((records[0].mape - 10.52).abs() < 1e-9);
        assert!((records[1].r2 - 0.570).abs() < 1e-9);
    }

    #[test]
    fn metrics_bad_row_is_skipped_with_note() {
        let path = write_temp(
            "m_bad.csv",
            "Variable,MAPE_Test,R2_Test,MAE_Test,RMSE_Test\n\
             Demanda,not-a-number,0.044,1,1\n\
             TTF,6.67,0.555,0.68,0.92\n",
        );
        let (records, errs) = load_metrics(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].line, 2);
    }

    #[test]
    fn metrics_missing_column_is_config_error() {
        let path = write_temp("m_nocol.csv", "Variable,MAPE_Test\nDemanda,10.5\n");
        let err = load_metrics(&path).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn metrics_all_rows_bad_is_no_data() {
        let path = write_temp(
            "m_empty.csv",
            "Variable,MAPE_Test,R2_Test,MAE_Test,RMSE_Test\nDemanda,x,y,z,w\n",
        );
        let err = load_metrics(&path).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn predictions_happy_path() {
        let path = write_temp(
            "p.csv",
            "Fecha,Demanda_Total_real,Demanda_Total_pred,TTF_real,TTF_pred\n\
             2024-01-01,1000.0,1010.0,11.0,10.8\n\
             2024-01-02,1005.0,1000.0,11.2,11.1\n",
        );
        let (table, errs) = load_predictions(&path).unwrap();
        assert!(errs.is_empty());
        assert_eq!(table.n_days(), 2);
        let demanda = table.get("Demanda_Total").unwrap();
        assert_eq!(demanda.real, vec![1000.0, 1005.0]);
        assert_eq!(demanda.pred, vec![1010.0, 1000.0]);
        assert!(table.get("TTF").is_some());
    }

    #[test]
    fn predictions_accepts_day_first_dates() {
        let path = write_temp(
            "p_dmy.csv",
            "Fecha,X_real,X_pred\n02/01/2024,1.0,1.1\n",
        );
        let (table, _) = load_predictions(&path).unwrap();
        assert_eq!(
            table.dates[0],
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
    }

    #[test]
    fn predictions_unpaired_column_is_config_error() {
        let path = write_temp("p_unpaired.csv", "Fecha,X_real\n2024-01-01,1.0\n");
        let err = load_predictions(&path).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn predictions_bad_value_skips_whole_row() {
        let path = write_temp(
            "p_badrow.csv",
            "Fecha,X_real,X_pred\n\
             2024-01-01,1.0,oops\n\
             2024-01-02,2.0,2.1\n",
        );
        let (table, errs) = load_predictions(&path).unwrap();
        assert_eq!(table.n_days(), 1);
        assert_eq!(errs.len(), 1);
        assert_eq!(table.get("X").unwrap().real, vec![2.0]);
    }

    #[test]
    fn predictions_bom_header_is_tolerated() {
        let path = write_temp(
            "p_bom.csv",
            "\u{feff}Fecha,X_real,X_pred\n2024-01-01,1.0,1.1\n",
        );
        let (table, _) = load_predictions(&path).unwrap();
        assert_eq!(table.n_days(), 1);
    }

    #[test]
    fn missing_files_message_names_all_four() {
        let dir = std::env::temp_dir().join(format!("proyecta-missing-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let err = check_required_files(&dir).unwrap_err();
        let msg = err.to_string();
        for f in REQUIRED_FILES {
            assert!(msg.contains(f), "message should mention {f}");
        }
        assert_eq!(err.exit_code(), 2);
    }
}
