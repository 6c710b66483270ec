//! Formatted terminal output for every dashboard view.

use crate::domain::{Dataset, MapeClass, MetricsRecord, PairedSeries, PriceMarket, Sector, Zone};
use crate::error::AppError;
use crate::stats::{ErrorDistribution, SeriesStats};

/// Strip the export naming convention for display:
/// `Demanda_Residencial_Total_MBTUD` -> `Residencial`.
pub fn clean_variable_name(raw: &str) -> String {
    raw.trim_start_matches("Demanda_")
        .trim_end_matches("_Total_MBTUD")
        .replace('_', " ")
}

/// Common report header: title, data source, coverage, ingest notes.
pub fn format_header(dataset: &Dataset) -> String {
    let mut out = String::new();
    out.push_str("=== ProyectaGAS - Predicción de Demanda y Precios ===\n");
    out.push_str(&format!("Fuente: {}\n", dataset.source.display_name()));

    if let (Some(first), Some(last)) = (dataset.model1.dates.first(), dataset.model1.dates.last()) {
        out.push_str(&format!(
            "Horizonte: {first} → {last} ({} días)\n",
            dataset.model1.n_days()
        ));
    }
    if !dataset.load_notes.is_empty() {
        out.push_str(&format!(
            "Avisos de carga: {} fila(s) descartada(s); primera: {}\n",
            dataset.load_notes.len(),
            dataset.load_notes[0]
        ));
    }
    out.push('\n');
    out
}

/// Tab 1: executive summary.
pub fn format_executive_summary(dataset: &Dataset) -> Result<String, AppError> {
    let mut out = format_header(dataset);
    out.push_str("Resumen Ejecutivo\n\n");

    let best_sector = best_by_mape(&dataset.metrics_disagg)
        .ok_or_else(|| AppError::no_data("Sin métricas desagregadas para el resumen."))?;
    out.push_str(&format!(
        "Mejor demanda sectorial: {} ({:.2}% MAPE)\n",
        clean_variable_name(&best_sector.variable),
        best_sector.mape
    ));

    let prices: Vec<&MetricsRecord> = dataset
        .metrics_agg
        .iter()
        .filter(|m| PriceMarket::ALL.iter().any(|p| p.metrics_name() == m.variable))
        .collect();
    if let Some(best_price) = prices
        .iter()
        .min_by(|a, b| cmp_f64(a.mape, b.mape))
    {
        out.push_str(&format!(
            "Mejor precio: {} ({:.2}% MAPE)\n",
            best_price.variable, best_price.mape
        ));
    }

    if let Some(total) = dataset.metrics_for("Demanda") {
        out.push_str(&format!(
            "Demanda Total (agregado): {:.2}% MAPE | R² {:.3}\n",
            total.mape, total.r2
        ));
    }

    let demand_vars: Vec<&MetricsRecord> = dataset
        .metrics_agg
        .iter()
        .filter(|m| m.variable == "Demanda")
        .chain(dataset.metrics_disagg.iter())
        .collect();
    let good = demand_vars.iter().filter(|m| m.mape < 10.0).count();
    out.push_str(&format!(
        "Variables de demanda con MAPE <10%: {} de {}\n\n",
        good,
        demand_vars.len()
    ));

    out.push_str("Métricas detalladas (demanda desagregada, orden por MAPE):\n");
    let mut sorted = dataset.metrics_disagg.clone();
    sorted.sort_by(|a, b| cmp_f64(a.mape, b.mape));
    out.push_str(&format_metrics_table(&sorted));

    if let Some(worst) = sorted.last() {
        out.push_str(&format!(
            "\nMás desafiante: {} ({:.2}% MAPE) — requiere variables exógenas.\n",
            clean_variable_name(&worst.variable),
            worst.mape
        ));
    }

    Ok(out)
}

/// Tab 2: national total demand.
pub fn format_demand_report(dataset: &Dataset) -> Result<String, AppError> {
    let mut out = format_header(dataset);
    out.push_str("Demanda Total Nacional\n\n");

    let metrics = dataset
        .metrics_for("Demanda")
        .ok_or_else(|| AppError::no_data("Sin métricas para `Demanda` en la tabla agregada."))?;
    out.push_str(&format!(
        "MAPE: {:.2}%   R²: {:.3}   Clasificación: {}\n",
        metrics.mape,
        metrics.r2,
        MapeClass::classify(metrics.mape).display_name()
    ));

    let paired = require_series(dataset, true, "Demanda_Total")?;
    let stats = series_stats(paired)?;
    out.push_str(&format!(
        "Media: {} MBTUD   Días proyectados: {}\n\n",
        fmt_thousands(stats.mean),
        paired.real.len()
    ));

    out.push_str(&format_level_stats("Estadísticas de consumo (MBTUD)", &stats, false));
    out.push_str(&format_error_distribution(paired)?);
    Ok(out)
}

/// Tab 3: coastal vs interior zones.
pub fn format_zones_report(dataset: &Dataset) -> Result<String, AppError> {
    let mut out = format_header(dataset);
    out.push_str("Demanda por Zona Geográfica\n\n");

    let mut mapes = Vec::new();
    for zone in Zone::ALL {
        let metrics = dataset.metrics_for(zone.column_name()).ok_or_else(|| {
            AppError::no_data(format!("Sin métricas para `{}`.", zone.column_name()))
        })?;
        let paired = require_series(dataset, false, zone.column_name())?;
        let stats = series_stats(paired)?;

        out.push_str(&format!("{}\n", zone.display_name()));
        out.push_str(&format!(
            "  MAPE: {:.2}%   R²: {:.3}   Clasificación: {}\n",
            metrics.mape,
            metrics.r2,
            MapeClass::classify(metrics.mape).display_name()
        ));
        out.push_str(&format!(
            "  Media: {} MBTUD   Rango: [{}, {}]\n\n",
            fmt_thousands(stats.mean),
            fmt_thousands(stats.min),
            fmt_thousands(stats.max)
        ));
        mapes.push((zone, metrics.mape));
    }

    // Predictability ratio between the two zones.
    if let [(za, ma), (zb, mb)] = mapes.as_slice() {
        let (better, worse, ratio) = if ma <= mb {
            (za, zb, mb / ma)
        } else {
            (zb, za, ma / mb)
        };
        out.push_str(&format!(
            "Análisis diferencial: {} es {:.1}× más predecible que {}.\n",
            better.display_name(),
            ratio,
            worse.display_name()
        ));
    }

    Ok(out)
}

/// Tab 4: one consumption sector.
pub fn format_sector_report(dataset: &Dataset, sector: Sector) -> Result<String, AppError> {
    let mut out = format_header(dataset);
    out.push_str(&format!("Análisis por Sector: {}\n\n", sector.display_name()));

    let metrics = dataset.metrics_for(sector.column_name()).ok_or_else(|| {
        AppError::no_data(format!("Sin métricas para `{}`.", sector.column_name()))
    })?;

    // Ranking among the eight sectors only (zones excluded).
    let mut sector_mapes: Vec<(Sector, f64)> = Sector::ALL
        .iter()
        .filter_map(|s| dataset.metrics_for(s.column_name()).map(|m| (*s, m.mape)))
        .collect();
    sector_mapes.sort_by(|a, b| cmp_f64(a.1, b.1));
    let position = sector_mapes
        .iter()
        .position(|(s, _)| *s == sector)
        .map(|p| p + 1)
        .unwrap_or(0);

    out.push_str(&format!(
        "MAPE: {:.2}%   R²: {:.3}   Ranking: {position} de {}   Clasificación: {}\n\n",
        metrics.mape,
        metrics.r2,
        sector_mapes.len(),
        MapeClass::classify(metrics.mape).display_name()
    ));

    let paired = require_series(dataset, false, sector.column_name())?;
    let stats = series_stats(paired)?;
    out.push_str(&format_level_stats("Estadísticas de consumo (MBTUD)", &stats, false));
    out.push_str(&format_error_distribution(paired)?);
    Ok(out)
}

/// Tab 5: international prices. `market = None` renders both plus the
/// comparison table.
pub fn format_prices_report(dataset: &Dataset, market: Option<PriceMarket>) -> Result<String, AppError> {
    let mut out = format_header(dataset);
    out.push_str("Precios Internacionales de Gas Natural\n\n");

    let markets: Vec<PriceMarket> = match market {
        Some(m) => vec![m],
        None => PriceMarket::ALL.to_vec(),
    };

    for m in &markets {
        let metrics = dataset.metrics_for(m.metrics_name()).ok_or_else(|| {
            AppError::no_data(format!("Sin métricas para `{}`.", m.metrics_name()))
        })?;
        let paired = require_series(dataset, true, m.column_name())?;
        let stats = series_stats(paired)?;

        out.push_str(&format!("{}\n", m.display_name()));
        out.push_str(&format!(
            "  MAPE: {:.2}%   R²: {:.3}   Clasificación: {}\n",
            metrics.mape,
            metrics.r2,
            MapeClass::classify(metrics.mape).display_name()
        ));
        out.push_str(&format_level_stats("  Precio (USD/MMBtu)", &stats, true));
        out.push('\n');
    }

    if markets.len() > 1 {
        out.push_str("Comparación de proyección:\n");
        out.push_str(&format_price_comparison(dataset)?);
    }

    Ok(out)
}

/// Side-by-side Henry Hub vs TTF metric table.
pub fn format_price_comparison(dataset: &Dataset) -> Result<String, AppError> {
    let hh = dataset
        .metrics_for(PriceMarket::HenryHub.metrics_name())
        .ok_or_else(|| AppError::no_data("Sin métricas para `Henry Hub`."))?;
    let ttf = dataset
        .metrics_for(PriceMarket::Ttf.metrics_name())
        .ok_or_else(|| AppError::no_data("Sin métricas para `TTF`."))?;

    let mut out = String::new();
    out.push_str(&format!(
        "{:<10} {:>12} {:>12}\n",
        "Métrica", "Henry Hub", "TTF"
    ));
    out.push_str(&format!("{:-<10} {:-<12} {:-<12}\n", "", "", ""));
    out.push_str(&format!(
        "{:<10} {:>11.2}% {:>11.2}%\n",
        "MAPE", hh.mape, ttf.mape
    ));
    out.push_str(&format!("{:<10} {:>12.3} {:>12.3}\n", "R²", hh.r2, ttf.r2));
    out.push_str(&format!("{:<10} {:>11.3}$ {:>11.3}$\n", "MAE", hh.mae, ttf.mae));
    out.push_str(&format!(
        "{:<10} {:>11.3}$ {:>11.3}$\n",
        "RMSE", hh.rmse, ttf.rmse
    ));
    Ok(out)
}

/// Fixed-width metrics table with the MAPE classification column.
pub fn format_metrics_table(records: &[MetricsRecord]) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<22} {:>10} {:>8} {:<12}\n",
        "Variable", "MAPE", "R²", "Clasificación"
    ));
    out.push_str(&format!("{:-<22} {:-<10} {:-<8} {:-<12}\n", "", "", "", ""));
    for r in records {
        out.push_str(&format!(
            "{:<22} {:>9.2}% {:>8.3} {:<12}\n",
            truncate(&clean_variable_name(&r.variable), 22),
            r.mape,
            r.r2,
            MapeClass::classify(r.mape).display_name()
        ));
    }
    out
}

fn format_level_stats(title: &str, stats: &SeriesStats, usd: bool) -> String {
    let f = |v: f64| {
        if usd {
            format!("${v:.2}")
        } else {
            fmt_thousands(v)
        }
    };
    let mut out = String::new();
    out.push_str(&format!("{title}:\n"));
    out.push_str(&format!(
        "  Promedio: {}   Mediana: {}   Máximo: {}   Mínimo: {}\n",
        f(stats.mean),
        f(stats.median),
        f(stats.max),
        f(stats.min)
    ));
    out.push_str(&format!(
        "  Desv. estándar: {}   Coef. variación: {:.1}%   P5: {}   P95: {}\n",
        f(stats.std_dev),
        stats.cv_pct,
        f(stats.p05),
        f(stats.p95)
    ));
    out
}

fn format_error_distribution(paired: &PairedSeries) -> Result<String, AppError> {
    let dist = ErrorDistribution::from_pairs(&paired.real, &paired.pred).ok_or_else(|| {
        AppError::no_data(format!("Serie `{}` vacía o mal formada.", paired.name))
    })?;
    let mut out = String::new();
    out.push_str("Distribución de errores (pred vs real):\n");
    out.push_str(&format!(
        "  Error medio: {:+.2}%   Desv. estándar: {:.2}%   Error máximo: {:.2}%   Dentro de ±10%: {:.1}%\n",
        dist.mean_pct, dist.std_pct, dist.max_abs_pct, dist.within_10_pct
    ));
    Ok(out)
}

fn series_stats(paired: &PairedSeries) -> Result<SeriesStats, AppError> {
    SeriesStats::from_values(&paired.real)
        .ok_or_else(|| AppError::no_data(format!("Serie `{}` vacía.", paired.name)))
}

fn require_series<'a>(
    dataset: &'a Dataset,
    aggregated: bool,
    column: &str,
) -> Result<&'a PairedSeries, AppError> {
    let table = if aggregated { &dataset.model1 } else { &dataset.model2 };
    table.get(column).ok_or_else(|| {
        AppError::no_data(format!(
            "Columna `{column}_real`/`{column}_pred` ausente en la tabla de predicciones."
        ))
    })
}

fn best_by_mape(records: &[MetricsRecord]) -> Option<&MetricsRecord> {
    records.iter().min_by(|a, b| cmp_f64(a.mape, b.mape))
}

fn cmp_f64(a: f64, b: f64) -> std::cmp::Ordering {
    a.partial_cmp(&b).unwrap_or(std::cmp::Ordering::Equal)
}

/// Group thousands with commas, no decimals: `171234.5` -> `171,235`.
pub fn fmt_thousands(v: f64) -> String {
    let rounded = v.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if negative {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
