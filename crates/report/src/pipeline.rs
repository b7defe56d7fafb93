//! End-to-end processing run.
//!
//! Wires the pipeline stages together in their fixed order: merge, physics,
//! QA/QC, optional historical combination, then summarization. Each stage is
//! a pure function over its inputs; re-running with identical inputs yields
//! an identical bundle.

use tracing::info;
use wse_compute::{calculate, flag, shift_exceedances, temperature_exceedances};
use wse_core::{Config, FlaggedRow, Period, Reading, Result};
use wse_ingestion::merge;

use crate::aggregate::aggregate;
use crate::bundle::{ReportBundle, RunWarning};
use crate::history::combine_with_history;

/// Matched-row count below which the bundle carries an
/// [`RunWarning::InsufficientOverlap`] warning.
const MIN_USEFUL_ROWS: usize = 3;

/// Run the full pipeline over one pair of normalized logger series.
///
/// Configuration is validated up front; an invalid configuration aborts the
/// run before any calculation. An overlap too small to be useful is a
/// warning carried in the bundle, never a failure: the caller sees the
/// (possibly empty) result and the unmatched count and decides whether to
/// proceed.
pub fn run(
    water: &[Reading],
    baro: &[Reading],
    history: Option<Vec<FlaggedRow>>,
    config: &Config,
) -> Result<ReportBundle> {
    config.validate()?;
    let timezone = config.processing.timezone()?;

    let merged = merge(water, baro, config.processing.merge_tolerance());
    let mut warnings = Vec::new();
    if merged.is_insufficient(MIN_USEFUL_ROWS) {
        warnings.push(RunWarning::InsufficientOverlap {
            matched: merged.matched(),
            total: water.len(),
        });
    }

    let calculated = calculate(
        &merged.rows,
        config.processing.fluid_density,
        config.processing.pressure_unit,
        config.processing.reference_datum,
    )?;
    let flagged = flag(
        &calculated,
        config.qaqc.shift_threshold,
        config.qaqc.temperature_threshold,
    )?;

    let timeseries = match history {
        Some(history_rows) => combine_with_history(history_rows, flagged),
        None => flagged,
    };

    let daily = aggregate(&timeseries, Period::Daily, timezone);
    let weekly = aggregate(&timeseries, Period::Weekly, timezone);
    let depth_flags = shift_exceedances(&timeseries);
    let temperature_flags = config
        .qaqc
        .temperature_threshold
        .map(|threshold| temperature_exceedances(&timeseries, threshold))
        .unwrap_or_default();

    info!(
        rows = timeseries.len(),
        unmatched = merged.unmatched,
        daily_buckets = daily.len(),
        weekly_buckets = weekly.len(),
        "processing run complete"
    );

    Ok(ReportBundle {
        timeseries,
        daily,
        weekly,
        depth_flags,
        temperature_flags,
        unmatched_readings: merged.unmatched,
        warnings,
    })
}
