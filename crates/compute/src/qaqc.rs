//! QA/QC flagging.
//!
//! Scans a calculated series for abrupt depth changes and temperature
//! exceedances, attaching per-row flags. Flags accumulate as a set: a row can
//! be both shifted and over-temperature at once.

use serde::{Deserialize, Serialize};
use tracing::debug;
use wse_core::{CalculatedRow, Error, FlagKind, FlagSet, FlaggedRow, Result};

/// Attach QA/QC flags to a calculated series.
///
/// `depth_delta` is the signed depth change from the immediately preceding
/// row (0.0 for the first row, which never receives a shift flag).
/// `shift_threshold` of `None` disables shift detection entirely; a
/// configured value must be positive — a non-positive threshold is an
/// [`Error::InvalidConfiguration`], never a silent disable. A temperature
/// exceedance requires a configured threshold and a present reading; missing
/// temperature never flags.
pub fn flag(
    rows: &[CalculatedRow],
    shift_threshold: Option<f64>,
    temperature_threshold: Option<f64>,
) -> Result<Vec<FlaggedRow>> {
    if let Some(threshold) = shift_threshold {
        if !(threshold > 0.0) {
            return Err(Error::invalid_configuration(format!(
                "depth shift threshold must be positive (got {threshold}); \
                 omit it to disable shift detection"
            )));
        }
    }

    let mut flagged = Vec::with_capacity(rows.len());
    let mut previous_depth: Option<f64> = None;

    for row in rows {
        let depth_delta = previous_depth.map_or(0.0, |prev| row.depth_m - prev);
        let mut flags = FlagSet::empty();

        if let Some(threshold) = shift_threshold {
            if previous_depth.is_some() && depth_delta.abs() > threshold {
                flags.insert(FlagKind::LoggerShift);
            }
        }

        if let (Some(threshold), Some(temperature)) =
            (temperature_threshold, row.row.water_temperature)
        {
            if temperature > threshold {
                flags.insert(FlagKind::TemperatureExceedance);
            }
        }

        previous_depth = Some(row.depth_m);
        flagged.push(FlaggedRow {
            row: row.clone(),
            flags,
            depth_delta,
        });
    }

    debug!(
        rows = flagged.len(),
        flagged = flagged.iter().filter(|r| r.is_flagged()).count(),
        "applied QA/QC flags"
    );
    Ok(flagged)
}

/// Rows flagged as logger shifts, for the dedicated QA/QC report sheet.
pub fn shift_exceedances(rows: &[FlaggedRow]) -> Vec<FlaggedRow> {
    rows.iter()
        .filter(|row| row.flags.contains(FlagKind::LoggerShift))
        .cloned()
        .collect()
}

/// A temperature-flagged row with its margin over the threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemperatureExceedanceRow {
    /// The flagged row.
    #[serde(flatten)]
    pub row: FlaggedRow,
    /// Degrees above the configured threshold.
    pub temperature_excess: f64,
}

/// Rows flagged over-temperature, with their excess over `threshold`.
pub fn temperature_exceedances(rows: &[FlaggedRow], threshold: f64) -> Vec<TemperatureExceedanceRow> {
    rows.iter()
        .filter(|row| row.flags.contains(FlagKind::TemperatureExceedance))
        .filter_map(|row| {
            row.water_temperature().map(|temperature| TemperatureExceedanceRow {
                row: row.clone(),
                temperature_excess: temperature - threshold,
            })
        })
        .collect()
}
