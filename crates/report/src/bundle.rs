//! Report bundle assembly.
//!
//! The bundle is everything the external workbook writer needs: the combined
//! time series, both summary tables, the dedicated QA/QC sheets, and the
//! run diagnostics.

use serde::{Deserialize, Serialize};
use wse_compute::TemperatureExceedanceRow;
use wse_core::{FlaggedRow, Result, SummaryRow};

/// Sheet names the workbook writer uses for each table.
pub mod sheet {
    pub const TIMESERIES: &str = "combined_timeseries";
    pub const DAILY: &str = "daily_summary";
    pub const WEEKLY: &str = "weekly_summary";
    pub const DEPTH_FLAGS: &str = "qaqc_depth_flags";
    pub const TEMPERATURE_FLAGS: &str = "qaqc_temperature_flags";
}

/// Warning-level conditions reported alongside a run's results.
///
/// Warnings never abort the run; the caller decides whether to proceed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum RunWarning {
    /// The merge produced zero or near-zero matched rows.
    InsufficientOverlap {
        /// Rows that found a barometric partner.
        matched: usize,
        /// Water readings that went into the merge.
        total: usize,
    },
}

/// Output of one processing run, ready for tabular export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportBundle {
    /// Merged, calculated, and flagged time series.
    pub timeseries: Vec<FlaggedRow>,
    /// Daily summary table.
    pub daily: Vec<SummaryRow>,
    /// Weekly summary table.
    pub weekly: Vec<SummaryRow>,
    /// Rows flagged as logger shifts.
    pub depth_flags: Vec<FlaggedRow>,
    /// Rows flagged over-temperature, with the margin over threshold.
    pub temperature_flags: Vec<TemperatureExceedanceRow>,
    /// Water readings that found no barometric partner within tolerance.
    pub unmatched_readings: usize,
    /// Warning-level conditions observed during the run.
    pub warnings: Vec<RunWarning>,
}

impl ReportBundle {
    /// Serialize the bundle for the workbook writer.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_bundle_serializes() {
        let bundle = ReportBundle {
            timeseries: Vec::new(),
            daily: Vec::new(),
            weekly: Vec::new(),
            depth_flags: Vec::new(),
            temperature_flags: Vec::new(),
            unmatched_readings: 0,
            warnings: vec![RunWarning::InsufficientOverlap { matched: 0, total: 0 }],
        };

        let json = bundle.to_json().unwrap();
        assert!(json.contains("InsufficientOverlap"));
        assert!(json.contains("unmatched_readings"));
    }

    #[test]
    fn test_sheet_names_match_workbook_layout() {
        assert_eq!(sheet::TIMESERIES, "combined_timeseries");
        assert_eq!(sheet::DAILY, "daily_summary");
        assert_eq!(sheet::WEEKLY, "weekly_summary");
        assert_eq!(sheet::DEPTH_FLAGS, "qaqc_depth_flags");
        assert_eq!(sheet::TEMPERATURE_FLAGS, "qaqc_temperature_flags");
    }
}
