//! Configuration structures for a WSE processing run.
//!
//! A single immutable [`Config`] value is threaded as a parameter into every
//! pipeline stage; there is no process-wide settings state.

use crate::error::{Error, Result};
use crate::types::PressureUnit;
use chrono::Duration;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Top-level configuration for one processing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Merge and physics settings.
    pub processing: ProcessingConfig,
    /// QA/QC thresholds.
    pub qaqc: QaqcConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            processing: ProcessingConfig::default(),
            qaqc: QaqcConfig::default(),
        }
    }
}

impl Config {
    /// Validate the configuration before running.
    ///
    /// Fails with [`Error::InvalidConfiguration`] on non-positive density, a
    /// negative merge tolerance, a non-positive shift threshold, or an
    /// unknown timezone id. Called before any calculation happens.
    pub fn validate(&self) -> Result<()> {
        if !(self.processing.fluid_density > 0.0) {
            return Err(Error::invalid_configuration(format!(
                "fluid density must be positive, got {}",
                self.processing.fluid_density
            )));
        }
        if self.processing.merge_tolerance_secs < 0 {
            return Err(Error::invalid_configuration(format!(
                "merge tolerance must not be negative, got {}s",
                self.processing.merge_tolerance_secs
            )));
        }
        self.processing.timezone()?;
        if let Some(threshold) = self.qaqc.shift_threshold {
            // None disables shift detection; a configured non-positive value
            // is a mistake, not a disable switch.
            if !(threshold > 0.0) {
                return Err(Error::invalid_configuration(format!(
                    "depth shift threshold must be positive (got {threshold}); \
                     omit it to disable shift detection"
                )));
            }
        }
        if let Some(threshold) = self.qaqc.temperature_threshold {
            if !threshold.is_finite() {
                return Err(Error::invalid_configuration(format!(
                    "temperature threshold must be finite, got {threshold}"
                )));
            }
        }
        Ok(())
    }
}

/// Merge and physics settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Elevation of the water surface when depth is zero.
    pub reference_datum: f64,
    /// Fluid density in kg/m³. Must be positive; 1000 for freshwater.
    pub fluid_density: f64,
    /// Units of the raw logger pressure values.
    pub pressure_unit: PressureUnit,
    /// Maximum time gap when pairing water and barometric readings, in
    /// seconds. Zero means exact-timestamp matches only.
    pub merge_tolerance_secs: i64,
    /// Optional Olson timezone id (e.g. "America/Los_Angeles") applied when
    /// bucketing timestamps for summaries.
    pub timezone: Option<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            reference_datum: 100.0,
            fluid_density: 1000.0,
            pressure_unit: PressureUnit::KiloPascal,
            merge_tolerance_secs: 15 * 60,
            timezone: None,
        }
    }
}

impl ProcessingConfig {
    /// Merge tolerance as a duration.
    #[inline]
    pub fn merge_tolerance(&self) -> Duration {
        Duration::seconds(self.merge_tolerance_secs)
    }

    /// Parsed timezone, if one is configured.
    pub fn timezone(&self) -> Result<Option<Tz>> {
        match &self.timezone {
            None => Ok(None),
            Some(id) => id
                .parse::<Tz>()
                .map(Some)
                .map_err(|_| Error::invalid_configuration(format!("unknown timezone id: {id}"))),
        }
    }
}

/// QA/QC thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaqcConfig {
    /// Depth change in metres above which a row is flagged as a logger
    /// shift. `None` disables shift detection entirely.
    pub shift_threshold: Option<f64>,
    /// Water temperature above which a row is flagged. `None` disables the
    /// check.
    pub temperature_threshold: Option<f64>,
}

impl Default for QaqcConfig {
    fn default() -> Self {
        Self {
            shift_threshold: Some(0.15),
            temperature_threshold: None,
        }
    }
}
