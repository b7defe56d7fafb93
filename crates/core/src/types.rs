//! Core data types for the WSE processing pipeline.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Standard gravity in m/s².
pub const GRAVITY: f64 = 9.80665;

/// Conversion factor from psi to kilopascals.
pub const PSI_TO_KPA: f64 = 6.894757293168;

/// Pascals per kilopascal.
pub const KPA_TO_PA: f64 = 1000.0;

/// Monday of the ISO-8601 week containing the given date.
#[inline]
pub fn iso_week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Units a pressure logger may report in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PressureUnit {
    /// Kilopascals.
    #[serde(rename = "kPa")]
    KiloPascal,
    /// Pounds per square inch.
    #[serde(rename = "psi")]
    Psi,
}

impl PressureUnit {
    /// Convert a raw value in this unit to kilopascals.
    #[inline]
    pub fn to_kilopascals(self, value: f64) -> f64 {
        match self {
            PressureUnit::KiloPascal => value,
            PressureUnit::Psi => value * PSI_TO_KPA,
        }
    }
}

/// A single normalized logger reading.
///
/// Produced by the reading normalizer; immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    /// Timestamp as recorded by the logger.
    pub timestamp: NaiveDateTime,
    /// Raw pressure value, expressed in `unit`.
    pub value: f64,
    /// Unit of `value`.
    pub unit: PressureUnit,
    /// Temperature channel, if the logger records one.
    pub temperature: Option<f64>,
}

/// A matched water/barometric reading pair.
///
/// The water series drives the output cadence; timestamps are strictly
/// increasing across a merged sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedRow {
    /// Timestamp of the water reading.
    pub timestamp: NaiveDateTime,
    /// Water logger pressure (raw units).
    pub water_pressure: f64,
    /// Barometric logger pressure (raw units).
    pub baro_pressure: f64,
    /// Water logger temperature, if present.
    pub water_temperature: Option<f64>,
    /// Barometric logger temperature, if present.
    pub air_temperature: Option<f64>,
    /// Signed gap between water and barometric timestamps, in seconds.
    pub time_offset_secs: i64,
}

impl MergedRow {
    /// Signed gap between the paired source timestamps.
    #[inline]
    pub fn time_offset(&self) -> Duration {
        Duration::seconds(self.time_offset_secs)
    }
}

/// A merged row with derived gauge pressure, depth, and elevation.
///
/// All derived fields are pure functions of the row's own inputs and the
/// run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculatedRow {
    /// Source pair.
    #[serde(flatten)]
    pub row: MergedRow,
    /// Water pressure minus barometric pressure, in kPa.
    pub gauge_pressure_kpa: f64,
    /// Hydrostatic depth of water above the logger, in metres.
    pub depth_m: f64,
    /// Water surface elevation: reference datum plus depth.
    pub wse: f64,
}

impl CalculatedRow {
    /// Timestamp of the underlying pair.
    #[inline]
    pub fn timestamp(&self) -> NaiveDateTime {
        self.row.timestamp
    }
}

/// QA/QC conditions a row can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum FlagKind {
    /// Abrupt depth change, usually sensor movement or disconnection.
    LoggerShift = 0b01,
    /// Water temperature above the configured alert threshold.
    TemperatureExceedance = 0b10,
}

/// Set of QA/QC flags attached to a row.
///
/// Flags are independent conditions, not exclusive states; a row may carry
/// zero, one, or both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagSet {
    bits: u8,
}

impl FlagSet {
    /// The empty set.
    #[inline]
    pub fn empty() -> Self {
        Self { bits: 0 }
    }

    /// Add a flag.
    #[inline]
    pub fn insert(&mut self, kind: FlagKind) {
        self.bits |= kind as u8;
    }

    /// Whether the set contains a flag.
    #[inline]
    pub fn contains(self, kind: FlagKind) -> bool {
        self.bits & kind as u8 != 0
    }

    /// Whether no flags are set.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Number of flags set.
    #[inline]
    pub fn len(self) -> usize {
        self.bits.count_ones() as usize
    }
}

/// A calculated row with QA/QC flags and the depth change that drove them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlaggedRow {
    /// Source calculated row.
    #[serde(flatten)]
    pub row: CalculatedRow,
    /// Flags attached to this row.
    pub flags: FlagSet,
    /// Signed depth change from the preceding row, in metres (0.0 for the
    /// first row).
    pub depth_delta: f64,
}

impl FlaggedRow {
    /// Timestamp of the underlying pair.
    #[inline]
    pub fn timestamp(&self) -> NaiveDateTime {
        self.row.timestamp()
    }

    /// Water surface elevation.
    #[inline]
    pub fn wse(&self) -> f64 {
        self.row.wse
    }

    /// Hydrostatic depth in metres.
    #[inline]
    pub fn depth_m(&self) -> f64 {
        self.row.depth_m
    }

    /// Water logger temperature, if present.
    #[inline]
    pub fn water_temperature(&self) -> Option<f64> {
        self.row.row.water_temperature
    }

    /// Barometric logger temperature, if present.
    #[inline]
    pub fn air_temperature(&self) -> Option<f64> {
        self.row.row.air_temperature
    }

    /// Whether at least one flag is set.
    #[inline]
    pub fn is_flagged(&self) -> bool {
        !self.flags.is_empty()
    }
}

/// Summary granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    /// One bucket per calendar day.
    Daily,
    /// One bucket per ISO-8601 week.
    Weekly,
}

impl Period {
    /// Bucket key for a date: the date itself (daily) or the Monday of its
    /// ISO week (weekly).
    #[inline]
    pub fn bucket_start(self, date: NaiveDate) -> NaiveDate {
        match self {
            Period::Daily => date,
            Period::Weekly => iso_week_start(date),
        }
    }
}

/// Aggregate statistics for one daily or weekly bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRow {
    /// First day of the bucket.
    pub period_start: NaiveDate,
    /// Mean WSE over all rows in the bucket.
    pub mean_wse: f64,
    /// Minimum WSE in the bucket.
    pub min_wse: f64,
    /// Maximum WSE in the bucket.
    pub max_wse: f64,
    /// Mean water temperature over rows that have one; `None` only if every
    /// row in the bucket lacks it.
    pub mean_temperature: Option<f64>,
    /// Mean air temperature over rows that have one.
    pub mean_air_temperature: Option<f64>,
    /// Rows carrying at least one QA/QC flag.
    pub flagged_count: usize,
    /// Total rows in the bucket.
    pub sample_count: usize,
}
