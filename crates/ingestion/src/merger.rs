//! Water/barometric series pairing.
//!
//! Pairs each water reading with the nearest barometric reading within a
//! tolerance window. The water series drives the output cadence; barometric
//! candidates are scanned with a single forward pointer, so matching is
//! linear in the combined input length.

use chrono::Duration;
use tracing::debug;
use wse_core::{MergedRow, Reading};

/// Outcome of a merge: matched rows plus the unmatched diagnostic count.
#[derive(Debug, Clone)]
pub struct MergeResult {
    /// Matched pairs, strictly increasing by timestamp.
    pub rows: Vec<MergedRow>,
    /// Water readings that found no barometric partner within tolerance.
    pub unmatched: usize,
}

impl MergeResult {
    /// Number of matched rows.
    #[inline]
    pub fn matched(&self) -> usize {
        self.rows.len()
    }

    /// Warning-level check: did the merge produce too few rows to be useful?
    #[inline]
    pub fn is_insufficient(&self, min_rows: usize) -> bool {
        self.rows.len() < min_rows
    }
}

/// Pair each water reading with its nearest barometric reading.
///
/// A pair is accepted only if the absolute time difference is within
/// `tolerance`; otherwise the water reading is dropped and counted as
/// unmatched, so `matched + unmatched == water.len()` always holds. A
/// non-positive tolerance accepts exact timestamp matches only. Equidistant
/// candidates break toward the earlier barometric reading. Unsorted input is
/// sorted into a copy; the caller's slices are never mutated.
pub fn merge(water: &[Reading], baro: &[Reading], tolerance: Duration) -> MergeResult {
    let tolerance = tolerance.max(Duration::zero());
    let water = sorted(water);
    let baro = sorted(baro);

    let mut rows: Vec<MergedRow> = Vec::with_capacity(water.len());
    let mut unmatched = 0usize;
    // Index of the nearest barometric reading so far. Never moves backward:
    // water timestamps are non-decreasing, so the nearest index is too.
    let mut j = 0usize;

    for reading in &water {
        if baro.is_empty() {
            unmatched += 1;
            continue;
        }

        // Strict '<' keeps the earlier reading on equidistant ties.
        while j + 1 < baro.len() && gap(&baro[j + 1], reading) < gap(&baro[j], reading) {
            j += 1;
        }

        let offset = reading.timestamp - baro[j].timestamp;
        if offset.abs() > tolerance {
            unmatched += 1;
            continue;
        }

        if let Some(last) = rows.last() {
            if reading.timestamp <= last.timestamp {
                // Duplicate water timestamp; the first occurrence wins.
                unmatched += 1;
                continue;
            }
        }

        rows.push(MergedRow {
            timestamp: reading.timestamp,
            water_pressure: reading.value,
            baro_pressure: baro[j].value,
            water_temperature: reading.temperature,
            air_temperature: baro[j].temperature,
            time_offset_secs: offset.num_seconds(),
        });
    }

    debug!(
        matched = rows.len(),
        unmatched, "merged water and barometric series"
    );
    MergeResult { rows, unmatched }
}

#[inline]
fn gap(baro: &Reading, water: &Reading) -> Duration {
    (water.timestamp - baro.timestamp).abs()
}

fn sorted(readings: &[Reading]) -> Vec<Reading> {
    let mut copy = readings.to_vec();
    if !copy.windows(2).all(|w| w[0].timestamp <= w[1].timestamp) {
        copy.sort_by_key(|r| r.timestamp);
    }
    copy
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};
    use wse_core::PressureUnit;

    fn ts(minutes: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::minutes(minutes)
    }

    fn make_reading(minutes: i64, value: f64) -> Reading {
        Reading {
            timestamp: ts(minutes),
            value,
            unit: PressureUnit::KiloPascal,
            temperature: None,
        }
    }

    fn make_reading_with_temp(minutes: i64, value: f64, temp: f64) -> Reading {
        Reading {
            temperature: Some(temp),
            ..make_reading(minutes, value)
        }
    }

    #[test]
    fn test_pairs_within_tolerance() {
        let water = vec![
            make_reading(0, 105.0),
            make_reading(15, 106.0),
            make_reading(30, 107.0),
        ];
        let baro = vec![
            make_reading(1, 101.0),
            make_reading(14, 101.2),
            make_reading(32, 101.4),
        ];

        let result = merge(&water, &baro, Duration::minutes(5));

        assert_eq!(result.matched(), 3);
        assert_eq!(result.unmatched, 0);
        assert_eq!(result.rows[0].time_offset_secs, -60);
        assert_eq!(result.rows[1].time_offset_secs, 60);
        assert_eq!(result.rows[2].time_offset_secs, -120);
        assert!((result.rows[0].baro_pressure - 101.0).abs() < 1e-10);
        assert!((result.rows[2].baro_pressure - 101.4).abs() < 1e-10);
    }

    #[test]
    fn test_offsets_never_exceed_tolerance() {
        let water: Vec<Reading> = (0..50).map(|i| make_reading(i * 7, 105.0)).collect();
        let baro: Vec<Reading> = (0..30).map(|i| make_reading(i * 11, 101.0)).collect();
        let tolerance = Duration::minutes(4);

        let result = merge(&water, &baro, tolerance);

        assert_eq!(result.matched() + result.unmatched, water.len());
        for row in &result.rows {
            assert!(row.time_offset().abs() <= tolerance);
        }
    }

    #[test]
    fn test_unmatched_counted() {
        let water = vec![
            make_reading(0, 105.0),
            make_reading(15, 106.0),
            make_reading(30, 107.0),
        ];
        let baro = vec![make_reading(0, 101.0)];

        let result = merge(&water, &baro, Duration::minutes(5));

        assert_eq!(result.matched(), 1);
        assert_eq!(result.unmatched, 2);
    }

    #[test]
    fn test_empty_inputs() {
        let water = vec![make_reading(0, 105.0), make_reading(15, 106.0)];

        let result = merge(&water, &[], Duration::minutes(5));
        assert!(result.rows.is_empty());
        assert_eq!(result.unmatched, 2);

        let result = merge(&[], &water, Duration::minutes(5));
        assert!(result.rows.is_empty());
        assert_eq!(result.unmatched, 0);
    }

    #[test]
    fn test_shuffled_baro_matches_sorted() {
        let water: Vec<Reading> = (0..20).map(|i| make_reading(i * 15, 105.0 + i as f64)).collect();
        let sorted_baro: Vec<Reading> = (0..20).map(|i| make_reading(i * 15 + 2, 101.0 + i as f64)).collect();
        let mut shuffled = sorted_baro.clone();
        shuffled.reverse();
        shuffled.swap(3, 11);

        let a = merge(&water, &sorted_baro, Duration::minutes(5));
        let b = merge(&water, &shuffled, Duration::minutes(5));

        assert_eq!(a.matched(), b.matched());
        assert_eq!(a.unmatched, b.unmatched);
        for (x, y) in a.rows.iter().zip(b.rows.iter()) {
            assert_eq!(x.timestamp, y.timestamp);
            assert_eq!(x.time_offset_secs, y.time_offset_secs);
            assert!((x.baro_pressure - y.baro_pressure).abs() < 1e-12);
        }
    }

    #[test]
    fn test_tie_breaks_to_earlier_baro() {
        let water = vec![make_reading(5, 105.0)];
        // Both candidates are exactly 5 minutes away.
        let baro = vec![make_reading(0, 101.0), make_reading(10, 102.0)];

        let result = merge(&water, &baro, Duration::minutes(10));

        assert_eq!(result.matched(), 1);
        assert!((result.rows[0].baro_pressure - 101.0).abs() < 1e-10);
        assert_eq!(result.rows[0].time_offset_secs, 300);
    }

    #[test]
    fn test_zero_tolerance_exact_match_only() {
        let water = vec![make_reading(0, 105.0), make_reading(15, 106.0)];
        let baro = vec![make_reading(0, 101.0), make_reading(16, 101.2)];

        let result = merge(&water, &baro, Duration::zero());

        assert_eq!(result.matched(), 1);
        assert_eq!(result.unmatched, 1);
        assert_eq!(result.rows[0].timestamp, ts(0));
        assert_eq!(result.rows[0].time_offset_secs, 0);
    }

    #[test]
    fn test_negative_tolerance_treated_as_exact() {
        let water = vec![make_reading(0, 105.0), make_reading(15, 106.0)];
        let baro = vec![make_reading(0, 101.0), make_reading(16, 101.2)];

        let result = merge(&water, &baro, Duration::seconds(-30));

        assert_eq!(result.matched(), 1);
        assert_eq!(result.unmatched, 1);
    }

    #[test]
    fn test_duplicate_water_timestamps_dropped() {
        let water = vec![
            make_reading(0, 105.0),
            make_reading(0, 999.0),
            make_reading(15, 106.0),
        ];
        let baro = vec![make_reading(0, 101.0), make_reading(15, 101.2)];

        let result = merge(&water, &baro, Duration::minutes(5));

        assert_eq!(result.matched(), 2);
        assert_eq!(result.unmatched, 1);
        // First occurrence wins; timestamps strictly increase.
        assert!((result.rows[0].water_pressure - 105.0).abs() < 1e-10);
        assert!(result.rows.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn test_nearest_selection_over_uneven_cadence() {
        let water = vec![
            make_reading(0, 105.0),
            make_reading(30, 106.0),
            make_reading(60, 107.0),
        ];
        let baro = vec![
            make_reading(0, 101.0),
            make_reading(2, 101.1),
            make_reading(29, 101.2),
            make_reading(58, 101.3),
            make_reading(62, 101.4),
        ];

        let result = merge(&water, &baro, Duration::minutes(10));

        assert_eq!(result.matched(), 3);
        assert!((result.rows[0].baro_pressure - 101.0).abs() < 1e-10);
        assert!((result.rows[1].baro_pressure - 101.2).abs() < 1e-10);
        // 58 and 62 are equidistant from 60; the earlier one wins.
        assert!((result.rows[2].baro_pressure - 101.3).abs() < 1e-10);
    }

    #[test]
    fn test_temperatures_carried_through() {
        let water = vec![make_reading_with_temp(0, 105.0, 12.5)];
        let baro = vec![make_reading_with_temp(1, 101.0, 18.0)];

        let result = merge(&water, &baro, Duration::minutes(5));

        assert_eq!(result.rows[0].water_temperature, Some(12.5));
        assert_eq!(result.rows[0].air_temperature, Some(18.0));
    }

    #[test]
    fn test_is_insufficient() {
        let water = vec![make_reading(0, 105.0)];
        let baro = vec![make_reading(0, 101.0)];

        let result = merge(&water, &baro, Duration::minutes(5));
        assert!(!result.is_insufficient(1));
        assert!(result.is_insufficient(2));
    }
}
