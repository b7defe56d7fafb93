//! Pressure-to-elevation physics.
//!
//! Converts matched pressure pairs into gauge pressure, hydrostatic depth,
//! and water surface elevation.

use tracing::debug;
use wse_core::{CalculatedRow, Error, MergedRow, PressureUnit, Result, GRAVITY, KPA_TO_PA};

/// Convert gauge pressure in kPa to depth in metres for the given fluid
/// density (hydrostatic relation: P = rho * g * h).
#[inline]
pub fn gauge_to_depth_m(gauge_kpa: f64, density: f64) -> f64 {
    gauge_kpa * KPA_TO_PA / (density * GRAVITY)
}

/// Derive gauge pressure, depth, and WSE for each merged row.
///
/// Both pressures are normalized to kPa before subtraction regardless of the
/// declared unit. The computation is row-independent, order-preserving, and
/// deterministic. A non-positive `density` fails with
/// [`Error::InvalidConfiguration`] before any row is computed.
pub fn calculate(
    rows: &[MergedRow],
    density: f64,
    unit: PressureUnit,
    datum: f64,
) -> Result<Vec<CalculatedRow>> {
    if !(density > 0.0) {
        return Err(Error::invalid_configuration(format!(
            "fluid density must be positive, got {density}"
        )));
    }

    let calculated: Vec<CalculatedRow> = rows
        .iter()
        .map(|row| {
            let water_kpa = unit.to_kilopascals(row.water_pressure);
            let baro_kpa = unit.to_kilopascals(row.baro_pressure);
            let gauge_pressure_kpa = water_kpa - baro_kpa;
            let depth_m = gauge_to_depth_m(gauge_pressure_kpa, density);
            CalculatedRow {
                row: row.clone(),
                gauge_pressure_kpa,
                depth_m,
                wse: datum + depth_m,
            }
        })
        .collect();

    debug!(rows = calculated.len(), "derived gauge pressure, depth, and WSE");
    Ok(calculated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use wse_core::PSI_TO_KPA;

    fn make_row(minutes: i64, water: f64, baro: f64) -> MergedRow {
        MergedRow {
            timestamp: NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
                + chrono::Duration::minutes(minutes),
            water_pressure: water,
            baro_pressure: baro,
            water_temperature: None,
            air_temperature: None,
            time_offset_secs: 0,
        }
    }

    #[test]
    fn test_gauge_pressure_and_depth() {
        let rows = vec![
            make_row(0, 105.0, 101.0),
            make_row(15, 106.0, 101.0),
            make_row(30, 120.0, 101.0),
        ];

        let calculated = calculate(&rows, 1000.0, PressureUnit::KiloPascal, 10.0).unwrap();

        assert_eq!(calculated.len(), 3);
        assert!((calculated[0].gauge_pressure_kpa - 4.0).abs() < 1e-10);
        assert!((calculated[1].gauge_pressure_kpa - 5.0).abs() < 1e-10);
        assert!((calculated[2].gauge_pressure_kpa - 19.0).abs() < 1e-10);

        // 4 kPa of gauge pressure over freshwater: 4000 / (1000 * 9.80665) m.
        let expected_depth = 4000.0 / (1000.0 * GRAVITY);
        assert!((calculated[0].depth_m - expected_depth).abs() < 1e-12);
        assert!((calculated[0].wse - (10.0 + expected_depth)).abs() < 1e-12);
    }

    #[test]
    fn test_unit_choice_does_not_change_depth() {
        let kpa_rows = vec![make_row(0, 105.0, 101.0)];
        let psi_rows = vec![make_row(0, 105.0 / PSI_TO_KPA, 101.0 / PSI_TO_KPA)];

        let from_kpa = calculate(&kpa_rows, 1000.0, PressureUnit::KiloPascal, 0.0).unwrap();
        let from_psi = calculate(&psi_rows, 1000.0, PressureUnit::Psi, 0.0).unwrap();

        assert!((from_kpa[0].depth_m - from_psi[0].depth_m).abs() < 1e-9);
    }

    #[test]
    fn test_density_scales_depth() {
        let rows = vec![make_row(0, 105.0, 101.0)];

        let fresh = calculate(&rows, 1000.0, PressureUnit::KiloPascal, 0.0).unwrap();
        let saline = calculate(&rows, 1025.0, PressureUnit::KiloPascal, 0.0).unwrap();

        assert!(saline[0].depth_m < fresh[0].depth_m);
        assert!((saline[0].depth_m * 1025.0 - fresh[0].depth_m * 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_density_rejected() {
        let rows = vec![make_row(0, 105.0, 101.0)];
        let result = calculate(&rows, 0.0, PressureUnit::KiloPascal, 0.0);
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_negative_density_rejected() {
        let rows = vec![make_row(0, 105.0, 101.0)];
        assert!(calculate(&rows, -10.0, PressureUnit::KiloPascal, 0.0).is_err());
    }

    #[test]
    fn test_negative_gauge_allowed() {
        // A logger sitting dry can read below barometric; depth goes negative
        // rather than being clamped.
        let rows = vec![make_row(0, 100.5, 101.0)];
        let calculated = calculate(&rows, 1000.0, PressureUnit::KiloPascal, 50.0).unwrap();
        assert!(calculated[0].depth_m < 0.0);
        assert!(calculated[0].wse < 50.0);
    }

    #[test]
    fn test_order_preserved_and_deterministic() {
        let rows: Vec<MergedRow> = (0..10).map(|i| make_row(i * 15, 104.0 + i as f64, 101.0)).collect();

        let a = calculate(&rows, 1000.0, PressureUnit::KiloPascal, 10.0).unwrap();
        let b = calculate(&rows, 1000.0, PressureUnit::KiloPascal, 10.0).unwrap();

        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.timestamp(), y.timestamp());
            assert_eq!(x.wse.to_bits(), y.wse.to_bits());
        }
        assert!(a.windows(2).all(|w| w[0].timestamp() < w[1].timestamp()));
    }

    #[test]
    fn test_empty_input() {
        let calculated = calculate(&[], 1000.0, PressureUnit::KiloPascal, 0.0).unwrap();
        assert!(calculated.is_empty());
    }
}
