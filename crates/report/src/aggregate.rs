//! Daily and weekly summarization.
//!
//! Reduces a flagged series into per-bucket statistics keyed by calendar day
//! or ISO week.

use chrono::{NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use tracing::debug;
use wse_core::{FlaggedRow, Period, SummaryRow};

/// Reduce a flagged series into daily or weekly summary rows.
///
/// The bucket key comes from each row's timestamp: with a configured
/// timezone, timestamps are taken as UTC and localized before bucketing;
/// naive runs bucket as-is. Buckets with no rows are never emitted, and the
/// output ascends by `period_start`.
pub fn aggregate(rows: &[FlaggedRow], period: Period, timezone: Option<Tz>) -> Vec<SummaryRow> {
    let mut buckets: BTreeMap<NaiveDate, Vec<&FlaggedRow>> = BTreeMap::new();
    for row in rows {
        let local_date = match timezone {
            Some(tz) => Utc
                .from_utc_datetime(&row.timestamp())
                .with_timezone(&tz)
                .date_naive(),
            None => row.timestamp().date(),
        };
        buckets
            .entry(period.bucket_start(local_date))
            .or_default()
            .push(row);
    }

    let summaries: Vec<SummaryRow> = buckets
        .into_iter()
        .map(|(period_start, bucket)| summarize(period_start, &bucket))
        .collect();

    debug!(rows = rows.len(), buckets = summaries.len(), ?period, "aggregated series");
    summaries
}

fn summarize(period_start: NaiveDate, bucket: &[&FlaggedRow]) -> SummaryRow {
    let wse: Vec<f64> = bucket.iter().map(|row| row.wse()).collect();

    SummaryRow {
        period_start,
        mean_wse: wse.as_slice().mean(),
        min_wse: wse.as_slice().min(),
        max_wse: wse.as_slice().max(),
        mean_temperature: mean_of_present(bucket.iter().map(|row| row.water_temperature())),
        mean_air_temperature: mean_of_present(bucket.iter().map(|row| row.air_temperature())),
        flagged_count: bucket.iter().filter(|row| row.is_flagged()).count(),
        sample_count: bucket.len(),
    }
}

/// Mean over the values that are present; `None` only if every value is
/// missing.
fn mean_of_present(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let present: Vec<f64> = values.flatten().collect();
    if present.is_empty() {
        None
    } else {
        Some(present.as_slice().mean())
    }
}
