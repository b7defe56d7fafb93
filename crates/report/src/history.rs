//! Historical dataset combination.
//!
//! Field crews often carry a previously exported combined dataset forward
//! into the next deployment's report. The historical rows are prepended to
//! the freshly processed ones and duplicate timestamps resolve in favor of
//! the history.

use tracing::debug;
use wse_core::FlaggedRow;

/// Combine a previously exported dataset with the current run.
///
/// History rows come first; after a stable sort by timestamp, duplicate
/// timestamps keep the first occurrence, so the historical record wins over
/// a re-processed overlap. Output timestamps are strictly increasing.
pub fn combine_with_history(history: Vec<FlaggedRow>, current: Vec<FlaggedRow>) -> Vec<FlaggedRow> {
    let history_len = history.len();
    let mut combined = history;
    combined.extend(current);
    combined.sort_by_key(|row| row.timestamp());
    combined.dedup_by_key(|row| row.timestamp());

    debug!(
        history = history_len,
        combined = combined.len(),
        "combined with historical dataset"
    );
    combined
}
