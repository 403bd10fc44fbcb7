// Utility functions for visibility-engine

use chrono::{DateTime, Utc};

/// Bucket a timestamp into fixed windows of `interval_millis`.
/// All timestamps inside one window map to the same bucket index.
pub fn epoch_bucket(now: DateTime<Utc>, interval_millis: i64) -> u64 {
    let interval = interval_millis.max(1);
    let millis = now.timestamp_millis().max(0);
    (millis / interval) as u64
}

/// Ceiling division for page counts.
pub fn total_pages(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        0
    } else {
        total.div_ceil(page_size)
    }
}
