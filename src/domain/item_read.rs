//! Scan log entries produced by field devices.

use chrono::{DateTime, Utc};

/// One recorded tag scan. Append-only apart from soft deletion; duplicate
/// suppression happens before a row is ever written (see the item-read
/// service's debounce window).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRead {
    pub read_id: i32,
    pub tag_id: String,
    pub read_time: DateTime<Utc>,
    pub deleted: bool,
}
