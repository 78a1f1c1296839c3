//! Scan recording with duplicate suppression.

use std::sync::Arc;
use std::sync::Mutex;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

use crate::domain::{DomainError, ItemRead};
use crate::ports::{ItemReadRepository, ItemRepository};

/// Debounce window: a repeat of the last recorded tag inside this span is
/// discarded without a row being written.
const DUPLICATE_IGNORE_SECONDS: i64 = 2;

/// The most recent scan, shared across all tags.
///
/// Deliberately a single global pair, not per-tag, matching the deployed
/// behavior the desktop client was tuned against.
#[derive(Debug)]
struct LastScan {
    tag_id: Option<String>,
    read_time: DateTime<Utc>,
}

pub struct ItemReadService {
    items: Arc<dyn ItemRepository>,
    reads: Arc<dyn ItemReadRepository>,
    // Only the dispatcher worker records scans, so this lock is uncontended.
    last: Mutex<LastScan>,
}

impl ItemReadService {
    pub fn new(items: Arc<dyn ItemRepository>, reads: Arc<dyn ItemReadRepository>) -> Self {
        Self {
            items,
            reads,
            last: Mutex::new(LastScan {
                tag_id: None,
                read_time: DateTime::<Utc>::MIN_UTC,
            }),
        }
    }

    /// Record one scan.
    ///
    /// Returns `Ok(None)` without writing when the scan repeats the last
    /// recorded tag within the debounce window, or when the tag does not
    /// resolve to a live item.
    pub async fn record_scan(
        &self,
        tag_id: &str,
        timestamp: Option<&str>,
    ) -> Result<Option<ItemRead>, DomainError> {
        let read_time = parse_read_time(timestamp);

        {
            let mut last = self
                .last
                .lock()
                .map_err(|_| DomainError::store("debounce state poisoned"))?;
            let is_repeat = last.tag_id.as_deref() == Some(tag_id)
                && read_time - last.read_time < Duration::seconds(DUPLICATE_IGNORE_SECONDS);
            if is_repeat {
                tracing::info!(tag_id, "ignored duplicate read");
                return Ok(None);
            }
            last.tag_id = Some(tag_id.to_string());
            last.read_time = read_time;
        }

        if self.items.read_by_tag(tag_id, false).await?.is_none() {
            tracing::warn!(tag_id, "unknown tag scanned");
            return Ok(None);
        }

        let read = self.reads.insert(tag_id, read_time).await?;
        tracing::info!(tag_id, read_id = read.read_id, "recorded scan");
        Ok(Some(read))
    }

    pub async fn list_active(&self) -> Result<Vec<ItemRead>, DomainError> {
        self.reads.list(false).await
    }

    /// Rewrite an existing read. The tag must still resolve to a live item.
    pub async fn update_read(
        &self,
        read_id: i32,
        tag_id: &str,
        timestamp: Option<&str>,
    ) -> Result<Option<ItemRead>, DomainError> {
        if self.items.read_by_tag(tag_id, false).await?.is_none() {
            tracing::warn!(tag_id, "cannot update read, unknown tag");
            return Ok(None);
        }
        let updated = self
            .reads
            .update(read_id, tag_id, parse_read_time(timestamp))
            .await?;
        if updated.is_none() {
            tracing::warn!(read_id, "failed to update read");
        }
        Ok(updated)
    }

    pub async fn delete_read(&self, read_id: i32) -> Result<bool, DomainError> {
        let ok = self.reads.soft_delete(read_id).await?;
        if !ok {
            tracing::warn!(read_id, "failed to delete read");
        }
        Ok(ok)
    }

    /// Reads for an item's tag inside `[from, to]`. An unknown item yields
    /// an empty list, not an error.
    pub async fn list_for_item(
        &self,
        item_id: i32,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<Vec<ItemRead>, DomainError> {
        let Some(item) = self.items.read_by_id(item_id, false).await? else {
            tracing::warn!(item_id, "cannot list reads, item not found");
            return Ok(Vec::new());
        };
        let from = from.unwrap_or(DateTime::<Utc>::MIN_UTC);
        let to = to.unwrap_or_else(Utc::now);
        self.reads.list_for_tag_in_range(&item.tag_id, from, to).await
    }
}

/// Parse a device-supplied timestamp, falling back to the current instant.
///
/// Devices in the field send RFC 3339 with or without an offset; older
/// firmware sends a bare local datetime.
pub fn parse_read_time(s: Option<&str>) -> DateTime<Utc> {
    let Some(s) = s.map(str::trim).filter(|s| !s.is_empty()) else {
        return Utc::now();
    };
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return t.with_timezone(&Utc);
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return t.and_utc();
    }
    Utc::now()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_read_time_accepts_rfc3339() {
        let t = parse_read_time(Some("2026-02-18T12:34:56Z"));
        assert_eq!(t.to_rfc3339(), "2026-02-18T12:34:56+00:00");
    }

    #[test]
    fn parse_read_time_accepts_naive_datetime() {
        let t = parse_read_time(Some("2026-02-18T12:34:56.500"));
        assert_eq!(t.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn parse_read_time_falls_back_to_now() {
        let before = Utc::now();
        let t = parse_read_time(Some("not a timestamp"));
        assert!(t >= before);
    }
}
