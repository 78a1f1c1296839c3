//! ItemRead.* wire handlers, including broker-tagged scan creates.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::application::Services;
use crate::dispatch::Envelope;
use crate::domain::ItemRead;

use super::{opt_str, require_id, soften, HandlerResult};

/// In: `ItemRead.Create` (or `BrokerItemRead.Create`) / `ItemRead.Update` —
/// Out: `ItemRead.Upsert`.
///
/// A suppressed duplicate or unknown tag yields no outbound message.
pub async fn upsert(services: &Services, payload: &Value, create: bool) -> HandlerResult {
    let Some(tag_id) = opt_str(payload, "tagId").filter(|t| !t.trim().is_empty()) else {
        tracing::warn!("missing tagId in ItemRead payload");
        return Ok(None);
    };
    let read_time = opt_str(payload, "readTime");

    let result = if create {
        services.item_reads.record_scan(tag_id, read_time).await
    } else {
        let Some(read_id) = require_id(payload, "readId", "ItemRead.Update") else {
            return Ok(None);
        };
        services.item_reads.update_read(read_id, tag_id, read_time).await
    };

    match result {
        Ok(Some(read)) => Ok(Some(Envelope::build("ItemRead.Upsert", read_json(&read)))),
        Ok(None) => Ok(None),
        Err(err) => soften(err, "ItemRead.Upsert"),
    }
}

/// In: `ItemRead.List` — Out: `ItemRead.Snapshot`.
pub async fn list(services: &Services) -> HandlerResult {
    let reads = match services.item_reads.list_active().await {
        Ok(reads) => reads,
        Err(err) => return soften(err, "ItemRead.List"),
    };
    let rows: Vec<Value> = reads.iter().map(read_json).collect();
    Ok(Some(Envelope::build(
        "ItemRead.Snapshot",
        json!({ "orders": rows }),
    )))
}

/// In: `ItemRead.Delete` — Out: `ItemRead.Deleted`.
pub async fn delete(services: &Services, payload: &Value) -> HandlerResult {
    let Some(read_id) = require_id(payload, "readId", "ItemRead.Delete") else {
        return Ok(None);
    };
    match services.item_reads.delete_read(read_id).await {
        Ok(true) => Ok(Some(Envelope::build(
            "ItemRead.Deleted",
            json!({ "readId": read_id }),
        ))),
        Ok(false) => Ok(None),
        Err(err) => soften(err, "ItemRead.Delete"),
    }
}

/// In: `ItemRead.ListByItem` — Out: `ItemRead.SnapshotForItem` with the
/// optional `[from, to]` window applied.
pub async fn list_by_item(services: &Services, payload: &Value) -> HandlerResult {
    let Some(item_id) = require_id(payload, "itemId", "ItemRead.ListByItem") else {
        return Ok(None);
    };
    let from = parse_instant(opt_str(payload, "from"));
    let to = parse_instant(opt_str(payload, "to"));

    let reads = match services.item_reads.list_for_item(item_id, from, to).await {
        Ok(reads) => reads,
        Err(err) => return soften(err, "ItemRead.ListByItem"),
    };

    let rows: Vec<Value> = reads
        .iter()
        .map(|r| {
            json!({
                "readId": r.read_id,
                "tagId": r.tag_id,
                "readTime": r.read_time.to_rfc3339(),
                "deleted": r.deleted,
            })
        })
        .collect();

    Ok(Some(Envelope::build(
        "ItemRead.SnapshotForItem",
        json!({ "itemId": item_id, "reads": rows }),
    )))
}

fn read_json(read: &ItemRead) -> Value {
    json!({
        "readId": read.read_id,
        "tagId": read.tag_id,
        "readTime": read.read_time.to_rfc3339(),
    })
}

fn parse_instant(s: Option<&str>) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s?.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
