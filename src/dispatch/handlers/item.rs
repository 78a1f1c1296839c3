//! Item.* wire handlers.

use serde_json::{json, Value};

use crate::application::Services;
use crate::dispatch::Envelope;
use crate::domain::{Item, Position};

use super::{opt_str, require_id, soften, HandlerResult};

/// In: `Item.List` — Out: `Item.Snapshot`.
pub async fn list(services: &Services) -> HandlerResult {
    let items = match services.items.list_active_items().await {
        Ok(items) => items,
        Err(err) => return soften(err, "Item.List"),
    };
    let rows: Vec<Value> = items.iter().map(item_json).collect();
    // Legacy field name: every snapshot family uses an "orders" array.
    Ok(Some(Envelope::build(
        "Item.Snapshot",
        json!({ "orders": rows }),
    )))
}

/// In: `Item.Create` / `Item.Update` — Out: `Item.Upsert`.
pub async fn upsert(services: &Services, payload: &Value, create: bool) -> HandlerResult {
    let item = if create {
        let Some(tag_id) = opt_str(payload, "tagId").filter(|t| !t.trim().is_empty()) else {
            tracing::warn!("missing tagId in Item.Create payload");
            return Ok(None);
        };
        let position = opt_str(payload, "position")
            .and_then(Position::parse)
            .unwrap_or(Position::Home);
        let overdue = payload
            .get("isOverdue")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        match services.items.create_item(tag_id, position, overdue).await {
            Ok(item) => item,
            Err(err) => return soften(err, "Item.Create"),
        }
    } else {
        let Some(item_id) = require_id(payload, "itemId", "Item.Update") else {
            return Ok(None);
        };
        let Some(position) = opt_str(payload, "position").and_then(Position::parse) else {
            tracing::warn!(item_id, "missing or invalid position in Item.Update payload");
            return Ok(None);
        };
        let overdue = payload
            .get("isOverdue")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let moved = match services.items.move_item(item_id, position).await {
            Ok(moved) => moved,
            Err(err) => return soften(err, "Item.Update"),
        };
        let flagged = match services.items.mark_overdue(item_id, overdue).await {
            Ok(flagged) => flagged,
            Err(err) => return soften(err, "Item.Update"),
        };
        if !moved && !flagged {
            tracing::warn!(item_id, "failed to update item");
            return Ok(None);
        }
        match services.items.get_item_by_id(item_id, true).await {
            Ok(Some(item)) => item,
            Ok(None) => return Ok(None),
            Err(err) => return soften(err, "Item.Update"),
        }
    };

    Ok(Some(Envelope::build("Item.Upsert", item_json(&item))))
}

/// In: `Item.Delete` — Out: `Item.Deleted`.
pub async fn delete(services: &Services, payload: &Value) -> HandlerResult {
    let Some(item_id) = require_id(payload, "itemId", "Item.Delete") else {
        return Ok(None);
    };
    match services.items.delete_item(item_id).await {
        Ok(true) => Ok(Some(Envelope::build(
            "Item.Deleted",
            json!({ "itemId": item_id }),
        ))),
        Ok(false) => {
            tracing::warn!(item_id, "failed to delete item");
            Ok(None)
        }
        Err(err) => soften(err, "Item.Delete"),
    }
}

fn item_json(item: &Item) -> Value {
    json!({
        "itemId": item.item_id,
        "tagId": item.tag_id,
        "position": item.position.as_str(),
        "isOverdue": item.overdue(),
    })
}
