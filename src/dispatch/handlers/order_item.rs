//! OrderItem.* wire handlers.

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use crate::application::Services;
use crate::dispatch::Envelope;
use crate::domain::Position;

use super::{require_id, soften, HandlerResult};

/// In: `OrderItem.List` — Out: `OrderItem.Snapshot` (active relations only).
pub async fn list(services: &Services) -> HandlerResult {
    let relations = match services.order_items.list_all(false).await {
        Ok(relations) => relations,
        Err(err) => return soften(err, "OrderItem.List"),
    };
    let rows: Vec<Value> = relations
        .iter()
        .map(|oi| json!({ "orderId": oi.order_id, "itemId": oi.item_id }))
        .collect();
    Ok(Some(Envelope::build(
        "OrderItem.Snapshot",
        json!({ "orders": rows }),
    )))
}

/// In: `OrderItem.Create` / `OrderItem.Update` — Out: `OrderItem.Upsert`.
///
/// Both verbs attach: the relation has no other mutable state.
pub async fn upsert(services: &Services, payload: &Value) -> HandlerResult {
    let Some(order_id) = require_id(payload, "orderId", "OrderItem.Upsert") else {
        return Ok(None);
    };
    let Some(item_id) = require_id(payload, "itemId", "OrderItem.Upsert") else {
        return Ok(None);
    };

    let relation = match services.order_items.attach(item_id, order_id).await {
        Ok(relation) => relation,
        Err(err) => return soften(err, "OrderItem.Upsert"),
    };

    Ok(Some(Envelope::build(
        "OrderItem.Upsert",
        json!({
            "orderId": relation.order_id,
            "itemId": relation.item_id,
            "deleted": relation.deleted,
        }),
    )))
}

/// In: `OrderItem.Delete` — Out: `OrderItem.Deleted`.
pub async fn delete(services: &Services, payload: &Value) -> HandlerResult {
    let Some(order_id) = require_id(payload, "orderId", "OrderItem.Delete") else {
        return Ok(None);
    };
    let Some(item_id) = require_id(payload, "itemId", "OrderItem.Delete") else {
        return Ok(None);
    };

    match services.order_items.detach(item_id, order_id).await {
        Ok(true) => Ok(Some(Envelope::build(
            "OrderItem.Deleted",
            json!({ "orderId": order_id, "itemId": item_id }),
        ))),
        Ok(false) => {
            tracing::warn!(order_id, item_id, "no active relation to detach");
            Ok(None)
        }
        Err(err) => soften(err, "OrderItem.Delete"),
    }
}

/// In: `OrderItem.ListByOrder` — Out: `OrderItem.SnapshotForOrder`, each
/// relation carrying its item embedded for the order detail view.
pub async fn list_by_order(services: &Services, payload: &Value) -> HandlerResult {
    let Some(order_id) = require_id(payload, "orderId", "OrderItem.ListByOrder") else {
        return Ok(None);
    };

    let relations = match services.order_items.items_in_order(order_id, false).await {
        Ok(relations) => relations,
        Err(err) => return soften(err, "OrderItem.ListByOrder"),
    };
    tracing::debug!(order_id, count = relations.len(), "listing order contents");

    let mut rows = Vec::with_capacity(relations.len());
    for relation in &relations {
        let mut node = Map::new();
        node.insert("orderId".into(), json!(relation.order_id));
        node.insert("itemId".into(), json!(relation.item_id));
        node.insert("deleted".into(), json!(relation.deleted));
        match services.items.get_item_by_id(relation.item_id, true).await {
            Ok(Some(item)) => {
                node.insert(
                    "item".into(),
                    json!({
                        "itemId": item.item_id,
                        "tagId": item.tag_id,
                        "position": item.position.as_str(),
                        "isOverdue": item.is_overdue,
                        "deleted": item.deleted,
                    }),
                );
            }
            Ok(None) => {}
            Err(err) => return soften(err, "OrderItem.ListByOrder"),
        }
        rows.push(Value::Object(node));
    }

    Ok(Some(Envelope::build(
        "OrderItem.SnapshotForOrder",
        json!({ "orderId": order_id, "items": rows }),
    )))
}

/// In: `OrderItem.PositionCounts` — Out: `OrderItem.PositionCounts`, the
/// per-position tally of an order's items for the dashboard strip.
pub async fn position_counts(services: &Services, payload: &Value) -> HandlerResult {
    let Some(order_id) = require_id(payload, "orderId", "OrderItem.PositionCounts") else {
        return Ok(None);
    };

    let items = match services.items.list_items_for_order(order_id, false).await {
        Ok(items) => items,
        Err(err) => return soften(err, "OrderItem.PositionCounts"),
    };

    let mut counts: BTreeMap<&'static str, u32> = Position::ALL
        .iter()
        .map(|p| (p.as_str(), 0))
        .collect();
    for item in &items {
        *counts.entry(item.position.as_str()).or_insert(0) += 1;
    }

    Ok(Some(Envelope::build(
        "OrderItem.PositionCounts",
        json!({ "orderId": order_id, "counts": counts }),
    )))
}
