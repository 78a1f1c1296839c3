//! Order.* wire handlers.

use serde_json::{json, Map, Value};

use crate::application::Services;
use crate::dispatch::Envelope;
use crate::domain::Order;

use super::{opt_i32, opt_str, parse_date, require_id, soften, HandlerResult};

/// In: `Order.List` — Out: `Order.Snapshot`.
pub async fn list(services: &Services) -> HandlerResult {
    let orders = match services.orders.list_active_orders().await {
        Ok(orders) => orders,
        Err(err) => return soften(err, "Order.List"),
    };
    let rows: Vec<Value> = orders.iter().map(order_json).collect();
    Ok(Some(Envelope::build(
        "Order.Snapshot",
        json!({ "orders": rows }),
    )))
}

/// In: `Order.Create` / `Order.Update` — Out: `Order.Upsert`.
///
/// On update, a client-supplied `createdDate` is ignored: the stored
/// creation date is immutable.
pub async fn upsert(services: &Services, payload: &Value, create: bool) -> HandlerResult {
    let start = parse_date(opt_str(payload, "startDate"));
    let end = parse_date(opt_str(payload, "endDate"));

    let order = if create {
        let created = parse_date(opt_str(payload, "createdDate"));
        let customer_id = opt_i32(payload, "customerId");
        let logged_by_id = opt_i32(payload, "loggedById");
        let mut order = match services
            .orders
            .create_order(created, customer_id, logged_by_id)
            .await
        {
            Ok(order) => order,
            Err(err) => return soften(err, "Order.Create"),
        };
        if start.is_some() || end.is_some() {
            match services
                .orders
                .update_order_dates(order.order_id, start, end)
                .await
            {
                Ok(false) => tracing::warn!(
                    order_id = order.order_id,
                    "failed to set dates for newly created order"
                ),
                Err(err) => return soften(err, "Order.Create"),
                Ok(true) => {}
            }
            match services.orders.get_order(order.order_id, true).await {
                Ok(Some(fresh)) => order = fresh,
                Ok(None) => return Ok(None),
                Err(err) => return soften(err, "Order.Create"),
            }
        }
        order
    } else {
        let Some(order_id) = require_id(payload, "orderId", "Order.Update") else {
            return Ok(None);
        };
        match services.orders.update_order_dates(order_id, start, end).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(order_id, "failed to update dates for order");
                return Ok(None);
            }
            Err(err) => return soften(err, "Order.Update"),
        }
        match services.orders.get_order(order_id, true).await {
            Ok(Some(order)) => order,
            Ok(None) => return Ok(None),
            Err(err) => return soften(err, "Order.Update"),
        }
    };

    Ok(Some(Envelope::build(
        "Order.Upsert",
        json!({ "order": order_json(&order) }),
    )))
}

/// In: `Order.Delete` — Out: `Order.Upsert` with `deleted: true`.
///
/// The catalogue has no `Order.Deleted`; the desktop client folds the
/// tombstone into its normal upsert path.
pub async fn delete(services: &Services, payload: &Value) -> HandlerResult {
    let Some(order_id) = require_id(payload, "orderId", "Order.Delete") else {
        return Ok(None);
    };
    match services.orders.soft_delete_order(order_id).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!(order_id, "failed to soft-delete order");
            return Ok(None);
        }
        Err(err) => return soften(err, "Order.Delete"),
    }
    match services.orders.get_order(order_id, true).await {
        Ok(Some(order)) => Ok(Some(Envelope::build(
            "Order.Upsert",
            json!({ "order": order_json(&order) }),
        ))),
        Ok(None) => Ok(None),
        Err(err) => soften(err, "Order.Delete"),
    }
}

/// Serialize an order, omitting unset optionals the way the desktop client
/// expects (absent, not null).
fn order_json(order: &Order) -> Value {
    let mut node = Map::new();
    node.insert("orderId".into(), json!(order.order_id));
    node.insert("createdDate".into(), json!(order.created_date.to_string()));
    if let Some(start) = order.start_date {
        node.insert("startDate".into(), json!(start.to_string()));
    }
    if let Some(end) = order.end_date {
        node.insert("endDate".into(), json!(end.to_string()));
    }
    if let Some(customer) = order.customer_id {
        node.insert("customerId".into(), json!(customer));
    }
    if let Some(logged_by) = order.logged_by_id {
        node.insert("loggedById".into(), json!(logged_by));
    }
    node.insert("deleted".into(), json!(order.deleted));
    Value::Object(node)
}
