//! Entity message handlers: one module per wire family.
//!
//! Contract per operation: validate the payload (missing or invalid
//! required fields produce a warning and no outbound message — nothing
//! throws past this boundary), call the matching domain service, and
//! serialize the result into the entity's outbound envelope. Domain-level
//! rejections are treated the same way as validation failures; only store
//! faults propagate, to be logged by the dispatcher.

pub mod item;
pub mod item_read;
pub mod order;
pub mod order_item;
pub mod person;
pub mod user;

use chrono::NaiveDate;
use serde_json::Value;

use crate::domain::DomainError;

/// Outcome of one handler invocation: an outbound wire message or silence.
pub type HandlerResult = Result<Option<String>, DomainError>;

/// Downgrade an expected rejection (validation, unknown id, constraint) to
/// "no outbound message". Store faults stay errors.
fn soften(err: DomainError, context: &str) -> HandlerResult {
    match err {
        DomainError::Store(_) => Err(err),
        rejected => {
            tracing::warn!(context, %rejected, "request rejected");
            Ok(None)
        }
    }
}

/// A required positive id out of the payload, or `None` with a warning.
fn require_id(payload: &Value, field: &str, context: &str) -> Option<i32> {
    let id = payload.get(field).and_then(Value::as_i64).unwrap_or(0);
    if id <= 0 {
        tracing::warn!(context, field, "missing or invalid id in payload");
        return None;
    }
    i32::try_from(id).ok()
}

fn opt_str<'a>(payload: &'a Value, field: &str) -> Option<&'a str> {
    payload.get(field).and_then(Value::as_str)
}

fn opt_i32(payload: &Value, field: &str) -> Option<i32> {
    payload
        .get(field)
        .and_then(Value::as_i64)
        .and_then(|v| i32::try_from(v).ok())
}

/// Lenient `yyyy-MM-dd` parse: a bad value is logged and ignored rather
/// than failing the whole message.
fn parse_date(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    match s.parse::<NaiveDate>() {
        Ok(date) => Some(date),
        Err(_) => {
            tracing::warn!(value = s, "failed to parse date, ignoring");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn require_id_rejects_zero_and_missing() {
        let payload = json!({ "orderId": 0 });
        assert_eq!(require_id(&payload, "orderId", "test"), None);
        assert_eq!(require_id(&payload, "itemId", "test"), None);
        assert_eq!(require_id(&json!({ "orderId": 7 }), "orderId", "test"), Some(7));
    }

    #[test]
    fn parse_date_ignores_garbage() {
        assert_eq!(parse_date(Some("2026-03-01")), "2026-03-01".parse().ok());
        assert_eq!(parse_date(Some("03/01/2026")), None);
        assert_eq!(parse_date(None), None);
    }
}
