//! Wire envelope: a type line, a newline, then a JSON object.
//!
//! Both encodings of the type (line prefix and `type` field) are preserved
//! for compatibility with the deployed desktop client. Inbound parsing
//! treats the JSON field as authoritative; outbound messages always carry
//! both.

use serde_json::Value;

use crate::domain::DomainError;

/// A parsed inbound message.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub msg_type: String,
    pub payload: Value,
}

impl Envelope {
    /// Parse the JSON part of a raw wire message.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let brace = raw
            .find('{')
            .ok_or_else(|| DomainError::validation("message had no JSON part"))?;
        let root: Value = serde_json::from_str(raw[brace..].trim())
            .map_err(|e| DomainError::validation(format!("malformed JSON: {e}")))?;
        let msg_type = root
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| DomainError::validation("missing type field"))?
            .to_string();
        let payload = root.get("payload").cloned().unwrap_or(Value::Null);
        Ok(Envelope { msg_type, payload })
    }

    /// The type line of a raw message, without parsing the JSON. Used by
    /// the session gateway to decide whether to forward at all.
    pub fn peek_type(raw: &str) -> &str {
        raw.split(['\n', '{']).next().unwrap_or("").trim()
    }

    /// Build an outbound wire message. Pretty-printed, as the desktop
    /// client renders the raw JSON in its log panel.
    pub fn build(msg_type: &str, payload: Value) -> String {
        let root = serde_json::json!({ "type": msg_type, "payload": payload });
        let body = serde_json::to_string_pretty(&root)
            .unwrap_or_else(|_| format!("{{\"type\":\"{msg_type}\"}}"));
        format!("{msg_type}\n{body}")
    }
}

/// Every inbound type the dispatcher routes, keyed by exact type string.
///
/// The table replaces the legacy prefix-matching chains; `parse` is the
/// single place a wire string becomes a variant, so adding a message type
/// without routing it is a compile error at the match in the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    OrderList,
    OrderCreate,
    OrderUpdate,
    OrderDelete,
    ItemList,
    ItemCreate,
    ItemUpdate,
    ItemDelete,
    OrderItemList,
    OrderItemCreate,
    OrderItemUpdate,
    OrderItemDelete,
    OrderItemListByOrder,
    OrderItemPositionCounts,
    ItemReadList,
    ItemReadCreate,
    ItemReadUpdate,
    ItemReadDelete,
    ItemReadListByItem,
    /// Scan publications re-tagged by the device bridge.
    BrokerItemReadCreate,
    PersonList,
    PersonCreate,
    PersonUpdate,
    PersonDelete,
    UserList,
    UserCreate,
    UserUpdate,
    UserDelete,
}

impl MessageType {
    pub fn parse(s: &str) -> Option<Self> {
        use MessageType::*;
        Some(match s {
            "Order.List" => OrderList,
            "Order.Create" => OrderCreate,
            "Order.Update" => OrderUpdate,
            "Order.Delete" => OrderDelete,
            "Item.List" => ItemList,
            "Item.Create" => ItemCreate,
            "Item.Update" => ItemUpdate,
            "Item.Delete" => ItemDelete,
            "OrderItem.List" => OrderItemList,
            "OrderItem.Create" => OrderItemCreate,
            "OrderItem.Update" => OrderItemUpdate,
            "OrderItem.Delete" => OrderItemDelete,
            "OrderItem.ListByOrder" => OrderItemListByOrder,
            "OrderItem.PositionCounts" => OrderItemPositionCounts,
            "ItemRead.List" => ItemReadList,
            "ItemRead.Create" => ItemReadCreate,
            "ItemRead.Update" => ItemReadUpdate,
            "ItemRead.Delete" => ItemReadDelete,
            "ItemRead.ListByItem" => ItemReadListByItem,
            "BrokerItemRead.Create" => BrokerItemReadCreate,
            "Person.List" => PersonList,
            "Person.Create" => PersonCreate,
            "Person.Update" => PersonUpdate,
            "Person.Delete" => PersonDelete,
            "User.List" => UserList,
            "User.Create" => UserCreate,
            "User.Update" => UserUpdate,
            "User.Delete" => UserDelete,
            _ => return None,
        })
    }

    /// True when a raw inbound line names a routable type — the session
    /// gateway's forwarding check.
    pub fn is_recognized(raw: &str) -> bool {
        Self::parse(Envelope::peek_type(raw)).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_extracts_type_and_payload() {
        let raw = "Item.Create\n{\"type\":\"Item.Create\",\"payload\":{\"tagId\":\"TAG-1\"}}";
        let env = Envelope::parse(raw).unwrap();
        assert_eq!(env.msg_type, "Item.Create");
        assert_eq!(env.payload["tagId"], "TAG-1");
    }

    #[test]
    fn parse_rejects_message_without_json() {
        assert!(Envelope::parse("Item.List").is_err());
    }

    #[test]
    fn build_emits_type_line_then_json() {
        let out = Envelope::build("Item.Deleted", serde_json::json!({ "itemId": 7 }));
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("Item.Deleted"));
        let rest: String = out.splitn(2, '\n').nth(1).unwrap().to_string();
        let parsed: serde_json::Value = serde_json::from_str(&rest).unwrap();
        assert_eq!(parsed["type"], "Item.Deleted");
        assert_eq!(parsed["payload"]["itemId"], 7);
    }

    #[test]
    fn peek_type_reads_the_first_line() {
        assert_eq!(Envelope::peek_type("Order.List\n{}"), "Order.List");
        assert_eq!(Envelope::peek_type("Order.List{\"type\":1}"), "Order.List");
    }

    #[test]
    fn recognizes_catalogue_types_and_drops_strangers() {
        assert!(MessageType::is_recognized("Order.List\n{}"));
        assert!(MessageType::is_recognized("BrokerItemRead.Create\n{}"));
        assert!(!MessageType::is_recognized("Order.Explode\n{}"));
        assert!(!MessageType::is_recognized("hello there"));
    }
}
