//! End-to-end pipeline tests over the in-memory store: enqueue raw wire
//! messages, read replies off per-connection sinks, and check the domain
//! effects the spec pins down.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::mpsc;

use tagtrail::adapters::memory::InMemoryStore;
use tagtrail::application::Services;
use tagtrail::dispatch::{Envelope, MessageDispatcher};
use tagtrail::domain::{DomainError, PersonRole, Position};

fn services(store: &InMemoryStore) -> Arc<Services> {
    let store = Arc::new(store.clone());
    Arc::new(Services::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        store,
    ))
}

fn raw(msg_type: &str, payload: serde_json::Value) -> String {
    format!(
        "{msg_type}\n{}",
        json!({ "type": msg_type, "payload": payload })
    )
}

async fn next_reply(rx: &mut mpsc::UnboundedReceiver<String>) -> Envelope {
    let text = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for reply")
        .expect("reply channel closed");
    Envelope::parse(&text).expect("reply must be a valid envelope")
}

#[tokio::test]
async fn end_to_end_item_lifecycle() {
    let store = InMemoryStore::new();
    let dispatcher = MessageDispatcher::start(services(&store));
    let (tx, mut rx) = mpsc::unbounded_channel();

    dispatcher.enqueue(
        raw(
            "Item.Create",
            json!({ "tagId": "TAG-9", "position": "HOME", "isOverdue": false }),
        ),
        Some(tx.clone()),
    );
    let upsert = next_reply(&mut rx).await;
    assert_eq!(upsert.msg_type, "Item.Upsert");
    assert_eq!(upsert.payload["tagId"], "TAG-9");
    assert_eq!(upsert.payload["position"], "HOME");
    assert_eq!(upsert.payload["isOverdue"], false);
    let item_id = upsert.payload["itemId"].as_i64().expect("new item id");
    assert!(item_id > 0);

    dispatcher.enqueue(
        raw("Item.Delete", json!({ "itemId": item_id })),
        Some(tx.clone()),
    );
    let deleted = next_reply(&mut rx).await;
    assert_eq!(deleted.msg_type, "Item.Deleted");
    assert_eq!(deleted.payload["itemId"], item_id);

    dispatcher.enqueue(raw("Item.List", json!({})), Some(tx));
    let snapshot = next_reply(&mut rx).await;
    assert_eq!(snapshot.msg_type, "Item.Snapshot");
    let rows = snapshot.payload["orders"].as_array().unwrap();
    assert!(
        rows.iter().all(|row| row["itemId"] != item_id),
        "deleted item must not appear in the snapshot"
    );
}

#[tokio::test]
async fn first_enqueued_attach_wins_deterministically() {
    let store = InMemoryStore::new();
    let svc = services(&store);
    let order_a = svc.orders.create_order(None, None, None).await.unwrap();
    let order_b = svc.orders.create_order(None, None, None).await.unwrap();
    let item = svc
        .items
        .create_item("TAG-RACE", Position::Home, false)
        .await
        .unwrap();

    let dispatcher = MessageDispatcher::start(svc.clone());

    // Two producers race for the same item; arrival order decides.
    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = mpsc::unbounded_channel();
    dispatcher.enqueue(
        raw(
            "OrderItem.Create",
            json!({ "orderId": order_a.order_id, "itemId": item.item_id }),
        ),
        Some(tx_a),
    );
    dispatcher.enqueue(
        raw(
            "OrderItem.Create",
            json!({ "orderId": order_b.order_id, "itemId": item.item_id }),
        ),
        Some(tx_b.clone()),
    );
    // Marker after the losing attach: its reply proves the attach was
    // processed and produced silence.
    dispatcher.enqueue(raw("OrderItem.List", json!({})), Some(tx_b));

    let winner = next_reply(&mut rx_a).await;
    assert_eq!(winner.msg_type, "OrderItem.Upsert");
    assert_eq!(winner.payload["orderId"], order_a.order_id);

    let marker = next_reply(&mut rx_b).await;
    assert_eq!(
        marker.msg_type, "OrderItem.Snapshot",
        "losing attach must produce no reply"
    );

    assert!(svc
        .order_items
        .is_attached(order_a.order_id, item.item_id)
        .await
        .unwrap());
    assert_eq!(store.active_relations_for_item(item.item_id), 1);
}

#[tokio::test]
async fn move_failure_leaves_original_attachment() {
    let store = InMemoryStore::new();
    let svc = services(&store);
    let order_a = svc.orders.create_order(None, None, None).await.unwrap();
    let item = svc
        .items
        .create_item("TAG-MOVE", Position::Home, false)
        .await
        .unwrap();
    svc.order_items
        .attach(item.item_id, order_a.order_id)
        .await
        .unwrap();

    let result = svc
        .order_items
        .move_item(item.item_id, order_a.order_id, 9999)
        .await;
    assert!(matches!(result, Err(DomainError::NotFound { .. })));

    assert!(
        svc.order_items
            .is_attached(order_a.order_id, item.item_id)
            .await
            .unwrap(),
        "failed move must leave the item attached to its original order"
    );
}

#[tokio::test]
async fn revived_relation_instead_of_duplicate_row() {
    let store = InMemoryStore::new();
    let svc = services(&store);
    let order = svc.orders.create_order(None, None, None).await.unwrap();
    let item = svc
        .items
        .create_item("TAG-REVIVE", Position::Home, false)
        .await
        .unwrap();

    svc.order_items
        .attach(item.item_id, order.order_id)
        .await
        .unwrap();
    assert!(svc
        .order_items
        .detach(item.item_id, order.order_id)
        .await
        .unwrap());
    svc.order_items
        .attach(item.item_id, order.order_id)
        .await
        .unwrap();

    // One row total for the pair, revived rather than duplicated.
    let all = svc.order_items.list_all(true).await.unwrap();
    let pair_rows: Vec<_> = all
        .iter()
        .filter(|oi| oi.order_id == order.order_id && oi.item_id == item.item_id)
        .collect();
    assert_eq!(pair_rows.len(), 1);
    assert!(!pair_rows[0].deleted);
}

#[tokio::test]
async fn detach_is_idempotent() {
    let store = InMemoryStore::new();
    let svc = services(&store);
    let order = svc.orders.create_order(None, None, None).await.unwrap();
    let item = svc
        .items
        .create_item("TAG-IDEM", Position::Home, false)
        .await
        .unwrap();

    assert!(!svc
        .order_items
        .detach(item.item_id, order.order_id)
        .await
        .unwrap());

    svc.order_items
        .attach(item.item_id, order.order_id)
        .await
        .unwrap();
    assert!(svc
        .order_items
        .detach(item.item_id, order.order_id)
        .await
        .unwrap());
    assert!(!svc
        .order_items
        .detach(item.item_id, order.order_id)
        .await
        .unwrap());
}

#[tokio::test]
async fn dedup_window_suppresses_rapid_repeat_scans() {
    let store = InMemoryStore::new();
    let svc = services(&store);
    svc.items
        .create_item("TAG-D", Position::Home, false)
        .await
        .unwrap();

    let dispatcher = MessageDispatcher::start(svc.clone());
    let (tx, mut rx) = mpsc::unbounded_channel();

    let scan = |at: &str| {
        raw(
            "ItemRead.Create",
            json!({ "tagId": "TAG-D", "readTime": at }),
        )
    };
    dispatcher.enqueue(scan("2026-03-01T10:00:00Z"), Some(tx.clone()));
    dispatcher.enqueue(scan("2026-03-01T10:00:01Z"), Some(tx.clone())); // inside window
    dispatcher.enqueue(scan("2026-03-01T10:00:03Z"), Some(tx.clone())); // outside window
    dispatcher.enqueue(raw("ItemRead.List", json!({})), Some(tx));

    let first = next_reply(&mut rx).await;
    assert_eq!(first.msg_type, "ItemRead.Upsert");
    let second = next_reply(&mut rx).await;
    assert_eq!(
        second.msg_type, "ItemRead.Upsert",
        "the t0+1s scan must be suppressed silently"
    );
    assert_eq!(second.payload["readTime"], "2026-03-01T10:00:03+00:00");

    let snapshot = next_reply(&mut rx).await;
    assert_eq!(snapshot.msg_type, "ItemRead.Snapshot");
    assert_eq!(snapshot.payload["orders"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_tag_scan_is_dropped() {
    let store = InMemoryStore::new();
    let svc = services(&store);
    let recorded = svc
        .item_reads
        .record_scan("NEVER-SEEN", Some("2026-03-01T10:00:00Z"))
        .await
        .unwrap();
    assert!(recorded.is_none());
    assert!(svc.item_reads.list_active().await.unwrap().is_empty());
}

#[tokio::test]
async fn unrecognized_type_gets_no_reply() {
    let store = InMemoryStore::new();
    let dispatcher = MessageDispatcher::start(services(&store));
    let (tx, mut rx) = mpsc::unbounded_channel();

    dispatcher.enqueue(raw("Order.Explode", json!({})), Some(tx.clone()));
    dispatcher.enqueue("complete garbage, not even an envelope".to_string(), Some(tx.clone()));
    dispatcher.enqueue(raw("Order.List", json!({})), Some(tx));

    // Only the snapshot arrives; the stranger and the garbage died quietly.
    let reply = next_reply(&mut rx).await;
    assert_eq!(reply.msg_type, "Order.Snapshot");
}

#[tokio::test]
async fn order_update_rejects_inverted_dates() {
    let store = InMemoryStore::new();
    let svc = services(&store);
    let order = svc.orders.create_order(None, None, None).await.unwrap();

    let dispatcher = MessageDispatcher::start(svc.clone());
    let (tx, mut rx) = mpsc::unbounded_channel();
    dispatcher.enqueue(
        raw(
            "Order.Update",
            json!({
                "orderId": order.order_id,
                "startDate": "2026-04-10",
                "endDate": "2026-04-01",
            }),
        ),
        Some(tx.clone()),
    );
    dispatcher.enqueue(raw("Order.List", json!({})), Some(tx));

    let reply = next_reply(&mut rx).await;
    assert_eq!(
        reply.msg_type, "Order.Snapshot",
        "inverted dates must produce no upsert"
    );
    let fresh = svc.orders.get_order(order.order_id, true).await.unwrap().unwrap();
    assert_eq!(fresh.start_date, None);
    assert_eq!(fresh.end_date, None);
}

#[tokio::test]
async fn order_update_preserves_created_date() {
    let store = InMemoryStore::new();
    let svc = services(&store);
    let created: chrono::NaiveDate = "2026-01-15".parse().unwrap();
    let order = svc
        .orders
        .create_order(Some(created), None, None)
        .await
        .unwrap();

    let dispatcher = MessageDispatcher::start(svc.clone());
    let (tx, mut rx) = mpsc::unbounded_channel();
    dispatcher.enqueue(
        raw(
            "Order.Update",
            json!({
                "orderId": order.order_id,
                "createdDate": "2030-12-31",
                "startDate": "2026-02-01",
            }),
        ),
        Some(tx),
    );

    let reply = next_reply(&mut rx).await;
    assert_eq!(reply.msg_type, "Order.Upsert");
    assert_eq!(reply.payload["order"]["createdDate"], "2026-01-15");
    assert_eq!(reply.payload["order"]["startDate"], "2026-02-01");
}

#[tokio::test]
async fn order_delete_answers_with_tombstone_upsert() {
    let store = InMemoryStore::new();
    let svc = services(&store);
    let customer = svc
        .people
        .create_person("Ada Lovelace", PersonRole::Customer)
        .await
        .unwrap();
    let order = svc
        .orders
        .create_order(None, Some(customer.person_id), None)
        .await
        .unwrap();

    let dispatcher = MessageDispatcher::start(svc);
    let (tx, mut rx) = mpsc::unbounded_channel();
    dispatcher.enqueue(
        raw("Order.Delete", json!({ "orderId": order.order_id })),
        Some(tx),
    );

    let reply = next_reply(&mut rx).await;
    assert_eq!(reply.msg_type, "Order.Upsert");
    assert_eq!(reply.payload["order"]["deleted"], true);
    assert_eq!(reply.payload["order"]["customerId"], customer.person_id);
}

#[tokio::test]
async fn duplicate_tag_create_is_rejected_silently() {
    let store = InMemoryStore::new();
    let svc = services(&store);
    svc.items
        .create_item("TAG-DUP", Position::Home, false)
        .await
        .unwrap();

    let dispatcher = MessageDispatcher::start(svc);
    let (tx, mut rx) = mpsc::unbounded_channel();
    dispatcher.enqueue(
        raw(
            "Item.Create",
            json!({ "tagId": "TAG-DUP", "position": "HOME" }),
        ),
        Some(tx.clone()),
    );
    dispatcher.enqueue(raw("Item.List", json!({})), Some(tx));

    let reply = next_reply(&mut rx).await;
    assert_eq!(reply.msg_type, "Item.Snapshot");
    assert_eq!(reply.payload["orders"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn user_snapshot_never_carries_password_material() {
    let store = InMemoryStore::new();
    let svc = services(&store);

    let dispatcher = MessageDispatcher::start(svc);
    let (tx, mut rx) = mpsc::unbounded_channel();
    dispatcher.enqueue(
        raw(
            "User.Create",
            json!({ "username": "edsger", "password": "shortest-path", "role": "ADMIN" }),
        ),
        Some(tx.clone()),
    );
    dispatcher.enqueue(raw("User.List", json!({})), Some(tx));

    let upsert = next_reply(&mut rx).await;
    assert_eq!(upsert.msg_type, "User.Upsert");
    assert_eq!(upsert.payload["username"], "edsger");
    assert!(upsert.payload.get("password").is_none());
    assert!(upsert.payload.get("passwordHash").is_none());

    let snapshot = next_reply(&mut rx).await;
    let text = snapshot.payload.to_string();
    assert!(!text.contains("argon2"), "hash must never hit the wire");
}
