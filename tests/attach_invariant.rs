//! Property test for the attach invariant: however attach/detach/move
//! operations interleave, no item is ever held by more than one active
//! relation.

use std::sync::Arc;

use proptest::prelude::*;

use tagtrail::adapters::memory::InMemoryStore;
use tagtrail::application::Services;
use tagtrail::domain::Position;

const ORDERS: i32 = 3;
const ITEMS: i32 = 4;

#[derive(Debug, Clone, Copy)]
enum Op {
    Attach { item: i32, order: i32 },
    Detach { item: i32, order: i32 },
    Move { item: i32, from: i32, to: i32 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    let item = 1..=ITEMS;
    let order = 1..=ORDERS;
    prop_oneof![
        (item.clone(), order.clone()).prop_map(|(item, order)| Op::Attach { item, order }),
        (item.clone(), order.clone()).prop_map(|(item, order)| Op::Detach { item, order }),
        (item, order.clone(), order).prop_map(|(item, from, to)| Op::Move { item, from, to }),
    ]
}

fn build_services(store: &InMemoryStore) -> Arc<Services> {
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

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn no_item_is_ever_in_two_active_orders(ops in proptest::collection::vec(op_strategy(), 1..80)) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");

        rt.block_on(async {
            let store = InMemoryStore::new();
            let services = build_services(&store);

            for _ in 0..ORDERS {
                services.orders.create_order(None, None, None).await.expect("order");
            }
            for i in 1..=ITEMS {
                services
                    .items
                    .create_item(&format!("TAG-{i}"), Position::Home, false)
                    .await
                    .expect("item");
            }

            for op in &ops {
                // Rejections are part of normal operation; only the
                // invariant matters.
                match *op {
                    Op::Attach { item, order } => {
                        let _ = services.order_items.attach(item, order).await;
                    }
                    Op::Detach { item, order } => {
                        let _ = services.order_items.detach(item, order).await;
                    }
                    Op::Move { item, from, to } => {
                        let _ = services.order_items.move_item(item, from, to).await;
                    }
                }

                for item in 1..=ITEMS {
                    let active = store.active_relations_for_item(item);
                    prop_assert!(
                        active <= 1,
                        "item {item} held by {active} active relations after {op:?}"
                    );
                }
            }
            Ok(())
        })?;
    }
}
