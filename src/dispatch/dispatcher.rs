//! The single-consumer job queue.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::Services;

use super::envelope::{Envelope, MessageType};
use super::handlers;

/// Per-connection channel the worker delivers replies into. The session's
/// writer task drains it; when the connection is gone the send fails and
/// the reply is dropped silently.
pub type ReplySink = mpsc::UnboundedSender<String>;

/// A queued unit of work: one raw inbound message plus the sink that leads
/// back to the originating connection, if any.
pub struct Job {
    pub raw: String,
    pub reply: Option<ReplySink>,
}

/// Front of the pipeline: producers enqueue, exactly one worker consumes.
///
/// Cloning shares the same queue. Enqueue never blocks the caller; the
/// worker blocks only while the queue is empty.
#[derive(Clone)]
pub struct MessageDispatcher {
    tx: mpsc::UnboundedSender<Job>,
}

impl MessageDispatcher {
    /// Create the dispatcher and spawn its worker task.
    pub fn start(services: Arc<Services>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(rx, services));
        Self { tx }
    }

    /// Queue a message. A `None` reply sink makes the job fire-and-forget.
    pub fn enqueue(&self, raw: impl Into<String>, reply: Option<ReplySink>) {
        let raw = raw.into();
        tracing::debug!(message = %Envelope::peek_type(&raw), "message queued");
        if self.tx.send(Job { raw, reply }).is_err() {
            tracing::error!("dispatcher worker is gone, dropping message");
        }
    }
}

/// Drain jobs strictly in arrival order. A failing handler never stops the
/// worker: the failure is logged and treated as "no outbound message".
async fn run_worker(mut rx: mpsc::UnboundedReceiver<Job>, services: Arc<Services>) {
    while let Some(job) = rx.recv().await {
        let outbound = route(&services, &job.raw).await;
        match (outbound, job.reply) {
            (Some(message), Some(reply)) => {
                if reply.send(message).is_err() {
                    tracing::debug!("connection closed before reply, dropping outbound");
                }
            }
            (Some(_), None) => {}
            (None, _) => tracing::debug!("no outbound message produced"),
        }
    }
    tracing::info!("dispatcher queue closed, worker exiting");
}

async fn route(services: &Services, raw: &str) -> Option<String> {
    let envelope = match Envelope::parse(raw) {
        Ok(envelope) => envelope,
        Err(err) => {
            tracing::warn!(%err, "unparseable inbound message");
            return None;
        }
    };
    let Some(msg_type) = MessageType::parse(&envelope.msg_type) else {
        tracing::info!(msg_type = %envelope.msg_type, "unmatched message type, dropping");
        return None;
    };

    use MessageType::*;
    let result = match msg_type {
        OrderList => handlers::order::list(services).await,
        OrderCreate => handlers::order::upsert(services, &envelope.payload, true).await,
        OrderUpdate => handlers::order::upsert(services, &envelope.payload, false).await,
        OrderDelete => handlers::order::delete(services, &envelope.payload).await,

        ItemList => handlers::item::list(services).await,
        ItemCreate => handlers::item::upsert(services, &envelope.payload, true).await,
        ItemUpdate => handlers::item::upsert(services, &envelope.payload, false).await,
        ItemDelete => handlers::item::delete(services, &envelope.payload).await,

        OrderItemList => handlers::order_item::list(services).await,
        OrderItemCreate | OrderItemUpdate => {
            handlers::order_item::upsert(services, &envelope.payload).await
        }
        OrderItemDelete => handlers::order_item::delete(services, &envelope.payload).await,
        OrderItemListByOrder => {
            handlers::order_item::list_by_order(services, &envelope.payload).await
        }
        OrderItemPositionCounts => {
            handlers::order_item::position_counts(services, &envelope.payload).await
        }

        ItemReadList => handlers::item_read::list(services).await,
        ItemReadCreate | BrokerItemReadCreate => {
            handlers::item_read::upsert(services, &envelope.payload, true).await
        }
        ItemReadUpdate => handlers::item_read::upsert(services, &envelope.payload, false).await,
        ItemReadDelete => handlers::item_read::delete(services, &envelope.payload).await,
        ItemReadListByItem => handlers::item_read::list_by_item(services, &envelope.payload).await,

        PersonList => handlers::person::list(services).await,
        PersonCreate => handlers::person::upsert(services, &envelope.payload, true).await,
        PersonUpdate => handlers::person::upsert(services, &envelope.payload, false).await,
        PersonDelete => handlers::person::delete(services, &envelope.payload).await,

        UserList => handlers::user::list(services).await,
        UserCreate => handlers::user::upsert(services, &envelope.payload, true).await,
        UserUpdate => handlers::user::upsert(services, &envelope.payload, false).await,
        UserDelete => handlers::user::delete(services, &envelope.payload).await,
    };

    match result {
        Ok(outbound) => outbound,
        Err(err) => {
            tracing::error!(msg_type = %envelope.msg_type, %err, "handler failed");
            None
        }
    }
}
