//! The ordered message pipeline.
//!
//! Client sessions and the device bridge only ever *enqueue* jobs here; one
//! background worker drains the queue in arrival order and routes each
//! message to its entity handler. Total ordering of all mutations through
//! that single worker is the system's concurrency-control strategy — no
//! locking is needed downstream for attach/detach or create/delete races.

mod dispatcher;
mod envelope;
pub mod handlers;

pub use dispatcher::{Job, MessageDispatcher, ReplySink};
pub use envelope::{Envelope, MessageType};
