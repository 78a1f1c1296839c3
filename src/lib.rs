//! Tagtrail - backend for a tagged-asset tracking application.
//!
//! Field devices scan tagged items, staff manage orders that bundle items,
//! and a desktop client observes and edits this state over a WebSocket
//! protocol. Everything flows through one ordered message dispatcher.

pub mod adapters;
pub mod application;
pub mod config;
pub mod dispatch;
pub mod domain;
pub mod ports;
