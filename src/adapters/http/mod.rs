//! HTTP surface: the login boundary and the WebSocket route.

mod login;

pub use login::login_handler;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::adapters::auth::HmacAuthenticator;
use crate::adapters::ws;
use crate::application::Services;
use crate::dispatch::MessageDispatcher;
use crate::ports::TokenVerifier;

/// Everything the HTTP handlers need, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<Services>,
    pub dispatcher: MessageDispatcher,
    pub verifier: Arc<dyn TokenVerifier>,
    /// Symmetric-mode authenticator; the only component that signs tokens.
    pub issuer: Arc<HmacAuthenticator>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/login", post(login_handler))
        .route("/ws", get(ws::ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
