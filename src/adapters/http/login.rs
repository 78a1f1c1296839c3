//! Login endpoint: credentials in, signed token out.
//!
//! A thin wrapper over the symmetric-mode authenticator. The response body
//! keeps the legacy `{"REGISTER": "<token>"}` shape the desktop client
//! parses.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use serde::Deserialize;
use serde_json::json;

use super::AppState;

const TOKEN_TTL_SECONDS: i64 = 3600;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

/// Handle `POST /api/login`.
pub async fn login_handler(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Response {
    if form.username.trim().is_empty() || form.password.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "missing username or password" })),
        )
            .into_response();
    }

    let valid = match state
        .services
        .users
        .verify_password(&form.username, &form.password)
        .await
    {
        Ok(valid) => valid,
        Err(err) => {
            tracing::error!(%err, "credential check failed");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    if !valid {
        return unauthorized("invalid credentials");
    }

    let role = match state.services.users.get_by_username(&form.username).await {
        Ok(Some(user)) => user.role,
        Ok(None) => return unauthorized("invalid credentials"),
        Err(err) => {
            tracing::error!(%err, "user lookup failed");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match state
        .issuer
        .issue(&form.username, role.as_str(), TOKEN_TTL_SECONDS)
    {
        Ok(token) => (StatusCode::OK, Json(json!({ "REGISTER": token }))).into_response(),
        Err(err) => {
            tracing::error!(%err, "token issuance failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn unauthorized(msg: &str) -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "ERROR": msg }))).into_response()
}
