//! Tagtrail server binary.
//!
//! Boot order: logging → configuration → database (fatal on failure) →
//! services and dispatcher → device broker and bridge → HTTP/WebSocket
//! server. Ctrl-C drains the listeners and exits.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use tagtrail::adapters::auth::{
    HmacAuthenticator, JwksConfig, RemoteJwksVerifier, TokenAuthenticator,
};
use tagtrail::adapters::broker::{spawn_bridge, DeviceBroker};
use tagtrail::adapters::http::{router, AppState};
use tagtrail::adapters::postgres::{
    self, PostgresItemReadRepository, PostgresItemRepository, PostgresOrderItemRepository,
    PostgresOrderRepository, PostgresPersonRepository, PostgresUserRepository,
};
use tagtrail::application::Services;
use tagtrail::config::AppConfig;
use tagtrail::dispatch::MessageDispatcher;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;
    config.validate()?;

    // The one fatal startup condition: no store, no server.
    let pool = match postgres::connect(&config.database.url, config.database.max_connections)
        .await
    {
        Ok(pool) => pool,
        Err(err) => {
            tracing::error!(%err, "database unreachable at startup");
            return Err(err.into());
        }
    };
    tracing::info!("connected to database");

    let services = Arc::new(Services::new(
        Arc::new(PostgresOrderRepository::new(pool.clone())),
        Arc::new(PostgresItemRepository::new(pool.clone())),
        Arc::new(PostgresOrderItemRepository::new(pool.clone())),
        Arc::new(PostgresItemReadRepository::new(pool.clone())),
        Arc::new(PostgresPersonRepository::new(pool.clone())),
        Arc::new(PostgresUserRepository::new(pool)),
    ));
    let dispatcher = MessageDispatcher::start(services.clone());
    tracing::info!("message dispatcher running");

    let issuer = Arc::new(HmacAuthenticator::new(
        config.auth.issuer.clone(),
        config.auth.audience.clone(),
        config.auth.secret.clone(),
    ));
    let mut authenticator = TokenAuthenticator::new().with_hmac((*issuer).clone());
    if let (Some(remote_issuer), Some(remote_audience)) = (
        config.auth.remote_issuer.clone(),
        config.auth.remote_audience.clone(),
    ) {
        let mut jwks = JwksConfig::new(remote_issuer, remote_audience);
        jwks.jwks_url = config.auth.remote_jwks_url.clone();
        authenticator = authenticator.with_jwks(RemoteJwksVerifier::new(jwks)?);
    }

    let broker = DeviceBroker::new();
    let broker_addr = config.broker.socket_addr()?;
    let broker_listener = tokio::net::TcpListener::bind(broker_addr).await?;
    tracing::info!(%broker_addr, "device broker listening");
    tokio::spawn(broker.clone().serve(broker_listener));
    spawn_bridge(broker, dispatcher.clone(), config.broker.scan_topic.clone());

    let state = AppState {
        services,
        dispatcher,
        verifier: Arc::new(authenticator),
        issuer,
    };
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server ready");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("stopped cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for shutdown signal");
        return;
    }
    tracing::info!("shutdown signal received");
}
