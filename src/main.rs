use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::timeout::TimeoutLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recruit_chat::adapters::auth::JwtSessionValidator;
use recruit_chat::adapters::http::{app_router, AuthState, ChatAppState};
use recruit_chat::adapters::postgres::{
    PostgresConnectionRegistry, PostgresHireDirectory, PostgresIdentityProvider,
    PostgresMatchQueue, PostgresMessageRepository, PostgresRoomRepository,
};
use recruit_chat::adapters::websocket::{ConnectionHub, WebSocketState};
use recruit_chat::application::{ChatPorts, ChatServices};
use recruit_chat::config::{AppConfig, LogFormat, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.server);
    config.validate().context("invalid configuration")?;

    info!(
        environment = ?config.server.environment,
        "=== Recruit Chat Starting ==="
    );

    let pool = config
        .database
        .connect()
        .await
        .context("failed to connect to database")?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run migrations")?;
        info!("Migrations applied");
    }

    let hub = Arc::new(ConnectionHub::new(config.chat.outbound_buffer));
    let ports = ChatPorts {
        rooms: Arc::new(PostgresRoomRepository::new(pool.clone())),
        messages: Arc::new(PostgresMessageRepository::new(pool.clone())),
        queue: Arc::new(PostgresMatchQueue::new(pool.clone())),
        registry: Arc::new(PostgresConnectionRegistry::new(pool.clone())),
        identities: Arc::new(PostgresIdentityProvider::new(pool.clone())),
        hires: Arc::new(PostgresHireDirectory::new(pool)),
        pusher: hub.clone(),
    };
    let services = ChatServices::new(ports, config.chat.policy());

    let validator: AuthState = Arc::new(JwtSessionValidator::new(
        &config.auth.jwt_secret,
        config.auth.jwt_issuer.as_deref(),
        config.auth.leeway_secs,
    ));

    let app = app_router(
        ChatAppState::new(services.clone()),
        WebSocketState::new(services, hub, validator.clone()),
        validator,
    )
    .layer(TimeoutLayer::new(config.server.request_timeout()))
    .layer(config.server.cors_layer());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Recruit Chat listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = server.env_filter();

    match server.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    info!("Shutdown signal received");
}
