//! Classroom hub server binary.

use std::sync::Arc;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use classroom_hub::adapters::http::app_router;
use classroom_hub::adapters::websocket::{
    ConnectionLifecycle, ConnectionSettings, Hub, LivenessConfig, WebSocketState,
};
use classroom_hub::adapters::{
    HubNotifier, InMemoryChatStore, InMemoryCourseDirectory, InMemoryNotificationStore,
    JwtAuthenticator,
};
use classroom_hub::config::{AppConfig, ServerConfig, ValidationError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config.server)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.server.environment,
        "Starting classroom hub"
    );

    let directory = Arc::new(match &config.directory.seed_file {
        Some(path) => {
            let directory = InMemoryCourseDirectory::load_seed_file(path)?;
            tracing::info!(
                seed_file = %path.display(),
                courses = directory.course_count().await,
                "Course directory seeded"
            );
            directory
        }
        None => InMemoryCourseDirectory::new(),
    });

    let (hub, hub_task) = Hub::spawn(config.hub.notify_capacity, config.hub.chat_capacity);

    let notifier = Arc::new(HubNotifier::new(
        hub.clone(),
        directory.clone(),
        Arc::new(InMemoryNotificationStore::new()),
    ));
    let chat = Arc::new(InMemoryChatStore::new(directory.clone()));

    let settings = ConnectionSettings {
        max_pending: config.hub.max_pending,
        write_timeout: config.hub.write_timeout(),
        liveness: LivenessConfig {
            ping_interval: config.hub.ping_interval(),
            pong_wait: config.hub.pong_wait(),
        },
    };
    let lifecycle = ConnectionLifecycle::new(hub.clone(), chat, notifier, settings);
    let authenticator = Arc::new(JwtAuthenticator::new(
        &config.auth.jwt_secret,
        config.auth.leeway_secs,
    ));

    let state = WebSocketState::new(authenticator, directory, lifecycle);
    let app = app_router(state, &config.server.cors_origins_list());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    hub.shutdown();
    hub_task.await?;
    tracing::info!("Classroom hub stopped");

    Ok(())
}

fn init_tracing(server: &ServerConfig) -> Result<(), ValidationError> {
    let registry = tracing_subscriber::registry().with(server.log_filter()?);

    if server.json_logs() {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
