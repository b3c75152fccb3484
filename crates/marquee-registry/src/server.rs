//! HTTP server wiring and process lifecycle.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header::CONTENT_TYPE, HeaderName, HeaderValue, Method},
    routing::get,
    Router,
};
use marquee_common::{ConfigError, MarqueeError, PING_PATH};
use marquee_config::MarqueeConfig;
use tokio::net::TcpListener;
use tokio::signal::ctrl_c;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{debug, info, warn};

use crate::clock::SystemClock;
use crate::routes::ping_handler;
use crate::service::RegistryService;
use crate::store::open_store;

/// Shared by every request handler.
pub struct AppState {
    pub service: RegistryService,
    pub client_ip_header: HeaderName,
}

impl AppState {
    pub fn new(service: RegistryService, client_ip_header: &str) -> Result<Self, ConfigError> {
        let client_ip_header = HeaderName::from_bytes(client_ip_header.as_bytes()).map_err(|e| {
            ConfigError::ValidationError(format!(
                "server.client_ip_header = {client_ip_header:?}: {e}"
            ))
        })?;
        Ok(Self {
            service,
            client_ip_header,
        })
    }
}

/// Build the CORS policy. An empty origin list allows any origin.
pub fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer, ConfigError> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    if allowed_origins.is_empty() {
        return Ok(cors.allow_origin(Any));
    }

    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|e| {
                ConfigError::ValidationError(format!("invalid CORS origin {origin:?}: {e}"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(cors.allow_origin(AllowOrigin::list(origins)))
}

pub fn build_router(state: Arc<AppState>, cors: CorsLayer) -> Router {
    Router::new()
        .route(PING_PATH, get(ping_handler))
        .layer(cors)
        .with_state(state)
}

/// Periodically sweep expired entries until `cancel` fires.
pub fn spawn_sweeper(
    service: RegistryService,
    every: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately; requests sweep on their own.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => match service.sweep().await {
                    Ok(removed) => debug!(removed, "Sweeper tick"),
                    Err(e) => warn!(error = %e, "Background sweep failed"),
                },
            }
        }
    })
}

/// Serve `router` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Run the registry with `config` until Ctrl+C or SIGTERM.
pub async fn run(config: MarqueeConfig) -> Result<(), MarqueeError> {
    info!("Opening presence store...");
    let store = open_store(&config.store).await?;

    let service = RegistryService::new(
        Arc::clone(&store),
        Arc::new(SystemClock),
        config.registry.activity_window_secs,
        config.store.consistency,
    )?;
    info!(
        window_secs = config.registry.activity_window_secs,
        consistency = ?config.store.consistency,
        "Registry ready"
    );

    let cancel = CancellationToken::new();
    let sweeper = (config.registry.sweep_interval_secs > 0).then(|| {
        spawn_sweeper(
            service.clone(),
            Duration::from_secs(config.registry.sweep_interval_secs),
            cancel.clone(),
        )
    });

    let state = Arc::new(AppState::new(service, &config.server.client_ip_header)?);
    let router = build_router(state, cors_layer(&config.server.cors_allowed_origins)?);

    let address = config.server.bind_address();
    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    let result = serve(listener, router, shutdown_signal()).await;

    cancel.cancel();
    if let Some(handle) = sweeper {
        let _ = handle.await;
    }
    store.close().await;
    info!("Server shut down");

    result.map_err(MarqueeError::from)
}

/// Resolve on Ctrl+C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!(error = %e, "Failed to install signal handler");
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
}
