use std::{net::SocketAddr, sync::Arc};

use {
    axum::{
        Router,
        routing::{get, post},
    },
    tokio::net::TcpListener,
    tower_http::{
        cors::{Any, CorsLayer},
        trace::TraceLayer,
    },
    tracing::{info, warn},
};

use crate::{
    auth_middleware::require_auth,
    routes,
    state::{GatewayState, TELEGRAM_WEBHOOK_PATH},
};

/// Shared app state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<GatewayState>,
}

/// Build the gateway router (shared between production startup and tests).
pub fn build_gateway_app(gateway: Arc<GatewayState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app_state = AppState { gateway };

    let protected = Router::new()
        .route(
            "/info",
            get(routes::info_handler).post(routes::info_handler),
        )
        .route("/init", post(routes::init_handler))
        .layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    let router = Router::new()
        .route("/health", get(routes::health_handler))
        .route(TELEGRAM_WEBHOOK_PATH, post(routes::telegram_respond))
        .route("/answer", post(routes::answer))
        .route("/block/{id}", get(routes::block_handler))
        .merge(protected);

    #[cfg(feature = "prometheus")]
    let router = router.route(
        "/metrics",
        get(crate::metrics_routes::prometheus_metrics_handler),
    );

    #[cfg(feature = "metrics")]
    let router = router.layer(axum::middleware::from_fn(
        crate::metrics_middleware::http_metrics_middleware,
    ));

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

/// Bind, optionally run the initialization hook, then serve until Ctrl-C.
pub async fn start_gateway(
    gateway: Arc<GatewayState>,
    bind: &str,
    port: u16,
    register_on_start: bool,
) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(
        addr = %listener.local_addr()?,
        version = %gateway.version,
        capabilities = ?gateway.dispatcher.capabilities().names(),
        "gateway listening"
    );

    if register_on_start {
        if gateway.public_url.is_some() {
            // Registration failure is not fatal.
            if let Err(e) = gateway.instance_init().await {
                warn!(error = %e, "initialization hook failed");
            }
        } else {
            info!("no public url configured, skipping webhook registration");
        }
    }

    let app = build_gateway_app(gateway);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
