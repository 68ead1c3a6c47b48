use std::{any::Any, net::SocketAddr, path::Path, sync::Arc};

use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;

mod config;
mod handler;
mod openapi;
mod security;
mod service;
mod state;

use security::rate_limit::{self, RateLimiter};
use state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let state = AppState::new();
    let port = state.config().port();
    let app = app(state);

    let bind_addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|_| panic!("failed to bind to {}", bind_addr));
    info!("server running on http://{bind_addr}");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("server error");
}

fn app(state: Arc<AppState>) -> Router {
    let config = state.config().values().clone();

    let limiter = Arc::new(RateLimiter::new(
        rate_limit::CONTACT_LIMIT,
        rate_limit::CONTACT_WINDOW,
    ));
    let contact = handler::contact::routes(state.clone()).layer(middleware::from_fn_with_state(
        limiter,
        rate_limit::rate_limit_middleware,
    ));

    let cors = match config
        .cors_origin
        .as_deref()
        .and_then(|origin| origin.parse::<HeaderValue>().ok())
    {
        Some(origin) => CorsLayer::new()
            .allow_origin(AllowOrigin::exact(origin))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE]),
        None => CorsLayer::permissive(),
    };

    // No wildcard route: anything the static directory cannot resolve falls
    // back to the root document so client-side navigation keeps working.
    let static_dir = Path::new(&config.static_dir);
    let spa = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .merge(handler::health::routes())
        .merge(contact)
        .route(
            "/api/openapi.json",
            get(|| async { Json(openapi::ApiDoc::openapi()) }),
        )
        .fallback_service(spa)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(security::headers::content_security_policy())
        .layer(security::headers::nosniff())
        .layer(security::headers::frame_options())
        .layer(security::headers::referrer_policy())
        .layer(CatchPanicLayer::custom(handle_panic))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = err.downcast_ref::<String>() {
        message.as_str()
    } else if let Some(message) = err.downcast_ref::<&str>() {
        message
    } else {
        "unknown panic"
    };
    tracing::error!("handler panicked: {detail}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "ok": false, "error": "Internal server error." })),
    )
        .into_response()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}
