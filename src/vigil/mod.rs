//! Gateway HTTP surface: router construction and server startup.

pub mod config;
pub mod handlers;

pub use config::GatewayConfig;

use crate::{backend::BackendClient, gate, store::TokenStore};
use anyhow::Result;
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

/// Build the gateway router.
///
/// The gate middleware wraps every route; the credential-exchange endpoints
/// live under `/auth/login/*` so they stay inside the gate's exclusion set
/// and remain reachable before authentication. Everything unmatched falls
/// through to the backend proxy.
#[must_use]
pub fn router(
    config: GatewayConfig,
    backend: Arc<BackendClient>,
    store: Arc<dyn TokenStore>,
) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health::health))
        .route(gate::LOGIN_PATH, get(handlers::hosted::login))
        .route("/auth/login/email", post(handlers::login::email_login))
        .route(
            "/auth/login/new-password",
            post(handlers::new_password::respond_new_password),
        )
        .route(
            gate::RESET_PASSWORD_PATH,
            get(handlers::hosted::reset_password),
        )
        .route("/auth/logout", get(handlers::logout::logout))
        .fallback(handlers::proxy::forward)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(middleware::from_fn(gate::middleware::gate))
                .layer(Extension(Arc::new(config)))
                .layer(Extension(backend))
                .layer(Extension(store)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to start the server
pub async fn new(
    port: u16,
    config: GatewayConfig,
    backend: Arc<BackendClient>,
    store: Arc<dyn TokenStore>,
) -> Result<()> {
    let app = router(config, backend, store);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}
