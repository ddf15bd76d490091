//! Application setup and server configuration.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use product_extraction::{
    ExtractorConfig, FirecrawlIngestor, HttpIngestor, Orchestrator, ValidatedIngestor,
};
use secrecy::ExposeSecret;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::activity::{ActivitySink, TracingActivitySink};
use crate::auth::{IdentityResolver, JwtService, MemoryExtensionTokenStore};
use crate::config::Config;
use crate::server::middleware::identity_middleware;
use crate::server::routes::{health_handler, import_url_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub activity_sink: Arc<dyn ActivitySink>,
    pub render_configured: bool,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, render_configured: bool) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            activity_sink: Arc::new(TracingActivitySink),
            render_configured,
        }
    }

    pub fn with_activity_sink(mut self, sink: Arc<dyn ActivitySink>) -> Self {
        self.activity_sink = sink;
        self
    }
}

/// Build the extraction orchestrator from configuration
///
/// Both page sources go through SSRF validation. Without a render-service
/// key the render strategy is skipped on every request.
pub fn build_orchestrator(config: &Config) -> Result<Orchestrator> {
    let render = FirecrawlIngestor::new(config.render_credentials.clone())
        .and_then(|ingestor| ingestor.with_wait_for(config.render_wait_ms))
        .context("Failed to create render-service ingestor")?;
    let direct = HttpIngestor::with_timeout(Duration::from_secs(config.fetch_timeout_secs))
        .context("Failed to create HTTP ingestor")?;

    let extractor_config =
        ExtractorConfig::default().with_strategy_timeout(config.strategy_timeout_secs);

    Ok(Orchestrator::from_ingestors(
        Arc::new(ValidatedIngestor::new(render)),
        Arc::new(ValidatedIngestor::new(direct)),
        extractor_config,
    ))
}

/// Build the identity resolver: extension tokens from `EXTENSION_TOKENS`,
/// then session JWTs
pub fn build_identity_resolver(config: &Config) -> IdentityResolver {
    let jwt_service = Arc::new(JwtService::new(
        config.jwt_secret.expose_secret(),
        config.jwt_issuer.clone(),
    ));
    let extension_tokens = MemoryExtensionTokenStore::seeded(config.extension_tokens.clone());
    tracing::info!(count = config.extension_tokens.len(), "Extension tokens loaded");

    IdentityResolver::new(Arc::new(extension_tokens), jwt_service)
}

/// CORS: any origin when none are configured (development), otherwise the list
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    if allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
}

/// Build the Axum application router
pub fn build_app(
    state: AppState,
    identity_resolver: Arc<IdentityResolver>,
    allowed_origins: &[String],
) -> Router {
    Router::new()
        .route("/api/import-url", post(import_url_handler))
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            identity_middleware(identity_resolver.clone(), req, next)
        }))
        .layer(Extension(state))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}
