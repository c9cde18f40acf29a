pub mod cache;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod demo;
pub mod error;
pub mod meta;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::Router;
use axum::http::Method;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::cache::{Cache, CacheStore};
use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::meta::{MetaLoader, PgMetaSource};
use crate::middleware::token::require_token;
use crate::state::{AppState, SharedState};

pub fn build_app(
    pool: PgPool,
    store: Arc<dyn CacheStore>,
    config: Config,
    shutdown: CancellationToken,
) -> Router {
    let cache = Cache::new(store, config.cache_ttl);
    let loader = MetaLoader::new(
        Arc::new(PgMetaSource::new(pool.clone())),
        tracing::info_span!("meta_loader"),
    );
    let dashboard = Dashboard::new(
        loader.clone(),
        cache.clone(),
        config.dashboard.clone(),
        tracing::info_span!("dashboard"),
    );

    let state: SharedState = Arc::new(AppState {
        pool,
        config,
        cache,
        loader,
        dashboard,
        shutdown,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    Router::new()
        .merge(routes::api_routes().layer(axum::middleware::from_fn(require_token)))
        .route("/public", axum::routing::get(public))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(cors),
        )
        .with_state(state)
}

async fn public() -> &'static str {
    "ok"
}
