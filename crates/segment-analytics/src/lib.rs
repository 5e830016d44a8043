pub mod aggregation;
pub mod composer;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod pagination;
pub mod query_builder;
pub mod request_id;
pub mod store;
pub mod types;

use std::{sync::Arc, time::Duration};

use axum::{
    Extension, Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::get,
};
use sqlx::PgPool;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppConfig,
    handlers::{get_segment, get_segment_gender_data, health_check, list_segments, update_segment},
    openapi::ApiDoc,
    pagination::DEFAULT_MAX_LIMIT,
    request_id::request_id_middleware,
    store::{PgStore, SegmentRepository, UserAggregation},
};

/// Shared handler state. Both seams usually point at the same store.
#[derive(Clone)]
pub struct AppState {
    pub segments: Arc<dyn SegmentRepository>,
    pub users: Arc<dyn UserAggregation>,
    pub max_page_limit: i64,
}

impl AppState {
    pub fn new<S>(store: S) -> Self
    where
        S: SegmentRepository + UserAggregation + 'static,
    {
        let store = Arc::new(store);
        Self {
            segments: store.clone(),
            users: store,
            max_page_limit: DEFAULT_MAX_LIMIT,
        }
    }

    pub fn with_max_page_limit(mut self, limit: i64) -> Self {
        self.max_page_limit = limit;
        self
    }
}

pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::PUT])
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/segments", get(list_segments))
        .route("/segments/{id}", get(get_segment).put(update_segment))
        .route("/segments/{id}/gender-data", get(get_segment_gender_data))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(Extension(state))
        // Dropping the handler future on timeout also cancels its in-flight query.
        .layer(TimeoutLayer::new(request_timeout))
        .layer(cors)
        .layer(CompressionLayer::new())
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(middleware::from_fn(request_id_middleware))
}

pub async fn run_server(pool: PgPool, config: &AppConfig) -> anyhow::Result<()> {
    let store = PgStore::new(pool).with_scan_cap(config.scan_cap);
    let state = AppState::new(store).with_max_page_limit(config.max_page_limit);
    let app = create_router(state, config.request_timeout);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    tracing::info!(
        port = config.port,
        scan_cap = ?config.scan_cap,
        "Server running on http://0.0.0.0:{}",
        config.port
    );

    axum::serve(listener, app).await?;

    Ok(())
}
