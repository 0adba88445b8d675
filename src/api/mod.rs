pub mod dashboard;
pub mod dto;
pub mod errors;
pub mod handlers;

use std::{num::NonZeroU32, sync::Arc};

use axum::{
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;

use crate::{db::ReadingStore, ingest::IngestionPipeline, query::QueryService};
use handlers::ApiDoc;

/// Shared by every handler; cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: IngestionPipeline,
    pub query: QueryService,
    /// Rows shown on the dashboard page.
    pub dashboard_limit: NonZeroU32,
}

impl AppState {
    pub fn new(store: Arc<dyn ReadingStore>, dashboard_limit: NonZeroU32) -> Self {
        Self {
            pipeline: IngestionPipeline::new(store.clone()),
            query: QueryService::new(store),
            dashboard_limit,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .route(
            "/api/readings",
            post(handlers::ingest_reading).get(handlers::get_recent_readings),
        )
        // Path the deployed firmware posts to.
        .route("/alert", post(handlers::ingest_reading))
        .route("/", get(dashboard::dashboard))
        .with_state(state)
        .split_for_parts();

    router
        .route("/health", get(handlers::health))
        .route(
            "/api-docs/openapi.json",
            get(move || async move { axum::Json(api) }),
        )
}
