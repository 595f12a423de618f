use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Json, Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::CorsLayer;
use url::Url;

use crate::categories::CategoryHandle;
use crate::jobs::{
    self,
    types::{JobProvider, JobRecord},
    JobsFilter,
};
use crate::render::{self, RenderOptions, StyleVariant};

#[derive(Clone)]
pub struct AppState {
    pub categories: CategoryHandle,
    pub providers: Arc<Vec<Box<dyn JobProvider>>>,
    pub filters: Arc<Vec<Box<JobsFilter>>>,
    pub base_url: Url,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(categories: CategoryHandle, base_url: Url) -> Self {
        Self {
            categories,
            providers: Arc::new(Vec::new()),
            filters: Arc::new(Vec::new()),
            base_url,
            metrics: None,
        }
    }

    pub fn with_providers(mut self, providers: Vec<Box<dyn JobProvider>>) -> Self {
        self.providers = Arc::new(providers);
        self
    }

    pub fn with_filters(mut self, filters: Vec<Box<JobsFilter>>) -> Self {
        self.filters = Arc::new(filters);
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/careers/widget", get(widget_board))
        .route("/jobs", get(jobs_json))
        .route("/admin/reload-categories", get(reload_categories))
        .route("/metrics", get(metrics_text))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Jobs are computed once per request; an empty extraction degrades to the
/// placeholder records instead of an error.
async fn current_jobs(state: &AppState) -> Vec<JobRecord> {
    let jobs = jobs::fetch_jobs(
        &state.providers,
        &state.categories,
        &state.base_url,
        &state.filters,
    )
    .await;
    jobs::jobs_or_placeholders(jobs)
}

async fn widget_board(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Html<String> {
    let variant = params
        .get("variant")
        .and_then(|v| StyleVariant::parse(v))
        .unwrap_or(StyleVariant::Fresh);
    let show_filters = params.get("filters").map(|v| v != "0").unwrap_or(true);

    let jobs = current_jobs(&state).await;
    let rules = state.categories.rules();
    Html(render::render_or_error(
        &jobs,
        &rules,
        &RenderOptions {
            variant,
            show_filters,
        },
    ))
}

async fn jobs_json(State(state): State<AppState>) -> Json<Vec<JobRecord>> {
    Json(current_jobs(&state).await)
}

async fn reload_categories(State(state): State<AppState>) -> String {
    match state.categories.reload_from_disk() {
        Ok(()) => "reloaded".to_string(),
        Err(e) => format!("failed: {e}"),
    }
}

async fn metrics_text(State(state): State<AppState>) -> String {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}
