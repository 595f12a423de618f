//! Careers Slider — Binary Entrypoint
//! Boots the Axum HTTP server: category rules, provider chain, metrics,
//! routes.

use anyhow::Context;
use metrics::gauge;
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use url::Url;

use careers_slider::api::{self, AppState};
use careers_slider::categories::{self, CategoryEngine, CategoryHandle};
use careers_slider::jobs::providers::CareersPageProvider;
use careers_slider::jobs::types::JobProvider;

const DEFAULT_BIND: &str = "0.0.0.0:8000";
const DEFAULT_SITE_BASE: &str = "http://localhost";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("careers_slider=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    // --- Category rules ---
    let handle = CategoryHandle::new(CategoryEngine::load_or_builtin());
    categories::start_hot_reload_thread(handle.clone(), categories::config_path());

    // --- Provider chain ---
    let base: Url = std::env::var("SITE_BASE_URL")
        .unwrap_or_else(|_| DEFAULT_SITE_BASE.to_string())
        .parse()
        .context("parsing SITE_BASE_URL")?;
    let careers_provider = match std::env::var("CAREERS_URL") {
        Ok(raw) => {
            let url: Url = raw.parse().context("parsing CAREERS_URL")?;
            CareersPageProvider::new(url)?
        }
        Err(_) => CareersPageProvider::from_base(&base)?,
    };
    tracing::info!(careers_url = %careers_provider.url(), "careers page fallback configured");
    let providers: Vec<Box<dyn JobProvider>> = vec![Box::new(careers_provider)];

    // --- Metrics ---
    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("prometheus: install recorder");
    gauge!("careers_fetch_timeout_secs").set(30.0);

    let state = AppState::new(handle, base)
        .with_providers(providers)
        .with_metrics(metrics_handle);
    let router = api::router(state);

    let bind = std::env::var("SLIDER_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("binding {bind}"))?;
    tracing::info!(%bind, "careers slider listening");
    axum::serve(listener, router).await.context("serving")?;
    Ok(())
}
