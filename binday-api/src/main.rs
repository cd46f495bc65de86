//! HTTP service exposing Bromley waste-collection schedules.
//!
//! Renders the council's results page in a headless browser, extracts the
//! per-category collection dates, and serves them from a short-lived cache.

mod app;
mod config;
mod prewarm;
mod routes;
#[cfg(test)]
mod testutil;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use binday_core::clock::{Clock, SystemClock};
use binday_core::ports::{PageRenderer, Readiness, ScheduleSource};
use binday_core::service::CollectionService;
use binday_provider_bromley::{BromleySource, READINESS_MARKER};
use binday_renderer_chrome::ChromeRenderer;

use crate::app::AppState;
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(fmt::layer())
        .init();

    let config = Config::from_env().context("invalid configuration")?;

    // Service wiring
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let renderer: Arc<dyn PageRenderer> =
        Arc::new(ChromeRenderer::new(config.browser_path.clone(), config.headless));
    let source: Arc<dyn ScheduleSource> = Arc::new(BromleySource::new(
        Arc::clone(&renderer),
        Arc::clone(&clock),
        config.base_url.clone(),
    ));
    let service = Arc::new(CollectionService::new(source, clock));

    // Background cache warming
    let prewarm_task = prewarm::spawn(
        Arc::clone(&service),
        config.prewarm_ids.clone(),
        config.prewarm_interval,
    );

    // HTTP surface
    let state = AppState {
        service,
        renderer,
        debug_readiness: Readiness::BodyContains(READINESS_MARKER.to_owned()),
    };
    let router = app::build_router(state);

    let listener = TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;
    info!("listening on {}", listener.local_addr().context("no local address")?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    prewarm_task.abort();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
    }
}
