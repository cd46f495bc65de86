//! Environment-driven configuration for the API process.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use dotenvy::dotenv;
use tracing::debug;

use binday_core::model::PropertyId;
use binday_provider_bromley::DEFAULT_BASE_URL;

#[derive(Debug, Clone)]
/// Application configuration loaded from environment variables.
pub(crate) struct Config {
    /// TCP port the HTTP server listens on.
    pub port: u16,
    /// Base URL of the council results page, without a trailing slash.
    pub base_url: String,
    /// Property ids kept warm by the background loop.
    pub prewarm_ids: Vec<PropertyId>,
    /// Delay between pre-warm runs.
    pub prewarm_interval: Duration,
    /// Explicit browser binary, when the renderer's own detection is not wanted.
    pub browser_path: Option<PathBuf>,
    /// Headless browser toggle; only ever disabled for local debugging.
    pub headless: bool,
}

impl Config {
    /// Load configuration from the environment, reading `.env` first if present.
    ///
    /// # Errors
    ///
    /// Returns an error when a variable is present but unparseable.
    pub fn from_env() -> Result<Self> {
        if let Err(err) = dotenv() {
            debug!("no .env file loaded: {err}");
        }

        let port = env::var("PORT")
            .unwrap_or_else(|_| "3004".to_owned())
            .parse()
            .context("PORT must be a valid port number")?;
        let base_url = env::var("BINDAY_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_owned());
        let prewarm_ids = parse_id_list(&env::var("BINDAY_PREWARM_IDS").unwrap_or_default())?;
        let interval_secs: u64 = env::var("BINDAY_PREWARM_INTERVAL_SECS")
            .unwrap_or_else(|_| "450".to_owned())
            .parse()
            .context("BINDAY_PREWARM_INTERVAL_SECS must be a number of seconds")?;
        ensure!(interval_secs > 0, "BINDAY_PREWARM_INTERVAL_SECS must be at least 1");

        Ok(Self {
            port,
            base_url,
            prewarm_ids,
            prewarm_interval: Duration::from_secs(interval_secs),
            browser_path: env::var("CHROMIUM_PATH").ok().map(PathBuf::from),
            headless: env::var("BINDAY_HEADLESS").map_or(true, |value| value != "false"),
        })
    }
}

/// Parse a comma-separated list of property ids, ignoring blank entries.
fn parse_id_list(raw: &str) -> Result<Vec<PropertyId>> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            PropertyId::parse(token)
                .with_context(|| format!("invalid property id {token:?} in BINDAY_PREWARM_IDS"))
        })
        .collect()
}
