//! Schedule source for the London Borough of Bromley recycling services site.
//!
//! The site renders each property's collections client-side, so the source
//! drives a [`PageRenderer`] at the per-property URL, waits for the schedule
//! marker text, and scrapes the resulting markup.

mod dates;
mod extract;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use binday_core::{
    clock::Clock,
    model::{PropertyId, Schedule},
    ports::{PageRenderer, Readiness, RenderError, ScheduleError, ScheduleSource},
};

/// Marker text present once the results page has rendered its schedule.
pub const READINESS_MARKER: &str = "Your collections";

/// Default base URL of the per-property results page.
pub const DEFAULT_BASE_URL: &str = "https://recyclingservices.bromley.gov.uk/waste";

/// Total render attempts before a fetch is declared failed.
const MAX_FETCH_ATTEMPTS: u32 = 3;

/// Schedule source scraping the Bromley waste services results page.
pub struct BromleySource {
    renderer: Arc<dyn PageRenderer>,
    clock: Arc<dyn Clock>,
    base_url: String,
    readiness: Readiness,
}

impl BromleySource {
    /// Create a source rendering pages through the given renderer.
    ///
    /// `base_url` is the results page without a trailing slash, normally
    /// [`DEFAULT_BASE_URL`]; the property id is appended as a path segment.
    #[must_use]
    pub fn new(
        renderer: Arc<dyn PageRenderer>,
        clock: Arc<dyn Clock>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            renderer,
            clock,
            base_url: base_url.into(),
            readiness: Readiness::BodyContains(READINESS_MARKER.to_owned()),
        }
    }

    /// Render the page, retrying from scratch on every failure.
    ///
    /// There is no delay between attempts; each one gets a fresh browser
    /// session from the renderer.
    async fn fetch_markup(&self, url: &str) -> Result<String, ScheduleError> {
        let mut last_error = None;
        for attempt in 1..=MAX_FETCH_ATTEMPTS {
            debug!("fetching {url} (attempt {attempt} of {MAX_FETCH_ATTEMPTS})");
            match self.renderer.render(url, &self.readiness).await {
                Ok(markup) => return Ok(markup),
                Err(err) => {
                    warn!("error while fetching {url}: {err}");
                    last_error = Some(err);
                }
            }
        }
        Err(ScheduleError::Fetch {
            attempts: MAX_FETCH_ATTEMPTS,
            last: last_error
                .unwrap_or_else(|| RenderError::Internal("no attempts were made".to_owned())),
        })
    }
}

#[async_trait]
impl ScheduleSource for BromleySource {
    async fn schedule(&self, property: PropertyId) -> Result<Schedule, ScheduleError> {
        let url = format!("{}/{property}", self.base_url);
        let markup = self.fetch_markup(&url).await?;

        let today = self.clock.now().date_naive();
        match extract::schedule_from_markup(&markup, today) {
            Some(schedule) => {
                info!("parsed {} categories for {property}", schedule.len());
                Ok(schedule)
            }
            None => {
                warn!("could not parse bin details for {property}");
                Err(ScheduleError::Parse)
            }
        }
    }
}
