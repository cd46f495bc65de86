//! Traits describing the renderer and schedule source seams, with shared error types.

use std::time::Duration;

use async_trait::async_trait;

use crate::model::{PropertyId, Schedule};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Condition signalling that a page's client-side content has finished rendering.
pub enum Readiness {
    /// The rendered `<body>` text contains the given marker string.
    BodyContains(String),
}

#[derive(thiserror::Error, Debug)]
/// Errors from a single render attempt.
pub enum RenderError {
    /// The browser process could not be configured or started.
    #[error("Failed to launch browser: {0}")]
    Launch(String),
    /// Navigation to the target URL failed.
    #[error("Navigation to {url} failed: {reason}")]
    Navigation {
        /// URL that was requested.
        url: String,
        /// Backend description of the failure.
        reason: String,
    },
    /// Navigation plus readiness wait exceeded the hard deadline.
    #[error("Page was not ready within {limit:?}")]
    Timeout {
        /// Deadline that was exceeded.
        limit: Duration,
    },
    /// The rendered markup could not be captured from the page.
    #[error("Failed to capture rendered markup: {0}")]
    Capture(String),
    /// Any other backend failure.
    #[error("Renderer error: {0}")]
    Internal(String),
}

#[derive(thiserror::Error, Debug)]
/// Errors produced while obtaining or querying a property's schedule.
pub enum ScheduleError {
    /// The request carried no usable property id.
    #[error("No bin id provided")]
    NoId,
    /// Every render attempt failed; carries the last underlying cause.
    #[error("Fetch failed after {attempts} attempts: {last}")]
    Fetch {
        /// How many attempts were made before giving up.
        attempts: u32,
        /// The error from the final attempt.
        last: RenderError,
    },
    /// The rendered page could not be turned into a schedule.
    #[error("Could not parse a collection schedule from the page")]
    Parse,
    /// The page parsed cleanly but listed no collections to query.
    #[error("No collections found for this property")]
    EmptySchedule,
}

#[async_trait]
/// A renderer that loads a URL in an isolated browser session and returns the
/// final markup once the readiness condition holds.
pub trait PageRenderer: Send + Sync {
    /// Render `url` and return the resulting markup.
    ///
    /// One call corresponds to one fully isolated browser session; retrying
    /// is the caller's concern.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] when the session cannot be launched, the
    /// navigation fails, or the page does not become ready in time.
    async fn render(&self, url: &str, readiness: &Readiness) -> Result<String, RenderError>;
}

#[async_trait]
/// A source producing the current collection schedule for a property.
pub trait ScheduleSource: Send + Sync {
    /// Fetch and parse the schedule for the given property.
    ///
    /// # Errors
    ///
    /// Returns a [`ScheduleError`] when fetching gives up or the page cannot
    /// be parsed.
    async fn schedule(&self, property: PropertyId) -> Result<Schedule, ScheduleError>;
}
