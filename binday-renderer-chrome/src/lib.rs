//! Page renderer backed by a headless Chrome or Chromium instance.
//!
//! Every render call launches a fresh browser, navigates, polls the page
//! until the readiness condition holds, captures the markup, and tears the
//! browser down again. Sessions share no state with each other.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, trace};

use binday_core::ports::{PageRenderer, Readiness, RenderError};

/// Hard deadline for navigation plus readiness polling.
const RENDER_DEADLINE: Duration = Duration::from_secs(120);

/// Initial delay between readiness probes.
const INITIAL_POLL: Duration = Duration::from_millis(100);

/// Upper bound for the probe delay as it backs off.
const MAX_POLL: Duration = Duration::from_secs(1);

/// Renderer driving a locally installed Chrome or Chromium binary.
pub struct ChromeRenderer {
    executable: Option<PathBuf>,
    headless: bool,
}

impl ChromeRenderer {
    /// Create a renderer.
    ///
    /// With `executable` unset, chromiumoxide falls back to its own browser
    /// detection. `headless` is only ever disabled for local debugging.
    #[must_use]
    pub fn new(executable: Option<PathBuf>, headless: bool) -> Self {
        Self {
            executable,
            headless,
        }
    }
}

#[async_trait]
impl PageRenderer for ChromeRenderer {
    async fn render(&self, url: &str, readiness: &Readiness) -> Result<String, RenderError> {
        let mut session = Session::launch(self.executable.clone(), self.headless).await?;
        let result = match timeout(RENDER_DEADLINE, session.load(url, readiness)).await {
            Ok(outcome) => outcome,
            Err(_elapsed) => Err(RenderError::Timeout {
                limit: RENDER_DEADLINE,
            }),
        };
        session.shutdown().await;
        result
    }
}

/// One launched browser plus the task draining its event stream.
struct Session {
    browser: Browser,
    events: JoinHandle<()>,
}

impl Session {
    async fn launch(executable: Option<PathBuf>, headless: bool) -> Result<Self, RenderError> {
        let mut builder = BrowserConfigBuilder::default()
            .arg("--no-sandbox")
            .arg("--disable-setuid-sandbox")
            .arg("--disable-dev-shm-usage");
        if let Some(path) = executable {
            builder = builder.chrome_executable(path);
        }
        builder = if headless {
            builder.headless_mode(HeadlessMode::default())
        } else {
            builder.with_head()
        };
        let config = builder.build().map_err(RenderError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|err| RenderError::Launch(err.to_string()))?;
        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    trace!("browser event error: {err}");
                }
            }
        });

        Ok(Self { browser, events })
    }

    async fn load(&self, url: &str, readiness: &Readiness) -> Result<String, RenderError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|err| RenderError::Internal(err.to_string()))?;

        page.goto(url)
            .await
            .map_err(|err| RenderError::Navigation {
                url: url.to_owned(),
                reason: err.to_string(),
            })?;
        page.wait_for_navigation()
            .await
            .map_err(|err| RenderError::Navigation {
                url: url.to_owned(),
                reason: err.to_string(),
            })?;

        wait_until_ready(&page, readiness).await;

        let markup = page
            .content()
            .await
            .map_err(|err| RenderError::Capture(err.to_string()))?;
        if let Err(err) = page.close().await {
            debug!("failed to close page: {err}");
        }
        Ok(markup)
    }

    async fn shutdown(&mut self) {
        if let Err(err) = self.browser.close().await {
            debug!("browser close failed: {err}");
        }
        if let Err(err) = self.browser.wait().await {
            debug!("browser did not exit cleanly: {err}");
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // the drain task never ends on its own
        self.events.abort();
    }
}

/// Poll the page until the readiness condition holds.
///
/// Probes back off from [`INITIAL_POLL`] to [`MAX_POLL`]. Polling runs until
/// it succeeds; the caller bounds it with the render deadline.
async fn wait_until_ready(page: &Page, readiness: &Readiness) {
    let expression = readiness_expression(readiness);
    let mut delay = INITIAL_POLL;
    loop {
        if body_ready(page, &expression).await {
            return;
        }
        sleep(delay).await;
        delay = (delay * 2).min(MAX_POLL);
    }
}

async fn body_ready(page: &Page, expression: &str) -> bool {
    match page.evaluate(expression).await {
        Ok(result) => matches!(result.into_value(), Ok(serde_json::Value::Bool(true))),
        Err(err) => {
            trace!("readiness probe failed: {err}");
            false
        }
    }
}

fn readiness_expression(readiness: &Readiness) -> String {
    let Readiness::BodyContains(marker) = readiness;
    let quoted = serde_json::json!(marker);
    format!("document.querySelector('body').innerText.includes({quoted})")
}

#[cfg(test)]
mod tests {
    use binday_core::ports::Readiness;

    use super::readiness_expression;

    #[test]
    fn readiness_probe_quotes_the_marker() {
        let readiness = Readiness::BodyContains("Your collections".to_owned());
        assert_eq!(
            readiness_expression(&readiness),
            "document.querySelector('body').innerText.includes(\"Your collections\")"
        );
    }

    #[test]
    fn readiness_probe_escapes_quotes_in_the_marker() {
        let readiness = Readiness::BodyContains("say \"ready\"".to_owned());
        let expression = readiness_expression(&readiness);
        assert!(expression.contains("\\\"ready\\\""), "quotes must be escaped: {expression}");
    }
}
