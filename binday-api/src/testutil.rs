//! Shared stubs for handler and prewarm tests.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use binday_core::clock::Clock;
use binday_core::model::{CollectionEntry, PropertyId, Schedule};
use binday_core::ports::{
    PageRenderer, Readiness, RenderError, ScheduleError, ScheduleSource,
};
use binday_core::service::CollectionService;

/// Clock pinned to 2025-05-01 09:00 UTC, advanceable from tests.
pub(crate) struct StubClock {
    now: Mutex<DateTime<Utc>>,
}

impl StubClock {
    pub(crate) fn new() -> Self {
        let start = Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).single().expect("valid date");
        Self {
            now: Mutex::new(start),
        }
    }

    pub(crate) fn advance_minutes(&self, minutes: i64) {
        let mut now = self.now.lock().expect("clock lock");
        *now += Duration::minutes(minutes);
    }
}

impl Clock for StubClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

/// Source serving a one-category schedule, with a call counter and a failure
/// switch.
pub(crate) struct StubSource {
    calls: AtomicU32,
    fail: AtomicBool,
}

impl StubSource {
    pub(crate) fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_next_fetches(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ScheduleSource for StubSource {
    async fn schedule(&self, _property: PropertyId) -> Result<Schedule, ScheduleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            Err(ScheduleError::Fetch {
                attempts: 3,
                last: RenderError::Internal("render crashed".to_owned()),
            })
        } else {
            Ok(sample_schedule())
        }
    }
}

/// Renderer answering every request with a fixed page.
pub(crate) struct StubRenderer {
    pub(crate) markup: String,
}

#[async_trait]
impl PageRenderer for StubRenderer {
    async fn render(&self, _url: &str, _readiness: &Readiness) -> Result<String, RenderError> {
        Ok(self.markup.clone())
    }
}

/// Renderer refusing every request.
pub(crate) struct FailingRenderer;

#[async_trait]
impl PageRenderer for FailingRenderer {
    async fn render(&self, url: &str, _readiness: &Readiness) -> Result<String, RenderError> {
        Err(RenderError::Navigation {
            url: url.to_owned(),
            reason: "connection refused".to_owned(),
        })
    }
}

/// One food-waste category, next collection 2025-05-05.
pub(crate) fn sample_schedule() -> Schedule {
    let mut schedule = Schedule::new();
    schedule.insert(CollectionEntry {
        category: "Food Waste".to_owned(),
        next_collection: "Monday, 5th May".to_owned(),
        next_collection_utc: Utc.with_ymd_and_hms(2025, 5, 5, 0, 0, 0).single().expect("valid date"),
        last_collection: "Monday, 28th April, at 7:00am".to_owned(),
        last_collection_utc: Utc.with_ymd_and_hms(2025, 4, 28, 7, 0, 0).single().expect("valid date"),
    });
    schedule
}

pub(crate) fn stub_service() -> (Arc<CollectionService>, Arc<StubSource>) {
    let (service, source, _clock) = stub_service_with_clock();
    (service, source)
}

pub(crate) fn stub_service_with_clock()
-> (Arc<CollectionService>, Arc<StubSource>, Arc<StubClock>) {
    let source = Arc::new(StubSource {
        calls: AtomicU32::new(0),
        fail: AtomicBool::new(false),
    });
    let clock = Arc::new(StubClock::new());
    let service = Arc::new(CollectionService::new(
        Arc::clone(&source) as Arc<dyn ScheduleSource>,
        Arc::clone(&clock) as Arc<dyn Clock>,
    ));
    (service, source, clock)
}
