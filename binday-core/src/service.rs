//! Cache-backed facade combining the schedule source with the derived views.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::model::{CacheEntry, PropertyId, Schedule};
use crate::ports::{ScheduleError, ScheduleSource};
use crate::query::{self, NextCollections};

/// How long a cached schedule stays fresh.
pub const CACHE_TTL_MINUTES: i64 = 60;

/// Public entry point serving schedules from an in-memory cache, fetching
/// from the source on miss or expiry.
pub struct CollectionService {
    source: Arc<dyn ScheduleSource>,
    clock: Arc<dyn Clock>,
    cache: RwLock<HashMap<PropertyId, CacheEntry>>,
}

impl CollectionService {
    /// Create a service bound to the given source and clock.
    #[must_use]
    pub fn new(source: Arc<dyn ScheduleSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            clock,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve the schedule for a raw request parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::NoId`] when the parameter is not a property
    /// id, otherwise whatever [`Self::schedule_for`] reports.
    pub async fn schedule(&self, raw_id: &str) -> Result<Schedule, ScheduleError> {
        let Some(id) = PropertyId::parse(raw_id) else {
            warn!("no usable bin id in request (got {raw_id:?})");
            return Err(ScheduleError::NoId);
        };
        self.schedule_for(id).await
    }

    /// Resolve the schedule for a property, consulting the cache first.
    ///
    /// A cached entry younger than [`CACHE_TTL_MINUTES`] is returned as-is.
    /// Otherwise the source is asked for a fresh schedule, which replaces the
    /// cached entry on success. Failures are never cached; a stale entry
    /// stays in place so the cache dump still shows the last good data.
    ///
    /// Concurrent misses for the same property may each trigger a fetch; the
    /// last writer wins.
    ///
    /// # Errors
    ///
    /// Returns a [`ScheduleError`] when the source fails to produce a
    /// schedule.
    pub async fn schedule_for(&self, id: PropertyId) -> Result<Schedule, ScheduleError> {
        let now = self.clock.now();
        {
            let cache = self.cache.read().await;
            if let Some(entry) = cache.get(&id)
                && now - entry.captured_at < Duration::minutes(CACHE_TTL_MINUTES)
            {
                debug!("returning cached schedule for {id}");
                return Ok(entry.schedule.clone());
            }
        }

        info!("getting bin details for {id}");
        let schedule = self.source.schedule(id).await?;

        let entry = CacheEntry {
            schedule: schedule.clone(),
            captured_at: self.clock.now(),
        };
        self.cache.write().await.insert(id, entry);
        Ok(schedule)
    }

    /// Summarize the soonest upcoming collection for a raw request parameter.
    ///
    /// # Errors
    ///
    /// Returns a [`ScheduleError`] when the id is invalid, the fetch fails,
    /// or the schedule turns out to be empty.
    pub async fn next_collections(&self, raw_id: &str) -> Result<NextCollections, ScheduleError> {
        let schedule = self.schedule(raw_id).await?;
        query::next_collections(&schedule, self.clock.now())
    }

    /// List the categories due for collection tomorrow.
    ///
    /// # Errors
    ///
    /// Returns a [`ScheduleError`] when the id is invalid or the fetch fails.
    pub async fn bins_for_tomorrow(&self, raw_id: &str) -> Result<Vec<String>, ScheduleError> {
        let schedule = self.schedule(raw_id).await?;
        Ok(query::bins_for_tomorrow(&schedule, self.clock.now()))
    }

    /// Number of properties currently cached.
    pub async fn cache_len(&self) -> usize {
        self.cache.read().await.len()
    }

    /// Snapshot of the whole cache, used by the debug dump endpoint.
    pub async fn cache_snapshot(&self) -> HashMap<PropertyId, CacheEntry> {
        self.cache.read().await.clone()
    }
}
