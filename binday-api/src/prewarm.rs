//! Background task keeping the cache warm for known properties.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{info, warn};

use binday_core::model::PropertyId;
use binday_core::service::CollectionService;

/// Spawn the prewarm loop.
///
/// The first run happens immediately, then once per `period`. Each run walks
/// the configured ids through the cached lookup, so a fetch only hits the
/// council site once an entry has expired. Failures are logged and the loop
/// carries on with the remaining ids.
///
/// The returned handle is aborted on shutdown.
pub(crate) fn spawn(
    service: Arc<CollectionService>,
    ids: Vec<PropertyId>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if ids.is_empty() {
            info!("no prewarm ids configured, skipping the prewarm loop");
            return;
        }
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            info!("prewarming the cache for {} properties", ids.len());
            for id in &ids {
                if let Err(err) = service.schedule_for(*id).await {
                    warn!("prewarm fetch for {id} failed: {err}");
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use binday_core::model::PropertyId;

    use crate::testutil::stub_service_with_clock;

    #[tokio::test]
    async fn warms_every_configured_property_at_startup() {
        let (service, source, _clock) = stub_service_with_clock();
        let ids = vec![PropertyId(1), PropertyId(2)];

        let task = super::spawn(Arc::clone(&service), ids, Duration::from_secs(60));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(source.call_count(), 2, "first run fires without waiting a period");
        assert_eq!(service.cache_len().await, 2);
        task.abort();
    }

    #[tokio::test]
    async fn refetches_expired_entries_on_a_later_tick() {
        let (service, source, clock) = stub_service_with_clock();
        let ids = vec![PropertyId(1), PropertyId(2)];

        let task = super::spawn(Arc::clone(&service), ids, Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(source.call_count(), 2);

        // Later ticks find the entries still fresh and leave the source alone.
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(source.call_count(), 2, "fresh entries are served from cache");

        // Once the entries expire, exactly one run refetches them.
        clock.advance_minutes(61);
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(source.call_count(), 4, "expired entries are fetched again");
        task.abort();
    }

    #[tokio::test]
    async fn a_failing_fetch_does_not_stop_the_run() {
        let (service, source, _clock) = stub_service_with_clock();
        source.fail_next_fetches(true);
        let ids = vec![PropertyId(1), PropertyId(2)];

        let task = super::spawn(Arc::clone(&service), ids, Duration::from_secs(60));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(source.call_count(), 2, "the second id is still attempted");
        assert_eq!(service.cache_len().await, 0, "failures are not cached");
        task.abort();
    }

    #[tokio::test]
    async fn no_ids_means_no_loop() {
        let (service, source, _clock) = stub_service_with_clock();

        let task = super::spawn(Arc::clone(&service), Vec::new(), Duration::from_secs(60));
        task.await.expect("task finishes on its own");

        assert_eq!(source.call_count(), 0);
    }
}
