use chrono::Utc;
use futures::future::join_all;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

use super::types::{LoadState, PollSnapshot, PollerConfig, ResourceStatus, TickOutcome};
use crate::errors::PanelError;
use crate::fetch::{FetchOutcome, Fetcher};

struct PollerInner {
    name: String,
    fetcher: Fetcher,
    config: RwLock<PollerConfig>,
    state: RwLock<PollSnapshot>,
    /// 0 when idle, otherwise the owning tick's generation + 1
    in_flight: AtomicU64,
    /// Bumped on deactivation; ticks started under an older value never commit
    generation: AtomicU64,
    active_tx: watch::Sender<bool>,
    /// Incremented after every committed tick
    updates_tx: watch::Sender<u64>,
    ticks_completed: AtomicU64,
    ticks_skipped: AtomicU64,
}

/// Releases the in-flight slot when the tick ends, including on
/// cancellation. A slot taken over by a newer generation is left alone.
struct InFlightGuard<'a> {
    slot: &'a AtomicU64,
    token: u64,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let _ = self
            .slot
            .compare_exchange(self.token, 0, Ordering::AcqRel, Ordering::Acquire);
    }
}

impl PollerInner {
    fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Claim the in-flight slot for `generation`. Ticks of the same or a
    /// newer generation block it; a tick left over from before a
    /// deactivation does not.
    fn try_claim(&self, generation: u64) -> Option<InFlightGuard<'_>> {
        let token = generation + 1;
        let mut current = self.in_flight.load(Ordering::Acquire);
        loop {
            if current != 0 && current >= token {
                return None;
            }
            match self.in_flight.compare_exchange(
                current,
                token,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    return Some(InFlightGuard {
                        slot: &self.in_flight,
                        token,
                    })
                }
                Err(actual) => current = actual,
            }
        }
    }

    fn spawn_tick(self: &Arc<Self>, generation: u64) {
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            inner.run_tick(generation).await;
        });
    }

    async fn run_tick(&self, generation: u64) -> TickOutcome {
        if self.generation() != generation {
            return TickOutcome::Discarded;
        }
        let Some(_in_flight) = self.try_claim(generation) else {
            self.ticks_skipped.fetch_add(1, Ordering::Relaxed);
            debug!("Panel {}: previous tick still in flight, skipping", self.name);
            return TickOutcome::Skipped;
        };

        let (resources, query) = {
            let config = self.config.read().await;
            (config.resources.clone(), config.query)
        };

        {
            let mut state = self.state.write().await;
            if self.generation() != generation {
                return TickOutcome::Discarded;
            }
            for kind in &resources {
                if let Some(status) = state.statuses.get_mut(kind) {
                    status.fetching = true;
                }
            }
        }

        let outcomes = join_all(
            resources
                .iter()
                .map(|kind| self.fetcher.fetch(*kind, &query)),
        )
        .await;

        self.commit(generation, outcomes).await
    }

    async fn commit(&self, generation: u64, outcomes: Vec<FetchOutcome>) -> TickOutcome {
        let mut guard = self.state.write().await;
        if self.generation() != generation {
            debug!(
                "Panel {}: discarding {} results from a deactivated tick",
                self.name,
                outcomes.len()
            );
            return TickOutcome::Discarded;
        }

        let now = Utc::now();
        let snapshot = &mut *guard;
        let mut succeeded = 0;
        let mut failed = 0;

        for outcome in outcomes {
            let status = snapshot
                .statuses
                .entry(outcome.kind)
                .or_insert_with(|| ResourceStatus::new(outcome.kind));
            status.fetching = false;
            status.last_attempt = Some(now);
            status.last_duration_ms = Some(outcome.elapsed.as_millis() as u64);

            match outcome.error {
                None => {
                    status.state = LoadState::Ready;
                    status.record_count = outcome.batch.len();
                    status.last_success = Some(now);
                    status.last_error = None;
                    status.consecutive_failures = 0;
                    snapshot.collections.apply(outcome.batch);
                    succeeded += 1;
                }
                Some(error) => {
                    // Previous records stay in place
                    status.state = LoadState::Failed;
                    status.last_error = Some(error);
                    status.consecutive_failures += 1;
                    failed += 1;
                }
            }
        }
        snapshot.updated_at = Some(now);
        drop(guard);

        let completed = self.ticks_completed.fetch_add(1, Ordering::Relaxed) + 1;
        self.updates_tx.send_replace(completed);

        if failed > 0 {
            warn!(
                "Panel {}: tick #{} committed with {} of {} resources failing",
                self.name,
                completed,
                failed,
                succeeded + failed
            );
        } else {
            debug!("Panel {}: tick #{} committed", self.name, completed);
        }

        TickOutcome::Committed { succeeded, failed }
    }
}

/// Owns the repeating timer and the committed snapshot of one panel
pub struct Poller {
    inner: Arc<PollerInner>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl Poller {
    pub fn new(name: impl Into<String>, fetcher: Fetcher, config: PollerConfig) -> Self {
        let (active_tx, _) = watch::channel(false);
        let (updates_tx, _) = watch::channel(0);
        let state = PollSnapshot::for_resources(&config.resources);

        Self {
            inner: Arc::new(PollerInner {
                name: name.into(),
                fetcher,
                config: RwLock::new(config),
                state: RwLock::new(state),
                in_flight: AtomicU64::new(0),
                generation: AtomicU64::new(0),
                active_tx,
                updates_tx,
                ticks_completed: AtomicU64::new(0),
                ticks_skipped: AtomicU64::new(0),
            }),
            timer: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn is_active(&self) -> bool {
        *self.inner.active_tx.borrow()
    }

    /// Observable "is polling active" flag for UI indicators
    pub fn subscribe_active(&self) -> watch::Receiver<bool> {
        self.inner.active_tx.subscribe()
    }

    /// Yields the committed tick count after every commit
    pub fn subscribe_updates(&self) -> watch::Receiver<u64> {
        self.inner.updates_tx.subscribe()
    }

    pub fn ticks_completed(&self) -> u64 {
        self.inner.ticks_completed.load(Ordering::Relaxed)
    }

    pub fn ticks_skipped(&self) -> u64 {
        self.inner.ticks_skipped.load(Ordering::Relaxed)
    }

    /// A tick of the current generation is in flight
    pub fn is_busy(&self) -> bool {
        self.inner.in_flight.load(Ordering::Acquire) == self.inner.generation() + 1
    }

    pub async fn config(&self) -> PollerConfig {
        self.inner.config.read().await.clone()
    }

    pub async fn snapshot(&self) -> PollSnapshot {
        self.inner.state.read().await.clone()
    }

    /// Start polling: one immediate tick, then one per interval while
    /// auto-refresh is enabled. No-op when already active.
    #[instrument(skip(self), fields(panel = %self.inner.name))]
    pub async fn activate(&self) {
        let mut timer = self.timer.lock().await;
        if self.is_active() {
            debug!("Panel already active");
            return;
        }

        self.inner.active_tx.send_replace(true);
        *timer = self.start(true).await;
        info!("Panel {} activated", self.inner.name);
    }

    /// Stop polling. In-flight fetches are left to finish but their results
    /// are dropped.
    #[instrument(skip(self), fields(panel = %self.inner.name))]
    pub async fn deactivate(&self) {
        let mut timer = self.timer.lock().await;
        if let Some(handle) = timer.take() {
            handle.abort();
        }

        {
            // Taken so no commit can interleave with the generation bump
            let _state = self.inner.state.write().await;
            self.inner.generation.fetch_add(1, Ordering::AcqRel);
        }

        let was_active = self.inner.active_tx.send_replace(false);
        if was_active {
            info!("Panel {} deactivated", self.inner.name);
        }
    }

    /// Apply the auto-refresh toggle and/or a new interval. Restarts the
    /// timer when an active panel's effective schedule changed. Returns
    /// whether anything changed.
    #[instrument(skip(self), fields(panel = %self.inner.name))]
    pub async fn reconfigure(
        &self,
        enabled: Option<bool>,
        interval: Option<Duration>,
    ) -> Result<bool, PanelError> {
        let mut timer = self.timer.lock().await;

        let changed = {
            let mut config = self.inner.config.write().await;
            let mut next = config.clone();
            if let Some(enabled) = enabled {
                next.enabled = enabled;
            }
            if let Some(interval) = interval {
                next.interval = interval;
            }
            next.validate()?;

            let changed = next != *config;
            *config = next;
            changed
        };

        if changed && self.is_active() {
            if let Some(handle) = timer.take() {
                handle.abort();
            }
            let config = self.config().await;
            *timer = self.start(config.enabled).await;
            info!(
                "Panel {} rescheduled: enabled={}, interval={}ms",
                self.inner.name,
                config.enabled,
                config.interval_ms()
            );
        }

        Ok(changed)
    }

    /// Run one tick now through the same in-flight guard as scheduled ticks
    #[instrument(skip(self), fields(panel = %self.inner.name))]
    pub async fn refresh_now(&self) -> TickOutcome {
        let generation = self.inner.generation();
        self.inner.run_tick(generation).await
    }

    async fn start(&self, run_initial: bool) -> Option<JoinHandle<()>> {
        let config = self.config().await;
        let generation = self.inner.generation();

        if run_initial {
            self.inner.spawn_tick(generation);
        }
        if !config.enabled {
            return None;
        }

        let inner = Arc::clone(&self.inner);
        let period = config.interval;
        Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if inner.generation() != generation {
                    break;
                }
                inner.spawn_tick(generation);
            }
        }))
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        if let Some(handle) = self.timer.get_mut().take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FetchError;
    use crate::fetch::{FetchQuery, Transport};
    use crate::records::ResourceKind;
    use futures::future::BoxFuture;
    use serde_json::{json, Value};

    struct AgentsOnly;

    impl Transport for AgentsOnly {
        fn get_json<'a>(
            &'a self,
            endpoint: &'a str,
            _query: &'a FetchQuery,
        ) -> BoxFuture<'a, Result<Value, FetchError>> {
            Box::pin(async move {
                if endpoint == "/api/agents" {
                    Ok(json!([{"id": "a1", "name": "scout", "status": "active", "runs24h": 4}]))
                } else {
                    Err(FetchError::Protocol {
                        endpoint: endpoint.to_string(),
                        status: Some(500),
                        reason: "boom".to_string(),
                    })
                }
            })
        }
    }

    fn poller(resources: Vec<ResourceKind>) -> Poller {
        Poller::new(
            "test",
            Fetcher::new(Arc::new(AgentsOnly)),
            PollerConfig::new(resources, Duration::from_millis(1_000)),
        )
    }

    #[tokio::test]
    async fn refresh_commits_each_resource_independently() {
        let poller = poller(vec![ResourceKind::Agents, ResourceKind::Sessions]);
        let outcome = poller.refresh_now().await;
        assert_eq!(outcome, TickOutcome::Committed { succeeded: 1, failed: 1 });

        let snapshot = poller.snapshot().await;
        assert_eq!(snapshot.collections.agents.len(), 1);
        assert_eq!(
            snapshot.status(ResourceKind::Agents).unwrap().state,
            LoadState::Ready
        );
        let sessions = snapshot.status(ResourceKind::Sessions).unwrap();
        assert_eq!(sessions.state, LoadState::Failed);
        assert_eq!(sessions.consecutive_failures, 1);
        assert!(!sessions.fetching);
    }

    #[tokio::test]
    async fn invalid_interval_is_rejected_without_change() {
        let poller = poller(vec![ResourceKind::Agents]);
        let result = poller
            .reconfigure(None, Some(Duration::from_millis(10)))
            .await;
        assert!(matches!(
            result,
            Err(PanelError::InvalidInterval { interval_ms: 10 })
        ));
        assert_eq!(poller.config().await.interval, Duration::from_millis(1_000));
    }

    #[tokio::test]
    async fn activation_flag_is_observable() {
        let poller = poller(vec![ResourceKind::Agents]);
        let rx = poller.subscribe_active();
        assert!(!*rx.borrow());

        poller.activate().await;
        assert!(*rx.borrow());
        assert!(poller.is_active());

        poller.deactivate().await;
        assert!(!*rx.borrow());
    }
}
