//! Periodic polling of realtime inventory and the inventory report.
//!
//! Two independent streams, each fetching immediately and then on every tick.
//! Fetches of one stream may overlap, up to [`MAX_IN_FLIGHT`]; a
//! [`SequencedSlot`] makes sure a slow, older response never replaces a newer one.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Notify;
use tokio::task::{JoinHandle, JoinSet};

use storeadmin_inventory::{InventoryReport, InventorySnapshot};

use crate::api::{ApiClient, ClientError};
use crate::dashboard::DashboardState;

/// Requests one stream may have outstanding. Ticks beyond this are skipped.
pub const MAX_IN_FLIGHT: usize = 2;

/// Sequence number of one request within a stream. Later requests get larger tickets.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn get(&self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
struct SlotState<T> {
    issued: u64,
    applied: u64,
    value: Option<T>,
    error: Option<String>,
    updated_at: Option<DateTime<Utc>>,
}

/// Latest result of one poll stream, guarded by request sequence.
///
/// A response is applied only if its ticket is newer than the last applied
/// one. A failure records its message and keeps the last good value.
#[derive(Debug)]
pub struct SequencedSlot<T> {
    state: Mutex<SlotState<T>>,
}

impl<T> Default for SequencedSlot<T> {
    fn default() -> Self {
        Self {
            state: Mutex::new(SlotState {
                issued: 0,
                applied: 0,
                value: None,
                error: None,
                updated_at: None,
            }),
        }
    }
}

impl<T: Clone> SequencedSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticket for a request about to be sent.
    pub fn issue(&self) -> Ticket {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.issued += 1;
        Ticket(state.issued)
    }

    /// Apply the outcome of the request holding `ticket`. Returns `false` when
    /// the response was stale and discarded.
    pub fn apply(&self, ticket: Ticket, outcome: Result<T, String>) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if ticket.0 <= state.applied {
            tracing::debug!(ticket = ticket.0, applied = state.applied, "discarding stale response");
            return false;
        }

        state.applied = ticket.0;
        match outcome {
            Ok(value) => {
                state.value = Some(value);
                state.error = None;
                state.updated_at = Some(Utc::now());
            }
            Err(message) => state.error = Some(message),
        }
        true
    }

    pub fn value(&self) -> Option<T> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).value.clone()
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).error.clone()
    }

    /// When the current value was applied.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).updated_at
    }

    pub fn last_applied(&self) -> Option<Ticket> {
        let applied = self.state.lock().unwrap_or_else(PoisonError::into_inner).applied;
        (applied > 0).then_some(Ticket(applied))
    }
}

/// Where the poller reads inventory from.
#[async_trait]
pub trait InventorySource: Send + Sync + 'static {
    async fn realtime_inventory(&self) -> Result<InventorySnapshot, ClientError>;
    async fn inventory_report(&self) -> Result<InventoryReport, ClientError>;
}

#[async_trait]
impl InventorySource for ApiClient {
    async fn realtime_inventory(&self) -> Result<InventorySnapshot, ClientError> {
        ApiClient::realtime_inventory(self).await
    }

    async fn inventory_report(&self) -> Result<InventoryReport, ClientError> {
        ApiClient::inventory_report(self).await
    }
}

#[derive(Default)]
struct Signals {
    /// A stream stopped on a rejected session.
    rejected: Notify,
    /// A slot accepted a new outcome.
    changed: Notify,
}

struct StreamHandle {
    shutdown: Arc<Notify>,
    handle: JoinHandle<()>,
}

/// Background polling for the inventory dashboard.
///
/// Polling stops on [`InventoryPoller::shutdown`], or per stream once the
/// backend rejects the session. The rejection is reported through
/// [`InventoryPoller::session_rejected`].
pub struct InventoryPoller {
    state: Arc<DashboardState>,
    streams: Vec<StreamHandle>,
    signals: Arc<Signals>,
}

impl InventoryPoller {
    /// Spawn both streams on the current tokio runtime.
    pub fn start<S: InventorySource>(source: Arc<S>, state: Arc<DashboardState>, interval: Duration) -> Self {
        let signals = Arc::new(Signals::default());

        let inventory_source = source.clone();
        let inventory = spawn_stream(
            "realtime-inventory",
            state.inventory_slot().clone(),
            interval,
            signals.clone(),
            move || {
                let source = inventory_source.clone();
                async move { source.realtime_inventory().await }
            },
        );

        let report = spawn_stream("inventory-report", state.report_slot().clone(), interval, signals.clone(), move || {
            let source = source.clone();
            async move { source.inventory_report().await }
        });

        tracing::info!(interval_ms = interval.as_millis() as u64, "inventory polling started");

        Self {
            state,
            streams: vec![inventory, report],
            signals,
        }
    }

    pub fn state(&self) -> &Arc<DashboardState> {
        &self.state
    }

    /// Resolves once either stream has stopped because the backend rejected
    /// the session. Never resolves while the session is accepted.
    pub async fn session_rejected(&self) {
        self.signals.rejected.notified().await;
    }

    /// Resolves once a response (or failure) has been applied to the
    /// dashboard since the last call. Stale responses do not count.
    pub async fn changed(&self) {
        self.signals.changed.notified().await;
    }

    /// Stop both streams and wait for them to exit. In-flight requests are dropped.
    pub async fn shutdown(self) {
        for stream in &self.streams {
            stream.shutdown.notify_one();
        }
        for stream in self.streams {
            if let Err(e) = stream.handle.await {
                tracing::warn!(error = %e, "poll stream ended abnormally");
            }
        }
        tracing::info!("inventory polling stopped");
    }
}

fn spawn_stream<T, F, Fut>(
    name: &'static str,
    slot: Arc<SequencedSlot<T>>,
    interval: Duration,
    signals: Arc<Signals>,
    fetch: F,
) -> StreamHandle
where
    T: Clone + Send + 'static,
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, ClientError>> + Send + 'static,
{
    let shutdown = Arc::new(Notify::new());
    let stop = shutdown.clone();

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // Dropping the set aborts whatever is still in flight.
        let mut in_flight: JoinSet<(Ticket, Result<T, ClientError>)> = JoinSet::new();

        loop {
            tokio::select! {
                _ = stop.notified() => {
                    tracing::debug!(stream = name, "shutdown requested");
                    break;
                }
                _ = ticker.tick() => {
                    if in_flight.len() >= MAX_IN_FLIGHT {
                        tracing::debug!(stream = name, in_flight = in_flight.len(), "backend slow, skipping tick");
                        continue;
                    }
                    let ticket = slot.issue();
                    tracing::debug!(stream = name, ticket = ticket.get(), "polling");
                    let request = fetch();
                    in_flight.spawn(async move { (ticket, request.await) });
                }
                Some(joined) = in_flight.join_next() => {
                    let (ticket, outcome) = match joined {
                        Ok(done) => done,
                        Err(e) => {
                            tracing::warn!(stream = name, error = %e, "poll request task failed");
                            continue;
                        }
                    };

                    let rejected = matches!(&outcome, Err(err) if err.is_unauthenticated());
                    let outcome = outcome.map_err(|err| {
                        tracing::warn!(stream = name, error = %err, "poll failed");
                        err.error_message()
                    });
                    if !slot.apply(ticket, outcome) {
                        continue;
                    }
                    signals.changed.notify_one();

                    if rejected {
                        tracing::warn!(stream = name, "session rejected, polling stopped");
                        signals.rejected.notify_one();
                        break;
                    }
                }
            }
        }
    });

    StreamHandle { shutdown, handle }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use storeadmin_core::{ProductId, WarehouseId};
    use storeadmin_inventory::{InventoryRecord, Thresholds, WarehouseStock};

    use super::*;

    #[test]
    fn tickets_increase_per_slot() {
        let slot: SequencedSlot<u32> = SequencedSlot::new();
        let a = slot.issue();
        let b = slot.issue();
        assert!(b > a);
        assert_eq!(slot.last_applied(), None);
    }

    #[test]
    fn stale_response_is_discarded() {
        let slot = SequencedSlot::new();
        let older = slot.issue();
        let newer = slot.issue();

        assert!(slot.apply(newer, Ok("fresh")));
        assert!(!slot.apply(older, Ok("stale")));
        assert_eq!(slot.value(), Some("fresh"));
        assert_eq!(slot.last_applied(), Some(newer));
    }

    #[test]
    fn failure_keeps_last_good_value_until_next_success() {
        let slot = SequencedSlot::new();
        slot.apply(slot.issue(), Ok(1));
        slot.apply(slot.issue(), Err("Something went wrong. Please try again.".to_string()));

        assert_eq!(slot.value(), Some(1));
        assert!(slot.error().is_some());

        slot.apply(slot.issue(), Ok(2));
        assert_eq!(slot.value(), Some(2));
        assert_eq!(slot.error(), None);
        assert!(slot.updated_at().is_some());
    }

    fn snapshot(name: &str, quantity: i64) -> InventorySnapshot {
        [(
            ProductId::from("P1"),
            InventoryRecord {
                product_name: name.to_string(),
                category_name: "Tools".to_string(),
                warehouses: vec![WarehouseStock {
                    warehouse_id: WarehouseId::new(1),
                    stock_quantity: quantity,
                }],
            },
        )]
        .into_iter()
        .collect()
    }

    /// First inventory call is slow, later ones answer at once.
    #[derive(Default)]
    struct SlowFirstSource {
        inventory_calls: AtomicUsize,
        report_calls: AtomicUsize,
    }

    #[async_trait]
    impl InventorySource for SlowFirstSource {
        async fn realtime_inventory(&self) -> Result<InventorySnapshot, ClientError> {
            let call = self.inventory_calls.fetch_add(1, Ordering::SeqCst);
            if call == 0 {
                tokio::time::sleep(Duration::from_millis(250)).await;
                Ok(snapshot("first", 1))
            } else {
                Ok(snapshot("later", 50))
            }
        }

        async fn inventory_report(&self) -> Result<InventoryReport, ClientError> {
            self.report_calls.fetch_add(1, Ordering::SeqCst);
            Err(ClientError::Network("connection reset".to_string()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_first_response_does_not_overwrite_newer_one() {
        let source = Arc::new(SlowFirstSource::default());
        let state = Arc::new(DashboardState::new(Thresholds::default()));
        let poller = InventoryPoller::start(source.clone(), state.clone(), Duration::from_millis(100));

        tokio::time::sleep(Duration::from_millis(400)).await;

        let latest = state.snapshot().expect("inventory polled");
        let name = &latest.get(&ProductId::from("P1")).unwrap().product_name;
        assert_eq!(name, "later");
        assert!(source.inventory_calls.load(Ordering::SeqCst) >= 3);

        poller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn streams_fail_independently() {
        let source = Arc::new(SlowFirstSource::default());
        let state = Arc::new(DashboardState::new(Thresholds::default()));
        let poller = InventoryPoller::start(source.clone(), state.clone(), Duration::from_millis(100));

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert!(state.report().is_none());
        assert_eq!(state.report_error().as_deref(), Some("Something went wrong. Please try again."));
        assert_eq!(state.inventory_error(), None);
        assert!(source.report_calls.load(Ordering::SeqCst) >= 2);

        poller.shutdown().await;
    }

    struct RejectedSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl InventorySource for RejectedSource {
        async fn realtime_inventory(&self) -> Result<InventorySnapshot, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ClientError::Unauthenticated)
        }

        async fn inventory_report(&self) -> Result<InventoryReport, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ClientError::Unauthenticated)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_session_stops_polling() {
        let source = Arc::new(RejectedSource {
            calls: AtomicUsize::new(0),
        });
        let state = Arc::new(DashboardState::new(Thresholds::default()));
        let poller = InventoryPoller::start(source.clone(), state.clone(), Duration::from_millis(100));

        tokio::time::sleep(Duration::from_millis(1_000)).await;

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(state.inventory_error().as_deref(), Some("Please log in to continue."));

        tokio::time::timeout(Duration::from_millis(10), poller.session_rejected())
            .await
            .expect("rejection reported to the caller");

        poller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn first_applied_response_signals_a_change() {
        let source = Arc::new(SlowFirstSource::default());
        let state = Arc::new(DashboardState::new(Thresholds::default()));
        let poller = InventoryPoller::start(source, state.clone(), Duration::from_secs(10));

        tokio::time::timeout(Duration::from_secs(1), poller.changed())
            .await
            .expect("change signalled before the next tick");
        assert!(state.report_error().is_some() || state.snapshot().is_some());

        poller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn accepted_session_is_never_reported_rejected() {
        let source = Arc::new(SlowFirstSource::default());
        let state = Arc::new(DashboardState::new(Thresholds::default()));
        let poller = InventoryPoller::start(source, state, Duration::from_millis(100));

        let waited = tokio::time::timeout(Duration::from_secs(5), poller.session_rejected()).await;
        assert!(waited.is_err());

        poller.shutdown().await;
    }

    /// Accepts every request and never answers.
    #[derive(Default)]
    struct UnresponsiveSource {
        inventory_calls: AtomicUsize,
        report_calls: AtomicUsize,
    }

    #[async_trait]
    impl InventorySource for UnresponsiveSource {
        async fn realtime_inventory(&self) -> Result<InventorySnapshot, ClientError> {
            self.inventory_calls.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }

        async fn inventory_report(&self) -> Result<InventoryReport, ClientError> {
            self.report_calls.fetch_add(1, Ordering::SeqCst);
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn unanswered_requests_do_not_pile_up() {
        let source = Arc::new(UnresponsiveSource::default());
        let state = Arc::new(DashboardState::new(Thresholds::default()));
        let poller = InventoryPoller::start(source.clone(), state.clone(), Duration::from_secs(10));

        tokio::time::sleep(Duration::from_secs(600)).await;

        assert_eq!(source.inventory_calls.load(Ordering::SeqCst), MAX_IN_FLIGHT);
        assert_eq!(source.report_calls.load(Ordering::SeqCst), MAX_IN_FLIGHT);
        assert!(state.snapshot().is_none());

        poller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_further_fetches() {
        let source = Arc::new(SlowFirstSource::default());
        let state = Arc::new(DashboardState::new(Thresholds::default()));
        let poller = InventoryPoller::start(source.clone(), state, Duration::from_millis(100));

        tokio::time::sleep(Duration::from_millis(50)).await;
        poller.shutdown().await;
        let calls = source.report_calls.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(source.report_calls.load(Ordering::SeqCst), calls);
    }
}
