//! Refresh loop for the current-measures endpoint.
//!
//! A [`PollController`] owns at most one poll cycle at a time. A cycle
//! fetches immediately, then again on every tick of a fixed-period timer,
//! enriching and publishing each successful batch.
//!
//! Phases:
//!
//! | From | Event | To |
//! |------|-------|----|
//! | any | [`start`](PollController::start) | `Fetching` (previous cycle retired) |
//! | `Idle` | timer tick | `Fetching` |
//! | `Fetching` | success | `Idle` (snapshot installed, consumer called) |
//! | `Fetching` | transient error | `Retrying`, then `Fetching` after the retry delay |
//! | `Fetching` | 401 / 403 | `Stopped` (one notification, no more fetches) |
//! | `Fetching` | timer tick | `Fetching` (in-flight request dropped, new one sent) |
//! | any | [`stop`](PollController::stop) | `Stopped` |
//!
//! Each cycle carries an id. Completions check the id under the state lock,
//! so a response from a retired cycle is never installed.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use airdash_core::client::ApiClient;
//! use airdash_core::notify::{LoggingConsumer, TracingNotifier};
//! use airdash_core::poller::{PollController, PollOptions};
//!
//! # async fn example() -> airdash_core::Result<()> {
//! let client = Arc::new(ApiClient::new("https://api.airgradient.com")?);
//! let controller = PollController::new(
//!     client,
//!     Arc::new(TracingNotifier),
//!     Arc::new(LoggingConsumer),
//!     PollOptions::default(),
//! )?;
//!
//! controller.start("my-token")?;
//! # Ok(())
//! # }
//! ```

use core::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use airdash_types::LocationReading;

use crate::error::{Error, Result};
use crate::notify::{AUTH_FAILED_MESSAGE, NOTICE_DURATION};
use crate::processor::{ProcessedBatch, process_batch};
use crate::traits::{MeasuresSource, Notifier, SnapshotConsumer};

/// Default time between scheduled fetches.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(120);

/// Default wait before retrying a failed fetch.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Options for a [`PollController`].
///
/// ```
/// use std::time::Duration;
/// use airdash_core::poller::PollOptions;
///
/// let options = PollOptions::builder()
///     .refresh_interval(Duration::from_secs(60))
///     .build();
/// assert_eq!(options.retry_delay, Duration::from_secs(1));
/// assert!(options.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOptions {
    /// Period of the refresh timer. Default: 120 seconds.
    pub refresh_interval: Duration,
    /// Wait after a transient failure. Default: 1 second.
    ///
    /// Retries are unbounded; only a new `start`, `stop` or an auth failure
    /// ends them.
    pub retry_delay: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl PollOptions {
    /// Create a new builder for PollOptions.
    pub fn builder() -> PollOptionsBuilder {
        PollOptionsBuilder::default()
    }

    /// Validate the options and return an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.refresh_interval.is_zero() {
            return Err(Error::invalid_config("refresh_interval must be > 0"));
        }
        if self.retry_delay.is_zero() {
            return Err(Error::invalid_config("retry_delay must be > 0"));
        }
        Ok(())
    }
}

/// Builder for PollOptions.
#[derive(Debug, Clone, Default)]
pub struct PollOptionsBuilder {
    options: PollOptions,
}

impl PollOptionsBuilder {
    /// Set the refresh interval.
    #[must_use]
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.options.refresh_interval = interval;
        self
    }

    /// Set the retry delay.
    #[must_use]
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.options.retry_delay = delay;
        self
    }

    /// Build the PollOptions.
    #[must_use]
    pub fn build(self) -> PollOptions {
        self.options
    }
}

/// Where the controller is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PollPhase {
    /// Waiting for the next tick (or never started).
    #[default]
    Idle,
    /// A request is in flight.
    Fetching,
    /// Waiting to retry after a transient failure.
    Retrying,
    /// Stopped by `stop` or an auth failure.
    Stopped,
}

impl fmt::Display for PollPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollPhase::Idle => write!(f, "idle"),
            PollPhase::Fetching => write!(f, "fetching"),
            PollPhase::Retrying => write!(f, "retrying"),
            PollPhase::Stopped => write!(f, "stopped"),
        }
    }
}

#[derive(Debug, Default)]
struct PollState {
    token: Option<String>,
    cycle: u64,
    cancelled: bool,
    loading: bool,
    readings: Option<Arc<Vec<LocationReading>>>,
    snapshot: Option<Arc<ProcessedBatch>>,
}

impl PollState {
    fn is_current(&self, cycle: u64) -> bool {
        self.cycle == cycle && !self.cancelled
    }
}

struct Shared {
    state: Mutex<PollState>,
    // Held while installing and delivering so consumers see batches in cycle order.
    delivery: Mutex<()>,
    phase: watch::Sender<PollPhase>,
    source: Arc<dyn MeasuresSource>,
    notifier: Arc<dyn Notifier>,
    consumer: Arc<dyn SnapshotConsumer>,
    options: PollOptions,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, PollState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark a fetch as started. Returns `false` if the cycle was retired.
    fn begin_fetch(&self, cycle: u64) -> bool {
        let mut state = self.lock_state();
        if !state.is_current(cycle) {
            return false;
        }
        state.loading = true;
        self.phase.send_replace(PollPhase::Fetching);
        true
    }

    fn begin_retry(&self, cycle: u64) -> bool {
        let state = self.lock_state();
        if !state.is_current(cycle) {
            return false;
        }
        self.phase.send_replace(PollPhase::Retrying);
        true
    }

    /// Enrich and install a batch, then hand it to the consumer.
    fn install(&self, cycle: u64, readings: Vec<LocationReading>) {
        let batch = Arc::new(process_batch(readings.clone()));
        let readings = Arc::new(readings);

        let _delivery = self
            .delivery
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        {
            let mut state = self.lock_state();
            if !state.is_current(cycle) {
                debug!(
                    cycle,
                    current = state.cycle,
                    "Discarding response from a retired poll cycle"
                );
                return;
            }
            state.readings = Some(readings);
            state.snapshot = Some(Arc::clone(&batch));
            state.loading = false;
            self.phase.send_replace(PollPhase::Idle);
        }

        debug!(
            cycle,
            indoor = batch.indoor.len(),
            outdoor = batch.outdoor.len(),
            "Installed snapshot"
        );
        self.consumer.on_snapshot_ready(&batch.indoor, &batch.outdoor);
    }

    /// Stop the cycle after a failure retrying cannot fix.
    fn halt(&self, cycle: u64, err: &Error) {
        {
            let mut state = self.lock_state();
            if !state.is_current(cycle) {
                debug!(cycle, "Ignoring failure from a retired poll cycle: {}", err);
                return;
            }
            state.cancelled = true;
            state.loading = false;
            self.phase.send_replace(PollPhase::Stopped);
        }

        error!("Polling stopped: {}", err);
        if err.is_auth() {
            self.notifier.notify(AUTH_FAILED_MESSAGE, NOTICE_DURATION);
        } else {
            self.notifier.notify(&err.to_string(), NOTICE_DURATION);
        }
    }
}

enum FetchStep {
    Cancelled,
    Superseded,
    Done(Result<Vec<LocationReading>>),
}

async fn run_cycle(shared: Arc<Shared>, cycle: u64, token: String, cancel: CancellationToken) {
    let mut ticker = interval(shared.options.refresh_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        if !shared.begin_fetch(cycle) {
            return;
        }

        let step = tokio::select! {
            _ = cancel.cancelled() => FetchStep::Cancelled,
            _ = ticker.tick() => FetchStep::Superseded,
            result = shared.source.fetch_current(&token) => FetchStep::Done(result),
        };

        match step {
            FetchStep::Cancelled => {
                debug!(cycle, "Poll cycle cancelled mid-fetch");
                return;
            }
            FetchStep::Superseded => {
                debug!(cycle, "Refresh tick fired with a request in flight, refetching");
            }
            FetchStep::Done(Ok(readings)) => {
                debug!(cycle, count = readings.len(), "Fetched locations");
                shared.install(cycle, readings);

                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = ticker.tick() => {}
                }
            }
            FetchStep::Done(Err(e)) if e.is_transient() => {
                warn!(cycle, "Fetch failed, retrying in {:?}: {}", shared.options.retry_delay, e);
                if !shared.begin_retry(cycle) {
                    return;
                }

                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = sleep(shared.options.retry_delay) => {}
                    _ = ticker.tick() => {}
                }
            }
            FetchStep::Done(Err(e)) => {
                shared.halt(cycle, &e);
                return;
            }
        }
    }
}

struct ActiveCycle {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl ActiveCycle {
    fn retire(self) {
        self.cancel.cancel();
        self.handle.abort();
    }
}

/// Owns the poll cycle and the latest snapshot.
///
/// Must be started from within a tokio runtime. Dropping the controller
/// cancels any running cycle.
pub struct PollController {
    shared: Arc<Shared>,
    active: Mutex<Option<ActiveCycle>>,
}

impl fmt::Debug for PollController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollController")
            .field("phase", &self.phase())
            .field("loading", &self.is_loading())
            .field("options", &self.shared.options)
            .finish()
    }
}

impl PollController {
    /// Create an idle controller.
    pub fn new(
        source: Arc<dyn MeasuresSource>,
        notifier: Arc<dyn Notifier>,
        consumer: Arc<dyn SnapshotConsumer>,
        options: PollOptions,
    ) -> Result<Self> {
        options.validate()?;
        let (phase, _) = watch::channel(PollPhase::Idle);

        Ok(Self {
            shared: Arc::new(Shared {
                state: Mutex::new(PollState::default()),
                delivery: Mutex::new(()),
                phase,
                source,
                notifier,
                consumer,
                options,
            }),
            active: Mutex::new(None),
        })
    }

    fn lock_active(&self) -> MutexGuard<'_, Option<ActiveCycle>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start polling with `token`, retiring any previous cycle first.
    ///
    /// The first fetch is issued immediately. An empty token is rejected
    /// and leaves the current cycle untouched.
    pub fn start(&self, token: &str) -> Result<()> {
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::invalid_config("token must not be empty"));
        }

        let mut active = self.lock_active();
        if let Some(previous) = active.take() {
            previous.retire();
        }

        let cycle = {
            let mut state = self.shared.lock_state();
            state.cycle += 1;
            state.token = Some(token.to_string());
            state.cancelled = false;
            state.loading = true;
            self.shared.phase.send_replace(PollPhase::Fetching);
            state.cycle
        };
        info!(cycle, "Starting poll cycle");

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_cycle(
            Arc::clone(&self.shared),
            cycle,
            token.to_string(),
            cancel.clone(),
        ));
        *active = Some(ActiveCycle { cancel, handle });

        Ok(())
    }

    /// Stop polling. The last snapshot stays available.
    pub fn stop(&self) {
        let previous = self.lock_active().take();
        let had_cycle = previous.is_some();
        if let Some(previous) = previous {
            previous.retire();
        }

        let mut state = self.shared.lock_state();
        state.cycle += 1;
        state.cancelled = true;
        state.loading = false;
        self.shared.phase.send_replace(PollPhase::Stopped);

        if had_cycle {
            info!("Polling stopped");
        }
    }

    /// Current phase.
    pub fn phase(&self) -> PollPhase {
        *self.shared.phase.borrow()
    }

    /// Receiver that observes every phase change.
    pub fn subscribe_phase(&self) -> watch::Receiver<PollPhase> {
        self.shared.phase.subscribe()
    }

    /// Whether a fetch (or retry) is outstanding for the current cycle.
    pub fn is_loading(&self) -> bool {
        self.shared.lock_state().loading
    }

    /// Whether a poll cycle is running.
    pub fn is_active(&self) -> bool {
        self.lock_active()
            .as_ref()
            .is_some_and(|cycle| !cycle.handle.is_finished())
    }

    /// Token of the current (or last) cycle.
    pub fn token(&self) -> Option<String> {
        self.shared.lock_state().token.clone()
    }

    /// Latest enriched batch.
    pub fn snapshot(&self) -> Option<Arc<ProcessedBatch>> {
        self.shared.lock_state().snapshot.clone()
    }

    /// Latest raw batch, as fetched.
    pub fn last_readings(&self) -> Option<Arc<Vec<LocationReading>>> {
        self.shared.lock_state().readings.clone()
    }

    /// The options this controller was built with.
    pub fn options(&self) -> &PollOptions {
        &self.shared.options
    }
}

impl Drop for PollController {
    fn drop(&mut self) {
        if let Some(cycle) = self.lock_active().take() {
            cycle.retire();
        }
    }
}
