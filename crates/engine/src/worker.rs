//! Delivery worker: periodically pushes pending messages to the delivery endpoint.
//!
//! The worker has two states, stopped and running. `start` spawns one polling
//! loop as a tokio task; `stop` signals it through a single-slot channel. Both
//! take the run-state lock only for the check and transition, never across a
//! delivery cycle, so a slow cycle never blocks control calls.
//!
//! Each tick runs one cycle:
//! 1. Fetch up to `batch_size` pending messages, oldest first
//! 2. Send each one to the delivery endpoint
//! 3. On acknowledgment, record the dispatch time in the cache (best-effort)
//! 4. Mark the message `sent`
//!
//! A failure on one message never aborts the rest of the batch. Stop and
//! shutdown are only observed between ticks, so an in-flight delivery call
//! always runs to completion or timeout.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, mpsc};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use courier_common::config::AppConfig;
use courier_common::error::AppError;
use courier_common::types::{DeliveryRequest, Message, MessageStatus};
use courier_notifier::{DispatchCache, MessageSender};

use crate::store::MessageStore;

/// Default time between two delivery cycles.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(120);

/// Default number of pending messages handled per cycle.
pub const DEFAULT_BATCH_SIZE: i64 = 2;

/// Polling cadence and batch size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSettings {
    pub interval: Duration,
    pub batch_size: i64,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl WorkerSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            interval: Duration::from_secs(config.delivery_interval_secs),
            batch_size: config.delivery_batch_size,
        }
    }
}

/// Result of a `start` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
    /// The process is shutting down; no loop was spawned.
    ShuttingDown,
}

/// Result of a `stop` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The running loop was signalled.
    Signalled,
    /// A stop was already delivered and the loop is still unwinding.
    AlreadyStopping,
    NotRunning,
}

/// Counters for a single delivery cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Pending messages fetched.
    pub fetched: usize,
    /// Delivered and marked `sent`.
    pub sent: usize,
    /// Delivery failed; still `pending`.
    pub failed: usize,
    /// Delivered but the status update failed, so storage still says `pending`.
    pub unrecorded: usize,
}

#[derive(Debug, Default)]
struct RunState {
    running: bool,
    /// Sender for the active run. Taken by the first `stop` so each run gets
    /// at most one termination notice.
    stop_tx: Option<mpsc::Sender<()>>,
}

struct WorkerInner {
    store: Arc<dyn MessageStore>,
    sender: Arc<dyn MessageSender>,
    cache: Arc<dyn DispatchCache>,
    settings: WorkerSettings,
    shutdown: CancellationToken,
    state: Mutex<RunState>,
}

/// Background delivery worker. Cheap to clone; clones share one run state.
#[derive(Clone)]
pub struct DeliveryWorker {
    inner: Arc<WorkerInner>,
}

impl DeliveryWorker {
    pub fn new(
        store: Arc<dyn MessageStore>,
        sender: Arc<dyn MessageSender>,
        cache: Arc<dyn DispatchCache>,
        settings: WorkerSettings,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            inner: Arc::new(WorkerInner {
                store,
                sender,
                cache,
                settings,
                shutdown,
                state: Mutex::new(RunState::default()),
            }),
        }
    }

    pub fn settings(&self) -> WorkerSettings {
        self.inner.settings
    }

    /// Whether a polling loop is currently active.
    pub async fn is_running(&self) -> bool {
        self.inner.state.lock().await.running
    }

    /// Start the polling loop unless one is already active.
    ///
    /// Returns as soon as the loop is spawned; the first cycle runs one
    /// interval later.
    pub async fn start(&self) -> StartOutcome {
        let mut state = self.inner.state.lock().await;

        if state.running {
            tracing::info!("Delivery worker is already running");
            return StartOutcome::AlreadyRunning;
        }

        if self.inner.shutdown.is_cancelled() {
            tracing::warn!("Delivery worker not started: shutdown in progress");
            return StartOutcome::ShuttingDown;
        }

        let (stop_tx, stop_rx) = mpsc::channel(1);
        state.running = true;
        state.stop_tx = Some(stop_tx);
        drop(state);

        tokio::spawn(self.clone().run_loop(stop_rx));

        tracing::info!(
            interval_secs = self.inner.settings.interval.as_secs(),
            batch_size = self.inner.settings.batch_size,
            "Delivery worker started"
        );
        StartOutcome::Started
    }

    /// Ask the running loop to exit. Never blocks on the loop itself.
    pub async fn stop(&self) -> StopOutcome {
        let mut state = self.inner.state.lock().await;

        if !state.running {
            tracing::info!("Delivery worker is already stopped");
            return StopOutcome::NotRunning;
        }

        match state.stop_tx.take() {
            Some(stop_tx) => {
                // The slot is fresh per run and we hold the only sender, so
                // this cannot be full; a closed channel means the loop is
                // already on its way out.
                if stop_tx.try_send(()).is_err() {
                    tracing::debug!("Delivery loop already exiting");
                }
                tracing::info!("Stop signal sent to delivery worker");
                StopOutcome::Signalled
            }
            None => {
                tracing::info!("Delivery worker is already stopping");
                StopOutcome::AlreadyStopping
            }
        }
    }

    async fn run_loop(self, mut stop_rx: mpsc::Receiver<()>) {
        let period = self.inner.settings.interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!("Delivery loop running");

        loop {
            tokio::select! {
                biased;

                _ = stop_rx.recv() => {
                    tracing::info!("Stop signal received, delivery loop exiting");
                    break;
                }
                _ = self.inner.shutdown.cancelled() => {
                    tracing::info!("Shutdown requested, delivery loop exiting");
                    break;
                }
                _ = ticker.tick() => {
                    match self.run_cycle().await {
                        Ok(report) if report.fetched > 0 => {
                            tracing::info!(
                                fetched = report.fetched,
                                sent = report.sent,
                                failed = report.failed,
                                unrecorded = report.unrecorded,
                                "Delivery cycle finished"
                            );
                        }
                        Ok(_) => {}
                        Err(e) => {
                            tracing::error!(error = %e, "Delivery cycle aborted");
                        }
                    }
                }
            }
        }

        drop(ticker);

        let mut state = self.inner.state.lock().await;
        state.running = false;
        state.stop_tx = None;
    }

    /// Run one delivery cycle.
    ///
    /// Only a failed fetch aborts the cycle; every per-message failure is
    /// logged and counted in the report.
    pub async fn run_cycle(&self) -> Result<CycleReport, AppError> {
        let messages = self
            .inner
            .store
            .fetch_by_status(Some(MessageStatus::Pending), self.inner.settings.batch_size)
            .await?;

        if messages.is_empty() {
            tracing::debug!("No pending messages to send");
            return Ok(CycleReport::default());
        }

        let mut report = CycleReport {
            fetched: messages.len(),
            ..CycleReport::default()
        };

        for message in &messages {
            self.deliver(message, &mut report).await;
        }

        Ok(report)
    }

    async fn deliver(&self, message: &Message, report: &mut CycleReport) {
        let request = DeliveryRequest::from(message);

        let ack = match self.inner.sender.send(&request).await {
            Ok(ack) => ack,
            Err(e) => {
                tracing::warn!(message_id = message.id, error = %e, "Failed to send message");
                report.failed += 1;
                return;
            }
        };

        tracing::info!(
            message_id = message.id,
            ack_id = %ack.message_id,
            "Message accepted by delivery endpoint"
        );

        self.inner
            .cache
            .record_dispatch(&ack.message_id, Utc::now())
            .await;

        // Delivery already happened; if this write fails the row stays
        // `pending` and the next cycle will send it again.
        match self
            .inner
            .store
            .update_status(message.id, MessageStatus::Sent)
            .await
        {
            Ok(()) => report.sent += 1,
            Err(e) => {
                tracing::error!(
                    message_id = message.id,
                    ack_id = %ack.message_id,
                    error = %e,
                    "Message delivered but status update failed"
                );
                report.unrecorded += 1;
            }
        }
    }
}
