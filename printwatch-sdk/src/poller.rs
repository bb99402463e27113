//! The Poller drives gather cycles and emits their batches.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use printwatch_types::Batch;

use crate::accumulator::Collector;
use crate::output::Output;

/// Default gather interval.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);

/// Default deadline for network outputs.
pub const DEFAULT_OUTPUT_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs a [`Collector`] on a fixed interval and emits each batch to every
/// configured output.
///
/// Cycles never overlap: the next tick is only taken once the previous
/// cycle has been gathered and emitted.
///
/// # Example
///
/// ```rust,no_run
/// use printwatch_sdk::{Accumulator, Collector, Output, Poller};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// struct Noop;
///
/// #[async_trait::async_trait]
/// impl Collector for Noop {
///     async fn collect(&self, _acc: &mut dyn Accumulator) {}
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let poller = Poller::builder()
///         .output(Output::file("printer.json"))
///         .interval(Duration::from_secs(5))
///         .build();
///
///     let handle = poller.start(Arc::new(Noop));
///     tokio::time::sleep(Duration::from_secs(30)).await;
///     handle.shutdown().await;
/// }
/// ```
#[derive(Debug)]
pub struct Poller {
    outputs: Arc<Vec<Output>>,
    interval: Duration,
    timeout: Duration,
}

impl Poller {
    /// Create a poller with no outputs and the default interval.
    pub fn new() -> Self {
        Self {
            outputs: Arc::new(Vec::new()),
            interval: DEFAULT_INTERVAL,
            timeout: DEFAULT_OUTPUT_TIMEOUT,
        }
    }

    /// Create a builder for configuring the poller.
    pub fn builder() -> PollerBuilder {
        PollerBuilder::new()
    }

    /// Interval between cycles.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Deadline applied to each network output.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run one cycle now: gather, emit to all outputs, return the batch.
    pub async fn poll_once(&self, collector: &dyn Collector) -> Batch {
        run_cycle(collector, &self.outputs, self.timeout).await
    }

    /// Start periodic gathering on a background task.
    ///
    /// The first cycle runs immediately. Returns a handle that stops the
    /// task when told to or when dropped.
    pub fn start(&self, collector: Arc<dyn Collector>) -> PollHandle {
        let (stop_tx, stop_rx) = watch::channel(false);
        let outputs = self.outputs.clone();
        let interval = self.interval;
        let timeout = self.timeout;

        let task = tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);
            interval_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut stop_rx = stop_rx;

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        run_cycle(collector.as_ref(), &outputs, timeout).await;
                    }
                    changed = stop_rx.changed() => {
                        // A dropped sender also ends the loop
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            tracing::debug!("poller stopped");
        });

        PollHandle { stop_tx, task }
    }
}

impl Default for Poller {
    fn default() -> Self {
        Self::new()
    }
}

async fn run_cycle(collector: &dyn Collector, outputs: &[Output], timeout: Duration) -> Batch {
    let mut batch = Batch::new();
    collector.collect(&mut batch).await;
    tracing::debug!(records = batch.len(), "gather cycle complete");

    for output in outputs {
        if let Err(e) = output.emit(&batch, timeout).await {
            tracing::error!(output = %output.describe(), error = %e, "failed to emit batch");
        }
    }

    batch
}

/// Builder for configuring a Poller.
#[derive(Debug, Default)]
pub struct PollerBuilder {
    outputs: Vec<Output>,
    interval: Option<Duration>,
    timeout: Option<Duration>,
}

impl PollerBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an output destination.
    ///
    /// Multiple outputs can be added; batches will be emitted to all of them.
    pub fn output(mut self, output: Output) -> Self {
        self.outputs.push(output);
        self
    }

    /// Set the gather interval.
    ///
    /// Defaults to 10 seconds if not specified.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Set the deadline for network outputs.
    ///
    /// Defaults to 5 seconds if not specified.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the poller.
    pub fn build(self) -> Poller {
        Poller {
            outputs: Arc::new(self.outputs),
            interval: self.interval.unwrap_or(DEFAULT_INTERVAL),
            timeout: self.timeout.unwrap_or(DEFAULT_OUTPUT_TIMEOUT),
        }
    }
}

/// Handle for controlling background polling.
///
/// Drop this handle to stop polling, or call `stop()` / `shutdown()`.
pub struct PollHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Signal the polling task to stop without waiting for it.
    pub fn stop(self) {
        let _ = self.stop_tx.send(true);
    }

    /// Signal the polling task to stop and wait for the in-flight cycle.
    pub async fn shutdown(self) {
        let _ = self.stop_tx.send(true);
        let _ = self.task.await;
    }

    /// True once the polling task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
