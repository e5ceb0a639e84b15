//! Configuration watcher (poll loop)
//!
//! The ConfigWatcher is responsible for:
//! - Reading the source on a fixed cadence
//! - Parsing and validating what it read
//! - Comparing the result with the last accepted snapshot
//! - Dispatching full-replacement updates for changed families
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐
//! │ ConfigSource │─── raw bytes ───┐
//! └──────────────┘                 │
//!                                  ▼
//!                          ┌───────────────┐
//!                          │ ConfigWatcher │
//!                          └───────────────┘
//!                                  │
//!         ┌────────────────────────┼────────────────────────┐
//!         │                        │                        │
//!         ▼                        ▼                        ▼
//! ┌──────────────┐        ┌──────────────┐        ┌──────────────────┐
//! │ SourceReader │        │ parse/detect │        │ UpdateDispatcher │
//! │ (bytes same?)│        │ (snapshot)   │        │ (services, eps)  │
//! └──────────────┘        └──────────────┘        └──────────────────┘
//! ```
//!
//! ## Cycle
//!
//! ```text
//! Reading ─┬─ read error ───────────────────────────────┐
//!          ├─ bytes unchanged ──────────────────────────┤
//!          └─ Parsing ─┬─ parse error ──────────────────┤
//!                      └─ Diffing ── Dispatching(0..2) ─┴─ Waiting ── Reading
//! ```
//!
//! Every cycle ends with the same fixed wait. Read and parse errors are
//! logged and never touch the last accepted snapshot.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::PollConfig;
use crate::diff;
use crate::dispatch::{self, UpdateDispatcher, UpdateReceivers};
use crate::error::{Error, Result};
use crate::model::Snapshot;
use crate::parser;
use crate::reader::{ReadOutcome, SourceReader};
use crate::traits::ConfigSource;

/// What a single cycle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The source could not be read
    ReadFailed,
    /// The bytes were identical to the last handled bytes
    Unchanged,
    /// The bytes did not form a valid snapshot
    ParseFailed,
    /// A valid snapshot equal to the last accepted one
    NoChange,
    /// Events were delivered for the flagged families
    Dispatched { services: bool, endpoints: bool },
}

impl CycleOutcome {
    /// Number of events the cycle delivered
    pub fn events(&self) -> usize {
        match self {
            CycleOutcome::Dispatched {
                services,
                endpoints,
            } => usize::from(*services) + usize::from(*endpoints),
            _ => 0,
        }
    }
}

/// Poll loop for one source
///
/// All cycle state (the last handled bytes, the last accepted snapshot and
/// the outbound channels) is owned by the watcher and moves with it into its
/// task. Nothing is shared with other watchers: every source gets its own
/// pair of channels, so a `Set` event always replaces that source's view
/// and nothing else.
///
/// ## Lifecycle
///
/// 1. Create with [`ConfigWatcher::new()`]
/// 2. Start with [`ConfigWatcher::spawn()`] or await [`ConfigWatcher::run_with_shutdown()`]
/// 3. Stop with [`WatcherHandle::stop()`]
pub struct ConfigWatcher {
    /// Source plus byte-level short-circuit
    reader: SourceReader,

    /// Outbound channels
    dispatcher: UpdateDispatcher,

    /// Fixed wait between cycles
    poll_interval: Duration,

    /// Baseline for change detection
    last_accepted: Option<Snapshot>,

    /// Source location, for logs
    source_name: String,
}

impl ConfigWatcher {
    /// Create a watcher with its own pair of outbound channels
    ///
    /// # Returns
    ///
    /// A tuple of (watcher, receivers) where receivers yield the updates
    pub fn new(
        source: Box<dyn ConfigSource>,
        poll: PollConfig,
    ) -> Result<(Self, UpdateReceivers)> {
        poll.validate()?;

        let (dispatcher, receivers) = dispatch::channels(poll.channel_capacity);
        let reader = SourceReader::new(source);
        let source_name = reader.describe();

        let watcher = Self {
            reader,
            dispatcher,
            poll_interval: poll.poll_interval(),
            last_accepted: None,
            source_name,
        };

        Ok((watcher, receivers))
    }

    /// Source location, as reported by the source
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Fixed wait between cycles
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// The snapshot the next cycle will be compared against
    pub fn last_accepted(&self) -> Option<&Snapshot> {
        self.last_accepted.as_ref()
    }

    /// Run exactly one read → parse → diff → dispatch cycle
    ///
    /// Read and parse failures are logged here and reported through the
    /// outcome; they never escape as errors.
    ///
    /// # Returns
    ///
    /// - `Ok(CycleOutcome)`: what the cycle did
    /// - `Err(Error::ChannelClosed)`: a family has no consumer left
    pub async fn poll_once(&mut self) -> Result<CycleOutcome> {
        let data = match self.reader.read().await {
            Ok(ReadOutcome::Changed(data)) => data,
            Ok(ReadOutcome::Unchanged) => {
                debug!("Source {} unchanged, skipping parse", self.source_name);
                return Ok(CycleOutcome::Unchanged);
            }
            Err(e) => {
                error!("Couldn't read source {}: {}", self.source_name, e);
                return Ok(CycleOutcome::ReadFailed);
            }
        };

        let snapshot = match parser::parse(&data) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(
                    "Couldn't parse configuration from {}: {} (payload: {})",
                    self.source_name,
                    e,
                    String::from_utf8_lossy(&data)
                );
                self.reader.mark_seen(data);
                return Ok(CycleOutcome::ParseFailed);
            }
        };

        let changes = diff::detect(self.last_accepted.as_ref(), &snapshot);
        if changes.is_empty() {
            debug!(
                "Configuration from {} is structurally unchanged",
                self.source_name
            );
            self.reader.mark_seen(data);
            return Ok(CycleOutcome::NoChange);
        }

        self.dispatcher.dispatch(&snapshot, changes).await?;

        self.reader.mark_seen(data);
        self.last_accepted = Some(snapshot);

        Ok(CycleOutcome::Dispatched {
            services: changes.services_changed,
            endpoints: changes.endpoints_changed,
        })
    }

    /// Run the watcher until every consumer has gone away
    ///
    /// # Returns
    ///
    /// - `Err(Error::ChannelClosed)`: the only way this returns
    pub async fn run(self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Run the watcher until the shutdown signal fires
    ///
    /// Dropping the sender counts as a signal. A pending wait or a blocked
    /// dispatch is abandoned as soon as the signal arrives.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Clean shutdown
    /// - `Err(Error::ChannelClosed)`: a family has no consumer left
    pub async fn run_with_shutdown(self, shutdown_rx: oneshot::Receiver<()>) -> Result<()> {
        self.run_internal(Some(shutdown_rx)).await
    }

    async fn run_internal(mut self, shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        info!(
            "Watching {} (poll interval {:?})",
            self.source_name, self.poll_interval
        );

        let shutdown = async move {
            match shutdown_rx {
                Some(rx) => {
                    let _ = rx.await;
                }
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => break,

                result = self.poll_once() => match result {
                    Ok(outcome) => debug!("Cycle for {} finished: {:?}", self.source_name, outcome),
                    Err(e) => {
                        error!("Stopping watcher for {}: {}", self.source_name, e);
                        return Err(e);
                    }
                },
            }

            tokio::select! {
                biased;

                _ = &mut shutdown => break,

                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }

        info!("Shutdown signal received, stopped watching {}", self.source_name);
        Ok(())
    }

    /// Run the watcher on its own task
    pub fn spawn(self) -> WatcherHandle {
        let source_name = self.source_name.clone();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(self.run_with_shutdown(shutdown_rx));

        WatcherHandle {
            source_name,
            shutdown_tx,
            task,
        }
    }
}

/// Handle to a spawned watcher
///
/// Dropping the handle stops the watcher at its next suspension point.
pub struct WatcherHandle {
    source_name: String,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<Result<()>>,
}

impl WatcherHandle {
    /// Source location of the watched source
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// True once the watcher task has exited
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Signal the watcher to stop and wait for its task to exit
    pub async fn stop(self) -> Result<()> {
        // The task may already have exited; the join below reports why
        let _ = self.shutdown_tx.send(());

        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(Error::Other(format!(
                "Watcher task for {} failed: {}",
                self.source_name, e
            ))),
        }
    }
}
