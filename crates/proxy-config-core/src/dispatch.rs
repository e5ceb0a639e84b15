//! Update dispatcher
//!
//! Sends one full-replacement event per changed family onto that family's
//! dedicated channel. Each channel has exactly one producer, the watcher that
//! created it, so a `Set` event always describes that watcher's whole source.
//!
//! Sends are a handoff: after an event is queued the dispatcher waits for a
//! free slot again, which on the default capacity of 1 means waiting until
//! the consumer has taken the event. A cycle never finishes ahead of its
//! consumer.

use std::pin::Pin;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tracing::info;

use crate::diff::ChangeSet;
use crate::error::{Error, Result};
use crate::model::{EndpointsUpdate, ServiceUpdate, Snapshot, Update};

/// Producer side of the two outbound families
#[derive(Debug)]
pub struct UpdateDispatcher {
    services_tx: mpsc::Sender<ServiceUpdate>,
    endpoints_tx: mpsc::Sender<EndpointsUpdate>,
}

/// Consumer side of the two outbound families
#[derive(Debug)]
pub struct UpdateReceivers {
    pub services: mpsc::Receiver<ServiceUpdate>,
    pub endpoints: mpsc::Receiver<EndpointsUpdate>,
}

/// Create a dispatcher and its receivers with a per-family capacity
///
/// # Panics
///
/// Panics if `capacity` is zero, like `tokio::sync::mpsc::channel`.
/// [`PollConfig::validate`](crate::config::PollConfig::validate) rejects zero.
pub fn channels(capacity: usize) -> (UpdateDispatcher, UpdateReceivers) {
    let (services_tx, services) = mpsc::channel(capacity);
    let (endpoints_tx, endpoints) = mpsc::channel(capacity);

    (
        UpdateDispatcher {
            services_tx,
            endpoints_tx,
        },
        UpdateReceivers {
            services,
            endpoints,
        },
    )
}

impl UpdateDispatcher {
    /// Emit a `Set` event for each changed family
    ///
    /// Services go first, then endpoints. Each event carries the entire
    /// current list for its family. With a channel capacity of `n`, at most
    /// `n - 1` events wait unread when this returns.
    ///
    /// # Returns
    ///
    /// - `Ok(n)`: number of events delivered (0, 1 or 2)
    /// - `Err(Error::ChannelClosed)`: the family's receiver was dropped
    pub async fn dispatch(&self, snapshot: &Snapshot, changes: ChangeSet) -> Result<usize> {
        let mut sent = 0;

        if changes.services_changed {
            let update = ServiceUpdate::set(snapshot.services().to_vec());
            handoff(&self.services_tx, update, "services").await?;
            info!("Dispatched services update ({} services)", snapshot.services().len());
            sent += 1;
        }

        if changes.endpoints_changed {
            let update = EndpointsUpdate::set(snapshot.endpoints().to_vec());
            handoff(&self.endpoints_tx, update, "endpoints").await?;
            info!("Dispatched endpoints update ({} entries)", snapshot.endpoints().len());
            sent += 1;
        }

        Ok(sent)
    }
}

/// Queue `update` and wait until the consumer frees a slot again
///
/// The permit is dropped straight away. Acquiring it is only a wait for a
/// free slot.
async fn handoff<T>(tx: &mpsc::Sender<T>, update: T, family: &'static str) -> Result<()> {
    tx.send(update)
        .await
        .map_err(|_| Error::ChannelClosed(family))?;
    let _permit = tx.reserve().await.map_err(|_| Error::ChannelClosed(family))?;
    Ok(())
}

impl UpdateReceivers {
    /// Merge both families into one stream
    ///
    /// Ordering between families is not preserved; ordering within a family
    /// is.
    pub fn into_stream(self) -> Pin<Box<dyn Stream<Item = Update> + Send + 'static>> {
        let services = ReceiverStream::new(self.services).map(Update::Services);
        let endpoints = ReceiverStream::new(self.endpoints).map(Update::Endpoints);
        Box::pin(services.merge(endpoints))
    }
}
