//! Snapshot model
//!
//! A [`Snapshot`] is the validated result of one successful parse. It carries
//! two independently diffed fact families: services (name and port) and
//! endpoints (name and address list). Consumers receive whole families via
//! [`UpdateEvent`]s, never patches.

use serde::{Deserialize, Serialize};

/// A backend service identity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceFact {
    /// Unique key within a snapshot, shared with the matching [`EndpointFact`]
    pub name: String,
    /// Proxy port for the service
    pub port: u16,
}

impl ServiceFact {
    pub fn new(name: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            port,
        }
    }
}

/// The network endpoints serving a service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EndpointFact {
    /// Unique key within a snapshot, shared with the matching [`ServiceFact`]
    pub name: String,
    /// `host:port` addresses, in document order
    pub addresses: Vec<String>,
}

impl EndpointFact {
    pub fn new<I, S>(name: impl Into<String>, addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            addresses: addresses.into_iter().map(Into::into).collect(),
        }
    }
}

/// Parsed, validated view of one read of the source
///
/// Immutable once built. Equality is derived, so two snapshots (or two of
/// their families) compare as whole, order-sensitive sequences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    services: Vec<ServiceFact>,
    endpoints: Vec<EndpointFact>,
}

impl Snapshot {
    /// Build a snapshot from already validated families
    ///
    /// Uniqueness of names is checked by the parser; this constructor only
    /// assembles the value.
    pub fn new(services: Vec<ServiceFact>, endpoints: Vec<EndpointFact>) -> Self {
        Self {
            services,
            endpoints,
        }
    }

    /// A snapshot with no services and no endpoints
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn services(&self) -> &[ServiceFact] {
        &self.services
    }

    pub fn endpoints(&self) -> &[EndpointFact] {
        &self.endpoints
    }

    /// Look up the endpoints that correlate with a service name
    pub fn endpoints_for(&self, name: &str) -> Option<&EndpointFact> {
        self.endpoints.iter().find(|e| e.name == name)
    }
}

/// Operation carried by an update event
///
/// Only full replacement exists today. The enum is non-exhaustive so that
/// incremental variants can be added without breaking consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Operation {
    /// Replace the consumer's entire view of the family with the payload
    Set,
}

/// A full-replacement update for one fact family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateEvent<T> {
    pub op: Operation,
    pub payload: Vec<T>,
}

impl<T> UpdateEvent<T> {
    /// Create a `Set` event carrying the entire family
    pub fn set(payload: Vec<T>) -> Self {
        Self {
            op: Operation::Set,
            payload,
        }
    }
}

/// Update for the services family
pub type ServiceUpdate = UpdateEvent<ServiceFact>;

/// Update for the endpoints family
pub type EndpointsUpdate = UpdateEvent<EndpointFact>;

/// Either family's update, for consumers that merge both channels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    Services(ServiceUpdate),
    Endpoints(EndpointsUpdate),
}

impl Update {
    /// Family name, as used in logs
    pub fn family(&self) -> &'static str {
        match self {
            Update::Services(_) => "services",
            Update::Endpoints(_) => "endpoints",
        }
    }
}
