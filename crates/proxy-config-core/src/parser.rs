//! Parser and structural validator
//!
//! Turns raw document bytes into a [`Snapshot`]. Either a complete snapshot
//! comes back or an error does; nothing is applied partially.
//!
//! ## Document
//!
//! ```json
//! { "Services": [
//!   { "Name": "nodejs", "Port": 10000, "Endpoints": ["10.240.180.168:8000", "10.240.254.199:8000"] },
//!   { "Name": "mysql",  "Port": 10001, "Endpoints": ["10.240.180.168:9000", "10.240.254.199:9000"] }
//! ]}
//! ```
//!
//! Field names also accept their lowercase spelling. Unknown fields are
//! ignored. A document without `Services` describes zero services.

use serde::Deserialize;
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::model::{EndpointFact, ServiceFact, Snapshot};

#[derive(Debug, Deserialize)]
struct SourceDocument {
    #[serde(rename = "Services", alias = "services", default)]
    services: Vec<ServiceEntry>,
}

#[derive(Debug, Deserialize)]
struct ServiceEntry {
    #[serde(rename = "Name", alias = "name")]
    name: String,
    #[serde(rename = "Port", alias = "port")]
    port: u16,
    #[serde(rename = "Endpoints", alias = "endpoints")]
    endpoints: Vec<String>,
}

/// Parse and validate a raw document
///
/// # Errors
///
/// - `Error::Json`: malformed syntax, a missing required field or a value of
///   the wrong type (including a port outside 0..=65535)
/// - `Error::InvalidDocument`: an empty or duplicated service name
pub fn parse(raw: &[u8]) -> Result<Snapshot> {
    let document: SourceDocument = serde_json::from_slice(raw)?;

    let mut seen = HashSet::with_capacity(document.services.len());
    let mut services = Vec::with_capacity(document.services.len());
    let mut endpoints = Vec::with_capacity(document.services.len());

    for (index, entry) in document.services.into_iter().enumerate() {
        if entry.name.is_empty() {
            return Err(Error::invalid_document(format!(
                "service at index {} has an empty Name",
                index
            )));
        }
        if !seen.insert(entry.name.clone()) {
            return Err(Error::invalid_document(format!(
                "duplicate service name '{}' at index {}",
                entry.name, index
            )));
        }

        services.push(ServiceFact::new(entry.name.clone(), entry.port));
        endpoints.push(EndpointFact {
            name: entry.name,
            addresses: entry.endpoints,
        });
    }

    Ok(Snapshot::new(services, endpoints))
}
