//! Test doubles and common utilities for watcher contract tests
//!
//! This module provides a scriptable source and helpers to drain the
//! outbound channels without blocking.

#![allow(dead_code)]

use proxy_config_core::error::{Error, Result};
use proxy_config_core::traits::ConfigSource;
use proxy_config_core::{EndpointsUpdate, PollConfig, ServiceUpdate, UpdateReceivers};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// The two-service document used throughout the scenarios
pub const EXAMPLE: &str = r#"{ "Services": [
  { "Name": "nodejs", "Port": 10000, "Endpoints": ["10.240.180.168:8000", "10.240.254.199:8000"] },
  { "Name": "mysql",  "Port": 10001, "Endpoints": ["10.240.180.168:9000", "10.240.254.199:9000"] }
]}"#;

/// EXAMPLE with a third mysql address
pub const EXAMPLE_MYSQL_GROWN: &str = r#"{ "Services": [
  { "Name": "nodejs", "Port": 10000, "Endpoints": ["10.240.180.168:8000", "10.240.254.199:8000"] },
  { "Name": "mysql",  "Port": 10001, "Endpoints": ["10.240.180.168:9000", "10.240.254.199:9000", "10.240.62.150:9000"] }
]}"#;

/// EXAMPLE with mysql moved to another port, endpoints untouched
pub const EXAMPLE_MYSQL_NEW_PORT: &str = r#"{ "Services": [
  { "Name": "nodejs", "Port": 10000, "Endpoints": ["10.240.180.168:8000", "10.240.254.199:8000"] },
  { "Name": "mysql",  "Port": 10002, "Endpoints": ["10.240.180.168:9000", "10.240.254.199:9000"] }
]}"#;

/// One scripted answer to `read()`
#[derive(Debug, Clone)]
pub enum Step {
    Bytes(Vec<u8>),
    Fail,
}

impl Step {
    pub fn doc(doc: &str) -> Self {
        Step::Bytes(doc.as_bytes().to_vec())
    }
}

#[derive(Debug)]
struct Script {
    pending: VecDeque<Step>,
    current: Step,
}

/// A source that answers reads from a script
///
/// Each read consumes the next queued step; once the queue is empty the last
/// step repeats. Clones share the script and the read counter.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    script: Arc<Mutex<Script>>,
    reads: Arc<AtomicUsize>,
}

impl ScriptedSource {
    /// Create a source whose first answer is `first`
    pub fn new(first: Step) -> Self {
        let mut pending = VecDeque::new();
        pending.push_back(first);

        Self {
            script: Arc::new(Mutex::new(Script {
                pending,
                current: Step::Fail,
            })),
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A source that always fails
    pub fn failing() -> Self {
        Self::new(Step::Fail)
    }

    /// Queue the next answer
    pub fn push(&self, step: Step) {
        self.script.lock().unwrap().pending.push_back(step);
    }

    /// Number of times read() was called
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ConfigSource for ScriptedSource {
    async fn read(&self) -> Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        let mut script = self.script.lock().unwrap();
        if let Some(next) = script.pending.pop_front() {
            script.current = next;
        }

        match &script.current {
            Step::Bytes(bytes) => Ok(bytes.clone()),
            Step::Fail => Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "scripted failure",
            ))),
        }
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

/// Poll settings for tests driving `poll_once` by hand
///
/// The channels are large enough that a cycle never waits on the test.
pub fn manual_poll() -> PollConfig {
    PollConfig::with_interval(Duration::from_millis(10)).with_channel_capacity(16)
}

/// Everything currently queued on both channels
#[derive(Debug, Default)]
pub struct Drained {
    pub services: Vec<ServiceUpdate>,
    pub endpoints: Vec<EndpointsUpdate>,
}

impl Drained {
    pub fn total(&self) -> usize {
        self.services.len() + self.endpoints.len()
    }
}

/// Take every queued update without waiting
pub fn drain(rx: &mut UpdateReceivers) -> Drained {
    let mut drained = Drained::default();
    while let Ok(update) = rx.services.try_recv() {
        drained.services.push(update);
    }
    while let Ok(update) = rx.endpoints.try_recv() {
        drained.endpoints.push(update);
    }
    drained
}
