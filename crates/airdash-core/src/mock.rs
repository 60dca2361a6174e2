//! Mock collaborators for testing.
//!
//! [`MockSource`] stands in for the HTTP API, and [`MockNotifier`] and
//! [`MockConsumer`] record what the poll controller hands them.
//!
//! # Features
//!
//! - **Scripted replies**: queue successes and failures for the next fetches
//! - **Per-token data**: return different locations for different tokens
//! - **Latency simulation**: delay every fetch, for in-flight and supersede tests

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use airdash_types::{EnrichedLocation, LocationReading};

use crate::error::{Error, Result};
use crate::traits::{MeasuresSource, Notifier, SnapshotConsumer};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One scripted reply of a [`MockSource`].
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Succeed with these readings.
    Readings(Vec<LocationReading>),
    /// Fail with an HTTP status (401/403 become auth failures).
    Status(u16),
    /// Fail with an undecodable body.
    Decode(String),
}

/// A mock measures source.
///
/// Fetches consume the scripted replies first. With the script empty, a fetch
/// returns the readings registered for its token, or the default readings.
///
/// # Example
///
/// ```
/// use airdash_core::mock::{MockReply, MockSource};
/// use airdash_core::MeasuresSource;
///
/// #[tokio::main]
/// async fn main() {
///     let source = MockSource::new();
///     source.push_reply(MockReply::Status(503));
///
///     assert!(source.fetch_current("token").await.is_err());
///     assert!(source.fetch_current("token").await.unwrap().is_empty());
///     assert_eq!(source.fetch_count(), 2);
/// }
/// ```
#[derive(Debug, Default)]
pub struct MockSource {
    default_readings: Mutex<Vec<LocationReading>>,
    token_readings: Mutex<HashMap<String, Vec<LocationReading>>>,
    script: Mutex<VecDeque<MockReply>>,
    tokens_seen: Mutex<Vec<String>>,
    /// Simulated fetch latency in milliseconds (0 = no delay).
    latency_ms: AtomicU64,
    fetch_count: AtomicU32,
    completed_count: AtomicU32,
}

impl MockSource {
    /// Create a source that returns no locations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source that returns `readings` for every token.
    pub fn with_readings(readings: Vec<LocationReading>) -> Self {
        let source = Self::new();
        source.set_readings(readings);
        source
    }

    /// Set the readings returned when nothing more specific applies.
    pub fn set_readings(&self, readings: Vec<LocationReading>) {
        *lock(&self.default_readings) = readings;
    }

    /// Set the readings returned for one token.
    pub fn set_token_readings(&self, token: &str, readings: Vec<LocationReading>) {
        lock(&self.token_readings).insert(token.to_string(), readings);
    }

    /// Queue a reply for a future fetch.
    pub fn push_reply(&self, reply: MockReply) {
        lock(&self.script).push_back(reply);
    }

    /// Set simulated latency for fetches that start after this call.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::Relaxed);
    }

    /// Number of fetches started.
    pub fn fetch_count(&self) -> u32 {
        self.fetch_count.load(Ordering::Relaxed)
    }

    /// Number of fetches that ran to completion (not dropped mid-flight).
    pub fn completed_count(&self) -> u32 {
        self.completed_count.load(Ordering::Relaxed)
    }

    /// Tokens passed to each fetch, in order.
    pub fn tokens_seen(&self) -> Vec<String> {
        lock(&self.tokens_seen).clone()
    }

    fn next_reply(&self, token: &str) -> MockReply {
        if let Some(reply) = lock(&self.script).pop_front() {
            return reply;
        }
        let readings = lock(&self.token_readings)
            .get(token)
            .cloned()
            .unwrap_or_else(|| lock(&self.default_readings).clone());
        MockReply::Readings(readings)
    }
}

#[async_trait]
impl MeasuresSource for MockSource {
    async fn fetch_current(&self, token: &str) -> Result<Vec<LocationReading>> {
        self.fetch_count.fetch_add(1, Ordering::Relaxed);
        lock(&self.tokens_seen).push(token.to_string());

        let latency = self.latency_ms.load(Ordering::Relaxed);
        let reply = self.next_reply(token);

        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        self.completed_count.fetch_add(1, Ordering::Relaxed);

        match reply {
            MockReply::Readings(readings) => Ok(readings),
            MockReply::Status(status) => Err(Error::from_status(status, "mock failure")),
            MockReply::Decode(message) => Err(Error::Decode(message)),
        }
    }
}

/// Notifier that records every message.
#[derive(Debug, Default)]
pub struct MockNotifier {
    messages: Mutex<Vec<(String, Duration)>>,
}

impl MockNotifier {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages received so far.
    pub fn messages(&self) -> Vec<(String, Duration)> {
        lock(&self.messages).clone()
    }
}

impl Notifier for MockNotifier {
    fn notify(&self, message: &str, duration: Duration) {
        lock(&self.messages).push((message.to_string(), duration));
    }
}

/// Consumer that records every delivered batch.
#[derive(Debug, Default)]
pub struct MockConsumer {
    batches: Mutex<Vec<(Vec<EnrichedLocation>, Vec<EnrichedLocation>)>>,
}

impl MockConsumer {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of batches delivered.
    pub fn call_count(&self) -> usize {
        lock(&self.batches).len()
    }

    /// The most recent `(indoor, outdoor)` batch.
    pub fn last(&self) -> Option<(Vec<EnrichedLocation>, Vec<EnrichedLocation>)> {
        lock(&self.batches).last().cloned()
    }
}

impl SnapshotConsumer for MockConsumer {
    fn on_snapshot_ready(&self, indoor: &[EnrichedLocation], outdoor: &[EnrichedLocation]) {
        lock(&self.batches).push((indoor.to_vec(), outdoor.to_vec()));
    }
}
