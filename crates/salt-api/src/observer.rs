//! Per-request observation hook.

use std::fmt;
use std::time::Duration;

use tracing::info;

/// Outcome of one POST attempt, reported after it completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRecord {
    pub verb: &'static str,
    pub url: String,
    pub endpoint: String,
    /// `None` when no response was received.
    pub status: Option<u16>,
    pub elapsed: Duration,
}

/// Receives a [`RequestRecord`] after every request sent by a client.
pub trait RequestObserver: Send + Sync + fmt::Debug {
    fn on_request(&self, record: &RequestRecord);
}

/// Default observer writing one `tracing` event per request.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RequestObserver for TracingObserver {
    fn on_request(&self, record: &RequestRecord) {
        let duration_ms = u64::try_from(record.elapsed.as_millis()).unwrap_or(u64::MAX);
        match record.status {
            Some(status) => info!(
                target: "salt_api",
                verb = record.verb,
                url = %record.url,
                status,
                duration_ms,
                "Salt API request"
            ),
            None => info!(
                target: "salt_api",
                verb = record.verb,
                url = %record.url,
                duration_ms,
                "Salt API request without response"
            ),
        }
    }
}
