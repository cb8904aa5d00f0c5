/**
 * Transport layer: how serialized events reach the collector.
 *
 * - `Transport`: the seam: hand over a request, learn nothing back
 * - `http`: ureq-based single-attempt POST
 * - `worker`: background thread, bounded channel, flush signaling
 */
use std::time::Duration;

pub mod http;
pub mod worker;

pub use http::{HttpClient, HttpTransport};
pub use worker::{FlushSignal, Worker, WorkerMsg};

/**
 * One outgoing POST: target URL, headers in send order, JSON body.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Request {
    /// Returns the first header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/**
 * Delivers requests to the collector.
 *
 * `send` must not block on the network: the reporter calls it from the
 * thread that captured the event. Completion is observable only through
 * whatever the implementation logs.
 */
pub trait Transport: Send + Sync {
    fn send(&self, request: Request);

    /**
     * Blocks until every request handed to `send` so far has been dealt
     * with, or `timeout` elapses. Returns `false` on timeout.
     */
    fn flush(&self, timeout: Duration) -> bool {
        let _ = timeout;
        true
    }
}
