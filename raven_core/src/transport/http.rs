/*!
 * HTTP transport for delivering events to the collector.
 *
 * Uses `ureq`, a pure-Rust blocking HTTP client with no async runtime.
 * Blocking is fine here: every request goes out from the dedicated worker
 * thread, never from the thread that captured the event.
 *
 * - **Single attempt**: no retries, no backoff.
 * - **Best-effort**: failures are logged and dropped.
 */

use std::time::Duration;

use crossbeam_channel::{Sender, TrySendError};
use ureq::Agent;

use super::worker::{FlushSignal, Worker, WorkerMsg};
use super::{Request, Transport};
use crate::error::Error;

/// Bounded channel capacity. When full, new requests are dropped.
const QUEUE_CAPACITY: usize = 100;

// ---------------------------------------------------------------------------
// HttpClient: the blocking POST, run on the worker thread
// ---------------------------------------------------------------------------

/**
 * Thin wrapper around `ureq::Agent`.
 *
 * Timeouts: 10 s connect, 30 s per request. Connection pooling and
 * keep-alive are handled by the agent.
 */
pub struct HttpClient {
    agent: Agent,
}

impl HttpClient {
    pub fn new() -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_connect(Some(Duration::from_secs(10)))
            .timeout_global(Some(Duration::from_secs(30)))
            .http_status_as_error(false)
            .build()
            .into();

        Self { agent }
    }

    /**
     * POSTs `request` and waits for the response.
     *
     * `Content-Length` is left to ureq, which derives it from the body.
     */
    pub fn deliver(&self, request: &Request) -> Result<(), Error> {
        let mut builder = self.agent.post(request.url.as_str());
        for (name, value) in &request.headers {
            if name.eq_ignore_ascii_case("content-length") {
                continue;
            }
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send(request.body.as_slice())?;

        let code = response.status().as_u16();
        if !(200..300).contains(&code) {
            let body = response
                .into_body()
                .read_to_string()
                .unwrap_or_else(|_| "<unreadable body>".into());
            return Err(Error::Status { code, body });
        }

        Ok(())
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// HttpTransport: the non-blocking front end
// ---------------------------------------------------------------------------

/**
 * `Transport` backed by one background worker thread.
 *
 * `send` only enqueues; the worker performs the POST and logs the outcome.
 * Dropping the last `HttpTransport` disconnects the channel and lets the
 * worker exit once it has drained what is left.
 */
pub struct HttpTransport {
    sender: Sender<WorkerMsg>,
}

impl HttpTransport {
    /// Spawns the worker thread. Fails only if the OS refuses a new thread.
    pub fn new() -> Result<Self, Error> {
        let (sender, receiver) = crossbeam_channel::bounded(QUEUE_CAPACITY);
        Worker::spawn(receiver, HttpClient::new())?;
        Ok(Self { sender })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: Request) {
        match self.sender.try_send(WorkerMsg::Request(request)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!(target: "raven", "transport queue is full, dropping event");
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::warn!(target: "raven", "transport worker has shut down, dropping event");
            }
        }
    }

    fn flush(&self, timeout: Duration) -> bool {
        let signal = std::sync::Arc::new(FlushSignal::new());

        /*
         * The channel is FIFO: once the worker reaches this marker, every
         * request queued before it has been attempted.
         */
        match self.sender.send_timeout(WorkerMsg::Flush(signal.clone()), timeout) {
            Ok(()) => signal.wait_timeout(timeout),
            Err(_) => false,
        }
    }
}
