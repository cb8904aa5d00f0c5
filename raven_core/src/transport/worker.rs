/**
 * Background worker thread that drains queued requests and POSTs them.
 *
 * ```text
 *  ┌──────────────┐     bounded channel     ┌─────────────────┐
 *  │   Reporter   │ ───── WorkerMsg ──────► │  raven-worker   │
 *  │ (any thread) │                         │  (single)       │
 *  └──────────────┘                         └────────┬────────┘
 *                                                    │
 *                                           HttpClient::deliver()
 *                                                    │
 *                                             ┌──────▼──────┐
 *                                             │  Collector  │
 *                                             └─────────────┘
 * ```
 *
 * The loop runs until every sender is dropped.
 */
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

use crossbeam_channel::Receiver;

use super::http::HttpClient;
use super::Request;
use crate::error::Error;

// ---------------------------------------------------------------------------
// WorkerMsg
// ---------------------------------------------------------------------------

pub enum WorkerMsg {
    /// A request ready to be POSTed.
    Request(Request),

    /**
     * Flush marker. The worker signals it once every message queued
     * before it has been processed.
     */
    Flush(Arc<FlushSignal>),
}

// ---------------------------------------------------------------------------
// FlushSignal
// ---------------------------------------------------------------------------

/**
 * `Mutex<bool>` + `Condvar` pair used to block a flushing caller until the
 * worker reaches its marker.
 */
pub struct FlushSignal {
    mutex: Mutex<bool>,
    condvar: Condvar,
}

impl FlushSignal {
    pub fn new() -> Self {
        Self {
            mutex: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    /// Marks the flush as done and wakes every waiter.
    pub fn notify(&self) {
        if let Ok(mut done) = self.mutex.lock() {
            *done = true;
            self.condvar.notify_all();
        }
    }

    /// Waits for `notify`. Returns `false` if `timeout` expired first.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        if let Ok(guard) = self.mutex.lock() {
            let result = self
                .condvar
                .wait_timeout_while(guard, timeout, |done| !*done);

            match result {
                Ok((_, timeout_result)) => !timeout_result.timed_out(),
                Err(_) => false,
            }
        } else {
            false
        }
    }
}

impl Default for FlushSignal {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

pub struct Worker;

impl Worker {
    /**
     * Spawns the worker thread. No join handle is kept: the thread exits on
     * its own when the channel disconnects, and `flush` covers the
     * "drain before exit" case.
     */
    pub fn spawn(receiver: Receiver<WorkerMsg>, client: HttpClient) -> Result<(), Error> {
        thread::Builder::new()
            .name("raven-worker".into())
            .spawn(move || {
                /*
                 * A panic inside the HTTP stack must not kill the thread
                 * silently.
                 */
                let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    Self::run_loop(&receiver, &client);
                }));

                if result.is_err() {
                    tracing::error!(target: "raven", "transport worker panicked, events will be dropped");
                }
            })
            .map(|_| ())
            .map_err(|e| Error::Worker(e.to_string()))
    }

    fn run_loop(receiver: &Receiver<WorkerMsg>, client: &HttpClient) {
        while let Ok(msg) = receiver.recv() {
            match msg {
                WorkerMsg::Request(request) => match client.deliver(&request) {
                    Ok(()) => {
                        tracing::debug!(target: "raven", url = %request.url, "event sent");
                    }
                    Err(err) => {
                        tracing::warn!(target: "raven", url = %request.url, "{err}");
                    }
                },
                WorkerMsg::Flush(signal) => signal.notify(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_signal_times_out_without_notify() {
        let signal = FlushSignal::new();
        assert!(!signal.wait_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn test_flush_signal_notified_from_other_thread() {
        let signal = Arc::new(FlushSignal::new());
        let remote = signal.clone();
        let handle = thread::spawn(move || remote.notify());

        assert!(signal.wait_timeout(Duration::from_secs(5)));
        handle.join().unwrap();
    }

    #[test]
    fn test_worker_acknowledges_flush_after_channel_drains() {
        let (sender, receiver) = crossbeam_channel::bounded(4);
        Worker::spawn(receiver, HttpClient::new()).unwrap();

        let signal = Arc::new(FlushSignal::new());
        sender.send(WorkerMsg::Flush(signal.clone())).unwrap();
        assert!(signal.wait_timeout(Duration::from_secs(5)));
    }
}
