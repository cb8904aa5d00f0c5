/**
 * Flush-on-drop guard returned by `raven::init()`.
 *
 * ```ignore
 * fn main() {
 *     let _guard = raven::init("https://key@sentry.example.com/42").unwrap();
 *     // ... application logic ...
 * }   // <-- _guard dropped here, queued events are flushed
 * ```
 *
 * If the flush times out the guard gives up quietly; delivery is
 * best-effort.
 */
use std::sync::Arc;
use std::time::Duration;

use crate::reporter::Reporter;

/// Longest time `Drop` waits for queued events to go out.
pub const FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

pub struct Guard {
    reporter: Arc<Reporter>,
}

impl Guard {
    pub fn new(reporter: Arc<Reporter>) -> Self {
        Self { reporter }
    }

    pub fn reporter(&self) -> &Arc<Reporter> {
        &self.reporter
    }
}

impl Drop for Guard {
    fn drop(&mut self) {
        if !self.reporter.flush(FLUSH_TIMEOUT) {
            tracing::warn!(target: "raven", "flush timed out, some events may not have been sent");
        }
    }
}
