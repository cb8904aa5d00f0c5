/**
 * The event reporter: builds, encodes and dispatches events.
 *
 * Every capture runs synchronously on the caller's thread up to the point
 * where the request is handed to the `Transport`:
 *
 * 1. Snapshot the configuration.
 * 2. Merge configured and per-call extra/tags (per-call keys win).
 * 3. Build the `Event` and encode it to JSON.
 * 4. Debug mode: log the payload. Otherwise: hand it to the transport, or
 *    to the retry buffer for uncaught panics.
 *
 * Nothing here returns an error to the caller. An event that cannot be
 * encoded, sent or stored is logged and lost.
 */
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use crate::config::{CaptureOptions, ReporterConfig};
use crate::device::DeviceInfo;
use crate::exception::{CallSite, ExceptionReport};
use crate::global;
use crate::protocol::auth::auth_header;
use crate::protocol::constants::{AUTH_HEADER, PLATFORM};
use crate::protocol::dsn::Dsn;
use crate::protocol::types::{Event, ExceptionInfo, Extra, Frame, Level, Stacktrace, Tags};
use crate::store::RetryStore;
use crate::transport::{Request, Transport};

/// Timestamp layout of the `timestamp` field: UTC, seconds, no zone suffix.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

// ---------------------------------------------------------------------------
// Reporter
// ---------------------------------------------------------------------------

/**
 * Owns the configuration and the three collaborators: transport, retry
 * store and device-info source.
 *
 * Construct one at the composition root and pass it around as
 * `Arc<Reporter>`. The process-wide slots in `global` are optional.
 */
pub struct Reporter {
    config: RwLock<ReporterConfig>,
    transport: Arc<dyn Transport>,
    store: Arc<dyn RetryStore>,
    device: Arc<dyn DeviceInfo>,
}

/// Everything that differs between the capture entry points.
struct EventParts<'a> {
    message: String,
    level: Level,
    extra: &'a Extra,
    tags: &'a Tags,
    culprit: String,
    frames: Vec<Frame>,
    exception: Option<ExceptionInfo>,
}

impl Reporter {
    /// Builds a reporter; default tags are applied to `config.tags` right away.
    pub fn new(
        mut config: ReporterConfig,
        transport: Arc<dyn Transport>,
        store: Arc<dyn RetryStore>,
        device: Arc<dyn DeviceInfo>,
    ) -> Self {
        config.apply_default_tags(device.as_ref());
        Self {
            config: RwLock::new(config),
            transport,
            store,
            device,
        }
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    /// A copy of the current configuration.
    pub fn config(&self) -> ReporterConfig {
        self.config.read().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn set_descriptor(&self, descriptor: Option<Dsn>) {
        self.update(|config| config.descriptor = descriptor);
    }

    pub fn set_extra(&self, extra: Extra) {
        self.update(|config| config.extra = extra);
    }

    /// Replaces the tag map, then fills in any missing default tags.
    pub fn set_tags(&self, tags: Tags) {
        let device = self.device.clone();
        self.update(|config| {
            config.tags = tags;
            config.apply_default_tags(device.as_ref());
        });
    }

    /// Sets one tag, then fills in any missing default tags.
    pub fn set_tag(&self, key: impl Into<String>, value: impl Into<String>) {
        let device = self.device.clone();
        let (key, value) = (key.into(), value.into());
        self.update(|config| {
            config.tags.insert(key, value);
            config.apply_default_tags(device.as_ref());
        });
    }

    pub fn set_user(&self, user: Option<std::collections::BTreeMap<String, String>>) {
        self.update(|config| config.user = user);
    }

    pub fn set_logger(&self, logger: Option<String>) {
        self.update(|config| config.logger = logger);
    }

    pub fn set_debug(&self, debug: bool) {
        self.update(|config| config.debug = debug);
    }

    fn update(&self, f: impl FnOnce(&mut ReporterConfig)) {
        let mut config = self.config.write().unwrap_or_else(|p| p.into_inner());
        f(&mut config);
    }

    // -----------------------------------------------------------------------
    // Capture
    // -----------------------------------------------------------------------

    /**
     * Reports a plain message.
     *
     * A complete `options.call_site` adds a single frame and sets the
     * culprit to `"<function> in <file name>"`.
     */
    pub fn capture_message(&self, message: &str, options: CaptureOptions) {
        let config = self.config();
        if !is_active(&config) {
            return;
        }

        let (frames, culprit) = match options.call_site.as_ref().filter(|s| s.is_complete()) {
            Some(site) => (vec![site.frame()], site.culprit()),
            None => (Vec::new(), String::new()),
        };

        let event = self.build_event(
            &config,
            EventParts {
                message: message.to_string(),
                level: options.level,
                extra: &options.extra,
                tags: &options.tags,
                culprit,
                frames,
                exception: None,
            },
        );

        if let Some(body) = encode(&event) {
            self.dispatch(&config, body);
        }
    }

    /// Reports an error's `Display` text as an `Error`-level message.
    pub fn capture_error(&self, error: &dyn std::error::Error, call_site: Option<CallSite>) {
        self.capture_message(
            &error.to_string(),
            CaptureOptions {
                level: Level::Error,
                call_site,
                ..Default::default()
            },
        );
    }

    /**
     * Reports a handled exception and sends it right away.
     *
     * The event is always `Fatal`; `options.level` is ignored. A complete
     * call site is put in front of the exception's own frames.
     */
    pub fn capture_exception(&self, exception: &ExceptionReport, options: CaptureOptions) {
        let config = self.config();
        if !is_active(&config) {
            return;
        }

        if let Some(body) = self.exception_payload(&config, exception, &options) {
            self.dispatch(&config, body);
        }
    }

    /**
     * Reports an exception that is about to take the process down.
     *
     * The payload is appended to the retry buffer instead of being sent:
     * a request started now would most likely never complete. It goes out
     * the next time the buffer is drained.
     */
    pub fn capture_uncaught_exception(&self, exception: &ExceptionReport) {
        let config = self.config();
        if !is_active(&config) {
            return;
        }

        let Some(body) = self.exception_payload(&config, exception, &CaptureOptions::default())
        else {
            return;
        };

        match String::from_utf8(body) {
            Ok(payload) => {
                if let Err(err) = self.store.append(payload) {
                    tracing::warn!(target: "raven", "failed to persist crash report: {err}");
                }
            }
            Err(err) => tracing::warn!(target: "raven", "crash report is not UTF-8: {err}"),
        }
    }

    // -----------------------------------------------------------------------
    // Retry buffer and global handler
    // -----------------------------------------------------------------------

    /**
     * Registers this reporter as the process-wide handler for uncaught
     * panics (replacing any earlier one) and drains the retry buffer.
     *
     * The panic hook that feeds the handler lives in `raven_panic`;
     * `raven::init` installs both.
     *
     * Returns the number of stored payloads handed on.
     */
    pub fn install_global_handler(self: &Arc<Self>) -> usize {
        global::set_handler(Arc::clone(self));
        self.flush_stored()
    }

    /**
     * Sends every stored payload in the order it was stored, then clears
     * the buffer.
     *
     * Best-effort: the buffer is cleared once everything has been handed to
     * the transport, so a payload whose delivery then fails is gone. Without
     * a DSN (and outside debug mode) the buffer is left untouched. Payloads
     * that do not fit in the transport queue are dropped like any other
     * overflow.
     */
    pub fn flush_stored(&self) -> usize {
        let config = self.config();
        if !is_active(&config) {
            return 0;
        }

        let payloads = match self.store.load() {
            Ok(payloads) => payloads,
            Err(err) => {
                tracing::warn!(target: "raven", "failed to read stored crash reports: {err}");
                return 0;
            }
        };

        if payloads.is_empty() {
            return 0;
        }

        let count = payloads.len();
        for payload in payloads {
            self.dispatch(&config, payload.into_bytes());
        }

        if let Err(err) = self.store.clear() {
            tracing::warn!(target: "raven", "failed to clear stored crash reports: {err}");
        }

        tracing::info!(target: "raven", count, "replayed stored crash reports");
        count
    }

    /// Waits for the transport to finish what it has been handed.
    pub fn flush(&self, timeout: Duration) -> bool {
        self.transport.flush(timeout)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn exception_payload(
        &self,
        config: &ReporterConfig,
        exception: &ExceptionReport,
        options: &CaptureOptions,
    ) -> Option<Vec<u8>> {
        let mut frames: Vec<Frame> = options
            .call_site
            .iter()
            .filter(|site| site.is_complete())
            .map(CallSite::frame)
            .collect();
        frames.extend(exception.frames());

        let event = self.build_event(
            config,
            EventParts {
                message: exception.message(),
                level: Level::Fatal,
                extra: &options.extra,
                tags: &options.tags,
                culprit: String::new(),
                frames,
                exception: Some(ExceptionInfo {
                    kind: exception.kind.clone(),
                    value: exception.reason.clone(),
                }),
            },
        );

        encode(&event)
    }

    fn build_event(&self, config: &ReporterConfig, parts: EventParts<'_>) -> Event {
        Event {
            event_id: Uuid::new_v4().simple().to_string(),
            project: config
                .descriptor
                .as_ref()
                .map(|dsn| dsn.project_id().to_string())
                .unwrap_or_default(),
            timestamp: Utc::now().format(TIMESTAMP_FORMAT).to_string(),
            level: parts.level,
            platform: PLATFORM.to_string(),
            extra: config.merged_extra(parts.extra),
            tags: config.merged_tags(parts.tags),
            logger: config.logger.clone().unwrap_or_default(),
            message: parts.message,
            culprit: parts.culprit,
            stacktrace: Stacktrace {
                frames: parts.frames,
            },
            exception: parts.exception,
            user: config.user.clone(),
        }
    }

    fn dispatch(&self, config: &ReporterConfig, body: Vec<u8>) {
        if config.debug {
            tracing::info!(
                target: "raven::debug",
                payload = %String::from_utf8_lossy(&body),
                "event not sent (debug mode)"
            );
            return;
        }

        match &config.descriptor {
            Some(dsn) => self.transport.send(build_request(dsn, body, Utc::now().timestamp())),
            None => tracing::debug!(target: "raven", "no DSN configured, dropping event"),
        }
    }
}

/// A reporter does something only with a DSN or in debug mode.
fn is_active(config: &ReporterConfig) -> bool {
    if config.descriptor.is_none() && !config.debug {
        tracing::debug!(target: "raven", "reporter has no DSN, ignoring capture");
        return false;
    }
    true
}

fn encode(event: &Event) -> Option<Vec<u8>> {
    match event.to_json() {
        Ok(body) => Some(body),
        Err(err) => {
            tracing::warn!(target: "raven", event_id = %event.event_id, "dropping event: {err}");
            None
        }
    }
}

/// The POST for one payload, stamped with `timestamp` in the auth header.
pub fn build_request(dsn: &Dsn, body: Vec<u8>, timestamp: i64) -> Request {
    Request {
        url: dsn.endpoint().to_string(),
        headers: vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Content-Length".to_string(), body.len().to_string()),
            (AUTH_HEADER.to_string(), auth_header(dsn, timestamp)),
        ],
        body,
    }
}
