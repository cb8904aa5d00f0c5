/**
 * Reporter configuration and per-capture options.
 *
 * `ReporterConfig` holds the ambient state attached to every event:
 *
 * - **Extra**: arbitrary context values.
 * - **Tags**: indexed string pairs, seeded with defaults for build version,
 *   OS version and device model whenever the tag map is set.
 * - **User**: the current user.
 * - **Logger**: the name of the originating logger.
 *
 * Merging is shallow: per-capture keys override the configured ones.
 */
use std::collections::BTreeMap;

use crate::device::DeviceInfo;
use crate::exception::CallSite;
use crate::protocol::dsn::Dsn;
use crate::protocol::types::{Extra, Level, Tags};

pub const TAG_BUILD_VERSION: &str = "Build version";
pub const TAG_OS_VERSION: &str = "OS version";
pub const TAG_DEVICE_MODEL: &str = "Device model";

// ---------------------------------------------------------------------------
// ReporterConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ReporterConfig {
    /// Where events go. Without one the reporter only works in debug mode.
    pub descriptor: Option<Dsn>,

    pub extra: Extra,

    pub tags: Tags,

    pub logger: Option<String>,

    pub user: Option<BTreeMap<String, String>>,

    /// Write payloads to the `raven::debug` log target instead of sending them.
    pub debug: bool,

    /// Host application version, reported as the `Build version` tag.
    pub release: Option<String>,
}

impl ReporterConfig {
    pub fn with_dsn(descriptor: Dsn) -> Self {
        Self {
            descriptor: Some(descriptor),
            ..Default::default()
        }
    }

    /**
     * Fills in the default tags that are not already present.
     *
     * Tags the host set explicitly always win; a missing info source
     * simply leaves its tag out.
     */
    pub fn apply_default_tags(&mut self, device: &dyn DeviceInfo) {
        if let Some(release) = &self.release {
            self.tags
                .entry(TAG_BUILD_VERSION.to_string())
                .or_insert_with(|| release.clone());
        }
        if !self.tags.contains_key(TAG_OS_VERSION) {
            if let Some(os) = device.os_version() {
                self.tags.insert(TAG_OS_VERSION.to_string(), os);
            }
        }
        if !self.tags.contains_key(TAG_DEVICE_MODEL) {
            if let Some(model) = device.device_model() {
                self.tags.insert(TAG_DEVICE_MODEL.to_string(), model);
            }
        }
    }

    /// Configured extra overlaid with `additional`.
    pub fn merged_extra(&self, additional: &Extra) -> Extra {
        let mut extra = self.extra.clone();
        extra.extend(additional.iter().map(|(k, v)| (k.clone(), v.clone())));
        extra
    }

    /// Configured tags overlaid with `additional`.
    pub fn merged_tags(&self, additional: &Tags) -> Tags {
        let mut tags = self.tags.clone();
        tags.extend(additional.iter().map(|(k, v)| (k.clone(), v.clone())));
        tags
    }
}

// ---------------------------------------------------------------------------
// CaptureOptions
// ---------------------------------------------------------------------------

/**
 * Optional parameters of a single capture.
 *
 * ```
 * use raven_core::{CaptureOptions, Level};
 *
 * let options = CaptureOptions {
 *     level: Level::Warning,
 *     ..Default::default()
 * }
 * .extra("attempt", 3)
 * .tag("subsystem", "sync");
 * assert_eq!(options.tags["subsystem"], "sync");
 * ```
 */
#[derive(Debug, Clone, Default)]
pub struct CaptureOptions {
    /// Defaults to `Info`. Exceptions are always reported as `Fatal`.
    pub level: Level,

    /// Per-event extra; wins over the configured extra on key conflicts.
    pub extra: Extra,

    /// Per-event tags; win over the configured tags on key conflicts.
    pub tags: Tags,

    /// Adds a single frame and a culprit when complete.
    pub call_site: Option<CallSite>,
}

impl CaptureOptions {
    pub fn level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    pub fn extra(mut self, key: impl Into<String>, value: impl Into<crate::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn at(mut self, call_site: CallSite) -> Self {
        self.call_site = Some(call_site);
        self
    }
}
