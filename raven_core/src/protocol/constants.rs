/**
 * Protocol-wide constants.
 *
 * These values are baked into every request and identify this client
 * to the collector.
 */

/// Version of the collector's store protocol spoken by this client.
pub const PROTOCOL_VERSION: u32 = 4;

/// Client identifier sent as `sentry_client` in the auth header.
/// Derived at compile time from the `raven_core` package version in `Cargo.toml`.
pub const CLIENT_NAME: &str = concat!("raven-rust/", env!("CARGO_PKG_VERSION"));

/// Fixed `platform` value of every event document.
pub const PLATFORM: &str = "rust";

/// Name of the authentication header.
pub const AUTH_HEADER: &str = "X-Sentry-Auth";
