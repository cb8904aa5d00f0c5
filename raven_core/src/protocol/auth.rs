/**
 * The `X-Sentry-Auth` header.
 *
 * Format:
 * `Sentry sentry_version=4, sentry_client=raven-rust/x.y.z,
 *  sentry_timestamp=<unix seconds>, sentry_key=<public>, sentry_secret=<secret>`
 */
use super::constants::{CLIENT_NAME, PROTOCOL_VERSION};
use super::dsn::Dsn;

/// Builds the header value for a request sent at `timestamp` (unix seconds).
pub fn auth_header(dsn: &Dsn, timestamp: i64) -> String {
    format!(
        "Sentry sentry_version={PROTOCOL_VERSION}, sentry_client={CLIENT_NAME}, \
         sentry_timestamp={timestamp}, sentry_key={}, sentry_secret={}",
        dsn.public_key(),
        dsn.secret_key()
    )
}
