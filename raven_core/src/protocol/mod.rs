/*!
 * Protocol layer: what we send and where.
 *
 * - `dsn`: parses the connection string into a collector endpoint and credentials
 * - `types`: the event document, frames, levels and the extra-value type
 * - `auth`: the `X-Sentry-Auth` header
 * - `constants`: protocol version, client name, platform
 */

pub mod auth;
pub mod constants;
pub mod dsn;
pub mod types;
