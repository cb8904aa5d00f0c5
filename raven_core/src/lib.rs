/*!
 * Raven Core: the client engine.
 *
 * Parses the DSN, builds and encodes events, delivers them over HTTP from a
 * background worker and keeps the crash-time retry buffer. End users
 * usually depend on the `raven` facade crate instead, which wires the
 * engine together with the panic hook.
 *
 * # Module structure
 *
 * - `protocol/`: what we send: DSN, event document, auth header, constants
 * - `transport/`: how we deliver: the `Transport` seam, HTTP client, worker
 * - `reporter`: capture operations, context merge, dispatch
 * - `config`: reporter configuration and per-capture options
 * - `store`: the persisted retry buffer
 * - `exception`: exception reports and call sites
 * - `device`: OS/device info for default tags
 * - `global`: optional process-wide slots
 * - `guard`: RAII flush-on-drop
 */

pub mod config;
pub mod device;
pub mod error;
pub mod exception;
pub mod global;
mod guard;
pub mod protocol;
pub mod reporter;
pub mod store;
pub mod transport;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use config::{CaptureOptions, ReporterConfig};
pub use device::{DeviceInfo, SystemInfo};
pub use error::{DsnError, Error};
pub use exception::{CallSite, ExceptionReport};
pub use guard::{Guard, FLUSH_TIMEOUT};
pub use protocol::constants::{CLIENT_NAME, PLATFORM, PROTOCOL_VERSION};
pub use protocol::dsn::Dsn;
pub use protocol::types::{Event, Extra, Frame, Level, Tags, Value};
pub use reporter::Reporter;
pub use store::{FileStore, MemoryStore, RetryStore, RETRY_BUFFER_KEY};
pub use transport::{HttpTransport, Request, Transport};
