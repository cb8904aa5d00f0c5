/**
 * Error taxonomy for the raven client.
 *
 * Only configuration problems are ever handed back to a caller. Every
 * later-stage failure (encoding, delivery, the retry buffer on disk) is
 * logged and swallowed inside the reporter, because reporting an error
 * must never take the host application down with it.
 */
use thiserror::Error;

/// Why a DSN string could not be turned into a `Dsn`.
#[derive(Debug, Error)]
pub enum DsnError {
    #[error("DSN is not a valid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unsupported DSN scheme `{0}` (expected http or https)")]
    UnsupportedScheme(String),

    #[error("DSN has no host")]
    MissingHost,

    #[error("DSN path has no project id")]
    MissingProjectId,
}

#[derive(Debug, Error)]
pub enum Error {
    /// The DSN is unusable. The reporter stays unconfigured.
    #[error("invalid configuration: {0}")]
    Configuration(#[from] DsnError),

    /// An event document held a value JSON cannot express.
    #[error("failed to encode event: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Network-level failure talking to the collector.
    #[error("failed to deliver event: {0}")]
    Transport(String),

    /// The collector answered with a non-2xx status.
    #[error("collector responded with HTTP {code}: {body}")]
    Status { code: u16, body: String },

    /// Reading or writing the persisted retry buffer failed.
    #[error("retry buffer I/O failed: {0}")]
    Store(#[from] std::io::Error),

    #[error("raven is already initialized")]
    AlreadyInitialized,

    /// The background delivery thread could not be started.
    #[error("transport worker unavailable: {0}")]
    Worker(String),
}

impl From<ureq::Error> for Error {
    fn from(err: ureq::Error) -> Self {
        Error::Transport(err.to_string())
    }
}
