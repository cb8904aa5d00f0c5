/**
 * The persisted retry buffer.
 *
 * An ordered list of serialized event payloads kept under one namespaced
 * key. Payloads land here when sending is deliberately deferred (a panic
 * is in progress and the process is about to die) and are replayed the
 * next time the reporter drains the buffer.
 *
 * The buffer is read, modified and written back as a unit. Two crash paths
 * appending at the same moment are not guarded against; a process is
 * expected to crash at most once per run.
 */
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::Error;

/// Key under which the buffer is persisted.
pub const RETRY_BUFFER_KEY: &str = "raven.client.exceptions";

// ---------------------------------------------------------------------------
// RetryStore
// ---------------------------------------------------------------------------

/// Durable get/set/clear for the single retry-buffer key.
pub trait RetryStore: Send + Sync {
    /// Returns the stored payloads in insertion order. Missing means empty.
    fn load(&self) -> Result<Vec<String>, Error>;

    fn save(&self, payloads: &[String]) -> Result<(), Error>;

    fn clear(&self) -> Result<(), Error>;

    /// Appends one payload (load, push, save).
    fn append(&self, payload: String) -> Result<(), Error> {
        let mut payloads = self.load()?;
        payloads.push(payload);
        self.save(&payloads)
    }
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/**
 * Keeps the buffer as a JSON array of strings in
 * `<dir>/raven.client.exceptions.json`.
 *
 * Writes go to a sibling temp file which is then renamed over the real one,
 * so a crash halfway through a write leaves the previous buffer intact.
 */
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{RETRY_BUFFER_KEY}.json")),
        }
    }

    /// `<local data dir>/raven`, e.g. `~/.local/share/raven` on Linux.
    pub fn default_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("raven")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where an unreadable buffer file is moved to.
    pub fn corrupt_path(&self) -> PathBuf {
        self.path.with_extension("json.corrupt")
    }
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new(Self::default_dir())
    }
}

impl RetryStore for FileStore {
    /**
     * A file that does not parse is moved aside to `<name>.json.corrupt`
     * and the buffer reads as empty, so later appends and drains still work.
     */
    fn load(&self) -> Result<Vec<String>, Error> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        match serde_json::from_slice(&bytes) {
            Ok(payloads) => Ok(payloads),
            Err(err) => {
                let aside = self.corrupt_path();
                tracing::warn!(
                    target: "raven",
                    path = %self.path.display(),
                    "stored crash reports are unreadable, moving them aside: {err}"
                );
                std::fs::rename(&self.path, &aside)?;
                Ok(Vec::new())
            }
        }
    }

    fn save(&self, payloads: &[String]) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec(payloads)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), Error> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-process buffer. Survives nothing; useful in tests and diskless hosts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    payloads: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payloads(payloads: Vec<String>) -> Self {
        Self {
            payloads: Mutex::new(payloads),
        }
    }
}

impl RetryStore for MemoryStore {
    fn load(&self) -> Result<Vec<String>, Error> {
        Ok(self
            .payloads
            .lock()
            .map(|p| p.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone()))
    }

    fn save(&self, payloads: &[String]) -> Result<(), Error> {
        let mut guard = self.payloads.lock().unwrap_or_else(|p| p.into_inner());
        *guard = payloads.to_vec();
        Ok(())
    }

    fn clear(&self) -> Result<(), Error> {
        self.save(&[])
    }
}
