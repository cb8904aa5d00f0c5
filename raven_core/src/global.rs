/**
 * Process-wide slots.
 *
 * Nothing in the reporter depends on these; they exist for hosts that want
 * convenience access and for the panic hook, which has no other way to
 * find a reporter.
 *
 * - The **shared** reporter is set once. Later attempts fail.
 * - The **handler** slot receives uncaught panics. Every registration
 *   replaces the previous one.
 */
use std::sync::{Arc, OnceLock, RwLock};

use crate::error::Error;
use crate::reporter::Reporter;

static SHARED: OnceLock<Arc<Reporter>> = OnceLock::new();

static HANDLER: RwLock<Option<Arc<Reporter>>> = RwLock::new(None);

/// Stores the convenience reporter. Fails with `AlreadyInitialized` if one is set.
pub fn set_shared(reporter: Arc<Reporter>) -> Result<(), Error> {
    SHARED.set(reporter).map_err(|_| Error::AlreadyInitialized)
}

pub fn shared() -> Option<Arc<Reporter>> {
    SHARED.get().cloned()
}

/// Registers `reporter` for uncaught panics and returns the one it replaced.
pub fn set_handler(reporter: Arc<Reporter>) -> Option<Arc<Reporter>> {
    let mut slot = HANDLER.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    slot.replace(reporter)
}

pub fn handler() -> Option<Arc<Reporter>> {
    HANDLER
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// Empties the handler slot; later panics are no longer reported.
pub fn clear_handler() -> Option<Arc<Reporter>> {
    HANDLER
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .take()
}
