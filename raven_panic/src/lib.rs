/*!
 * Raven Panic Hook: routes panics to the registered global handler.
 *
 * `install()` registers a `std::panic::set_hook` handler. When a panic
 * occurs, it:
 *
 * 1. Extracts the panic message, source location and thread name.
 * 2. Captures the call stack at the panic site.
 * 3. Builds an `ExceptionReport` with kind `"panic"` and hands it to the
 *    reporter in `raven_core::global::handler()` as an *uncaught*
 *    exception, so the payload is stored for the next start instead of
 *    racing process teardown on the network.
 * 4. Calls the previous panic hook, so the default stderr output stays.
 *
 * With no handler registered the hook only forwards to the previous one.
 *
 * # Recursion safety
 *
 * A `thread_local` flag breaks the loop if reporting the panic panics.
 */

use std::cell::Cell;
use std::panic;
use std::panic::PanicHookInfo;
use std::sync::atomic::{AtomicBool, Ordering};

use raven_core::exception::capture_call_stack;
use raven_core::{global, ExceptionReport};

// ---------------------------------------------------------------------------
// Guards
// ---------------------------------------------------------------------------

/// Makes `install()` idempotent so hooks never stack.
static INSTALLED: AtomicBool = AtomicBool::new(false);

thread_local! {
    static IN_HOOK: Cell<bool> = const { Cell::new(false) };
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/**
 * Installs the raven panic hook.
 *
 * Idempotent: subsequent calls are no-ops. The hook looks the handler up
 * at panic time, so it may be installed before or after
 * `Reporter::install_global_handler`.
 */
pub fn install() {
    if INSTALLED.swap(true, Ordering::SeqCst) {
        return;
    }

    let previous_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        let is_recursive = IN_HOOK.with(|flag| flag.replace(true));

        if !is_recursive {
            let _ = panic::catch_unwind(panic::AssertUnwindSafe(|| {
                handle_panic(info);
            }));

            IN_HOOK.with(|flag| flag.set(false));
        }

        previous_hook(info);
    }));
}

pub fn is_installed() -> bool {
    INSTALLED.load(Ordering::SeqCst)
}

// ---------------------------------------------------------------------------
// Internal: build and defer the panic report
// ---------------------------------------------------------------------------

fn handle_panic(info: &PanicHookInfo) {
    let Some(reporter) = global::handler() else {
        return;
    };

    let report = ExceptionReport::new("panic", panic_reason(info), capture_call_stack());
    tracing::debug!(target: "raven", reason = %report.reason, "storing panic report");
    reporter.capture_uncaught_exception(&report);
}

/// `"<message> at <file>:<line> [thread: <name>]"`.
fn panic_reason(info: &PanicHookInfo) -> String {
    let message = match info.payload().downcast_ref::<&str>() {
        Some(s) => (*s).to_string(),
        None => match info.payload().downcast_ref::<String>() {
            Some(s) => s.clone(),
            None => "<unknown panic>".to_string(),
        },
    };

    let location = info
        .location()
        .map(|loc| format!(" at {}:{}", loc.file(), loc.line()))
        .unwrap_or_default();

    let thread_name = std::thread::current()
        .name()
        .unwrap_or("<unnamed>")
        .to_string();

    format!("{message}{location} [thread: {thread_name}]")
}
