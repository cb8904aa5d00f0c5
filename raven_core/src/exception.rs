/**
 * Exception reports and call sites.
 *
 * Rust has no exception objects, so an `ExceptionReport` stands in for one:
 * a type name, a reason, and the call stack symbols captured when the
 * report was built. It is produced from an `Error` value or, by
 * `raven_panic`, from a panic.
 */
use std::path::Path;

use crate::protocol::types::Frame;

// ---------------------------------------------------------------------------
// ExceptionReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionReport {
    /// Type name, e.g. `std::io::error::Error` or `panic`.
    pub kind: String,

    pub reason: String,

    /// Demangled function symbols, innermost first.
    pub call_stack: Vec<String>,
}

impl ExceptionReport {
    pub fn new(kind: impl Into<String>, reason: impl Into<String>, call_stack: Vec<String>) -> Self {
        Self {
            kind: kind.into(),
            reason: reason.into(),
            call_stack,
        }
    }

    /**
     * Builds a report from an error value, capturing the call stack at the
     * point of this call.
     *
     * The reason is the error's `Display` output followed by its `source()`
     * chain, joined with `": "`.
     */
    pub fn from_error<E>(error: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        let mut reason = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            reason.push_str(": ");
            reason.push_str(&cause.to_string());
            source = cause.source();
        }

        Self::new(std::any::type_name::<E>(), reason, capture_call_stack())
    }

    /// `"<kind>: <reason>"`, the event message for this report.
    pub fn message(&self) -> String {
        format!("{}: {}", self.kind, self.reason)
    }

    /// One function-only frame per call stack symbol.
    pub fn frames(&self) -> Vec<Frame> {
        self.call_stack
            .iter()
            .map(|symbol| Frame {
                filename: None,
                function: symbol.clone(),
                lineno: None,
            })
            .collect()
    }
}

/**
 * Captures the current call stack as demangled symbol names.
 *
 * Leading frames that belong to the backtrace machinery or to this crate
 * are dropped so the stack starts at the caller. Inside a panic hook the
 * caller is the function that panicked.
 */
pub fn capture_call_stack() -> Vec<String> {
    let bt = backtrace::Backtrace::new();
    convert_backtrace(&bt)
}

/// Converts a resolved backtrace into symbol names, skipping internal frames.
pub fn convert_backtrace(bt: &backtrace::Backtrace) -> Vec<String> {
    let symbols = bt
        .frames()
        .iter()
        .flat_map(|frame| frame.symbols())
        .filter_map(|symbol| symbol.name().map(|n| format!("{n:#}")))
        .collect();

    trim_leading_frames(symbols)
}

/**
 * Drops everything above the first frame that belongs to the caller.
 *
 * During a panic the stack runs hook, `catch_unwind` and boxed-closure
 * frames down into the std panic entry points before it reaches the
 * panicking function, so the cut goes just below the panic entry run.
 * Outside a panic the internal prefix is skipped.
 */
fn trim_leading_frames(mut symbols: Vec<String>) -> Vec<String> {
    let start = match symbols.iter().position(|name| is_panic_entry(name)) {
        Some(entry) => symbols[entry..]
            .iter()
            .position(|name| !is_panic_machinery(name))
            .map_or(symbols.len(), |offset| entry + offset),
        None => symbols
            .iter()
            .position(|name| !is_internal(name))
            .unwrap_or(symbols.len()),
    };

    symbols.drain(..start);
    symbols
}

fn is_internal(name: &str) -> bool {
    name.starts_with("backtrace::")
        || name.starts_with("raven_core::")
        || name.starts_with("raven_panic::")
        || name.starts_with("raven::")
        || name.starts_with("std::panicking")
        || name.starts_with("core::panicking")
}

/// Frames that only exist while a panic is being raised.
fn is_panic_entry(name: &str) -> bool {
    name.starts_with("std::panicking::rust_panic_with_hook")
        || name.starts_with("std::panicking::begin_panic")
        || name.starts_with("core::panicking::")
        || name == "rust_begin_unwind"
}

fn is_panic_machinery(name: &str) -> bool {
    is_panic_entry(name)
        || name.starts_with("std::panicking::")
        || name.starts_with("std::rt::")
        || name.starts_with("core::panic::")
        || name.contains("__rust_end_short_backtrace")
}

// ---------------------------------------------------------------------------
// CallSite
// ---------------------------------------------------------------------------

/**
 * Where a capture was made: function, file and line.
 *
 * Usually built with the `call_site!()` macro.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub function: String,
    pub file: String,
    pub line: u32,
}

impl CallSite {
    pub fn new(function: impl Into<String>, file: impl Into<String>, line: u32) -> Self {
        Self {
            function: function.into(),
            file: file.into(),
            line,
        }
    }

    /// Only call sites with a function, a file and a positive line count.
    pub fn is_complete(&self) -> bool {
        !self.function.is_empty() && !self.file.is_empty() && self.line > 0
    }

    /// Last component of `file`.
    pub fn file_name(&self) -> &str {
        Path::new(&self.file)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(&self.file)
    }

    pub fn frame(&self) -> Frame {
        Frame {
            filename: Some(self.file_name().to_string()),
            function: self.function.clone(),
            lineno: Some(self.line),
        }
    }

    /// `"<function> in <file name>"`.
    pub fn culprit(&self) -> String {
        format!("{} in {}", self.function, self.file_name())
    }
}

/**
 * Builds a `CallSite` for the enclosing function.
 *
 * ```
 * fn load_config() -> raven_core::CallSite {
 *     raven_core::call_site!()
 * }
 * let site = load_config();
 * assert!(site.function.ends_with("load_config"));
 * assert!(site.line > 0);
 * ```
 */
#[macro_export]
macro_rules! call_site {
    () => {{
        fn __here() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = __type_name_of(__here);
        $crate::CallSite::new(
            name.strip_suffix("::__here").unwrap_or(name),
            file!(),
            line!(),
        )
    }};
}
