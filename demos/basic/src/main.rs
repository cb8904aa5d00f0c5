/**
 * Minimal harness for the raven client.
 *
 * Set SENTRY_DSN (or leave it unset and pass --debug to only log payloads),
 * then run:
 *
 *   cargo run -p raven_demo
 *   cargo run -p raven_demo -- --debug    # log payloads instead of sending
 *   cargo run -p raven_demo -- --panic    # store a crash report for the next run
 *
 * RUST_LOG=raven=debug shows what the client is doing.
 */
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("raven=info")))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let test_panic = args.iter().any(|a| a == "--panic");

    let mut options = raven::Options::from_env();
    options.debug |= args.iter().any(|a| a == "--debug");
    options.release = Some(env!("CARGO_PKG_VERSION").into());
    options.logger = Some("raven_demo".into());

    let _guard = match raven::init(options) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("[demo] {err}");
            std::process::exit(1);
        }
    };

    raven::capture_message(
        "Hello from the raven demo",
        raven::CaptureOptions::default().at(raven::call_site!()),
    );
    println!("[demo] Sent a message");

    if let Err(e) = std::fs::read_to_string("/nonexistent/path.txt") {
        raven::capture_error(&e, Some(raven::call_site!()));
        raven::capture_exception(&e, raven::CaptureOptions::default().tag("source", "demo"));
        println!("[demo] Sent an io::Error: {e}");
    }

    if test_panic {
        println!("[demo] Panicking; the report is sent on the next run");
        panic!("Test panic from the raven demo");
    }

    println!("[demo] Done. Queued events are flushed when _guard drops.");
}
