use std::sync::Arc;

use raven_core::{global, MemoryStore, Reporter, ReporterConfig, SystemInfo, Transport, Request};

struct NullTransport;

impl Transport for NullTransport {
    fn send(&self, _request: Request) {}
}

fn reporter() -> Arc<Reporter> {
    Arc::new(Reporter::new(
        ReporterConfig::default(),
        Arc::new(NullTransport),
        Arc::new(MemoryStore::new()),
        Arc::new(SystemInfo),
    ))
}

#[test]
fn process_wide_slots() {
    assert!(global::handler().is_none());

    let first = reporter();
    let second = reporter();

    first.install_global_handler();
    assert!(Arc::ptr_eq(&global::handler().unwrap(), &first));

    // last registration wins
    second.install_global_handler();
    assert!(Arc::ptr_eq(&global::handler().unwrap(), &second));

    assert!(global::clear_handler().is_some());
    assert!(global::handler().is_none());

    // the shared reporter can be set exactly once
    assert!(global::shared().is_none());
    global::set_shared(first.clone()).unwrap();
    assert!(matches!(
        global::set_shared(second),
        Err(raven_core::Error::AlreadyInitialized)
    ));
    assert!(Arc::ptr_eq(&global::shared().unwrap(), &first));
}
