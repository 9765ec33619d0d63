#![allow(dead_code)]

//! Common test utilities shared across integration tests

use jitetw::provider::{RecordingSink, TraceProvider};
use jitetw::Dispatcher;
use std::sync::{Arc, Once};

static INIT: Once = Once::new();

/// Initialize logging for tests (call once per test)
pub fn init() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("off")
            .try_init()
            .ok();
    });
}

/// Dispatcher over a recording sink, registered
pub fn registered_dispatcher(sink: RecordingSink) -> (Arc<RecordingSink>, Dispatcher) {
    init();
    let sink = Arc::new(sink);
    let provider = Arc::new(TraceProvider::new(sink.clone()));
    provider.register().expect("recording sink registers");
    (sink, Dispatcher::new(provider))
}
