//! Process-wide bridge between the engine callback and the trace provider.
//!
//! Hosts call [`init`] once during startup, pass [`on_code_event`] (or a thin
//! wrapper around it) to the engine as its code event handler, and call
//! [`teardown`] during orderly shutdown. The global is never dropped, so
//! skipping [`teardown`] leaves the registration to process exit.

use crate::dispatcher::{Dispatch, Dispatcher};
use crate::encoder::Encoder;
use crate::event::CodeEvent;
use crate::logging::initialize_logging;
use crate::settings::{ProviderSettings, Settings};
use anyhow::Result;
use jitetw_provider::{TraceProvider, TraceSink};
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};

static BRIDGE: OnceLock<Bridge> = OnceLock::new();

/// Provider plus dispatcher, wired together
#[derive(Debug)]
pub struct Bridge {
    dispatcher: Dispatcher,
}

impl Bridge {
    pub fn with_sink(sink: Arc<dyn TraceSink>) -> Self {
        let provider = Arc::new(TraceProvider::new(sink));
        Self {
            dispatcher: Dispatcher::new(provider),
        }
    }

    pub fn from_settings(settings: &ProviderSettings) -> Result<Self> {
        let sink = settings.backend.create_sink()?;
        Ok(Self::with_sink(sink))
    }

    /// Register the provider. Returns whether tracing is live; a failed
    /// registration is logged and leaves every event disabled.
    pub fn init(&self) -> bool {
        match self.provider().register() {
            Ok(()) => true,
            Err(e) => {
                warn!("Tracing disabled: {}", e);
                false
            }
        }
    }

    pub fn teardown(&self) {
        // Unregistration errors are already logged by the provider
        let _ = self.provider().unregister();
    }

    pub fn on_code_event(&self, event: &CodeEvent<'_>) -> Dispatch {
        self.dispatcher.handle(event)
    }

    pub fn provider(&self) -> &Arc<TraceProvider> {
        self.dispatcher.provider()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn encoder(&self) -> &Encoder {
        self.dispatcher.encoder()
    }
}

/// Create (first call only) and register the process-wide bridge
pub fn init(settings: &Settings) -> Result<&'static Bridge> {
    initialize_logging(&settings.logging)?;

    let bridge = match BRIDGE.get() {
        Some(bridge) => bridge,
        None => {
            let bridge = Bridge::from_settings(&settings.provider)?;
            BRIDGE.get_or_init(|| bridge)
        }
    };

    if bridge.init() {
        info!(
            "jitetw bridge ready ({} sink)",
            bridge.provider().sink_name()
        );
    }
    Ok(bridge)
}

pub fn global() -> Option<&'static Bridge> {
    BRIDGE.get()
}

/// Release the process-wide registration; no-op before [`init`]
pub fn teardown() {
    if let Some(bridge) = BRIDGE.get() {
        bridge.teardown();
    }
}

/// Engine callback entry point; events before [`init`] are ignored
pub fn on_code_event(event: &CodeEvent<'_>) -> Dispatch {
    match BRIDGE.get() {
        Some(bridge) => bridge.on_code_event(event),
        None => Dispatch::Unregistered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jitetw_provider::RecordingSink;

    #[test]
    fn test_bridge_lifecycle() {
        let sink = Arc::new(RecordingSink::new());
        let bridge = Bridge::with_sink(sink.clone());
        let event = CodeEvent::code_added(1, 2, 3, "f");

        assert_eq!(bridge.on_code_event(&event), Dispatch::Unregistered);
        assert!(bridge.init());
        assert!(matches!(
            bridge.on_code_event(&event),
            Dispatch::MethodLoad(_)
        ));
        bridge.teardown();
        assert_eq!(bridge.on_code_event(&event), Dispatch::Unregistered);

        assert_eq!(sink.registration_count(), 1);
        assert_eq!(sink.unregistration_count(), 1);
        assert_eq!(sink.write_count(), 1);
    }

    #[test]
    fn test_init_reports_failure() {
        let sink = Arc::new(RecordingSink::new());
        sink.fail_registration(5);
        let bridge = Bridge::with_sink(sink);
        assert!(!bridge.init());
        assert!(!bridge.provider().is_registered());
    }
}
