use crate::encoder::{Emission, Encoder, MethodLoad};
use crate::event::{CodeCategory, CodeEvent, CodeEventKind};
use jitetw_provider::TraceProvider;
use std::sync::Arc;
use tracing::trace;

/// What the dispatcher did with a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Provider not registered, event ignored
    Unregistered,
    /// Not JIT code, event ignored
    NotJit,
    MethodLoad(Emission),
    /// Kind with no event mapping (moves, removals, line info)
    Unhandled(CodeEventKind),
}

/// Maps engine code notifications onto encoder calls.
///
/// Only `CodeAdded` is forwarded. Removals and moves have unload
/// descriptors in the catalog but no mapping here; consumers treat a
/// method-load as valid until the context goes away.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    encoder: Encoder,
}

impl Dispatcher {
    pub fn new(provider: Arc<TraceProvider>) -> Self {
        Self {
            encoder: Encoder::new(provider),
        }
    }

    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    pub fn provider(&self) -> &Arc<TraceProvider> {
        self.encoder.provider()
    }

    pub fn handle(&self, event: &CodeEvent<'_>) -> Dispatch {
        if !self.provider().is_registered() {
            return Dispatch::Unregistered;
        }
        if event.category != CodeCategory::JitCode {
            return Dispatch::NotJit;
        }

        match event.kind {
            CodeEventKind::CodeAdded => {
                let load = MethodLoad {
                    script_context: event.context,
                    script_id: event.script_id.unwrap_or(0),
                    start_address: event.code_start,
                    length: event.code_len as u64,
                    name: event.name,
                };
                Dispatch::MethodLoad(self.encoder.write_method_load(&load))
            }
            other => {
                trace!("Ignoring {:?} at 0x{:x}", other, event.code_start);
                Dispatch::Unhandled(other)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jitetw_provider::RecordingSink;

    fn dispatcher(sink: &Arc<RecordingSink>) -> Dispatcher {
        Dispatcher::new(Arc::new(TraceProvider::new(sink.clone())))
    }

    #[test]
    fn test_unregistered_short_circuits() {
        let sink = Arc::new(RecordingSink::new());
        let dispatcher = dispatcher(&sink);
        let event = CodeEvent::code_added(1, 2, 3, "f");

        assert_eq!(dispatcher.handle(&event), Dispatch::Unregistered);
        assert_eq!(sink.enabled_checks(), 0);
        assert_eq!(sink.write_count(), 0);
    }

    #[test]
    fn test_non_jit_code_ignored() {
        let sink = Arc::new(RecordingSink::new());
        let dispatcher = dispatcher(&sink);
        dispatcher.provider().register().unwrap();

        for category in [CodeCategory::ByteCode, CodeCategory::WasmCode] {
            let event = CodeEvent::code_added(1, 2, 3, "f").with_category(category);
            assert_eq!(dispatcher.handle(&event), Dispatch::NotJit);
        }
        assert_eq!(sink.enabled_checks(), 0);
        assert_eq!(sink.write_count(), 0);
    }

    #[test]
    fn test_missing_script_maps_to_zero() {
        let sink = Arc::new(RecordingSink::new());
        let dispatcher = dispatcher(&sink);
        dispatcher.provider().register().unwrap();

        let event = CodeEvent::code_added(1, 2, 3, "f");
        assert_eq!(
            dispatcher.handle(&event),
            Dispatch::MethodLoad(Emission::Written)
        );
        let record = jitetw_protocol::MethodRecord::from_fields(&sink.writes()[0].fields).unwrap();
        assert_eq!(record.source_id, 0);
    }
}
