use crate::sink::{RegHandle, TraceSink};
use crate::{ProviderError, Result};
use jitetw_protocol::{validate_fields, EventField, EventKind, ProviderId, JSCRIPT_PROVIDER_ID};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, error, info, trace, warn};

/// Registration state of a [`TraceProvider`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderState {
    Unregistered,
    Registered(RegHandle),
}

/// Snapshot of provider counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProviderStats {
    pub registration_failures: u64,
    pub write_failures: u64,
    pub events_written: u64,
}

#[derive(Debug, Default)]
struct Counters {
    registration_failures: AtomicU64,
    write_failures: AtomicU64,
    events_written: AtomicU64,
}

/// Process registration with the tracing subsystem.
///
/// Owns the registration handle and is shared by the encoder and the
/// dispatcher. Registration failures degrade to "nothing enabled"; nothing
/// here ever aborts the host.
pub struct TraceProvider {
    id: ProviderId,
    sink: Arc<dyn TraceSink>,
    // Serializes register/unregister; the write path never takes it
    transition: Mutex<()>,
    // Raw registration handle, 0 while unregistered
    handle: AtomicU64,
    counters: Counters,
}

impl std::fmt::Debug for TraceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceProvider")
            .field("id", &self.id.to_string())
            .field("sink", &self.sink.name())
            .field("state", &self.state())
            .finish()
    }
}

impl TraceProvider {
    /// Provider for the JScript runtime id
    pub fn new(sink: Arc<dyn TraceSink>) -> Self {
        Self::with_id(JSCRIPT_PROVIDER_ID, sink)
    }

    pub fn with_id(id: ProviderId, sink: Arc<dyn TraceSink>) -> Self {
        Self {
            id,
            sink,
            transition: Mutex::new(()),
            handle: AtomicU64::new(0),
            counters: Counters::default(),
        }
    }

    pub fn id(&self) -> ProviderId {
        self.id
    }

    pub fn sink_name(&self) -> &'static str {
        self.sink.name()
    }

    pub fn state(&self) -> ProviderState {
        match self.handle() {
            Some(handle) => ProviderState::Registered(handle),
            None => ProviderState::Unregistered,
        }
    }

    pub fn is_registered(&self) -> bool {
        self.handle().is_some()
    }

    fn handle(&self) -> Option<RegHandle> {
        let handle = RegHandle::new(self.handle.load(Ordering::Acquire));
        (!handle.is_null()).then_some(handle)
    }

    /// Register with the tracing subsystem.
    ///
    /// Already registered is a no-op. On failure the provider stays
    /// unregistered, a diagnostic is logged, and the error is returned to
    /// this caller only.
    pub fn register(&self) -> Result<()> {
        let _guard = self
            .transition
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if self.is_registered() {
            debug!("Provider {} already registered, skipping", self.id);
            return Ok(());
        }

        let registered = self.sink.register(&self.id).and_then(|handle| {
            if handle.is_null() {
                Err(ProviderError::NullHandle)
            } else {
                Ok(handle)
            }
        });

        match registered {
            Ok(handle) => {
                self.handle.store(handle.raw(), Ordering::Release);
                info!(
                    "Registered trace provider {} via {} sink",
                    self.id,
                    self.sink.name()
                );
                Ok(())
            }
            Err(e) => {
                self.counters
                    .registration_failures
                    .fetch_add(1, Ordering::Relaxed);
                error!("Failed to register trace provider {}: {}", self.id, e);
                self.sink.debug_message("Failed to register with ETW");
                Err(e)
            }
        }
    }

    /// Release the registration. Unregistered is a no-op.
    pub fn unregister(&self) -> Result<()> {
        let _guard = self
            .transition
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let Some(handle) = self.handle() else {
            debug!("Provider {} not registered, nothing to release", self.id);
            return Ok(());
        };

        self.handle.store(0, Ordering::Release);
        match self.sink.unregister(handle) {
            Ok(()) => {
                info!("Unregistered trace provider {}", self.id);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to unregister trace provider {}: {}", self.id, e);
                Err(e)
            }
        }
    }

    /// Enabled-check for one event kind; always false while unregistered
    pub fn is_enabled(&self, kind: EventKind) -> bool {
        match self.handle() {
            Some(handle) => self.sink.is_enabled(handle, kind.descriptor()),
            None => false,
        }
    }

    /// Emit one record. Callers check [`Self::is_enabled`] first.
    pub fn write(&self, kind: EventKind, fields: &[EventField<'_>]) -> Result<()> {
        let handle = self.handle().ok_or(ProviderError::NotRegistered)?;
        validate_fields(kind, fields)?;

        match self.sink.write(handle, kind.descriptor(), fields) {
            Ok(()) => {
                self.counters.events_written.fetch_add(1, Ordering::Relaxed);
                trace!("Wrote {} event ({} fields)", kind, fields.len());
                Ok(())
            }
            Err(e) => {
                self.counters.write_failures.fetch_add(1, Ordering::Relaxed);
                warn!("Failed to write {} event: {}", kind, e);
                self.sink.debug_message("Failed to write ETW event");
                Err(e)
            }
        }
    }

    pub fn stats(&self) -> ProviderStats {
        ProviderStats {
            registration_failures: self.counters.registration_failures.load(Ordering::Relaxed),
            write_failures: self.counters.write_failures.load(Ordering::Relaxed),
            events_written: self.counters.events_written.load(Ordering::Relaxed),
        }
    }
}

impl Drop for TraceProvider {
    fn drop(&mut self) {
        if self.is_registered() {
            warn!(
                "Trace provider {} dropped while registered; unregister was never called",
                self.id
            );
            let _ = self.unregister();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RecordingSink;
    use jitetw_protocol::{EventDescriptor, MethodRecord, WideString};

    fn provider() -> (Arc<RecordingSink>, TraceProvider) {
        let sink = Arc::new(RecordingSink::new());
        let provider = TraceProvider::new(sink.clone());
        (sink, provider)
    }

    fn sample_record() -> MethodRecord {
        MethodRecord {
            script_context_id: 1,
            start_address: 2,
            size: 3,
            method_id: 0,
            method_flags: 0,
            address_range_id: 0,
            source_id: 4,
            line: 0,
            column: 0,
            name: WideString::method_name(Some(b"f")),
        }
    }

    #[test]
    fn test_register_is_idempotent() {
        let (sink, provider) = provider();
        provider.register().unwrap();
        provider.register().unwrap();

        assert_eq!(sink.registration_count(), 1);
        assert_eq!(sink.registered_ids(), vec![JSCRIPT_PROVIDER_ID]);
        assert_eq!(
            provider.state(),
            ProviderState::Registered(RegHandle::new(1))
        );
    }

    #[test]
    fn test_registration_failure_disables_tracing() {
        let (sink, provider) = provider();
        sink.fail_registration(87);

        assert_eq!(
            provider.register(),
            Err(ProviderError::Registration { status: 87 })
        );
        assert_eq!(provider.state(), ProviderState::Unregistered);
        assert!(!provider.is_enabled(EventKind::MethodLoad));
        assert_eq!(sink.enabled_checks(), 0);
        assert_eq!(provider.stats().registration_failures, 1);
        assert_eq!(sink.debug_messages().len(), 1);
    }

    #[test]
    fn test_unregister_lifecycle() {
        let (sink, provider) = provider();
        provider.unregister().unwrap();
        assert_eq!(sink.unregistration_count(), 0);

        provider.register().unwrap();
        provider.unregister().unwrap();
        provider.unregister().unwrap();
        assert_eq!(sink.unregistration_count(), 1);
        assert!(!provider.is_registered());

        // Registration can be taken again after teardown
        provider.register().unwrap();
        assert_eq!(
            provider.state(),
            ProviderState::Registered(RegHandle::new(2))
        );
    }

    #[test]
    fn test_drop_releases_registration() {
        let (sink, provider) = provider();
        provider.register().unwrap();
        drop(provider);
        assert_eq!(sink.unregistration_count(), 1);
    }

    #[test]
    fn test_write_requires_registration() {
        let (sink, provider) = provider();
        let record = sample_record();
        assert_eq!(
            provider.write(EventKind::MethodLoad, &record.fields()),
            Err(ProviderError::NotRegistered)
        );
        assert_eq!(sink.write_count(), 0);
    }

    #[test]
    fn test_write_rejects_wrong_shape() {
        let (sink, provider) = provider();
        provider.register().unwrap();
        let record = sample_record();
        let result = provider.write(EventKind::SourceLoad, &record.fields());
        assert!(matches!(result, Err(ProviderError::Protocol(_))));
        assert_eq!(sink.write_count(), 0);
    }

    #[test]
    fn test_write_failure_is_counted() {
        let (sink, provider) = provider();
        provider.register().unwrap();
        sink.fail_writes(1450);

        let record = sample_record();
        assert!(provider.write(EventKind::MethodLoad, &record.fields()).is_err());
        assert_eq!(
            provider.stats(),
            ProviderStats {
                registration_failures: 0,
                write_failures: 1,
                events_written: 0,
            }
        );
        assert_eq!(sink.write_count(), 1);
        assert_eq!(sink.debug_messages(), vec!["Failed to write ETW event"]);
    }

    #[test]
    fn test_sink_never_sees_null_handle_during_teardown() {
        let (sink, provider) = provider();
        let record = sample_record();

        std::thread::scope(|s| {
            s.spawn(|| {
                for _ in 0..200 {
                    provider.register().unwrap();
                    provider.unregister().unwrap();
                }
            });
            s.spawn(|| {
                for _ in 0..2000 {
                    if provider.is_enabled(EventKind::MethodLoad) {
                        let _ = provider.write(EventKind::MethodLoad, &record.fields());
                    }
                }
            });
        });

        assert!(sink.writes().iter().all(|w| !w.handle.is_null()));
        assert_eq!(sink.unregistration_count(), 200);
        assert_eq!(provider.state(), ProviderState::Unregistered);
    }

    /// Sink that reports success but hands back the reserved handle
    struct NullHandleSink;

    impl TraceSink for NullHandleSink {
        fn name(&self) -> &'static str {
            "null-handle"
        }

        fn register(&self, _provider: &ProviderId) -> Result<RegHandle> {
            Ok(RegHandle::new(0))
        }

        fn unregister(&self, _handle: RegHandle) -> Result<()> {
            panic!("nothing was registered");
        }

        fn is_enabled(&self, _handle: RegHandle, _descriptor: &EventDescriptor) -> bool {
            true
        }

        fn write(
            &self,
            _handle: RegHandle,
            _descriptor: &EventDescriptor,
            _fields: &[EventField<'_>],
        ) -> Result<()> {
            panic!("nothing was registered");
        }
    }

    #[test]
    fn test_null_handle_counts_as_registration_failure() {
        let provider = TraceProvider::new(Arc::new(NullHandleSink));

        assert_eq!(provider.register(), Err(ProviderError::NullHandle));
        assert!(!provider.is_registered());
        assert!(!provider.is_enabled(EventKind::MethodLoad));
        assert_eq!(provider.stats().registration_failures, 1);
        assert_eq!(
            provider.write(EventKind::MethodLoad, &sample_record().fields()),
            Err(ProviderError::NotRegistered)
        );
    }
}
