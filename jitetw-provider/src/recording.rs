//! In-memory sink that records every call, for host and unit tests.

use crate::sink::{RegHandle, TraceSink};
use crate::{ProviderError, Result};
use jitetw_protocol::{EventDescriptor, EventField, EventKind, ProviderId};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A write attempt seen by [`RecordingSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedWrite {
    pub handle: RegHandle,
    pub descriptor: EventDescriptor,
    pub fields: Vec<Vec<u8>>,
    pub succeeded: bool,
}

impl RecordedWrite {
    pub fn kind(&self) -> Option<EventKind> {
        EventKind::from_event_id(self.descriptor.id)
    }
}

#[derive(Debug, Default)]
struct Recording {
    register_failure: Option<u32>,
    write_failure: Option<u32>,
    enabled: HashSet<u16>,
    next_handle: u64,
    registered_ids: Vec<ProviderId>,
    unregistered: Vec<RegHandle>,
    enabled_checks: usize,
    writes: Vec<RecordedWrite>,
    debug_messages: Vec<String>,
}

#[derive(Debug, Default)]
pub struct RecordingSink {
    inner: Mutex<Recording>,
}

impl RecordingSink {
    /// Sink with every event kind enabled
    pub fn new() -> Self {
        let sink = Self::default();
        for kind in EventKind::ALL {
            sink.enable(kind);
        }
        sink
    }

    /// Sink with no event kind enabled
    pub fn disabled() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Recording> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn enable(&self, kind: EventKind) {
        self.lock().enabled.insert(kind.descriptor().id);
    }

    pub fn disable(&self, kind: EventKind) {
        self.lock().enabled.remove(&kind.descriptor().id);
    }

    /// Make every subsequent `register` fail with `status`
    pub fn fail_registration(&self, status: u32) {
        self.lock().register_failure = Some(status);
    }

    /// Make every subsequent `write` fail with `status`
    pub fn fail_writes(&self, status: u32) {
        self.lock().write_failure = Some(status);
    }

    pub fn registered_ids(&self) -> Vec<ProviderId> {
        self.lock().registered_ids.clone()
    }

    pub fn registration_count(&self) -> usize {
        self.lock().registered_ids.len()
    }

    pub fn unregistration_count(&self) -> usize {
        self.lock().unregistered.len()
    }

    pub fn enabled_checks(&self) -> usize {
        self.lock().enabled_checks
    }

    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.lock().writes.clone()
    }

    pub fn write_count(&self) -> usize {
        self.lock().writes.len()
    }

    pub fn debug_messages(&self) -> Vec<String> {
        self.lock().debug_messages.clone()
    }
}

impl TraceSink for RecordingSink {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn register(&self, provider: &ProviderId) -> Result<RegHandle> {
        let mut rec = self.lock();
        if let Some(status) = rec.register_failure {
            return Err(ProviderError::Registration { status });
        }
        rec.registered_ids.push(*provider);
        rec.next_handle += 1;
        Ok(RegHandle::new(rec.next_handle))
    }

    fn unregister(&self, handle: RegHandle) -> Result<()> {
        self.lock().unregistered.push(handle);
        Ok(())
    }

    fn is_enabled(&self, _handle: RegHandle, descriptor: &EventDescriptor) -> bool {
        let mut rec = self.lock();
        rec.enabled_checks += 1;
        rec.enabled.contains(&descriptor.id)
    }

    fn write(
        &self,
        handle: RegHandle,
        descriptor: &EventDescriptor,
        fields: &[EventField<'_>],
    ) -> Result<()> {
        let mut rec = self.lock();
        let failure = rec.write_failure;
        rec.writes.push(RecordedWrite {
            handle,
            descriptor: *descriptor,
            fields: fields.iter().map(|f| f.bytes().to_vec()).collect(),
            succeeded: failure.is_none(),
        });
        match failure {
            Some(status) => Err(ProviderError::Write {
                event_id: descriptor.id,
                status,
            }),
            None => Ok(()),
        }
    }

    fn debug_message(&self, message: &str) {
        self.lock().debug_messages.push(message.to_string());
    }
}
