//! Turns engine values into positional records and hands them to the provider.

use jitetw_protocol::{EventKind, MethodRecord, SourceRecord, WideString};
use jitetw_provider::TraceProvider;
use std::sync::Arc;
use tracing::{debug, trace};

/// Outcome of one encode request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emission {
    /// No session wants this event (or the provider is unregistered)
    Disabled,
    Written,
    /// The write failed; the event is lost
    Dropped,
    /// Record assembled but intentionally not emitted
    Built,
}

/// Inputs of a method-load event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodLoad<'a> {
    pub script_context: usize,
    pub script_id: i64,
    pub start_address: usize,
    pub length: u64,
    pub name: Option<&'a [u8]>,
}

/// Inputs of a source-load event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLoad<'a> {
    pub source_id: u64,
    pub script_context: usize,
    pub source_flags: u32,
    pub url: &'a str,
}

/// Method id, flags, address range, line and column are reserved and
/// always written as zero.
pub fn method_record(event: &MethodLoad<'_>) -> MethodRecord {
    MethodRecord {
        script_context_id: event.script_context,
        start_address: event.start_address,
        size: event.length,
        method_id: 0,
        method_flags: 0,
        address_range_id: 0,
        source_id: event.script_id as u64,
        line: 0,
        column: 0,
        name: WideString::method_name(event.name),
    }
}

pub fn source_record(event: &SourceLoad<'_>) -> SourceRecord {
    SourceRecord {
        source_id: event.source_id,
        script_context_id: event.script_context,
        source_flags: event.source_flags,
        url: WideString::from_text(event.url),
    }
}

#[derive(Debug, Clone)]
pub struct Encoder {
    provider: Arc<TraceProvider>,
}

impl Encoder {
    pub fn new(provider: Arc<TraceProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<TraceProvider> {
        &self.provider
    }

    pub fn write_method_load(&self, event: &MethodLoad<'_>) -> Emission {
        if !self.provider.is_enabled(EventKind::MethodLoad) {
            return Emission::Disabled;
        }

        let record = method_record(event);
        if record.name.is_truncated() {
            debug!(
                "Method name at 0x{:x} truncated to {} code units",
                event.start_address,
                record.name.len()
            );
        }

        // Failures are logged and counted by the provider
        match self.provider.write(EventKind::MethodLoad, &record.fields()) {
            Ok(()) => Emission::Written,
            Err(_) => Emission::Dropped,
        }
    }

    /// Builds the source-load record without emitting it. Nothing in the
    /// engine callback path reports script sources yet, so the write stays
    /// off until a source id scheme is agreed with consumers.
    pub fn write_source_load(&self, event: &SourceLoad<'_>) -> Emission {
        if !self.provider.is_enabled(EventKind::SourceLoad) {
            return Emission::Disabled;
        }

        let record = source_record(event);
        trace!(
            "Built {} record for source {} ({} fields), not emitted",
            EventKind::SourceLoad,
            record.source_id,
            record.fields().len()
        );
        Emission::Built
    }
}
