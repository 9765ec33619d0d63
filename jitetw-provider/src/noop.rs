use crate::sink::{RegHandle, TraceSink};
use crate::Result;
use jitetw_protocol::{EventDescriptor, EventField, ProviderId};

/// Backend for platforms without an event tracing subsystem.
/// Registration succeeds and no event is ever enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {
    fn name(&self) -> &'static str {
        "noop"
    }

    fn register(&self, _provider: &ProviderId) -> Result<RegHandle> {
        Ok(RegHandle::new(1))
    }

    fn unregister(&self, _handle: RegHandle) -> Result<()> {
        Ok(())
    }

    fn is_enabled(&self, _handle: RegHandle, _descriptor: &EventDescriptor) -> bool {
        false
    }

    fn write(
        &self,
        _handle: RegHandle,
        _descriptor: &EventDescriptor,
        _fields: &[EventField<'_>],
    ) -> Result<()> {
        Ok(())
    }
}
