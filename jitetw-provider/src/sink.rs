use crate::Result;
use jitetw_protocol::{EventDescriptor, EventField, ProviderId};
use std::sync::Arc;

/// Registration handle returned by a sink. Zero is reserved for "not
/// registered" and is never a valid handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegHandle(u64);

impl RegHandle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }

    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// OS tracing capability used by [`crate::TraceProvider`].
///
/// One implementation per target platform; encoders and the dispatcher
/// only ever see this trait.
pub trait TraceSink: Send + Sync {
    /// Short backend name for diagnostics
    fn name(&self) -> &'static str;

    fn register(&self, provider: &ProviderId) -> Result<RegHandle>;

    fn unregister(&self, handle: RegHandle) -> Result<()>;

    /// Whether any session currently wants events matching `descriptor`
    fn is_enabled(&self, handle: RegHandle, descriptor: &EventDescriptor) -> bool;

    fn write(
        &self,
        handle: RegHandle,
        descriptor: &EventDescriptor,
        fields: &[EventField<'_>],
    ) -> Result<()>;

    /// Best-effort message to an attached debugger
    fn debug_message(&self, _message: &str) {}
}

/// ETW on Windows, no-op elsewhere
pub fn default_sink() -> Arc<dyn TraceSink> {
    #[cfg(windows)]
    {
        Arc::new(crate::etw::EtwSink::new())
    }
    #[cfg(not(windows))]
    {
        Arc::new(crate::noop::NoopSink)
    }
}
