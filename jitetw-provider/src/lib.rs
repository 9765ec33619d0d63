//! Trace provider lifecycle and OS sink backends for jitetw.

mod error;
mod etw;
mod noop;
mod provider;
#[cfg(any(test, feature = "test-util"))]
mod recording;
mod sink;

pub use error::{ProviderError, Result};
#[cfg(windows)]
pub use etw::EtwSink;
pub use noop::NoopSink;
pub use provider::{ProviderState, ProviderStats, TraceProvider};
#[cfg(any(test, feature = "test-util"))]
pub use recording::{RecordedWrite, RecordingSink};
pub use sink::{default_sink, RegHandle, TraceSink};
