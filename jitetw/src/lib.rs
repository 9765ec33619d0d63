//! jitetw
//!
//! Forwards JIT code lifecycle notifications from a script engine to the
//! JScript runtime trace provider, so profilers can map native code
//! addresses back to script methods.

pub mod bridge;
pub mod dispatcher;
pub mod encoder;
pub mod event;
pub mod logging;
pub mod settings;

pub use bridge::{on_code_event, teardown, Bridge};
pub use dispatcher::{Dispatch, Dispatcher};
pub use encoder::{Emission, Encoder, MethodLoad, SourceLoad};
pub use event::{CodeCategory, CodeEvent, CodeEventKind};
pub use settings::{Backend, LogLevel, Settings};

pub use jitetw_protocol as protocol;
pub use jitetw_provider as provider;
