//! jitetw Protocol Library
//!
//! Event catalog, field templates and positional wire records for the
//! JScript runtime provider events emitted by jitetw.

mod catalog;
mod error;

pub mod record;
pub mod template;
pub mod wide;

pub use catalog::{
    consts, EventDescriptor, EventKind, ProviderId, JSCRIPT_PROVIDER_ID, METHOD_LOAD,
    METHOD_UNLOAD, SOURCE_LOAD, SOURCE_UNLOAD,
};

pub use error::{ProtocolError, Result};

pub use record::{validate_fields, EventField, MethodRecord, SourceRecord};

pub use template::{FieldSpec, InType};

pub use wide::{WideString, MAX_NAME_UNITS, NAME_BUFFER_UNITS, UNKNOWN_NAME};
