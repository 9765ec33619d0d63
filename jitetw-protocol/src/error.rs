use crate::EventKind;

/// Wire record errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("{kind} record expects {expected} fields, got {actual}")]
    FieldCount {
        kind: EventKind,
        expected: usize,
        actual: usize,
    },

    #[error("{kind} field {name} expects {expected} bytes, got {actual}")]
    FieldSize {
        kind: EventKind,
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{kind} field {name} is not a null-terminated UTF-16 string")]
    Unterminated { kind: EventKind, name: &'static str },
}

pub type Result<T> = std::result::Result<T, ProtocolError>;
