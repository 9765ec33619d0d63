use jitetw_protocol::ProtocolError;

/// Provider error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("Provider registration failed with status {status}")]
    Registration { status: u32 },

    #[error("Provider unregistration failed with status {status}")]
    Unregistration { status: u32 },

    #[error("Sink returned the reserved null registration handle")]
    NullHandle,

    #[error("Provider is not registered")]
    NotRegistered,

    #[error("Write of event {event_id} failed with status {status}")]
    Write { event_id: u16, status: u32 },

    #[error("Malformed record: {0}")]
    Protocol(#[from] ProtocolError),
}

pub type Result<T> = std::result::Result<T, ProviderError>;
