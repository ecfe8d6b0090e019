use crate::dictionary::ValueType;

/// Errors that can occur in link-layer operations.
///
/// Decode-time conditions never unwind past the dispatchers: they are logged
/// where detected and the offending frame (or channel entry) is dropped.
/// Only transport-level failures reach the session's caller.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] gndlink_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] gndlink_codec::FrameError),

    /// Structurally valid command frame with an opcode the dictionary does
    /// not know.
    #[error("unknown command opcode {opcode:#010x}")]
    UnknownOpcode { opcode: u32 },

    /// The decoded argument count does not match the command template.
    #[error("command {command} takes {want} arguments, frame carried {got}")]
    ArgumentCount {
        command: String,
        want: usize,
        got: usize,
    },

    /// Telemetry entry for a channel the dictionary does not know.
    #[error("unknown telemetry channel {id}")]
    UnknownChannel { id: u32 },

    /// A channel value's byte count does not fit its declared type.
    #[error("{value_type} value needs {want} bytes, got {got}")]
    ValueLength {
        value_type: ValueType,
        want: usize,
        got: usize,
    },

    /// A text-typed channel value is not valid UTF-8.
    #[error("text value is not valid UTF-8")]
    ValueUtf8,

    /// The session already owns a connected adapter.
    #[error("link session already started")]
    AlreadyStarted,
}

pub type Result<T> = std::result::Result<T, LinkError>;
