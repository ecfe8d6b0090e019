use crate::adapter::PortKind;

/// Errors that can occur in transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the underlying physical port. Fatal to `connect`,
    /// non-fatal to the process; retrying is the caller's decision.
    #[error("failed to open {kind} port {identifier}: {source}")]
    Open {
        kind: PortKind,
        identifier: String,
        source: std::io::Error,
    },

    /// An I/O error occurred on the transport.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The port identifier could not be parsed for this medium.
    #[error("invalid endpoint {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// No byte transport is available in-tree for this medium; supply a
    /// `TransportFactory` wrapping the external link stack.
    #[error("no built-in byte transport for {kind} ports")]
    Unsupported { kind: PortKind },
}

pub type Result<T> = std::result::Result<T, TransportError>;
