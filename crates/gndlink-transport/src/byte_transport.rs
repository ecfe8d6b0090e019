//! The byte-transport seam.
//!
//! Everything below this interface — SLIP byte-stuffing, raw Ethernet
//! capture, datagram sockets — belongs to the underlying link stack. The
//! adapter layer never reaches past it.

use std::sync::Arc;

use crate::adapter::PortConfig;
use crate::error::Result;

/// Callback invoked once per inbound message, on the transport's receive
/// thread.
pub type ReceiveCallback = Arc<dyn Fn(&[u8]) + Send + Sync>;

/// A connected byte-oriented link endpoint.
///
/// Implementations deliver whole messages to the registered callback (one
/// invocation per message) and accept whole messages for transmission;
/// message boundaries are the transport's concern.
pub trait ByteTransport: Send + Sync {
    /// Hand one message to the link for transmission.
    fn send(&self, data: &[u8]) -> std::io::Result<()>;

    /// Register the receive callback, replacing any previous one.
    fn set_receive_callback(&self, callback: ReceiveCallback);

    /// Stop delivering callbacks and release the port. Idempotent.
    fn close(&self);
}

/// Opens byte transports for a port configuration.
///
/// This is the `open(identifier, options)` operation of the collaborating
/// link stack; failures surface as [`TransportError::Open`] and are not
/// retried at this layer.
///
/// [`TransportError::Open`]: crate::error::TransportError::Open
pub trait TransportFactory: Send + Sync {
    fn open(&self, config: &PortConfig) -> Result<Box<dyn ByteTransport>>;
}
