//! Byte-transport abstraction and port adapters for the gndlink link layer.
//!
//! Presents one uniform contract — send, receive callback, lifecycle — over
//! serial and Ethernet-style media. The adapter owns its port handle
//! exclusively, serializes concurrent sends, runs the heartbeat loop as an
//! owned task, and tears itself down on send failure so nothing keeps
//! writing into a dead link.
//!
//! The [`ByteTransport`] trait is the boundary to the underlying link
//! stack; [`MockTransport`] scripts it for tests and [`UdpTransport`]
//! provides the built-in datagram medium.

pub mod adapter;
pub mod byte_transport;
pub mod error;
pub mod heartbeat;
pub mod mock;
pub mod signal;
mod sync;
pub mod udp;

pub use adapter::{LinkState, PortAdapter, PortConfig, PortKind, DEFAULT_BAUD_RATE};
pub use byte_transport::{ByteTransport, ReceiveCallback, TransportFactory};
pub use error::{Result, TransportError};
pub use heartbeat::HEARTBEAT_INTERVAL;
pub use mock::{MockFactory, MockTransport};
pub use signal::ShutdownSignal;
pub use udp::{UdpFactory, UdpTransport};
