//! Datagram byte transport over UDP.
//!
//! The shipped Ethernet-style medium: datagram boundaries are message
//! boundaries, so no byte-stuffing layer is needed. Identifier format is
//! `local_addr/remote_addr`, e.g. `0.0.0.0:55200/192.168.1.40:55201`.

use std::net::UdpSocket;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::adapter::{PortConfig, PortKind, TASK_JOIN_TIMEOUT};
use crate::byte_transport::{ByteTransport, ReceiveCallback, TransportFactory};
use crate::error::{Result, TransportError};
use crate::sync::{join_with_timeout, lock};

/// Largest datagram the receive loop accepts.
const RECV_BUFFER_SIZE: usize = 64 * 1024;

/// Poll quantum for the receive loop's stop flag.
const RECV_POLL_TIMEOUT: Duration = Duration::from_millis(250);

pub struct UdpTransport {
    socket: UdpSocket,
    label: String,
    stop: Arc<AtomicBool>,
    callback: Arc<Mutex<Option<ReceiveCallback>>>,
    rx_thread: Mutex<Option<JoinHandle<()>>>,
}

impl UdpTransport {
    /// Bind `local`, direct sends at `remote`, and start the receive
    /// thread. One callback invocation per inbound datagram.
    pub fn open(identifier: &str) -> Result<Self> {
        let (local, remote) = split_endpoints(identifier)?;

        let open_err = |source: std::io::Error| TransportError::Open {
            kind: PortKind::Ethernet,
            identifier: identifier.to_owned(),
            source,
        };
        let socket = UdpSocket::bind(local).map_err(open_err)?;
        socket.connect(remote).map_err(open_err)?;
        socket
            .set_read_timeout(Some(RECV_POLL_TIMEOUT))
            .map_err(open_err)?;

        let stop = Arc::new(AtomicBool::new(false));
        let callback: Arc<Mutex<Option<ReceiveCallback>>> = Arc::new(Mutex::new(None));

        let rx_socket = socket.try_clone().map_err(open_err)?;
        let rx_stop = Arc::clone(&stop);
        let rx_callback = Arc::clone(&callback);
        let rx_label = identifier.to_owned();
        let rx_thread = std::thread::Builder::new()
            .name("udp-rx".into())
            .spawn(move || receive_loop(&rx_socket, &rx_stop, &rx_callback, &rx_label))
            .map_err(open_err)?;

        info!(endpoint = identifier, "udp transport open");
        Ok(Self {
            socket,
            label: identifier.to_owned(),
            stop,
            callback,
            rx_thread: Mutex::new(Some(rx_thread)),
        })
    }
}

fn receive_loop(
    socket: &UdpSocket,
    stop: &AtomicBool,
    callback: &Mutex<Option<ReceiveCallback>>,
    label: &str,
) {
    let mut buf = vec![0u8; RECV_BUFFER_SIZE];
    while !stop.load(Ordering::SeqCst) {
        match socket.recv(&mut buf) {
            Ok(len) => {
                let callback = lock(callback).clone();
                if let Some(callback) = callback {
                    callback(&buf[..len]);
                }
            }
            Err(err)
                if matches!(
                    err.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) => {}
            Err(err) => {
                warn!(endpoint = label, %err, "udp receive failed; stopping delivery");
                break;
            }
        }
    }
    debug!(endpoint = label, "udp receive loop exited");
}

impl ByteTransport for UdpTransport {
    fn send(&self, data: &[u8]) -> std::io::Result<()> {
        self.socket.send(data).map(|_| ())
    }

    fn set_receive_callback(&self, callback: ReceiveCallback) {
        *lock(&self.callback) = Some(callback);
    }

    fn close(&self) {
        if self.stop.swap(true, Ordering::SeqCst) {
            return;
        }
        *lock(&self.callback) = None;
        if let Some(handle) = lock(&self.rx_thread).take() {
            join_with_timeout(handle, TASK_JOIN_TIMEOUT, "udp-rx");
        }
        debug!(endpoint = %self.label, "udp transport closed");
    }
}

impl Drop for UdpTransport {
    fn drop(&mut self) {
        self.close();
    }
}

fn split_endpoints(identifier: &str) -> Result<(&str, &str)> {
    identifier
        .split_once('/')
        .filter(|(local, remote)| !local.is_empty() && !remote.is_empty())
        .ok_or_else(|| TransportError::InvalidEndpoint {
            endpoint: identifier.to_owned(),
            reason: "expected local_addr/remote_addr".to_owned(),
        })
}

/// Factory for the built-in media: UDP for Ethernet-style ports. Serial
/// links need an externally supplied factory wrapping the link's own
/// byte-stuffing stack.
#[derive(Debug, Default)]
pub struct UdpFactory;

impl TransportFactory for UdpFactory {
    fn open(&self, config: &PortConfig) -> Result<Box<dyn ByteTransport>> {
        match config.kind {
            PortKind::Ethernet => Ok(Box::new(UdpTransport::open(&config.identifier)?)),
            PortKind::Serial => Err(TransportError::Unsupported {
                kind: PortKind::Serial,
            }),
        }
    }
}
