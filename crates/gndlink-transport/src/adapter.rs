//! Port adapters: one uniform send/receive/lifecycle contract over serial
//! and Ethernet-style media.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::Rng;
use tracing::{debug, error, info};

use gndlink_codec::MacAddr;

use crate::byte_transport::{ByteTransport, ReceiveCallback, TransportFactory};
use crate::error::Result;
use crate::heartbeat::HeartbeatTask;
use crate::sync::{join_with_timeout, lock};

/// Reference baud rate for serial links.
pub const DEFAULT_BAUD_RATE: u32 = 921_600;

/// Upper bound on how long `disconnect` waits for an owned background task.
pub(crate) const TASK_JOIN_TIMEOUT: Duration = Duration::from_secs(1);

/// The physical medium behind an adapter. Closed set: every consumer can
/// match exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortKind {
    Serial,
    Ethernet,
}

impl PortKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PortKind::Serial => "serial",
            PortKind::Ethernet => "ethernet",
        }
    }
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Port selection handed to `connect`.
#[derive(Debug, Clone)]
pub struct PortConfig {
    pub kind: PortKind,
    /// Medium-specific identifier: a device path for serial, a
    /// `local/remote` endpoint pair for the built-in Ethernet transport.
    pub identifier: String,
    /// Serial line rate; carried but unused by datagram media.
    pub baud_rate: u32,
}

impl PortConfig {
    pub fn serial(identifier: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            kind: PortKind::Serial,
            identifier: identifier.into(),
            baud_rate,
        }
    }

    pub fn ethernet(identifier: impl Into<String>) -> Self {
        Self {
            kind: PortKind::Ethernet,
            identifier: identifier.into(),
            baud_rate: DEFAULT_BAUD_RATE,
        }
    }
}

/// Adapter lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

/// A connected link endpoint over one exclusively-owned port handle.
///
/// Sends are serialized through a mutex around the byte transport, so a
/// frame handed to `send` is never interleaved with a concurrent caller's
/// frame. On any transport-level send error the adapter logs, tears down its
/// own connection state and returns `false` — nothing keeps writing into a
/// dead link.
pub struct PortAdapter {
    config: PortConfig,
    identity: MacAddr,
    state: Mutex<LinkState>,
    transport: Mutex<Option<Box<dyn ByteTransport>>>,
    pub(crate) heartbeat: Mutex<Option<HeartbeatTask>>,
}

impl PortAdapter {
    /// Open the underlying port and return a connected adapter with a
    /// freshly generated identity.
    pub fn connect(config: PortConfig, factory: &dyn TransportFactory) -> Result<Arc<Self>> {
        let identity = MacAddr::locally_administered(rand::thread_rng().gen());
        Self::connect_with_identity(config, factory, identity)
    }

    /// Open the underlying port with an explicit identity. Tests inject a
    /// fixed address here to keep frames deterministic.
    pub fn connect_with_identity(
        config: PortConfig,
        factory: &dyn TransportFactory,
        identity: MacAddr,
    ) -> Result<Arc<Self>> {
        let adapter = Arc::new(Self {
            config,
            identity,
            state: Mutex::new(LinkState::Connecting),
            transport: Mutex::new(None),
            heartbeat: Mutex::new(None),
        });

        let transport = factory.open(&adapter.config).inspect_err(|err| {
            *lock(&adapter.state) = LinkState::Disconnected;
            error!(
                port = %adapter.config.identifier,
                kind = %adapter.config.kind,
                %err,
                "failed to open port"
            );
        })?;

        *lock(&adapter.transport) = Some(transport);
        *lock(&adapter.state) = LinkState::Connected;
        info!(
            port = %adapter.config.identifier,
            kind = %adapter.config.kind,
            identity = %adapter.identity,
            "connected"
        );
        Ok(adapter)
    }

    /// This adapter's locally-administered link address, stable for its
    /// lifetime.
    pub fn identity(&self) -> MacAddr {
        self.identity
    }

    pub fn kind(&self) -> PortKind {
        self.config.kind
    }

    pub fn identifier(&self) -> &str {
        &self.config.identifier
    }

    pub fn state(&self) -> LinkState {
        *lock(&self.state)
    }

    pub fn is_connected(&self) -> bool {
        self.state() == LinkState::Connected
    }

    /// Hand bytes to the underlying transport.
    ///
    /// Returns `false` without touching the port when the adapter is not
    /// connected. On a transport error the adapter disconnects itself and
    /// returns `false`; the condition is logged, never raised.
    pub fn send(&self, data: &[u8]) -> bool {
        if !self.is_connected() {
            debug!(port = %self.config.identifier, "send ignored: adapter not connected");
            return false;
        }

        let outcome = {
            let transport = lock(&self.transport);
            match transport.as_ref() {
                Some(transport) => transport.send(data),
                None => return false,
            }
        };

        match outcome {
            Ok(()) => true,
            Err(err) => {
                error!(
                    port = %self.config.identifier,
                    len = data.len(),
                    %err,
                    "send failed; tearing down connection"
                );
                self.disconnect();
                false
            }
        }
    }

    /// Register the inbound-message callback with the underlying transport,
    /// replacing any previous registration. Returns `false` when the
    /// adapter is not connected.
    pub fn set_receive_callback(&self, callback: ReceiveCallback) -> bool {
        if !self.is_connected() {
            debug!(port = %self.config.identifier, "callback ignored: adapter not connected");
            return false;
        }
        let transport = lock(&self.transport);
        match transport.as_ref() {
            Some(transport) => {
                transport.set_receive_callback(callback);
                true
            }
            None => false,
        }
    }

    /// Stop owned background loops, release the port and return to
    /// `Disconnected`. Idempotent; callable from any thread, including the
    /// heartbeat loop's own send path.
    pub fn disconnect(&self) {
        {
            let mut state = lock(&self.state);
            match *state {
                LinkState::Disconnected | LinkState::Disconnecting => return,
                _ => *state = LinkState::Disconnecting,
            }
        }

        self.reap_heartbeat();
        if let Some(transport) = lock(&self.transport).take() {
            transport.close();
        }
        *lock(&self.state) = LinkState::Disconnected;
        info!(port = %self.config.identifier, "disconnected");
    }

    fn reap_heartbeat(&self) {
        let Some(task) = lock(&self.heartbeat).take() else {
            return;
        };
        task.stop.trigger();
        if std::thread::current().id() == task.handle.thread().id() {
            // Disconnect issued from inside the heartbeat loop (send
            // failure); the loop exits on its own once we return.
            return;
        }
        join_with_timeout(task.handle, TASK_JOIN_TIMEOUT, "heartbeat");
    }
}

impl Drop for PortAdapter {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl fmt::Debug for PortAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortAdapter")
            .field("kind", &self.config.kind)
            .field("identifier", &self.config.identifier)
            .field("identity", &self.identity)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::mock::{MockFactory, MockTransport};

    fn test_identity() -> MacAddr {
        MacAddr::locally_administered([0x01, 0x02, 0x03, 0x04])
    }

    fn connected_adapter() -> (Arc<PortAdapter>, Arc<MockTransport>) {
        let transport = MockTransport::new();
        let factory = MockFactory::new(Arc::clone(&transport));
        let adapter = PortAdapter::connect_with_identity(
            PortConfig::serial("/dev/ttyUSB0", DEFAULT_BAUD_RATE),
            &factory,
            test_identity(),
        )
        .expect("mock connect should succeed");
        (adapter, transport)
    }

    #[test]
    fn connect_reaches_connected_state() {
        let (adapter, _transport) = connected_adapter();
        assert_eq!(adapter.state(), LinkState::Connected);
        assert!(adapter.is_connected());
        assert_eq!(adapter.identity(), test_identity());
        assert_eq!(adapter.kind(), PortKind::Serial);
    }

    #[test]
    fn connect_failure_surfaces_open_error() {
        let factory = MockFactory::failing();
        let err = PortAdapter::connect(PortConfig::ethernet("lo/remote"), &factory).unwrap_err();
        assert!(matches!(err, crate::error::TransportError::Open { .. }));
    }

    #[test]
    fn generated_identity_is_locally_administered() {
        let transport = MockTransport::new();
        let factory = MockFactory::new(transport);
        let adapter =
            PortAdapter::connect(PortConfig::serial("/dev/ttyUSB0", DEFAULT_BAUD_RATE), &factory)
                .expect("mock connect should succeed");
        assert_eq!(adapter.identity().octets()[..2], MacAddr::LOCAL_PREFIX);
    }

    #[test]
    fn send_reaches_transport() {
        let (adapter, transport) = connected_adapter();
        assert!(adapter.send(b"payload"));
        assert_eq!(transport.sent_frames(), vec![b"payload".to_vec()]);
    }

    #[test]
    fn send_failure_disconnects_adapter() {
        let (adapter, transport) = connected_adapter();
        transport.set_send_failure(true);

        assert!(!adapter.send(b"doomed"));
        assert_eq!(adapter.state(), LinkState::Disconnected);
        assert!(transport.is_closed());

        // Later sends are no-ops returning failure.
        transport.set_send_failure(false);
        assert!(!adapter.send(b"after"));
        assert!(transport.sent_frames().is_empty());
    }

    #[test]
    fn disconnect_is_idempotent() {
        let (adapter, transport) = connected_adapter();
        adapter.disconnect();
        assert_eq!(adapter.state(), LinkState::Disconnected);
        adapter.disconnect();
        assert_eq!(adapter.state(), LinkState::Disconnected);
        assert!(transport.is_closed());
    }

    #[test]
    fn disconnect_from_another_thread() {
        let (adapter, _transport) = connected_adapter();
        let remote = Arc::clone(&adapter);
        std::thread::spawn(move || remote.disconnect())
            .join()
            .expect("disconnect thread should finish");
        assert_eq!(adapter.state(), LinkState::Disconnected);
    }

    #[test]
    fn second_callback_replaces_first() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let (adapter, transport) = connected_adapter();
        let first_hits = Arc::new(AtomicUsize::new(0));
        let second_hits = Arc::new(AtomicUsize::new(0));

        let hits = Arc::clone(&first_hits);
        assert!(adapter.set_receive_callback(Arc::new(move |_: &[u8]| {
            hits.fetch_add(1, Ordering::SeqCst);
        })));
        let hits = Arc::clone(&second_hits);
        assert!(adapter.set_receive_callback(Arc::new(move |_: &[u8]| {
            hits.fetch_add(1, Ordering::SeqCst);
        })));

        transport.inject(b"msg");
        assert_eq!(first_hits.load(Ordering::SeqCst), 0);
        assert_eq!(second_hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn callback_registration_requires_connected_state() {
        let (adapter, _transport) = connected_adapter();
        adapter.disconnect();
        assert!(!adapter.set_receive_callback(Arc::new(|_: &[u8]| {})));
    }
}
