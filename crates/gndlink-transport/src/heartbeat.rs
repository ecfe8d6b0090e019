//! Periodic heartbeat emission, owned by a connected adapter.

use std::sync::{Arc, Weak};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, warn};

use gndlink_codec::build_heartbeat;

use crate::adapter::PortAdapter;
use crate::signal::ShutdownSignal;
use crate::sync::lock;

/// Reference heartbeat interval.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(1);

/// Owned handle to a running heartbeat loop, joined in `disconnect`.
pub(crate) struct HeartbeatTask {
    pub(crate) stop: Arc<ShutdownSignal>,
    pub(crate) handle: JoinHandle<()>,
}

impl PortAdapter {
    /// Start the heartbeat loop: every `interval`, build a heartbeat frame
    /// tagged with this adapter's identity and `display_name`, and send it.
    ///
    /// Send failures are logged and the loop keeps going; once the adapter
    /// leaves `Connected` (including via send's self-disconnect) the loop
    /// exits instead of spinning. At most one loop runs per adapter.
    pub fn start_heartbeat(self: &Arc<Self>, display_name: &str, interval: Duration) {
        let mut slot = lock(&self.heartbeat);
        if slot.is_some() {
            debug!(port = %self.identifier(), "heartbeat already running");
            return;
        }

        let stop = Arc::new(ShutdownSignal::new());
        let task_stop = Arc::clone(&stop);
        let weak: Weak<PortAdapter> = Arc::downgrade(self);
        let name = display_name.to_owned();

        let handle = match std::thread::Builder::new()
            .name("heartbeat".into())
            .spawn(move || heartbeat_loop(&weak, &task_stop, &name, interval))
        {
            Ok(handle) => handle,
            Err(err) => {
                tracing::error!(%err, "failed to spawn heartbeat thread");
                return;
            }
        };

        *slot = Some(HeartbeatTask { stop, handle });
    }
}

fn heartbeat_loop(
    adapter: &Weak<PortAdapter>,
    stop: &ShutdownSignal,
    display_name: &str,
    interval: Duration,
) {
    loop {
        let Some(adapter) = adapter.upgrade() else {
            break;
        };
        if !adapter.is_connected() {
            debug!("adapter left connected state; heartbeat loop exiting");
            break;
        }

        let frame = build_heartbeat(adapter.identity(), display_name);
        if adapter.send(&frame) {
            debug!(identity = %adapter.identity(), "sent heartbeat");
        } else {
            warn!(identity = %adapter.identity(), "heartbeat send failed");
        }
        drop(adapter);

        if stop.wait_timeout(interval) {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use gndlink_codec::{MacAddr, ETHERTYPE_HEARTBEAT};

    use super::*;
    use crate::adapter::{PortConfig, DEFAULT_BAUD_RATE};
    use crate::mock::{MockFactory, MockTransport};

    const TICK: Duration = Duration::from_millis(10);

    fn connected_adapter() -> (Arc<PortAdapter>, Arc<MockTransport>) {
        let transport = MockTransport::new();
        let factory = MockFactory::new(Arc::clone(&transport));
        let adapter = PortAdapter::connect_with_identity(
            PortConfig::serial("/dev/ttyUSB0", DEFAULT_BAUD_RATE),
            &factory,
            MacAddr::locally_administered([9, 9, 9, 9]),
        )
        .expect("mock connect should succeed");
        (adapter, transport)
    }

    fn wait_for_frames(transport: &MockTransport, at_least: usize) -> Vec<Vec<u8>> {
        for _ in 0..200 {
            let frames = transport.sent_frames();
            if frames.len() >= at_least {
                return frames;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("expected at least {at_least} heartbeat frames");
    }

    #[test]
    fn emits_well_formed_heartbeats_periodically() {
        let (adapter, transport) = connected_adapter();
        adapter.start_heartbeat("gndlink", TICK);

        let frames = wait_for_frames(&transport, 2);
        for frame in &frames {
            assert_eq!(&frame[..6], &[0xFF; 6]);
            assert_eq!(&frame[6..12], &adapter.identity().octets());
            assert_eq!(&frame[12..14], &ETHERTYPE_HEARTBEAT);
            assert_eq!(&frame[14..16], &(7u16).to_be_bytes());
            assert_eq!(&frame[16..], b"gndlink");
        }

        adapter.disconnect();
    }

    #[test]
    fn loop_exits_after_send_induced_disconnect() {
        let (adapter, transport) = connected_adapter();
        adapter.start_heartbeat("gndlink", TICK);
        wait_for_frames(&transport, 1);

        transport.set_send_failure(true);
        for _ in 0..200 {
            if !adapter.is_connected() {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(!adapter.is_connected());

        // The loop observed the disconnect and stopped emitting.
        std::thread::sleep(TICK * 3);
        let settled = transport.sent_frames().len();
        std::thread::sleep(TICK * 3);
        assert_eq!(transport.sent_frames().len(), settled);
    }

    #[test]
    fn disconnect_joins_heartbeat_promptly() {
        let (adapter, transport) = connected_adapter();
        adapter.start_heartbeat("gndlink", Duration::from_secs(30));
        wait_for_frames(&transport, 1);

        let started = std::time::Instant::now();
        adapter.disconnect();
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn second_start_is_ignored_while_running() {
        let (adapter, transport) = connected_adapter();
        adapter.start_heartbeat("one", TICK);
        adapter.start_heartbeat("two", TICK);

        let frames = wait_for_frames(&transport, 3);
        assert!(frames.iter().all(|frame| frame.ends_with(b"one")));
        adapter.disconnect();
    }
}
