//! Link session: startup/shutdown orchestration around one adapter.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::info;

use gndlink_transport::{
    PortAdapter, PortConfig, ReceiveCallback, ShutdownSignal, TransportFactory,
    HEARTBEAT_INTERVAL,
};

use crate::error::{LinkError, Result};

/// Session-level configuration.
#[derive(Debug, Clone)]
pub struct LinkConfig {
    pub port: PortConfig,
    /// Name carried in heartbeat frames.
    pub display_name: String,
    pub heartbeat_interval: Duration,
}

impl LinkConfig {
    pub fn new(port: PortConfig) -> Self {
        Self {
            port,
            display_name: "gndlink".to_owned(),
            heartbeat_interval: HEARTBEAT_INTERVAL,
        }
    }
}

/// Owns the startup ordering — open port, register dispatcher, start
/// heartbeat — and the mirror-image teardown.
///
/// `stop` only latches a signal, so it is safe to call from a Ctrl-C
/// handler thread and safe to call repeatedly; `run` performs the actual
/// teardown on the session thread after the signal fires.
pub struct LinkSession {
    config: LinkConfig,
    callback: ReceiveCallback,
    adapter: Mutex<Option<Arc<PortAdapter>>>,
    shutdown: Arc<ShutdownSignal>,
}

impl LinkSession {
    pub fn new(config: LinkConfig, callback: ReceiveCallback) -> Self {
        Self {
            config,
            callback,
            adapter: Mutex::new(None),
            shutdown: Arc::new(ShutdownSignal::new()),
        }
    }

    /// Connect the adapter, register the receive callback and start the
    /// heartbeat emitter. Any construction failure surfaces here; nothing
    /// is left half-started.
    pub fn start(&self, factory: &dyn TransportFactory) -> Result<()> {
        let mut slot = self
            .adapter
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return Err(LinkError::AlreadyStarted);
        }

        let adapter = PortAdapter::connect(self.config.port.clone(), factory)?;
        adapter.set_receive_callback(Arc::clone(&self.callback));
        adapter.start_heartbeat(&self.config.display_name, self.config.heartbeat_interval);
        info!(
            port = %adapter.identifier(),
            identity = %adapter.identity(),
            "link session started"
        );

        *slot = Some(adapter);
        Ok(())
    }

    /// The connected adapter, while the session is running.
    pub fn adapter(&self) -> Option<Arc<PortAdapter>> {
        self.adapter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Handle for wiring external stop sources (signal handlers).
    pub fn shutdown_signal(&self) -> Arc<ShutdownSignal> {
        Arc::clone(&self.shutdown)
    }

    /// Block until `stop` is called, then disconnect the adapter.
    pub fn run(&self) {
        self.shutdown.wait();
        self.teardown();
    }

    /// Request shutdown. Idempotent; callable from any thread.
    pub fn stop(&self) {
        self.shutdown.trigger();
    }

    fn teardown(&self) {
        let adapter = self
            .adapter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(adapter) = adapter {
            adapter.disconnect();
            info!(port = %adapter.identifier(), "link session stopped");
        }
    }
}

impl Drop for LinkSession {
    fn drop(&mut self) {
        self.stop();
        self.teardown();
    }
}
