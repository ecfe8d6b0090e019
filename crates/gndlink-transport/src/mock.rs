//! In-memory byte transport for tests: records sends, scripts failures,
//! and lets tests play the link's receive thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::adapter::PortConfig;
use crate::byte_transport::{ByteTransport, ReceiveCallback, TransportFactory};
use crate::error::{Result, TransportError};
use crate::sync::lock;

#[derive(Default)]
pub struct MockTransport {
    sent: Mutex<Vec<Vec<u8>>>,
    callback: Mutex<Option<ReceiveCallback>>,
    fail_sends: AtomicBool,
    closed: AtomicBool,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Everything sent so far, in order.
    pub fn sent_frames(&self) -> Vec<Vec<u8>> {
        lock(&self.sent).clone()
    }

    /// Deliver one inbound message through the registered callback, the way
    /// the link's receive thread would.
    pub fn inject(&self, data: &[u8]) {
        let callback = lock(&self.callback).clone();
        if let Some(callback) = callback {
            callback(data);
        }
    }

    /// Make subsequent sends fail with a broken-pipe error.
    pub fn set_send_failure(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn callback_registered(&self) -> bool {
        lock(&self.callback).is_some()
    }
}

impl ByteTransport for Arc<MockTransport> {
    fn send(&self, data: &[u8]) -> std::io::Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "mock transport closed",
            ));
        }
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "scripted send failure",
            ));
        }
        lock(&self.sent).push(data.to_vec());
        Ok(())
    }

    fn set_receive_callback(&self, callback: ReceiveCallback) {
        *lock(&self.callback) = Some(callback);
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        *lock(&self.callback) = None;
    }
}

/// Factory producing handles to one shared [`MockTransport`], so tests keep
/// a side door into the transport an adapter owns.
pub struct MockFactory {
    transport: Option<Arc<MockTransport>>,
}

impl MockFactory {
    pub fn new(transport: Arc<MockTransport>) -> Self {
        Self {
            transport: Some(transport),
        }
    }

    /// A factory whose `open` always fails, for exercising connect errors.
    pub fn failing() -> Self {
        Self { transport: None }
    }
}

impl TransportFactory for MockFactory {
    fn open(&self, config: &PortConfig) -> Result<Box<dyn ByteTransport>> {
        match &self.transport {
            Some(transport) => Ok(Box::new(Arc::clone(transport))),
            None => Err(TransportError::Open {
                kind: config.kind,
                identifier: config.identifier.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such port"),
            }),
        }
    }
}
