//! Inbound frame dispatch.
//!
//! Both dispatchers run on the transport's receive thread, one invocation
//! per delivered message. Nothing thrown here unwinds into the receive
//! loop: malformed frames and unresolvable identifiers are logged with
//! enough context to diagnose them and then dropped.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, error, info, warn};

use gndlink_codec::{decode_command, decode_telemetry, is_config_marker, strip_telemetry_marker};
use gndlink_transport::ReceiveCallback;

use crate::dictionary::{ChannelTemplate, ChannelValue, DictionaryHandle};
use crate::error::{LinkError, Result};
use crate::executor::CommandExecutor;

/// Receives `(channel, value, timestamp)` tuples on the ground side.
pub trait TelemetrySink: Send + Sync {
    fn accept(&self, channel: &ChannelTemplate, value: ChannelValue, timestamp: u64);
}

/// Unix seconds now; the timestamp stamped onto encoded telemetry.
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

fn hex(data: &[u8]) -> String {
    data.iter().fold(String::with_capacity(data.len() * 2), |mut out, byte| {
        let _ = write!(out, "{byte:02x}");
        out
    })
}

/// Decodes inbound command frames and hands them to the executor.
pub struct CommandDispatcher {
    dictionary: DictionaryHandle,
    executor: Arc<dyn CommandExecutor>,
}

impl CommandDispatcher {
    pub fn new(dictionary: DictionaryHandle, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            dictionary,
            executor,
        }
    }

    /// Handle one delivered message. Never fails; error conditions are
    /// terminal here.
    pub fn handle(&self, raw: &[u8]) {
        if is_config_marker(raw) {
            debug!("dropping link-configuration packet");
            return;
        }
        if let Err(err) = self.dispatch(raw) {
            match err {
                LinkError::Frame(err) => {
                    debug!(len = raw.len(), payload = %hex(raw), %err, "dropping malformed frame");
                }
                err => warn!(%err, "dropping command frame"),
            }
        }
    }

    fn dispatch(&self, raw: &[u8]) -> Result<()> {
        let decoded = decode_command(raw)?;
        let template = self
            .dictionary
            .command_by_opcode(decoded.opcode)
            .ok_or(LinkError::UnknownOpcode {
                opcode: decoded.opcode,
            })?;
        if decoded.args.len() != template.argument_count {
            return Err(LinkError::ArgumentCount {
                command: template.full_name(),
                want: template.argument_count,
                got: decoded.args.len(),
            });
        }

        let command = template.full_name();
        info!(%command, opcode = format_args!("{:#010x}", decoded.opcode), args = ?decoded.args, "decoded command");
        match self.executor.execute(&command, &decoded.args) {
            Ok(()) => info!(%command, "command executed"),
            Err(err) => error!(%command, %err, "command execution failed"),
        }
        Ok(())
    }

    /// Adapt into the transport's receive callback.
    pub fn into_callback(self) -> ReceiveCallback {
        Arc::new(move |raw: &[u8]| self.handle(raw))
    }
}

/// Decodes inbound telemetry packets and feeds the ground-system sink.
pub struct TelemetryDispatcher {
    dictionary: DictionaryHandle,
    sink: Arc<dyn TelemetrySink>,
}

impl TelemetryDispatcher {
    pub fn new(dictionary: DictionaryHandle, sink: Arc<dyn TelemetrySink>) -> Self {
        Self { dictionary, sink }
    }

    /// Handle one delivered message. One bad channel entry never discards
    /// the rest of the packet.
    pub fn handle(&self, raw: &[u8]) {
        if is_config_marker(raw) {
            debug!("dropping link-configuration packet");
            return;
        }
        let Some(packet) = strip_telemetry_marker(raw) else {
            debug!(len = raw.len(), "ignoring non-telemetry traffic");
            return;
        };

        let frame = match decode_telemetry(packet) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(len = raw.len(), payload = %hex(raw), %err, "dropping malformed telemetry packet");
                return;
            }
        };
        debug!(
            channels = frame.channels.len(),
            timestamp = frame.timestamp,
            "received telemetry packet"
        );

        for sample in &frame.channels {
            if let Err(err) = self.forward(sample.id, &sample.value, frame.timestamp) {
                warn!(channel = sample.id, %err, "skipping channel entry");
            }
        }
    }

    fn forward(&self, id: u32, value_bytes: &[u8], timestamp: u64) -> Result<()> {
        let template = self
            .dictionary
            .channel_by_id(id)
            .ok_or(LinkError::UnknownChannel { id })?;
        let value = template.value_type.decode(value_bytes)?;
        debug!(channel = %template.name, %value, timestamp, "channel update");
        self.sink.accept(template, value, timestamp);
        Ok(())
    }

    /// Adapt into the transport's receive callback.
    pub fn into_callback(self) -> ReceiveCallback {
        Arc::new(move |raw: &[u8]| self.handle(raw))
    }
}
