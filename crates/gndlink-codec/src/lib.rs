//! Binary frame codec for the gndlink command/telemetry wire protocol.
//!
//! Pure byte-level encode/decode: command frames, telemetry packets,
//! heartbeat envelopes, and the configuration-noise marker. Framing is
//! length-prefixed and type-tagged at the byte level so decode cost stays
//! O(1) per field and truncated input degrades to a malformed-frame error
//! (or, for telemetry channel lists, a partial result) instead of an
//! out-of-bounds read.
//!
//! Nothing here touches I/O or clocks; timestamps and identities are
//! supplied by the caller.

pub mod command;
pub mod error;
pub mod framing;
pub mod telemetry;
pub mod wire;

pub use command::{decode_command, encode_command, DecodedCommand, COMMAND_HEADER_SIZE};
pub use error::{FrameError, Result};
pub use framing::{
    build_data_frame, build_heartbeat, build_telemetry_frame, encode_frame, is_config_marker,
    strip_telemetry_marker, ENVELOPE_HEADER_SIZE, LENGTH_PREFIX_SIZE,
};
pub use telemetry::{
    decode_telemetry, encode_telemetry, ChannelReading, ChannelSample, TelemetryFrame,
    TELEMETRY_MIN_SIZE, TELEMETRY_PACKET_TYPE,
};
pub use wire::{
    MacAddr, COMMAND_DESCRIPTOR, CONFIG_MARKER, ETHERTYPE_DATA, ETHERTYPE_HEARTBEAT,
    ETHERTYPE_TELEMETRY,
};
