//! Link-layer framing: length prefixes, EtherType markers, and the
//! MAC-addressed envelopes carried on Ethernet-style transports.

use bytes::{BufMut, BytesMut};

use crate::error::{FrameError, Result};
use crate::wire::{
    MacAddr, CONFIG_MARKER, ETHERTYPE_DATA, ETHERTYPE_HEARTBEAT, ETHERTYPE_TELEMETRY,
};

/// Every frame's outer length prefix: 2 bytes, big-endian, counting the
/// bytes that follow it.
pub const LENGTH_PREFIX_SIZE: usize = 2;

/// MAC envelope header: destination (6) + source (6) + EtherType (2).
pub const ENVELOPE_HEADER_SIZE: usize = 14;

/// Append the length-prefixed form of `body` to `dst`.
pub fn encode_frame(body: &[u8], dst: &mut BytesMut) -> Result<()> {
    if body.len() > u16::MAX as usize {
        return Err(FrameError::PayloadTooLarge {
            size: body.len(),
            max: u16::MAX as usize,
        });
    }
    dst.reserve(LENGTH_PREFIX_SIZE + body.len());
    dst.put_u16(body.len() as u16);
    dst.put_slice(body);
    Ok(())
}

/// True iff the bytes open with the link-configuration marker.
///
/// Configuration packets take precedence over every other frame class: a
/// payload starting with the marker is never decoded as command or
/// telemetry, whatever follows.
pub fn is_config_marker(data: &[u8]) -> bool {
    data.starts_with(&CONFIG_MARKER)
}

/// Strip the telemetry EtherType marker, returning the packet behind it.
pub fn strip_telemetry_marker(data: &[u8]) -> Option<&[u8]> {
    data.strip_prefix(&ETHERTYPE_TELEMETRY[..])
}

/// Assemble a heartbeat frame: broadcast destination, adapter identity,
/// heartbeat EtherType, then `name_len:u16` + UTF-8 name.
pub fn build_heartbeat(identity: MacAddr, display_name: &str) -> Vec<u8> {
    let name = display_name.as_bytes();
    let mut frame = Vec::with_capacity(ENVELOPE_HEADER_SIZE + LENGTH_PREFIX_SIZE + name.len());
    frame.extend_from_slice(&MacAddr::BROADCAST.octets());
    frame.extend_from_slice(&identity.octets());
    frame.extend_from_slice(&ETHERTYPE_HEARTBEAT);
    frame.extend_from_slice(&(name.len() as u16).to_be_bytes());
    frame.extend_from_slice(name);
    frame
}

/// Assemble a data frame: broadcast destination, adapter identity, data
/// EtherType, then the length-prefixed body.
pub fn build_data_frame(identity: MacAddr, body: &[u8]) -> Result<Vec<u8>> {
    if body.len() > u16::MAX as usize {
        return Err(FrameError::PayloadTooLarge {
            size: body.len(),
            max: u16::MAX as usize,
        });
    }
    let mut frame = Vec::with_capacity(ENVELOPE_HEADER_SIZE + LENGTH_PREFIX_SIZE + body.len());
    frame.extend_from_slice(&MacAddr::BROADCAST.octets());
    frame.extend_from_slice(&identity.octets());
    frame.extend_from_slice(&ETHERTYPE_DATA);
    frame.extend_from_slice(&(body.len() as u16).to_be_bytes());
    frame.extend_from_slice(body);
    Ok(frame)
}

/// Assemble a telemetry frame: telemetry EtherType marker + packet.
pub fn build_telemetry_frame(packet: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(ETHERTYPE_TELEMETRY.len() + packet.len());
    frame.extend_from_slice(&ETHERTYPE_TELEMETRY);
    frame.extend_from_slice(packet);
    frame
}
