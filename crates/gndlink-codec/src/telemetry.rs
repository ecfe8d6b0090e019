//! Telemetry frame codec.
//!
//! Packet layout:
//!
//! ```text
//! ┌──────────┬──────┬───────────┬───────┬──────────────────────────────┐
//! │ Length   │ Type │ Timestamp │ Count │ Count × channel entry        │
//! │ (2B BE)  │ 0x01 │ (8B BE)   │ (2B)  │ id:4B, value_len:2B, value   │
//! └──────────┴──────┴───────────┴───────┴──────────────────────────────┘
//! ```
//!
//! The length field counts every byte after itself and is back-patched once
//! the body is fully built.

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Packet type tag for telemetry.
pub const TELEMETRY_PACKET_TYPE: u8 = 0x01;

/// Minimum telemetry packet size: length (2) + type (1) + timestamp (8) +
/// channel count (2).
pub const TELEMETRY_MIN_SIZE: usize = 13;

/// One channel reading queued for downlink. Readings with an absent value
/// are skipped at encode time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelReading {
    pub id: u32,
    pub value: Option<Bytes>,
}

impl ChannelReading {
    pub fn new(id: u32, value: impl Into<Bytes>) -> Self {
        Self {
            id,
            value: Some(value.into()),
        }
    }

    /// A reading whose value was unavailable at sample time.
    pub fn absent(id: u32) -> Self {
        Self { id, value: None }
    }
}

/// One channel entry recovered from a telemetry packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSample {
    pub id: u32,
    pub value: Bytes,
}

/// A decoded telemetry packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryFrame {
    /// Unix seconds at encode time.
    pub timestamp: u64,
    /// Channel entries in wire order. May be shorter than the declared
    /// count when the packet was truncated in flight.
    pub channels: Vec<ChannelSample>,
}

/// Encode readings into a telemetry packet.
///
/// Readings are emitted in caller order; absent values are skipped and do
/// not count toward the channel count. The timestamp is caller-supplied so
/// encoding stays deterministic under test.
pub fn encode_telemetry(readings: &[ChannelReading], timestamp: u64) -> Result<Bytes> {
    let mut packet = BytesMut::with_capacity(TELEMETRY_MIN_SIZE);
    packet.put_u16(0); // length, patched below
    packet.put_u8(TELEMETRY_PACKET_TYPE);
    packet.put_u64(timestamp);

    let count_offset = packet.len();
    packet.put_u16(0); // channel count, patched below

    let mut emitted: u16 = 0;
    for reading in readings {
        let Some(value) = &reading.value else {
            continue;
        };
        if value.len() > u16::MAX as usize {
            return Err(FrameError::PayloadTooLarge {
                size: value.len(),
                max: u16::MAX as usize,
            });
        }
        packet.put_u32(reading.id);
        packet.put_u16(value.len() as u16);
        packet.put_slice(value);
        emitted += 1;
    }

    let body_len = packet.len() - 2;
    if body_len > u16::MAX as usize {
        return Err(FrameError::PayloadTooLarge {
            size: body_len,
            max: u16::MAX as usize,
        });
    }
    packet[..2].copy_from_slice(&(body_len as u16).to_be_bytes());
    packet[count_offset..count_offset + 2].copy_from_slice(&emitted.to_be_bytes());

    Ok(packet.freeze())
}

/// Decode a telemetry packet.
///
/// Fails on buffers shorter than the minimum header or with a foreign packet
/// type. A channel entry that would read past the buffer end stops decoding,
/// and the channels parsed so far are returned — a noisy link truncating the
/// tail of a packet costs the tail, not the whole packet.
pub fn decode_telemetry(buf: &[u8]) -> Result<TelemetryFrame> {
    if buf.len() < TELEMETRY_MIN_SIZE {
        return Err(FrameError::TooShort {
            len: buf.len(),
            need: TELEMETRY_MIN_SIZE,
        });
    }

    let mut ptr = 2; // declared length is advisory here; bounds drive the parse
    let packet_type = buf[ptr];
    ptr += 1;
    if packet_type != TELEMETRY_PACKET_TYPE {
        return Err(FrameError::PacketType { found: packet_type });
    }

    let timestamp = u64::from_be_bytes(buf[ptr..ptr + 8].try_into().expect("8-byte slice"));
    ptr += 8;
    let declared_count = u16::from_be_bytes([buf[ptr], buf[ptr + 1]]);
    ptr += 2;

    let mut channels = Vec::with_capacity(declared_count as usize);
    for _ in 0..declared_count {
        if ptr + 6 > buf.len() {
            break;
        }
        let id = u32::from_be_bytes(buf[ptr..ptr + 4].try_into().expect("4-byte slice"));
        ptr += 4;
        let value_len = u16::from_be_bytes([buf[ptr], buf[ptr + 1]]) as usize;
        ptr += 2;

        if ptr + value_len > buf.len() {
            break;
        }
        channels.push(ChannelSample {
            id,
            value: Bytes::copy_from_slice(&buf[ptr..ptr + value_len]),
        });
        ptr += value_len;
    }

    Ok(TelemetryFrame {
        timestamp,
        channels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_readings() -> Vec<ChannelReading> {
        vec![
            ChannelReading::new(1, vec![0x00, 0x00, 0x00, 0x05]),
            ChannelReading::new(2, vec![0x3F, 0x80, 0x00, 0x00]),
        ]
    }

    #[test]
    fn encode_decode_roundtrip_preserves_order() {
        let packet = encode_telemetry(&two_readings(), 1_700_000_000).unwrap();
        let frame = decode_telemetry(&packet).unwrap();

        assert_eq!(frame.timestamp, 1_700_000_000);
        assert_eq!(frame.channels.len(), 2);
        assert_eq!(frame.channels[0].id, 1);
        assert_eq!(frame.channels[0].value.as_ref(), &[0x00, 0x00, 0x00, 0x05]);
        assert_eq!(frame.channels[1].id, 2);
        assert_eq!(frame.channels[1].value.as_ref(), &[0x3F, 0x80, 0x00, 0x00]);
    }

    #[test]
    fn two_channel_packet_layout() {
        // Header 13 bytes plus two entries of 4+2+4 bytes each.
        let packet = encode_telemetry(&two_readings(), 42).unwrap();
        assert_eq!(packet.len(), 13 + 10 + 10);

        let declared = u16::from_be_bytes([packet[0], packet[1]]) as usize;
        assert_eq!(declared, packet.len() - 2);
        assert_eq!(packet[2], TELEMETRY_PACKET_TYPE);
        assert_eq!(u16::from_be_bytes([packet[11], packet[12]]), 2);
    }

    #[test]
    fn absent_values_are_skipped_and_uncounted() {
        let readings = vec![
            ChannelReading::new(1, vec![0xAA]),
            ChannelReading::absent(2),
            ChannelReading::new(3, vec![0xBB, 0xCC]),
        ];
        let packet = encode_telemetry(&readings, 0).unwrap();
        let frame = decode_telemetry(&packet).unwrap();

        assert_eq!(u16::from_be_bytes([packet[11], packet[12]]), 2);
        assert_eq!(frame.channels.len(), 2);
        assert_eq!(frame.channels[0].id, 1);
        assert_eq!(frame.channels[1].id, 3);
    }

    #[test]
    fn empty_reading_list_encodes_header_only() {
        let packet = encode_telemetry(&[], 9).unwrap();
        assert_eq!(packet.len(), TELEMETRY_MIN_SIZE);

        let frame = decode_telemetry(&packet).unwrap();
        assert_eq!(frame.timestamp, 9);
        assert!(frame.channels.is_empty());
    }

    #[test]
    fn under_minimum_size_rejected() {
        let err = decode_telemetry(&[0u8; 12]).unwrap_err();
        assert!(matches!(err, FrameError::TooShort { need: 13, .. }));
    }

    #[test]
    fn foreign_packet_type_rejected() {
        let mut packet = encode_telemetry(&two_readings(), 1).unwrap().to_vec();
        packet[2] = 0x02;

        let err = decode_telemetry(&packet).unwrap_err();
        assert!(matches!(err, FrameError::PacketType { found: 0x02 }));
    }

    #[test]
    fn truncated_channel_list_yields_partial_result() {
        let packet = encode_telemetry(&two_readings(), 5).unwrap();

        // Cut into the second entry's value: only the first channel survives.
        let frame = decode_telemetry(&packet[..packet.len() - 2]).unwrap();
        assert_eq!(frame.channels.len(), 1);
        assert_eq!(frame.channels[0].id, 1);

        // Cut into the second entry's header: same outcome.
        let frame = decode_telemetry(&packet[..13 + 10 + 3]).unwrap();
        assert_eq!(frame.channels.len(), 1);
    }

    #[test]
    fn truncation_never_reads_out_of_bounds() {
        let packet = encode_telemetry(&two_readings(), 5).unwrap();
        for cut in TELEMETRY_MIN_SIZE..packet.len() {
            let frame = decode_telemetry(&packet[..cut]).unwrap();
            assert!(frame.channels.len() <= 2);
        }
    }

    #[test]
    fn empty_value_bytes_are_valid() {
        let packet = encode_telemetry(&[ChannelReading::new(7, Vec::new())], 1).unwrap();
        let frame = decode_telemetry(&packet).unwrap();

        assert_eq!(frame.channels.len(), 1);
        assert!(frame.channels[0].value.is_empty());
    }
}
