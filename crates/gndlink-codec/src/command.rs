//! Command frame codec.
//!
//! Command body layout (no outer length prefix):
//!
//! ```text
//! ┌────────────────┬──────────────┬──────────────────────────┐
//! │ Descriptor     │ Opcode       │ Arguments                │
//! │ (4B BE)        │ (4B BE)      │ (UTF-8, space-joined)    │
//! │ 0x5A5A5A5A     │              │                          │
//! └────────────────┴──────────────┴──────────────────────────┘
//! ```
//!
//! On the wire the body is preceded by a 2-byte big-endian length prefix;
//! [`decode_command`] consumes the prefixed form, [`encode_command`] produces
//! the bare body for the framing layer to prefix.

use bytes::BufMut;

use crate::error::{FrameError, Result};
use crate::framing::LENGTH_PREFIX_SIZE;
use crate::wire::COMMAND_DESCRIPTOR;

/// Fixed command header: descriptor (4) + opcode (4).
pub const COMMAND_HEADER_SIZE: usize = 8;

/// A decoded command frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCommand {
    /// Numeric command identifier, resolved externally to a template.
    pub opcode: u32,
    /// Whitespace-split argument tokens, in wire order.
    pub args: Vec<String>,
}

/// Encode a command body: descriptor, opcode, then the space-joined
/// argument tokens.
///
/// Argument count is not validated against any template here; that is the
/// sending/dispatching caller's responsibility.
pub fn encode_command<S: AsRef<str>>(opcode: u32, args: &[S]) -> Vec<u8> {
    let joined = args
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ");

    let mut body = Vec::with_capacity(COMMAND_HEADER_SIZE + joined.len());
    body.put_u32(COMMAND_DESCRIPTOR);
    body.put_u32(opcode);
    body.extend_from_slice(joined.as_bytes());
    body
}

/// Decode a length-prefixed command frame.
///
/// Fails when the buffer cannot hold the length prefix, when the declared
/// length exceeds the buffer, when the body is shorter than the fixed
/// descriptor+opcode header, or when the argument region is not valid UTF-8.
/// The descriptor is skipped without validation.
pub fn decode_command(buf: &[u8]) -> Result<DecodedCommand> {
    if buf.len() < LENGTH_PREFIX_SIZE {
        return Err(FrameError::TooShort {
            len: buf.len(),
            need: LENGTH_PREFIX_SIZE,
        });
    }

    let declared = u16::from_be_bytes([buf[0], buf[1]]) as usize;
    let available = buf.len() - LENGTH_PREFIX_SIZE;
    if declared > available {
        return Err(FrameError::LengthMismatch {
            declared,
            available,
        });
    }

    let body = &buf[LENGTH_PREFIX_SIZE..LENGTH_PREFIX_SIZE + declared];
    if body.len() < COMMAND_HEADER_SIZE {
        return Err(FrameError::TooShort {
            len: body.len(),
            need: COMMAND_HEADER_SIZE,
        });
    }

    let opcode = u32::from_be_bytes([body[4], body[5], body[6], body[7]]);
    let arg_region =
        std::str::from_utf8(&body[COMMAND_HEADER_SIZE..]).map_err(|_| FrameError::InvalidUtf8)?;
    let args = arg_region.split_whitespace().map(str::to_owned).collect();

    Ok(DecodedCommand { opcode, args })
}
