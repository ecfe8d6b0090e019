/// Errors that can occur during frame encoding/decoding.
///
/// Every variant is a structurally-malformed-frame condition: callers drop
/// the offending frame and keep the link running.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The buffer is shorter than the fixed header it must contain.
    #[error("frame too short ({len} bytes, need at least {need})")]
    TooShort { len: usize, need: usize },

    /// The declared length field points past the end of the buffer.
    #[error("declared length {declared} exceeds buffer ({available} bytes available)")]
    LengthMismatch { declared: usize, available: usize },

    /// The packet type tag is not one this codec understands.
    #[error("unexpected packet type {found:#04x}")]
    PacketType { found: u8 },

    /// The argument region of a command frame is not valid UTF-8.
    #[error("command arguments are not valid UTF-8")]
    InvalidUtf8,

    /// The payload exceeds what a 2-byte length prefix can describe.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
