//! Command/telemetry dictionary seam and channel value typing.
//!
//! The dictionary is loaded once by the embedding application and read-only
//! afterwards, so the heartbeat, receive and send paths share it through an
//! `Arc` without locking.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{LinkError, Result};

/// Read-only lookup of command and channel templates.
pub trait DictionaryService: Send + Sync {
    fn command_by_opcode(&self, opcode: u32) -> Option<&CommandTemplate>;
    fn command_by_name(&self, name: &str) -> Option<&CommandTemplate>;
    fn channel_by_id(&self, id: u32) -> Option<&ChannelTemplate>;
}

/// Shared dictionary handle.
pub type DictionaryHandle = Arc<dyn DictionaryService>;

/// Metadata for one command mnemonic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandTemplate {
    pub opcode: u32,
    pub component: String,
    pub mnemonic: String,
    pub argument_count: usize,
}

impl CommandTemplate {
    /// `component.mnemonic`, the form handed to command executors.
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.component, self.mnemonic)
    }
}

/// Metadata for one telemetry measurement point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelTemplate {
    pub id: u32,
    pub name: String,
    pub value_type: ValueType,
}

/// On-wire type of a channel value. Numeric types are big-endian and
/// fixed-width; `Text` is UTF-8 of any length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValueType {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Text,
}

impl ValueType {
    /// Wire width in bytes, or `None` for variable-length types.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            ValueType::U8 | ValueType::I8 => Some(1),
            ValueType::U16 | ValueType::I16 => Some(2),
            ValueType::U32 | ValueType::I32 | ValueType::F32 => Some(4),
            ValueType::U64 | ValueType::I64 | ValueType::F64 => Some(8),
            ValueType::Text => None,
        }
    }

    /// Deserialize one value of this type from its exact wire bytes.
    pub fn decode(&self, bytes: &[u8]) -> Result<ChannelValue> {
        if let Some(want) = self.fixed_size() {
            if bytes.len() != want {
                return Err(LinkError::ValueLength {
                    value_type: *self,
                    want,
                    got: bytes.len(),
                });
            }
        }

        let value = match self {
            ValueType::U8 => ChannelValue::Unsigned(bytes[0] as u64),
            ValueType::U16 => {
                ChannelValue::Unsigned(u16::from_be_bytes([bytes[0], bytes[1]]) as u64)
            }
            ValueType::U32 => ChannelValue::Unsigned(u32::from_be_bytes(
                bytes.try_into().expect("length checked"),
            ) as u64),
            ValueType::U64 => ChannelValue::Unsigned(u64::from_be_bytes(
                bytes.try_into().expect("length checked"),
            )),
            ValueType::I8 => ChannelValue::Signed(bytes[0] as i8 as i64),
            ValueType::I16 => {
                ChannelValue::Signed(i16::from_be_bytes([bytes[0], bytes[1]]) as i64)
            }
            ValueType::I32 => ChannelValue::Signed(i32::from_be_bytes(
                bytes.try_into().expect("length checked"),
            ) as i64),
            ValueType::I64 => ChannelValue::Signed(i64::from_be_bytes(
                bytes.try_into().expect("length checked"),
            )),
            ValueType::F32 => ChannelValue::Float(f32::from_be_bytes(
                bytes.try_into().expect("length checked"),
            ) as f64),
            ValueType::F64 => ChannelValue::Float(f64::from_be_bytes(
                bytes.try_into().expect("length checked"),
            )),
            ValueType::Text => ChannelValue::Text(
                std::str::from_utf8(bytes)
                    .map_err(|_| LinkError::ValueUtf8)?
                    .to_owned(),
            ),
        };
        Ok(value)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::U8 => "U8",
            ValueType::U16 => "U16",
            ValueType::U32 => "U32",
            ValueType::U64 => "U64",
            ValueType::I8 => "I8",
            ValueType::I16 => "I16",
            ValueType::I32 => "I32",
            ValueType::I64 => "I64",
            ValueType::F32 => "F32",
            ValueType::F64 => "F64",
            ValueType::Text => "TEXT",
        };
        f.write_str(name)
    }
}

/// A decoded channel value.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelValue {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for ChannelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelValue::Unsigned(v) => write!(f, "{v}"),
            ChannelValue::Signed(v) => write!(f, "{v}"),
            ChannelValue::Float(v) => write!(f, "{v}"),
            ChannelValue::Text(v) => f.write_str(v),
        }
    }
}

/// Map-backed dictionary. Later entries win on duplicate keys.
#[derive(Debug, Default)]
pub struct InMemoryDictionary {
    by_opcode: HashMap<u32, CommandTemplate>,
    by_name: HashMap<String, u32>,
    channels: HashMap<u32, ChannelTemplate>,
}

impl InMemoryDictionary {
    pub fn new(commands: Vec<CommandTemplate>, channels: Vec<ChannelTemplate>) -> Self {
        let mut dictionary = Self::default();
        for command in commands {
            dictionary.by_name.insert(command.full_name(), command.opcode);
            dictionary.by_opcode.insert(command.opcode, command);
        }
        for channel in channels {
            dictionary.channels.insert(channel.id, channel);
        }
        dictionary
    }

    pub fn commands(&self) -> impl Iterator<Item = &CommandTemplate> {
        self.by_opcode.values()
    }

    pub fn channels(&self) -> impl Iterator<Item = &ChannelTemplate> {
        self.channels.values()
    }
}

impl DictionaryService for InMemoryDictionary {
    fn command_by_opcode(&self, opcode: u32) -> Option<&CommandTemplate> {
        self.by_opcode.get(&opcode)
    }

    fn command_by_name(&self, name: &str) -> Option<&CommandTemplate> {
        self.by_name
            .get(name)
            .and_then(|opcode| self.by_opcode.get(opcode))
    }

    fn channel_by_id(&self, id: u32) -> Option<&ChannelTemplate> {
        self.channels.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dictionary() -> InMemoryDictionary {
        InMemoryDictionary::new(
            vec![CommandTemplate {
                opcode: 0x42,
                component: "MATH".into(),
                mnemonic: "ADD".into(),
                argument_count: 2,
            }],
            vec![ChannelTemplate {
                id: 1,
                name: "MATH.RESULT".into(),
                value_type: ValueType::U32,
            }],
        )
    }

    #[test]
    fn lookups_resolve_both_directions() {
        let dict = dictionary();
        let by_opcode = dict.command_by_opcode(0x42).unwrap();
        assert_eq!(by_opcode.full_name(), "MATH.ADD");

        let by_name = dict.command_by_name("MATH.ADD").unwrap();
        assert_eq!(by_name.opcode, 0x42);

        assert!(dict.command_by_opcode(0x99).is_none());
        assert!(dict.command_by_name("MATH.SUB").is_none());
        assert_eq!(dict.channel_by_id(1).unwrap().value_type, ValueType::U32);
        assert!(dict.channel_by_id(2).is_none());
    }

    #[test]
    fn numeric_value_decoding() {
        assert_eq!(
            ValueType::U32.decode(&[0, 0, 0, 5]).unwrap(),
            ChannelValue::Unsigned(5)
        );
        assert_eq!(
            ValueType::I16.decode(&[0xFF, 0xFE]).unwrap(),
            ChannelValue::Signed(-2)
        );
        assert_eq!(
            ValueType::F32.decode(&[0x3F, 0x80, 0x00, 0x00]).unwrap(),
            ChannelValue::Float(1.0)
        );
        assert_eq!(
            ValueType::U8.decode(&[0xFF]).unwrap(),
            ChannelValue::Unsigned(255)
        );
    }

    #[test]
    fn text_value_decoding() {
        assert_eq!(
            ValueType::Text.decode(b"nominal").unwrap(),
            ChannelValue::Text("nominal".into())
        );
        assert!(matches!(
            ValueType::Text.decode(&[0xFF, 0xFE]),
            Err(LinkError::ValueUtf8)
        ));
    }

    #[test]
    fn wrong_width_rejected() {
        let err = ValueType::U32.decode(&[0, 0, 5]).unwrap_err();
        assert!(matches!(
            err,
            LinkError::ValueLength {
                want: 4,
                got: 3,
                ..
            }
        ));
    }

    #[test]
    fn value_display() {
        assert_eq!(ChannelValue::Unsigned(7).to_string(), "7");
        assert_eq!(ChannelValue::Signed(-3).to_string(), "-3");
        assert_eq!(ChannelValue::Text("ok".into()).to_string(), "ok");
    }
}
