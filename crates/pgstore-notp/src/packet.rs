use serde::{Deserialize, Serialize};

use crate::error::{PacketError, PacketResult};

pub const PROTOCOL_VERSION: u32 = 1;

/// Raw bytes of one NOTP packet: a control frame followed by data frames.
///
/// An empty packet is a valid value; readers report it as
/// [`PacketError::EmptyPacket`] when asked for content.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Packet {
    pub data: Vec<u8>,
}

impl Packet {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<Vec<u8>> for Packet {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}

/// A value that can travel as the payload of a frame.
pub trait Packetable: Sized {
    fn serialize(&self) -> PacketResult<Vec<u8>>;
    fn deserialize(data: &[u8]) -> PacketResult<Self>;
}

/// The control packet that opens every NOTP packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolPacket {
    pub version: u32,
}

impl ProtocolPacket {
    pub fn new(version: u32) -> Self {
        Self { version }
    }

    /// Whether the peer speaks a version this implementation understands.
    pub fn is_supported(&self) -> bool {
        self.version == PROTOCOL_VERSION
    }
}

impl Default for ProtocolPacket {
    fn default() -> Self {
        Self::new(PROTOCOL_VERSION)
    }
}

impl Packetable for ProtocolPacket {
    fn serialize(&self) -> PacketResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| PacketError::Serialization(e.to_string()))
    }

    fn deserialize(data: &[u8]) -> PacketResult<Self> {
        bincode::deserialize(data).map_err(|e| PacketError::Deserialization(e.to_string()))
    }
}
