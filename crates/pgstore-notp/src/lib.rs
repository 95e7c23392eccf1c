//! NOTP wire protocol for PGStore.
//!
//! A NOTP packet is a byte buffer holding one control frame followed by a
//! stream of data frames. The first data frame declares the packet type and
//! how many data frames the stream holds; the reader hands them out one at a
//! time and refuses to read past the declared count.
//!
//! The protocol only moves opaque payloads. What the payloads mean (object
//! records, bundles) is decided by the layers above.

pub mod error;
pub mod frame;
pub mod packet;
pub mod reader;
pub mod state;
pub mod writer;

pub use error::{PacketError, PacketResult};
pub use frame::{StreamFrame, LENGTH_PREFIX_SIZE, MAX_FRAME_SIZE, STREAM_HEADER_SIZE};
pub use packet::{Packet, Packetable, ProtocolPacket, PROTOCOL_VERSION};
pub use reader::{DataPackets, PacketReader};
pub use state::{DataPacketState, StreamPhase};
pub use writer::PacketWriter;
