use std::iter::FusedIterator;

use tracing::debug;

use crate::error::{PacketError, PacketResult};
use crate::frame::{index_data_packet, read_data_packet, read_stream_data_packet};
use crate::packet::{Packet, Packetable, ProtocolPacket};
use crate::state::DataPacketState;

/// Reads the control packet and the data packet stream out of a [`Packet`].
///
/// Layout of the packet bytes:
///
/// ```text
/// [control frame][stream frame: type, count, data][frame]...[frame]
/// ```
///
/// where the stream frame is the first of `count` data frames.
#[derive(Clone, Debug)]
pub struct PacketReader {
    packet: Packet,
}

impl PacketReader {
    pub fn new(packet: Packet) -> Self {
        Self { packet }
    }

    pub fn packet(&self) -> &Packet {
        &self.packet
    }

    /// Decode the control packet that opens the packet.
    pub fn read_protocol(&self) -> PacketResult<ProtocolPacket> {
        self.read_control()
    }

    /// Decode the leading control frame as any [`Packetable`] type.
    pub fn read_control<P: Packetable>(&self) -> PacketResult<P> {
        let data = self.packet.as_bytes();
        if data.is_empty() {
            return Err(PacketError::EmptyPacket);
        }
        let (payload, _, _) = read_data_packet(0, data)?;
        P::deserialize(payload)
    }

    /// Read the next data packet of the stream.
    ///
    /// Pass `None` to read the first packet and the returned state on every
    /// later call. Once the returned state reports
    /// [`is_complete`](DataPacketState::is_complete), further calls fail with
    /// [`PacketError::AlreadyComplete`].
    pub fn read_next_data_packet(
        &self,
        state: Option<&DataPacketState>,
    ) -> PacketResult<(&[u8], DataPacketState)> {
        if let Some(state) = state.filter(|s| s.is_complete()) {
            return Err(PacketError::AlreadyComplete {
                packets: state.packets_read(),
            });
        }
        let data = self.packet.as_bytes();
        if data.is_empty() {
            return Err(PacketError::EmptyPacket);
        }

        match state {
            None => {
                let (offset, size) = index_data_packet(0, data)?;
                let frame = read_stream_data_packet(offset + size, data)?;
                let state = DataPacketState::first(&frame);
                debug!(
                    packet_type = frame.packet_type,
                    stream_count = frame.stream_count,
                    offset = frame.offset,
                    "data packet stream opened"
                );
                Ok((frame.payload, state))
            }
            Some(state) => {
                let (payload, offset, size) = read_data_packet(state.next_offset(), data)?;
                let next = state.advance(offset, size);
                debug!(
                    packet = next.packets_read(),
                    of = next.stream_count(),
                    offset,
                    size,
                    "data packet read"
                );
                Ok((payload, next))
            }
        }
    }

    /// Iterate over the data packet stream.
    ///
    /// The iterator ends after the declared number of packets, or right after
    /// yielding the first error.
    pub fn data_packets(&self) -> DataPackets<'_> {
        DataPackets {
            reader: self,
            state: None,
            failed: false,
        }
    }
}

/// Iterator over the payloads of a data packet stream.
#[derive(Debug)]
pub struct DataPackets<'a> {
    reader: &'a PacketReader,
    state: Option<DataPacketState>,
    failed: bool,
}

impl<'a> DataPackets<'a> {
    /// The cursor after the last successful read.
    pub fn state(&self) -> Option<&DataPacketState> {
        self.state.as_ref()
    }
}

impl<'a> Iterator for DataPackets<'a> {
    type Item = PacketResult<&'a [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.state.is_some_and(|s| s.is_complete()) {
            return None;
        }
        match self.reader.read_next_data_packet(self.state.as_ref()) {
            Ok((payload, state)) => {
                self.state = Some(state);
                Some(Ok(payload))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

impl FusedIterator for DataPackets<'_> {}
