use tracing::debug;

use crate::error::{PacketError, PacketResult};
use crate::frame::{write_data_packet, write_stream_data_packet};
use crate::packet::{Packet, Packetable, ProtocolPacket};

/// Builds a [`Packet`] in the layout [`PacketReader`](crate::PacketReader) expects.
#[derive(Debug, Default)]
pub struct PacketWriter {
    packet: Packet,
    stream_written: bool,
}

impl PacketWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the control frame. Must come first.
    pub fn write_protocol(&mut self, protocol: &ProtocolPacket) -> PacketResult<()> {
        self.write_control(protocol)
    }

    pub fn write_control<P: Packetable>(&mut self, control: &P) -> PacketResult<()> {
        if !self.packet.is_empty() {
            return Err(PacketError::ProtocolAlreadyWritten);
        }
        let payload = control.serialize()?;
        write_data_packet(&mut self.packet.data, &payload)
    }

    /// Write the whole data packet stream, one frame per payload.
    ///
    /// Nothing is written if any payload is rejected.
    pub fn write_data_stream<P: AsRef<[u8]>>(
        &mut self,
        packet_type: i32,
        payloads: &[P],
    ) -> PacketResult<()> {
        if self.packet.is_empty() {
            return Err(PacketError::EmptyPacket);
        }
        if self.stream_written {
            return Err(PacketError::StreamAlreadyWritten);
        }
        let Some((first, rest)) = payloads.split_first() else {
            return Err(PacketError::MalformedStream { declared: 0 });
        };
        let stream_count = i32::try_from(payloads.len()).map_err(|_| {
            PacketError::Framing(format!("{} data packets exceed the stream limit", payloads.len()))
        })?;

        let mut frames = Vec::new();
        write_stream_data_packet(&mut frames, packet_type, stream_count, first.as_ref())?;
        for payload in rest {
            write_data_packet(&mut frames, payload.as_ref())?;
        }
        debug!(packet_type, stream_count, size = frames.len(), "data packet stream written");
        self.packet.data.extend_from_slice(&frames);
        self.stream_written = true;
        Ok(())
    }

    pub fn packet(&self) -> &Packet {
        &self.packet
    }

    pub fn into_packet(self) -> Packet {
        self.packet
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::MAX_FRAME_SIZE;

    #[test]
    fn stream_requires_protocol() {
        let mut writer = PacketWriter::new();
        let err = writer.write_data_stream(1, &[b"x"]).unwrap_err();
        assert!(matches!(err, PacketError::EmptyPacket));
    }

    #[test]
    fn protocol_only_once() {
        let mut writer = PacketWriter::new();
        writer.write_protocol(&ProtocolPacket::default()).unwrap();
        let err = writer.write_protocol(&ProtocolPacket::default()).unwrap_err();
        assert!(matches!(err, PacketError::ProtocolAlreadyWritten));
    }

    #[test]
    fn stream_only_once() {
        let mut writer = PacketWriter::new();
        writer.write_protocol(&ProtocolPacket::default()).unwrap();
        writer.write_data_stream(1, &[b"a"]).unwrap();
        let err = writer.write_data_stream(1, &[b"b"]).unwrap_err();
        assert!(matches!(err, PacketError::StreamAlreadyWritten));
    }

    #[test]
    fn empty_stream_is_malformed() {
        let mut writer = PacketWriter::new();
        writer.write_protocol(&ProtocolPacket::default()).unwrap();
        let none: [&[u8]; 0] = [];
        let err = writer.write_data_stream(1, &none).unwrap_err();
        assert!(matches!(err, PacketError::MalformedStream { declared: 0 }));
    }

    #[test]
    fn oversized_payload_leaves_packet_untouched() {
        let mut writer = PacketWriter::new();
        writer.write_protocol(&ProtocolPacket::default()).unwrap();
        let before = writer.packet().clone();
        let big = vec![0u8; MAX_FRAME_SIZE + 1];
        let err = writer
            .write_data_stream(1, &[b"small".to_vec(), big])
            .unwrap_err();
        assert!(matches!(err, PacketError::MessageTooLarge { .. }));
        assert_eq!(writer.packet(), &before);
        writer.write_data_stream(1, &[b"retry"]).unwrap();
    }

    #[test]
    fn layout_is_control_then_stream() {
        let mut writer = PacketWriter::new();
        writer.write_protocol(&ProtocolPacket::new(1)).unwrap();
        writer.write_data_stream(2, &[&b"ab"[..], &b"c"[..]]).unwrap();
        let bytes = writer.into_packet().data;
        // bincode encodes the u32 version as 4 little-endian bytes.
        let expected: Vec<u8> = [
            &[0, 0, 0, 4, 1, 0, 0, 0][..],
            &[0, 0, 0, 10, 0, 0, 0, 2, 0, 0, 0, 2, b'a', b'b'][..],
            &[0, 0, 0, 1, b'c'][..],
        ]
        .concat();
        assert_eq!(bytes, expected);
    }
}
