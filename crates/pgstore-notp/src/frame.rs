//! Length-prefixed frames.
//!
//! ```text
//! frame        = [4 bytes BE length L][L bytes payload]
//! stream frame = frame whose payload is
//!                [4 bytes BE packet type][4 bytes BE stream count][data]
//! ```
//!
//! Offsets and sizes always refer to whole frames, prefix included, so the
//! next frame starts at `offset + size`.

use crate::error::{PacketError, PacketResult};

/// Size of the big-endian length prefix.
pub const LENGTH_PREFIX_SIZE: usize = 4;
/// Size of the packet type + stream count header of a stream's first frame.
pub const STREAM_HEADER_SIZE: usize = 8;
/// Largest payload a single frame may carry.
pub const MAX_FRAME_SIZE: usize = 64 * 1024 * 1024;

/// The first frame of a data packet stream, with its header split out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamFrame<'a> {
    /// Payload with the stream header removed.
    pub payload: &'a [u8],
    pub offset: usize,
    pub size: usize,
    pub packet_type: i32,
    /// Total number of data packets in the stream, this one included.
    pub stream_count: i32,
}

/// Append a frame carrying `payload`.
pub fn write_data_packet(buf: &mut Vec<u8>, payload: &[u8]) -> PacketResult<()> {
    let len = frame_len(payload.len())?;
    buf.reserve(LENGTH_PREFIX_SIZE + payload.len());
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(payload);
    Ok(())
}

/// Append the first frame of a stream, prefixing `payload` with the stream header.
pub fn write_stream_data_packet(
    buf: &mut Vec<u8>,
    packet_type: i32,
    stream_count: i32,
    payload: &[u8],
) -> PacketResult<()> {
    if stream_count < 1 {
        return Err(PacketError::MalformedStream {
            declared: stream_count,
        });
    }
    let len = frame_len(STREAM_HEADER_SIZE + payload.len())?;
    buf.reserve(LENGTH_PREFIX_SIZE + STREAM_HEADER_SIZE + payload.len());
    buf.extend_from_slice(&len.to_be_bytes());
    buf.extend_from_slice(&packet_type.to_be_bytes());
    buf.extend_from_slice(&stream_count.to_be_bytes());
    buf.extend_from_slice(payload);
    Ok(())
}

/// Locate the frame starting at `offset` without touching its payload.
///
/// Returns `(offset, size)` where `size` includes the length prefix.
pub fn index_data_packet(offset: usize, data: &[u8]) -> PacketResult<(usize, usize)> {
    let prefix_end = offset
        .checked_add(LENGTH_PREFIX_SIZE)
        .filter(|&end| end <= data.len())
        .ok_or_else(|| {
            PacketError::Framing(format!(
                "no frame at offset {offset}: buffer holds {} bytes",
                data.len()
            ))
        })?;
    let mut prefix = [0u8; LENGTH_PREFIX_SIZE];
    prefix.copy_from_slice(&data[offset..prefix_end]);
    let len = u32::from_be_bytes(prefix) as usize;
    if len > MAX_FRAME_SIZE {
        return Err(PacketError::MessageTooLarge {
            size: len,
            max: MAX_FRAME_SIZE,
        });
    }
    let available = data.len() - prefix_end;
    if available < len {
        return Err(PacketError::Framing(format!(
            "incomplete frame at offset {offset}: need {len} bytes, have {available}"
        )));
    }
    Ok((offset, LENGTH_PREFIX_SIZE + len))
}

/// Read the frame starting at `offset`.
///
/// Returns `(payload, offset, size)`.
pub fn read_data_packet(offset: usize, data: &[u8]) -> PacketResult<(&[u8], usize, usize)> {
    let (offset, size) = index_data_packet(offset, data)?;
    let payload = &data[offset + LENGTH_PREFIX_SIZE..offset + size];
    Ok((payload, offset, size))
}

/// Read the first frame of a stream starting at `offset`.
///
/// A declared stream count below one is a [`PacketError::MalformedStream`].
pub fn read_stream_data_packet(offset: usize, data: &[u8]) -> PacketResult<StreamFrame<'_>> {
    let (payload, offset, size) = read_data_packet(offset, data)?;
    if payload.len() < STREAM_HEADER_SIZE {
        return Err(PacketError::Framing(format!(
            "stream header at offset {offset} is {} bytes, need {STREAM_HEADER_SIZE}",
            payload.len()
        )));
    }
    let packet_type = read_i32(&payload[0..4]);
    let stream_count = read_i32(&payload[4..8]);
    if stream_count < 1 {
        return Err(PacketError::MalformedStream {
            declared: stream_count,
        });
    }
    Ok(StreamFrame {
        payload: &payload[STREAM_HEADER_SIZE..],
        offset,
        size,
        packet_type,
        stream_count,
    })
}

fn frame_len(payload_len: usize) -> PacketResult<u32> {
    if payload_len > MAX_FRAME_SIZE {
        return Err(PacketError::MessageTooLarge {
            size: payload_len,
            max: MAX_FRAME_SIZE,
        });
    }
    // MAX_FRAME_SIZE fits in a u32.
    Ok(payload_len as u32)
}

fn read_i32(bytes: &[u8]) -> i32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(bytes);
    i32::from_be_bytes(raw)
}
