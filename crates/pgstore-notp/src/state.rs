use crate::frame::StreamFrame;

/// Cursor over the data packet stream of one packet.
///
/// Produced by [`PacketReader::read_next_data_packet`](crate::PacketReader::read_next_data_packet)
/// and handed back on the next call. States are plain values: the reader
/// never mutates the one it is given.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DataPacketState {
    offset: usize,
    size: usize,
    packet_type: i32,
    stream_count: i32,
    packets_read: i32,
}

impl DataPacketState {
    pub(crate) fn first(frame: &StreamFrame<'_>) -> Self {
        Self {
            offset: frame.offset,
            size: frame.size,
            packet_type: frame.packet_type,
            stream_count: frame.stream_count,
            packets_read: 1,
        }
    }

    /// State after reading the frame at `offset` spanning `size` bytes.
    pub(crate) fn advance(&self, offset: usize, size: usize) -> Self {
        Self {
            offset,
            size,
            packets_read: self.packets_read + 1,
            ..*self
        }
    }

    /// Start of the most recently read frame.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Size of the most recently read frame, length prefix included.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Where the next frame starts.
    pub fn next_offset(&self) -> usize {
        self.offset.saturating_add(self.size)
    }

    pub fn packet_type(&self) -> i32 {
        self.packet_type
    }

    /// Number of data packets the stream declared.
    pub fn stream_count(&self) -> i32 {
        self.stream_count
    }

    pub fn packets_read(&self) -> i32 {
        self.packets_read
    }

    pub fn remaining(&self) -> usize {
        usize::try_from(self.stream_count - self.packets_read).unwrap_or(0)
    }

    pub fn is_complete(&self) -> bool {
        self.packets_read == self.stream_count
    }
}

/// Where a stream read stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamPhase {
    /// No data packet read yet.
    NotStarted,
    /// Some, but not all, declared packets read.
    Streaming,
    /// All declared packets read. Terminal.
    Complete,
}

impl StreamPhase {
    pub fn of(state: Option<&DataPacketState>) -> Self {
        match state {
            None => Self::NotStarted,
            Some(s) if s.is_complete() => Self::Complete,
            Some(_) => Self::Streaming,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(stream_count: i32) -> DataPacketState {
        DataPacketState::first(&StreamFrame {
            payload: &[],
            offset: 10,
            size: 20,
            packet_type: 5,
            stream_count,
        })
    }

    #[test]
    fn first_state_counts_one_packet() {
        let s = first(3);
        assert_eq!(s.packets_read(), 1);
        assert_eq!(s.next_offset(), 30);
        assert_eq!(s.remaining(), 2);
        assert_eq!(StreamPhase::of(Some(&s)), StreamPhase::Streaming);
    }

    #[test]
    fn advance_keeps_stream_header() {
        let s = first(2).advance(30, 7);
        assert_eq!(s.offset(), 30);
        assert_eq!(s.size(), 7);
        assert_eq!(s.packet_type(), 5);
        assert_eq!(s.stream_count(), 2);
        assert!(s.is_complete());
        assert_eq!(s.remaining(), 0);
    }

    #[test]
    fn single_packet_stream_is_complete_at_once() {
        assert_eq!(StreamPhase::of(Some(&first(1))), StreamPhase::Complete);
    }

    #[test]
    fn no_state_is_not_started() {
        assert_eq!(StreamPhase::of(None), StreamPhase::NotStarted);
    }
}
