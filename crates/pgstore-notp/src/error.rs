use thiserror::Error;

#[derive(Debug, Error)]
pub enum PacketError {
    /// The packet holds no bytes, so not even the control packet is present.
    #[error("missing protocol packet")]
    EmptyPacket,

    #[error("data packet stream already complete after {packets} packets")]
    AlreadyComplete { packets: i32 },

    /// The stream header declares fewer than one packet.
    #[error("malformed data packet stream: declared {declared} packets")]
    MalformedStream { declared: i32 },

    #[error("framing error: {0}")]
    Framing(String),

    #[error("frame too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("protocol packet already written")]
    ProtocolAlreadyWritten,

    #[error("data packet stream already written")]
    StreamAlreadyWritten,
}

pub type PacketResult<T> = Result<T, PacketError>;
