/// Wire mode of a received frame, mirroring the datagram mode byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum FrameMode {
    Unspecified = 0,
    Grayscale = 1,
    Color = 3,
}

/// One frame delivered to the consumer.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FrameRecord {
    #[prost(uint64, tag = "1")]
    pub sequence_index: u64,
    /// Host clock value stamped at delivery, in seconds.
    #[prost(double, tag = "2")]
    pub timestamp_seconds: f64,
    #[prost(uint32, tag = "3")]
    pub width: u32,
    #[prost(uint32, tag = "4")]
    pub height: u32,
    #[prost(uint32, tag = "5")]
    pub channels: u32,
    #[prost(enumeration = "FrameMode", tag = "6")]
    pub mode: i32,
}

/// Where a session was received from.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SourceMetadata {
    /// Local address the receiver was bound to, e.g. "0.0.0.0:8051".
    #[prost(string, tag = "1")]
    pub bind_address: ::prost::alloc::string::String,
    #[prost(uint32, tag = "2")]
    pub target_fps: u32,
}

/// All frames delivered between one start and stop of a stream source.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Session {
    #[prost(message, optional, tag = "1")]
    pub source: ::core::option::Option<SourceMetadata>,
    #[prost(message, repeated, tag = "2")]
    pub frames: ::prost::alloc::vec::Vec<FrameRecord>,
}
