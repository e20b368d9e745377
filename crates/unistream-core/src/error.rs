use std::io;
use std::net::SocketAddr;

use thiserror::Error;

use crate::video::mode::StreamMode;

/// A datagram that cannot be turned into an image.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("empty datagram, missing mode byte")]
    Empty,

    #[error("{mode} frame needs {expected} pixel bytes, got {actual}")]
    LengthMismatch {
        mode: StreamMode,
        expected: usize,
        actual: usize,
    },
}

/// An image that cannot be sent in any stream mode.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("unsupported color type {0:?}, expected Rgb8 or L8")]
    UnsupportedColor(image::ColorType),

    #[error("{mode} frames must be {expected_width}x{expected_height}, got {width}x{height}")]
    WrongSize {
        mode: StreamMode,
        expected_width: u32,
        expected_height: u32,
        width: u32,
        height: u32,
    },
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("failed to encode frame: {0}")]
    Encode(#[from] EncodeError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Failures starting or stopping a [`crate::source::StreamSource`].
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Configuration invalid: {reason}")]
    InvalidConfig { reason: String },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("failed to configure socket: {0}")]
    Socket(#[source] io::Error),

    #[error("failed to spawn receiver thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("receiver thread panicked")]
    ReceiverPanicked,
}
