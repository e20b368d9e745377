use std::net::SocketAddr;

use prost::Message;
use tracing::info;

use unistream_proto::proto::{FrameMode, FrameRecord, Session, SourceMetadata};

use crate::video::frame::Frame;
use crate::video::mode::StreamMode;

impl From<StreamMode> for FrameMode {
    fn from(mode: StreamMode) -> Self {
        match mode {
            StreamMode::Color => FrameMode::Color,
            StreamMode::Grayscale => FrameMode::Grayscale,
        }
    }
}

/// Collects metadata for every frame delivered during one session.
pub struct SessionRecorder {
    source: SourceMetadata,
    frames: Vec<FrameRecord>,
}

impl SessionRecorder {
    pub fn new(bind_address: SocketAddr, target_fps: u32) -> Self {
        Self {
            source: SourceMetadata {
                bind_address: bind_address.to_string(),
                target_fps,
            },
            frames: Vec::new(),
        }
    }

    pub fn record(&mut self, frame: &Frame) {
        self.frames.push(FrameRecord {
            sequence_index: frame.sequence_index(),
            timestamp_seconds: frame.timestamp(),
            width: frame.width(),
            height: frame.height(),
            channels: u32::from(frame.channels()),
            mode: FrameMode::from(frame.mode()) as i32,
        });
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn finish(self) -> Session {
        info!(frame_count = self.frames.len(), "session recording finished");
        Session {
            source: Some(self.source),
            frames: self.frames,
        }
    }
}

/// Serialize a session as one length-delimited protobuf message.
pub fn encode_session(session: &Session) -> Vec<u8> {
    session.encode_length_delimited_to_vec()
}
