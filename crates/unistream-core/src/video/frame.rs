use std::sync::{Arc, OnceLock};

use image::{DynamicImage, GrayImage};

use super::mode::{Geometry, StreamMode};

/// A single delivered video frame with metadata.
///
/// The image is shared with the receiver's slot, so frames are cheap to produce
/// and never change after construction.
#[derive(Debug, Clone)]
pub struct Frame {
    timestamp: f64,
    sequence_index: u64,
    mode: StreamMode,
    image: Arc<DynamicImage>,
    gray: OnceLock<GrayImage>,
}

impl Frame {
    pub fn new(
        timestamp: f64,
        sequence_index: u64,
        mode: StreamMode,
        image: Arc<DynamicImage>,
    ) -> Self {
        Self {
            timestamp,
            sequence_index,
            mode,
            image,
            gray: OnceLock::new(),
        }
    }

    /// Host clock value stamped when the frame was delivered.
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    /// Delivery counter, 0 for the first frame of a source.
    pub fn sequence_index(&self) -> u64 {
        self.sequence_index
    }

    pub fn mode(&self) -> StreamMode {
        self.mode
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn channels(&self) -> u8 {
        self.image.color().channel_count()
    }

    pub fn geometry(&self) -> Geometry {
        Geometry {
            width: self.width(),
            height: self.height(),
            channels: self.channels(),
        }
    }

    /// Single-channel view of the image.
    ///
    /// Grayscale frames return their own buffer. Color frames are converted to
    /// luma on first access and the result is kept.
    pub fn grayscale(&self) -> &GrayImage {
        match self.image.as_ref() {
            DynamicImage::ImageLuma8(gray) => gray,
            other => self.gray.get_or_init(|| other.to_luma8()),
        }
    }
}
