use image::{imageops, DynamicImage, GrayImage, RgbImage};
use tracing::debug;

use super::mode::{Geometry, StreamMode};
use crate::error::DecodeError;

/// One datagram turned into an upright image.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub mode: StreamMode,
    /// The mode byte exactly as received.
    pub mode_byte: u8,
    /// `ImageRgb8` for color frames, `ImageLuma8` for grayscale frames.
    pub image: DynamicImage,
}

impl DecodedImage {
    pub fn geometry(&self) -> Geometry {
        self.mode.geometry()
    }
}

/// Decode a `[mode byte][row-major pixels]` datagram.
///
/// The geometry comes from the mode byte alone, so the pixel data must match it
/// exactly. Rows arrive bottom-up and color samples arrive in BGR order; both are
/// undone here.
pub fn decode_datagram(datagram: &[u8]) -> Result<DecodedImage, DecodeError> {
    let (&mode_byte, pixels) = datagram.split_first().ok_or(DecodeError::Empty)?;
    let mode = StreamMode::from_byte(mode_byte);
    let geometry = mode.geometry();

    let mismatch = || DecodeError::LengthMismatch {
        mode,
        expected: geometry.payload_len(),
        actual: pixels.len(),
    };
    if pixels.len() != geometry.payload_len() {
        return Err(mismatch());
    }

    let image = match mode {
        StreamMode::Color => {
            let mut buf = pixels.to_vec();
            swap_red_blue(&mut buf);
            let mut img =
                RgbImage::from_raw(geometry.width, geometry.height, buf).ok_or_else(mismatch)?;
            imageops::flip_vertical_in_place(&mut img);
            DynamicImage::ImageRgb8(img)
        }
        StreamMode::Grayscale => {
            let mut img = GrayImage::from_raw(geometry.width, geometry.height, pixels.to_vec())
                .ok_or_else(mismatch)?;
            imageops::flip_vertical_in_place(&mut img);
            DynamicImage::ImageLuma8(img)
        }
    };

    debug!(mode_byte, %mode, %geometry, "decoded datagram");

    Ok(DecodedImage {
        mode,
        mode_byte,
        image,
    })
}

/// Swap the first and last sample of every 3-byte pixel (BGR <-> RGB).
pub(super) fn swap_red_blue(samples: &mut [u8]) {
    for px in samples.chunks_exact_mut(3) {
        px.swap(0, 2);
    }
}
