use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use image::DynamicImage;

use crate::video::decoder::DecodedImage;
use crate::video::mode::{Geometry, StreamMode};

/// Lifecycle of the background receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverState {
    Created,
    Running,
    /// Stop requested; the loop exits at its next iteration boundary.
    Stopping,
    Stopped,
}

impl fmt::Display for ReceiverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReceiverState::Created => write!(f, "created"),
            ReceiverState::Running => write!(f, "running"),
            ReceiverState::Stopping => write!(f, "stopping"),
            ReceiverState::Stopped => write!(f, "stopped"),
        }
    }
}

/// The latest decoded image, as copied out of the slot.
#[derive(Debug, Clone)]
pub struct SlotSnapshot {
    pub mode: StreamMode,
    pub image: Arc<DynamicImage>,
}

struct SlotState {
    latest: Option<SlotSnapshot>,
    receiver: ReceiverState,
}

/// Hand-off cell between the receiver thread and the producer.
///
/// One lock covers the image, its availability and the receiver state. It is
/// only ever held for field reads and writes.
pub struct FrameSlot {
    state: Mutex<SlotState>,
}

impl Default for FrameSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSlot {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                latest: None,
                receiver: ReceiverState::Created,
            }),
        }
    }

    // The guarded data stays consistent even if a holder panicked, since every
    // critical section is a plain assignment or clone.
    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the current image and mark it available.
    pub fn publish(&self, decoded: DecodedImage) {
        let snapshot = SlotSnapshot {
            mode: decoded.mode,
            image: Arc::new(decoded.image),
        };
        self.lock().latest = Some(snapshot);
    }

    /// Mark that no current image exists.
    pub fn clear(&self) {
        self.lock().latest = None;
    }

    pub fn is_available(&self) -> bool {
        self.lock().latest.is_some()
    }

    /// Copy out the current image, if any.
    pub fn snapshot(&self) -> Option<SlotSnapshot> {
        self.lock().latest.clone()
    }

    pub fn geometry(&self) -> Option<Geometry> {
        self.lock().latest.as_ref().map(|s| s.mode.geometry())
    }

    pub fn state(&self) -> ReceiverState {
        self.lock().receiver
    }

    pub fn set_state(&self, state: ReceiverState) {
        self.lock().receiver = state;
    }

    pub fn stop_requested(&self) -> bool {
        matches!(self.lock().receiver, ReceiverState::Stopping)
    }
}

#[cfg(test)]
mod tests {
    use image::GrayImage;

    use super::*;

    fn gray(value: u8) -> DecodedImage {
        let g = StreamMode::Grayscale.geometry();
        DecodedImage {
            mode: StreamMode::Grayscale,
            mode_byte: 1,
            image: DynamicImage::ImageLuma8(GrayImage::from_pixel(
                g.width,
                g.height,
                image::Luma([value]),
            )),
        }
    }

    #[test]
    fn starts_empty_and_created() {
        let slot = FrameSlot::new();
        assert!(!slot.is_available());
        assert!(slot.snapshot().is_none());
        assert!(slot.geometry().is_none());
        assert_eq!(slot.state(), ReceiverState::Created);
        assert!(!slot.stop_requested());
    }

    #[test]
    fn publish_then_clear() {
        let slot = FrameSlot::new();
        slot.publish(gray(9));
        assert!(slot.is_available());
        assert_eq!(slot.geometry(), Some(StreamMode::Grayscale.geometry()));

        let snapshot = slot.snapshot().unwrap();
        slot.clear();
        assert!(!slot.is_available());
        // Copies taken before the clear are untouched.
        assert_eq!(snapshot.image.as_luma8().unwrap().get_pixel(0, 0).0, [9]);
    }

    #[test]
    fn publish_replaces_previous_image() {
        let slot = FrameSlot::new();
        slot.publish(gray(1));
        let old = slot.snapshot().unwrap();
        slot.publish(gray(2));
        let new = slot.snapshot().unwrap();
        assert_eq!(old.image.as_luma8().unwrap().get_pixel(0, 0).0, [1]);
        assert_eq!(new.image.as_luma8().unwrap().get_pixel(0, 0).0, [2]);
    }

    #[test]
    fn stopping_is_the_stop_flag() {
        let slot = FrameSlot::new();
        slot.set_state(ReceiverState::Running);
        assert!(!slot.stop_requested());
        slot.set_state(ReceiverState::Stopping);
        assert!(slot.stop_requested());
        slot.set_state(ReceiverState::Stopped);
        assert!(!slot.stop_requested());
    }
}
