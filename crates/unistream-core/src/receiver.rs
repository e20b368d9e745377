use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::error::DecodeError;
use crate::slot::FrameSlot;
use crate::video::decoder::decode_datagram;

/// Pause after a socket error that is not a timeout, so a persistent failure
/// does not spin the loop.
const ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Background loop that keeps the [`FrameSlot`] current.
///
/// Owns the bound socket; the socket is closed when the receiver is dropped at
/// the end of [`DatagramReceiver::run`].
pub struct DatagramReceiver {
    socket: UdpSocket,
    slot: Arc<FrameSlot>,
    buf: Vec<u8>,
    received: u64,
    rejected: u64,
    timeouts: u64,
}

impl DatagramReceiver {
    /// `socket` must already be bound and have its read timeout set.
    pub fn new(socket: UdpSocket, slot: Arc<FrameSlot>, max_datagram_size: usize) -> Self {
        Self {
            socket,
            slot,
            buf: vec![0u8; max_datagram_size],
            received: 0,
            rejected: 0,
            timeouts: 0,
        }
    }

    /// Receive until the slot reports a stop request.
    ///
    /// The stop request is checked once per iteration, so a blocked receive can
    /// delay the exit by up to one read timeout.
    pub fn run(mut self) {
        let local_addr = self.socket.local_addr().ok();
        info!(?local_addr, buf_len = self.buf.len(), "receiver loop started");

        while !self.slot.stop_requested() {
            match self.socket.recv_from(&mut self.buf) {
                Ok((len, peer)) => {
                    let datagram = &self.buf[..len];
                    match Self::handle_datagram(&self.slot, datagram, peer) {
                        Ok(()) => self.received += 1,
                        Err(_) => self.rejected += 1,
                    }
                }
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    self.timeouts += 1;
                    Self::handle_timeout(&self.slot);
                }
                Err(e) => {
                    error!(%e, "failed to receive datagram");
                    self.slot.clear();
                    thread::sleep(ERROR_BACKOFF);
                }
            }
        }

        info!(
            received = self.received,
            rejected = self.rejected,
            timeouts = self.timeouts,
            "receiver loop exiting"
        );
    }

    /// Decode one datagram into the slot. A bad datagram clears the slot like a
    /// timeout does.
    pub fn handle_datagram(
        slot: &FrameSlot,
        datagram: &[u8],
        peer: SocketAddr,
    ) -> Result<(), DecodeError> {
        match decode_datagram(datagram) {
            Ok(decoded) => {
                debug!(%peer, len = datagram.len(), mode = %decoded.mode, "frame received");
                slot.publish(decoded);
                Ok(())
            }
            Err(e) => {
                warn!(%peer, len = datagram.len(), %e, "dropping undecodable datagram");
                slot.clear();
                Err(e)
            }
        }
    }

    /// No datagram arrived within the read timeout.
    pub fn handle_timeout(slot: &FrameSlot) {
        warn!("no frame received within timeout, is the sender running?");
        slot.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;
    use std::time::Instant;

    use image::{DynamicImage, RgbImage};
    use tracing_test::traced_test;

    use super::*;
    use crate::slot::ReceiverState;
    use crate::video::encoder::encode_datagram;
    use crate::video::mode::StreamMode;

    fn peer() -> SocketAddr {
        SocketAddr::from((Ipv4Addr::LOCALHOST, 9999))
    }

    fn color_datagram() -> Vec<u8> {
        encode_datagram(&DynamicImage::ImageRgb8(RgbImage::new(195, 109))).unwrap()
    }

    #[test]
    #[traced_test]
    fn good_datagram_is_published() {
        let slot = FrameSlot::new();
        DatagramReceiver::handle_datagram(&slot, &color_datagram(), peer()).unwrap();
        assert_eq!(slot.geometry(), Some(StreamMode::Color.geometry()));
    }

    #[test]
    #[traced_test]
    fn bad_datagram_clears_without_touching_earlier_copies() {
        let slot = FrameSlot::new();
        DatagramReceiver::handle_datagram(&slot, &color_datagram(), peer()).unwrap();
        let held = slot.snapshot().unwrap();

        let result = DatagramReceiver::handle_datagram(&slot, &[3, 0, 0, 0], peer());
        assert!(matches!(result, Err(DecodeError::LengthMismatch { .. })));
        assert!(!slot.is_available());
        assert_eq!(held.image.as_rgb8().unwrap().dimensions(), (195, 109));
        assert!(logs_contain("dropping undecodable datagram"));
    }

    #[test]
    #[traced_test]
    fn timeout_clears_the_slot() {
        let slot = FrameSlot::new();
        DatagramReceiver::handle_datagram(&slot, &color_datagram(), peer()).unwrap();
        DatagramReceiver::handle_timeout(&slot);
        assert!(!slot.is_available());
        assert!(logs_contain("no frame received within timeout"));
    }

    #[test]
    fn run_exits_after_stop_request() {
        let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        socket
            .set_read_timeout(Some(Duration::from_millis(50)))
            .unwrap();
        let addr = socket.local_addr().unwrap();
        let slot = Arc::new(FrameSlot::new());
        slot.set_state(ReceiverState::Running);

        let receiver = DatagramReceiver::new(socket, Arc::clone(&slot), 64_000);
        let handle = thread::spawn(move || receiver.run());

        let sender = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while !slot.is_available() && Instant::now() < deadline {
            sender.send_to(&color_datagram(), addr).unwrap();
            thread::sleep(Duration::from_millis(10));
        }
        assert!(slot.is_available());

        let started = Instant::now();
        slot.set_state(ReceiverState::Stopping);
        handle.join().unwrap();
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
