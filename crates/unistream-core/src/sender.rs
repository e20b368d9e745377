use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};

use image::DynamicImage;
use tracing::{debug, info};

use crate::error::SendError;
use crate::video::encoder::encode_datagram;

/// Streams images to a receiver, one datagram per frame.
pub struct FrameSender {
    socket: UdpSocket,
    target: SocketAddr,
    sent: u64,
}

impl FrameSender {
    /// Bind an ephemeral local port and connect it to `target`.
    pub fn connect(target: SocketAddr) -> Result<Self, SendError> {
        let local: SocketAddr = match target {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let socket = UdpSocket::bind(local)?;
        socket.connect(target)?;
        info!(%target, local_addr = ?socket.local_addr().ok(), "frame sender connected");
        Ok(Self {
            socket,
            target,
            sent: 0,
        })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }

    /// Number of frames sent so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Encode and send one frame. Returns the datagram size.
    pub fn send(&mut self, image: &DynamicImage) -> Result<usize, SendError> {
        let datagram = encode_datagram(image)?;
        let len = self.socket.send(&datagram)?;
        self.sent += 1;
        debug!(target = %self.target, len, sent = self.sent, "frame sent");
        Ok(len)
    }
}
