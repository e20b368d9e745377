use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::error::SourceError;
use crate::video::mode::StreamMode;

/// UDP port the rendering application streams to.
pub const DEFAULT_PORT: u16 = 8051;
/// How long a receive may block before the current frame is dropped.
pub const DEFAULT_RECV_TIMEOUT: Duration = Duration::from_secs(3);
/// Receive buffer size. One datagram carries one whole frame.
pub const DEFAULT_MAX_DATAGRAM_SIZE: usize = 64_000;
pub const DEFAULT_TARGET_FPS: u32 = 30;

/// Frame size advertised to the host. Decoded frames are smaller, see
/// [`crate::video::mode::Geometry`].
pub const NOMINAL_FRAME_SIZE: (u32, u32) = (1280, 720);
/// Frame rate advertised to the host.
pub const NOMINAL_FRAME_RATE: u32 = 30;

/// Parameters for a [`crate::source::StreamSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// Interface to bind; unspecified accepts datagrams on every interface.
    pub bind_addr: IpAddr,
    /// Port to bind, or 0 for an ephemeral port.
    pub port: u16,
    /// Read timeout of each blocking receive. Also bounds shutdown latency.
    pub recv_timeout: Duration,
    /// Size of the receive buffer in bytes.
    pub max_datagram_size: usize,
    /// Delivery rate the producer paces `poll` to.
    pub target_fps: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            recv_timeout: DEFAULT_RECV_TIMEOUT,
            max_datagram_size: DEFAULT_MAX_DATAGRAM_SIZE,
            target_fps: DEFAULT_TARGET_FPS,
        }
    }
}

impl SourceConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    /// Check that the configuration can receive every supported frame and pace
    /// deliveries.
    pub fn validate(&self) -> Result<(), SourceError> {
        if self.target_fps == 0 {
            return Err(SourceError::InvalidConfig {
                reason: "target_fps must be >= 1".to_string(),
            });
        }
        if self.recv_timeout.is_zero() {
            return Err(SourceError::InvalidConfig {
                reason: "recv_timeout must be non-zero".to_string(),
            });
        }

        let required = StreamMode::ALL
            .iter()
            .map(|m| m.geometry().payload_len() + 1)
            .max()
            .unwrap_or(0);
        if self.max_datagram_size < required {
            return Err(SourceError::InvalidConfig {
                reason: format!(
                    "max_datagram_size {} is smaller than the largest frame datagram ({required} bytes)",
                    self.max_datagram_size
                ),
            });
        }

        Ok(())
    }
}
