use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use tracing::{debug, error, info};

use crate::config::{SourceConfig, NOMINAL_FRAME_RATE, NOMINAL_FRAME_SIZE};
use crate::error::SourceError;
use crate::pacer::Pacer;
use crate::receiver::DatagramReceiver;
use crate::slot::{FrameSlot, ReceiverState};
use crate::video::frame::Frame;
use crate::video::mode::Geometry;

const SOURCE_NAME: &str = "Unity stream source";
const RECEIVER_THREAD_NAME: &str = "unistream-rx";

/// Timestamp source for delivered frames, in seconds.
pub trait Clock: Send {
    fn now(&self) -> f64;
}

impl<F: Fn() -> f64 + Send> Clock for F {
    fn now(&self) -> f64 {
        self()
    }
}

/// Seconds elapsed since the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Receives frames in the background and hands the latest one out at the
/// target rate.
pub struct StreamSource<C: Clock = MonotonicClock> {
    slot: Arc<FrameSlot>,
    worker: Option<JoinHandle<()>>,
    local_addr: SocketAddr,
    target_fps: u32,
    pacer: Pacer,
    clock: C,
    next_index: u64,
    recent_frame: Option<Frame>,
}

impl StreamSource<MonotonicClock> {
    /// Bind the configured port and start receiving.
    pub fn start(config: SourceConfig) -> Result<Self, SourceError> {
        Self::start_with_clock(config, MonotonicClock::default())
    }
}

impl<C: Clock> StreamSource<C> {
    /// Like [`StreamSource::start`], stamping frames with `clock`.
    pub fn start_with_clock(config: SourceConfig, clock: C) -> Result<Self, SourceError> {
        config.validate()?;

        let addr = config.socket_addr();
        let socket = UdpSocket::bind(addr).map_err(|source| SourceError::Bind { addr, source })?;
        socket
            .set_read_timeout(Some(config.recv_timeout))
            .map_err(SourceError::Socket)?;
        let local_addr = socket.local_addr().map_err(SourceError::Socket)?;

        let slot = Arc::new(FrameSlot::new());
        let receiver = DatagramReceiver::new(socket, Arc::clone(&slot), config.max_datagram_size);

        slot.set_state(ReceiverState::Running);
        let worker = thread::Builder::new()
            .name(RECEIVER_THREAD_NAME.to_string())
            .spawn(move || receiver.run())
            .map_err(|e| {
                slot.set_state(ReceiverState::Stopped);
                SourceError::Spawn(e)
            })?;

        info!(
            %local_addr,
            target_fps = config.target_fps,
            recv_timeout = ?config.recv_timeout,
            "stream source started"
        );

        Ok(Self {
            slot,
            worker: Some(worker),
            local_addr,
            target_fps: config.target_fps,
            pacer: Pacer::new(config.target_fps),
            clock,
            next_index: 0,
            recent_frame: None,
        })
    }

    /// Produce the next frame, or `None` if nothing has been received since
    /// startup or the last timeout.
    ///
    /// Blocks for the remainder of the frame period when called faster than the
    /// target rate. The slot is only locked while its contents are copied.
    pub fn poll(&mut self) -> Option<&Frame> {
        let snapshot = self.slot.snapshot()?;

        let waited = self.pacer.wait();
        let timestamp = self.clock.now();
        let sequence_index = self.next_index;
        self.next_index += 1;

        debug!(sequence_index, timestamp, ?waited, mode = %snapshot.mode, "emitting frame");

        self.recent_frame = Some(Frame::new(
            timestamp,
            sequence_index,
            snapshot.mode,
            snapshot.image,
        ));
        self.recent_frame.as_ref()
    }

    /// The frame most recently returned by [`StreamSource::poll`].
    pub fn recent_frame(&self) -> Option<&Frame> {
        self.recent_frame.as_ref()
    }

    /// Signal the receiver to stop and wait for it to exit. The socket is closed
    /// once this returns.
    pub fn stop(mut self) -> Result<(), SourceError> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<(), SourceError> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };

        info!(local_addr = %self.local_addr, "stopping stream source");
        self.slot.set_state(ReceiverState::Stopping);
        let joined = worker.join();
        self.slot.set_state(ReceiverState::Stopped);
        self.slot.clear();

        match joined {
            Ok(()) => {
                info!(frames_emitted = self.next_index, "stream source stopped");
                Ok(())
            }
            Err(_) => Err(SourceError::ReceiverPanicked),
        }
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn state(&self) -> ReceiverState {
        self.slot.state()
    }

    /// Geometry of the image the next poll would deliver.
    pub fn current_geometry(&self) -> Option<Geometry> {
        self.slot.geometry()
    }

    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    pub fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    /// Advertised frame size. Actual frames are smaller; see
    /// [`StreamSource::current_geometry`].
    pub fn nominal_frame_size(&self) -> (u32, u32) {
        NOMINAL_FRAME_SIZE
    }

    pub fn nominal_frame_rate(&self) -> u32 {
        NOMINAL_FRAME_RATE
    }
}

impl<C: Clock> Drop for StreamSource<C> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            error!(%e, "stream source shutdown failed");
        }
    }
}
