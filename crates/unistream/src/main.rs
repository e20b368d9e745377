mod cli;
mod pattern;

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};

use unistream_core::config::SourceConfig;
use unistream_core::recording::{encode_session, SessionRecorder};
use unistream_core::sender::FrameSender;
use unistream_core::source::StreamSource;
use unistream_core::video::frame::Frame;
use unistream_core::video::mode::StreamMode;
use unistream_proto::proto::Session;

/// Sleep between polls while no frame is available, so an idle source does not
/// spin.
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(5);

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Receive {
            port,
            bind,
            timeout_ms,
            fps,
            frames,
            duration_secs,
            save_frames,
            output,
        } => {
            let config = SourceConfig {
                bind_addr: bind,
                port,
                recv_timeout: Duration::from_millis(timeout_ms),
                target_fps: fps,
                ..SourceConfig::default()
            };
            let limits = ReceiveLimits {
                frames,
                duration: duration_secs.map(Duration::from_secs),
            };
            receive(config, limits, save_frames.as_deref(), output.as_deref())
        }
        cli::Command::Send {
            target,
            mode,
            fps,
            frames,
        } => {
            let mode = match mode {
                cli::ModeArg::Color => StreamMode::Color,
                cli::ModeArg::Grayscale => StreamMode::Grayscale,
            };
            send(target, mode, fps, frames)
        }
    }
}

struct ReceiveLimits {
    frames: Option<u64>,
    duration: Option<Duration>,
}

impl ReceiveLimits {
    fn reached(&self, delivered: u64, started: Instant) -> bool {
        self.frames.is_some_and(|max| delivered >= max)
            || self.duration.is_some_and(|max| started.elapsed() >= max)
    }
}

fn receive(
    config: SourceConfig,
    limits: ReceiveLimits,
    save_dir: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    info!(?config, frames = ?limits.frames, duration = ?limits.duration, "starting receiver");

    if let Some(dir) = save_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        info!(?dir, "frame directory ready");
    }

    let mut source = StreamSource::start(config).context("failed to start stream source")?;
    info!(
        name = source.name(),
        nominal_size = ?source.nominal_frame_size(),
        nominal_fps = source.nominal_frame_rate(),
        "source ready"
    );
    let mut recorder = SessionRecorder::new(source.local_addr(), source.target_fps());

    let started = Instant::now();
    let mut delivered: u64 = 0;
    while !limits.reached(delivered, started) {
        let Some(frame) = source.poll() else {
            thread::sleep(IDLE_POLL_INTERVAL);
            continue;
        };
        delivered += 1;
        recorder.record(frame);

        if let Some(dir) = save_dir {
            save_frame(frame, dir)?;
        }
    }

    source.stop().context("failed to stop stream source")?;

    if recorder.is_empty() {
        warn!("no frames delivered");
    }
    let session = recorder.finish();
    if let Some(path) = output {
        write_session(&session, path)?;
    }

    info!(delivered, elapsed = ?started.elapsed(), "receive complete");
    Ok(())
}

fn save_frame(frame: &Frame, dir: &Path) -> Result<()> {
    let path = dir.join(format!("frame_{:08}.png", frame.sequence_index()));
    frame
        .image()
        .save(&path)
        .with_context(|| format!("failed to save frame to {}", path.display()))?;
    debug!(?path, "saved frame");
    Ok(())
}

/// Write the session as length-delimited protobuf.
fn write_session(session: &Session, output: &Path) -> Result<()> {
    info!(?output, frame_count = session.frames.len(), "writing session recording");

    let buf = encode_session(session);

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent).context("failed to create output directory")?;
    }

    std::fs::write(output, &buf)
        .with_context(|| format!("failed to write {}", output.display()))?;

    info!(?output, bytes = buf.len(), "session recording written");
    Ok(())
}

fn send(
    target: std::net::SocketAddr,
    mode: StreamMode,
    fps: u32,
    frames: Option<u64>,
) -> Result<()> {
    anyhow::ensure!(fps > 0, "fps must be >= 1, got {fps}");

    let mut sender = FrameSender::connect(target)
        .with_context(|| format!("failed to open sender to {target}"))?;
    let period = Duration::from_secs(1) / fps;
    info!(%target, %mode, fps, ?frames, "streaming test pattern");

    let mut n: u64 = 0;
    let mut next = Instant::now();
    while frames.map_or(true, |max| n < max) {
        let image = pattern::test_pattern(mode, n);
        if let Err(e) = sender.send(&image) {
            // Nobody listening yet is routine for a connected UDP socket.
            warn!(%e, frame = n, "failed to send frame");
        }
        n += 1;

        next += period;
        if let Some(wait) = next.checked_duration_since(Instant::now()) {
            thread::sleep(wait);
        }
    }

    info!(sent = sender.sent(), "sending complete");
    Ok(())
}
