use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "unistream", about = "Raw frame receiver for rendering-application UDP streams")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Receive frames and deliver them at the target rate.
    Receive {
        /// UDP port to listen on.
        #[arg(short, long, default_value_t = 8051)]
        port: u16,

        /// Interface address to bind.
        #[arg(long, default_value = "0.0.0.0")]
        bind: IpAddr,

        /// Receive timeout in milliseconds before the current frame is dropped.
        #[arg(long, default_value_t = 3000)]
        timeout_ms: u64,

        /// Target delivery rate.
        #[arg(long, default_value_t = 30)]
        fps: u32,

        /// Stop after delivering this many frames.
        #[arg(short, long)]
        frames: Option<u64>,

        /// Stop after this many seconds.
        #[arg(short, long)]
        duration_secs: Option<u64>,

        /// Directory to save every delivered frame as PNG.
        #[arg(long)]
        save_frames: Option<PathBuf>,

        /// Path to write the session recording (length-delimited protobuf).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Stream a moving test pattern, standing in for the rendering application.
    Send {
        /// Receiver address.
        #[arg(short, long, default_value = "127.0.0.1:8051")]
        target: SocketAddr,

        #[arg(short, long, value_enum, default_value_t = ModeArg::Color)]
        mode: ModeArg,

        /// Frames per second to send.
        #[arg(long, default_value_t = 30)]
        fps: u32,

        /// Stop after this many frames (default: run forever).
        #[arg(short, long)]
        frames: Option<u64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Color,
    Grayscale,
}
