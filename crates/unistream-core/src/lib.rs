pub mod config;
pub mod error;
pub mod pacer;
pub mod receiver;
pub mod recording;
pub mod sender;
pub mod slot;
pub mod source;
pub mod video;
