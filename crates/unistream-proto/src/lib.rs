//! Protobuf messages for recorded stream sessions.

pub mod proto;
