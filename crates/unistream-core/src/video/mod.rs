pub mod decoder;
pub mod encoder;
pub mod frame;
pub mod mode;
