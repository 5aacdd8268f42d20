//! Wire protocol: frame codec and frame check sequence.

pub mod crc;
pub mod frame;

// Re-export common types
pub use frame::{Command, Frame, FrameCodec, FrameConfig, MAX_PAYLOAD};
