pub mod analysis; // Spectrum views for scopes and tests
pub mod blip; // Band-limited synthesis buffer
pub mod channel; // Tone channels feeding a buffer
pub mod io;

pub use blip::{BlipBuffer, BlipConfig, BlipError, Generator, Synth};

/// Largest block the scope renders or analyzes in one go.
pub const MAX_BLOCK_SIZE: usize = 2048;
