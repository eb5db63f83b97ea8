//! Configuration errors.

use thiserror::Error;

/// Rejected processing configuration.
///
/// Returned by [`Engine::prepare`](crate::Engine::prepare); the engine keeps
/// its previous configuration when this is returned.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum EngineError {
    /// Sample rate is zero, negative, or not finite.
    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(f64),
    /// Maximum block size is zero.
    #[error("invalid block size: {0} frames")]
    InvalidBlockSize(usize),
    /// Channel count is zero or above the supported maximum.
    #[error("invalid channel count: {0} (supported: 1..={max})", max = crate::MAX_CHANNELS)]
    InvalidChannelCount(usize),
}
