//! Strata Core - the real-time engine contract and its numeric foundations
//!
//! Everything an engine needs apart from its own DSP lives here, with zero
//! allocation in the audio path.
//!
//! # Engine Contract
//!
//! - [`Engine`] - Object-safe trait every processor implements
//! - [`EngineBase`] - Shared parameter and guard bookkeeping for engines
//! - [`ProcessSpec`] - Validated sample rate, block size and channel count
//! - [`AudioBuffer`] - Planar or interleaved view over host audio
//! - [`TransportInfo`] - Host tempo and play state
//!
//! ## Parameters
//!
//! All parameters are normalized to `[0, 1]` at the API boundary.
//!
//! - [`ParamSpec`] - Static per-parameter description
//! - [`ParamStore`] / [`ParamHandle`] - Lock-free publish from any thread
//! - [`ParamUpdate`] - Sparse, fixed-capacity change set
//! - [`SmoothedParam`] / [`LinearSmoothedParam`] - Click-free approach to
//!   new targets
//!
//! ## Numerics
//!
//! - [`NumericGuard`] - Finiteness, denormal flush and output clamp
//! - [`Xorshift32`] - Owned, seedable PRNG
//! - [`EnvelopeFollower`] - Attack/release amplitude tracking
//! - Math: [`db_to_linear`], [`saturate`], [`exp_map`], etc.
//!
//! # no_std Support
//!
//! The crate needs `alloc` (parameter stores are shared through `Arc`) but
//! not `std`. Disable the default feature for embedded targets:
//!
//! ```toml
//! [dependencies]
//! strata-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod buffer;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod guard;
pub mod math;
pub mod param;
pub mod param_spec;
pub mod rng;
pub mod store;
pub mod tempo;

pub use buffer::AudioBuffer;
pub use engine::{Engine, EngineBase, EngineId, MAX_CHANNELS, ProcessSpec};
pub use envelope::EnvelopeFollower;
pub use error::EngineError;
pub use guard::{
    DENORMAL_THRESHOLD, NumericGuard, OUTPUT_CEILING, flush_denormal, hard_clamp, sanitize,
};
pub use math::{
    asymmetric_clip, db_to_linear, exp_map, foldback, hard_clip, linear_to_db, ms_to_samples,
    saturate, soft_clip, time_constant_coeff, wet_dry_mix,
};
pub use param::{LinearSmoothedParam, ParamSmoother, SmoothedParam, Smoothing};
pub use param_spec::{ParamSpec, ParamUnit};
pub use rng::Xorshift32;
pub use store::{MAX_UPDATE_ENTRIES, ParamHandle, ParamStore, ParamUpdate};
pub use tempo::{NoteDivision, TransportInfo};
