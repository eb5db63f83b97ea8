//! Strata Engines - concrete processors behind the [`Engine`] contract
//!
//! - [`ZdfFilter`] - Zero-delay-feedback multi-mode filter: one-pole,
//!   state-variable and ladder topologies, self-oscillation, drive, envelope
//!   following and analog component modeling
//! - [`Saturator`] - Waveshaping distortion with tone and output level
//! - [`TempoDelay`] - Feedback delay with optional host tempo sync
//!
//! Every engine embeds an [`EngineBase`](strata_core::EngineBase), so
//! parameters arrive through the lock-free store and pass the guard layer on
//! the way out.
//!
//! ## Example
//!
//! ```rust
//! use strata_core::{AudioBuffer, Engine, ParamUpdate, ProcessSpec};
//! use strata_engines::ZdfFilter;
//!
//! let mut filter = ZdfFilter::new();
//! filter.prepare(&ProcessSpec::new(44100.0, 256, 2)).unwrap();
//! filter.update_parameters(&ParamUpdate::new().with(1, 0.5));
//!
//! let mut left = [0.1f32; 256];
//! let mut right = [0.1f32; 256];
//! let mut channels = [&mut left[..], &mut right[..]];
//! filter.process(&mut AudioBuffer::planar(&mut channels));
//! ```
//!
//! [`Engine`]: strata_core::Engine

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod filter;
pub mod saturator;
pub mod tempo_delay;

pub use filter::{FilterMode, FilterParam, PoleCount, ZdfFilter};
pub use saturator::{Saturator, SaturatorParam, WaveShape};
pub use tempo_delay::{DelayLine, TempoDelay, TempoDelayParam};
