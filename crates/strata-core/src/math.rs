//! Mathematical utility functions for DSP.
//!
//! All functions are allocation-free and `no_std` compatible.
//!
//! # Waveshaping
//!
//! | Function | Character | Harmonics |
//! |----------|-----------|-----------|
//! | [`soft_clip`] | Smooth, warm | Odd |
//! | [`hard_clip`] | Harsh, buzzy | Odd (many) |
//! | [`foldback`] | Complex, synthy | Even + Odd |
//! | [`asymmetric_clip`] | Warm, tube-like | Even + Odd |
//!
//! [`saturate`] is the bounded tanh used inside filter feedback loops.

use libm::{expf, fmodf, logf, powf, tanhf};

/// Convert decibels to linear gain.
///
/// ```rust
/// use strata_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Convert linear gain to decibels. Inputs are floored at 1e-10.
#[inline]
pub fn linear_to_db(linear: f32) -> f32 {
    const FACTOR: f32 = 20.0 / core::f32::consts::LN_10;
    logf(linear.max(1e-10)) * FACTOR
}

/// Bounded tanh saturation: `headroom * tanh(x / headroom)`.
///
/// Unity slope at the origin, so small signals pass unchanged, and the
/// output never exceeds `±headroom`.
#[inline]
pub fn saturate(x: f32, headroom: f32) -> f32 {
    headroom * tanhf(x / headroom)
}

/// Soft clip using hyperbolic tangent, output in (-1, 1).
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    tanhf(x)
}

/// Hard clip to `±threshold`.
#[inline]
pub fn hard_clip(x: f32, threshold: f32) -> f32 {
    x.clamp(-threshold, threshold)
}

/// Foldback distortion: signal above `threshold` reflects back into range.
///
/// Closed-form triangle fold with period `4 * threshold`, so arbitrarily hot
/// input stays bounded without iteration.
#[inline]
pub fn foldback(x: f32, threshold: f32) -> f32 {
    if !x.is_finite() || threshold <= 0.0 {
        return 0.0;
    }
    let period = 4.0 * threshold;
    let mut phase = fmodf(x + threshold, period);
    if phase < 0.0 {
        phase += period;
    }
    threshold - (phase - 2.0 * threshold).abs()
}

/// Asymmetric soft clip: the negative half compresses harder, adding even
/// harmonics.
#[inline]
pub fn asymmetric_clip(x: f32) -> f32 {
    if x >= 0.0 {
        tanhf(x)
    } else {
        tanhf(x * 1.5) / 1.5 * 1.2
    }
}

/// Linear dry/wet crossfade, applied after wet processing.
///
/// `mix = 0` returns `dry` exactly; `mix = 1` returns `wet` exactly.
#[inline]
pub fn wet_dry_mix(dry: f32, wet: f32, mix: f32) -> f32 {
    dry * (1.0 - mix) + wet * mix
}

/// Map a normalized value onto an exponential range `min * (max/min)^v`.
///
/// Used for frequency and time parameters, where equal knob travel should
/// give equal ratios.
#[inline]
pub fn exp_map(normalized: f32, min: f32, max: f32) -> f32 {
    min * powf(max / min, normalized.clamp(0.0, 1.0))
}

/// Convert milliseconds to samples.
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> f32 {
    ms * sample_rate / 1000.0
}

/// One-pole coefficient for a time constant in milliseconds.
///
/// `1 - exp(-1 / (tau * fs))`; returns `1.0` (instant) for non-positive times.
#[inline]
pub fn time_constant_coeff(time_ms: f32, sample_rate: f32) -> f32 {
    let samples = ms_to_samples(time_ms, sample_rate);
    if samples <= 0.0 {
        1.0
    } else {
        1.0 - expf(-1.0 / samples)
    }
}
