//! Component tolerance and thermal drift.
//!
//! Each filter instance owns an [`AnalogModel`]. On reset it draws fresh
//! tolerance offsets from its own PRNG, like swapping in a new batch of
//! capacitors. While running, a thermal accumulator follows processed
//! signal energy with a two-second time constant and pulls cutoff and
//! resonance slightly down as it warms. Drift only ever lowers resonance,
//! so it can never push the loop toward instability.
//!
//! The `amount` argument (the Analog parameter) scales both effects;
//! `amount = 0` gives ideal components.

use libm::tanhf;
use strata_core::{Xorshift32, time_constant_coeff};

/// Cutoff tolerance, as a fraction.
pub const CUTOFF_TOLERANCE: f32 = 0.02;
/// Resonance tolerance, as a fraction.
pub const RESONANCE_TOLERANCE: f32 = 0.015;
/// Drive tolerance, as a fraction.
pub const DRIVE_TOLERANCE: f32 = 0.02;
/// Thermal time constant.
pub const THERMAL_TIME_MS: f32 = 2000.0;
/// Largest downward cutoff drift when fully warm.
pub const MAX_CUTOFF_DRIFT: f32 = 0.01;
/// Largest downward resonance drift when fully warm.
pub const MAX_RESONANCE_DRIFT: f32 = 0.01;
/// Energy-to-heat gain; a full-scale sine warms to about `tanh(2)`.
const THERMAL_GAIN: f32 = 4.0;

/// Per-instance analog imperfection state.
#[derive(Debug, Clone)]
pub struct AnalogModel {
    rng: Xorshift32,
    cutoff_offset: f32,
    resonance_offset: f32,
    drive_offset: f32,
    thermal: f32,
    thermal_coeff: f32,
}

impl AnalogModel {
    /// Model with a seed distinct from every other instance, tolerances
    /// already drawn.
    pub fn new(sample_rate: f32) -> Self {
        Self::from_rng(Xorshift32::next_instance(), sample_rate)
    }

    /// Model with an explicit seed, for reproducible output.
    pub fn with_seed(seed: u32, sample_rate: f32) -> Self {
        Self::from_rng(Xorshift32::new(seed), sample_rate)
    }

    fn from_rng(rng: Xorshift32, sample_rate: f32) -> Self {
        let mut model = Self {
            rng,
            cutoff_offset: 0.0,
            resonance_offset: 0.0,
            drive_offset: 0.0,
            thermal: 0.0,
            thermal_coeff: 0.0,
        };
        model.set_sample_rate(sample_rate);
        model.reset();
        model
    }

    /// Update the thermal time constant for a new sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.thermal_coeff = time_constant_coeff(THERMAL_TIME_MS, sample_rate);
    }

    /// Draw new tolerances and cool down.
    pub fn reset(&mut self) {
        self.cutoff_offset = self.rng.next_bipolar() * CUTOFF_TOLERANCE;
        self.resonance_offset = self.rng.next_bipolar() * RESONANCE_TOLERANCE;
        self.drive_offset = self.rng.next_bipolar() * DRIVE_TOLERANCE;
        self.thermal = 0.0;
    }

    /// Feed one sample's signal energy (mean square across channels).
    #[inline]
    pub fn accumulate(&mut self, energy: f32) {
        let heat = if energy.is_finite() {
            (energy * THERMAL_GAIN).min(THERMAL_GAIN)
        } else {
            0.0
        };
        self.thermal += self.thermal_coeff * (heat - self.thermal);
    }

    /// Drift in `[0, 1)`; zero when cold.
    #[inline]
    pub fn drift(&self) -> f32 {
        tanhf(self.thermal)
    }

    /// Multiplier for cutoff frequency.
    #[inline]
    pub fn cutoff_scale(&self, amount: f32) -> f32 {
        (1.0 + amount * self.cutoff_offset) * (1.0 - amount * MAX_CUTOFF_DRIFT * self.drift())
    }

    /// Multiplier for normalized resonance.
    #[inline]
    pub fn resonance_scale(&self, amount: f32) -> f32 {
        (1.0 + amount * self.resonance_offset)
            * (1.0 - amount * MAX_RESONANCE_DRIFT * self.drift())
    }

    /// Multiplier for drive gain.
    #[inline]
    pub fn drive_scale(&self, amount: f32) -> f32 {
        1.0 + amount * self.drive_offset
    }

    /// Current tolerance offsets `(cutoff, resonance, drive)`.
    pub fn offsets(&self) -> (f32, f32, f32) {
        (self.cutoff_offset, self.resonance_offset, self.drive_offset)
    }

    /// Thermal accumulator level.
    pub fn thermal(&self) -> f32 {
        self.thermal
    }
}
