//! Filter response selection and read-out weighting.
//!
//! Every topology produces the same four taps from one solved state; a mode
//! is just a weight vector over those taps. Switching mode ramps the weights
//! linearly, so the state is never disturbed and the output never jumps.

use strata_core::LinearSmoothedParam;

/// Mode and topology crossfade length.
pub const TRANSITION_MS: f32 = 10.0;

/// Response type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FilterMode {
    /// Passes below cutoff.
    #[default]
    Lowpass,
    /// Passes above cutoff.
    Highpass,
    /// Passes around cutoff.
    Bandpass,
    /// Rejects around cutoff.
    Notch,
}

impl FilterMode {
    /// Mode for a band index of the Mode selector.
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => FilterMode::Lowpass,
            1 => FilterMode::Highpass,
            2 => FilterMode::Bandpass,
            _ => FilterMode::Notch,
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Number of cascaded sections, which also picks the topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PoleCount {
    /// 6 dB/oct, single one-pole section.
    One,
    /// 12 dB/oct, state-variable topology.
    Two,
    /// 24 dB/oct, ladder topology.
    #[default]
    Four,
}

impl PoleCount {
    /// Pole count for a band index of the Poles selector.
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => PoleCount::One,
            1 => PoleCount::Two,
            _ => PoleCount::Four,
        }
    }

    /// Nominal order.
    pub fn order(self) -> u32 {
        match self {
            PoleCount::One => 1,
            PoleCount::Two => 2,
            PoleCount::Four => 4,
        }
    }
}

/// The four read-outs of one solved filter state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Taps {
    /// Lowpass.
    pub lowpass: f32,
    /// Highpass.
    pub highpass: f32,
    /// Bandpass.
    pub bandpass: f32,
    /// Notch.
    pub notch: f32,
}

impl Taps {
    /// Weighted sum of the taps, in [`FilterMode`] order.
    #[inline]
    pub fn combine(&self, weights: &[f32; 4]) -> f32 {
        self.lowpass * weights[0]
            + self.highpass * weights[1]
            + self.bandpass * weights[2]
            + self.notch * weights[3]
    }
}

/// Linearly ramped read-out weights.
#[derive(Debug, Clone)]
pub struct ModeWeights {
    mode: FilterMode,
    weights: [LinearSmoothedParam; 4],
}

impl ModeWeights {
    /// Weights fully on `mode`.
    pub fn new(mode: FilterMode, sample_rate: f32) -> Self {
        let weights = core::array::from_fn(|slot| {
            let initial = if slot == mode.slot() { 1.0 } else { 0.0 };
            LinearSmoothedParam::with_config(initial, sample_rate, TRANSITION_MS)
        });
        Self { mode, weights }
    }

    /// Selected mode (the ramp target).
    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    /// Ramp toward `mode`. Re-selecting the current mode does nothing.
    pub fn set_mode(&mut self, mode: FilterMode) {
        if mode == self.mode {
            return;
        }
        self.mode = mode;
        for (slot, weight) in self.weights.iter_mut().enumerate() {
            weight.set_target(if slot == mode.slot() { 1.0 } else { 0.0 });
        }
    }

    /// Jump to `mode` without a ramp.
    pub fn snap(&mut self, mode: FilterMode) {
        self.mode = mode;
        for (slot, weight) in self.weights.iter_mut().enumerate() {
            weight.set_immediate(if slot == mode.slot() { 1.0 } else { 0.0 });
        }
    }

    /// Update the ramp sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        for weight in &mut self.weights {
            weight.set_sample_rate(sample_rate);
        }
    }

    /// Advance one sample and return the weights.
    #[inline]
    pub fn advance(&mut self) -> [f32; 4] {
        [
            self.weights[0].advance(),
            self.weights[1].advance(),
            self.weights[2].advance(),
            self.weights[3].advance(),
        ]
    }
}
