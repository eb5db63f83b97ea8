//! Parameter smoothing for click-free changes.
//!
//! Hosts change parameters instantaneously; audio code must not. Each
//! parameter owns a smoother holding the `(current, target, slew)` triple:
//! control code only moves the target, and the audio path reads the current
//! value once per sample via `advance()`.
//!
//! ## Smoothing Methods
//!
//! - [`SmoothedParam`]: exponential (one-pole) approach, natural for
//!   frequency, resonance and drive
//! - [`LinearSmoothedParam`]: constant-rate ramp that lands exactly on the
//!   target, used for crossfades (mode read-out weights, topology fades)
//! - [`ParamSmoother`]: either of the above, chosen per parameter by its
//!   [`Smoothing`] kind
//!
//! All three are deterministic: the same sequence of targets and sample
//! counts produces a bit-identical trajectory.
//!
//! ```rust
//! use strata_core::SmoothedParam;
//!
//! let mut cutoff = SmoothedParam::with_config(0.2, 48000.0, 20.0);
//! cutoff.set_target(0.8);
//! let first = cutoff.advance();
//! assert!(first > 0.2 && first < 0.8);
//! ```

use crate::math::time_constant_coeff;

/// How a parameter approaches a new target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Smoothing {
    /// One-pole exponential approach with the given time constant.
    #[default]
    Exponential,
    /// Constant-rate ramp that reaches the target after the given time.
    Linear,
    /// No smoothing; stepped parameters (mode selectors) jump.
    None,
}

/// Exponentially smoothed parameter.
///
/// `current += coeff * (target - current)` each sample, where
/// `coeff = 1 - exp(-1 / (tau * fs))`. The per-sample step is therefore
/// bounded by `coeff * |target - current|`.
#[derive(Debug, Clone)]
pub struct SmoothedParam {
    current: f32,
    target: f32,
    coeff: f32,
    sample_rate: f32,
    smoothing_time_ms: f32,
}

impl SmoothedParam {
    /// Create a parameter with no smoothing configured (instant changes).
    pub fn new(initial: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            coeff: 1.0,
            sample_rate: 48000.0,
            smoothing_time_ms: 0.0,
        }
    }

    /// Create a parameter with sample rate and time constant configured.
    pub fn with_config(initial: f32, sample_rate: f32, smoothing_time_ms: f32) -> Self {
        let mut param = Self::new(initial);
        param.sample_rate = sample_rate;
        param.smoothing_time_ms = smoothing_time_ms;
        param.recalculate_coeff();
        param
    }

    /// Set the value the parameter approaches.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Set target and current value together.
    #[inline]
    pub fn set_immediate(&mut self, value: f32) {
        self.target = value;
        self.current = value;
    }

    /// Update the sample rate and recompute the coefficient.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coeff();
    }

    /// Advance one sample and return the new current value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        self.current += self.coeff * (self.target - self.current);
        self.current
    }

    /// Advance `samples` steps at once (block-rate smoothing).
    ///
    /// Same result as calling [`advance`](Self::advance) `samples` times.
    pub fn advance_by(&mut self, samples: usize) -> f32 {
        for _ in 0..samples {
            self.advance();
        }
        self.current
    }

    /// Current value without advancing.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// True once within 1e-6 of the target.
    #[inline]
    pub fn is_settled(&self) -> bool {
        (self.current - self.target).abs() < 1e-6
    }

    /// Jump to the target.
    #[inline]
    pub fn snap_to_target(&mut self) {
        self.current = self.target;
    }

    fn recalculate_coeff(&mut self) {
        self.coeff = if self.sample_rate <= 0.0 {
            1.0
        } else {
            time_constant_coeff(self.smoothing_time_ms, self.sample_rate)
        };
    }
}

impl Default for SmoothedParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Linearly ramped parameter.
///
/// A new target starts a ramp of `transition_time_ms`; the value moves by a
/// constant increment each sample and lands exactly on the target.
#[derive(Debug, Clone)]
pub struct LinearSmoothedParam {
    current: f32,
    target: f32,
    increment: f32,
    samples_remaining: u32,
    sample_rate: f32,
    transition_time_ms: f32,
}

impl LinearSmoothedParam {
    /// Create a ramp with a 10 ms default transition at 48 kHz.
    pub fn new(initial: f32) -> Self {
        Self::with_config(initial, 48000.0, 10.0)
    }

    /// Create a ramp with sample rate and transition time configured.
    pub fn with_config(initial: f32, sample_rate: f32, transition_time_ms: f32) -> Self {
        Self {
            current: initial,
            target: initial,
            increment: 0.0,
            samples_remaining: 0,
            sample_rate,
            transition_time_ms,
        }
    }

    /// Start a ramp toward `target` from the current value.
    ///
    /// Re-setting the same target does not restart the ramp.
    pub fn set_target(&mut self, target: f32) {
        if target == self.target {
            return;
        }
        self.target = target;

        let samples = (self.transition_time_ms / 1000.0 * self.sample_rate) as u32;
        if samples == 0 {
            self.current = target;
            self.increment = 0.0;
            self.samples_remaining = 0;
        } else {
            self.increment = (target - self.current) / samples as f32;
            self.samples_remaining = samples;
        }
    }

    /// Set target and current value together, cancelling any ramp.
    pub fn set_immediate(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.increment = 0.0;
        self.samples_remaining = 0;
    }

    /// Update the sample rate used for future ramps.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    /// Advance one sample and return the new current value.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        if self.samples_remaining > 0 {
            self.current += self.increment;
            self.samples_remaining -= 1;
            if self.samples_remaining == 0 {
                self.current = self.target;
            }
        }
        self.current
    }

    /// Current value without advancing.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    /// True when no ramp is in progress.
    #[inline]
    pub fn is_settled(&self) -> bool {
        self.samples_remaining == 0
    }

    /// Jump to the target, cancelling any ramp.
    pub fn snap_to_target(&mut self) {
        self.current = self.target;
        self.increment = 0.0;
        self.samples_remaining = 0;
    }
}

impl Default for LinearSmoothedParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// A smoother whose kind is chosen per parameter.
#[derive(Debug, Clone)]
pub enum ParamSmoother {
    /// Exponential approach.
    Exponential(SmoothedParam),
    /// Linear ramp.
    Linear(LinearSmoothedParam),
    /// Immediate (stepped parameters).
    Immediate(f32),
}

impl ParamSmoother {
    /// Build a smoother of the given kind.
    pub fn new(kind: Smoothing, initial: f32, sample_rate: f32, time_ms: f32) -> Self {
        match kind {
            Smoothing::Exponential => {
                Self::Exponential(SmoothedParam::with_config(initial, sample_rate, time_ms))
            }
            Smoothing::Linear => {
                Self::Linear(LinearSmoothedParam::with_config(initial, sample_rate, time_ms))
            }
            Smoothing::None => Self::Immediate(initial),
        }
    }

    /// Set the target value.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        match self {
            Self::Exponential(p) => p.set_target(target),
            Self::Linear(p) => p.set_target(target),
            Self::Immediate(v) => *v = target,
        }
    }

    /// Advance one sample.
    #[inline]
    pub fn advance(&mut self) -> f32 {
        match self {
            Self::Exponential(p) => p.advance(),
            Self::Linear(p) => p.advance(),
            Self::Immediate(v) => *v,
        }
    }

    /// Current value.
    #[inline]
    pub fn get(&self) -> f32 {
        match self {
            Self::Exponential(p) => p.get(),
            Self::Linear(p) => p.get(),
            Self::Immediate(v) => *v,
        }
    }

    /// Target value.
    #[inline]
    pub fn target(&self) -> f32 {
        match self {
            Self::Exponential(p) => p.target(),
            Self::Linear(p) => p.target(),
            Self::Immediate(v) => *v,
        }
    }

    /// True once the current value has reached the target.
    #[inline]
    pub fn is_settled(&self) -> bool {
        match self {
            Self::Exponential(p) => p.is_settled(),
            Self::Linear(p) => p.is_settled(),
            Self::Immediate(_) => true,
        }
    }

    /// Jump to the target.
    pub fn snap_to_target(&mut self) {
        match self {
            Self::Exponential(p) => p.snap_to_target(),
            Self::Linear(p) => p.snap_to_target(),
            Self::Immediate(_) => {}
        }
    }

    /// Update the sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        match self {
            Self::Exponential(p) => p.set_sample_rate(sample_rate),
            Self::Linear(p) => p.set_sample_rate(sample_rate),
            Self::Immediate(_) => {}
        }
    }
}
