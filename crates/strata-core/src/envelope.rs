//! Attack/release envelope follower.

use libm::expf;

/// Peak envelope follower with separate attack and release times.
///
/// `env = coeff * env + (1 - coeff) * |x|`, where `coeff` is the attack
/// coefficient while the rectified input is rising and the release
/// coefficient while it falls.
///
/// ```rust
/// use strata_core::EnvelopeFollower;
///
/// let mut env = EnvelopeFollower::with_times(48000.0, 1.0, 50.0);
/// let mut level = 0.0;
/// for _ in 0..1000 {
///     level = env.process(0.5);
/// }
/// assert!((level - 0.5).abs() < 0.01);
/// ```
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    envelope: f32,
    attack_coeff: f32,
    release_coeff: f32,
    sample_rate: f32,
    attack_ms: f32,
    release_ms: f32,
}

impl EnvelopeFollower {
    /// Follower with 10 ms attack and 100 ms release.
    pub fn new(sample_rate: f32) -> Self {
        Self::with_times(sample_rate, 10.0, 100.0)
    }

    /// Follower with explicit attack and release times.
    pub fn with_times(sample_rate: f32, attack_ms: f32, release_ms: f32) -> Self {
        let mut follower = Self {
            envelope: 0.0,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            sample_rate,
            attack_ms: attack_ms.max(0.1),
            release_ms: release_ms.max(1.0),
        };
        follower.recalculate_coefficients();
        follower
    }

    /// Set attack and release together; a no-op when both are unchanged.
    pub fn set_times(&mut self, attack_ms: f32, release_ms: f32) {
        let attack_ms = attack_ms.max(0.1);
        let release_ms = release_ms.max(1.0);
        if attack_ms != self.attack_ms || release_ms != self.release_ms {
            self.attack_ms = attack_ms;
            self.release_ms = release_ms;
            self.recalculate_coefficients();
        }
    }

    /// Attack time in milliseconds.
    pub fn attack_ms(&self) -> f32 {
        self.attack_ms
    }

    /// Release time in milliseconds.
    pub fn release_ms(&self) -> f32 {
        self.release_ms
    }

    /// Update the sample rate.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coefficients();
    }

    /// Feed one sample, return the envelope level (never negative).
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let rectified = input.abs();
        let coeff = if rectified > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope = coeff * self.envelope + (1.0 - coeff) * rectified;
        self.envelope
    }

    /// Current level.
    pub fn level(&self) -> f32 {
        self.envelope
    }

    /// Drop the level to zero.
    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }

    fn recalculate_coefficients(&mut self) {
        let per_ms = self.sample_rate / 1000.0;
        self.attack_coeff = expf(-1.0 / (self.attack_ms * per_ms));
        self.release_coeff = expf(-1.0 / (self.release_ms * per_ms));
    }
}

impl Default for EnvelopeFollower {
    fn default() -> Self {
        Self::new(48000.0)
    }
}
