//! Two-pole zero-delay-feedback state-variable section.
//!
//! Two trapezoidal integrators in series share `g`; the band output feeds
//! back through the damping `k`. Solving the loop in the current sample:
//!
//! ```text
//! bp = (g (x - s2) + s1) / (1 + g (g + k))
//! lp = s2 + g bp
//! hp = x - k bp - lp
//! ```
//!
//! The driven input is saturated before the solve, so the highpass and
//! notch taps, which carry `x` directly, stay bounded at any drive.
//!
//! When resonance drives `k` negative the section oscillates. Two things
//! bound it: the band tap is saturated before it updates the states, and
//! the damping seen by the solve rises toward 2 as the previous band level
//! grows (`k_eff = k + (2 - k)(1 - sat(a)/a)`). Small signals see `k`
//! unchanged.
//!
//! Reference: Zavalishin, "The Art of VA Filter Design", rev. 2.1.2,
//! Chapter 4.

use strata_core::{NumericGuard, saturate};

use super::mode::Taps;
use super::{HEADROOM, STATE_CEILING, settle_states};

/// Damping at maximum resonance (negative: the section oscillates).
pub const SVF_MAX_NEGATIVE_DAMPING: f32 = 0.2;

/// Per-channel state-variable state.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZdfSvf {
    s1: f32,
    s2: f32,
    level: f32,
}

impl ZdfSvf {
    /// Process one sample with prewarped `g` and damping `k`.
    ///
    /// `k` stays above -2, so the solve denominator `1 + g^2 + k g` is
    /// positive for every `g`.
    #[inline]
    pub fn process(&mut self, x: f32, g: f32, k: f32, guard: &mut NumericGuard) -> Taps {
        let compression = if self.level > 1e-6 {
            saturate(self.level, HEADROOM) / self.level
        } else {
            1.0
        };
        let k = k + (2.0 - k) * (1.0 - compression);
        let x = saturate(x, HEADROOM);

        let v1 = (g * (x - self.s2) + self.s1) / (1.0 + g * (g + k));
        let bp = saturate(v1, HEADROOM);
        self.level = guard.stage(v1, STATE_CEILING).abs();
        let lp = self.s2 + g * bp;
        let hp = x - k * bp - lp;

        let mut states = [2.0 * bp - self.s1, 2.0 * lp - self.s2];
        settle_states(&mut states, guard);
        [self.s1, self.s2] = states;

        Taps {
            lowpass: lp,
            highpass: hp,
            bandpass: bp,
            notch: lp + hp,
        }
    }

    /// Zero both integrators.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Integrator states `(s1, s2)`.
    pub fn states(&self) -> (f32, f32) {
        (self.s1, self.s2)
    }
}
