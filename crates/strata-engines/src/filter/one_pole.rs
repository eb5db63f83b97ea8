//! Topology-preserving one-pole section.
//!
//! Trapezoidal integrator with the feedback solved in closed form:
//!
//! ```text
//! G  = g / (1 + g)
//! v  = G (x - s)
//! lp = v + s
//! hp = x - lp
//! s <- lp + v
//! ```
//!
//! Reference: Zavalishin, "The Art of VA Filter Design", rev. 2.1.2,
//! Chapter 3.

use strata_core::{NumericGuard, saturate};

use super::mode::Taps;
use super::{HEADROOM, settle_states};

/// One-pole lowpass/highpass pair.
///
/// A first-order loop cannot resonate, so this section takes no feedback
/// coefficient. Bandpass reads the highpass tap and notch reads the flat
/// `lp + hp` sum.
#[derive(Debug, Clone, Copy, Default)]
pub struct TptOnePole {
    s: f32,
}

impl TptOnePole {
    /// Process one sample. `big_g` is `g / (1 + g)`.
    #[inline]
    pub fn process(&mut self, x: f32, big_g: f32, guard: &mut NumericGuard) -> Taps {
        let x = saturate(x, HEADROOM);
        let (lp, hp) = self.tick(x, big_g);
        let mut states = [self.s];
        settle_states(&mut states, guard);
        self.s = states[0];
        Taps {
            lowpass: lp,
            highpass: hp,
            bandpass: hp,
            notch: lp + hp,
        }
    }

    /// Linear step without saturation or guarding; used by the ladder.
    #[inline]
    pub(crate) fn tick(&mut self, x: f32, big_g: f32) -> (f32, f32) {
        let v = big_g * (x - self.s);
        let lp = v + self.s;
        self.s = lp + v;
        (lp, x - lp)
    }

    /// Integrator state.
    pub fn state(&self) -> f32 {
        self.s
    }

    pub(crate) fn set_state(&mut self, s: f32) {
        self.s = s;
    }

    /// Zero the integrator.
    pub fn reset(&mut self) {
        self.s = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::PI;
    use libm::tanf;

    fn big_g(fc: f32, fs: f32) -> f32 {
        let g = tanf(PI * fc / fs);
        g / (1.0 + g)
    }

    #[test]
    fn dc_passes_lowpass() {
        let mut section = TptOnePole::default();
        let mut guard = NumericGuard::new();
        let coeff = big_g(1000.0, 48000.0);
        let mut taps = Taps::default();
        for _ in 0..2000 {
            taps = section.process(0.5, coeff, &mut guard);
        }
        assert!((taps.lowpass - 0.5).abs() < 1e-3);
        assert!(taps.highpass.abs() < 1e-3);
    }

    #[test]
    fn lp_plus_hp_reconstructs_input() {
        let mut section = TptOnePole::default();
        let mut guard = NumericGuard::new();
        let coeff = big_g(500.0, 44100.0);
        for i in 0..256 {
            let x = libm::sinf(i as f32 * 0.3) * 0.2;
            let taps = section.process(x, coeff, &mut guard);
            assert!((taps.notch - saturate(x, HEADROOM)).abs() < 1e-6);
        }
    }

    #[test]
    fn half_power_at_cutoff() {
        let fs = 48000.0;
        let fc = 1000.0;
        let coeff = big_g(fc, fs);
        let mut section = TptOnePole::default();
        let mut guard = NumericGuard::new();
        let mut peak = 0.0f32;
        for i in 0..(fs as usize) {
            let x = 0.1 * libm::sinf(2.0 * PI * fc * i as f32 / fs);
            let y = section.process(x, coeff, &mut guard).lowpass;
            if i > 24000 {
                peak = peak.max(y.abs());
            }
        }
        // -3 dB
        assert!((peak / 0.1 - 0.7071).abs() < 0.02, "gain {}", peak / 0.1);
    }

    #[test]
    fn non_finite_state_resets_section() {
        let mut section = TptOnePole::default();
        let mut guard = NumericGuard::new();
        section.set_state(f32::NAN);
        section.process(0.1, 0.2, &mut guard);
        assert_eq!(section.state(), 0.0);
        assert!(guard.faults() > 0);
    }
}
