//! Four-pole zero-delay-feedback ladder.
//!
//! Four one-pole sections in series share one cutoff; resonance feeds the
//! last output back to the input, around the whole cascade. Each section's
//! output is affine in its input, `y = G x + (1 - G) s`, so the cascade
//! output is `G^4 u + S`, where `S` collects the states:
//!
//! ```text
//! S = (1 - G) (G^3 s1 + G^2 s2 + G s3 + s4)
//! u = x - k y4          (the loop, no unit delay)
//!   = (x - k S) / (1 + k G^4)
//! ```
//!
//! The solved `u` passes through the saturator before entering the cascade.
//! That bounds the loop once `k` exceeds 4 (unity loop gain at cutoff),
//! where the ladder sustains a tone on its own.

use strata_core::{NumericGuard, saturate};

use super::mode::Taps;
use super::one_pole::TptOnePole;
use super::{HEADROOM, settle_states};

/// Ladder feedback at maximum resonance.
pub const K_LADDER_MAX: f32 = 6.0;

/// Per-channel ladder state.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZdfLadder {
    stages: [TptOnePole; 4],
}

impl ZdfLadder {
    /// Process one sample with section gain `big_g = g / (1 + g)` and
    /// feedback `k`.
    #[inline]
    pub fn process(&mut self, x: f32, big_g: f32, k: f32, guard: &mut NumericGuard) -> Taps {
        let leak = 1.0 - big_g;
        let cascade = self
            .stages
            .iter()
            .fold(0.0, |acc, stage| acc * big_g + leak * stage.state());
        let g2 = big_g * big_g;
        let u = saturate((x - k * cascade) / (1.0 + k * g2 * g2), HEADROOM);

        let mut y = [u, 0.0, 0.0, 0.0, 0.0];
        for (i, stage) in self.stages.iter_mut().enumerate() {
            y[i + 1] = stage.tick(y[i], big_g).0;
        }

        let mut states = self.stages.map(|stage| stage.state());
        settle_states(&mut states, guard);
        for (stage, s) in self.stages.iter_mut().zip(states) {
            stage.set_state(s);
        }

        let [y0, y1, y2, y3, y4] = y;
        Taps {
            lowpass: y4,
            highpass: y0 - 4.0 * y1 + 6.0 * y2 - 4.0 * y3 + y4,
            bandpass: 4.0 * y2 - 8.0 * y3 + 4.0 * y4,
            notch: y0 - 4.0 * y1 + 8.0 * y2 - 8.0 * y3 + 4.0 * y4,
        }
    }

    /// Zero every stage.
    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }

    /// Stage states, input side first.
    pub fn states(&self) -> [f32; 4] {
        self.stages.map(|stage| stage.state())
    }
}
