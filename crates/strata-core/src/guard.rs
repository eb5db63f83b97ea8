//! Sample-level numeric guards.
//!
//! Every filter stage and every engine output passes through this layer. It
//! does three things, in this order:
//!
//! 1. **Finiteness**: NaN and ±Inf become `0.0` and the event is counted.
//! 2. **Denormal flush**: magnitudes below [`DENORMAL_THRESHOLD`] become
//!    exact zero, so feedback tails never decay into subnormal arithmetic.
//! 3. **Hard clamp**: magnitudes are bounded by a ceiling
//!    ([`OUTPUT_CEILING`] for engine output).
//!
//! Reference: IEEE 754-2008, Section 3.4 (Subnormal numbers).

/// Magnitudes below this are forced to exact zero.
pub const DENORMAL_THRESHOLD: f32 = 1e-30;

/// Absolute ceiling for any sample an engine writes to the host buffer.
pub const OUTPUT_CEILING: f32 = 10.0;

/// Flush values below [`DENORMAL_THRESHOLD`] to zero.
///
/// ```rust
/// use strata_core::flush_denormal;
///
/// assert_eq!(flush_denormal(1e-35), 0.0);
/// assert_eq!(flush_denormal(0.25), 0.25);
/// ```
#[allow(clippy::inline_always)]
#[inline(always)]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < DENORMAL_THRESHOLD { 0.0 } else { x }
}

/// Replace a non-finite value with zero.
///
/// Returns the cleaned value and `true` when a replacement happened.
#[inline]
pub fn sanitize(x: f32) -> (f32, bool) {
    if x.is_finite() { (x, false) } else { (0.0, true) }
}

/// Bound `x` to `[-ceiling, ceiling]`.
///
/// NaN maps to `0.0` rather than propagating through `clamp`.
#[inline]
pub fn hard_clamp(x: f32, ceiling: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(-ceiling, ceiling)
    }
}

/// Stateful guard that counts recovered faults.
///
/// One guard lives in each engine. The audio thread calls
/// [`stage`](Self::stage) after filter stages and [`output`](Self::output)
/// before writing to the host buffer; non-audio code reads the count later
/// with [`faults`](Self::faults).
///
/// ```rust
/// use strata_core::NumericGuard;
///
/// let mut guard = NumericGuard::new();
/// assert_eq!(guard.output(f32::NAN), 0.0);
/// assert_eq!(guard.output(50.0), 10.0);
/// assert_eq!(guard.faults(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct NumericGuard {
    faults: u32,
}

impl NumericGuard {
    /// Create a guard with a zero fault count.
    pub const fn new() -> Self {
        Self { faults: 0 }
    }

    /// Guard an intermediate stage value: finite, flushed, within `ceiling`.
    #[inline]
    pub fn stage(&mut self, x: f32, ceiling: f32) -> f32 {
        let (x, fault) = sanitize(x);
        if fault {
            self.faults = self.faults.saturating_add(1);
        }
        flush_denormal(x).clamp(-ceiling, ceiling)
    }

    /// Guard a sample about to be written to the host buffer.
    #[inline]
    pub fn output(&mut self, x: f32) -> f32 {
        self.stage(x, OUTPUT_CEILING)
    }

    /// Check a state value without altering it.
    ///
    /// Returns `false` (and counts a fault) when the value is not finite, so
    /// the caller can zero the owning section.
    #[inline]
    pub fn check(&mut self, x: f32) -> bool {
        if x.is_finite() {
            true
        } else {
            self.faults = self.faults.saturating_add(1);
            false
        }
    }

    /// Faults recovered since the last [`clear`](Self::clear).
    pub fn faults(&self) -> u32 {
        self.faults
    }

    /// Reset the fault count.
    pub fn clear(&mut self) {
        self.faults = 0;
    }
}
