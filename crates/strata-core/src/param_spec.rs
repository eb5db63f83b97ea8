//! Static parameter descriptions.
//!
//! Every engine exposes a fixed, ordered table of [`ParamSpec`]s. All
//! parameters live in normalized `[0, 1]` space at the API boundary; each
//! engine maps them onto physical units internally.
//!
//! ```rust
//! use strata_core::{ParamSpec, ParamUnit};
//!
//! const MODE: ParamSpec = ParamSpec::stepped("Mode", "Mode", 0.0, 4);
//! assert_eq!(MODE.step_index(0.6), 2);
//! assert_eq!(MODE.clamp(f32::NAN), 0.0);
//!
//! const CUTOFF: ParamSpec =
//!     ParamSpec::continuous("Cutoff", "Cutoff", 0.5, 20.0).with_unit(ParamUnit::Hertz);
//! assert!(!CUTOFF.is_stepped());
//! ```

use crate::param::Smoothing;

/// Display unit of the mapped (physical) value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamUnit {
    /// Decibels.
    Decibels,
    /// Hertz.
    Hertz,
    /// Milliseconds.
    Milliseconds,
    /// Percentage.
    Percent,
    /// Octaves.
    Octaves,
    /// Dimensionless or enumerated.
    None,
}

impl ParamUnit {
    /// Suffix used when displaying a value.
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Decibels => " dB",
            ParamUnit::Hertz => " Hz",
            ParamUnit::Milliseconds => " ms",
            ParamUnit::Percent => "%",
            ParamUnit::Octaves => " oct",
            ParamUnit::None => "",
        }
    }
}

/// Description of one normalized parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    /// Full display name.
    pub name: &'static str,
    /// Short name for narrow displays (max 8 characters).
    pub short_name: &'static str,
    /// Unit of the mapped value.
    pub unit: ParamUnit,
    /// Normalized default in `[0, 1]`.
    pub default: f32,
    /// How the engine smooths changes to this parameter.
    pub smoothing: Smoothing,
    /// Smoothing time constant (exponential) or ramp length (linear).
    pub smoothing_ms: f32,
    /// Number of discrete steps, or 0 for a continuous parameter.
    pub steps: u8,
}

impl ParamSpec {
    /// Continuous parameter with exponential smoothing.
    pub const fn continuous(
        name: &'static str,
        short_name: &'static str,
        default: f32,
        smoothing_ms: f32,
    ) -> Self {
        Self {
            name,
            short_name,
            unit: ParamUnit::None,
            default,
            smoothing: Smoothing::Exponential,
            smoothing_ms,
            steps: 0,
        }
    }

    /// Stepped selector split into `steps` equal bands. Not smoothed; the
    /// engine decides how to move between steps.
    pub const fn stepped(
        name: &'static str,
        short_name: &'static str,
        default: f32,
        steps: u8,
    ) -> Self {
        Self {
            name,
            short_name,
            unit: ParamUnit::None,
            default,
            smoothing: Smoothing::None,
            smoothing_ms: 0.0,
            steps,
        }
    }

    /// Standard mix parameter: fully wet by default, 5 ms smoothing.
    pub const fn mix() -> Self {
        Self::continuous("Mix", "Mix", 1.0, 5.0).with_unit(ParamUnit::Percent)
    }

    /// Set the display unit.
    pub const fn with_unit(mut self, unit: ParamUnit) -> Self {
        self.unit = unit;
        self
    }

    /// Override the smoothing kind and time.
    pub const fn with_smoothing(mut self, smoothing: Smoothing, time_ms: f32) -> Self {
        self.smoothing = smoothing;
        self.smoothing_ms = time_ms;
        self
    }

    /// True for selector parameters.
    pub const fn is_stepped(&self) -> bool {
        self.steps > 0
    }

    /// Bring an incoming value into range: NaN becomes the default, anything
    /// else (including infinities) is clamped to `[0, 1]`.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.default
        } else {
            value.clamp(0.0, 1.0)
        }
    }

    /// Band index of `value` for a stepped parameter (0 when continuous).
    #[inline]
    pub fn step_index(&self, value: f32) -> usize {
        if self.steps == 0 {
            return 0;
        }
        let steps = self.steps as usize;
        let index = (self.clamp(value) * steps as f32) as usize;
        index.min(steps - 1)
    }
}
