//! Waveshaping saturator with tone control.

use core::f32::consts::TAU;

use libm::expf;
use strata_core::{
    AudioBuffer, Engine, EngineBase, EngineError, EngineId, MAX_CHANNELS, OUTPUT_CEILING,
    ParamHandle, ParamSpec, ParamUnit, ProcessSpec, asymmetric_clip, db_to_linear, exp_map,
    foldback, hard_clip, soft_clip, wet_dry_mix,
};

/// Drive pre-gain at full Drive.
pub const MAX_DRIVE_DB: f32 = 36.0;
/// Output level range.
pub const OUTPUT_MIN_DB: f32 = -24.0;
/// Output level range.
pub const OUTPUT_MAX_DB: f32 = 6.0;
/// Tone lowpass range.
pub const TONE_MIN_HZ: f32 = 500.0;
/// Tone lowpass range.
pub const TONE_MAX_HZ: f32 = 20000.0;
const FOLDBACK_THRESHOLD: f32 = 0.8;

/// Waveshaping algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WaveShape {
    /// tanh soft clip.
    #[default]
    SoftClip,
    /// Hard clip at ±1.
    HardClip,
    /// Foldback around ±0.8.
    Foldback,
    /// Asymmetric soft clip (even harmonics).
    Asymmetric,
}

impl WaveShape {
    /// Shape for a band index of the Shape selector.
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => WaveShape::SoftClip,
            1 => WaveShape::HardClip,
            2 => WaveShape::Foldback,
            _ => WaveShape::Asymmetric,
        }
    }

    #[inline]
    fn apply(self, x: f32) -> f32 {
        match self {
            WaveShape::SoftClip => soft_clip(x),
            WaveShape::HardClip => hard_clip(x, 1.0),
            WaveShape::Foldback => foldback(x, FOLDBACK_THRESHOLD),
            WaveShape::Asymmetric => asymmetric_clip(x),
        }
    }
}

/// Parameter indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum SaturatorParam {
    /// Pre-gain, 0–36 dB.
    Drive,
    /// Waveshape selector.
    Shape,
    /// Post-shaper lowpass, 500 Hz – 20 kHz.
    Tone,
    /// Output level, −24 to +6 dB.
    Output,
    /// Dry/wet.
    Mix,
}

impl SaturatorParam {
    /// Position in the parameter table.
    pub const fn index(self) -> usize {
        self as usize
    }
}

static PARAMS: [ParamSpec; 5] = [
    ParamSpec::continuous("Drive", "Drive", 1.0 / 3.0, 10.0).with_unit(ParamUnit::Decibels),
    ParamSpec::stepped("Shape", "Shape", 0.0, 4),
    ParamSpec::continuous("Tone", "Tone", 0.7516, 10.0).with_unit(ParamUnit::Hertz),
    ParamSpec::continuous("Output", "Output", 0.8, 10.0).with_unit(ParamUnit::Decibels),
    ParamSpec::mix(),
];

/// Waveshaping distortion engine.
///
/// Drive, shape, one-pole tone lowpass, output level, then dry/wet.
///
/// # Parameters
///
/// | # | Name | Range | Default |
/// |---|------|-------|---------|
/// | 0 | Drive | 0–36 dB | 12 dB |
/// | 1 | Shape | Soft / Hard / Fold / Asym | Soft |
/// | 2 | Tone | 500 Hz – 20 kHz (exponential) | ≈8 kHz |
/// | 3 | Output | −24 to +6 dB | 0 dB |
/// | 4 | Mix | 0–100% | 100% |
#[derive(Debug)]
pub struct Saturator {
    base: EngineBase,
    tone_state: [f32; MAX_CHANNELS],
}

impl Saturator {
    /// Engine identifier.
    pub const ID: EngineId = EngineId(2);

    /// Saturator prepared for the default configuration.
    pub fn new() -> Self {
        Self {
            base: EngineBase::new(&PARAMS),
            tone_state: [0.0; MAX_CHANNELS],
        }
    }

    /// Selected waveshape.
    pub fn waveshape(&self) -> WaveShape {
        WaveShape::from_index(self.base.step(SaturatorParam::Shape.index()))
    }
}

impl Default for Saturator {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for Saturator {
    fn id(&self) -> EngineId {
        Self::ID
    }

    fn name(&self) -> &'static str {
        "Saturator"
    }

    fn prepare(&mut self, spec: &ProcessSpec) -> Result<(), EngineError> {
        self.base.prepare(spec)?;
        self.reset();
        Ok(())
    }

    fn reset(&mut self) {
        self.base.reset();
        self.tone_state = [0.0; MAX_CHANNELS];
    }

    fn num_parameters(&self) -> usize {
        self.base.num_parameters()
    }

    fn parameter_spec(&self, index: usize) -> Option<ParamSpec> {
        self.base.parameter_spec(index)
    }

    fn mix_index(&self) -> Option<usize> {
        Some(SaturatorParam::Mix.index())
    }

    fn param_handle(&self) -> ParamHandle {
        self.base.handle()
    }

    fn process(&mut self, buffer: &mut AudioBuffer<'_>) {
        self.base.pull();
        let shape = self.waveshape();
        let channels = buffer.num_channels().min(self.base.num_channels());
        let fs = self.base.sample_rate();

        for frame in 0..buffer.num_frames() {
            let drive = db_to_linear(self.base.advance(SaturatorParam::Drive.index()) * MAX_DRIVE_DB);
            let tone_hz = exp_map(
                self.base.advance(SaturatorParam::Tone.index()),
                TONE_MIN_HZ,
                TONE_MAX_HZ,
            );
            let tone_coeff = 1.0 - expf(-TAU * tone_hz / fs);
            let level = db_to_linear(
                OUTPUT_MIN_DB
                    + self.base.advance(SaturatorParam::Output.index())
                        * (OUTPUT_MAX_DB - OUTPUT_MIN_DB),
            );
            let mix = self.base.advance(SaturatorParam::Mix.index());

            for ch in 0..channels {
                let dry = self.base.guard.stage(buffer.get(ch, frame), OUTPUT_CEILING);
                let shaped = shape.apply(dry * drive);
                let state = &mut self.tone_state[ch];
                *state = self.base.guard.stage(*state + tone_coeff * (shaped - *state), OUTPUT_CEILING);
                let wet = self.base.guard.stage(*state * level, OUTPUT_CEILING);
                let out = self.base.guard.output(wet_dry_mix(dry, wet, mix));
                buffer.set(ch, frame, out);
            }
        }
    }

    fn numeric_faults(&self) -> u32 {
        self.base.guard.faults()
    }
}
