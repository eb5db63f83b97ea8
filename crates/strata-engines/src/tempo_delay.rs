//! Feedback delay with optional host tempo sync.
//!
//! With Sync off the Time parameter sets the delay directly. With Sync on,
//! and a valid tempo from the host, the delay follows the selected
//! [`NoteDivision`] at the pushed BPM; without a valid tempo it falls back
//! to Time. Either way the delay in samples ramps linearly over 50 ms to
//! each new value, so tempo changes bend the repeats instead of clicking.
//!
//! Repeats are damped by a one-pole lowpass in the feedback path (Tone).

use alloc::vec::Vec;
use core::f32::consts::TAU;

use libm::{ceilf, expf};
use strata_core::{
    AudioBuffer, Engine, EngineBase, EngineError, EngineId, MAX_CHANNELS, NoteDivision,
    LinearSmoothedParam, OUTPUT_CEILING, ParamHandle, ParamSpec, ParamUnit, ProcessSpec,
    Smoothing, TransportInfo, exp_map, ms_to_samples, wet_dry_mix,
};

/// Shortest delay.
pub const MIN_TIME_MS: f32 = 1.0;
/// Longest delay, and the delay line capacity.
pub const MAX_TIME_MS: f32 = 2000.0;
/// Feedback at full Feedback.
pub const MAX_FEEDBACK: f32 = 0.95;
/// Glide applied to delay-time changes.
pub const TIME_GLIDE_MS: f32 = 50.0;
const TONE_MIN_HZ: f32 = 500.0;
const TONE_MAX_HZ: f32 = 20000.0;

/// Circular buffer with linearly interpolated reads.
///
/// Capacity is fixed at construction; reads and writes never allocate.
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f32>,
    head: usize,
}

impl DelayLine {
    /// Line holding at least `capacity` samples (minimum 2).
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: alloc::vec![0.0; capacity.max(2)],
            head: 0,
        }
    }

    /// Sample written `delay` samples before the next write, interpolated
    /// between neighbours. `delay` is clamped to `[1, capacity - 1]`.
    #[inline]
    pub fn read(&self, delay: f32) -> f32 {
        let len = self.buffer.len();
        let delay = delay.clamp(1.0, (len - 1) as f32);
        let whole = delay as usize;
        let frac = delay - whole as f32;
        let newer = self.buffer[(self.head + len - whole) % len];
        let older = self.buffer[(self.head + len - whole - 1) % len];
        newer + (older - newer) * frac
    }

    /// Append one sample.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.head] = sample;
        self.head += 1;
        if self.head == self.buffer.len() {
            self.head = 0;
        }
    }

    /// Zero the contents.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.head = 0;
    }

    /// Capacity in samples.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}

/// Parameter indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum TempoDelayParam {
    /// Free delay time, `1 * 2000^v` ms.
    Time,
    /// Off / on.
    Sync,
    /// Note division used while synced.
    Division,
    /// Feedback, 0–95%.
    Feedback,
    /// Feedback damping lowpass, 500 Hz – 20 kHz.
    Tone,
    /// Dry/wet.
    Mix,
}

impl TempoDelayParam {
    /// Position in the parameter table.
    pub const fn index(self) -> usize {
        self as usize
    }
}

static PARAMS: [ParamSpec; 6] = [
    ParamSpec::continuous("Delay Time", "Time", 0.7504, 10.0).with_unit(ParamUnit::Milliseconds),
    ParamSpec::stepped("Sync", "Sync", 0.0, 2),
    ParamSpec::stepped("Division", "Div", 3.5 / 9.0, 9),
    ParamSpec::continuous("Feedback", "Feedback", 0.4 / MAX_FEEDBACK, 10.0)
        .with_unit(ParamUnit::Percent),
    ParamSpec::continuous("Tone", "Tone", 0.7516, 10.0).with_unit(ParamUnit::Hertz),
    ParamSpec::continuous("Mix", "Mix", 0.5, 5.0)
        .with_unit(ParamUnit::Percent)
        .with_smoothing(Smoothing::Linear, 5.0),
];

/// Tempo-syncable feedback delay engine.
///
/// # Parameters
///
/// | # | Name | Range | Default |
/// |---|------|-------|---------|
/// | 0 | Delay Time | 1–2000 ms (exponential) | 300 ms |
/// | 1 | Sync | Off / On | Off |
/// | 2 | Division | 1/1 … 1/16 | 1/4 |
/// | 3 | Feedback | 0–95% | 40% |
/// | 4 | Tone | 500 Hz – 20 kHz | ≈8 kHz |
/// | 5 | Mix | 0–100% | 50% |
#[derive(Debug)]
pub struct TempoDelay {
    base: EngineBase,
    lines: Vec<DelayLine>,
    damping: [f32; MAX_CHANNELS],
    delay_samples: LinearSmoothedParam,
    transport: Option<TransportInfo>,
}

impl TempoDelay {
    /// Engine identifier.
    pub const ID: EngineId = EngineId(3);

    /// Delay prepared for the default configuration.
    pub fn new() -> Self {
        let base = EngineBase::new(&PARAMS);
        let fs = base.sample_rate();
        let mut delay = Self {
            lines: Self::allocate(base.spec()),
            base,
            damping: [0.0; MAX_CHANNELS],
            delay_samples: LinearSmoothedParam::with_config(0.0, fs, TIME_GLIDE_MS),
            transport: None,
        };
        delay.reset();
        delay
    }

    fn allocate(spec: &ProcessSpec) -> Vec<DelayLine> {
        let capacity = ceilf(ms_to_samples(MAX_TIME_MS, spec.sample_rate_f32())) as usize + 2;
        (0..spec.num_channels)
            .map(|_| DelayLine::new(capacity))
            .collect()
    }

    /// Delay time in ms the engine is heading toward.
    pub fn target_time_ms(&self) -> f32 {
        self.time_ms_for(self.base.value(TempoDelayParam::Time.index()))
    }

    /// Current (gliding) delay in samples.
    pub fn delay_samples(&self) -> f32 {
        self.delay_samples.get()
    }

    /// Whether the delay currently follows host tempo.
    pub fn is_synced(&self) -> bool {
        self.base.step(TempoDelayParam::Sync.index()) == 1
            && self.transport.is_some_and(|t| t.has_valid_tempo())
    }

    /// Delay line capacity in samples.
    pub fn capacity(&self) -> usize {
        self.lines.first().map_or(0, DelayLine::capacity)
    }

    fn time_ms_for(&self, free_time: f32) -> f32 {
        let ms = match self.transport {
            Some(t) if self.is_synced() => {
                NoteDivision::from_normalized(self.base.value(TempoDelayParam::Division.index()))
                    .to_ms(t.bpm)
            }
            _ => exp_map(free_time, MIN_TIME_MS, MAX_TIME_MS),
        };
        ms.clamp(MIN_TIME_MS, MAX_TIME_MS)
    }
}

impl Default for TempoDelay {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for TempoDelay {
    fn id(&self) -> EngineId {
        Self::ID
    }

    fn name(&self) -> &'static str {
        "Tempo Delay"
    }

    fn prepare(&mut self, spec: &ProcessSpec) -> Result<(), EngineError> {
        self.base.prepare(spec)?;
        self.lines = Self::allocate(spec);
        self.delay_samples.set_sample_rate(self.base.sample_rate());

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "tempo_delay_prepare: {} lines of {} samples",
            self.lines.len(),
            self.capacity()
        );

        self.reset();
        Ok(())
    }

    fn reset(&mut self) {
        self.base.reset();
        for line in &mut self.lines {
            line.clear();
        }
        self.damping = [0.0; MAX_CHANNELS];
        let target = ms_to_samples(self.target_time_ms(), self.base.sample_rate());
        self.delay_samples.set_immediate(target);
    }

    fn num_parameters(&self) -> usize {
        self.base.num_parameters()
    }

    fn parameter_spec(&self, index: usize) -> Option<ParamSpec> {
        self.base.parameter_spec(index)
    }

    fn mix_index(&self) -> Option<usize> {
        Some(TempoDelayParam::Mix.index())
    }

    fn param_handle(&self) -> ParamHandle {
        self.base.handle()
    }

    fn set_transport(&mut self, info: &TransportInfo) {
        self.transport = Some(*info);
    }

    fn process(&mut self, buffer: &mut AudioBuffer<'_>) {
        self.base.pull();
        let channels = buffer.num_channels().min(self.lines.len());
        let fs = self.base.sample_rate();

        for frame in 0..buffer.num_frames() {
            let free_time = self.base.advance(TempoDelayParam::Time.index());
            let feedback = self.base.advance(TempoDelayParam::Feedback.index()) * MAX_FEEDBACK;
            let tone_hz = exp_map(
                self.base.advance(TempoDelayParam::Tone.index()),
                TONE_MIN_HZ,
                TONE_MAX_HZ,
            );
            let damping_coeff = 1.0 - expf(-TAU * tone_hz / fs);
            let mix = self.base.advance(TempoDelayParam::Mix.index());

            self.delay_samples
                .set_target(ms_to_samples(self.time_ms_for(free_time), fs));
            let delay = self.delay_samples.advance();

            for ch in 0..channels {
                let dry = self.base.guard.stage(buffer.get(ch, frame), OUTPUT_CEILING);
                let line = &mut self.lines[ch];
                let delayed = line.read(delay);
                let state = &mut self.damping[ch];
                *state = self
                    .base
                    .guard
                    .stage(*state + damping_coeff * (delayed - *state), OUTPUT_CEILING);
                let wet = *state;
                line.write(self.base.guard.stage(dry + wet * feedback, OUTPUT_CEILING));
                let out = self.base.guard.output(wet_dry_mix(dry, wet, mix));
                buffer.set(ch, frame, out);
            }
        }
    }

    fn numeric_faults(&self) -> u32 {
        self.base.guard.faults()
    }
}
