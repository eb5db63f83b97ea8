//! Zero-delay-feedback multi-mode filter with analog modeling.
//!
//! [`ZdfFilter`] runs one of three topologies per channel, chosen by the
//! Poles parameter:
//!
//! | Poles | Topology | Slope |
//! |-------|----------|-------|
//! | 1 | [`TptOnePole`] | 6 dB/oct |
//! | 2 | [`ZdfSvf`] (state variable) | 12 dB/oct |
//! | 4 | [`ZdfLadder`] | 24 dB/oct |
//!
//! Every topology solves its feedback inside the current sample and hands
//! back lowpass, highpass, bandpass and notch taps of one state. The Mode
//! parameter only moves the [`ModeWeights`] over those taps, so a mode
//! change never touches the state. A Poles change crossfades from the old
//! topology (still running) to the new one (starting from silence) over
//! [`TRANSITION_MS`].
//!
//! # Resonance
//!
//! Resonance maps onto feedback with an onset at [`SELF_OSC_ONSET`]:
//!
//! - ladder: `k = 4 (r / 0.9)^2` below the onset, rising linearly to
//!   [`K_LADDER_MAX`] at `r = 1`; `k = 4` is unity loop gain at cutoff
//! - state variable: damping `k = 2 (1 - r / 0.9)`, falling linearly to
//!   `-SVF_MAX_NEGATIVE_DAMPING` at `r = 1`; `k = 0` is the lossless limit
//!
//! Above the onset the filter sustains a tone near cutoff from noise alone.
//! The saturator inside each loop bounds it at any drive.
//!
//! # Signal Flow
//!
//! ```text
//! in ─► guard ─► drive ─► topology ─► mode weights ─► guard ─► mix ─► guard ─► out
//!  │                          ▲                                 ▲
//!  └─► envelope ─► cutoff ────┘                                 │
//!  └────────────────────────────── dry ─────────────────────────┘
//! ```

pub mod analog;
pub mod ladder;
pub mod mode;
pub mod one_pole;
pub mod svf;

pub use analog::AnalogModel;
pub use ladder::{K_LADDER_MAX, ZdfLadder};
pub use mode::{FilterMode, ModeWeights, PoleCount, TRANSITION_MS, Taps};
pub use one_pole::TptOnePole;
pub use svf::{SVF_MAX_NEGATIVE_DAMPING, ZdfSvf};

use core::f32::consts::PI;

use libm::{exp2f, logf, tanf};
use strata_core::{
    AudioBuffer, Engine, EngineBase, EngineError, EngineId, EnvelopeFollower, LinearSmoothedParam,
    MAX_CHANNELS, NumericGuard, OUTPUT_CEILING, ParamHandle, ParamSpec, ParamUnit, ProcessSpec,
    db_to_linear, exp_map, sanitize, wet_dry_mix,
};

/// Resonance at which the loop gain reaches unity.
pub const SELF_OSC_ONSET: f32 = 0.9;
/// Lowest cutoff.
pub const MIN_CUTOFF_HZ: f32 = 20.0;
/// Highest cutoff, as a fraction of the sample rate.
pub const NYQUIST_HEADROOM: f32 = 0.45;
/// Top of the Cutoff parameter range.
pub const MAX_CUTOFF_HZ: f32 = 20000.0;
/// Envelope sweep at full Env Depth.
pub const ENV_MAX_OCTAVES: f32 = 4.0;
/// Drive pre-gain at full Drive.
pub const MAX_DRIVE_DB: f32 = 24.0;
/// Saturator ceiling, `sat(x) = HEADROOM * tanh(x / HEADROOM)`.
pub const HEADROOM: f32 = 1.5;
/// Integrator states are clamped here.
pub const STATE_CEILING: f32 = 8.0;

/// Parameter indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum FilterParam {
    /// Cutoff, `20 * 1000^v` Hz.
    Cutoff,
    /// Resonance.
    Resonance,
    /// Drive, 0–24 dB pre-gain.
    Drive,
    /// LP / HP / BP / Notch.
    Mode,
    /// 1 / 2 / 4 poles.
    Poles,
    /// Envelope sweep, 0–4 octaves.
    EnvDepth,
    /// Envelope attack, `0.1 * 1000^v` ms.
    EnvAttack,
    /// Envelope release, `5 * 200^v` ms.
    EnvRelease,
    /// Component tolerance and thermal drift amount.
    Analog,
    /// Dry/wet.
    Mix,
}

impl FilterParam {
    /// Position in the parameter table.
    pub const fn index(self) -> usize {
        self as usize
    }
}

static PARAMS: [ParamSpec; 10] = [
    ParamSpec::continuous("Cutoff", "Cutoff", 0.5663, 20.0).with_unit(ParamUnit::Hertz),
    ParamSpec::continuous("Resonance", "Reso", 0.0, 10.0).with_unit(ParamUnit::Percent),
    ParamSpec::continuous("Drive", "Drive", 0.0, 10.0).with_unit(ParamUnit::Decibels),
    ParamSpec::stepped("Mode", "Mode", 0.0, 4),
    ParamSpec::stepped("Poles", "Poles", 1.0, 3),
    ParamSpec::continuous("Env Depth", "EnvDepth", 0.0, 10.0).with_unit(ParamUnit::Octaves),
    ParamSpec::continuous("Env Attack", "EnvAtk", 0.6667, 20.0).with_unit(ParamUnit::Milliseconds),
    ParamSpec::continuous("Env Release", "EnvRel", 0.5654, 20.0)
        .with_unit(ParamUnit::Milliseconds),
    ParamSpec::continuous("Analog", "Analog", 1.0, 20.0).with_unit(ParamUnit::Percent),
    ParamSpec::mix(),
];

/// Cutoff in Hz for a normalized value.
#[inline]
pub fn cutoff_hz(normalized: f32) -> f32 {
    exp_map(normalized, MIN_CUTOFF_HZ, MAX_CUTOFF_HZ)
}

/// Normalized Cutoff value for a frequency in Hz.
pub fn normalized_cutoff(hz: f32) -> f32 {
    (logf(hz / MIN_CUTOFF_HZ) / logf(MAX_CUTOFF_HZ / MIN_CUTOFF_HZ)).clamp(0.0, 1.0)
}

/// Ladder feedback for normalized resonance.
#[inline]
pub fn ladder_feedback(resonance: f32) -> f32 {
    let r = resonance.clamp(0.0, 1.0);
    if r < SELF_OSC_ONSET {
        let t = r / SELF_OSC_ONSET;
        4.0 * t * t
    } else {
        4.0 + (r - SELF_OSC_ONSET) / (1.0 - SELF_OSC_ONSET) * (K_LADDER_MAX - 4.0)
    }
}

/// State-variable damping for normalized resonance.
#[inline]
pub fn svf_damping(resonance: f32) -> f32 {
    let r = resonance.clamp(0.0, 1.0);
    if r < SELF_OSC_ONSET {
        2.0 * (1.0 - r / SELF_OSC_ONSET)
    } else {
        -(r - SELF_OSC_ONSET) / (1.0 - SELF_OSC_ONSET) * SVF_MAX_NEGATIVE_DAMPING
    }
}

/// Envelope attack in ms.
#[inline]
fn env_attack_ms(normalized: f32) -> f32 {
    exp_map(normalized, 0.1, 100.0)
}

/// Envelope release in ms.
#[inline]
fn env_release_ms(normalized: f32) -> f32 {
    exp_map(normalized, 5.0, 1000.0)
}

/// Zero a section whose state went non-finite; otherwise flush and clamp.
pub(crate) fn settle_states(states: &mut [f32], guard: &mut NumericGuard) {
    if states.iter().all(|&s| guard.check(s)) {
        for s in states {
            *s = guard.stage(*s, STATE_CEILING);
        }
    } else {
        states.fill(0.0);
    }
}

/// Per-sample coefficients shared by all channels.
#[derive(Debug, Clone, Copy)]
struct Coefficients {
    g: f32,
    big_g: f32,
    k_ladder: f32,
    k_svf: f32,
}

/// Section state for every topology and channel.
#[derive(Debug, Clone)]
struct Sections {
    one_pole: [TptOnePole; MAX_CHANNELS],
    svf: [ZdfSvf; MAX_CHANNELS],
    ladder: [ZdfLadder; MAX_CHANNELS],
}

impl Sections {
    fn new() -> Self {
        Self {
            one_pole: [TptOnePole::default(); MAX_CHANNELS],
            svf: [ZdfSvf::default(); MAX_CHANNELS],
            ladder: [ZdfLadder::default(); MAX_CHANNELS],
        }
    }

    #[inline]
    fn process(
        &mut self,
        poles: PoleCount,
        channel: usize,
        x: f32,
        c: &Coefficients,
        guard: &mut NumericGuard,
    ) -> Taps {
        match poles {
            PoleCount::One => self.one_pole[channel].process(x, c.big_g, guard),
            PoleCount::Two => self.svf[channel].process(x, c.g, c.k_svf, guard),
            PoleCount::Four => self.ladder[channel].process(x, c.big_g, c.k_ladder, guard),
        }
    }

    fn clear(&mut self, poles: PoleCount) {
        match poles {
            PoleCount::One => self.one_pole.iter_mut().for_each(TptOnePole::reset),
            PoleCount::Two => self.svf.iter_mut().for_each(ZdfSvf::reset),
            PoleCount::Four => self.ladder.iter_mut().for_each(ZdfLadder::reset),
        }
    }

    fn clear_all(&mut self) {
        self.clear(PoleCount::One);
        self.clear(PoleCount::Two);
        self.clear(PoleCount::Four);
    }
}

/// Self-oscillating multi-mode filter engine.
///
/// # Parameters
///
/// | # | Name | Range | Default |
/// |---|------|-------|---------|
/// | 0 | Cutoff | 20 Hz – 20 kHz (exponential) | ≈1 kHz |
/// | 1 | Resonance | 0–1, self-oscillates above 0.9 | 0 |
/// | 2 | Drive | 0–24 dB | 0 dB |
/// | 3 | Mode | LP / HP / BP / Notch | LP |
/// | 4 | Poles | 1 / 2 / 4 | 4 |
/// | 5 | Env Depth | 0–4 octaves | 0 |
/// | 6 | Env Attack | 0.1–100 ms | 10 ms |
/// | 7 | Env Release | 5–1000 ms | 100 ms |
/// | 8 | Analog | 0–100% | 100% |
/// | 9 | Mix | 0–100% | 100% |
///
/// # Example
///
/// ```rust
/// use strata_core::{AudioBuffer, Engine, ParamUpdate};
/// use strata_engines::filter::{FilterParam, ZdfFilter, normalized_cutoff};
///
/// let mut filter = ZdfFilter::new();
/// filter.update_parameters(
///     &ParamUpdate::new()
///         .with(FilterParam::Cutoff.index(), normalized_cutoff(800.0))
///         .with(FilterParam::Resonance.index(), 0.6),
/// );
///
/// let mut block = [0.25f32; 256];
/// filter.process(&mut AudioBuffer::interleaved(&mut block, 2));
/// assert!(block.iter().all(|x| x.is_finite()));
/// ```
#[derive(Debug)]
pub struct ZdfFilter {
    base: EngineBase,
    sections: Sections,
    weights: ModeWeights,
    poles: PoleCount,
    fading_from: Option<PoleCount>,
    fade: LinearSmoothedParam,
    envelope: EnvelopeFollower,
    analog: AnalogModel,
}

impl ZdfFilter {
    /// Engine identifier.
    pub const ID: EngineId = EngineId(1);

    /// Filter prepared for the default configuration, with its own
    /// component tolerances.
    pub fn new() -> Self {
        let analog = AnalogModel::new(ProcessSpec::default().sample_rate_f32());
        Self::with_analog(analog)
    }

    /// Filter whose component tolerances come from `seed`. Two filters with
    /// the same seed and the same inputs produce identical output.
    pub fn with_seed(seed: u32) -> Self {
        let analog = AnalogModel::with_seed(seed, ProcessSpec::default().sample_rate_f32());
        Self::with_analog(analog)
    }

    fn with_analog(analog: AnalogModel) -> Self {
        let base = EngineBase::new(&PARAMS);
        let fs = base.sample_rate();
        let mode = FilterMode::from_index(base.step(FilterParam::Mode.index()));
        let poles = PoleCount::from_index(base.step(FilterParam::Poles.index()));
        let envelope = EnvelopeFollower::with_times(
            fs,
            env_attack_ms(base.value(FilterParam::EnvAttack.index())),
            env_release_ms(base.value(FilterParam::EnvRelease.index())),
        );
        Self {
            base,
            sections: Sections::new(),
            weights: ModeWeights::new(mode, fs),
            poles,
            fading_from: None,
            fade: LinearSmoothedParam::with_config(1.0, fs, TRANSITION_MS),
            envelope,
            analog,
        }
    }

    /// Topology currently producing output (the crossfade target while
    /// fading).
    pub fn poles(&self) -> PoleCount {
        self.poles
    }

    /// Selected mode.
    pub fn mode(&self) -> FilterMode {
        self.weights.mode()
    }

    /// True during a topology crossfade.
    pub fn is_crossfading(&self) -> bool {
        self.fading_from.is_some()
    }

    /// Analog model state.
    pub fn analog(&self) -> &AnalogModel {
        &self.analog
    }

    fn apply_selectors(&mut self) {
        let mode = FilterMode::from_index(self.base.step(FilterParam::Mode.index()));
        self.weights.set_mode(mode);

        let poles = PoleCount::from_index(self.base.step(FilterParam::Poles.index()));
        if poles != self.poles && self.fading_from.is_none() {
            self.sections.clear(poles);
            self.fading_from = Some(self.poles);
            self.poles = poles;
            self.fade.set_immediate(0.0);
            self.fade.set_target(1.0);
        }
    }
}

impl Default for ZdfFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for ZdfFilter {
    fn id(&self) -> EngineId {
        Self::ID
    }

    fn name(&self) -> &'static str {
        "ZDF Filter"
    }

    fn prepare(&mut self, spec: &ProcessSpec) -> Result<(), EngineError> {
        self.base.prepare(spec)?;
        let fs = self.base.sample_rate();
        self.weights.set_sample_rate(fs);
        self.fade.set_sample_rate(fs);
        self.envelope.set_sample_rate(fs);
        self.analog.set_sample_rate(fs);
        self.reset();
        Ok(())
    }

    fn reset(&mut self) {
        self.base.reset();
        self.sections.clear_all();
        self.envelope.reset();
        self.envelope.set_times(
            env_attack_ms(self.base.value(FilterParam::EnvAttack.index())),
            env_release_ms(self.base.value(FilterParam::EnvRelease.index())),
        );
        self.analog.reset();
        self.weights
            .snap(FilterMode::from_index(self.base.step(FilterParam::Mode.index())));
        self.poles = PoleCount::from_index(self.base.step(FilterParam::Poles.index()));
        self.fading_from = None;
        self.fade.set_immediate(1.0);

        #[cfg(feature = "tracing")]
        {
            let (cutoff, resonance, drive) = self.analog.offsets();
            tracing::debug!(
                "zdf_filter_reset: {:?} {:?}, tolerances cutoff {cutoff:+.4} resonance {resonance:+.4} drive {drive:+.4}",
                self.poles,
                self.weights.mode()
            );
        }
    }

    fn num_parameters(&self) -> usize {
        self.base.num_parameters()
    }

    fn parameter_spec(&self, index: usize) -> Option<ParamSpec> {
        self.base.parameter_spec(index)
    }

    fn mix_index(&self) -> Option<usize> {
        Some(FilterParam::Mix.index())
    }

    fn param_handle(&self) -> ParamHandle {
        self.base.handle()
    }

    fn process(&mut self, buffer: &mut AudioBuffer<'_>) {
        self.base.pull();
        self.apply_selectors();

        let channels = buffer.num_channels().min(self.base.num_channels());
        if channels == 0 {
            return;
        }
        let frames = buffer.num_frames();
        let fs = self.base.sample_rate();
        let max_cutoff = fs * NYQUIST_HEADROOM;
        let inv_channels = 1.0 / channels as f32;

        for frame in 0..frames {
            let cutoff = self.base.advance(FilterParam::Cutoff.index());
            let resonance = self.base.advance(FilterParam::Resonance.index());
            let drive = self.base.advance(FilterParam::Drive.index());
            let depth = self.base.advance(FilterParam::EnvDepth.index());
            let attack = self.base.advance(FilterParam::EnvAttack.index());
            let release = self.base.advance(FilterParam::EnvRelease.index());
            let amount = self.base.advance(FilterParam::Analog.index());
            let mix = self.base.advance(FilterParam::Mix.index());

            self.envelope
                .set_times(env_attack_ms(attack), env_release_ms(release));
            let mut level = 0.0;
            for ch in 0..channels {
                level += sanitize(buffer.get(ch, frame)).0.abs().min(OUTPUT_CEILING);
            }
            let env = self.envelope.process(level * inv_channels).min(1.0);

            let fc = cutoff_hz(cutoff)
                * exp2f(depth * ENV_MAX_OCTAVES * env)
                * self.analog.cutoff_scale(amount);
            let fc = fc.clamp(MIN_CUTOFF_HZ, max_cutoff);
            let g = tanf(PI * fc / fs);
            let r = resonance * self.analog.resonance_scale(amount);
            let coeffs = Coefficients {
                g,
                big_g: g / (1.0 + g),
                k_ladder: ladder_feedback(r),
                k_svf: svf_damping(r),
            };
            let pre_gain = db_to_linear(drive * MAX_DRIVE_DB) * self.analog.drive_scale(amount);
            let weights = self.weights.advance();
            let fade = if self.fading_from.is_some() {
                self.fade.advance()
            } else {
                1.0
            };

            let mut energy = 0.0;
            for ch in 0..channels {
                let dry = self.base.guard.stage(buffer.get(ch, frame), OUTPUT_CEILING);
                let x = dry * pre_gain;

                let mut wet = self
                    .sections
                    .process(self.poles, ch, x, &coeffs, &mut self.base.guard)
                    .combine(&weights);
                if let Some(from) = self.fading_from {
                    let old = self
                        .sections
                        .process(from, ch, x, &coeffs, &mut self.base.guard)
                        .combine(&weights);
                    wet = old + (wet - old) * fade;
                }

                let wet = self.base.guard.stage(wet, OUTPUT_CEILING);
                energy += wet * wet;
                let out = self.base.guard.output(wet_dry_mix(dry, wet, mix));
                buffer.set(ch, frame, out);
            }

            self.analog.accumulate(energy * inv_channels);
            if self.fading_from.is_some() && self.fade.is_settled() {
                self.fading_from = None;
            }
        }
    }

    fn numeric_faults(&self) -> u32 {
        self.base.guard.faults()
    }
}
