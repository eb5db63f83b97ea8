//! The engine contract.
//!
//! Every processor in the workspace implements [`Engine`]: a fixed, ordered
//! set of normalized parameters, a lifecycle (`prepare`, `reset`), and an
//! in-place `process` over an [`AudioBuffer`].
//!
//! ## Real-time rules
//!
//! `process` and `reset` never allocate, lock, block or panic. `prepare` is
//! the only place an engine may allocate. Parameter changes arrive through
//! a [`ParamHandle`] from any thread; engines pull them at block start and
//! smooth toward them per sample.
//!
//! ## Mix
//!
//! Each engine designates one parameter as its dry/wet mix
//! ([`Engine::mix_index`]). Output is `dry * (1 - mix) + wet * mix`, taken
//! after wet processing, so mix = 0 reproduces the input.

use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::buffer::AudioBuffer;
use crate::error::EngineError;
use crate::guard::NumericGuard;
use crate::param::ParamSmoother;
use crate::param_spec::ParamSpec;
use crate::store::{ParamHandle, ParamStore, ParamUpdate};
use crate::tempo::TransportInfo;

/// Most channels an engine can be prepared for.
pub const MAX_CHANNELS: usize = 8;

/// Stable numeric engine identifier, used by the factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineId(pub u32);

impl core::fmt::Display for EngineId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "engine#{}", self.0)
    }
}

/// Processing configuration handed to [`Engine::prepare`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcessSpec {
    /// Sample rate in Hz.
    pub sample_rate: f64,
    /// Largest block the host will pass to `process`.
    pub max_block_size: usize,
    /// Channels the engine processes; further buffer channels pass through.
    pub num_channels: usize,
}

impl ProcessSpec {
    /// Configuration with the given values, unvalidated.
    pub const fn new(sample_rate: f64, max_block_size: usize, num_channels: usize) -> Self {
        Self {
            sample_rate,
            max_block_size,
            num_channels,
        }
    }

    /// Reject configurations no engine can run with.
    ///
    /// ```rust
    /// use strata_core::{EngineError, ProcessSpec};
    ///
    /// assert!(ProcessSpec::default().validate().is_ok());
    /// assert_eq!(
    ///     ProcessSpec::new(0.0, 512, 2).validate(),
    ///     Err(EngineError::InvalidSampleRate(0.0))
    /// );
    /// ```
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(EngineError::InvalidSampleRate(self.sample_rate));
        }
        if self.max_block_size == 0 {
            return Err(EngineError::InvalidBlockSize(self.max_block_size));
        }
        if self.num_channels == 0 || self.num_channels > MAX_CHANNELS {
            return Err(EngineError::InvalidChannelCount(self.num_channels));
        }
        Ok(())
    }

    /// Sample rate as `f32` for DSP code.
    #[inline]
    pub fn sample_rate_f32(&self) -> f32 {
        self.sample_rate as f32
    }
}

impl Default for ProcessSpec {
    /// 48 kHz, 512-frame blocks, stereo.
    fn default() -> Self {
        Self::new(48000.0, 512, 2)
    }
}

/// A real-time audio processor.
///
/// Object safe; hosts hold engines as `Box<dyn Engine>`.
///
/// ```rust,ignore
/// let mut engine = strata_registry::create_engine(1).unwrap();
/// engine.prepare(&ProcessSpec::new(44100.0, 256, 2))?;
/// let handle = engine.param_handle();           // move to the UI thread
/// handle.update(&ParamUpdate::new().with(0, 0.7));
/// engine.process(&mut AudioBuffer::interleaved(&mut block, 2));
/// ```
pub trait Engine: Send {
    /// Identifier, fixed at construction.
    fn id(&self) -> EngineId;

    /// Display name.
    fn name(&self) -> &'static str;

    /// Configure for a sample rate, block size and channel count.
    ///
    /// Recomputes every sample-rate-dependent value and clears state. On
    /// error the previous configuration stays in effect.
    fn prepare(&mut self, spec: &ProcessSpec) -> Result<(), EngineError>;

    /// Clear all processing state without allocating.
    fn reset(&mut self);

    /// Number of parameters. Never changes.
    fn num_parameters(&self) -> usize;

    /// Description of parameter `index`.
    fn parameter_spec(&self, index: usize) -> Option<ParamSpec>;

    /// Name of parameter `index`.
    fn parameter_name(&self, index: usize) -> Option<&'static str> {
        self.parameter_spec(index).map(|spec| spec.name)
    }

    /// Index of the dry/wet mix parameter.
    fn mix_index(&self) -> Option<usize>;

    /// Thread-safe handle for publishing parameter changes.
    fn param_handle(&self) -> ParamHandle;

    /// Merge `values` into the parameter targets.
    ///
    /// Absent indices keep their targets; indices past
    /// [`num_parameters`](Self::num_parameters) are ignored.
    fn update_parameters(&self, values: &ParamUpdate) {
        self.param_handle().update(values);
    }

    /// Host transport, pushed before `process`. Ignored unless overridden.
    fn set_transport(&mut self, _info: &TransportInfo) {}

    /// Process one block in place.
    fn process(&mut self, buffer: &mut AudioBuffer<'_>);

    /// Non-finite values recovered so far.
    fn numeric_faults(&self) -> u32 {
        0
    }
}

/// Shared bookkeeping for engines: configuration, parameter store, one
/// smoother per parameter, and the numeric guard.
///
/// Engines embed one of these and forward the parameter half of the
/// [`Engine`] contract to it.
#[derive(Debug)]
pub struct EngineBase {
    spec: ProcessSpec,
    store: Arc<ParamStore>,
    targets: Vec<f32>,
    smoothers: Vec<ParamSmoother>,
    seen_version: u32,
    /// Guard applied to stage values and outputs.
    pub guard: NumericGuard,
}

impl EngineBase {
    /// Bookkeeping for `specs`, prepared for [`ProcessSpec::default`].
    pub fn new(specs: &'static [ParamSpec]) -> Self {
        let spec = ProcessSpec::default();
        let store = ParamStore::new(specs);
        let mut targets = alloc::vec![0.0; specs.len()];
        let seen_version = store.snapshot_into(&mut targets);
        let smoothers = specs
            .iter()
            .zip(&targets)
            .map(|(p, &t)| ParamSmoother::new(p.smoothing, t, spec.sample_rate_f32(), p.smoothing_ms))
            .collect();
        Self {
            spec,
            store,
            targets,
            smoothers,
            seen_version,
            guard: NumericGuard::new(),
        }
    }

    /// Active configuration.
    pub fn spec(&self) -> &ProcessSpec {
        &self.spec
    }

    /// Sample rate as `f32`.
    #[inline]
    pub fn sample_rate(&self) -> f32 {
        self.spec.sample_rate_f32()
    }

    /// Channels processed.
    #[inline]
    pub fn num_channels(&self) -> usize {
        self.spec.num_channels
    }

    /// Validate and adopt `spec`, then snap every smoother to its target.
    pub fn prepare(&mut self, spec: &ProcessSpec) -> Result<(), EngineError> {
        if let Err(err) = spec.validate() {
            #[cfg(feature = "tracing")]
            tracing::warn!("engine_prepare: rejected {spec:?}: {err}");
            return Err(err);
        }
        self.spec = *spec;
        let fs = spec.sample_rate_f32();
        for smoother in &mut self.smoothers {
            smoother.set_sample_rate(fs);
        }
        self.pull();
        self.snap();
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "engine_prepare: {} Hz, {} frames, {} channels",
            spec.sample_rate,
            spec.max_block_size,
            spec.num_channels
        );
        Ok(())
    }

    /// Pull pending targets and jump every smoother onto them.
    pub fn reset(&mut self) {
        self.pull();
        self.snap();
        #[cfg(feature = "tracing")]
        {
            if self.guard.faults() > 0 {
                tracing::warn!("engine_reset: {} numeric faults recovered", self.guard.faults());
            } else {
                tracing::debug!("engine_reset");
            }
        }
    }

    /// Read published targets if anything changed. Call at block start.
    ///
    /// Returns `true` when new targets arrived.
    pub fn pull(&mut self) -> bool {
        if !self.store.changed_since(self.seen_version) {
            return false;
        }
        self.seen_version = self.store.snapshot_into(&mut self.targets);
        for (smoother, &target) in self.smoothers.iter_mut().zip(&self.targets) {
            smoother.set_target(target);
        }
        true
    }

    fn snap(&mut self) {
        for smoother in &mut self.smoothers {
            smoother.snap_to_target();
        }
    }

    /// Advance parameter `index` by one sample and return its value.
    #[inline]
    pub fn advance(&mut self, index: usize) -> f32 {
        self.smoothers[index].advance()
    }

    /// Current smoothed value of `index`.
    #[inline]
    pub fn value(&self, index: usize) -> f32 {
        self.smoothers[index].get()
    }

    /// Latest pulled target of `index`.
    #[inline]
    pub fn target(&self, index: usize) -> f32 {
        self.targets[index]
    }

    /// Band of a stepped parameter's latest target.
    #[inline]
    pub fn step(&self, index: usize) -> usize {
        self.store.specs()[index].step_index(self.targets[index])
    }

    /// Parameter table.
    pub fn specs(&self) -> &'static [ParamSpec] {
        self.store.specs()
    }

    /// Description of `index`.
    pub fn parameter_spec(&self, index: usize) -> Option<ParamSpec> {
        self.store.specs().get(index).copied()
    }

    /// Number of parameters.
    pub fn num_parameters(&self) -> usize {
        self.store.len()
    }

    /// New handle onto the parameter store.
    pub fn handle(&self) -> ParamHandle {
        self.store.handle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::Smoothing;

    static SPECS: [ParamSpec; 3] = [
        ParamSpec::continuous("Level", "Level", 0.5, 10.0),
        ParamSpec::stepped("Shape", "Shape", 0.0, 4),
        ParamSpec::mix(),
    ];

    #[test]
    fn validate_rejects_bad_configs() {
        assert!(ProcessSpec::new(f64::NAN, 64, 1).validate().is_err());
        assert!(ProcessSpec::new(-44100.0, 64, 1).validate().is_err());
        assert!(ProcessSpec::new(f64::INFINITY, 64, 1).validate().is_err());
        assert_eq!(
            ProcessSpec::new(44100.0, 0, 1).validate(),
            Err(EngineError::InvalidBlockSize(0))
        );
        assert_eq!(
            ProcessSpec::new(44100.0, 64, 0).validate(),
            Err(EngineError::InvalidChannelCount(0))
        );
        assert_eq!(
            ProcessSpec::new(44100.0, 64, MAX_CHANNELS + 1).validate(),
            Err(EngineError::InvalidChannelCount(MAX_CHANNELS + 1))
        );
        assert!(ProcessSpec::new(8000.0, 1, MAX_CHANNELS).validate().is_ok());
    }

    #[test]
    fn base_starts_at_defaults() {
        let base = EngineBase::new(&SPECS);
        assert_eq!(base.value(0), 0.5);
        assert_eq!(base.value(2), 1.0);
        assert_eq!(base.sample_rate(), 48000.0);
        assert_eq!(base.specs()[0].smoothing, Smoothing::Exponential);
    }

    #[test]
    fn pull_only_when_published() {
        let mut base = EngineBase::new(&SPECS);
        assert!(!base.pull());
        base.handle().set(0, 1.0);
        assert!(base.pull());
        assert!(!base.pull());
        assert_eq!(base.target(0), 1.0);
        let first = base.advance(0);
        assert!(first > 0.5 && first < 1.0);
    }

    #[test]
    fn failed_prepare_keeps_previous_config() {
        let mut base = EngineBase::new(&SPECS);
        base.prepare(&ProcessSpec::new(96000.0, 128, 1)).unwrap();
        assert!(base.prepare(&ProcessSpec::new(0.0, 128, 1)).is_err());
        assert_eq!(base.sample_rate(), 96000.0);
        assert_eq!(base.num_channels(), 1);
    }

    #[test]
    fn reset_snaps_smoothers() {
        let mut base = EngineBase::new(&SPECS);
        base.handle().set(0, 0.0);
        base.reset();
        assert_eq!(base.value(0), 0.0);
    }

    #[test]
    fn stepped_parameters_follow_bands() {
        let mut base = EngineBase::new(&SPECS);
        base.handle().set(1, 0.8);
        base.pull();
        assert_eq!(base.step(1), 3);
        assert_eq!(base.advance(1), 0.8);
    }

    #[test]
    fn engine_id_display() {
        use alloc::string::ToString;
        assert_eq!(EngineId(3).to_string(), "engine#3");
    }
}
