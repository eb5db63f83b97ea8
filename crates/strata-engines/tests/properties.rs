//! Property-based tests for every registered engine.
//!
//! Random parameter sets and random input: output stays finite and under
//! the output ceiling, zero mix passes input through, reset leaves no
//! residue, and arbitrary parameter values never escape their range.

mod common;

use common::{interleave, process};
use proptest::prelude::*;
use strata_core::{Engine, OUTPUT_CEILING, ParamUpdate, ProcessSpec};
use strata_registry::EngineRegistry;

const SR: f64 = 48000.0;

fn engine_at(index: usize, channels: usize) -> Box<dyn Engine> {
    let registry = EngineRegistry::new();
    let descriptor = registry
        .descriptors()
        .nth(index % registry.len())
        .copied()
        .unwrap();
    let mut engine = registry.create(descriptor.id).unwrap();
    engine
        .prepare(&ProcessSpec::new(SR, 256, channels))
        .unwrap();
    engine
}

fn apply(engine: &dyn Engine, values: &[f32; 16]) {
    let update = (0..engine.num_parameters())
        .fold(ParamUpdate::new(), |u, i| u.with(i, values[i % 16]));
    engine.param_handle().update(&update);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Finite, bounded output for any settings and any input in [-1, 1].
    #[test]
    fn output_is_finite_and_bounded(
        input in prop::collection::vec(-1.0f32..=1.0f32, 64..2048),
        values in prop::array::uniform16(0.0f32..=1.0f32),
        engine_index in 0usize..3,
    ) {
        let mut engine = engine_at(engine_index, 1);
        apply(&*engine, &values);
        engine.reset();

        // loop the input so resonant settings get time to ring
        let looped: Vec<f32> = input.iter().copied().cycle().take(12000).collect();
        let out = process(&mut *engine, &looped, 1, 256);
        for (i, x) in out.iter().enumerate() {
            prop_assert!(x.is_finite(), "{}: {} at {}", engine.name(), x, i);
            prop_assert!(x.abs() <= OUTPUT_CEILING, "{}: {} at {}", engine.name(), x, i);
        }
    }

    /// Mix at zero is bypass whatever the other settings are.
    #[test]
    fn zero_mix_passes_input_through(
        left in prop::collection::vec(-1.0f32..=1.0f32, 512),
        right in prop::collection::vec(-1.0f32..=1.0f32, 512),
        values in prop::array::uniform16(0.0f32..=1.0f32),
        engine_index in 0usize..3,
    ) {
        let mut engine = engine_at(engine_index, 2);
        apply(&*engine, &values);
        let mix = engine.mix_index().unwrap();
        engine.param_handle().update(&ParamUpdate::new().with(mix, 0.0));
        engine.reset();

        let input = interleave(&[&left, &right]);
        let out = process(&mut *engine, &input, 2, 128);
        for (x, y) in input.iter().zip(&out) {
            prop_assert!((x - y).abs() <= 1e-4, "{}: {} -> {}", engine.name(), x, y);
        }
    }

    /// After reset, silence in gives exact silence out.
    #[test]
    fn reset_leaves_no_residue(
        input in prop::collection::vec(-1.0f32..=1.0f32, 256..4096),
        values in prop::array::uniform16(0.0f32..=1.0f32),
        engine_index in 0usize..3,
    ) {
        let mut engine = engine_at(engine_index, 1);
        apply(&*engine, &values);
        engine.reset();
        process(&mut *engine, &input, 1, 256);

        engine.reset();
        let out = process(&mut *engine, &vec![0.0; 2048], 1, 256);
        prop_assert!(out.iter().all(|&x| x == 0.0), "{}", engine.name());
    }

    /// Whatever is published, stored values are normalized and finite.
    #[test]
    fn stored_values_stay_normalized(
        raw in prop::array::uniform16(prop::num::f32::ANY),
        engine_index in 0usize..3,
    ) {
        let engine = engine_at(engine_index, 1);
        apply(&*engine, &raw);
        let handle = engine.param_handle();
        for i in 0..engine.num_parameters() {
            let value = handle.get(i).unwrap();
            prop_assert!((0.0..=1.0).contains(&value), "{}: param {} = {}", engine.name(), i, value);
        }
    }
}
