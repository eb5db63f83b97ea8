//! Frequency-domain and behavioral tests for the ZDF filter.

mod common;

use common::{noise, peak, process, process_mono, rms, sine, to_db, zero_crossing_hz};
use strata_core::{AudioBuffer, Engine, ParamUpdate, ProcessSpec};
use strata_engines::filter::{FilterParam, PoleCount, normalized_cutoff};
use strata_engines::{FilterMode, ZdfFilter};

const SR: f32 = 48000.0;

fn poles_value(poles: PoleCount) -> f32 {
    match poles {
        PoleCount::One => 0.1,
        PoleCount::Two => 0.5,
        PoleCount::Four => 0.9,
    }
}

fn mode_value(mode: FilterMode) -> f32 {
    match mode {
        FilterMode::Lowpass => 0.1,
        FilterMode::Highpass => 0.3,
        FilterMode::Bandpass => 0.6,
        FilterMode::Notch => 0.9,
    }
}

/// Filter with ideal components, no envelope, fully wet.
fn ideal_filter(sample_rate: f32, cutoff_hz: f32, resonance: f32, poles: PoleCount) -> ZdfFilter {
    let mut filter = ZdfFilter::with_seed(1);
    filter
        .prepare(&ProcessSpec::new(sample_rate as f64, 512, 1))
        .unwrap();
    filter.update_parameters(
        &ParamUpdate::new()
            .with(FilterParam::Cutoff.index(), normalized_cutoff(cutoff_hz))
            .with(FilterParam::Resonance.index(), resonance)
            .with(FilterParam::Drive.index(), 0.0)
            .with(FilterParam::Poles.index(), poles_value(poles))
            .with(FilterParam::Analog.index(), 0.0)
            .with(FilterParam::EnvDepth.index(), 0.0),
    );
    filter.reset();
    filter
}

/// Steady-state gain of a sine at `freq`.
fn gain_at(filter: &mut ZdfFilter, freq: f32, sample_rate: f32) -> f32 {
    let amplitude = 0.05;
    let len = sample_rate as usize;
    let out = process_mono(filter, &sine(freq, amplitude, len, sample_rate));
    peak(&out[len / 2..]) / amplitude
}

#[test]
fn rolloff_tracks_pole_count() {
    for (poles, expected_db) in [
        (PoleCount::One, 6.0),
        (PoleCount::Two, 12.0),
        (PoleCount::Four, 24.0),
    ] {
        let mut filter = ideal_filter(SR, 1000.0, 0.0, poles);
        let one_octave = gain_at(&mut filter, 2000.0, SR);
        filter.reset();
        let two_octaves = gain_at(&mut filter, 4000.0, SR);
        let slope = to_db(one_octave) - to_db(two_octaves);
        assert!(
            (slope - expected_db).abs() <= 6.0,
            "{poles:?}: {slope:.2} dB/oct, expected about {expected_db}"
        );
    }
}

#[test]
fn steeper_filters_reject_more() {
    let mut previous = f32::INFINITY;
    for poles in [PoleCount::One, PoleCount::Two, PoleCount::Four] {
        let mut filter = ideal_filter(SR, 1000.0, 0.0, poles);
        let gain = gain_at(&mut filter, 8000.0, SR);
        assert!(gain < previous, "{poles:?}: {gain}");
        previous = gain;
    }
}

#[test]
fn lowpass_scenario_at_44k() {
    let fs = 44100.0;
    let mut filter = ZdfFilter::new();
    filter.prepare(&ProcessSpec::new(44100.0, 512, 1)).unwrap();
    filter.update_parameters(
        &ParamUpdate::new()
            .with(FilterParam::Cutoff.index(), normalized_cutoff(1000.0))
            .with(FilterParam::Resonance.index(), 0.5)
            .with(FilterParam::Mode.index(), mode_value(FilterMode::Lowpass))
            .with(FilterParam::Drive.index(), 0.0)
            .with(FilterParam::Mix.index(), 1.0),
    );
    filter.reset();
    let low = gain_at(&mut filter, 100.0, fs);
    filter.reset();
    let high = gain_at(&mut filter, 10000.0, fs);
    let difference = to_db(low) - to_db(high);
    assert!(difference >= 12.0, "only {difference:.1} dB apart");
}

#[test]
fn highpass_and_bandpass_shapes() {
    for poles in [PoleCount::Two, PoleCount::Four] {
        let mut filter = ideal_filter(SR, 1000.0, 0.3, poles);
        filter.update_parameters(
            &ParamUpdate::new().with(FilterParam::Mode.index(), mode_value(FilterMode::Highpass)),
        );
        filter.reset();
        let low = gain_at(&mut filter, 100.0, SR);
        filter.reset();
        let high = gain_at(&mut filter, 10000.0, SR);
        assert!(to_db(high) - to_db(low) > 20.0, "{poles:?} highpass");

        filter.update_parameters(
            &ParamUpdate::new().with(FilterParam::Mode.index(), mode_value(FilterMode::Bandpass)),
        );
        filter.reset();
        let centre = gain_at(&mut filter, 1000.0, SR);
        filter.reset();
        let below = gain_at(&mut filter, 100.0, SR);
        filter.reset();
        let above = gain_at(&mut filter, 10000.0, SR);
        assert!(centre > below * 4.0 && centre > above * 4.0, "{poles:?} bandpass");
    }
}

#[test]
fn notch_rejects_cutoff() {
    for poles in [PoleCount::Two, PoleCount::Four] {
        let mut filter = ideal_filter(SR, 1000.0, 0.0, poles);
        filter.update_parameters(
            &ParamUpdate::new().with(FilterParam::Mode.index(), mode_value(FilterMode::Notch)),
        );
        filter.reset();
        let centre = gain_at(&mut filter, 1000.0, SR);
        filter.reset();
        let far = gain_at(&mut filter, 50.0, SR);
        assert!(to_db(far) - to_db(centre) > 20.0, "{poles:?}: {centre} vs {far}");
    }
}

fn settled_rms(poles: PoleCount, mode: FilterMode, resonance: f32, seconds: f32) -> Vec<f32> {
    let mut filter = ZdfFilter::with_seed(3);
    filter.prepare(&ProcessSpec::new(SR as f64, 512, 1)).unwrap();
    filter.update_parameters(
        &ParamUpdate::new()
            .with(FilterParam::Cutoff.index(), normalized_cutoff(1000.0))
            .with(FilterParam::Resonance.index(), resonance)
            .with(FilterParam::Poles.index(), poles_value(poles))
            .with(FilterParam::Mode.index(), mode_value(mode)),
    );
    filter.reset();
    let input = noise(1e-6, (SR * seconds) as usize, 77);
    process_mono(&mut filter, &input)
}

#[test]
fn self_oscillation_onset() {
    for poles in [PoleCount::Two, PoleCount::Four] {
        for resonance in [0.0, 0.5, 0.8, 0.85] {
            let out = settled_rms(poles, FilterMode::Lowpass, resonance, 1.0);
            let level = rms(&out[24000..]);
            assert!(level < 1e-3, "{poles:?} r={resonance}: rms {level}");
        }
        for resonance in [0.95, 1.0] {
            let out = settled_rms(poles, FilterMode::Lowpass, resonance, 1.0);
            let level = rms(&out[24000..]);
            assert!(level > 0.01, "{poles:?} r={resonance}: rms {level}");
        }
    }
}

#[test]
fn resonance_sweep_engages_near_onset() {
    let mut filter = ZdfFilter::with_seed(4);
    filter.prepare(&ProcessSpec::new(SR as f64, 480, 1)).unwrap();
    filter.update_parameters(
        &ParamUpdate::new().with(FilterParam::Cutoff.index(), normalized_cutoff(1000.0)),
    );
    filter.reset();

    // 0 -> 1 over 4 s, one step per 10 ms block
    let blocks = 400;
    let input = noise(1e-6, 480 * blocks, 12);
    let mut levels = Vec::with_capacity(blocks);
    for (i, block) in input.chunks(480).enumerate() {
        let resonance = i as f32 / (blocks - 1) as f32;
        filter.update_parameters(
            &ParamUpdate::new().with(FilterParam::Resonance.index(), resonance),
        );
        let mut data = block.to_vec();
        filter.process(&mut AudioBuffer::interleaved(&mut data, 1));
        levels.push((resonance, rms(&data)));
    }

    for &(resonance, level) in &levels {
        if resonance < 0.85 {
            assert!(level < 1e-3, "r={resonance}: rms {level}");
        }
    }
    let tail = &levels[blocks - 10..];
    assert!(tail.iter().all(|&(_, level)| level > 0.01), "{tail:?}");
}

#[test]
fn oscillation_frequency_near_cutoff() {
    for poles in [PoleCount::Two, PoleCount::Four] {
        for cutoff in [500.0, 1000.0, 2000.0] {
            let mut filter = ideal_filter(SR, cutoff, 0.95, poles);
            let out = process_mono(&mut filter, &noise(1e-6, SR as usize * 2, 5));
            let hz = zero_crossing_hz(&out[SR as usize..], SR);
            assert!(
                (hz - cutoff).abs() / cutoff < 0.2,
                "{poles:?}: oscillates at {hz} Hz for {cutoff} Hz cutoff"
            );
        }
    }
}

#[test]
fn bandpass_self_oscillates_from_noise_floor() {
    let out = settled_rms(PoleCount::Four, FilterMode::Bandpass, 0.95, 1.0);
    let level = rms(&out[24000..]);
    assert!(level > 0.01, "rms {level}");
}

#[test]
fn drive_does_not_unbound_oscillation() {
    let mut filter = ideal_filter(SR, 300.0, 1.0, PoleCount::Four);
    filter.update_parameters(&ParamUpdate::new().with(FilterParam::Drive.index(), 1.0));
    filter.reset();
    let out = process_mono(&mut filter, &sine(60.0, 1.0, SR as usize * 2, SR));
    assert!(out.iter().all(|x| x.is_finite()));
    assert!(peak(&out) < 4.0, "{}", peak(&out));
}

fn driven(poles: PoleCount, mode: FilterMode, drive: f32, freq: f32, amplitude: f32) -> Vec<f32> {
    let mut filter = ideal_filter(SR, 1000.0, 0.0, poles);
    filter.update_parameters(
        &ParamUpdate::new()
            .with(FilterParam::Drive.index(), drive)
            .with(FilterParam::Mode.index(), mode_value(mode)),
    );
    filter.reset();
    let out = process_mono(&mut filter, &sine(freq, amplitude, SR as usize, SR));
    out[SR as usize / 2..].to_vec()
}

#[test]
fn full_drive_stays_bounded_in_every_topology() {
    for poles in [PoleCount::One, PoleCount::Two, PoleCount::Four] {
        for (mode, freq) in [
            (FilterMode::Lowpass, 100.0),
            (FilterMode::Highpass, 5000.0),
            (FilterMode::Bandpass, 1000.0),
            (FilterMode::Notch, 100.0),
        ] {
            let out = driven(poles, mode, 1.0, freq, 1.0);
            let level = peak(&out);
            assert!(level < 4.0, "{poles:?} {mode:?} at {freq} Hz: peak {level}");
        }
    }
}

#[test]
fn drive_compresses_crest_factor() {
    for poles in [PoleCount::One, PoleCount::Two, PoleCount::Four] {
        let crest = |drive: f32| {
            let out = driven(poles, FilterMode::Lowpass, drive, 100.0, 0.25);
            peak(&out) / rms(&out)
        };
        let clean = crest(0.0);
        let hot = crest(1.0);
        assert!((clean - core::f32::consts::SQRT_2).abs() < 0.05, "{poles:?}: clean {clean}");
        assert!(hot < clean * 0.95, "{poles:?}: crest {clean} -> {hot}");
    }
}

#[test]
fn mode_switch_is_continuous() {
    let modes = [
        FilterMode::Lowpass,
        FilterMode::Highpass,
        FilterMode::Bandpass,
        FilterMode::Notch,
    ];
    for poles in [PoleCount::One, PoleCount::Two, PoleCount::Four] {
        for &from in &modes {
            for &to in &modes {
                let mut filter = ideal_filter(SR, 1000.0, 0.5, poles);
                filter.update_parameters(
                    &ParamUpdate::new().with(FilterParam::Mode.index(), mode_value(from)),
                );
                filter.reset();

                let input = sine(100.0, 0.5, 9600, SR);
                let mut out = process_mono(&mut filter, &input[..4800]);
                filter.update_parameters(
                    &ParamUpdate::new().with(FilterParam::Mode.index(), mode_value(to)),
                );
                out.extend(process_mono(&mut filter, &input[4800..]));
                assert_eq!(filter.mode(), to);

                let jump = out[4700..5400]
                    .windows(2)
                    .map(|w| (w[1] - w[0]).abs())
                    .fold(0.0f32, f32::max);
                assert!(jump < 0.1, "{poles:?} {from:?} -> {to:?}: jump {jump}");
            }
        }
    }
}

#[test]
fn seeded_filters_are_bit_identical() {
    let run = || {
        let mut filter = ZdfFilter::with_seed(1234);
        filter.prepare(&ProcessSpec::new(SR as f64, 256, 2)).unwrap();
        let input = noise(0.4, 256 * 2, 8);
        let mut out = Vec::new();
        for block in 0..40 {
            if block % 7 == 0 {
                filter.update_parameters(
                    &ParamUpdate::new()
                        .with(FilterParam::Cutoff.index(), (block as f32 * 0.037) % 1.0)
                        .with(FilterParam::Resonance.index(), (block as f32 * 0.11) % 1.0)
                        .with(FilterParam::EnvDepth.index(), 0.5),
                );
            }
            out.extend(process(&mut filter, &input, 2, 256));
        }
        out
    };
    let a = run();
    let b = run();
    assert!(a.iter().zip(&b).all(|(x, y)| x.to_bits() == y.to_bits()));
}

#[test]
fn envelope_opens_cutoff() {
    let level_with_depth = |depth: f32| {
        let mut filter = ideal_filter(SR, 200.0, 0.0, PoleCount::Four);
        filter.update_parameters(&ParamUpdate::new().with(FilterParam::EnvDepth.index(), depth));
        filter.reset();
        let out = process_mono(&mut filter, &sine(2000.0, 0.8, SR as usize, SR));
        rms(&out[24000..])
    };
    assert!(level_with_depth(1.0) > level_with_depth(0.0) * 10.0);
}

#[test]
fn analog_tolerance_differs_per_instance() {
    let run = |seed: u32| {
        let mut filter = ZdfFilter::with_seed(seed);
        filter.prepare(&ProcessSpec::new(SR as f64, 512, 1)).unwrap();
        process_mono(&mut filter, &noise(0.3, 4096, 9))
    };
    assert_ne!(run(1), run(2));
    assert_eq!(run(5), run(5));
}
