//! Signal generators and processing helpers shared by the integration tests.

#![allow(dead_code)]

use core::f32::consts::TAU;

use strata_core::{AudioBuffer, Engine, ParamUpdate, Xorshift32};

/// Test input families.
#[derive(Debug, Clone, Copy)]
pub enum Signal {
    Silence,
    Impulse,
    Sweep,
    Noise,
    DcStep,
}

impl Signal {
    pub const ALL: [Signal; 5] = [
        Signal::Silence,
        Signal::Impulse,
        Signal::Sweep,
        Signal::Noise,
        Signal::DcStep,
    ];

    pub fn generate(self, len: usize, sample_rate: f32) -> Vec<f32> {
        match self {
            Signal::Silence => vec![0.0; len],
            Signal::Impulse => {
                let mut x = vec![0.0; len];
                if let Some(first) = x.first_mut() {
                    *first = 1.0;
                }
                x
            }
            Signal::Sweep => sweep(20.0, 20000.0, 0.5, len, sample_rate),
            Signal::Noise => noise(0.5, len, 0x5EED),
            Signal::DcStep => (0..len)
                .map(|i| if i < len / 4 { 0.0 } else { 0.8 })
                .collect(),
        }
    }
}

pub fn sine(freq: f32, amplitude: f32, len: usize, sample_rate: f32) -> Vec<f32> {
    (0..len)
        .map(|i| amplitude * libm::sinf(TAU * freq * i as f32 / sample_rate))
        .collect()
}

/// Exponential sine sweep.
pub fn sweep(from: f32, to: f32, amplitude: f32, len: usize, sample_rate: f32) -> Vec<f32> {
    let mut phase = 0.0f32;
    (0..len)
        .map(|i| {
            let t = i as f32 / len as f32;
            let freq = from * libm::powf(to / from, t);
            phase = (phase + freq / sample_rate).fract();
            amplitude * libm::sinf(TAU * phase)
        })
        .collect()
}

pub fn noise(amplitude: f32, len: usize, seed: u32) -> Vec<f32> {
    let mut rng = Xorshift32::new(seed);
    (0..len).map(|_| amplitude * rng.next_bipolar()).collect()
}

/// Interleave one signal per channel.
pub fn interleave(channels: &[&[f32]]) -> Vec<f32> {
    let frames = channels.iter().map(|c| c.len()).min().unwrap_or(0);
    let mut out = Vec::with_capacity(frames * channels.len());
    for frame in 0..frames {
        for channel in channels {
            out.push(channel[frame]);
        }
    }
    out
}

/// Run `input` through `engine` as an interleaved buffer, in blocks.
pub fn process(engine: &mut dyn Engine, input: &[f32], channels: usize, block: usize) -> Vec<f32> {
    let mut data = input.to_vec();
    for chunk in data.chunks_mut(block * channels) {
        engine.process(&mut AudioBuffer::interleaved(chunk, channels));
    }
    data
}

pub fn process_mono(engine: &mut dyn Engine, input: &[f32]) -> Vec<f32> {
    process(engine, input, 1, 512)
}

/// Set every parameter to `value`.
pub fn set_all(engine: &dyn Engine, value: f32) {
    let mut update = ParamUpdate::new();
    for i in 0..engine.num_parameters() {
        update.set(i, value);
    }
    engine.update_parameters(&update);
}

/// Set every parameter from `values`, cycling.
pub fn set_from(engine: &dyn Engine, values: &[f32]) {
    let mut update = ParamUpdate::new();
    for i in 0..engine.num_parameters() {
        update.set(i, values[i % values.len()]);
    }
    engine.update_parameters(&update);
}

pub fn rms(x: &[f32]) -> f32 {
    if x.is_empty() {
        return 0.0;
    }
    libm::sqrtf(x.iter().map(|v| v * v).sum::<f32>() / x.len() as f32)
}

pub fn peak(x: &[f32]) -> f32 {
    x.iter().fold(0.0f32, |m, v| m.max(v.abs()))
}

pub fn to_db(x: f32) -> f32 {
    20.0 * libm::log10f(x.max(1e-12))
}

/// Frequency estimate from upward zero crossings.
pub fn zero_crossing_hz(x: &[f32], sample_rate: f32) -> f32 {
    let crossings = x.windows(2).filter(|w| w[0] <= 0.0 && w[1] > 0.0).count();
    crossings as f32 * sample_rate / x.len() as f32
}
