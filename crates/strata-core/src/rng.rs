//! Small deterministic PRNG owned by engines.
//!
//! Engines keep their own generator instead of reaching for a global one, so
//! a seeded instance replays bit-identically in tests.

use core::sync::atomic::{AtomicU32, Ordering};

/// Seeds handed to [`Xorshift32::next_instance`]; each call yields a new one.
static INSTANCE_SEED: AtomicU32 = AtomicU32::new(0x9E37_79B9);

/// Marsaglia xorshift32 generator.
#[derive(Debug, Clone)]
pub struct Xorshift32 {
    state: u32,
}

impl Xorshift32 {
    /// Generator from an explicit seed. A zero seed is remapped, since zero
    /// is the generator's only fixed point.
    pub const fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 0x1234_5678 } else { seed },
        }
    }

    /// Generator with a seed distinct from every earlier call in this
    /// process, so two instances of the same engine sound slightly different.
    pub fn next_instance() -> Self {
        let seed = INSTANCE_SEED.fetch_add(0x6D2B_79F5, Ordering::Relaxed);
        Self::new(seed ^ (seed >> 15))
    }

    /// Next raw 32-bit value.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.state = x;
        x
    }

    /// Uniform value in `[-1, 1]`.
    #[inline]
    pub fn next_bipolar(&mut self) -> f32 {
        (self.next_u32() as i32 as f32) / (i32::MAX as f32)
    }

    /// Uniform value in `[0, 1)`.
    #[inline]
    pub fn next_unipolar(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }
}
