//! Uniform sampling helpers over the single generation RNG stream.
//!
//! Every random draw in the crate goes through this module, so a given
//! `(config, seed)` pair replays the exact same sequence of decisions.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::Rng;

/// Uniform `f32` in `[min, max)` (or exactly `min` when the range is empty).
pub(super) fn ratio_between(rng: &mut ChaCha8Rng, min: f32, max: f32) -> f32 {
    debug_assert!(min <= max);
    min + (max - min) * unit_f32(rng)
}

/// Uniform `i32` in the inclusive range `[min, max]`.
pub(super) fn int_between(rng: &mut ChaCha8Rng, min: i32, max: i32) -> i32 {
    debug_assert!(min <= max);
    let span = (max as i64 - min as i64 + 1) as u64;
    min + (rng.next_u64() % span) as i32
}

/// Uniform index into a non-empty slice of length `len`.
pub(super) fn pick_index(rng: &mut ChaCha8Rng, len: usize) -> usize {
    debug_assert!(len > 0);
    (rng.next_u64() % len as u64) as usize
}

/// Uniform `f32` in `[0, 1)` built from the top 24 bits of one draw.
fn unit_f32(rng: &mut ChaCha8Rng) -> f32 {
    (rng.next_u32() >> 8) as f32 * (1.0 / (1 << 24) as f32)
}
