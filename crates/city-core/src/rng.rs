//! Deterministic per-tick RNG derivation.
//!
//! Every subsystem receives a fresh `SmallRng` derived purely from
//! `(base_seed, tick, subsystem_index)`. No generator survives across
//! ticks, so reproduction never depends on how much randomness was drawn
//! elsewhere earlier in the run.

use rand::rngs::SmallRng;
use rand::SeedableRng;

/// splitmix64 finalizer; cheap and well-distributed for seed mixing.
fn splitmix64(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Pure seed derivation for one subsystem's stream in one tick.
pub fn subsystem_seed(base_seed: u64, tick: u64, subsystem_index: u64) -> u64 {
    splitmix64(base_seed ^ splitmix64(tick ^ splitmix64(subsystem_index)))
}

/// The RNG handle a subsystem receives for one tick.
pub fn subsystem_rng(base_seed: u64, tick: u64, subsystem_index: u64) -> SmallRng {
    SmallRng::seed_from_u64(subsystem_seed(base_seed, tick, subsystem_index))
}

/// Deterministic weighted index selection. Returns 0 when all weights are
/// non-positive.
pub fn weighted_select(rng: &mut SmallRng, weights: &[f32]) -> usize {
    use rand::Rng;

    let total: f32 = weights.iter().filter(|w| **w > 0.0).sum();
    if total <= 0.0 {
        return 0;
    }
    let roll: f32 = rng.gen::<f32>() * total;
    let mut cumulative = 0.0;
    for (index, &weight) in weights.iter().enumerate() {
        if weight <= 0.0 {
            continue;
        }
        cumulative += weight;
        if roll < cumulative {
            return index;
        }
    }
    weights.len() - 1
}
