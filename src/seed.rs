//! Process-wide RNG seeding for reproducibility
//!
//! `fix_all_seeds` pins every RNG handed out by this module to a
//! caller-supplied seed and exports it through the [`SEED_ENV_VAR`]
//! environment variable so spawned tools inherit the same seed.
//!
//! # Example
//!
//! ```
//! use experimento::seed;
//! use rand::Rng;
//!
//! seed::fix_all_seeds(42);
//! let mut rng = seed::seeded_rng();
//! let first: u64 = rng.random();
//!
//! let mut again = seed::seeded_rng();
//! assert_eq!(first, again.random::<u64>());
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Environment variable carrying the fixed seed to child processes
pub const SEED_ENV_VAR: &str = "EXPERIMENTO_SEED";

static SEED: AtomicU64 = AtomicU64::new(0);
static SEEDED: AtomicBool = AtomicBool::new(false);

/// Fix the process-wide seed
///
/// After this call, [`seeded_rng`] and [`derive_rng`] are deterministic.
/// Calling it again re-fixes to the newer seed.
pub fn fix_all_seeds(seed: u64) {
    SEED.store(seed, Ordering::SeqCst);
    SEEDED.store(true, Ordering::SeqCst);
    std::env::set_var(SEED_ENV_VAR, seed.to_string());
    tracing::info!(seed, "fixed process-wide seed");
}

/// The currently fixed seed, if any
pub fn current_seed() -> Option<u64> {
    if SEEDED.load(Ordering::SeqCst) {
        Some(SEED.load(Ordering::SeqCst))
    } else {
        None
    }
}

/// An RNG seeded from the fixed seed, or OS entropy when none is fixed
pub fn seeded_rng() -> StdRng {
    match current_seed() {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// An independent deterministic RNG stream
///
/// Components that draw from their own stream stay reproducible without
/// sharing a sequence with other callers of [`seeded_rng`].
pub fn derive_rng(stream: u64) -> StdRng {
    match current_seed() {
        Some(seed) => StdRng::seed_from_u64(seed ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15)),
        None => StdRng::from_os_rng(),
    }
}
