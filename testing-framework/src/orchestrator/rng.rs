// File: testing-framework/src/orchestrator/rng.rs
//
// Seeded RNG for reproducible plant perturbations
//
// All randomness used by the in-memory plant (truncation noise) flows
// through TestRng so a failing conservation run can be replayed from its
// seed.

use parking_lot::Mutex;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Environment variable read by [`TestRng::new_from_env_or_random`]
pub const SEED_ENV_VAR: &str = "FLUID_TEST_SEED";

/// Deterministic RNG with replay support
///
/// Draws take `&self`; the generator sits behind a mutex so the RNG can be
/// owned by a plant that is only ever borrowed immutably by readers.
///
/// # Examples
///
/// ```rust
/// use fluid_testing_framework::orchestrator::TestRng;
///
/// let rng1 = TestRng::with_seed(42);
/// let rng2 = TestRng::with_seed(42);
/// assert_eq!(rng1.gen::<u64>(), rng2.gen::<u64>());
/// ```
pub struct TestRng {
    inner: Mutex<StdRng>,
    seed: u64,
}

impl TestRng {
    /// Create an RNG from a fixed seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            inner: Mutex::new(StdRng::seed_from_u64(seed)),
            seed,
        }
    }

    /// Seed from `FLUID_TEST_SEED` (hex, optional `0x`), else randomly
    ///
    /// The chosen seed is logged together with the replay command.
    pub fn new_from_env_or_random() -> Self {
        let seed = std::env::var(SEED_ENV_VAR)
            .ok()
            .and_then(|s| {
                let trimmed = s.trim().trim_start_matches("0x");
                u64::from_str_radix(trimmed, 16).ok()
            })
            .unwrap_or_else(|| rand::thread_rng().gen_range(1..=u64::MAX));

        log::info!("TestRng seed: 0x{:016x}", seed);
        log::info!("   Replay: {}=0x{:016x} cargo test ...", SEED_ENV_VAR, seed);

        Self::with_seed(seed)
    }

    /// Seed this RNG was created with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draw a value from the standard distribution
    pub fn gen<T>(&self) -> T
    where
        rand::distributions::Standard: rand::distributions::Distribution<T>,
    {
        self.inner.lock().gen()
    }

    /// Draw a value uniformly from `range`
    pub fn gen_range<T, R>(&self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.inner.lock().gen_range(range)
    }

    /// Environment assignment that reproduces this RNG
    pub fn replay_hint(&self) -> String {
        format!("{}=0x{:016x}", SEED_ENV_VAR, self.seed)
    }

    /// Print replay instructions, for use when a run fails
    pub fn on_failure(&self) {
        eprintln!("Conservation run failed! Replay with:");
        eprintln!("   {} cargo test ...", self.replay_hint());
    }
}

impl std::fmt::Debug for TestRng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestRng")
            .field("seed", &format_args!("0x{:016x}", self.seed))
            .finish()
    }
}
