use rand::distributions::Open01;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Random source for one simulation run.
///
/// Always seeded explicitly; [`EventRng::from_entropy`] draws the seed from
/// the OS and keeps it so the run can be replayed.
pub struct EventRng {
    rng: ChaCha20Rng,
    seed: u64,
}

impl EventRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn from_entropy() -> Self {
        Self::new(rand::rngs::OsRng.next_u64())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform draw on the open interval (0, 1).
    pub fn uniform_open(&mut self) -> f64 {
        self.rng.sample(Open01)
    }
}
