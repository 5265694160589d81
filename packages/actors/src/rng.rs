use rand::SeedableRng;
use rand::rngs::{OsRng, StdRng};

/// Build the generator an actor keeps for its whole life.
///
/// A configured seed makes the drawn durations reproducible; otherwise the
/// generator is seeded once from the OS.
pub(crate) fn actor_rng(seed: Option<u64>) -> Result<StdRng, rand::Error> {
    match seed {
        Some(seed) => Ok(StdRng::seed_from_u64(seed)),
        None => StdRng::from_rng(OsRng),
    }
}
