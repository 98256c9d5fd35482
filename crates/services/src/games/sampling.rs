use std::sync::{Mutex, PoisonError};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;

/// Source of randomness for picking a game's questions.
///
/// Implementations return `count` distinct indices from `0..available`. The
/// returned order becomes the play order.
pub trait QuestionSampler: Send + Sync {
    fn sample(&self, available: usize, count: usize) -> Vec<usize>;
}

/// Uniform sampling without replacement from the thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSampler;

impl QuestionSampler for RandomSampler {
    fn sample(&self, available: usize, count: usize) -> Vec<usize> {
        let mut rng = rand::rng();
        index::sample(&mut rng, available, count.min(available)).into_vec()
    }
}

/// Deterministic sampler for tests and reproducible runs.
#[derive(Debug)]
pub struct SeededSampler {
    rng: Mutex<StdRng>,
}

impl SeededSampler {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl QuestionSampler for SeededSampler {
    fn sample(&self, available: usize, count: usize) -> Vec<usize> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        index::sample(&mut *rng, available, count.min(available)).into_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn random_sampler_returns_distinct_indices_in_range() {
        let picks = RandomSampler.sample(10, 4);
        assert_eq!(picks.len(), 4);
        assert!(picks.iter().all(|&i| i < 10));
        assert_eq!(picks.iter().collect::<HashSet<_>>().len(), 4);
    }

    #[test]
    fn samplers_clamp_to_available() {
        assert_eq!(RandomSampler.sample(3, 10).len(), 3);
        assert_eq!(SeededSampler::new(1).sample(2, 5).len(), 2);
        assert!(RandomSampler.sample(0, 1).is_empty());
    }

    #[test]
    fn seeded_sampler_is_reproducible() {
        let a = SeededSampler::new(42);
        let b = SeededSampler::new(42);
        for _ in 0..5 {
            assert_eq!(a.sample(20, 5), b.sample(20, 5));
        }
    }
}
