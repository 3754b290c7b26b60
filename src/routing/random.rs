//! Random draws for traffic sampling.

use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform draws in `[0, 1)`.
///
/// Shared by every request task, so implementations must be callable
/// concurrently.
pub trait RandomSource: Send + Sync + std::fmt::Debug {
    fn next_f64(&self) -> f64;
}

/// Per-thread generator. No locks, no shared state between threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadLocalRandom;

impl RandomSource for ThreadLocalRandom {
    fn next_f64(&self) -> f64 {
        fastrand::f64()
    }
}

/// Seeded generator for reproducible sequences.
///
/// Serializes draws behind a mutex; meant for tests and simulation rather
/// than the request path.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&self) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen::<f64>()
    }
}

/// Always returns the same draw.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub f64);

impl RandomSource for FixedRandom {
    fn next_f64(&self) -> f64 {
        self.0
    }
}
