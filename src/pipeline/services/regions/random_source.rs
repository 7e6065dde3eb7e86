use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform floats in `[0, 1)` used for region placement.
pub trait RandomSource: Send {
    fn next_float(&mut self) -> f32;
}

/// Adapts any `rand` generator.
pub struct RngSource<R: Rng + Send>(pub R);

impl RngSource<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(StdRng::from_os_rng())
    }
}

impl<R: Rng + Send> RandomSource for RngSource<R> {
    fn next_float(&mut self) -> f32 {
        self.0.random::<f32>()
    }
}

/// Replays a fixed list of values, wrapping around at the end.
#[derive(Debug, Clone)]
pub struct SequenceSource {
    values: Vec<f32>,
    position: usize,
}

impl SequenceSource {
    pub fn new(values: Vec<f32>) -> Self {
        Self {
            values,
            position: 0,
        }
    }
}

impl RandomSource for SequenceSource {
    fn next_float(&mut self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.position % self.values.len()];
        self.position += 1;
        value
    }
}
