//! Stimulus generation
//!
//! [`StimulusGenerator`] is a finite iterator of exactly `iterations`
//! samples. Random mode draws `data` uniformly from `[0, 2^width)` and
//! `shamt` uniformly from `[0, 2^shift_width)`, so shift amounts at or above
//! the width do occur for widths that are not powers of two. The generator is
//! always seeded; when no seed is configured one is drawn from entropy and
//! exposed through [`StimulusGenerator::seed`] so the run can be replayed.
//! Exhaustive mode enumerates the whole input space and directed mode replays
//! a fixed vector list; neither consumes randomness.

use crate::config::{Parameters, StimulusMode};
use crate::golden::word_mask;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// One input applied to the devices under test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StimulusSample {
    pub data: u64,
    pub shamt: u64,
}

/// Seeded source of stimulus samples
#[derive(Debug)]
pub struct StimulusGenerator {
    params: Parameters,
    mode: StimulusMode,
    seed: u64,
    rng: StdRng,
    vectors: Vec<StimulusSample>,
    emitted: u64,
}

impl StimulusGenerator {
    /// Create a generator; `seed = None` draws a fresh seed
    ///
    /// Exhaustive mode always enumerates the full `2^(width + shift_width)`
    /// space whatever `params.iterations` says. Directed mode needs vectors,
    /// see [`StimulusGenerator::directed`]; asked for here it yields nothing.
    pub fn new(mut params: Parameters, mode: StimulusMode, seed: Option<u64>) -> Self {
        match mode {
            StimulusMode::Exhaustive => params.iterations = exhaustive_space(&params),
            StimulusMode::Directed => params.iterations = 0,
            StimulusMode::Random => {}
        }
        // Drawn seeds stay within i64 so they can be written back to TOML.
        let seed = seed.unwrap_or_else(|| rand::random::<u64>() >> 1);
        Self {
            params,
            mode,
            seed,
            rng: StdRng::seed_from_u64(seed),
            vectors: Vec::new(),
            emitted: 0,
        }
    }

    /// Replay `vectors` in order
    pub fn directed(mut params: Parameters, vectors: Vec<StimulusSample>) -> Self {
        params.iterations = vectors.len() as u64;
        Self {
            params,
            mode: StimulusMode::Directed,
            seed: 0,
            rng: StdRng::seed_from_u64(0),
            vectors,
            emitted: 0,
        }
    }

    /// Seed that reproduces this sequence
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn mode(&self) -> StimulusMode {
        self.mode
    }

    fn random_sample(&mut self) -> StimulusSample {
        let data = self.rng.gen::<u64>() & word_mask(self.params.width);
        let shamt = self.rng.gen_range(0..self.params.shamt_space());
        StimulusSample { data, shamt }
    }

    fn enumerated_sample(&self, index: u64) -> StimulusSample {
        StimulusSample {
            data: index >> self.params.shift_width,
            shamt: index & (self.params.shamt_space() - 1),
        }
    }
}

/// Number of (data, shamt) pairs; saturates once the space exceeds a u64
fn exhaustive_space(params: &Parameters) -> u64 {
    1u64.checked_shl(params.width + params.shift_width).unwrap_or(u64::MAX)
}

impl Iterator for StimulusGenerator {
    type Item = StimulusSample;

    fn next(&mut self) -> Option<StimulusSample> {
        if self.emitted >= self.params.iterations {
            return None;
        }

        let sample = match self.mode {
            StimulusMode::Random => self.random_sample(),
            StimulusMode::Exhaustive => self.enumerated_sample(self.emitted),
            StimulusMode::Directed => self.vectors[self.emitted as usize],
        };
        self.emitted += 1;
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.params.iterations - self.emitted) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for StimulusGenerator {}
