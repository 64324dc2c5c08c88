//! Shapley value estimation
//!
//! The Monte Carlo estimator averages each party's marginal contribution over
//! uniformly random joining orders. Samples are grouped into fixed-size
//! blocks; every block owns an RNG seeded from the base seed plus the block
//! index, so a seeded estimate is the same whether blocks run sequentially or
//! on the rayon pool. Blocks only read the value function and fold into a
//! block-local accumulator; accumulators are merged at the end.
//!
//! The sample count is the accuracy knob: the standard error of each estimate
//! shrinks as 1/√S while cost grows linearly in S.

use crate::coalition::{CharacteristicFunction, Party, PartyId};
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

/// Permutations drawn per RNG block
const BLOCK_SIZE: usize = 64;

/// Largest party count for the exact (2^N subset) computation
pub const EXACT_LIMIT: usize = 16;

/// Per-party fair shares of the grand coalition's value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapleyAllocation {
    pub values: BTreeMap<PartyId, f64>,
    /// Standard error of each estimate (0 for exact allocations)
    pub standard_errors: BTreeMap<PartyId, f64>,
    /// Permutations sampled; 0 when computed exactly
    pub samples: usize,
}

impl ShapleyAllocation {
    pub fn get(&self, id: &str) -> Option<f64> {
        self.values.get(id).copied()
    }

    /// Sum of all allocations; matches the grand-coalition value
    pub fn total(&self) -> f64 {
        self.values.values().sum()
    }

    pub fn is_exact(&self) -> bool {
        self.samples == 0
    }
}

/// Running marginal-contribution sums for one block of permutations
#[derive(Debug, Clone)]
struct Accumulator {
    sums: Vec<f64>,
    squares: Vec<f64>,
    samples: usize,
}

impl Accumulator {
    fn new(n: usize) -> Self {
        Accumulator {
            sums: vec![0.0; n],
            squares: vec![0.0; n],
            samples: 0,
        }
    }

    /// Add the marginal contributions of one joining order.
    fn absorb(mut self, order: &[usize], value_fn: &impl CharacteristicFunction) -> Self {
        let mut previous = value_fn.value(&[]);
        for k in 0..order.len() {
            let current = value_fn.value(&order[..=k]);
            let marginal = current - previous;
            self.sums[order[k]] += marginal;
            self.squares[order[k]] += marginal * marginal;
            previous = current;
        }
        self.samples += 1;
        self
    }

    fn merge(mut self, other: Accumulator) -> Self {
        for (a, b) in self.sums.iter_mut().zip(other.sums) {
            *a += b;
        }
        for (a, b) in self.squares.iter_mut().zip(other.squares) {
            *a += b;
        }
        self.samples += other.samples;
        self
    }
}

/// Endless stream of uniformly random orderings of `0..n`
fn permutations(n: usize, mut rng: SmallRng) -> impl Iterator<Item = Vec<usize>> {
    std::iter::repeat_with(move || {
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut rng);
        order
    })
}

/// Monte Carlo Shapley estimator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapleyEstimator {
    samples: usize,
    seed: Option<u64>,
    parallel: bool,
}

impl ShapleyEstimator {
    /// Fails with `InvalidInput` for a sample count of 0.
    pub fn new(samples: usize) -> Result<Self> {
        if samples == 0 {
            return Err(EngineError::InvalidInput {
                field: "shapleySamples",
                value: 0.0,
            });
        }
        Ok(ShapleyEstimator {
            samples,
            seed: None,
            parallel: true,
        })
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let mut estimator = Self::new(config.shapley_samples)?;
        estimator.seed = config.shapley_seed;
        estimator.parallel = config.parallel;
        Ok(estimator)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Estimate each party's Shapley value under `value_fn`.
    pub fn estimate(&self, parties: &[Party], value_fn: &impl CharacteristicFunction) -> ShapleyAllocation {
        let n = parties.len();
        let seed = self.seed.unwrap_or_else(rand::random);
        let blocks = self.samples.div_ceil(BLOCK_SIZE);

        let run_block = |block: usize| {
            let size = BLOCK_SIZE.min(self.samples - block * BLOCK_SIZE);
            let rng = SmallRng::seed_from_u64(seed.wrapping_add(block as u64));
            permutations(n, rng)
                .take(size)
                .fold(Accumulator::new(n), |acc, order| acc.absorb(&order, value_fn))
        };

        let total = if self.parallel {
            (0..blocks)
                .into_par_iter()
                .map(run_block)
                .reduce(|| Accumulator::new(n), Accumulator::merge)
        } else {
            (0..blocks)
                .map(run_block)
                .fold(Accumulator::new(n), Accumulator::merge)
        };

        log::debug!(
            "shapley: {} parties, {} samples in {} blocks (seed {})",
            n,
            total.samples,
            blocks,
            seed
        );
        allocation(parties, &total)
    }
}

fn allocation(parties: &[Party], acc: &Accumulator) -> ShapleyAllocation {
    let s = acc.samples as f64;
    let mut values = BTreeMap::new();
    let mut standard_errors = BTreeMap::new();
    for (i, party) in parties.iter().enumerate() {
        let mean = acc.sums[i] / s;
        let variance = (acc.squares[i] / s - mean * mean).max(0.0);
        values.insert(party.id.clone(), mean);
        standard_errors.insert(party.id.clone(), (variance / s).sqrt());
    }
    ShapleyAllocation {
        values,
        standard_errors,
        samples: acc.samples,
    }
}

/// Exact Shapley values via the subset-weight formula
/// `φᵢ = Σ_{S ⊆ N∖{i}} |S|!(n-|S|-1)!/n! · (v(S ∪ {i}) - v(S))`.
///
/// Evaluates `value_fn` once per subset, so it is limited to
/// `EXACT_LIMIT` parties.
pub fn exact(parties: &[Party], value_fn: &impl CharacteristicFunction) -> Result<ShapleyAllocation> {
    let n = parties.len();
    if n > EXACT_LIMIT {
        return Err(EngineError::ScalabilityLimit {
            parties: n,
            cap: EXACT_LIMIT,
        });
    }

    let subsets = 1usize << n;
    let mut members = Vec::with_capacity(n);
    let table: Vec<f64> = (0..subsets)
        .map(|mask| {
            members.clear();
            members.extend((0..n).filter(|&i| mask & (1 << i) != 0));
            value_fn.value(&members)
        })
        .collect();

    // weights[s] = s!(n-s-1)!/n!
    let factorial: Vec<f64> = (0..=n)
        .scan(1.0, |f, k| {
            if k > 0 {
                *f *= k as f64;
            }
            Some(*f)
        })
        .collect();
    let weights: Vec<f64> = (0..n)
        .map(|s| factorial[s] * factorial[n - s - 1] / factorial[n])
        .collect();

    let mut values = BTreeMap::new();
    for (i, party) in parties.iter().enumerate() {
        let bit = 1usize << i;
        let phi: f64 = (0..subsets)
            .filter(|mask| mask & bit == 0)
            .map(|mask| weights[mask.count_ones() as usize] * (table[mask | bit] - table[mask]))
            .sum();
        values.insert(party.id.clone(), phi);
    }
    let standard_errors = values.keys().map(|id| (id.clone(), 0.0)).collect();
    Ok(ShapleyAllocation {
        values,
        standard_errors,
        samples: 0,
    })
}
