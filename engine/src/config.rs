//! Engine tunables
//!
//! Every field has a default, so an empty JSON object `{}` is a valid config.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Permutations sampled per Shapley estimate (at least 1). Variance shrinks as 1/S.
    pub shapley_samples: usize,
    /// Base seed for the Shapley sampler. `None` draws a fresh seed per run.
    pub shapley_seed: Option<u64>,
    /// Run Shapley sample blocks on the rayon pool.
    pub parallel: bool,
    /// Largest party count the coalition enumerator accepts (2^N subsets).
    pub max_enumeration_parties: usize,
    /// Allowed deviation of chance-node probabilities from 1.0.
    pub probability_tolerance: f64,
    /// A deviation must beat a cell by more than this to break best response.
    pub best_response_tolerance: f64,
    /// Maximum decision tree depth the evaluator will recurse into.
    pub max_tree_depth: usize,
    /// Yearly rate used to discount trial judgments by time-to-trial.
    pub annual_discount_rate: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            shapley_samples: 1_000,
            shapley_seed: None,
            parallel: true,
            max_enumeration_parties: 20,
            probability_tolerance: 1e-6,
            best_response_tolerance: 1e-9,
            max_tree_depth: 64,
            annual_discount_rate: 0.0,
        }
    }
}

impl EngineConfig {
    /// Parse a config from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.shapley_seed = Some(seed);
        self
    }

    pub fn with_samples(mut self, samples: usize) -> Self {
        self.shapley_samples = samples;
        self
    }
}
