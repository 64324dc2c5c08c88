//! Request/response contract for collaborators
//!
//! Shape-level only: every type here is serde (camelCase JSON), so callers
//! can use it over HTTP, RPC, or in-process. The functions validate their
//! inputs, call into the solvers and return plain numeric results.

use crate::coalition::{self, CharacteristicFunction, Coalition, Party, PartyId, SynergyValue};
use crate::config::EngineConfig;
use crate::equilibrium::{self, EquilibriumReport};
use crate::error::{EngineError, Result};
use crate::evaluator::{self, TreeEvaluation};
use crate::matrix::PayoffMatrix;
use crate::node::DecisionNode;
use crate::revision::{self, Filing, Reassessment};
use crate::settlement::{self, SettlementAnalysis, SettlementScenario, Strategy};
use crate::shapley::{self, ShapleyEstimator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A payoff matrix as either separate grids or `[p1, p2]` cell pairs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EquilibriumRequest {
    #[serde(rename_all = "camelCase")]
    Grids {
        payoffs_p1: Vec<Vec<f64>>,
        payoffs_p2: Vec<Vec<f64>>,
    },
    #[serde(rename_all = "camelCase")]
    Cells { game_matrix: Vec<Vec<[f64; 2]>> },
}

impl EquilibriumRequest {
    pub fn into_matrix(self) -> Result<PayoffMatrix> {
        match self {
            EquilibriumRequest::Grids {
                payoffs_p1,
                payoffs_p2,
            } => PayoffMatrix::new(payoffs_p1, payoffs_p2),
            EquilibriumRequest::Cells { game_matrix } => PayoffMatrix::from_cells(&game_matrix),
        }
    }
}

pub fn solve_equilibrium(request: EquilibriumRequest, config: &EngineConfig) -> Result<EquilibriumReport> {
    let matrix = request.into_matrix()?;
    Ok(equilibrium::solve(&matrix, config))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoalitionRequest {
    pub parties: Vec<Party>,
    pub total_stake_value: f64,
    /// Compute Shapley values exactly instead of sampling
    #[serde(default)]
    pub exact: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoalitionResponse {
    pub coalitions: Vec<Coalition>,
    pub shapley_values: BTreeMap<PartyId, f64>,
    pub shapley_standard_errors: BTreeMap<PartyId, f64>,
    /// Permutations sampled; 0 for exact values
    pub shapley_samples: usize,
    pub grand_coalition_value: f64,
    /// Coalition with the highest value weighted by formation probability
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended: Option<Vec<PartyId>>,
}

pub fn analyze_coalitions(request: &CoalitionRequest, config: &EngineConfig) -> Result<CoalitionResponse> {
    coalition::validate_parties(&request.parties)?;
    if !request.total_stake_value.is_finite() || request.total_stake_value < 0.0 {
        return Err(EngineError::InvalidInput {
            field: "totalStakeValue",
            value: request.total_stake_value,
        });
    }

    let parties = &request.parties;
    let value_fn = SynergyValue::new(parties, request.total_stake_value);
    let coalitions = coalition::enumerate_coalitions(parties, &value_fn, config.max_enumeration_parties)?;
    let allocation = if request.exact {
        shapley::exact(parties, &value_fn)?
    } else {
        ShapleyEstimator::from_config(config)?.estimate(parties, &value_fn)
    };
    let everyone: Vec<usize> = (0..parties.len()).collect();
    let recommended = coalitions
        .iter()
        .max_by(|a, b| a.expected_value().total_cmp(&b.expected_value()))
        .map(|c| c.members.clone());

    Ok(CoalitionResponse {
        grand_coalition_value: value_fn.value(&everyone),
        coalitions,
        shapley_values: allocation.values,
        shapley_standard_errors: allocation.standard_errors,
        shapley_samples: allocation.samples,
        recommended,
    })
}

pub fn evaluate_decision_tree(root: &DecisionNode, config: &EngineConfig) -> Result<TreeEvaluation> {
    evaluator::evaluate(root, config)
}

pub fn optimize_settlement(scenario: &SettlementScenario, config: &EngineConfig) -> Result<SettlementAnalysis> {
    settlement::optimize(scenario, config)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReassessRequest {
    pub scenario: SettlementScenario,
    #[serde(default)]
    pub previous_strategy: Option<Strategy>,
    pub filing: Filing,
}

pub fn reassess_settlement(request: &ReassessRequest, config: &EngineConfig) -> Result<Reassessment> {
    revision::reassess(&request.scenario, request.previous_strategy, &request.filing, config)
}
