//! Settlement strategy optimizer
//!
//! Builds a 2x2 game from a litigation scenario, runs the equilibrium
//! solvers on it, and classifies the scenario as settle / trial / mixed.
//!
//! Matrix layout (plaintiff rows, defendant columns):
//!
//! ```text
//!                 accept                      reject
//!   settle   (mid, -mid)                 (d_offer, -d_offer)
//!   trial    (p_offer, -p_offer)         (p_trial_ev, -d_exposure)
//! ```
//!
//! The classification is a threshold heuristic kept behind
//! `RecommendationPolicy`, separate from the solvers. It is advisory and is
//! not derived from the equilibrium itself.

use crate::config::EngineConfig;
use crate::equilibrium::{self, EquilibriumReport};
use crate::error::{EngineError, Result};
use crate::matrix::{PayoffMatrix, StrategyLabels};
use serde::{Deserialize, Serialize};

/// Inputs for one settlement computation. All amounts in the same currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementScenario {
    /// Amount the plaintiff demands
    pub plaintiff_offer: f64,
    /// Amount the defendant offers to pay
    pub defendant_offer: f64,
    /// Judgment awarded if the plaintiff wins at trial
    pub expected_judgment: f64,
    /// Plaintiff's probability of winning at trial, 0-1
    pub win_probability: f64,
    pub plaintiff_costs: f64,
    pub defendant_costs: f64,
    #[serde(default)]
    pub months_to_trial: f64,
}

impl SettlementScenario {
    pub fn new(
        plaintiff_offer: f64,
        defendant_offer: f64,
        expected_judgment: f64,
        win_probability: f64,
        plaintiff_costs: f64,
        defendant_costs: f64,
        months_to_trial: f64,
    ) -> Result<Self> {
        let scenario = SettlementScenario {
            plaintiff_offer,
            defendant_offer,
            expected_judgment,
            win_probability,
            plaintiff_costs,
            defendant_costs,
            months_to_trial,
        };
        scenario.validate()?;
        Ok(scenario)
    }

    /// Amounts must be finite and non-negative; win probability in [0, 1].
    pub fn validate(&self) -> Result<()> {
        let amounts = [
            ("plaintiffOffer", self.plaintiff_offer),
            ("defendantOffer", self.defendant_offer),
            ("expectedJudgment", self.expected_judgment),
            ("plaintiffCosts", self.plaintiff_costs),
            ("defendantCosts", self.defendant_costs),
            ("monthsToTrial", self.months_to_trial),
        ];
        for (field, value) in amounts {
            if !value.is_finite() || value < 0.0 {
                return Err(EngineError::InvalidInput { field, value });
            }
        }
        if !(0.0..=1.0).contains(&self.win_probability) {
            return Err(EngineError::InvalidInput {
                field: "winProbability",
                value: self.win_probability,
            });
        }
        Ok(())
    }
}

/// Advisory strategy for the plaintiff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Settle,
    Trial,
    Mixed,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Settle => write!(f, "settle"),
            Strategy::Trial => write!(f, "trial"),
            Strategy::Mixed => write!(f, "mixed"),
        }
    }
}

/// Expected trial outcomes for both sides
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialEconomics {
    /// Plaintiff's expected net recovery from trial
    pub plaintiff_trial_ev: f64,
    /// Defendant's expected total cost of trial (judgment plus own costs)
    pub defendant_trial_exposure: f64,
    /// Midpoint of the two offers
    pub offer_midpoint: f64,
    /// Present-value factor applied to the judgment
    pub discount_factor: f64,
}

impl TrialEconomics {
    pub fn of(scenario: &SettlementScenario, config: &EngineConfig) -> Self {
        let discount_factor =
            (1.0 + config.annual_discount_rate).powf(-scenario.months_to_trial / 12.0);
        let expected_award = scenario.win_probability * scenario.expected_judgment * discount_factor;
        TrialEconomics {
            plaintiff_trial_ev: expected_award - scenario.plaintiff_costs,
            defendant_trial_exposure: expected_award + scenario.defendant_costs,
            offer_midpoint: (scenario.plaintiff_offer + scenario.defendant_offer) / 2.0,
            discount_factor,
        }
    }
}

/// Settle-vs-trial classification, kept apart from the solvers so it can be
/// tuned or replaced.
pub trait RecommendationPolicy {
    fn classify(
        &self,
        scenario: &SettlementScenario,
        economics: &TrialEconomics,
        equilibria: &EquilibriumReport,
    ) -> Strategy;
}

/// Default policy: each side prefers settling when its own side's offer
/// beats its trial expectation. Both prefer settling -> settle, neither ->
/// trial, otherwise mixed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdPolicy;

impl ThresholdPolicy {
    pub fn plaintiff_prefers_settling(scenario: &SettlementScenario, economics: &TrialEconomics) -> bool {
        scenario.defendant_offer >= economics.plaintiff_trial_ev
    }

    pub fn defendant_prefers_settling(scenario: &SettlementScenario, economics: &TrialEconomics) -> bool {
        scenario.plaintiff_offer <= economics.defendant_trial_exposure
    }
}

impl RecommendationPolicy for ThresholdPolicy {
    fn classify(
        &self,
        scenario: &SettlementScenario,
        economics: &TrialEconomics,
        _equilibria: &EquilibriumReport,
    ) -> Strategy {
        match (
            Self::plaintiff_prefers_settling(scenario, economics),
            Self::defendant_prefers_settling(scenario, economics),
        ) {
            (true, true) => Strategy::Settle,
            (false, false) => Strategy::Trial,
            _ => Strategy::Mixed,
        }
    }
}

/// Where a negotiated settlement should land.
///
/// `min` is the plaintiff's walk-away point (trial EV, floored at 0) and
/// `max` the defendant's (trial exposure). With non-negative costs the
/// floor never exceeds the ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SettlementRange {
    pub min: f64,
    pub max: f64,
    pub optimal: f64,
}

impl SettlementRange {
    /// The settle/trial game built by `payoff_matrix` always has a pure
    /// equilibrium, so the optimizer itself lands on the midpoint; the mixed
    /// branch applies when a caller supplies a report without one.
    pub fn of(economics: &TrialEconomics, equilibria: &EquilibriumReport) -> Self {
        let max = economics.defendant_trial_exposure;
        let min = economics.plaintiff_trial_ev.max(0.0).min(max);
        let optimal = match equilibria.mixed_equilibria.first() {
            Some(mixed) => mixed.expected_p1.clamp(min, max),
            None => (min + max) / 2.0,
        };
        SettlementRange { min, max, optimal }
    }
}

/// Numbers behind the recommendation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementPayoffs {
    #[serde(flatten)]
    pub economics: TrialEconomics,
    pub matrix: PayoffMatrix,
    pub equilibria: EquilibriumReport,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementAnalysis {
    pub strategy: Strategy,
    pub settlement_range: SettlementRange,
    pub payoffs: SettlementPayoffs,
}

/// Build the plaintiff/defendant game for a scenario.
pub fn payoff_matrix(scenario: &SettlementScenario, economics: &TrialEconomics) -> Result<PayoffMatrix> {
    let mid = economics.offer_midpoint;
    let p1 = vec![
        vec![mid, scenario.defendant_offer],
        vec![scenario.plaintiff_offer, economics.plaintiff_trial_ev],
    ];
    let p2 = vec![
        vec![-mid, -scenario.defendant_offer],
        vec![-scenario.plaintiff_offer, -economics.defendant_trial_exposure],
    ];
    PayoffMatrix::new(p1, p2)?.with_labels(StrategyLabels {
        rows: vec!["settle".to_string(), "trial".to_string()],
        cols: vec!["accept".to_string(), "reject".to_string()],
    })
}

/// Optimize with the default `ThresholdPolicy`.
pub fn optimize(scenario: &SettlementScenario, config: &EngineConfig) -> Result<SettlementAnalysis> {
    optimize_with(scenario, config, &ThresholdPolicy)
}

pub fn optimize_with(
    scenario: &SettlementScenario,
    config: &EngineConfig,
    policy: &dyn RecommendationPolicy,
) -> Result<SettlementAnalysis> {
    scenario.validate()?;
    let economics = TrialEconomics::of(scenario, config);
    let matrix = payoff_matrix(scenario, &economics)?;
    let equilibria = equilibrium::solve(&matrix, config);
    let strategy = policy.classify(scenario, &economics, &equilibria);
    let settlement_range = SettlementRange::of(&economics, &equilibria);

    log::debug!(
        "settlement: trial ev {:.2}, exposure {:.2} -> {}",
        economics.plaintiff_trial_ev,
        economics.defendant_trial_exposure,
        strategy
    );
    Ok(SettlementAnalysis {
        strategy,
        settlement_range,
        payoffs: SettlementPayoffs {
            economics,
            matrix,
            equilibria,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_reference_scenario_settles() {
        let analysis = optimize(&fixtures::reference_scenario(), &EngineConfig::default()).unwrap();
        let econ = analysis.payoffs.economics;
        assert!((econ.plaintiff_trial_ev - 40_000.0).abs() < 1e-6);
        assert!((econ.defendant_trial_exposure - 95_000.0).abs() < 1e-6);
        assert!((econ.offer_midpoint - 62_500.0).abs() < 1e-6);
        assert_eq!(analysis.strategy, Strategy::Settle);

        let range = analysis.settlement_range;
        assert!((range.min - 40_000.0).abs() < 1e-6);
        assert!((range.max - 95_000.0).abs() < 1e-6);
        assert!((range.optimal - 67_500.0).abs() < 1e-6);
    }

    #[test]
    fn test_reference_scenario_equilibria() {
        let analysis = optimize(&fixtures::reference_scenario(), &EngineConfig::default()).unwrap();
        let cells: Vec<_> = analysis
            .payoffs
            .equilibria
            .pure_equilibria
            .iter()
            .map(|e| (e.row, e.col))
            .collect();
        // settle/reject (take the defendant's offer) and trial/accept (defendant pays the demand)
        assert_eq!(cells, vec![(0, 1), (1, 0)]);
        assert!(analysis.payoffs.equilibria.mixed_equilibria.is_empty());
    }

    #[test]
    fn test_trial_when_neither_side_settles() {
        let scenario = SettlementScenario::new(500_000.0, 10_000.0, 300_000.0, 0.5, 10_000.0, 10_000.0, 0.0)
            .unwrap();
        let analysis = optimize(&scenario, &EngineConfig::default()).unwrap();
        assert_eq!(analysis.strategy, Strategy::Trial);
        assert!(analysis.settlement_range.min <= analysis.settlement_range.max);
    }

    #[test]
    fn test_mixed_when_only_defendant_settles() {
        let scenario = SettlementScenario::new(75_000.0, 50_000.0, 100_000.0, 0.9, 25_000.0, 30_000.0, 0.0)
            .unwrap();
        let analysis = optimize(&scenario, &EngineConfig::default()).unwrap();
        // trial ev 65k beats the 50k offer; 75k demand is under the 120k exposure
        assert_eq!(analysis.strategy, Strategy::Mixed);
    }

    #[test]
    fn test_discounting_by_time_to_trial() {
        let scenario = SettlementScenario {
            months_to_trial: 24.0,
            ..fixtures::reference_scenario()
        };
        let config = EngineConfig {
            annual_discount_rate: 0.1,
            ..EngineConfig::default()
        };
        let econ = TrialEconomics::of(&scenario, &config);
        let factor = 1.0 / (1.1 * 1.1);
        assert!((econ.discount_factor - factor).abs() < 1e-12);
        assert!((econ.plaintiff_trial_ev - (65_000.0 * factor - 25_000.0)).abs() < 1e-6);
        // Zero rate leaves amounts undiscounted regardless of the delay
        let flat = TrialEconomics::of(&scenario, &EngineConfig::default());
        assert_eq!(flat.discount_factor, 1.0);
    }

    #[test]
    fn test_matrix_labels_and_cells() {
        let scenario = fixtures::reference_scenario();
        let econ = TrialEconomics::of(&scenario, &EngineConfig::default());
        let m = payoff_matrix(&scenario, &econ).unwrap();
        assert_eq!(m.labels().unwrap().rows, vec!["settle", "trial"]);
        assert_eq!(m.payoff(0, 0), (62_500.0, -62_500.0));
        assert_eq!(m.payoff(1, 1), (40_000.0, -95_000.0));
    }

    #[test]
    fn test_custom_policy_is_swappable() {
        struct AlwaysTrial;
        impl RecommendationPolicy for AlwaysTrial {
            fn classify(&self, _: &SettlementScenario, _: &TrialEconomics, _: &EquilibriumReport) -> Strategy {
                Strategy::Trial
            }
        }
        let analysis =
            optimize_with(&fixtures::reference_scenario(), &EngineConfig::default(), &AlwaysTrial).unwrap();
        assert_eq!(analysis.strategy, Strategy::Trial);
    }

    #[test]
    fn test_rejects_invalid_scenarios() {
        let err = SettlementScenario::new(1.0, 1.0, 1.0, 1.5, 0.0, 0.0, 0.0).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidInput {
                field: "winProbability",
                value: 1.5
            }
        );
        let err = SettlementScenario::new(1.0, -1.0, 1.0, 0.5, 0.0, 0.0, 0.0).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { field: "defendantOffer", .. }));
    }

    #[test]
    fn test_settlement_game_always_has_pure_equilibrium() {
        let scenarios = [
            fixtures::reference_scenario(),
            SettlementScenario::new(500_000.0, 10_000.0, 300_000.0, 0.5, 10_000.0, 10_000.0, 0.0).unwrap(),
            SettlementScenario::new(75_000.0, 50_000.0, 100_000.0, 0.9, 25_000.0, 30_000.0, 0.0).unwrap(),
            SettlementScenario::new(20_000.0, 5_000.0, 50_000.0, 0.1, 30_000.0, 10_000.0, 0.0).unwrap(),
        ];
        for scenario in scenarios {
            let analysis = optimize(&scenario, &EngineConfig::default()).unwrap();
            assert!(!analysis.payoffs.equilibria.pure_equilibria.is_empty(), "{:?}", scenario);
        }
    }

    #[test]
    fn test_range_optimal_from_mixed_report() {
        let econ = TrialEconomics::of(&fixtures::reference_scenario(), &EngineConfig::default());
        let report = |expected_p1: f64| EquilibriumReport {
            pure_equilibria: Vec::new(),
            mixed_equilibria: vec![equilibrium::MixedEquilibrium {
                p: 0.5,
                q: 0.5,
                expected_p1,
                expected_p2: -expected_p1,
            }],
            degenerate: None,
        };
        let inside = SettlementRange::of(&econ, &report(55_000.0));
        assert!((inside.optimal - 55_000.0).abs() < 1e-6);
        // Clamped into [40k, 95k]
        assert!((SettlementRange::of(&econ, &report(10_000.0)).optimal - 40_000.0).abs() < 1e-6);
        assert!((SettlementRange::of(&econ, &report(200_000.0)).optimal - 95_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_costless_trial_collapses_range() {
        let scenario = SettlementScenario::new(90_000.0, 10_000.0, 100_000.0, 0.9, 0.0, 0.0, 0.0).unwrap();
        let range = optimize(&scenario, &EngineConfig::default()).unwrap().settlement_range;
        assert!((range.min - 90_000.0).abs() < 1e-6);
        assert!((range.max - 90_000.0).abs() < 1e-6);
        assert!((range.optimal - 90_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_losing_case_floors_range_at_zero() {
        let scenario = SettlementScenario::new(20_000.0, 5_000.0, 50_000.0, 0.1, 30_000.0, 10_000.0, 0.0).unwrap();
        let analysis = optimize(&scenario, &EngineConfig::default()).unwrap();
        assert!(analysis.payoffs.economics.plaintiff_trial_ev < 0.0);
        assert_eq!(analysis.settlement_range.min, 0.0);
        assert!((analysis.settlement_range.max - 15_000.0).abs() < 1e-6);
    }
}
