//! accord Tree Builder - litigation decision tree construction
//!
//! This crate turns a settlement scenario into a `DecisionNode` tree the
//! engine can evaluate: the plaintiff either accepts the defendant's offer,
//! goes to trial, or (optionally) tries mediation first and falls back to
//! trial if it fails.

use accord_engine::config::EngineConfig;
use accord_engine::error::{EngineError, Result};
use accord_engine::node::DecisionNode;
use accord_engine::settlement::{SettlementScenario, TrialEconomics};
use serde::{Deserialize, Serialize};

/// Mediation parameters, as fractions of the expected judgment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MediationTerms {
    /// Chance that mediation produces an agreement
    pub success_rate: f64,
    /// Share of the judgment recovered in a mediated agreement
    pub recovery_rate: f64,
    /// Mediation cost as a share of the judgment
    pub cost_rate: f64,
}

impl MediationTerms {
    /// Every rate must be finite and within [0, 1].
    pub fn validate(&self) -> Result<()> {
        let rates = [
            ("successRate", self.success_rate),
            ("recoveryRate", self.recovery_rate),
            ("costRate", self.cost_rate),
        ];
        for (field, value) in rates {
            if !(0.0..=1.0).contains(&value) {
                return Err(EngineError::InvalidInput { field, value });
            }
        }
        Ok(())
    }
}

impl Default for MediationTerms {
    fn default() -> Self {
        MediationTerms {
            success_rate: 0.70,
            recovery_rate: 0.60,
            cost_rate: 0.05,
        }
    }
}

/// Builds the plaintiff's decision tree for one scenario
#[derive(Debug, Clone)]
pub struct LitigationTreeBuilder {
    scenario: SettlementScenario,
    discount_factor: f64,
    mediation: Option<MediationTerms>,
}

impl LitigationTreeBuilder {
    pub fn new(scenario: SettlementScenario, config: &EngineConfig) -> Result<Self> {
        scenario.validate()?;
        let discount_factor = TrialEconomics::of(&scenario, config).discount_factor;
        Ok(LitigationTreeBuilder {
            scenario,
            discount_factor,
            mediation: None,
        })
    }

    /// Add a mediation branch ahead of trial
    pub fn with_mediation(mut self, terms: MediationTerms) -> Result<Self> {
        terms.validate()?;
        self.mediation = Some(terms);
        Ok(self)
    }

    pub fn build(&self) -> DecisionNode {
        let s = &self.scenario;
        let mut children = vec![
            DecisionNode::outcome("accept", "Accept defendant offer", s.defendant_offer)
                .with_recommendation("settle"),
            self.trial("trial", 0.0),
        ];
        if let Some(terms) = self.mediation {
            children.push(self.mediation_branch(terms));
        }
        let root = DecisionNode::decision("root", "Plaintiff strategy", children);
        log::debug!(
            "built litigation tree: {} nodes, depth {}",
            root.node_count(),
            root.depth()
        );
        root
    }

    /// Trial chance node, with `sunk` already spent before trial
    fn trial(&self, id: &str, sunk: f64) -> DecisionNode {
        let s = &self.scenario;
        let award = s.expected_judgment * self.discount_factor;
        let cost = s.plaintiff_costs + sunk;
        DecisionNode::chance(
            id,
            "Go to trial",
            vec![
                DecisionNode::outcome(format!("{id}.win"), "Win at trial", award - cost)
                    .with_probability(s.win_probability)
                    .with_recommendation("trial"),
                DecisionNode::outcome(format!("{id}.lose"), "Lose at trial", -cost)
                    .with_probability(1.0 - s.win_probability)
                    .with_recommendation("trial"),
            ],
        )
    }

    fn mediation_branch(&self, terms: MediationTerms) -> DecisionNode {
        let judgment = self.scenario.expected_judgment;
        let cost = judgment * terms.cost_rate;
        DecisionNode::chance(
            "mediate",
            "Mediate before trial",
            vec![
                DecisionNode::outcome(
                    "mediate.agree",
                    "Mediated agreement",
                    judgment * terms.recovery_rate - cost,
                )
                .with_probability(terms.success_rate)
                .with_recommendation("mediate"),
                self.trial("mediate.trial", cost)
                    .with_probability(1.0 - terms.success_rate),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_engine::evaluator::evaluate;
    use accord_engine::fixtures;

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn test_basic_tree_matches_settlement_economics() {
        let tree = LitigationTreeBuilder::new(fixtures::reference_scenario(), &config())
            .unwrap()
            .build();
        assert_eq!(tree.children().len(), 2);
        assert_eq!(tree.node_count(), 5);

        // Trial: 0.65 * 100k - 25k = 40k, below the 50k offer
        let eval = evaluate(&tree, &config()).unwrap();
        assert!((eval.expected_value - 50_000.0).abs() < 1e-6);
        assert_eq!(eval.policy[0].choice, "accept");
    }

    #[test]
    fn test_mediation_branch_values() {
        let tree = LitigationTreeBuilder::new(fixtures::reference_scenario(), &config())
            .unwrap()
            .with_mediation(MediationTerms::default())
            .unwrap()
            .build();
        let mediate = &tree.children()[2];
        // 0.7 * (60k - 5k) + 0.3 * (40k - 5k) = 49k
        let ev = accord_engine::evaluator::expected_value(mediate, &config()).unwrap();
        assert!((ev - 49_000.0).abs() < 1e-6, "{}", ev);
    }

    #[test]
    fn test_low_offer_prefers_mediation() {
        let scenario = SettlementScenario {
            defendant_offer: 10_000.0,
            ..fixtures::reference_scenario()
        };
        let tree = LitigationTreeBuilder::new(scenario, &config())
            .unwrap()
            .with_mediation(MediationTerms::default())
            .unwrap()
            .build();
        let eval = evaluate(&tree, &config()).unwrap();
        assert_eq!(eval.policy[0].choice, "mediate");
        assert!((eval.expected_value - 49_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_discounting_reduces_trial_award() {
        let scenario = SettlementScenario {
            months_to_trial: 12.0,
            defendant_offer: 0.0,
            ..fixtures::reference_scenario()
        };
        let config = EngineConfig {
            annual_discount_rate: 0.25,
            ..EngineConfig::default()
        };
        let tree = LitigationTreeBuilder::new(scenario, &config).unwrap().build();
        // Award discounted to 80k: 0.65 * 80k - 25k = 27k
        let eval = evaluate(&tree, &config).unwrap();
        assert!((eval.expected_value - 27_000.0).abs() < 1e-6, "{}", eval.expected_value);
        assert_eq!(eval.policy[0].choice, "trial");
    }

    #[test]
    fn test_rejects_invalid_scenario() {
        let scenario = SettlementScenario {
            win_probability: 1.5,
            ..fixtures::reference_scenario()
        };
        assert!(LitigationTreeBuilder::new(scenario, &config()).is_err());
    }

    #[test]
    fn test_rejects_impossible_mediation_terms() {
        let builder = LitigationTreeBuilder::new(fixtures::reference_scenario(), &config()).unwrap();
        let cases = [
            (MediationTerms { success_rate: 1.5, ..MediationTerms::default() }, "successRate"),
            (MediationTerms { recovery_rate: -0.2, ..MediationTerms::default() }, "recoveryRate"),
            (MediationTerms { cost_rate: f64::NAN, ..MediationTerms::default() }, "costRate"),
        ];
        for (terms, expected) in cases {
            let err = builder.clone().with_mediation(terms).unwrap_err();
            assert!(
                matches!(err, EngineError::InvalidInput { field, .. } if field == expected),
                "{:?}",
                err
            );
        }
    }

    #[test]
    fn test_terms_json_defaults() {
        let terms: MediationTerms = serde_json::from_str(r#"{"successRate": 0.5}"#).unwrap();
        assert_eq!(terms.success_rate, 0.5);
        assert_eq!(terms.recovery_rate, 0.60);
    }
}
