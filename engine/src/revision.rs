//! Scenario revision after new court filings
//!
//! A filing shifts the inputs of a settlement scenario (win probability,
//! offers, damages). `reassess` re-runs the optimizer on the revised scenario
//! and reports whether the recommended strategy moved.

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::settlement::{self, SettlementAnalysis, SettlementScenario, Strategy};
use serde::{Deserialize, Serialize};

/// Win probability stays inside this band after any revision
const MIN_WIN_PROBABILITY: f64 = 0.05;
const MAX_WIN_PROBABILITY: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Plaintiff,
    Defendant,
}

/// A docket event that changes the settlement picture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Filing {
    /// Ruling on a summary judgment motion brought by `movant`
    #[serde(rename_all = "camelCase")]
    SummaryJudgment { granted: bool, movant: Side },
    /// A new offer from `side`
    #[serde(rename_all = "camelCase")]
    SettlementOffer { side: Side, amount: f64 },
    /// Expert testimony moving the damages estimate
    #[serde(rename_all = "camelCase")]
    ExpertReport { damages_change: f64 },
    /// Any other filing; only re-clamps the win probability
    Other,
}

impl Filing {
    /// Shift in the plaintiff's win probability caused by this filing
    fn win_probability_shift(&self) -> f64 {
        match self {
            Filing::SummaryJudgment { granted: true, movant: Side::Plaintiff } => 0.3,
            Filing::SummaryJudgment { granted: true, movant: Side::Defendant } => -0.3,
            Filing::SummaryJudgment { granted: false, movant: Side::Defendant } => 0.1,
            Filing::SummaryJudgment { granted: false, movant: Side::Plaintiff } => -0.1,
            _ => 0.0,
        }
    }
}

impl SettlementScenario {
    /// Return a copy of this scenario with `filing` applied.
    pub fn revise(&self, filing: &Filing) -> Result<SettlementScenario> {
        let mut next = *self;
        match *filing {
            Filing::SettlementOffer { side, amount } => {
                if !amount.is_finite() || amount < 0.0 {
                    return Err(EngineError::InvalidInput {
                        field: "amount",
                        value: amount,
                    });
                }
                match side {
                    Side::Plaintiff => next.plaintiff_offer = amount,
                    Side::Defendant => next.defendant_offer = amount,
                }
            }
            Filing::ExpertReport { damages_change } => {
                next.expected_judgment = (next.expected_judgment + damages_change).max(0.0);
            }
            Filing::SummaryJudgment { .. } | Filing::Other => {}
        }
        next.win_probability = (next.win_probability + filing.win_probability_shift())
            .clamp(MIN_WIN_PROBABILITY, MAX_WIN_PROBABILITY);
        next.validate()?;
        Ok(next)
    }
}

/// Outcome of re-running the optimizer after a filing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reassessment {
    pub strategy: Strategy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_strategy: Option<Strategy>,
    pub strategy_changed: bool,
    pub scenario: SettlementScenario,
    pub analysis: SettlementAnalysis,
}

/// Apply `filing` to `scenario` and re-run the settlement optimizer.
///
/// `strategy_changed` is only true when a previous strategy is known and
/// differs from the new one.
pub fn reassess(
    scenario: &SettlementScenario,
    previous: Option<Strategy>,
    filing: &Filing,
    config: &EngineConfig,
) -> Result<Reassessment> {
    let revised = scenario.revise(filing)?;
    let analysis = settlement::optimize(&revised, config)?;
    let strategy = analysis.strategy;
    log::debug!(
        "reassessed after {:?}: win probability {:.2} -> {:.2}, strategy {}",
        filing,
        scenario.win_probability,
        revised.win_probability,
        strategy
    );
    Ok(Reassessment {
        strategy,
        previous_strategy: previous,
        strategy_changed: previous.is_some_and(|p| p != strategy),
        scenario: revised,
        analysis,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_summary_judgment_shifts() {
        let base = fixtures::reference_scenario();
        let cases = [
            (true, Side::Plaintiff, 0.95),
            (true, Side::Defendant, 0.35),
            (false, Side::Defendant, 0.75),
            (false, Side::Plaintiff, 0.55),
        ];
        for (granted, movant, expected) in cases {
            let next = base.revise(&Filing::SummaryJudgment { granted, movant }).unwrap();
            assert!(
                (next.win_probability - expected).abs() < 1e-12,
                "{:?}/{:?}: {}",
                granted,
                movant,
                next.win_probability
            );
        }
    }

    #[test]
    fn test_probability_clamped_even_without_shift() {
        let base = SettlementScenario {
            win_probability: 1.0,
            ..fixtures::reference_scenario()
        };
        let next = base.revise(&Filing::Other).unwrap();
        assert_eq!(next.win_probability, 0.95);
    }

    #[test]
    fn test_offer_and_expert_revisions() {
        let base = fixtures::reference_scenario();
        let offer = base
            .revise(&Filing::SettlementOffer {
                side: Side::Defendant,
                amount: 60_000.0,
            })
            .unwrap();
        assert_eq!(offer.defendant_offer, 60_000.0);
        assert_eq!(offer.plaintiff_offer, base.plaintiff_offer);

        let expert = base
            .revise(&Filing::ExpertReport {
                damages_change: -150_000.0,
            })
            .unwrap();
        assert_eq!(expert.expected_judgment, 0.0);

        let err = base
            .revise(&Filing::SettlementOffer {
                side: Side::Plaintiff,
                amount: -1.0,
            })
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { field: "amount", .. }));
    }

    #[test]
    fn test_granted_plaintiff_motion_flips_to_mixed() {
        // 0.95 * 100k - 25k = 70k now beats the 50k offer
        let result = reassess(
            &fixtures::reference_scenario(),
            Some(Strategy::Settle),
            &Filing::SummaryJudgment {
                granted: true,
                movant: Side::Plaintiff,
            },
            &EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(result.strategy, Strategy::Mixed);
        assert!(result.strategy_changed);
        assert_eq!(result.previous_strategy, Some(Strategy::Settle));
    }

    #[test]
    fn test_unknown_previous_is_never_a_change() {
        let result = reassess(
            &fixtures::reference_scenario(),
            None,
            &Filing::Other,
            &EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(result.strategy, Strategy::Settle);
        assert!(!result.strategy_changed);
    }

    #[test]
    fn test_filing_json_shape() {
        let filing: Filing =
            serde_json::from_str(r#"{"type": "summaryJudgment", "granted": true, "movant": "defendant"}"#)
                .unwrap();
        assert_eq!(
            filing,
            Filing::SummaryJudgment {
                granted: true,
                movant: Side::Defendant
            }
        );
        let filing: Filing =
            serde_json::from_str(r#"{"type": "expertReport", "damagesChange": 5000}"#).unwrap();
        assert_eq!(filing, Filing::ExpertReport { damages_change: 5_000.0 });
    }
}
