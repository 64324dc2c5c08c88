//! Nash equilibrium solvers for two-player matrix games
//!
//! Pure equilibria are found by exhaustive best-response checks over every
//! cell. Mixed equilibria are only computed in closed form for 2x2 games that
//! have no pure equilibrium.
//!
//! Ties count as best responses: a cell qualifies unless some unilateral
//! deviation *strictly* improves the deviating player's payoff (by more than
//! the configured tolerance).

use crate::config::EngineConfig;
use crate::error::{DegenerateReason, EngineError, Grid, Result};
use crate::matrix::{PayoffMatrix, StrategyIndex};
use serde::Serialize;

/// Below this magnitude an indifference denominator counts as zero.
const DENOMINATOR_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PureEquilibrium {
    pub row: StrategyIndex,
    pub col: StrategyIndex,
    pub p1_payoff: f64,
    pub p2_payoff: f64,
}

/// Interior mixed equilibrium of a 2x2 game.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MixedEquilibrium {
    /// Probability the row player plays strategy 0
    #[serde(rename = "pRow0")]
    pub p: f64,
    /// Probability the column player plays strategy 0
    #[serde(rename = "qCol0")]
    pub q: f64,
    #[serde(rename = "expectedP1")]
    pub expected_p1: f64,
    #[serde(rename = "expectedP2")]
    pub expected_p2: f64,
}

/// Everything `solve` found for one matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EquilibriumReport {
    pub pure_equilibria: Vec<PureEquilibrium>,
    pub mixed_equilibria: Vec<MixedEquilibrium>,
    /// Set when the mixed solver ran and found no valid interior solution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degenerate: Option<DegenerateReason>,
}

impl EquilibriumReport {
    /// True when neither a pure nor a mixed equilibrium was found.
    pub fn is_unstable(&self) -> bool {
        self.pure_equilibria.is_empty() && self.mixed_equilibria.is_empty()
    }
}

/// Is `row` a best response for player 1 against column `col`?
fn row_is_best_response(m: &PayoffMatrix, row: usize, col: usize, tolerance: f64) -> bool {
    let payoff = m.p1()[row][col];
    (0..m.rows()).all(|k| m.p1()[k][col] <= payoff + tolerance)
}

/// Is `col` a best response for player 2 against row `row`?
fn col_is_best_response(m: &PayoffMatrix, row: usize, col: usize, tolerance: f64) -> bool {
    let payoff = m.p2()[row][col];
    (0..m.cols()).all(|k| m.p2()[row][k] <= payoff + tolerance)
}

/// Enumerate every pure-strategy Nash equilibrium in row-major order.
pub fn pure_equilibria(m: &PayoffMatrix, tolerance: f64) -> Vec<PureEquilibrium> {
    let mut found = Vec::new();
    for row in 0..m.rows() {
        for col in 0..m.cols() {
            if row_is_best_response(m, row, col, tolerance)
                && col_is_best_response(m, row, col, tolerance)
            {
                let (p1_payoff, p2_payoff) = m.payoff(row, col);
                found.push(PureEquilibrium {
                    row,
                    col,
                    p1_payoff,
                    p2_payoff,
                });
            }
        }
    }
    found
}

/// Closed-form interior mixed equilibrium of a 2x2 game.
///
/// With player 1 payoffs `[[a,b],[c,d]]` and player 2 payoffs `[[e,f],[g,h]]`:
/// `q = (d-b)/(a-b-c+d)` makes player 1 indifferent between rows and
/// `p = (h-g)/(e-f-g+h)` makes player 2 indifferent between columns.
pub fn mixed_equilibrium(m: &PayoffMatrix) -> Result<MixedEquilibrium> {
    closed_form_mixed(m).map_err(EngineError::DegenerateGame)
}

fn closed_form_mixed(m: &PayoffMatrix) -> std::result::Result<MixedEquilibrium, DegenerateReason> {
    if !m.is_two_by_two() {
        return Err(DegenerateReason::NotTwoByTwo {
            rows: m.rows(),
            cols: m.cols(),
        });
    }
    let [a, b] = [m.p1()[0][0], m.p1()[0][1]];
    let [c, d] = [m.p1()[1][0], m.p1()[1][1]];
    let [e, f] = [m.p2()[0][0], m.p2()[0][1]];
    let [g, h] = [m.p2()[1][0], m.p2()[1][1]];

    let denom_q = a - b - c + d;
    if denom_q.abs() <= DENOMINATOR_EPSILON {
        return Err(DegenerateReason::ZeroDenominator { player: Grid::P1 });
    }
    let denom_p = e - f - g + h;
    if denom_p.abs() <= DENOMINATOR_EPSILON {
        return Err(DegenerateReason::ZeroDenominator { player: Grid::P2 });
    }
    let q = (d - b) / denom_q;
    let p = (h - g) / denom_p;
    if !(0.0..=1.0).contains(&p) || !(0.0..=1.0).contains(&q) {
        return Err(DegenerateReason::OutOfRange { p, q });
    }

    // Probability of each of the four outcome cells
    let weights = [p * q, p * (1.0 - q), (1.0 - p) * q, (1.0 - p) * (1.0 - q)];
    let expected_p1 = weights[0] * a + weights[1] * b + weights[2] * c + weights[3] * d;
    let expected_p2 = weights[0] * e + weights[1] * f + weights[2] * g + weights[3] * h;

    Ok(MixedEquilibrium {
        p,
        q,
        expected_p1,
        expected_p2,
    })
}

/// Run the pure solver, falling back to the 2x2 mixed solver when the game
/// has no pure equilibrium.
///
/// A degenerate mixed game is not an error here: it is reported through
/// `EquilibriumReport::degenerate` so the caller can say "no stable
/// equilibrium" instead of failing.
pub fn solve(m: &PayoffMatrix, config: &EngineConfig) -> EquilibriumReport {
    let pure = pure_equilibria(m, config.best_response_tolerance);
    log::debug!(
        "{}x{} game: {} pure equilibria",
        m.rows(),
        m.cols(),
        pure.len()
    );

    let mut report = EquilibriumReport {
        pure_equilibria: pure,
        mixed_equilibria: Vec::new(),
        degenerate: None,
    };
    if report.pure_equilibria.is_empty() && m.is_two_by_two() {
        match closed_form_mixed(m) {
            Ok(mixed) => report.mixed_equilibria.push(mixed),
            Err(reason) => {
                log::debug!("mixed solver: {}", reason);
                report.degenerate = Some(reason);
            }
        }
    }
    report
}
