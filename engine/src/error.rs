//! Error taxonomy for every solver in the engine
//!
//! Each variant carries enough structured context (indices, ids, sums) for a
//! collaborator to build its own user-facing message. The engine never
//! formats messages for end users itself.

use serde::Serialize;
use thiserror::Error;

/// Which player's payoff grid an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Grid {
    P1,
    P2,
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Grid::P1 => write!(f, "payoffs_p1"),
            Grid::P2 => write!(f, "payoffs_p2"),
        }
    }
}

/// Malformed payoff matrix dimensions.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ShapeError {
    #[error("row count mismatch: payoffs_p1 has {p1} rows, payoffs_p2 has {p2}")]
    RowCount { p1: usize, p2: usize },

    #[error("{grid} row {row} has {found} columns, expected {expected}")]
    RowLength {
        grid: Grid,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("matrix is {rows}x{cols}, each player needs at least 2 strategies")]
    TooSmall { rows: usize, cols: usize },

    #[error("{player} has {labels} strategy labels for {strategies} strategies")]
    LabelCount {
        player: Grid,
        labels: usize,
        strategies: usize,
    },
}

/// Why no interior mixed equilibrium exists for a 2x2 game.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DegenerateReason {
    /// Mixed solver only handles 2x2 games.
    NotTwoByTwo { rows: usize, cols: usize },
    /// The indifference equation of `player` has no unique solution.
    ZeroDenominator { player: Grid },
    /// The indifference solution lies outside [0, 1].
    OutOfRange { p: f64, q: f64 },
}

impl std::fmt::Display for DegenerateReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DegenerateReason::NotTwoByTwo { rows, cols } => {
                write!(f, "closed-form mixed solution needs a 2x2 game, got {rows}x{cols}")
            }
            DegenerateReason::ZeroDenominator { player } => {
                write!(f, "indifference equation for {player} has a zero denominator")
            }
            DegenerateReason::OutOfRange { p, q } => {
                write!(f, "mixing probabilities p={p}, q={q} fall outside [0, 1]")
            }
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("malformed payoff matrix: {0}")]
    Shape(#[from] ShapeError),

    #[error("non-finite payoff in {grid} at ({row}, {col})")]
    NonFinitePayoff { grid: Grid, row: usize, col: usize },

    #[error("no valid mixed equilibrium: {0}")]
    DegenerateGame(DegenerateReason),

    #[error("children of chance node '{node}' have probabilities summing to {sum}")]
    Probability { node: String, sum: f64 },

    #[error("child '{child}' of chance node '{node}' has no probability")]
    MissingProbability { node: String, child: String },

    #[error("child '{child}' of chance node '{node}' has probability {probability} outside [0, 1]")]
    InvalidProbability {
        node: String,
        child: String,
        probability: f64,
    },

    #[error("leaf node '{node}' has no terminal value")]
    MissingValue { node: String },

    #[error("leaf node '{node}' has non-finite value {value}")]
    NonFiniteValue { node: String, value: f64 },

    #[error("decision tree exceeds the maximum depth of {max} at node '{node}'")]
    DepthLimit { node: String, max: usize },

    #[error("{parties} parties exceed the enumeration cap of {cap}")]
    ScalabilityLimit { parties: usize, cap: usize },

    #[error("invalid party '{id}': {reason}")]
    InvalidParty { id: String, reason: String },

    #[error("invalid input: {field} = {value}")]
    InvalidInput { field: &'static str, value: f64 },
}

impl EngineError {
    /// Recoverable errors signal that the caller should fall back to another
    /// strategy (report "no stable equilibrium", switch to sampling) rather
    /// than treat the call as a bug.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::DegenerateGame(_) | EngineError::ScalabilityLimit { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        let degenerate = EngineError::DegenerateGame(DegenerateReason::ZeroDenominator {
            player: Grid::P1,
        });
        let limit = EngineError::ScalabilityLimit { parties: 25, cap: 20 };
        let missing = EngineError::MissingValue { node: "leaf".into() };
        assert!(degenerate.is_recoverable());
        assert!(limit.is_recoverable());
        assert!(!missing.is_recoverable());
    }

    #[test]
    fn test_shape_error_names_dimension() {
        let err = EngineError::from(ShapeError::RowLength {
            grid: Grid::P2,
            row: 1,
            expected: 3,
            found: 2,
        });
        let msg = err.to_string();
        assert!(msg.contains("payoffs_p2 row 1"), "{}", msg);
        assert!(msg.contains("expected 3"), "{}", msg);
    }
}
