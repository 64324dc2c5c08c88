//! Two-player payoff matrices and their shape validation
//!
//! A `PayoffMatrix` can only be obtained through `PayoffMatrix::new` (or
//! `from_cells`), so every solver downstream can assume rectangular,
//! equal-sized, finite grids of at least 2x2.

use crate::error::{EngineError, Grid, Result, ShapeError};
use serde::Serialize;

/// Index of a strategy within its player's strategy list.
pub type StrategyIndex = usize;

/// Optional human-readable names for each player's strategies.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyLabels {
    pub rows: Vec<String>,
    pub cols: Vec<String>,
}

/// Validated payoff matrix for a two-player normal-form game.
///
/// Indexed `[row][col]`: player 1 picks the row, player 2 the column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffMatrix {
    payoffs_p1: Vec<Vec<f64>>,
    payoffs_p2: Vec<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    labels: Option<StrategyLabels>,
}

/// Check both grids for identical rectangular shape of at least 2x2.
///
/// Returns `(rows, cols)` on success.
pub fn validate_shape(p1: &[Vec<f64>], p2: &[Vec<f64>]) -> Result<(usize, usize)> {
    if p1.len() != p2.len() {
        return Err(ShapeError::RowCount {
            p1: p1.len(),
            p2: p2.len(),
        }
        .into());
    }
    let rows = p1.len();
    let cols = p1.first().map(Vec::len).unwrap_or(0);

    for (grid, payoffs) in [(Grid::P1, p1), (Grid::P2, p2)] {
        for (row, values) in payoffs.iter().enumerate() {
            if values.len() != cols {
                return Err(ShapeError::RowLength {
                    grid,
                    row,
                    expected: cols,
                    found: values.len(),
                }
                .into());
            }
            if let Some(col) = values.iter().position(|v| !v.is_finite()) {
                return Err(EngineError::NonFinitePayoff { grid, row, col });
            }
        }
    }

    if rows < 2 || cols < 2 {
        return Err(ShapeError::TooSmall { rows, cols }.into());
    }
    Ok((rows, cols))
}

impl PayoffMatrix {
    /// Build a matrix from separate per-player grids.
    pub fn new(payoffs_p1: Vec<Vec<f64>>, payoffs_p2: Vec<Vec<f64>>) -> Result<Self> {
        validate_shape(&payoffs_p1, &payoffs_p2)?;
        Ok(PayoffMatrix {
            payoffs_p1,
            payoffs_p2,
            labels: None,
        })
    }

    /// Build a matrix from cells holding `[p1_payoff, p2_payoff]` pairs.
    pub fn from_cells(cells: &[Vec<[f64; 2]>]) -> Result<Self> {
        let p1 = cells
            .iter()
            .map(|row| row.iter().map(|cell| cell[0]).collect())
            .collect();
        let p2 = cells
            .iter()
            .map(|row| row.iter().map(|cell| cell[1]).collect())
            .collect();
        Self::new(p1, p2)
    }

    /// Attach strategy names. Label counts must match the matrix dimensions.
    pub fn with_labels(mut self, labels: StrategyLabels) -> Result<Self> {
        if labels.rows.len() != self.rows() {
            return Err(ShapeError::LabelCount {
                player: Grid::P1,
                labels: labels.rows.len(),
                strategies: self.rows(),
            }
            .into());
        }
        if labels.cols.len() != self.cols() {
            return Err(ShapeError::LabelCount {
                player: Grid::P2,
                labels: labels.cols.len(),
                strategies: self.cols(),
            }
            .into());
        }
        self.labels = Some(labels);
        Ok(self)
    }

    /// Number of row (player 1) strategies
    pub fn rows(&self) -> usize {
        self.payoffs_p1.len()
    }

    /// Number of column (player 2) strategies
    pub fn cols(&self) -> usize {
        self.payoffs_p1[0].len()
    }

    pub fn is_two_by_two(&self) -> bool {
        self.rows() == 2 && self.cols() == 2
    }

    /// Payoff pair at `(row, col)`
    pub fn payoff(&self, row: StrategyIndex, col: StrategyIndex) -> (f64, f64) {
        (self.payoffs_p1[row][col], self.payoffs_p2[row][col])
    }

    pub fn p1(&self) -> &[Vec<f64>] {
        &self.payoffs_p1
    }

    pub fn p2(&self) -> &[Vec<f64>] {
        &self.payoffs_p2
    }

    pub fn labels(&self) -> Option<&StrategyLabels> {
        self.labels.as_ref()
    }
}
