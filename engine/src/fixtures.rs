//! Canonical games, party sets and trees used by tests and benchmarks
//!
//! Litigation tree (amounts in dollars):
//!   root: Decision  [settle, trial]
//!   settle: Outcome                      50_000
//!   trial:  Chance  [win 0.65, lose 0.35]
//!   win:    Outcome  100_000 - 25_000 =  75_000
//!   lose:   Outcome            -25_000

use crate::coalition::Party;
use crate::matrix::PayoffMatrix;
use crate::node::DecisionNode;
use crate::settlement::SettlementScenario;

/// Interest tags cycled through by `parties`
const TAGS: [&str; 3] = ["injunction", "damages", "precedent"];

fn matrix(p1: &[&[f64]], p2: &[&[f64]]) -> PayoffMatrix {
    let grid = |g: &[&[f64]]| g.iter().map(|row| row.to_vec()).collect();
    PayoffMatrix::new(grid(p1), grid(p2)).expect("fixture matrices are well-formed")
}

/// Row 0 is strictly best for player 1 in every column and column 0 strictly
/// best for player 2 in every row.
pub fn dominant_corner(rows: usize, cols: usize) -> PayoffMatrix {
    let p1 = (0..rows)
        .map(|i| (0..cols).map(|_| (rows - i) as f64).collect())
        .collect();
    let p2 = (0..rows)
        .map(|_| (0..cols).map(|j| (cols - j) as f64).collect())
        .collect();
    PayoffMatrix::new(p1, p2).expect("fixture matrices are well-formed")
}

/// Strategy 0 = cooperate, 1 = defect
pub fn prisoners_dilemma() -> PayoffMatrix {
    matrix(&[&[3.0, 0.0], &[5.0, 1.0]], &[&[3.0, 5.0], &[0.0, 1.0]])
}

pub fn matching_pennies() -> PayoffMatrix {
    matrix(&[&[1.0, -1.0], &[-1.0, 1.0]], &[&[-1.0, 1.0], &[1.0, -1.0]])
}

pub fn battle_of_sexes() -> PayoffMatrix {
    matrix(&[&[2.0, 0.0], &[0.0, 1.0]], &[&[1.0, 0.0], &[0.0, 2.0]])
}

pub fn rock_paper_scissors() -> PayoffMatrix {
    matrix(
        &[&[0.0, -1.0, 1.0], &[1.0, 0.0, -1.0], &[-1.0, 1.0, 0.0]],
        &[&[0.0, 1.0, -1.0], &[-1.0, 0.0, 1.0], &[1.0, -1.0, 0.0]],
    )
}

/// `n` parties `p0..p{n-1}` sharing a "liability" interest, each with one
/// extra tag, and spread-out power and resources.
pub fn parties(n: usize) -> Vec<Party> {
    (0..n)
        .map(|i| {
            Party::new(
                format!("p{}", i),
                format!("Party {}", i),
                10.0 + ((i * 7) % 60) as f64,
                1_000.0 * (i + 1) as f64,
                ["liability", TAGS[i % TAGS.len()]],
            )
            .expect("fixture parties are valid")
        })
        .collect()
}

/// Offers 75k/50k, judgment 100k, 65% win chance, costs 25k/30k
pub fn reference_scenario() -> SettlementScenario {
    SettlementScenario::new(75_000.0, 50_000.0, 100_000.0, 0.65, 25_000.0, 30_000.0, 0.0)
        .expect("fixture scenario is valid")
}

pub fn litigation_tree() -> DecisionNode {
    DecisionNode::decision(
        "root",
        "Plaintiff strategy",
        vec![
            DecisionNode::outcome("settle", "Accept 50k offer", 50_000.0).with_recommendation("settle"),
            DecisionNode::chance(
                "trial",
                "Go to trial",
                vec![
                    DecisionNode::outcome("win", "Win at trial", 75_000.0).with_probability(0.65),
                    DecisionNode::outcome("lose", "Lose at trial", -25_000.0).with_probability(0.35),
                ],
            ),
        ],
    )
}
