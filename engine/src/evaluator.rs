//! Expected-value propagation through decision trees
//!
//! Evaluation is a pure recursion over a borrowed tree: chance nodes average
//! their children by probability, decision nodes take the best child, leaves
//! return their terminal value. Alongside the value, the evaluator reports the
//! policy: which child each decision node on the optimal play picks.

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::node::{DecisionNode, NodeId};
use serde::Serialize;

/// One decision made under optimal play
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyChoice {
    pub node: NodeId,
    pub choice: NodeId,
    pub expected_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeEvaluation {
    pub expected_value: f64,
    /// Decisions reachable under optimal play, in depth-first order
    pub policy: Vec<PolicyChoice>,
}

/// Evaluate `root`, returning its expected value and the optimal policy.
pub fn evaluate(root: &DecisionNode, config: &EngineConfig) -> Result<TreeEvaluation> {
    let (expected_value, policy) = walk(root, 0, config)?;
    log::debug!(
        "tree '{}' ({} nodes): ev {:.4}, {} decisions",
        root.id(),
        root.node_count(),
        expected_value,
        policy.len()
    );
    Ok(TreeEvaluation {
        expected_value,
        policy,
    })
}

/// Expected value of `node` without the policy.
pub fn expected_value(node: &DecisionNode, config: &EngineConfig) -> Result<f64> {
    walk(node, 0, config).map(|(ev, _)| ev)
}

fn walk(node: &DecisionNode, depth: usize, config: &EngineConfig) -> Result<(f64, Vec<PolicyChoice>)> {
    if depth > config.max_tree_depth {
        return Err(EngineError::DepthLimit {
            node: node.id().to_string(),
            max: config.max_tree_depth,
        });
    }

    match (node, node.children().split_first()) {
        (DecisionNode::Chance { children, .. }, Some(_)) => {
            let weights = chance_weights(node, children, config.probability_tolerance)?;
            children.iter().zip(weights).try_fold(
                (0.0, Vec::new()),
                |(ev, mut policy), (child, p)| -> Result<(f64, Vec<PolicyChoice>)> {
                    let (child_ev, child_policy) = walk(child, depth + 1, config)?;
                    policy.extend(child_policy);
                    Ok((ev + p * child_ev, policy))
                },
            )
        }
        (DecisionNode::Decision { id, children, .. }, Some((first, rest))) => {
            let first = (0, walk(first, depth + 1, config)?);
            let (index, (ev, tail)) =
                rest.iter()
                    .enumerate()
                    .try_fold(first, |best, (i, child)| -> Result<_> {
                        let candidate = walk(child, depth + 1, config)?;
                        // Strict comparison: the first maximal child wins ties
                        Ok(if candidate.0 > (best.1).0 {
                            (i + 1, candidate)
                        } else {
                            best
                        })
                    })?;
            let mut policy = Vec::with_capacity(tail.len() + 1);
            policy.push(PolicyChoice {
                node: id.clone(),
                choice: children[index].id().to_string(),
                expected_value: ev,
            });
            policy.extend(tail);
            Ok((ev, policy))
        }
        _ => {
            let value = node.value().ok_or_else(|| EngineError::MissingValue {
                node: node.id().to_string(),
            })?;
            if !value.is_finite() {
                return Err(EngineError::NonFiniteValue {
                    node: node.id().to_string(),
                    value,
                });
            }
            Ok((value, Vec::new()))
        }
    }
}

/// Probabilities of a chance node's children, each in [0, 1] and summing to 1.
fn chance_weights(node: &DecisionNode, children: &[DecisionNode], tolerance: f64) -> Result<Vec<f64>> {
    let weights = children
        .iter()
        .map(|child| {
            let p = child.probability().ok_or_else(|| EngineError::MissingProbability {
                node: node.id().to_string(),
                child: child.id().to_string(),
            })?;
            if !(0.0..=1.0).contains(&p) {
                return Err(EngineError::InvalidProbability {
                    node: node.id().to_string(),
                    child: child.id().to_string(),
                    probability: p,
                });
            }
            Ok(p)
        })
        .collect::<Result<Vec<f64>>>()?;
    let sum: f64 = weights.iter().sum();
    // Negated so a NaN sum is rejected too
    if !((sum - 1.0).abs() <= tolerance) {
        return Err(EngineError::Probability {
            node: node.id().to_string(),
            sum,
        });
    }
    Ok(weights)
}
