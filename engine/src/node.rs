//! Node definitions for litigation decision trees
//!
//! A decision tree is a plain owned tree: every node owns its children and
//! there are no parent back-references. Trees are built by the caller for a
//! single evaluation and are never mutated by the evaluator.

use serde::{Deserialize, Serialize};

/// Caller-assigned node identifier, unique within one tree.
pub type NodeId = String;

/// Which of the three node variants a node is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Decision,
    Chance,
    Outcome,
}

/// Represents a node in a decision tree
///
/// `probability` is only meaningful on children of a chance node, where the
/// siblings' probabilities must sum to 1.0. `value` is required on any node
/// without children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DecisionNode {
    /// The deciding party picks the child with the highest expected value
    Decision {
        id: NodeId,
        label: String,
        /// Probability of reaching this node from a chance parent
        #[serde(default, skip_serializing_if = "Option::is_none")]
        probability: Option<f64>,
        /// Terminal value, used only if the node has no children
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<f64>,
        #[serde(default)]
        children: Vec<DecisionNode>,
    },
    /// Nature picks a child according to the children's probabilities
    Chance {
        id: NodeId,
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        probability: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<f64>,
        #[serde(default)]
        children: Vec<DecisionNode>,
    },
    /// Terminal payoff
    Outcome {
        id: NodeId,
        label: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        probability: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<f64>,
        /// Free-form tag the caller attaches to this outcome (e.g. "settle")
        #[serde(default, skip_serializing_if = "Option::is_none")]
        recommendation: Option<String>,
    },
}

impl DecisionNode {
    pub fn decision(id: impl Into<NodeId>, label: impl Into<String>, children: Vec<DecisionNode>) -> Self {
        DecisionNode::Decision {
            id: id.into(),
            label: label.into(),
            probability: None,
            value: None,
            children,
        }
    }

    pub fn chance(id: impl Into<NodeId>, label: impl Into<String>, children: Vec<DecisionNode>) -> Self {
        DecisionNode::Chance {
            id: id.into(),
            label: label.into(),
            probability: None,
            value: None,
            children,
        }
    }

    pub fn outcome(id: impl Into<NodeId>, label: impl Into<String>, value: f64) -> Self {
        DecisionNode::Outcome {
            id: id.into(),
            label: label.into(),
            probability: None,
            value: Some(value),
            recommendation: None,
        }
    }

    /// Set the probability of reaching this node from its chance parent
    pub fn with_probability(mut self, p: f64) -> Self {
        match &mut self {
            DecisionNode::Decision { probability, .. }
            | DecisionNode::Chance { probability, .. }
            | DecisionNode::Outcome { probability, .. } => *probability = Some(p),
        }
        self
    }

    /// Tag an outcome node; no effect on decision or chance nodes
    pub fn with_recommendation(mut self, tag: impl Into<String>) -> Self {
        if let DecisionNode::Outcome { recommendation, .. } = &mut self {
            *recommendation = Some(tag.into());
        }
        self
    }

    /// Get the node ID
    pub fn id(&self) -> &str {
        match self {
            DecisionNode::Decision { id, .. } => id,
            DecisionNode::Chance { id, .. } => id,
            DecisionNode::Outcome { id, .. } => id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            DecisionNode::Decision { label, .. } => label,
            DecisionNode::Chance { label, .. } => label,
            DecisionNode::Outcome { label, .. } => label,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            DecisionNode::Decision { .. } => NodeKind::Decision,
            DecisionNode::Chance { .. } => NodeKind::Chance,
            DecisionNode::Outcome { .. } => NodeKind::Outcome,
        }
    }

    pub fn probability(&self) -> Option<f64> {
        match self {
            DecisionNode::Decision { probability, .. } => *probability,
            DecisionNode::Chance { probability, .. } => *probability,
            DecisionNode::Outcome { probability, .. } => *probability,
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            DecisionNode::Decision { value, .. } => *value,
            DecisionNode::Chance { value, .. } => *value,
            DecisionNode::Outcome { value, .. } => *value,
        }
    }

    pub fn recommendation(&self) -> Option<&str> {
        match self {
            DecisionNode::Outcome { recommendation, .. } => recommendation.as_deref(),
            _ => None,
        }
    }

    /// Get child nodes (always empty for outcomes)
    pub fn children(&self) -> &[DecisionNode] {
        match self {
            DecisionNode::Decision { children, .. } => children,
            DecisionNode::Chance { children, .. } => children,
            DecisionNode::Outcome { .. } => &[],
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }

    /// Total number of nodes in this subtree
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(DecisionNode::node_count).sum::<usize>()
    }

    /// Number of levels below this node (0 for a leaf)
    pub fn depth(&self) -> usize {
        self.children()
            .iter()
            .map(|c| 1 + c.depth())
            .max()
            .unwrap_or(0)
    }
}
