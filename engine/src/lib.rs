//! accord Engine - game-theoretic decision engine
//!
//! This crate contains the solvers behind litigation-strategy analysis:
//! Nash equilibria for two-player payoff matrices, coalition values and
//! Shapley fair splits for multi-party negotiations, expected-value
//! propagation through decision trees, and the settlement optimizer that
//! ties the equilibrium solvers to a concrete case.
//!
//! Every entry point is a pure function of its inputs and an `EngineConfig`.
//! The engine keeps no state between calls and performs no I/O.

pub mod api;
pub mod coalition;
pub mod config;
pub mod equilibrium;
pub mod error;
pub mod evaluator;
pub mod fixtures;
pub mod matrix;
pub mod node;
pub mod revision;
pub mod settlement;
pub mod shapley;

pub use config::EngineConfig;
pub use error::{EngineError, Result};
