//! accord CLI - command-line front end for the accord engine
//!
//! Each analysis subcommand reads one JSON request (from a file, or stdin
//! when no file or `-` is given) and writes the JSON response to stdout.

use accord_engine::api::{self, CoalitionRequest, EquilibriumRequest, ReassessRequest};
use accord_engine::coalition::SynergyValue;
use accord_engine::config::EngineConfig;
use accord_engine::evaluator;
use accord_engine::fixtures;
use accord_engine::node::DecisionNode;
use accord_engine::settlement::SettlementScenario;
use accord_engine::shapley::ShapleyEstimator;
use accord_tree::{LitigationTreeBuilder, MediationTerms};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "accord")]
#[command(about = "Game-theoretic litigation strategy engine")]
#[command(version)]
struct Cli {
    /// Engine configuration (JSON); defaults apply to missing fields
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Log solver details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Nash equilibria of a two-player payoff matrix
    Equilibrium { input: Option<PathBuf> },
    /// Coalition values and Shapley fair split
    Coalitions {
        input: Option<PathBuf>,
        /// Exact Shapley values instead of sampling (at most 16 parties)
        #[arg(long)]
        exact: bool,
    },
    /// Expected value and optimal policy of a decision tree
    Tree { input: Option<PathBuf> },
    /// Settlement strategy for a litigation scenario
    Settle { input: Option<PathBuf> },
    /// Re-run the settlement optimizer after a court filing
    Reassess { input: Option<PathBuf> },
    /// Build and evaluate the decision tree of a litigation scenario
    LitigationTree { input: Option<PathBuf> },
    /// Run benchmarks
    Bench {
        #[command(subcommand)]
        target: BenchTarget,
    },
}

#[derive(Subcommand)]
enum BenchTarget {
    /// Shapley sampler throughput
    Shapley {
        #[arg(default_value_t = 10_000)]
        samples: usize,
        #[arg(long, default_value_t = 12)]
        parties: usize,
    },
}

/// `litigation-tree` request: a scenario plus optional mediation terms
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LitigationTreeRequest {
    scenario: SettlementScenario,
    #[serde(default)]
    mediation: Option<MediationTerms>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LitigationTreeResponse {
    tree: DecisionNode,
    evaluation: evaluator::TreeEvaluation,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let config = load_config(cli.config.as_deref())?;
    log::debug!("engine config: {:?}", config);

    match cli.command {
        Commands::Equilibrium { input } => {
            let request: EquilibriumRequest = read_request(input.as_deref())?;
            emit(&api::solve_equilibrium(request, &config)?, cli.pretty)
        }
        Commands::Coalitions { input, exact } => {
            let mut request: CoalitionRequest = read_request(input.as_deref())?;
            request.exact |= exact;
            emit(&api::analyze_coalitions(&request, &config)?, cli.pretty)
        }
        Commands::Tree { input } => {
            let root: DecisionNode = read_request(input.as_deref())?;
            emit(&api::evaluate_decision_tree(&root, &config)?, cli.pretty)
        }
        Commands::Settle { input } => {
            let scenario: SettlementScenario = read_request(input.as_deref())?;
            emit(&api::optimize_settlement(&scenario, &config)?, cli.pretty)
        }
        Commands::Reassess { input } => {
            let request: ReassessRequest = read_request(input.as_deref())?;
            emit(&api::reassess_settlement(&request, &config)?, cli.pretty)
        }
        Commands::LitigationTree { input } => {
            let request: LitigationTreeRequest = read_request(input.as_deref())?;
            let mut builder = LitigationTreeBuilder::new(request.scenario, &config)?;
            if let Some(terms) = request.mediation {
                builder = builder.with_mediation(terms)?;
            }
            let tree = builder.build();
            let evaluation = evaluator::evaluate(&tree, &config)?;
            emit(&LitigationTreeResponse { tree, evaluation }, cli.pretty)
        }
        Commands::Bench {
            target: BenchTarget::Shapley { samples, parties },
        } => bench_shapley(samples, parties, &config),
    }
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    EngineConfig::from_json(&text).with_context(|| format!("invalid config {}", path.display()))
}

fn read_request<T: DeserializeOwned>(input: Option<&Path>) -> Result<T> {
    match input {
        Some(path) if path != Path::new("-") => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("invalid request in {}", path.display()))
        }
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            serde_json::from_str(&text).context("invalid request on stdin")
        }
    }
}

fn emit<T: Serialize>(response: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(response)?
    } else {
        serde_json::to_string(response)?
    };
    println!("{}", json);
    Ok(())
}

fn bench_shapley(samples: usize, parties: usize, config: &EngineConfig) -> Result<()> {
    println!("Running Shapley sampler benchmark...");
    println!("Parties: {}, samples: {}", parties, samples);

    let parties = fixtures::parties(parties);
    let value_fn = SynergyValue::new(&parties, 1_000_000.0);
    let estimator = ShapleyEstimator::from_config(&config.clone().with_samples(samples))?;

    let start = Instant::now();
    let allocation = estimator.estimate(&parties, &value_fn);
    let elapsed = start.elapsed();
    let per_sec = samples as f64 / elapsed.as_secs_f64().max(f64::EPSILON);

    println!("Results:");
    println!("  Duration: {} ms", elapsed.as_millis());
    println!("  Throughput: {:.2} permutations/sec", per_sec);
    println!("  Allocated: {:.2}", allocation.total());
    Ok(())
}
