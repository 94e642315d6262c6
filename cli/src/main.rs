//! CLI for the ML issue miner.
//!
//! Runs one stage of the dataset pipeline per invocation.

use clap::{Parser, Subcommand};
use ml_issue_miner::{load_config, Runner, RunnerConfig, RunnerError, Stage, StageSummary};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// ML Issue Miner - Build a balanced ML vs non-ML bug dataset from GitHub.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to pipeline.toml. Built-in defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory, overriding the one in the config.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// GitHub Personal Access Token.
    #[arg(long, env = "GITHUB_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download metadata of the seed repositories.
    CollectRepos {
        /// Seed repository-metadata CSV.
        #[arg(long)]
        seed: Option<PathBuf>,
    },
    /// Rebuild the repository table from saved metadata.
    TabulateRepos,
    /// Keep repositories meeting the age, star and activity thresholds.
    FilterRepos,
    /// List issue and pull request numbers of each repository.
    ListItems,
    /// Remove pull requests from the issue lists.
    CleanIssues,
    /// Download every issue and its timeline.
    DownloadIssues,
    /// Link issues to the same-repository pull requests referencing them.
    LinkIssues,
    /// Download every linked pull request.
    DownloadPulls,
    /// Keep closed issues with merged pull requests.
    FilterClosed,
    /// Download source files changed by each merged pull request.
    DownloadPrFiles,
    /// Keep issues whose fix imports an ML framework.
    FindImports,
    /// Extract glossary keywords from a saved HTML page.
    ExtractGlossary {
        /// Saved ML glossary page.
        #[arg(long)]
        html: PathBuf,
    },
    /// Keep ML-import issues whose title contains a glossary keyword.
    ScanKeywords,
    /// Read the merge commit of every ML pull request.
    MergeCommits,
    /// Measure line changes and fix duration.
    Measure {
        /// Measure the balanced sample instead of the ML issues.
        #[arg(long)]
        combined: bool,
        /// Input table overriding the default one.
        #[arg(long)]
        input: Option<PathBuf>,
        /// Output table overriding the default one.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Sample as many non-ML issues per project as there are ML issues.
    SampleNonMl,
    /// Build the final analysis table.
    Tabulate,
    /// Check the final dataset for consistency.
    Audit {
        /// Labeling sheet (issue_url, category, kind) to cross-check.
        #[arg(long)]
        labels: Option<PathBuf>,
        /// Required number of issues in each class.
        #[arg(long)]
        expected_per_class: Option<usize>,
    },
}

impl From<Command> for Stage {
    fn from(command: Command) -> Self {
        match command {
            Command::CollectRepos { seed } => Stage::CollectRepos { seed },
            Command::TabulateRepos => Stage::TabulateRepos,
            Command::FilterRepos => Stage::FilterRepos,
            Command::ListItems => Stage::ListItems,
            Command::CleanIssues => Stage::CleanIssues,
            Command::DownloadIssues => Stage::DownloadIssues,
            Command::LinkIssues => Stage::LinkIssues,
            Command::DownloadPulls => Stage::DownloadPulls,
            Command::FilterClosed => Stage::FilterClosed,
            Command::DownloadPrFiles => Stage::DownloadPrFiles,
            Command::FindImports => Stage::FindImports,
            Command::ExtractGlossary { html } => Stage::ExtractGlossary { html },
            Command::ScanKeywords => Stage::ScanKeywords,
            Command::MergeCommits => Stage::MergeCommits,
            Command::Measure {
                combined,
                input,
                output,
            } => Stage::Measure {
                combined,
                input,
                output,
            },
            Command::SampleNonMl => Stage::SampleNonMl,
            Command::Tabulate => Stage::Tabulate,
            Command::Audit {
                labels,
                expected_per_class,
            } => Stage::Audit {
                labels,
                expected_per_class,
            },
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    if rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .is_err()
    {
        warn!("A rustls crypto provider was already installed");
    }

    let args = Args::parse();

    match run(args).await {
        Ok(summary) => {
            print_summary(&summary);

            if summary.has_failures() {
                ExitCode::from(1)
            } else {
                ExitCode::from(0)
            }
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Main execution logic.
async fn run(args: Args) -> Result<StageSummary, RunnerError> {
    let pipeline = load_config(args.config.as_deref())?;
    let mut config = RunnerConfig::new(pipeline).with_token(args.token);
    if let Some(data_dir) = args.data_dir {
        config = config.with_data_dir(data_dir);
    }

    let stage = Stage::from(args.command);
    if stage.is_online() && config.token().is_none() {
        warn!("GITHUB_TOKEN not set, requests are limited to 60 per hour");
    }

    let runner = Runner::new(config)?;
    runner.run(&stage).await
}

/// Prints the stage summary.
fn print_summary(summary: &StageSummary) {
    println!("\nSummary ({}):", summary.stage);
    println!("  Records read: {}", summary.read);
    println!("  Written: {}", summary.written);
    println!("  Skipped: {}", summary.skipped);
    println!("  Failed: {}", summary.failed);

    if !summary.violations.is_empty() {
        println!("  Violations:");
        for violation in &summary.violations {
            println!("    - {violation}");
        }
    }
}
