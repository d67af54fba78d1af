//! CLI command definitions using clap.
//!
//! Two subcommands:
//! - run: execute the benchmark over a model×unit grid, resuming from an
//!   existing results file when present
//! - report: summarize and export a results file without running anything

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// jmlbench - benchmark LLM-generated JML annotations against OpenJML, SpotBugs, and KeY
#[derive(Parser, Debug)]
#[command(name = "jmlbench")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the benchmark over every (model, source-unit) pair
    Run {
        /// Model names to benchmark (repeat for several)
        #[arg(short, long, required = true)]
        model: Vec<String>,

        /// Directory of .java source units
        #[arg(short, long, default_value = "test-cases")]
        test_cases: PathBuf,

        /// Results JSONL file (resumed when it already exists)
        #[arg(short, long, default_value = "results/results.jsonl")]
        results: PathBuf,

        /// Override the verification retry ceiling from config
        #[arg(long)]
        max_retries: Option<u32>,

        /// Override the number of jobs in flight from config
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Override the generator base URL from config
        #[arg(long)]
        ollama_url: Option<String>,
    },

    /// Summarize an existing results file and export CSV + code artifacts
    Report {
        /// Results JSONL file to summarize
        #[arg(short, long, default_value = "results/results.jsonl")]
        results: PathBuf,

        /// Write a CSV table next to the summary
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write annotated source artifacts under this directory
        #[arg(long)]
        code_dir: Option<PathBuf>,
    },
}
