use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use jmlbench::aggregate::{RunAggregator, RunSummary, write_code_artifacts, write_csv};
use jmlbench::cli::{Cli, Commands};
use jmlbench::config::GlobalConfig;
use jmlbench::domain::{ModelHandle, discover_source_units};
use jmlbench::generate::{AnnotationGenerator, OllamaClient};
use jmlbench::runner::RetryPolicy;
use jmlbench::storage::JobStore;
use jmlbench::verify::standard_backends;

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("jmlbench")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("jmlbench.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

async fn run_benchmark(
    config: &GlobalConfig,
    models: &[String],
    test_cases: &Path,
    results: &Path,
    max_retries: Option<u32>,
    jobs: Option<usize>,
    ollama_url: Option<&str>,
) -> Result<()> {
    let base_url = ollama_url.unwrap_or(&config.generator.base_url);
    let max_retries = max_retries.unwrap_or(config.retry.max_retries);
    let max_jobs = jobs.unwrap_or(config.concurrency.max_jobs);
    if max_retries == 0 || max_jobs == 0 {
        eyre::bail!("--max-retries and --jobs must be > 0");
    }

    let units = discover_source_units(test_cases).context("Failed to discover source units")?;
    println!(
        "{} {} source units, {} models, retry ceiling {}",
        "Benchmark:".green(),
        units.len(),
        models.len(),
        max_retries
    );

    let mut generators: Vec<(String, Arc<dyn AnnotationGenerator>)> = Vec::new();
    for name in models {
        let mut handle = ModelHandle::new(name, base_url);
        handle.temperature = config.generator.temperature;
        handle.timeout_secs = config.generator.timeout_secs;
        handle.max_tokens = config.generator.max_tokens;
        let client = OllamaClient::new(handle).context(format!("Failed to build client for model {}", name))?;
        generators.push((name.clone(), Arc::new(client)));
    }

    let backends = standard_backends(&config.backends);
    let policy = RetryPolicy {
        max_retries,
        generator_retries: config.retry.generator_retries,
    };

    let mut store = JobStore::open(results).context(format!("Failed to open results file {}", results.display()))?;

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("{}", "Interrupt received, abandoning in-flight jobs...".yellow());
                cancel.store(true, Ordering::SeqCst);
            }
        });
    }

    let aggregator = RunAggregator::new(generators, backends, policy, max_jobs);
    let result = aggregator.run(&units, &mut store, &cancel).await?;

    let summary = RunSummary::from_result(&result);
    println!("\n{}", summary.render());

    export(&result, results)?;

    if cancel.load(Ordering::SeqCst) {
        println!("{}", "Run interrupted; rerun the same command to resume.".yellow());
    }
    Ok(())
}

fn report(results: &Path, csv: Option<&Path>, code_dir: Option<&Path>) -> Result<()> {
    if !results.exists() {
        eyre::bail!("results file not found: {}", results.display());
    }

    let store = JobStore::open(results)?;
    let result = store.load()?;
    println!("{}", RunSummary::from_result(&result).render());

    if let Some(path) = csv {
        write_csv(&result, path)?;
        println!("{} {}", "CSV written to".green(), path.display());
    }
    if let Some(dir) = code_dir {
        let written = write_code_artifacts(&result, dir)?;
        println!("{} {} files under {}", "Code artifacts:".green(), written, dir.display());
    }
    Ok(())
}

/// Default exports next to the results file: the CSV table and the
/// annotated source artifacts.
fn export(result: &jmlbench::domain::RunResult, results: &Path) -> Result<()> {
    let parent = results.parent().unwrap_or_else(|| Path::new("."));
    write_csv(result, parent.join("results.csv"))?;
    write_code_artifacts(result, parent.join("code"))?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = GlobalConfig::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        Commands::Run {
            model,
            test_cases,
            results,
            max_retries,
            jobs,
            ollama_url,
        } => {
            run_benchmark(
                &config,
                model,
                test_cases,
                results,
                *max_retries,
                *jobs,
                ollama_url.as_deref(),
            )
            .await
            .context("Benchmark run failed")?;
        }
        Commands::Report { results, csv, code_dir } => {
            report(results, csv.as_deref(), code_dir.as_deref()).context("Report failed")?;
        }
    }

    Ok(())
}
