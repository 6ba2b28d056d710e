//! labelcheck: ingest prescribing-information documents and verify
//! promotional claims against them.
//!
//! Every action runs to completion before the next one starts; the
//! `session` subcommand keeps one workflow state alive across many claims.

mod console;
mod logging;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use labelcheck_client::{Config, HttpBackend, VerifyEndpoint};
use labelcheck_core::{CollectionBinding, Error, UploadedDocument, VerificationResult};
use labelcheck_workflow::{render, IngestBatch, IngestReport, Session, StageOutcome, Verifier};

use console::ConsoleProgress;

#[derive(Parser, Debug)]
#[command(name = "labelcheck")]
#[command(author, version, about = "Verify promotional claims against drug label documents")]
#[command(propagate_version = true)]
struct Cli {
    /// TOML configuration file (default: $LABELCHECK_CONFIG or environment)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Verification endpoint: hybrid or single
    #[arg(long, global = true)]
    endpoint: Option<VerifyEndpoint>,

    /// Number of passages the backend retrieves per claim
    #[arg(long, global = true)]
    top_k: Option<u32>,

    /// Use this collection instead of resolving one from filenames
    #[arg(long, global = true)]
    collection: Option<String>,

    /// Last page of the secondary document to extract claims from
    #[arg(long, global = true)]
    end_page: Option<u32>,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the collection a primary document filename maps to
    Resolve {
        /// Filename of the first primary document
        filename: String,
    },

    /// Ingest primary documents and an optional secondary document
    Ingest {
        /// Prescribing-information documents (pdf or docx), in order
        #[arg(short, long, required = true, num_args = 1..)]
        primary: Vec<PathBuf>,

        /// Promotional document to extract claims from
        #[arg(short, long)]
        secondary: Option<PathBuf>,
    },

    /// Verify one claim sentence
    Verify {
        /// Print the normalized result as JSON
        #[arg(long)]
        json: bool,

        /// Resolve the collection from this primary filename
        #[arg(long)]
        primary_name: Option<String>,

        /// Claim sentence to verify
        claim: String,
    },

    /// Ingest documents, then verify claims read from stdin one per line
    Session {
        /// Prescribing-information documents (pdf or docx), in order
        #[arg(short, long, num_args = 1..)]
        primary: Vec<PathBuf>,

        /// Promotional document to extract claims from
        #[arg(short, long)]
        secondary: Option<PathBuf>,

        /// Print each result as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let _log_guard = logging::init();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let progress = ConsoleProgress::new(cli.quiet);

    match cli.command {
        Commands::Resolve { filename } => {
            let binding = config.collection.strategy().binding_for(&filename);
            println!("collection: {}", binding.collection_id);
            println!("end_page: {}", binding.end_page);
        }
        Commands::Ingest { primary, secondary } => {
            cmd_ingest(&config, &progress, &primary, secondary.as_deref()).await?;
        }
        Commands::Verify {
            json,
            primary_name,
            claim,
        } => {
            cmd_verify(&config, &progress, primary_name.as_deref(), &claim, json).await?;
        }
        Commands::Session {
            primary,
            secondary,
            json,
        } => {
            cmd_session(&config, &progress, &primary, secondary.as_deref(), json).await?;
        }
    }
    Ok(())
}

/// Loaded configuration with command-line overrides applied.
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load().context("loading configuration")?,
    };

    if let Some(url) = &cli.base_url {
        config.api.base_url = url.clone();
    }
    if let Some(endpoint) = cli.endpoint {
        config.api.verify_endpoint = endpoint;
    }
    if let Some(top_k) = cli.top_k {
        config.api.top_k = Some(top_k);
    }
    if let Some(end_page) = cli.end_page {
        config.collection.end_page = end_page;
    }
    if let Some(collection) = &cli.collection {
        config.collection.select(collection.clone());
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Read and check every document before any network call.
fn load_documents(
    primary: &[PathBuf],
    secondary: Option<&Path>,
) -> anyhow::Result<(Vec<UploadedDocument>, Option<UploadedDocument>)> {
    let primary = primary
        .iter()
        .map(|path| {
            UploadedDocument::from_path(path).with_context(|| format!("reading {}", path.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    let secondary = secondary
        .map(|path| {
            UploadedDocument::from_path(path).with_context(|| format!("reading {}", path.display()))
        })
        .transpose()?;
    Ok((primary, secondary))
}

async fn cmd_ingest(
    config: &Config,
    progress: &ConsoleProgress,
    primary: &[PathBuf],
    secondary: Option<&Path>,
) -> anyhow::Result<()> {
    let (primary, secondary) = load_documents(primary, secondary)?;
    let backend = HttpBackend::new(config.api.clone())?;
    let mut session =
        Session::new(&backend, config.collection.strategy()).with_progress(progress);

    let report = session
        .ingest(IngestBatch::new(&primary, secondary.as_ref()))
        .await?;
    print_ingest_report(&report, session.collection());
    Ok(())
}

async fn cmd_verify(
    config: &Config,
    progress: &ConsoleProgress,
    primary_name: Option<&str>,
    claim: &str,
    json: bool,
) -> anyhow::Result<()> {
    let strategy = config.collection.strategy();
    let binding = match (strategy.preselected(), primary_name) {
        (Some(binding), _) => binding.clone(),
        (None, Some(name)) => strategy.binding_for(name),
        (None, None) => bail!("verify needs --collection or --primary-name to pick a collection"),
    };

    let backend = HttpBackend::new(config.api.clone())?;
    let result = Verifier::new(&backend)
        .with_progress(progress)
        .verify(claim, &binding.collection_id)
        .await?;
    print_result(&result, json)
}

async fn cmd_session(
    config: &Config,
    progress: &ConsoleProgress,
    primary: &[PathBuf],
    secondary: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let (primary, secondary) = load_documents(primary, secondary)?;
    let backend = HttpBackend::new(config.api.clone())?;
    let mut session =
        Session::new(&backend, config.collection.strategy()).with_progress(progress);
    info!(session_id = %session.id(), "Session started");

    if !primary.is_empty() || secondary.is_some() {
        match session
            .ingest(IngestBatch::new(&primary, secondary.as_ref()))
            .await
        {
            Ok(report) => print_ingest_report(&report, session.collection()),
            Err(e) => {
                error!(session_id = %session.id(), error = %e, "Ingestion failed");
                eprintln!("Error: {}", e);
            }
        }
    }

    let Some(binding) = session.collection() else {
        bail!("no collection available; ingest a primary document or pass --collection");
    };
    eprintln!(
        "Verifying claims against {}. One claim per line, Ctrl-D to finish.",
        binding.collection_id
    );

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        eprint!("claim> ");
        io::stderr().flush().ok();
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("reading claim from stdin")?;

        match session.verify(&line).await {
            Ok(result) => print_result(&result, json)?,
            Err(Error::EmptyInput(message)) => eprintln!("Warning: {}", message),
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    info!(session_id = %session.id(), phase = %session.phase(), "Session ended");
    Ok(())
}

fn print_result(result: &VerificationResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        print!("{}", render(result));
    }
    Ok(())
}

fn print_ingest_report(report: &IngestReport, binding: Option<&CollectionBinding>) {
    if let Some(binding) = binding {
        println!(
            "collection: {} (end_page {})",
            binding.collection_id, binding.end_page
        );
    }
    println!("primary: {}", describe(report.primary));
    println!("secondary: {}", describe(report.secondary));
}

fn describe(outcome: StageOutcome) -> String {
    match outcome {
        StageOutcome::Completed { documents: 1 } => "processed 1 document".to_string(),
        StageOutcome::Completed { documents } => format!("processed {} documents", documents),
        StageOutcome::AlreadyDone => "already processed".to_string(),
        StageOutcome::NothingSupplied => "nothing supplied".to_string(),
        StageOutcome::AwaitingPrimary => "waiting for primary documents".to_string(),
    }
}
