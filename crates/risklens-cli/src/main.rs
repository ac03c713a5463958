//! RiskLens terminal front end.
//!
//! Loads the risk register, wires up the LLM pipeline, and answers
//! questions either interactively (`run`) or one-shot (`ask`).

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use risklens_agent::{
    ChatModel, LlmClient, LlmClientConfig, Pipeline, PipelineConfig, credentials,
};
use risklens_core::{RiskRegister, schema};

mod render;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "risklens",
    version,
    about = "Ask questions of the corporate risk register",
    long_about = "RiskLens answers natural-language questions about a tabular risk \
                  register by classifying the question, filtering the data, and \
                  summarising what remains."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive question session against the register.
    Run(SessionArgs),
    /// Answer a single question and exit.
    Ask {
        /// The question to answer.
        query: String,
        #[command(flatten)]
        session: SessionArgs,
    },
    /// List the register columns and their kinds.
    Columns,
}

#[derive(Args)]
struct SessionArgs {
    /// Path to the risk register CSV.
    #[arg(long, default_value = "data/risk_register.csv")]
    register: PathBuf,

    /// Pipeline configuration file (models, endpoint).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Secrets file to read the API key from when the environment
    /// doesn't provide one.
    #[arg(long)]
    secrets: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(session) => cmd_run(session).await,
        Commands::Ask { query, session } => cmd_ask(&query, session).await,
        Commands::Columns => cmd_columns(),
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

async fn cmd_run(session: SessionArgs) -> Result<()> {
    init_tracing("info");

    let (pipeline, register) = build_session(&session)?;

    println!();
    println!("  RiskLens v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "  {} risks loaded from {}",
        register.len(),
        session.register.display()
    );
    println!("  Ask a question, or type 'help' for commands.");
    render::render_preview(&register);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("failed to read from stdin")?;
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        match query {
            "quit" | "exit" => {
                info!("user requested exit");
                break;
            }
            "help" => {
                print_help();
                continue;
            }
            "columns" => {
                print_columns();
                continue;
            }
            _ => {}
        }

        match pipeline.run(query, &register).await {
            Ok(outcome) => render::render_outcome(&outcome),
            Err(e) => {
                error!(error = %e, "query failed");
                println!("  Error: {e}");
                println!();
            }
        }
    }

    info!("shutting down");
    Ok(())
}

async fn cmd_ask(query: &str, session: SessionArgs) -> Result<()> {
    init_tracing("warn");

    let (pipeline, register) = build_session(&session)?;
    let outcome = pipeline.run(query, &register).await?;
    render::render_outcome(&outcome);
    Ok(())
}

fn cmd_columns() -> Result<()> {
    print_columns();
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Resolve credentials and config, load the register, and build the pipeline.
fn build_session(session: &SessionArgs) -> Result<(Pipeline, RiskRegister)> {
    let api_key = credentials::resolve_api_key(session.secrets.as_deref())
        .context("no usable API key")?;
    let config = PipelineConfig::load_or_default(session.config.as_deref())
        .context("failed to load pipeline configuration")?;
    let register = RiskRegister::from_csv_path(&session.register).with_context(|| {
        format!(
            "failed to load the risk register from {}",
            session.register.display()
        )
    })?;

    let llm: Arc<dyn ChatModel> = Arc::new(LlmClient::new(LlmClientConfig::openai_compatible(
        api_key,
        config.base_url.clone(),
    ))?);

    Ok((Pipeline::new(llm, &config), register))
}

fn print_columns() {
    println!();
    for column in schema::COLUMNS {
        println!("  {:<44} {}", column.name, column.kind);
    }
    println!();
}

fn print_help() {
    println!();
    println!("  Ask any question about the risk register, for example:");
    println!("    show the reputational risks in the north region");
    println!("    summarise the open risks");
    println!("    which risks does the finance team own?");
    println!();
    println!("  Commands:");
    println!("    columns      List the register columns");
    println!("    help         Show this help");
    println!("    quit, exit   Leave RiskLens");
    println!();
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
