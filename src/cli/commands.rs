//! CLI command definitions for labelforge.
//!
//! One subcommand per pipeline stage: generate the request file from a
//! dataset, estimate its token cost, submit it as a batch job, poll and
//! download batch output, or process it directly with bounded concurrency.

use std::path::PathBuf;

use clap::Parser;

use crate::batch::{BatchGateway, BatchStatus};
use crate::cost;
use crate::engine::{self, RunOutcome};
use crate::error::LlmError;
use crate::generate;
use crate::llm::ChatClient;
use crate::prompts::LabelTask;

/// Default number of simultaneous requests for direct processing.
const DEFAULT_CONCURRENCY: usize = 10;

/// Default Azure API version.
const DEFAULT_AZURE_API_VERSION: &str = "2024-02-15-preview";

/// News labeling pipeline for LLM text classification.
#[derive(Parser)]
#[command(name = "labelforge")]
#[command(about = "Generate, price, submit and process news labeling jobs")]
#[command(version)]
#[command(
    long_about = "labelforge turns a Parquet news dataset into Batch-API request files, estimates their token cost, and runs them either through the asynchronous Batch API or as direct concurrency-bounded requests.\n\nExample usage:\n  labelforge generate -i news.parquet -o batch_input.jsonl -m gpt-5-mini -t clickbait\n  labelforge process -i batch_input.jsonl -o batch_output.jsonl --concurrency 10"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Generate a Batch-API request file from a Parquet dataset.
    #[command(alias = "gen")]
    Generate(GenerateArgs),

    /// Count tokens in a request file and estimate its cost.
    #[command(alias = "est")]
    Estimate(EstimateArgs),

    /// Upload a request file and create a batch job.
    Submit(SubmitArgs),

    /// Check a batch job's status and download its output when completed.
    Status(StatusArgs),

    /// Process a request file directly with bounded concurrency.
    #[command(alias = "proc")]
    Process(ProcessArgs),
}

/// Arguments for `labelforge generate`.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Path to the source Parquet dataset.
    #[arg(short, long)]
    pub input_file: PathBuf,

    /// Path where the generated request file is written.
    #[arg(short, long)]
    pub output_file: PathBuf,

    /// Model to request (e.g. gpt-5-mini).
    #[arg(short, long)]
    pub model: String,

    /// Classification task to generate requests for.
    #[arg(short = 't', long = "task", value_enum)]
    pub task: LabelTask,

    /// Dataset column holding the text to classify.
    #[arg(long, default_value = generate::DEFAULT_TEXT_COLUMN)]
    pub text_column: String,
}

/// Arguments for `labelforge estimate`.
#[derive(Parser, Debug)]
pub struct EstimateArgs {
    /// Path to the request file to analyze.
    #[arg(short, long)]
    pub file: PathBuf,

    /// Tokenizer encoding to count with.
    #[arg(long, default_value = cost::DEFAULT_ENCODING)]
    pub encoding_name: String,

    /// Price in USD per 1 million input tokens.
    #[arg(long)]
    pub input_price: Option<f64>,

    /// Price in USD per 1 million output tokens.
    #[arg(long)]
    pub output_price: Option<f64>,
}

/// Arguments for `labelforge submit`.
#[derive(Parser, Debug)]
pub struct SubmitArgs {
    /// Path to the request file to upload.
    #[arg(short, long)]
    pub file: PathBuf,

    /// Description (metadata) to identify the batch job.
    #[arg(long, default_value = "News labeling")]
    pub job_name: String,

    /// API key (falls back to OPENAI_API_KEY).
    #[arg(long)]
    pub api_key: Option<String>,

    /// Base URL for an OpenAI-compatible endpoint.
    #[arg(long)]
    pub base_url: Option<String>,
}

/// Arguments for `labelforge status`.
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// The batch job id to query (e.g. batch_abc123).
    #[arg(long)]
    pub batch_id: String,

    /// Where to save the results when the job is completed.
    #[arg(short, long)]
    pub output_file: Option<PathBuf>,

    /// API key (falls back to OPENAI_API_KEY).
    #[arg(long)]
    pub api_key: Option<String>,

    /// Base URL for an OpenAI-compatible endpoint.
    #[arg(long)]
    pub base_url: Option<String>,
}

/// Provider selection for direct processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Provider {
    Openai,
    Azure,
}

/// Arguments for `labelforge process`.
#[derive(Parser, Debug)]
pub struct ProcessArgs {
    /// Path to the request file to process.
    #[arg(short, long)]
    pub input_file: PathBuf,

    /// Path where the result file is written.
    #[arg(short, long)]
    pub output_file: PathBuf,

    /// Maximum number of simultaneous requests.
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// API provider.
    #[arg(long, value_enum, default_value = "openai")]
    pub provider: Provider,

    /// API key (falls back to OPENAI_API_KEY or AZURE_OPENAI_API_KEY).
    #[arg(long)]
    pub api_key: Option<String>,

    /// Base URL for the standard OpenAI client.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Azure resource endpoint (e.g. https://my-resource.openai.azure.com/).
    #[arg(long, env = "AZURE_OPENAI_ENDPOINT")]
    pub azure_endpoint: Option<String>,

    /// Azure API version.
    #[arg(long, default_value = DEFAULT_AZURE_API_VERSION)]
    pub api_version: String,

    /// Force this model/deployment name for every request, ignoring the
    /// model field of the request file (common for Azure deployments).
    #[arg(long)]
    pub force_model: Option<String>,
}

/// Parse CLI arguments without running a command.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Parse arguments and run the selected command.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Run the selected command with already-parsed arguments.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate(args) => run_generate(args),
        Commands::Estimate(args) => run_estimate(args),
        Commands::Submit(args) => run_submit(args).await,
        Commands::Status(args) => run_status(args).await,
        Commands::Process(args) => run_process(args).await,
    }
}

fn run_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let written = generate::generate_file(
        &args.input_file,
        &args.output_file,
        &args.model,
        args.task,
        &args.text_column,
    )?;
    println!(
        "Request file '{}' created with {} records.",
        args.output_file.display(),
        written
    );
    Ok(())
}

fn run_estimate(args: EstimateArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.file.exists(),
        "Request file not found: {}",
        args.file.display()
    );

    let estimate = cost::estimate_file(
        &args.file,
        &args.encoding_name,
        args.input_price,
        args.output_price,
    )?;

    let file_name = args
        .file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| args.file.display().to_string());
    println!("{}", estimate.report(&file_name));
    Ok(())
}

async fn run_submit(args: SubmitArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.file.exists(),
        "Request file not found: {}",
        args.file.display()
    );
    let api_key = resolve_api_key(args.api_key)?;

    let gateway = BatchGateway::new(api_key, args.base_url);
    let batch_id = gateway.submit(&args.file, &args.job_name).await?;

    println!("Batch created. Batch ID: {batch_id}");
    println!("Poll it with: labelforge status --batch-id {batch_id}");
    Ok(())
}

async fn run_status(args: StatusArgs) -> anyhow::Result<()> {
    let api_key = resolve_api_key(args.api_key)?;
    let gateway = BatchGateway::new(api_key, args.base_url);

    let job = gateway.poll(&args.batch_id).await?;
    println!("Batch status: {}", job.status);

    match &job.status {
        BatchStatus::Completed => match &args.output_file {
            Some(output) => {
                gateway.fetch_output(&job, output).await?;
                println!("Results saved to '{}'", output.display());
            }
            None => println!("Job is completed; pass --output-file to download the results."),
        },
        BatchStatus::Failed => {
            println!("The batch job failed.");
            if let Some(errors) = &job.errors {
                println!("Reported errors: {errors}");
            }
        }
        status if status.is_pending() => {
            println!("The job is still running; try again later.");
        }
        _ => {}
    }
    Ok(())
}

async fn run_process(args: ProcessArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.input_file.exists(),
        "Request file not found: {}",
        args.input_file.display()
    );
    let api_key = resolve_api_key(args.api_key)?;

    let client = match args.provider {
        Provider::Openai => ChatClient::openai(api_key, args.base_url),
        Provider::Azure => {
            let endpoint = args.azure_endpoint.ok_or(LlmError::MissingEndpoint)?;
            ChatClient::azure(api_key, endpoint, args.api_version)
        }
    };
    tracing::info!(provider = client.provider_name(), "Client configured");

    let outcome = engine::process_file(
        &client,
        &args.input_file,
        &args.output_file,
        args.concurrency,
        args.force_model.as_deref(),
    )
    .await?;

    match outcome {
        RunOutcome::Completed(results) => {
            let failed = results.iter().filter(|r| !r.is_success()).count();
            println!(
                "Completed: {} records ({} succeeded, {} failed). Saved to '{}'",
                results.len(),
                results.len() - failed,
                failed,
                args.output_file.display()
            );
        }
        RunOutcome::Interrupted => {
            println!("Stopped by the operator; no output written.");
        }
    }
    Ok(())
}

/// Resolve the API key flag-first, then from the environment. This is a
/// configuration error when missing, raised before any processing begins.
fn resolve_api_key(flag: Option<String>) -> Result<String, LlmError> {
    flag.or_else(|| std::env::var("OPENAI_API_KEY").ok())
        .or_else(|| std::env::var("AZURE_OPENAI_API_KEY").ok())
        .ok_or(LlmError::MissingApiKey)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_process_defaults() {
        let cli = Cli::try_parse_from([
            "labelforge", "process", "-i", "in.jsonl", "-o", "out.jsonl",
        ])
        .unwrap();
        match cli.command {
            Commands::Process(args) => {
                assert_eq!(args.concurrency, 10);
                assert_eq!(args.provider, Provider::Openai);
                assert_eq!(args.api_version, DEFAULT_AZURE_API_VERSION);
                assert!(args.force_model.is_none());
            }
            _ => panic!("expected process subcommand"),
        }
    }

    #[test]
    fn test_generate_task_parsing() {
        let cli = Cli::try_parse_from([
            "labelforge", "generate", "-i", "news.parquet", "-o", "out.jsonl", "-m", "gpt-5-mini",
            "-t", "sensationalism",
        ])
        .unwrap();
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.task, LabelTask::Sensationalism);
                assert_eq!(args.text_column, "texto");
            }
            _ => panic!("expected generate subcommand"),
        }
    }

    #[test]
    fn test_flag_beats_environment_for_api_key() {
        // The flag value wins regardless of environment state
        let key = resolve_api_key(Some("flag-key".to_string())).unwrap();
        assert_eq!(key, "flag-key");
    }
}
