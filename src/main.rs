use anyhow::{Context, Result};
use brandforge::abstractions::{select_credential_provider, CredentialProvider};
use brandforge::config::{Config, ConfigLoader, OutputFormat};
use brandforge::gemini::GeminiClient;
use brandforge::guide::GuideRenderer;
use brandforge::identity::GenerationInput;
use brandforge::prompt::PromptBuilder;
use brandforge::workflow::{Orchestrator, WorkflowController, WorkflowResult};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, trace};

/// Exit code for a run that finished in the Failed state
const EXIT_RUN_FAILED: i32 = 2;

/// Forge a brand identity and logo mark with generative AI
#[derive(Parser)]
#[command(name = "brandforge")]
#[command(about = "BrandForge - Forge a brand identity and logo from a short description", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a brand identity and logo, then write the brand guide
    Forge {
        #[command(flatten)]
        input: InputArgs,

        /// Where to write the brand guide (default: <company>-brand-guide.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Brand guide format: html, markdown or json
        #[arg(short, long)]
        format: Option<OutputFormat>,
    },
    /// Print the identity prompt without calling any model
    Prompt {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Print the effective configuration
    Config,
}

#[derive(Args, Debug, Clone)]
struct InputArgs {
    /// Working name; the model invents one when omitted
    #[arg(long)]
    name: Option<String>,

    /// Industry or sector (e.g. "Aerospace")
    #[arg(long)]
    sector: String,

    /// What the business does
    #[arg(long)]
    description: String,

    /// Aesthetic style (e.g. "Minimal")
    #[arg(long)]
    style: String,

    /// Who the brand speaks to
    #[arg(long)]
    audience: String,
}

impl From<InputArgs> for GenerationInput {
    fn from(args: InputArgs) -> Self {
        GenerationInput {
            name: args.name,
            sector: args.sector,
            description: args.description,
            style: args.style,
            audience: args.audience,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loader = match &cli.config {
        Some(path) => ConfigLoader::with_path(path),
        None => ConfigLoader::new(),
    };
    let config = loader.load().await;

    let log_level = match cli.verbose {
        0 => config
            .as_ref()
            .map(|c| c.log_level.clone())
            .unwrap_or_else(|_| "info".to_string()),
        1 => "debug".to_string(),
        2 => "trace".to_string(),
        _ => "trace,hyper=debug,reqwest=debug".to_string(), // -vvv shows everything including dependencies
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .with_target(cli.verbose >= 2) // Show target module for -vv and above
        .with_thread_ids(cli.verbose >= 3) // Show thread IDs for -vvv
        .with_line_number(cli.verbose >= 3) // Show line numbers for -vvv
        .init();

    debug!("BrandForge started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    let result = match config {
        Ok(config) => run_command(cli.command, config).await,
        Err(e) => Err(anyhow::Error::new(e).context("Failed to load configuration")),
    };

    match result {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("Fatal error: {:#}", e);
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

async fn run_command(command: Commands, config: Config) -> Result<i32> {
    match command {
        Commands::Forge {
            input,
            output,
            format,
        } => {
            let format = format.unwrap_or(config.output_format);
            run_forge(input.into(), output, format, &config).await
        }
        Commands::Prompt { input } => {
            let input: GenerationInput = input.into();
            input.validate()?;
            let prompt = PromptBuilder::new()?.identity_prompt(&input)?;
            println!("{prompt}");
            Ok(0)
        }
        Commands::Config => {
            let shown = toml::to_string_pretty(&config.redacted())
                .context("Failed to serialize configuration")?;
            print!("{shown}");
            Ok(0)
        }
    }
}

async fn run_forge(
    input: GenerationInput,
    output: Option<PathBuf>,
    format: OutputFormat,
    config: &Config,
) -> Result<i32> {
    input.validate()?;

    let credentials = select_credential_provider(config.api_key.clone());
    if !credentials.has_credential().await {
        credentials
            .prompt_for_credential()
            .await
            .context("An API key is required to forge a brand")?;
    }

    let client = Arc::new(GeminiClient::new(config, credentials.clone())?);
    let orchestrator = Orchestrator::new(client.clone(), client)?
        .with_step_timeout(config.request_timeout());
    let controller = WorkflowController::new(orchestrator);

    println!("Forging brand for the {} sector...", input.sector.trim());
    let snapshot = controller
        .run_with_credential_retry(input, credentials.as_ref())
        .await?;

    if let Some(message) = &snapshot.failure_message {
        eprintln!("❌ Forging failed: {message}");
        return Ok(EXIT_RUN_FAILED);
    }

    let path = write_guide(&snapshot, output, format).await?;
    println!("✅ Brand guide written to {}", path.display());
    Ok(0)
}

async fn write_guide(
    snapshot: &WorkflowResult,
    output: Option<PathBuf>,
    format: OutputFormat,
) -> Result<PathBuf> {
    let rendered = GuideRenderer::new()?.render(snapshot, format)?;

    let path = match output {
        Some(path) => path,
        None => {
            let company = snapshot
                .identity
                .as_ref()
                .map(|identity| identity.company_name.as_str())
                .unwrap_or("brand");
            default_output_path(company, format)
        }
    };

    tokio::fs::write(&path, rendered)
        .await
        .with_context(|| format!("Failed to write brand guide to {}", path.display()))?;
    info!("Wrote {} brand guide to {}", format.extension(), path.display());
    Ok(path)
}

/// `<company-slug>-brand-guide.<ext>` in the current directory
fn default_output_path(company: &str, format: OutputFormat) -> PathBuf {
    let slug = company
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    let slug = if slug.is_empty() { "brand".to_string() } else { slug };
    Path::new(".").join(format!("{slug}-brand-guide.{}", format.extension()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path_slugifies_company() {
        assert_eq!(
            default_output_path("Orbitra Labs, Inc.", OutputFormat::Html),
            Path::new(".").join("orbitra-labs-inc-brand-guide.html")
        );
        assert_eq!(
            default_output_path("★★★", OutputFormat::Markdown),
            Path::new(".").join("brand-brand-guide.md")
        );
    }

    #[test]
    fn test_cli_parses_forge_arguments() {
        let cli = Cli::try_parse_from([
            "brandforge",
            "-vv",
            "forge",
            "--sector",
            "Aerospace",
            "--description",
            "orbital logistics",
            "--style",
            "Minimal",
            "--audience",
            "engineers",
            "--format",
            "md",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Forge { input, format, .. } => {
                assert_eq!(input.sector, "Aerospace");
                assert!(input.name.is_none());
                assert_eq!(format, Some(OutputFormat::Markdown));
            }
            _ => panic!("expected forge"),
        }
    }
}
