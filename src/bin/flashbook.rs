//! flashbook: summarize chapter files from the command line.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use flashbook::config::{Config, Secrets};
use flashbook::{SummaryMode, SummaryRequest, Summarizer};

/// Flashbook CLI
#[derive(Parser)]
#[command(name = "flashbook")]
#[command(version = flashbook::PKG_VERSION)]
#[command(about = "Turn book chapters into structured learning units")]
struct Args {
    /// Path to config file
    #[arg(short, long, env = "FLASHBOOK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Summarize one or more chapter files, printing JSON per file
    Summarize {
        /// Chapter text files
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Summary mode: chapter, concept or law
        #[arg(short, long, default_value = "chapter")]
        mode: SummaryMode,
        /// Chapter title
        #[arg(short, long)]
        title: Option<String>,
        /// Book identifier
        #[arg(short, long)]
        book_id: Option<String>,
        /// File with text preceding the chapter (continuity only)
        #[arg(long)]
        prev_context: Option<PathBuf>,
        /// File with text following the chapter (continuity only)
        #[arg(long)]
        next_context: Option<PathBuf>,
        /// Print cache statistics after the run
        #[arg(long)]
        stats: bool,
    },

    /// Validate config and secrets, then print the resolved settings
    CheckConfig,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(args.config.as_deref())?;
    let secrets = Secrets::load()?;

    match args.command {
        Command::CheckConfig => {
            println!("{}", toml::to_string_pretty(&config)?);
            match secrets.gemini_api_key() {
                Some(_) => println!("# gemini api key: configured"),
                None => println!("# gemini api key: MISSING (set GEMINI_API_KEY or secrets.toml)"),
            }
        }
        Command::Summarize {
            files,
            mode,
            title,
            book_id,
            prev_context,
            next_context,
            stats,
        } => {
            let key = secrets
                .gemini_api_key()
                .ok_or("no Gemini API key: set GEMINI_API_KEY or ~/.flashbook/secrets.toml")?;
            let summarizer = config.builder().gemini(key).build()?;

            let prev = read_optional(prev_context.as_ref())?;
            let next = read_optional(next_context.as_ref())?;

            let mut failures = 0;
            for file in &files {
                let content = std::fs::read_to_string(file)
                    .map_err(|e| format!("failed to read {}: {e}", file.display()))?;

                let mut request = SummaryRequest::new(content).mode(mode);
                request.book_id = book_id.clone();
                request.chapter_title = title.clone();
                request.prev_context = prev.clone();
                request.next_context = next.clone();

                if !summarize_file(&summarizer, file, request).await? {
                    failures += 1;
                }
            }

            if stats {
                eprintln!("{}", serde_json::to_string_pretty(&summarizer.cache_stats().await)?);
            }
            if failures > 0 {
                return Err(format!("{failures} file(s) rejected").into());
            }
        }
    }

    Ok(())
}

/// Summarize one file. Returns false when the request was rejected.
async fn summarize_file(
    summarizer: &Summarizer,
    file: &std::path::Path,
    request: SummaryRequest,
) -> Result<bool, Box<dyn std::error::Error>> {
    match summarizer.handle(request).await {
        Ok(summary) => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(true)
        }
        Err(e) => {
            eprintln!("{}: {e}", file.display());
            Ok(false)
        }
    }
}

fn read_optional(path: Option<&PathBuf>) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    Ok(Some(text))
}
