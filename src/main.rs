//! CLI tool that extracts a PDF's text, has a chat-completion model sort it into
//! fixed categories, and saves the answer as a CSV row.

use anyhow::{Context, Result};
use clap::Parser;
use extractpdfrecord::config::ConfigFile;
use extractpdfrecord::pipeline::{self, RunReport};
use extractpdfrecord::{prompt, Error, RecordConfig, SchemaMode};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit status when the model's reply could not be turned into a record.
const EXIT_UNUSABLE_REPLY: u8 = 2;

/// Exit status for I/O, PDF, network, API and configuration failures.
const EXIT_FAULT: u8 = 1;

#[derive(Parser, Debug)]
#[command(
    name = "extractpdfrecord",
    version,
    about = "Categorise a PDF's text with a chat-completion model and save it as one CSV row."
)]
struct Cli {
    /// PDF file to read
    pdf: Option<PathBuf>,

    /// CSV file to write (default: the PDF path with a .csv extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Model identifier
    #[arg(long, env = "MISTRAL_MODEL")]
    model: Option<String>,

    /// API key for the chat-completion endpoint
    #[arg(long, env = "MISTRAL_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// API root; /chat/completions is appended
    #[arg(long, env = "MISTRAL_BASE_URL")]
    base_url: Option<String>,

    /// Read the user prompt from this file instead of the built-in one
    #[arg(long)]
    prompt_file: Option<PathBuf>,

    /// TOML file with default settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Request timeout in seconds (default: wait indefinitely)
    #[arg(long)]
    timeout: Option<u64>,

    /// Write exactly the 25 built-in fields; reject any other key
    #[arg(long)]
    strict_schema: bool,

    /// Print the built-in field list and exit
    #[arg(long)]
    print_fields: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// The command-line and environment layer of the configuration.
    fn layer(&self) -> ConfigFile {
        ConfigFile {
            pdf_path: self.pdf.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            output_path: self.output.clone(),
            prompt: None,
            prompt_file: self.prompt_file.clone(),
            base_url: self.base_url.clone(),
            timeout_secs: self.timeout,
            schema: self.strict_schema.then_some(SchemaMode::Strict),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.print_fields {
        for (i, field) in prompt::FIELDS.iter().enumerate() {
            println!("{:>2}. {}", i + 1, field);
        }
        return ExitCode::SUCCESS;
    }

    match run(&cli) {
        Ok(report) => {
            println!("✅ Data successfully saved to {}", report.output_path.display());
            println!(
                "   {} page(s), {} bytes of text, {} field(s)",
                report.pages,
                report.text_len,
                report.fields.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ Error: {e:#}");
            if let Some(raw) = e.downcast_ref::<Error>().and_then(Error::raw_reply) {
                eprintln!("Raw Response: {raw}");
            }
            ExitCode::from(exit_code(&e))
        }
    }
}

/// `2` when the model's reply could not be turned into a record, `1` for any
/// other failure.
fn exit_code(e: &anyhow::Error) -> u8 {
    match e.downcast_ref::<Error>() {
        Some(err) if err.is_unusable_reply() => EXIT_UNUSABLE_REPLY,
        _ => EXIT_FAULT,
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "extractpdfrecord=info",
        1 => "extractpdfrecord=debug",
        _ => "extractpdfrecord=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Config file (if any), then environment and command line on top.
fn resolve_config(cli: &Cli) -> Result<RecordConfig> {
    let base = match &cli.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    Ok(base.merge(cli.layer()).resolve()?)
}

fn run(cli: &Cli) -> Result<RunReport> {
    let config = resolve_config(cli)?;

    tracing::debug!(
        pdf = %config.pdf_path.display(),
        output = %config.output_path.display(),
        model = %config.model,
        schema = ?config.schema,
        "resolved configuration"
    );

    let report = pipeline::run(&config)
        .with_context(|| format!("processing {}", config.pdf_path.display()))?;
    Ok(report)
}
