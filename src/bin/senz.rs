//! Senz CLI - Command-line interface for Senz Core
//!
//! Commands:
//! - align: Align sensor timelines onto a primary timeline
//! - refine: Densify a per-scale probability sequence
//! - rank: Rank joint motion/location/sound hypotheses
//! - doctor: Diagnose configuration and environment

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use senz_core::config::Config;
use senz_core::encoder::Envelope;
use senz_core::pipeline::{Operation, SenzProcessor};
use senz_core::{SenzError, PRODUCER_NAME, SENZ_VERSION};

/// Senz - senz timeline alignment, scale refinement and joint ranking
#[derive(Parser)]
#[command(name = "senz")]
#[command(version = SENZ_VERSION)]
#[command(about = "Align, refine and rank senz probability data", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Align secondary timelines onto the primary timeline
    Align(RequestArgs),

    /// Refine a per-scale probability sequence
    Refine(RequestArgs),

    /// Rank joint probability hypotheses
    Rank(RequestArgs),

    /// Diagnose configuration and environment
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct RequestArgs {
    /// Input file path (use - for stdin)
    #[arg(short, long, default_value = "-")]
    input: PathBuf,

    /// Output file path (use - for stdout)
    #[arg(short, long, default_value = "-")]
    output: PathBuf,

    /// Output format
    #[arg(long, default_value = "json")]
    output_format: OutputFormat,

    /// Wrap the result in a {code, message, result} envelope
    #[arg(long)]
    envelope: bool,

    /// Request id recorded in logs
    #[arg(long)]
    request_id: Option<String>,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = Config::load_from(cli.config.as_deref());
    init_tracing(cli.verbose, config.as_ref().ok());

    match run(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so stdout carries only JSON
fn init_tracing(verbose: bool, config: Option<&Config>) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            let directive = config
                .map(Config::effective_log_filter)
                .unwrap_or_else(|| Config::default().effective_log_filter());
            EnvFilter::new(directive)
        })
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn run(cli: Cli, config: Result<Config, SenzError>) -> Result<(), SenzCliError> {
    match cli.command {
        Commands::Align(args) => cmd_request(Operation::Align, &args, config?),
        Commands::Refine(args) => cmd_request(Operation::Refine, &args, config?),
        Commands::Rank(args) => cmd_request(Operation::Rank, &args, config?),
        Commands::Doctor { json } => cmd_doctor(cli.config.as_deref(), config, json),
    }
}

fn cmd_request(op: Operation, args: &RequestArgs, config: Config) -> Result<(), SenzCliError> {
    tracing::debug!(?config, "loaded configuration");

    // Read input
    let input_data = if args.input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(&args.input)?
    };

    if input_data.trim().is_empty() {
        return Err(SenzCliError::EmptyInput);
    }

    let processor = SenzProcessor::with_config(config);
    let envelope = processor.handle(op, &input_data, args.request_id.as_deref());

    let output_data = if args.envelope {
        format_output(&envelope, &args.output_format)?
    } else if envelope.is_success() {
        format_output(&envelope.result, &args.output_format)?
    } else {
        return Err(SenzCliError::Request(envelope));
    };

    if args.output.to_string_lossy() == "-" {
        println!("{}", output_data);
    } else {
        fs::write(&args.output, output_data)?;
    }

    if envelope.is_success() {
        Ok(())
    } else {
        Err(SenzCliError::Request(envelope))
    }
}

fn format_output<T: serde::Serialize>(
    value: &T,
    format: &OutputFormat,
) -> Result<String, SenzCliError> {
    let output = match format {
        OutputFormat::Json => serde_json::to_string(value)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(value)?,
    };
    Ok(output)
}

fn cmd_doctor(
    config_path: Option<&Path>,
    config: Result<Config, SenzError>,
    json: bool,
) -> Result<(), SenzCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "senz_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Senz Core version {}", SENZ_VERSION),
    });

    if let Some(path) = config_path {
        if !path.exists() {
            checks.push(DoctorCheck {
                name: "config_file".to_string(),
                status: CheckStatus::Warning,
                message: format!("Config file {} does not exist", path.display()),
            });
        }
    }

    match &config {
        Ok(config) => checks.push(DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Ok,
            message: format!(
                "app_env={}, log_filter={}, prob_lower_bound={}, max_hypotheses={}",
                config.app_env,
                config.effective_log_filter(),
                config.prob_lower_bound,
                config.max_hypotheses
            ),
        }),
        Err(e) => checks.push(DoctorCheck {
            name: "config".to_string(),
            status: CheckStatus::Error,
            message: e.to_string(),
        }),
    }

    // Check stdin is available (for piped requests)
    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (ready for --input -)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: SENZ_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Senz Doctor Report");
        println!("==================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(SenzCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Error types

#[derive(Debug)]
enum SenzCliError {
    Io(io::Error),
    Config(SenzError),
    Json(serde_json::Error),
    Request(Envelope),
    EmptyInput,
    DoctorFailed,
}

impl From<io::Error> for SenzCliError {
    fn from(e: io::Error) -> Self {
        SenzCliError::Io(e)
    }
}

impl From<SenzError> for SenzCliError {
    fn from(e: SenzError) -> Self {
        SenzCliError::Config(e)
    }
}

impl From<serde_json::Error> for SenzCliError {
    fn from(e: serde_json::Error) -> Self {
        SenzCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<SenzCliError> for CliError {
    fn from(e: SenzCliError) -> Self {
        match e {
            SenzCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            SenzCliError::Config(e) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'senz doctor' to inspect the configuration".to_string()),
            },
            SenzCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            SenzCliError::Request(envelope) if envelope.http_status() == 400 => CliError {
                code: "INVALID_REQUEST".to_string(),
                message: envelope.message,
                hint: Some("Check the request keys for this command".to_string()),
            },
            SenzCliError::Request(envelope) => CliError {
                code: "COMPUTE_ERROR".to_string(),
                message: envelope.message,
                hint: Some("Re-run with --verbose for details".to_string()),
            },
            SenzCliError::EmptyInput => CliError {
                code: "EMPTY_INPUT".to_string(),
                message: "No request found in input".to_string(),
                hint: Some("Ensure input file is not empty".to_string()),
            },
            SenzCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
