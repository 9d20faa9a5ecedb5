pub mod commands;
pub mod gateway;
pub mod logging;
pub mod source;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use kinocr_core::config::ConfigOverrides;

#[derive(Debug, Parser)]
#[command(
    name = "kinocr",
    about = "Policy number intake CLI",
    long_about = "Validate policy numbers from CSV uploads and submit the results to the intake endpoint.",
    after_help = "Examples:\n  kinocr validate policies.csv\n  kinocr submit policies.csv --endpoint http://localhost:9000/posts\n  kinocr check 345882865 664371495"
)]
pub struct Cli {
    #[arg(long, global = true, value_name = "PATH", help = "Read configuration from this TOML file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Extract and validate policy numbers from a CSV file")]
    Validate {
        file: PathBuf,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Validate a CSV file and submit its policy numbers")]
    Submit {
        file: PathBuf,
        #[arg(long, help = "Override the configured submission endpoint")]
        endpoint: Option<String>,
    },
    #[command(about = "Diagnose individual policy numbers")]
    Check {
        #[arg(required = true)]
        numbers: Vec<String>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    if let Ok(config) = commands::load_config(config_path, ConfigOverrides::default()) {
        logging::init_logging(&config);
    }

    let result = match cli.command {
        Command::Validate { file, json } => commands::validate::run(&file, config_path, json),
        Command::Submit { file, endpoint } => commands::submit::run(&file, config_path, endpoint),
        Command::Check { numbers, json } => commands::check::run(&numbers, json),
        Command::Config => commands::config::run(config_path),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
