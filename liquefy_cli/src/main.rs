//! # Liquefy CLI Application
//!
//! Reads one JSON request (a single analysis or a CSR/CRR screening pair),
//! runs it through liquefy_core, and prints a report or JSON.
//!
//! ```bash
//! liquefy request.json
//! liquefy --settings settings.json --json request.json
//! cat request.json | liquefy -v
//! ```
//!
//! Logging goes to stderr; `RUST_LOG` overrides the `-v` level.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use liquefy_cli::{execute, load_request, load_settings, report};

#[derive(Parser)]
#[command(name = "liquefy", version, about = "Liquefaction triggering analysis (CSR / CRR)")]
struct Cli {
    /// Request JSON file (reads stdin when omitted or "-")
    #[arg(value_name = "REQUEST")]
    input: Option<PathBuf>,

    /// Analysis settings JSON (partial documents override defaults)
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Print machine-readable JSON instead of a report
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let loaded = load_settings(cli.settings.as_deref())
        .and_then(|settings| load_request(cli.input.as_deref()).map(|request| (settings, request)));
    let (settings, request) = match loaded {
        Ok(pair) => pair,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(2);
        }
    };

    match execute(&request, &settings) {
        Ok(response) => {
            if cli.json {
                match serde_json::to_string_pretty(&response) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        eprintln!("Error: failed to serialize response: {}", e);
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                print!("{}", report::render(&response));
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}
