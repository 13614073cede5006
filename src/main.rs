//! Tablet Controller Mock CLI
//!
//! Entry point for the `tablet-mock` command-line tool.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tablet_controller_mock::{MockConfig, MockController, Scenario};

#[derive(Parser)]
#[command(name = "tablet-mock")]
#[command(about = "Replay scripted scenarios against a mock tablet controller", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario file and print the report as JSON
    Run {
        /// Scenario file (TOML, or JSON with a .json extension)
        scenario: PathBuf,

        /// Path to a mock config file
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Pretty-print the report
        #[arg(long)]
        pretty: bool,
    },

    /// Print the built-in configuration as TOML
    Defaults,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            scenario,
            config,
            pretty,
        } => {
            run_scenario(scenario, config, pretty);
        }
        Commands::Defaults => {
            print_defaults();
        }
    }
}

fn run_scenario(scenario_path: PathBuf, config_path: Option<PathBuf>, pretty: bool) {
    let config = match config_path {
        Some(path) => match MockConfig::load(&path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                process::exit(1);
            }
        },
        None => MockConfig::default(),
    };

    let scenario = match Scenario::load(&scenario_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading scenario: {}", e);
            process::exit(1);
        }
    };

    let report = scenario.run(&MockController::with_config(&config));
    match report.to_json(pretty) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing report: {}", e);
            process::exit(1);
        }
    }

    // Injected failures are part of a scenario, not a CLI error
    process::exit(0);
}

fn print_defaults() {
    match toml::to_string(&MockConfig::default()) {
        Ok(text) => print!("{}", text),
        Err(e) => {
            eprintln!("Error serializing config: {}", e);
            process::exit(1);
        }
    }
}
