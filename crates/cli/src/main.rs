// padconv - fixed-width ledger conversion and carry-forward reconciliation

mod error;
mod exit_codes;
mod pipeline;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use padconv_config::{Period, SchemaRegistry, Settings};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use error::CliError;
use exit_codes::{EXIT_DECODE, EXIT_SUCCESS};
use pipeline::{Context, RunOptions};

#[derive(Parser)]
#[command(name = "padconv")]
#[command(about = "Decode fixed-width accounting exports and reconcile carried-forward obligations")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode one period, reconcile it and write every table
    #[command(after_help = "\
Examples:
  padconv run --year 2023 --month 12
  padconv run --year 2023 --month 12 --config /etc/padconv.toml --json
  padconv run --year 2023 --month 6 --no-cache")]
    Run {
        /// Target year; obligations from earlier years are carried forward
        #[arg(long)]
        year: i32,

        /// Reporting month (1-12)
        #[arg(long)]
        month: u32,

        /// Settings file (default: ./padconv.toml, then the user config dir)
        #[arg(long, env = "PADCONV_CONFIG")]
        config: Option<PathBuf>,

        /// Print the run report as JSON on stdout
        #[arg(long)]
        json: bool,

        /// Do not clear or persist the ledger cache
        #[arg(long)]
        no_cache: bool,
    },

    /// Check settings, schemas and the [recon] table without decoding
    Validate {
        #[arg(long, env = "PADCONV_CONFIG")]
        config: Option<PathBuf>,
    },

    /// List the registered record kinds
    Schemas {
        #[arg(long, env = "PADCONV_CONFIG")]
        config: Option<PathBuf>,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (",
        env!("GIT_COMMIT_HASH"),
        ")",
        "\ntarget:  ",
        env!("TARGET"),
    )
}

fn init_logging(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().without_time().with_writer(std::io::stderr))
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            year,
            month,
            config,
            json,
            no_cache,
        } => cmd_run(year, month, config, json, no_cache),
        Commands::Validate { config } => cmd_validate(config),
        Commands::Schemas { config, json } => cmd_schemas(config, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

fn config_path(config: Option<PathBuf>) -> PathBuf {
    config.unwrap_or_else(Settings::default_path)
}

fn cmd_run(year: i32, month: u32, config: Option<PathBuf>, json: bool, no_cache: bool) -> Result<(), CliError> {
    let period = Period::new(year, month).map_err(|e| CliError::usage(e.to_string()))?;
    let path = config_path(config);
    tracing::debug!(config = %path.display(), "loading settings");
    let ctx = Context::load(&path)?;

    let report = pipeline::run(
        &ctx,
        &RunOptions {
            period,
            use_cache: !no_cache,
        },
    )?;

    if json {
        let out = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{out}");
    }
    pipeline::print_report(&report);

    if !report.rejected.is_empty() {
        return Err(CliError::new(
            EXIT_DECODE,
            format!("{} source file(s) rejected", report.rejected.len()),
        ));
    }
    Ok(())
}

fn cmd_validate(config: Option<PathBuf>) -> Result<(), CliError> {
    let path = config_path(config);
    let ctx = Context::load(&path)?;
    eprintln!(
        "ok: {} ({} schema(s), {} source template(s))",
        path.display(),
        ctx.registry.len(),
        ctx.settings.input.sources.len()
    );
    Ok(())
}

#[derive(Serialize)]
struct SchemaListing<'a> {
    kind: &'a str,
    line_length: usize,
    columns: usize,
    derived: usize,
}

fn cmd_schemas(config: Option<PathBuf>, json: bool) -> Result<(), CliError> {
    let path = config_path(config);
    // Built-ins are listable without a settings file
    let registry = if path.exists() {
        SchemaRegistry::load(&Settings::load(&path)?)?
    } else {
        SchemaRegistry::builtin()?
    };

    let listing: Vec<SchemaListing> = registry
        .schemas()
        .map(|s| SchemaListing {
            kind: &s.kind,
            line_length: s.line_length,
            columns: s.columns.len(),
            derived: s.derived.len(),
        })
        .collect();

    if json {
        let out = serde_json::to_string_pretty(&listing)
            .map_err(|e| CliError::general(format!("JSON serialization error: {e}")))?;
        println!("{out}");
    } else {
        println!("{:<10} {:>6} {:>8} {:>8}", "KIND", "LENGTH", "COLUMNS", "DERIVED");
        for s in &listing {
            println!("{:<10} {:>6} {:>8} {:>8}", s.kind, s.line_length, s.columns, s.derived);
        }
    }
    Ok(())
}
