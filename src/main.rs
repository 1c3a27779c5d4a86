/*
 * Command-line front end for the reset operation. This layer is deliberately
 * thin: it parses arguments, initializes logging, starts the worker-backed
 * operation and renders the event stream (progress notifications followed by
 * exactly one terminal result). All decisions about paths, backups and
 * identifier generation live in `core`.
 */
mod core;

use crate::core::{
    CoreIdentifierStorage, IdentifierStorageOperations, ResetEvent, ResetOperation, ResetRequest,
    Variant,
};
use clap::{Parser, Subcommand, ValueEnum};
use simplelog::{ColorChoice, Config, LevelFilter, SimpleLogger, TermLogger, TerminalMode};
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "windsurf_reset",
    version,
    about = "Resets Windsurf device identifiers, optionally backing up the configuration first"
)]
struct Cli {
    /// Enable verbose logging output.
    #[arg(long, short = 'v', default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Regenerate the telemetry identifiers and write them back.
    Reset {
        /// Which Windsurf installation to target.
        #[arg(long, value_enum, default_value_t = VariantArg::Stable)]
        variant: VariantArg,

        /// Skip the timestamped backup of the current configuration file.
        #[arg(long, default_value_t = false)]
        no_backup: bool,
    },
    /// Print the telemetry identifiers currently stored.
    Show {
        #[arg(long, value_enum, default_value_t = VariantArg::Stable)]
        variant: VariantArg,
    },
    /// Print the resolved location of the configuration file.
    Path {
        #[arg(long, value_enum, default_value_t = VariantArg::Stable)]
        variant: VariantArg,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum VariantArg {
    Stable,
    Next,
}

impl From<VariantArg> for Variant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Stable => Variant::Stable,
            VariantArg::Next => Variant::Next,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Reset { variant, no_backup } => run_reset(variant.into(), !no_backup),
        Command::Show { variant } => show_identifiers(variant.into()),
        Command::Path { variant } => show_path(variant.into()),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    if TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .is_err()
    {
        let _ = SimpleLogger::init(level, Config::default());
    }
}

/*
 * Runs the reset on its worker thread and renders the event stream. The
 * receiver yields progress lines until the single terminal event arrives; a
 * stream that ends without one means the worker died, which is reported as a
 * failure rather than silently treated as success.
 */
fn run_reset(variant: Variant, create_backup: bool) -> ExitCode {
    println!(
        "Resetting device identifiers for {}...",
        variant.display_name()
    );

    let operation = ResetOperation::with_defaults();
    let receiver = operation.spawn(ResetRequest {
        variant,
        create_backup,
    });

    for event in receiver {
        match event {
            ResetEvent::Progress(progress) => {
                println!("[{:>3}%] {}", progress.percent, progress.stage);
            }
            ResetEvent::Finished(Ok(outcome)) => {
                println!();
                println!("Device identifiers have been reset.");
                if let Some(backup_path) = &outcome.backup_path {
                    println!("Backup created: {}", backup_path.display());
                }
                println!();
                println!("New device identifiers:");
                for (key, value) in outcome.identifiers.entries() {
                    println!("  {key}:\n    {value}");
                }
                println!();
                println!(
                    "If {} misbehaves after the reset, reinstalling it is recommended.",
                    variant.display_name()
                );
                return ExitCode::SUCCESS;
            }
            ResetEvent::Finished(Err(e)) => {
                eprintln!("Error: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    eprintln!("Error: the reset worker terminated without reporting a result.");
    ExitCode::FAILURE
}

fn show_identifiers(variant: Variant) -> ExitCode {
    let operation = ResetOperation::with_defaults();
    match operation.current_identifiers(variant) {
        Ok(Some(identifiers)) if identifiers.is_empty() => {
            println!(
                "No telemetry identifiers stored for {}.",
                variant.display_name()
            );
            ExitCode::SUCCESS
        }
        Ok(Some(identifiers)) => {
            println!("Current device identifiers ({}):", variant.display_name());
            for (key, value) in &identifiers {
                match value.as_str() {
                    Some(text) => println!("  {key}:\n    {text}"),
                    None => println!("  {key}:\n    {value}"),
                }
            }
            ExitCode::SUCCESS
        }
        Ok(None) => {
            println!("Configuration file not found.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn show_path(variant: Variant) -> ExitCode {
    let storage = CoreIdentifierStorage::new();
    match storage.resolve_storage_file(variant) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
