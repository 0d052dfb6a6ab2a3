//! phi-save-codec - inspect and rebuild save entries through the codec guest.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use phi_save_codec_types::RecordKind;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Parse and build phi save entries with a sandboxed codec module.
#[derive(Parser)]
#[command(name = "phi-save-codec")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Codec configuration file (TOML); defaults to PHI_CODEC_* variables
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a binary save entry and print it as JSON
    Parse {
        /// Path to the codec wasm module
        #[arg(short, long)]
        module: PathBuf,

        /// Record kind (user, summary, game_record, game_progress, game_key, settings)
        kind: RecordKind,

        /// Binary save entry
        input: PathBuf,

        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Encode a JSON record into a binary save entry
    Build {
        /// Path to the codec wasm module
        #[arg(short, long)]
        module: PathBuf,

        /// Record kind (user, summary, game_record, game_progress, game_key, settings)
        kind: RecordKind,

        /// JSON record, as produced by `parse`
        input: PathBuf,

        /// Binary output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Parse, rebuild and re-parse an entry, reporting whether it survives
    Roundtrip {
        /// Path to the codec wasm module
        #[arg(short, long)]
        module: PathBuf,

        /// Record kind (user, summary, game_record, game_progress, game_key, settings)
        kind: RecordKind,

        /// Binary save entry
        input: PathBuf,
    },
}

fn setup_logging(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Parse {
            module,
            kind,
            input,
            output,
        } => commands::parse::run(&config, &module, kind, &input, output.as_deref()),
        Commands::Build {
            module,
            kind,
            input,
            output,
        } => commands::build::run(&config, &module, kind, &input, &output),
        Commands::Roundtrip {
            module,
            kind,
            input,
        } => commands::roundtrip::run(&config, &module, kind, &input),
    }
}
