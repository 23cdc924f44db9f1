use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use xrefdb::config::Config;
use xrefdb::error::Error;
use xrefdb::fetch::{FileFetcher, fetch_anchor_data};

#[derive(Parser)]
#[command(name = "xrefdb", about = "Compile spec anchor data into cross-reference indices")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Log per-spec detail
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every anchor stored under a linking text
    Lookup {
        /// Linking text to look up
        text: String,
        /// Index directory (defaults to `output` from .xrefdb.toml)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Rebuild every index from an anchor-data snapshot
    Update {
        /// Compute everything but write nothing
        #[arg(long)]
        dry_run: bool,
        /// Anchor-data snapshot (defaults to `input` from .xrefdb.toml)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Index directory (defaults to `output` from .xrefdb.toml)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Lookup { text, output } => cmd_lookup(&text, output),
        Commands::Update { dry_run, input, output } => cmd_update(dry_run, input, output),
    };

    return match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        },
    };
}

/// Scan the shard for `text` and print each anchor as one block.
///
/// # Errors
///
/// Returns errors from config loading or shard reading.
fn cmd_lookup(text: &str, output: Option<PathBuf>) -> Result<(), Error> {
    let config = Config::load(&PathBuf::from("."))?;
    let output = output.unwrap_or(config.output);

    let records = xrefdb::lookup::lookup(&output, text, config.shard_key_length)?;
    if records.is_empty() {
        println!("No anchors for `{text}`");
        return Ok(());
    }

    for record in &records {
        println!("{} {} ({}, {})", record.kind, record.url, record.spec, record.status);
        if !record.for_contexts.is_empty() {
            println!("    for: {}", record.for_contexts.join(", "));
        }
    }
    let count = records.len();
    println!("{count} anchors");
    return Ok(());
}

/// Fetch the snapshot, compile it, and report what was written.
///
/// # Errors
///
/// Returns errors from config loading, fetching, compiling, or writing.
fn cmd_update(dry_run: bool, input: Option<PathBuf>, output: Option<PathBuf>) -> Result<(), Error> {
    let config = Config::load(&PathBuf::from("."))?;
    let input = input.unwrap_or(config.input);
    let output = output.unwrap_or(config.output);

    let raw = fetch_anchor_data(&FileFetcher::new(input))?;
    let summary = xrefdb::compile_with(raw, &output, dry_run, config.shard_key_length)?;

    let verb = if summary.dry_run { "Would write" } else { "Wrote" };
    println!(
        "{verb} {} files for {} specs ({} anchors) to {}",
        summary.artifacts.len(),
        summary.specs,
        summary.anchors,
        output.display()
    );
    return Ok(());
}

/// Log to stderr. `RUST_LOG` wins over `--verbose`.
fn setup_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "xrefdb=debug" } else { "xrefdb=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| return EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
