//! sqlweave CLI
//!
//! Generates dialect-specific SQL from JSON payloads.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Injection-safe SQL generation from JSON payloads.
#[derive(Parser)]
#[command(name = "sqlweave")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Target dialect: sqlite, postgresql, mysql, mssql or oracle.
    #[arg(short, long, env = "SQLWEAVE_DIALECT", default_value = "sqlite")]
    dialect: String,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a SELECT, INSERT, UPDATE, DELETE or UPSERT statement.
    Query {
        /// Payload file, or `-` for stdin.
        payload: PathBuf,
    },

    /// Generate a CREATE TABLE statement.
    CreateTable {
        /// Payload file, or `-` for stdin.
        payload: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let output = match cli.command {
        Commands::Query { payload } => {
            let text = sqlweave_cli::read_payload(&payload)?;
            sqlweave_cli::query(&text, &cli.dialect)?
        }
        Commands::CreateTable { payload } => {
            let text = sqlweave_cli::read_payload(&payload)?;
            sqlweave_cli::create_table(&text, &cli.dialect)?
        }
    };

    println!("{}", sqlweave_cli::render_output(&output, cli.pretty)?);
    Ok(())
}
