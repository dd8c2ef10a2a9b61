//! Anygraph CLI - normalize raw query results into canonical graph JSON.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use anygraph::backend::QUERY_LANGUAGES;
use anygraph::config::Config;
use anygraph::convert::{converter_for, QueryLanguage};

#[derive(Parser)]
#[command(name = "anygraph")]
#[command(about = "Canonical node/edge graph normalization for heterogeneous query results")]
struct Cli {
    /// Run in verbose mode
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a raw query result document to canonical graph JSON
    Convert {
        /// Query language the result came from
        #[arg(short, long, value_enum)]
        language: QueryLanguage,

        /// Input file with the raw result JSON (stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },
    /// List the supported query languages
    Languages,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Convert {
            language,
            input,
            pretty,
        } => {
            let config = Config::load()?;

            let raw = match input {
                Some(path) => std::fs::read_to_string(path)?,
                None => std::io::read_to_string(std::io::stdin())?,
            };
            let value: serde_json::Value = serde_json::from_str(&raw)?;

            let converter = converter_for(language, &config);
            let data = converter.convert(&value);
            tracing::debug!(
                %language,
                nodes = data.nodes.len(),
                edges = data.edges.len(),
                "conversion complete"
            );

            let output = if pretty {
                serde_json::to_string_pretty(&data)?
            } else {
                serde_json::to_string(&data)?
            };
            println!("{}", output);
        }
        Command::Languages => {
            for info in QUERY_LANGUAGES {
                println!("{}\t{}", info.id, info.name);
            }
        }
    }

    Ok(())
}
