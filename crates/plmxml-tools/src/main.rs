use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use env_logger::Env;
use plmxml::CancelToken;

use plmxml_tools::{BomFormat, LoadArgs, OutputFormat, commands, utils};

#[derive(Parser)]
#[command(name = "plmxml")]
#[command(about = "PLMXML product structure inspection tool", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show document summary: header, element counts, roots, diagnostics
    Info {
        #[command(flatten)]
        load: LoadArgs,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print the assembly structure as a tree
    Tree {
        #[command(flatten)]
        load: LoadArgs,

        /// Only show nodes up to this depth (roots are depth 0)
        #[arg(short, long)]
        depth: Option<usize>,
    },

    /// Export the flattened Bill of Materials
    Bom {
        #[command(flatten)]
        load: LoadArgs,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: BomFormat,

        /// Write to this file instead of stdout
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Find nodes by name or id (case-insensitive substring)
    Search {
        #[command(flatten)]
        load: LoadArgs,

        /// Text to look for
        query: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize color handling (respects NO_COLOR)
    utils::color::init_color();

    // Initialize logger with default level (overridden by RUST_LOG)
    let env = Env::default().default_filter_or("warn");
    env_logger::Builder::from_env(env).init();

    // Ctrl+C abandons the load in progress
    let cancel = CancelToken::new();
    let handle = cancel.clone();
    ctrlc::set_handler(move || handle.cancel()).context("Failed to set Ctrl+C handler")?;

    match cli.command {
        Commands::Info { load, format } => commands::info::execute(&load, format, &cancel),
        Commands::Tree { load, depth } => commands::tree::execute(&load, depth, &cancel),
        Commands::Bom {
            load,
            format,
            output,
        } => commands::bom::execute(&load, format, output.as_deref(), &cancel),
        Commands::Search { load, query } => commands::search::execute(&load, &query, &cancel),
    }
}
