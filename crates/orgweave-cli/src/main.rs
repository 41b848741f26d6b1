//! orgweave CLI
//!
//! Builds the block manifest for a project and answers address, reference
//! and position queries as JSON.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands, MapDirection};
use commands::Workspace;
use orgweave_engine::position::Position;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(cli.verbose)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    tracing::debug!("Verbose mode enabled");

    let output = match cli.command {
        Commands::Decode { address } => commands::decode(&address)?,
        command => {
            let cwd = std::env::current_dir()?;
            let workspace = Workspace::open(cli.root, &cwd)?;
            execute_command(&workspace, command)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn execute_command(workspace: &Workspace, command: Commands) -> Result<serde_json::Value> {
    match command {
        Commands::Manifest => commands::manifest(workspace),
        Commands::Blocks { document } => commands::blocks(workspace, &document),
        Commands::Resolve { reference, from } => {
            commands::resolve_reference(workspace, &reference, from.as_deref())
        }
        Commands::Decode { address } => commands::decode(&address),
        Commands::Map { direction } => match direction {
            MapDirection::ToBlock {
                document,
                line,
                character,
            } => commands::map_to_block(workspace, &document, Position::new(line, character)),
            MapDirection::ToDocument {
                address,
                line,
                character,
            } => commands::map_to_document(workspace, &address, Position::new(line, character)),
        },
    }
}
