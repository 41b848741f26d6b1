//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Inspect source blocks, addresses and cross-references in org documents
#[derive(Parser, Debug)]
#[command(name = "orgweave")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Project root (defaults to the configured root, else the current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print the block manifest for the project
    Manifest,

    /// List the blocks of one document
    Blocks {
        /// Root-relative document path
        document: String,
    },

    /// Resolve a block reference
    ///
    /// Examples:
    ///   orgweave resolve 'lib/utils.org?name=helpers'
    ///   orgweave resolve './utils.org?name=helpers' --from pages/index.org
    Resolve {
        /// `<path>?name=<name>` or a virtual address
        reference: String,

        /// Referencing document path or virtual address
        #[arg(long)]
        from: Option<String>,
    },

    /// Decode a virtual address
    Decode { address: String },

    /// Translate positions between documents and blocks
    Map {
        #[command(subcommand)]
        direction: MapDirection,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum MapDirection {
    /// Document position to block-local position
    ToBlock {
        document: String,
        line: u32,
        character: u32,
    },

    /// Block-local position to document position
    ToDocument {
        address: String,
        line: u32,
        character: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_resolve_with_context() {
        let cli = Cli::try_parse_from([
            "orgweave",
            "resolve",
            "./utils.org?name=helpers",
            "--from",
            "pages/index.org",
            "--root",
            "/notes",
        ])
        .unwrap();

        assert_eq!(cli.root, Some(PathBuf::from("/notes")));
        assert_eq!(
            cli.command,
            Commands::Resolve {
                reference: "./utils.org?name=helpers".into(),
                from: Some("pages/index.org".into()),
            }
        );
    }

    #[test]
    fn parses_map_to_document() {
        let cli = Cli::try_parse_from([
            "orgweave",
            "-v",
            "map",
            "to-document",
            "vaddr:block:default:a.org:0.js",
            "2",
            "4",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(
            cli.command,
            Commands::Map {
                direction: MapDirection::ToDocument {
                    address: "vaddr:block:default:a.org:0.js".into(),
                    line: 2,
                    character: 4,
                }
            }
        );
    }

    #[test]
    fn map_rejects_negative_lines() {
        assert!(Cli::try_parse_from(["orgweave", "map", "to-block", "a.org", "-1", "0"]).is_err());
    }
}
