//! Defines the command-line arguments and subcommands for the Arborist CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "arborist",
    version,
    about = "Parse calc sources into uniform parse trees and report syntax errors."
)]
pub struct ArboristArgs {
    /// Front-end configuration file (YAML, or JSON with a `.json` extension).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Start rule to parse from, overriding the configuration.
    #[arg(long, global = true, value_name = "RULE")]
    pub rule: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the parse tree of a file.
    Parse {
        /// The path to the source file to parse.
        #[arg(required = true)]
        file: PathBuf,
        /// Print the tree and diagnostics as JSON.
        #[arg(long)]
        json: bool,
        /// Label printed on the first line of the tree (defaults to the start rule).
        #[arg(long)]
        label: Option<String>,
    },
    /// Print the token stream of a file.
    Tokens {
        /// The path to the source file to lex.
        #[arg(required = true)]
        file: PathBuf,
    },
    /// Parse every `.calc` file under a path and report syntax errors.
    Check {
        /// A source file or a directory to search.
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Show a line diff between the parse trees of two files.
    Diff {
        #[arg(required = true)]
        left: PathBuf,
        #[arg(required = true)]
        right: PathBuf,
        /// Label printed on the first line of both trees (defaults to the start rule).
        #[arg(long)]
        label: Option<String>,
    },
}
