//! The Arborist Command-Line Interface.
//!
//! This module is the main entry point for all CLI commands and orchestrates
//! the front-end with the bundled calc grammar. Commands exit with status 1 when
//! any syntax error was collected or a fatal error occurred.

use crate::cli::args::{ArboristArgs, Command};
use crate::cli::diagnostics::{print_diagnostic_to_stderr, Stage, SyntaxDiagnostic};
use crate::config::FrontendConfig;
use crate::error::{ArboristError, Result};
use crate::frontend::{Frontend, ParseOutput};
use crate::grammars::calc::VOCABULARY;
use crate::grammars::Calc;
use crate::tree::stringify;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::{fs, process};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

pub mod args;
pub mod diagnostics;
pub mod output;

/// File extension `check` looks for when walking directories.
pub const SOURCE_EXTENSION: &str = "calc";

/// The main entry point for the CLI.
pub fn run() {
    init_logging();
    let args = ArboristArgs::parse();

    let outcome = frontend(&args).and_then(|frontend| match &args.command {
        Command::Parse { file, json, label } => {
            handle_parse(&frontend, file, *json, label.as_deref())
        }
        Command::Tokens { file } => handle_tokens(&frontend, file),
        Command::Check { path } => handle_check(&frontend, path),
        Command::Diff { left, right, label } => {
            handle_diff(&frontend, left, right, label.as_deref())
        }
    });

    match outcome {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            print_error(e);
            process::exit(1);
        }
    }
}

/// Logs go to stderr, filtered by `RUST_LOG`.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

/// Renders a fatal error with miette.
pub fn print_error(error: ArboristError) {
    let report = miette::Report::new(error);
    eprintln!("{report:?}");
}

fn frontend(args: &ArboristArgs) -> Result<Frontend<Calc>> {
    let mut config = match &args.config {
        Some(path) => FrontendConfig::from_path(path)?,
        None => FrontendConfig::default(),
    };
    if let Some(rule) = &args.rule {
        config = config.with_start_rule(rule.clone());
    }
    debug!(?config, "front-end configuration");
    Ok(Frontend::new().config(config))
}

// ============================================================================
// COMMAND HANDLERS - each returns whether the run was clean
// ============================================================================

fn handle_parse(
    frontend: &Frontend<Calc>,
    file: &Path,
    json: bool,
    label: Option<&str>,
) -> Result<bool> {
    let source = read_file(file)?;
    let output = frontend.parse(&source)?;
    if json {
        output::print_json(&output)?;
    } else {
        print!("{}", stringify(&output.tree, label.unwrap_or(frontend.start_rule())));
    }
    report_syntax_errors(file, &source, &output);
    Ok(!output.has_errors())
}

fn handle_tokens(frontend: &Frontend<Calc>, file: &Path) -> Result<bool> {
    let source = read_file(file)?;
    let tokenized = frontend.tokenize(&source)?;
    print!("{}", output::format_tokens(&tokenized.tokens, &VOCABULARY));
    for error in &tokenized.lexer_errors {
        print_diagnostic_to_stderr(&SyntaxDiagnostic::new(Stage::Lexer, error, file, &source));
    }
    Ok(tokenized.lexer_errors.is_empty())
}

fn handle_check(frontend: &Frontend<Calc>, path: &Path) -> Result<bool> {
    let files = discover_sources(path)?;
    let mut failed = 0;
    for file in &files {
        let source = read_file(file)?;
        let output = frontend.parse(&source)?;
        output::print_check_line(file, output.error_count());
        if output.has_errors() {
            failed += 1;
            report_syntax_errors(file, &source, &output);
        }
    }
    output::print_check_summary(files.len(), failed);
    info!(files = files.len(), failed, "check finished");
    Ok(failed == 0)
}

fn handle_diff(
    frontend: &Frontend<Calc>,
    left: &Path,
    right: &Path,
    label: Option<&str>,
) -> Result<bool> {
    let label = label.unwrap_or(frontend.start_rule());
    let left_tree = stringify(&frontend.parse(&read_file(left)?)?.tree, label);
    let right_tree = stringify(&frontend.parse(&read_file(right)?)?.tree, label);
    Ok(!output::print_diff(&left_tree, &right_tree))
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| ArboristError::io(path, e))
}

fn report_syntax_errors(file: &Path, source: &str, output: &ParseOutput) {
    let lexer = output.lexer_errors.iter().map(|e| (Stage::Lexer, e));
    let parser = output.parser_errors.iter().map(|e| (Stage::Parser, e));
    for (stage, error) in lexer.chain(parser) {
        print_diagnostic_to_stderr(&SyntaxDiagnostic::new(stage, error, file, source));
    }
}

/// Source files under `path`, sorted by name. A file given directly is always
/// included, whatever its extension.
fn discover_sources(path: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let failed = e.path().unwrap_or(path).to_path_buf();
            ArboristError::io(failed, e.into())
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_source = entry
            .path()
            .extension()
            .is_some_and(|ext| ext == SOURCE_EXTENSION);
        if entry.depth() == 0 || is_source {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
