//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use arborist::{Calc, Frontend, ParseOutput, SharedPredictionCache};
use walkdir::WalkDir;

pub const FIXTURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

/// A frontend on its own cache, so tests never observe each other.
pub fn isolated() -> Frontend<Calc> {
    Frontend::with_cache(SharedPredictionCache::new())
}

pub fn parse(source: &str) -> ParseOutput {
    isolated().parse(source).expect("parse should not fail fatally")
}

/// `.calc` fixtures, sorted by name.
pub fn fixture_sources() -> Vec<PathBuf> {
    WalkDir::new(FIXTURES)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "calc"))
        .map(|e| e.into_path())
        .collect()
}

/// Diagnostics as `stage: Line L:C message` lines, lexer first.
pub fn render_errors(output: &ParseOutput) -> String {
    let mut out = String::new();
    for error in &output.lexer_errors {
        out.push_str(&format!("lexer: {error}\n"));
    }
    for error in &output.parser_errors {
        out.push_str(&format!("parser: {error}\n"));
    }
    out
}

pub fn sibling(path: &Path, extension: &str) -> PathBuf {
    path.with_extension(extension)
}
