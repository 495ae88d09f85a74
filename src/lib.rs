//! Arborist: a grammar-agnostic parsing front-end.
//!
//! A [`Frontend`] drives a grammar's lexer and parser over source text, turns the
//! engine's native parse tree into a uniform [`ParseTreeNode`], and hands back the
//! lexer and parser [`SyntaxError`]s as data. The prediction cache backing adaptive
//! lookahead is shared between parses and kept bounded by a [`CacheGuard`].
//!
//! ```no_run
//! let output = arborist::parse("x = 1 + 2;")?;
//! print!("{}", arborist::stringify(&output.tree, "program"));
//! # Ok::<(), arborist::ArboristError>(())
//! ```

pub use crate::cache::{CacheGuard, PredictionCache, SharedPredictionCache, DEFAULT_CACHE_THRESHOLD};
pub use crate::config::FrontendConfig;
pub use crate::diagnostics::{error_sink, DiagnosticsCollector, ErrorListener, ErrorSink, SyntaxError};
pub use crate::error::{ArboristError, Result};
pub use crate::frontend::{Frontend, Grammar, ParseOutput, TokenizeOutput};
pub use crate::grammars::Calc;
pub use crate::tree::{stringify, Materializer, ParseTreeNode};

pub mod cache;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod frontend;
pub mod grammars;
pub mod runtime;
pub mod tree;

/// Parses `source` with the bundled [`Calc`] grammar on the process-wide cache.
///
/// # Errors
///
/// See [`Frontend::parse`].
pub fn parse(source: &str) -> Result<ParseOutput> {
    Frontend::<Calc>::new().parse(source)
}
