//! Fatal integration errors.
//!
//! Syntax errors found in the input are never reported through this type; they are
//! collected as [`SyntaxError`](crate::diagnostics::SyntaxError) values. An
//! [`ArboristError`] means the grammar/engine contract was violated (an inconsistent
//! vocabulary, a missing entry point, an unreachable prediction cache) or that the
//! surrounding tooling failed (configuration, IO).

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::runtime::TokenType;

/// Unified error type for every non-recoverable failure in the front-end.
#[derive(Debug, Error, Diagnostic)]
pub enum ArboristError {
    #[error("token type {token_type} has no symbolic name in the grammar vocabulary")]
    #[diagnostic(
        code(arborist::vocabulary),
        help("the lexer produced a token type the vocabulary does not list")
    )]
    UnknownTokenType { token_type: TokenType },

    #[error("rule index {index} is not present in the parser's rule-name table")]
    #[diagnostic(code(arborist::rule_names))]
    UnknownRule { index: usize },

    #[error("grammar has no entry point named `{rule}`")]
    #[diagnostic(code(arborist::entry_point))]
    UnknownEntryPoint { rule: String },

    #[error("shared prediction cache is unavailable")]
    #[diagnostic(
        code(arborist::cache),
        help("a thread panicked while holding the cache; the cache can no longer be inspected")
    )]
    CacheUnavailable,

    #[error("lexer failed at line {line}:{column}: {message}")]
    #[diagnostic(
        code(arborist::scanner),
        help("the token matcher gave up for a reason other than unmatched input, such as too little stack")
    )]
    Scanner {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("invalid configuration: {message}")]
    #[diagnostic(code(arborist::config))]
    Config { message: String },

    #[error("failed to render output: {message}")]
    #[diagnostic(code(arborist::render))]
    Render { message: String },

    #[error("failed to read `{}`", .path.display())]
    #[diagnostic(code(arborist::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ArboristError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        ArboristError::Config {
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ArboristError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = ArboristError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use miette::Report;

    use super::*;

    #[test]
    fn test_messages_name_the_offender() {
        let err = ArboristError::UnknownTokenType { token_type: 42 };
        assert!(err.to_string().contains("42"));

        let err = ArboristError::UnknownEntryPoint {
            rule: "module".to_string(),
        };
        assert_eq!(err.to_string(), "grammar has no entry point named `module`");
    }

    #[test]
    fn test_report_carries_code_and_help() {
        let report = Report::new(ArboristError::CacheUnavailable);
        let output = format!("{report:?}");
        assert!(output.contains("arborist::cache"));
        assert!(output.contains("panicked"));
    }

    #[test]
    fn test_scanner_error_names_position() {
        let err = ArboristError::Scanner {
            line: 3,
            column: 7,
            message: "stack limit reached".to_string(),
        };
        assert_eq!(err.to_string(), "lexer failed at line 3:7: stack limit reached");
        let output = format!("{:?}", Report::new(err));
        assert!(output.contains("arborist::scanner"));
    }

    #[test]
    fn test_io_error_keeps_source() {
        let err = ArboristError::io(
            "missing.calc",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        assert!(err.to_string().contains("missing.calc"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
