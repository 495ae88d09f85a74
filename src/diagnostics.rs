//! Syntax diagnostics.
//!
//! Lexers and parsers report every recoverable problem through the
//! [`ErrorListener`]s registered on them. The engine default,
//! [`ConsoleErrorListener`], prints to stderr; the front-end swaps it for a
//! [`DiagnosticsCollector`] so that problems come back to the caller as
//! [`SyntaxError`] values instead.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::runtime::Token;

/// A single lexical or syntactic problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxError {
    pub message: Option<String>,
    /// 1-based.
    pub line: usize,
    /// 0-based, counted in chars.
    pub column: usize,
}

impl SyntaxError {
    pub fn new(message: Option<String>, line: usize, column: usize) -> Self {
        Self {
            message,
            line,
            column,
        }
    }

    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}:{} {}", self.line, self.column, self.message())
    }
}

/// Receives syntax errors from a recognizer as they happen.
pub trait ErrorListener {
    /// `offending` is the token at fault when there is one. Lexer errors have no
    /// token yet.
    fn syntax_error(&mut self, offending: Option<&Token>, line: usize, column: usize, message: &str);
}

/// Ordered destination of collected errors.
pub type ErrorSink = Rc<RefCell<Vec<SyntaxError>>>;

/// Creates an empty [`ErrorSink`].
pub fn error_sink() -> ErrorSink {
    Rc::new(RefCell::new(Vec::new()))
}

/// Appends every reported error to a caller-supplied sink, in emission order.
#[derive(Debug, Clone)]
pub struct DiagnosticsCollector {
    sink: ErrorSink,
}

impl DiagnosticsCollector {
    pub fn new(sink: ErrorSink) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &ErrorSink {
        &self.sink
    }
}

impl ErrorListener for DiagnosticsCollector {
    fn syntax_error(&mut self, _offending: Option<&Token>, line: usize, column: usize, message: &str) {
        let message = (!message.is_empty()).then(|| message.to_string());
        // A sink the caller is still borrowing drops the error.
        match self.sink.try_borrow_mut() {
            Ok(mut errors) => errors.push(SyntaxError::new(message, line, column)),
            Err(_) => warn!(line, column, "diagnostics sink busy, syntax error dropped"),
        }
    }
}

/// Default listener every recognizer starts with: prints `line L:C message` to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleErrorListener;

impl ErrorListener for ConsoleErrorListener {
    fn syntax_error(&mut self, _offending: Option<&Token>, line: usize, column: usize, message: &str) {
        eprintln!("line {line}:{column} {message}");
    }
}
