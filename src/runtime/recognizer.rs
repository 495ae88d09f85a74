//! Base recognizer state and the lexer/parser contracts grammars implement.

use std::collections::HashMap;

use tracing::trace;

use crate::cache::{CacheGuard, ContextId, SharedPredictionCache};
use crate::diagnostics::{ConsoleErrorListener, ErrorListener};
use crate::error::{ArboristError, Result};

use super::stream::{BufferedTokenStream, CharStream, TokenSource};
use super::token::{Token, TokenType, Vocabulary};
use super::tree::RuleContext;

/// Per-instance view of the shared cache: context ids this recognizer has already
/// resolved, valid for one cache generation.
#[derive(Debug, Default)]
pub struct InterpreterState {
    generation: u64,
    contexts: HashMap<Vec<TokenType>, ContextId>,
}

impl InterpreterState {
    pub fn reset(&mut self) {
        self.contexts.clear();
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

/// State shared by every lexer and parser: the error-listener registry, the
/// injected prediction cache, and the interpreter state derived from it.
pub struct Recognizer {
    listeners: Vec<Box<dyn ErrorListener>>,
    cache: SharedPredictionCache,
    interpreter: InterpreterState,
}

impl std::fmt::Debug for Recognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recognizer")
            .field("listeners", &self.listeners.len())
            .field("cache", &self.cache)
            .field("interpreter", &self.interpreter)
            .finish()
    }
}

impl Recognizer {
    /// Builds recognizer state over `cache`, enforcing `guard` before anything
    /// else happens. Starts with a [`ConsoleErrorListener`] registered.
    ///
    /// # Errors
    ///
    /// Fails if the cache cannot be inspected.
    pub fn new(cache: SharedPredictionCache, guard: CacheGuard) -> Result<Self> {
        let mut interpreter = InterpreterState {
            generation: cache.generation()?,
            contexts: HashMap::new(),
        };
        if guard.enforce(&cache)? {
            interpreter.reset();
            interpreter.generation = cache.generation()?;
        }
        Ok(Self {
            listeners: vec![Box::new(ConsoleErrorListener)],
            cache,
            interpreter,
        })
    }

    pub fn cache(&self) -> &SharedPredictionCache {
        &self.cache
    }

    pub fn interpreter(&self) -> &InterpreterState {
        &self.interpreter
    }

    pub fn add_error_listener(&mut self, listener: Box<dyn ErrorListener>) {
        self.listeners.push(listener);
    }

    pub fn remove_error_listeners(&mut self) {
        self.listeners.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Forwards a syntax error to every registered listener.
    pub fn notify(&mut self, offending: Option<&Token>, line: usize, column: usize, message: &str) {
        for listener in &mut self.listeners {
            listener.syntax_error(offending, line, column, message);
        }
    }

    /// Predicts which alternative of `decision` applies to `lookahead`.
    ///
    /// The lookahead is interned as a context in the shared cache and the decision
    /// outcome recorded there, so later recognizers skip `simulate` for contexts
    /// already seen. `simulate` returns `None` when no alternative is viable; such
    /// outcomes are not recorded.
    ///
    /// # Errors
    ///
    /// Fails if the cache cannot be locked.
    pub fn adaptive_predict<F>(
        &mut self,
        decision: usize,
        lookahead: &[TokenType],
        simulate: F,
    ) -> Result<Option<usize>>
    where
        F: FnOnce(&[TokenType]) -> Option<usize>,
    {
        let interpreter = &mut self.interpreter;
        self.cache.with(|cache| {
            if cache.generation() != interpreter.generation {
                interpreter.reset();
                interpreter.generation = cache.generation();
            }
            let context = match interpreter.contexts.get(lookahead) {
                Some(id) => *id,
                None => {
                    let id = cache.intern(lookahead);
                    interpreter.contexts.insert(lookahead.to_vec(), id);
                    id
                }
            };
            if let Some(alternative) = cache.prediction(decision, context) {
                return Some(alternative);
            }
            let alternative = simulate(lookahead)?;
            cache.record(decision, context, alternative);
            trace!(decision, context, alternative, "prediction recorded");
            Some(alternative)
        })
    }
}

/// A grammar's lexer.
pub trait GrammarLexer: TokenSource + Sized {
    /// Builds a lexer over `input`. Implementations must create their
    /// [`Recognizer`] through [`Recognizer::new`] so the cache guard runs first.
    ///
    /// # Errors
    ///
    /// Fails if the prediction cache is unavailable.
    fn new(input: CharStream, cache: SharedPredictionCache, guard: CacheGuard) -> Result<Self>;

    fn recognizer(&self) -> &Recognizer;

    fn recognizer_mut(&mut self) -> &mut Recognizer;

    fn remove_error_listeners(&mut self) {
        self.recognizer_mut().remove_error_listeners();
    }

    fn add_error_listener(&mut self, listener: Box<dyn ErrorListener>) {
        self.recognizer_mut().add_error_listener(listener);
    }
}

/// A grammar's parser.
pub trait GrammarParser: Sized {
    type Lexer: GrammarLexer;

    /// Builds a parser over `tokens`. Implementations must create their
    /// [`Recognizer`] through [`Recognizer::new`] so the cache guard runs first.
    ///
    /// # Errors
    ///
    /// Fails if the prediction cache is unavailable.
    fn new(
        tokens: BufferedTokenStream<Self::Lexer>,
        cache: SharedPredictionCache,
        guard: CacheGuard,
    ) -> Result<Self>;

    fn recognizer(&self) -> &Recognizer;

    fn recognizer_mut(&mut self) -> &mut Recognizer;

    /// Rule names indexed by rule index.
    fn rule_names(&self) -> &'static [&'static str];

    fn vocabulary(&self) -> &'static Vocabulary;

    /// Runs the entry point for `rule_index` and returns the native parse tree.
    ///
    /// # Errors
    ///
    /// Only contract violations are errors; syntax errors are reported to the
    /// listeners and parsing continues.
    fn invoke_rule(&mut self, rule_index: usize) -> Result<RuleContext>;

    fn tokens_mut(&mut self) -> &mut BufferedTokenStream<Self::Lexer>;

    /// Caps how deeply rule invocations may nest.
    fn set_max_rule_depth(&mut self, depth: usize);

    /// Takes the failure that cut the token stream short, if the lexer hit one.
    fn take_lexer_failure(&mut self) -> Option<ArboristError> {
        self.tokens_mut().source_mut().take_failure()
    }

    fn rule_index(&self, name: &str) -> Option<usize> {
        self.rule_names().iter().position(|rule| *rule == name)
    }

    fn remove_error_listeners(&mut self) {
        self.recognizer_mut().remove_error_listeners();
    }

    fn add_error_listener(&mut self, listener: Box<dyn ErrorListener>) {
        self.recognizer_mut().add_error_listener(listener);
    }
}
