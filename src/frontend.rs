//! Parser facade.
//!
//! One [`Frontend::parse`] call drives a grammar's lexer and parser over a string
//! and returns the materialized tree with the lexer and parser diagnostics kept
//! apart. Calls are independent of each other; the only state they share is the
//! prediction cache the frontend was given.

use std::marker::PhantomData;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::SharedPredictionCache;
use crate::config::FrontendConfig;
use crate::diagnostics::{error_sink, DiagnosticsCollector, ErrorSink, SyntaxError};
use crate::error::{ArboristError, Result};
use crate::runtime::{
    BufferedTokenStream, CharStream, GrammarLexer, GrammarParser, Token, TokenSource,
};
use crate::tree::{Materializer, ParseTreeNode};

/// Binds a lexer and a parser into a grammar the front-end can drive.
pub trait Grammar {
    type Lexer: GrammarLexer;
    type Parser: GrammarParser<Lexer = Self::Lexer>;

    /// Rule invoked for a full parse.
    const START_RULE: &'static str;
}

/// Result of one parse call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOutput {
    pub tree: ParseTreeNode,
    pub lexer_errors: Vec<SyntaxError>,
    pub parser_errors: Vec<SyntaxError>,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        !self.lexer_errors.is_empty() || !self.parser_errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.lexer_errors.len() + self.parser_errors.len()
    }

    /// `(tree, (lexer_errors, parser_errors))`.
    pub fn into_parts(self) -> (ParseTreeNode, (Vec<SyntaxError>, Vec<SyntaxError>)) {
        (self.tree, (self.lexer_errors, self.parser_errors))
    }
}

/// Tokens of a whole input plus the lexer's diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizeOutput {
    pub tokens: Vec<Token>,
    pub lexer_errors: Vec<SyntaxError>,
}

/// Drives grammar `G` over source strings.
#[derive(Debug)]
pub struct Frontend<G> {
    cache: SharedPredictionCache,
    config: FrontendConfig,
    grammar: PhantomData<G>,
}

impl<G: Grammar> Default for Frontend<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: Grammar> Clone for Frontend<G> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            config: self.config.clone(),
            grammar: PhantomData,
        }
    }
}

impl<G: Grammar> Frontend<G> {
    /// A frontend on the process-wide prediction cache with default configuration.
    pub fn new() -> Self {
        Self::with_cache(SharedPredictionCache::global())
    }

    /// A frontend on an injected prediction cache.
    pub fn with_cache(cache: SharedPredictionCache) -> Self {
        Self {
            cache,
            config: FrontendConfig::default(),
            grammar: PhantomData,
        }
    }

    #[must_use]
    pub fn config(mut self, config: FrontendConfig) -> Self {
        self.config = config;
        self
    }

    pub fn cache(&self) -> &SharedPredictionCache {
        &self.cache
    }

    pub fn settings(&self) -> &FrontendConfig {
        &self.config
    }

    /// Name of the rule [`parse`](Self::parse) invokes.
    pub fn start_rule(&self) -> &str {
        self.config.start_rule.as_deref().unwrap_or(G::START_RULE)
    }

    fn lexer(&self, source: &str) -> Result<(G::Lexer, ErrorSink)> {
        let mut lexer = G::Lexer::new(
            CharStream::new(source),
            self.cache.clone(),
            self.config.cache_guard(),
        )?;
        let errors = error_sink();
        lexer.remove_error_listeners();
        lexer.add_error_listener(Box::new(DiagnosticsCollector::new(Rc::clone(&errors))));
        Ok((lexer, errors))
    }

    /// Parses `source` from the start rule.
    ///
    /// Syntax errors never fail the call: they are returned in the output next to
    /// a best-effort tree.
    ///
    /// # Errors
    ///
    /// Only when the grammar contract is broken (an unknown start rule, a token or
    /// rule missing from the grammar tables, an unavailable prediction cache) or
    /// when the lexer fails for a reason other than unmatched input.
    pub fn parse(&self, source: &str) -> Result<ParseOutput> {
        let (lexer, lexer_errors) = self.lexer(source)?;
        let tokens = BufferedTokenStream::new(lexer);

        let mut parser = G::Parser::new(tokens, self.cache.clone(), self.config.cache_guard())?;
        parser.set_max_rule_depth(self.config.max_rule_depth);
        let parser_errors = error_sink();
        parser.remove_error_listeners();
        parser.add_error_listener(Box::new(DiagnosticsCollector::new(Rc::clone(&parser_errors))));

        let start_rule = self.start_rule();
        let rule_index = parser
            .rule_index(start_rule)
            .ok_or_else(|| ArboristError::UnknownEntryPoint {
                rule: start_rule.to_string(),
            })?;
        let native = parser.invoke_rule(rule_index)?;
        if let Some(failure) = parser.take_lexer_failure() {
            return Err(failure);
        }
        let tree = Materializer::new(parser.rule_names(), parser.vocabulary()).materialize(&native)?;

        let output = ParseOutput {
            tree,
            lexer_errors: lexer_errors.take(),
            parser_errors: parser_errors.take(),
        };
        debug!(
            start_rule,
            bytes = source.len(),
            lexer_errors = output.lexer_errors.len(),
            parser_errors = output.parser_errors.len(),
            "parsed input"
        );
        Ok(output)
    }

    /// Lexes all of `source`.
    ///
    /// # Errors
    ///
    /// Fails if the prediction cache is unavailable or the lexer fails for a
    /// reason other than unmatched input.
    pub fn tokenize(&self, source: &str) -> Result<TokenizeOutput> {
        let (lexer, lexer_errors) = self.lexer(source)?;
        let mut tokens = BufferedTokenStream::new(lexer);
        tokens.fill();
        if let Some(failure) = tokens.source_mut().take_failure() {
            return Err(failure);
        }
        Ok(TokenizeOutput {
            tokens: tokens.tokens().to_vec(),
            lexer_errors: lexer_errors.take(),
        })
    }
}
