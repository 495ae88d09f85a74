//! Recognition runtime.
//!
//! These are the pieces a grammar is built from: tokens and vocabularies, character
//! and token streams, the base [`Recognizer`] (error listeners, shared prediction
//! cache, adaptive prediction), the native parse tree, and the [`ParserCore`] error
//! strategy. The front-end only relies on the [`GrammarLexer`], [`GrammarParser`]
//! and [`NativeNode`] contracts.

pub mod recognizer;
pub mod strategy;
pub mod stream;
pub mod token;
pub mod tree;

pub use recognizer::{GrammarLexer, GrammarParser, InterpreterState, Recognizer};
pub use strategy::{
    CoreParser, Interrupt, ParserCore, Recognition, RecognitionError, DEFAULT_MAX_RULE_DEPTH,
};
pub use stream::{eof_token, BufferedTokenStream, CharStream, TokenSource};
pub use token::{Token, TokenSet, TokenType, Vocabulary, EOF};
pub use tree::{NativeChild, NativeNode, ParseChild, RuleContext, TerminalNode};
