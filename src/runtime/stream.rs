//! Character input and buffered token streams.

use std::sync::Arc;

use crate::error::ArboristError;

use super::token::{Token, TokenType, Vocabulary, EOF};

/// Source text handed to a lexer.
#[derive(Debug, Clone)]
pub struct CharStream {
    name: Arc<str>,
    text: Arc<str>,
}

impl CharStream {
    pub fn new(text: &str) -> Self {
        Self::named("<input>", text)
    }

    pub fn named(name: &str, text: &str) -> Self {
        Self {
            name: Arc::from(name),
            text: Arc::from(text),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Anything that produces tokens, typically a lexer.
///
/// Once the input is exhausted `next_token` must keep returning an [`EOF`] token.
pub trait TokenSource {
    fn next_token(&mut self) -> Token;

    /// A failure that stopped the source early. A source that fails ends its
    /// stream with [`EOF`] and hands the failure out here, once.
    fn take_failure(&mut self) -> Option<ArboristError> {
        None
    }

    fn vocabulary(&self) -> &'static Vocabulary;
}

/// Pulls tokens from a [`TokenSource`] on demand and keeps every token it has
/// seen, so parsers can look ahead and diagnostics can refer back.
#[derive(Debug)]
pub struct BufferedTokenStream<S> {
    source: S,
    tokens: Vec<Token>,
    position: usize,
    fetched_eof: bool,
}

impl<S: TokenSource> BufferedTokenStream<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            tokens: Vec::new(),
            position: 0,
            fetched_eof: false,
        }
    }

    /// Makes sure the token at `index` is buffered, unless the source ran dry first.
    fn sync(&mut self, index: usize) {
        while !self.fetched_eof && self.tokens.len() <= index {
            let mut token = self.source.next_token();
            token.index = self.tokens.len();
            self.fetched_eof = token.is_eof();
            self.tokens.push(token);
        }
    }

    /// Token `k` positions ahead (1-based). Past the end, the EOF token is returned.
    pub fn lt(&mut self, k: usize) -> &Token {
        debug_assert!(k >= 1, "lookahead is 1-based");
        let index = self.position + k.saturating_sub(1);
        self.sync(index);
        let last = self.tokens.len() - 1;
        &self.tokens[index.min(last)]
    }

    /// Token type `k` positions ahead (1-based).
    pub fn la(&mut self, k: usize) -> TokenType {
        self.lt(k).token_type
    }

    /// Token types of the next `depth` tokens.
    pub fn lookahead(&mut self, depth: usize) -> Vec<TokenType> {
        (1..=depth).map(|k| self.la(k)).collect()
    }

    /// Moves past the current token and returns it. Consuming at EOF is a no-op
    /// that returns the EOF token again.
    pub fn consume(&mut self) -> Token {
        let token = self.lt(1).clone();
        if !token.is_eof() {
            self.position += 1;
        }
        token
    }

    pub fn index(&self) -> usize {
        self.position
    }

    /// Buffers every remaining token.
    pub fn fill(&mut self) {
        while !self.fetched_eof {
            let next = self.tokens.len();
            self.sync(next);
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    pub fn vocabulary(&self) -> &'static Vocabulary {
        self.source.vocabulary()
    }
}

/// EOF token positioned at the end of `text`.
pub fn eof_token(text: &str, line: usize, column: usize) -> Token {
    Token {
        token_type: EOF,
        text: "<EOF>".to_string(),
        line,
        column,
        start: text.len(),
        stop: text.len(),
        index: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static NO_NAMES: [Option<&str>; 0] = [];
    static EMPTY_VOCABULARY: Vocabulary = Vocabulary::new(&NO_NAMES, &NO_NAMES);

    /// Emits one token per char, type 1.
    struct CharSource {
        chars: Vec<char>,
        next: usize,
    }

    impl TokenSource for CharSource {
        fn next_token(&mut self) -> Token {
            match self.chars.get(self.next) {
                Some(ch) => {
                    let start = self.next;
                    self.next += 1;
                    Token {
                        token_type: 1,
                        text: ch.to_string(),
                        line: 1,
                        column: start,
                        start,
                        stop: start + 1,
                        index: 0,
                    }
                }
                None => eof_token("", 1, self.next),
            }
        }

        fn vocabulary(&self) -> &'static Vocabulary {
            &EMPTY_VOCABULARY
        }
    }

    fn stream(text: &str) -> BufferedTokenStream<CharSource> {
        BufferedTokenStream::new(CharSource {
            chars: text.chars().collect(),
            next: 0,
        })
    }

    #[test]
    fn test_lookahead_is_lazy() {
        let mut tokens = stream("abc");
        assert_eq!(tokens.lt(1).text, "a");
        assert_eq!(tokens.tokens().len(), 1);
        assert_eq!(tokens.lt(2).text, "b");
        assert_eq!(tokens.tokens().len(), 2);
    }

    #[test]
    fn test_consume_stops_at_eof() {
        let mut tokens = stream("ab");
        assert_eq!(tokens.consume().text, "a");
        assert_eq!(tokens.consume().text, "b");
        assert!(tokens.consume().is_eof());
        assert!(tokens.consume().is_eof());
        assert_eq!(tokens.index(), 2);
        assert_eq!(tokens.la(5), EOF);
    }

    #[test]
    fn test_fill_assigns_indices() {
        let mut tokens = stream("xyz");
        tokens.fill();
        let indices: Vec<usize> = tokens.tokens().iter().map(|t| t.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
        assert!(tokens.tokens()[3].is_eof());
    }

    #[test]
    fn test_lookahead_vector() {
        let mut tokens = stream("a");
        assert_eq!(tokens.lookahead(3), vec![1, EOF, EOF]);
    }
}
