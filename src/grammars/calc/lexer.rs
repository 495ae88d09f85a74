//! calc lexer: one `calc.pest` match per token.

use pest::error::ErrorVariant;
use pest::Parser;
use pest_derive::Parser;
use tracing::warn;

use crate::cache::{CacheGuard, SharedPredictionCache};
use crate::error::{ArboristError, Result};
use crate::runtime::{eof_token, CharStream, GrammarLexer, Recognizer, Token, TokenSource, TokenType, Vocabulary};

use super::*;

#[derive(Parser)]
#[grammar = "grammars/calc.pest"]
struct CalcScanner;

/// Token type for a lexeme rule; `None` for trivia.
fn token_type(rule: Rule) -> Option<TokenType> {
    let token_type = match rule {
        Rule::number => NUMBER,
        Rule::string => STRING,
        Rule::ident => ID,
        Rule::plus => PLUS,
        Rule::minus => MINUS,
        Rule::star => STAR,
        Rule::slash => SLASH,
        Rule::percent => PERCENT,
        Rule::caret => CARET,
        Rule::lparen => LPAREN,
        Rule::rparen => RPAREN,
        Rule::comma => COMMA,
        Rule::assign => ASSIGN,
        Rule::semi => SEMI,
        _ => return None,
    };
    Some(token_type)
}

/// Lexer for calc source text.
///
/// Characters no token starts with are reported as
/// `token recognition error at: 'X'` and skipped one at a time. If pest gives up
/// for any other reason the lexer ends the stream and keeps the failure for
/// [`TokenSource::take_failure`].
#[derive(Debug)]
pub struct CalcLexer {
    input: CharStream,
    offset: usize,
    line: usize,
    column: usize,
    recognizer: Recognizer,
    failure: Option<ArboristError>,
}

impl CalcLexer {
    pub fn input(&self) -> &CharStream {
        &self.input
    }

    /// Moves past `lexeme`, keeping line and column in step.
    fn advance(&mut self, lexeme_len: usize) {
        let end = self.offset + lexeme_len;
        for ch in self.input.text()[self.offset..end].chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
        self.offset = end;
    }

    /// Length and type of the lexeme at the current offset, `None` if no token
    /// matches there.
    fn scan(&self) -> Result<Option<(usize, Option<TokenType>)>> {
        let rest = &self.input.text()[self.offset..];
        match CalcScanner::parse(Rule::token, rest) {
            Ok(mut pairs) => Ok(pairs
                .next()
                .map(|pair| (pair.as_str().len(), token_type(pair.as_rule())))),
            Err(error) => match error.variant {
                ErrorVariant::ParsingError { .. } => Ok(None),
                // Call and stack limits.
                ErrorVariant::CustomError { message } => Err(ArboristError::Scanner {
                    line: self.line,
                    column: self.column,
                    message,
                }),
            },
        }
    }

    /// Stops the stream: every later call yields EOF.
    fn fail(&mut self, error: ArboristError) {
        warn!(line = self.line, column = self.column, %error, "lexer stopped");
        self.failure = Some(error);
        self.advance(self.input.len() - self.offset);
    }

    fn recognition_error(&mut self) {
        let Some(ch) = self.input.text()[self.offset..].chars().next() else {
            return;
        };
        let text: String = match ch {
            '\n' => "\\n".into(),
            '\r' => "\\r".into(),
            '\t' => "\\t".into(),
            other => other.to_string(),
        };
        let message = format!("token recognition error at: '{text}'");
        let (line, column) = (self.line, self.column);
        self.recognizer.notify(None, line, column, &message);
        self.advance(ch.len_utf8());
    }
}

impl TokenSource for CalcLexer {
    fn next_token(&mut self) -> Token {
        while self.offset < self.input.len() {
            let scanned = match self.scan() {
                Ok(scanned) => scanned,
                Err(error) => {
                    self.fail(error);
                    break;
                }
            };
            let Some((len, token_type)) = scanned else {
                self.recognition_error();
                continue;
            };
            let Some(token_type) = token_type else {
                self.advance(len);
                continue;
            };
            let start = self.offset;
            let token = Token {
                token_type,
                text: self.input.text()[start..start + len].to_string(),
                line: self.line,
                column: self.column,
                start,
                stop: start + len,
                index: 0,
            };
            self.advance(len);
            return token;
        }
        eof_token(self.input.text(), self.line, self.column)
    }

    fn vocabulary(&self) -> &'static Vocabulary {
        &VOCABULARY
    }

    fn take_failure(&mut self) -> Option<ArboristError> {
        self.failure.take()
    }
}

impl GrammarLexer for CalcLexer {
    fn new(input: CharStream, cache: SharedPredictionCache, guard: CacheGuard) -> Result<Self> {
        Ok(Self {
            input,
            offset: 0,
            line: 1,
            column: 0,
            recognizer: Recognizer::new(cache, guard)?,
            failure: None,
        })
    }

    fn recognizer(&self) -> &Recognizer {
        &self.recognizer
    }

    fn recognizer_mut(&mut self) -> &mut Recognizer {
        &mut self.recognizer
    }
}
