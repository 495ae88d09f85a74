//! Parser core with the default error-recovery strategy.
//!
//! Recursive-descent parsers built on this runtime keep a [`ParserCore`] and
//! implement [`CoreParser`]. Each rule body runs inside [`CoreParser::rule`], which
//! maintains the follow-set stack and turns a [`RecognitionError`] into a reported
//! diagnostic plus resynchronisation, so a syntax error never aborts the parse.
//!
//! Recovery follows the usual adaptive-LL playbook:
//! - inline, when matching a single token: drop one extraneous token, or conjure
//!   the missing one;
//! - at rule level: consume tokens until one in the recovery set (every follow set
//!   on the stack, plus EOF) shows up.
//!
//! Once an error is reported the core stays in recovery mode, and further reports
//! are suppressed until a token matches normally.
//!
//! Rule invocations nest at most [`DEFAULT_MAX_RULE_DEPTH`] deep (see
//! [`ParserCore::set_max_depth`]). An invocation past the limit reports a syntax
//! error and recovers instead of descending, so nesting never exhausts the stack.

use crate::cache::{CacheGuard, SharedPredictionCache};
use crate::error::{ArboristError, Result};

use super::recognizer::Recognizer;
use super::stream::{BufferedTokenStream, TokenSource};
use super::token::{Token, TokenSet, TokenType, Vocabulary, EOF};
use super::tree::RuleContext;

/// Rule invocations allowed on the stack at once.
pub const DEFAULT_MAX_RULE_DEPTH: usize = 400;

/// A recoverable syntax problem raised from inside a rule body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionError {
    NoViableAlternative { token: Token },
    InputMismatch { token: Token, expecting: TokenSet },
}

impl RecognitionError {
    pub fn token(&self) -> &Token {
        match self {
            RecognitionError::NoViableAlternative { token }
            | RecognitionError::InputMismatch { token, .. } => token,
        }
    }
}

/// Why a rule body stopped early.
#[derive(Debug)]
pub enum Interrupt {
    /// Reported and recovered from by the enclosing [`CoreParser::rule`].
    Recognition(RecognitionError),
    /// Propagated out of the parse.
    Fatal(ArboristError),
}

impl From<ArboristError> for Interrupt {
    fn from(error: ArboristError) -> Self {
        Interrupt::Fatal(error)
    }
}

impl From<RecognitionError> for Interrupt {
    fn from(error: RecognitionError) -> Self {
        Interrupt::Recognition(error)
    }
}

/// Result type of rule bodies.
pub type Recognition<T> = std::result::Result<T, Interrupt>;

/// Token stream, recognizer state and recovery bookkeeping for one parser.
#[derive(Debug)]
pub struct ParserCore<S> {
    recognizer: Recognizer,
    tokens: BufferedTokenStream<S>,
    follow: Vec<TokenSet>,
    error_recovery: bool,
    last_error_index: Option<usize>,
    syntax_errors: usize,
    max_depth: usize,
}

impl<S: TokenSource> ParserCore<S> {
    /// # Errors
    ///
    /// Fails if the prediction cache is unavailable.
    pub fn new(
        tokens: BufferedTokenStream<S>,
        cache: SharedPredictionCache,
        guard: CacheGuard,
    ) -> Result<Self> {
        Ok(Self {
            recognizer: Recognizer::new(cache, guard)?,
            tokens,
            follow: Vec::new(),
            error_recovery: false,
            last_error_index: None,
            syntax_errors: 0,
            max_depth: DEFAULT_MAX_RULE_DEPTH,
        })
    }

    pub fn recognizer(&self) -> &Recognizer {
        &self.recognizer
    }

    pub fn recognizer_mut(&mut self) -> &mut Recognizer {
        &mut self.recognizer
    }

    pub fn tokens(&self) -> &BufferedTokenStream<S> {
        &self.tokens
    }

    pub fn tokens_mut(&mut self) -> &mut BufferedTokenStream<S> {
        &mut self.tokens
    }

    pub fn vocabulary(&self) -> &'static Vocabulary {
        self.tokens.vocabulary()
    }

    pub fn la(&mut self, k: usize) -> TokenType {
        self.tokens.la(k)
    }

    pub fn lt(&mut self, k: usize) -> &Token {
        self.tokens.lt(k)
    }

    pub fn index(&self) -> usize {
        self.tokens.index()
    }

    /// Syntax errors this parser has reported so far.
    pub fn number_of_syntax_errors(&self) -> usize {
        self.syntax_errors
    }

    pub fn in_error_recovery(&self) -> bool {
        self.error_recovery
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Caps how many rule invocations may nest. Clamped to at least 1.
    pub fn set_max_depth(&mut self, depth: usize) {
        self.max_depth = depth.max(1);
    }

    /// Rule invocations currently on the stack.
    pub fn depth(&self) -> usize {
        self.follow.len()
    }

    /// Union of every follow set on the stack, plus EOF.
    pub fn recovery_set(&self) -> TokenSet {
        self.follow
            .iter()
            .fold(TokenSet::of(&[EOF]), |set, follow| set.union(follow))
    }

    /// Matches the current token against `expected` and attaches it to `ctx`,
    /// recovering inline when exactly one token is extra or missing.
    ///
    /// # Errors
    ///
    /// [`RecognitionError::InputMismatch`] when inline recovery is not possible.
    pub fn match_token(&mut self, expected: TokenType, ctx: &mut RuleContext) -> Recognition<()> {
        if self.la(1) == expected {
            self.error_recovery = false;
            let token = self.tokens.consume();
            ctx.add_token(token);
            return Ok(());
        }

        let expecting = TokenSet::of(&[expected]);
        if self.la(2) == expected {
            let found = self.lt(1).error_display();
            let message = format!(
                "extraneous input {found} expecting {}",
                expecting.display(self.vocabulary())
            );
            self.report_at_current(message);
            let extra = self.tokens.consume();
            ctx.add_error_token(extra);
            self.error_recovery = false;
            let token = self.tokens.consume();
            ctx.add_token(token);
            return Ok(());
        }

        if self.recovery_set().contains(self.la(1)) {
            let name = self.vocabulary().display_name(expected);
            let found = self.lt(1).error_display();
            let message = format!("missing {name} at {found}");
            self.report_at_current(message);
            let current = self.lt(1);
            let conjured = Token {
                token_type: expected,
                text: format!("<missing {name}>"),
                line: current.line,
                column: current.column,
                start: current.start,
                stop: current.start,
                index: current.index,
            };
            ctx.add_error_token(conjured);
            return Ok(());
        }

        Err(RecognitionError::InputMismatch {
            token: self.lt(1).clone(),
            expecting,
        }
        .into())
    }

    /// Consumes the current token as extraneous, reporting it unless already
    /// recovering.
    pub fn skip_extraneous(&mut self, expecting: &TokenSet, ctx: &mut RuleContext) {
        let found = self.lt(1).error_display();
        let message = format!(
            "extraneous input {found} expecting {}",
            expecting.display(self.vocabulary())
        );
        self.report_at_current(message);
        let token = self.tokens.consume();
        ctx.add_error_token(token);
    }

    /// Picks an alternative for `decision` from the next `depth` tokens.
    ///
    /// # Errors
    ///
    /// [`RecognitionError::NoViableAlternative`] when `simulate` finds none, or a
    /// fatal error if the prediction cache is unavailable.
    pub fn predict<F>(&mut self, decision: usize, depth: usize, simulate: F) -> Recognition<usize>
    where
        F: FnOnce(&[TokenType]) -> Option<usize>,
    {
        let lookahead = self.tokens.lookahead(depth);
        match self.recognizer.adaptive_predict(decision, &lookahead, simulate)? {
            Some(alternative) => Ok(alternative),
            None => Err(RecognitionError::NoViableAlternative {
                token: self.lt(1).clone(),
            }
            .into()),
        }
    }

    /// Reports a recognition error raised inside a rule body.
    pub fn report_error(&mut self, error: &RecognitionError) {
        let message = match error {
            RecognitionError::NoViableAlternative { token } => {
                format!("no viable alternative at input {}", token.error_display())
            }
            RecognitionError::InputMismatch { token, expecting } => format!(
                "mismatched input {} expecting {}",
                token.error_display(),
                expecting.display(self.vocabulary())
            ),
        };
        self.report(error.token().clone(), &message);
    }

    /// Skips tokens until one in the recovery set, attaching them to `ctx`.
    pub fn recover(&mut self, ctx: &mut RuleContext) {
        if self.last_error_index == Some(self.index()) {
            // Same spot as the previous failure: force progress.
            let token = self.tokens.consume();
            if !token.is_eof() {
                ctx.add_error_token(token);
            }
        }
        self.last_error_index = Some(self.index());
        let recovery = self.recovery_set();
        while !recovery.contains(self.la(1)) {
            let token = self.tokens.consume();
            ctx.add_error_token(token);
        }
    }

    fn report_too_deep(&mut self) {
        let found = self.lt(1).error_display();
        let message = format!("rule nesting exceeds {} levels at input {found}", self.max_depth);
        self.report_at_current(message);
    }

    fn report_at_current(&mut self, message: String) {
        let token = self.lt(1).clone();
        self.report(token, &message);
    }

    fn report(&mut self, token: Token, message: &str) {
        if self.error_recovery {
            return;
        }
        self.error_recovery = true;
        self.syntax_errors += 1;
        self.recognizer
            .notify(Some(&token), token.line, token.column, message);
    }
}

/// A recursive-descent parser driven by a [`ParserCore`].
pub trait CoreParser: Sized {
    type Source: TokenSource;

    fn core(&self) -> &ParserCore<Self::Source>;

    fn core_mut(&mut self) -> &mut ParserCore<Self::Source>;

    /// Runs one rule invocation.
    ///
    /// `follow` is what may come after this invocation in the caller. Recognition
    /// errors escaping `body` are reported and recovered from here, and the
    /// partially built context is returned. Past the nesting limit `body` is not
    /// run at all: the depth is reported as a syntax error and recovered from.
    ///
    /// # Errors
    ///
    /// Only fatal errors propagate.
    fn rule<F>(&mut self, rule_index: usize, follow: TokenSet, body: F) -> Result<RuleContext>
    where
        F: FnOnce(&mut Self, &mut RuleContext) -> Recognition<()>,
    {
        let core = self.core_mut();
        core.follow.push(follow);
        let mut ctx = RuleContext::new(rule_index, core.index());
        if core.depth() > core.max_depth {
            core.report_too_deep();
            core.recover(&mut ctx);
            ctx.recovered = true;
            core.follow.pop();
            return Ok(ctx);
        }

        let outcome = body(self, &mut ctx);

        let core = self.core_mut();
        let result = match outcome {
            Ok(()) => Ok(()),
            Err(Interrupt::Recognition(error)) => {
                core.report_error(&error);
                core.recover(&mut ctx);
                ctx.recovered = true;
                Ok(())
            }
            Err(Interrupt::Fatal(error)) => Err(error),
        };
        core.follow.pop();
        result.map(|()| ctx)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::diagnostics::{error_sink, DiagnosticsCollector, ErrorSink};
    use crate::runtime::stream::eof_token;

    const A: TokenType = 1;
    const B: TokenType = 2;
    const C: TokenType = 3;

    static LITERALS: [Option<&str>; 4] = [None, Some("'a'"), Some("'b'"), Some("'c'")];
    static SYMBOLS: [Option<&str>; 4] = [None, Some("A"), Some("B"), Some("C")];
    static VOCABULARY: Vocabulary = Vocabulary::new(&LITERALS, &SYMBOLS);

    /// Lexes each of `a`, `b`, `c` as its own token; everything else is ignored.
    struct Letters {
        text: Vec<char>,
        next: usize,
    }

    impl TokenSource for Letters {
        fn next_token(&mut self) -> Token {
            while let Some(ch) = self.text.get(self.next).copied() {
                let column = self.next;
                self.next += 1;
                let token_type = match ch {
                    'a' => A,
                    'b' => B,
                    'c' => C,
                    _ => continue,
                };
                return Token {
                    token_type,
                    text: ch.to_string(),
                    line: 1,
                    column,
                    start: column,
                    stop: column + 1,
                    index: 0,
                };
            }
            eof_token("", 1, self.next)
        }

        fn vocabulary(&self) -> &'static Vocabulary {
            &VOCABULARY
        }
    }

    struct Abc {
        core: ParserCore<Letters>,
    }

    impl CoreParser for Abc {
        type Source = Letters;

        fn core(&self) -> &ParserCore<Letters> {
            &self.core
        }

        fn core_mut(&mut self) -> &mut ParserCore<Letters> {
            &mut self.core
        }
    }

    impl Abc {
        /// `seq : 'a' 'b' 'c' ;`
        fn seq(&mut self) -> Result<RuleContext> {
            self.rule(0, TokenSet::of(&[EOF]), |p, ctx| {
                p.core.match_token(A, ctx)?;
                p.core.match_token(B, ctx)?;
                p.core.match_token(C, ctx)?;
                Ok(())
            })
        }
    }

    impl Abc {
        /// `nest : 'a' nest? 'b' ;`
        fn nest(&mut self) -> Result<RuleContext> {
            self.rule(1, TokenSet::of(&[B]), |p, ctx| {
                p.core.match_token(A, ctx)?;
                if p.core.la(1) == A {
                    ctx.add_rule(p.nest()?);
                }
                p.core.match_token(B, ctx)?;
                Ok(())
            })
        }
    }

    fn parser(text: &str) -> (Abc, ErrorSink) {
        let tokens = BufferedTokenStream::new(Letters {
            text: text.chars().collect(),
            next: 0,
        });
        let mut core =
            ParserCore::new(tokens, SharedPredictionCache::new(), CacheGuard::default()).unwrap();
        let sink = error_sink();
        core.recognizer_mut().remove_error_listeners();
        core.recognizer_mut()
            .add_error_listener(Box::new(DiagnosticsCollector::new(Rc::clone(&sink))));
        (Abc { core }, sink)
    }

    fn messages(sink: &ErrorSink) -> Vec<String> {
        sink.borrow().iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn test_clean_match() {
        let (mut p, sink) = parser("abc");
        let ctx = p.seq().unwrap();
        assert_eq!(ctx.children.len(), 3);
        assert!(sink.borrow().is_empty());
        assert_eq!(p.core().number_of_syntax_errors(), 0);
    }

    #[test]
    fn test_single_token_deletion() {
        let (mut p, sink) = parser("acbc");
        let ctx = p.seq().unwrap();
        assert_eq!(messages(&sink), vec!["Line 1:1 extraneous input 'c' expecting 'b'"]);
        assert_eq!(ctx.tokens().len(), 4);
    }

    #[test]
    fn test_single_token_insertion() {
        let (mut p, sink) = parser("ab");
        let ctx = p.seq().unwrap();
        assert_eq!(messages(&sink), vec!["Line 1:2 missing 'c' at '<EOF>'"]);
        let last = ctx.tokens().last().map(|t| t.text.clone());
        assert_eq!(last.as_deref(), Some("<missing 'c'>"));
    }

    #[test]
    fn test_mismatch_recovers_at_rule_level() {
        let (mut p, sink) = parser("bbb");
        let ctx = p.seq().unwrap();
        assert_eq!(messages(&sink), vec!["Line 1:0 mismatched input 'b' expecting 'a'"]);
        assert!(ctx.recovered);
        // Everything up to EOF was skipped as error tokens.
        assert_eq!(ctx.tokens().len(), 3);
        assert_eq!(p.core_mut().la(1), EOF);
    }

    #[test]
    fn test_predict_reports_no_viable_alternative() {
        let (mut p, _sink) = parser("c");
        let outcome = p.core.predict(0, 1, |la| (la[0] == A).then_some(1));
        match outcome {
            Err(Interrupt::Recognition(RecognitionError::NoViableAlternative { token })) => {
                assert_eq!(token.text, "c");
            }
            other => panic!("expected no viable alternative, got {other:?}"),
        }
    }

    #[test]
    fn test_nesting_within_limit() {
        let (mut p, sink) = parser("aaabbb");
        p.core.set_max_depth(3);
        let ctx = p.nest().unwrap();
        assert!(sink.borrow().is_empty());
        assert_eq!(ctx.children.len(), 3);
        assert_eq!(p.core().depth(), 0);
    }

    #[test]
    fn test_nesting_past_limit_is_a_syntax_error() {
        let (mut p, sink) = parser("aaaabbbb");
        p.core.set_max_depth(3);
        p.nest().unwrap();
        assert_eq!(
            messages(&sink),
            vec!["Line 1:3 rule nesting exceeds 3 levels at input 'a'"]
        );
        assert_eq!(p.core().depth(), 0);
        // The innermost 'a' was skipped, so its 'b' is left over.
        assert_eq!(p.core_mut().la(1), B);
    }

    #[test]
    fn test_recovery_set_includes_stack_and_eof() {
        let (mut p, _sink) = parser("");
        p.core.follow.push(TokenSet::of(&[B]));
        p.core.follow.push(TokenSet::of(&[C]));
        assert_eq!(p.core.recovery_set(), TokenSet::of(&[EOF, B, C]));
    }
}
