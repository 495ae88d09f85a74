//! calc parser: recursive descent over [`ParserCore`], one method per rule.

use once_cell::sync::Lazy;

use crate::cache::{CacheGuard, SharedPredictionCache};
use crate::error::{ArboristError, Result};
use crate::runtime::{
    BufferedTokenStream, CoreParser, GrammarParser, ParserCore, Recognizer, RuleContext, TokenSet,
    TokenType, Vocabulary, EOF,
};

use super::*;

// Decision numbers for adaptive prediction.
const DECISION_STATEMENT: usize = 0;
const DECISION_PRIMARY: usize = 1;

const STATEMENT_ASSIGNMENT: usize = 1;
const STATEMENT_EXPRESSION: usize = 2;

const PRIMARY_NUMBER: usize = 1;
const PRIMARY_STRING: usize = 2;
const PRIMARY_ID: usize = 3;
const PRIMARY_CALL: usize = 4;
const PRIMARY_PARENS: usize = 5;

static ADDITIVE: Lazy<TokenSet> = Lazy::new(|| TokenSet::of(&[PLUS, MINUS]));
static MULTIPLICATIVE: Lazy<TokenSet> = Lazy::new(|| TokenSet::of(&[STAR, SLASH, PERCENT]));

fn predict_statement(lookahead: &[TokenType]) -> Option<usize> {
    match lookahead {
        [ID, ASSIGN, ..] => Some(STATEMENT_ASSIGNMENT),
        [first, ..] if EXPRESSION_START.contains(*first) => Some(STATEMENT_EXPRESSION),
        _ => None,
    }
}

fn predict_primary(lookahead: &[TokenType]) -> Option<usize> {
    match lookahead {
        [ID, LPAREN, ..] => Some(PRIMARY_CALL),
        [ID, ..] => Some(PRIMARY_ID),
        [NUMBER, ..] => Some(PRIMARY_NUMBER),
        [STRING, ..] => Some(PRIMARY_STRING),
        [LPAREN, ..] => Some(PRIMARY_PARENS),
        _ => None,
    }
}

/// Parser for the calc language.
#[derive(Debug)]
pub struct CalcParser {
    core: ParserCore<CalcLexer>,
}

impl CalcParser {
    /// `program : statement* EOF ;`
    ///
    /// Tokens that cannot start a statement are skipped as extraneous. EOF is not
    /// attached to the tree.
    pub fn program(&mut self) -> Result<RuleContext> {
        self.rule(RULE_PROGRAM, TokenSet::EMPTY, |p, ctx| {
            loop {
                let la = p.core.la(1);
                if la == EOF {
                    return Ok(());
                }
                if EXPRESSION_START.contains(la) {
                    ctx.add_rule(p.statement((*EXPRESSION_START).clone())?);
                } else {
                    p.core.skip_extraneous(&EXPRESSION_START, ctx);
                }
            }
        })
    }

    /// `statement : assignment ';'? | expression ';'? ;`
    pub fn statement(&mut self, follow: TokenSet) -> Result<RuleContext> {
        self.rule(RULE_STATEMENT, follow, |p, ctx| {
            let terminator = TokenSet::of(&[SEMI]);
            match p.core.predict(DECISION_STATEMENT, 2, predict_statement)? {
                STATEMENT_ASSIGNMENT => ctx.add_rule(p.assignment(terminator)?),
                _ => ctx.add_rule(p.expression(terminator)?),
            }
            if p.core.la(1) == SEMI {
                p.core.match_token(SEMI, ctx)?;
            }
            Ok(())
        })
    }

    /// `assignment : ID '=' expression ;`
    pub fn assignment(&mut self, follow: TokenSet) -> Result<RuleContext> {
        self.rule(RULE_ASSIGNMENT, follow, |p, ctx| {
            p.core.match_token(ID, ctx)?;
            p.core.match_token(ASSIGN, ctx)?;
            ctx.add_rule(p.expression(TokenSet::EMPTY)?);
            Ok(())
        })
    }

    /// `expression : term (('+'|'-') term)* ;`
    pub fn expression(&mut self, follow: TokenSet) -> Result<RuleContext> {
        self.rule(RULE_EXPRESSION, follow, |p, ctx| {
            ctx.add_rule(p.term((*ADDITIVE).clone())?);
            while ADDITIVE.contains(p.core.la(1)) {
                let operator = p.core.la(1);
                p.core.match_token(operator, ctx)?;
                ctx.add_rule(p.term((*ADDITIVE).clone())?);
            }
            Ok(())
        })
    }

    /// `term : factor (('*'|'/'|'%') factor)* ;`
    pub fn term(&mut self, follow: TokenSet) -> Result<RuleContext> {
        self.rule(RULE_TERM, follow, |p, ctx| {
            ctx.add_rule(p.factor((*MULTIPLICATIVE).clone())?);
            while MULTIPLICATIVE.contains(p.core.la(1)) {
                let operator = p.core.la(1);
                p.core.match_token(operator, ctx)?;
                ctx.add_rule(p.factor((*MULTIPLICATIVE).clone())?);
            }
            Ok(())
        })
    }

    /// `factor : ('+'|'-') factor | primary ('^' factor)? ;`
    ///
    /// `^` is right-associative.
    pub fn factor(&mut self, follow: TokenSet) -> Result<RuleContext> {
        self.rule(RULE_FACTOR, follow, |p, ctx| {
            let la = p.core.la(1);
            if ADDITIVE.contains(la) {
                p.core.match_token(la, ctx)?;
                ctx.add_rule(p.factor(TokenSet::EMPTY)?);
                return Ok(());
            }
            ctx.add_rule(p.primary(TokenSet::of(&[CARET]))?);
            if p.core.la(1) == CARET {
                p.core.match_token(CARET, ctx)?;
                ctx.add_rule(p.factor(TokenSet::EMPTY)?);
            }
            Ok(())
        })
    }

    /// `primary : NUMBER | STRING | ID | call | '(' expression ')' ;`
    pub fn primary(&mut self, follow: TokenSet) -> Result<RuleContext> {
        self.rule(RULE_PRIMARY, follow, |p, ctx| {
            match p.core.predict(DECISION_PRIMARY, 2, predict_primary)? {
                PRIMARY_NUMBER => p.core.match_token(NUMBER, ctx)?,
                PRIMARY_STRING => p.core.match_token(STRING, ctx)?,
                PRIMARY_ID => p.core.match_token(ID, ctx)?,
                PRIMARY_CALL => ctx.add_rule(p.call(TokenSet::EMPTY)?),
                _ => {
                    p.core.match_token(LPAREN, ctx)?;
                    ctx.add_rule(p.expression(TokenSet::of(&[RPAREN]))?);
                    p.core.match_token(RPAREN, ctx)?;
                }
            }
            Ok(())
        })
    }

    /// `call : ID '(' (expression (',' expression)*)? ')' ;`
    pub fn call(&mut self, follow: TokenSet) -> Result<RuleContext> {
        self.rule(RULE_CALL, follow, |p, ctx| {
            let separators = TokenSet::of(&[COMMA, RPAREN]);
            p.core.match_token(ID, ctx)?;
            p.core.match_token(LPAREN, ctx)?;
            if EXPRESSION_START.contains(p.core.la(1)) {
                ctx.add_rule(p.expression(separators.clone())?);
                while p.core.la(1) == COMMA {
                    p.core.match_token(COMMA, ctx)?;
                    ctx.add_rule(p.expression(separators.clone())?);
                }
            }
            p.core.match_token(RPAREN, ctx)?;
            Ok(())
        })
    }
}

impl CoreParser for CalcParser {
    type Source = CalcLexer;

    fn core(&self) -> &ParserCore<CalcLexer> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ParserCore<CalcLexer> {
        &mut self.core
    }
}

impl GrammarParser for CalcParser {
    type Lexer = CalcLexer;

    fn new(
        tokens: BufferedTokenStream<CalcLexer>,
        cache: SharedPredictionCache,
        guard: CacheGuard,
    ) -> Result<Self> {
        Ok(Self {
            core: ParserCore::new(tokens, cache, guard)?,
        })
    }

    fn recognizer(&self) -> &Recognizer {
        self.core.recognizer()
    }

    fn recognizer_mut(&mut self) -> &mut Recognizer {
        self.core.recognizer_mut()
    }

    fn rule_names(&self) -> &'static [&'static str] {
        &RULE_NAMES
    }

    fn vocabulary(&self) -> &'static Vocabulary {
        &VOCABULARY
    }

    fn tokens_mut(&mut self) -> &mut BufferedTokenStream<CalcLexer> {
        self.core.tokens_mut()
    }

    fn set_max_rule_depth(&mut self, depth: usize) {
        self.core.set_max_depth(depth);
    }

    fn invoke_rule(&mut self, rule_index: usize) -> Result<RuleContext> {
        let follow = TokenSet::EMPTY;
        match rule_index {
            RULE_PROGRAM => self.program(),
            RULE_STATEMENT => self.statement(follow),
            RULE_ASSIGNMENT => self.assignment(follow),
            RULE_EXPRESSION => self.expression(follow),
            RULE_TERM => self.term(follow),
            RULE_FACTOR => self.factor(follow),
            RULE_PRIMARY => self.primary(follow),
            RULE_CALL => self.call(follow),
            index => Err(ArboristError::UnknownRule { index }),
        }
    }
}
