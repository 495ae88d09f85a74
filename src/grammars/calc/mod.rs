//! The `calc` reference grammar.
//!
//! A small expression and assignment language:
//!
//! ```text
//! program    : statement* EOF ;
//! statement  : assignment ';'? | expression ';'? ;
//! assignment : ID '=' expression ;
//! expression : term (('+'|'-') term)* ;
//! term       : factor (('*'|'/'|'%') factor)* ;
//! factor     : ('+'|'-') factor | primary ('^' factor)? ;
//! primary    : NUMBER | STRING | ID | call | '(' expression ')' ;
//! call       : ID '(' (expression (',' expression)*)? ')' ;
//! ```
//!
//! Tokens are described by `calc.pest`; `#` starts a line comment.

mod lexer;
mod parser;

pub use lexer::CalcLexer;
pub use parser::CalcParser;

use crate::frontend::Grammar;
use once_cell::sync::Lazy;

use crate::runtime::{TokenSet, TokenType, Vocabulary};

// ============================================================================
// TOKEN TYPES
// ============================================================================

pub const NUMBER: TokenType = 1;
pub const STRING: TokenType = 2;
pub const ID: TokenType = 3;
pub const PLUS: TokenType = 4;
pub const MINUS: TokenType = 5;
pub const STAR: TokenType = 6;
pub const SLASH: TokenType = 7;
pub const PERCENT: TokenType = 8;
pub const CARET: TokenType = 9;
pub const LPAREN: TokenType = 10;
pub const RPAREN: TokenType = 11;
pub const COMMA: TokenType = 12;
pub const ASSIGN: TokenType = 13;
pub const SEMI: TokenType = 14;

static LITERAL_NAMES: [Option<&str>; 15] = [
    None,
    None,
    None,
    None,
    Some("'+'"),
    Some("'-'"),
    Some("'*'"),
    Some("'/'"),
    Some("'%'"),
    Some("'^'"),
    Some("'('"),
    Some("')'"),
    Some("','"),
    Some("'='"),
    Some("';'"),
];

static SYMBOLIC_NAMES: [Option<&str>; 15] = [
    None,
    Some("NUMBER"),
    Some("STRING"),
    Some("ID"),
    Some("PLUS"),
    Some("MINUS"),
    Some("STAR"),
    Some("SLASH"),
    Some("PERCENT"),
    Some("CARET"),
    Some("LPAREN"),
    Some("RPAREN"),
    Some("COMMA"),
    Some("ASSIGN"),
    Some("SEMI"),
];

pub static VOCABULARY: Vocabulary = Vocabulary::new(&LITERAL_NAMES, &SYMBOLIC_NAMES);

// ============================================================================
// RULES
// ============================================================================

pub const RULE_PROGRAM: usize = 0;
pub const RULE_STATEMENT: usize = 1;
pub const RULE_ASSIGNMENT: usize = 2;
pub const RULE_EXPRESSION: usize = 3;
pub const RULE_TERM: usize = 4;
pub const RULE_FACTOR: usize = 5;
pub const RULE_PRIMARY: usize = 6;
pub const RULE_CALL: usize = 7;

pub static RULE_NAMES: [&str; 8] = [
    "program",
    "statement",
    "assignment",
    "expression",
    "term",
    "factor",
    "primary",
    "call",
];

/// Tokens that can begin an expression, and so a statement.
pub static EXPRESSION_START: Lazy<TokenSet> =
    Lazy::new(|| TokenSet::of(&[NUMBER, STRING, ID, LPAREN, PLUS, MINUS]));

/// The calc language, ready to hand to a [`Frontend`](crate::frontend::Frontend).
#[derive(Debug, Clone, Copy, Default)]
pub struct Calc;

impl Grammar for Calc {
    type Lexer = CalcLexer;
    type Parser = CalcParser;

    const START_RULE: &'static str = "program";
}
