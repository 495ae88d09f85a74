//! The engine's native parse tree.

use super::token::{Token, TokenType};

/// A child slot as seen through [`NativeNode`].
#[derive(Debug, Clone, Copy)]
pub enum NativeChild<'a, N> {
    Terminal { token_type: TokenType, text: &'a str },
    Rule(&'a N),
}

/// Read-only access to a native parse tree node, which is all materialization needs.
pub trait NativeNode: Sized {
    fn rule_index(&self) -> usize;

    fn child_count(&self) -> usize;

    /// The child at `index`, or `None` for an empty slot.
    fn child(&self, index: usize) -> Option<NativeChild<'_, Self>>;
}

/// A matched token, or one synthesized or skipped during error recovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalNode {
    pub token: Token,
    pub error: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseChild {
    Terminal(TerminalNode),
    Rule(RuleContext),
}

/// One rule invocation in the native tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleContext {
    pub rule_index: usize,
    pub children: Vec<Option<ParseChild>>,
    /// Index of the first token this invocation saw.
    pub start: usize,
    /// Set when the rule reported an error and recovered.
    pub recovered: bool,
}

impl RuleContext {
    pub fn new(rule_index: usize, start: usize) -> Self {
        Self {
            rule_index,
            children: Vec::new(),
            start,
            recovered: false,
        }
    }

    pub fn add_token(&mut self, token: Token) {
        self.children
            .push(Some(ParseChild::Terminal(TerminalNode { token, error: false })));
    }

    pub fn add_error_token(&mut self, token: Token) {
        self.children
            .push(Some(ParseChild::Terminal(TerminalNode { token, error: true })));
    }

    pub fn add_rule(&mut self, rule: RuleContext) {
        self.children.push(Some(ParseChild::Rule(rule)));
    }

    /// Appends an empty child slot.
    pub fn add_empty(&mut self) {
        self.children.push(None);
    }

    /// Terminal tokens in this subtree, left to right.
    pub fn tokens(&self) -> Vec<&Token> {
        let mut tokens = Vec::new();
        self.collect_tokens(&mut tokens);
        tokens
    }

    fn collect_tokens<'a>(&'a self, tokens: &mut Vec<&'a Token>) {
        for child in self.children.iter().flatten() {
            match child {
                ParseChild::Terminal(terminal) => tokens.push(&terminal.token),
                ParseChild::Rule(rule) => rule.collect_tokens(tokens),
            }
        }
    }
}

impl NativeNode for RuleContext {
    fn rule_index(&self) -> usize {
        self.rule_index
    }

    fn child_count(&self) -> usize {
        self.children.len()
    }

    fn child(&self, index: usize) -> Option<NativeChild<'_, Self>> {
        match self.children.get(index)?.as_ref()? {
            ParseChild::Terminal(terminal) => Some(NativeChild::Terminal {
                token_type: terminal.token.token_type,
                text: &terminal.token.text,
            }),
            ParseChild::Rule(rule) => Some(NativeChild::Rule(rule)),
        }
    }
}
