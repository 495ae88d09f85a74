//! Uniform parse trees.
//!
//! [`ParseTreeNode`] is the engine-independent shape every parse is converted to:
//! rule nodes with ordered children, and terminal nodes with a symbolic name and the
//! token text. The [`Materializer`] builds it from any [`NativeNode`] tree, and
//! [`stringify`] renders it as an indented, line-per-node listing suitable for
//! golden files and diffs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ArboristError, Result};
use crate::runtime::{NativeChild, NativeNode, TokenType, Vocabulary};

/// Indentation added per tree level by [`stringify`].
pub const INDENT: &str = "  ";

/// A node of a materialized parse tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseTreeNode {
    /// A rule invocation. Children are in derivation order.
    Rule {
        name: String,
        children: Vec<ParseTreeNode>,
    },
    /// A token. `text` has its line separators escaped.
    Terminal { symbol: String, text: String },
}

impl ParseTreeNode {
    pub fn rule(name: impl Into<String>, children: Vec<ParseTreeNode>) -> Self {
        ParseTreeNode::Rule {
            name: name.into(),
            children,
        }
    }

    /// Builds a terminal, escaping `text`.
    pub fn terminal(symbol: impl Into<String>, text: &str) -> Self {
        ParseTreeNode::Terminal {
            symbol: symbol.into(),
            text: escape_text(text),
        }
    }

    /// Rule name or terminal symbol.
    pub fn name(&self) -> &str {
        match self {
            ParseTreeNode::Rule { name, .. } => name,
            ParseTreeNode::Terminal { symbol, .. } => symbol,
        }
    }

    /// Children of a rule node; always empty for terminals.
    pub fn children(&self) -> &[ParseTreeNode] {
        match self {
            ParseTreeNode::Rule { children, .. } => children,
            ParseTreeNode::Terminal { .. } => &[],
        }
    }

    pub fn is_rule(&self) -> bool {
        matches!(self, ParseTreeNode::Rule { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ParseTreeNode::Terminal { .. })
    }

    /// Terminal nodes of this subtree, left to right.
    pub fn leaves(&self) -> Vec<&ParseTreeNode> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a ParseTreeNode>) {
        match self {
            ParseTreeNode::Terminal { .. } => leaves.push(self),
            ParseTreeNode::Rule { children, .. } => {
                for child in children {
                    child.collect_leaves(leaves);
                }
            }
        }
    }

    /// Total number of nodes in this subtree, itself included.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(ParseTreeNode::node_count).sum::<usize>()
    }

    /// Number of levels in this subtree; a lone node has depth 1.
    pub fn depth(&self) -> usize {
        1 + self.children().iter().map(ParseTreeNode::depth).max().unwrap_or(0)
    }
}

impl fmt::Display for ParseTreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&stringify(self, self.name()))
    }
}

/// Escapes line separators so token text always fits on one line.
pub fn escape_text(text: &str) -> String {
    if !text.contains(['\n', '\r']) {
        return text.to_string();
    }
    text.replace("\r\n", "\\r\\n")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

/// Converts native parse trees into [`ParseTreeNode`]s.
#[derive(Debug, Clone, Copy)]
pub struct Materializer<'g> {
    rule_names: &'g [&'g str],
    vocabulary: &'g Vocabulary,
}

impl<'g> Materializer<'g> {
    pub fn new(rule_names: &'g [&'g str], vocabulary: &'g Vocabulary) -> Self {
        Self {
            rule_names,
            vocabulary,
        }
    }

    /// Rebuilds `node` and everything under it.
    ///
    /// Empty child slots are skipped.
    ///
    /// # Errors
    ///
    /// [`ArboristError::UnknownRule`] or [`ArboristError::UnknownTokenType`] when the
    /// tree mentions something the grammar tables do not define.
    pub fn materialize<N: NativeNode>(&self, node: &N) -> Result<ParseTreeNode> {
        let name = self.rule_name(node.rule_index())?;
        let mut children = Vec::with_capacity(node.child_count());
        for index in 0..node.child_count() {
            let Some(child) = node.child(index) else {
                continue;
            };
            let child = match child {
                NativeChild::Terminal { token_type, text } => {
                    ParseTreeNode::terminal(self.symbolic_name(token_type)?, text)
                }
                NativeChild::Rule(rule) => self.materialize(rule)?,
            };
            children.push(child);
        }
        Ok(ParseTreeNode::rule(name, children))
    }

    fn rule_name(&self, index: usize) -> Result<&'g str> {
        self.rule_names
            .get(index)
            .copied()
            .ok_or(ArboristError::UnknownRule { index })
    }

    fn symbolic_name(&self, token_type: TokenType) -> Result<&'static str> {
        self.vocabulary
            .symbolic_name(token_type)
            .ok_or(ArboristError::UnknownTokenType { token_type })
    }
}

/// Renders `root` as `root_label` followed by one line per descendant, indented by
/// depth.
///
/// ```text
/// program
///   statement
///     expression
///       NUMBER("1")
/// ```
pub fn stringify(root: &ParseTreeNode, root_label: &str) -> String {
    let mut out = String::with_capacity(root.node_count() * 16);
    out.push_str(root_label);
    out.push('\n');
    write_children(&mut out, root.children(), 1);
    out
}

fn write_children(out: &mut String, children: &[ParseTreeNode], depth: usize) {
    for child in children {
        for _ in 0..depth {
            out.push_str(INDENT);
        }
        match child {
            ParseTreeNode::Rule { name, children } => {
                out.push_str(name);
                out.push('\n');
                write_children(out, children, depth + 1);
            }
            ParseTreeNode::Terminal { symbol, text } => {
                out.push_str(symbol);
                out.push_str("(\"");
                out.push_str(text);
                out.push_str("\")\n");
            }
        }
    }
}
