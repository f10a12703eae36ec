//! Derivation trees and their bracket notation.
//!
//! A tree is written as `(LHS child child ...)`, nested arbitrarily, with
//! terminals and the `...` placeholder left unparenthesized. A nonterminal
//! rewritten by an empty rule prints as `(LHS)`.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::utils::{GrammarError, Result};

/// One node of a derivation tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DerivationNode {
    /// A terminal symbol or the budget placeholder
    Leaf(String),
    /// An expanded nonterminal and the symbols it was rewritten to
    Node {
        symbol: String,
        children: Vec<DerivationNode>,
    },
}

impl DerivationNode {
    pub fn leaf(symbol: &str) -> Self {
        DerivationNode::Leaf(symbol.to_string())
    }

    pub fn node(symbol: &str, children: Vec<DerivationNode>) -> Self {
        DerivationNode::Node {
            symbol: symbol.to_string(),
            children,
        }
    }

    /// The symbol at this node
    pub fn symbol(&self) -> &str {
        match self {
            DerivationNode::Leaf(symbol) => symbol,
            DerivationNode::Node { symbol, .. } => symbol,
        }
    }

    /// Children of an expanded node; empty for leaves
    pub fn children(&self) -> &[DerivationNode] {
        match self {
            DerivationNode::Leaf(_) => &[],
            DerivationNode::Node { children, .. } => children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, DerivationNode::Leaf(_))
    }

    /// Leaves from left to right: the sentence this tree derives
    pub fn yield_terminals(&self) -> Vec<&str> {
        let mut leaves = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                DerivationNode::Leaf(symbol) => leaves.push(symbol.as_str()),
                DerivationNode::Node { children, .. } => stack.extend(children.iter().rev()),
            }
        }
        leaves
    }

    /// Render in single-line bracket notation
    pub fn to_bracketed(&self) -> String {
        self.render(false)
    }

    /// Render as an indented, multi-line tree
    ///
    /// A node whose children are all leaves stays on one line. Otherwise the
    /// first child follows the label and later children are aligned under it.
    pub fn pretty(&self) -> String {
        self.render(true)
    }

    fn render(&self, indent: bool) -> String {
        let mut out = String::new();
        let mut stack = vec![Piece::Node(self, 0)];
        while let Some(piece) = stack.pop() {
            match piece {
                Piece::Space => out.push(' '),
                Piece::Indent(column) => {
                    out.push('\n');
                    out.extend(std::iter::repeat(' ').take(column));
                }
                Piece::Close => out.push(')'),
                Piece::Node(DerivationNode::Leaf(symbol), _) => out.push_str(symbol),
                Piece::Node(DerivationNode::Node { symbol, children }, column) => {
                    out.push('(');
                    out.push_str(symbol);
                    stack.push(Piece::Close);
                    let broken = indent && !children.iter().all(Self::is_leaf);
                    let child_column = column + symbol.chars().count() + 2;
                    for (i, child) in children.iter().enumerate().rev() {
                        stack.push(Piece::Node(child, child_column));
                        stack.push(if broken && i > 0 { Piece::Indent(child_column) } else { Piece::Space });
                    }
                }
            }
        }
        out
    }

    /// Parse bracket notation back into a tree
    pub fn from_bracketed(text: &str) -> Result<Self> {
        let token_regex = Regex::new(r"\(|\)|[^\s()]+").map_err(|e| GrammarError::Parse(e.to_string()))?;
        let mut tokens = token_regex.find_iter(text).map(|m| m.as_str());

        let mut stack: Vec<(String, Vec<DerivationNode>)> = Vec::new();
        let mut root: Option<DerivationNode> = None;

        while let Some(token) = tokens.next() {
            if root.is_some() {
                return Err(GrammarError::Parse(format!("unexpected {:?} after complete tree", token)));
            }
            match token {
                "(" => match tokens.next() {
                    Some(label) if label != "(" && label != ")" => {
                        stack.push((label.to_string(), Vec::new()));
                    }
                    other => {
                        return Err(GrammarError::Parse(format!(
                            "expected a label after '(', found {:?}",
                            other.unwrap_or("end of input")
                        )));
                    }
                },
                ")" => {
                    let (symbol, children) = stack
                        .pop()
                        .ok_or_else(|| GrammarError::Parse("unbalanced ')'".to_string()))?;
                    let node = DerivationNode::Node { symbol, children };
                    match stack.last_mut() {
                        Some((_, siblings)) => siblings.push(node),
                        None => root = Some(node),
                    }
                }
                atom => match stack.last_mut() {
                    Some((_, siblings)) => siblings.push(DerivationNode::leaf(atom)),
                    None => root = Some(DerivationNode::leaf(atom)),
                },
            }
        }

        if !stack.is_empty() {
            return Err(GrammarError::Parse(format!("{} unclosed '('", stack.len())));
        }
        root.ok_or_else(|| GrammarError::Parse("empty tree".to_string()))
    }
}

impl fmt::Display for DerivationNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_bracketed())
    }
}

// Children are detached onto a flat stack so a deep chain does not drop
// recursively.
impl Drop for DerivationNode {
    fn drop(&mut self) {
        let DerivationNode::Node { children, .. } = self else {
            return;
        };
        let mut pending = std::mem::take(children);
        while let Some(mut node) = pending.pop() {
            if let DerivationNode::Node { children, .. } = &mut node {
                pending.append(children);
            }
        }
    }
}

enum Piece<'a> {
    Node(&'a DerivationNode, usize),
    Space,
    Indent(usize),
    Close,
}
