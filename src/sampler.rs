use log::{debug, warn};
use rand::Rng;

use crate::grammar::{Grammar, Rule};
use crate::tree::DerivationNode;
use crate::utils::{GrammarError, Result};

/// Emitted in place of a nonterminal once the expansion budget is spent
pub const PLACEHOLDER: &str = "...";

/// Configuration options for sampling
#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    /// Symbol every sample starts from
    pub start_symbol: String,
    /// Maximum number of nonterminal expansions in one sample
    pub max_expansions: usize,
    /// Whether to render the derivation tree instead of the sentence
    pub tree: bool,
}

impl Default for SampleConfig {
    fn default() -> Self {
        SampleConfig {
            start_symbol: "ROOT".to_string(),
            max_expansions: 450,
            tree: false,
        }
    }
}

impl SampleConfig {
    pub fn new(start_symbol: &str, max_expansions: usize, tree: bool) -> Self {
        SampleConfig {
            start_symbol: start_symbol.to_string(),
            max_expansions,
            tree,
        }
    }

    /// Set the symbol every sample starts from
    pub fn with_start_symbol(mut self, start_symbol: &str) -> Self {
        self.start_symbol = start_symbol.to_string();
        self
    }

    /// Set the expansion budget
    pub fn with_max_expansions(mut self, max_expansions: usize) -> Self {
        self.max_expansions = max_expansions;
        self
    }

    /// Render derivation trees instead of sentences
    pub fn with_tree(mut self, tree: bool) -> Self {
        self.tree = tree;
        self
    }
}

/// One step of a derivation, in depth-first, left-to-right order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<'a> {
    /// A nonterminal was expanded; its children follow until the matching `Close`
    Open(&'a str),
    /// A terminal, or the placeholder for an unexpanded nonterminal
    Leaf(&'a str),
    Close,
}

/// The result of expanding one start symbol
#[derive(Debug, Clone, PartialEq)]
pub struct Derivation<'a> {
    events: Vec<Event<'a>>,
    expansions: usize,
    truncated: bool,
}

impl<'a> Derivation<'a> {
    pub fn events(&self) -> &[Event<'a>] {
        &self.events
    }

    /// Number of nonterminals expanded
    pub fn expansions(&self) -> usize {
        self.expansions
    }

    /// Whether the expansion budget cut the derivation short
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// The sampled sentence: each expansion joins its children with one space
    pub fn to_flat(&self) -> String {
        let mut out = String::new();
        // one entry per open expansion: has it produced a child yet
        let mut started: Vec<bool> = Vec::new();
        for event in &self.events {
            match *event {
                Event::Close => {
                    started.pop();
                }
                Event::Open(_) | Event::Leaf(_) => {
                    if let Some(seen) = started.last_mut() {
                        if *seen {
                            out.push(' ');
                        }
                        *seen = true;
                    }
                    match *event {
                        Event::Leaf(symbol) => out.push_str(symbol),
                        _ => started.push(false),
                    }
                }
            }
        }
        out
    }

    /// The derivation tree in bracket notation
    pub fn to_bracketed(&self) -> String {
        let mut out = String::new();
        let mut depth = 0usize;
        for event in &self.events {
            match *event {
                Event::Open(symbol) => {
                    if depth > 0 {
                        out.push(' ');
                    }
                    out.push('(');
                    out.push_str(symbol);
                    depth += 1;
                }
                Event::Leaf(symbol) => {
                    if depth > 0 {
                        out.push(' ');
                    }
                    out.push_str(symbol);
                }
                Event::Close => {
                    out.push(')');
                    depth = depth.saturating_sub(1);
                }
            }
        }
        out
    }

    /// The derivation tree as JSON, in the same shape `DerivationNode`
    /// serializes to: leaves are strings, expansions are
    /// `{"symbol": .., "children": [..]}`
    pub fn to_json(&self) -> Result<String> {
        let mut out = String::new();
        // one entry per open expansion: has it produced a child yet
        let mut started: Vec<bool> = Vec::new();
        for event in &self.events {
            if let Event::Close = *event {
                out.push_str("]}");
                started.pop();
                continue;
            }
            if let Some(seen) = started.last_mut() {
                if *seen {
                    out.push(',');
                }
                *seen = true;
            }
            match *event {
                Event::Open(symbol) => {
                    out.push_str("{\"symbol\":");
                    out.push_str(&serde_json::to_string(symbol)?);
                    out.push_str(",\"children\":[");
                    started.push(false);
                }
                Event::Leaf(symbol) => out.push_str(&serde_json::to_string(symbol)?),
                Event::Close => {}
            }
        }
        Ok(out)
    }

    /// Materialize the derivation as a tree of nodes
    pub fn to_tree(&self) -> Result<DerivationNode> {
        let mut stack: Vec<(&str, Vec<DerivationNode>)> = Vec::new();
        let mut root = None;
        for event in &self.events {
            let finished = match *event {
                Event::Open(symbol) => {
                    stack.push((symbol, Vec::new()));
                    continue;
                }
                Event::Leaf(symbol) => DerivationNode::leaf(symbol),
                Event::Close => {
                    let (symbol, children) = stack
                        .pop()
                        .ok_or_else(|| GrammarError::Parse("unbalanced derivation".to_string()))?;
                    DerivationNode::node(symbol, children)
                }
            };
            match stack.last_mut() {
                Some((_, children)) => children.push(finished),
                None => root = Some(finished),
            }
        }
        root.ok_or_else(|| GrammarError::Parse("empty derivation".to_string()))
    }
}

enum Work<'a> {
    Expand(&'a str),
    Close,
}

/// Draws random sentences from a grammar
#[derive(Debug, Clone)]
pub struct Sampler<'g> {
    grammar: &'g Grammar,
    config: SampleConfig,
}

impl<'g> Sampler<'g> {
    /// Create a sampler, warning when the start symbol has no rules
    pub fn new(grammar: &'g Grammar, config: SampleConfig) -> Self {
        if !grammar.is_nonterminal(&config.start_symbol) {
            warn!(
                "start symbol {:?} has no rules; every sample will be the symbol itself",
                config.start_symbol
            );
        }
        Sampler { grammar, config }
    }

    /// The configuration this sampler draws with
    pub fn config(&self) -> &SampleConfig {
        &self.config
    }

    /// Expand the start symbol once
    ///
    /// The walk uses an explicit work stack, so the budget rather than the
    /// call stack limits how deep a derivation can go.
    pub fn derive<'a, R: Rng>(&'a self, rng: &mut R) -> Result<Derivation<'a>> {
        let mut events = Vec::new();
        let mut expansions = 0usize;
        let mut truncated = false;
        let mut work = vec![Work::Expand(self.config.start_symbol.as_str())];

        while let Some(item) = work.pop() {
            let symbol = match item {
                Work::Close => {
                    events.push(Event::Close);
                    continue;
                }
                Work::Expand(symbol) => symbol,
            };

            let rules = self.grammar.rules_for(symbol);
            if rules.is_empty() {
                events.push(Event::Leaf(symbol));
                continue;
            }
            if expansions >= self.config.max_expansions {
                events.push(Event::Leaf(PLACEHOLDER));
                truncated = true;
                continue;
            }
            expansions += 1;

            let rule = choose_rule(symbol, rules, rng)?;
            events.push(Event::Open(symbol));
            work.push(Work::Close);
            work.extend(rule.rhs.iter().rev().map(|s| Work::Expand(s.as_str())));
        }

        debug!(
            "sampled {:?} with {} expansions{}",
            self.config.start_symbol,
            expansions,
            if truncated { " (budget exhausted)" } else { "" }
        );
        Ok(Derivation {
            events,
            expansions,
            truncated,
        })
    }

    /// Sample one output string, a sentence or a bracketed tree per the config
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Result<String> {
        let derivation = self.derive(rng)?;
        Ok(if self.config.tree {
            derivation.to_bracketed()
        } else {
            derivation.to_flat()
        })
    }

    /// Sample `count` independent outputs
    pub fn sample_many<R: Rng>(&self, rng: &mut R, count: usize) -> Result<Vec<String>> {
        (0..count).map(|_| self.sample(rng)).collect()
    }
}

/// Sample a sentence (or its tree when `as_tree` is set) from `start_symbol`
pub fn sample<R: Rng>(
    grammar: &Grammar,
    start_symbol: &str,
    max_expansions: usize,
    as_tree: bool,
    rng: &mut R,
) -> Result<String> {
    if !grammar.is_nonterminal(start_symbol) {
        debug!("start symbol {:?} has no rules", start_symbol);
    }
    let sampler = Sampler {
        grammar,
        config: SampleConfig::new(start_symbol, max_expansions, as_tree),
    };
    sampler.sample(rng)
}

/// Pick one of `rules` with probability proportional to its weight
///
/// Fails with `InvalidWeights` when every rule for `lhs` has weight zero.
pub fn choose_rule<'r, R: Rng>(lhs: &str, rules: &'r [Rule], rng: &mut R) -> Result<&'r Rule> {
    if !rules.iter().any(|r| r.weight > 0.0) {
        return Err(GrammarError::InvalidWeights(lhs.to_string()));
    }
    let draw: f64 = rng.gen_range(0.0..=1.0);
    select_rule(rules, draw).ok_or_else(|| GrammarError::InvalidWeights(lhs.to_string()))
}

/// Walk the rules in order and take the first whose cumulative normalized
/// weight reaches `draw`. Zero-weight rules are never taken; if rounding
/// keeps the running sum below `draw`, the last eligible rule wins.
fn select_rule(rules: &[Rule], draw: f64) -> Option<&Rule> {
    // weights are scaled by the largest one first so the sum stays finite
    let largest = rules.iter().map(|r| r.weight).fold(0.0, f64::max);
    if largest <= 0.0 {
        return None;
    }
    let total: f64 = rules.iter().map(|r| r.weight / largest).sum();

    let mut cumulative = 0.0;
    let mut last = None;
    for rule in rules.iter().filter(|r| r.weight > 0.0) {
        cumulative += rule.weight / largest / total;
        if cumulative >= draw {
            return Some(rule);
        }
        last = Some(rule);
    }
    last
}
