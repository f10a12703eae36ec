use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;
use std::str::FromStr;

use log::{debug, warn};

use crate::utils::{GrammarError, Result, parse_weight, tokenize};

/// A weighted production rule: `lhs -> rhs` with a relative weight
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// Relative weight, normalized per lhs when a rule is selected
    pub weight: f64,
    /// The symbol this rule rewrites
    pub lhs: String,
    /// The replacement symbols, possibly empty
    pub rhs: Vec<String>,
}

impl Rule {
    /// Whether this rule rewrites its lhs to nothing
    pub fn is_epsilon(&self) -> bool {
        self.rhs.is_empty()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.weight, self.lhs)?;
        if !self.rhs.is_empty() {
            write!(f, "\t{}", self.rhs.join(" "))?;
        }
        Ok(())
    }
}

/// A weighted context-free grammar, indexed by lhs
///
/// Rules for each lhs are kept in declaration order. A symbol is a
/// nonterminal exactly when it has at least one rule here.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    rules: HashMap<String, Vec<Rule>>,
}

impl Grammar {
    /// Create a grammar with no rules
    pub fn new() -> Self {
        Grammar::default()
    }

    /// Parse a grammar from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(GrammarError::Io)?;
        let grammar = Self::from_reader(io::BufReader::new(file))?;
        debug!(
            "loaded {} rules for {} nonterminals from {}",
            grammar.rule_count(),
            grammar.rules.len(),
            path.display()
        );
        Ok(grammar)
    }

    /// Parse a grammar from any buffered reader, one rule per line
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut grammar = Grammar::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line.map_err(GrammarError::Io)?;
            grammar.load_line(idx + 1, &line)?;
        }
        Ok(grammar)
    }

    /// Parse a grammar from source text
    pub fn parse(source: &str) -> Result<Self> {
        Self::from_reader(source.as_bytes())
    }

    fn load_line(&mut self, line_no: usize, line: &str) -> Result<()> {
        let tokens = tokenize(line);
        match tokens.len() {
            0 => Ok(()),
            1 => {
                warn!("skipping line {}: expected `weight lhs rhs...`, got {:?}", line_no, line.trim());
                Ok(())
            }
            _ => {
                let weight = parse_weight(tokens[0]).ok_or_else(|| GrammarError::MalformedRule {
                    line: line_no,
                    text: line.to_string(),
                })?;
                self.push(Rule {
                    weight,
                    lhs: tokens[1].to_string(),
                    rhs: tokens[2..].iter().map(|s| s.to_string()).collect(),
                });
                Ok(())
            }
        }
    }

    fn push(&mut self, rule: Rule) {
        self.rules.entry(rule.lhs.clone()).or_default().push(rule);
    }

    /// The rules for `symbol` in declaration order; empty for terminals
    pub fn rules_for(&self, symbol: &str) -> &[Rule] {
        self.rules.get(symbol).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check if the grammar has any rule rewriting `symbol`
    pub fn is_nonterminal(&self, symbol: &str) -> bool {
        self.rules.contains_key(symbol)
    }

    /// All nonterminals, sorted
    pub fn nonterminals(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Total number of rules across every lhs
    pub fn rule_count(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    /// True when no rule has been loaded
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Sum of the weights of every rule for `lhs`
    pub fn total_weight(&self, lhs: &str) -> f64 {
        self.rules_for(lhs).iter().map(|r| r.weight).sum()
    }
}

impl FromStr for Grammar {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self> {
        Grammar::parse(s)
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for lhs in self.nonterminals() {
            for rule in self.rules_for(lhs) {
                writeln!(f, "{}", rule)?;
            }
        }
        Ok(())
    }
}

/// Builder for constructing Grammar instances in code
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    grammar: Grammar,
    rejected: Option<GrammarError>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        GrammarBuilder::default()
    }

    /// Add a rule; an invalid weight is reported by `build`
    pub fn rule(mut self, weight: f64, lhs: &str, rhs: &[&str]) -> Self {
        if self.rejected.is_some() {
            return self;
        }
        if !weight.is_finite() || weight < 0.0 {
            let line = self.grammar.rule_count() + 1;
            self.rejected = Some(GrammarError::MalformedRule {
                line,
                text: format!("{} {} {}", weight, lhs, rhs.join(" ")).trim_end().to_string(),
            });
            return self;
        }
        self.grammar.push(Rule {
            weight,
            lhs: lhs.to_string(),
            rhs: rhs.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    /// Build the grammar
    pub fn build(self) -> Result<Grammar> {
        match self.rejected {
            Some(err) => Err(err),
            None => Ok(self.grammar),
        }
    }
}
