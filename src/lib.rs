//! randsent generates random sentences from a weighted context-free grammar.
//!
//! A grammar file holds one rule per line: a relative weight, the left-hand
//! symbol, then the right-hand symbols, separated by any whitespace. Text
//! after `#` is a comment. Symbols that never appear on the left are
//! terminals and are copied to the output as-is.
//!
//! # Example
//!
//! ```rust
//! use randsent::{Grammar, SampleConfig, Sampler};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let grammar = Grammar::parse(
//!     "1 ROOT Hello SUBJ\n\
//!      1 SUBJ world\n\
//!      3 SUBJ Rust   # three times as likely",
//! )
//! .unwrap();
//!
//! let sampler = Sampler::new(&grammar, SampleConfig::default());
//! let mut rng = StdRng::seed_from_u64(2024);
//! let text = sampler.sample(&mut rng).unwrap();
//! assert!(text == "Hello world" || text == "Hello Rust");
//! ```

pub mod grammar;
pub mod sampler;
pub mod tree;
pub mod utils;

pub use grammar::{Grammar, GrammarBuilder, Rule};
pub use sampler::{Derivation, Event, PLACEHOLDER, SampleConfig, Sampler, sample};
pub use tree::DerivationNode;
pub use utils::{GrammarError, Result};
