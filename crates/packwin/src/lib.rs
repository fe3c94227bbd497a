//! # Packwin
//!
//! A PEG parsing engine whose packrat memo table has a fixed size.
//!
//! ## Overview
//!
//! Packwin evaluates parsing expression grammars by recursive descent with
//! backtracking. Results of rule invocations are memoized, as in packrat
//! parsing, but in an [`ElasticCache`]: a table of `width × height` slots
//! allocated once and overwritten on collision. Memory is therefore bounded
//! independently of the input length, at the price of occasionally
//! recomputing a rule the cache has forgotten.
//!
//! - **Grammars**: named rules over the classic PEG operators (sequence,
//!   ordered choice, repetition, optional, lookahead) plus committed
//!   if-then-else and semantic actions
//! - **Bounded memoization**: the Elastic Sliding Window cache, correct under
//!   any collision pattern since full keys are compared on lookup
//! - **Diagnostics**: furthest-failure tracking and per-parse metrics
//! - **Parallel batches**: independent inputs on a rayon pool (`parallel`
//!   feature)
//!
//! ## Quick Start
//!
//! ```rust
//! use packwin::grammar::{Expr, GrammarBuilder, Value};
//! use packwin::parser::{PegConfig, PegParser};
//!
//! // Word <- [a-z]+ ; the action turns the matched letters into a String.
//! let grammar = GrammarBuilder::<char, String>::new()
//!     .rule(
//!         "Word",
//!         Expr::range('a', 'z')
//!             .one_or_more()
//!             .map(|letters| Value::Node(letters.symbols().into_iter().collect::<String>())),
//!     )
//!     .build()?;
//! let word = grammar.rule_id("Word").unwrap();
//!
//! let mut parser = PegParser::new(&grammar, PegConfig::default())?;
//! let input: Vec<char> = "packrat".chars().collect();
//! let value = parser.parse_complete(word, &input)?;
//! assert_eq!(value, Value::Node("packrat".to_string()));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Modules
//!
//! - [`grammar`] - Expressions, values and the grammar builder
//! - [`cache`] - The Elastic Sliding Window memo table
//! - [`parser`] - The packrat engine and the [`PegParser`] facade
//! - [`error`] - Error types and diagnostics
//! - [`testing`] - Sample grammars and input generators
//!
//! ## Feature Flags
//!
//! - `parallel` (default): `parser::parallel` batch parsing with rayon
//! - `serialize`: serde support for configuration and statistics types
//! - `diagnostics`: `miette` integration for error types

pub mod cache;
pub mod error;
pub mod grammar;
pub mod parser;
pub mod testing;

// Re-export commonly used types
pub use cache::{CacheConfig, CacheStats, ElasticCache};
pub use error::{CacheError, GrammarError, ParseError};
pub use grammar::{Action, Expr, Grammar, GrammarBuilder, RuleId, Symbol, Value};
pub use parser::{ParseMetrics, ParseOutcome, ParseResult, PegConfig, PegParser};
