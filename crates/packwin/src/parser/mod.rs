//! # Parser Module
//!
//! Packrat evaluation of a [`Grammar`] over a slice of symbols.
//!
//! ## Overview
//!
//! Parsing uses ordered choice (first match wins) and backtracking with
//! memoization. Memoized rule outcomes live in an
//! [`ElasticCache`](crate::cache::ElasticCache), so memory stays at
//! `width × height` slots however long the input is; results the cache has
//! forgotten are simply recomputed.
//!
//! Two entry points are provided:
//!
//! - [`parse`] and [`parse_with_config`]: free functions taking an explicit
//!   cache
//! - [`PegParser`]: owns a cache sized for its grammar and clears it before
//!   every parse
//!
//! ## Example
//!
//! ```rust
//! use packwin::grammar::{Expr, GrammarBuilder};
//! use packwin::parser::{PegConfig, PegParser};
//!
//! let grammar = GrammarBuilder::<char, ()>::new()
//!     .rule("Digits", Expr::range('0', '9').one_or_more())
//!     .build()?;
//! let start = grammar.rule_id("Digits").unwrap();
//!
//! let mut parser = PegParser::new(&grammar, PegConfig::default())?;
//! let result = parser.parse(start, &['4', '2', 'x'])?;
//! assert_eq!(result.outcome.end(), Some(2));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod config;
mod engine;
mod outcome;
#[cfg(feature = "parallel")]
pub mod parallel;

pub use config::PegConfig;
pub use engine::{MemoCache, parse, parse_with_config};
pub use outcome::{Expected, Failure, ParseMetrics, ParseOutcome, ParseResult};

use crate::error::ParseError;
use crate::grammar::{Grammar, RuleId, Symbol, Value};

/// A packrat parser bound to one grammar.
///
/// The parser owns its cache. Its height is the grammar's rule count, so
/// every rule id can be keyed without aliasing.
pub struct PegParser<'g, S, V> {
    grammar: &'g Grammar<S, V>,
    cache: MemoCache<S, V>,
    config: PegConfig,
}

impl<'g, S, V> PegParser<'g, S, V>
where
    S: Symbol,
    V: Clone,
{
    /// Creates a parser with a `config.window_width × rule count` cache.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Cache`] if the window width is zero or the cache
    /// would be too large.
    pub fn new(grammar: &'g Grammar<S, V>, config: PegConfig) -> Result<Self, ParseError> {
        let cache = MemoCache::new(config.window_width, grammar.len().max(1))?;
        Ok(Self {
            grammar,
            cache,
            config,
        })
    }

    /// Creates a parser around a caller-sized cache.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::RuleIdOverflow`] if the cache cannot key every
    /// rule of `grammar`.
    pub fn with_cache(
        grammar: &'g Grammar<S, V>,
        cache: MemoCache<S, V>,
        config: PegConfig,
    ) -> Result<Self, ParseError> {
        if grammar.len() as u64 > cache.max_rules() {
            return Err(ParseError::RuleIdOverflow {
                rules: grammar.len(),
                max: cache.max_rules(),
            });
        }
        Ok(Self {
            grammar,
            cache,
            config,
        })
    }

    #[must_use]
    pub const fn grammar(&self) -> &'g Grammar<S, V> {
        self.grammar
    }

    #[must_use]
    pub const fn config(&self) -> &PegConfig {
        &self.config
    }

    /// The memo table, as left by the last parse.
    #[must_use]
    pub const fn cache(&self) -> &MemoCache<S, V> {
        &self.cache
    }

    /// Drops every memoized outcome.
    pub fn reset(&mut self) {
        self.cache.clear();
    }

    /// Parses a prefix of `input` starting with rule `start`.
    ///
    /// # Errors
    ///
    /// Fails if `start` is unknown or the depth limit is exceeded. A
    /// non-matching input is not an error: see [`ParseResult::outcome`].
    pub fn parse(&mut self, start: RuleId, input: &[S]) -> Result<ParseResult<S, V>, ParseError> {
        self.cache.clear();
        parse_with_config(
            self.grammar,
            start,
            input,
            Some(&mut self.cache),
            &self.config,
        )
    }

    /// Parses all of `input` and returns the value of `start`.
    ///
    /// # Errors
    ///
    /// Besides the errors of [`parse`](Self::parse), returns
    /// [`ParseError::NoMatch`] if `start` fails and
    /// [`ParseError::Incomplete`] if it matches only a prefix.
    pub fn parse_complete(&mut self, start: RuleId, input: &[S]) -> Result<Value<S, V>, ParseError> {
        let result = self.parse(start, input)?;
        match result.outcome {
            ParseOutcome::Success { end, value } if end == input.len() => Ok(value),
            ParseOutcome::Success { end, .. } => Err(ParseError::Incomplete {
                consumed: end,
                len: input.len(),
            }),
            ParseOutcome::Fail => Err(ParseError::NoMatch {
                furthest: result
                    .furthest_failure
                    .map_or(0, |failure| failure.position),
            }),
        }
    }
}

impl<S, V> std::fmt::Debug for PegParser<'_, S, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PegParser")
            .field("rules", &self.grammar.len())
            .field("capacity", &self.cache.capacity())
            .field("config", &self.config)
            .finish()
    }
}
