//! # Error Types
//!
//! Errors raised while building grammars, sizing caches and driving a parse.
//!
//! ## Overview
//!
//! A match failure is *not* an error: it is an ordinary
//! [`ParseOutcome::Fail`](crate::parser::ParseOutcome::Fail) that ordered
//! choice, optionals and repetition absorb. The types here cover everything
//! else:
//!
//! - [`GrammarError`]: a grammar that cannot be executed (undefined or
//!   duplicate rules, left recursion)
//! - [`CacheError`]: invalid cache dimensions
//! - [`ParseError`]: configuration problems detected when a parse starts,
//!   the rule depth limit, and the "full parse" policy of
//!   [`PegParser::parse_complete`](crate::parser::PegParser::parse_complete)
//!
//! ## Diagnostics Support
//!
//! When the `diagnostics` feature is enabled, errors integrate with [`miette`]
//! for rich error reporting.

use crate::grammar::RuleId;
use compact_str::CompactString;
use thiserror::Error;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

/// Errors detected while building a [`Grammar`](crate::grammar::Grammar).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum GrammarError {
    #[error("Grammar has no rules")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::empty)))]
    Empty,

    #[error("Undefined rule: {0}")]
    #[cfg_attr(
        feature = "diagnostics",
        diagnostic(
            code(grammar::undefined_rule),
            help("the rule is referenced but never given a body")
        )
    )]
    UndefinedRule(CompactString),

    #[error("Rule defined more than once: {0}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::duplicate_rule)))]
    DuplicateRule(CompactString),

    #[error("Left recursion detected: {}", display_cycle(.0))]
    #[cfg_attr(
        feature = "diagnostics",
        diagnostic(
            code(grammar::left_recursion),
            help("rewrite the rule so it consumes input before calling itself")
        )
    )]
    LeftRecursion(Vec<CompactString>),

    #[error("Too many rules: {0} exceeds the rule id range")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::too_many_rules)))]
    TooManyRules(usize),
}

fn display_cycle(names: &[CompactString]) -> String {
    names
        .iter()
        .map(CompactString::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Invalid dimensions for an [`ElasticCache`](crate::cache::ElasticCache).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum CacheError {
    #[error("Cache dimensions must be non-zero (width {width}, height {height})")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(cache::zero_dimension)))]
    ZeroDimension { width: usize, height: usize },

    #[error("Cache of {width}x{height} slots exceeds the addressable slot range")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(cache::too_large)))]
    TooLarge { width: usize, height: usize },
}

/// Errors that abort a parse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum ParseError {
    #[error("Unknown rule {0}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parser::unknown_rule)))]
    UnknownRule(RuleId),

    #[error("Grammar has {rules} rules but the cache can only key {max} rule ids")]
    #[cfg_attr(
        feature = "diagnostics",
        diagnostic(
            code(parser::rule_id_overflow),
            help("increase the cache height to at least the number of rules")
        )
    )]
    RuleIdOverflow { rules: usize, max: u64 },

    #[error("Maximum rule depth ({limit}) exceeded at position {position}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parser::depth_exceeded)))]
    DepthExceeded { limit: usize, position: usize },

    #[error("No match; furthest failure at position {furthest}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parser::no_match)))]
    NoMatch { furthest: usize },

    #[error("Input only partially consumed ({consumed} of {len} symbols)")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parser::incomplete)))]
    Incomplete { consumed: usize, len: usize },

    #[error(transparent)]
    #[cfg_attr(feature = "diagnostics", diagnostic(transparent))]
    Cache(#[from] CacheError),
}
