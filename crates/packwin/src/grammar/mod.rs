//! # Grammar Module
//!
//! Grammar definition for parsing expression grammars.
//!
//! ## Overview
//!
//! A grammar is a table of named rules, each holding an [`Expr`] tree built
//! from the fixed set of PEG operators. Rules refer to each other through
//! dense [`RuleId`]s handed out by the [`GrammarBuilder`], so mutually
//! recursive rules never need cyclic ownership.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use packwin::grammar::{Expr, GrammarBuilder};
//!
//! let mut builder = GrammarBuilder::<char, ()>::new();
//! let list = builder.declare("List");
//! let grammar = builder
//!     .rule("List", Expr::literal('[').then(Expr::rule(list).optional()).then(Expr::literal(']')))
//!     .build()?;
//! # Ok::<(), packwin::error::GrammarError>(())
//! ```
//!
//! ## Additional Modules
//!
//! - [`value`]: the structured values produced by operators and actions
//! - [`analysis`]: nullability and left-recursion checks run at build time

pub mod analysis;
pub mod builder;
pub mod expr;
pub mod value;

pub use builder::*;
pub use expr::*;
pub use value::*;

/// Trait for input symbols.
///
/// Symbols are only ever compared: by equality for literals and by
/// ordering for ranges. Any type with the listed traits qualifies, so
/// `char`, `u8` and plain token enums work out of the box.
pub trait Symbol:
    Clone + std::fmt::Debug + Eq + std::hash::Hash + PartialOrd + Send + Sync + 'static
{
}

impl<S> Symbol for S where
    S: Clone + std::fmt::Debug + Eq + std::hash::Hash + PartialOrd + Send + Sync + 'static
{
}

/// Dense identifier of a rule inside one [`Grammar`].
///
/// Identifiers are assigned in declaration order starting from zero and stay
/// stable for the lifetime of the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleId(u32);

impl RuleId {
    #[must_use]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Raw identifier, as used in cache keys.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Index into the grammar's rule table.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}
