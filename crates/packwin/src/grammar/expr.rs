//! Parsing expressions.
//!
//! [`Expr`] is a closed sum type over the PEG operators. Grammars are data:
//! the engine walks these trees with a single recursive `match`.

use crate::grammar::{RuleId, Value};
use std::sync::Arc;

/// A semantic action attached with [`Expr::Redirect`].
///
/// Actions are pure functions from the matched value to a new value. They
/// receive nothing but that value, so they cannot observe or disturb the
/// parser's position or its cache.
pub struct Action<S, V>(Arc<dyn Fn(Value<S, V>) -> Value<S, V> + Send + Sync>);

impl<S, V> Action<S, V> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Value<S, V>) -> Value<S, V> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    #[must_use]
    pub fn apply(&self, value: Value<S, V>) -> Value<S, V> {
        (self.0)(value)
    }
}

impl<S, V> Clone for Action<S, V> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<S, V> std::fmt::Debug for Action<S, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Action(..)")
    }
}

/// Parsing expression.
#[derive(Debug, Clone)]
pub enum Expr<S, V> {
    /// Always succeeds without consuming input.
    Empty,
    /// Match exactly this symbol.
    Literal(S),
    /// Match any single symbol.
    Any,
    /// Match one symbol in the inclusive range `lo..=hi`.
    Range(S, S),
    /// Invoke another rule (memoized).
    Rule(RuleId),
    /// Match both expressions in order.
    Sequence(Box<Expr<S, V>>, Box<Expr<S, V>>),
    /// Ordered choice: the second alternative is only tried if the first fails.
    Choice(Box<Expr<S, V>>, Box<Expr<S, V>>),
    /// Zero or more repetitions; never fails.
    ZeroOrMore(Box<Expr<S, V>>),
    /// One or more repetitions.
    OneOrMore(Box<Expr<S, V>>),
    /// Zero or one occurrence; never fails.
    Optional(Box<Expr<S, V>>),
    /// Positive lookahead: succeeds without consuming if the expression matches.
    And(Box<Expr<S, V>>),
    /// Negative lookahead: succeeds without consuming if the expression fails.
    Not(Box<Expr<S, V>>),
    /// Generalized cut.
    ///
    /// Once `condition` matches the parse is committed to `then`; `otherwise`
    /// is only tried (from the original position) when `condition` fails.
    IfThenElse {
        condition: Box<Expr<S, V>>,
        then: Box<Expr<S, V>>,
        otherwise: Box<Expr<S, V>>,
    },
    /// Run an action on the value of a successful match.
    Redirect(Box<Expr<S, V>>, Action<S, V>),
}

// Builder methods
impl<S, V> Expr<S, V> {
    #[must_use]
    pub const fn empty() -> Self {
        Self::Empty
    }

    /// An expression that never matches (`!()`).
    #[must_use]
    pub fn fail() -> Self {
        Self::Not(Box::new(Self::Empty))
    }

    #[must_use]
    pub const fn literal(symbol: S) -> Self {
        Self::Literal(symbol)
    }

    #[must_use]
    pub const fn any() -> Self {
        Self::Any
    }

    #[must_use]
    pub const fn range(lo: S, hi: S) -> Self {
        Self::Range(lo, hi)
    }

    #[must_use]
    pub const fn rule(id: RuleId) -> Self {
        Self::Rule(id)
    }

    /// Sequence of literals, e.g. a keyword.
    ///
    /// The value nests right: `"ab"` yields `Pair(Unit, Unit)`.
    #[must_use]
    pub fn literals<I>(symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
    {
        Self::seq_all(symbols.into_iter().map(Self::Literal))
    }

    #[must_use]
    pub fn seq(first: Self, second: Self) -> Self {
        Self::Sequence(Box::new(first), Box::new(second))
    }

    /// Right-nested sequence of all expressions; empty input gives [`Expr::Empty`].
    #[must_use]
    pub fn seq_all<I>(exprs: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut exprs: Vec<_> = exprs.into_iter().collect();
        let Some(mut acc) = exprs.pop() else {
            return Self::Empty;
        };
        while let Some(expr) = exprs.pop() {
            acc = Self::seq(expr, acc);
        }
        acc
    }

    #[must_use]
    pub fn choice(first: Self, second: Self) -> Self {
        Self::Choice(Box::new(first), Box::new(second))
    }

    /// Right-nested ordered choice; empty input gives [`Expr::fail`].
    #[must_use]
    pub fn choice_all<I>(exprs: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let mut exprs: Vec<_> = exprs.into_iter().collect();
        let Some(mut acc) = exprs.pop() else {
            return Self::fail();
        };
        while let Some(expr) = exprs.pop() {
            acc = Self::choice(expr, acc);
        }
        acc
    }

    #[must_use]
    pub fn if_then_else(condition: Self, then: Self, otherwise: Self) -> Self {
        Self::IfThenElse {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        }
    }

    #[must_use]
    pub fn then(self, next: Self) -> Self {
        Self::seq(self, next)
    }

    #[must_use]
    pub fn or(self, alternative: Self) -> Self {
        Self::choice(self, alternative)
    }

    #[must_use]
    pub fn zero_or_more(self) -> Self {
        Self::ZeroOrMore(Box::new(self))
    }

    #[must_use]
    pub fn one_or_more(self) -> Self {
        Self::OneOrMore(Box::new(self))
    }

    #[must_use]
    pub fn optional(self) -> Self {
        Self::Optional(Box::new(self))
    }

    #[must_use]
    pub fn and(self) -> Self {
        Self::And(Box::new(self))
    }

    #[must_use]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Attach a semantic action ([`Expr::Redirect`]).
    #[must_use]
    pub fn map<F>(self, f: F) -> Self
    where
        F: Fn(Value<S, V>) -> Value<S, V> + Send + Sync + 'static,
    {
        Self::Redirect(Box::new(self), Action::new(f))
    }

    /// Calls `f` on every rule this expression references directly.
    pub fn for_each_rule(&self, f: &mut impl FnMut(RuleId)) {
        match self {
            Self::Rule(id) => f(*id),
            Self::Sequence(first, second) | Self::Choice(first, second) => {
                first.for_each_rule(f);
                second.for_each_rule(f);
            }
            Self::ZeroOrMore(inner)
            | Self::OneOrMore(inner)
            | Self::Optional(inner)
            | Self::And(inner)
            | Self::Not(inner)
            | Self::Redirect(inner, _) => inner.for_each_rule(f),
            Self::IfThenElse {
                condition,
                then,
                otherwise,
            } => {
                condition.for_each_rule(f);
                then.for_each_rule(f);
                otherwise.for_each_rule(f);
            }
            Self::Empty | Self::Literal(_) | Self::Any | Self::Range(..) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_all_nests_to_the_right() {
        let expr: Expr<char, ()> = Expr::literals("abc".chars());
        let Expr::Sequence(first, rest) = expr else {
            panic!("expected a sequence");
        };
        assert!(matches!(*first, Expr::Literal('a')));
        assert!(matches!(*rest, Expr::Sequence(..)));
    }

    #[test]
    fn empty_combinators_have_neutral_elements() {
        assert!(matches!(Expr::<char, ()>::seq_all([]), Expr::Empty));
        assert!(matches!(Expr::<char, ()>::choice_all([]), Expr::Not(_)));
    }

    #[test]
    fn for_each_rule_visits_nested_references() {
        let expr: Expr<char, ()> = Expr::rule(RuleId::new(0))
            .then(Expr::rule(RuleId::new(2)).optional())
            .or(Expr::if_then_else(
                Expr::rule(RuleId::new(1)),
                Expr::Empty,
                Expr::Empty,
            ));
        let mut seen = Vec::new();
        expr.for_each_rule(&mut |id| seen.push(id.get()));
        assert_eq!(seen, vec![0, 2, 1]);
    }
}
