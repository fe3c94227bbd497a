use crate::grammar::Value;
use std::time::Duration;

/// Result of evaluating a rule at a position.
///
/// `Fail` carries no payload: in PEG a failure is a control signal, not an
/// error.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome<S, V> {
    Fail,
    Success { end: usize, value: Value<S, V> },
}

impl<S, V> ParseOutcome<S, V> {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Position just past the match.
    #[must_use]
    pub const fn end(&self) -> Option<usize> {
        match self {
            Self::Success { end, .. } => Some(*end),
            Self::Fail => None,
        }
    }

    #[must_use]
    pub const fn value(&self) -> Option<&Value<S, V>> {
        match self {
            Self::Success { value, .. } => Some(value),
            Self::Fail => None,
        }
    }

    #[must_use]
    pub fn into_value(self) -> Option<Value<S, V>> {
        match self {
            Self::Success { value, .. } => Some(value),
            Self::Fail => None,
        }
    }
}

/// A terminal the parser tried to match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected<S> {
    Literal(S),
    Any,
    Range(S, S),
}

impl<S: std::fmt::Debug> std::fmt::Display for Expected<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Literal(symbol) => write!(f, "{symbol:?}"),
            Self::Any => f.write_str("any symbol"),
            Self::Range(lo, hi) => write!(f, "{lo:?}..={hi:?}"),
        }
    }
}

/// The furthest point a parse reached before failing.
///
/// Purely diagnostic: it never influences the outcome. Terminals tried
/// inside lookahead are not recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure<S> {
    pub position: usize,
    pub expected: Vec<Expected<S>>,
}

impl<S: std::fmt::Debug> std::fmt::Display for Failure<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "at position {}: expected ", self.position)?;
        for (i, expected) in self.expected.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{expected}")?;
        }
        Ok(())
    }
}

/// Parse statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct ParseMetrics {
    /// Rule invocations, including those answered from the cache
    pub rule_calls: usize,
    /// Invocations answered from the cache
    pub cache_hits: usize,
    /// Invocations that had to evaluate the rule body
    pub cache_misses: usize,
    /// Deepest nesting of rule invocations
    pub max_depth: usize,
    /// Wall-clock time of the parse
    pub parse_time: Duration,
}

/// Outcome of a parse plus diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult<S, V> {
    pub outcome: ParseOutcome<S, V>,
    /// Set whenever some terminal failed during the parse, even if the
    /// overall parse succeeded.
    pub furthest_failure: Option<Failure<S>>,
    pub metrics: ParseMetrics,
}

impl<S, V> ParseResult<S, V> {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    /// Whether the match covered all `len` symbols of the input.
    #[must_use]
    pub fn is_complete(&self, len: usize) -> bool {
        self.outcome.end() == Some(len)
    }
}
