//! Values produced by a successful match.
//!
//! The shape of a value is fixed by the operator that produced it: a
//! sequence always yields a [`Value::Pair`], a repetition a [`Value::List`],
//! and so on. Semantic actions consume these shapes and usually return a
//! [`Value::Node`] carrying the embedder's own type.

/// Structured result of a match.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<S, V> {
    /// No information (empty, literals, lookahead).
    Unit,
    /// A single matched input symbol (`Any`, `Range`).
    Symbol(S),
    /// Both halves of a sequence.
    Pair(Box<Value<S, V>>, Box<Value<S, V>>),
    /// Every iteration of a repetition, in input order.
    List(Vec<Value<S, V>>),
    /// An optional match: `None` when the inner expression failed.
    Maybe(Option<Box<Value<S, V>>>),
    /// Which branch an if-then-else took, and that branch's value.
    Branch(bool, Box<Value<S, V>>),
    /// A value produced by a semantic action.
    Node(V),
}

impl<S, V> Value<S, V> {
    #[must_use]
    pub fn pair(first: Self, second: Self) -> Self {
        Self::Pair(Box::new(first), Box::new(second))
    }

    #[must_use]
    pub fn maybe(value: Option<Self>) -> Self {
        Self::Maybe(value.map(Box::new))
    }

    #[must_use]
    pub fn branch(taken: bool, value: Self) -> Self {
        Self::Branch(taken, Box::new(value))
    }

    #[must_use]
    pub const fn is_unit(&self) -> bool {
        matches!(self, Self::Unit)
    }

    #[must_use]
    pub const fn as_symbol(&self) -> Option<&S> {
        match self {
            Self::Symbol(symbol) => Some(symbol),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_node(&self) -> Option<&V> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_node(self) -> Option<V> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_pair(self) -> Option<(Self, Self)> {
        match self {
            Self::Pair(first, second) => Some((*first, *second)),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_list(self) -> Option<Vec<Self>> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Unwraps a [`Value::Maybe`]; the outer `Option` is `None` for any other shape.
    #[must_use]
    pub fn into_maybe(self) -> Option<Option<Self>> {
        match self {
            Self::Maybe(inner) => Some(inner.map(|value| *value)),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_branch(self) -> Option<(bool, Self)> {
        match self {
            Self::Branch(taken, value) => Some((taken, *value)),
            _ => None,
        }
    }
}

impl<S: Clone, V> Value<S, V> {
    /// Collects every [`Value::Symbol`] in the tree, left to right.
    ///
    /// Handy for turning a match such as `[0-9]+` back into its text.
    #[must_use]
    pub fn symbols(&self) -> Vec<S> {
        let mut out = Vec::new();
        self.collect_symbols(&mut out);
        out
    }

    fn collect_symbols(&self, out: &mut Vec<S>) {
        match self {
            Self::Symbol(symbol) => out.push(symbol.clone()),
            Self::Pair(first, second) => {
                first.collect_symbols(out);
                second.collect_symbols(out);
            }
            Self::List(items) => {
                for item in items {
                    item.collect_symbols(out);
                }
            }
            Self::Maybe(Some(inner)) | Self::Branch(_, inner) => inner.collect_symbols(out),
            Self::Unit | Self::Maybe(None) | Self::Node(_) => {}
        }
    }
}
