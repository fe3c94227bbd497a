use crate::error::GrammarError;
use crate::grammar::{Expr, RuleId, analysis};
use compact_str::CompactString;
use hashbrown::HashMap;
use lasso::{Rodeo, RodeoReader, Spur};

/// A compiled, immutable grammar.
///
/// Rules are stored in a table indexed by [`RuleId`], so expressions refer
/// to other rules by id. Rule names are interned and only needed for lookups
/// and error messages.
///
/// # Example
///
/// ```rust,no_run
/// use packwin::grammar::{Expr, GrammarBuilder};
///
/// let mut builder = GrammarBuilder::<char, ()>::new();
/// let digit = builder.declare("Digit");
/// let grammar = builder
///     .rule("Digits", Expr::rule(digit).one_or_more())
///     .rule("Digit", Expr::range('0', '9'))
///     .build()
///     .expect("Failed to build grammar");
/// assert_eq!(grammar.len(), 2);
/// ```
pub struct Grammar<S, V> {
    rules: Vec<Rule<S, V>>,
    ids: HashMap<Spur, RuleId, ahash::RandomState>,
    /// Interned rule names, frozen for lock-free reads from parallel parses.
    interner: RodeoReader,
    nullable: Vec<bool>,
}

/// Production rule
pub struct Rule<S, V> {
    pub id: RuleId,
    pub name: Spur,
    pub body: Expr<S, V>,
}

impl<S, V> Grammar<S, V> {
    #[must_use]
    pub fn rule(&self, id: RuleId) -> Option<&Rule<S, V>> {
        self.rules.get(id.index())
    }

    /// Looks up a rule id by name.
    #[must_use]
    pub fn rule_id(&self, name: &str) -> Option<RuleId> {
        let spur = self.interner.get(name)?;
        self.ids.get(&spur).copied()
    }

    #[must_use]
    pub fn name(&self, id: RuleId) -> Option<&str> {
        self.rule(id).map(|rule| self.interner.resolve(&rule.name))
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule<S, V>> {
        self.rules.iter()
    }

    /// Number of rules; every [`RuleId`] of this grammar is below it.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether the rule can succeed without consuming input.
    #[must_use]
    pub fn is_nullable(&self, id: RuleId) -> bool {
        self.nullable.get(id.index()).copied().unwrap_or(false)
    }
}

impl<S, V> std::fmt::Debug for Grammar<S, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grammar")
            .field(
                "rules",
                &self
                    .rules
                    .iter()
                    .map(|rule| self.interner.resolve(&rule.name))
                    .collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

/// Builder for [`Grammar`].
///
/// Rule ids are handed out by [`declare`](Self::declare) in declaration
/// order, which lets a rule body reference rules defined later.
pub struct GrammarBuilder<S, V> {
    interner: Rodeo,
    ids: HashMap<Spur, RuleId, ahash::RandomState>,
    names: Vec<Spur>,
    bodies: Vec<Option<Expr<S, V>>>,
    duplicates: Vec<Spur>,
}

impl<S, V> Default for GrammarBuilder<S, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, V> GrammarBuilder<S, V> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            interner: Rodeo::new(),
            ids: HashMap::with_hasher(ahash::RandomState::new()),
            names: Vec::new(),
            bodies: Vec::new(),
            duplicates: Vec::new(),
        }
    }

    /// Returns the id for `name`, allocating the next dense id on first use.
    pub fn declare(&mut self, name: &str) -> RuleId {
        let spur = self.interner.get_or_intern(name);
        if let Some(id) = self.ids.get(&spur) {
            return *id;
        }
        // Overflow past u32::MAX is reported by `build`.
        let id = RuleId::new(u32::try_from(self.names.len()).unwrap_or(u32::MAX));
        self.ids.insert(spur, id);
        self.names.push(spur);
        self.bodies.push(None);
        id
    }

    /// Gives `name` its body, declaring it if needed.
    #[must_use]
    pub fn rule(mut self, name: &str, body: Expr<S, V>) -> Self {
        self.define(name, body);
        self
    }

    /// Non-consuming form of [`rule`](Self::rule).
    pub fn define(&mut self, name: &str, body: Expr<S, V>) -> RuleId {
        let id = self.declare(name);
        let slot = &mut self.bodies[id.index()];
        if slot.is_some() {
            self.duplicates.push(self.names[id.index()]);
        }
        *slot = Some(body);
        id
    }

    /// Build the grammar from the configured rules.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no rules, a declared rule has no body,
    /// a rule is defined twice, a body references an id outside the grammar,
    /// or the grammar is left-recursive.
    pub fn build(self) -> Result<Grammar<S, V>, GrammarError> {
        if self.names.is_empty() {
            return Err(GrammarError::Empty);
        }
        if u32::try_from(self.names.len()).is_err() {
            return Err(GrammarError::TooManyRules(self.names.len()));
        }
        let name_of = |spur: &Spur| CompactString::from(self.interner.resolve(spur));
        if let Some(spur) = self.duplicates.first() {
            return Err(GrammarError::DuplicateRule(name_of(spur)));
        }

        let mut rules = Vec::with_capacity(self.bodies.len());
        for ((index, body), name) in self.bodies.into_iter().enumerate().zip(&self.names) {
            let Some(body) = body else {
                return Err(GrammarError::UndefinedRule(name_of(name)));
            };
            rules.push(Rule {
                id: RuleId::new(u32::try_from(index).unwrap_or(u32::MAX)),
                name: *name,
                body,
            });
        }

        // Ids built by hand or taken from another builder.
        let mut foreign = None;
        for rule in &rules {
            rule.body.for_each_rule(&mut |id| {
                if id.index() >= rules.len() {
                    foreign.get_or_insert(id);
                }
            });
        }
        if let Some(id) = foreign {
            return Err(GrammarError::UndefinedRule(compact_str::format_compact!("{id}")));
        }

        let nullable = analysis::nullable_rules(rules.iter().map(|rule| &rule.body), rules.len());
        if let Some(cycle) =
            analysis::find_left_recursion(rules.iter().map(|rule| &rule.body), &nullable)
        {
            return Err(GrammarError::LeftRecursion(
                cycle
                    .iter()
                    .map(|id| name_of(&self.names[id.index()]))
                    .collect(),
            ));
        }

        tracing::debug!(
            rules = rules.len(),
            nullable = nullable.iter().filter(|n| **n).count(),
            "grammar built"
        );

        Ok(Grammar {
            rules,
            ids: self.ids,
            interner: self.interner.into_reader(),
            nullable,
        })
    }
}
