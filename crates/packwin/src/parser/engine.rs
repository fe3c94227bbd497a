//! Recursive evaluation of parsing expressions.
//!
//! Every operator that fails leaves the cursor where it found it, so callers
//! never need to restore it themselves. Rule invocations go through the
//! memo cache when one is attached.

use crate::cache::ElasticCache;
use crate::error::ParseError;
use crate::grammar::{Expr, Grammar, RuleId, Symbol, Value};
use crate::parser::config::PegConfig;
use crate::parser::outcome::{Expected, Failure, ParseMetrics, ParseOutcome, ParseResult};

/// Memo table type used by the parser.
pub type MemoCache<S, V> = ElasticCache<ParseOutcome<S, V>>;

/// Tracks the furthest terminal failure.
struct FailureTracker<S> {
    enabled: bool,
    /// Depth of enclosing lookaheads; failures inside them are expected.
    quiet: usize,
    position: usize,
    expected: Vec<Expected<S>>,
}

impl<S: Symbol> FailureTracker<S> {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            quiet: 0,
            position: 0,
            expected: Vec::new(),
        }
    }

    fn record(&mut self, position: usize, expected: impl FnOnce() -> Expected<S>) {
        if !self.enabled || self.quiet > 0 || position < self.position {
            return;
        }
        if position > self.position {
            self.position = position;
            self.expected.clear();
        }
        let expected = expected();
        if !self.expected.contains(&expected) {
            self.expected.push(expected);
        }
    }

    /// Whether results computed now carry every failure they would record.
    ///
    /// A rule evaluated inside a lookahead records nothing, so memoizing it
    /// would hide its failures from a later call outside the lookahead.
    fn complete(&self) -> bool {
        !self.enabled || self.quiet == 0
    }

    fn finish(self) -> Option<Failure<S>> {
        (!self.expected.is_empty()).then_some(Failure {
            position: self.position,
            expected: self.expected,
        })
    }
}

/// Context for one parse
struct ParseContext<'a, S, V> {
    grammar: &'a Grammar<S, V>,
    input: &'a [S],
    config: &'a PegConfig,
    cache: Option<&'a mut MemoCache<S, V>>,
    depth: usize,
    metrics: ParseMetrics,
    failures: FailureTracker<S>,
}

impl<'a, S, V> ParseContext<'a, S, V>
where
    S: Symbol,
    V: Clone,
{
    fn new(
        grammar: &'a Grammar<S, V>,
        input: &'a [S],
        config: &'a PegConfig,
        cache: Option<&'a mut MemoCache<S, V>>,
    ) -> Self {
        Self {
            grammar,
            input,
            config,
            cache,
            depth: 0,
            metrics: ParseMetrics::default(),
            failures: FailureTracker::new(config.track_failures),
        }
    }

    /// Evaluates `expr` at `*pos`.
    ///
    /// On success the cursor is left after the match; on failure (`Ok(None)`)
    /// it is unchanged.
    fn parse_expr(
        &mut self,
        expr: &Expr<S, V>,
        pos: &mut usize,
    ) -> Result<Option<Value<S, V>>, ParseError> {
        match expr {
            Expr::Empty => Ok(Some(Value::Unit)),

            Expr::Literal(expected) => {
                if self.input.get(*pos) == Some(expected) {
                    *pos += 1;
                    Ok(Some(Value::Unit))
                } else {
                    self.failures
                        .record(*pos, || Expected::Literal(expected.clone()));
                    Ok(None)
                }
            }

            Expr::Any => {
                if let Some(symbol) = self.input.get(*pos) {
                    *pos += 1;
                    Ok(Some(Value::Symbol(symbol.clone())))
                } else {
                    self.failures.record(*pos, || Expected::Any);
                    Ok(None)
                }
            }

            Expr::Range(lo, hi) => match self.input.get(*pos) {
                Some(symbol) if lo <= symbol && symbol <= hi => {
                    *pos += 1;
                    Ok(Some(Value::Symbol(symbol.clone())))
                }
                _ => {
                    self.failures
                        .record(*pos, || Expected::Range(lo.clone(), hi.clone()));
                    Ok(None)
                }
            },

            Expr::Rule(id) => self.call_rule(*id, pos),

            Expr::Sequence(first, second) => {
                let start = *pos;
                let Some(v1) = self.parse_expr(first, pos)? else {
                    return Ok(None);
                };
                match self.parse_expr(second, pos)? {
                    Some(v2) => Ok(Some(Value::pair(v1, v2))),
                    None => {
                        *pos = start;
                        Ok(None)
                    }
                }
            }

            Expr::Choice(first, second) => {
                let start = *pos;
                if let Some(value) = self.parse_expr(first, pos)? {
                    return Ok(Some(value));
                }
                *pos = start;
                self.parse_expr(second, pos)
            }

            Expr::ZeroOrMore(inner) => {
                let items = self.repeat(inner, pos, Vec::new())?;
                Ok(Some(Value::List(items)))
            }

            Expr::OneOrMore(inner) => {
                let start = *pos;
                let Some(first) = self.parse_expr(inner, pos)? else {
                    return Ok(None);
                };
                let items = if *pos == start {
                    vec![first]
                } else {
                    self.repeat(inner, pos, vec![first])?
                };
                Ok(Some(Value::List(items)))
            }

            Expr::Optional(inner) => {
                let start = *pos;
                match self.parse_expr(inner, pos)? {
                    Some(value) => Ok(Some(Value::maybe(Some(value)))),
                    None => {
                        *pos = start;
                        Ok(Some(Value::Maybe(None)))
                    }
                }
            }

            Expr::And(inner) => {
                let matched = self.lookahead(inner, *pos)?;
                Ok(matched.then_some(Value::Unit))
            }

            Expr::Not(inner) => {
                let matched = self.lookahead(inner, *pos)?;
                Ok((!matched).then_some(Value::Unit))
            }

            Expr::IfThenElse {
                condition,
                then,
                otherwise,
            } => {
                let start = *pos;
                if self.parse_expr(condition, pos)?.is_some() {
                    // Committed: `otherwise` is never tried once the condition matched.
                    match self.parse_expr(then, pos)? {
                        Some(value) => Ok(Some(Value::branch(true, value))),
                        None => {
                            *pos = start;
                            Ok(None)
                        }
                    }
                } else {
                    *pos = start;
                    Ok(self
                        .parse_expr(otherwise, pos)?
                        .map(|value| Value::branch(false, value)))
                }
            }

            Expr::Redirect(inner, action) => Ok(self
                .parse_expr(inner, pos)?
                .map(|value| action.apply(value))),
        }
    }

    /// Repeats `inner` until it fails, appending to `items`.
    ///
    /// An iteration that succeeds without consuming input ends the loop,
    /// otherwise a nullable body would repeat forever.
    fn repeat(
        &mut self,
        inner: &Expr<S, V>,
        pos: &mut usize,
        mut items: Vec<Value<S, V>>,
    ) -> Result<Vec<Value<S, V>>, ParseError> {
        loop {
            let start = *pos;
            match self.parse_expr(inner, pos)? {
                Some(value) => {
                    items.push(value);
                    if *pos == start {
                        break;
                    }
                }
                None => {
                    *pos = start;
                    break;
                }
            }
        }
        Ok(items)
    }

    /// Evaluates `inner` without moving the cursor; reports whether it matched.
    fn lookahead(&mut self, inner: &Expr<S, V>, pos: usize) -> Result<bool, ParseError> {
        let mut probe = pos;
        self.failures.quiet += 1;
        let result = self.parse_expr(inner, &mut probe);
        self.failures.quiet -= 1;
        Ok(result?.is_some())
    }

    fn call_rule(&mut self, id: RuleId, pos: &mut usize) -> Result<Option<Value<S, V>>, ParseError> {
        let start = *pos;
        self.metrics.rule_calls += 1;

        if let Some(cache) = self.cache.as_deref()
            && let Some(memo) = cache.get(start, id.get())
        {
            self.metrics.cache_hits += 1;
            return Ok(match memo {
                ParseOutcome::Success { end, value } => {
                    *pos = *end;
                    Some(value.clone())
                }
                ParseOutcome::Fail => None,
            });
        }
        if self.cache.is_some() {
            self.metrics.cache_misses += 1;
        }

        let grammar = self.grammar;
        let rule = grammar.rule(id).ok_or(ParseError::UnknownRule(id))?;
        if self.depth >= self.config.max_depth {
            return Err(ParseError::DepthExceeded {
                limit: self.config.max_depth,
                position: start,
            });
        }

        self.depth += 1;
        self.metrics.max_depth = self.metrics.max_depth.max(self.depth);
        let result = self.parse_expr(&rule.body, pos);
        self.depth -= 1;
        let value = result?;

        if self.failures.complete()
            && let Some(cache) = self.cache.as_deref_mut()
        {
            let outcome = match &value {
                Some(value) => ParseOutcome::Success {
                    end: *pos,
                    value: value.clone(),
                },
                None => ParseOutcome::Fail,
            };
            cache.insert(start, id.get(), outcome);
        }
        Ok(value)
    }
}

/// Parses `input` with `start` at position 0, memoizing in `cache`.
///
/// Returns whatever the grammar matched, which may stop short of the end of
/// the input; requiring a full match is the caller's policy (see
/// [`PegParser::parse_complete`](crate::parser::PegParser::parse_complete)).
///
/// The cache is used as given: entries from an earlier parse of *different*
/// input must be removed with [`ElasticCache::clear`] first.
///
/// # Errors
///
/// Fails if the cache cannot key every rule id of `grammar`, if `start` is
/// not a rule of `grammar`, or if the default depth limit is exceeded.
pub fn parse<S, V>(
    grammar: &Grammar<S, V>,
    start: RuleId,
    input: &[S],
    cache: &mut MemoCache<S, V>,
) -> Result<ParseOutcome<S, V>, ParseError>
where
    S: Symbol,
    V: Clone,
{
    parse_with_config(grammar, start, input, Some(cache), &PegConfig::default())
        .map(|result| result.outcome)
}

/// Parse with explicit configuration and full diagnostics.
///
/// Passing `None` for the cache, or disabling
/// [`PegConfig::enable_memoization`], evaluates without memoization.
///
/// # Errors
///
/// See [`parse`]; the depth limit is taken from `config`.
pub fn parse_with_config<S, V>(
    grammar: &Grammar<S, V>,
    start: RuleId,
    input: &[S],
    cache: Option<&mut MemoCache<S, V>>,
    config: &PegConfig,
) -> Result<ParseResult<S, V>, ParseError>
where
    S: Symbol,
    V: Clone,
{
    let cache = cache.filter(|_| config.enable_memoization);
    if let Some(cache) = cache.as_deref()
        && grammar.len() as u64 > cache.max_rules()
    {
        return Err(ParseError::RuleIdOverflow {
            rules: grammar.len(),
            max: cache.max_rules(),
        });
    }
    if grammar.rule(start).is_none() {
        return Err(ParseError::UnknownRule(start));
    }

    tracing::debug!(
        start = grammar.name(start).unwrap_or_default(),
        input_len = input.len(),
        memoize = cache.is_some(),
        "parse started"
    );
    let start_time = std::time::Instant::now();

    let mut ctx = ParseContext::new(grammar, input, config, cache);
    let mut pos = 0;
    let value = ctx.call_rule(start, &mut pos)?;

    let mut metrics = ctx.metrics;
    metrics.parse_time = start_time.elapsed();
    let outcome = match value {
        Some(value) => ParseOutcome::Success { end: pos, value },
        None => ParseOutcome::Fail,
    };
    let cache_stats = ctx.cache.as_deref().map(ElasticCache::stats);

    tracing::debug!(
        success = outcome.is_success(),
        end = outcome.end(),
        rule_calls = metrics.rule_calls,
        cache_hits = metrics.cache_hits,
        cache_misses = metrics.cache_misses,
        evictions = cache_stats.map(|stats| stats.evictions),
        elapsed_us = metrics.parse_time.as_micros() as u64,
        "parse finished"
    );

    Ok(ParseResult {
        outcome,
        furthest_failure: ctx.failures.finish(),
        metrics,
    })
}
