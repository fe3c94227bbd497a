//! Property-based tests for the cache and the parser
//!
//! These tests use proptest to generate random cache operations and random
//! inputs, and check the invariants the parser relies on.

#![cfg(test)]

use hashbrown::HashMap;
use packwin::cache::ElasticCache;
use packwin::grammar::{Expr, Grammar, GrammarBuilder, RuleId, Value};
use packwin::parser::{self, ParseOutcome, PegConfig, PegParser};
use packwin::testing::{self, ExprGenerator, GeneratorConfig};
use proptest::prelude::*;

fn calculator_input() -> impl Strategy<Value = Vec<char>> {
    prop::collection::vec(
        prop::sample::select(vec!['0', '1', '7', '9', '+', '-', '*', '/', '(', ')']),
        0..40,
    )
}

fn ab_input() -> impl Strategy<Value = Vec<char>> {
    prop::collection::vec(prop::sample::select(vec!['a', 'b', 'c']), 0..20)
}

fn single(body: Expr<char, ()>) -> (Grammar<char, ()>, RuleId) {
    let grammar = GrammarBuilder::new()
        .rule("S", body)
        .build()
        .expect("Failed to build grammar");
    (grammar, RuleId::new(0))
}

/// `S <- (!A B / A 'c' / &B 'a')* 'x'`, `A <- 'a' 'b'`, `B <- 'a' 'c' / 'b'`
///
/// Rules are reached both inside and outside lookaheads at the same
/// positions, and `S` always fails on `a`/`b`/`c` input.
fn lookahead_grammar() -> (Grammar<char, ()>, RuleId) {
    let mut builder = GrammarBuilder::<char, ()>::new();
    let s = builder.declare("S");
    let a = builder.declare("A");
    let b = builder.declare("B");
    builder.define(
        "S",
        Expr::choice_all([
            Expr::rule(a).not().then(Expr::rule(b)),
            Expr::rule(a).then(Expr::literal('c')),
            Expr::rule(b).and().then(Expr::literal('a')),
        ])
        .zero_or_more()
        .then(Expr::literal('x')),
    );
    builder.define("A", Expr::literals(['a', 'b']));
    builder.define("B", Expr::literals(['a', 'c']).or(Expr::literal('b')));
    (builder.build().expect("Failed to build grammar"), s)
}

fn same_number(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

fn same_outcome(a: &ParseOutcome<char, f64>, b: &ParseOutcome<char, f64>) -> bool {
    match (a, b) {
        (ParseOutcome::Fail, ParseOutcome::Fail) => true,
        (
            ParseOutcome::Success {
                end: end_a,
                value: Value::Node(x),
            },
            ParseOutcome::Success {
                end: end_b,
                value: Value::Node(y),
            },
        ) => end_a == end_b && same_number(*x, *y),
        _ => false,
    }
}

/// Hand-written evaluator with the same ordered-choice semantics as the
/// calculator grammar.
struct Reference<'a> {
    input: &'a [char],
    pos: usize,
}

impl Reference<'_> {
    fn evaluate(input: &[char]) -> Option<(usize, f64)> {
        let mut reference = Reference { input, pos: 0 };
        let value = reference.expr()?;
        Some((reference.pos, value))
    }

    fn chain(
        &mut self,
        ops: [char; 2],
        operand: fn(&mut Self) -> Option<f64>,
    ) -> Option<f64> {
        let mut acc = operand(self)?;
        while let Some(&op) = self.input.get(self.pos) {
            if !ops.contains(&op) {
                break;
            }
            let save = self.pos;
            self.pos += 1;
            let Some(rhs) = operand(self) else {
                self.pos = save;
                break;
            };
            acc = match op {
                '+' => acc + rhs,
                '-' => acc - rhs,
                '*' => acc * rhs,
                _ => acc / rhs,
            };
        }
        Some(acc)
    }

    fn expr(&mut self) -> Option<f64> {
        self.chain(['+', '-'], Self::product)
    }

    fn product(&mut self) -> Option<f64> {
        self.chain(['*', '/'], Self::value)
    }

    fn value(&mut self) -> Option<f64> {
        let start = self.pos;
        let mut number = None;
        while let Some(digit) = self.input.get(self.pos).and_then(|c| c.to_digit(10)) {
            number = Some(number.unwrap_or(0.0) * 10.0 + f64::from(digit));
            self.pos += 1;
        }
        if number.is_some() {
            return number;
        }
        if self.input.get(self.pos) == Some(&'(') {
            self.pos += 1;
            if let Some(inner) = self.expr()
                && self.input.get(self.pos) == Some(&')')
            {
                self.pos += 1;
                return Some(inner);
            }
        }
        self.pos = start;
        None
    }
}

proptest! {
    #[test]
    fn cache_never_returns_a_foreign_outcome(
        width in 1usize..6,
        ops in prop::collection::vec((0usize..300, 0u32..5, any::<u32>()), 1..400),
    ) {
        let mut cache = ElasticCache::new(width, 5).expect("Failed to create cache");
        let mut model = HashMap::new();
        for (position, rule, value) in ops {
            cache.insert(position, rule, value);
            model.insert((position, rule), value);
            prop_assert_eq!(cache.get(position, rule), Some(&value));
        }
        for position in 0..300 {
            for rule in 0..5 {
                if let Some(found) = cache.get(position, rule) {
                    prop_assert_eq!(Some(found), model.get(&(position, rule)));
                }
            }
        }
        prop_assert!(cache.len() <= cache.capacity());
    }

    #[test]
    fn zero_or_more_and_optional_never_fail(input in ab_input()) {
        let (star, start) = single(Expr::literal('a').zero_or_more());
        let mut parser = PegParser::new(&star, PegConfig::default()).expect("Failed to create parser");
        let leading = input.iter().take_while(|c| **c == 'a').count();
        let result = parser.parse(start, &input).expect("Parse should not error");
        prop_assert_eq!(result.outcome.end(), Some(leading));

        let (opt, start) = single(Expr::literal('a').optional());
        let mut parser = PegParser::new(&opt, PegConfig::default()).expect("Failed to create parser");
        let result = parser.parse(start, &input).expect("Parse should not error");
        prop_assert_eq!(result.outcome.end(), Some(leading.min(1)));
    }

    #[test]
    fn one_or_more_fails_iff_first_attempt_fails(input in ab_input()) {
        let (plus, start) = single(Expr::literal('a').one_or_more());
        let mut parser = PegParser::new(&plus, PegConfig::default()).expect("Failed to create parser");
        let result = parser.parse(start, &input).expect("Parse should not error");
        prop_assert_eq!(result.is_success(), input.first() == Some(&'a'));
    }

    #[test]
    fn failed_choice_branch_restores_position(input in ab_input()) {
        // ('a' 'b' 'c') / ('a' 'b') / 'a' / Empty
        let (grammar, start) = single(Expr::choice_all([
            Expr::literals(['a', 'b', 'c']),
            Expr::literals(['a', 'b']),
            Expr::literal('a'),
            Expr::empty(),
        ]));
        let mut parser = PegParser::new(&grammar, PegConfig::default()).expect("Failed to create parser");
        let expected = ["abc", "ab", "a"]
            .iter()
            .map(|p| p.chars().collect::<Vec<_>>())
            .find(|p| input.starts_with(p))
            .map_or(0, |p| p.len());
        let result = parser.parse(start, &input).expect("Parse should not error");
        prop_assert_eq!(result.outcome.end(), Some(expected));
    }

    #[test]
    fn memoization_does_not_change_outcomes(input in calculator_input(), width in 1usize..4) {
        let (grammar, expr) = testing::calculator().expect("Failed to build grammar");

        let plain = PegConfig { enable_memoization: false, ..Default::default() };
        let mut unmemoized = PegParser::new(&grammar, plain).expect("Failed to create parser");
        let expected = unmemoized.parse(expr, &input).expect("Parse should not error");

        // A tiny window forces constant evictions.
        let tiny = PegConfig { window_width: width, ..Default::default() };
        let mut memoized = PegParser::new(&grammar, tiny).expect("Failed to create parser");
        let actual = memoized.parse(expr, &input).expect("Parse should not error");

        prop_assert!(
            same_outcome(&expected.outcome, &actual.outcome),
            "{:?} vs {:?}", expected.outcome, actual.outcome
        );
        prop_assert_eq!(expected.furthest_failure, actual.furthest_failure);
    }

    #[test]
    fn memoization_does_not_change_failures_under_lookahead(
        input in ab_input(),
        width in 1usize..4,
    ) {
        let (grammar, start) = lookahead_grammar();

        let plain = PegConfig { enable_memoization: false, ..Default::default() };
        let mut unmemoized = PegParser::new(&grammar, plain).expect("Failed to create parser");
        let expected = unmemoized.parse(start, &input).expect("Parse should not error");

        for config in [
            PegConfig::default(),
            PegConfig { window_width: width, ..Default::default() },
        ] {
            let mut memoized = PegParser::new(&grammar, config).expect("Failed to create parser");
            let actual = memoized.parse(start, &input).expect("Parse should not error");
            prop_assert_eq!(&expected.outcome, &actual.outcome);
            prop_assert_eq!(&expected.furthest_failure, &actual.furthest_failure);
        }
    }

    #[test]
    fn repeated_evaluation_is_idempotent(input in calculator_input()) {
        let (grammar, expr) = testing::calculator().expect("Failed to build grammar");
        let mut cache = ElasticCache::new(4, grammar.len()).expect("Failed to create cache");
        let first = parser::parse(&grammar, expr, &input, &mut cache).expect("Parse should not error");
        // Same input, warm cache.
        let second = parser::parse(&grammar, expr, &input, &mut cache).expect("Parse should not error");
        prop_assert!(same_outcome(&first, &second), "{:?} vs {:?}", first, second);
    }

    #[test]
    fn calculator_matches_reference_on_random_input(input in calculator_input()) {
        let (grammar, expr) = testing::calculator().expect("Failed to build grammar");
        let mut parser = PegParser::new(&grammar, PegConfig::default()).expect("Failed to create parser");
        let outcome = parser.parse(expr, &input).expect("Parse should not error").outcome;
        let expected = match Reference::evaluate(&input) {
            Some((end, value)) => ParseOutcome::Success { end, value: Value::Node(value) },
            None => ParseOutcome::Fail,
        };
        prop_assert!(same_outcome(&outcome, &expected), "{:?} vs {:?}", outcome, expected);
    }

    #[test]
    fn generated_expressions_evaluate_like_reference(seed in any::<u64>()) {
        let (grammar, expr) = testing::calculator().expect("Failed to build grammar");
        let mut parser = PegParser::new(&grammar, PegConfig::default()).expect("Failed to create parser");
        let config = GeneratorConfig { seed, ..Default::default() };
        let text = ExprGenerator::new(config).generate();
        let input = testing::chars(&text);

        let value = parser.parse_complete(expr, &input).expect("generated input is well-formed");
        let (end, expected) = Reference::evaluate(&input).expect("reference accepts input");
        prop_assert_eq!(end, input.len());
        prop_assert!(
            same_number(value.into_node().unwrap_or(f64::NAN), expected),
            "{}", text
        );
    }
}
