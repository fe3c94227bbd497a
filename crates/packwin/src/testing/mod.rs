//! # Testing Utilities
//!
//! Sample grammars and input generators shared by the test suite, the
//! benchmarks and the fuzz target.
//!
//! ## Sample Grammars
//!
//! - [`calculator`]: integer arithmetic with `+ - * /` and parentheses,
//!   evaluated to `f64` by semantic actions
//! - [`nested`]: balanced parentheses, for exercising rule depth
//!
//! ## Generators
//!
//! [`ExprGenerator`] produces well-formed calculator expressions from a seed,
//! so a failing case can always be replayed.

use crate::error::GrammarError;
use crate::grammar::{Expr, Grammar, GrammarBuilder, RuleId, Value};

/// Converts text into the `char` input the sample grammars expect.
#[must_use]
pub fn chars(text: &str) -> Vec<char> {
    text.chars().collect()
}

/// The arithmetic grammar:
///
/// ```text
/// Expr    <- Product (('+' / '-') Product)*
/// Product <- Value (('*' / '/') Value)*
/// Value   <- Num / '(' Expr ')'
/// Num     <- [0-9]+
/// ```
///
/// Returns the grammar and the id of `Expr`. A successful parse yields
/// `Value::Node(result)`; operators associate to the left and division
/// follows IEEE 754, so `1/0` is infinity.
///
/// # Errors
///
/// Never fails in practice; the result is that of [`GrammarBuilder::build`].
pub fn calculator() -> Result<(Grammar<char, f64>, RuleId), GrammarError> {
    let mut builder = GrammarBuilder::<char, f64>::new();
    let expr = builder.declare("Expr");
    let product = builder.declare("Product");
    let value = builder.declare("Value");
    let num = builder.declare("Num");

    builder.define(
        "Expr",
        Expr::rule(product)
            .then(operator(['+', '-']).then(Expr::rule(product)).zero_or_more())
            .map(fold_chain),
    );
    builder.define(
        "Product",
        Expr::rule(value)
            .then(operator(['*', '/']).then(Expr::rule(value)).zero_or_more())
            .map(fold_chain),
    );
    builder.define(
        "Value",
        Expr::rule(num).or(Expr::seq_all([
            Expr::literal('('),
            Expr::rule(expr),
            Expr::literal(')'),
        ])
        .map(|value| {
            // Pair('(', Pair(expr, ')'))
            value
                .into_pair()
                .and_then(|(_, rest)| rest.into_pair())
                .map_or(Value::Node(f64::NAN), |(inner, _)| inner)
        })),
    );
    builder.define(
        "Num",
        Expr::range('0', '9').one_or_more().map(|digits| {
            let number = digits.symbols().into_iter().fold(0.0, |acc, digit| {
                acc * 10.0 + f64::from(digit.to_digit(10).unwrap_or(0))
            });
            Value::Node(number)
        }),
    );

    Ok((builder.build()?, expr))
}

/// Matches one of two operator characters and yields it as a symbol.
fn operator(ops: [char; 2]) -> Expr<char, f64> {
    let [first, second] = ops;
    Expr::literal(first)
        .map(move |_| Value::Symbol(first))
        .or(Expr::literal(second).map(move |_| Value::Symbol(second)))
}

/// Folds `Pair(first, [Pair(op, operand), ..])` from the left.
fn fold_chain(value: Value<char, f64>) -> Value<char, f64> {
    let Some((first, rest)) = value.into_pair() else {
        return Value::Node(f64::NAN);
    };
    let mut acc = first.into_node().unwrap_or(f64::NAN);
    for item in rest.into_list().unwrap_or_default() {
        let Some((op, operand)) = item.into_pair() else {
            continue;
        };
        let rhs = operand.into_node().unwrap_or(f64::NAN);
        acc = match op.as_symbol() {
            Some('+') => acc + rhs,
            Some('-') => acc - rhs,
            Some('*') => acc * rhs,
            Some('/') => acc / rhs,
            _ => f64::NAN,
        };
    }
    Value::Node(acc)
}

/// Balanced parentheses: `Nest <- '(' Nest? ')'`.
///
/// Every level of nesting is one rule invocation, which makes this grammar
/// the simplest way to hit the depth limit.
///
/// # Errors
///
/// Never fails in practice; the result is that of [`GrammarBuilder::build`].
pub fn nested() -> Result<(Grammar<char, ()>, RuleId), GrammarError> {
    let mut builder = GrammarBuilder::<char, ()>::new();
    let nest = builder.declare("Nest");
    builder.define(
        "Nest",
        Expr::literal('(')
            .then(Expr::rule(nest).optional())
            .then(Expr::literal(')')),
    );
    Ok((builder.build()?, nest))
}

/// `depth` opening parentheses followed by as many closing ones.
#[must_use]
pub fn nested_input(depth: usize) -> Vec<char> {
    std::iter::repeat_n('(', depth)
        .chain(std::iter::repeat_n(')', depth))
        .collect()
}

/// Configuration for [`ExprGenerator`]
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Maximum parenthesis nesting
    pub max_depth: usize,
    /// Maximum operands per operator chain
    pub max_operands: usize,
    /// Largest literal number
    pub max_number: u64,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_depth: 4,
            max_operands: 4,
            max_number: 999,
            seed: 0x853c_49e6_748f_ea9b,
        }
    }
}

/// Generator of random, well-formed [`calculator`] expressions.
#[derive(Debug, Clone)]
pub struct ExprGenerator {
    config: GeneratorConfig,
    rng: SimpleRng,
}

impl ExprGenerator {
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = SimpleRng::with_seed(config.seed);
        Self { config, rng }
    }

    /// Next expression as text.
    pub fn generate(&mut self) -> String {
        let mut out = String::new();
        self.chain(0, &mut out);
        out
    }

    /// Concatenates generated expressions with `+` until `min_len` is reached.
    pub fn generate_long(&mut self, min_len: usize) -> String {
        let mut out = self.generate();
        while out.len() < min_len {
            out.push('+');
            out.push_str(&self.generate());
        }
        out
    }

    fn chain(&mut self, depth: usize, out: &mut String) {
        let operands = 1 + self.below(self.config.max_operands.max(1) as u64) as usize;
        for i in 0..operands {
            if i > 0 {
                const OPS: [char; 4] = ['+', '-', '*', '/'];
                out.push(OPS[self.below(4) as usize]);
            }
            self.operand(depth, out);
        }
    }

    fn operand(&mut self, depth: usize, out: &mut String) {
        if depth < self.config.max_depth && self.below(4) == 0 {
            out.push('(');
            self.chain(depth + 1, out);
            out.push(')');
        } else {
            let number = self.below(self.config.max_number.saturating_add(1));
            out.push_str(&number.to_string());
        }
    }

    /// Uniform-ish value in `0..bound`; `bound` must be non-zero.
    fn below(&mut self, bound: u64) -> u64 {
        self.rng.next_u64() % bound
    }
}

impl Iterator for ExprGenerator {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        Some(self.generate())
    }
}

/// Small deterministic PRNG
#[derive(Debug, Clone)]
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn with_seed(seed: u64) -> Self {
        // XorShift gets stuck at zero.
        Self {
            state: if seed == 0 { 0x853c_49e6_748f_ea9b } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        // XorShift algorithm
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{PegConfig, PegParser};

    #[test]
    fn calculator_evaluates_with_precedence() {
        let (grammar, expr) = calculator().unwrap();
        let mut parser = PegParser::new(&grammar, PegConfig::default()).unwrap();
        let value = parser.parse_complete(expr, &chars("1+2*3-4/2")).unwrap();
        assert_eq!(value, Value::Node(5.0));
    }

    #[test]
    fn generator_is_deterministic() {
        let config = GeneratorConfig {
            seed: 42,
            ..GeneratorConfig::default()
        };
        let a: Vec<_> = ExprGenerator::new(config.clone()).take(5).collect();
        let b: Vec<_> = ExprGenerator::new(config).take(5).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn generated_expressions_parse_completely() {
        let (grammar, expr) = calculator().unwrap();
        let mut parser = PegParser::new(&grammar, PegConfig::default()).unwrap();
        for text in ExprGenerator::new(GeneratorConfig::default()).take(50) {
            assert!(
                parser.parse_complete(expr, &chars(&text)).is_ok(),
                "failed on {text}"
            );
        }
    }

    #[test]
    fn nested_input_is_balanced() {
        assert_eq!(nested_input(2), chars("(())"));
        assert!(nested_input(0).is_empty());
    }
}
