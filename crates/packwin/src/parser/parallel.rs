//! # Parallel Parsing Support
//!
//! Parses batches of independent inputs on a rayon pool.
//!
//! ## Overview
//!
//! Only the grammar is shared: it is immutable after building and therefore
//! `Send + Sync`. Each input gets its own [`PegParser`] and with it its own
//! cache, so no memo entry ever crosses from one input to another.

use crate::error::ParseError;
use crate::grammar::{Grammar, RuleId, Symbol};
use crate::parser::{ParseResult, PegConfig, PegParser};
use rayon::prelude::*;
use std::sync::Arc;

/// Stack reserved for each worker of a batch pool.
pub const WORKER_STACK_SIZE: usize = 8 * 1024 * 1024;

/// Configuration for parallel parsing
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Number of threads to use (0 = one per CPU)
    pub num_threads: usize,
    /// Stack size of each worker in bytes (0 = rayon's default)
    ///
    /// Must leave room for [`PegConfig::max_depth`] nested rule calls. With
    /// both fields zero the batch runs on rayon's global pool.
    pub stack_size: usize,
    /// Configuration of the parser created for each input
    pub peg: PegConfig,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_threads: 0,
            stack_size: WORKER_STACK_SIZE,
            peg: PegConfig::default(),
        }
    }
}

/// Result of parsing one input of a batch
#[derive(Debug)]
pub struct BatchItem<S, V> {
    /// Position of the input in the batch
    pub index: usize,
    pub result: Result<ParseResult<S, V>, ParseError>,
}

impl<S, V> BatchItem<S, V> {
    /// Whether the input parsed without error and matched.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.result.as_ref().is_ok_and(ParseResult::is_success)
    }
}

/// Parallel parser for batches of inputs sharing one grammar.
pub struct ParallelParser<S, V> {
    grammar: Arc<Grammar<S, V>>,
    config: ParallelConfig,
}

impl<S, V> ParallelParser<S, V>
where
    S: Symbol,
    V: Clone + Send + Sync,
{
    #[must_use]
    pub fn new(grammar: Arc<Grammar<S, V>>) -> Self {
        Self::with_config(grammar, ParallelConfig::default())
    }

    #[must_use]
    pub const fn with_config(grammar: Arc<Grammar<S, V>>, config: ParallelConfig) -> Self {
        Self { grammar, config }
    }

    #[must_use]
    pub const fn grammar(&self) -> &Arc<Grammar<S, V>> {
        &self.grammar
    }

    /// Parses every input with rule `start`.
    ///
    /// Results come back in input order.
    pub fn parse_batch<I>(&self, start: RuleId, inputs: &[I]) -> Vec<BatchItem<S, V>>
    where
        I: AsRef<[S]> + Sync,
    {
        tracing::debug!(
            inputs = inputs.len(),
            threads = self.config.num_threads,
            stack_size = self.config.stack_size,
            "parallel batch started"
        );

        if self.config.num_threads > 0 || self.config.stack_size > 0 {
            let mut builder = rayon::ThreadPoolBuilder::new().num_threads(self.config.num_threads);
            if self.config.stack_size > 0 {
                builder = builder.stack_size(self.config.stack_size);
            }
            match builder.build() {
                Ok(pool) => return pool.install(|| self.run(start, inputs)),
                Err(err) => {
                    tracing::warn!(error = %err, "thread pool unavailable, using the global pool");
                }
            }
        }
        self.run(start, inputs)
    }

    fn run<I>(&self, start: RuleId, inputs: &[I]) -> Vec<BatchItem<S, V>>
    where
        I: AsRef<[S]> + Sync,
    {
        inputs
            .par_iter()
            .enumerate()
            .map(|(index, input)| {
                let result = PegParser::new(&*self.grammar, self.config.peg.clone())
                    .and_then(|mut parser| parser.parse(start, input.as_ref()));
                BatchItem { index, result }
            })
            .collect()
    }
}

/// Counts successful and failed items of a batch.
#[must_use]
pub fn summarize<S, V>(items: &[BatchItem<S, V>]) -> (usize, usize) {
    let ok = items.iter().filter(|item| item.is_ok()).count();
    (ok, items.len() - ok)
}
