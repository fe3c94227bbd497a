//! Evaluates arithmetic expressions given on the command line.
//!
//! ```text
//! RUST_LOG=packwin=debug cargo run --example calculator -- "3*(2+1)" "1+"
//! ```

use packwin::parser::{PegConfig, PegParser};
use packwin::testing::{self, chars};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    let (grammar, expr) = testing::calculator()?;
    let config = PegConfig {
        window_width: 16,
        ..Default::default()
    };
    let mut parser = PegParser::new(&grammar, config)?;

    let mut inputs: Vec<String> = std::env::args().skip(1).collect();
    if inputs.is_empty() {
        inputs = vec!["3*(2+1)".into(), "10/4-1".into(), "2*(3+".into()];
    }

    for text in &inputs {
        let input = chars(text);
        match parser.parse_complete(expr, &input) {
            Ok(value) => match value.into_node() {
                Some(number) => println!("{text} = {number}"),
                None => println!("{text} produced no number"),
            },
            Err(err) => println!("{text}: {err}"),
        }
        let stats = parser.cache().stats();
        tracing::info!(
            input = %text,
            inserts = stats.inserts,
            evictions = stats.evictions,
            occupied = parser.cache().len(),
            capacity = parser.cache().capacity(),
            "cache usage"
        );
    }

    Ok(())
}
