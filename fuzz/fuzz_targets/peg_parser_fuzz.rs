#![no_main]
use libfuzzer_sys::fuzz_target;
use packwin::parser::{PegConfig, PegParser};
use packwin::testing;

fuzz_target!(|data: &[u8]| {
    // First byte picks the cache width, the rest is parsed as calculator input.
    let Some((&width, rest)) = data.split_first() else {
        return;
    };
    let Ok(text) = std::str::from_utf8(rest) else {
        return;
    };
    let input = testing::chars(text);

    let Ok((grammar, expr)) = testing::calculator() else {
        return;
    };

    let plain = PegConfig {
        enable_memoization: false,
        ..Default::default()
    };
    let windowed = PegConfig {
        window_width: usize::from(width % 8) + 1,
        ..Default::default()
    };
    let (Ok(mut plain), Ok(mut windowed)) = (
        PegParser::new(&grammar, plain),
        PegParser::new(&grammar, windowed),
    ) else {
        return;
    };

    // Memoization may only change how much work is done, never the outcome
    // or the furthest failure.
    let expected = plain
        .parse(expr, &input)
        .map(|r| (r.outcome, r.furthest_failure));
    let actual = windowed
        .parse(expr, &input)
        .map(|r| (r.outcome, r.furthest_failure));
    assert_eq!(format!("{expected:?}"), format!("{actual:?}"));
});
