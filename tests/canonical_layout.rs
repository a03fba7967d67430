//! Canonical output for small, complete programs.

use lea::{format_source, FormatConfig};

fn fmt(source: &str) -> String {
    format_source(source, &FormatConfig::default()).expect("source should parse")
}

#[test]
fn test_long_pipeline_breaks_per_stage() {
    let out = fmt("let total = [1, 2, 3, 4] /> map((x) -> x * 2) /> filter((x) -> x > 2) /> reduce(0, (acc, x) -> acc + x) /> print");
    insta::assert_snapshot!(out, @r"
let total = [1, 2, 3, 4]
  /> map((x) -> x * 2)
  /> filter((x) -> x > 2)
  /> reduce(0, (acc, x) -> acc + x)
  /> print
");
}

#[test]
fn test_match_in_function_body() {
    let out = fmt(r#"let classify = (n) -> match n | 0 -> "zero" | if n < 0 -> "negative" | "positive""#);
    insta::assert_snapshot!(out, @r#"
let classify = (n) -> match n
  | 0 -> "zero"
  | if n < 0 -> "negative"
  | "positive"
"#);
}

#[test]
fn test_context_provide_and_attachments() {
    let out = fmt(r#"context Logger = { log: (msg) -> print(msg) }
provide Logger { log: (msg) -> print(`[app] ${msg}`) }
let greet = (name) -> @Logger Logger.log(`Hello ${name}`)
greet("World")"#);
    insta::assert_snapshot!(out, @r#"
context Logger = { log: (msg) -> print(msg) }

provide Logger { log: (msg) -> print(`[app] ${msg}`) }
let greet = (name) ->
  @Logger
  Logger.log(`Hello ${name}`)
greet("World")
"#);
}

#[test]
fn test_parallel_pipe_inside_code_block() {
    let out = fmt("{-- Stats --}\nlet stats = values \\> min \\> max /> combine\n{/--}\nprint(stats)");
    insta::assert_snapshot!(out, @r"
{-- Stats --}
  let stats = values
    \> min
    \> max
    /> combine
{/--}

print(stats)
");
}

#[test]
fn test_block_function_with_signature_and_decorators() {
    let out = fmt("let clamp = (x, lo = 0, hi = 10) -> { let low = x < lo ? lo : x; low > hi ? hi : low } :: (Int, Int, Int) :> Int #memo");
    insta::assert_snapshot!(out, @r"
let clamp = (x, lo = 0, hi = 10) -> {
  let low = x < lo ? lo : x
  low > hi ? hi : low
} :: (Int, Int, Int) :> Int #memo
");
}
