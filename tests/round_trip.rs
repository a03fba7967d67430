//! Formatting must keep the tree intact and reach a fixed point, for every
//! layout configuration.

use lea::{format_source, parse_source, FormatConfig};

const CORPUS: &[(&str, &str)] = &[
    (
        "list_pipeline",
        r#"-- pipelines over a list
let numbers = [1, 2, 3, 4, 5]
let doubled = numbers /> map((x) -> x * 2) /> filter((x) -> x > 2) /> reduce(0, (acc, x) -> acc + x)
print(doubled)
"#,
    ),
    (
        "context_provide",
        r#"context Logger = { log: (msg) -> print(msg) }
provide Logger { log: (msg) -> print(`[app] ${msg}`) }
let greet = (name) -> @Logger Logger.log(`Hello ${name}`)
greet("World")
"#,
    ),
    (
        "match",
        r#"let describe = (n) -> match n
  | 0 -> "zero"
  | if n < 0 -> "negative"
  | "positive"
print(describe(3))
let sign = match x | 1 -> "one" | if x > 5 -> (match y | 2 -> "two" | "many") | "other"
"#,
    ),
    (
        "parallel_and_literals",
        r#"let stats = values \> min \> max /> combine
let process = /> validate /> normalize #log #retry(3, -1, "slow")
let codec = </> encode </> compress
(/> a /> b)
decorator trace = (f) -> f
"#,
    ),
    (
        "functions",
        r#"let add = (a, b) -> a + b :: (Int, Int) :> Int
let clamp = (x, lo = 0, hi = 10) -> {
  let low = x < lo ? lo : x
  low > hi ? hi : low
}
let apply = (f, x) <- f(x)
let pair = (p) -> p :: ((Int, Int)?) :> (Int, Int)
let nested = (x) -> ((y) -> x + y) :: Int #memo
let empty = () -> {}
let mk = (v: Int) -> { value: v, double: v * 2 }
"#,
    ),
    (
        "code_blocks",
        r#"{-- Math --}
let square = (x) -> x * x
{-- Inner --}
maybe total = 0
total = total + square(3)
{/--}
{/--}
{--}
print(total)
{/--}
"#,
    ),
    (
        "pipe_kinds",
        r#"let r = args />>> max
let view = state @> render
let fallback = value </ default
let chain = (a + b) /> double /> (c /> d) /> show
let head = (ok ? a : b) /> show
"#,
    ),
    (
        "expressions",
        r#"let s = "line\nbreak \"quoted\" \\ end"
let t = `sum: ${a + b}, item: ${xs[0]} \${raw}`
let neg = -x - -y
let flag = !done
let field = user.profile.name
let first = items[0][1]
let tuple = (1, "a", true)
let r = await fetch(url)
let p = xs /> map(_ * 2) /> fold(input)
let ternary = a > 0 ? "pos" : a < 0 ? "neg" : "zero"
"#,
    ),
    (
        "bindings",
        r#"let a = 1
and b = 2
maybe counter = 0
counter = counter + 1
let m = use "./math"
let x = 1; let y = 2
"#,
    ),
    (
        "wide",
        r#"let configuration = { name: "project", version: "1.0.0", authors: ["first author", "second author"], license: "MIT" }
let result = compute(first_argument, second_argument, third_argument, fourth_argument, fifth_argument)
let choice = some_long_condition_name > other ? first_branch_value_here : second_branch_value_here_too
let f = (request) -> request /> authenticate /> authorize(roles) /> handle(controller) /> respond
"#,
    ),
];

fn configs() -> Vec<(&'static str, FormatConfig)> {
    let default = FormatConfig::default();
    vec![
        ("default", default.clone()),
        (
            "narrow",
            FormatConfig {
                print_width: 24,
                ..default.clone()
            },
        ),
        (
            "wide_indent",
            FormatConfig {
                indent_size: 4,
                print_width: 60,
                ..default.clone()
            },
        ),
        (
            "no_trailing_commas",
            FormatConfig {
                trailing_commas: false,
                print_width: 30,
                ..default.clone()
            },
        ),
        (
            "no_break_pipes",
            FormatConfig {
                break_pipe_chains: false,
                ..default.clone()
            },
        ),
        (
            "eager_breaks",
            FormatConfig {
                pipe_chain_break_threshold: 1,
                print_width: 10,
                ..default
            },
        ),
    ]
}

fn parse_ok(name: &str, source: &str) -> lea::ast::Program {
    parse_source(source, 0).unwrap_or_else(|e| {
        panic!("{} should parse: {}\n--- source ---\n{}", name, e, source);
    })
}

#[test]
fn test_corpus_parses() {
    for (name, source) in CORPUS {
        let program = parse_ok(name, source);
        assert!(!program.statements.is_empty(), "{} parsed to nothing", name);
    }
}

#[test]
fn test_format_preserves_tree() {
    for (config_name, config) in configs() {
        for (name, source) in CORPUS {
            let original = parse_ok(name, source);
            let formatted = format_source(source, &config).unwrap();
            let reparsed = parse_source(&formatted, 0).unwrap_or_else(|e| {
                panic!(
                    "{} [{}] output does not parse: {}\n--- output ---\n{}",
                    name, config_name, e, formatted
                )
            });
            assert_eq!(
                original, reparsed,
                "{} [{}] changed the tree\n--- output ---\n{}",
                name, config_name, formatted
            );
        }
    }
}

#[test]
fn test_format_is_idempotent() {
    for (config_name, config) in configs() {
        for (name, source) in CORPUS {
            let once = format_source(source, &config).unwrap();
            let twice = format_source(&once, &config).unwrap();
            assert_eq!(once, twice, "{} [{}] is not a fixed point", name, config_name);
        }
    }
}

#[test]
fn test_output_ends_with_single_newline() {
    for (name, source) in CORPUS {
        let out = format_source(source, &FormatConfig::default()).unwrap();
        assert!(out.ends_with('\n'), "{}", name);
        assert!(!out.ends_with("\n\n"), "{}", name);
    }
}

#[test]
fn test_default_width_respected_where_breakable() {
    let out = format_source(CORPUS[9].1, &FormatConfig::default()).unwrap();
    for line in out.lines() {
        assert!(line.chars().count() <= 80, "line too long: {:?}", line);
    }
}
