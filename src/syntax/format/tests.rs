use crate::syntax::lexer::Lexer;
use crate::syntax::parser::Parser;

use super::*;

fn parse(source: &str) -> Program {
    let (tokens, lex_errors) = Lexer::new(source, 0).tokenize();
    assert!(lex_errors.is_empty(), "lex errors: {:?}", lex_errors);
    match Parser::new_with_source(tokens, source).parse_program() {
        Ok(program) => program,
        Err(diag) => panic!("parse error: {}\n--- source ---\n{}", diag.message, source),
    }
}

/// Helper: parse source and format it back with the default layout.
fn fmt(source: &str) -> String {
    fmt_with(source, &FormatConfig::default())
}

fn fmt_with(source: &str, config: &FormatConfig) -> String {
    format_program(&parse(source), config)
}

/// Formatting preserves the tree and is idempotent.
fn assert_stable(source: &str) {
    let once = fmt(source);
    assert_eq!(parse(source), parse(&once), "tree changed:\n{}", once);
    assert_eq!(fmt(&once), once, "not idempotent");
}

// --- Basic formatting ---

#[test]
fn test_empty_program() {
    assert_eq!(fmt(""), "");
    assert_eq!(fmt("\n\n-- nothing here\n"), "");
}

#[test]
fn test_single_trailing_newline() {
    assert_eq!(fmt("let x = 1"), "let x = 1\n");
    assert_eq!(fmt("let x = 1\n\n\n"), "let x = 1\n");
}

#[test]
fn test_normalizes_whitespace_and_semicolons() {
    assert_eq!(fmt("let   a=1;let b   =  2"), "let a = 1\nlet b = 2\n");
}

#[test]
fn test_minimal_parentheses() {
    assert_eq!(fmt("1 + 2 * 3"), "1 + 2 * 3\n");
    assert_eq!(fmt("(1 + 2) * 3"), "(1 + 2) * 3\n");
    assert_eq!(fmt("((a))"), "a\n");
    assert_eq!(fmt("(a - b) - c"), "a - b - c\n");
    assert_eq!(fmt("a - (b - c)"), "a - (b - c)\n");
    assert_eq!(fmt("(a == b) == c"), "a == b == c\n");
    assert_eq!(fmt("-(a + b)"), "-(a + b)\n");
    assert_eq!(fmt("(f)(x)"), "f(x)\n");
}

#[test]
fn test_double_negation_does_not_become_comment() {
    assert_eq!(fmt("let n = - -x"), "let n = -(-x)\n");
    assert_stable("let n = -(-x)");
}

#[test]
fn test_deeply_nested_negation_renders_once() {
    let src = format!("let n = {}x", "- ".repeat(30));
    let expected = format!("let n = {}-x{}\n", "-(".repeat(29), ")".repeat(29));
    assert_eq!(fmt(&src), expected);
    assert_stable(&src);
}

#[test]
fn test_literals() {
    assert_eq!(fmt("let n = 2.0"), "let n = 2\n");
    assert_eq!(fmt("let f = 2.50"), "let f = 2.5\n");
    let src = "let s = \"a\\\"b\\\\c\\n\"\n";
    assert_eq!(fmt(src), src);
    let src = "let t = `Hi ${name}, \\${literal} \\`x\\``\n";
    assert_eq!(fmt(src), src);
    assert_eq!(fmt("let b = true"), "let b = true\n");
}

#[test]
fn test_empty_collections() {
    assert_eq!(fmt("let a = [ ]\nlet b = { }"), "let a = []\nlet b = {}\n");
}

#[test]
fn test_collections_flat() {
    let src = "let xs = [1, 2, 3]\nlet t = (1, \"a\")\nlet r = { name: \"Max\", age: 99 }\n";
    assert_eq!(fmt(src), src);
    assert_eq!(fmt("let xs = [1, 2, 3,]"), "let xs = [1, 2, 3]\n");
}

#[test]
fn test_record_breaks_when_too_wide() {
    let src = "let config = { name: \"a rather long project name\", version: \"1.0.0\", license: \"MIT\" }";
    let expected = "let config = {\n  name: \"a rather long project name\",\n  version: \"1.0.0\",\n  license: \"MIT\",\n}\n";
    assert_eq!(fmt(src), expected);
    assert_stable(src);
}

#[test]
fn test_call_breaks_one_argument_per_line() {
    let src =
        "let v = compute(first_argument_value, second_argument_value, third_argument_value)";
    let expected = "let v = compute(\n  first_argument_value,\n  second_argument_value,\n  third_argument_value,\n)\n";
    assert_eq!(fmt(src), expected);
    assert_stable(src);
}

#[test]
fn test_trailing_commas_disabled() {
    let config = FormatConfig {
        trailing_commas: false,
        ..FormatConfig::default()
    };
    let src =
        "let v = compute(first_argument_value, second_argument_value, third_argument_value)";
    let expected = "let v = compute(\n  first_argument_value,\n  second_argument_value,\n  third_argument_value\n)\n";
    assert_eq!(fmt_with(src, &config), expected);
}

#[test]
fn test_indent_size() {
    let config = FormatConfig {
        indent_size: 4,
        ..FormatConfig::default()
    };
    let out = fmt_with("let f = (x) -> {\n  let y = x\n  y\n}", &config);
    assert_eq!(out, "let f = (x) -> {\n    let y = x\n    y\n}\n");
}

// --- Pipes ---

#[test]
fn test_short_chain_stays_on_one_line() {
    let a = "a".repeat(50);
    let b = "b".repeat(53);
    let src = format!("let result = {} /> {}\n", a, b);
    // Two stages never break, however long.
    assert_eq!(fmt(&src), src);
}

#[test]
fn test_short_chain_still_breaks_wide_list() {
    let items = ["a", "b", "c", "d", "e", "f"].map(|s| s.repeat(12));
    let src = format!("let x = [{}] /> f", items.join(", "));
    let expected = format!(
        "let x = [\n{}\n] /> f\n",
        items.map(|item| format!("  {},", item)).join("\n")
    );
    assert_eq!(fmt(&src), expected);
    assert_stable(&src);
}

#[test]
fn test_long_chain_breaks_one_stage_per_line() {
    let [a, b, c, d] = ["a", "b", "c", "d"].map(|s| s.repeat(20));
    let src = format!("let r = {a} /> {b} /> {c} /> {d}");
    let expected = format!("let r = {a}\n  /> {b}\n  /> {c}\n  /> {d}\n");
    assert_eq!(fmt(&src), expected);
    assert_stable(&src);
}

#[test]
fn test_chain_that_fits_is_not_broken() {
    let src = "let r = xs /> filter(isEven) /> map(double) /> sum\n";
    assert_eq!(fmt(src), src);
}

#[test]
fn test_break_pipe_chains_disabled() {
    let config = FormatConfig {
        break_pipe_chains: false,
        ..FormatConfig::default()
    };
    let [a, b, c, d] = ["a", "b", "c", "d"].map(|s| s.repeat(20));
    let src = format!("let r = {a} /> {b} /> {c} /> {d}\n");
    assert_eq!(fmt_with(&src, &config), src);
}

#[test]
fn test_mixed_pipe_kinds_flatten() {
    let src = "let r = xs />>> double </ fallback @> render\n";
    assert_eq!(fmt(src), src);
}

#[test]
fn test_parallel_pipe_is_multi_line() {
    assert_eq!(
        fmt("let r = x \\> inc \\> dec /> sum"),
        "let r = x\n  \\> inc\n  \\> dec\n  /> sum\n"
    );
    assert_stable("let r = x \\> inc \\> dec /> sum");
}

#[test]
fn test_pipe_head_binary_is_parenthesized() {
    assert_eq!(fmt("let r = a + b /> double"), "let r = (a + b) /> double\n");
    assert_eq!(
        fmt("let r = ok ? a : b /> show"),
        "let r = (ok ? a : b) /> show\n"
    );
}

#[test]
fn test_nested_chain_in_stage_keeps_parentheses() {
    let src = "let r = a /> (b /> c)\n";
    assert_eq!(fmt(src), src);
}

#[test]
fn test_function_stage_parenthesized_unless_last() {
    let src = "let r = x /> ((y) -> y + 1) /> g\n";
    assert_eq!(fmt(src), src);
    let src = "let r = x /> (y) -> y + 1\n";
    assert_eq!(fmt(src), src);
}

#[test]
fn test_pipeline_literals() {
    let src = "let p = /> double /> inc #trace\nlet q = </> encode </> compress\n";
    assert_eq!(fmt(src), src);
    assert_eq!(
        fmt("let p = /> fetch \\> a \\> b /> merge"),
        "let p = /> fetch\n  \\> a\n  \\> b\n  /> merge\n"
    );
    assert_stable("let p = /> fetch \\> a \\> b /> merge");
}

#[test]
fn test_pipeline_literal_statement_is_parenthesized() {
    assert_eq!(fmt("/> a /> b"), "(/> a /> b)\n");
    assert_stable("let x = 1\n(/> a /> b)");
}

// --- Functions ---

#[test]
fn test_function_forms() {
    let src = "let add = (a, b) -> a + b :: (Int, Int) :> Int\n\
               let inc = (x) -> x + 1 :: Int :> Int\n\
               let pair = (p) -> p :: ((Int, Int)?) :> (Int, Int)\n\
               let all = (xs) -> xs :: Int :> [Int]\n";
    assert_eq!(fmt(src), src);
}

#[test]
fn test_function_defaults_annotations_reverse() {
    let src = "let f = (x: Int, y = 2) -> x + y\nlet g = (x) <- x\nlet h = () -> 42\n";
    assert_eq!(fmt(src), src);
}

#[test]
fn test_decorators() {
    let src = "let f = (x) -> x #memo #retry(3, \"slow\", true)\n";
    assert_eq!(fmt(src), src);
    assert_eq!(fmt("let f = (x) -> x #log()"), "let f = (x) -> x #log\n");
}

#[test]
fn test_open_body_before_signature_is_parenthesized() {
    let src = "let f = (x) -> ((y) -> y) :: Int\n";
    assert_eq!(fmt(src), src);
    assert_stable(src);
}

#[test]
fn test_block_body() {
    let src = "let f = (x) -> {\n  let y = x * 2\n  y + 1\n}\n";
    assert_eq!(fmt(src), src);
    assert_eq!(
        fmt("let f = (x) -> { let y = x * 2; y + 1 }"),
        src
    );
}

#[test]
fn test_attachments() {
    assert_eq!(
        fmt("let f = (x) -> @Logger Logger.log(x)"),
        "let f = (x) ->\n  @Logger\n  Logger.log(x)\n"
    );
    let src = "let f = (x) -> {\n  @Logger\n  let y = x\n  y\n}\n";
    assert_eq!(fmt(src), src);
}

#[test]
fn test_record_body_is_not_a_block() {
    let src = "let mk = (x) -> { value: x }\nlet empty = () -> {}\n";
    assert_eq!(fmt(src), src);
}

// --- Ternary and match ---

#[test]
fn test_ternary() {
    let src = "let s = a > 0 ? \"pos\" : a < 0 ? \"neg\" : \"zero\"\n";
    assert_eq!(fmt(src), src);
    assert_eq!(fmt("let s = (a ? b : c) ? d : e"), "let s = (a ? b : c) ? d : e\n");
}

#[test]
fn test_ternary_breaks_when_too_wide() {
    let [c, t, e] = ["c", "t", "e"].map(|s| s.repeat(30));
    let src = format!("let s = {c} ? {t} : {e}");
    assert_eq!(fmt(&src), format!("let s = {c}\n  ? {t}\n  : {e}\n"));
    assert_stable(&src);
}

#[test]
fn test_match_is_multi_line() {
    assert_eq!(
        fmt("match x | 1 -> \"one\" | if x > 5 -> \"big\" | \"other\""),
        "match x\n  | 1 -> \"one\"\n  | if x > 5 -> \"big\"\n  | \"other\"\n"
    );
}

#[test]
fn test_match_default_function_body_parenthesized() {
    let src = "match x\n  | 1 -> a\n  | ((y) -> y)\n";
    assert_eq!(fmt(src), src);
}

#[test]
fn test_nested_match_in_early_case() {
    assert_stable("match x\n  | 1 -> (match y\n    | 2 -> a)\n  | b");
}

// --- Statements ---

#[test]
fn test_blank_line_rules() {
    assert_eq!(
        fmt("let a = 1\nprint(a)\nlet b = 2"),
        "let a = 1\nprint(a)\n\nlet b = 2\n"
    );
    assert_eq!(
        fmt("let x = 1\ncontext Logger = { log: print }\nprovide Logger { log: print }\nprovide Config {}"),
        "let x = 1\n\ncontext Logger = { log: print }\n\nprovide Logger { log: print }\nprovide Config {}\n"
    );
}

#[test]
fn test_code_block() {
    assert_eq!(
        fmt("{-- Setup --}\nlet x = 1\n{/--}\nx"),
        "{-- Setup --}\n  let x = 1\n{/--}\n\nx\n"
    );
    assert_eq!(fmt("{--}\n{/--}"), "{--}\n{/--}\n");
}

#[test]
fn test_binding_forms() {
    let src = "let a = 1\nand b = 2\nmaybe c = 3\nc = 4\ndecorator trace = (f) -> f\nlet m = use \"./math\"\n";
    assert_eq!(fmt(src), src);
}

#[test]
fn test_placeholders() {
    let src = "let r = xs /> map(_ * 2) /> fold(input)\n";
    assert_eq!(fmt(src), src);
}

#[test]
fn test_await_and_return() {
    let src = "let f = (u) -> {\n  let r = await fetch(u)\n  return r.body\n}\n";
    assert_eq!(fmt(src), src);
}

#[test]
fn test_width_counts_prefix_and_indent() {
    // The bare list is exactly 80 columns; the binding prefix pushes it over.
    let items: Vec<String> = (0..10).map(|i| format!("item{:02}", i)).collect();
    let src = format!("let values = [{}]", items.join(", "));
    let out = fmt(&src);
    assert!(out.starts_with("let values = [\n  item00,\n"), "{}", out);
    for line in out.lines() {
        assert!(line.len() <= 80, "line too long: {:?}", line);
    }
}
