pub mod ast;
pub mod config;
pub mod diagnostic;
pub mod span;
pub mod syntax;

// Re-exports keep the short `lea::X` paths used by the CLI and tests
pub use config::{ConfigError, FormatConfig};
pub use diagnostic::{Diagnostic, SyntaxError};
pub use syntax::lexeme;
pub use syntax::lexer;

use lexer::Lexer;
use syntax::parser::Parser;

/// Parse Lea source into a program, stopping at the first error.
///
/// Lexer diagnostics are collected for the whole input before parsing
/// starts; a clean token stream then fails on its first grammar error.
pub fn parse_source(source: &str, file_id: u16) -> Result<ast::Program, SyntaxError> {
    let (tokens, lex_errors) = Lexer::new(source, file_id).tokenize();
    if !lex_errors.is_empty() {
        return Err(SyntaxError::Lex(lex_errors));
    }
    Parser::new_with_source(tokens, source)
        .parse_program()
        .map_err(SyntaxError::Parse)
}

/// Render a program in canonical layout.
pub fn format_program(program: &ast::Program, config: &FormatConfig) -> String {
    syntax::format::format_program(program, config)
}

/// Parse and re-print `source` in canonical layout.
pub fn format_source(source: &str, config: &FormatConfig) -> Result<String, SyntaxError> {
    let program = parse_source(source, 0)?;
    Ok(format_program(&program, config))
}

/// Whether `source` is already in canonical layout.
pub fn is_formatted(source: &str, config: &FormatConfig) -> Result<bool, SyntaxError> {
    Ok(format_source(source, config)? == source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_source_defaults() {
        let out = format_source("let   x=1+2", &FormatConfig::default()).unwrap();
        assert_eq!(out, "let x = 1 + 2\n");
        assert!(is_formatted(&out, &FormatConfig::default()).unwrap());
    }

    #[test]
    fn test_parse_source_reports_lex_errors() {
        let err = parse_source("let s = \"open", 0).unwrap_err();
        assert!(matches!(err, SyntaxError::Lex(_)));
    }

    #[test]
    fn test_parse_source_reports_first_parse_error() {
        let err = parse_source("let = 1", 0).unwrap_err();
        match err {
            SyntaxError::Parse(diag) => assert_eq!(diag.span.start, 4),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_source_formats_to_empty() {
        assert_eq!(format_source("", &FormatConfig::default()).unwrap(), "");
        let comment_only = format_source("\n\n-- only a comment\n", &FormatConfig::default());
        assert_eq!(comment_only.unwrap(), "");
    }
}
