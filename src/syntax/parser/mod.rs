mod expr;
mod stmts;

use crate::ast::*;
use crate::diagnostic::Diagnostic;
use crate::span::{Span, Spanned};

use super::lexeme::Lexeme;

/// Deep enough for real programs, shallow enough that a debug build stays
/// within a 2 MB thread stack.
const MAX_NESTING_DEPTH: u32 = 64;

pub(crate) type ParseResult<T> = Result<T, Diagnostic>;

/// Recursive-descent parser over a lexed token stream.
///
/// Parsing stops at the first error. The source text is kept alongside the
/// tokens because a few decisions depend on whether a line break separates
/// two tokens: call and index postfixes, binary minus, and statement ends.
pub(crate) struct Parser<'src> {
    tokens: Vec<Spanned<Lexeme>>,
    pos: usize,
    source: &'src str,
    depth: u32,
    /// Set while reading a match pattern or guard, where `(x) -> ...` is a
    /// parenthesized pattern followed by the case arrow, not a function.
    pattern_mode: bool,
}

impl<'src> Parser<'src> {
    pub(crate) fn new_with_source(tokens: Vec<Spanned<Lexeme>>, source: &'src str) -> Self {
        Self {
            tokens,
            pos: 0,
            source,
            depth: 0,
            pattern_mode: false,
        }
    }

    pub(crate) fn parse_program(mut self) -> ParseResult<Program> {
        let statements = self.parse_statements(&Lexeme::Eof)?;
        self.expect(&Lexeme::Eof)?;
        Ok(Program { statements })
    }

    /// Runs `f` one nesting level deeper, failing once the limit is hit.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            self.depth -= 1;
            return Err(self.error_with_help(
                &format!("nesting depth exceeded (maximum {} levels)", MAX_NESTING_DEPTH),
                "simplify the program by extracting deeply nested code into named functions",
            ));
        }
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Sub-parser for the tokens of one template interpolation.
    fn sub_parser(&self, tokens: Vec<Spanned<Lexeme>>) -> Parser<'src> {
        Parser {
            tokens,
            pos: 0,
            source: self.source,
            depth: self.depth,
            pattern_mode: false,
        }
    }

    // --- Utility methods ---

    fn peek(&self) -> &Lexeme {
        &self.tokens[self.pos].node
    }

    fn peek_at(&self, offset: usize) -> &Lexeme {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].node
    }

    fn current_span(&self) -> Span {
        self.tokens[self.pos].span
    }

    fn prev_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            self.current_span()
        }
    }

    fn advance(&mut self) -> &Spanned<Lexeme> {
        let tok = &self.tokens[self.pos];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn at(&self, token: &Lexeme) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    fn eat(&mut self, token: &Lexeme) -> bool {
        if self.at(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Lexeme) -> ParseResult<Span> {
        if self.at(token) {
            let span = self.current_span();
            self.advance();
            Ok(span)
        } else {
            Err(self.error_at_current(&format!(
                "expected {}, found {}",
                token.description(),
                self.peek().description()
            )))
        }
    }

    fn expect_ident(&mut self) -> ParseResult<Spanned<String>> {
        if let Lexeme::Ident(name) = self.peek().clone() {
            let span = self.current_span();
            self.advance();
            Ok(Spanned::new(name, span))
        } else {
            Err(self.error_at_current(&format!(
                "expected identifier, found {}",
                self.peek().description()
            )))
        }
    }

    /// True when a line break separates the previous token from the current one.
    fn newline_before_current(&self) -> bool {
        if self.pos == 0 {
            return true;
        }
        let gap = self.prev_span().end as usize..self.current_span().start as usize;
        self.source.get(gap).is_some_and(|text| text.contains('\n'))
    }

    fn error_at_current(&self, msg: &str) -> Diagnostic {
        Diagnostic::error(msg.to_string(), self.current_span())
    }

    fn error_with_help(&self, msg: &str, help: &str) -> Diagnostic {
        Diagnostic::error(msg.to_string(), self.current_span()).with_help(help.to_string())
    }
}
