use crate::ast::*;
use crate::diagnostic::Diagnostic;
use crate::span::Spanned;

use super::super::lexeme::Lexeme;
use super::{ParseResult, Parser};

impl<'src> Parser<'src> {
    /// Statements up to (not including) `end`.
    ///
    /// Statements are separated by a line break or `;`. Another token on
    /// the same line after a complete statement is an error.
    pub(super) fn parse_statements(&mut self, end: &Lexeme) -> ParseResult<Vec<Spanned<Stmt>>> {
        let mut stmts: Vec<Spanned<Stmt>> = Vec::new();
        loop {
            while self.eat(&Lexeme::Semicolon) {}
            if self.at(end) || self.at(&Lexeme::Eof) {
                break;
            }

            let stmt = self.nested(|p| p.parse_stmt())?;
            if let Stmt::And { .. } = &stmt.node {
                let chained = matches!(
                    stmts.last().map(|s| &s.node),
                    Some(Stmt::Let { .. } | Stmt::And { .. })
                );
                if !chained {
                    return Err(Diagnostic::error(
                        "'and' must follow a 'let', 'maybe' or 'and' binding".to_string(),
                        stmt.span,
                    )
                    .with_help("start the group with `let name = value`".to_string()));
                }
            }
            stmts.push(stmt);

            if self.eat(&Lexeme::Semicolon) || self.at(end) || self.at(&Lexeme::Eof) {
                continue;
            }
            if !self.newline_before_current() {
                return Err(self.error_with_help(
                    &format!(
                        "expected end of statement, found {}",
                        self.peek().description()
                    ),
                    "put each statement on its own line or separate them with ';'",
                ));
            }
        }
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> ParseResult<Spanned<Stmt>> {
        let start = self.current_span();
        let stmt = match self.peek().clone() {
            Lexeme::Let | Lexeme::Maybe => {
                let mutable = self.at(&Lexeme::Maybe);
                self.advance();
                let (name, value) = self.parse_binding()?;
                Stmt::Let {
                    mutable,
                    name,
                    value,
                }
            }
            Lexeme::And => {
                self.advance();
                let (name, value) = self.parse_binding()?;
                Stmt::And { name, value }
            }
            Lexeme::Context => {
                self.advance();
                let (name, default) = self.parse_binding()?;
                Stmt::Context { name, default }
            }
            Lexeme::Provide => {
                self.advance();
                let name = self.expect_ident()?;
                let value = self.parse_expr()?;
                Stmt::Provide { name, value }
            }
            Lexeme::Decorator => {
                self.advance();
                let (name, transformer) = self.parse_binding()?;
                Stmt::Decorator { name, transformer }
            }
            Lexeme::BlockOpen(label) => {
                self.advance();
                let body = self.parse_statements(&Lexeme::BlockClose)?;
                self.expect(&Lexeme::BlockClose)?;
                Stmt::CodeBlock(CodeBlock { label, body })
            }
            Lexeme::Ident(_) if self.peek_at(1) == &Lexeme::Eq => {
                let (name, value) = self.parse_binding()?;
                Stmt::Assign { name, value }
            }
            Lexeme::BlockClose => {
                return Err(self.error_with_help(
                    "unexpected code block closer",
                    "'{/--}' closes a block opened with '{-- label --}'",
                ));
            }
            _ => Stmt::Expr(self.parse_expr()?),
        };
        Ok(Spanned::new(stmt, start.merge(self.prev_span())))
    }

    /// `name = expr`
    fn parse_binding(&mut self) -> ParseResult<(Spanned<String>, Spanned<Expr>)> {
        let name = self.expect_ident()?;
        self.expect(&Lexeme::Eq)?;
        let value = self.parse_expr()?;
        Ok((name, value))
    }

    /// `{ [@Attachment ...] stmts result }` after a function arrow.
    pub(super) fn parse_block_body(
        &mut self,
        attachments: &mut Vec<Spanned<String>>,
    ) -> ParseResult<Block> {
        let open = self.expect(&Lexeme::LBrace)?;
        attachments.extend(self.parse_attachments()?);
        let mut stmts = self.parse_statements(&Lexeme::RBrace)?;
        let close = self.expect(&Lexeme::RBrace)?;

        match stmts.pop() {
            Some(Spanned {
                node: Stmt::Expr(result),
                ..
            }) => Ok(Block {
                stmts,
                result: Box::new(result),
            }),
            _ => Err(Diagnostic::error(
                "function block has no result expression".to_string(),
                open.merge(close),
            )
            .with_help("end the block with the expression whose value it returns".to_string())),
        }
    }

    /// Zero or more `@Name` dependency attachments.
    pub(super) fn parse_attachments(&mut self) -> ParseResult<Vec<Spanned<String>>> {
        let mut attachments = Vec::new();
        while self.eat(&Lexeme::At) {
            attachments.push(self.expect_ident()?);
        }
        Ok(attachments)
    }
}
