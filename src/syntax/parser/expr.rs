use crate::ast::*;
use crate::diagnostic::Diagnostic;
use crate::span::Spanned;

use super::super::lexeme::{Lexeme, TemplateChunk};
use super::super::precedence::{binary_op, pipe_op, precedence, MIN_BINARY_PRECEDENCE};
use super::{ParseResult, Parser};

impl<'src> Parser<'src> {
    /// Full expression, pipes included. Pattern mode never leaks into a
    /// nested expression.
    pub(super) fn parse_expr(&mut self) -> ParseResult<Spanned<Expr>> {
        let saved = std::mem::replace(&mut self.pattern_mode, false);
        let result = self.nested(|p| p.parse_pipe());
        self.pattern_mode = saved;
        result
    }

    fn parse_pipe(&mut self) -> ParseResult<Spanned<Expr>> {
        let lhs = self.parse_ternary()?;
        self.parse_pipe_rest(lhs)
    }

    /// Continues a pipe chain whose first element is already parsed.
    fn parse_pipe_rest(&mut self, mut lhs: Spanned<Expr>) -> ParseResult<Spanned<Expr>> {
        loop {
            if self.at(&Lexeme::PipeParallel) {
                let branches = self.parse_parallel_branches()?;
                let span = lhs.span.merge(self.prev_span());
                lhs = Spanned::new(
                    Expr::ParallelPipe {
                        input: Box::new(lhs),
                        branches,
                    },
                    span,
                );
                continue;
            }
            let Some(op) = pipe_op(self.peek()) else {
                break;
            };
            self.advance();
            let stage = self.parse_ternary()?;
            let span = lhs.span.merge(stage.span);
            lhs = Spanned::new(Expr::pipe(op, lhs, stage), span);
        }
        Ok(lhs)
    }

    /// `\> a \> b ...`, at least two branches.
    fn parse_parallel_branches(&mut self) -> ParseResult<Vec<Spanned<Expr>>> {
        let first = self.current_span();
        let mut branches = Vec::new();
        while self.eat(&Lexeme::PipeParallel) {
            branches.push(self.parse_ternary()?);
        }
        if branches.len() < 2 {
            return Err(Diagnostic::error(
                "parallel pipe needs at least two branches".to_string(),
                first.merge(self.prev_span()),
            )
            .with_help("add another `\\> branch`, or use `/>` for a single stage".to_string()));
        }
        Ok(branches)
    }

    fn parse_ternary(&mut self) -> ParseResult<Spanned<Expr>> {
        let cond = self.parse_binary(MIN_BINARY_PRECEDENCE)?;
        if !self.eat(&Lexeme::Question) {
            return Ok(cond);
        }
        let then_branch = self.nested(|p| p.parse_ternary())?;
        self.expect(&Lexeme::Colon)?;
        let else_branch = self.nested(|p| p.parse_ternary())?;
        let span = cond.span.merge(else_branch.span);
        Ok(Spanned::new(
            Expr::Ternary {
                cond: Box::new(cond),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            },
            span,
        ))
    }

    /// Precedence climbing over the shared operator table.
    fn parse_binary(&mut self, min_prec: u8) -> ParseResult<Spanned<Expr>> {
        let mut lhs = self.parse_unary()?;
        loop {
            let Some(op) = binary_op(self.peek()) else {
                break;
            };
            // A `-` starting a new line begins a new statement.
            if op == BinOp::Sub && self.newline_before_current() {
                break;
            }
            let prec = precedence(op);
            if prec < min_prec {
                break;
            }
            self.advance();
            let rhs = self.parse_binary(prec + 1)?;
            let span = lhs.span.merge(rhs.span);
            lhs = Spanned::new(
                Expr::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                span,
            );
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> ParseResult<Spanned<Expr>> {
        let start = self.current_span();
        let make: fn(Box<Spanned<Expr>>) -> Expr = match self.peek() {
            Lexeme::Minus => |operand| Expr::Unary {
                op: UnaryOp::Neg,
                operand,
            },
            Lexeme::Bang => |operand| Expr::Unary {
                op: UnaryOp::Not,
                operand,
            },
            Lexeme::Await => Expr::Await,
            _ => {
                let primary = self.parse_primary()?;
                return self.parse_postfix(primary);
            }
        };
        self.advance();
        let operand = self.nested(|p| p.parse_unary())?;
        let span = start.merge(operand.span);
        Ok(Spanned::new(make(Box::new(operand)), span))
    }

    fn parse_postfix(&mut self, mut expr: Spanned<Expr>) -> ParseResult<Spanned<Expr>> {
        loop {
            // Calls and indexing only continue on the same line.
            if self.at(&Lexeme::LParen) && !self.newline_before_current() {
                self.advance();
                let args = self.parse_comma_list(&Lexeme::RParen)?;
                self.expect(&Lexeme::RParen)?;
                let span = expr.span.merge(self.prev_span());
                expr = Spanned::new(
                    Expr::Call {
                        callee: Box::new(expr),
                        args,
                    },
                    span,
                );
            } else if self.at(&Lexeme::LBracket) && !self.newline_before_current() {
                self.advance();
                let index = self.parse_expr()?;
                self.expect(&Lexeme::RBracket)?;
                let span = expr.span.merge(self.prev_span());
                expr = Spanned::new(
                    Expr::Index {
                        target: Box::new(expr),
                        index: Box::new(index),
                    },
                    span,
                );
            } else if self.eat(&Lexeme::Dot) {
                let member = self.expect_ident()?;
                let span = expr.span.merge(member.span);
                expr = Spanned::new(
                    Expr::Member {
                        object: Box::new(expr),
                        member,
                    },
                    span,
                );
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> ParseResult<Spanned<Expr>> {
        let start = self.current_span();
        let expr = match self.peek().clone() {
            Lexeme::Number(n) => {
                self.advance();
                Expr::Literal(Literal::Number(n))
            }
            Lexeme::Str(s) => {
                self.advance();
                Expr::Literal(Literal::Str(s))
            }
            Lexeme::True => {
                self.advance();
                Expr::Literal(Literal::Bool(true))
            }
            Lexeme::False => {
                self.advance();
                Expr::Literal(Literal::Bool(false))
            }
            Lexeme::Template(chunks) => {
                self.advance();
                Expr::Template(self.parse_template(chunks)?)
            }
            Lexeme::Ident(name) => {
                self.advance();
                Expr::Ident(name)
            }
            Lexeme::Underscore => {
                self.advance();
                Expr::Placeholder(PlaceholderSpelling::Underscore)
            }
            Lexeme::Input => {
                self.advance();
                Expr::Placeholder(PlaceholderSpelling::Input)
            }
            Lexeme::LParen if !self.pattern_mode && self.is_function_ahead() => {
                return self.parse_function();
            }
            Lexeme::LParen => return self.parse_paren_or_tuple(),
            Lexeme::LBracket => {
                self.advance();
                let items = self.parse_comma_list(&Lexeme::RBracket)?;
                self.expect(&Lexeme::RBracket)?;
                Expr::List(items)
            }
            Lexeme::LBrace => Expr::Record(self.parse_record()?),
            Lexeme::Match => Expr::Match(Box::new(self.nested(|p| p.parse_match())?)),
            Lexeme::Return => {
                self.advance();
                let value = self.parse_expr()?;
                Expr::Return(Box::new(value))
            }
            Lexeme::Use => {
                self.advance();
                match self.peek().clone() {
                    Lexeme::Str(path) => {
                        self.advance();
                        Expr::Use(path)
                    }
                    _ => {
                        return Err(self.error_with_help(
                            &format!(
                                "expected module path string after 'use', found {}",
                                self.peek().description()
                            ),
                            "write `use \"./path\"`",
                        ))
                    }
                }
            }
            Lexeme::PipeForward | Lexeme::PipeParallel => {
                Expr::Pipeline(self.nested(|p| p.parse_pipeline_literal())?)
            }
            Lexeme::PipeBidi => Expr::BidiPipeline(self.nested(|p| p.parse_bidi_literal())?),
            other => {
                return Err(self.error_with_help(
                    &format!("expected expression, found {}", other.description()),
                    "expressions start with a literal, a name, '(', '[', '{' or a keyword such as 'match'",
                ))
            }
        };
        Ok(Spanned::new(expr, start.merge(self.prev_span())))
    }

    /// `(e)` groups, `(a, b, ...)` is a tuple. `()` is only valid as an
    /// empty parameter list, which `is_function_ahead` already claimed.
    fn parse_paren_or_tuple(&mut self) -> ParseResult<Spanned<Expr>> {
        let start = self.expect(&Lexeme::LParen)?;
        if self.at(&Lexeme::RParen) {
            return Err(self.error_with_help(
                "empty parentheses are not an expression",
                "a function with no parameters is written `() -> body`",
            ));
        }
        let first = self.parse_expr()?;
        if !self.eat(&Lexeme::Comma) {
            self.expect(&Lexeme::RParen)?;
            return Ok(first);
        }
        let mut elements = vec![first];
        loop {
            elements.push(self.parse_expr()?);
            if !self.eat(&Lexeme::Comma) {
                break;
            }
        }
        self.expect(&Lexeme::RParen)?;
        Ok(Spanned::new(
            Expr::Tuple(elements),
            start.merge(self.prev_span()),
        ))
    }

    /// Comma separated expressions up to `close`; a trailing comma is allowed.
    fn parse_comma_list(&mut self, close: &Lexeme) -> ParseResult<Vec<Spanned<Expr>>> {
        let mut items = Vec::new();
        while !self.at(close) && !self.at(&Lexeme::Eof) {
            items.push(self.parse_expr()?);
            if !self.eat(&Lexeme::Comma) {
                break;
            }
        }
        Ok(items)
    }

    fn parse_record(&mut self) -> ParseResult<Vec<RecordField>> {
        self.expect(&Lexeme::LBrace)?;
        let mut fields = Vec::new();
        while !self.at(&Lexeme::RBrace) && !self.at(&Lexeme::Eof) {
            let key = self.expect_ident()?;
            if !self.at(&Lexeme::Colon) {
                return Err(self.error_with_help(
                    &format!(
                        "expected ':' after record key, found {}",
                        self.peek().description()
                    ),
                    "record fields are written `key: value`",
                ));
            }
            self.advance();
            let value = self.parse_expr()?;
            fields.push(RecordField { key, value });
            if !self.eat(&Lexeme::Comma) {
                break;
            }
        }
        self.expect(&Lexeme::RBrace)?;
        Ok(fields)
    }

    fn parse_template(&mut self, chunks: Vec<TemplateChunk>) -> ParseResult<TemplateString> {
        let mut chunks = chunks.into_iter();
        let head = match chunks.next() {
            Some(TemplateChunk::Text(text)) => text,
            _ => String::new(),
        };
        let mut tail = Vec::new();
        while let Some(chunk) = chunks.next() {
            let TemplateChunk::Interp(tokens) = chunk else {
                return Err(self.error_at_current("malformed template string"));
            };
            let mut sub = self.sub_parser(tokens);
            let expr = sub.parse_expr()?;
            sub.expect(&Lexeme::Eof)?;
            let text = match chunks.next() {
                Some(TemplateChunk::Text(text)) => text,
                _ => String::new(),
            };
            tail.push((expr, text));
        }
        Ok(TemplateString { head, tail })
    }

    // --- Functions ---

    /// True when the `(` at the cursor opens a parameter list: its matching
    /// `)` is followed by `->` or `<-`.
    fn is_function_ahead(&self) -> bool {
        let close = self.tokens[self.pos..]
            .iter()
            .scan(0usize, |depth, tok| {
                match tok.node {
                    Lexeme::LParen | Lexeme::LBracket | Lexeme::LBrace => *depth += 1,
                    Lexeme::RParen | Lexeme::RBracket | Lexeme::RBrace => {
                        *depth = depth.saturating_sub(1)
                    }
                    _ => {}
                }
                Some(*depth)
            })
            .position(|depth| depth == 0);
        match close {
            Some(offset) => matches!(
                self.peek_at(offset + 1),
                Lexeme::Arrow | Lexeme::ArrowLeft
            ),
            None => false,
        }
    }

    fn parse_function(&mut self) -> ParseResult<Spanned<Expr>> {
        let start = self.expect(&Lexeme::LParen)?;
        let mut params = Vec::new();
        while !self.at(&Lexeme::RParen) && !self.at(&Lexeme::Eof) {
            let name = self.expect_ident()?;
            let annotation = if self.eat(&Lexeme::Colon) {
                Some(self.expect_ident()?)
            } else {
                None
            };
            let default = if self.eat(&Lexeme::Eq) {
                Some(self.parse_expr()?)
            } else {
                None
            };
            params.push(Param {
                name,
                annotation,
                default,
            });
            if !self.eat(&Lexeme::Comma) {
                break;
            }
        }
        self.expect(&Lexeme::RParen)?;

        let is_reverse = if self.eat(&Lexeme::Arrow) {
            false
        } else if self.eat(&Lexeme::ArrowLeft) {
            true
        } else {
            return Err(self.error_at_current(&format!(
                "expected '->' or '<-' after parameters, found {}",
                self.peek().description()
            )));
        };

        let mut attachments = self.parse_attachments()?;
        let body = if self.at(&Lexeme::LBrace) && !self.is_record_ahead() {
            FunctionBody::Block(self.parse_block_body(&mut attachments)?)
        } else {
            FunctionBody::Expr(Box::new(self.parse_expr()?))
        };

        let signature = if self.at(&Lexeme::ColonColon) {
            Some(self.parse_signature()?)
        } else {
            None
        };
        let decorators = self.parse_decorators()?;

        let function = Function {
            params,
            is_reverse,
            signature,
            attachments,
            body,
            decorators,
        };
        Ok(Spanned::new(
            Expr::Function(Box::new(function)),
            start.merge(self.prev_span()),
        ))
    }

    /// After an arrow, `{}` and `{ key: ...` are records; any other `{`
    /// opens a block body.
    fn is_record_ahead(&self) -> bool {
        match self.peek_at(1) {
            Lexeme::RBrace => true,
            Lexeme::Ident(_) => self.peek_at(2) == &Lexeme::Colon,
            _ => false,
        }
    }

    /// `:: Params [:> Return]`
    fn parse_signature(&mut self) -> ParseResult<TypeSignature> {
        self.expect(&Lexeme::ColonColon)?;
        let params = if self.eat(&Lexeme::LParen) {
            let mut params = Vec::new();
            while !self.at(&Lexeme::RParen) && !self.at(&Lexeme::Eof) {
                params.push(self.parse_param_type()?);
                if !self.eat(&Lexeme::Comma) {
                    break;
                }
            }
            self.expect(&Lexeme::RParen)?;
            params
        } else {
            vec![ParamType::Named(self.expect_ident()?.node)]
        };

        let ret = if self.eat(&Lexeme::ColonGt) {
            Some(if self.at(&Lexeme::LParen) {
                ReturnType::Tuple(self.parse_type_tuple()?)
            } else if self.eat(&Lexeme::LBracket) {
                let element = self.expect_ident()?.node;
                self.expect(&Lexeme::RBracket)?;
                ReturnType::List(element)
            } else {
                ReturnType::Named(self.expect_ident()?.node)
            })
        } else {
            None
        };
        Ok(TypeSignature { params, ret })
    }

    fn parse_param_type(&mut self) -> ParseResult<ParamType> {
        if self.at(&Lexeme::LParen) {
            let elements = self.parse_type_tuple()?;
            let optional = self.eat(&Lexeme::Question);
            Ok(ParamType::Tuple { elements, optional })
        } else {
            Ok(ParamType::Named(self.expect_ident()?.node))
        }
    }

    /// `(A, B, ...)` of type names.
    fn parse_type_tuple(&mut self) -> ParseResult<Vec<String>> {
        self.expect(&Lexeme::LParen)?;
        let mut names = Vec::new();
        while !self.at(&Lexeme::RParen) && !self.at(&Lexeme::Eof) {
            names.push(self.expect_ident()?.node);
            if !self.eat(&Lexeme::Comma) {
                break;
            }
        }
        self.expect(&Lexeme::RParen)?;
        Ok(names)
    }

    /// Zero or more `#name` / `#name(lit, ...)` decorators.
    fn parse_decorators(&mut self) -> ParseResult<Vec<Decorator>> {
        let mut decorators = Vec::new();
        while self.eat(&Lexeme::Hash) {
            let name = self.expect_ident()?;
            let mut args = Vec::new();
            if self.at(&Lexeme::LParen) && !self.newline_before_current() {
                self.advance();
                while !self.at(&Lexeme::RParen) && !self.at(&Lexeme::Eof) {
                    args.push(self.parse_decorator_arg()?);
                    if !self.eat(&Lexeme::Comma) {
                        break;
                    }
                }
                self.expect(&Lexeme::RParen)?;
            }
            decorators.push(Decorator { name, args });
        }
        Ok(decorators)
    }

    fn parse_decorator_arg(&mut self) -> ParseResult<Literal> {
        let negative = self.eat(&Lexeme::Minus);
        let literal = match self.peek().clone() {
            Lexeme::Number(n) => Literal::Number(if negative { -n } else { n }),
            Lexeme::Str(s) if !negative => Literal::Str(s),
            Lexeme::True if !negative => Literal::Bool(true),
            Lexeme::False if !negative => Literal::Bool(false),
            other => {
                return Err(self.error_with_help(
                    &format!("expected literal decorator argument, found {}", other.description()),
                    "decorator arguments are numbers, strings or booleans",
                ))
            }
        };
        self.advance();
        Ok(literal)
    }

    // --- Match ---

    fn parse_match(&mut self) -> ParseResult<Match> {
        self.expect(&Lexeme::Match)?;
        let value = self.parse_pipe()?;
        let mut cases = Vec::new();
        while self.eat(&Lexeme::Pipe) {
            cases.push(self.parse_match_case()?);
        }
        if cases.is_empty() {
            return Err(self.error_with_help(
                &format!(
                    "expected '|' to start a match case, found {}",
                    self.peek().description()
                ),
                "cases are written `| pattern -> body`, `| if guard -> body` or `| body`",
            ));
        }
        Ok(Match { value, cases })
    }

    fn parse_match_case(&mut self) -> ParseResult<MatchCase> {
        if self.eat(&Lexeme::If) {
            let guard = self.parse_pattern()?;
            self.expect(&Lexeme::Arrow)?;
            let body = self.parse_expr()?;
            return Ok(MatchCase {
                kind: CaseKind::Guard(guard),
                body,
            });
        }

        let lead = self.parse_pattern()?;
        if self.eat(&Lexeme::Arrow) {
            let body = self.parse_expr()?;
            Ok(MatchCase {
                kind: CaseKind::Pattern(lead),
                body,
            })
        } else {
            // No arrow: what was read is the start of a default body.
            let body = self.parse_pipe_rest(lead)?;
            Ok(MatchCase {
                kind: CaseKind::Default,
                body,
            })
        }
    }

    fn parse_pattern(&mut self) -> ParseResult<Spanned<Expr>> {
        let saved = std::mem::replace(&mut self.pattern_mode, true);
        let result = self.parse_ternary();
        self.pattern_mode = saved;
        result
    }

    // --- Pipeline literals ---

    fn parse_pipeline_literal(&mut self) -> ParseResult<Pipeline> {
        let mut stages = Vec::new();
        loop {
            if self.eat(&Lexeme::PipeForward) {
                stages.push(PipelineStage::Single(self.parse_ternary()?));
            } else if self.at(&Lexeme::PipeParallel) {
                stages.push(PipelineStage::Parallel(self.parse_parallel_branches()?));
            } else {
                break;
            }
        }
        let decorators = self.parse_decorators()?;
        Ok(Pipeline { stages, decorators })
    }

    fn parse_bidi_literal(&mut self) -> ParseResult<BidiPipeline> {
        let mut stages = Vec::new();
        while self.eat(&Lexeme::PipeBidi) {
            stages.push(self.parse_ternary()?);
        }
        let decorators = self.parse_decorators()?;
        Ok(BidiPipeline { stages, decorators })
    }
}
