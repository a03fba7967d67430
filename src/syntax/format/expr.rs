use crate::ast::*;
use crate::span::Spanned;

use super::super::precedence::{level_of, needs_parens, Level, MIN_BINARY_PRECEDENCE};
use super::{end_col, FormatCtx};

/// A run of pipe stages: an optional leading value (absent for pipeline
/// literals) and the `operator stage` pairs that follow it.
struct PipeRun<'a> {
    head: Option<&'a Expr>,
    parts: Vec<(&'static str, &'a Expr)>,
    /// Parallel fan-out always renders one branch per line.
    force_break: bool,
}

impl<'c> FormatCtx<'c> {
    /// Render `expr` where the grammar expects at least `required`,
    /// adding parentheses when the tree would otherwise re-parse differently.
    pub(super) fn fmt_child(
        &self,
        expr: &Expr,
        required: Level,
        level: usize,
        col: usize,
        tail: bool,
    ) -> String {
        if needs_parens(expr, required, tail) {
            format!("({})", self.fmt_expr(expr, level, col + 1, true))
        } else {
            self.fmt_expr(expr, level, col, tail)
        }
    }

    /// Render `expr` starting at column `col` of a line indented `level`
    /// deep. `tail` is true when nothing of the enclosing construct follows.
    pub(super) fn fmt_expr(&self, expr: &Expr, level: usize, col: usize, tail: bool) -> String {
        match expr {
            Expr::Literal(lit) => format_literal(lit),
            Expr::Template(template) => self.fmt_template(template),
            Expr::Ident(name) => name.clone(),
            Expr::Placeholder(spelling) => spelling.as_str().to_string(),
            Expr::Use(path) => format!("use {}", quote_str(path)),
            Expr::Binary { op, lhs, rhs } => {
                let left = self.fmt_child(&lhs.node, Level::left_of(*op), level, col, false);
                let prefix = format!("{} {} ", left, op.as_str());
                let right = self.fmt_child(
                    &rhs.node,
                    Level::right_of(*op),
                    level,
                    end_col(col, &prefix),
                    tail,
                );
                prefix + &right
            }
            Expr::Unary { op, operand } => {
                // `--` would start a comment.
                if *op == UnaryOp::Neg && starts_with_minus(&operand.node) {
                    format!("-({})", self.fmt_expr(&operand.node, level, col + 2, true))
                } else {
                    let inner = self.fmt_child(&operand.node, Level::Unary, level, col + 1, tail);
                    format!("{}{}", op.as_str(), inner)
                }
            }
            Expr::Await(operand) => format!(
                "await {}",
                self.fmt_child(&operand.node, Level::Unary, level, col + 6, tail)
            ),
            Expr::Return(value) => format!(
                "return {}",
                self.fmt_child(&value.node, Level::Open, level, col + 7, tail)
            ),
            Expr::Call { callee, args } => {
                let head = self.fmt_child(&callee.node, Level::Postfix, level, col, false);
                self.fmt_delimited(head, ("(", ")"), args, level, col)
            }
            Expr::Index { target, index } => {
                let head = self.fmt_child(&target.node, Level::Postfix, level, col, false);
                let start = end_col(col, &head) + 1;
                let inner = self.fmt_child(&index.node, Level::Open, level, start, true);
                format!("{}[{}]", head, inner)
            }
            Expr::Member { object, member } => {
                let head = self.fmt_child(&object.node, Level::Postfix, level, col, false);
                format!("{}.{}", head, member.node)
            }
            Expr::List(items) => self.fmt_delimited(String::new(), ("[", "]"), items, level, col),
            Expr::Tuple(items) => {
                let mut out = String::from("(");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    let start = end_col(col, &out);
                    out.push_str(&self.fmt_child(&item.node, Level::Open, level, start, true));
                }
                out.push(')');
                out
            }
            Expr::Record(fields) => self.fmt_record(fields, level, col),
            Expr::Ternary {
                cond,
                then_branch,
                else_branch,
            } => self.fmt_ternary(cond, then_branch, else_branch, level, col, tail),
            Expr::Pipe(_)
            | Expr::SpreadPipe(_)
            | Expr::ReversePipe(_)
            | Expr::ReactivePipe(_)
            | Expr::ParallelPipe { .. } => {
                let run = chain_run(expr);
                self.fmt_pipe_run(&run, level, col, tail)
            }
            Expr::Function(function) => self.fmt_function(function, level, col),
            Expr::Match(m) => self.fmt_match(m, level, col),
            Expr::Pipeline(pipeline) => {
                let mut parts = Vec::new();
                for stage in &pipeline.stages {
                    match stage {
                        PipelineStage::Single(e) => parts.push(("/>", &e.node)),
                        PipelineStage::Parallel(branches) => {
                            parts.extend(branches.iter().map(|b| ("\\>", &b.node)))
                        }
                    }
                }
                let run = PipeRun {
                    head: None,
                    force_break: pipeline
                        .stages
                        .iter()
                        .any(|s| matches!(s, PipelineStage::Parallel(_))),
                    parts,
                };
                let stage_tail = tail && pipeline.decorators.is_empty();
                self.fmt_pipe_run(&run, level, col, stage_tail) + &format_decorators(&pipeline.decorators)
            }
            Expr::BidiPipeline(pipeline) => {
                let run = PipeRun {
                    head: None,
                    parts: pipeline.stages.iter().map(|s| ("</>", &s.node)).collect(),
                    force_break: false,
                };
                let stage_tail = tail && pipeline.decorators.is_empty();
                self.fmt_pipe_run(&run, level, col, stage_tail) + &format_decorators(&pipeline.decorators)
            }
        }
    }

    /// Comma separated items between `open` and `close`, on one line when
    /// they fit, otherwise one item per line.
    fn fmt_delimited(
        &self,
        prefix: String,
        (open, close): (&str, &str),
        items: &[Spanned<Expr>],
        level: usize,
        col: usize,
    ) -> String {
        if items.is_empty() {
            return format!("{}{}{}", prefix, open, close);
        }
        let flat_ctx = self.flat();
        let flat_items: Vec<String> = items
            .iter()
            .map(|item| flat_ctx.fmt_child(&item.node, Level::Open, level, 0, true))
            .collect();
        let flat = format!("{}{}{}{}", prefix, open, flat_items.join(", "), close);
        if self.is_flat() || self.fits(col, &flat) {
            return flat;
        }

        let inner = self.indent(level + 1);
        let mut out = format!("{}{}", prefix, open);
        for (i, item) in items.iter().enumerate() {
            out.push('\n');
            out.push_str(&inner);
            out.push_str(&self.fmt_child(&item.node, Level::Open, level + 1, inner.len(), true));
            if i + 1 < items.len() || self.config.trailing_commas {
                out.push(',');
            }
        }
        out.push('\n');
        out.push_str(&self.indent(level));
        out.push_str(close);
        out
    }

    fn fmt_record(&self, fields: &[RecordField], level: usize, col: usize) -> String {
        if fields.is_empty() {
            return "{}".to_string();
        }
        let flat_ctx = self.flat();
        let flat_fields: Vec<String> = fields
            .iter()
            .map(|f| {
                let value = flat_ctx.fmt_child(&f.value.node, Level::Open, level, 0, true);
                format!("{}: {}", f.key.node, value)
            })
            .collect();
        let flat = format!("{{ {} }}", flat_fields.join(", "));
        if self.is_flat() || self.fits(col, &flat) {
            return flat;
        }

        let inner = self.indent(level + 1);
        let mut out = String::from("{");
        for (i, field) in fields.iter().enumerate() {
            out.push('\n');
            out.push_str(&inner);
            out.push_str(&field.key.node);
            out.push_str(": ");
            let start = inner.len() + field.key.node.chars().count() + 2;
            out.push_str(&self.fmt_child(&field.value.node, Level::Open, level + 1, start, true));
            if i + 1 < fields.len() || self.config.trailing_commas {
                out.push(',');
            }
        }
        out.push('\n');
        out.push_str(&self.indent(level));
        out.push('}');
        out
    }

    fn fmt_ternary(
        &self,
        cond: &Spanned<Expr>,
        then_branch: &Spanned<Expr>,
        else_branch: &Spanned<Expr>,
        level: usize,
        col: usize,
        tail: bool,
    ) -> String {
        let cond_level = Level::Binary(MIN_BINARY_PRECEDENCE);
        let flat_ctx = self.flat();
        let flat = format!(
            "{} ? {} : {}",
            flat_ctx.fmt_child(&cond.node, cond_level, level, 0, false),
            flat_ctx.fmt_child(&then_branch.node, Level::Ternary, level, 0, false),
            flat_ctx.fmt_child(&else_branch.node, Level::Ternary, level, 0, tail),
        );
        if self.is_flat() || self.fits(col, &flat) {
            return flat;
        }

        let inner = self.indent(level + 1);
        let branch_col = inner.len() + 2;
        format!(
            "{}\n{}? {}\n{}: {}",
            self.fmt_child(&cond.node, cond_level, level, col, false),
            inner,
            self.fmt_child(&then_branch.node, Level::Ternary, level + 1, branch_col, false),
            inner,
            self.fmt_child(&else_branch.node, Level::Ternary, level + 1, branch_col, tail),
        )
    }

    /// The leading value of a pipe chain. Binary and ternary expressions
    /// are always parenthesized there.
    fn fmt_chain_head(&self, head: &Expr, level: usize, col: usize) -> String {
        let wrap = matches!(head, Expr::Binary { .. } | Expr::Ternary { .. })
            || level_of(head) <= Level::Pipe;
        if wrap {
            format!("({})", self.fmt_expr(head, level, col + 1, true))
        } else {
            self.fmt_expr(head, level, col, false)
        }
    }

    fn fmt_pipe_run(&self, run: &PipeRun<'_>, level: usize, col: usize, tail: bool) -> String {
        if !run.force_break {
            let flat = self.flat().pipe_inline(run, level, col, tail);
            if self.is_flat() {
                return flat;
            }
            if !self.config.break_pipe_chains {
                return self.pipe_inline(run, level, col, tail);
            }
            if !flat.contains('\n') {
                if self.fits(col, &flat) {
                    return flat;
                }
                // Short chains stay on one line, but their stages may still break.
                let stages = run.parts.len() + usize::from(run.head.is_some());
                if stages < self.config.pipe_chain_break_threshold {
                    return self.pipe_inline(run, level, col, tail);
                }
            }
        }
        self.pipe_broken(run, level, col, tail)
    }

    fn pipe_inline(&self, run: &PipeRun<'_>, level: usize, col: usize, tail: bool) -> String {
        let mut out = match run.head {
            Some(head) => self.fmt_chain_head(head, level, col),
            None => String::new(),
        };
        let last = run.parts.len().saturating_sub(1);
        for (i, (op, stage)) in run.parts.iter().enumerate() {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(op);
            out.push(' ');
            let start = end_col(col, &out);
            out.push_str(&self.fmt_child(stage, Level::Ternary, level, start, tail && i == last));
        }
        out
    }

    /// One `op stage` per line, one level deeper than the chain. A
    /// pipeline literal keeps its first stage on the current line.
    fn pipe_broken(&self, run: &PipeRun<'_>, level: usize, col: usize, tail: bool) -> String {
        let inner = self.indent(level + 1);
        let mut out = match run.head {
            Some(head) => self.fmt_chain_head(head, level, col),
            None => String::new(),
        };
        let last = run.parts.len().saturating_sub(1);
        for (i, (op, stage)) in run.parts.iter().enumerate() {
            if i > 0 || run.head.is_some() {
                out.push('\n');
                out.push_str(&inner);
            }
            out.push_str(op);
            out.push(' ');
            let start = end_col(col, &out);
            out.push_str(&self.fmt_child(stage, Level::Ternary, level + 1, start, tail && i == last));
        }
        out
    }

    fn fmt_function(&self, function: &Function, level: usize, col: usize) -> String {
        let mut out = String::from("(");
        for (i, param) in function.params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&param.name.node);
            if let Some(annotation) = &param.annotation {
                out.push_str(": ");
                out.push_str(&annotation.node);
            }
            if let Some(default) = &param.default {
                out.push_str(" = ");
                let start = end_col(col, &out);
                out.push_str(&self.fmt_child(&default.node, Level::Open, level, start, true));
            }
        }
        out.push_str(if function.is_reverse { ") <-" } else { ") ->" });

        // An open body would swallow a trailing signature or decorator.
        let body_tail = function.signature.is_none() && function.decorators.is_empty();
        let inner = self.indent(level + 1);
        match &function.body {
            FunctionBody::Expr(body) if function.attachments.is_empty() => {
                out.push(' ');
                let start = end_col(col, &out);
                out.push_str(&self.fmt_child(&body.node, Level::Open, level, start, body_tail));
            }
            FunctionBody::Expr(body) => {
                for attachment in &function.attachments {
                    out.push('\n');
                    out.push_str(&inner);
                    out.push('@');
                    out.push_str(&attachment.node);
                }
                out.push('\n');
                out.push_str(&inner);
                out.push_str(&self.fmt_child(
                    &body.node,
                    Level::Open,
                    level + 1,
                    inner.len(),
                    body_tail,
                ));
            }
            FunctionBody::Block(block) => {
                out.push_str(" {");
                for attachment in &function.attachments {
                    out.push('\n');
                    out.push_str(&inner);
                    out.push('@');
                    out.push_str(&attachment.node);
                }
                for stmt in &block.stmts {
                    out.push('\n');
                    out.push_str(&self.fmt_stmt(&stmt.node, level + 1));
                }
                out.push('\n');
                out.push_str(&self.fmt_expr_stmt(&block.result.node, level + 1));
                out.push('\n');
                out.push_str(&self.indent(level));
                out.push('}');
            }
        }

        if let Some(signature) = &function.signature {
            out.push_str(" :: ");
            out.push_str(&format_signature(signature));
        }
        out.push_str(&format_decorators(&function.decorators));
        out
    }

    /// `match value` followed by one `| case` line per case.
    fn fmt_match(&self, m: &Match, level: usize, col: usize) -> String {
        let mut out = String::from("match ");
        out.push_str(&self.fmt_child(&m.value.node, Level::Pipe, level, col + 6, false));
        let inner = self.indent(level + 1);
        let last = m.cases.len().saturating_sub(1);
        for (i, case) in m.cases.iter().enumerate() {
            let mut line = format!("{}| ", inner);
            match &case.kind {
                CaseKind::Pattern(pattern) => {
                    let start = line.len();
                    line.push_str(&self.fmt_child(
                        &pattern.node,
                        Level::Ternary,
                        level + 1,
                        start,
                        false,
                    ));
                    line.push_str(" -> ");
                }
                CaseKind::Guard(guard) => {
                    line.push_str("if ");
                    let start = line.len();
                    line.push_str(&self.fmt_child(
                        &guard.node,
                        Level::Ternary,
                        level + 1,
                        start,
                        false,
                    ));
                    line.push_str(" -> ");
                }
                CaseKind::Default => {}
            }
            let start = end_col(0, &line);
            let body = &case.body.node;
            // Without an arrow, `| (x) -> ...` would read as a pattern case.
            if matches!(case.kind, CaseKind::Default) && matches!(body, Expr::Function(_)) {
                line.push('(');
                line.push_str(&self.fmt_expr(body, level + 1, start + 1, true));
                line.push(')');
            } else {
                line.push_str(&self.fmt_child(body, Level::Open, level + 1, start, i == last));
            }
            out.push('\n');
            out.push_str(&line);
        }
        out
    }

    fn fmt_template(&self, template: &TemplateString) -> String {
        let flat_ctx = self.flat();
        let mut out = String::from("`");
        out.push_str(&escape_template(&template.head));
        for (expr, text) in &template.tail {
            out.push_str("${");
            out.push_str(&flat_ctx.fmt_child(&expr.node, Level::Open, 0, 0, true));
            out.push('}');
            out.push_str(&escape_template(text));
        }
        out.push('`');
        out
    }
}

/// Flatten nested pipe links of every kind into one left-to-right run.
///
/// Two parallel fan-outs in a row would merge into one when printed, so
/// flattening stops there and the inner one becomes a parenthesized head.
fn chain_run(expr: &Expr) -> PipeRun<'_> {
    let mut links: Vec<Vec<(&'static str, &Expr)>> = Vec::new();
    let mut force_break = false;
    let mut current = expr;
    loop {
        if let Some((op, link)) = current.as_pipe() {
            links.push(vec![(op.as_str(), &link.stage.node)]);
            current = &link.input.node;
        } else if let Expr::ParallelPipe { input, branches } = current {
            force_break = true;
            links.push(branches.iter().map(|b| ("\\>", &b.node)).collect());
            current = &input.node;
            if matches!(current, Expr::ParallelPipe { .. }) {
                break;
            }
        } else {
            break;
        }
    }
    links.reverse();
    PipeRun {
        head: Some(current),
        parts: links.into_iter().flatten().collect(),
        force_break,
    }
}

/// Whether `expr` prints with a leading `-` when not parenthesized.
fn starts_with_minus(expr: &Expr) -> bool {
    match expr {
        Expr::Unary { op, .. } => *op == UnaryOp::Neg,
        Expr::Literal(Literal::Number(n)) => n.is_sign_negative(),
        _ => false,
    }
}

pub(super) fn format_literal(lit: &Literal) -> String {
    match lit {
        Literal::Number(n) => n.to_string(),
        Literal::Str(s) => quote_str(s),
        Literal::Bool(b) => b.to_string(),
    }
}

fn quote_str(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn escape_template(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '`' => out.push_str("\\`"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '$' if chars.peek() == Some(&'{') => out.push_str("\\$"),
            c => out.push(c),
        }
    }
    out
}

fn format_signature(signature: &TypeSignature) -> String {
    let mut out = match signature.params.as_slice() {
        [ParamType::Named(name)] => name.clone(),
        params => {
            let parts: Vec<String> = params.iter().map(format_param_type).collect();
            format!("({})", parts.join(", "))
        }
    };
    if let Some(ret) = &signature.ret {
        out.push_str(" :> ");
        match ret {
            ReturnType::Named(name) => out.push_str(name),
            ReturnType::Tuple(names) => out.push_str(&format!("({})", names.join(", "))),
            ReturnType::List(name) => out.push_str(&format!("[{}]", name)),
        }
    }
    out
}

fn format_param_type(param: &ParamType) -> String {
    match param {
        ParamType::Named(name) => name.clone(),
        ParamType::Tuple { elements, optional } => {
            format!("({}){}", elements.join(", "), if *optional { "?" } else { "" })
        }
    }
}

fn format_decorators(decorators: &[Decorator]) -> String {
    let mut out = String::new();
    for decorator in decorators {
        out.push_str(" #");
        out.push_str(&decorator.name.node);
        if !decorator.args.is_empty() {
            let args: Vec<String> = decorator.args.iter().map(format_literal).collect();
            out.push('(');
            out.push_str(&args.join(", "));
            out.push(')');
        }
    }
    out
}
