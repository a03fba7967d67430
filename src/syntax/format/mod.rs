mod expr;
mod stmts;

#[cfg(test)]
mod tests;

use crate::ast::*;
use crate::config::FormatConfig;

/// Format a parsed Lea program back to canonical source.
///
/// The output re-parses to a structurally equal tree. An empty program
/// formats to the empty string; anything else ends with one newline.
pub(crate) fn format_program(program: &Program, config: &FormatConfig) -> String {
    let mut ctx = FormatCtx::new(config);
    ctx.emit_program(program);
    let mut out = ctx.output;
    while out.ends_with("\n\n") {
        out.pop();
    }
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

pub(super) struct FormatCtx<'c> {
    pub(super) output: String,
    pub(super) config: &'c FormatConfig,
    /// `usize::MAX` while measuring the single-line layout of a node.
    pub(super) width: usize,
}

impl<'c> FormatCtx<'c> {
    fn new(config: &'c FormatConfig) -> Self {
        Self {
            output: String::new(),
            config,
            width: config.print_width,
        }
    }

    /// A context that never breaks for width; multi-line output from it
    /// means the node cannot be laid out on one line.
    pub(super) fn flat(&self) -> FormatCtx<'c> {
        FormatCtx {
            output: String::new(),
            config: self.config,
            width: usize::MAX,
        }
    }

    pub(super) fn is_flat(&self) -> bool {
        self.width == usize::MAX
    }

    /// Whether single-line `text` starting at column `col` stays within width.
    pub(super) fn fits(&self, col: usize, text: &str) -> bool {
        !text.contains('\n') && col.saturating_add(text.chars().count()) <= self.width
    }

    pub(super) fn indent(&self, level: usize) -> String {
        self.config.indent(level)
    }

    fn emit_program(&mut self, program: &Program) {
        let mut prev: Option<&Stmt> = None;
        for stmt in &program.statements {
            if prev.is_some_and(|prev| blank_line_between(prev, &stmt.node)) {
                self.output.push('\n');
            }
            let text = self.fmt_stmt(&stmt.node, 0);
            self.output.push_str(&text);
            self.output.push('\n');
            prev = Some(&stmt.node);
        }
    }
}

/// Top-level separation: bindings after expression statements, every
/// context definition, the first of a run of provides, and labeled blocks
/// are set off by one blank line.
fn blank_line_between(prev: &Stmt, next: &Stmt) -> bool {
    if matches!(prev, Stmt::CodeBlock(_)) {
        return true;
    }
    match next {
        Stmt::Let { .. } => matches!(prev, Stmt::Expr(_)),
        Stmt::Context { .. } | Stmt::CodeBlock(_) => true,
        Stmt::Provide { .. } => !matches!(prev, Stmt::Provide { .. }),
        _ => false,
    }
}

/// Column after appending `text` to a line that was at column `col`.
pub(super) fn end_col(col: usize, text: &str) -> usize {
    match text.rfind('\n') {
        Some(i) => text[i + 1..].chars().count(),
        None => col + text.chars().count(),
    }
}
