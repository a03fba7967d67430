use crate::ast::*;

use super::super::precedence::Level;
use super::FormatCtx;

impl<'c> FormatCtx<'c> {
    /// One statement, indented `level` deep, without a trailing newline.
    pub(super) fn fmt_stmt(&self, stmt: &Stmt, level: usize) -> String {
        let indent = self.indent(level);
        match stmt {
            Stmt::Let {
                mutable,
                name,
                value,
            } => {
                let keyword = if *mutable { "maybe" } else { "let" };
                let prefix = format!("{}{} {} = ", indent, keyword, name.node);
                self.fmt_binding(prefix, &value.node, level)
            }
            Stmt::And { name, value } => {
                self.fmt_binding(format!("{}and {} = ", indent, name.node), &value.node, level)
            }
            Stmt::Assign { name, value } => {
                self.fmt_binding(format!("{}{} = ", indent, name.node), &value.node, level)
            }
            Stmt::Context { name, default } => self.fmt_binding(
                format!("{}context {} = ", indent, name.node),
                &default.node,
                level,
            ),
            Stmt::Provide { name, value } => {
                self.fmt_binding(format!("{}provide {} ", indent, name.node), &value.node, level)
            }
            Stmt::Decorator { name, transformer } => self.fmt_binding(
                format!("{}decorator {} = ", indent, name.node),
                &transformer.node,
                level,
            ),
            Stmt::Expr(expr) => self.fmt_expr_stmt(&expr.node, level),
            Stmt::CodeBlock(block) => {
                let mut out = indent.clone();
                match &block.label {
                    Some(label) => {
                        out.push_str("{-- ");
                        out.push_str(label);
                        out.push_str(" --}");
                    }
                    None => out.push_str("{--}"),
                }
                for inner in &block.body {
                    out.push('\n');
                    out.push_str(&self.fmt_stmt(&inner.node, level + 1));
                }
                out.push('\n');
                out.push_str(&indent);
                out.push_str("{/--}");
                out
            }
        }
    }

    /// An expression on a line of its own. A statement cannot begin with a
    /// pipe operator, which would continue the previous line's expression.
    pub(super) fn fmt_expr_stmt(&self, expr: &Expr, level: usize) -> String {
        let indent = self.indent(level);
        if matches!(expr, Expr::Pipeline(_) | Expr::BidiPipeline(_)) {
            let col = indent.len() + 1;
            format!("{}({})", indent, self.fmt_expr(expr, level, col, true))
        } else {
            self.fmt_binding(indent, expr, level)
        }
    }

    fn fmt_binding(&self, prefix: String, value: &Expr, level: usize) -> String {
        let col = prefix.chars().count();
        let value = self.fmt_child(value, Level::Open, level, col, true);
        prefix + &value
    }
}
