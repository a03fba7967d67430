//! Operator precedence shared by the parser and the formatter.
//!
//! The parser climbs [`BINARY_OPERATORS`] to build binary nodes, and the
//! formatter compares [`Level`]s derived from the same table to decide where
//! parentheses must be re-inserted. Keeping one table is what makes
//! `format(parse(s))` re-parse to the same tree.

use crate::ast::{BinOp, Expr, PipeOp};

use super::lexeme::Lexeme;

/// One row of the binary operator table.
#[derive(Debug)]
pub struct BinaryOperator {
    pub lexeme: Lexeme,
    pub op: BinOp,
    /// 1 binds loosest. All levels are left-associative.
    pub precedence: u8,
}

pub const MIN_BINARY_PRECEDENCE: u8 = 1;

pub static BINARY_OPERATORS: [BinaryOperator; 12] = [
    BinaryOperator {
        lexeme: Lexeme::EqEq,
        op: BinOp::Eq,
        precedence: 1,
    },
    BinaryOperator {
        lexeme: Lexeme::BangEq,
        op: BinOp::NotEq,
        precedence: 1,
    },
    BinaryOperator {
        lexeme: Lexeme::Lt,
        op: BinOp::Lt,
        precedence: 2,
    },
    BinaryOperator {
        lexeme: Lexeme::Gt,
        op: BinOp::Gt,
        precedence: 2,
    },
    BinaryOperator {
        lexeme: Lexeme::LtEq,
        op: BinOp::LtEq,
        precedence: 2,
    },
    BinaryOperator {
        lexeme: Lexeme::GtEq,
        op: BinOp::GtEq,
        precedence: 2,
    },
    BinaryOperator {
        lexeme: Lexeme::Plus,
        op: BinOp::Add,
        precedence: 3,
    },
    BinaryOperator {
        lexeme: Lexeme::Minus,
        op: BinOp::Sub,
        precedence: 3,
    },
    BinaryOperator {
        lexeme: Lexeme::PlusPlus,
        op: BinOp::Concat,
        precedence: 3,
    },
    BinaryOperator {
        lexeme: Lexeme::Star,
        op: BinOp::Mul,
        precedence: 4,
    },
    BinaryOperator {
        lexeme: Lexeme::Slash,
        op: BinOp::Div,
        precedence: 4,
    },
    BinaryOperator {
        lexeme: Lexeme::Percent,
        op: BinOp::Mod,
        precedence: 4,
    },
];

/// Pipe operators; all share the loosest level.
pub static PIPE_OPERATORS: [(Lexeme, PipeOp); 4] = [
    (Lexeme::PipeForward, PipeOp::Forward),
    (Lexeme::PipeSpread, PipeOp::Spread),
    (Lexeme::PipeReverse, PipeOp::Reverse),
    (Lexeme::PipeReactive, PipeOp::Reactive),
];

/// The binary operator a lexeme denotes, if any.
pub fn binary_op(lexeme: &Lexeme) -> Option<BinOp> {
    BINARY_OPERATORS
        .iter()
        .find(|row| &row.lexeme == lexeme)
        .map(|row| row.op)
}

pub fn precedence(op: BinOp) -> u8 {
    BINARY_OPERATORS
        .iter()
        .find(|row| row.op == op)
        .map_or(MIN_BINARY_PRECEDENCE, |row| row.precedence)
}

/// The pipe operator a lexeme denotes, if any.
pub fn pipe_op(lexeme: &Lexeme) -> Option<PipeOp> {
    PIPE_OPERATORS
        .iter()
        .find(|(lx, _)| lx == lexeme)
        .map(|(_, op)| *op)
}

/// How tightly an expression form binds, loosest first.
///
/// `Open` forms (functions, `match`, `return`, pipeline literals) extend as
/// far right as the grammar allows, so they only stand unparenthesized where
/// nothing of the parent follows them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Open,
    Pipe,
    Ternary,
    Binary(u8),
    Unary,
    Postfix,
    Atom,
}

impl Level {
    /// The level required of the right operand of `op`: strictly tighter,
    /// which yields left-to-right grouping for equal precedence.
    pub fn right_of(op: BinOp) -> Level {
        let p = precedence(op) + 1;
        if p > max_precedence() {
            Level::Unary
        } else {
            Level::Binary(p)
        }
    }

    pub fn left_of(op: BinOp) -> Level {
        Level::Binary(precedence(op))
    }
}

fn max_precedence() -> u8 {
    BINARY_OPERATORS
        .iter()
        .map(|row| row.precedence)
        .max()
        .unwrap_or(MIN_BINARY_PRECEDENCE)
}

pub fn level_of(expr: &Expr) -> Level {
    match expr {
        Expr::Function(_)
        | Expr::Match(_)
        | Expr::Return(_)
        | Expr::Pipeline(_)
        | Expr::BidiPipeline(_) => Level::Open,
        Expr::Pipe(_)
        | Expr::ParallelPipe { .. }
        | Expr::SpreadPipe(_)
        | Expr::ReversePipe(_)
        | Expr::ReactivePipe(_) => Level::Pipe,
        Expr::Ternary { .. } => Level::Ternary,
        Expr::Binary { op, .. } => Level::Binary(precedence(*op)),
        Expr::Unary { .. } | Expr::Await(_) => Level::Unary,
        Expr::Call { .. } | Expr::Index { .. } | Expr::Member { .. } => Level::Postfix,
        Expr::Literal(_)
        | Expr::Template(_)
        | Expr::Ident(_)
        | Expr::Placeholder(_)
        | Expr::List(_)
        | Expr::Tuple(_)
        | Expr::Record(_)
        | Expr::Use(_) => Level::Atom,
    }
}

/// Whether `expr`, placed where the grammar expects at least `required`,
/// must be wrapped in parentheses. `tail` is true when nothing of the
/// enclosing construct follows the child.
pub fn needs_parens(expr: &Expr, required: Level, tail: bool) -> bool {
    match level_of(expr) {
        Level::Open => required > Level::Open || !tail,
        level => level < required,
    }
}
