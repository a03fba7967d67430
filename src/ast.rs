use crate::span::Spanned;

/// A parsed `.lea` file: the ordered top-level statements.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Spanned<Stmt>>,
}

/// Statements.
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    /// `let name = value` or `maybe name = value` (mutable).
    Let {
        mutable: bool,
        name: Spanned<String>,
        value: Spanned<Expr>,
    },
    /// `and name = value`, chained onto the binding right before it.
    And {
        name: Spanned<String>,
        value: Spanned<Expr>,
    },
    /// `name = value` on an existing `maybe` binding.
    Assign {
        name: Spanned<String>,
        value: Spanned<Expr>,
    },
    Expr(Spanned<Expr>),
    /// `context Name = default`
    Context {
        name: Spanned<String>,
        default: Spanned<Expr>,
    },
    /// `provide Name value`
    Provide {
        name: Spanned<String>,
        value: Spanned<Expr>,
    },
    /// `decorator name = transformer`
    Decorator {
        name: Spanned<String>,
        transformer: Spanned<Expr>,
    },
    CodeBlock(CodeBlock),
}

/// `{-- label --}` ... `{/--}`
#[derive(Clone, Debug, PartialEq)]
pub struct CodeBlock {
    pub label: Option<String>,
    pub body: Vec<Spanned<Stmt>>,
}

/// Expressions.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Template(TemplateString),
    Ident(String),
    Placeholder(PlaceholderSpelling),
    Binary {
        op: BinOp,
        lhs: Box<Spanned<Expr>>,
        rhs: Box<Spanned<Expr>>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Spanned<Expr>>,
    },
    /// `input /> stage`
    Pipe(PipeLink),
    /// `input \> a \> b`
    ParallelPipe {
        input: Box<Spanned<Expr>>,
        branches: Vec<Spanned<Expr>>,
    },
    /// `list />>> stage`
    SpreadPipe(PipeLink),
    /// `input </ stage`
    ReversePipe(PipeLink),
    /// `source @> stage`
    ReactivePipe(PipeLink),
    Call {
        callee: Box<Spanned<Expr>>,
        args: Vec<Spanned<Expr>>,
    },
    Function(Box<Function>),
    List(Vec<Spanned<Expr>>),
    Tuple(Vec<Spanned<Expr>>),
    Record(Vec<RecordField>),
    Index {
        target: Box<Spanned<Expr>>,
        index: Box<Spanned<Expr>>,
    },
    Member {
        object: Box<Spanned<Expr>>,
        member: Spanned<String>,
    },
    Ternary {
        cond: Box<Spanned<Expr>>,
        then_branch: Box<Spanned<Expr>>,
        else_branch: Box<Spanned<Expr>>,
    },
    Return(Box<Spanned<Expr>>),
    Await(Box<Spanned<Expr>>),
    Match(Box<Match>),
    Pipeline(Pipeline),
    BidiPipeline(BidiPipeline),
    /// `use "./path"`
    Use(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Number(f64),
    Str(String),
    Bool(bool),
}

/// A template string always starts and ends with a (possibly empty) text
/// segment; `head` is the first one and every interpolation is followed by
/// the text after it.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateString {
    pub head: String,
    pub tail: Vec<(Spanned<Expr>, String)>,
}

/// The anonymous pipe input can be written `_` or `input`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaceholderSpelling {
    Underscore,
    Input,
}

impl PlaceholderSpelling {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceholderSpelling::Underscore => "_",
            PlaceholderSpelling::Input => "input",
        }
    }
}

/// One link of a pipe chain: the value flowing in and the stage it feeds.
#[derive(Clone, Debug, PartialEq)]
pub struct PipeLink {
    pub input: Box<Spanned<Expr>>,
    pub stage: Box<Spanned<Expr>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordField {
    pub key: Spanned<String>,
    pub value: Spanned<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub params: Vec<Param>,
    /// `(x) <- body` instead of `(x) -> body`.
    pub is_reverse: bool,
    pub signature: Option<TypeSignature>,
    /// `@Context` dependencies.
    pub attachments: Vec<Spanned<String>>,
    pub body: FunctionBody,
    pub decorators: Vec<Decorator>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: Spanned<String>,
    /// Deprecated inline `(x: Int)` annotation.
    pub annotation: Option<Spanned<String>>,
    pub default: Option<Spanned<Expr>>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FunctionBody {
    Expr(Box<Spanned<Expr>>),
    Block(Block),
}

/// Statements followed by the mandatory result expression.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub stmts: Vec<Spanned<Stmt>>,
    pub result: Box<Spanned<Expr>>,
}

/// Trailing `:: Params :> Return` signature.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeSignature {
    pub params: Vec<ParamType>,
    pub ret: Option<ReturnType>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParamType {
    Named(String),
    Tuple { elements: Vec<String>, optional: bool },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReturnType {
    Named(String),
    Tuple(Vec<String>),
    List(String),
}

/// `#name` or `#name(1, "two", true)`
#[derive(Clone, Debug, PartialEq)]
pub struct Decorator {
    pub name: Spanned<String>,
    pub args: Vec<Literal>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Pipeline {
    pub stages: Vec<PipelineStage>,
    pub decorators: Vec<Decorator>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PipelineStage {
    Single(Spanned<Expr>),
    /// Fan-out branches; the combiner is the next stage.
    Parallel(Vec<Spanned<Expr>>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct BidiPipeline {
    pub stages: Vec<Spanned<Expr>>,
    pub decorators: Vec<Decorator>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Match {
    pub value: Spanned<Expr>,
    pub cases: Vec<MatchCase>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MatchCase {
    pub kind: CaseKind,
    pub body: Spanned<Expr>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CaseKind {
    /// `| pattern -> body`
    Pattern(Spanned<Expr>),
    /// `| if guard -> body`
    Guard(Spanned<Expr>),
    /// `| body`
    Default,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Eq,     // ==
    NotEq,  // !=
    Lt,     // <
    Gt,     // >
    LtEq,   // <=
    GtEq,   // >=
    Add,    // +
    Sub,    // -
    Concat, // ++
    Mul,    // *
    Div,    // /
    Mod,    // %
}

impl BinOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::LtEq => "<=",
            BinOp::GtEq => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Concat => "++",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg, // -
    Not, // !
}

impl UnaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
        }
    }
}

/// The four binary pipe forms, as they appear between two stages of a chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipeOp {
    Forward,  // />
    Spread,   // />>>
    Reverse,  // </
    Reactive, // @>
}

impl PipeOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipeOp::Forward => "/>",
            PipeOp::Spread => "/>>>",
            PipeOp::Reverse => "</",
            PipeOp::Reactive => "@>",
        }
    }
}

impl Expr {
    /// Build the pipe node for `op`.
    pub fn pipe(op: PipeOp, input: Spanned<Expr>, stage: Spanned<Expr>) -> Expr {
        let link = PipeLink {
            input: Box::new(input),
            stage: Box::new(stage),
        };
        match op {
            PipeOp::Forward => Expr::Pipe(link),
            PipeOp::Spread => Expr::SpreadPipe(link),
            PipeOp::Reverse => Expr::ReversePipe(link),
            PipeOp::Reactive => Expr::ReactivePipe(link),
        }
    }

    /// View a binary pipe node as its operator and link.
    pub fn as_pipe(&self) -> Option<(PipeOp, &PipeLink)> {
        match self {
            Expr::Pipe(link) => Some((PipeOp::Forward, link)),
            Expr::SpreadPipe(link) => Some((PipeOp::Spread, link)),
            Expr::ReversePipe(link) => Some((PipeOp::Reverse, link)),
            Expr::ReactivePipe(link) => Some((PipeOp::Reactive, link)),
            _ => None,
        }
    }
}
