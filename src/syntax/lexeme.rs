use crate::span::Spanned;

/// All lexemes in the Lea language.
#[derive(Clone, Debug, PartialEq)]
pub enum Lexeme {
    // Keywords
    Let,
    Maybe,
    And,
    Context,
    Provide,
    Decorator,
    Match,
    If,
    Return,
    Await,
    Use,
    True,
    False,
    Input,

    // Pipes
    PipeForward,  // />
    PipeSpread,   // />>>
    PipeParallel, // \>
    PipeReverse,  // </
    PipeBidi,     // </>
    PipeReactive, // @>

    // Symbols
    LParen,      // (
    RParen,      // )
    LBrace,      // {
    RBrace,      // }
    LBracket,    // [
    RBracket,    // ]
    Comma,       // ,
    Colon,       // :
    ColonColon,  // ::
    ColonGt,     // :>
    Semicolon,   // ;
    Dot,         // .
    Arrow,       // ->
    ArrowLeft,   // <-
    Eq,          // =
    EqEq,        // ==
    BangEq,      // !=
    Lt,          // <
    Gt,          // >
    LtEq,        // <=
    GtEq,        // >=
    Plus,        // +
    PlusPlus,    // ++
    Minus,       // -
    Star,        // *
    Slash,       // /
    Percent,     // %
    Bang,        // !
    Question,    // ?
    At,          // @
    Hash,        // #
    Pipe,        // |
    Underscore,  // _

    // Code block markers
    BlockOpen(Option<String>), // {-- label --}
    BlockClose,                // {/--}

    // Literals
    Number(f64),
    Str(String),
    Template(Vec<TemplateChunk>),
    Ident(String),

    // End of file
    Eof,
}

/// A piece of a lexed template string.
#[derive(Clone, Debug, PartialEq)]
pub enum TemplateChunk {
    Text(String),
    /// Tokens of one `${...}` interpolation, terminated by `Eof`.
    Interp(Vec<Spanned<Lexeme>>),
}

impl Lexeme {
    /// Try to match an identifier string to a keyword lexeme.
    pub fn from_keyword(s: &str) -> Option<Lexeme> {
        match s {
            "let" => Some(Lexeme::Let),
            "maybe" => Some(Lexeme::Maybe),
            "and" => Some(Lexeme::And),
            "context" => Some(Lexeme::Context),
            "provide" => Some(Lexeme::Provide),
            "decorator" => Some(Lexeme::Decorator),
            "match" => Some(Lexeme::Match),
            "if" => Some(Lexeme::If),
            "return" => Some(Lexeme::Return),
            "await" => Some(Lexeme::Await),
            "use" => Some(Lexeme::Use),
            "true" => Some(Lexeme::True),
            "false" => Some(Lexeme::False),
            "input" => Some(Lexeme::Input),
            _ => None,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Lexeme::Let => "'let'",
            Lexeme::Maybe => "'maybe'",
            Lexeme::And => "'and'",
            Lexeme::Context => "'context'",
            Lexeme::Provide => "'provide'",
            Lexeme::Decorator => "'decorator'",
            Lexeme::Match => "'match'",
            Lexeme::If => "'if'",
            Lexeme::Return => "'return'",
            Lexeme::Await => "'await'",
            Lexeme::Use => "'use'",
            Lexeme::True => "'true'",
            Lexeme::False => "'false'",
            Lexeme::Input => "'input'",
            Lexeme::PipeForward => "'/>'",
            Lexeme::PipeSpread => "'/>>>'",
            Lexeme::PipeParallel => "'\\>'",
            Lexeme::PipeReverse => "'</'",
            Lexeme::PipeBidi => "'</>'",
            Lexeme::PipeReactive => "'@>'",
            Lexeme::LParen => "'('",
            Lexeme::RParen => "')'",
            Lexeme::LBrace => "'{'",
            Lexeme::RBrace => "'}'",
            Lexeme::LBracket => "'['",
            Lexeme::RBracket => "']'",
            Lexeme::Comma => "','",
            Lexeme::Colon => "':'",
            Lexeme::ColonColon => "'::'",
            Lexeme::ColonGt => "':>'",
            Lexeme::Semicolon => "';'",
            Lexeme::Dot => "'.'",
            Lexeme::Arrow => "'->'",
            Lexeme::ArrowLeft => "'<-'",
            Lexeme::Eq => "'='",
            Lexeme::EqEq => "'=='",
            Lexeme::BangEq => "'!='",
            Lexeme::Lt => "'<'",
            Lexeme::Gt => "'>'",
            Lexeme::LtEq => "'<='",
            Lexeme::GtEq => "'>='",
            Lexeme::Plus => "'+'",
            Lexeme::PlusPlus => "'++'",
            Lexeme::Minus => "'-'",
            Lexeme::Star => "'*'",
            Lexeme::Slash => "'/'",
            Lexeme::Percent => "'%'",
            Lexeme::Bang => "'!'",
            Lexeme::Question => "'?'",
            Lexeme::At => "'@'",
            Lexeme::Hash => "'#'",
            Lexeme::Pipe => "'|'",
            Lexeme::Underscore => "'_'",
            Lexeme::BlockOpen(_) => "code block opener",
            Lexeme::BlockClose => "code block closer '{/--}'",
            Lexeme::Number(_) => "number literal",
            Lexeme::Str(_) => "string literal",
            Lexeme::Template(_) => "template string",
            Lexeme::Ident(_) => "identifier",
            Lexeme::Eof => "end of file",
        }
    }
}
