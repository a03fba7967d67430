//! Lexing, parsing and formatting of Lea source text.

pub mod format;
pub mod lexeme;
pub mod lexer;
pub mod parser;
pub mod precedence;
