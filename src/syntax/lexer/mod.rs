
use crate::diagnostic::Diagnostic;
use crate::span::{Span, Spanned};

use super::lexeme::{Lexeme, TemplateChunk};

pub struct Lexer<'src> {
    source: &'src [u8],
    file_id: u16,
    pos: usize,
    /// Exclusive upper bound; shorter than `source` when lexing an interpolation.
    end: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str, file_id: u16) -> Self {
        Self {
            source: source.as_bytes(),
            file_id,
            pos: 0,
            end: source.len(),
            diagnostics: Vec::new(),
        }
    }

    pub fn tokenize(mut self) -> (Vec<Spanned<Lexeme>>, Vec<Diagnostic>) {
        let tokens = self.tokenize_all();
        (tokens, self.diagnostics)
    }

    fn tokenize_all(&mut self) -> Vec<Spanned<Lexeme>> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let is_eof = tok.node == Lexeme::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn next_token(&mut self) -> Spanned<Lexeme> {
        loop {
            self.skip_whitespace_and_comments();

            if self.pos >= self.end {
                return self.make_token(Lexeme::Eof, self.pos, self.pos);
            }

            let start = self.pos;
            let ch = self.source[self.pos];

            if is_ident_start(ch) {
                return self.scan_ident_or_keyword();
            }

            if ch.is_ascii_digit() {
                return self.scan_number();
            }

            if let Some(tok) = self.scan_symbol(start) {
                return tok;
            }
            // scan_symbol returned None → error was recorded, try again
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.pos < self.end && self.source[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }

            // `--` line comments are dropped
            if self.pos + 1 < self.end
                && self.source[self.pos] == b'-'
                && self.source[self.pos + 1] == b'-'
            {
                while self.pos < self.end && self.source[self.pos] != b'\n' {
                    self.pos += 1;
                }
                continue;
            }

            break;
        }
    }

    fn scan_ident_or_keyword(&mut self) -> Spanned<Lexeme> {
        let start = self.pos;
        while self.pos < self.end && is_ident_continue(self.source[self.pos]) {
            self.pos += 1;
        }
        let text = self.text(start, self.pos);
        let token = if text == "_" {
            Lexeme::Underscore
        } else {
            Lexeme::from_keyword(&text).unwrap_or(Lexeme::Ident(text))
        };
        self.make_token(token, start, self.pos)
    }

    fn scan_number(&mut self) -> Spanned<Lexeme> {
        let start = self.pos;
        while self.pos < self.end && self.source[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        // A fraction needs a digit after the dot; `1.foo` is member access.
        if self.peek() == Some(b'.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
            while self.pos < self.end && self.source[self.pos].is_ascii_digit() {
                self.pos += 1;
            }
        }
        let text = self.text(start, self.pos);
        match text.parse::<f64>() {
            Ok(n) if n.is_finite() => self.make_token(Lexeme::Number(n), start, self.pos),
            _ => {
                self.diagnostics.push(
                    Diagnostic::error(
                        format!("number literal '{}' is out of range", text),
                        self.span(start, self.pos),
                    )
                    .with_help("numbers are 64-bit floating point values".to_string()),
                );
                self.make_token(Lexeme::Number(0.0), start, self.pos)
            }
        }
    }

    fn scan_symbol(&mut self, start: usize) -> Option<Spanned<Lexeme>> {
        let ch = self.source[self.pos];
        self.pos += 1;

        let token = match ch {
            b'(' => Lexeme::LParen,
            b')' => Lexeme::RParen,
            b'}' => Lexeme::RBrace,
            b'[' => Lexeme::LBracket,
            b']' => Lexeme::RBracket,
            b',' => Lexeme::Comma,
            b';' => Lexeme::Semicolon,
            b'.' => Lexeme::Dot,
            b'*' => Lexeme::Star,
            b'%' => Lexeme::Percent,
            b'?' => Lexeme::Question,
            b'#' => Lexeme::Hash,
            b'|' => Lexeme::Pipe,
            b'{' => return self.scan_brace(start),
            b'"' => return self.scan_string(start),
            b'`' => return self.scan_template(start),
            b':' => {
                if self.eat_byte(b':') {
                    Lexeme::ColonColon
                } else if self.eat_byte(b'>') {
                    Lexeme::ColonGt
                } else {
                    Lexeme::Colon
                }
            }
            b'-' => {
                if self.eat_byte(b'>') {
                    Lexeme::Arrow
                } else {
                    Lexeme::Minus
                }
            }
            b'=' => {
                if self.eat_byte(b'=') {
                    Lexeme::EqEq
                } else {
                    Lexeme::Eq
                }
            }
            b'!' => {
                if self.eat_byte(b'=') {
                    Lexeme::BangEq
                } else {
                    Lexeme::Bang
                }
            }
            b'<' => {
                if self.peek() == Some(b'/') && self.peek_at(1) == Some(b'>') {
                    self.pos += 2;
                    Lexeme::PipeBidi
                } else if self.eat_byte(b'/') {
                    Lexeme::PipeReverse
                } else if self.eat_byte(b'=') {
                    Lexeme::LtEq
                } else if self.eat_byte(b'-') {
                    Lexeme::ArrowLeft
                } else {
                    Lexeme::Lt
                }
            }
            b'>' => {
                if self.eat_byte(b'=') {
                    Lexeme::GtEq
                } else {
                    Lexeme::Gt
                }
            }
            b'+' => {
                if self.eat_byte(b'+') {
                    Lexeme::PlusPlus
                } else {
                    Lexeme::Plus
                }
            }
            b'/' => {
                if self.starts_with(b">>>") {
                    self.pos += 3;
                    Lexeme::PipeSpread
                } else if self.eat_byte(b'>') {
                    Lexeme::PipeForward
                } else {
                    Lexeme::Slash
                }
            }
            b'@' => {
                if self.eat_byte(b'>') {
                    Lexeme::PipeReactive
                } else {
                    Lexeme::At
                }
            }
            b'\\' => {
                if self.eat_byte(b'>') {
                    Lexeme::PipeParallel
                } else {
                    self.diagnostics.push(
                        Diagnostic::error(
                            "unexpected '\\'".to_string(),
                            self.span(start, self.pos),
                        )
                        .with_help("the parallel pipe is written `\\>`".to_string()),
                    );
                    return None;
                }
            }
            _ => {
                let shown = self.char_at(start);
                self.pos = start + shown.len_utf8();
                self.diagnostics.push(
                    Diagnostic::error(
                        format!("unexpected character '{}' (U+{:04X})", shown, shown as u32),
                        self.span(start, self.pos),
                    )
                    .with_help("this character is not recognized as part of Lea syntax".to_string()),
                );
                return None;
            }
        };

        Some(self.make_token(token, start, self.pos))
    }

    /// `{`, `{-- label --}` or `{/--}`.
    fn scan_brace(&mut self, start: usize) -> Option<Spanned<Lexeme>> {
        if self.starts_with(b"/--}") {
            self.pos += 4;
            return Some(self.make_token(Lexeme::BlockClose, start, self.pos));
        }
        if self.starts_with(b"--}") {
            self.pos += 3;
            return Some(self.make_token(Lexeme::BlockOpen(None), start, self.pos));
        }
        if !self.starts_with(b"--") {
            return Some(self.make_token(Lexeme::LBrace, start, self.pos));
        }
        self.pos += 2;
        let label_start = self.pos;
        while self.pos < self.end && !self.starts_with(b"--}") {
            if self.source[self.pos] == b'\n' {
                break;
            }
            self.pos += 1;
        }
        if !self.starts_with(b"--}") {
            self.diagnostics.push(
                Diagnostic::error(
                    "unterminated code block marker".to_string(),
                    self.span(start, self.pos),
                )
                .with_help("a code block opens with `{-- label --}` on a single line".to_string()),
            );
            return None;
        }
        let label = self.text(label_start, self.pos).trim().to_string();
        self.pos += 3;
        let label = if label.is_empty() { None } else { Some(label) };
        Some(self.make_token(Lexeme::BlockOpen(label), start, self.pos))
    }

    fn scan_string(&mut self, start: usize) -> Option<Spanned<Lexeme>> {
        let mut value = String::new();
        loop {
            if self.pos >= self.end {
                self.diagnostics.push(
                    Diagnostic::error(
                        "unterminated string literal".to_string(),
                        self.span(start, self.pos),
                    )
                    .with_help("close the string with a matching `\"`".to_string()),
                );
                return None;
            }
            match self.source[self.pos] {
                b'"' => {
                    self.pos += 1;
                    break;
                }
                b'\\' => {
                    let c = self.scan_escape(b'"')?;
                    value.push(c);
                }
                _ => {
                    let c = self.char_at(self.pos);
                    self.pos += c.len_utf8();
                    value.push(c);
                }
            }
        }
        Some(self.make_token(Lexeme::Str(value), start, self.pos))
    }

    /// Template strings: text chunks alternate with interpolations, and the
    /// chunk list both starts and ends with text.
    fn scan_template(&mut self, start: usize) -> Option<Spanned<Lexeme>> {
        let mut chunks = Vec::new();
        let mut text = String::new();
        loop {
            if self.pos >= self.end {
                self.diagnostics.push(
                    Diagnostic::error(
                        "unterminated template string".to_string(),
                        self.span(start, self.pos),
                    )
                    .with_help("close the template with a matching '`'".to_string()),
                );
                return None;
            }
            match self.source[self.pos] {
                b'`' => {
                    self.pos += 1;
                    break;
                }
                b'\\' => {
                    let c = self.scan_escape(b'`')?;
                    text.push(c);
                }
                b'$' if self.peek_at(1) == Some(b'{') => {
                    chunks.push(TemplateChunk::Text(std::mem::take(&mut text)));
                    let body_start = self.pos + 2;
                    let body_end = self.find_interp_end(body_start)?;
                    let mut inner = Lexer {
                        source: self.source,
                        file_id: self.file_id,
                        pos: body_start,
                        end: body_end,
                        diagnostics: Vec::new(),
                    };
                    let tokens = inner.tokenize_all();
                    self.diagnostics.append(&mut inner.diagnostics);
                    chunks.push(TemplateChunk::Interp(tokens));
                    self.pos = body_end + 1;
                }
                _ => {
                    let c = self.char_at(self.pos);
                    self.pos += c.len_utf8();
                    text.push(c);
                }
            }
        }
        chunks.push(TemplateChunk::Text(text));
        Some(self.make_token(Lexeme::Template(chunks), start, self.pos))
    }

    /// Find the `}` closing an interpolation body starting at `from`.
    fn find_interp_end(&mut self, from: usize) -> Option<usize> {
        let mut depth = 0u32;
        let mut i = from;
        let mut quote: Option<u8> = None;
        while i < self.end {
            let c = self.source[i];
            if let Some(q) = quote {
                if c == b'\\' {
                    i += 1;
                } else if c == q {
                    quote = None;
                }
            } else {
                match c {
                    b'"' | b'`' => quote = Some(c),
                    b'{' => depth += 1,
                    b'}' if depth == 0 => return Some(i),
                    b'}' => depth -= 1,
                    _ => {}
                }
            }
            i += 1;
        }
        self.diagnostics.push(
            Diagnostic::error(
                "unterminated template interpolation".to_string(),
                self.span(from.saturating_sub(2), self.end),
            )
            .with_help("every `${` needs a matching `}`".to_string()),
        );
        self.pos = self.end;
        None
    }

    /// Consume a backslash escape; `quote` is the delimiter being scanned.
    fn scan_escape(&mut self, quote: u8) -> Option<char> {
        let start = self.pos;
        self.pos += 1;
        let Some(c) = self.peek() else {
            self.diagnostics.push(Diagnostic::error(
                "unterminated escape sequence".to_string(),
                self.span(start, self.pos),
            ));
            return None;
        };
        self.pos += 1;
        let escaped = match c {
            b'n' => '\n',
            b't' => '\t',
            b'r' => '\r',
            b'\\' => '\\',
            b'$' if quote == b'`' => '$',
            _ if c == quote => c as char,
            _ => {
                let shown = self.char_at(self.pos - 1);
                self.pos = self.pos - 1 + shown.len_utf8();
                self.diagnostics.push(
                    Diagnostic::error(
                        format!("unknown escape sequence '\\{}'", shown),
                        self.span(start, self.pos),
                    )
                    .with_help("supported escapes are \\n \\t \\r \\\\ and the quote".to_string()),
                );
                return Some(shown);
            }
        };
        Some(escaped)
    }

    fn peek(&self) -> Option<u8> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        let i = self.pos + offset;
        if i < self.end {
            Some(self.source[i])
        } else {
            None
        }
    }

    fn eat_byte(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn starts_with(&self, pat: &[u8]) -> bool {
        self.pos + pat.len() <= self.end && &self.source[self.pos..self.pos + pat.len()] == pat
    }

    /// The (possibly multi-byte) character starting at byte `i`.
    fn char_at(&self, i: usize) -> char {
        let rest = &self.source[i..self.end];
        let len = rest.len().min(4);
        (1..=len)
            .find_map(|n| std::str::from_utf8(&rest[..n]).ok())
            .and_then(|s| s.chars().next())
            .unwrap_or(char::REPLACEMENT_CHARACTER)
    }

    fn text(&self, start: usize, end: usize) -> String {
        String::from_utf8_lossy(&self.source[start..end]).into_owned()
    }

    fn span(&self, start: usize, end: usize) -> Span {
        Span::new(self.file_id, start as u32, end as u32)
    }

    fn make_token(&self, token: Lexeme, start: usize, end: usize) -> Spanned<Lexeme> {
        Spanned::new(token, self.span(start, end))
    }
}

fn is_ident_start(ch: u8) -> bool {
    ch.is_ascii_alphabetic() || ch == b'_'
}

fn is_ident_continue(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'_'
}
