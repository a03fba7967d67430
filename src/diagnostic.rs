use thiserror::Error;

use crate::span::Span;

/// A front-end diagnostic (error or warning) anchored to a source span.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Span,
    pub notes: Vec<String>,
    pub help: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Diagnostic {
    pub fn error(message: String, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            message,
            span,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn warning(message: String, span: Span) -> Self {
        Self {
            severity: Severity::Warning,
            message,
            span,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    fn report<'a>(
        &self,
        filename: &'a str,
        colored: bool,
    ) -> ariadne::Report<'static, (&'a str, std::ops::Range<usize>)> {
        use ariadne::{Color, Config, Label, Report, ReportKind};

        let kind = match self.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
        };

        let color = match self.severity {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
        };

        let mut report = Report::build(kind, filename, self.span.start as usize)
            .with_config(Config::default().with_color(colored))
            .with_message(&self.message)
            .with_label(
                Label::new((filename, self.span.range()))
                    .with_message(&self.message)
                    .with_color(color),
            );

        for note in &self.notes {
            report = report.with_note(note);
        }

        if let Some(help) = &self.help {
            report = report.with_help(help);
        }

        report.finish()
    }

    /// Render the diagnostic to stderr using ariadne.
    pub fn render(&self, filename: &str, source: &str) {
        use ariadne::Source;

        if let Err(e) = self
            .report(filename, true)
            .eprint((filename, Source::from(source)))
        {
            tracing::warn!("cannot render diagnostic for {}: {}", filename, e);
        }
    }
}

/// Render a list of diagnostics.
pub fn render_diagnostics(diagnostics: &[Diagnostic], filename: &str, source: &str) {
    for diag in diagnostics {
        diag.render(filename, source);
    }
}

/// Failure to turn source text into a syntax tree.
#[derive(Clone, Debug, Error)]
pub enum SyntaxError {
    /// One or more malformed tokens (e.g. an unterminated string).
    #[error("lexer error: {}", first_message(.0))]
    Lex(Vec<Diagnostic>),

    /// The token sequence does not match the grammar at some position.
    #[error("parse error: {}", .0.message)]
    Parse(Diagnostic),
}

impl SyntaxError {
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            SyntaxError::Lex(diags) => diags,
            SyntaxError::Parse(diag) => std::slice::from_ref(diag),
        }
    }

    /// Render every diagnostic of this error to stderr.
    pub fn render(&self, filename: &str, source: &str) {
        render_diagnostics(self.diagnostics(), filename, source);
    }
}

fn first_message(diags: &[Diagnostic]) -> &str {
    diags.first().map_or("unknown error", |d| d.message.as_str())
}
