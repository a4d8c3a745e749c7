//! Error types and diagnostic reporting

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, NoColor, StandardStream, WriteColor};
use thiserror::Error;
use super::Span;
use crate::frontend::sema::Diagnostic as SemanticDiagnostic;

/// Failure that stops the pipeline before or after analysis
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("Lexer error at {}: {message}", span.position())]
    Lexer { message: String, span: Span },

    #[error("Parser error at {}: {message}", span.position())]
    Parser { message: String, span: Span },

    #[error("semantic analysis reported {count} error(s)")]
    Semantic { count: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    pub fn lexer(message: impl Into<String>, span: Span) -> Self {
        Self::Lexer {
            message: message.into(),
            span,
        }
    }

    pub fn parser(message: impl Into<String>, span: Span) -> Self {
        Self::Parser {
            message: message.into(),
            span,
        }
    }

    pub fn semantic(count: usize) -> Self {
        Self::Semantic { count }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;

/// Diagnostic reporter for pretty error output
pub struct DiagnosticReporter {
    files: SimpleFiles<String, String>,
    writer: StandardStream,
    config: term::Config,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self {
            files: SimpleFiles::new(),
            writer: StandardStream::stderr(ColorChoice::Auto),
            config: term::Config::default(),
        }
    }

    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) -> usize {
        self.files.add(name.into(), source.into())
    }

    pub fn report_error(&self, file_id: usize, error: &CompileError) {
        let diagnostic = Self::error_diagnostic(file_id, error);
        self.emit(&mut self.writer.lock(), &diagnostic);
    }

    pub fn report_semantic(&self, file_id: usize, diagnostic: &SemanticDiagnostic) {
        let diagnostic = Self::semantic_diagnostic(file_id, diagnostic);
        self.emit(&mut self.writer.lock(), &diagnostic);
    }

    /// Render semantic diagnostics without colors
    pub fn render_semantic(&self, file_id: usize, diagnostics: &[SemanticDiagnostic]) -> String {
        let mut buffer = NoColor::new(Vec::new());
        for diagnostic in diagnostics {
            self.emit(&mut buffer, &Self::semantic_diagnostic(file_id, diagnostic));
        }
        String::from_utf8_lossy(&buffer.into_inner()).into_owned()
    }

    fn emit(&self, writer: &mut dyn WriteColor, diagnostic: &Diagnostic<usize>) {
        if let Err(err) = term::emit(writer, &self.config, &self.files, diagnostic) {
            tracing::warn!(target: "report", error = %err, "failed to render diagnostic");
        }
    }

    fn error_diagnostic(file_id: usize, error: &CompileError) -> Diagnostic<usize> {
        match error {
            CompileError::Lexer { message, span } => Diagnostic::error()
                .with_message("Lexer error")
                .with_labels(vec![
                    Label::primary(file_id, span.start..span.end).with_message(message)
                ]),

            CompileError::Parser { message, span } => Diagnostic::error()
                .with_message("Syntax error")
                .with_labels(vec![
                    Label::primary(file_id, span.start..span.end).with_message(message)
                ]),

            CompileError::Semantic { count } => Diagnostic::error()
                .with_message(format!("analysis failed with {count} semantic error(s)")),

            CompileError::Io(err) => {
                Diagnostic::error().with_message(format!("IO error: {err}"))
            }
        }
    }

    fn semantic_diagnostic(file_id: usize, diagnostic: &SemanticDiagnostic) -> Diagnostic<usize> {
        let span = diagnostic.span;
        Diagnostic::error()
            .with_message(diagnostic.message.clone())
            .with_code(diagnostic.kind.code())
            .with_labels(vec![
                Label::primary(file_id, span.start..span.end).with_message(diagnostic.kind.label())
            ])
    }
}

impl Default for DiagnosticReporter {
    fn default() -> Self {
        Self::new()
    }
}
