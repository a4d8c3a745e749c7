//! Semantic diagnostics

use crate::common::{Position, Span};
use std::fmt;

/// Category of a semantic diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    DuplicateDeclaration,
    ConstantNotInitialized,
    UndeclaredIdentifier,
    TypeMismatch,
    InvalidOperandType,
    DivisionByZero,
    NotOrderable,
    NotCallable,
    UnknownFunction,
    ArityMismatch,
    InvalidControlFlow,
    ConditionNotBoolean,
    CaseTypeMismatch,
    NotIterable,
    ClassError,
    AssignToConstant,
    ThisOutsideClass,
    ReturnOutsideFunction,
    UnknownCapturedVariable,
    ConstructorRestriction,
}

impl DiagnosticKind {
    /// Stable code shown next to rendered diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            DiagnosticKind::DuplicateDeclaration => "S001",
            DiagnosticKind::ConstantNotInitialized => "S002",
            DiagnosticKind::UndeclaredIdentifier => "S003",
            DiagnosticKind::TypeMismatch => "S004",
            DiagnosticKind::InvalidOperandType => "S005",
            DiagnosticKind::DivisionByZero => "S006",
            DiagnosticKind::NotOrderable => "S007",
            DiagnosticKind::NotCallable => "S008",
            DiagnosticKind::UnknownFunction => "S009",
            DiagnosticKind::ArityMismatch => "S010",
            DiagnosticKind::InvalidControlFlow => "S011",
            DiagnosticKind::ConditionNotBoolean => "S012",
            DiagnosticKind::CaseTypeMismatch => "S013",
            DiagnosticKind::NotIterable => "S014",
            DiagnosticKind::ClassError => "S015",
            DiagnosticKind::AssignToConstant => "S016",
            DiagnosticKind::ThisOutsideClass => "S017",
            DiagnosticKind::ReturnOutsideFunction => "S018",
            DiagnosticKind::UnknownCapturedVariable => "S019",
            DiagnosticKind::ConstructorRestriction => "S020",
        }
    }

    /// Short label for the primary source annotation
    pub fn label(&self) -> &'static str {
        match self {
            DiagnosticKind::DuplicateDeclaration => "declaración duplicada",
            DiagnosticKind::ConstantNotInitialized => "constante sin inicializar",
            DiagnosticKind::UndeclaredIdentifier => "identificador no declarado",
            DiagnosticKind::TypeMismatch => "tipos incompatibles",
            DiagnosticKind::InvalidOperandType => "operando inválido",
            DiagnosticKind::DivisionByZero => "división por cero",
            DiagnosticKind::NotOrderable => "tipo no ordenable",
            DiagnosticKind::NotCallable => "no invocable",
            DiagnosticKind::UnknownFunction => "función desconocida",
            DiagnosticKind::ArityMismatch => "número de argumentos incorrecto",
            DiagnosticKind::InvalidControlFlow => "control de flujo inválido",
            DiagnosticKind::ConditionNotBoolean => "condición no booleana",
            DiagnosticKind::CaseTypeMismatch => "tipo de case incompatible",
            DiagnosticKind::NotIterable => "no iterable",
            DiagnosticKind::ClassError => "error de clase",
            DiagnosticKind::AssignToConstant => "asignación a constante",
            DiagnosticKind::ThisOutsideClass => "'this' fuera de clase",
            DiagnosticKind::ReturnOutsideFunction => "return fuera de función",
            DiagnosticKind::UnknownCapturedVariable => "captura desconocida",
            DiagnosticKind::ConstructorRestriction => "constructor inválido",
        }
    }
}

/// A reported semantic violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub line: u32,
    pub column: u32,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            message: message.into(),
            line: span.line,
            column: span.column,
            span,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[ERROR SEMÁNTICO] {} (línea {}, columna {})",
            self.message, self.line, self.column
        )
    }
}

/// Append-only list of diagnostics in emission order
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::debug!(
            target: "sema",
            code = diagnostic.kind.code(),
            line = diagnostic.line,
            column = diagnostic.column,
            message = %diagnostic.message,
            "diagnostic"
        );
        self.entries.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_line_format() {
        let span = Span::new(0, 5).with_position(Position::new(3, 7));
        let diagnostic = Diagnostic::new(
            DiagnosticKind::InvalidControlFlow,
            "'break' fuera de un ciclo o switch",
            span,
        );
        assert_eq!(
            diagnostic.to_string(),
            "[ERROR SEMÁNTICO] 'break' fuera de un ciclo o switch (línea 3, columna 7)"
        );
    }

    #[test]
    fn test_collector_keeps_emission_order() {
        let mut diagnostics = Diagnostics::new();
        let late = Span::new(20, 21).with_position(Position::new(5, 0));
        let early = Span::new(0, 1).with_position(Position::new(1, 0));
        diagnostics.push(Diagnostic::new(DiagnosticKind::TypeMismatch, "b", late));
        diagnostics.push(Diagnostic::new(DiagnosticKind::TypeMismatch, "a", early));

        let messages: Vec<&str> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["b", "a"]);
    }
}
