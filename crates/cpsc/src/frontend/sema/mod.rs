//! Semantic analysis for Compiscript

mod analyzer;
mod class;
mod control;
mod decl;
mod diagnostics;
mod expr;
mod function;
mod scope;
mod symbol;
mod table;
mod types;

pub use analyzer::{analyze, Analysis, Analyzer};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use scope::{Scope, ScopeError, ScopeId, ScopeKind, ScopeTree};
pub use symbol::{ClassInfo, FunctionInfo, Symbol, SymbolKind, SymbolMap};
pub use table::SymbolTable;
pub use types::Type;

#[cfg(test)]
mod test_support {
    use super::{analyze, Analysis, DiagnosticKind};
    use crate::frontend::parser::Parser;

    pub fn analyze_src(source: &str) -> Analysis {
        let program = Parser::new(source).unwrap().parse().unwrap();
        analyze(&program)
    }

    pub fn messages_of(analysis: &Analysis) -> Vec<&str> {
        analysis.messages()
    }

    pub fn kinds_of(analysis: &Analysis) -> Vec<DiagnosticKind> {
        analysis.diagnostics.iter().map(|d| d.kind).collect()
    }
}
