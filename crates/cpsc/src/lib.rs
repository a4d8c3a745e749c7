//! Compiscript checker - semantic analysis for the Compiscript language
//!
//! ## Architecture
//!
//! The crate is organized into:
//! - **Frontend** (`frontend/`): lexer, AST, parser and the semantic analyzer
//! - **Common** (`common/`): shared infrastructure (errors, spans, reporting)
//! - **Logging** (`logging`): tracing subscriber configuration
//!
//! The analyzer never stops at the first problem. It returns every semantic
//! diagnostic in emission order together with the populated symbol table.

pub mod common;
pub mod frontend;
pub mod logging;

// Re-exports for convenience
pub use common::{CompileError, CompileResult, DiagnosticReporter, Span};
pub use frontend::sema::{analyze, Analysis, Diagnostic, DiagnosticKind, SymbolTable, Type};
pub use frontend::{analyze_source, CompileContext, CompiscriptFrontend, FrontendConfig};
