//! Compiscript frontend
//!
//! The pipeline runs in three phases:
//! 1. Lexing source code into tokens
//! 2. Parsing tokens into an AST
//! 3. Semantic analysis, producing diagnostics and a symbol table

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod sema;

use crate::common::{CompileResult, DiagnosticReporter};
use lexer::Lexer;
use parser::Parser;
use sema::Analysis;
use std::time::Instant;

/// Configuration options passed to the frontend
#[derive(Debug, Clone, Default)]
pub struct FrontendConfig {
    pub dump_tokens: bool,
    pub dump_ast: bool,
    pub verbose: bool,
}

/// Compilation context providing access to diagnostics and file info
pub struct CompileContext<'a> {
    pub filename: String,
    pub file_id: usize,
    pub reporter: &'a DiagnosticReporter,
}

impl<'a> CompileContext<'a> {
    pub fn new(filename: String, file_id: usize, reporter: &'a DiagnosticReporter) -> Self {
        Self { filename, file_id, reporter }
    }
}

/// Lex, parse and analyze one Compiscript source file
pub struct CompiscriptFrontend;

impl CompiscriptFrontend {
    pub fn new() -> Self {
        Self
    }

    /// Run the pipeline; syntax errors are reported and returned as `Err`
    ///
    /// Semantic findings never fail the call. They come back in the
    /// [`Analysis`] for the caller to render.
    pub fn check(&self, source: &str, ctx: &CompileContext, config: &FrontendConfig) -> CompileResult<Analysis> {
        // Phase 1: Lexing (optional token dump)
        if config.dump_tokens {
            let started = Instant::now();
            match Lexer::new(source).tokenize_all() {
                Ok(tokens) => {
                    tracing::info!(
                        target: "pipeline",
                        stage = "lex",
                        file = %ctx.filename,
                        tokens = tokens.len(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "lexed"
                    );
                    eprintln!("=== Tokens ===");
                    for token in &tokens {
                        eprintln!("{:?}", token);
                    }
                    eprintln!("=== End Tokens ===\n");
                }
                Err(e) => {
                    ctx.reporter.report_error(ctx.file_id, &e);
                    return Err(e);
                }
            }
        }

        // Phase 2: Parsing
        if config.verbose {
            eprintln!("Parsing {}...", ctx.filename);
        }
        let started = Instant::now();
        let program = match Parser::new(source).and_then(|mut parser| parser.parse()) {
            Ok(program) => program,
            Err(e) => {
                ctx.reporter.report_error(ctx.file_id, &e);
                return Err(e);
            }
        };
        tracing::info!(
            target: "pipeline",
            stage = "parse",
            file = %ctx.filename,
            statements = program.statements.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "parsed"
        );

        if config.dump_ast {
            eprintln!("=== AST ===");
            eprintln!("{:#?}", program);
            eprintln!("=== End AST ===\n");
        }

        // Phase 3: Semantic analysis
        if config.verbose {
            eprintln!("Analyzing...");
        }
        let started = Instant::now();
        let analysis = sema::analyze(&program);
        tracing::info!(
            target: "pipeline",
            stage = "analysis",
            file = %ctx.filename,
            diagnostics = analysis.diagnostics.len(),
            scopes = analysis.symbols.scopes().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "analyzed"
        );

        Ok(analysis)
    }
}

impl Default for CompiscriptFrontend {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse and analyze `source` without a reporter
pub fn analyze_source(source: &str) -> CompileResult<Analysis> {
    let program = Parser::new(source)?.parse()?;
    Ok(sema::analyze(&program))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::CompileError;

    #[test]
    fn test_check_returns_analysis() {
        let source = "let x: integer = \"a\";";
        let mut reporter = DiagnosticReporter::new();
        let file_id = reporter.add_file("test.cps", source);
        let ctx = CompileContext::new("test.cps".into(), file_id, &reporter);

        let analysis = CompiscriptFrontend::new()
            .check(source, &ctx, &FrontendConfig::default())
            .unwrap();
        assert_eq!(analysis.diagnostics.len(), 1);
    }

    #[test]
    fn test_syntax_error_is_err() {
        let result = analyze_source("let x = ;");
        assert!(matches!(result, Err(CompileError::Parser { .. })));
    }
}
