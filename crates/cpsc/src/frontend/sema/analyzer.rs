//! Semantic analyzer - walks the program and dispatches to the checks
//!
//! The checks themselves live in sibling modules as further `impl Analyzer`
//! blocks: declarations in `decl`, expressions in `expr`, classes in `class`,
//! functions and calls in `function`, and loops/branches in `control`.

use super::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use super::scope::{ScopeId, ScopeKind, ScopeTree};
use super::symbol::Symbol;
use super::table::SymbolTable;
use super::types::Type;
use crate::common::Span;
use crate::frontend::ast::*;
use std::collections::HashSet;

/// Result of analyzing one program
#[derive(Debug)]
pub struct Analysis {
    pub symbols: SymbolTable,
    pub diagnostics: Vec<Diagnostic>,
}

impl Analysis {
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn messages(&self) -> Vec<&str> {
        self.diagnostics.iter().map(|d| d.message.as_str()).collect()
    }
}

/// Function whose body is being visited
#[derive(Debug, Clone)]
pub(super) struct FunctionContext {
    pub name: String,
    pub return_type: Type,
}

/// Where the walk currently is
#[derive(Debug, Clone)]
pub(super) struct Context {
    pub scope: ScopeId,
    /// Class whose members or method bodies are being visited
    pub class: Option<String>,
    pub function: Option<FunctionContext>,
    pub loop_depth: usize,
    pub switch_depth: usize,
}

/// Semantic analyzer for Compiscript programs
pub struct Analyzer {
    pub(super) scopes: ScopeTree,
    pub(super) diagnostics: Diagnostics,
    pub(super) ctx: Context,
    /// Identifier offsets already reported by the capture pre-pass
    pub(super) reported_captures: HashSet<usize>,
}

impl Analyzer {
    pub fn new() -> Self {
        let scopes = ScopeTree::new();
        let root = scopes.root();
        Self {
            scopes,
            diagnostics: Diagnostics::new(),
            ctx: Context {
                scope: root,
                class: None,
                function: None,
                loop_depth: 0,
                switch_depth: 0,
            },
            reported_captures: HashSet::new(),
        }
    }

    /// Analyze a whole program
    pub fn analyze(mut self, program: &Program) -> Analysis {
        tracing::debug!(
            target: "sema",
            statements = program.statements.len(),
            "analysis start"
        );

        self.visit_statements(&program.statements);

        tracing::debug!(
            target: "sema",
            scopes = self.scopes.len(),
            diagnostics = self.diagnostics.len(),
            "analysis done"
        );

        Analysis {
            symbols: SymbolTable::new(self.scopes),
            diagnostics: self.diagnostics.into_vec(),
        }
    }

    // =========================================================================
    // Shared helpers
    // =========================================================================

    pub(super) fn report(&mut self, kind: DiagnosticKind, message: impl Into<String>, span: Span) {
        self.diagnostics.push(Diagnostic::new(kind, message, span));
    }

    /// Declare in the active scope; false if the name is already taken there
    pub(super) fn declare(&mut self, symbol: Symbol) -> bool {
        tracing::trace!(
            target: "sema",
            scope = self.ctx.scope.index(),
            name = %symbol.name,
            kind = symbol.kind_name(),
            ty = %symbol.ty,
            "declare"
        );
        self.scopes.declare(self.ctx.scope, symbol).is_ok()
    }

    /// Run `f` inside a fresh child of the active scope
    pub(super) fn in_scope<R>(&mut self, kind: ScopeKind, f: impl FnOnce(&mut Self) -> R) -> R {
        let parent = self.ctx.scope;
        let child = self.scopes.enter(parent, kind);
        tracing::trace!(
            target: "sema",
            scope = child.index(),
            parent = parent.index(),
            kind = %self.scopes.get(child).kind,
            "enter scope"
        );
        self.ctx.scope = child;

        let result = f(self);

        self.ctx.scope = self.scopes.exit(child);
        tracing::trace!(target: "sema", scope = child.index(), "exit scope");
        result
    }

    /// Run `f` with the loop counter raised
    pub(super) fn in_loop<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.ctx.loop_depth += 1;
        let result = f(self);
        self.ctx.loop_depth -= 1;
        result
    }

    /// Run `f` with the switch counter raised
    pub(super) fn in_switch<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.ctx.switch_depth += 1;
        let result = f(self);
        self.ctx.switch_depth -= 1;
        result
    }

    // =========================================================================
    // Statements
    // =========================================================================

    pub(super) fn visit_statements(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            self.visit_stmt(stmt);
        }
    }

    pub(super) fn visit_block(&mut self, block: &Block, kind: ScopeKind) {
        self.in_scope(kind, |this| this.visit_statements(&block.statements));
    }

    pub(super) fn visit_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::VarDecl(decl) => self.declare_variable(decl, DeclTarget::Scope),
            StmtKind::ConstDecl(decl) => self.declare_constant(decl, DeclTarget::Scope),
            StmtKind::Assign { target, value } => self.check_assignment(target, value),
            StmtKind::Expr(expr) | StmtKind::Print(expr) => {
                self.eval_expr(expr);
            }
            StmtKind::Block(block) => self.visit_block(block, ScopeKind::Block),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => self.check_if(condition, then_branch, else_branch.as_ref()),
            StmtKind::While { condition, body } => self.check_while(condition, body),
            StmtKind::DoWhile { body, condition } => self.check_do_while(body, condition),
            StmtKind::For {
                init,
                condition,
                update,
                body,
            } => self.check_for(init.as_deref(), condition.as_ref(), update.as_deref(), body),
            StmtKind::Foreach {
                binding,
                iterable,
                body,
            } => self.check_foreach(binding, iterable, body, stmt.span),
            StmtKind::Switch {
                discriminant,
                cases,
                default,
            } => self.check_switch(discriminant, cases, default.as_deref()),
            StmtKind::TryCatch {
                try_block,
                catch_name,
                catch_block,
            } => self.check_try_catch(try_block, catch_name, catch_block, stmt.span),
            StmtKind::Break => self.check_break(stmt.span),
            StmtKind::Continue => self.check_continue(stmt.span),
            StmtKind::Return(value) => self.check_return(value.as_ref(), stmt.span),
            StmtKind::Function(decl) => self.declare_function(decl),
            StmtKind::Class(decl) => self.declare_class(decl),
        }
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a declaration registers its symbol
#[derive(Debug, Clone, Copy)]
pub(super) enum DeclTarget<'a> {
    /// The active lexical scope
    Scope,
    /// The member map of the named class
    Member(&'a str),
}

/// Analyze `program` with a fresh analyzer
pub fn analyze(program: &Program) -> Analysis {
    Analyzer::new().analyze(program)
}
