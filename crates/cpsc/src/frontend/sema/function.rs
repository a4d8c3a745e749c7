//! Function declarations, call sites, returns and captures

use super::analyzer::{Analyzer, FunctionContext};
use super::diagnostics::DiagnosticKind;
use super::scope::{ScopeId, ScopeKind, ScopeTree};
use super::symbol::{FunctionInfo, Symbol, SymbolKind};
use super::types::Type;
use crate::common::Span;
use crate::frontend::ast::*;
use std::collections::{BTreeSet, HashSet};

/// What is being invoked, for argument diagnostics
#[derive(Debug, Clone, Copy)]
pub(super) enum Callee<'a> {
    Function(&'a str),
    Method(&'a str),
    Constructor(&'a str),
}

impl Callee<'_> {
    fn arity_message(self, expected: usize, found: usize) -> String {
        let subject = match self {
            Callee::Function(name) => format!("Función '{name}'"),
            Callee::Method(name) => format!("Método '{name}'"),
            Callee::Constructor(class) => format!("Constructor de '{class}'"),
        };
        format!("{subject} espera {expected} argumentos, pero recibe {found}")
    }

    fn argument_message(self, position: usize, expected: &Type, found: &Type) -> String {
        match self {
            Callee::Function(name) => {
                format!("Argumento {position} en función '{name}': esperado {expected}, encontrado {found}")
            }
            Callee::Method(name) => {
                format!("Argumento {position} en método '{name}': esperado {expected}, encontrado {found}")
            }
            Callee::Constructor(class) => {
                format!("Argumento {position} en constructor de '{class}': esperado: {expected}, encontrado: {found}")
            }
        }
    }
}

impl Analyzer {
    // =========================================================================
    // Declarations
    // =========================================================================

    /// Parameters as initialized variables, and the return type (`void` when absent)
    pub(super) fn function_signature(decl: &FunctionDecl) -> (Vec<Symbol>, Type) {
        let params = decl
            .params
            .iter()
            .map(|param| {
                let ty = param.ty.as_ref().map_or(Type::Unknown, Type::from_annotation);
                Symbol::variable(&param.name, ty, param.span).with_initialized(true)
            })
            .collect();
        let return_type = decl.return_type.as_ref().map_or(Type::Void, Type::from_annotation);
        (params, return_type)
    }

    pub(super) fn declare_function(&mut self, decl: &FunctionDecl) {
        if self.scopes.exists_local(self.ctx.scope, &decl.name) {
            self.report(
                DiagnosticKind::DuplicateDeclaration,
                format!("Función '{}' ya fue declarada en este ámbito", decl.name),
                decl.span,
            );
            return;
        }

        let (params, return_type) = Self::function_signature(decl);
        let enclosing_function = self.ctx.function.as_ref().map(|function| function.name.clone());
        let nested = enclosing_function.is_some();
        let info = FunctionInfo {
            params: params.clone(),
            return_type: return_type.clone(),
            nested,
            enclosing_function,
            captured: BTreeSet::new(),
            is_constructor: false,
        };

        // Registered before the body so the function can call itself
        let declaring_scope = self.ctx.scope;
        self.declare(Symbol::function(&decl.name, info, decl.span));
        self.analyze_body(decl, params, return_type, nested.then_some(declaring_scope));
    }

    /// Visit a function or method body in its own scope
    ///
    /// `capture_scope` is the scope holding the symbol of a nested function,
    /// whose captured set is filled before the body is visited.
    pub(super) fn analyze_body(
        &mut self,
        decl: &FunctionDecl,
        params: Vec<Symbol>,
        return_type: Type,
        capture_scope: Option<ScopeId>,
    ) {
        let outer_function = self.ctx.function.replace(FunctionContext {
            name: decl.name.clone(),
            return_type,
        });
        // Loops around a declaration do not make `break` legal inside its body
        let outer_loops = std::mem::take(&mut self.ctx.loop_depth);
        let outer_switches = std::mem::take(&mut self.ctx.switch_depth);

        self.in_scope(ScopeKind::Function(decl.name.clone()), |this| {
            for param in params {
                let (name, span) = (param.name.clone(), param.span);
                if !this.declare(param) {
                    this.report(
                        DiagnosticKind::DuplicateDeclaration,
                        format!("Parámetro '{name}' duplicado en la función '{}'", decl.name),
                        span,
                    );
                }
            }

            if let Some(declaring_scope) = capture_scope {
                let captured = this.collect_captures(&decl.body);
                tracing::trace!(
                    target: "sema",
                    function = %decl.name,
                    captured = ?captured,
                    "captures"
                );
                if let Some(info) = this
                    .scopes
                    .lookup_local_mut(declaring_scope, &decl.name)
                    .and_then(Symbol::as_function_mut)
                {
                    info.captured = captured;
                }
            }

            this.visit_statements(&decl.body.statements);
        });

        self.ctx.loop_depth = outer_loops;
        self.ctx.switch_depth = outer_switches;
        self.ctx.function = outer_function;
    }

    /// Free variables of a nested body; unresolvable names are reported here once
    fn collect_captures(&mut self, body: &Block) -> BTreeSet<String> {
        let mut collector = CaptureCollector::new(&self.scopes, self.ctx.scope);
        collector.statements(&body.statements);
        let CaptureCollector { captured, unknown, .. } = collector;

        for (name, span) in unknown {
            // Class members referenced bare are reported by the main walk
            if self.reported_captures.contains(&span.start) || self.owner_of_member(&name).is_some() {
                continue;
            }
            self.reported_captures.insert(span.start);
            self.report(
                DiagnosticKind::UnknownCapturedVariable,
                format!("Variable capturada '{name}' no existe en ámbitos externos"),
                span,
            );
        }
        captured
    }

    // =========================================================================
    // Returns
    // =========================================================================

    pub(super) fn check_return(&mut self, value: Option<&Expr>, span: Span) {
        let actual = value.map_or(Type::Void, |expr| self.eval_expr(expr));

        let Some(expected) = self.ctx.function.as_ref().map(|function| function.return_type.clone()) else {
            self.report(
                DiagnosticKind::ReturnOutsideFunction,
                "return fuera de una función",
                span,
            );
            return;
        };

        if !expected.accepts(&actual) {
            let message = format!("Tipo de retorno incorrecto: esperado {expected}, encontrado {actual}");
            self.report(DiagnosticKind::TypeMismatch, message, value.map_or(span, |expr| expr.span));
        }
    }

    // =========================================================================
    // Calls
    // =========================================================================

    pub(super) fn eval_call(&mut self, callee: &Expr, args: &[Expr], span: Span) -> Type {
        match &callee.kind {
            ExprKind::Identifier(name) => self.call_function(name, args, span),
            ExprKind::Property { object, name } => self.call_method(object, name, args, span),
            _ => {
                let callee_ty = self.eval_expr(callee);
                self.eval_arguments(args);
                if !callee_ty.is_unknown() {
                    self.report(DiagnosticKind::NotCallable, "La expresión no es invocable", callee.span);
                }
                Type::Error
            }
        }
    }

    fn eval_arguments(&mut self, args: &[Expr]) -> Vec<Type> {
        args.iter().map(|arg| self.eval_expr(arg)).collect()
    }

    fn call_function(&mut self, name: &str, args: &[Expr], span: Span) -> Type {
        let arg_types = self.eval_arguments(args);
        let resolved = self.scopes.resolve(self.ctx.scope, name).map(|symbol| match &symbol.kind {
            SymbolKind::Function(info) => Some((info.params.clone(), info.return_type.clone())),
            _ => None,
        });

        match resolved {
            Some(Some((params, return_type))) => {
                self.check_arguments(Callee::Function(name), &params, args, &arg_types, span);
                return_type
            }
            Some(None) => {
                self.report(DiagnosticKind::NotCallable, format!("'{name}' no es una función"), span);
                Type::Error
            }
            None => {
                match self.owner_of_member(name) {
                    Some(owner) => self.report(
                        DiagnosticKind::ClassError,
                        format!("Método '{name}' no se puede llamar sin su clase '{owner}'"),
                        span,
                    ),
                    None => self.report(
                        DiagnosticKind::UnknownFunction,
                        format!("Función '{name}' no declarada"),
                        span,
                    ),
                }
                Type::Error
            }
        }
    }

    fn call_method(&mut self, object: &Expr, name: &str, args: &[Expr], span: Span) -> Type {
        let object_ty = self.eval_expr(object);
        let arg_types = self.eval_arguments(args);
        if object_ty.is_unknown() {
            return Type::Unknown;
        }
        let Some(class) = self.expect_class(&object_ty, object.span) else {
            return Type::Error;
        };

        let Some(found) = self.find_member(class, name) else {
            self.report(
                DiagnosticKind::ClassError,
                format!("Método '{name}' no existe en la clase '{class}'"),
                span,
            );
            return Type::Error;
        };
        let Some(info) = found.symbol.as_function() else {
            self.report(
                DiagnosticKind::NotCallable,
                format!("'{name}' no es un método de la clase '{class}'"),
                span,
            );
            return Type::Error;
        };

        self.check_arguments(Callee::Method(name), &info.params, args, &arg_types, span);
        info.return_type.clone()
    }

    /// Arity first; argument types are only compared when the counts agree
    pub(super) fn check_arguments(
        &mut self,
        callee: Callee<'_>,
        params: &[Symbol],
        args: &[Expr],
        arg_types: &[Type],
        span: Span,
    ) {
        if params.len() != args.len() {
            self.report(
                DiagnosticKind::ArityMismatch,
                callee.arity_message(params.len(), args.len()),
                span,
            );
            return;
        }

        for (position, ((param, arg), actual)) in params.iter().zip(args).zip(arg_types).enumerate() {
            if !param.ty.accepts(actual) {
                self.report(
                    DiagnosticKind::TypeMismatch,
                    callee.argument_message(position + 1, &param.ty, actual),
                    arg.span,
                );
            }
        }
    }
}

/// Pre-pass over a nested function body collecting free variables
///
/// Names are bound by the function's own scope (its parameters) and by the
/// declarations met so far in the body. Anything else must resolve from an
/// enclosing scope.
struct CaptureCollector<'a> {
    scopes: &'a ScopeTree,
    scope: ScopeId,
    frames: Vec<HashSet<String>>,
    captured: BTreeSet<String>,
    unknown: Vec<(String, Span)>,
}

impl<'a> CaptureCollector<'a> {
    fn new(scopes: &'a ScopeTree, scope: ScopeId) -> Self {
        Self {
            scopes,
            scope,
            frames: vec![HashSet::new()],
            captured: BTreeSet::new(),
            unknown: Vec::new(),
        }
    }

    fn is_bound(&self, name: &str) -> bool {
        self.frames.iter().any(|frame| frame.contains(name)) || self.scopes.exists_local(self.scope, name)
    }

    fn bind(&mut self, name: &str) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_string());
        }
    }

    fn reference(&mut self, name: &str, span: Span) {
        if self.is_bound(name) {
            return;
        }
        match self.scopes.resolve(self.scope, name) {
            Some(symbol) => {
                if matches!(symbol.kind, SymbolKind::Variable | SymbolKind::Constant) {
                    self.captured.insert(name.to_string());
                }
            }
            None => self.unknown.push((name.to_string(), span)),
        }
    }

    fn in_frame(&mut self, f: impl FnOnce(&mut Self)) {
        self.frames.push(HashSet::new());
        f(self);
        self.frames.pop();
    }

    fn statements(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            self.statement(stmt);
        }
    }

    fn block(&mut self, block: &Block) {
        self.in_frame(|this| this.statements(&block.statements));
    }

    fn statement(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::VarDecl(decl) => {
                self.optional(decl.init.as_ref());
                self.bind(&decl.name);
            }
            StmtKind::ConstDecl(decl) => {
                self.optional(decl.init.as_ref());
                self.bind(&decl.name);
            }
            StmtKind::Assign { target, value } => {
                match target {
                    AssignTarget::Variable { name, span } => self.reference(name, *span),
                    AssignTarget::Member { object, .. } => self.expr(object),
                }
                self.expr(value);
            }
            StmtKind::Expr(expr) | StmtKind::Print(expr) => self.expr(expr),
            StmtKind::Block(block) => self.block(block),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.expr(condition);
                self.block(then_branch);
                if let Some(else_branch) = else_branch {
                    self.block(else_branch);
                }
            }
            StmtKind::While { condition, body } => {
                self.expr(condition);
                self.block(body);
            }
            StmtKind::DoWhile { body, condition } => {
                self.block(body);
                self.expr(condition);
            }
            StmtKind::For {
                init,
                condition,
                update,
                body,
            } => self.in_frame(|this| {
                if let Some(init) = init {
                    this.statement(init);
                }
                this.optional(condition.as_ref());
                if let Some(update) = update {
                    this.statement(update);
                }
                this.statements(&body.statements);
            }),
            StmtKind::Foreach {
                binding,
                iterable,
                body,
            } => {
                self.expr(iterable);
                self.in_frame(|this| {
                    this.bind(binding);
                    this.statements(&body.statements);
                });
            }
            StmtKind::Switch {
                discriminant,
                cases,
                default,
            } => {
                self.expr(discriminant);
                for case in cases {
                    self.expr(&case.value);
                    self.in_frame(|this| this.statements(&case.body));
                }
                if let Some(default) = default {
                    self.in_frame(|this| this.statements(default));
                }
            }
            StmtKind::TryCatch {
                try_block,
                catch_name,
                catch_block,
            } => {
                self.block(try_block);
                self.in_frame(|this| {
                    this.bind(catch_name);
                    this.statements(&catch_block.statements);
                });
            }
            StmtKind::Break | StmtKind::Continue => {}
            StmtKind::Return(value) => self.optional(value.as_ref()),
            StmtKind::Function(decl) => {
                self.bind(&decl.name);
                self.in_frame(|this| {
                    for param in &decl.params {
                        this.bind(&param.name);
                    }
                    this.statements(&decl.body.statements);
                });
            }
            // Method bodies get their own analysis
            StmtKind::Class(decl) => self.bind(&decl.name),
        }
    }

    fn optional(&mut self, expr: Option<&Expr>) {
        if let Some(expr) = expr {
            self.expr(expr);
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::IntLiteral(_)
            | ExprKind::StringLiteral(_)
            | ExprKind::BoolLiteral(_)
            | ExprKind::Null
            | ExprKind::This => {}
            ExprKind::Identifier(name) => self.reference(name, expr.span),
            ExprKind::Array(elements) => elements.iter().for_each(|element| self.expr(element)),
            ExprKind::Index { object, index } => {
                self.expr(object);
                self.expr(index);
            }
            ExprKind::Property { object, .. } => self.expr(object),
            ExprKind::Call { callee, args } => {
                // Callee names are resolved as functions by the call check
                if !matches!(callee.kind, ExprKind::Identifier(_)) {
                    self.expr(callee);
                }
                args.iter().for_each(|arg| self.expr(arg));
            }
            ExprKind::New { args, .. } => args.iter().for_each(|arg| self.expr(arg)),
            ExprKind::Unary { operand, .. } => self.expr(operand),
            ExprKind::Binary { left, right, .. } => {
                self.expr(left);
                self.expr(right);
            }
            ExprKind::Ternary {
                condition,
                then_expr,
                else_expr,
            } => {
                self.expr(condition);
                self.expr(then_expr);
                self.expr(else_expr);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{analyze_src, kinds_of, messages_of};
    use super::super::{DiagnosticKind, Type};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_recursive_function_is_clean() {
        let analysis = analyze_src(
            "function factorial(n: integer): integer { if (n <= 1) return 1; return n * factorial(n - 1); }",
        );
        assert_eq!(messages_of(&analysis), Vec::<&str>::new());

        let factorial = analysis.symbols.lookup("factorial").and_then(|s| s.as_function());
        assert_eq!(factorial.map(|f| f.params.len()), Some(1));
        assert_eq!(factorial.map(|f| &f.return_type), Some(&Type::Integer));
    }

    #[test]
    fn test_arity_and_argument_types() {
        let analysis = analyze_src(
            "function f(n: integer): integer { return n; } let y = f(1, 2); let z = f(\"a\");",
        );
        assert_eq!(
            messages_of(&analysis),
            vec![
                "Función 'f' espera 1 argumentos, pero recibe 2",
                "Argumento 1 en función 'f': esperado integer, encontrado string",
            ]
        );
        assert_eq!(
            kinds_of(&analysis),
            vec![DiagnosticKind::ArityMismatch, DiagnosticKind::TypeMismatch]
        );
    }

    #[test]
    fn test_unknown_and_not_callable() {
        let analysis = analyze_src("let x = 1; x(); g();");
        assert_eq!(
            messages_of(&analysis),
            vec!["'x' no es una función", "Función 'g' no declarada"]
        );
        assert_eq!(
            kinds_of(&analysis),
            vec![DiagnosticKind::NotCallable, DiagnosticKind::UnknownFunction]
        );
    }

    #[test]
    fn test_return_rules() {
        let analysis = analyze_src(
            "return 1; function f(): integer { return \"a\"; } function g() { return; } function h(): string { return; }",
        );
        assert_eq!(
            messages_of(&analysis),
            vec![
                "return fuera de una función",
                "Tipo de retorno incorrecto: esperado integer, encontrado string",
                "Tipo de retorno incorrecto: esperado string, encontrado void",
            ]
        );
    }

    #[test]
    fn test_duplicate_function_and_parameter() {
        let analysis = analyze_src("function f(a: integer, a: integer) { } function f() { }");
        assert_eq!(
            messages_of(&analysis),
            vec![
                "Parámetro 'a' duplicado en la función 'f'",
                "Función 'f' ya fue declarada en este ámbito",
            ]
        );
    }

    #[test]
    fn test_nested_function_captures() {
        let analysis = analyze_src(
            r#"
            let global: integer = 10;
            function outer(base: integer): integer {
                let count: integer = 0;
                function inner(step: integer): integer {
                    let local: integer = step;
                    count = count + local;
                    return count + base + global + fantasma;
                }
                return inner(1);
            }
            "#,
        );
        assert_eq!(
            messages_of(&analysis),
            vec!["Variable capturada 'fantasma' no existe en ámbitos externos"]
        );

        let inner = analysis.symbols.find_all("inner");
        let info = inner.first().and_then(|symbol| symbol.as_function());
        let captured: Vec<&str> = info
            .map(|f| f.captured.iter().map(String::as_str).collect())
            .unwrap_or_default();
        assert_eq!(captured, vec!["base", "count", "global"]);
        assert_eq!(info.map(|f| f.nested), Some(true));
        assert_eq!(info.and_then(|f| f.enclosing_function.as_deref()), Some("outer"));

        let outer = analysis.symbols.lookup("outer").and_then(|s| s.as_function());
        assert_eq!(outer.map(|f| f.nested), Some(false));
    }

    #[test]
    fn test_method_calls() {
        let analysis = analyze_src(
            r#"
            class Calc {
                var total: integer = 0;
                function sumar(n: integer): integer { return n; }
            }
            let c: Calc = new Calc();
            let a: integer = c.sumar(1);
            c.sumar();
            c.restar(1);
            c.total();
            "#,
        );
        assert_eq!(
            messages_of(&analysis),
            vec![
                "Método 'sumar' espera 1 argumentos, pero recibe 0",
                "Método 'restar' no existe en la clase 'Calc'",
                "'total' no es un método de la clase 'Calc'",
            ]
        );
    }
}
