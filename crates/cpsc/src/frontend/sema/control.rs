//! Conditions, loops, switch, try/catch, break and continue

use super::analyzer::Analyzer;
use super::diagnostics::DiagnosticKind;
use super::scope::ScopeKind;
use super::symbol::Symbol;
use super::types::Type;
use crate::common::Span;
use crate::frontend::ast::*;

impl Analyzer {
    fn check_condition(&mut self, construct: &str, condition: &Expr) {
        let ty = self.eval_expr(condition);
        if !ty.is_unknown() && !ty.is_boolean() {
            self.report(
                DiagnosticKind::ConditionNotBoolean,
                format!("Condición del {construct} debe ser boolean, encontrada: {ty}"),
                condition.span,
            );
        }
    }

    pub(super) fn check_if(&mut self, condition: &Expr, then_branch: &Block, else_branch: Option<&Block>) {
        self.check_condition("if", condition);
        self.visit_block(then_branch, ScopeKind::Block);
        if let Some(else_branch) = else_branch {
            self.visit_block(else_branch, ScopeKind::Block);
        }
    }

    pub(super) fn check_while(&mut self, condition: &Expr, body: &Block) {
        self.check_condition("while", condition);
        self.in_loop(|this| this.visit_block(body, ScopeKind::Loop));
    }

    pub(super) fn check_do_while(&mut self, body: &Block, condition: &Expr) {
        self.in_loop(|this| this.visit_block(body, ScopeKind::Loop));
        self.check_condition("do-while", condition);
    }

    /// The header and the body share one loop scope
    pub(super) fn check_for(&mut self, init: Option<&Stmt>, condition: Option<&Expr>, update: Option<&Stmt>, body: &Block) {
        self.in_scope(ScopeKind::Loop, |this| {
            if let Some(init) = init {
                this.visit_stmt(init);
            }
            this.in_loop(|this| {
                if let Some(condition) = condition {
                    this.check_condition("for", condition);
                }
                if let Some(update) = update {
                    this.visit_stmt(update);
                }
                this.visit_statements(&body.statements);
            });
        });
    }

    pub(super) fn check_foreach(&mut self, binding: &str, iterable: &Expr, body: &Block, span: Span) {
        let iterable_ty = self.eval_expr(iterable);
        let element = match iterable_ty {
            Type::Array(element) => *element,
            ty if ty.is_unknown() => Type::Unknown,
            ty => {
                let message = match &iterable.kind {
                    ExprKind::Identifier(name) => format!("No se puede iterar sobre '{name}' de tipo '{ty}'"),
                    _ => format!("No se puede iterar sobre una expresión de tipo '{ty}'"),
                };
                self.report(DiagnosticKind::NotIterable, message, iterable.span);
                Type::Unknown
            }
        };

        self.in_scope(ScopeKind::Loop, |this| {
            this.declare(Symbol::variable(binding, element, span).with_initialized(true));
            this.in_loop(|this| this.visit_statements(&body.statements));
        });
    }

    pub(super) fn check_switch(&mut self, discriminant: &Expr, cases: &[SwitchCase], default: Option<&[Stmt]>) {
        let switch_ty = self.eval_expr(discriminant);

        self.in_switch(|this| {
            for case in cases {
                let case_ty = this.eval_expr(&case.value);
                if !switch_ty.accepts(&case_ty) {
                    this.report(
                        DiagnosticKind::CaseTypeMismatch,
                        format!("Tipo del case '{case_ty}' no coincide con tipo del switch '{switch_ty}'"),
                        case.value.span,
                    );
                }
                this.in_scope(ScopeKind::Switch, |this| this.visit_statements(&case.body));
            }
            if let Some(default) = default {
                this.in_scope(ScopeKind::Switch, |this| this.visit_statements(default));
            }
        });
    }

    pub(super) fn check_try_catch(&mut self, try_block: &Block, catch_name: &str, catch_block: &Block, span: Span) {
        self.visit_block(try_block, ScopeKind::Block);
        self.in_scope(ScopeKind::Catch, |this| {
            this.declare(Symbol::variable(catch_name, Type::String, span).with_initialized(true));
            this.visit_statements(&catch_block.statements);
        });
    }

    pub(super) fn check_break(&mut self, span: Span) {
        if self.ctx.loop_depth == 0 && self.ctx.switch_depth == 0 {
            self.report(
                DiagnosticKind::InvalidControlFlow,
                "'break' fuera de un ciclo o switch",
                span,
            );
        }
    }

    pub(super) fn check_continue(&mut self, span: Span) {
        if self.ctx.loop_depth == 0 {
            self.report(DiagnosticKind::InvalidControlFlow, "'continue' fuera de un ciclo", span);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{analyze_src, kinds_of, messages_of};
    use super::super::DiagnosticKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_conditions_must_be_boolean() {
        let analysis = analyze_src(
            "if (5) { } while (\"a\") { } do { } while (1); for (let i: integer = 0; i; i = i + 1) { } if (true) { } else { }",
        );
        assert_eq!(
            messages_of(&analysis),
            vec![
                "Condición del if debe ser boolean, encontrada: integer",
                "Condición del while debe ser boolean, encontrada: string",
                "Condición del do-while debe ser boolean, encontrada: integer",
                "Condición del for debe ser boolean, encontrada: integer",
            ]
        );
    }

    #[test]
    fn test_break_and_continue_legality() {
        let analysis = analyze_src("break; continue;");
        assert_eq!(
            kinds_of(&analysis),
            vec![DiagnosticKind::InvalidControlFlow, DiagnosticKind::InvalidControlFlow]
        );

        let analysis = analyze_src(
            "while (true) { if (true) { break; } else { continue; } } for (;;) { continue; } do { break; } while (false);",
        );
        assert!(analysis.is_ok());
    }

    #[test]
    fn test_break_in_switch_but_not_continue() {
        let analysis = analyze_src("switch (1) { case 1: break; case 2: continue; default: break; }");
        assert_eq!(messages_of(&analysis), vec!["'continue' fuera de un ciclo"]);
    }

    #[test]
    fn test_function_body_resets_loop_depth() {
        let analysis = analyze_src("while (true) { function f() { break; } }");
        assert_eq!(messages_of(&analysis), vec!["'break' fuera de un ciclo o switch"]);
    }

    #[test]
    fn test_for_header_variable_scoped_to_loop() {
        let analysis = analyze_src("for (let i: integer = 0; i < 3; i = i + 1) { print(i); } print(i);");
        assert_eq!(messages_of(&analysis), vec!["Variable 'i' no declarada en este scope"]);
    }

    #[test]
    fn test_foreach() {
        let analysis = analyze_src(
            "let xs: integer[] = [1, 2]; foreach (x in xs) { let y: integer = x; } let n = 5; foreach (v in n) { } foreach (w in 3 + 4) { }",
        );
        assert_eq!(
            messages_of(&analysis),
            vec![
                "No se puede iterar sobre 'n' de tipo 'integer'",
                "No se puede iterar sobre una expresión de tipo 'integer'",
            ]
        );
        assert_eq!(kinds_of(&analysis), vec![DiagnosticKind::NotIterable, DiagnosticKind::NotIterable]);
    }

    #[test]
    fn test_switch_case_types() {
        let analysis = analyze_src("let s = \"a\"; switch (s) { case \"b\": print(1); case 3: print(2); default: print(3); }");
        assert_eq!(
            messages_of(&analysis),
            vec!["Tipo del case 'integer' no coincide con tipo del switch 'string'"]
        );
    }

    #[test]
    fn test_case_bodies_have_own_scope() {
        let analysis = analyze_src("switch (1) { case 1: let a = 1; case 2: let a = 2; }");
        assert!(analysis.is_ok());
    }

    #[test]
    fn test_catch_binds_string() {
        let analysis = analyze_src("try { let a = 1; } catch (err) { let m: string = err; } print(err);");
        assert_eq!(messages_of(&analysis), vec!["Variable 'err' no declarada en este scope"]);
    }
}
