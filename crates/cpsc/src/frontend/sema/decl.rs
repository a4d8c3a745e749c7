//! Variable and constant declarations, assignments

use super::analyzer::{Analyzer, DeclTarget};
use super::diagnostics::DiagnosticKind;
use super::symbol::Symbol;
use super::types::Type;
use crate::common::Span;
use crate::frontend::ast::*;

impl Analyzer {
    pub(super) fn declare_variable(&mut self, decl: &VarDecl, target: DeclTarget<'_>) {
        if self.is_declared(&decl.name, target) {
            let message = match target {
                DeclTarget::Scope => format!("Variable '{}' ya declarada en este scope", decl.name),
                DeclTarget::Member(class) => format!("Miembro '{}' ya declarado en la clase '{class}'", decl.name),
            };
            self.report(DiagnosticKind::DuplicateDeclaration, message, decl.span);
            return;
        }

        let ty = self.binding_type("variable", &decl.name, decl.ty.as_ref(), decl.init.as_ref(), decl.span);
        let symbol = Symbol::variable(&decl.name, ty, decl.span).with_initialized(decl.init.is_some());
        self.register(symbol, target);
    }

    pub(super) fn declare_constant(&mut self, decl: &ConstDecl, target: DeclTarget<'_>) {
        if decl.init.is_none() {
            self.report(
                DiagnosticKind::ConstantNotInitialized,
                format!("La constante '{}' debe inicializarse", decl.name),
                decl.span,
            );
        }

        if self.is_declared(&decl.name, target) {
            let message = match target {
                DeclTarget::Scope => format!("Constante '{}' ya declarada en este scope", decl.name),
                DeclTarget::Member(class) => format!("Constante '{}' ya declarada en la clase '{class}'", decl.name),
            };
            self.report(DiagnosticKind::DuplicateDeclaration, message, decl.span);
            return;
        }

        let ty = self.binding_type("constante", &decl.name, decl.ty.as_ref(), decl.init.as_ref(), decl.span);
        let symbol = Symbol::constant(&decl.name, ty, decl.span).with_initialized(decl.init.is_some());
        self.register(symbol, target);
    }

    fn is_declared(&self, name: &str, target: DeclTarget<'_>) -> bool {
        match target {
            DeclTarget::Scope => self.scopes.exists_local(self.ctx.scope, name),
            DeclTarget::Member(class) => self
                .lookup_class(class)
                .is_some_and(|info| info.members.contains(name)),
        }
    }

    fn register(&mut self, symbol: Symbol, target: DeclTarget<'_>) {
        match target {
            DeclTarget::Scope => {
                self.declare(symbol);
            }
            DeclTarget::Member(class) => {
                let symbol = symbol.with_enclosing_class(class);
                if let Some(info) = self.class_info_mut(class) {
                    info.members.insert(symbol);
                }
            }
        }
    }

    /// Type a binding takes from its annotation and initializer
    ///
    /// Without an annotation the initializer's type is adopted; with neither
    /// the binding is `Unknown`.
    fn binding_type(
        &mut self,
        noun: &str,
        name: &str,
        annotation: Option<&TypeAnnotation>,
        init: Option<&Expr>,
        span: Span,
    ) -> Type {
        let declared = annotation.map(Type::from_annotation);
        let Some(init) = init else {
            return declared.unwrap_or(Type::Unknown);
        };

        let actual = self.eval_expr(init);
        match declared {
            None => actual,
            Some(declared) => {
                if !declared.accepts(&actual) {
                    let message = format!(
                        "No se puede inicializar {noun} '{name}' de tipo '{declared}' con expresión de tipo '{actual}'"
                    );
                    self.report(DiagnosticKind::TypeMismatch, message, span);
                }
                declared
            }
        }
    }

    // =========================================================================
    // Assignment
    // =========================================================================

    pub(super) fn check_assignment(&mut self, target: &AssignTarget, value: &Expr) {
        match target {
            AssignTarget::Variable { name, span } => self.assign_variable(name, value, *span),
            AssignTarget::Member { object, member, span } => self.assign_member(object, member, value, *span),
        }
    }

    /// The target is checked before the value; a missing or immutable target skips the value
    fn assign_variable(&mut self, name: &str, value: &Expr, span: Span) {
        let target = self
            .scopes
            .resolve(self.ctx.scope, name)
            .map(|symbol| (symbol.mutable, symbol.kind_name(), symbol.ty.clone()));

        let Some((mutable, kind_name, declared)) = target else {
            if self.reported_captures.contains(&span.start) {
                return;
            }
            match self.owner_of_member(name) {
                Some(owner) => self.report(
                    DiagnosticKind::ClassError,
                    format!("No se puede acceder al miembro '{name}' sin un objeto de tipo '{owner}'"),
                    span,
                ),
                None => self.report(
                    DiagnosticKind::UndeclaredIdentifier,
                    format!("Variable '{name}' no declarada"),
                    span,
                ),
            }
            return;
        };

        if !mutable {
            self.report(
                DiagnosticKind::AssignToConstant,
                format!("No se puede asignar a la {kind_name} '{name}'"),
                span,
            );
            return;
        }

        let actual = self.eval_expr(value);
        if !declared.accepts_assignment(&actual) {
            let message = format!(
                "No se puede asignar valor de tipo '{actual}' a variable '{name}' de tipo '{declared}'"
            );
            self.report(DiagnosticKind::TypeMismatch, message, value.span);
            return;
        }

        if let Some(symbol) = self.scopes.resolve_mut(self.ctx.scope, name) {
            // Backfill an untyped declaration from its first typed assignment
            if symbol.ty == Type::Unknown && !actual.is_unknown() && actual != Type::Null {
                symbol.ty = actual;
            }
            symbol.initialized = true;
        }
    }

    fn assign_member(&mut self, object: &Expr, member: &str, value: &Expr, span: Span) {
        let object_ty = self.eval_expr(object);
        let actual = self.eval_expr(value);
        if object_ty.is_unknown() {
            return;
        }
        let Some(class) = self.expect_class(&object_ty, object.span) else {
            return;
        };

        let Some(found) = self.find_member(class, member) else {
            self.report(
                DiagnosticKind::ClassError,
                format!("Miembro '{member}' no existe en la clase '{class}'"),
                span,
            );
            return;
        };

        if !found.symbol.mutable {
            let message = format!("No se puede asignar a la {} '{member}'", found.symbol.kind_name());
            self.report(DiagnosticKind::AssignToConstant, message, span);
            return;
        }

        if !found.symbol.ty.accepts_assignment(&actual) {
            let message = format!(
                "No se puede asignar valor de tipo '{actual}' al miembro '{member}' de tipo '{}'",
                found.symbol.ty
            );
            self.report(DiagnosticKind::TypeMismatch, message, value.span);
            return;
        }

        if let Some(symbol) = self.member_mut(&found.owner, member) {
            symbol.initialized = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{analyze_src, kinds_of, messages_of};
    use super::super::{DiagnosticKind, Type};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_duplicate_keeps_first() {
        let analysis = analyze_src("let x: integer = 1; let x: string = \"a\";");
        assert_eq!(messages_of(&analysis), vec!["Variable 'x' ya declarada en este scope"]);
        assert_eq!(analysis.symbols.lookup("x").map(|s| &s.ty), Some(&Type::Integer));
    }

    #[test]
    fn test_initializer_mismatch() {
        let analysis = analyze_src("let x: integer = \"a\";");
        assert_eq!(
            messages_of(&analysis),
            vec!["No se puede inicializar variable 'x' de tipo 'integer' con expresión de tipo 'string'"]
        );
        assert_eq!(kinds_of(&analysis), vec![DiagnosticKind::TypeMismatch]);
    }

    #[test]
    fn test_inferred_and_unknown_types() {
        let analysis = analyze_src("let a = \"hola\"; let b; var c: boolean;");
        assert!(analysis.is_ok());
        let ty = |name: &str| analysis.symbols.lookup(name).map(|s| s.ty.clone());
        assert_eq!(ty("a"), Some(Type::String));
        assert_eq!(ty("b"), Some(Type::Unknown));
        assert_eq!(ty("c"), Some(Type::Boolean));
    }

    #[test]
    fn test_constant_rules() {
        let analysis = analyze_src("const c: integer; const d: integer = 1; d = 2; const d: integer = 3;");
        assert_eq!(
            messages_of(&analysis),
            vec![
                "La constante 'c' debe inicializarse",
                "No se puede asignar a la constante 'd'",
                "Constante 'd' ya declarada en este scope",
            ]
        );
        let c = analysis.symbols.lookup("c");
        assert_eq!(c.map(|s| (&s.ty, s.mutable)), Some((&Type::Integer, false)));
    }

    #[test]
    fn test_assignment_checks() {
        let analysis = analyze_src("let x: integer = 1; x = \"a\"; y = 3; x = null; x = 4;");
        assert_eq!(
            messages_of(&analysis),
            vec![
                "No se puede asignar valor de tipo 'string' a variable 'x' de tipo 'integer'",
                "Variable 'y' no declarada",
            ]
        );
    }

    #[test]
    fn test_assignment_target_checked_before_value() {
        let analysis = analyze_src("y = z; const k: integer = 1; k = w; let v: integer = 0; v = u;");
        assert_eq!(
            messages_of(&analysis),
            vec![
                "Variable 'y' no declarada",
                "No se puede asignar a la constante 'k'",
                "Variable 'u' no declarada en este scope",
            ]
        );
    }

    #[test]
    fn test_assignment_backfills_untyped_variable() {
        let analysis = analyze_src("let t; t = 5;");
        assert!(analysis.is_ok());
        let t = analysis.symbols.lookup("t");
        assert_eq!(t.map(|s| (&s.ty, s.initialized)), Some((&Type::Integer, true)));
    }

    #[test]
    fn test_shadowing_in_block() {
        let analysis = analyze_src("let x = 1; { let x = \"a\"; let y: string = x; } let z: integer = x;");
        assert!(analysis.is_ok());
        assert_eq!(analysis.symbols.lookup("x").map(|s| &s.ty), Some(&Type::Integer));
    }

    #[test]
    fn test_functions_are_not_assignable() {
        let analysis = analyze_src("function f() { } f = 1;");
        assert_eq!(messages_of(&analysis), vec!["No se puede asignar a la función 'f'"]);
    }

    #[test]
    fn test_member_assignment_through_object() {
        let analysis = analyze_src(
            r#"
            class P { var edad: integer; const ID: integer = 1; }
            let p: P = new P();
            p.edad = 3;
            p.edad = "x";
            p.nada = 1;
            p.ID = 2;
            let n: integer = 1;
            n.campo = 2;
            "#,
        );
        assert_eq!(
            messages_of(&analysis),
            vec![
                "No se puede asignar valor de tipo 'string' al miembro 'edad' de tipo 'integer'",
                "Miembro 'nada' no existe en la clase 'P'",
                "No se puede asignar a la constante 'ID'",
                "Tipo 'integer' no es una clase válida",
            ]
        );
    }

    #[test]
    fn test_this_assignment_outside_class() {
        let analysis = analyze_src("this.x = 1;");
        assert_eq!(kinds_of(&analysis), vec![DiagnosticKind::ThisOutsideClass]);
    }
}
