//! Expression type evaluation
//!
//! Every path returns a [`Type`]. A sub-expression that already reported a
//! problem yields `Unknown` or `Error`, and both are accepted everywhere, so
//! one root cause produces at most one diagnostic.

use super::analyzer::Analyzer;
use super::diagnostics::DiagnosticKind;
use super::symbol::SymbolKind;
use super::types::Type;
use crate::common::Span;
use crate::frontend::ast::*;

/// Which side of a binary operator an operand sits on
#[derive(Debug, Clone, Copy)]
enum Side {
    Left,
    Right,
}

impl Side {
    fn label(self) -> &'static str {
        match self {
            Side::Left => "izquierdo",
            Side::Right => "derecho",
        }
    }
}

impl Analyzer {
    pub(super) fn eval_expr(&mut self, expr: &Expr) -> Type {
        match &expr.kind {
            ExprKind::IntLiteral(_) => Type::Integer,
            ExprKind::StringLiteral(_) => Type::String,
            ExprKind::BoolLiteral(_) => Type::Boolean,
            ExprKind::Null => Type::Null,
            ExprKind::Identifier(name) => self.eval_identifier(name, expr.span),
            ExprKind::This => self.eval_this(expr.span),
            ExprKind::Array(elements) => self.eval_array(elements),
            ExprKind::Index { object, index } => self.eval_index(object, index),
            ExprKind::Property { object, name } => self.eval_property(object, name, expr.span),
            ExprKind::Call { callee, args } => self.eval_call(callee, args, expr.span),
            ExprKind::New { class, args } => self.eval_new(class, args, expr.span),
            ExprKind::Unary { op, operand } => self.eval_unary(*op, operand),
            ExprKind::Binary { op, left, right } => self.eval_binary(*op, left, right, expr.span),
            ExprKind::Ternary {
                condition,
                then_expr,
                else_expr,
            } => self.eval_ternary(condition, then_expr, else_expr, expr.span),
        }
    }

    fn eval_identifier(&mut self, name: &str, span: Span) -> Type {
        if let Some(symbol) = self.scopes.resolve(self.ctx.scope, name) {
            return match symbol.kind {
                SymbolKind::Variable | SymbolKind::Constant => symbol.ty.clone(),
                SymbolKind::Function(_) | SymbolKind::Class(_) => Type::Unknown,
            };
        }

        // The capture pre-pass already reported this reference
        if self.reported_captures.contains(&span.start) {
            return Type::Error;
        }

        match self.owner_of_member(name) {
            Some(owner) => self.report(
                DiagnosticKind::ClassError,
                format!("No se puede acceder al miembro '{name}' sin un objeto de tipo '{owner}'"),
                span,
            ),
            None => self.report(
                DiagnosticKind::UndeclaredIdentifier,
                format!("Variable '{name}' no declarada en este scope"),
                span,
            ),
        }
        Type::Error
    }

    fn eval_this(&mut self, span: Span) -> Type {
        if let Some(class) = &self.ctx.class {
            return Type::Class(class.clone());
        }
        self.report(
            DiagnosticKind::ThisOutsideClass,
            "Uso de 'this' fuera de una clase",
            span,
        );
        Type::Error
    }

    fn eval_array(&mut self, elements: &[Expr]) -> Type {
        let mut element_type: Option<Type> = None;

        for element in elements {
            let ty = self.eval_expr(element);
            if ty.is_unknown() {
                continue;
            }
            match &element_type {
                None => element_type = Some(ty),
                Some(expected) if expected.accepts(&ty) => {}
                Some(expected) => {
                    let message = format!(
                        "Elementos del arreglo deben ser del mismo tipo: se esperaba '{expected}', encontrado '{ty}'"
                    );
                    self.report(DiagnosticKind::TypeMismatch, message, element.span);
                }
            }
        }

        Type::array_of(element_type.unwrap_or(Type::Unknown))
    }

    fn eval_index(&mut self, object: &Expr, index: &Expr) -> Type {
        let object_ty = self.eval_expr(object);
        let index_ty = self.eval_expr(index);

        if !index_ty.is_unknown() && !index_ty.is_integer() {
            self.report(
                DiagnosticKind::TypeMismatch,
                format!("Índice de arreglo debe ser integer, encontrado: {index_ty}"),
                index.span,
            );
        }

        match object_ty {
            Type::Array(element) => *element,
            ty if ty.is_unknown() => Type::Unknown,
            ty => {
                self.report(
                    DiagnosticKind::TypeMismatch,
                    format!("No se puede indexar un valor de tipo '{ty}'"),
                    object.span,
                );
                Type::Error
            }
        }
    }

    fn eval_property(&mut self, object: &Expr, name: &str, span: Span) -> Type {
        let object_ty = self.eval_expr(object);
        if object_ty.is_unknown() {
            return Type::Unknown;
        }

        let Some(class) = self.expect_class(&object_ty, span) else {
            return Type::Error;
        };

        match self.find_member(class, name) {
            Some(member) => match member.symbol.kind {
                SymbolKind::Function(_) => Type::Unknown,
                _ => member.symbol.ty,
            },
            None => {
                let message = format!("Miembro '{name}' no existe en la clase '{class}'");
                self.report(DiagnosticKind::ClassError, message, span);
                Type::Error
            }
        }
    }

    fn eval_unary(&mut self, op: UnaryOp, operand: &Expr) -> Type {
        let ty = self.eval_expr(operand);
        let (ok, result, expected) = match op {
            UnaryOp::Neg => (ty.is_integer(), Type::Integer, "integer"),
            UnaryOp::Not => (ty.is_boolean(), Type::Boolean, "boolean"),
        };

        if !ok && !ty.is_unknown() {
            let message = match op {
                UnaryOp::Neg => format!("Operador '-' unario requiere operando {expected}, encontrado: {ty}"),
                UnaryOp::Not => format!("Operador '!' requiere operando {expected}, encontrado: {ty}"),
            };
            self.report(DiagnosticKind::InvalidOperandType, message, operand.span);
        }
        result
    }

    fn eval_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr, span: Span) -> Type {
        let left_ty = self.eval_expr(left);
        let right_ty = self.eval_expr(right);

        if op.is_arithmetic() {
            let left_ok = self.expect_operand(op, Side::Left, &left_ty, &Type::Integer, left.span);
            let right_ok = self.expect_operand(op, Side::Right, &right_ty, &Type::Integer, right.span);

            if matches!(op, BinaryOp::Div | BinaryOp::Mod) && right.is_zero_literal() {
                self.report(DiagnosticKind::DivisionByZero, "División por cero detectada", right.span);
            }

            if left_ok && right_ok {
                Type::Integer
            } else {
                Type::Unknown
            }
        } else if op.is_logical() {
            let left_ok = self.expect_operand(op, Side::Left, &left_ty, &Type::Boolean, left.span);
            let right_ok = self.expect_operand(op, Side::Right, &right_ty, &Type::Boolean, right.span);

            if left_ok && right_ok {
                Type::Boolean
            } else {
                Type::Unknown
            }
        } else if op.is_equality() {
            if !left_ty.comparable_with(&right_ty) {
                let message = format!(
                    "No se pueden comparar tipos incompatibles: '{left_ty}' {} '{right_ty}'",
                    op.as_str()
                );
                self.report(DiagnosticKind::InvalidOperandType, message, span);
            }
            Type::Boolean
        } else {
            self.check_relational(op, &left_ty, &right_ty, span);
            Type::Boolean
        }
    }

    /// Report a side of `op` whose type is not `expected`; true when it matched exactly
    fn expect_operand(&mut self, op: BinaryOp, side: Side, actual: &Type, expected: &Type, span: Span) -> bool {
        if actual == expected {
            return true;
        }
        if !actual.is_unknown() {
            let message = format!(
                "Operando {} de '{}' debe ser {expected}, encontrado: {actual}",
                side.label(),
                op.as_str()
            );
            self.report(DiagnosticKind::InvalidOperandType, message, span);
        }
        false
    }

    fn check_relational(&mut self, op: BinaryOp, left: &Type, right: &Type, span: Span) {
        if left.is_unknown() || right.is_unknown() {
            return;
        }
        if left != right {
            let message = format!(
                "Operación relacional '{}' no válida entre tipos: '{left}' y '{right}'",
                op.as_str()
            );
            self.report(DiagnosticKind::InvalidOperandType, message, span);
        } else if !left.is_orderable() {
            let message = format!(
                "Operación relacional '{}' no soportada para tipo: '{left}'",
                op.as_str()
            );
            self.report(DiagnosticKind::NotOrderable, message, span);
        }
    }

    fn eval_ternary(&mut self, condition: &Expr, then_expr: &Expr, else_expr: &Expr, span: Span) -> Type {
        let condition_ty = self.eval_expr(condition);
        if !condition_ty.is_unknown() && !condition_ty.is_boolean() {
            self.report(
                DiagnosticKind::ConditionNotBoolean,
                format!("Condición del operador ternario debe ser boolean, encontrada: {condition_ty}"),
                condition.span,
            );
        }

        let then_ty = self.eval_expr(then_expr);
        let else_ty = self.eval_expr(else_expr);

        if then_ty.comparable_with(&else_ty) {
            if matches!(then_ty, Type::Null) || then_ty.is_unknown() {
                else_ty
            } else {
                then_ty
            }
        } else {
            let message = format!(
                "Ramas del operador ternario tienen tipos incompatibles: '{then_ty}' y '{else_ty}'"
            );
            self.report(DiagnosticKind::TypeMismatch, message, span);
            Type::Error
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{analyze_src, kinds_of, messages_of};
    use super::super::DiagnosticKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_arithmetic_on_integers_is_clean() {
        let analysis = analyze_src("let a: integer = 1 + 2 * 3 - 4 / 2 % 5;");
        assert!(analysis.is_ok());
    }

    #[test]
    fn test_arithmetic_reports_each_bad_side() {
        let analysis = analyze_src("let s: string = \"a\"; let x = s + true;");
        assert_eq!(
            messages_of(&analysis),
            vec![
                "Operando izquierdo de '+' debe ser integer, encontrado: string",
                "Operando derecho de '+' debe ser integer, encontrado: boolean",
            ]
        );
        // Unknown result suppresses anything downstream
        assert_eq!(analysis.symbols.lookup("x").map(|s| s.ty.to_string()), Some("desconocido".into()));
    }

    #[test]
    fn test_division_by_literal_zero() {
        let analysis = analyze_src("let a: integer = 10; let b = a / 0; let c = a % 0;");
        assert_eq!(
            kinds_of(&analysis),
            vec![DiagnosticKind::DivisionByZero, DiagnosticKind::DivisionByZero]
        );
    }

    #[test]
    fn test_unary_operators() {
        let analysis = analyze_src("let a = -true; let b = !1; let c: boolean = !false;");
        assert_eq!(
            messages_of(&analysis),
            vec![
                "Operador '-' unario requiere operando integer, encontrado: boolean",
                "Operador '!' requiere operando boolean, encontrado: integer",
            ]
        );
    }

    #[test]
    fn test_relational_and_equality() {
        let analysis = analyze_src(
            "let a = 1 < \"x\"; let b = true < false; let c = \"a\" <= \"b\"; let d = 1 == \"1\"; let e = null == 3;",
        );
        assert_eq!(
            messages_of(&analysis),
            vec![
                "Operación relacional '<' no válida entre tipos: 'integer' y 'string'",
                "Operación relacional '<' no soportada para tipo: 'boolean'",
                "No se pueden comparar tipos incompatibles: 'integer' == 'string'",
            ]
        );
        assert_eq!(
            kinds_of(&analysis),
            vec![
                DiagnosticKind::InvalidOperandType,
                DiagnosticKind::NotOrderable,
                DiagnosticKind::InvalidOperandType,
            ]
        );
    }

    #[test]
    fn test_undeclared_identifier_cascades_once() {
        let analysis = analyze_src("let y = z + 1;");
        assert_eq!(messages_of(&analysis), vec!["Variable 'z' no declarada en este scope"]);
    }

    #[test]
    fn test_arrays_and_indexing() {
        let analysis = analyze_src(
            "let xs: integer[] = [1, 2, 3]; let first: integer = xs[0]; let bad = [1, \"a\"]; let n = 5; let m = n[0]; let k = xs[true];",
        );
        assert_eq!(
            messages_of(&analysis),
            vec![
                "Elementos del arreglo deben ser del mismo tipo: se esperaba 'integer', encontrado 'string'",
                "No se puede indexar un valor de tipo 'integer'",
                "Índice de arreglo debe ser integer, encontrado: boolean",
            ]
        );
    }

    #[test]
    fn test_empty_array_fits_any_array() {
        let analysis = analyze_src("let names: string[] = []; let grid: integer[][] = [[1], []];");
        assert!(analysis.is_ok());
    }

    #[test]
    fn test_ternary() {
        let analysis = analyze_src("let a: integer = true ? 1 : 2; let b = 1 ? 2 : 3; let c = true ? 1 : \"x\";");
        assert_eq!(
            messages_of(&analysis),
            vec![
                "Condición del operador ternario debe ser boolean, encontrada: integer",
                "Ramas del operador ternario tienen tipos incompatibles: 'integer' y 'string'",
            ]
        );
    }

    #[test]
    fn test_this_outside_class() {
        let analysis = analyze_src("print(this);");
        assert_eq!(kinds_of(&analysis), vec![DiagnosticKind::ThisOutsideClass]);
    }
}
