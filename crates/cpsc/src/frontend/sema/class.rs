//! Class declarations, member lookup and instantiation

use super::analyzer::{Analyzer, DeclTarget};
use super::diagnostics::DiagnosticKind;
use super::function::Callee;
use super::scope::{ScopeId, ScopeKind};
use super::symbol::{ClassInfo, FunctionInfo, Symbol};
use super::types::Type;
use crate::common::Span;
use crate::frontend::ast::*;
use std::collections::{BTreeSet, HashSet};

/// A member found by walking a class chain
#[derive(Debug, Clone)]
pub(super) struct MemberRef {
    /// Class whose member map holds the symbol
    pub owner: String,
    pub symbol: Symbol,
}

/// Outcome of walking a superclass chain
#[derive(Debug, PartialEq, Eq)]
enum Inheritance {
    Valid,
    MissingSuperclass(String),
    Cycle,
}

impl Analyzer {
    // =========================================================================
    // Lookup
    // =========================================================================

    /// Nearest scope declaring `name` as a class; variables of the same name are skipped
    fn class_scope(&self, name: &str) -> Option<ScopeId> {
        self.scopes.ancestors(self.ctx.scope).find(|&id| {
            self.scopes
                .lookup_local(id, name)
                .is_some_and(|symbol| symbol.as_class().is_some())
        })
    }

    /// Class info for `name` as seen from the active scope
    pub(super) fn lookup_class(&self, name: &str) -> Option<&ClassInfo> {
        let scope = self.class_scope(name)?;
        self.scopes.lookup_local(scope, name)?.as_class()
    }

    pub(super) fn class_info_mut(&mut self, name: &str) -> Option<&mut ClassInfo> {
        let scope = self.class_scope(name)?;
        self.scopes.lookup_local_mut(scope, name)?.as_class_mut()
    }

    pub(super) fn member_mut(&mut self, class: &str, member: &str) -> Option<&mut Symbol> {
        self.class_info_mut(class)?.members.get_mut(member)
    }

    /// Walk `class` and its superclasses for `member`
    ///
    /// The walk ends quietly at a missing class or when a class repeats.
    pub(super) fn find_member(&self, class: &str, member: &str) -> Option<MemberRef> {
        let mut visited = HashSet::new();
        let mut current = Some(class.to_string());

        while let Some(name) = current {
            if !visited.insert(name.clone()) {
                return None;
            }
            let info = self.lookup_class(&name)?;
            if let Some(symbol) = info.members.get(member) {
                return Some(MemberRef {
                    owner: name,
                    symbol: symbol.clone(),
                });
            }
            current = info.superclass.clone();
        }
        None
    }

    /// Class owning `member` when it is referenced without an object
    ///
    /// The active class chain is searched first, then every class visible from
    /// the current scope.
    pub(super) fn owner_of_member(&self, member: &str) -> Option<String> {
        let in_active_chain = self
            .ctx
            .class
            .as_deref()
            .and_then(|class| self.find_member(class, member));
        if let Some(found) = in_active_chain {
            return Some(found.owner);
        }

        self.scopes.ancestors(self.ctx.scope).find_map(|id| {
            self.scopes
                .get(id)
                .symbols()
                .iter()
                .find(|symbol| symbol.as_class().is_some_and(|info| info.members.contains(member)))
                .map(|symbol| symbol.name.clone())
        })
    }

    fn inheritance_of(&self, class: &str) -> Inheritance {
        let mut visited = HashSet::from([class.to_string()]);
        let mut current = self.lookup_class(class).and_then(|info| info.superclass.clone());

        while let Some(name) = current {
            if !visited.insert(name.clone()) {
                return Inheritance::Cycle;
            }
            match self.lookup_class(&name) {
                Some(info) => current = info.superclass.clone(),
                None => return Inheritance::MissingSuperclass(name),
            }
        }
        Inheritance::Valid
    }

    // =========================================================================
    // Declaration
    // =========================================================================

    pub(super) fn declare_class(&mut self, decl: &ClassDecl) {
        if self.scopes.exists_local(self.ctx.scope, &decl.name) {
            self.report(
                DiagnosticKind::DuplicateDeclaration,
                format!("Clase '{}' ya declarada en este scope", decl.name),
                decl.span,
            );
            return;
        }

        self.declare(Symbol::class(&decl.name, decl.superclass.clone(), decl.span));

        let outer_class = self.ctx.class.replace(decl.name.clone());
        self.in_scope(ScopeKind::Class(decl.name.clone()), |this| {
            // Signatures first so method bodies can see every member
            for member in &decl.members {
                match member {
                    ClassMember::Var(var) => this.declare_variable(var, DeclTarget::Member(&decl.name)),
                    ClassMember::Const(constant) => this.declare_constant(constant, DeclTarget::Member(&decl.name)),
                    ClassMember::Function(function) => this.declare_method(&decl.name, function),
                }
            }

            for member in &decl.members {
                if let ClassMember::Function(function) = member {
                    if function.is_constructor() {
                        this.check_constructor_body(&decl.name, function);
                    } else {
                        this.analyze_method_body(&decl.name, function);
                    }
                }
            }
        });
        self.ctx.class = outer_class;
    }

    fn declare_method(&mut self, class: &str, decl: &FunctionDecl) {
        let (params, return_type) = Self::function_signature(decl);
        let info = FunctionInfo {
            params,
            return_type,
            nested: false,
            enclosing_function: None,
            captured: BTreeSet::new(),
            is_constructor: decl.is_constructor(),
        };
        let symbol = Symbol::function(&decl.name, info, decl.span).with_enclosing_class(class);

        let inserted = self
            .class_info_mut(class)
            .is_some_and(|info| info.members.insert(symbol));
        if !inserted {
            self.report(
                DiagnosticKind::DuplicateDeclaration,
                format!("Miembro '{}' ya declarado en la clase '{class}'", decl.name),
                decl.span,
            );
        }
    }

    fn analyze_method_body(&mut self, class: &str, decl: &FunctionDecl) {
        let Some(member) = self.lookup_class(class).and_then(|info| info.members.get(&decl.name)) else {
            return;
        };
        // A duplicate method name keeps the first signature; skip the shadowed body
        if member.span != decl.span {
            return;
        }
        let Some(info) = member.as_function() else {
            return;
        };
        let params = info.params.clone();
        let return_type = info.return_type.clone();
        self.analyze_body(decl, params, return_type, None);
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    /// Constructor bodies may only copy parameters into members
    fn check_constructor_body(&mut self, class: &str, decl: &FunctionDecl) {
        let Some(params) = self
            .find_member(class, &decl.name)
            .filter(|member| member.owner == class && member.symbol.span == decl.span)
            .and_then(|member| member.symbol.as_function().map(|info| info.params.clone()))
        else {
            return;
        };

        for stmt in &decl.body.statements {
            let StmtKind::Assign { target, value } = &stmt.kind else {
                self.report(
                    DiagnosticKind::ConstructorRestriction,
                    "En constructor solo se permiten asignaciones",
                    stmt.span,
                );
                continue;
            };

            let AssignTarget::Member { object, member, .. } = target else {
                self.report(
                    DiagnosticKind::ConstructorRestriction,
                    "En constructor solo se permiten asignaciones a miembros de la clase",
                    stmt.span,
                );
                continue;
            };
            if !matches!(object.kind, ExprKind::This) {
                self.report(
                    DiagnosticKind::ConstructorRestriction,
                    "En constructor solo se permiten asignaciones a miembros de la clase",
                    stmt.span,
                );
                continue;
            }

            let ExprKind::Identifier(source) = &value.kind else {
                self.report(
                    DiagnosticKind::ConstructorRestriction,
                    "En constructor solo se permiten asignaciones de miembros (this.<miembro> = <parametro>)",
                    stmt.span,
                );
                continue;
            };

            let Some(field) = self
                .lookup_class(class)
                .and_then(|info| info.members.get(member))
                .cloned()
            else {
                self.report(
                    DiagnosticKind::ConstructorRestriction,
                    format!("Miembro '{member}' no existe en la clase"),
                    stmt.span,
                );
                continue;
            };

            let Some(param) = params.iter().find(|param| &param.name == source) else {
                self.report(
                    DiagnosticKind::ConstructorRestriction,
                    format!("Asignación inválida: '{source}' no es parámetro del constructor"),
                    stmt.span,
                );
                continue;
            };

            if !field.mutable {
                self.report(
                    DiagnosticKind::AssignToConstant,
                    format!("No se puede asignar a la {} '{member}'", field.kind_name()),
                    stmt.span,
                );
                continue;
            }

            if !param.ty.is_unknown() && field.ty != param.ty {
                let message = format!(
                    "Tipo del parámetro '{source}' ({}) no coincide con tipo del miembro '{member}' ({})",
                    param.ty, field.ty
                );
                self.report(DiagnosticKind::ConstructorRestriction, message, stmt.span);
                continue;
            }

            if let Some(symbol) = self.member_mut(class, member) {
                symbol.initialized = true;
            }
        }
    }

    // =========================================================================
    // Instantiation
    // =========================================================================

    pub(super) fn eval_new(&mut self, class: &str, args: &[Expr], span: Span) -> Type {
        let arg_types: Vec<Type> = args.iter().map(|arg| self.eval_expr(arg)).collect();

        if self.lookup_class(class).is_none() {
            self.report(
                DiagnosticKind::ClassError,
                format!("Clase '{class}' no existe"),
                span,
            );
            return Type::Error;
        }

        match self.inheritance_of(class) {
            Inheritance::Valid => {}
            Inheritance::MissingSuperclass(superclass) => {
                self.report(
                    DiagnosticKind::ClassError,
                    format!("Superclase '{superclass}' de la clase '{class}' no existe"),
                    span,
                );
            }
            Inheritance::Cycle => {
                self.report(
                    DiagnosticKind::ClassError,
                    format!("Herencia cíclica detectada en la clase '{class}'"),
                    span,
                );
            }
        }

        let constructor = self
            .find_member(class, "constructor")
            .and_then(|member| member.symbol.as_function().map(|info| info.params.clone()));

        match constructor {
            Some(params) => self.check_arguments(Callee::Constructor(class), &params, args, &arg_types, span),
            None if !args.is_empty() => {
                let message = format!(
                    "La clase '{class}' no tiene constructor definido, pero recibe {} argumentos",
                    args.len()
                );
                self.report(DiagnosticKind::ClassError, message, span);
            }
            None => {}
        }

        Type::Class(class.to_string())
    }

    /// Reject a member name resolved against something that is not a class
    pub(super) fn expect_class<'t>(&mut self, ty: &'t Type, span: Span) -> Option<&'t str> {
        let class = ty.class_name();
        if class.is_none() {
            self.report(
                DiagnosticKind::ClassError,
                format!("Tipo '{ty}' no es una clase válida"),
                span,
            );
        }
        class
    }
}
