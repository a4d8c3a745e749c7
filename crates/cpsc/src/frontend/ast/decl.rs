//! Declaration AST nodes

use super::{Block, Expr, TypeAnnotation};
use crate::common::Span;

/// Mutable variable declaration (`let` or `var`)
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: String,
    pub ty: Option<TypeAnnotation>,
    pub init: Option<Expr>,
    pub span: Span,
}

impl VarDecl {
    pub fn new(name: impl Into<String>, ty: Option<TypeAnnotation>, init: Option<Expr>, span: Span) -> Self {
        Self {
            name: name.into(),
            ty,
            init,
            span,
        }
    }
}

/// Constant declaration; the parser allows a missing initializer so the analyzer can report it
#[derive(Debug, Clone, PartialEq)]
pub struct ConstDecl {
    pub name: String,
    pub ty: Option<TypeAnnotation>,
    pub init: Option<Expr>,
    pub span: Span,
}

impl ConstDecl {
    pub fn new(name: impl Into<String>, ty: Option<TypeAnnotation>, init: Option<Expr>, span: Span) -> Self {
        Self {
            name: name.into(),
            ty,
            init,
            span,
        }
    }
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Option<TypeAnnotation>,
    pub span: Span,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: Option<TypeAnnotation>, span: Span) -> Self {
        Self {
            name: name.into(),
            ty,
            span,
        }
    }
}

/// Function or method declaration
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Param>,
    pub return_type: Option<TypeAnnotation>,
    pub body: Block,
    pub span: Span,
}

impl FunctionDecl {
    pub fn new(
        name: impl Into<String>,
        params: Vec<Param>,
        return_type: Option<TypeAnnotation>,
        body: Block,
        span: Span,
    ) -> Self {
        Self {
            name: name.into(),
            params,
            return_type,
            body,
            span,
        }
    }

    pub fn is_constructor(&self) -> bool {
        self.name == "constructor"
    }
}

/// Class declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    pub superclass: Option<String>,
    pub members: Vec<ClassMember>,
    pub span: Span,
}

impl ClassDecl {
    pub fn new(name: impl Into<String>, superclass: Option<String>, members: Vec<ClassMember>, span: Span) -> Self {
        Self {
            name: name.into(),
            superclass,
            members,
            span,
        }
    }
}

/// Member declared inside a class body
#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    Var(VarDecl),
    Const(ConstDecl),
    Function(FunctionDecl),
}
