//! Statement AST nodes

use super::{ClassDecl, ConstDecl, Expr, FunctionDecl, VarDecl};
use crate::common::Span;

/// Statement node
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Statement kinds
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// let x: integer = 1; / var x = 1;
    VarDecl(VarDecl),

    /// const PI: integer = 3;
    ConstDecl(ConstDecl),

    /// Assignment statement: x = e; / this.x = e;
    Assign {
        target: AssignTarget,
        value: Expr,
    },

    /// Expression statement: expr;
    Expr(Expr),

    /// print(expr);
    Print(Expr),

    /// Block: { ... }
    Block(Block),

    /// if (cond) then [else else]
    If {
        condition: Expr,
        then_branch: Block,
        else_branch: Option<Block>,
    },

    /// while (cond) body
    While {
        condition: Expr,
        body: Block,
    },

    /// do body while (cond);
    DoWhile {
        body: Block,
        condition: Expr,
    },

    /// for (init; cond; update) body
    For {
        init: Option<Box<Stmt>>,
        condition: Option<Expr>,
        update: Option<Box<Stmt>>,
        body: Block,
    },

    /// foreach (binding in iterable) body
    Foreach {
        binding: String,
        iterable: Expr,
        body: Block,
    },

    /// switch (discriminant) { case ...: ... default: ... }
    Switch {
        discriminant: Expr,
        cases: Vec<SwitchCase>,
        default: Option<Vec<Stmt>>,
    },

    /// try { ... } catch (name) { ... }
    TryCatch {
        try_block: Block,
        catch_name: String,
        catch_block: Block,
    },

    /// break;
    Break,

    /// continue;
    Continue,

    /// return [expr];
    Return(Option<Expr>),

    /// function name(params): ret { ... }
    Function(FunctionDecl),

    /// class Name [: Super] { ... }
    Class(ClassDecl),
}

/// Left-hand side of an assignment
#[derive(Debug, Clone, PartialEq)]
pub enum AssignTarget {
    /// Plain name: x = ...
    Variable { name: String, span: Span },

    /// Member of an object: this.x = ..., obj.x = ...
    Member {
        object: Expr,
        member: String,
        span: Span,
    },
}

impl AssignTarget {
    pub fn span(&self) -> Span {
        match self {
            AssignTarget::Variable { span, .. } | AssignTarget::Member { span, .. } => *span,
        }
    }
}

/// Brace-delimited statement list
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

impl Block {
    pub fn new(statements: Vec<Stmt>, span: Span) -> Self {
        Self { statements, span }
    }
}

/// One `case expr:` arm of a switch
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    pub value: Expr,
    pub body: Vec<Stmt>,
    pub span: Span,
}

impl SwitchCase {
    pub fn new(value: Expr, body: Vec<Stmt>, span: Span) -> Self {
        Self { value, body, span }
    }
}
