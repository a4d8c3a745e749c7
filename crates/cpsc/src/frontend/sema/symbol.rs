//! Symbols and the ordered maps that hold them

use super::types::Type;
use crate::common::{Position, Span};
use std::collections::{BTreeSet, HashMap};

/// A named entity visible to the checker
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    /// Declared or inferred type; the return type for functions
    pub ty: Type,
    pub declared_at: Position,
    pub span: Span,
    pub mutable: bool,
    pub initialized: bool,
    /// Owning class for members
    pub enclosing_class: Option<String>,
}

/// Kind of symbol, with the data specific to it
#[derive(Debug, Clone, PartialEq)]
pub enum SymbolKind {
    Variable,
    Constant,
    Function(FunctionInfo),
    Class(ClassInfo),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionInfo {
    /// Parameters as `Variable` symbols, in declaration order
    pub params: Vec<Symbol>,
    pub return_type: Type,
    pub nested: bool,
    pub enclosing_function: Option<String>,
    pub captured: BTreeSet<String>,
    pub is_constructor: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassInfo {
    pub superclass: Option<String>,
    pub members: SymbolMap,
}

impl Symbol {
    pub fn variable(name: impl Into<String>, ty: Type, span: Span) -> Self {
        Self::new(name, SymbolKind::Variable, ty, span, true)
    }

    pub fn constant(name: impl Into<String>, ty: Type, span: Span) -> Self {
        Self::new(name, SymbolKind::Constant, ty, span, false)
    }

    pub fn function(name: impl Into<String>, info: FunctionInfo, span: Span) -> Self {
        let ty = info.return_type.clone();
        let mut symbol = Self::new(name, SymbolKind::Function(info), ty, span, false);
        symbol.initialized = true;
        symbol
    }

    pub fn class(name: impl Into<String>, superclass: Option<String>, span: Span) -> Self {
        let name = name.into();
        let ty = Type::Class(name.clone());
        let info = ClassInfo {
            superclass,
            members: SymbolMap::new(),
        };
        let mut symbol = Self::new(name, SymbolKind::Class(info), ty, span, false);
        symbol.initialized = true;
        symbol
    }

    fn new(name: impl Into<String>, kind: SymbolKind, ty: Type, span: Span, mutable: bool) -> Self {
        Self {
            name: name.into(),
            kind,
            ty,
            declared_at: span.position(),
            span,
            mutable,
            initialized: false,
            enclosing_class: None,
        }
    }

    pub fn with_initialized(mut self, initialized: bool) -> Self {
        self.initialized = initialized;
        self
    }

    pub fn with_enclosing_class(mut self, class: impl Into<String>) -> Self {
        self.enclosing_class = Some(class.into());
        self
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            SymbolKind::Variable => "variable",
            SymbolKind::Constant => "constante",
            SymbolKind::Function(_) => "función",
            SymbolKind::Class(_) => "clase",
        }
    }

    pub fn as_function(&self) -> Option<&FunctionInfo> {
        match &self.kind {
            SymbolKind::Function(info) => Some(info),
            _ => None,
        }
    }

    pub fn as_function_mut(&mut self) -> Option<&mut FunctionInfo> {
        match &mut self.kind {
            SymbolKind::Function(info) => Some(info),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&ClassInfo> {
        match &self.kind {
            SymbolKind::Class(info) => Some(info),
            _ => None,
        }
    }

    pub fn as_class_mut(&mut self) -> Option<&mut ClassInfo> {
        match &mut self.kind {
            SymbolKind::Class(info) => Some(info),
            _ => None,
        }
    }
}

/// Name-indexed symbols that remember insertion order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SymbolMap {
    entries: Vec<Symbol>,
    index: HashMap<String, usize>,
}

impl SymbolMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert unless the name is taken; returns whether it was inserted
    pub fn insert(&mut self, symbol: Symbol) -> bool {
        if self.index.contains_key(&symbol.name) {
            return false;
        }
        self.index.insert(symbol.name.clone(), self.entries.len());
        self.entries.push(symbol);
        true
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.index.get(name).map(|&i| &mut self.entries[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
