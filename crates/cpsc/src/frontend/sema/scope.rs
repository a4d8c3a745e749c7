//! Scope tree and symbol lookup
//!
//! Scopes live in an arena and refer to their parent by [`ScopeId`]. Exited
//! scopes stay in the arena so the per-scope view survives the analysis, but
//! resolution only ever follows parent links from the active scope.

use super::symbol::{Symbol, SymbolMap};
use std::fmt;
use thiserror::Error;

/// Handle of a scope inside a [`ScopeTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

impl ScopeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// What opened a scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeKind {
    Global,
    Block,
    Function(String),
    Class(String),
    Loop,
    Switch,
    Catch,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeKind::Global => write!(f, "global"),
            ScopeKind::Block => write!(f, "bloque"),
            ScopeKind::Function(name) => write!(f, "función {name}"),
            ScopeKind::Class(name) => write!(f, "clase {name}"),
            ScopeKind::Loop => write!(f, "ciclo"),
            ScopeKind::Switch => write!(f, "switch"),
            ScopeKind::Catch => write!(f, "catch"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScopeError {
    #[error("symbol '{0}' already declared in this scope")]
    Duplicate(String),
}

/// A namespace of symbols with a link to its enclosing namespace
#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    parent: Option<ScopeId>,
    children: Vec<ScopeId>,
    symbols: SymbolMap,
}

impl Scope {
    fn new(kind: ScopeKind, parent: Option<ScopeId>) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
            symbols: SymbolMap::new(),
        }
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    pub fn children(&self) -> &[ScopeId] {
        &self.children
    }

    pub fn symbols(&self) -> &SymbolMap {
        &self.symbols
    }
}

/// Arena of scopes rooted at a single global scope
#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl ScopeTree {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(ScopeKind::Global, None)],
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Open a child of `parent`
    pub fn enter(&mut self, parent: ScopeId, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope::new(kind, Some(parent)));
        self.scopes[parent.0].children.push(id);
        id
    }

    /// Parent of `scope`; the root is its own parent
    pub fn exit(&self, scope: ScopeId) -> ScopeId {
        self.scopes[scope.0].parent.unwrap_or(scope)
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes[scope.0].parent
    }

    pub fn declare(&mut self, scope: ScopeId, symbol: Symbol) -> Result<(), ScopeError> {
        let name = symbol.name.clone();
        if self.scopes[scope.0].symbols.insert(symbol) {
            Ok(())
        } else {
            Err(ScopeError::Duplicate(name))
        }
    }

    pub fn exists_local(&self, scope: ScopeId, name: &str) -> bool {
        self.scopes[scope.0].symbols.contains(name)
    }

    pub fn exists_visible(&self, scope: ScopeId, name: &str) -> bool {
        self.resolve(scope, name).is_some()
    }

    /// Nearest declaration walking outward to the root
    pub fn resolve(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        self.resolve_entry(scope, name).map(|(_, symbol)| symbol)
    }

    /// Like [`ScopeTree::resolve`], also returning the declaring scope
    pub fn resolve_entry(&self, scope: ScopeId, name: &str) -> Option<(ScopeId, &Symbol)> {
        self.ancestors(scope).find_map(|id| {
            self.scopes[id.0].symbols.get(name).map(|symbol| (id, symbol))
        })
    }

    pub fn resolve_mut(&mut self, scope: ScopeId, name: &str) -> Option<&mut Symbol> {
        let (owner, _) = self.resolve_entry(scope, name)?;
        self.scopes[owner.0].symbols.get_mut(name)
    }

    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        self.scopes[scope.0].symbols.get(name)
    }

    pub fn lookup_local_mut(&mut self, scope: ScopeId, name: &str) -> Option<&mut Symbol> {
        self.scopes[scope.0].symbols.get_mut(name)
    }

    /// `scope` followed by each enclosing scope up to the root
    pub fn ancestors(&self, scope: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(scope), |id| self.scopes[id.0].parent)
    }

    /// Symbols visible from `scope`, root first; nearer declarations replace farther ones
    pub fn flatten(&self, scope: ScopeId) -> Vec<&Symbol> {
        let mut chain: Vec<ScopeId> = self.ancestors(scope).collect();
        chain.reverse();

        let mut visible: Vec<&Symbol> = Vec::new();
        for id in chain {
            for symbol in self.scopes[id.0].symbols.iter() {
                match visible.iter().position(|s| s.name == symbol.name) {
                    Some(i) => visible[i] = symbol,
                    None => visible.push(symbol),
                }
            }
        }
        visible
    }

    /// Every scope in creation order (parents before children)
    pub fn iter(&self) -> impl Iterator<Item = (ScopeId, &Scope)> {
        self.scopes.iter().enumerate().map(|(i, scope)| (ScopeId(i), scope))
    }

    /// Nesting depth, 0 for the root
    pub fn depth(&self, scope: ScopeId) -> usize {
        self.ancestors(scope).count() - 1
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Span;
    use crate::frontend::sema::types::Type;

    fn var(name: &str, ty: Type) -> Symbol {
        Symbol::variable(name, ty, Span::default())
    }

    #[test]
    fn test_declare_rejects_duplicates_in_same_scope() {
        let mut tree = ScopeTree::new();
        let root = tree.root();

        assert!(tree.declare(root, var("x", Type::Integer)).is_ok());
        assert_eq!(
            tree.declare(root, var("x", Type::String)),
            Err(ScopeError::Duplicate("x".into()))
        );
        assert_eq!(tree.resolve(root, "x").map(|s| &s.ty), Some(&Type::Integer));
    }

    #[test]
    fn test_shadowing_and_exit() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        tree.declare(root, var("x", Type::Integer)).unwrap();

        let inner = tree.enter(root, ScopeKind::Block);
        assert!(tree.declare(inner, var("x", Type::String)).is_ok());
        assert!(tree.exists_local(inner, "x"));
        assert_eq!(tree.resolve(inner, "x").map(|s| &s.ty), Some(&Type::String));

        let back = tree.exit(inner);
        assert_eq!(back, root);
        assert_eq!(tree.resolve(back, "x").map(|s| &s.ty), Some(&Type::Integer));
    }

    #[test]
    fn test_visibility_walks_ancestors_only() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        let a = tree.enter(root, ScopeKind::Block);
        let b = tree.enter(root, ScopeKind::Block);
        tree.declare(a, var("only_a", Type::Boolean)).unwrap();

        assert!(tree.exists_visible(a, "only_a"));
        assert!(!tree.exists_visible(b, "only_a"));
        assert!(!tree.exists_local(root, "only_a"));
        assert_eq!(tree.get(root).children(), &[a, b]);
        assert_eq!(tree.depth(b), 1);
    }

    #[test]
    fn test_flatten_prefers_nearest() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        tree.declare(root, var("x", Type::Integer)).unwrap();
        tree.declare(root, var("y", Type::Integer)).unwrap();
        let inner = tree.enter(root, ScopeKind::Block);
        tree.declare(inner, var("x", Type::String)).unwrap();

        let flat: Vec<(&str, &Type)> = tree
            .flatten(inner)
            .into_iter()
            .map(|s| (s.name.as_str(), &s.ty))
            .collect();
        assert_eq!(flat, vec![("x", &Type::String), ("y", &Type::Integer)]);
    }

    #[test]
    fn test_resolve_mut_updates_declaring_scope() {
        let mut tree = ScopeTree::new();
        let root = tree.root();
        tree.declare(root, var("x", Type::Unknown)).unwrap();
        let inner = tree.enter(root, ScopeKind::Loop);

        if let Some(symbol) = tree.resolve_mut(inner, "x") {
            symbol.ty = Type::Integer;
        }
        assert_eq!(tree.lookup_local(root, "x").map(|s| &s.ty), Some(&Type::Integer));
    }
}
