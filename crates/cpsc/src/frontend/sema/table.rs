//! Symbol table produced by an analysis run

use super::scope::{Scope, ScopeId, ScopeTree};
use super::symbol::{Symbol, SymbolKind};
use std::fmt;

/// Read-only view over every scope the analysis opened
#[derive(Debug, Clone)]
pub struct SymbolTable {
    scopes: ScopeTree,
}

impl SymbolTable {
    pub fn new(scopes: ScopeTree) -> Self {
        Self { scopes }
    }

    /// Resolve `name` from the global scope
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.scopes.resolve(self.scopes.root(), name)
    }

    /// Resolve `name` as seen from `scope`
    pub fn resolve_in(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        self.scopes.resolve(scope, name)
    }

    pub fn global_symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.scopes.get(self.scopes.root()).symbols().iter()
    }

    /// Visible symbols from `scope`, root first
    pub fn flatten(&self, scope: ScopeId) -> Vec<&Symbol> {
        self.scopes.flatten(scope)
    }

    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    /// Every declaration of `name`, in scope creation order
    pub fn find_all(&self, name: &str) -> Vec<&Symbol> {
        self.scopes
            .iter()
            .filter_map(|(_, scope)| scope.symbols().get(name))
            .collect()
    }

    /// Per-scope tree, one indented header per scope
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Global symbols, one line each
    pub fn render_flat(&self) -> String {
        Globals(self).to_string()
    }

    fn fmt_scope(&self, f: &mut fmt::Formatter<'_>, id: ScopeId) -> fmt::Result {
        let scope: &Scope = self.scopes.get(id);
        let indent = "  ".repeat(self.scopes.depth(id));
        writeln!(f, "{indent}[{}] {}", id.index(), scope.kind)?;

        for symbol in scope.symbols().iter() {
            writeln!(f, "{indent}  {}", Describe(symbol))?;
            if let SymbolKind::Class(info) = &symbol.kind {
                for member in info.members.iter() {
                    writeln!(f, "{indent}    .{}", Describe(member))?;
                }
            }
        }

        for &child in scope.children() {
            self.fmt_scope(f, child)?;
        }
        Ok(())
    }
}

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_scope(f, self.scopes.root())
    }
}

/// Flat listing of the global scope
struct Globals<'a>(&'a SymbolTable);

impl fmt::Display for Globals<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in self.0.global_symbols() {
            writeln!(f, "{}", Describe(symbol))?;
        }
        Ok(())
    }
}

/// One-line summary such as `variable x: integer (1:4)`
struct Describe<'a>(&'a Symbol);

impl fmt::Display for Describe<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = self.0;
        write!(
            f,
            "{} {}: {} ({})",
            symbol.kind_name(),
            symbol.name,
            symbol.ty,
            symbol.declared_at
        )?;

        match &symbol.kind {
            SymbolKind::Function(info) => {
                let params: Vec<String> = info.params.iter().map(|p| format!("{}: {}", p.name, p.ty)).collect();
                write!(f, " params=[{}]", params.join(", "))?;
                if info.is_constructor {
                    f.write_str(" constructor")?;
                }
                if let Some(outer) = &info.enclosing_function {
                    write!(f, " anidada en {outer}")?;
                }
                if !info.captured.is_empty() {
                    let captured: Vec<&str> = info.captured.iter().map(String::as_str).collect();
                    write!(f, " captura=[{}]", captured.join(", "))?;
                }
            }
            SymbolKind::Class(info) => {
                if let Some(superclass) = &info.superclass {
                    write!(f, " hereda de {superclass}")?;
                }
            }
            SymbolKind::Variable | SymbolKind::Constant => {
                if !symbol.initialized {
                    f.write_str(" sin inicializar")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::analyze_src;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_per_scope_tree() {
        let analysis = analyze_src("let x: integer = 1;\nfunction f(a: integer) { let y = a; }");
        assert_eq!(
            analysis.symbols.render(),
            "[0] global\n\
             \x20 variable x: integer (1:0)\n\
             \x20 función f: void (2:0) params=[a: integer]\n\
             \x20 [1] función f\n\
             \x20   variable a: integer (2:11)\n\
             \x20   variable y: integer (2:25)\n"
        );
    }

    #[test]
    fn test_render_flat_lists_globals() {
        let analysis = analyze_src("class A { var n: string; }\nconst K: integer = 2;");
        assert_eq!(
            analysis.symbols.render_flat(),
            "clase A: A (1:0)\nconstante K: integer (2:0)\n"
        );
    }

    #[test]
    fn test_exited_scopes_stay_queryable() {
        let analysis = analyze_src("{ let a = 1; } { let a = \"x\"; }");
        assert!(analysis.symbols.lookup("a").is_none());
        assert_eq!(analysis.symbols.find_all("a").len(), 2);
        assert_eq!(analysis.symbols.scopes().len(), 3);
    }

    #[test]
    fn test_resolve_in_sees_enclosing_scopes() {
        let analysis = analyze_src("let x = 1; function f(a: integer) { let y = a; }");
        let (body, _) = analysis.symbols.scopes().iter().nth(1).unwrap();

        assert_eq!(analysis.symbols.resolve_in(body, "y").map(|s| &s.name), Some(&"y".to_string()));
        assert!(analysis.symbols.resolve_in(body, "x").is_some());
        assert!(analysis.symbols.lookup("y").is_none());

        let globals: Vec<&str> = analysis.symbols.global_symbols().map(|s| s.name.as_str()).collect();
        assert_eq!(globals, vec!["x", "f"]);

        let visible: Vec<&str> = analysis.symbols.flatten(body).iter().map(|s| s.name.as_str()).collect();
        assert_eq!(visible, vec!["x", "f", "a", "y"]);
    }
}
