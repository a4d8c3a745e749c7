//! Type annotations as written in source

use crate::common::Span;
use std::fmt;

/// Annotation such as `integer`, `Perro` or `string[][]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAnnotation {
    /// Base name, either a built-in type keyword or a class name
    pub name: String,
    /// Number of trailing `[]` pairs
    pub dimensions: usize,
    pub span: Span,
}

impl TypeAnnotation {
    pub fn new(name: impl Into<String>, dimensions: usize, span: Span) -> Self {
        Self {
            name: name.into(),
            dimensions,
            span,
        }
    }
}

impl fmt::Display for TypeAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for _ in 0..self.dimensions {
            write!(f, "[]")?;
        }
        Ok(())
    }
}
