//! Static types of Compiscript values

use crate::frontend::ast::TypeAnnotation;
use std::fmt;

/// Closed set of types the checker reasons about
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Integer,
    String,
    Boolean,
    Null,
    Void,
    Array(Box<Type>),
    Class(String),
    /// Not known statically; compatible with everything
    Unknown,
    /// Result of an expression that already produced a diagnostic
    Error,
}

impl Type {
    pub fn array_of(element: Type) -> Type {
        Type::Array(Box::new(element))
    }

    /// Resolve a written annotation; any non-builtin name is a class
    pub fn from_annotation(annotation: &TypeAnnotation) -> Type {
        let base = match annotation.name.as_str() {
            "integer" => Type::Integer,
            "string" => Type::String,
            "boolean" => Type::Boolean,
            "void" => Type::Void,
            name => Type::Class(name.to_string()),
        };
        (0..annotation.dimensions).fold(base, |inner, _| Type::array_of(inner))
    }

    /// `Unknown` and `Error` suppress follow-up diagnostics
    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown | Type::Error)
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Integer)
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Type::Boolean)
    }

    /// Only integers and strings support `<`, `>`, `<=`, `>=`
    pub fn is_orderable(&self) -> bool {
        matches!(self, Type::Integer | Type::String)
    }

    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::Array(element) => Some(element),
            _ => None,
        }
    }

    pub fn class_name(&self) -> Option<&str> {
        match self {
            Type::Class(name) => Some(name),
            _ => None,
        }
    }

    /// Whether a value of type `actual` may stand where `self` is expected
    ///
    /// Arrays compare element-wise so `[]` (`Array(Unknown)`) fits any array.
    pub fn accepts(&self, actual: &Type) -> bool {
        if self.is_unknown() || actual.is_unknown() {
            return true;
        }
        match (self, actual) {
            (Type::Array(expected), Type::Array(found)) => expected.accepts(found),
            _ => self == actual,
        }
    }

    /// Like [`Type::accepts`], but `null` is assignable to anything
    pub fn accepts_assignment(&self, actual: &Type) -> bool {
        matches!(actual, Type::Null) || self.accepts(actual)
    }

    /// Operands of `==`/`!=` must agree unless one of them is `null`
    pub fn comparable_with(&self, other: &Type) -> bool {
        matches!(self, Type::Null) || matches!(other, Type::Null) || self.accepts(other)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Integer => write!(f, "integer"),
            Type::String => write!(f, "string"),
            Type::Boolean => write!(f, "boolean"),
            Type::Null => write!(f, "null"),
            Type::Void => write!(f, "void"),
            Type::Array(element) => write!(f, "{element}[]"),
            Type::Class(name) => write!(f, "{name}"),
            Type::Unknown => write!(f, "desconocido"),
            Type::Error => write!(f, "ERROR"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Span;

    #[test]
    fn test_from_annotation() {
        let ann = TypeAnnotation::new("integer", 2, Span::default());
        assert_eq!(Type::from_annotation(&ann), Type::array_of(Type::array_of(Type::Integer)));

        let ann = TypeAnnotation::new("Perro", 0, Span::default());
        assert_eq!(Type::from_annotation(&ann), Type::Class("Perro".into()));
    }

    #[test]
    fn test_display() {
        assert_eq!(Type::array_of(Type::String).to_string(), "string[]");
        assert_eq!(Type::Class("Animal".into()).to_string(), "Animal");
        assert_eq!(Type::Unknown.to_string(), "desconocido");
    }

    #[test]
    fn test_compatibility() {
        let ints = Type::array_of(Type::Integer);
        assert!(ints.accepts(&Type::array_of(Type::Unknown)));
        assert!(!ints.accepts(&Type::array_of(Type::String)));
        assert!(Type::Integer.accepts(&Type::Error));
        assert!(!Type::Integer.accepts(&Type::Null));
        assert!(Type::Integer.accepts_assignment(&Type::Null));
        assert!(Type::Class("A".into()).comparable_with(&Type::Null));
        assert!(!Type::Integer.comparable_with(&Type::String));
    }
}
