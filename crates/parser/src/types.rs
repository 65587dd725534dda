//! The Helio type model.

use std::fmt;

/// A resolved Helio type.
///
/// `List(None)` is a list whose element type is unknown, produced by empty
/// and mixed-element list literals. The distinguished `MathObject` is carried
/// only by the built-in `Math` binding.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Int,
    Float,
    Str,
    Bool,
    List(Option<Box<Type>>),
    Void,
    MathObject,
}

impl Type {
    pub fn list_of(element: Type) -> Self {
        Type::List(Some(Box::new(element)))
    }

    pub fn unknown_list() -> Self {
        Type::List(None)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }

    /// Whether a value of type `actual` is acceptable where `self` is
    /// expected. Kinds must match exactly, lists recurse on the element type
    /// (an unknown element on either side is accepted), and `float` accepts
    /// `int`. No other implicit conversion exists.
    pub fn accepts(&self, actual: &Type) -> bool {
        match (self, actual) {
            (Type::Int, Type::Int)
            | (Type::Float, Type::Float)
            | (Type::Str, Type::Str)
            | (Type::Bool, Type::Bool)
            | (Type::Void, Type::Void)
            | (Type::MathObject, Type::MathObject) => true,
            (Type::List(expected), Type::List(actual)) => match (expected, actual) {
                (Some(expected), Some(actual)) => expected.accepts(actual),
                _ => true,
            },
            (Type::Float, Type::Int) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::Str => write!(f, "string"),
            Type::Bool => write!(f, "bool"),
            Type::List(Some(element)) => write!(f, "list<{element}>"),
            Type::List(None) => write!(f, "list<unknown>"),
            Type::Void => write!(f, "void"),
            Type::MathObject => write!(f, "mathobject"),
        }
    }
}
