use crate::language::{ast::TypePath, span::Span};
use std::fmt;

/// Declared type as written in a field list or parameter record.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeExpr {
    Number,
    String,
    Boolean,
    Nil,
    Any,
    Named(TypePath),
    List(Box<TypeExpr>),
    Record(Vec<FieldType>),
    Union(Vec<TypeExpr>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldType {
    pub name: String,
    pub ty: TypeExpr,
    pub span: Span,
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named(TypePath::single(name, Span::default()))
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Number => write!(f, "number"),
            TypeExpr::String => write!(f, "string"),
            TypeExpr::Boolean => write!(f, "boolean"),
            TypeExpr::Nil => write!(f, "nil"),
            TypeExpr::Any => write!(f, "any"),
            TypeExpr::Named(path) => write!(f, "{path}"),
            TypeExpr::List(inner) => write!(f, "[{inner}]"),
            TypeExpr::Record(fields) => {
                write!(f, "(")?;
                for (idx, field) in fields.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.ty)?;
                }
                write!(f, ")")
            }
            TypeExpr::Union(alternatives) => {
                for (idx, alt) in alternatives.iter().enumerate() {
                    if idx > 0 {
                        write!(f, " | ")?;
                    }
                    write!(f, "{alt}")?;
                }
                Ok(())
            }
        }
    }
}
