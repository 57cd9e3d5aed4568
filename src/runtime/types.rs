use crate::language::{ast::TypePath, span::Span, types::TypeExpr};
use crate::runtime::{
    context::{TypeEntry, TypeRegistry},
    error::{RuntimeError, RuntimeResult},
    value::{RecordInstance, Value},
};
use indexmap::IndexMap;
use std::fmt;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimitiveType {
    Number,
    String,
    Boolean,
    Nil,
    Any,
}

/// The evaluator's own view of a declared type.
///
/// Identifier references stay unresolved until a value is checked against
/// them, so a class may mention itself or a class defined later.
#[derive(Clone, Debug, PartialEq)]
pub enum RuntimeType {
    Primitive(PrimitiveType),
    Reference(TypePath),
    Record(RecordShape),
    List(Box<RuntimeType>),
    Union(Vec<RuntimeType>),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordShape {
    pub fields: IndexMap<String, RuntimeType>,
}

impl RuntimeType {
    pub fn from_type_expr(expr: &TypeExpr) -> Self {
        match expr {
            TypeExpr::Number => RuntimeType::Primitive(PrimitiveType::Number),
            TypeExpr::String => RuntimeType::Primitive(PrimitiveType::String),
            TypeExpr::Boolean => RuntimeType::Primitive(PrimitiveType::Boolean),
            TypeExpr::Nil => RuntimeType::Primitive(PrimitiveType::Nil),
            TypeExpr::Any => RuntimeType::Primitive(PrimitiveType::Any),
            TypeExpr::Named(path) => RuntimeType::Reference(path.clone()),
            TypeExpr::List(inner) => RuntimeType::List(Box::new(Self::from_type_expr(inner))),
            TypeExpr::Record(fields) => RuntimeType::Record(RecordShape {
                fields: fields
                    .iter()
                    .map(|field| (field.name.clone(), Self::from_type_expr(&field.ty)))
                    .collect(),
            }),
            TypeExpr::Union(alternatives) => {
                RuntimeType::Union(alternatives.iter().map(Self::from_type_expr).collect())
            }
        }
    }

    /// Whether `value` conforms to this type. Errors only when a referenced
    /// type cannot be resolved.
    pub fn accepts(&self, value: &Value, types: &TypeRegistry) -> RuntimeResult<bool> {
        match self {
            RuntimeType::Primitive(primitive) => Ok(matches!(
                (primitive, value),
                (PrimitiveType::Any, _)
                    | (PrimitiveType::Number, Value::Number(_))
                    | (PrimitiveType::String, Value::String(_))
                    | (PrimitiveType::Boolean, Value::Boolean(_))
                    | (PrimitiveType::Nil, Value::Nil)
            )),
            RuntimeType::Reference(path) => {
                let Value::NamedRecord(instance) = value else {
                    return Ok(false);
                };
                Ok(match types.resolve(path)? {
                    TypeEntry::Klass(klass) => Rc::ptr_eq(&klass, &instance.klass),
                    TypeEntry::Group(group) => group.contains(&instance.klass),
                })
            }
            RuntimeType::Record(shape) => {
                let Value::Record(record) = value else {
                    return Ok(false);
                };
                shape.accepts(record, types)
            }
            RuntimeType::List(inner) => {
                let Value::List(list) = value else {
                    return Ok(false);
                };
                for item in list.items.borrow().iter() {
                    if !inner.accepts(item, types)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            RuntimeType::Union(alternatives) => {
                for alternative in alternatives {
                    if alternative.accepts(value, types)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }
}

impl RecordShape {
    pub fn from_fields<'a, I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a TypeExpr)>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(name, ty)| (name.to_string(), RuntimeType::from_type_expr(ty)))
                .collect(),
        }
    }

    fn accepts(&self, record: &RecordInstance, types: &TypeRegistry) -> RuntimeResult<bool> {
        let fields = record.fields.borrow();
        if fields.len() != self.fields.len() {
            return Ok(false);
        }
        for (name, ty) in &self.fields {
            match fields.get(name) {
                Some(value) if ty.accepts(value, types)? => {}
                _ => return Ok(false),
            }
        }
        Ok(true)
    }
}

/// Validates `record` against `shape`: the key sets must be equal and every
/// field value must conform to its declared type.
///
/// Declared keys are consumed in declaration order, so the first absent key is
/// the one reported; any instance keys left over are unexpected.
pub fn check_record_type(
    record: &RecordInstance,
    shape: &RecordShape,
    owner: &str,
    types: &TypeRegistry,
    span: Option<Span>,
) -> RuntimeResult<()> {
    let mut remaining = record.field_names();
    for name in shape.fields.keys() {
        match remaining.iter().position(|key| key == name) {
            Some(index) => {
                remaining.remove(index);
            }
            None => {
                return Err(RuntimeError::MissingField {
                    owner: owner.to_string(),
                    field: name.clone(),
                    span,
                });
            }
        }
    }
    if let Some(extra) = remaining.into_iter().next() {
        return Err(RuntimeError::UnexpectedField {
            owner: owner.to_string(),
            field: extra,
            span,
        });
    }
    for (name, ty) in &shape.fields {
        let Some(value) = record.get_field(name) else {
            continue;
        };
        if !ty.accepts(&value, types)? {
            return Err(RuntimeError::TypeMismatch {
                context: format!("field `{owner}.{name}`"),
                expected: ty.to_string(),
                found: value.type_name().to_string(),
                span,
            });
        }
    }
    Ok(())
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveType::Number => "number",
            PrimitiveType::String => "string",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Nil => "nil",
            PrimitiveType::Any => "any",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeType::Primitive(primitive) => write!(f, "{primitive}"),
            RuntimeType::Reference(path) => write!(f, "{path}"),
            RuntimeType::Record(shape) => write!(f, "{shape}"),
            RuntimeType::List(inner) => write!(f, "[{inner}]"),
            RuntimeType::Union(alternatives) => {
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

impl fmt::Display for RecordShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (idx, (name, ty)) in self.fields.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {ty}")?;
        }
        write!(f, ")")
    }
}
