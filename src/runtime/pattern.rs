use crate::language::ast::{CallArgs, Expr, Literal, MatchArm, RecordField};
use crate::runtime::{
    context::TypeRegistry,
    error::{RuntimeError, RuntimeResult},
    value::{RecordInstance, Value},
};
use std::collections::HashSet;
use std::rc::Rc;

const WILDCARD: &str = "_";

pub type Bindings = Vec<(String, Value)>;

#[derive(Debug)]
pub enum MatchResult {
    NoMatch,
    Match(Bindings),
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Match(_))
    }
}

/// Matches `value` against `pattern`.
///
/// The pattern is validated as a whole before any value is inspected, so a
/// malformed pattern raises even when an earlier sub-pattern would have
/// failed. Bindings are only returned for a complete match.
pub fn do_match(value: &Value, pattern: &Expr, types: &TypeRegistry) -> RuntimeResult<MatchResult> {
    validate(pattern, &mut HashSet::new())?;
    let mut bindings = Vec::new();
    if match_into(value, pattern, types, &mut bindings)? {
        Ok(MatchResult::Match(bindings))
    } else {
        Ok(MatchResult::NoMatch)
    }
}

/// First arm, in source order, whose pattern matches. No backtracking.
pub fn select_arm<'a>(
    value: &Value,
    arms: &'a [MatchArm],
    types: &TypeRegistry,
) -> RuntimeResult<Option<(&'a MatchArm, Bindings)>> {
    for (index, arm) in arms.iter().enumerate() {
        if let MatchResult::Match(bindings) = do_match(value, &arm.pattern, types)? {
            tracing::debug!(arm = index, bindings = bindings.len(), "match arm selected");
            return Ok(Some((arm, bindings)));
        }
    }
    Ok(None)
}

fn validate<'p>(pattern: &'p Expr, seen: &mut HashSet<&'p str>) -> RuntimeResult<()> {
    match pattern {
        Expr::Identifier(ident) => {
            if ident.name != WILDCARD && !seen.insert(ident.name.as_str()) {
                return Err(RuntimeError::DuplicateBinding {
                    name: ident.name.clone(),
                    span: Some(ident.span),
                });
            }
            Ok(())
        }
        Expr::Literal(_) => Ok(()),
        Expr::Record { fields, .. } => validate_fields(fields, seen),
        Expr::Call {
            callee,
            args: CallArgs::Named(fields),
            ..
        } if matches!(callee.as_ref(), Expr::TypeRef(_)) => validate_fields(fields, seen),
        other => Err(RuntimeError::MalformedPattern {
            kind: other.kind_name(),
            span: Some(other.span()),
        }),
    }
}

fn validate_fields<'p>(fields: &'p [RecordField], seen: &mut HashSet<&'p str>) -> RuntimeResult<()> {
    fields
        .iter()
        .try_for_each(|field| validate(&field.value, seen))
}

fn match_into(
    value: &Value,
    pattern: &Expr,
    types: &TypeRegistry,
    bindings: &mut Bindings,
) -> RuntimeResult<bool> {
    match pattern {
        Expr::Identifier(ident) => {
            if ident.name != WILDCARD {
                bindings.push((ident.name.clone(), value.clone()));
            }
            Ok(true)
        }
        Expr::Literal(literal) => Ok(match (literal, value) {
            (Literal::Number(expected, _), Value::Number(actual)) => expected == actual,
            (Literal::String(expected, _), Value::String(actual)) => expected == actual,
            (Literal::Boolean(expected, _), Value::Boolean(actual)) => expected == actual,
            (Literal::Null(_), Value::Nil) => true,
            _ => false,
        }),
        Expr::Record { fields, .. } => match value {
            Value::Record(record) => match_record(record, fields, types, bindings),
            _ => Ok(false),
        },
        Expr::Call {
            callee,
            args: CallArgs::Named(fields),
            ..
        } => {
            let Expr::TypeRef(path) = callee.as_ref() else {
                return Err(malformed(pattern));
            };
            let klass = types.resolve_klass(path)?;
            match value {
                Value::NamedRecord(instance) if Rc::ptr_eq(&instance.klass, &klass) => {
                    match_record(&instance.record, fields, types, bindings)
                }
                _ => Ok(false),
            }
        }
        other => Err(malformed(other)),
    }
}

/// Pattern fields must be a subset of the instance's fields; extra instance
/// fields are ignored.
fn match_record(
    record: &RecordInstance,
    fields: &[RecordField],
    types: &TypeRegistry,
    bindings: &mut Bindings,
) -> RuntimeResult<bool> {
    for field in fields {
        let Some(field_value) = record.get_field(&field.name) else {
            return Ok(false);
        };
        if !match_into(&field_value, &field.value, types, bindings)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn malformed(pattern: &Expr) -> RuntimeError {
    RuntimeError::MalformedPattern {
        kind: pattern.kind_name(),
        span: Some(pattern.span()),
    }
}
