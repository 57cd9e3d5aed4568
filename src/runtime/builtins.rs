use crate::language::span::Span;
use crate::runtime::{
    error::{RuntimeError, RuntimeResult},
    value::{NativeFn, NativeFunction, Value},
};
use std::collections::HashMap;
use std::rc::Rc;

const NATIVES: &[(&str, NativeFn)] = &[
    ("length", length),
    ("toString", to_string),
    ("push", push),
    ("floor", floor),
];

/// Bindings installed in the global frame before a program runs.
pub fn prelude() -> HashMap<String, Value> {
    NATIVES
        .iter()
        .map(|&(name, func)| {
            let native = NativeFunction { name, func };
            (name.to_string(), Value::Native(Rc::new(native)))
        })
        .collect()
}

fn length(arg: &Value, span: Option<Span>) -> RuntimeResult<Value> {
    match arg {
        Value::List(list) => Ok(Value::Number(list.len() as f64)),
        Value::String(s) => Ok(Value::Number(s.chars().count() as f64)),
        other => Err(RuntimeError::TypeMismatch {
            context: "`length` argument".into(),
            expected: "list | string".into(),
            found: other.type_name().into(),
            span,
        }),
    }
}

fn to_string(arg: &Value, _span: Option<Span>) -> RuntimeResult<Value> {
    Ok(Value::String(arg.to_string()))
}

/// Appends in place; every alias of the list observes the new item.
fn push(arg: &Value, span: Option<Span>) -> RuntimeResult<Value> {
    let record = arg.expect_record(span)?;
    let list = record
        .get_field("list")
        .ok_or_else(|| RuntimeError::MissingField {
            owner: "push".into(),
            field: "list".into(),
            span,
        })?;
    let item = record
        .get_field("item")
        .ok_or_else(|| RuntimeError::MissingField {
            owner: "push".into(),
            field: "item".into(),
            span,
        })?;
    let list = list.expect_list(span)?;
    list.push(item);
    Ok(Value::List(list.clone()))
}

fn floor(arg: &Value, span: Option<Span>) -> RuntimeResult<Value> {
    Ok(Value::Number(arg.expect_number(span)?.floor()))
}
