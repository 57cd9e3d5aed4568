use crate::language::{
    ast::{BinaryOp, UnaryOp},
    span::Span,
};
use crate::runtime::{
    error::{RuntimeError, RuntimeResult},
    value::Value,
};

pub fn eval_binary(op: BinaryOp, left: Value, right: Value, span: Span) -> RuntimeResult<Value> {
    let at = Some(span);
    match op {
        BinaryOp::Add => {
            if let Value::String(lhs) = &left {
                let rhs = right.expect_string(at)?;
                return Ok(Value::String(format!("{lhs}{rhs}")));
            }
            eval_numeric(&left, &right, at, |a, b| a + b)
        }
        BinaryOp::Sub => eval_numeric(&left, &right, at, |a, b| a - b),
        BinaryOp::Mul => eval_numeric(&left, &right, at, |a, b| a * b),
        BinaryOp::Div => eval_numeric(&left, &right, at, |a, b| a / b),
        BinaryOp::Pow => eval_numeric(&left, &right, at, f64::powf),
        BinaryOp::Eq => Ok(Value::Boolean(left.structural_eq(&right))),
        BinaryOp::NotEq => Ok(Value::Boolean(!left.structural_eq(&right))),
        BinaryOp::Lt => eval_compare(&left, &right, at, |o| o.is_lt()),
        BinaryOp::LtEq => eval_compare(&left, &right, at, |o| o.is_le()),
        BinaryOp::Gt => eval_compare(&left, &right, at, |o| o.is_gt()),
        BinaryOp::GtEq => eval_compare(&left, &right, at, |o| o.is_ge()),
    }
}

fn eval_numeric<F>(left: &Value, right: &Value, at: Option<Span>, apply: F) -> RuntimeResult<Value>
where
    F: Fn(f64, f64) -> f64,
{
    let a = left.expect_number(at)?;
    let b = right.expect_number(at)?;
    Ok(Value::Number(apply(a, b)))
}

fn eval_compare<F>(left: &Value, right: &Value, at: Option<Span>, cmp: F) -> RuntimeResult<Value>
where
    F: Fn(std::cmp::Ordering) -> bool,
{
    let ordering = match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => {
            let a = left.expect_number(at)?;
            let b = right.expect_number(at)?;
            a.partial_cmp(&b)
        }
    };
    // NaN compares false against everything.
    Ok(Value::Boolean(ordering.is_some_and(cmp)))
}

pub fn eval_unary(op: UnaryOp, value: Value, span: Span) -> RuntimeResult<Value> {
    let at = Some(span);
    match op {
        UnaryOp::Neg => Ok(Value::Number(-value.expect_number(at)?)),
        UnaryOp::Not => Ok(Value::Boolean(!value.expect_boolean(at)?)),
        UnaryOp::Factorial => factorial(value.expect_number(at)?, at).map(Value::Number),
    }
}

pub fn factorial(n: f64, span: Option<Span>) -> RuntimeResult<f64> {
    if n < 0.0 || n.fract() != 0.0 || !n.is_finite() {
        return Err(RuntimeError::InvalidFactorial { value: n, span });
    }
    let mut product: f64 = 1.0;
    let mut k = 2.0;
    // Past 170! the product is infinite, and past 2^53 `k += 1.0` stalls.
    while k <= n && product.is_finite() {
        product *= k;
        k += 1.0;
    }
    Ok(product)
}
