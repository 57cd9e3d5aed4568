use crate::language::{
    ast::{AnonymousFunctionDef, MatchFunctionDef},
    span::Span,
};
use crate::runtime::{
    environment::CapturedScope,
    error::{RuntimeError, RuntimeResult},
    klass::{NamedRecordGroup, NamedRecordKlass},
    types::RecordShape,
};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Clone, Debug)]
pub enum Value {
    Number(f64),
    String(String),
    Boolean(bool),
    Nil,
    List(ListValue),
    Record(RecordInstance),
    NamedRecord(NamedRecordInstance),
    Klass(Rc<NamedRecordKlass>),
    Group(Rc<NamedRecordGroup>),
    MatchFunction(Rc<MatchFunctionInstance>),
    AnonymousFunction(Rc<AnonymousFunctionInstance>),
    Native(Rc<NativeFunction>),
}

impl Value {
    pub fn string(value: impl Into<String>) -> Self {
        Value::String(value.into())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::Nil => "nil",
            Value::List(_) => "list",
            Value::Record(_) => "record",
            Value::NamedRecord(_) => "named record",
            Value::Klass(_) => "class",
            Value::Group(_) => "group",
            Value::MatchFunction(_) => "match function",
            Value::AnonymousFunction(_) => "function",
            Value::Native(_) => "native function",
        }
    }

    pub fn expect_number(&self, span: Option<Span>) -> RuntimeResult<f64> {
        match self {
            Value::Number(n) => Ok(*n),
            other => Err(other.expectation("number", span)),
        }
    }

    pub fn expect_string(&self, span: Option<Span>) -> RuntimeResult<&str> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(other.expectation("string", span)),
        }
    }

    pub fn expect_boolean(&self, span: Option<Span>) -> RuntimeResult<bool> {
        match self {
            Value::Boolean(b) => Ok(*b),
            other => Err(other.expectation("boolean", span)),
        }
    }

    pub fn expect_record(&self, span: Option<Span>) -> RuntimeResult<&RecordInstance> {
        match self {
            Value::Record(record) => Ok(record),
            other => Err(other.expectation("record", span)),
        }
    }

    pub fn expect_list(&self, span: Option<Span>) -> RuntimeResult<&ListValue> {
        match self {
            Value::List(list) => Ok(list),
            other => Err(other.expectation("list", span)),
        }
    }

    fn expectation(&self, expected: &'static str, span: Option<Span>) -> RuntimeError {
        RuntimeError::ExpectedValue {
            expected,
            found: self.type_name(),
            span,
        }
    }

    /// Structural equality. Callables, classes and groups compare by identity.
    pub fn structural_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::List(a), Value::List(b)) => {
                if Rc::ptr_eq(&a.items, &b.items) {
                    return true;
                }
                let (a, b) = (a.items.borrow(), b.items.borrow());
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.structural_eq(y))
            }
            (Value::Record(a), Value::Record(b)) => a.structural_eq(b),
            (Value::NamedRecord(a), Value::NamedRecord(b)) => {
                Rc::ptr_eq(&a.klass, &b.klass) && a.record.structural_eq(&b.record)
            }
            (Value::Klass(a), Value::Klass(b)) => Rc::ptr_eq(a, b),
            (Value::Group(a), Value::Group(b)) => Rc::ptr_eq(a, b),
            (Value::MatchFunction(a), Value::MatchFunction(b)) => Rc::ptr_eq(a, b),
            (Value::AnonymousFunction(a), Value::AnonymousFunction(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s:?}"),
            other => write!(f, "{other}"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "{s}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Nil => write!(f, "nil"),
            Value::List(list) => {
                write!(f, "[")?;
                for (idx, item) in list.items.borrow().iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    item.fmt_nested(f)?;
                }
                write!(f, "]")
            }
            Value::Record(record) => write!(f, "{record}"),
            Value::NamedRecord(instance) => {
                write!(f, "{}{}", instance.klass.display_name(), instance.record)
            }
            Value::Klass(klass) => write!(f, "<class {}>", klass.display_name()),
            Value::Group(group) => write!(f, "<group {}>", group.name),
            Value::MatchFunction(func) => write!(f, "<match function {}>", func.def.name),
            Value::AnonymousFunction(_) => write!(f, "<function>"),
            Value::Native(native) => write!(f, "<native {}>", native.name),
        }
    }
}

pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Lists are shared by reference: cloning the value aliases the same storage.
#[derive(Clone, Debug, Default)]
pub struct ListValue {
    pub items: Rc<RefCell<Vec<Value>>>,
}

impl ListValue {
    pub fn from_vec(items: Vec<Value>) -> Self {
        Self {
            items: Rc::new(RefCell::new(items)),
        }
    }

    pub fn push(&self, value: Value) {
        self.items.borrow_mut().push(value);
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.items.borrow().get(index).cloned()
    }
}

/// Anonymous record. Field order is insertion order; it matters for display only.
#[derive(Clone, Debug, Default)]
pub struct RecordInstance {
    pub fields: Rc<RefCell<IndexMap<String, Value>>>,
}

impl RecordInstance {
    pub fn new(fields: IndexMap<String, Value>) -> Self {
        Self {
            fields: Rc::new(RefCell::new(fields)),
        }
    }

    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::new(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn get_field(&self, field: &str) -> Option<Value> {
        self.fields.borrow().get(field).cloned()
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields.borrow().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.fields.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.borrow().is_empty()
    }

    fn structural_eq(&self, other: &RecordInstance) -> bool {
        if Rc::ptr_eq(&self.fields, &other.fields) {
            return true;
        }
        let (a, b) = (self.fields.borrow(), other.fields.borrow());
        a.len() == b.len()
            && a.iter()
                .all(|(key, value)| b.get(key).is_some_and(|o| value.structural_eq(o)))
    }
}

impl fmt::Display for RecordInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (idx, (name, value)) in self.fields.borrow().iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: ")?;
            value.fmt_nested(f)?;
        }
        write!(f, ")")
    }
}

#[derive(Clone, Debug)]
pub struct NamedRecordInstance {
    pub klass: Rc<NamedRecordKlass>,
    pub record: RecordInstance,
}

impl NamedRecordInstance {
    pub fn get_field(&self, field: &str) -> Option<Value> {
        self.record.get_field(field)
    }
}

#[derive(Debug)]
pub struct MatchFunctionInstance {
    pub def: Rc<MatchFunctionDef>,
    pub scope: CapturedScope,
}

#[derive(Debug)]
pub struct AnonymousFunctionInstance {
    pub def: Rc<AnonymousFunctionDef>,
    pub params: RecordShape,
    pub scope: CapturedScope,
}

pub type NativeFn = fn(&Value, Option<Span>) -> RuntimeResult<Value>;

pub struct NativeFunction {
    pub name: &'static str,
    pub func: NativeFn,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.name)
    }
}
