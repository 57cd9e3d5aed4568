use crate::language::span::Span;
use thiserror::Error;

pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum RuntimeError {
    #[error("Unresolved identifier `{name}`")]
    UnresolvedIdentifier { name: String, span: Option<Span> },
    #[error("{message}")]
    Unresolved { message: String, span: Option<Span> },
    #[error("Unknown type `{name}`")]
    UnknownType { name: String, span: Option<Span> },
    #[error("`{name}` is a class, not a group")]
    NotAGroup { name: String, span: Option<Span> },
    #[error("Group `{group}` has no variant `{variant}`")]
    UnknownVariant {
        group: String,
        variant: String,
        span: Option<Span>,
    },
    #[error("Expected a {expected} but found {found}")]
    ExpectedValue {
        expected: &'static str,
        found: &'static str,
        span: Option<Span>,
    },
    #[error("Type mismatch in {context}: expected {expected}, found {found}")]
    TypeMismatch {
        context: String,
        expected: String,
        found: String,
        span: Option<Span>,
    },
    #[error("`{owner}` is missing field `{field}`")]
    MissingField {
        owner: String,
        field: String,
        span: Option<Span>,
    },
    #[error("`{owner}` does not declare field `{field}`")]
    UnexpectedField {
        owner: String,
        field: String,
        span: Option<Span>,
    },
    #[error("{found} has no field `{field}`")]
    UnknownField {
        field: String,
        found: String,
        span: Option<Span>,
    },
    #[error("No match arm matched value {value}")]
    NonExhaustiveMatch { value: String, span: Option<Span> },
    #[error("A {kind} cannot be used as a pattern")]
    MalformedPattern { kind: &'static str, span: Option<Span> },
    #[error("Pattern binds `{name}` more than once")]
    DuplicateBinding { name: String, span: Option<Span> },
    #[error("`{name}` is already defined in this scope")]
    Redefinition { name: String, span: Option<Span> },
    #[error("{found} is not callable")]
    NotCallable { found: &'static str, span: Option<Span> },
    #[error("Factorial is only defined for non-negative integers, got {value}")]
    InvalidFactorial { value: f64, span: Option<Span> },
    #[error("Index {index} is out of bounds for a list of length {len}")]
    IndexOutOfBounds {
        index: f64,
        len: usize,
        span: Option<Span>,
    },
    #[error("Call depth exceeded the limit of {limit}")]
    RecursionLimit { limit: usize, span: Option<Span> },
    #[error("Internal error: {0}")]
    Internal(InternalError),
}

/// Defects in the evaluator itself; never caused by a well-formed program.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InternalError {
    #[error("attempted to pop the last scope frame")]
    EmptyScope,
    #[error("type path `{0}` is nested deeper than `Group.Variant`")]
    NestedTypePath(String),
    #[error("call stack underflow")]
    EmptyCallStack,
}

impl From<InternalError> for RuntimeError {
    fn from(error: InternalError) -> Self {
        RuntimeError::Internal(error)
    }
}

impl RuntimeError {
    pub fn span(&self) -> Option<Span> {
        match self {
            RuntimeError::UnresolvedIdentifier { span, .. }
            | RuntimeError::Unresolved { span, .. }
            | RuntimeError::UnknownType { span, .. }
            | RuntimeError::NotAGroup { span, .. }
            | RuntimeError::UnknownVariant { span, .. }
            | RuntimeError::ExpectedValue { span, .. }
            | RuntimeError::TypeMismatch { span, .. }
            | RuntimeError::MissingField { span, .. }
            | RuntimeError::UnexpectedField { span, .. }
            | RuntimeError::UnknownField { span, .. }
            | RuntimeError::NonExhaustiveMatch { span, .. }
            | RuntimeError::MalformedPattern { span, .. }
            | RuntimeError::DuplicateBinding { span, .. }
            | RuntimeError::Redefinition { span, .. }
            | RuntimeError::NotCallable { span, .. }
            | RuntimeError::InvalidFactorial { span, .. }
            | RuntimeError::IndexOutOfBounds { span, .. }
            | RuntimeError::RecursionLimit { span, .. } => *span,
            RuntimeError::Internal(_) => None,
        }
    }

    /// Attach `span` if the error does not already carry a position.
    pub fn or_span(mut self, at: Span) -> Self {
        if let Some(slot) = self.span_slot() {
            if slot.is_none() {
                *slot = Some(at);
            }
        }
        self
    }

    fn span_slot(&mut self) -> Option<&mut Option<Span>> {
        match self {
            RuntimeError::UnresolvedIdentifier { span, .. }
            | RuntimeError::Unresolved { span, .. }
            | RuntimeError::UnknownType { span, .. }
            | RuntimeError::NotAGroup { span, .. }
            | RuntimeError::UnknownVariant { span, .. }
            | RuntimeError::ExpectedValue { span, .. }
            | RuntimeError::TypeMismatch { span, .. }
            | RuntimeError::MissingField { span, .. }
            | RuntimeError::UnexpectedField { span, .. }
            | RuntimeError::UnknownField { span, .. }
            | RuntimeError::NonExhaustiveMatch { span, .. }
            | RuntimeError::MalformedPattern { span, .. }
            | RuntimeError::DuplicateBinding { span, .. }
            | RuntimeError::Redefinition { span, .. }
            | RuntimeError::NotCallable { span, .. }
            | RuntimeError::InvalidFactorial { span, .. }
            | RuntimeError::IndexOutOfBounds { span, .. }
            | RuntimeError::RecursionLimit { span, .. } => Some(span),
            RuntimeError::Internal(_) => None,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, RuntimeError::Internal(_))
    }
}
