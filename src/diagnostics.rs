use crate::runtime::error::RuntimeError;
use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme, NamedSource, SourceSpan};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct RuntimeDiagnostic {
    #[source_code]
    src: NamedSource,
    #[label("{label}")]
    span: Option<SourceSpan>,
    #[help]
    help: Option<String>,
    message: String,
    label: String,
}

impl RuntimeDiagnostic {
    pub fn from_error(src: NamedSource, err: &RuntimeError) -> Self {
        Self {
            src,
            span: err.span().map(|span| span.to_source_span()),
            help: help_for(err),
            message: err.to_string(),
            label: label_for(err).to_string(),
        }
    }
}

fn label_for(err: &RuntimeError) -> &'static str {
    match err {
        RuntimeError::UnresolvedIdentifier { .. } | RuntimeError::Unresolved { .. } => {
            "not defined here"
        }
        RuntimeError::UnknownType { .. }
        | RuntimeError::NotAGroup { .. }
        | RuntimeError::UnknownVariant { .. } => "unknown type",
        RuntimeError::ExpectedValue { .. } | RuntimeError::TypeMismatch { .. } => {
            "wrong type"
        }
        RuntimeError::MissingField { .. }
        | RuntimeError::UnexpectedField { .. }
        | RuntimeError::UnknownField { .. } => "field mismatch",
        RuntimeError::NonExhaustiveMatch { .. } => "no arm matched",
        RuntimeError::MalformedPattern { .. } | RuntimeError::DuplicateBinding { .. } => {
            "invalid pattern"
        }
        RuntimeError::Redefinition { .. } => "redefined",
        RuntimeError::NotCallable { .. } => "not callable",
        RuntimeError::InvalidFactorial { .. } => "invalid operand",
        RuntimeError::IndexOutOfBounds { .. } => "out of bounds",
        RuntimeError::RecursionLimit { .. } => "call made here",
        RuntimeError::Internal(_) => "internal error",
    }
}

fn help_for(err: &RuntimeError) -> Option<String> {
    match err {
        RuntimeError::NonExhaustiveMatch { .. } => {
            Some("add a catch-all arm such as `case other: { ... }`".into())
        }
        RuntimeError::MissingField { field, .. } => Some(format!("provide a value for `{field}`")),
        RuntimeError::UnexpectedField { field, .. } => Some(format!("remove `{field}`")),
        RuntimeError::RecursionLimit { .. } => {
            Some("raise `max_call_depth` or make the recursion terminate".into())
        }
        RuntimeError::Internal(_) => Some("this is a bug in the evaluator".into()),
        _ => None,
    }
}

/// Renders `err` against the program text it came from.
pub fn render_runtime_error(name: &str, source: &str, err: &RuntimeError) -> String {
    let diagnostic = RuntimeDiagnostic::from_error(
        NamedSource::new(name, source.to_string()),
        err,
    );
    let mut out = String::new();
    let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor());
    if handler.render_report(&mut out, &diagnostic).is_err() {
        return format!("Runtime error: {err}");
    }
    out
}
