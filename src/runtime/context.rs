use crate::language::{ast::TypePath, span::Span};
use crate::runtime::{
    builtins,
    environment::Scope,
    error::{InternalError, RuntimeError, RuntimeResult},
    klass::{NamedRecordGroup, NamedRecordKlass},
};
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Clone, Debug)]
pub enum TypeEntry {
    Klass(Rc<NamedRecordKlass>),
    Group(Rc<NamedRecordGroup>),
}

/// Flat name → class/group table, filled as definitions are evaluated.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    entries: HashMap<String, TypeEntry>,
}

impl TypeRegistry {
    pub fn register(&mut self, name: &str, entry: TypeEntry) -> Option<TypeEntry> {
        self.entries.insert(name.to_string(), entry)
    }

    pub fn resolve(&self, path: &TypePath) -> RuntimeResult<TypeEntry> {
        let span = Some(path.span);
        match path.segments.as_slice() {
            [name] => self
                .entries
                .get(name)
                .cloned()
                .ok_or_else(|| RuntimeError::UnknownType {
                    name: name.clone(),
                    span,
                }),
            [group, variant] => {
                let klass = self.resolve_variant(group, variant, span)?;
                Ok(TypeEntry::Klass(klass))
            }
            _ => Err(InternalError::NestedTypePath(path.to_string()).into()),
        }
    }

    /// Resolves a path that must name a single class.
    pub fn resolve_klass(&self, path: &TypePath) -> RuntimeResult<Rc<NamedRecordKlass>> {
        match self.resolve(path)? {
            TypeEntry::Klass(klass) => Ok(klass),
            TypeEntry::Group(group) => Err(RuntimeError::TypeMismatch {
                context: format!("type `{path}`"),
                expected: "a class".into(),
                found: format!("group `{}`", group.name),
                span: Some(path.span),
            }),
        }
    }

    fn resolve_variant(
        &self,
        group: &str,
        variant: &str,
        span: Option<Span>,
    ) -> RuntimeResult<Rc<NamedRecordKlass>> {
        match self.entries.get(group) {
            Some(TypeEntry::Group(entry)) => {
                entry
                    .variant(variant)
                    .ok_or_else(|| RuntimeError::UnknownVariant {
                        group: group.to_string(),
                        variant: variant.to_string(),
                        span,
                    })
            }
            Some(TypeEntry::Klass(_)) => Err(RuntimeError::NotAGroup {
                name: group.to_string(),
                span,
            }),
            None => Err(RuntimeError::UnknownType {
                name: group.to_string(),
                span,
            }),
        }
    }
}

/// Diagnostic record of an active call.
#[derive(Clone, Debug, PartialEq)]
pub struct CallFrame {
    pub callee: String,
    pub span: Option<Span>,
}

/// All mutable evaluation state of one program run.
pub struct Context {
    pub scope: Scope,
    pub types: TypeRegistry,
    call_stack: Vec<CallFrame>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    pub fn new() -> Self {
        Self {
            scope: Scope::with_globals(builtins::prelude()),
            types: TypeRegistry::default(),
            call_stack: Vec::new(),
        }
    }

    pub fn push_call(&mut self, frame: CallFrame, limit: usize) -> RuntimeResult<()> {
        if self.call_stack.len() >= limit {
            return Err(RuntimeError::RecursionLimit {
                limit,
                span: frame.span,
            });
        }
        self.call_stack.push(frame);
        Ok(())
    }

    pub fn pop_call(&mut self) -> RuntimeResult<CallFrame> {
        self.call_stack
            .pop()
            .ok_or_else(|| InternalError::EmptyCallStack.into())
    }

    pub fn call_stack(&self) -> &[CallFrame] {
        &self.call_stack
    }

    pub fn clear_call_stack(&mut self) -> Vec<CallFrame> {
        std::mem::take(&mut self.call_stack)
    }
}
