use crate::language::span::Span;
use crate::runtime::{
    error::{InternalError, RuntimeError, RuntimeResult},
    value::Value,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// One layer of the identifier-resolution stack.
///
/// Frames are reference counted so a function value can keep the frames that
/// were visible where it was created.
#[derive(Clone, Default)]
pub struct Frame {
    bindings: Rc<RefCell<HashMap<String, Value>>>,
}

impl Frame {
    pub fn new(bindings: HashMap<String, Value>) -> Self {
        Self {
            bindings: Rc::new(RefCell::new(bindings)),
        }
    }

    fn get(&self, name: &str) -> Option<Value> {
        self.bindings.borrow().get(name).cloned()
    }

    fn contains(&self, name: &str) -> bool {
        self.bindings.borrow().contains_key(name)
    }

    fn insert(&self, name: &str, value: Value) -> Option<Value> {
        self.bindings.borrow_mut().insert(name.to_string(), value)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bindings.borrow().keys().cloned().collect();
        names.sort();
        names
    }
}

/// Frames captured by a closure at creation time.
#[derive(Clone)]
pub struct CapturedScope {
    frames: Vec<Frame>,
}

impl fmt::Debug for CapturedScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CapturedScope({} frames)", self.frames.len())
    }
}

/// Stack of frames. Never empty: the bottom (global) frame cannot be popped.
pub struct Scope {
    frames: Vec<Frame>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    pub fn new() -> Self {
        Self::with_globals(HashMap::new())
    }

    pub fn with_globals(globals: HashMap<String, Value>) -> Self {
        Self {
            frames: vec![Frame::new(globals)],
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push(&mut self, seed: Option<HashMap<String, Value>>) {
        self.frames.push(Frame::new(seed.unwrap_or_default()));
        tracing::trace!(depth = self.frames.len(), "scope push");
    }

    pub fn pop(&mut self) -> RuntimeResult<()> {
        if self.frames.len() <= 1 {
            return Err(InternalError::EmptyScope.into());
        }
        self.frames.pop();
        tracing::trace!(depth = self.frames.len(), "scope pop");
        Ok(())
    }

    /// Binds `name` in the top frame, returning the value it replaced there.
    pub fn define(&mut self, name: &str, value: Value) -> Option<Value> {
        self.top().insert(name, value)
    }

    pub fn is_defined_in_top(&self, name: &str) -> bool {
        self.top().contains(name)
    }

    /// Requires an existing visible binding, then shadows it in the top frame.
    pub fn set(&mut self, name: &str, value: Value, span: Option<Span>) -> RuntimeResult<()> {
        if self.lookup(name).is_none() {
            return Err(RuntimeError::UnresolvedIdentifier {
                name: name.to_string(),
                span,
            });
        }
        self.top().insert(name, value);
        Ok(())
    }

    pub fn get(&self, name: &str, span: Option<Span>) -> RuntimeResult<Value> {
        self.lookup(name)
            .ok_or_else(|| RuntimeError::UnresolvedIdentifier {
                name: name.to_string(),
                span,
            })
    }

    pub fn get_or_throw(
        &self,
        name: &str,
        message: impl FnOnce() -> String,
        span: Option<Span>,
    ) -> RuntimeResult<Value> {
        self.lookup(name).ok_or_else(|| RuntimeError::Unresolved {
            message: message(),
            span,
        })
    }

    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    pub fn capture(&self) -> CapturedScope {
        CapturedScope {
            frames: self.frames.clone(),
        }
    }

    /// Replaces the live frames with `captured`, returning the caller's frames
    /// so they can be handed back to [`Scope::restore`].
    pub fn enter(&mut self, captured: &CapturedScope) -> Vec<Frame> {
        std::mem::replace(&mut self.frames, captured.frames.clone())
    }

    pub fn restore(&mut self, frames: Vec<Frame>) {
        self.frames = frames;
    }

    pub fn global(&self) -> &Frame {
        &self.frames[0]
    }

    fn top(&self) -> &Frame {
        // `frames` is never empty: construction seeds one and `pop` keeps it.
        &self.frames[self.frames.len() - 1]
    }
}
