use crate::runtime::error::RuntimeError;
use std::cell::RefCell;
use std::rc::Rc;

/// The evaluator's only outward effect.
pub trait Console {
    fn log(&mut self, parts: &[&str]);
    /// Records a fatal error. Only the first one is kept.
    fn fail(&mut self, error: RuntimeError);
}

#[derive(Debug, Default)]
struct ConsoleBuffer {
    lines: Vec<String>,
    failure: Option<RuntimeError>,
}

/// In-memory console. Clones share one buffer, so a handle kept by the host
/// sees everything the interpreter wrote.
#[derive(Clone, Debug, Default)]
pub struct BufferedConsole {
    buffer: Rc<RefCell<ConsoleBuffer>>,
}

impl BufferedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.buffer.borrow().lines.clone()
    }

    pub fn failure(&self) -> Option<RuntimeError> {
        self.buffer.borrow().failure.clone()
    }
}

impl Console for BufferedConsole {
    fn log(&mut self, parts: &[&str]) {
        self.buffer.borrow_mut().lines.push(parts.join(" "));
    }

    fn fail(&mut self, error: RuntimeError) {
        let mut buffer = self.buffer.borrow_mut();
        if buffer.failure.is_none() {
            buffer.failure = Some(error);
        }
    }
}

/// Writes log lines to stdout and the fatal error to stderr.
#[derive(Debug, Default)]
pub struct StdConsole {
    failed: bool,
}

impl Console for StdConsole {
    fn log(&mut self, parts: &[&str]) {
        println!("{}", parts.join(" "));
    }

    fn fail(&mut self, error: RuntimeError) {
        if !self.failed {
            self.failed = true;
            eprintln!("Runtime error: {error}");
        }
    }
}
