pub mod builtins;
pub mod call;
pub mod console;
pub mod context;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod klass;
pub mod operators;
pub mod pattern;
pub mod stack;
pub mod types;
pub mod value;

pub use interpreter::{Interpreter, RunReport};
