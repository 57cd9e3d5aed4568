use crate::language::{
    ast::{CallArgs, Expr},
    span::Span,
};
use crate::runtime::{
    context::CallFrame,
    environment::CapturedScope,
    error::{RuntimeError, RuntimeResult},
    interpreter::{returned, EvalResult, Interpreter},
    klass::NamedRecordKlass,
    types::check_record_type,
    value::{AnonymousFunctionInstance, MatchFunctionInstance, NativeFunction, Value},
};
use std::collections::HashMap;
use std::rc::Rc;

impl Interpreter {
    pub(crate) fn eval_call(
        &mut self,
        callee: &Expr,
        args: &CallArgs,
        span: Span,
    ) -> EvalResult<Value> {
        let target = self.eval_expression(callee)?;
        let argument = match args {
            CallArgs::Named(fields) => Value::Record(self.eval_record(fields)?),
            CallArgs::Positional(expr) => self.eval_expression(expr)?,
        };
        Ok(self.call_value(&target, argument, span)?)
    }

    /// Applies a callable value (or a class, as a constructor) to one argument.
    pub fn call_value(&mut self, target: &Value, argument: Value, span: Span) -> RuntimeResult<Value> {
        match target {
            Value::Klass(klass) => self.construct(klass, argument, span),
            Value::MatchFunction(func) => {
                self.invoke(&func.def.name, span, |interp| {
                    interp.call_match_function(func, argument, span)
                })
            }
            Value::AnonymousFunction(func) => self.invoke("<anonymous>", span, |interp| {
                interp.call_anonymous(func, argument, span)
            }),
            Value::Native(native) => self.invoke(native.name, span, |_| {
                call_native(native, &argument, span)
            }),
            other => Err(RuntimeError::NotCallable {
                found: other.type_name(),
                span: Some(span),
            }),
        }
    }

    fn construct(
        &mut self,
        klass: &Rc<NamedRecordKlass>,
        argument: Value,
        span: Span,
    ) -> RuntimeResult<Value> {
        let record = argument.expect_record(Some(span))?.clone();
        klass.instantiate(record, &self.ctx.types, Some(span))
    }

    /// Call-frame bookkeeping shared by every callable. On failure the
    /// marker stays on the diagnostic stack so the top level can print a trace.
    #[tracing::instrument(level = "debug", skip_all, fields(callee = callee))]
    fn invoke<F>(&mut self, callee: &str, span: Span, body: F) -> RuntimeResult<Value>
    where
        F: FnOnce(&mut Self) -> RuntimeResult<Value>,
    {
        let frame = CallFrame {
            callee: callee.to_string(),
            span: Some(span),
        };
        self.ctx.push_call(frame, self.config.max_call_depth)?;
        tracing::debug!(depth = self.ctx.call_stack().len(), "call");
        let value = body(self)?;
        self.ctx.pop_call()?;
        Ok(value)
    }

    fn call_match_function(
        &mut self,
        func: &MatchFunctionInstance,
        argument: Value,
        span: Span,
    ) -> RuntimeResult<Value> {
        let outcome = self.with_captured_scope(&func.scope, |interp| {
            interp.eval_match_arms(&argument, &func.def.arms, span)
        });
        returned(outcome)
    }

    fn call_anonymous(
        &mut self,
        func: &AnonymousFunctionInstance,
        argument: Value,
        span: Span,
    ) -> RuntimeResult<Value> {
        // The argument is checked here, at the call site, before any binding.
        let record = match argument {
            Value::Record(record) => record,
            other => {
                return Err(RuntimeError::TypeMismatch {
                    context: "function argument".into(),
                    expected: func.params.to_string(),
                    found: other.type_name().into(),
                    span: Some(span),
                });
            }
        };
        check_record_type(
            &record,
            &func.params,
            "function argument",
            &self.ctx.types,
            Some(span),
        )?;
        let seed: HashMap<String, Value> = record
            .fields
            .borrow()
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        let outcome = self.with_captured_scope(&func.scope, |interp| {
            interp.eval_block(&func.def.body, Some(seed))
        });
        returned(outcome)
    }

    /// Runs `f` against the frames a closure captured, then hands the
    /// caller's frames back regardless of the outcome.
    fn with_captured_scope<R, F>(&mut self, captured: &CapturedScope, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        let saved = self.ctx.scope.enter(captured);
        let result = f(self);
        self.ctx.scope.restore(saved);
        result
    }
}

fn call_native(native: &NativeFunction, argument: &Value, span: Span) -> RuntimeResult<Value> {
    (native.func)(argument, Some(span)).map_err(|err| err.or_span(span))
}
