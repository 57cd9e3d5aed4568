use crate::config::{EvalConfig, RedefinitionPolicy};
use crate::language::{
    ast::*,
    span::Span,
};
use crate::runtime::{
    console::Console,
    context::{Context, TypeEntry},
    error::{RuntimeError, RuntimeResult},
    klass::{NamedRecordGroup, NamedRecordKlass},
    operators::{eval_binary, eval_unary},
    pattern::select_arm,
    stack::ensure_sufficient_stack,
    types::{PrimitiveType, RecordShape, RuntimeType},
    value::{
        AnonymousFunctionInstance, ListValue, MatchFunctionInstance, RecordInstance, Value,
    },
};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::rc::Rc;

pub struct Interpreter {
    pub(crate) ctx: Context,
    pub(crate) console: Box<dyn Console>,
    pub(crate) config: EvalConfig,
}

/// Non-local exit raised while evaluating. A `return` travels on the error
/// channel through any nesting of blocks and expressions until a call
/// boundary (or `run`) takes its value.
#[derive(Debug)]
pub(crate) enum Interrupt {
    Return(Value),
    Error(RuntimeError),
}

impl From<RuntimeError> for Interrupt {
    fn from(error: RuntimeError) -> Self {
        Interrupt::Error(error)
    }
}

pub(crate) type EvalResult<T> = Result<T, Interrupt>;

/// Settles an interrupted body at a call boundary.
pub(crate) fn returned(result: EvalResult<Value>) -> RuntimeResult<Value> {
    match result {
        Ok(value) | Err(Interrupt::Return(value)) => Ok(value),
        Err(Interrupt::Error(error)) => Err(error),
    }
}

#[derive(Debug)]
pub struct RunReport {
    /// Value of a top-level `return`, if one was reached.
    pub value: Option<Value>,
    pub error: Option<RuntimeError>,
}

impl RunReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

impl Interpreter {
    pub fn new(console: impl Console + 'static) -> Self {
        Self::with_config(console, EvalConfig::default())
    }

    pub fn with_config(console: impl Console + 'static, config: EvalConfig) -> Self {
        Self {
            ctx: Context::new(),
            console: Box::new(console),
            config,
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.ctx
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Runs a whole program. Errors never escape: the first one is written to
    /// the console and returned in the report, and the context stays
    /// inspectable either way.
    #[tracing::instrument(level = "debug", skip_all, fields(statements = program.statements.len()))]
    pub fn run(&mut self, program: &Program) -> RunReport {
        match self.execute(&program.statements) {
            Ok(()) => RunReport {
                value: None,
                error: None,
            },
            Err(Interrupt::Return(value)) => RunReport {
                value: Some(value),
                error: None,
            },
            Err(Interrupt::Error(error)) => {
                self.report_failure(&error);
                RunReport {
                    value: None,
                    error: Some(error),
                }
            }
        }
    }

    fn report_failure(&mut self, error: &RuntimeError) {
        let trace = self.ctx.clear_call_stack();
        let message = error.to_string();
        self.console.log(&["error:", message.as_str()]);
        for frame in trace.iter().rev() {
            self.console.log(&["  at", frame.callee.as_str()]);
        }
        self.console.fail(error.clone());
    }

    pub(crate) fn execute(&mut self, statements: &[Statement]) -> EvalResult<()> {
        statements
            .iter()
            .try_for_each(|statement| self.eval_statement(statement))
    }

    fn eval_statement(&mut self, statement: &Statement) -> EvalResult<()> {
        match statement {
            Statement::Const(def) => {
                let value = self.eval_expression(&def.value)?;
                self.define(&def.name, value, def.span)?;
            }
            Statement::Assign(stmt) => {
                let value = self.eval_expression(&stmt.value)?;
                self.ctx.scope.set(&stmt.name, value, Some(stmt.span))?;
            }
            Statement::Class(def) => {
                let klass = Rc::new(NamedRecordKlass::from_definition(def, None));
                self.define(&def.name, Value::Klass(Rc::clone(&klass)), def.span)?;
                self.ctx.types.register(&def.name, TypeEntry::Klass(klass));
            }
            Statement::ClassGroup(def) => {
                let group = Rc::new(NamedRecordGroup::from_definition(def));
                self.define(&def.name, Value::Group(Rc::clone(&group)), def.span)?;
                self.ctx.types.register(&def.name, TypeEntry::Group(group));
            }
            Statement::MatchFunction(def) => {
                let func = MatchFunctionInstance {
                    def: Rc::clone(def),
                    scope: self.ctx.scope.capture(),
                };
                self.define(&def.name, Value::MatchFunction(Rc::new(func)), def.span)?;
            }
            Statement::Return(stmt) => {
                let value = match &stmt.value {
                    Some(expr) => self.eval_expression(expr)?,
                    None => Value::Nil,
                };
                return Err(Interrupt::Return(value));
            }
            Statement::If(stmt) => {
                let condition = self.eval_expression(&stmt.condition)?;
                let branch = if condition.expect_boolean(Some(stmt.condition.span()))? {
                    Some(&stmt.then_branch)
                } else {
                    stmt.else_branch.as_ref()
                };
                if let Some(block) = branch {
                    self.eval_block(block, None)?;
                }
            }
            Statement::Log(stmt) => {
                let line = match &stmt.target {
                    LogTarget::Value(expr) => self.eval_expression(expr)?.to_string(),
                    LogTarget::Type(path) => match self.ctx.types.resolve(path)? {
                        TypeEntry::Klass(klass) => klass.to_string(),
                        TypeEntry::Group(group) => group.to_string(),
                    },
                };
                self.console.log(&[line.as_str()]);
            }
            Statement::Expr(stmt) => {
                self.eval_expression(&stmt.expr)?;
            }
        }
        Ok(())
    }

    fn define(&mut self, name: &str, value: Value, span: Span) -> RuntimeResult<()> {
        if self.ctx.scope.is_defined_in_top(name) {
            match self.config.redefinition {
                RedefinitionPolicy::Strict => {
                    return Err(RuntimeError::Redefinition {
                        name: name.to_string(),
                        span: Some(span),
                    });
                }
                RedefinitionPolicy::Permissive => {
                    tracing::warn!(name, "redefining binding in the same scope");
                    let message = format!("`{name}` is redefined");
                    self.console.log(&["warning:", message.as_str()]);
                }
            }
        }
        self.ctx.scope.define(name, value);
        Ok(())
    }

    /// Evaluates `block` in a fresh frame, optionally pre-populated, to its
    /// tail value (`nil` without one). The frame is popped however the block
    /// exits.
    pub(crate) fn eval_block(
        &mut self,
        block: &Block,
        seed: Option<HashMap<String, Value>>,
    ) -> EvalResult<Value> {
        self.ctx.scope.push(seed);
        let result = self.eval_block_body(block);
        self.ctx.scope.pop()?;
        result
    }

    fn eval_block_body(&mut self, block: &Block) -> EvalResult<Value> {
        self.execute(&block.statements)?;
        match &block.tail {
            Some(tail) => self.eval_expression(tail),
            None => Ok(Value::Nil),
        }
    }

    pub(crate) fn eval_expression(&mut self, expr: &Expr) -> EvalResult<Value> {
        ensure_sufficient_stack(|| self.eval_expression_inner(expr))
    }

    fn eval_expression_inner(&mut self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Identifier(ident) => Ok(self.ctx.scope.get(&ident.name, Some(ident.span))?),
            Expr::TypeRef(path) => Ok(match self.ctx.types.resolve(path)? {
                TypeEntry::Klass(klass) => Value::Klass(klass),
                TypeEntry::Group(group) => Value::Group(group),
            }),
            Expr::Literal(lit) => Ok(match lit {
                Literal::Number(value, _) => Value::Number(*value),
                Literal::String(value, _) => Value::String(value.clone()),
                Literal::Boolean(value, _) => Value::Boolean(*value),
                Literal::Null(_) => Value::Nil,
            }),
            Expr::Record { fields, .. } => Ok(Value::Record(self.eval_record(fields)?)),
            Expr::List { items, .. } => {
                let values = items
                    .iter()
                    .map(|item| self.eval_expression(item))
                    .collect::<EvalResult<Vec<_>>>()?;
                Ok(Value::List(ListValue::from_vec(values)))
            }
            Expr::Binary {
                op,
                left,
                right,
                span,
            } => {
                let lhs = self.eval_expression(left)?;
                let rhs = self.eval_expression(right)?;
                Ok(eval_binary(*op, lhs, rhs, *span)?)
            }
            Expr::Unary { op, expr, span } => {
                let value = self.eval_expression(expr)?;
                Ok(eval_unary(*op, value, *span)?)
            }
            Expr::Call { callee, args, span } => self.eval_call(callee, args, *span),
            Expr::FieldAccess { base, field, span } => {
                let value = self.eval_expression(base)?;
                Ok(self.read_field(&value, field, *span)?)
            }
            Expr::Index { base, index, span } => {
                let target = self.eval_expression(base)?;
                let position = self.eval_expression(index)?;
                Ok(read_index(&target, &position, *span)?)
            }
            Expr::Match(expr) => {
                let scrutinee = self.eval_expression(&expr.scrutinee)?;
                self.eval_match_arms(&scrutinee, &expr.arms, expr.span)
            }
            Expr::AnonymousFunction(def) => {
                let params = RecordShape {
                    fields: def
                        .params
                        .iter()
                        .map(|param| {
                            let ty = param
                                .ty
                                .as_ref()
                                .map(RuntimeType::from_type_expr)
                                .unwrap_or(RuntimeType::Primitive(PrimitiveType::Any));
                            (param.name.clone(), ty)
                        })
                        .collect(),
                };
                Ok(Value::AnonymousFunction(Rc::new(AnonymousFunctionInstance {
                    def: Rc::clone(def),
                    params,
                    scope: self.ctx.scope.capture(),
                })))
            }
        }
    }

    pub(crate) fn eval_record(&mut self, fields: &[RecordField]) -> EvalResult<RecordInstance> {
        let mut values = IndexMap::with_capacity(fields.len());
        for field in fields {
            let value = self.eval_expression(&field.value)?;
            values.insert(field.name.clone(), value);
        }
        Ok(RecordInstance::new(values))
    }

    /// Runs the first matching arm in a frame holding exactly that arm's
    /// bindings.
    pub(crate) fn eval_match_arms(
        &mut self,
        scrutinee: &Value,
        arms: &[MatchArm],
        span: Span,
    ) -> EvalResult<Value> {
        let Some((arm, bindings)) = select_arm(scrutinee, arms, &self.ctx.types)? else {
            return Err(RuntimeError::NonExhaustiveMatch {
                value: scrutinee.to_string(),
                span: Some(span),
            }
            .into());
        };
        let seed = bindings.into_iter().collect();
        self.eval_block(&arm.body, Some(seed))
    }

    fn read_field(&self, value: &Value, field: &str, span: Span) -> RuntimeResult<Value> {
        let found = match value {
            Value::Record(record) => record.get_field(field),
            Value::NamedRecord(instance) => instance.get_field(field),
            Value::Group(group) => {
                return group
                    .variant(field)
                    .map(Value::Klass)
                    .ok_or_else(|| RuntimeError::UnknownVariant {
                        group: group.name.clone(),
                        variant: field.to_string(),
                        span: Some(span),
                    });
            }
            _ => None,
        };
        found.ok_or_else(|| RuntimeError::UnknownField {
            field: field.to_string(),
            found: match value {
                Value::NamedRecord(instance) => instance.klass.display_name(),
                other => other.type_name().to_string(),
            },
            span: Some(span),
        })
    }
}

fn read_index(target: &Value, position: &Value, span: Span) -> RuntimeResult<Value> {
    let list = target.expect_list(Some(span))?;
    let index = position.expect_number(Some(span))?;
    let item = if index >= 0.0 && index.fract() == 0.0 {
        list.get(index as usize)
    } else {
        None
    };
    item.ok_or_else(|| RuntimeError::IndexOutOfBounds {
        index,
        len: list.len(),
        span: Some(span),
    })
}
