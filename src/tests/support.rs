//! AST builders standing in for the parser in end-to-end tests.

use crate::config::EvalConfig;
use crate::language::{
    ast::*,
    span::Span,
    types::TypeExpr,
};
use crate::runtime::{console::BufferedConsole, value::Value, Interpreter, RunReport};
use std::rc::Rc;

pub fn sp() -> Span {
    Span::default()
}

pub fn num(value: f64) -> Expr {
    Expr::Literal(Literal::Number(value, sp()))
}

pub fn text(value: &str) -> Expr {
    Expr::Literal(Literal::String(value.into(), sp()))
}

pub fn boolean(value: bool) -> Expr {
    Expr::Literal(Literal::Boolean(value, sp()))
}

pub fn ident(name: &str) -> Expr {
    Expr::Identifier(Identifier {
        name: name.into(),
        span: sp(),
    })
}

pub fn ty(name: &str) -> Expr {
    Expr::TypeRef(TypePath::single(name, sp()))
}

pub fn variant(group: &str, name: &str) -> Expr {
    Expr::TypeRef(TypePath::nested(group, name, sp()))
}

fn fields(pairs: Vec<(&str, Expr)>) -> Vec<RecordField> {
    pairs
        .into_iter()
        .map(|(name, value)| RecordField {
            name: name.into(),
            value,
            span: sp(),
        })
        .collect()
}

pub fn record(pairs: Vec<(&str, Expr)>) -> Expr {
    Expr::Record {
        fields: fields(pairs),
        span: sp(),
    }
}

pub fn list(items: Vec<Expr>) -> Expr {
    Expr::List { items, span: sp() }
}

pub fn bin(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
        span: sp(),
    }
}

pub fn unary(op: UnaryOp, expr: Expr) -> Expr {
    Expr::Unary {
        op,
        expr: Box::new(expr),
        span: sp(),
    }
}

pub fn call(callee: Expr, args: Vec<(&str, Expr)>) -> Expr {
    call_at(callee, args, sp())
}

pub fn call_at(callee: Expr, args: Vec<(&str, Expr)>, span: Span) -> Expr {
    Expr::Call {
        callee: Box::new(callee),
        args: CallArgs::Named(fields(args)),
        span,
    }
}

pub fn call_with(callee: Expr, arg: Expr) -> Expr {
    Expr::Call {
        callee: Box::new(callee),
        args: CallArgs::Positional(Box::new(arg)),
        span: sp(),
    }
}

pub fn field(base: Expr, name: &str) -> Expr {
    Expr::FieldAccess {
        base: Box::new(base),
        field: name.into(),
        span: sp(),
    }
}

pub fn index(base: Expr, position: Expr) -> Expr {
    Expr::Index {
        base: Box::new(base),
        index: Box::new(position),
        span: sp(),
    }
}

pub fn arm(pattern: Expr, body: Block) -> MatchArm {
    MatchArm {
        pattern,
        body,
        span: sp(),
    }
}

pub fn match_expr(scrutinee: Expr, arms: Vec<MatchArm>) -> Expr {
    Expr::Match(MatchExpr {
        scrutinee: Box::new(scrutinee),
        arms,
        span: sp(),
    })
}

pub fn block(statements: Vec<Statement>) -> Block {
    Block::new(statements, None, sp())
}

/// Block consisting of a single tail expression.
pub fn yields(expr: Expr) -> Block {
    Block::new(Vec::new(), Some(expr), sp())
}

pub fn lambda(params: Vec<(&str, Option<TypeExpr>)>, body: Block) -> Expr {
    Expr::AnonymousFunction(Rc::new(AnonymousFunctionDef {
        params: params
            .into_iter()
            .map(|(name, ty)| ParamDecl {
                name: name.into(),
                ty,
                span: sp(),
            })
            .collect(),
        body,
        span: sp(),
    }))
}

pub fn konst(name: &str, value: Expr) -> Statement {
    Statement::Const(ConstDef {
        name: name.into(),
        value,
        span: sp(),
    })
}

pub fn assign(name: &str, value: Expr) -> Statement {
    Statement::Assign(AssignStmt {
        name: name.into(),
        value,
        span: sp(),
    })
}

pub fn class_def(name: &str, fields: Vec<(&str, TypeExpr)>) -> Rc<ClassDef> {
    Rc::new(ClassDef {
        name: name.into(),
        fields: fields
            .into_iter()
            .map(|(name, ty)| FieldDecl {
                name: name.into(),
                ty,
                span: sp(),
            })
            .collect(),
        span: sp(),
    })
}

pub fn class(name: &str, fields: Vec<(&str, TypeExpr)>) -> Statement {
    Statement::Class(class_def(name, fields))
}

pub fn group(name: &str, variants: Vec<Rc<ClassDef>>) -> Statement {
    Statement::ClassGroup(Rc::new(ClassGroupDef {
        name: name.into(),
        variants,
        span: sp(),
    }))
}

/// `Card { King(); Number(value: number) }`
pub fn card_group() -> Statement {
    group(
        "Card",
        vec![
            class_def("King", Vec::new()),
            class_def("Number", vec![("value", TypeExpr::Number)]),
        ],
    )
}

pub fn match_fn(name: &str, arms: Vec<MatchArm>) -> Statement {
    Statement::MatchFunction(Rc::new(MatchFunctionDef {
        name: name.into(),
        arms,
        span: sp(),
    }))
}

pub fn ret(value: Expr) -> Statement {
    Statement::Return(ReturnStmt {
        value: Some(value),
        span: sp(),
    })
}

pub fn if_stmt(condition: Expr, then_branch: Block, else_branch: Option<Block>) -> Statement {
    Statement::If(IfStmt {
        condition,
        then_branch,
        else_branch,
        span: sp(),
    })
}

pub fn log(value: Expr) -> Statement {
    Statement::Log(LogStmt {
        target: LogTarget::Value(value),
        span: sp(),
    })
}

pub fn log_type(path: TypePath) -> Statement {
    Statement::Log(LogStmt {
        target: LogTarget::Type(path),
        span: sp(),
    })
}

pub fn expr_stmt(expr: Expr) -> Statement {
    Statement::Expr(ExprStmt { expr, span: sp() })
}

pub struct Run {
    pub interpreter: Interpreter,
    pub console: BufferedConsole,
    pub report: RunReport,
}

impl Run {
    pub fn value(&self) -> &Value {
        match &self.report {
            RunReport {
                value: Some(value),
                error: None,
            } => value,
            other => panic!("expected a returned value, got {other:?}"),
        }
    }

    pub fn number(&self) -> f64 {
        self.value().expect_number(None).expect("number result")
    }

    pub fn string(&self) -> String {
        self.value().expect_string(None).expect("string result").to_string()
    }

    pub fn error(&self) -> &crate::runtime::error::RuntimeError {
        self.report.error.as_ref().expect("run should fail")
    }
}

pub fn run(statements: Vec<Statement>) -> Run {
    run_with(EvalConfig::default(), statements)
}

pub fn run_with(config: EvalConfig, statements: Vec<Statement>) -> Run {
    let console = BufferedConsole::new();
    let mut interpreter = Interpreter::with_config(console.clone(), config);
    let report = interpreter.run(&Program { statements });
    Run {
        interpreter,
        console,
        report,
    }
}
