use crate::language::{span::Span, types::TypeExpr};
use std::fmt;
use std::rc::Rc;

#[derive(Clone, Debug, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(Clone, Debug)]
pub enum Statement {
    Const(ConstDef),
    Assign(AssignStmt),
    Class(Rc<ClassDef>),
    ClassGroup(Rc<ClassGroupDef>),
    MatchFunction(Rc<MatchFunctionDef>),
    Return(ReturnStmt),
    If(IfStmt),
    Log(LogStmt),
    Expr(ExprStmt),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Const(def) => def.span,
            Statement::Assign(stmt) => stmt.span,
            Statement::Class(def) => def.span,
            Statement::ClassGroup(def) => def.span,
            Statement::MatchFunction(def) => def.span,
            Statement::Return(stmt) => stmt.span,
            Statement::If(stmt) => stmt.span,
            Statement::Log(stmt) => stmt.span,
            Statement::Expr(stmt) => stmt.span,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ConstDef {
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct AssignStmt {
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct ClassDef {
    pub name: String,
    pub fields: Vec<FieldDecl>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeExpr,
    pub span: Span,
}

/// A tagged union: one namespace holding sibling classes.
#[derive(Clone, Debug)]
pub struct ClassGroupDef {
    pub name: String,
    pub variants: Vec<Rc<ClassDef>>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct MatchFunctionDef {
    pub name: String,
    pub arms: Vec<MatchArm>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_branch: Block,
    pub else_branch: Option<Block>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct LogStmt {
    pub target: LogTarget,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum LogTarget {
    Value(Expr),
    Type(TypePath),
}

#[derive(Clone, Debug)]
pub struct ExprStmt {
    pub expr: Expr,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub tail: Option<Box<Expr>>,
    pub span: Span,
}

impl Block {
    pub fn new(statements: Vec<Statement>, tail: Option<Expr>, span: Span) -> Self {
        Self {
            statements,
            tail: tail.map(Box::new),
            span,
        }
    }
}

#[derive(Clone, Debug)]
pub struct MatchArm {
    pub pattern: Expr,
    pub body: Block,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct MatchExpr {
    pub scrutinee: Box<Expr>,
    pub arms: Vec<MatchArm>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct AnonymousFunctionDef {
    pub params: Vec<ParamDecl>,
    pub body: Block,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct ParamDecl {
    pub name: String,
    pub ty: Option<TypeExpr>,
    pub span: Span,
}

/// `Name` or `Group.Variant`. The grammar never produces more than two segments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypePath {
    pub segments: Vec<String>,
    pub span: Span,
}

impl TypePath {
    pub fn single(name: impl Into<String>, span: Span) -> Self {
        Self {
            segments: vec![name.into()],
            span,
        }
    }

    pub fn nested(group: impl Into<String>, variant: impl Into<String>, span: Span) -> Self {
        Self {
            segments: vec![group.into(), variant.into()],
            span,
        }
    }
}

impl fmt::Display for TypePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

#[derive(Clone, Debug)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum Literal {
    Number(f64, Span),
    String(String, Span),
    Boolean(bool, Span),
    Null(Span),
}

#[derive(Clone, Debug)]
pub struct RecordField {
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum CallArgs {
    Named(Vec<RecordField>),
    Positional(Box<Expr>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
        };
        write!(f, "{symbol}")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
    Factorial,
}

#[derive(Clone, Debug)]
pub enum Expr {
    Identifier(Identifier),
    TypeRef(TypePath),
    Literal(Literal),
    Record {
        fields: Vec<RecordField>,
        span: Span,
    },
    List {
        items: Vec<Expr>,
        span: Span,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    Unary {
        op: UnaryOp,
        expr: Box<Expr>,
        span: Span,
    },
    Call {
        callee: Box<Expr>,
        args: CallArgs,
        span: Span,
    },
    FieldAccess {
        base: Box<Expr>,
        field: String,
        span: Span,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },
    Match(MatchExpr),
    AnonymousFunction(Rc<AnonymousFunctionDef>),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Identifier(ident) => ident.span,
            Expr::TypeRef(path) => path.span,
            Expr::Literal(Literal::Number(_, span))
            | Expr::Literal(Literal::String(_, span))
            | Expr::Literal(Literal::Boolean(_, span))
            | Expr::Literal(Literal::Null(span)) => *span,
            Expr::Record { span, .. }
            | Expr::List { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Call { span, .. }
            | Expr::FieldAccess { span, .. }
            | Expr::Index { span, .. } => *span,
            Expr::Match(expr) => expr.span,
            Expr::AnonymousFunction(def) => def.span,
        }
    }

    /// Short name of the node kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Identifier(_) => "identifier",
            Expr::TypeRef(_) => "type reference",
            Expr::Literal(_) => "literal",
            Expr::Record { .. } => "record",
            Expr::List { .. } => "list",
            Expr::Binary { .. } => "binary operation",
            Expr::Unary { .. } => "unary operation",
            Expr::Call { .. } => "call",
            Expr::FieldAccess { .. } => "field access",
            Expr::Index { .. } => "index",
            Expr::Match(_) => "match",
            Expr::AnonymousFunction(_) => "anonymous function",
        }
    }
}
