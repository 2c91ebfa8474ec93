//! AST definitions for JikiScript
//!
//! Statements and expressions are separate enums; every node carries the
//! [`SourceLocation`] it was parsed from so frames and errors can point back
//! at the learner's code.

use crate::syntax::SourceLocation;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    String(String),
    Boolean(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal {
        value: Literal,
        location: SourceLocation,
    },
    Variable {
        name: String,
        location: SourceLocation,
    },
    List {
        elements: Vec<Expression>,
        location: SourceLocation,
    },
    Dictionary {
        entries: Vec<(String, Expression)>,
        location: SourceLocation,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
        location: SourceLocation,
    },
    Binary {
        left: Box<Expression>,
        op: BinaryOp,
        right: Box<Expression>,
        location: SourceLocation,
    },
    Logical {
        left: Box<Expression>,
        op: LogicalOp,
        right: Box<Expression>,
        location: SourceLocation,
    },
    Grouping {
        inner: Box<Expression>,
        location: SourceLocation,
    },
    Call {
        callee: String,
        args: Vec<Expression>,
        location: SourceLocation,
    },
    Index {
        object: Box<Expression>,
        index: Box<Expression>,
        location: SourceLocation,
    },
}

impl Expression {
    pub fn location(&self) -> SourceLocation {
        match self {
            Expression::Literal { location, .. }
            | Expression::Variable { location, .. }
            | Expression::List { location, .. }
            | Expression::Dictionary { location, .. }
            | Expression::Unary { location, .. }
            | Expression::Binary { location, .. }
            | Expression::Logical { location, .. }
            | Expression::Grouping { location, .. }
            | Expression::Call { location, .. }
            | Expression::Index { location, .. } => *location,
        }
    }
}

/// A `function name with a, b do … end` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Statement>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Set {
        name: String,
        value: Expression,
        location: SourceLocation,
    },
    Change {
        name: String,
        value: Expression,
        location: SourceLocation,
    },
    ChangeElement {
        object: Expression,
        index: Expression,
        value: Expression,
        location: SourceLocation,
    },
    Log {
        value: Expression,
        location: SourceLocation,
    },
    /// `else if` chains are nested `If`s inside `else_branch`.
    If {
        condition: Expression,
        then_branch: Vec<Statement>,
        else_branch: Option<Vec<Statement>>,
        location: SourceLocation,
    },
    Repeat {
        count: Expression,
        body: Vec<Statement>,
        location: SourceLocation,
    },
    Foreach {
        element: String,
        iterable: Expression,
        body: Vec<Statement>,
        location: SourceLocation,
    },
    Block {
        body: Vec<Statement>,
        location: SourceLocation,
    },
    Function(FunctionDecl),
    Return {
        value: Option<Expression>,
        location: SourceLocation,
    },
    Break {
        location: SourceLocation,
    },
    Continue {
        lexeme: String,
        location: SourceLocation,
    },
    Expression {
        expression: Expression,
        location: SourceLocation,
    },
}

impl Statement {
    pub fn location(&self) -> SourceLocation {
        match self {
            Statement::Function(decl) => decl.location,
            Statement::Set { location, .. }
            | Statement::Change { location, .. }
            | Statement::ChangeElement { location, .. }
            | Statement::Log { location, .. }
            | Statement::If { location, .. }
            | Statement::Repeat { location, .. }
            | Statement::Foreach { location, .. }
            | Statement::Block { location, .. }
            | Statement::Return { location, .. }
            | Statement::Break { location }
            | Statement::Continue { location, .. }
            | Statement::Expression { location, .. } => *location,
        }
    }

    /// Node kind recorded on a frame's result.
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::Set { .. } => "SetVariableStatement",
            Statement::Change { .. } => "ChangeVariableStatement",
            Statement::ChangeElement { .. } => "ChangeElementStatement",
            Statement::Log { .. } => "LogStatement",
            Statement::If { .. } => "IfStatement",
            Statement::Repeat { .. } => "RepeatStatement",
            Statement::Foreach { .. } => "ForeachStatement",
            Statement::Block { .. } => "BlockStatement",
            Statement::Function(_) => "FunctionStatement",
            Statement::Return { .. } => "ReturnStatement",
            Statement::Break { .. } => "BreakStatement",
            Statement::Continue { .. } => "ContinueStatement",
            Statement::Expression { .. } => "ExpressionStatement",
        }
    }
}

/// A parsed JikiScript program.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}
