//! AST definitions for the JavaScript subset

use crate::syntax::SourceLocation;

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    String(String),
    Boolean(bool),
    Null,
    Undefined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negate,
    Plus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    StrictEqual,
    StrictNotEqual,
    LooseEqual,
    LooseNotEqual,
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

/// `=` or a compound assignment operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Subtract,
    Multiply,
    Divide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Let,
    Const,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal {
        value: Literal,
        location: SourceLocation,
    },
    Identifier {
        name: String,
        location: SourceLocation,
    },
    Array {
        elements: Vec<Expression>,
        location: SourceLocation,
    },
    Object {
        properties: Vec<(String, Expression)>,
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
    Conditional {
        test: Box<Expression>,
        consequent: Box<Expression>,
        alternate: Box<Expression>,
        location: SourceLocation,
    },
    /// `target op value`; the target is an identifier, member or index.
    Assignment {
        target: Box<Expression>,
        op: AssignOp,
        value: Box<Expression>,
        location: SourceLocation,
    },
    Update {
        target: Box<Expression>,
        op: UpdateOp,
        prefix: bool,
        location: SourceLocation,
    },
    Call {
        callee: Box<Expression>,
        args: Vec<Expression>,
        location: SourceLocation,
    },
    Member {
        object: Box<Expression>,
        property: String,
        location: SourceLocation,
    },
    Index {
        object: Box<Expression>,
        index: Box<Expression>,
        location: SourceLocation,
    },
    Grouping {
        inner: Box<Expression>,
        location: SourceLocation,
    },
}

impl Expression {
    pub fn location(&self) -> SourceLocation {
        match self {
            Expression::Literal { location, .. }
            | Expression::Identifier { location, .. }
            | Expression::Array { location, .. }
            | Expression::Object { location, .. }
            | Expression::Unary { location, .. }
            | Expression::Binary { location, .. }
            | Expression::Logical { location, .. }
            | Expression::Conditional { location, .. }
            | Expression::Assignment { location, .. }
            | Expression::Update { location, .. }
            | Expression::Call { location, .. }
            | Expression::Member { location, .. }
            | Expression::Index { location, .. }
            | Expression::Grouping { location, .. } => *location,
        }
    }

    /// Dotted name of a callee such as `console.log`, if it has one.
    pub fn callee_name(&self) -> Option<String> {
        match self {
            Expression::Identifier { name, .. } => Some(name.clone()),
            Expression::Member {
                object, property, ..
            } => object
                .callee_name()
                .map(|object| format!("{}.{}", object, property)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Statement>,
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    VariableDeclaration {
        kind: DeclarationKind,
        name: String,
        init: Option<Expression>,
        location: SourceLocation,
    },
    Expression {
        expression: Expression,
        location: SourceLocation,
    },
    Block {
        body: Vec<Statement>,
        location: SourceLocation,
    },
    If {
        test: Expression,
        consequent: Box<Statement>,
        alternate: Option<Box<Statement>>,
        location: SourceLocation,
    },
    While {
        test: Expression,
        body: Box<Statement>,
        location: SourceLocation,
    },
    For {
        init: Option<Box<Statement>>,
        test: Option<Expression>,
        update: Option<Expression>,
        body: Box<Statement>,
        location: SourceLocation,
    },
    ForOf {
        kind: DeclarationKind,
        name: String,
        iterable: Expression,
        body: Box<Statement>,
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
        location: SourceLocation,
    },
}

impl Statement {
    pub fn location(&self) -> SourceLocation {
        match self {
            Statement::Function(decl) => decl.location,
            Statement::VariableDeclaration { location, .. }
            | Statement::Expression { location, .. }
            | Statement::Block { location, .. }
            | Statement::If { location, .. }
            | Statement::While { location, .. }
            | Statement::For { location, .. }
            | Statement::ForOf { location, .. }
            | Statement::Return { location, .. }
            | Statement::Break { location }
            | Statement::Continue { location } => *location,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Statement::VariableDeclaration { .. } => "VariableDeclaration",
            Statement::Expression { .. } => "ExpressionStatement",
            Statement::Block { .. } => "BlockStatement",
            Statement::If { .. } => "IfStatement",
            Statement::While { .. } => "WhileStatement",
            Statement::For { .. } => "ForStatement",
            Statement::ForOf { .. } => "ForOfStatement",
            Statement::Function(_) => "FunctionDeclaration",
            Statement::Return { .. } => "ReturnStatement",
            Statement::Break { .. } => "BreakStatement",
            Statement::Continue { .. } => "ContinueStatement",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}
