//! Statement nodes.
//!
//! Provides nodes for:
//! - Expression statements
//! - Variable declarations (explicitly typed or inferred with `var`)
//! - Control flow (if/else, while)
//! - Return
//! - Blocks

use bsharp_core::{DataType, NodeId, Span};

use crate::ast::Ident;
use crate::ast::expr::Expr;

/// A statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stmt<'ast> {
    /// Expression statement (expr;)
    Expr(ExprStmt<'ast>),
    /// Variable declaration
    VarDecl(VarDeclStmt<'ast>),
    /// Return statement
    Return(ReturnStmt<'ast>),
    /// Block statement
    Block(Block<'ast>),
    /// If statement
    If(&'ast IfStmt<'ast>),
    /// While loop
    While(&'ast WhileStmt<'ast>),
}

impl<'ast> Stmt<'ast> {
    /// Get the node id of this statement.
    pub fn id(&self) -> NodeId {
        match self {
            Self::Expr(s) => s.id,
            Self::VarDecl(s) => s.id,
            Self::Return(s) => s.id,
            Self::Block(s) => s.id,
            Self::If(s) => s.id,
            Self::While(s) => s.id,
        }
    }

    /// Get the span of this statement.
    pub fn span(&self) -> Span {
        match self {
            Self::Expr(s) => s.span,
            Self::VarDecl(s) => s.span,
            Self::Return(s) => s.span,
            Self::Block(s) => s.span,
            Self::If(s) => s.span,
            Self::While(s) => s.span,
        }
    }
}

/// An expression statement (expression followed by semicolon).
///
/// A value produced by the expression is discarded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExprStmt<'ast> {
    pub id: NodeId,
    /// The expression
    pub expr: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// The declared type of a variable declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSpec {
    /// A primitive type keyword (`int x`)
    Explicit(DataType),
    /// `var x = ...`, typed by its initializer
    Inferred,
}

/// A variable declaration statement.
///
/// Examples:
/// - `int x;`
/// - `int x = 5;`
/// - `int x = 5, y = 10;`
/// - `var s = ReadLine();`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarDeclStmt<'ast> {
    pub id: NodeId,
    /// The type of the variable(s)
    pub ty: TypeSpec,
    /// Variable declarations (can be multiple)
    pub vars: &'ast [VarDeclarator<'ast>],
    /// Source location
    pub span: Span,
}

/// A single variable declarator within a variable declaration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarDeclarator<'ast> {
    pub id: NodeId,
    /// Variable name
    pub name: Ident<'ast>,
    /// Optional initializer
    pub init: Option<&'ast Expr<'ast>>,
    /// Source location
    pub span: Span,
}

/// A return statement.
///
/// Examples:
/// - `return;`
/// - `return expr;`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnStmt<'ast> {
    pub id: NodeId,
    /// Optional return value
    pub value: Option<&'ast Expr<'ast>>,
    /// Source location
    pub span: Span,
}

/// A block of statements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Block<'ast> {
    pub id: NodeId,
    /// Statements in the block
    pub stmts: &'ast [Stmt<'ast>],
    /// Source location, from `{` to `}`
    pub span: Span,
}

/// An if statement.
///
/// Examples:
/// - `if (condition) statement`
/// - `if (condition) statement else statement`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IfStmt<'ast> {
    pub id: NodeId,
    /// Condition
    pub condition: &'ast Expr<'ast>,
    /// Then branch
    pub then_stmt: &'ast Stmt<'ast>,
    /// Optional else branch
    pub else_clause: Option<ElseClause<'ast>>,
    /// Source location
    pub span: Span,
}

/// The `else` part of an if statement.
///
/// It has its own id because the else branch opens its own scope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElseClause<'ast> {
    pub id: NodeId,
    /// The statement run when the condition is false
    pub stmt: &'ast Stmt<'ast>,
    /// Source location
    pub span: Span,
}

/// A while loop.
///
/// Example: `while (condition) statement`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WhileStmt<'ast> {
    pub id: NodeId,
    /// Condition
    pub condition: &'ast Expr<'ast>,
    /// Body
    pub body: &'ast Stmt<'ast>,
    /// Source location
    pub span: Span,
}
