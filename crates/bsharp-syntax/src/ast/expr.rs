//! Expression nodes.
//!
//! Provides nodes for:
//! - Literals (int, float, bool, char, string)
//! - Identifier references
//! - Binary arithmetic, relational and logical operations
//! - Unary negation (`!`)
//! - Assignment
//! - Calls to user methods
//! - Built-in intrinsics (console output and input, random numbers)

use bsharp_core::{DataType, NodeId, Span};

use crate::ast::{BinaryOp, Ident, UnaryOp};

/// An expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expr<'ast> {
    /// Literal value
    Literal(LiteralExpr<'ast>),
    /// Identifier reference
    Ident(IdentExpr<'ast>),
    /// Binary operation
    Binary(&'ast BinaryExpr<'ast>),
    /// Unary prefix operation
    Unary(&'ast UnaryExpr<'ast>),
    /// Assignment
    Assign(&'ast AssignExpr<'ast>),
    /// Call to a user-declared method
    Call(&'ast CallExpr<'ast>),
    /// Built-in intrinsic
    Intrinsic(&'ast IntrinsicExpr<'ast>),
}

impl<'ast> Expr<'ast> {
    /// Get the node id of this expression.
    pub fn id(&self) -> NodeId {
        match self {
            Self::Literal(e) => e.id,
            Self::Ident(e) => e.id,
            Self::Binary(e) => e.id,
            Self::Unary(e) => e.id,
            Self::Assign(e) => e.id,
            Self::Call(e) => e.id,
            Self::Intrinsic(e) => e.id,
        }
    }

    /// Get the span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Self::Literal(e) => e.span,
            Self::Ident(e) => e.span,
            Self::Binary(e) => e.span,
            Self::Unary(e) => e.span,
            Self::Assign(e) => e.span,
            Self::Call(e) => e.span,
            Self::Intrinsic(e) => e.span,
        }
    }

    /// The identifier, if this expression is a plain name.
    pub fn as_ident(&self) -> Option<&IdentExpr<'ast>> {
        match self {
            Self::Ident(e) => Some(e),
            _ => None,
        }
    }
}

/// A literal value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiteralExpr<'ast> {
    pub id: NodeId,
    /// The literal kind
    pub kind: LiteralKind<'ast>,
    /// Source location
    pub span: Span,
}

/// The kind of literal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LiteralKind<'ast> {
    /// Integer literal
    Int(i64),
    /// Float literal
    Float(f32),
    /// Boolean literal
    Bool(bool),
    /// Character literal
    Char(char),
    /// String literal, without the surrounding quotes
    String(&'ast str),
}

impl LiteralKind<'_> {
    /// The type of this literal.
    pub fn data_type(&self) -> DataType {
        match self {
            LiteralKind::Int(_) => DataType::Int,
            LiteralKind::Float(_) => DataType::Float,
            LiteralKind::Bool(_) => DataType::Bool,
            LiteralKind::Char(_) => DataType::Char,
            LiteralKind::String(_) => DataType::String,
        }
    }
}

/// An identifier expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IdentExpr<'ast> {
    pub id: NodeId,
    /// The identifier
    pub ident: Ident<'ast>,
    /// Source location
    pub span: Span,
}

/// A binary operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryExpr<'ast> {
    pub id: NodeId,
    /// Left operand
    pub left: &'ast Expr<'ast>,
    /// Operator
    pub op: BinaryOp,
    /// Right operand
    pub right: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// A unary prefix operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnaryExpr<'ast> {
    pub id: NodeId,
    /// Operator
    pub op: UnaryOp,
    /// Operand
    pub operand: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// An assignment expression (`target = value`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssignExpr<'ast> {
    pub id: NodeId,
    /// Left-hand side. Only a plain identifier is a valid target.
    pub target: &'ast Expr<'ast>,
    /// Right-hand side
    pub value: &'ast Expr<'ast>,
    /// Source location
    pub span: Span,
}

/// A call to a method declared in the program.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallExpr<'ast> {
    pub id: NodeId,
    /// The method being called
    pub callee: Ident<'ast>,
    /// Arguments, evaluated left to right
    pub args: &'ast [Expr<'ast>],
    /// Source location
    pub span: Span,
}

/// A call to one of the built-in intrinsics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntrinsicExpr<'ast> {
    pub id: NodeId,
    pub kind: Intrinsic<'ast>,
    /// Source location
    pub span: Span,
}

/// The built-in intrinsics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intrinsic<'ast> {
    /// `WriteLine(expr)`: print a value followed by a newline
    WriteLine(&'ast Expr<'ast>),
    /// `ReadInt()`
    ReadInt,
    /// `ReadFloat()`
    ReadFloat,
    /// `ReadBool()`
    ReadBool,
    /// `ReadLine()`
    ReadLine,
    /// `RandomInt()` or `RandomInt(bound)`
    RandomInt(Option<&'ast Expr<'ast>>),
}

impl<'ast> Intrinsic<'ast> {
    /// The name the intrinsic is called by.
    pub fn name(&self) -> &'static str {
        match self {
            Intrinsic::WriteLine(_) => "WriteLine",
            Intrinsic::ReadInt => "ReadInt",
            Intrinsic::ReadFloat => "ReadFloat",
            Intrinsic::ReadBool => "ReadBool",
            Intrinsic::ReadLine => "ReadLine",
            Intrinsic::RandomInt(_) => "RandomInt",
        }
    }

    /// The type of the value the intrinsic produces.
    pub fn result_type(&self) -> DataType {
        match self {
            Intrinsic::WriteLine(_) => DataType::Void,
            Intrinsic::ReadInt | Intrinsic::RandomInt(_) => DataType::Int,
            Intrinsic::ReadFloat => DataType::Float,
            Intrinsic::ReadBool => DataType::Bool,
            Intrinsic::ReadLine => DataType::String,
        }
    }

    /// The argument expression, if the intrinsic takes one.
    pub fn argument(&self) -> Option<&'ast Expr<'ast>> {
        match *self {
            Intrinsic::WriteLine(arg) => Some(arg),
            Intrinsic::RandomInt(bound) => bound,
            _ => None,
        }
    }

    /// Whether the intrinsic reads from the console.
    pub fn is_console_read(&self) -> bool {
        matches!(
            self,
            Intrinsic::ReadInt | Intrinsic::ReadFloat | Intrinsic::ReadBool | Intrinsic::ReadLine
        )
    }
}
