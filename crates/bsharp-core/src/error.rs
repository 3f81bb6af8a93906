//! Error types for the BSharp compiler.
//!
//! ## Error Hierarchy
//!
//! ```text
//! CompileError (top-level wrapper)
//! ├── Diagnostics    - every semantic violation found in one compilation unit
//! │   └── Diagnostic - one SemanticError anchored to a node's span
//! └── InternalError  - a broken invariant between the front-end and the passes
//! ```
//!
//! Semantic errors are expected: the checker collects all of them and the
//! compilation fails once with the whole list. Internal errors mean the tree
//! or the pass pipeline itself is inconsistent, and are never produced for a
//! tree the checker has accepted.

use std::fmt;

use thiserror::Error;

use crate::{DataType, NodeId, Span};

// ============================================================================
// Semantic Errors
// ============================================================================

/// A rule of the language violated by the program being compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    /// A variable whose type could not be inferred.
    #[error("{name} does not have a known type.")]
    UnknownType { name: String },

    /// Two types that must agree differ.
    #[error("Types do not match, {expected} {found}.")]
    TypeMismatch { expected: String, found: String },

    /// The program declares no entry point.
    #[error("No Main method has been found.")]
    MissingMain,

    /// The entry point declares parameters.
    #[error("The Main method can not have any parameters.")]
    MainHasParameters,

    /// A method name declared more than once.
    #[error("Multiple methods found with the same identifier of {name}.")]
    DuplicateMethod { name: String },

    /// A call to a method that is not declared.
    #[error("Method {name} does not exist.")]
    UnknownMethod { name: String },

    /// A call whose argument count differs from the declaration.
    #[error("Method {name} expects {expected} arguments but {found} were given.")]
    ArgumentCountMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    /// A non-void method without a return statement in its body.
    #[error("Method {name} is missing a return statement.")]
    MissingReturn { name: String },

    /// A print of a value that has no console representation.
    #[error("Unable to print a {ty} to the console.")]
    UnprintableType { ty: DataType },

    /// A variable declared with a type that cannot hold values.
    #[error("{ty} can not be used for variable {name}.")]
    InvalidVariableType { ty: DataType, name: String },

    /// A name used as a variable that refers to a method.
    #[error("{name} is not a variable.")]
    NotAVariable { name: String },

    /// A read of a variable before any value was assigned.
    #[error("{name} has not been initialized yet.")]
    Uninitialized { name: String },

    /// A variable declared twice within one method body.
    #[error(
        "Multiple variables found with the same identifier of {name} in the same scope."
    )]
    DuplicateVariable { name: String },

    /// A reference to a variable that is not in scope.
    #[error("Variable {name} does not exist in the current scope.")]
    UnknownVariable { name: String },

    /// An assignment whose left side is not a plain identifier.
    #[error("Assignment target must be a variable.")]
    InvalidAssignmentTarget,

    /// An operator applied to a type that does not support it.
    #[error("{ty} does not support the {op} operator.")]
    UnsupportedOperator { ty: String, op: String },
}

impl SemanticError {
    /// Build a type mismatch from two possibly unresolved types.
    pub fn mismatch(expected: Option<DataType>, found: Option<DataType>) -> Self {
        SemanticError::TypeMismatch {
            expected: DataType::describe(expected),
            found: DataType::describe(found),
        }
    }

    /// Build an unsupported operator error for a possibly unresolved type.
    pub fn unsupported_operator(ty: Option<DataType>, op: impl fmt::Display) -> Self {
        SemanticError::UnsupportedOperator {
            ty: DataType::describe(ty),
            op: op.to_string(),
        }
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Which end of a node a diagnostic points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Anchor {
    /// The node's first token.
    #[default]
    Start,
    /// The node's last token, e.g. the closing brace of a body.
    End,
}

/// One semantic violation anchored to a node of the syntax tree.
///
/// The reported line is resolved from the span only when the diagnostic is
/// rendered, so the anchor decides which end of the node is shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub error: SemanticError,
    pub span: Span,
    pub anchor: Anchor,
}

impl Diagnostic {
    /// A diagnostic pointing at the start of a node.
    pub fn at_start(error: SemanticError, span: Span) -> Self {
        Self {
            error,
            span,
            anchor: Anchor::Start,
        }
    }

    /// A diagnostic pointing at the end of a node.
    pub fn at_end(error: SemanticError, span: Span) -> Self {
        Self {
            error,
            span,
            anchor: Anchor::End,
        }
    }

    /// The 1-based source line this diagnostic is reported on.
    pub fn line(&self) -> u32 {
        match self.anchor {
            Anchor::Start => self.span.start_line(),
            Anchor::End => self.span.end_line(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {} - {}", self.line(), self.error)
    }
}

/// Every diagnostic recorded for one compilation unit, in recording order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Rendered `Line <n> - <message>` strings in recording order.
    pub fn lines(&self) -> Vec<String> {
        self.items.iter().map(ToString::to_string).collect()
    }

    /// `Ok(())` when nothing was recorded, otherwise the aggregate failure.
    pub fn into_result(self) -> Result<(), Diagnostics> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Errors found.", self.items.len())?;
        for diagnostic in &self.items {
            write!(f, "\n{}", diagnostic)?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// ============================================================================
// Internal Errors
// ============================================================================

/// A broken invariant between the syntax tree and the compiler passes.
///
/// These are only reachable by trees the semantic checker never certified
/// (for example when code generation is driven directly on invalid input).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalError {
    /// A node that should own a scope has none recorded.
    #[error("internal error: no scope recorded for {node}")]
    MissingScope { node: NodeId },

    /// A node that should carry a type annotation has none.
    #[error("internal error: no type recorded for {node}")]
    MissingType { node: NodeId },

    /// A name that should resolve in the current scope chain does not.
    #[error("internal error: '{name}' is not bound in the current scope")]
    UnresolvedSymbol { name: String },

    /// A name expected to be a variable resolved to a method.
    #[error(
        "internal error: '{name}' resolved to a method where a variable was expected"
    )]
    NotAVariable { name: String },

    /// A method call whose callee is missing from the method table.
    #[error("internal error: method '{name}' is not registered")]
    UnknownMethod { name: String },

    /// A type that has no instruction form in the given position.
    #[error("internal error: no {context} instruction for type {ty}")]
    NoInstructionFor { ty: DataType, context: &'static str },
}

// ============================================================================
// Top-level Error
// ============================================================================

/// The failure of one compilation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The program violates one or more language rules.
    #[error(transparent)]
    Semantic(#[from] Diagnostics),

    /// The compiler reached an inconsistent state.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl CompileError {
    /// Check if this is a semantic failure.
    pub fn is_semantic(&self) -> bool {
        matches!(self, CompileError::Semantic(_))
    }

    /// Check if this is an internal failure.
    pub fn is_internal(&self) -> bool {
        matches!(self, CompileError::Internal(_))
    }

    /// The diagnostics of a semantic failure.
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        match self {
            CompileError::Semantic(diagnostics) => Some(diagnostics),
            CompileError::Internal(_) => None,
        }
    }
}
