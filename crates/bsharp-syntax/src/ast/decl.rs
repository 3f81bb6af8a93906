//! Top-level declaration nodes.

use bsharp_core::{DataType, NodeId, Span};

use crate::ast::Ident;
use crate::ast::stmt::Block;

/// A whole compilation unit: a list of method declarations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Program<'ast> {
    pub id: NodeId,
    /// Methods in declaration order
    pub methods: &'ast [MethodDecl<'ast>],
    /// Source location
    pub span: Span,
}

impl<'ast> Program<'ast> {
    /// The first method with the given name.
    pub fn find_method(&self, name: &str) -> Option<&MethodDecl<'ast>> {
        self.methods.iter().find(|m| m.name.name == name)
    }
}

/// A method declaration.
///
/// Example:
/// ```text
/// int Add(int a, int b) {
///     return a + b;
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MethodDecl<'ast> {
    pub id: NodeId,
    /// Method name
    pub name: Ident<'ast>,
    /// Declared return type (`None` for void)
    pub return_type: Option<DataType>,
    /// Parameters
    pub params: &'ast [Param<'ast>],
    /// Body
    pub body: Block<'ast>,
    /// Source location
    pub span: Span,
}

impl MethodDecl<'_> {
    /// The return type, with `void` made explicit.
    pub fn return_type(&self) -> DataType {
        self.return_type.unwrap_or(DataType::Void)
    }

    /// Parameter types in declaration order.
    pub fn param_types(&self) -> Vec<DataType> {
        self.params.iter().map(|p| p.ty).collect()
    }
}

/// A method parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Param<'ast> {
    pub id: NodeId,
    /// Parameter type
    pub ty: DataType,
    /// Parameter name
    pub name: Ident<'ast>,
    /// Source location
    pub span: Span,
}
