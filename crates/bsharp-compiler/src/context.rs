//! CompilationContext - the state shared by the passes of one compilation.
//!
//! Every table here is created fresh for each compilation unit and dropped
//! with it. Nothing is global, so independent compilations (sequential or on
//! different threads) never observe each other.
//!
//! ```text
//! Pass 1  ──► methods
//! Pass 2  ──► methods (intrinsics), scopes, types, node_scopes
//! Pass 3  ──► diagnostics, variable initialization flags
//! Pass 4  ◄── reads everything above
//! ```

use bsharp_core::{DataType, Diagnostic, Diagnostics, InternalError, NodeId};
use rustc_hash::FxHashMap;

use crate::registry::MethodTable;
use crate::scope::{ScopeId, ScopeTree};

/// Tables built up by the passes of one compilation.
#[derive(Debug, Clone, Default)]
pub struct CompilationContext {
    /// Method signatures.
    pub methods: MethodTable,
    /// Every scope built by Pass 2.
    pub scopes: ScopeTree,
    /// Inferred type per node.
    ///
    /// Relational and logical nodes record their operand type here (their
    /// result is always bool), `WriteLine` records the printed type, and an
    /// expression statement records the type of the value it discards.
    types: FxHashMap<NodeId, DataType>,
    /// Scope opened by a method, block, if, else, or while node.
    node_scopes: FxHashMap<NodeId, ScopeId>,
    diagnostics: Diagnostics,
}

impl CompilationContext {
    pub fn new() -> Self {
        Self::default()
    }

    // ==========================================================================
    // Annotations
    // ==========================================================================

    /// Record the type of `node`. Unresolved types are not recorded.
    pub fn annotate(&mut self, node: NodeId, ty: Option<DataType>) {
        if let Some(ty) = ty {
            self.types.insert(node, ty);
        }
    }

    /// The type recorded for `node`, if any.
    pub fn type_of(&self, node: NodeId) -> Option<DataType> {
        self.types.get(&node).copied()
    }

    /// The type recorded for `node`, which must exist.
    pub fn expect_type(&self, node: NodeId) -> Result<DataType, InternalError> {
        self.type_of(node)
            .ok_or(InternalError::MissingType { node })
    }

    /// Record the scope opened by `node`.
    pub fn bind_scope(&mut self, node: NodeId, scope: ScopeId) {
        self.node_scopes.insert(node, scope);
    }

    /// The scope opened by `node`.
    pub fn scope_of(&self, node: NodeId) -> Result<ScopeId, InternalError> {
        self.node_scopes
            .get(&node)
            .copied()
            .ok_or(InternalError::MissingScope { node })
    }

    // ==========================================================================
    // Diagnostics
    // ==========================================================================

    pub fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Diagnostics {
        std::mem::take(&mut self.diagnostics)
    }
}
