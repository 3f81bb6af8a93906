//! Lexical scopes with stack and local-slot bookkeeping.
//!
//! This module provides [`ScopeTree`], the arena holding every scope built
//! while annotating one compilation unit. It handles:
//! - Variable declaration with local slot allocation
//! - Method symbols registered at call sites
//! - Nearest-enclosing lookup along the parent chain
//! - Operand-stack and local-slot high-water marks per scope
//!
//! Scopes refer to their parent by [`ScopeId`]; nothing points downward, so
//! the tree is just a `Vec` that grows while Pass 2 walks the syntax tree.
//!
//! ## Accounting
//!
//! ```text
//! root            this = slot 0
//! └─ method       params, max_stack / max_locals read by code generation
//!    └─ block     locals get slot = variables visible here
//!       ├─ if     ┐ siblings reuse the same slots
//!       └─ else   ┘
//! ```
//!
//! A child starts with an empty operand stack and inherits the parent's
//! maximum (except below the root, which holds no code). Leaving a child
//! raises the parent's maxima to the child's.

use bsharp_core::{DataType, NodeId};
use rustc_hash::FxHashMap;

use crate::symbol::{MethodSymbol, Symbol, VariableSymbol};

// ============================================================================
// Types
// ============================================================================

/// Index of a scope in a [`ScopeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    /// The root scope of every tree.
    pub const ROOT: ScopeId = ScopeId(0);

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One lexical scope.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    /// Enclosing scope, `None` for the root.
    parent: Option<ScopeId>,
    /// Symbols declared directly in this scope.
    symbols: FxHashMap<String, Symbol>,
    /// How many times each variable name was declared here.
    declarations: FxHashMap<String, u32>,
    /// Operand stack depth at the current point of the walk.
    stack_depth: u32,
    /// Deepest operand stack seen in this scope or its children.
    max_stack: u32,
    /// Most local slots simultaneously in use in this scope or its children.
    max_locals: u32,
    /// A return statement appears directly in this scope.
    has_return: bool,
}

impl Scope {
    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn stack_depth(&self) -> u32 {
        self.stack_depth
    }

    pub fn has_return(&self) -> bool {
        self.has_return
    }

    fn variable_count(&self) -> u32 {
        self.symbols.values().filter(|s| s.is_variable()).count() as u32
    }
}

// ============================================================================
// ScopeTree
// ============================================================================

/// Every scope of one compilation unit.
#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl ScopeTree {
    /// Create a tree holding only an empty root scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::default()],
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId::ROOT
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    fn get_mut(&mut self, id: ScopeId) -> &mut Scope {
        &mut self.scopes[id.index()]
    }

    /// Number of scopes, root included.
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// The chain from `id` up to the root, nearest first.
    pub fn ancestors(&self, id: ScopeId) -> impl Iterator<Item = (ScopeId, &Scope)> {
        std::iter::successors(Some(id), |&id| self.get(id).parent)
            .map(|id| (id, self.get(id)))
    }

    // ==========================================================================
    // Scope Management
    // ==========================================================================

    /// Open a child of `parent` and return its id.
    pub fn enter_child(&mut self, parent: ScopeId) -> ScopeId {
        let inherited_stack = if parent == ScopeId::ROOT {
            0
        } else {
            self.get(parent).max_stack
        };
        let live_locals = self.visible_variable_count(parent);

        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            parent: Some(parent),
            max_stack: inherited_stack,
            max_locals: live_locals,
            ..Scope::default()
        });
        id
    }

    /// Close `id`, raising its parent's maxima to its own, and return the
    /// parent. Returns `None` for the root.
    pub fn exit_to_parent(&mut self, id: ScopeId) -> Option<ScopeId> {
        let scope = self.get(id);
        let parent = scope.parent?;
        let (max_stack, max_locals) = (scope.max_stack, scope.max_locals);

        let parent_scope = self.get_mut(parent);
        parent_scope.max_stack = parent_scope.max_stack.max(max_stack);
        parent_scope.max_locals = parent_scope.max_locals.max(max_locals);
        Some(parent)
    }

    // ==========================================================================
    // Declaration
    // ==========================================================================

    /// Declare a variable in `scope` and return its slot.
    ///
    /// The slot is the number of variables visible from `scope`, so two
    /// variables that are live at the same time never share a slot while
    /// sibling blocks reuse the same ones. Redeclaring a name in the same
    /// scope replaces the symbol but is still counted.
    pub fn declare_variable(
        &mut self,
        scope: ScopeId,
        name: &str,
        data_type: Option<DataType>,
        initialized: bool,
        declared_at: NodeId,
    ) -> u32 {
        let slot = self.visible_variable_count(scope);
        let entry = self.get_mut(scope);
        entry.symbols.insert(
            name.to_string(),
            Symbol::Variable(VariableSymbol {
                name: name.to_string(),
                data_type,
                slot,
                initialized,
                declared_at,
            }),
        );
        *entry.declarations.entry(name.to_string()).or_default() += 1;
        entry.max_locals = entry.max_locals.max(slot + 1);
        slot
    }

    /// Record that `scope` uses a method. An existing symbol of the same
    /// name is kept.
    pub fn declare_method(
        &mut self,
        scope: ScopeId,
        name: &str,
        return_type: DataType,
        param_types: Vec<DataType>,
    ) {
        self.get_mut(scope)
            .symbols
            .entry(name.to_string())
            .or_insert_with(|| {
                Symbol::Method(MethodSymbol {
                    name: name.to_string(),
                    return_type,
                    param_types,
                })
            });
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Find the nearest symbol named `name` from `scope` outward.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        self.resolve(scope, name, |_| true)
            .map(|(_, symbol)| symbol)
    }

    /// Find the nearest symbol named `name` accepted by `visible`, together
    /// with the scope declaring it. Rejected symbols are skipped and the
    /// search continues outward.
    pub fn resolve(
        &self,
        scope: ScopeId,
        name: &str,
        visible: impl Fn(&Symbol) -> bool,
    ) -> Option<(ScopeId, &Symbol)> {
        self.ancestors(scope).find_map(|(id, s)| {
            s.symbols
                .get(name)
                .filter(|symbol| visible(symbol))
                .map(|symbol| (id, symbol))
        })
    }

    /// Mark the variable `name` declared directly in `scope` as initialized.
    ///
    /// Returns `false` if no such variable exists there.
    pub fn mark_initialized(&mut self, scope: ScopeId, name: &str) -> bool {
        match self.get_mut(scope).symbols.get_mut(name) {
            Some(Symbol::Variable(var)) => {
                var.initialized = true;
                true
            }
            _ => false,
        }
    }

    /// How many times `name` was declared as a variable in `scope` and its
    /// ancestors. The root scope is not counted.
    pub fn count_declarations_of(&self, scope: ScopeId, name: &str) -> u32 {
        self.ancestors(scope)
            .filter(|(id, _)| *id != ScopeId::ROOT)
            .map(|(_, s)| s.declarations.get(name).copied().unwrap_or(0))
            .sum()
    }

    /// Number of variables visible from `scope`, root included.
    pub fn visible_variable_count(&self, scope: ScopeId) -> u32 {
        self.ancestors(scope).map(|(_, s)| s.variable_count()).sum()
    }

    // ==========================================================================
    // Stack Accounting
    // ==========================================================================

    /// Account for `n` values pushed onto the operand stack.
    pub fn push_stack(&mut self, scope: ScopeId, n: u32) {
        let entry = self.get_mut(scope);
        entry.stack_depth += n;
        entry.max_stack = entry.max_stack.max(entry.stack_depth);
    }

    /// Account for `n` values popped off the operand stack.
    pub fn pop_stack(&mut self, scope: ScopeId, n: u32) {
        let entry = self.get_mut(scope);
        entry.stack_depth = entry.stack_depth.saturating_sub(n);
    }

    pub fn mark_return(&mut self, scope: ScopeId) {
        self.get_mut(scope).has_return = true;
    }

    /// Deepest operand stack required by `scope` and everything below it.
    pub fn max_stack(&self, scope: ScopeId) -> u32 {
        self.get(scope).max_stack
    }

    /// Local slots required by `scope` and everything below it.
    pub fn max_locals(&self, scope: ScopeId) -> u32 {
        let entry = self.get(scope);
        entry.max_locals.max(self.visible_variable_count(scope))
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
