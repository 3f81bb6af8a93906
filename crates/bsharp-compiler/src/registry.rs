//! The method table of one compilation unit.
//!
//! Pass 1 registers every declared method before any body is analysed, so a
//! method may call another declared further down. Pass 2 adds one entry per
//! intrinsic it meets, which lets duplicate detection treat a user method
//! named after a built-in like any other clash.

use bsharp_core::{DataType, Span};

/// Where a method entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodOrigin {
    /// A method declared in the program.
    Declared,
    /// A built-in intrinsic seen at a call site.
    Intrinsic,
}

/// A method signature.
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub return_type: DataType,
    pub param_types: Vec<DataType>,
    pub origin: MethodOrigin,
    /// Declaration site (the first call site for intrinsics).
    pub span: Span,
}

/// Every method known to one compilation unit, in registration order.
///
/// Several entries may share a name; lookups return the first.
#[derive(Debug, Clone, Default)]
pub struct MethodTable {
    methods: Vec<Method>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a method declared in the program.
    pub fn register(
        &mut self,
        name: &str,
        return_type: DataType,
        param_types: Vec<DataType>,
        span: Span,
    ) {
        self.methods.push(Method {
            name: name.to_string(),
            return_type,
            param_types,
            origin: MethodOrigin::Declared,
            span,
        });
    }

    /// Register an intrinsic the first time it is used.
    pub fn register_intrinsic(
        &mut self,
        name: &str,
        return_type: DataType,
        param_types: Vec<DataType>,
        span: Span,
    ) {
        let known = self
            .methods
            .iter()
            .any(|m| m.origin == MethodOrigin::Intrinsic && m.name == name);
        if !known {
            self.methods.push(Method {
                name: name.to_string(),
                return_type,
                param_types,
                origin: MethodOrigin::Intrinsic,
                span,
            });
        }
    }

    /// The first declared method named `name`.
    pub fn find(&self, name: &str) -> Option<&Method> {
        self.methods
            .iter()
            .find(|m| m.origin == MethodOrigin::Declared && m.name == name)
    }

    /// Whether any entry, declared or intrinsic, is named `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.methods.iter().any(|m| m.name == name)
    }

    /// Number of entries named `name`, intrinsics included.
    pub fn count(&self, name: &str) -> usize {
        self.methods.iter().filter(|m| m.name == name).count()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Method> {
        self.methods.iter()
    }
}
