//! Symbols bound in a scope.
//!
//! A name resolves either to a variable with a local slot or to a method
//! signature. [`Symbol`] is a closed sum over the two so every lookup site
//! has to handle both.

use bsharp_core::{DataType, NodeId};

/// A named entity resolvable through a scope chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Variable(VariableSymbol),
    Method(MethodSymbol),
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Variable(v) => &v.name,
            Symbol::Method(m) => &m.name,
        }
    }

    /// Type of the value the symbol yields when read or called.
    ///
    /// `None` when the variable's type could not be inferred.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Symbol::Variable(v) => v.data_type,
            Symbol::Method(m) => Some(m.return_type),
        }
    }

    pub fn as_variable(&self) -> Option<&VariableSymbol> {
        match self {
            Symbol::Variable(v) => Some(v),
            Symbol::Method(_) => None,
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Symbol::Variable(_))
    }
}

/// A local variable or parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableSymbol {
    pub name: String,
    /// Declared or inferred type, `None` if inference failed.
    pub data_type: Option<DataType>,
    /// Local slot, stable for the variable's lifetime.
    pub slot: u32,
    /// Whether a value has been stored into the variable.
    pub initialized: bool,
    /// The declarator, parameter, or program node that introduced it.
    pub declared_at: NodeId,
}

/// A method used from within a scope.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSymbol {
    pub name: String,
    pub return_type: DataType,
    pub param_types: Vec<DataType>,
}
