//! DataType - the closed set of value types a BSharp program can name.
//!
//! There is no implicit widening between types: two types are compatible
//! only when they are the same variant.
//!
//! # Example
//!
//! ```
//! use bsharp_core::DataType;
//!
//! assert_eq!(DataType::Int.to_string(), "int");
//! assert_eq!(DataType::describe(None), "null");
//! ```

use std::fmt::{self, Display, Formatter};

/// The type of a value, variable, or method result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Int,
    Float,
    Bool,
    String,
    Char,
    /// No value. Only valid as a method return type.
    Void,
    /// The type of the implicit self reference of the compiled class.
    ClassSelf,
}

impl DataType {
    /// Source keyword of this type.
    pub const fn keyword(self) -> &'static str {
        match self {
            DataType::Int => "int",
            DataType::Float => "float",
            DataType::Bool => "bool",
            DataType::String => "string",
            DataType::Char => "char",
            DataType::Void => "void",
            DataType::ClassSelf => "class",
        }
    }

    /// Whether values of this type can be printed, stored, or passed around.
    #[inline]
    pub const fn is_value(self) -> bool {
        !matches!(self, DataType::Void | DataType::ClassSelf)
    }

    /// Whether this type supports the arithmetic operators.
    #[inline]
    pub const fn is_numeric(self) -> bool {
        matches!(self, DataType::Int | DataType::Float | DataType::Char)
    }

    /// Format a possibly unresolved type for a diagnostic message.
    pub fn describe(ty: Option<DataType>) -> String {
        match ty {
            Some(ty) => ty.keyword().to_string(),
            None => "null".to_string(),
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
