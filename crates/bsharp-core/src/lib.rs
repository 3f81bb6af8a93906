//! Core types shared by every stage of the BSharp compiler.
//!
//! This crate holds the vocabulary the syntax tree and the compiler passes
//! agree on: source spans, node identities, the closed set of data types,
//! and the error types surfaced to callers.

mod data_type;
mod error;
mod ids;
mod span;

pub use data_type::DataType;
pub use error::{Anchor, CompileError, Diagnostic, Diagnostics, InternalError, SemanticError};
pub use ids::NodeId;
pub use span::Span;
