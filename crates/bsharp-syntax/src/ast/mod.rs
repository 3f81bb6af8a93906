//! Syntax tree for BSharp programs.
//!
//! This module provides:
//! - Node definitions for declarations, statements and expressions
//! - Operator enums
//! - [`AstBuilder`] for allocating nodes with fresh [`NodeId`]s
//!
//! A program is a flat list of method declarations. Every node carries a
//! [`NodeId`] so the compiler can annotate it through side tables, and a
//! [`Span`] covering its first and last token.
//!
//! [`NodeId`]: bsharp_core::NodeId
//! [`Span`]: bsharp_core::Span

pub mod builder;
pub mod decl;
pub mod expr;
pub mod node;
pub mod ops;
pub mod stmt;

pub use builder::AstBuilder;
pub use decl::*;
pub use expr::*;
pub use node::*;
pub use ops::*;
pub use stmt::*;
