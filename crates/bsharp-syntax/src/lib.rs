//! BSharp syntax tree crate.
//!
//! This crate defines the syntax tree the compiler consumes. Trees are
//! produced by an external front-end (or by [`AstBuilder`] in tests and
//! tools) and allocated in a [`bumpalo::Bump`] arena, so every node borrows
//! its children for the `'ast` lifetime of that arena.
//!
//! # Example
//!
//! ```
//! use bsharp_core::{DataType, Span};
//! use bsharp_syntax::{AstBuilder, Intrinsic, LiteralKind};
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//!
//! // void Main() { WriteLine("hi"); }
//! let hello = b.literal(LiteralKind::String("hi"), Span::line(2));
//! let print = b.intrinsic(Intrinsic::WriteLine(hello), Span::line(2));
//! let body = b.block(vec![b.expr_stmt(print, Span::line(2))], Span::lines(1, 3));
//! let main = b.method("Main", None, vec![], body, Span::lines(1, 3));
//! let program = b.program(vec![main]);
//!
//! assert_eq!(program.methods.len(), 1);
//! assert_eq!(program.methods[0].return_type(), DataType::Void);
//! ```

pub mod ast;

pub use ast::*;
