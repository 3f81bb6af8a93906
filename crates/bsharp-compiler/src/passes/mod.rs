//! Compiler passes.
//!
//! - [`signatures`]: Pass 1 - register every method signature
//! - [`annotate`]: Pass 2 - build scopes, infer types, account stack and locals
//! - [`check`]: Pass 3 - validate language rules and aggregate diagnostics
//! - [`codegen`]: Pass 4 - emit instructions
//!
//! Each pass borrows the [`CompilationContext`](crate::CompilationContext)
//! and consumes itself in `run`.

pub mod annotate;
pub mod check;
pub mod codegen;
pub mod signatures;

pub use annotate::{AnnotationOutput, AnnotationPass};
pub use check::CheckPass;
pub use codegen::CodegenPass;
pub use signatures::{SignatureOutput, SignaturePass};
