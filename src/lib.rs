//! BSharp: a compiler backend from a checked syntax tree to stack-machine
//! assembler text.
//!
//! This crate ties the workspace together. The syntax tree lives in
//! [`syntax`], shared vocabulary in [`core`], and the four passes in
//! [`compiler`].

pub use bsharp_compiler as compiler;
pub use bsharp_core as core;
pub use bsharp_syntax as syntax;

pub use bsharp_compiler::{CompileOptions, CompiledUnit, Compiler};
pub use bsharp_core::{CompileError, Diagnostic, Diagnostics, InternalError, SemanticError};

// Re-export main types
pub mod prelude {
    pub use bsharp_compiler::emit::{Instruction, max_stack_depth};
    pub use bsharp_compiler::{
        CompilationContext, CompileOptions, CompiledMethod, CompiledUnit, Compiler, MethodAccess,
    };
    pub use bsharp_core::{
        CompileError, DataType, Diagnostic, Diagnostics, InternalError, SemanticError, Span,
    };
    pub use bsharp_syntax::{AstBuilder, BinaryOp, Intrinsic, LiteralKind, Program, TypeSpec};
    pub use bumpalo::Bump;
}
