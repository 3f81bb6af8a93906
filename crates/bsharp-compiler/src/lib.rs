//! BSharp Compiler
//!
//! A 4-pass compiler from a BSharp syntax tree to stack-machine assembler
//! text.
//!
//! ## Architecture
//!
//! ```text
//!            ┌──────────────────────┐
//! Program ──►│ Pass 1: signatures   │──► method table
//!            └──────────────────────┘
//!            ┌──────────────────────┐
//!            │ Pass 2: annotate     │──► scopes, types, stack/locals limits
//!            └──────────────────────┘
//!            ┌──────────────────────┐
//!            │ Pass 3: check        │──► diagnostics (fails with all of them)
//!            └──────────────────────┘
//!            ┌──────────────────────┐
//!            │ Pass 4: codegen      │──► CompiledUnit
//!            └──────────────────────┘
//! ```
//!
//! Every table lives in a [`CompilationContext`] created for one compilation
//! and dropped afterwards, so compiling the same tree twice gives the same
//! result.
//!
//! ## Modules
//!
//! - [`context`]: Tables shared by the passes of one compilation
//! - [`emit`]: Instructions, labels, and the stack depth verifier
//! - [`options`]: Class name and output settings
//! - [`output`]: The compiled class handed to the assembler
//! - [`passes`]: The four passes
//! - [`registry`]: Method table
//! - [`scope`]: Scope tree with slot and stack accounting
//! - [`symbol`]: Variable and method symbols
//!
//! # Example
//!
//! ```
//! use bsharp_compiler::{CompileOptions, Compiler};
//! use bsharp_core::Span;
//! use bsharp_syntax::{AstBuilder, Intrinsic};
//! use bumpalo::Bump;
//!
//! let arena = Bump::new();
//! let b = AstBuilder::new(&arena);
//! let hello = b.intrinsic(Intrinsic::WriteLine(b.string("hello", Span::line(2))), Span::line(2));
//! let body = b.block(vec![b.expr_stmt(hello, Span::line(2))], Span::lines(1, 3));
//! let program = b.program(vec![b.method("Main", None, vec![], body, Span::lines(1, 3))]);
//!
//! let unit = Compiler::compile(&program, &CompileOptions::new("Hello")).unwrap();
//! assert_eq!(unit.class_name, "Hello");
//! assert!(unit.lines().contains(&"ldc \"hello\"".to_string()));
//! ```

pub mod context;
pub mod emit;
pub mod options;
pub mod output;
pub mod passes;
pub mod registry;
pub mod scope;
pub mod symbol;

pub use context::CompilationContext;
pub use options::CompileOptions;
pub use output::{CompiledMethod, CompiledUnit, MethodAccess};
pub use passes::{
    AnnotationOutput, AnnotationPass, CheckPass, CodegenPass, SignatureOutput, SignaturePass,
};
pub use registry::{Method, MethodOrigin, MethodTable};
pub use scope::{Scope, ScopeId, ScopeTree};
pub use symbol::{MethodSymbol, Symbol, VariableSymbol};

// Re-export the error types from core for convenience
pub use bsharp_core::{CompileError, Diagnostic, Diagnostics, InternalError, SemanticError};

use bsharp_syntax::Program;
use tracing::debug;

/// The main compiler entry point.
pub struct Compiler;

impl Compiler {
    /// Run passes 1 to 3 and return the checked tables.
    ///
    /// Fails with every diagnostic found if the program breaks a rule.
    pub fn analyze(program: &Program<'_>) -> Result<CompilationContext, CompileError> {
        let mut ctx = CompilationContext::new();

        SignaturePass::new(&mut ctx).run(program);
        AnnotationPass::new(&mut ctx).run(program);
        CheckPass::new(&mut ctx).run(program)?;

        Ok(ctx)
    }

    /// Compile a program into a class named after `options.class_name`.
    ///
    /// No code is generated when the program has diagnostics.
    pub fn compile(
        program: &Program<'_>,
        options: &CompileOptions,
    ) -> Result<CompiledUnit, CompileError> {
        debug!(class = %options.class_name, methods = program.methods.len(), "compiling");
        let ctx = Self::analyze(program)?;
        let unit = CodegenPass::new(&ctx, options).run(program)?;
        Ok(unit)
    }
}
