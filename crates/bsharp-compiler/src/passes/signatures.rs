//! Signature Pass (Pass 1) - Register every method signature.
//!
//! Walks the top-level declarations once and fills the method table before
//! any body is looked at, so calls to methods declared further down resolve
//! in the later passes. No scopes are built here.

use bsharp_syntax::{MethodDecl, Program};
use tracing::debug;

use crate::context::CompilationContext;

/// Output of the signature pass.
#[derive(Debug, Default)]
pub struct SignatureOutput {
    /// Number of methods registered.
    pub methods_registered: usize,
}

/// Pass 1: register method signatures.
pub struct SignaturePass<'a> {
    ctx: &'a mut CompilationContext,
    methods_registered: usize,
}

impl<'a> SignaturePass<'a> {
    pub fn new(ctx: &'a mut CompilationContext) -> Self {
        Self {
            ctx,
            methods_registered: 0,
        }
    }

    /// Run the signature pass on a program.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, program: &Program<'_>) -> SignatureOutput {
        for method in program.methods {
            self.visit_method(method);
        }

        debug!(
            methods = self.methods_registered,
            "registered method signatures"
        );
        SignatureOutput {
            methods_registered: self.methods_registered,
        }
    }

    fn visit_method(&mut self, method: &MethodDecl<'_>) {
        self.ctx.methods.register(
            method.name.name,
            method.return_type(),
            method.param_types(),
            method.span,
        );
        self.methods_registered += 1;
    }
}
