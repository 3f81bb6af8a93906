//! Shared helpers for the integration tests.

#![allow(dead_code)]

use bsharp::prelude::*;
use bsharp_syntax::{MethodDecl, Stmt};

pub const INT: TypeSpec = TypeSpec::Explicit(DataType::Int);
pub const BOOL: TypeSpec = TypeSpec::Explicit(DataType::Bool);

/// A `void Main()` spanning lines 1 to `stmts.len() + 2`, with the i-th
/// statement expected on line `i + 2`.
pub fn main_method<'ast>(b: &AstBuilder<'ast>, stmts: Vec<Stmt<'ast>>) -> MethodDecl<'ast> {
    let end = stmts.len() as u32 + 2;
    let body = b.block(stmts, Span::lines(1, end));
    b.method("Main", None, vec![], body, Span::lines(1, end))
}

/// Compile under the default class name, panicking with the rendered
/// diagnostics on failure.
pub fn compile(program: &Program<'_>) -> CompiledUnit {
    Compiler::compile(program, &CompileOptions::default())
        .unwrap_or_else(|e| panic!("compilation failed:\n{e}"))
}

/// The `Line N - message` lines of a program that must fail to check.
pub fn errors(program: &Program<'_>) -> Vec<String> {
    match Compiler::compile(program, &CompileOptions::default()) {
        Ok(_) => panic!("expected the program to be rejected"),
        Err(err) => err
            .diagnostics()
            .unwrap_or_else(|| panic!("expected diagnostics, got {err}"))
            .lines(),
    }
}

/// Rendered instructions of the method `name`, without directives.
pub fn body(unit: &CompiledUnit, name: &str) -> Vec<String> {
    unit.method(name)
        .unwrap_or_else(|| panic!("no method {name}"))
        .code
        .iter()
        .map(ToString::to_string)
        .collect()
}

/// Every method must declare exactly the stack depth its code reaches.
pub fn assert_stack_sound(unit: &CompiledUnit) {
    for method in &unit.methods {
        let depth = max_stack_depth(&method.code)
            .unwrap_or_else(|e| panic!("{}: {e}", method.name));
        assert_eq!(depth, method.max_stack, "{}", method.name);
    }
}
