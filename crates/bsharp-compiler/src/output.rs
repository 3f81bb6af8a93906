//! The artifact handed to the assembler.
//!
//! A [`CompiledUnit`] is one class: a header naming it, the boilerplate
//! constructor and static entry point, then one [`CompiledMethod`] per
//! declared method. [`CompiledUnit::lines`] flattens it into the text the
//! assembler reads.

use std::fmt;

use crate::emit::Instruction;

/// Access flags of a generated method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodAccess {
    Public,
    PublicStatic,
}

impl fmt::Display for MethodAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodAccess::Public => f.write_str("public"),
            MethodAccess::PublicStatic => f.write_str("public static"),
        }
    }
}

/// One method of the generated class.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledMethod {
    pub access: MethodAccess,
    pub name: String,
    /// Type descriptor, e.g. `(IZ)F`.
    pub descriptor: String,
    pub max_stack: u32,
    pub max_locals: u32,
    pub code: Vec<Instruction>,
}

impl CompiledMethod {
    /// The method's lines, from `.method` to `.end method`.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.code.len() + 4);
        lines.push(format!(".method {} {}{}", self.access, self.name, self.descriptor));
        lines.push(format!(".limit stack {}", self.max_stack));
        lines.push(format!(".limit locals {}", self.max_locals));
        lines.extend(self.code.iter().map(ToString::to_string));
        lines.push(".end method".to_string());
        lines
    }
}

/// A compiled class ready for the assembler.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledUnit {
    /// The class name the program was compiled under.
    pub class_name: String,
    pub bytecode_version: String,
    /// Boilerplate methods first, then declared methods in order.
    pub methods: Vec<CompiledMethod>,
}

impl CompiledUnit {
    /// The first method with the given name.
    pub fn method(&self, name: &str) -> Option<&CompiledMethod> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Every line of assembler input, in order.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!(".bytecode {}", self.bytecode_version),
            format!(".class public {}", self.class_name),
            ".super java/lang/Object".to_string(),
        ];
        for method in &self.methods {
            lines.extend(method.lines());
        }
        lines
    }
}

impl fmt::Display for CompiledUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
