//! Instruction emitter for the code generation pass.
//!
//! The [`InstructionEmitter`] builds the instruction list of one method and
//! picks the compact forms of constants and local accesses. Labels come from
//! a [`LabelAllocator`] shared by the whole compilation unit.
//!
//! # Example
//!
//! ```
//! use bsharp_compiler::emit::{ArithOp, InstructionEmitter, ValueKind};
//!
//! let mut emitter = InstructionEmitter::new();
//! emitter.emit_int(1);
//! emitter.emit_int(200);
//! emitter.emit_arith(ValueKind::Int, ArithOp::Add);
//! emitter.emit_store(ValueKind::Int, 1);
//!
//! let lines: Vec<String> = emitter.finish().iter().map(ToString::to_string).collect();
//! assert_eq!(lines, ["iconst_1", "sipush 200", "iadd", "istore_1"]);
//! ```

mod instruction;
mod labels;
pub mod stack;

pub use instruction::{ArithOp, Condition, Constant, Instruction, Label, ValueKind};
pub use labels::LabelAllocator;
pub use stack::{StackError, max_stack_depth};

/// Emits the instructions of one method body.
#[derive(Debug, Default)]
pub struct InstructionEmitter {
    code: Vec<Instruction>,
}

impl InstructionEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a raw instruction.
    pub fn emit(&mut self, instruction: Instruction) {
        self.code.push(instruction);
    }

    // ==========================================================================
    // Constants
    // ==========================================================================

    /// Emit an integer constant using the narrowest form that holds it.
    pub fn emit_int(&mut self, value: i64) {
        let instruction = if (-1..=5).contains(&value) {
            Instruction::IConst(value as i8)
        } else if let Ok(byte) = i8::try_from(value) {
            Instruction::BiPush(byte)
        } else if let Ok(short) = i16::try_from(value) {
            Instruction::SiPush(short)
        } else {
            Instruction::Ldc(Constant::Int(value))
        };
        self.emit(instruction);
    }

    /// Emit `1` for true and `0` for false.
    pub fn emit_bool(&mut self, value: bool) {
        self.emit(Instruction::IConst(i8::from(value)));
    }

    pub fn emit_float(&mut self, value: f32) {
        self.emit(Instruction::Ldc(Constant::Float(value)));
    }

    pub fn emit_string(&mut self, value: &str) {
        self.emit(Instruction::Ldc(Constant::String(value.to_string())));
    }

    // ==========================================================================
    // Locals and Arithmetic
    // ==========================================================================

    pub fn emit_load(&mut self, kind: ValueKind, slot: u32) {
        self.emit(Instruction::Load(kind, slot));
    }

    pub fn emit_store(&mut self, kind: ValueKind, slot: u32) {
        self.emit(Instruction::Store(kind, slot));
    }

    pub fn emit_arith(&mut self, kind: ValueKind, op: ArithOp) {
        self.emit(Instruction::Arith(kind, op));
    }

    // ==========================================================================
    // Control Flow
    // ==========================================================================

    /// Place `label` at the current position.
    pub fn emit_label(&mut self, label: Label) {
        self.emit(Instruction::Label(label));
    }

    pub fn emit_goto(&mut self, label: Label) {
        self.emit(Instruction::Goto(label));
    }

    /// Jump to `label` when the popped value satisfies `cond` against zero.
    pub fn emit_branch(&mut self, cond: Condition, label: Label) {
        self.emit(Instruction::If(cond, label));
    }

    /// Push 1 or 0 depending on which way a preceding branch went.
    ///
    /// ```text
    ///     iconst <fallthrough>
    ///     goto end
    /// taken:
    ///     iconst <!fallthrough>
    /// end:
    /// ```
    pub fn emit_bool_select(&mut self, fallthrough: bool, taken: Label, end: Label) {
        self.emit_bool(fallthrough);
        self.emit_goto(end);
        self.emit_label(taken);
        self.emit_bool(!fallthrough);
        self.emit_label(end);
    }

    // ==========================================================================
    // Output
    // ==========================================================================

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    pub fn code(&self) -> &[Instruction] {
        &self.code
    }

    /// Take the instructions emitted so far, leaving the emitter empty.
    pub fn take(&mut self) -> Vec<Instruction> {
        std::mem::take(&mut self.code)
    }

    pub fn finish(self) -> Vec<Instruction> {
        self.code
    }
}
