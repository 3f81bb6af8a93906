//! Typed stack-machine instructions and their text form.
//!
//! Each [`Instruction`] renders as one line of assembler input through
//! `Display` and reports how it moves the operand stack through
//! [`Instruction::stack_effect`].

use std::fmt;

use bsharp_core::DataType;

/// A branch target, rendered as `L<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(u32);

impl Label {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Opcode family selected by a value's type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// `i` prefix: int, bool and char.
    Int,
    /// `f` prefix.
    Float,
    /// `a` prefix: strings and the self reference.
    Reference,
}

impl ValueKind {
    /// The family used for values of `ty`. Void values have none.
    pub fn of(ty: DataType) -> Option<ValueKind> {
        match ty {
            DataType::Int | DataType::Bool | DataType::Char => Some(ValueKind::Int),
            DataType::Float => Some(ValueKind::Float),
            DataType::String | DataType::ClassSelf => Some(ValueKind::Reference),
            DataType::Void => None,
        }
    }

    pub fn prefix(self) -> char {
        match self {
            ValueKind::Int => 'i',
            ValueKind::Float => 'f',
            ValueKind::Reference => 'a',
        }
    }
}

/// Arithmetic operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArithOp::Add => "add",
            ArithOp::Sub => "sub",
            ArithOp::Mul => "mul",
            ArithOp::Div => "div",
            ArithOp::Rem => "rem",
        };
        f.write_str(s)
    }
}

/// Branch conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    Eq,
    Ne,
    Lt,
    Ge,
    Gt,
    Le,
}

impl Condition {
    /// The condition that holds exactly when `self` does not.
    pub fn negate(self) -> Condition {
        match self {
            Condition::Eq => Condition::Ne,
            Condition::Ne => Condition::Eq,
            Condition::Lt => Condition::Ge,
            Condition::Ge => Condition::Lt,
            Condition::Gt => Condition::Le,
            Condition::Le => Condition::Gt,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Condition::Eq => "eq",
            Condition::Ne => "ne",
            Condition::Lt => "lt",
            Condition::Ge => "ge",
            Condition::Gt => "gt",
            Condition::Le => "le",
        };
        f.write_str(s)
    }
}

/// An operand of `ldc`.
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Int(i64),
    Float(f32),
    String(String),
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int(value) => write!(f, "{}", value),
            // Debug keeps the decimal point on whole numbers.
            Constant::Float(value) => write!(f, "{:?}", value),
            Constant::String(value) => {
                f.write_str("\"")?;
                for ch in value.chars() {
                    match ch {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        '\r' => f.write_str("\\r")?,
                        _ => write!(f, "{}", ch)?,
                    }
                }
                f.write_str("\"")
            }
        }
    }
}

/// One instruction of a method body.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// `iconst_m1` .. `iconst_5`
    IConst(i8),
    /// `bipush n`
    BiPush(i8),
    /// `sipush n`
    SiPush(i16),
    /// `ldc c`
    Ldc(Constant),
    /// `iload_1`, `aload 4`, ...
    Load(ValueKind, u32),
    /// `istore_1`, `fstore 4`, ...
    Store(ValueKind, u32),
    /// `iadd`, `fdiv`, ...
    Arith(ValueKind, ArithOp),
    /// `fcmpl`
    FCmpL,
    /// `ifeq L`: compare the top value against zero
    If(Condition, Label),
    /// `if_icmplt L`: compare two integers
    IfICmp(Condition, Label),
    /// `if_acmpeq L`: compare two references
    IfACmp(Condition, Label),
    /// `goto L`
    Goto(Label),
    /// `L:`, a branch target
    Label(Label),
    Dup,
    Pop,
    /// `ireturn`, `areturn`, ... or a bare `return`
    Return(Option<ValueKind>),
    /// `new class`
    New(String),
    /// `getstatic field descriptor`
    GetStatic(&'static str),
    /// `invokespecial target` on a receiver plus `args` values
    InvokeSpecial { target: String, args: u32 },
    /// `invokevirtual target` on a receiver plus `args` values
    InvokeVirtual {
        target: String,
        args: u32,
        returns_value: bool,
    },
}

impl Instruction {
    /// Values popped and pushed by this instruction.
    pub fn stack_effect(&self) -> (u32, u32) {
        use Instruction::*;
        match self {
            IConst(_) | BiPush(_) | SiPush(_) | Ldc(_) | Load(..) | New(_) | GetStatic(_) => {
                (0, 1)
            }
            Store(..) | Pop | If(..) => (1, 0),
            Arith(..) | FCmpL => (2, 1),
            IfICmp(..) | IfACmp(..) => (2, 0),
            Goto(_) | Instruction::Label(_) => (0, 0),
            Dup => (1, 2),
            Return(Some(_)) => (1, 0),
            Return(None) => (0, 0),
            InvokeSpecial { args, .. } => (1 + args, 0),
            InvokeVirtual {
                args,
                returns_value,
                ..
            } => (1 + args, u32::from(*returns_value)),
        }
    }

    /// The label this instruction may jump to.
    pub fn jump_target(&self) -> Option<Label> {
        match self {
            Instruction::If(_, label)
            | Instruction::IfICmp(_, label)
            | Instruction::IfACmp(_, label)
            | Instruction::Goto(label) => Some(*label),
            _ => None,
        }
    }

    /// Whether control never falls through to the next instruction.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Instruction::Goto(_) | Instruction::Return(_))
    }
}

fn write_slot(f: &mut fmt::Formatter<'_>, kind: ValueKind, op: &str, slot: u32) -> fmt::Result {
    if slot <= 3 {
        write!(f, "{}{}_{}", kind.prefix(), op, slot)
    } else {
        write!(f, "{}{} {}", kind.prefix(), op, slot)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        match self {
            IConst(-1) => f.write_str("iconst_m1"),
            IConst(n) => write!(f, "iconst_{}", n),
            BiPush(n) => write!(f, "bipush {}", n),
            SiPush(n) => write!(f, "sipush {}", n),
            Ldc(constant) => write!(f, "ldc {}", constant),
            Load(kind, slot) => write_slot(f, *kind, "load", *slot),
            Store(kind, slot) => write_slot(f, *kind, "store", *slot),
            Arith(kind, op) => write!(f, "{}{}", kind.prefix(), op),
            FCmpL => f.write_str("fcmpl"),
            If(cond, label) => write!(f, "if{} {}", cond, label),
            IfICmp(cond, label) => write!(f, "if_icmp{} {}", cond, label),
            IfACmp(cond, label) => write!(f, "if_acmp{} {}", cond, label),
            Goto(label) => write!(f, "goto {}", label),
            Instruction::Label(label) => write!(f, "{}:", label),
            Dup => f.write_str("dup"),
            Pop => f.write_str("pop"),
            Return(Some(kind)) => write!(f, "{}return", kind.prefix()),
            Return(None) => f.write_str("return"),
            New(class) => write!(f, "new {}", class),
            GetStatic(field) => write!(f, "getstatic {}", field),
            InvokeSpecial { target, .. } => write!(f, "invokespecial {}", target),
            InvokeVirtual { target, .. } => write!(f, "invokevirtual {}", target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_and_general_slots() {
        assert_eq!(Instruction::Load(ValueKind::Int, 3).to_string(), "iload_3");
        assert_eq!(
            Instruction::Load(ValueKind::Float, 4).to_string(),
            "fload 4"
        );
        assert_eq!(
            Instruction::Store(ValueKind::Reference, 0).to_string(),
            "astore_0"
        );
        assert_eq!(
            Instruction::Store(ValueKind::Int, 12).to_string(),
            "istore 12"
        );
    }

    #[test]
    fn constants_render() {
        assert_eq!(Instruction::IConst(-1).to_string(), "iconst_m1");
        assert_eq!(Instruction::IConst(5).to_string(), "iconst_5");
        assert_eq!(
            Instruction::Ldc(Constant::Float(2.0)).to_string(),
            "ldc 2.0"
        );
        assert_eq!(
            Instruction::Ldc(Constant::Float(1.25)).to_string(),
            "ldc 1.25"
        );
        assert_eq!(
            Instruction::Ldc(Constant::String("say \"hi\"".into())).to_string(),
            "ldc \"say \\\"hi\\\"\""
        );
    }

    #[test]
    fn branches_render() {
        let label = Label::new(3);
        assert_eq!(Instruction::If(Condition::Eq, label).to_string(), "ifeq L3");
        assert_eq!(
            Instruction::IfICmp(Condition::Ge, label).to_string(),
            "if_icmpge L3"
        );
        assert_eq!(
            Instruction::IfACmp(Condition::Ne, label).to_string(),
            "if_acmpne L3"
        );
        assert_eq!(Instruction::Label(label).to_string(), "L3:");
        assert_eq!(Instruction::Goto(label).to_string(), "goto L3");
    }

    #[test]
    fn conditions_negate() {
        for cond in [
            Condition::Eq,
            Condition::Ne,
            Condition::Lt,
            Condition::Ge,
            Condition::Gt,
            Condition::Le,
        ] {
            assert_ne!(cond.negate(), cond);
            assert_eq!(cond.negate().negate(), cond);
        }
        assert_eq!(Condition::Lt.negate(), Condition::Ge);
        assert_eq!(Condition::Le.negate(), Condition::Gt);
    }

    #[test]
    fn value_kinds() {
        assert_eq!(ValueKind::of(DataType::Bool), Some(ValueKind::Int));
        assert_eq!(ValueKind::of(DataType::Char), Some(ValueKind::Int));
        assert_eq!(ValueKind::of(DataType::String), Some(ValueKind::Reference));
        assert_eq!(ValueKind::of(DataType::Void), None);
        assert_eq!(
            Instruction::Return(Some(ValueKind::Float)).to_string(),
            "freturn"
        );
        assert_eq!(
            Instruction::Arith(ValueKind::Int, ArithOp::Rem).to_string(),
            "irem"
        );
    }

    #[test]
    fn invoke_stack_effects() {
        let println = Instruction::InvokeVirtual {
            target: "java/io/PrintStream/println(I)V".into(),
            args: 1,
            returns_value: false,
        };
        assert_eq!(println.stack_effect(), (2, 0));

        let init = Instruction::InvokeSpecial {
            target: "java/util/Random.<init>()V".into(),
            args: 0,
        };
        assert_eq!(init.stack_effect(), (1, 0));
        assert_eq!(Instruction::Dup.stack_effect(), (1, 2));
    }
}
