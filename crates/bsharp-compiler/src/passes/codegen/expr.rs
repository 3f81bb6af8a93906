//! Expression code generation.

use bsharp_core::{DataType, InternalError};
use bsharp_syntax::{
    AssignExpr, BinaryExpr, BinaryOp, CallExpr, Expr, Intrinsic, IntrinsicExpr, LiteralKind,
    OpCategory, UnaryExpr,
};

use super::{CodegenPass, EmitResult, method_descriptor, type_descriptor};
use crate::emit::{ArithOp, Condition, Instruction, ValueKind};

const PRINT_STREAM: &str = "java/lang/System/out Ljava/io/PrintStream;";
const INPUT_STREAM: &str = "java/lang/System.in Ljava/io/InputStream;";

impl CodegenPass<'_> {
    /// Emit the code leaving the value of `expr` on the stack.
    pub(super) fn gen_expr(&mut self, expr: &Expr<'_>) -> EmitResult {
        match expr {
            Expr::Literal(lit) => {
                self.gen_literal(&lit.kind);
                Ok(())
            }
            Expr::Ident(ident) => {
                let (kind, slot) = self.local(ident.ident.name, "load")?;
                self.emitter.emit_load(kind, slot);
                Ok(())
            }
            Expr::Binary(binary) => match binary.op.category() {
                OpCategory::Arithmetic => self.gen_arith(binary),
                OpCategory::Relational => self.gen_compare(binary),
                OpCategory::Logical => self.gen_logical(binary),
            },
            Expr::Unary(unary) => self.gen_not(unary),
            Expr::Assign(assign) => self.gen_assign(assign, false),
            Expr::Call(call) => self.gen_call(call),
            Expr::Intrinsic(intrinsic) => self.gen_intrinsic(intrinsic),
        }
    }

    fn gen_literal(&mut self, kind: &LiteralKind<'_>) {
        match *kind {
            LiteralKind::Int(value) => self.emitter.emit_int(value),
            LiteralKind::Float(value) => self.emitter.emit_float(value),
            LiteralKind::Bool(value) => self.emitter.emit_bool(value),
            LiteralKind::Char(value) => self.emitter.emit_int(i64::from(u32::from(value))),
            LiteralKind::String(value) => self.emitter.emit_string(value),
        }
    }

    // ==========================================================================
    // Operators
    // ==========================================================================

    fn gen_arith(&mut self, binary: &BinaryExpr<'_>) -> EmitResult {
        self.gen_expr(binary.left)?;
        self.gen_expr(binary.right)?;

        let ty = self.ctx.expect_type(binary.id)?;
        let unsupported = InternalError::NoInstructionFor {
            ty,
            context: "arithmetic",
        };
        let kind = match ValueKind::of(ty) {
            Some(kind @ (ValueKind::Int | ValueKind::Float)) => kind,
            _ => return Err(unsupported),
        };
        let op = match binary.op {
            BinaryOp::Add => ArithOp::Add,
            BinaryOp::Sub => ArithOp::Sub,
            BinaryOp::Mul => ArithOp::Mul,
            BinaryOp::Div => ArithOp::Div,
            BinaryOp::Mod => ArithOp::Rem,
            _ => return Err(unsupported),
        };
        self.emitter.emit_arith(kind, op);
        Ok(())
    }

    /// Compare two operands and push 1 when the comparison holds.
    ///
    /// ```text
    ///     <left>
    ///     <right>
    ///     if_icmp<!cond> L_false    ; fcmpl + if<!cond> for floats
    ///     iconst_1
    ///     goto L_end
    /// L_false:
    ///     iconst_0
    /// L_end:
    /// ```
    fn gen_compare(&mut self, binary: &BinaryExpr<'_>) -> EmitResult {
        self.gen_expr(binary.left)?;
        self.gen_expr(binary.right)?;

        // Relational nodes are annotated with their operand type.
        let ty = self.ctx.expect_type(binary.id)?;
        let unsupported = InternalError::NoInstructionFor {
            ty,
            context: "comparison",
        };
        let cond = match binary.op {
            BinaryOp::Equal => Condition::Eq,
            BinaryOp::NotEqual => Condition::Ne,
            BinaryOp::Less => Condition::Lt,
            BinaryOp::LessEqual => Condition::Le,
            BinaryOp::Greater => Condition::Gt,
            BinaryOp::GreaterEqual => Condition::Ge,
            _ => return Err(unsupported),
        }
        .negate();

        let taken = self.labels.next_label();
        let end = self.labels.next_label();
        match ty {
            DataType::Float => {
                self.emitter.emit(Instruction::FCmpL);
                self.emitter.emit_branch(cond, taken);
            }
            DataType::Int | DataType::Bool | DataType::Char => {
                self.emitter.emit(Instruction::IfICmp(cond, taken));
            }
            DataType::String | DataType::ClassSelf => {
                self.emitter.emit(Instruction::IfACmp(cond, taken));
            }
            DataType::Void => return Err(unsupported),
        }
        self.emitter.emit_bool_select(true, taken, end);
        Ok(())
    }

    /// Both operands are evaluated, each followed by a branch to a shared
    /// target: `ifeq` for `&&`, `ifne` for `||`.
    fn gen_logical(&mut self, binary: &BinaryExpr<'_>) -> EmitResult {
        let is_and = binary.op == BinaryOp::LogicalAnd;
        let cond = if is_and { Condition::Eq } else { Condition::Ne };
        let taken = self.labels.next_label();
        let end = self.labels.next_label();

        self.gen_expr(binary.left)?;
        self.emitter.emit_branch(cond, taken);
        self.gen_expr(binary.right)?;
        self.emitter.emit_branch(cond, taken);
        self.emitter.emit_bool_select(is_and, taken, end);
        Ok(())
    }

    fn gen_not(&mut self, unary: &UnaryExpr<'_>) -> EmitResult {
        self.gen_expr(unary.operand)?;
        let taken = self.labels.next_label();
        let end = self.labels.next_label();
        self.emitter.emit_branch(Condition::Ne, taken);
        self.emitter.emit_bool_select(true, taken, end);
        Ok(())
    }

    /// `discard` is set when the assignment is a statement of its own,
    /// otherwise the value is duplicated to stay on the stack.
    pub(super) fn gen_assign(&mut self, assign: &AssignExpr<'_>, discard: bool) -> EmitResult {
        let Some(target) = assign.target.as_ident() else {
            return Err(InternalError::NoInstructionFor {
                ty: self.ctx.expect_type(assign.id)?,
                context: "assignment target",
            });
        };

        self.gen_expr(assign.value)?;
        if !discard {
            self.emitter.emit(Instruction::Dup);
        }
        let (kind, slot) = self.local(target.ident.name, "store")?;
        self.emitter.emit_store(kind, slot);
        Ok(())
    }

    // ==========================================================================
    // Calls
    // ==========================================================================

    fn gen_call(&mut self, call: &CallExpr<'_>) -> EmitResult {
        let name = call.callee.name;
        let ctx = self.ctx;
        let method = ctx
            .methods
            .find(name)
            .ok_or_else(|| InternalError::UnknownMethod {
                name: name.to_string(),
            })?;

        self.emitter.emit_load(ValueKind::Reference, 0);
        for arg in call.args {
            self.gen_expr(arg)?;
        }

        let descriptor = method_descriptor(&method.param_types, method.return_type)?;
        self.emitter.emit(Instruction::InvokeVirtual {
            target: format!("{}.{}{}", self.options.class_name, name, descriptor),
            args: call.args.len() as u32,
            returns_value: method.return_type != DataType::Void,
        });
        Ok(())
    }

    fn gen_intrinsic(&mut self, intrinsic: &IntrinsicExpr<'_>) -> EmitResult {
        match intrinsic.kind {
            Intrinsic::WriteLine(arg) => {
                self.emitter.emit(Instruction::GetStatic(PRINT_STREAM));
                self.gen_expr(arg)?;
                let printed = self.ctx.expect_type(intrinsic.id)?;
                if !printed.is_value() {
                    return Err(InternalError::NoInstructionFor {
                        ty: printed,
                        context: "print",
                    });
                }
                let descriptor = type_descriptor(printed)?;
                self.emitter.emit(Instruction::InvokeVirtual {
                    target: format!("java/io/PrintStream/println({descriptor})V"),
                    args: 1,
                    returns_value: false,
                });
            }
            Intrinsic::ReadInt => self.gen_console_read("nextInt()I"),
            Intrinsic::ReadFloat => self.gen_console_read("nextFloat()F"),
            Intrinsic::ReadBool => self.gen_console_read("nextBoolean()Z"),
            Intrinsic::ReadLine => self.gen_console_read("nextLine()Ljava/lang/String;"),
            Intrinsic::RandomInt(bound) => {
                let random = "java/util/Random".to_string();
                self.emitter.emit(Instruction::New(random));
                self.emitter.emit(Instruction::Dup);
                self.emitter.emit(Instruction::InvokeSpecial {
                    target: "java/util/Random.<init>()V".to_string(),
                    args: 0,
                });
                let target = match bound {
                    Some(bound) => {
                        self.gen_expr(bound)?;
                        "java/util/Random.nextInt(I)I"
                    }
                    None => "java/util/Random.nextInt()I",
                };
                self.emitter.emit(Instruction::InvokeVirtual {
                    target: target.to_string(),
                    args: u32::from(bound.is_some()),
                    returns_value: true,
                });
            }
        }
        Ok(())
    }

    /// Build a scanner over standard input and call `method` on it.
    fn gen_console_read(&mut self, method: &str) {
        let scanner = "java/util/Scanner".to_string();
        self.emitter.emit(Instruction::New(scanner));
        self.emitter.emit(Instruction::Dup);
        self.emitter.emit(Instruction::GetStatic(INPUT_STREAM));
        self.emitter.emit(Instruction::InvokeSpecial {
            target: "java/util/Scanner.<init>(Ljava/io/InputStream;)V".to_string(),
            args: 1,
        });
        self.emitter.emit(Instruction::InvokeVirtual {
            target: format!("java/util/Scanner.{method}"),
            args: 0,
            returns_value: true,
        });
    }
}
