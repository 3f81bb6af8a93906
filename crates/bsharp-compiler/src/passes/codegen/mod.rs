//! Codegen Pass (Pass 4) - Emit instructions.
//!
//! Walks the checked tree one last time and turns every method into a
//! [`CompiledMethod`]. The stack and locals limits come straight from the
//! scopes the annotation pass sized; this pass only selects instructions.
//!
//! Each method is framed as:
//!
//! ```text
//! .method public Name(params)ret
//! .limit stack  <max_stack of the method scope>
//! .limit locals <max_locals of the method scope>
//!     <body>
//!     return            ; void methods only
//! .end method
//! ```
//!
//! The pass must only run on a tree the check pass accepted. A tree it
//! never saw can still reach here when driven directly, in which case the
//! first inconsistency is returned as an [`InternalError`].

mod expr;

use bsharp_core::{DataType, InternalError};
use bsharp_syntax::{Block, Expr, ExprStmt, IfStmt, MethodDecl, Program, Stmt, WhileStmt};
use tracing::{debug, trace};

use crate::context::CompilationContext;
use crate::emit::{Condition, Instruction, InstructionEmitter, LabelAllocator, ValueKind};
use crate::options::CompileOptions;
use crate::output::{CompiledMethod, CompiledUnit, MethodAccess};
use crate::scope::ScopeId;
use crate::symbol::Symbol;

type EmitResult<T = ()> = Result<T, InternalError>;

/// Pass 4: generate instructions for a checked program.
pub struct CodegenPass<'a> {
    ctx: &'a CompilationContext,
    options: &'a CompileOptions,
    /// Shared by every method so labels are unique in the whole unit.
    labels: LabelAllocator,
    emitter: InstructionEmitter,
    scope: ScopeId,
}

impl<'a> CodegenPass<'a> {
    pub fn new(ctx: &'a CompilationContext, options: &'a CompileOptions) -> Self {
        Self {
            ctx,
            options,
            labels: LabelAllocator::new(),
            emitter: InstructionEmitter::new(),
            scope: ctx.scopes.root(),
        }
    }

    /// Run the codegen pass on a program.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, program: &Program<'_>) -> Result<CompiledUnit, InternalError> {
        let mut methods = Vec::with_capacity(program.methods.len() + 2);
        methods.push(self.constructor());
        methods.push(self.entry_point());
        for method in program.methods {
            methods.push(self.compile_method(method)?);
        }

        debug!(
            class = %self.options.class_name,
            methods = methods.len(),
            labels = self.labels.allocated(),
            "generated code"
        );
        Ok(CompiledUnit {
            class_name: self.options.class_name.clone(),
            bytecode_version: self.options.bytecode_version.clone(),
            methods,
        })
    }

    // ==========================================================================
    // Boilerplate
    // ==========================================================================

    /// `<init>()V`, chaining to the object constructor.
    fn constructor(&self) -> CompiledMethod {
        CompiledMethod {
            access: MethodAccess::Public,
            name: "<init>".to_string(),
            descriptor: "()V".to_string(),
            max_stack: 1,
            max_locals: 1,
            code: vec![
                Instruction::Load(ValueKind::Reference, 0),
                Instruction::InvokeSpecial {
                    target: "java/lang/Object/<init>()V".to_string(),
                    args: 0,
                },
                Instruction::Return(None),
            ],
        }
    }

    /// The static `main` that builds one instance and calls its `Main`.
    fn entry_point(&self) -> CompiledMethod {
        let class = &self.options.class_name;
        CompiledMethod {
            access: MethodAccess::PublicStatic,
            name: "main".to_string(),
            descriptor: "([Ljava/lang/String;)V".to_string(),
            max_stack: 2,
            max_locals: 2,
            code: vec![
                Instruction::New(class.clone()),
                Instruction::Dup,
                Instruction::InvokeSpecial {
                    target: format!("{class}.<init>()V"),
                    args: 0,
                },
                Instruction::Store(ValueKind::Reference, 1),
                Instruction::Load(ValueKind::Reference, 1),
                Instruction::InvokeVirtual {
                    target: format!("{class}.Main()V"),
                    args: 0,
                    returns_value: false,
                },
                Instruction::Return(None),
            ],
        }
    }

    // ==========================================================================
    // Declarations
    // ==========================================================================

    fn compile_method(&mut self, method: &MethodDecl<'_>) -> EmitResult<CompiledMethod> {
        let scope = self.ctx.scope_of(method.id)?;
        let return_type = method.return_type();
        let descriptor = method_descriptor(&method.param_types(), return_type)?;

        self.scope = scope;
        self.gen_block(&method.body)?;
        if return_type == DataType::Void {
            self.emitter.emit(Instruction::Return(None));
        }
        self.scope = self.ctx.scopes.root();

        let code = self.emitter.take();
        let max_stack = self.ctx.scopes.max_stack(scope);
        let max_locals = self.ctx.scopes.max_locals(scope);
        trace!(
            method = method.name.name,
            max_stack,
            max_locals,
            instructions = code.len(),
            "generated method"
        );

        Ok(CompiledMethod {
            access: MethodAccess::Public,
            name: method.name.name.to_string(),
            descriptor,
            max_stack,
            max_locals,
            code,
        })
    }

    fn gen_block(&mut self, block: &Block<'_>) -> EmitResult {
        let outer = self.scope;
        self.scope = self.ctx.scope_of(block.id)?;
        for stmt in block.stmts {
            self.gen_stmt(stmt)?;
        }
        self.scope = outer;
        Ok(())
    }

    // ==========================================================================
    // Statements
    // ==========================================================================

    fn gen_stmt(&mut self, stmt: &Stmt<'_>) -> EmitResult {
        match stmt {
            Stmt::Expr(s) => self.gen_expr_stmt(s),
            Stmt::VarDecl(decl) => {
                for var in decl.vars {
                    if let Some(init) = var.init {
                        self.gen_expr(init)?;
                        let (kind, slot) = self.local(var.name.name, "store")?;
                        self.emitter.emit_store(kind, slot);
                    }
                }
                Ok(())
            }
            Stmt::Return(ret) => {
                if let Some(value) = ret.value {
                    self.gen_expr(value)?;
                }
                let ty = self.ctx.expect_type(ret.id)?;
                self.emitter.emit(Instruction::Return(ValueKind::of(ty)));
                Ok(())
            }
            Stmt::Block(block) => self.gen_block(block),
            Stmt::If(s) => self.gen_if(s),
            Stmt::While(s) => self.gen_while(s),
        }
    }

    fn gen_expr_stmt(&mut self, stmt: &ExprStmt<'_>) -> EmitResult {
        match stmt.expr {
            Expr::Assign(assign) => self.gen_assign(assign, true),
            expr => {
                self.gen_expr(expr)?;
                if let Some(ty) = self.ctx.type_of(stmt.id)
                    && ty != DataType::Void
                {
                    self.emitter.emit(Instruction::Pop);
                }
                Ok(())
            }
        }
    }

    /// ```text
    ///     <condition>
    ///     ifeq L_else
    ///     <then>
    ///     goto L_end        ; with an else branch
    /// L_else:
    ///     <else>
    /// L_end:
    /// ```
    fn gen_if(&mut self, stmt: &IfStmt<'_>) -> EmitResult {
        let outer = self.scope;
        self.scope = self.ctx.scope_of(stmt.id)?;
        self.gen_expr(stmt.condition)?;
        let else_label = self.labels.next_label();
        self.emitter.emit_branch(Condition::Eq, else_label);
        self.gen_stmt(stmt.then_stmt)?;
        self.scope = outer;

        match &stmt.else_clause {
            Some(else_clause) => {
                let end = self.labels.next_label();
                self.emitter.emit_goto(end);
                self.emitter.emit_label(else_label);
                self.scope = self.ctx.scope_of(else_clause.id)?;
                self.gen_stmt(else_clause.stmt)?;
                self.scope = outer;
                self.emitter.emit_label(end);
            }
            None => self.emitter.emit_label(else_label),
        }
        Ok(())
    }

    /// ```text
    /// L_top:
    ///     <condition>
    ///     ifeq L_exit
    ///     <body>
    ///     goto L_top
    /// L_exit:
    /// ```
    fn gen_while(&mut self, stmt: &WhileStmt<'_>) -> EmitResult {
        let outer = self.scope;
        self.scope = self.ctx.scope_of(stmt.id)?;
        let top = self.labels.next_label();
        let exit = self.labels.next_label();

        self.emitter.emit_label(top);
        self.gen_expr(stmt.condition)?;
        self.emitter.emit_branch(Condition::Eq, exit);
        self.gen_stmt(stmt.body)?;
        self.emitter.emit_goto(top);
        self.emitter.emit_label(exit);

        self.scope = outer;
        Ok(())
    }

    // ==========================================================================
    // Helpers
    // ==========================================================================

    /// Opcode family and slot of the variable `name` in the current scope.
    fn local(&self, name: &str, context: &'static str) -> EmitResult<(ValueKind, u32)> {
        let var = match self.ctx.scopes.lookup(self.scope, name) {
            Some(Symbol::Variable(var)) => var,
            Some(Symbol::Method(_)) => {
                return Err(InternalError::NotAVariable {
                    name: name.to_string(),
                });
            }
            None => {
                return Err(InternalError::UnresolvedSymbol {
                    name: name.to_string(),
                });
            }
        };
        let ty = var.data_type.ok_or(InternalError::MissingType {
            node: var.declared_at,
        })?;
        let kind = ValueKind::of(ty).ok_or(InternalError::NoInstructionFor { ty, context })?;
        Ok((kind, var.slot))
    }
}

/// Field descriptor of a value type.
pub(crate) fn type_descriptor(ty: DataType) -> EmitResult<&'static str> {
    match ty {
        DataType::Int => Ok("I"),
        DataType::Bool => Ok("Z"),
        DataType::Float => Ok("F"),
        DataType::String => Ok("Ljava/lang/String;"),
        DataType::Char => Ok("C"),
        DataType::Void => Ok("V"),
        DataType::ClassSelf => Err(InternalError::NoInstructionFor {
            ty,
            context: "descriptor",
        }),
    }
}

/// Method descriptor, e.g. `(IZ)F`.
pub(crate) fn method_descriptor(params: &[DataType], ret: DataType) -> EmitResult<String> {
    let mut descriptor = String::from("(");
    for &param in params {
        descriptor.push_str(type_descriptor(param)?);
    }
    descriptor.push(')');
    descriptor.push_str(type_descriptor(ret)?);
    Ok(descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::max_stack_depth;
    use crate::passes::{AnnotationPass, CheckPass, SignaturePass};
    use bsharp_core::Span;
    use bsharp_syntax::{AstBuilder, BinaryOp, Intrinsic, TypeSpec};
    use bumpalo::Bump;

    fn compile(program: &Program<'_>) -> CompiledUnit {
        let mut ctx = CompilationContext::new();
        SignaturePass::new(&mut ctx).run(program);
        AnnotationPass::new(&mut ctx).run(program);
        CheckPass::new(&mut ctx)
            .run(program)
            .expect("program should check");
        CodegenPass::new(&ctx, &CompileOptions::default())
            .run(program)
            .expect("program should compile")
    }

    fn body(unit: &CompiledUnit, name: &str) -> Vec<String> {
        unit.method(name)
            .expect("method")
            .code
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn explicit(ty: DataType) -> TypeSpec {
        TypeSpec::Explicit(ty)
    }

    fn main_with<'ast>(b: &AstBuilder<'ast>, stmts: Vec<Stmt<'ast>>) -> MethodDecl<'ast> {
        let body = b.block(stmts, Span::lines(1, 10));
        b.method("Main", None, vec![], body, Span::lines(1, 10))
    }

    #[test]
    fn descriptors() {
        let params = [DataType::Int, DataType::Bool, DataType::String];
        assert_eq!(
            method_descriptor(&params, DataType::Float),
            Ok("(IZLjava/lang/String;)F".to_string())
        );
        let unit = method_descriptor(&[], DataType::Void);
        assert_eq!(unit.as_deref(), Ok("()V"));
        assert!(type_descriptor(DataType::ClassSelf).is_err());
    }

    #[test]
    fn sum_and_print() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);

        let at = Span::line(2);
        let sum = b.binary(b.int(1, at), BinaryOp::Add, b.int(1, at));
        let decl = b.local(explicit(DataType::Int), "x", Some(sum), at);
        let x = b.var("x", Span::line(3));
        let print = b.intrinsic(Intrinsic::WriteLine(x), Span::line(3));
        let print = b.expr_stmt(print, Span::line(3));
        let program = b.program(vec![main_with(&b, vec![decl, print])]);

        let unit = compile(&program);
        let main = unit.method("Main").unwrap();
        assert_eq!((main.max_stack, main.max_locals), (2, 2));
        assert_eq!(
            body(&unit, "Main"),
            [
                "iconst_1",
                "iconst_1",
                "iadd",
                "istore_1",
                "getstatic java/lang/System/out Ljava/io/PrintStream;",
                "iload_1",
                "invokevirtual java/io/PrintStream/println(I)V",
                "return",
            ]
        );
    }

    #[test]
    fn boilerplate_comes_first() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = b.program(vec![main_with(&b, vec![])]);

        let unit = compile(&program);
        let names: Vec<&str> = unit.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["<init>", "main", "Main"]);
        assert_eq!(
            body(&unit, "main"),
            [
                "new Program",
                "dup",
                "invokespecial Program.<init>()V",
                "astore_1",
                "aload_1",
                "invokevirtual Program.Main()V",
                "return",
            ]
        );
    }

    #[test]
    fn relational_pushes_one_when_true() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);

        let at = Span::line(2);
        let less = b.binary(b.int(1, at), BinaryOp::Less, b.int(2, at));
        let decl = b.local(explicit(DataType::Bool), "b", Some(less), at);
        let program = b.program(vec![main_with(&b, vec![decl])]);

        let unit = compile(&program);
        assert_eq!(
            body(&unit, "Main"),
            [
                "iconst_1",
                "iconst_2",
                "if_icmpge L0",
                "iconst_1",
                "goto L1",
                "L0:",
                "iconst_0",
                "L1:",
                "istore_1",
                "return",
            ]
        );
    }

    #[test]
    fn float_comparison_uses_fcmpl() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);

        let at = Span::line(2);
        let eq = b.binary(b.float(1.0, at), BinaryOp::Equal, b.float(2.5, at));
        let print = b.intrinsic(Intrinsic::WriteLine(eq), at);
        let program = b.program(vec![main_with(&b, vec![b.expr_stmt(print, at)])]);

        let unit = compile(&program);
        let code = body(&unit, "Main");
        assert_eq!(&code[1..5], ["ldc 1.0", "ldc 2.5", "fcmpl", "ifne L0"]);
        assert_eq!(code[10], "invokevirtual java/io/PrintStream/println(Z)V");
    }

    #[test]
    fn logical_and_shares_one_target() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);

        let (l2, l3) = (Span::line(2), Span::line(3));
        let and = b.binary(b.bool(true, l2), BinaryOp::LogicalAnd, b.bool(false, l2));
        let or = b.binary(b.bool(true, l3), BinaryOp::LogicalOr, b.bool(false, l3));
        let program = b.program(vec![main_with(
            &b,
            vec![
                b.local(explicit(DataType::Bool), "a", Some(and), l2),
                b.local(explicit(DataType::Bool), "o", Some(or), l3),
            ],
        )]);

        let unit = compile(&program);
        assert_eq!(
            body(&unit, "Main"),
            [
                "iconst_1",
                "ifeq L0",
                "iconst_0",
                "ifeq L0",
                "iconst_1",
                "goto L1",
                "L0:",
                "iconst_0",
                "L1:",
                "istore_1",
                "iconst_1",
                "ifne L2",
                "iconst_0",
                "ifne L2",
                "iconst_0",
                "goto L3",
                "L2:",
                "iconst_1",
                "L3:",
                "istore_2",
                "return",
            ]
        );
    }

    #[test]
    fn if_else_layout() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);

        let then_stmt = b.expr_stmt(
            b.intrinsic(Intrinsic::WriteLine(b.int(1, Span::line(3))), Span::line(3)),
            Span::line(3),
        );
        let else_stmt = b.expr_stmt(
            b.intrinsic(Intrinsic::WriteLine(b.int(2, Span::line(5))), Span::line(5)),
            Span::line(5),
        );
        let cond = b.bool(true, Span::line(2));
        let stmt = b.if_stmt(cond, then_stmt, Some(else_stmt), Span::lines(2, 5));
        let program = b.program(vec![main_with(&b, vec![stmt])]);

        let unit = compile(&program);
        let code = body(&unit, "Main");
        assert_eq!(&code[..2], ["iconst_1", "ifeq L0"]);
        assert_eq!(&code[5..7], ["goto L1", "L0:"]);
        assert_eq!(&code[10..], ["L1:", "return"]);
    }

    #[test]
    fn calls_load_self_and_use_signature() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);

        let at = Span::line(2);
        let call = b.call("Add", &[b.int(1, at), b.int(2, at)], at);
        let main = main_with(&b, vec![b.expr_stmt(call, at)]);
        let at = Span::line(12);
        let sum = b.binary(b.var("a", at), BinaryOp::Add, b.var("b", at));
        let add_body = b.block(vec![b.ret(Some(sum), Span::line(12))], Span::lines(11, 13));
        let add = b.method(
            "Add",
            Some(DataType::Int),
            vec![
                b.param(DataType::Int, "a", Span::line(11)),
                b.param(DataType::Int, "b", Span::line(11)),
            ],
            add_body,
            Span::lines(11, 13),
        );
        let program = b.program(vec![main, add]);

        let unit = compile(&program);
        assert_eq!(
            body(&unit, "Main"),
            [
                "aload_0",
                "iconst_1",
                "iconst_2",
                "invokevirtual Program.Add(II)I",
                "pop",
                "return",
            ]
        );
        let add = unit.method("Add").unwrap();
        assert_eq!(add.descriptor, "(II)I");
        assert_eq!((add.max_stack, add.max_locals), (2, 3));
        let add_code = ["iload_1", "iload_2", "iadd", "ireturn"];
        assert_eq!(body(&unit, "Add"), add_code);
    }

    #[test]
    fn console_read_and_random() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);

        let read = b.intrinsic(Intrinsic::ReadLine, Span::line(2));
        let bound = b.int(10, Span::line(3));
        let random = b.intrinsic(Intrinsic::RandomInt(Some(bound)), Span::line(3));
        let program = b.program(vec![main_with(
            &b,
            vec![
                b.local(TypeSpec::Inferred, "s", Some(read), Span::line(2)),
                b.local(TypeSpec::Inferred, "r", Some(random), Span::line(3)),
            ],
        )]);

        let unit = compile(&program);
        assert_eq!(
            body(&unit, "Main"),
            [
                "new java/util/Scanner",
                "dup",
                "getstatic java/lang/System.in Ljava/io/InputStream;",
                "invokespecial java/util/Scanner.<init>(Ljava/io/InputStream;)V",
                "invokevirtual java/util/Scanner.nextLine()Ljava/lang/String;",
                "astore_1",
                "new java/util/Random",
                "dup",
                "invokespecial java/util/Random.<init>()V",
                "bipush 10",
                "invokevirtual java/util/Random.nextInt(I)I",
                "istore_2",
                "return",
            ]
        );
        assert_eq!(unit.method("Main").unwrap().max_stack, 3);
    }

    #[test]
    fn limits_match_simulated_depth() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);

        // int x = 1; while (x < 10) { x = x * 2 + (x = 3); }
        let (l3, l4) = (Span::line(3), Span::line(4));
        let cond = b.binary(b.var("x", l3), BinaryOp::Less, b.int(10, l3));
        let inner = b.assign(b.var("x", l4), b.int(3, l4));
        let product = b.binary(b.var("x", l4), BinaryOp::Mul, b.int(2, l4));
        let value = b.binary(product, BinaryOp::Add, inner);
        let update = b.assign(b.var("x", Span::line(4)), value);
        let body_stmt = b.block_stmt(vec![b.expr_stmt(update, l4)], Span::lines(3, 5));
        let one = b.int(1, Span::line(2));
        let program = b.program(vec![main_with(
            &b,
            vec![
                b.local(explicit(DataType::Int), "x", Some(one), Span::line(2)),
                b.while_stmt(cond, body_stmt, Span::lines(3, 5)),
            ],
        )]);

        let unit = compile(&program);
        let main = unit.method("Main").unwrap();
        assert_eq!(max_stack_depth(&main.code), Ok(main.max_stack));
        assert_eq!(main.max_stack, 3);
    }

    #[test]
    fn unchecked_tree_fails_internally() {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);

        let at = Span::line(2);
        let print = b.intrinsic(Intrinsic::WriteLine(b.var("ghost", at)), at);
        let program = b.program(vec![main_with(&b, vec![b.expr_stmt(print, at)])]);

        let mut ctx = CompilationContext::new();
        SignaturePass::new(&mut ctx).run(&program);
        AnnotationPass::new(&mut ctx).run(&program);

        let err = CodegenPass::new(&ctx, &CompileOptions::default())
            .run(&program)
            .unwrap_err();
        assert_eq!(
            err,
            InternalError::UnresolvedSymbol {
                name: "ghost".to_string(),
            }
        );
    }
}
