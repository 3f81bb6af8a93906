//! Annotation Pass (Pass 2) - Scopes, types, and stack accounting.
//!
//! Walks the whole tree once, mirroring its lexical structure:
//!
//! - opens a scope for every method, block, if-branch, else-branch and
//!   while-body and records which node opened it
//! - binds parameters and local variables to slots
//! - records an inferred type for expression nodes (unresolved names are
//!   left unannotated for the checker to report)
//! - tracks the operand stack the emitted code will use, so each method
//!   scope ends up holding its exact maximum stack depth and slot count
//!
//! ## Stack model
//!
//! Every construct moves the in-flight counter exactly as its emitted code
//! moves the real stack:
//!
//! ```text
//! literal, variable read       +1
//! a + b, a < b                 a, b, -1
//! a && b                       a, -1, b, -1, +1
//! x = v                        v, (+1 dup if the value is used), -1 store
//! m(args)                      +1 this, args, -(1 + argc), +1 unless void
//! WriteLine(v)                 +1 out, v, -2
//! ReadInt()                    +3 scanner, -3, +1
//! RandomInt(n)                 +2 random, -1, n, -(1 + argc), +1
//! condition / init / return    -1
//! discarded statement value    -1 (pop)
//! ```

use bsharp_core::{DataType, NodeId};
use bsharp_syntax::{
    AssignExpr, Block, CallExpr, Expr, ExprStmt, IfStmt, Intrinsic, IntrinsicExpr, MethodDecl,
    OpCategory, Program, ReturnStmt, Stmt, TypeSpec, VarDeclStmt, WhileStmt,
};
use tracing::{debug, trace};

use crate::context::CompilationContext;
use crate::scope::ScopeId;
use crate::symbol::Symbol;

/// Name of the implicit self variable held in slot 0.
pub const SELF_NAME: &str = "this";

/// Output of the annotation pass.
#[derive(Debug, Default)]
pub struct AnnotationOutput {
    /// Number of scopes in the tree, root included.
    pub scopes_created: usize,
}

/// Pass 2: build scopes and annotate types and stack use.
pub struct AnnotationPass<'a> {
    ctx: &'a mut CompilationContext,
    /// Scope of the node being visited.
    scope: ScopeId,
}

impl<'a> AnnotationPass<'a> {
    pub fn new(ctx: &'a mut CompilationContext) -> Self {
        let scope = ctx.scopes.root();
        Self { ctx, scope }
    }

    /// Run the annotation pass on a program.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, program: &Program<'_>) -> AnnotationOutput {
        let root = self.ctx.scopes.root();
        self.ctx.bind_scope(program.id, root);
        self.ctx
            .scopes
            .declare_variable(root, SELF_NAME, Some(DataType::ClassSelf), true, program.id);

        for method in program.methods {
            self.visit_method(method);
        }

        debug!(scopes = self.ctx.scopes.len(), "annotated program");
        AnnotationOutput {
            scopes_created: self.ctx.scopes.len(),
        }
    }

    // ==========================================================================
    // Scope and Stack Helpers
    // ==========================================================================

    fn enter(&mut self, node: NodeId) {
        let child = self.ctx.scopes.enter_child(self.scope);
        self.ctx.bind_scope(node, child);
        self.scope = child;
    }

    fn leave(&mut self) {
        if let Some(parent) = self.ctx.scopes.exit_to_parent(self.scope) {
            self.scope = parent;
        }
    }

    fn push(&mut self, n: usize) {
        self.ctx.scopes.push_stack(self.scope, n as u32);
    }

    fn pop(&mut self, n: usize) {
        self.ctx.scopes.pop_stack(self.scope, n as u32);
    }

    // ==========================================================================
    // Declarations
    // ==========================================================================

    fn visit_method(&mut self, method: &MethodDecl<'_>) {
        self.enter(method.id);
        for param in method.params {
            self.ctx
                .scopes
                .declare_variable(self.scope, param.name.name, Some(param.ty), true, param.id);
        }
        self.visit_block(&method.body);

        trace!(
            method = method.name.name,
            max_stack = self.ctx.scopes.max_stack(self.scope),
            max_locals = self.ctx.scopes.max_locals(self.scope),
            "annotated method"
        );
        self.leave();
    }

    fn visit_block(&mut self, block: &Block<'_>) {
        self.enter(block.id);
        for stmt in block.stmts {
            self.visit_stmt(stmt);
        }
        self.leave();
    }

    // ==========================================================================
    // Statements
    // ==========================================================================

    fn visit_stmt(&mut self, stmt: &Stmt<'_>) {
        match stmt {
            Stmt::Expr(s) => self.visit_expr_stmt(s),
            Stmt::VarDecl(s) => self.visit_var_decl(s),
            Stmt::Return(s) => self.visit_return(s),
            Stmt::Block(b) => self.visit_block(b),
            Stmt::If(s) => self.visit_if(s),
            Stmt::While(s) => self.visit_while(s),
        }
    }

    fn visit_expr_stmt(&mut self, stmt: &ExprStmt<'_>) {
        let discarded = match stmt.expr {
            Expr::Assign(assign) => {
                self.visit_assign(assign, true);
                None
            }
            expr => self.visit_expr(expr),
        };
        if let Some(ty) = discarded
            && ty != DataType::Void
        {
            self.pop(1);
        }
        self.ctx.annotate(stmt.id, discarded);
    }

    fn visit_var_decl(&mut self, decl: &VarDeclStmt<'_>) {
        for var in decl.vars {
            let init_type = var.init.map(|init| self.visit_expr(init));
            let var_type = match decl.ty {
                TypeSpec::Explicit(ty) => Some(ty),
                TypeSpec::Inferred => init_type.flatten(),
            };
            if init_type.is_some() {
                self.pop(1);
            }
            self.ctx.scopes.declare_variable(
                self.scope,
                var.name.name,
                var_type,
                var.init.is_some(),
                var.id,
            );
            self.ctx.annotate(var.id, var_type);
        }
    }

    fn visit_return(&mut self, stmt: &ReturnStmt<'_>) {
        let ty = match stmt.value {
            Some(value) => {
                let ty = self.visit_expr(value);
                self.pop(1);
                ty
            }
            None => Some(DataType::Void),
        };
        self.ctx.annotate(stmt.id, ty);
        self.ctx.scopes.mark_return(self.scope);
    }

    fn visit_if(&mut self, stmt: &IfStmt<'_>) {
        self.enter(stmt.id);
        self.visit_expr(stmt.condition);
        self.pop(1);
        self.visit_stmt(stmt.then_stmt);
        self.leave();

        if let Some(else_clause) = &stmt.else_clause {
            self.enter(else_clause.id);
            self.visit_stmt(else_clause.stmt);
            self.leave();
        }
    }

    fn visit_while(&mut self, stmt: &WhileStmt<'_>) {
        self.enter(stmt.id);
        self.visit_expr(stmt.condition);
        self.pop(1);
        self.visit_stmt(stmt.body);
        self.leave();
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    /// Visit an expression and return the type of the value it produces.
    fn visit_expr(&mut self, expr: &Expr<'_>) -> Option<DataType> {
        match expr {
            Expr::Literal(lit) => {
                self.push(1);
                let ty = Some(lit.kind.data_type());
                self.ctx.annotate(lit.id, ty);
                ty
            }
            Expr::Ident(ident) => {
                self.push(1);
                let ty = self
                    .ctx
                    .scopes
                    .lookup(self.scope, ident.ident.name)
                    .and_then(Symbol::data_type);
                self.ctx.annotate(ident.id, ty);
                ty
            }
            Expr::Binary(binary) => match binary.op.category() {
                OpCategory::Arithmetic => {
                    let left = self.visit_expr(binary.left);
                    let right = self.visit_expr(binary.right);
                    self.pop(1);
                    let ty = left.or(right);
                    self.ctx.annotate(binary.id, ty);
                    ty
                }
                OpCategory::Relational => {
                    let left = self.visit_expr(binary.left);
                    let right = self.visit_expr(binary.right);
                    self.pop(1);
                    self.ctx.annotate(binary.id, left.or(right));
                    Some(DataType::Bool)
                }
                OpCategory::Logical => {
                    let left = self.visit_expr(binary.left);
                    self.pop(1);
                    let right = self.visit_expr(binary.right);
                    self.pop(1);
                    self.push(1);
                    self.ctx.annotate(binary.id, left.or(right));
                    Some(DataType::Bool)
                }
            },
            Expr::Unary(unary) => {
                self.visit_expr(unary.operand);
                self.ctx.annotate(unary.id, Some(DataType::Bool));
                Some(DataType::Bool)
            }
            Expr::Assign(assign) => self.visit_assign(assign, false),
            Expr::Call(call) => self.visit_call(call),
            Expr::Intrinsic(intrinsic) => self.visit_intrinsic(intrinsic),
        }
    }

    /// `discard` is set when the assignment is a statement of its own.
    fn visit_assign(&mut self, assign: &AssignExpr<'_>, discard: bool) -> Option<DataType> {
        let value = self.visit_expr(assign.value);

        match assign.target.as_ident() {
            Some(target) => {
                let ty = self
                    .ctx
                    .scopes
                    .lookup(self.scope, target.ident.name)
                    .and_then(Symbol::data_type);
                self.ctx.annotate(target.id, ty);
            }
            None => {
                // Not a valid target; annotate it but keep the counter level.
                self.visit_expr(assign.target);
                self.pop(1);
            }
        }

        if !discard {
            self.push(1);
        }
        self.pop(1);
        self.ctx.annotate(assign.id, value);
        value
    }

    fn visit_call(&mut self, call: &CallExpr<'_>) -> Option<DataType> {
        self.push(1);
        for arg in call.args {
            self.visit_expr(arg);
        }
        self.pop(1 + call.args.len());

        let name = call.callee.name;
        let signature = self
            .ctx
            .methods
            .find(name)
            .map(|m| (m.return_type, m.param_types.clone()));

        let ty = match signature {
            Some((return_type, param_types)) => {
                self.ctx
                    .scopes
                    .declare_method(self.scope, name, return_type, param_types);
                if return_type != DataType::Void {
                    self.push(1);
                }
                return_type
            }
            None => DataType::Void,
        };
        self.ctx.annotate(call.id, Some(ty));
        Some(ty)
    }

    fn visit_intrinsic(&mut self, intrinsic: &IntrinsicExpr<'_>) -> Option<DataType> {
        match intrinsic.kind {
            Intrinsic::WriteLine(arg) => {
                self.push(1);
                let printed = self.visit_expr(arg);
                self.pop(2);
                self.register_intrinsic(intrinsic, printed.into_iter().collect());
                self.ctx.annotate(intrinsic.id, printed);
                Some(DataType::Void)
            }
            Intrinsic::ReadInt
            | Intrinsic::ReadFloat
            | Intrinsic::ReadBool
            | Intrinsic::ReadLine => {
                self.push(3);
                self.pop(3);
                self.push(1);
                self.register_intrinsic(intrinsic, Vec::new());
                let ty = Some(intrinsic.kind.result_type());
                self.ctx.annotate(intrinsic.id, ty);
                ty
            }
            Intrinsic::RandomInt(bound) => {
                self.push(2);
                self.pop(1);
                let params = match bound {
                    Some(bound) => {
                        self.visit_expr(bound);
                        vec![DataType::Int]
                    }
                    None => Vec::new(),
                };
                self.pop(1 + params.len());
                self.push(1);
                self.register_intrinsic(intrinsic, params);
                self.ctx.annotate(intrinsic.id, Some(DataType::Int));
                Some(DataType::Int)
            }
        }
    }

    /// Record an intrinsic use in the current scope and the method table.
    fn register_intrinsic(&mut self, intrinsic: &IntrinsicExpr<'_>, params: Vec<DataType>) {
        let name = intrinsic.kind.name();
        let return_type = intrinsic.kind.result_type();
        self.ctx
            .scopes
            .declare_method(self.scope, name, return_type, params.clone());
        self.ctx
            .methods
            .register_intrinsic(name, return_type, params, intrinsic.span);
    }
}
