//! Check Pass (Pass 3) - Validate the language rules.
//!
//! Re-walks the tree with the scopes built by the annotation pass and records
//! a diagnostic for every rule violation without stopping. The pass fails
//! once, at the end, with all of them.
//!
//! ## Resolution
//!
//! The scope tree is complete by the time this pass runs, so a plain lookup
//! would also see variables declared further down a block. The walk keeps
//! track of the declarators and parameters it has already passed and only
//! resolves variables among those, which makes a read before the
//! declaration (or inside its own initializer) an unknown variable.
//!
//! Types that could not be resolved are never reported as a mismatch; the
//! unresolved operand already carries a diagnostic of its own.

use bsharp_core::{CompileError, DataType, Diagnostic, InternalError, NodeId, SemanticError, Span};
use bsharp_syntax::{
    AssignExpr, BinaryExpr, Block, CallExpr, Expr, IdentExpr, Intrinsic, IntrinsicExpr,
    MethodDecl, OpCategory, Program, Stmt, TypeSpec, VarDeclStmt, VarDeclarator,
};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::context::CompilationContext;
use crate::scope::ScopeId;
use crate::symbol::Symbol;

/// Name of the entry point every program declares.
pub const ENTRY_POINT: &str = "Main";

/// Pass 3: validate the annotated tree.
pub struct CheckPass<'a> {
    ctx: &'a mut CompilationContext,
    scope: ScopeId,
    /// Declarators, parameters and the program node walked so far.
    reached: FxHashSet<NodeId>,
    /// Return type of the method being checked.
    return_type: DataType,
}

type CheckResult<T> = Result<T, InternalError>;

impl<'a> CheckPass<'a> {
    pub fn new(ctx: &'a mut CompilationContext) -> Self {
        let scope = ctx.scopes.root();
        Self {
            ctx,
            scope,
            reached: FxHashSet::default(),
            return_type: DataType::Void,
        }
    }

    /// Run the check pass, failing with every diagnostic recorded.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, program: &Program<'_>) -> Result<(), CompileError> {
        self.scope = self.ctx.scope_of(program.id)?;
        self.reached.insert(program.id);

        self.check_entry_point(program);
        for method in program.methods {
            self.visit_method(method)?;
        }

        let diagnostics = self.ctx.take_diagnostics();
        debug!(diagnostics = diagnostics.len(), "checked program");
        diagnostics.into_result()?;
        Ok(())
    }

    // ==========================================================================
    // Reporting
    // ==========================================================================

    fn report(&mut self, error: SemanticError, span: Span) {
        self.ctx.report(Diagnostic::at_start(error, span));
    }

    /// Report `found` unless it is unresolved or equal to `expected`.
    fn expect_type(&mut self, expected: DataType, found: Option<DataType>, span: Span) {
        if let Some(found) = found
            && found != expected
        {
            self.report(SemanticError::mismatch(Some(expected), Some(found)), span);
        }
    }

    /// Resolve `name` among the symbols walked so far.
    fn resolve(&self, name: &str) -> Option<(ScopeId, &Symbol)> {
        self.ctx.scopes.resolve(self.scope, name, |symbol| match symbol {
            Symbol::Variable(var) => self.reached.contains(&var.declared_at),
            Symbol::Method(_) => true,
        })
    }

    // ==========================================================================
    // Declarations
    // ==========================================================================

    fn check_entry_point(&mut self, program: &Program<'_>) {
        let error = match self.ctx.methods.find(ENTRY_POINT) {
            None => Some(SemanticError::MissingMain),
            Some(main) if !main.param_types.is_empty() => Some(SemanticError::MainHasParameters),
            Some(_) => None,
        };
        if let Some(error) = error {
            self.report(error, program.span);
        }
    }

    fn visit_method(&mut self, method: &MethodDecl<'_>) -> CheckResult<()> {
        let name = method.name.name;
        if self.ctx.methods.count(name) > 1 {
            self.report(
                SemanticError::DuplicateMethod {
                    name: name.to_string(),
                },
                method.span,
            );
        }

        let outer = self.scope;
        self.scope = self.ctx.scope_of(method.id)?;
        self.return_type = method.return_type();
        let params = method.params.iter().map(|param| param.id);
        self.reached.extend(params);

        // Reported ahead of the body, as the body scope is already complete.
        if self.return_type != DataType::Void {
            let body = self.ctx.scope_of(method.body.id)?;
            if !self.ctx.scopes.get(body).has_return() {
                self.ctx.report(Diagnostic::at_end(
                    SemanticError::MissingReturn {
                        name: name.to_string(),
                    },
                    method.body.span,
                ));
            }
        }

        self.visit_block(&method.body)?;

        self.scope = outer;
        Ok(())
    }

    fn visit_block(&mut self, block: &Block<'_>) -> CheckResult<()> {
        let outer = self.scope;
        self.scope = self.ctx.scope_of(block.id)?;
        for stmt in block.stmts {
            self.visit_stmt(stmt)?;
        }
        self.scope = outer;
        Ok(())
    }

    // ==========================================================================
    // Statements
    // ==========================================================================

    fn visit_stmt(&mut self, stmt: &Stmt<'_>) -> CheckResult<()> {
        match stmt {
            Stmt::Expr(s) => {
                self.check_expr(s.expr)?;
            }
            Stmt::VarDecl(decl) => {
                for var in decl.vars {
                    self.check_declarator(decl, var)?;
                }
            }
            Stmt::Return(ret) => {
                if let Some(value) = ret.value {
                    self.check_expr(value)?;
                }
                let found = self.ctx.type_of(ret.id);
                self.expect_type(self.return_type, found, ret.span);
            }
            Stmt::Block(block) => self.visit_block(block)?,
            Stmt::If(s) => {
                let outer = self.scope;
                self.scope = self.ctx.scope_of(s.id)?;
                let condition = self.check_expr(s.condition)?;
                self.expect_type(DataType::Bool, condition, s.span);
                self.visit_stmt(s.then_stmt)?;
                self.scope = outer;

                if let Some(else_clause) = &s.else_clause {
                    self.scope = self.ctx.scope_of(else_clause.id)?;
                    self.visit_stmt(else_clause.stmt)?;
                    self.scope = outer;
                }
            }
            Stmt::While(s) => {
                let outer = self.scope;
                self.scope = self.ctx.scope_of(s.id)?;
                let condition = self.check_expr(s.condition)?;
                self.expect_type(DataType::Bool, condition, s.span);
                self.visit_stmt(s.body)?;
                self.scope = outer;
            }
        }
        Ok(())
    }

    fn check_declarator(
        &mut self,
        decl: &VarDeclStmt<'_>,
        var: &VarDeclarator<'_>,
    ) -> CheckResult<()> {
        let name = var.name.name;
        let var_type = self.ctx.type_of(var.id);

        if self.ctx.methods.contains(name) {
            let error = SemanticError::NotAVariable {
                name: name.to_string(),
            };
            self.report(error, var.span);
        }
        if var_type.is_none() {
            let error = SemanticError::UnknownType {
                name: name.to_string(),
            };
            self.report(error, var.span);
        }
        if self.ctx.scopes.count_declarations_of(self.scope, name) > 1 {
            let error = SemanticError::DuplicateVariable {
                name: name.to_string(),
            };
            self.report(error, var.span);
        }
        if let Some(ty) = var_type.filter(|ty| !ty.is_value()) {
            let error = SemanticError::InvalidVariableType {
                ty,
                name: name.to_string(),
            };
            self.report(error, var.span);
        }

        let init_type = match var.init {
            Some(init) => self.check_expr(init)?,
            None => None,
        };
        // The variable is only in scope after its own initializer.
        self.reached.insert(var.id);

        if let TypeSpec::Explicit(declared) = decl.ty {
            self.expect_type(declared, init_type, decl.span);
        }
        Ok(())
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    /// Check an expression and return the type of the value it produces.
    fn check_expr(&mut self, expr: &Expr<'_>) -> CheckResult<Option<DataType>> {
        match expr {
            Expr::Literal(lit) => Ok(Some(lit.kind.data_type())),
            Expr::Ident(ident) => Ok(self.check_read(ident)),
            Expr::Binary(binary) => self.check_binary(binary),
            Expr::Unary(unary) => {
                let operand = self.check_expr(unary.operand)?;
                self.expect_type(DataType::Bool, operand, unary.span);
                Ok(Some(DataType::Bool))
            }
            Expr::Assign(assign) => self.check_assign(assign),
            Expr::Call(call) => self.check_call(call),
            Expr::Intrinsic(intrinsic) => self.check_intrinsic(intrinsic),
        }
    }

    fn check_read(&mut self, ident: &IdentExpr<'_>) -> Option<DataType> {
        let name = ident.ident.name;
        let (error, ty) = match self.resolve(name) {
            Some((_, Symbol::Variable(var))) if !var.initialized => (
                Some(SemanticError::Uninitialized {
                    name: name.to_string(),
                }),
                var.data_type,
            ),
            Some((_, Symbol::Variable(var))) => (None, var.data_type),
            Some((_, Symbol::Method(method))) => (
                Some(SemanticError::NotAVariable {
                    name: name.to_string(),
                }),
                Some(method.return_type),
            ),
            None if self.ctx.methods.contains(name) => (
                Some(SemanticError::NotAVariable {
                    name: name.to_string(),
                }),
                None,
            ),
            None => (
                Some(SemanticError::UnknownVariable {
                    name: name.to_string(),
                }),
                None,
            ),
        };
        if let Some(error) = error {
            self.report(error, ident.span);
        }
        ty
    }

    fn check_assign(&mut self, assign: &AssignExpr<'_>) -> CheckResult<Option<DataType>> {
        let ident = assign.target.as_ident();
        let target = match ident {
            Some(ident) => self.check_store(ident),
            None => {
                self.report(SemanticError::InvalidAssignmentTarget, assign.target.span());
                self.check_expr(assign.target)?;
                None
            }
        };

        let value = self.check_expr(assign.value)?;

        if let (Some(ident), Some((scope, target_type))) = (ident, target) {
            if let Some(ty) = target_type {
                self.expect_type(ty, value, assign.span);
            }
            self.ctx.scopes.mark_initialized(scope, ident.ident.name);
        }
        Ok(value)
    }

    /// Resolve an assignment target to the scope declaring it and its type.
    ///
    /// The target is not marked initialized here, so a read of it on the
    /// right-hand side is still reported.
    fn check_store(&mut self, ident: &IdentExpr<'_>) -> Option<(ScopeId, Option<DataType>)> {
        let name = ident.ident.name;
        let found = self
            .resolve(name)
            .map(|(scope, symbol)| (scope, symbol.as_variable().map(|var| var.data_type)));

        let error = match found {
            Some((scope, Some(ty))) => return Some((scope, ty)),
            Some((_, None)) => SemanticError::NotAVariable {
                name: name.to_string(),
            },
            None if self.ctx.methods.contains(name) => SemanticError::NotAVariable {
                name: name.to_string(),
            },
            None => SemanticError::UnknownVariable {
                name: name.to_string(),
            },
        };
        self.report(error, ident.span);
        None
    }

    fn check_binary(&mut self, binary: &BinaryExpr<'_>) -> CheckResult<Option<DataType>> {
        let left = self.check_expr(binary.left)?;
        let right = self.check_expr(binary.right)?;
        let op = binary.op;

        let mismatched = matches!((left, right), (Some(l), Some(r)) if l != r);
        let unsupported = |ty: DataType| SemanticError::unsupported_operator(Some(ty), op);

        let error = match op.category() {
            OpCategory::Arithmetic if mismatched => Some(SemanticError::mismatch(left, right)),
            OpCategory::Arithmetic => left.filter(|ty| !ty.is_numeric()).map(unsupported),
            OpCategory::Relational if mismatched => Some(SemanticError::mismatch(left, right)),
            OpCategory::Relational => left
                .filter(|&ty| !ty.is_value() || (ty == DataType::String && !op.is_equality()))
                .map(unsupported),
            OpCategory::Logical => match left {
                Some(ty) if ty != DataType::Bool => Some(unsupported(ty)),
                _ if mismatched => Some(SemanticError::mismatch(left, right)),
                _ => None,
            },
        };
        if let Some(error) = error {
            self.report(error, binary.span);
        }

        Ok(match op.category() {
            OpCategory::Arithmetic => left.or(right),
            OpCategory::Relational | OpCategory::Logical => Some(DataType::Bool),
        })
    }

    fn check_call(&mut self, call: &CallExpr<'_>) -> CheckResult<Option<DataType>> {
        let name = call.callee.name;
        let signature = self
            .ctx
            .methods
            .find(name)
            .map(|m| (m.return_type, m.param_types.clone()));

        let Some((return_type, param_types)) = signature else {
            self.report(
                SemanticError::UnknownMethod {
                    name: name.to_string(),
                },
                call.span,
            );
            for arg in call.args {
                self.check_expr(arg)?;
            }
            return Ok(Some(DataType::Void));
        };

        if param_types.len() != call.args.len() {
            self.report(
                SemanticError::ArgumentCountMismatch {
                    name: name.to_string(),
                    expected: param_types.len(),
                    found: call.args.len(),
                },
                call.span,
            );
        }
        for (i, arg) in call.args.iter().enumerate() {
            let found = self.check_expr(arg)?;
            if let Some(&expected) = param_types.get(i) {
                self.expect_type(expected, found, arg.span());
            }
        }
        Ok(Some(return_type))
    }

    fn check_intrinsic(&mut self, intrinsic: &IntrinsicExpr<'_>) -> CheckResult<Option<DataType>> {
        match intrinsic.kind {
            Intrinsic::WriteLine(arg) => {
                if let Some(ty) = self.check_expr(arg)?
                    && !ty.is_value()
                {
                    self.report(SemanticError::UnprintableType { ty }, intrinsic.span);
                }
            }
            Intrinsic::RandomInt(Some(bound)) => {
                let found = self.check_expr(bound)?;
                self.expect_type(DataType::Int, found, bound.span());
            }
            Intrinsic::RandomInt(None)
            | Intrinsic::ReadInt
            | Intrinsic::ReadFloat
            | Intrinsic::ReadBool
            | Intrinsic::ReadLine => {}
        }
        Ok(Some(intrinsic.kind.result_type()))
    }
}
