//! Arena-backed construction of syntax trees.
//!
//! [`AstBuilder`] is the one place node ids are handed out. A front-end
//! builds its tree through it; tests and benchmarks use it directly to write
//! trees without a parser.

use std::cell::Cell;

use bsharp_core::{DataType, NodeId, Span};
use bumpalo::Bump;

use crate::ast::*;

/// Allocates syntax tree nodes in a bump arena and numbers them.
pub struct AstBuilder<'ast> {
    arena: &'ast Bump,
    next_id: Cell<u32>,
}

impl<'ast> AstBuilder<'ast> {
    /// Create a builder allocating into `arena`. Ids start at 0.
    pub fn new(arena: &'ast Bump) -> Self {
        Self {
            arena,
            next_id: Cell::new(0),
        }
    }

    /// The arena nodes are allocated in.
    pub fn arena(&self) -> &'ast Bump {
        self.arena
    }

    /// Hand out the next unused node id.
    pub fn next_id(&self) -> NodeId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        NodeId::new(id)
    }

    /// Number of ids handed out so far.
    pub fn node_count(&self) -> u32 {
        self.next_id.get()
    }

    pub fn ident(&self, name: &str, span: Span) -> Ident<'ast> {
        Ident::new(self.arena.alloc_str(name), span)
    }

    fn alloc_expr(&self, expr: Expr<'ast>) -> &'ast Expr<'ast> {
        self.arena.alloc(expr)
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    pub fn literal(&self, kind: LiteralKind<'ast>, span: Span) -> &'ast Expr<'ast> {
        self.alloc_expr(Expr::Literal(LiteralExpr {
            id: self.next_id(),
            kind,
            span,
        }))
    }

    pub fn int(&self, value: i64, span: Span) -> &'ast Expr<'ast> {
        self.literal(LiteralKind::Int(value), span)
    }

    pub fn float(&self, value: f32, span: Span) -> &'ast Expr<'ast> {
        self.literal(LiteralKind::Float(value), span)
    }

    pub fn bool(&self, value: bool, span: Span) -> &'ast Expr<'ast> {
        self.literal(LiteralKind::Bool(value), span)
    }

    pub fn char(&self, value: char, span: Span) -> &'ast Expr<'ast> {
        self.literal(LiteralKind::Char(value), span)
    }

    /// A string literal; `value` is copied into the arena.
    pub fn string(&self, value: &str, span: Span) -> &'ast Expr<'ast> {
        let value = self.arena.alloc_str(value);
        self.literal(LiteralKind::String(value), span)
    }

    /// A reference to a variable by name.
    pub fn var(&self, name: &str, span: Span) -> &'ast Expr<'ast> {
        self.alloc_expr(Expr::Ident(IdentExpr {
            id: self.next_id(),
            ident: self.ident(name, span),
            span,
        }))
    }

    /// A binary operation spanning both operands.
    pub fn binary(
        &self,
        left: &'ast Expr<'ast>,
        op: BinaryOp,
        right: &'ast Expr<'ast>,
    ) -> &'ast Expr<'ast> {
        let span = left.span().merge(right.span());
        self.alloc_expr(Expr::Binary(self.arena.alloc(BinaryExpr {
            id: self.next_id(),
            left,
            op,
            right,
            span,
        })))
    }

    /// `!operand`.
    pub fn not(&self, operand: &'ast Expr<'ast>, span: Span) -> &'ast Expr<'ast> {
        self.alloc_expr(Expr::Unary(self.arena.alloc(UnaryExpr {
            id: self.next_id(),
            op: UnaryOp::Not,
            operand,
            span,
        })))
    }

    /// `target = value`, spanning both sides.
    pub fn assign(&self, target: &'ast Expr<'ast>, value: &'ast Expr<'ast>) -> &'ast Expr<'ast> {
        let span = target.span().merge(value.span());
        self.alloc_expr(Expr::Assign(self.arena.alloc(AssignExpr {
            id: self.next_id(),
            target,
            value,
            span,
        })))
    }

    /// A call to a user method.
    pub fn call(&self, name: &str, args: &[&'ast Expr<'ast>], span: Span) -> &'ast Expr<'ast> {
        let args = self
            .arena
            .alloc_slice_fill_iter(args.iter().map(|arg| **arg));
        self.alloc_expr(Expr::Call(self.arena.alloc(CallExpr {
            id: self.next_id(),
            callee: self.ident(name, span),
            args,
            span,
        })))
    }

    pub fn intrinsic(&self, kind: Intrinsic<'ast>, span: Span) -> &'ast Expr<'ast> {
        self.alloc_expr(Expr::Intrinsic(self.arena.alloc(IntrinsicExpr {
            id: self.next_id(),
            kind,
            span,
        })))
    }

    // ========================================================================
    // Statements
    // ========================================================================

    pub fn expr_stmt(&self, expr: &'ast Expr<'ast>, span: Span) -> Stmt<'ast> {
        Stmt::Expr(ExprStmt {
            id: self.next_id(),
            expr,
            span,
        })
    }

    pub fn declarator(
        &self,
        name: &str,
        init: Option<&'ast Expr<'ast>>,
        span: Span,
    ) -> VarDeclarator<'ast> {
        VarDeclarator {
            id: self.next_id(),
            name: self.ident(name, span),
            init,
            span,
        }
    }

    pub fn var_decl(&self, ty: TypeSpec, vars: Vec<VarDeclarator<'ast>>, span: Span) -> Stmt<'ast> {
        Stmt::VarDecl(VarDeclStmt {
            id: self.next_id(),
            ty,
            vars: self.arena.alloc_slice_copy(&vars),
            span,
        })
    }

    /// `ty name = init;` with a single declarator.
    pub fn local(
        &self,
        ty: TypeSpec,
        name: &str,
        init: Option<&'ast Expr<'ast>>,
        span: Span,
    ) -> Stmt<'ast> {
        let declarator = self.declarator(name, init, span);
        self.var_decl(ty, vec![declarator], span)
    }

    pub fn ret(&self, value: Option<&'ast Expr<'ast>>, span: Span) -> Stmt<'ast> {
        Stmt::Return(ReturnStmt {
            id: self.next_id(),
            value,
            span,
        })
    }

    pub fn block(&self, stmts: Vec<Stmt<'ast>>, span: Span) -> Block<'ast> {
        Block {
            id: self.next_id(),
            stmts: self.arena.alloc_slice_copy(&stmts),
            span,
        }
    }

    /// A nested block used as a statement.
    pub fn block_stmt(&self, stmts: Vec<Stmt<'ast>>, span: Span) -> Stmt<'ast> {
        Stmt::Block(self.block(stmts, span))
    }

    pub fn if_stmt(
        &self,
        condition: &'ast Expr<'ast>,
        then_stmt: Stmt<'ast>,
        else_stmt: Option<Stmt<'ast>>,
        span: Span,
    ) -> Stmt<'ast> {
        let else_clause = else_stmt.map(|stmt| ElseClause {
            id: self.next_id(),
            span: stmt.span(),
            stmt: self.arena.alloc(stmt),
        });
        Stmt::If(self.arena.alloc(IfStmt {
            id: self.next_id(),
            condition,
            then_stmt: self.arena.alloc(then_stmt),
            else_clause,
            span,
        }))
    }

    pub fn while_stmt(
        &self,
        condition: &'ast Expr<'ast>,
        body: Stmt<'ast>,
        span: Span,
    ) -> Stmt<'ast> {
        Stmt::While(self.arena.alloc(WhileStmt {
            id: self.next_id(),
            condition,
            body: self.arena.alloc(body),
            span,
        }))
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    pub fn param(&self, ty: DataType, name: &str, span: Span) -> Param<'ast> {
        Param {
            id: self.next_id(),
            ty,
            name: self.ident(name, span),
            span,
        }
    }

    pub fn method(
        &self,
        name: &str,
        return_type: Option<DataType>,
        params: Vec<Param<'ast>>,
        body: Block<'ast>,
        span: Span,
    ) -> MethodDecl<'ast> {
        MethodDecl {
            id: self.next_id(),
            name: self.ident(name, span),
            return_type,
            params: self.arena.alloc_slice_copy(&params),
            body,
            span,
        }
    }

    /// The whole unit. Its span starts at line 1 and ends with the last method.
    pub fn program(&self, methods: Vec<MethodDecl<'ast>>) -> Program<'ast> {
        let end = methods
            .iter()
            .map(|m| m.span)
            .reduce(Span::merge)
            .unwrap_or_else(|| Span::line(1));
        Program {
            id: self.next_id(),
            methods: self.arena.alloc_slice_copy(&methods),
            span: Span::new(1, 1, end.end_line.max(1), end.end_col),
        }
    }
}
