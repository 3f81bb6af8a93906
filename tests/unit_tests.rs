//! Integration tests for the BSharp compiler using `Compiler` as the entry
//! point.
//!
//! These tests build whole programs with `AstBuilder` and check the full
//! pipeline: the method table, annotation, the semantic checker, and the
//! generated assembler text.

mod common;

use bsharp::prelude::*;
use common::{BOOL, INT, assert_stack_sound, body, compile, errors, main_method};

// =============================================================================
// Code Generation
// =============================================================================

#[test]
fn test_sum_and_print() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);

    // int x = 1 + 1;
    // WriteLine(x);
    let at = Span::line(2);
    let sum = b.binary(b.int(1, at), BinaryOp::Add, b.int(1, at));
    let decl = b.local(INT, "x", Some(sum), at);
    let at = Span::line(3);
    let print = b.intrinsic(Intrinsic::WriteLine(b.var("x", at)), at);
    let main = main_method(&b, vec![decl, b.expr_stmt(print, at)]);
    let program = b.program(vec![main]);

    let unit = compile(&program);
    let main = unit.method("Main").unwrap();
    assert_eq!(main.max_stack, 2);
    assert_eq!(main.max_locals, 2);
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
    assert_stack_sound(&unit);
}

#[test]
fn test_countdown_loop_shape() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);

    // int n = ReadInt();
    // while (n > 0) {
    //     WriteLine("tick");
    //     n = n - 1;
    // }
    let at = Span::line;
    let read = b.intrinsic(Intrinsic::ReadInt, at(2));
    let decl = b.local(INT, "n", Some(read), at(2));
    let cond = b.binary(b.var("n", at(3)), BinaryOp::Greater, b.int(0, at(3)));
    let tick = b.intrinsic(Intrinsic::WriteLine(b.string("tick", at(4))), at(4));
    let dec = b.binary(b.var("n", at(5)), BinaryOp::Sub, b.int(1, at(5)));
    let step = b.assign(b.var("n", at(5)), dec);
    let loop_body = b.block_stmt(
        vec![b.expr_stmt(tick, at(4)), b.expr_stmt(step, at(5))],
        Span::lines(3, 6),
    );
    let looped = b.while_stmt(cond, loop_body, Span::lines(3, 6));
    let program = b.program(vec![main_method(&b, vec![decl, looped])]);

    let unit = compile(&program);
    let code = body(&unit, "Main");
    let top = code.iter().position(|l| l == "L0:").unwrap();
    assert_eq!(
        &code[top..],
        [
            "L0:",
            "iload_1",
            "iconst_0",
            "if_icmple L2",
            "iconst_1",
            "goto L3",
            "L2:",
            "iconst_0",
            "L3:",
            "ifeq L1",
            "getstatic java/lang/System/out Ljava/io/PrintStream;",
            "ldc \"tick\"",
            "invokevirtual java/io/PrintStream/println(Ljava/lang/String;)V",
            "iload_1",
            "iconst_1",
            "isub",
            "istore_1",
            "goto L0",
            "L1:",
            "return",
        ]
    );
    assert_eq!(code.iter().filter(|l| *l == "L0:").count(), 1);
    assert_eq!(code.iter().filter(|l| *l == "ifeq L1").count(), 1);
    assert_eq!(code.iter().filter(|l| *l == "goto L0").count(), 1);
    assert_stack_sound(&unit);
}

#[test]
fn test_forward_call_resolves() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);

    // void Main() { WriteLine(Add(2, 3)); }
    // int Add(int a, int b) { return a + b; }
    let at = Span::line(2);
    let call = b.call("Add", &[b.int(2, at), b.int(3, at)], at);
    let print = b.intrinsic(Intrinsic::WriteLine(call), at);
    let main = main_method(&b, vec![b.expr_stmt(print, at)]);

    let at = Span::line(6);
    let sum = b.binary(b.var("a", at), BinaryOp::Add, b.var("b", at));
    let add_body = b.block(vec![b.ret(Some(sum), at)], Span::lines(5, 7));
    let add = b.method(
        "Add",
        Some(DataType::Int),
        vec![
            b.param(DataType::Int, "a", Span::line(5)),
            b.param(DataType::Int, "b", Span::line(5)),
        ],
        add_body,
        Span::lines(5, 7),
    );
    let program = b.program(vec![main, add]);

    let unit = compile(&program);
    let main_code = body(&unit, "Main");
    assert!(main_code.iter().any(|l| l == "invokevirtual Program.Add(II)I"));
    let add_code = ["iload_1", "iload_2", "iadd", "ireturn"];
    assert_eq!(body(&unit, "Add"), add_code);

    let add = unit.method("Add").unwrap();
    assert_eq!(add.descriptor, "(II)I");
    assert_eq!(add.max_locals, 3);
    assert_eq!(add.max_stack, 2);
    assert_stack_sound(&unit);
}

#[test]
fn test_boilerplate_uses_class_name() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let program = b.program(vec![main_method(&b, vec![])]);

    let options = CompileOptions::new("Calculator");
    let unit = Compiler::compile(&program, &options).unwrap();
    let lines = unit.lines();
    assert_eq!(
        &lines[..3],
        [
            ".bytecode 49.0",
            ".class public Calculator",
            ".super java/lang/Object",
        ]
    );
    let entry = ".method public static main([Ljava/lang/String;)V";
    assert!(lines.iter().any(|l| l == entry));
    assert!(lines.iter().any(|l| l == "invokevirtual Calculator.Main()V"));
    assert_eq!(lines.last().map(String::as_str), Some(".end method"));
}

#[test]
fn test_sibling_blocks_share_slots() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);

    // if (true) { int a = 1; } else { int c = 2; }
    // int d = 3;
    let at = Span::line;
    let a = b.local(INT, "a", Some(b.int(1, at(2))), at(2));
    let then_block = b.block_stmt(vec![a], at(2));
    let c = b.local(INT, "c", Some(b.int(2, at(3))), at(3));
    let else_block = b.block_stmt(vec![c], at(3));
    let cond = b.bool(true, at(2));
    let branch = b.if_stmt(cond, then_block, Some(else_block), Span::lines(2, 3));
    let after = b.local(INT, "d", Some(b.int(3, at(4))), at(4));
    let program = b.program(vec![main_method(&b, vec![branch, after])]);

    let unit = compile(&program);
    let code = body(&unit, "Main");
    assert_eq!(code.iter().filter(|l| *l == "istore_1").count(), 3);
    assert_eq!(unit.method("Main").unwrap().max_locals, 2);
    assert_stack_sound(&unit);
}

#[test]
fn test_inferred_locals_and_reads() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);

    // var f = ReadFloat();
    // var name = ReadLine();
    // var r = RandomInt(10);
    // WriteLine(f / 2.0);
    let at = Span::line;
    let read_float = b.intrinsic(Intrinsic::ReadFloat, at(2));
    let read_line = b.intrinsic(Intrinsic::ReadLine, at(3));
    let random = b.intrinsic(Intrinsic::RandomInt(Some(b.int(10, at(4)))), at(4));
    let half = b.binary(b.var("f", at(5)), BinaryOp::Div, b.float(2.0, at(5)));
    let print = b.intrinsic(Intrinsic::WriteLine(half), at(5));
    let stmts = vec![
        b.local(TypeSpec::Inferred, "f", Some(read_float), at(2)),
        b.local(TypeSpec::Inferred, "name", Some(read_line), at(3)),
        b.local(TypeSpec::Inferred, "r", Some(random), at(4)),
        b.expr_stmt(print, at(5)),
    ];
    let program = b.program(vec![main_method(&b, stmts)]);

    let unit = compile(&program);
    let code = body(&unit, "Main");
    for expected in [
        "invokevirtual java/util/Scanner.nextFloat()F",
        "invokevirtual java/util/Scanner.nextLine()Ljava/lang/String;",
        "invokevirtual java/util/Random.nextInt(I)I",
        "fstore_1",
        "astore_2",
        "istore_3",
        "fdiv",
        "invokevirtual java/io/PrintStream/println(F)V",
    ] {
        assert!(code.iter().any(|l| l == expected), "missing {expected}");
    }

    let main = unit.method("Main").unwrap();
    assert_eq!(main.max_locals, 4);
    assert_eq!(main.max_stack, 3);
    assert_stack_sound(&unit);
}

// =============================================================================
// Diagnostics
// =============================================================================

#[test]
fn test_missing_main() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let span = Span::lines(1, 2);
    let body = b.block(vec![], span);
    let program = b.program(vec![b.method("Start", None, vec![], body, span)]);

    let expected = ["Line 1 - No Main method has been found."];
    assert_eq!(errors(&program), expected);
}

#[test]
fn test_duplicate_main_reported_per_declaration() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let main = |span| b.method("Main", None, vec![], b.block(vec![], span), span);
    let program = b.program(vec![main(Span::lines(1, 3)), main(Span::lines(5, 7))]);

    assert_eq!(
        errors(&program),
        [
            "Line 1 - Multiple methods found with the same identifier of Main.",
            "Line 5 - Multiple methods found with the same identifier of Main.",
        ]
    );
}

#[test]
fn test_read_during_own_assignment() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);

    // int x;
    // x = x;
    let decl = b.local(INT, "x", None, Span::line(2));
    let at = Span::line(3);
    let assign = b.assign(b.var("x", at), b.var("x", at));
    let main = main_method(&b, vec![decl, b.expr_stmt(assign, at)]);
    let program = b.program(vec![main]);

    let expected = ["Line 3 - x has not been initialized yet."];
    assert_eq!(errors(&program), expected);
}

#[test]
fn test_missing_return_points_at_closing_line() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);

    let main = main_method(&b, vec![]);
    let at = Span::line(6);
    let local = b.local(INT, "v", Some(b.int(4, at)), at);
    let span = Span::lines(5, 8);
    let value_body = b.block(vec![local], span);
    let value = b.method("Value", Some(DataType::Int), vec![], value_body, span);
    let program = b.program(vec![main, value]);

    let expected = ["Line 8 - Method Value is missing a return statement."];
    assert_eq!(errors(&program), expected);
}

#[test]
fn test_diagnostics_follow_traversal_order() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);

    // void Start() {
    //     WriteLine(y);
    //     int z = true;
    // }
    // void Helper(int a) {
    //     if (a) { }
    // }
    let at = Span::line;
    let print = b.intrinsic(Intrinsic::WriteLine(b.var("y", at(2))), at(2));
    let bad = b.local(INT, "z", Some(b.bool(true, at(3))), at(3));
    let start_body = b.block(vec![b.expr_stmt(print, at(2)), bad], Span::lines(1, 4));
    let start = b.method("Start", None, vec![], start_body, Span::lines(1, 4));

    let cond = b.if_stmt(b.var("a", at(6)), b.block_stmt(vec![], at(6)), None, at(6));
    let helper_body = b.block(vec![cond], Span::lines(5, 7));
    let helper = b.method(
        "Helper",
        None,
        vec![b.param(DataType::Int, "a", at(5))],
        helper_body,
        Span::lines(5, 7),
    );
    let program = b.program(vec![start, helper]);

    let err = Compiler::compile(&program, &CompileOptions::default()).unwrap_err();
    assert!(err.is_semantic());
    assert_eq!(
        err.to_string(),
        "4 Errors found.\n\
         Line 1 - No Main method has been found.\n\
         Line 2 - Variable y does not exist in the current scope.\n\
         Line 3 - Types do not match, int bool.\n\
         Line 6 - Types do not match, bool int."
    );
}

#[test]
fn test_missing_return_reported_before_body_errors() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);

    // int Foo() {
    //     WriteLine(y);
    // }
    let main = main_method(&b, vec![]);
    let at = Span::line(6);
    let print = b.intrinsic(Intrinsic::WriteLine(b.var("y", at)), at);
    let span = Span::lines(5, 7);
    let foo_body = b.block(vec![b.expr_stmt(print, at)], span);
    let foo = b.method("Foo", Some(DataType::Int), vec![], foo_body, span);
    let program = b.program(vec![main, foo]);

    assert_eq!(
        errors(&program),
        [
            "Line 7 - Method Foo is missing a return statement.",
            "Line 6 - Variable y does not exist in the current scope.",
        ]
    );
}

#[test]
fn test_assignment_target_reported_before_value() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);

    // y = z;
    let at = Span::line(2);
    let assign = b.assign(b.var("y", at), b.var("z", at));
    let program = b.program(vec![main_method(&b, vec![b.expr_stmt(assign, at)])]);

    assert_eq!(
        errors(&program),
        [
            "Line 2 - Variable y does not exist in the current scope.",
            "Line 2 - Variable z does not exist in the current scope.",
        ]
    );
}

#[test]
fn test_variable_used_before_declaration() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);

    // WriteLine(z);
    // int z = 1;
    let at = Span::line(2);
    let print = b.intrinsic(Intrinsic::WriteLine(b.var("z", at)), at);
    let decl = b.local(INT, "z", Some(b.int(1, Span::line(3))), Span::line(3));
    let main = main_method(&b, vec![b.expr_stmt(print, at), decl]);
    let program = b.program(vec![main]);

    let expected = ["Line 2 - Variable z does not exist in the current scope."];
    assert_eq!(errors(&program), expected);
}

#[test]
fn test_block_local_not_visible_after_block() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);

    // { int y = 1; }
    // WriteLine(y);
    let at = Span::line(2);
    let inner = b.block_stmt(vec![b.local(INT, "y", Some(b.int(1, at)), at)], at);
    let at = Span::line(3);
    let print = b.intrinsic(Intrinsic::WriteLine(b.var("y", at)), at);
    let main = main_method(&b, vec![inner, b.expr_stmt(print, at)]);
    let program = b.program(vec![main]);

    let expected = ["Line 3 - Variable y does not exist in the current scope."];
    assert_eq!(errors(&program), expected);
}

#[test]
fn test_call_arity_and_unknown_method() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);

    // Twice(1, 2);
    // Missing();
    let at = Span::line(2);
    let twice_call = b.call("Twice", &[b.int(1, at), b.int(2, at)], at);
    let missing = b.call("Missing", &[], Span::line(3));
    let main = main_method(
        &b,
        vec![
            b.expr_stmt(twice_call, at),
            b.expr_stmt(missing, Span::line(3)),
        ],
    );

    let at = Span::line(7);
    let doubled = b.binary(b.var("n", at), BinaryOp::Mul, b.int(2, at));
    let twice_body = b.block(vec![b.ret(Some(doubled), at)], Span::lines(6, 8));
    let twice = b.method(
        "Twice",
        Some(DataType::Int),
        vec![b.param(DataType::Int, "n", Span::line(6))],
        twice_body,
        Span::lines(6, 8),
    );
    let program = b.program(vec![main, twice]);

    assert_eq!(
        errors(&program),
        [
            "Line 2 - Method Twice expects 1 arguments but 2 were given.",
            "Line 3 - Method Missing does not exist.",
        ]
    );
}

#[test]
fn test_no_output_when_any_error() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);

    let at = Span::line(2);
    let decl = b.local(BOOL, "ok", Some(b.int(1, at)), at);
    let program = b.program(vec![main_method(&b, vec![decl])]);

    let result = Compiler::compile(&program, &CompileOptions::default());
    assert!(matches!(result, Err(CompileError::Semantic(ref d)) if d.len() == 1));
}

// =============================================================================
// Whole Pipeline
// =============================================================================

#[test]
fn test_compile_is_repeatable() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);

    let at = Span::line;
    let less = b.binary(b.var("i", at(3)), BinaryOp::Less, b.int(3, at(3)));
    let both = b.binary(less, BinaryOp::LogicalAnd, b.bool(true, at(3)));
    let next = b.binary(b.var("i", at(4)), BinaryOp::Add, b.int(1, at(4)));
    let step = b.assign(b.var("i", at(4)), next);
    let looped = b.while_stmt(both, b.expr_stmt(step, at(4)), Span::lines(3, 4));
    let decl = b.local(INT, "i", Some(b.int(0, at(2))), at(2));
    let program = b.program(vec![main_method(&b, vec![decl, looped])]);

    let first = compile(&program);
    let second = compile(&program);
    assert_eq!(first, second);
    assert_eq!(first.to_string(), second.to_string());
    assert_stack_sound(&first);
}

#[test]
fn test_every_method_stack_sound() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);

    // void Main() {
    //     bool big = Pick(RandomInt()) > 10 || !ReadBool();
    //     if (big) { WriteLine('y'); } else { WriteLine(Pick(1) * 2); }
    // }
    // int Pick(int n) {
    //     int m = n;
    //     m = m = n + 1;
    //     return m;
    // }
    let at = Span::line;
    let random = b.intrinsic(Intrinsic::RandomInt(None), at(2));
    let picked = b.call("Pick", &[random], at(2));
    let over = b.binary(picked, BinaryOp::Greater, b.int(10, at(2)));
    let read = b.not(b.intrinsic(Intrinsic::ReadBool, at(2)), at(2));
    let cond = b.binary(over, BinaryOp::LogicalOr, read);
    let decl = b.local(BOOL, "big", Some(cond), at(2));

    let yes = b.intrinsic(Intrinsic::WriteLine(b.char('y', at(3))), at(3));
    let pick_one = b.call("Pick", &[b.int(1, at(3))], at(3));
    let twice = b.binary(pick_one, BinaryOp::Mul, b.int(2, at(3)));
    let no = b.intrinsic(Intrinsic::WriteLine(twice), at(3));
    let branch = b.if_stmt(
        b.var("big", at(3)),
        b.block_stmt(vec![b.expr_stmt(yes, at(3))], at(3)),
        Some(b.block_stmt(vec![b.expr_stmt(no, at(3))], at(3))),
        at(3),
    );
    let main = main_method(&b, vec![decl, branch]);

    let copy = b.local(INT, "m", Some(b.var("n", at(6))), at(6));
    let next = b.binary(b.var("n", at(7)), BinaryOp::Add, b.int(1, at(7)));
    let inner = b.assign(b.var("m", at(7)), next);
    let chained = b.assign(b.var("m", at(7)), inner);
    let ret = b.ret(Some(b.var("m", at(8))), at(8));
    let pick_body = b.block(
        vec![copy, b.expr_stmt(chained, at(7)), ret],
        Span::lines(5, 9),
    );
    let pick = b.method(
        "Pick",
        Some(DataType::Int),
        vec![b.param(DataType::Int, "n", at(5))],
        pick_body,
        Span::lines(5, 9),
    );
    let program = b.program(vec![main, pick]);

    let unit = compile(&program);
    assert_stack_sound(&unit);
    assert_eq!(unit.method("Main").unwrap().max_stack, 3);
    assert_eq!(unit.method("Pick").unwrap().max_stack, 2);
    let print_char = "invokevirtual java/io/PrintStream/println(C)V";
    assert!(body(&unit, "Main").iter().any(|l| l == print_char));
}
