//! Binder integration tests.
//!
//! Builds programs with the node builder, binds them, and inspects the
//! resulting scopes, symbols and offsets.

use bumpalo::Bump;
use cminus_ast::{BinaryOperator, Program, ScopeKind, TypeSpecifier};
use cminus_binder::{Binder, LayoutConfig, ScopeId, Symbol, SymbolRole, ValueKind};
use cminus_diagnostics::ErrorKind;
use cminus_nodebuilder::NodeBuilder;

use TypeSpecifier::{Int, Void};

/// Helper: bind a program with default options.
fn bind(program: &Program<'_>) -> Binder {
    let mut binder = Binder::new();
    binder.bind_program(program);
    binder
}

/// Helper: all symbols named `name`, in declaration order.
fn symbols_named<'b>(binder: &'b Binder, name: &str) -> Vec<&'b Symbol> {
    binder
        .get_symbols()
        .iter()
        .filter(|s| s.name == name)
        .collect()
}

fn only_symbol<'b>(binder: &'b Binder, name: &str) -> &'b Symbol {
    let found = symbols_named(binder, name);
    assert_eq!(found.len(), 1, "expected exactly one symbol named {}", name);
    found[0]
}

// ============================================================================
// Declarations
// ============================================================================

#[test]
fn test_bind_scenario_a_global_offset() {
    let arena = Bump::new();
    let b = NodeBuilder::new(&arena);
    // int x; void main(void) { x = 1; }
    let program = b.program(vec![
        b.global(b.var_decl(Int, "x", 1)),
        b.function(
            Void,
            "main",
            2,
            vec![],
            b.block(2, vec![], vec![b.expr_stmt(b.assign(b.id("x", 3), b.num(1, 3), 3))]),
        ),
    ]);

    let binder = bind(program);
    assert!(!binder.has_errors());
    let x = only_symbol(&binder, "x");
    assert_eq!(x.scope, ScopeId::GLOBAL);
    assert_eq!(x.offset, 4);
    assert_eq!(x.role, SymbolRole::Variable);
    assert_eq!(x.lines, vec![1, 3]);

    let main = only_symbol(&binder, "main");
    assert_eq!(main.role, SymbolRole::Function);
    assert_eq!(main.value_kind, ValueKind::Void);
    assert_eq!(main.offset, 0);
}

#[test]
fn test_bind_parameter_and_local_offsets() {
    let arena = Bump::new();
    let b = NodeBuilder::new(&arena);
    // int g; int f(int a, int b) { int l1; int l2; return a; } void main(void) {}
    let program = b.program(vec![
        b.global(b.var_decl(Int, "g", 1)),
        b.function(
            Int,
            "f",
            2,
            vec![b.param(Int, "a", 2), b.param(Int, "b", 2)],
            b.block(
                2,
                vec![b.var_decl(Int, "l1", 3), b.var_decl(Int, "l2", 4)],
                vec![b.return_stmt(5, Some(b.id("a", 5)))],
            ),
        ),
        b.function(Void, "main", 7, vec![], b.block(7, vec![], vec![])),
    ]);

    let binder = bind(program);
    assert!(!binder.has_errors());
    assert_eq!(only_symbol(&binder, "g").offset, 4);
    assert_eq!(only_symbol(&binder, "a").offset, 0);
    assert_eq!(only_symbol(&binder, "b").offset, -4);
    assert_eq!(only_symbol(&binder, "l1").offset, -4);
    assert_eq!(only_symbol(&binder, "l2").offset, -8);
    assert_eq!(only_symbol(&binder, "f").offset, 0);
    assert_eq!(only_symbol(&binder, "main").offset, 1);
    assert_eq!(only_symbol(&binder, "a").role, SymbolRole::Parameter);
}

#[test]
fn test_bind_counters_reset_per_function() {
    let arena = Bump::new();
    let b = NodeBuilder::new(&arena);
    let program = b.program(vec![
        b.function(
            Void,
            "f",
            1,
            vec![b.param(Int, "p", 1)],
            b.block(1, vec![b.var_decl(Int, "u", 2)], vec![]),
        ),
        b.global(b.var_decl(Int, "g", 4)),
        b.function(
            Void,
            "main",
            5,
            vec![],
            b.block(5, vec![b.var_decl(Int, "v", 6)], vec![]),
        ),
    ]);

    let binder = bind(program);
    assert_eq!(only_symbol(&binder, "u").offset, -4);
    assert_eq!(only_symbol(&binder, "v").offset, -4);
    // declared between two functions, so it takes the global counter
    assert_eq!(only_symbol(&binder, "g").offset, 4);
    assert_eq!(only_symbol(&binder, "g").scope, ScopeId::GLOBAL);
}

#[test]
fn test_bind_arrays() {
    let arena = Bump::new();
    let b = NodeBuilder::new(&arena);
    // int a[10]; int y; void f(int p[]) { int loc[3]; } void main(void) {}
    let program = b.program(vec![
        b.global(b.array_decl("a", 10, 1)),
        b.global(b.var_decl(Int, "y", 2)),
        b.function(
            Void,
            "f",
            3,
            vec![b.array_param("p", 3)],
            b.block(3, vec![b.array_decl("loc", 3, 4)], vec![]),
        ),
        b.function(Void, "main", 6, vec![], b.block(6, vec![], vec![])),
    ]);

    let binder = bind(program);
    let a = only_symbol(&binder, "a");
    assert_eq!(a.offset, 40);
    assert_eq!(a.value_kind, ValueKind::Array(Some(10)));
    assert_eq!(only_symbol(&binder, "y").offset, 44);
    assert_eq!(only_symbol(&binder, "p").value_kind, ValueKind::Array(None));
    assert_eq!(only_symbol(&binder, "p").offset, 0);
    assert_eq!(only_symbol(&binder, "loc").offset, -12);

    let f = binder.table().lookup_function_signature("f").unwrap();
    assert_eq!(f.arity(), 1);
    assert!(f.parameters[0].is_array);
}

#[test]
fn test_bind_custom_layout() {
    let arena = Bump::new();
    let b = NodeBuilder::new(&arena);
    let program = b.program(vec![
        b.global(b.var_decl(Int, "x", 1)),
        b.function(
            Void,
            "main",
            2,
            vec![],
            b.block(2, vec![b.var_decl(Int, "l", 3)], vec![]),
        ),
    ]);

    let mut binder = Binder::with_options(
        LayoutConfig {
            word_size: 8,
            local_base: -4,
        },
        true,
    );
    binder.bind_program(program);
    assert_eq!(only_symbol(&binder, "x").offset, 8);
    assert_eq!(only_symbol(&binder, "l").offset, -12);
}

#[test]
fn test_bind_recursive_call_resolves() {
    let arena = Bump::new();
    let b = NodeBuilder::new(&arena);
    // int fact(int n) { return fact(n); } void main(void) {}
    let program = b.program(vec![
        b.function(
            Int,
            "fact",
            1,
            vec![b.param(Int, "n", 1)],
            b.block(
                1,
                vec![],
                vec![b.return_stmt(2, Some(b.call("fact", vec![b.id("n", 2)], 2)))],
            ),
        ),
        b.function(Void, "main", 4, vec![], b.block(4, vec![], vec![])),
    ]);

    let binder = bind(program);
    assert!(!binder.has_errors());
    assert_eq!(only_symbol(&binder, "fact").lines, vec![1, 2]);
}

// ============================================================================
// Scope and Shadowing
// ============================================================================

#[test]
fn test_bind_shadowing_resolves_innermost() {
    let arena = Bump::new();
    let b = NodeBuilder::new(&arena);
    // 1 int x;
    // 2 void main(void) {
    // 3   int x;
    // 4   x = 1;
    // 5   { int x;
    // 6     x = 2; }
    // 7   x = 3;
    // 8 }
    let program = b.program(vec![
        b.global(b.var_decl(Int, "x", 1)),
        b.function(
            Void,
            "main",
            2,
            vec![],
            b.block(
                2,
                vec![b.var_decl(Int, "x", 3)],
                vec![
                    b.expr_stmt(b.assign(b.id("x", 4), b.num(1, 4), 4)),
                    b.compound(
                        5,
                        vec![b.var_decl(Int, "x", 5)],
                        vec![b.expr_stmt(b.assign(b.id("x", 6), b.num(2, 6), 6))],
                    ),
                    b.expr_stmt(b.assign(b.id("x", 7), b.num(3, 7), 7)),
                ],
            ),
        ),
    ]);

    let binder = bind(program);
    assert!(!binder.has_errors());
    let xs = symbols_named(&binder, "x");
    assert_eq!(xs.len(), 3);
    assert_eq!(xs[0].lines, vec![1], "global x is never referenced");
    assert_eq!(xs[1].lines, vec![3, 4, 7]);
    assert_eq!(xs[2].lines, vec![5, 6]);
    assert_ne!(xs[1].scope, xs[2].scope);
}

#[test]
fn test_bind_scope_kinds() {
    let arena = Bump::new();
    let b = NodeBuilder::new(&arena);
    // void main(void) { if (1 < 2) { int t; } else ; while (1) { int w; } }
    let program = b.program(vec![b.function(
        Void,
        "main",
        1,
        vec![],
        b.block(
            1,
            vec![],
            vec![
                b.if_stmt(
                    2,
                    b.binary(BinaryOperator::Less, b.num(1, 2), b.num(2, 2), 2),
                    b.compound(2, vec![b.var_decl(Int, "t", 2)], vec![]),
                    Some(b.empty_stmt(3)),
                ),
                b.while_stmt(4, b.num(1, 4), b.compound(4, vec![b.var_decl(Int, "w", 4)], vec![])),
            ],
        ),
    )]);

    let binder = bind(program);
    let kinds: Vec<ScopeKind> = binder.table().scopes().iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ScopeKind::Global,
            ScopeKind::Function,
            ScopeKind::Branch,
            ScopeKind::Branch,
            ScopeKind::Loop,
        ]
    );
    let depths: Vec<u32> = binder.table().scopes().iter().map(|s| s.depth).collect();
    assert_eq!(depths, vec![0, 1, 2, 2, 2]);
    // compound bodies share the branch/loop scope
    assert_eq!(only_symbol(&binder, "t").scope, ScopeId(2));
    assert_eq!(only_symbol(&binder, "w").scope, ScopeId(4));
    assert_eq!(binder.scope_depth(), 0);
}

#[test]
fn test_bind_sibling_scopes_are_isolated() {
    let arena = Bump::new();
    let b = NodeBuilder::new(&arena);
    // void main(void) { { int t; } { t = 1; } }
    let program = b.program(vec![b.function(
        Void,
        "main",
        1,
        vec![],
        b.block(
            1,
            vec![],
            vec![
                b.compound(2, vec![b.var_decl(Int, "t", 2)], vec![]),
                b.compound(3, vec![], vec![b.expr_stmt(b.assign(b.id("t", 3), b.num(1, 3), 3))]),
            ],
        ),
    )]);

    let mut binder = bind(program);
    let diagnostics = binder.take_diagnostics();
    assert_eq!(diagnostics.kinds(), vec![ErrorKind::UndeclaredIdentifier]);
    assert_eq!(diagnostics.first().and_then(|d| d.line), Some(3));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_bind_duplicate_variable_in_same_scope() {
    let arena = Bump::new();
    let b = NodeBuilder::new(&arena);
    // int x; int x;
    let program = b.program(vec![
        b.global(b.var_decl(Int, "x", 1)),
        b.global(b.var_decl(Int, "x", 2)),
    ]);

    let mut binder = bind(program);
    assert!(binder.is_halted());
    let diagnostics = binder.take_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    let dup = &diagnostics.diagnostics()[0];
    assert_eq!(dup.kind, ErrorKind::DuplicateDeclaration);
    assert_eq!(dup.line, Some(2));
    assert!(dup.message_text.contains("line 1"));
    assert_eq!(dup.related_information[0].line, Some(1));
    assert_eq!(symbols_named(&binder, "x").len(), 1);
}

#[test]
fn test_bind_parameter_and_local_share_scope() {
    let arena = Bump::new();
    let b = NodeBuilder::new(&arena);
    // void f(int a) { int a; }
    let program = b.program(vec![b.function(
        Void,
        "f",
        1,
        vec![b.param(Int, "a", 1)],
        b.block(1, vec![b.var_decl(Int, "a", 2)], vec![]),
    )]);

    let mut binder = bind(program);
    let diagnostics = binder.take_diagnostics();
    assert_eq!(diagnostics.kinds(), vec![ErrorKind::DuplicateDeclaration]);
    assert_eq!(diagnostics.first().and_then(|d| d.line), Some(2));
}

#[test]
fn test_bind_scenario_b_duplicate_function() {
    let arena = Bump::new();
    let b = NodeBuilder::new(&arena);
    // int f(int a) { return a; } int f(int b) { return b; } void main(void) {}
    let program = b.program(vec![
        b.function(
            Int,
            "f",
            1,
            vec![b.param(Int, "a", 1)],
            b.block(1, vec![], vec![b.return_stmt(1, Some(b.id("a", 1)))]),
        ),
        b.function(
            Int,
            "f",
            2,
            vec![b.param(Int, "b", 2)],
            b.block(2, vec![], vec![b.return_stmt(2, Some(b.id("b", 2)))]),
        ),
        b.function(Void, "main", 3, vec![], b.block(3, vec![], vec![])),
    ]);

    let mut binder = bind(program);
    assert!(binder.is_halted());
    let diagnostics = binder.take_diagnostics();
    assert_eq!(diagnostics.len(), 1);
    let dup = &diagnostics.diagnostics()[0];
    assert_eq!(dup.kind, ErrorKind::DuplicateDeclaration);
    assert_eq!(dup.line, Some(2));
    assert_eq!(dup.related_information[0].line, Some(1));
    // the walk stopped before main
    assert!(binder.table().lookup_function_signature("main").is_none());
    assert_eq!(binder.table().functions().len(), 1);
}

#[test]
fn test_bind_function_colliding_with_global() {
    let arena = Bump::new();
    let b = NodeBuilder::new(&arena);
    let program = b.program(vec![
        b.global(b.var_decl(Int, "f", 1)),
        b.function(Void, "f", 2, vec![], b.block(2, vec![], vec![])),
    ]);

    let mut binder = bind(program);
    let diagnostics = binder.take_diagnostics();
    assert_eq!(diagnostics.kinds(), vec![ErrorKind::DuplicateDeclaration]);
    assert!(binder.table().functions().is_empty());
}

#[test]
fn test_bind_collects_all_errors_when_continuing() {
    let arena = Bump::new();
    let b = NodeBuilder::new(&arena);
    // int x; int x; void main(void) { y = 1; z = 2; }
    let program = b.program(vec![
        b.global(b.var_decl(Int, "x", 1)),
        b.global(b.var_decl(Int, "x", 2)),
        b.function(
            Void,
            "main",
            3,
            vec![],
            b.block(
                3,
                vec![],
                vec![
                    b.expr_stmt(b.assign(b.id("y", 4), b.num(1, 4), 4)),
                    b.expr_stmt(b.assign(b.id("z", 5), b.num(2, 5), 5)),
                ],
            ),
        ),
    ]);

    let mut binder = Binder::with_options(LayoutConfig::default(), false);
    binder.bind_program(program);
    assert!(!binder.is_halted());
    let diagnostics = binder.take_diagnostics();
    assert_eq!(
        diagnostics.kinds(),
        vec![
            ErrorKind::DuplicateDeclaration,
            ErrorKind::UndeclaredIdentifier,
            ErrorKind::UndeclaredIdentifier,
        ]
    );
    // main is still bound after the earlier errors
    assert!(binder.table().lookup_function_signature("main").is_some());
}

// ============================================================================
// Listing
// ============================================================================

#[test]
fn test_bind_listing_after_binding() {
    let arena = Bump::new();
    let b = NodeBuilder::new(&arena);
    let program = b.program(vec![
        b.global(b.var_decl(Int, "x", 1)),
        b.function(
            Void,
            "main",
            2,
            vec![],
            b.block(2, vec![], vec![b.expr_stmt(b.assign(b.id("x", 3), b.num(1, 3), 3))]),
        ),
    ]);

    let binder = bind(program);
    let listing = binder.table().listing().to_string();
    let rows: Vec<&str> = listing.lines().skip(2).collect();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].starts_with("x    0      4    Var"));
    assert!(rows[1].starts_with("main 0      0    Func"));
}
