use ugo_rust::lexer::Pos;
use ugo_rust::symbol::{Object, ObjectKind, ScopeTree, Universe, BUILTIN_EXIT, BUILTIN_PRINTLN};

fn local(name: &str, offset: usize) -> Object {
    Object::new(
        name,
        format!("%local_{name}.pos.{offset}"),
        ObjectKind::Local,
        Some(Pos(offset)),
    )
}

#[test]
fn test_universe_builtins() {
    let universe = Universe::global();
    let println = universe.lookup("println").unwrap();
    assert_eq!(println.mangled_name, BUILTIN_PRINTLN);
    assert_eq!(println.kind.arity(), Some(1));
    assert_eq!(universe.lookup("exit").unwrap().mangled_name, BUILTIN_EXIT);
    assert!(universe.lookup("print").is_none());
    assert!(std::ptr::eq(universe, Universe::global()));
}

#[test]
fn test_root_scope_sees_builtins() {
    let scopes = ScopeTree::new(Universe::global());
    assert_eq!(scopes.current(), scopes.root());
    assert!(scopes.lookup("println").is_some());
    assert!(scopes.has_name("exit"));
}

#[test]
fn test_lookup_walks_outward() {
    let mut scopes = ScopeTree::new(Universe::global());
    let outer = scopes.enter();
    assert!(scopes.insert(local("x", 1)).is_none());

    let inner = scopes.enter();
    assert!(!scopes.has_name("x"));
    assert_eq!(scopes.lookup("x").unwrap().mangled_name, "%local_x.pos.1");
    assert!(scopes.lookup("println").is_some());
    assert!(scopes.lookup("y").is_none());

    assert_eq!(scopes.scope(inner).parent(), Some(outer));
    assert_eq!(scopes.scope(outer).parent(), Some(scopes.root()));
}

#[test]
fn test_shadowing_and_leave() {
    let mut scopes = ScopeTree::new(Universe::global());
    scopes.enter();
    scopes.insert(local("x", 1));

    scopes.enter();
    assert!(scopes.insert(local("x", 9)).is_none());
    assert_eq!(scopes.lookup("x").unwrap().pos, Some(Pos(9)));

    scopes.leave();
    assert_eq!(scopes.lookup("x").unwrap().pos, Some(Pos(1)));
}

#[test]
fn test_insert_keeps_existing() {
    let mut scopes = ScopeTree::new(Universe::global());
    scopes.enter();
    scopes.insert(local("x", 1));

    let existing = scopes.insert(local("x", 5)).cloned();
    assert_eq!(existing.unwrap().pos, Some(Pos(1)));
    assert_eq!(scopes.lookup("x").unwrap().pos, Some(Pos(1)));
    assert_eq!(scopes.scope(scopes.current()).len(), 1);
}

#[test]
fn test_root_is_never_left() {
    let mut scopes = ScopeTree::new(Universe::global());
    scopes.leave();
    assert_eq!(scopes.current(), scopes.root());
    assert_eq!(scopes.len(), 1);
}

#[test]
fn test_local_builtin_shadowing_does_not_touch_universe() {
    let mut scopes = ScopeTree::new(Universe::global());
    scopes.enter();
    scopes.insert(local("println", 3));
    assert_eq!(scopes.lookup("println").unwrap().kind, ObjectKind::Local);
    assert_eq!(
        Universe::global().lookup("println").unwrap().kind,
        ObjectKind::Builtin { arity: 1 }
    );
}
