use std::collections::HashSet;

use pretty_assertions::assert_eq;
use rbs_parser::{Namespace, TypeName};

use crate::context::{ContextModule, ResolverContext};

fn nested(names: &[&str]) -> ResolverContext {
    names
        .iter()
        .fold(ResolverContext::top(), |context, name| context.push_module(TypeName::parse(name)))
}

#[test]
fn test_top_context() {
    let top = ResolverContext::top();

    assert!(top.is_top());
    assert_eq!(top.depth(), 0);
    assert_eq!(top.module(), None);
    assert_eq!(top.namespace(), Namespace::root());
    assert_eq!(top.to_string(), "nil");
}

#[test]
fn test_pushing_keeps_parent_usable() {
    let outer = nested(&["::A"]);
    let inner = outer.push_module(TypeName::parse("::A::B"));

    assert_eq!(inner.to_string(), "((nil, ::A), ::A::B)");
    assert_eq!(outer.to_string(), "(nil, ::A)");
    assert_eq!(inner.parent(), Some(&outer));
    assert_eq!(inner.depth(), 2);
    assert_eq!(inner.namespace().to_string(), "::A::B::");
}

#[test]
fn test_unknown_module_is_skipped_for_namespace() {
    let context = nested(&["::A"]).push_unknown();

    assert_eq!(context.module(), Some(&ContextModule::Unknown));
    assert!(context.has_unknown());
    assert_eq!(context.namespace().to_string(), "::A::");
    assert_eq!(context.to_string(), "((nil, ::A), ?)");
}

#[test]
fn test_structural_equality_and_hashing() {
    let first = nested(&["::A", "::A::B"]);
    let second = nested(&["::A", "::A::B"]);
    let other = nested(&["::A", "::A::C"]);

    assert_eq!(first, second);
    assert_ne!(first, other);

    let set: HashSet<ResolverContext> = [first, second, other].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn test_resolve_innermost_scope_wins() {
    let declared: HashSet<TypeName> = ["::A::B", "::B", "::C", "::A::B::C"]
        .iter()
        .map(|name| TypeName::parse(name))
        .collect();
    let exists = |name: &TypeName| declared.contains(name);

    let in_a = nested(&["::A"]);
    assert_eq!(in_a.resolve(&TypeName::parse("B"), exists), Some(TypeName::parse("::A::B")));
    assert_eq!(in_a.resolve(&TypeName::parse("C"), exists), Some(TypeName::parse("::C")));

    let in_b = nested(&["::A", "::A::B"]);
    assert_eq!(in_b.resolve(&TypeName::parse("C"), exists), Some(TypeName::parse("::A::B::C")));
    assert_eq!(in_b.resolve(&TypeName::parse("B::C"), exists), Some(TypeName::parse("::A::B::C")));
}

#[test]
fn test_resolve_absolute_and_missing_names() {
    let context = nested(&["::A"]);
    let nothing = |_: &TypeName| false;

    assert_eq!(
        context.resolve(&TypeName::parse("::Undeclared"), nothing),
        Some(TypeName::parse("::Undeclared"))
    );
    assert_eq!(context.resolve(&TypeName::parse("Missing"), nothing), None);
}

#[test]
fn test_resolve_skips_unknown_scopes() {
    let context = nested(&["::A"]).push_unknown();
    let exists = |name: &TypeName| name == &TypeName::parse("::A::B");

    assert_eq!(context.resolve(&TypeName::parse("B"), exists), Some(TypeName::parse("::A::B")));
}
