use pretty_assertions::assert_eq;
use rbs_parser::{parse_signature, Declaration, Member, TypeName};

use crate::class_entry::ClassEntry;
use crate::context::ResolverContext;
use crate::error::EnvironmentError;

fn declarations(source: &str) -> Vec<Declaration> {
    let (_, declarations) = parse_signature("entry.rbs", source).expect("Failed to parse");
    declarations
}

fn entry_for(source: &str) -> ClassEntry {
    let mut entry = ClassEntry::new(TypeName::parse("::Foo"));
    for declaration in declarations(source) {
        entry.record(ResolverContext::top(), declaration);
    }
    entry
}

#[test]
fn test_primary_declaration_prefers_explicit_superclass() {
    let source = "class Foo\nend\nclass Foo < Bar\nend\n";
    let entry = entry_for(source);

    let primary = entry.primary_declaration().expect("Expected primary declaration");
    assert_eq!(primary, &entry.declarations()[1].1);
    assert_eq!(primary.location().start_line(), 3);
}

#[test]
fn test_primary_declaration_first_superclass_wins() {
    let entry = entry_for("class Foo < Bar\nend\nclass Foo < Baz\nend\n");

    let primary = entry.primary_declaration().unwrap();
    assert_eq!(primary.super_class().unwrap().name.to_string(), "Bar");
}

#[test]
fn test_primary_declaration_defaults_to_first() {
    let entry = entry_for("class Foo\nend\nclass Foo\nend\n");

    assert_eq!(entry.len(), 2);
    assert_eq!(entry.primary_declaration().unwrap().location().start_line(), 1);
}

#[test]
fn test_empty_entry_has_no_primary_declaration() {
    let entry = ClassEntry::new(TypeName::parse("::Foo"));

    assert!(entry.is_empty());
    match entry.primary_declaration() {
        Err(EnvironmentError::EmptyEntry { name }) => assert_eq!(name.to_string(), "::Foo"),
        other => panic!("Expected empty entry error, got {:?}", other),
    }
    assert!(matches!(entry.validate_type_params(), Err(EnvironmentError::EmptyEntry { .. })));
}

#[test]
fn test_type_params_come_from_primary_declaration() {
    let entry = entry_for("class Foo[T]\nend\nclass Foo[T] < Bar\nend\n");

    let params = entry.type_params().unwrap();
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].name, "T");
}

#[test]
fn test_arity_mismatch_is_rejected() {
    let entry = entry_for("class Foo[T]\nend\nclass Foo[T, U]\nend\n");

    match entry.validate_type_params() {
        Err(EnvironmentError::GenericParameterMismatch {
            name,
            location,
            other_location,
            ..
        }) => {
            assert_eq!(name.to_string(), "::Foo");
            assert_eq!(location.start_line(), 1);
            assert_eq!(other_location.start_line(), 3);
        }
        other => panic!("Expected generic parameter mismatch, got {:?}", other),
    }
}

#[test]
fn test_identical_type_params_are_accepted() {
    let entry = entry_for("class Foo[T]\nend\nclass Foo[T]\nend\n");

    assert!(entry.validate_type_params().is_ok());
}

#[test]
fn test_renamed_type_params_are_accepted() {
    let entry = entry_for("class Foo[out T < Comparable]\nend\nclass Foo[out U < Comparable]\nend\n");

    assert!(entry.validate_type_params().is_ok());
}

#[test]
fn test_variance_mismatch_is_rejected() {
    let entry = entry_for("class Foo[out T]\nend\nclass Foo[T]\nend\n");

    assert!(matches!(
        entry.validate_type_params(),
        Err(EnvironmentError::GenericParameterMismatch { .. })
    ));
}

#[test]
fn test_bound_mismatch_is_rejected() {
    let entry = entry_for("class Foo[T < String]\nend\nclass Foo[T < Integer]\nend\n");

    assert!(matches!(
        entry.validate_type_params(),
        Err(EnvironmentError::GenericParameterMismatch { .. })
    ));
}

#[test]
fn test_members_across_declarations() {
    let entry = entry_for("class Foo\n  def a: () -> void\nend\nclass Foo\n  def b: () -> void\nend\n");

    let members: Vec<(String, String)> = entry
        .members()
        .map(|(context, member)| match member {
            Member::MethodDefinition(method) => (context.to_string(), method.name.clone()),
            other => panic!("Expected method definition, got {:?}", other),
        })
        .collect();

    assert_eq!(
        members,
        vec![
            ("(nil, ::Foo)".to_string(), "a".to_string()),
            ("(nil, ::Foo)".to_string(), "b".to_string()),
        ]
    );

    // restartable
    assert_eq!(entry.members().count(), 2);
}
