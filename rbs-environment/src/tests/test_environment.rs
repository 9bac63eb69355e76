use pretty_assertions::assert_eq;
use rbs_parser::{parse_signature, TypeName};

use crate::ancestry::SuperclassGraph;
use crate::environment::Environment;
use crate::error::EnvironmentError;

fn environment(source: &str) -> Environment {
    let (_, declarations) = parse_signature("env.rbs", source).expect("Failed to parse");
    let mut environment = Environment::new();
    environment
        .insert_declarations(declarations)
        .expect("Failed to insert declarations");
    environment
}

fn name(text: &str) -> TypeName {
    TypeName::parse(text)
}

#[test]
fn test_nested_declarations_get_absolute_names() {
    let env = environment("module A\n  class B\n  end\nend\nclass A::C\nend\n");

    let names: Vec<String> = env.names().map(|name| name.to_string()).collect();
    assert_eq!(names, vec!["::A", "::A::B", "::A::C"]);

    let (context, _) = &env.get(&name("::A::B")).unwrap().declarations()[0];
    assert_eq!(context.to_string(), "(nil, ::A)");
}

#[test]
fn test_reopened_class_merges_into_one_entry() {
    let env = environment("class Foo\nend\nclass Foo\n  def bar: () -> void\nend\n");

    assert_eq!(env.len(), 1);
    let entry = env.get(&name("::Foo")).unwrap();
    assert_eq!(entry.len(), 2);
    assert_eq!(entry.members().count(), 1);
}

#[test]
fn test_class_and_module_clash() {
    let (_, declarations) =
        parse_signature("env.rbs", "class Foo\nend\nmodule Foo\nend\n").expect("Failed to parse");
    let mut env = Environment::new();

    match env.insert_declarations(declarations) {
        Err(EnvironmentError::DuplicatedDeclaration {
            kind,
            other_kind,
            other_location,
            ..
        }) => {
            assert_eq!(kind, "class");
            assert_eq!(other_kind, "module");
            assert_eq!(other_location.start_line(), 3);
        }
        other => panic!("Expected duplicated declaration, got {:?}", other),
    }
}

#[test]
fn test_superclass_resolves_through_context() {
    let env = environment("module M\n  class Base\n  end\n  class Child < Base\n  end\nend\n");

    assert_eq!(env.superclass_of(&name("::M::Child")).unwrap(), Some(name("::M::Base")));
    assert_eq!(env.superclass_of(&name("::M::Base")).unwrap(), None);
    assert_eq!(env.superclass_of(&name("::M")).unwrap(), None);
}

#[test]
fn test_undeclared_superclass_is_not_resolved() {
    let env = environment("class Foo < Object\nend\n");

    assert_eq!(env.superclass_of(&name("::Foo")).unwrap(), None);
    assert!(env.validate().is_ok());
}

#[test]
fn test_ancestors_and_linearization() {
    let env = environment("class A\nend\nclass B < A\nend\nclass C < B\nend\n");
    let graph = SuperclassGraph::build(&env).unwrap();

    assert_eq!(graph.ancestors(&name("::C")), vec![name("::B"), name("::A")]);
    assert_eq!(
        graph.linearize().unwrap(),
        vec![name("::A"), name("::B"), name("::C")]
    );
}

#[test]
fn test_cyclic_hierarchy_is_rejected() {
    let env = environment("class A < B\nend\nclass B < A\nend\n");

    match env.validate() {
        Err(EnvironmentError::CyclicClassHierarchy { cycle, .. }) => {
            assert!(cycle.contains("::A"));
            assert!(cycle.contains("::B"));
            assert!(cycle.contains(" < "));
        }
        other => panic!("Expected cyclic class hierarchy, got {:?}", other),
    }
}

#[test]
fn test_validate_reports_type_param_mismatch() {
    let env = environment("class Box[T]\nend\nclass Box[T, U]\nend\n");

    assert!(matches!(
        env.validate(),
        Err(EnvironmentError::GenericParameterMismatch { .. })
    ));
}

#[test]
fn test_resolve_type_name_from_nested_context() {
    let env = environment("module A\n  class B\n  end\nend\nclass B\nend\n");
    let in_a = crate::context::ResolverContext::top().push_module(name("::A"));

    assert_eq!(env.resolve_type_name(&in_a, &name("B")), Some(name("::A::B")));
    assert_eq!(
        env.resolve_type_name(&crate::context::ResolverContext::top(), &name("B")),
        Some(name("::B"))
    );
}
