// Test signature declaration parsing
// Classes, modules and members together with their keyed locations

use pretty_assertions::assert_eq;
use rbs_parser::*;

const SIGNATURE: &str = r#"# Collections
module Kernel : _Each[Integer], Object
end

class Foo[out T < Comparable] < Bar[T]
  include Enumerable[T]
  attr_reader name: String

  def self.create: [U] (U) -> Foo[U]
  def each: () { (T) -> void } -> void
          | () -> Enumerator[T, void]
  private def to_s: ...

  class Inner
  end
end
"#;

fn parse() -> Vec<Declaration> {
    let (_, declarations) = parse_signature("foo.rbs", SIGNATURE).expect("Failed to parse");
    declarations
}

#[test]
fn test_top_level_declarations() {
    let declarations = parse();

    assert_eq!(declarations.len(), 2);
    assert!(declarations[0].is_module());
    assert!(declarations[1].is_class());
    assert_eq!(declarations[0].name().to_string(), "Kernel");
    assert_eq!(declarations[1].name().to_string(), "Foo");
}

#[test]
fn test_module_self_types_and_location() {
    let declarations = parse();

    match &declarations[0] {
        Declaration::Module(module) => {
            assert_eq!(module.self_types.len(), 2);
            assert_eq!(module.self_types[0].name.to_string(), "_Each");
            assert_eq!(module.self_types[0].args, vec![Type::class_instance("Integer")]);

            let location = &module.location;
            assert_eq!(location.start_line(), 2);
            assert_eq!(location.required_child(ModuleKey::Keyword).unwrap().source(), "module");
            assert_eq!(location.required_child(ModuleKey::Name).unwrap().source(), "Kernel");
            assert_eq!(location.required_child(ModuleKey::End).unwrap().start_line(), 3);
            assert_eq!(location.optional_child(ModuleOptionalKey::Colon).unwrap().source(), ":");
            assert_eq!(
                location.optional_child(ModuleOptionalKey::SelfTypes).unwrap().source(),
                "_Each[Integer], Object"
            );
            assert_eq!(
                location.optional_child_state(ModuleOptionalKey::TypeParams),
                ChildState::Absent
            );
        }
        other => panic!("Expected module declaration, got {:?}", other),
    }
}

#[test]
fn test_class_header() {
    let declarations = parse();

    match &declarations[1] {
        Declaration::Class(class) => {
            assert_eq!(class.type_params.len(), 1);
            assert_eq!(class.type_params[0].variance, Variance::Covariant);
            assert_eq!(
                class.type_params[0].upper_bound,
                Some(Type::class_instance("Comparable"))
            );

            let super_class = class.super_class.as_ref().expect("Expected superclass");
            assert_eq!(super_class.name.to_string(), "Bar");
            assert_eq!(super_class.args, vec![Type::Variable("T".to_string())]);
            assert_eq!(super_class.location.source(), "Bar[T]");

            let location = &class.location;
            assert_eq!(
                location.optional_child(ClassOptionalKey::TypeParams).unwrap().source(),
                "[out T < Comparable]"
            );
            assert_eq!(location.optional_child(ClassOptionalKey::Lt).unwrap().source(), "<");
            assert_eq!(location.required_child(ClassKey::End).unwrap().start_line(), 16);
        }
        other => panic!("Expected class declaration, got {:?}", other),
    }
}

#[test]
fn test_class_members() {
    let declarations = parse();
    let members = declarations[1].members();

    assert_eq!(members.len(), 6);

    match &members[0] {
        Member::Mixin(mixin) => {
            assert_eq!(mixin.kind, MixinKind::Include);
            assert_eq!(mixin.name.to_string(), "Enumerable");
            assert_eq!(mixin.args, vec![Type::Variable("T".to_string())]);
        }
        other => panic!("Expected mixin, got {:?}", other),
    }

    match &members[1] {
        Member::Attribute(attribute) => {
            assert_eq!(attribute.kind, AttributeKind::Reader);
            assert_eq!(attribute.name, "name");
            assert_eq!(attribute.ty, Type::class_instance("String"));
        }
        other => panic!("Expected attribute, got {:?}", other),
    }

    match &members[2] {
        Member::MethodDefinition(method) => {
            assert_eq!(method.name, "create");
            assert_eq!(method.kind, MethodKind::Singleton);
            assert_eq!(method.overloads.len(), 1);
            assert_eq!(method.overloads[0].to_string(), "[U] (U) -> Foo[U]");
            assert_eq!(
                method.location.optional_child(MethodOptionalKey::Kind).unwrap().source(),
                "self."
            );
        }
        other => panic!("Expected method definition, got {:?}", other),
    }

    match &members[3] {
        Member::MethodDefinition(method) => {
            assert_eq!(method.name, "each");
            assert_eq!(method.kind, MethodKind::Instance);
            let overloads: Vec<String> = method.overloads.iter().map(|o| o.to_string()).collect();
            assert_eq!(
                overloads,
                vec![
                    "() { (T) -> void } -> void".to_string(),
                    "() -> Enumerator[T, void]".to_string(),
                ]
            );
            assert!(!method.overloading);
        }
        other => panic!("Expected method definition, got {:?}", other),
    }

    match &members[4] {
        Member::MethodDefinition(method) => {
            assert_eq!(method.name, "to_s");
            assert!(method.overloading);
            assert!(method.overloads.is_empty());
            assert_eq!(method.visibility, Some(Visibility::Private));
        }
        other => panic!("Expected method definition, got {:?}", other),
    }

    match &members[5] {
        Member::Class(inner) => assert_eq!(inner.name.to_string(), "Inner"),
        other => panic!("Expected nested class, got {:?}", other),
    }
}

#[test]
fn test_syntax_error_points_into_file() {
    let result = parse_signature("bad.rbs", "class Foo\n  def foo: () ->\nend\n");

    match result {
        Err(ParseError::SyntaxError { span, .. }) => {
            assert!(span.offset() >= "class Foo\n  def foo: () ->".len());
        }
        other => panic!("Expected syntax error, got {:?}", other),
    }
}

#[test]
fn test_operator_and_backtick_method_names() {
    let (_, declarations) = parse_signature(
        "ops.rbs",
        "class Vec\n  def +: (Vec) -> Vec\n  def []: (Integer) -> Float\n  def `class`: () -> Class\nend\n",
    )
    .expect("Failed to parse");

    let names: Vec<&str> = declarations[0]
        .members()
        .iter()
        .map(|member| match member {
            Member::MethodDefinition(method) => method.name.as_str(),
            _ => panic!("Expected method definition"),
        })
        .collect();
    assert_eq!(names, vec!["+", "[]", "class"]);
}
