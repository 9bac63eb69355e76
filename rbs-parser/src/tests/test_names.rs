use crate::ast::*;

#[test]
fn test_parse_relative_and_absolute_names() {
    let relative = TypeName::parse("Foo::Bar");
    assert!(!relative.is_absolute());
    assert_eq!(relative.namespace.path, vec!["Foo".to_string()]);
    assert_eq!(relative.name, "Bar");
    assert_eq!(relative.to_string(), "Foo::Bar");

    let absolute = TypeName::parse("::Foo::Bar");
    assert!(absolute.is_absolute());
    assert_eq!(absolute.to_string(), "::Foo::Bar");
    assert_eq!(absolute.relative(), relative);
}

#[test]
fn test_name_kinds() {
    assert_eq!(TypeName::parse("String").kind(), TypeNameKind::Class);
    assert_eq!(TypeName::parse("::Enumerable::_Each").kind(), TypeNameKind::Interface);
    assert_eq!(TypeName::parse("json").kind(), TypeNameKind::Alias);
}

#[test]
fn test_prefixing_relative_names() {
    let prefix = Namespace::root().append("A");
    let name = TypeName::parse("B::C");

    assert_eq!(name.with_prefix(&prefix).to_string(), "::A::B::C");

    let absolute = TypeName::parse("::C");
    assert_eq!(absolute.with_prefix(&prefix), absolute);
}

#[test]
fn test_namespace_display_and_conversion() {
    let namespace = Namespace::root().append("A").append("B");

    assert_eq!(Namespace::root().to_string(), "::");
    assert_eq!(namespace.to_string(), "::A::B::");
    assert_eq!(namespace.to_type_name().unwrap().to_string(), "::A::B");
    assert_eq!(namespace.parent().unwrap().to_string(), "::A::");
    assert!(Namespace::root().to_type_name().is_none());

    let name = TypeName::parse("::A::B");
    assert_eq!(name.to_namespace(), namespace);
}

#[test]
fn test_simple_names() {
    assert!(TypeName::parse("T").is_simple());
    assert!(!TypeName::parse("::T").is_simple());
    assert!(!TypeName::parse("A::T").is_simple());
}
