use pretty_assertions::assert_eq;
use rbs_parser::{Buffer, Location, Type, Variance};

use crate::annotations::{combine, Annotation, AnnotationParser, LeadingBlock, TrailingAnnotation, TypeAnnotation};
use crate::comments::CommentIndex;
use crate::diagnostics::DiagnosticKind;
use crate::error::InlineError;
use crate::parse_ruby;

/// Parse the comment block ending on the row before `row`
fn leading(source: &str, row: usize, variables: &[String]) -> LeadingBlock {
    let buffer = Buffer::new("annotations.rb", source);
    let tree = parse_ruby("annotations.rb", source).expect("Failed to parse");
    let comments = CommentIndex::collect(tree.root_node(), source);
    let block = comments.leading_block(row);
    AnnotationParser::new(&buffer, variables)
        .leading(&block)
        .expect("Failed to read annotations")
}

fn annotation(source: &str, ty: Type) -> TypeAnnotation {
    let buffer = Buffer::new("combine.rb", source);
    TypeAnnotation {
        ty,
        location: Location::new(buffer, 0..source.len()).unwrap(),
    }
}

#[test]
fn test_return_and_param_directives() {
    let source = "# @rbs name: String -- who to greet\n# @rbs return: Integer?\ndef greet(name); end\n";
    let block = leading(source, 2, &[]);

    assert!(block.diagnostics.is_empty());
    assert_eq!(block.annotations.len(), 2);
    match &block.annotations[0] {
        Annotation::Param { name, annotation } => {
            assert_eq!(name, "name");
            assert_eq!(annotation.ty, Type::class_instance("String"));
            assert_eq!(annotation.location.source(), "String");
        }
        other => panic!("Expected param annotation, got {:?}", other),
    }
    match &block.annotations[1] {
        Annotation::Return(annotation) => assert_eq!(annotation.ty.to_string(), "Integer?"),
        other => panic!("Expected return annotation, got {:?}", other),
    }
}

#[test]
fn test_param_sigils_are_stripped() {
    let source = "# @rbs *rest: Integer\n# @rbs &block: ^() -> void\ndef each(*rest, &block); end\n";
    let block = leading(source, 2, &[]);

    let names: Vec<&str> = block
        .annotations
        .iter()
        .filter_map(|annotation| match annotation {
            Annotation::Param { name, .. } => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["rest", "block"]);
}

#[test]
fn test_colon_method_type_spans_continuation_lines() {
    let source = "#: (String) -> Integer\n#| (Symbol) -> Integer\ndef size(key); end\n";
    let block = leading(source, 2, &[]);

    assert!(block.diagnostics.is_empty());
    match &block.annotations[..] {
        [Annotation::ColonMethodType { method_types, location }] => {
            let printed: Vec<String> = method_types.iter().map(|ty| ty.to_string()).collect();
            assert_eq!(printed, vec!["(String) -> Integer", "(Symbol) -> Integer"]);
            assert_eq!(location.start_line(), 1);
            assert_eq!(location.end_line(), 2);
        }
        other => panic!("Expected one colon method type, got {:?}", other),
    }
}

#[test]
fn test_separate_colon_groups_stay_separate() {
    let source = "#: () -> String\n#: (Integer) -> String\ndef to_s(base = 10); end\n";
    let block = leading(source, 2, &[]);

    assert_eq!(block.annotations.len(), 2);
    assert!(block
        .annotations
        .iter()
        .all(|annotation| matches!(annotation, Annotation::ColonMethodType { method_types, .. } if method_types.len() == 1)));
}

#[test]
fn test_parsed_type_locations_point_into_the_ruby_file() {
    let source = "class Foo\n  #: (Integer) -> void\n  def bar(x); end\nend\n";
    let block = leading(source, 2, &[]);

    match &block.annotations[..] {
        [Annotation::ColonMethodType { method_types, .. }] => {
            let location = method_types[0].location.as_ref().unwrap();
            assert_eq!(location.name(), "annotations.rb");
            assert_eq!(location.start_line(), 2);
            assert_eq!(location.source(), "(Integer) -> void");
        }
        other => panic!("Expected colon method type, got {:?}", other),
    }
}

#[test]
fn test_overload_list_directive() {
    let source = "# @rbs (String) -> Integer | () -> void\ndef size(key = nil); end\n";
    let block = leading(source, 1, &[]);

    match &block.annotations[..] {
        [Annotation::Overloads { method_types, .. }] => assert_eq!(method_types.len(), 2),
        other => panic!("Expected overload list, got {:?}", other),
    }
}

#[test]
fn test_skip_override_and_generic() {
    let source = "# @rbs skip\n# @rbs override\n# @rbs generic out T < Comparable\nclass Foo; end\n";
    let block = leading(source, 3, &[]);

    assert!(block.is_skipped());
    assert!(block.is_override());
    match &block.annotations[2] {
        Annotation::Generic { param, .. } => {
            assert_eq!(param.name, "T");
            assert_eq!(param.variance, Variance::Covariant);
            assert_eq!(param.upper_bound, Some(Type::class_instance("Comparable")));
        }
        other => panic!("Expected generic annotation, got {:?}", other),
    }
}

#[test]
fn test_type_variables_in_scope() {
    let source = "# @rbs return: T\ndef first; end\n";
    let block = leading(source, 1, &["T".to_string()]);

    match &block.annotations[..] {
        [Annotation::Return(annotation)] => assert_eq!(annotation.ty, Type::Variable("T".to_string())),
        other => panic!("Expected return annotation, got {:?}", other),
    }
}

#[test]
fn test_plain_lines_become_documentation() {
    let source = "# Greets someone.\n#\n# @rbs return: String\n# Politely.\ndef greet; end\n";
    let block = leading(source, 4, &[]);

    let doc = block.doc.unwrap();
    assert_eq!(doc.string, "Greets someone.\n\nPolitely.");
    assert_eq!(doc.location.start_line(), 1);
    assert_eq!(block.annotations.len(), 1);
}

#[test]
fn test_syntax_error_is_a_diagnostic() {
    let source = "# @rbs return: Array[\ndef broken; end\n";
    let block = leading(source, 1, &[]);

    assert!(block.annotations.is_empty());
    assert_eq!(block.diagnostics.len(), 1);
    assert_eq!(block.diagnostics[0].kind(), DiagnosticKind::AnnotationSyntaxError);
    assert_eq!(block.diagnostics[0].location().start_line(), 1);
}

#[test]
fn test_unknown_directive_is_a_diagnostic() {
    let source = "# @rbs frobnicate\ndef foo; end\n";
    let block = leading(source, 1, &[]);

    match &block.diagnostics[..] {
        [diagnostic] => {
            assert_eq!(diagnostic.kind(), DiagnosticKind::AnnotationSyntaxError);
            assert!(diagnostic.to_string().contains("frobnicate"));
        }
        other => panic!("Expected one diagnostic, got {:?}", other),
    }
}

#[test]
fn test_dangling_continuation_is_unused() {
    let source = "#| (Integer) -> void\ndef foo(x); end\n";
    let block = leading(source, 1, &[]);

    assert!(block.annotations.is_empty());
    assert_eq!(block.diagnostics[0].kind(), DiagnosticKind::UnusedInlineAnnotation);
}

#[test]
fn test_rbs_prefix_needs_a_word_boundary() {
    let source = "# @rbsfoo is just prose\ndef foo; end\n";
    let block = leading(source, 1, &[]);

    assert!(block.annotations.is_empty());
    assert!(block.diagnostics.is_empty());
    assert_eq!(block.doc.unwrap().string, "@rbsfoo is just prose");
}

#[test]
fn test_trailing_assertion() {
    let source = "attr_reader :name #: String?\n";
    let buffer = Buffer::new("trailing.rb", source);
    let tree = parse_ruby("trailing.rb", source).expect("Failed to parse");
    let comments = CommentIndex::collect(tree.root_node(), source);
    let comment = comments.get(0).unwrap();

    match AnnotationParser::new(&buffer, &[]).trailing(comment).unwrap() {
        TrailingAnnotation::Assertion(annotation) => {
            assert_eq!(annotation.ty.to_string(), "String?");
        }
        other => panic!("Expected assertion, got {:?}", other),
    }
}

#[test]
fn test_trailing_plain_comment_is_absent() {
    let source = "attr_reader :name # the name\n";
    let buffer = Buffer::new("trailing.rb", source);
    let tree = parse_ruby("trailing.rb", source).expect("Failed to parse");
    let comments = CommentIndex::collect(tree.root_node(), source);

    let trailing = AnnotationParser::new(&buffer, &[])
        .trailing(comments.get(0).unwrap())
        .unwrap();
    assert!(matches!(trailing, TrailingAnnotation::Absent));
}

#[test]
fn test_combine_takes_whichever_is_present() {
    let leading = annotation("String", Type::class_instance("String"));
    let trailing = annotation("Integer", Type::class_instance("Integer"));

    assert_eq!(combine(None, None).unwrap(), None);
    assert_eq!(combine(Some(leading.clone()), None).unwrap(), Some(leading));
    assert_eq!(combine(None, Some(trailing.clone())).unwrap(), Some(trailing));
}

#[test]
fn test_combine_rejects_both() {
    let leading = annotation("String", Type::class_instance("String"));
    let trailing = annotation("Integer", Type::class_instance("Integer"));

    match combine(Some(leading), Some(trailing)) {
        Err(InlineError::ConflictingAnnotations { annotation }) => assert_eq!(annotation, "return"),
        other => panic!("Expected conflicting annotations, got {:?}", other),
    }
}
