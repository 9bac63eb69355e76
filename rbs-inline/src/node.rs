//! Ruby CST node kinds the extractor cares about

use std::ops::Range;

use rbs_parser::{Buffer, Location, LocationError, Namespace, TypeName};
use tree_sitter::Node;

/// Closed view of a tree-sitter-ruby node; everything else is `Other`
#[derive(Debug, Clone, Copy)]
pub enum RubyNode<'t> {
    Class(Node<'t>),
    Module(Node<'t>),
    SingletonClass(Node<'t>),
    Method(Node<'t>),
    SingletonMethod(Node<'t>),
    Call(Node<'t>),
    Identifier(Node<'t>),
    Other(Node<'t>),
}

impl<'t> RubyNode<'t> {
    pub fn classify(node: Node<'t>) -> Self {
        match node.kind() {
            "class" => RubyNode::Class(node),
            "module" => RubyNode::Module(node),
            "singleton_class" => RubyNode::SingletonClass(node),
            "method" => RubyNode::Method(node),
            "singleton_method" => RubyNode::SingletonMethod(node),
            "call" => RubyNode::Call(node),
            "identifier" => RubyNode::Identifier(node),
            _ => RubyNode::Other(node),
        }
    }

    pub fn node(&self) -> Node<'t> {
        match *self {
            RubyNode::Class(node)
            | RubyNode::Module(node)
            | RubyNode::SingletonClass(node)
            | RubyNode::Method(node)
            | RubyNode::SingletonMethod(node)
            | RubyNode::Call(node)
            | RubyNode::Identifier(node)
            | RubyNode::Other(node) => node,
        }
    }
}

/// Named children in document order
pub fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).collect()
}

/// Anonymous token child such as `def` or `end`
pub fn token_child<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .find(|child| !child.is_named() && child.kind() == kind);
    found
}

pub fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or_default()
}

/// Character range of a node in `buffer`
pub fn char_range(buffer: &Buffer, node: Node<'_>) -> Range<usize> {
    buffer.byte_to_char(node.start_byte())..buffer.byte_to_char(node.end_byte())
}

pub fn location(buffer: &std::sync::Arc<Buffer>, node: Node<'_>) -> Result<Location, LocationError> {
    Location::new(buffer.clone(), char_range(buffer, node))
}

/// `Foo`, `Foo::Bar` or `::Foo` as a type name; `None` for anything computed
pub fn constant_path(node: Node<'_>, source: &str) -> Option<TypeName> {
    match node.kind() {
        "constant" => Some(TypeName::new(Namespace::empty(), text(node, source))),
        "scope_resolution" => {
            let name = node.child_by_field_name("name")?;
            if name.kind() != "constant" {
                return None;
            }
            let namespace = match node.child_by_field_name("scope") {
                None => Namespace::root(),
                Some(scope) => constant_path(scope, source)?.to_namespace(),
            };
            Some(TypeName::new(namespace, text(name, source)))
        }
        _ => None,
    }
}

/// Name of a symbol or string literal argument, `:name` or `"name"`
pub fn literal_name(node: Node<'_>, source: &str) -> Option<String> {
    let raw = text(node, source);
    match node.kind() {
        "simple_symbol" => raw.strip_prefix(':').map(str::to_string),
        "string" => {
            let unquoted = raw
                .strip_prefix('"')
                .and_then(|rest| rest.strip_suffix('"'))
                .or_else(|| raw.strip_prefix('\'').and_then(|rest| rest.strip_suffix('\'')))?;
            let plain = unquoted.chars().all(|c| c.is_alphanumeric() || c == '_');
            plain.then(|| unquoted.to_string())
        }
        _ => None,
    }
}
