// RBS Parser Library
// Source positions, signature AST and a pest parser for annotation payloads

pub mod ast;
pub mod error;
pub mod location;
pub mod parser;

pub use ast::*;
pub use error::*;
pub use location::{format_optional, Buffer, ChildKey, ChildState, Location, NoChildren, ABSENT_LOCATION};
pub use parser::{RbsParser, Rule};

use std::sync::Arc;

/// Parse a signature document held in a new top-level buffer
pub fn parse_signature(name: &str, input: &str) -> ParseResult<(Arc<Buffer>, Vec<Declaration>)> {
    let buffer = Buffer::new(name, input);
    let declarations = RbsParser::parse_signature(&buffer)?;
    Ok((buffer, declarations))
}

/// Parse a standalone type such as `Array[String]?`
pub fn parse_type(input: &str) -> ParseResult<Type> {
    let buffer = Buffer::new("(type)", input);
    RbsParser::parse_type(&buffer, 0..buffer.len(), &[])
}

/// Parse a standalone method type such as `[T] (T) -> Array[T]`
pub fn parse_method_type(input: &str) -> ParseResult<MethodType> {
    let buffer = Buffer::new("(method type)", input);
    let mut overloads = RbsParser::parse_method_types(&buffer, 0..buffer.len(), &[])?;
    if overloads.len() > 1 {
        return Err(ParseError::SyntaxError {
            src: buffer.named_source(),
            span: miette::SourceSpan::new(0.into(), input.len()),
            message: "expected a single method type".to_string(),
        });
    }
    overloads
        .pop()
        .ok_or_else(|| ParseError::missing_element("method type", miette::SourceSpan::new(0.into(), 0)))
}

#[cfg(test)]
mod tests;

// Version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
