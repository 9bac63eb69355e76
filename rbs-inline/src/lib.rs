//! Inline RBS annotations for Ruby
//!
//! Parses Ruby with tree-sitter, walks the tree once, and turns classes,
//! modules and annotated definitions into signature declarations that can be
//! merged into an [`Environment`] next to declarations from `.rbs` files.
//!
//! ```text
//! class Greeter
//!   # @rbs name: String
//!   # @rbs return: String
//!   def greet(name) = "Hello, #{name}"
//! end
//! ```

pub mod annotations;
pub mod comments;
pub mod diagnostics;
pub mod error;
pub mod extractor;
pub mod node;
pub mod options;
pub mod result;

pub use annotations::{combine, Annotation, AnnotationParser, LeadingBlock, TypeAnnotation};
pub use diagnostics::{DiagnosticKind, InlineDiagnostic};
pub use error::{ExtractResult, InlineError};
pub use extractor::{InlineExtractor, ModuleFrame, NestingState};
pub use options::ExtractOptions;
pub use result::InlineResult;

use rbs_environment::{Environment, EnvironmentResult};
use rbs_parser::Buffer;
use tree_sitter::{Language, Parser, Tree};

pub fn ruby_language() -> Language {
    tree_sitter_ruby::LANGUAGE.into()
}

/// Parse Ruby source into a tree-sitter tree
pub fn parse_ruby(name: &str, source: &str) -> ExtractResult<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&ruby_language())
        .map_err(|error| InlineError::Language {
            reason: error.to_string(),
        })?;

    parser.parse(source, None).ok_or_else(|| InlineError::ParseFailed {
        name: name.to_string(),
    })
}

/// Parse and extract a Ruby file with default options
pub fn extract(name: &str, source: &str) -> ExtractResult<InlineResult> {
    extract_with_options(name, source, ExtractOptions::default())
}

pub fn extract_with_options(name: &str, source: &str, options: ExtractOptions) -> ExtractResult<InlineResult> {
    let buffer = Buffer::new(name, source);
    let tree = parse_ruby(name, source)?;
    InlineExtractor::extract(&buffer, tree, options)
}

/// Insert the declarations of an extraction result into `environment`
pub fn load_inline(environment: &mut Environment, result: &InlineResult) -> EnvironmentResult<()> {
    for (context, declaration) in &result.declarations {
        environment.insert_declaration(context, declaration.clone())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests;
