// RBS Parser Error Handling
// Miette-backed errors for positions and annotation/signature parsing

use crate::parser::Rule;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Errors raised by buffer and location arithmetic
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("Position {pos} is out of range for buffer `{buffer}` of length {len}")]
    #[diagnostic(code(rbs::location::out_of_range))]
    OutOfRange {
        buffer: String,
        pos: usize,
        len: usize,
    },

    #[error("Invalid range {start}...{end} for buffer `{buffer}` of length {len}")]
    #[diagnostic(code(rbs::location::invalid_range))]
    InvalidRange {
        buffer: String,
        start: usize,
        end: usize,
        len: usize,
    },

    #[error("Required child `{key}` was never assigned")]
    #[diagnostic(
        code(rbs::location::required_child_not_set),
        help("Parsers must assign every required child before publishing a location")
    )]
    RequiredChildNotSet { key: &'static str },

    #[error("Cannot create a child buffer of `{buffer}` without any range")]
    #[diagnostic(code(rbs::location::empty_child_buffer))]
    EmptyChildBuffer { buffer: String },
}

/// Main parse error type with miette integration
#[derive(Error, Diagnostic, Debug)]
pub enum ParseError {
    #[error("Syntax error: {message}")]
    #[diagnostic(
        code(rbs::parse::syntax_error),
        help("Check the syntax near the highlighted location")
    )]
    SyntaxError {
        #[source_code]
        src: NamedSource<String>,
        #[label("unexpected input")]
        span: SourceSpan,
        message: String,
    },

    #[error("Unexpected grammar rule")]
    #[diagnostic(
        code(rbs::parse::unexpected_rule),
        help("Expected rule: {expected}")
    )]
    UnexpectedRule {
        expected: String,
        found: Rule,
        #[label("found this")]
        span: SourceSpan,
    },

    #[error("Invalid integer literal `{found}`")]
    #[diagnostic(
        code(rbs::parse::invalid_integer),
        help("Integer literals must fit in a signed 64-bit integer")
    )]
    InvalidInteger {
        #[label("invalid integer")]
        span: SourceSpan,
        found: String,
    },

    #[error("Duplicated keyword parameter `{name}`")]
    #[diagnostic(code(rbs::parse::duplicated_keyword))]
    DuplicatedKeyword {
        #[label("declared again here")]
        span: SourceSpan,
        name: String,
    },

    #[error("Required positional parameter after optional or rest parameter")]
    #[diagnostic(
        code(rbs::parse::parameter_order),
        help("Order parameters as: required, optional, rest, trailing, keywords, keyword rest")
    )]
    ParameterOrder {
        #[label("misplaced parameter")]
        span: SourceSpan,
    },

    #[error("Missing {expected}")]
    #[diagnostic(code(rbs::parse::missing_element))]
    MissingElement {
        expected: String,
        #[label("expected here")]
        span: SourceSpan,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Location(#[from] LocationError),
}

impl ParseError {
    /// Create a syntax error from a pest error.
    ///
    /// `to_top` maps a byte offset of the parsed text to a byte offset of the
    /// top buffer, so the label lands on the original file.
    pub fn from_pest_error(
        error: pest::error::Error<Rule>,
        src: NamedSource<String>,
        to_top: impl Fn(usize) -> usize,
    ) -> Self {
        let (start, end) = match error.location {
            pest::error::InputLocation::Pos(pos) => (to_top(pos), to_top(pos + 1)),
            pest::error::InputLocation::Span((start, end)) => (to_top(start), to_top(end)),
        };
        let span = SourceSpan::new(start.into(), end.saturating_sub(start));

        let message = match &error.variant {
            pest::error::ErrorVariant::ParsingError { positives, .. } if !positives.is_empty() => {
                let mut expected: Vec<&str> = positives.iter().map(rule_description).collect();
                expected.dedup();
                format!("expected {}", expected.join(" or "))
            }
            pest::error::ErrorVariant::ParsingError { .. } => "unexpected token".to_string(),
            pest::error::ErrorVariant::CustomError { message } => message.clone(),
        };

        ParseError::SyntaxError { src, span, message }
    }

    /// Create an unexpected rule error
    pub fn unexpected_rule(expected: impl Into<String>, found: Rule, span: SourceSpan) -> Self {
        ParseError::UnexpectedRule {
            expected: expected.into(),
            found,
            span,
        }
    }

    /// Create a missing element error
    pub fn missing_element(expected: impl Into<String>, span: SourceSpan) -> Self {
        ParseError::MissingElement {
            expected: expected.into(),
            span,
        }
    }

    /// Span in the top buffer, when the error points at input
    pub fn span(&self) -> Option<SourceSpan> {
        match self {
            ParseError::SyntaxError { span, .. }
            | ParseError::UnexpectedRule { span, .. }
            | ParseError::InvalidInteger { span, .. }
            | ParseError::DuplicatedKeyword { span, .. }
            | ParseError::ParameterOrder { span }
            | ParseError::MissingElement { span, .. } => Some(*span),
            ParseError::Location(_) => None,
        }
    }

    /// Short human readable message, without the source snippet
    pub fn message(&self) -> String {
        match self {
            ParseError::SyntaxError { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Convert a grammar rule to a user-facing description
fn rule_description(rule: &Rule) -> &'static str {
    match rule {
        Rule::type_expr | Rule::optional_type | Rule::union_type | Rule::intersection_type => {
            "a type"
        }
        Rule::method_type => "a method type (like `(Integer) -> String`)",
        Rule::params | Rule::untyped_params => "a parameter list",
        Rule::block => "a block (like `{ (Integer) -> void }`)",
        Rule::type_params => "type parameters (like `[T]`)",
        Rule::type_param => "a type parameter",
        Rule::type_args => "type arguments (like `[Integer]`)",
        Rule::class_name => "a class name",
        Rule::interface_name => "an interface name",
        Rule::method_name => "a method name",
        Rule::kw_end => "`end`",
        Rule::EOI => "end of input",
        Rule::arrow => "`->`",
        _ => "valid syntax",
    }
}
