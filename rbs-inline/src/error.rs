// Inline extraction errors
// Failures that stop an extraction pass, as opposed to per-declaration diagnostics

use miette::Diagnostic;
use rbs_parser::LocationError;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum InlineError {
    #[error("Failed to load the Ruby grammar: {reason}")]
    #[diagnostic(code(rbs::inline::language))]
    Language { reason: String },

    #[error("Ruby parser produced no tree for `{name}`")]
    #[diagnostic(
        code(rbs::inline::parse_failed),
        help("The parser gives up only when cancelled or misconfigured")
    )]
    ParseFailed { name: String },

    #[error("Both a leading and a trailing {annotation} annotation reached the combinator")]
    #[diagnostic(
        code(rbs::inline::conflicting_annotations),
        help("Annotation precedence must be resolved before building the annotation; this is an internal error")
    )]
    ConflictingAnnotations { annotation: &'static str },

    #[error("Nesting stack is empty when leaving a module")]
    #[diagnostic(code(rbs::inline::nesting_underflow))]
    NestingUnderflow,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Location(#[from] LocationError),
}

pub type ExtractResult<T> = Result<T, InlineError>;
