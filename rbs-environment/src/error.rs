//! Error types for the declaration environment
//!
//! Structural errors surface while merging declarations. They carry the
//! locations of every declaration involved so reports can point at both.

use miette::{Diagnostic, SourceSpan};
use rbs_parser::{Location, TypeName};
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
#[allow(clippy::result_large_err)]
pub enum EnvironmentError {
    #[error("Class entry `{name}` has no declarations")]
    #[diagnostic(
        code(rbs::environment::empty_entry),
        help("Entries are created together with their first declaration; this is an internal error")
    )]
    EmptyEntry { name: TypeName },

    #[error("Generic parameters of `{name}` at {other_location} do not match {location}")]
    #[diagnostic(
        code(rbs::environment::generic_parameter_mismatch),
        help("Every declaration of a class or module must declare the same type parameters with the same variance and bounds")
    )]
    GenericParameterMismatch {
        name: TypeName,
        /// Declaration whose parameters are the reference
        location: Location,
        /// Declaration that disagrees
        other_location: Location,
        #[label("type parameters differ from the first declaration")]
        span: SourceSpan,
    },

    #[error("`{name}` is declared as a {kind} at {location} and as a {other_kind} at {other_location}")]
    #[diagnostic(
        code(rbs::environment::duplicated_declaration),
        help("A constant can name either a class or a module, not both")
    )]
    DuplicatedDeclaration {
        name: TypeName,
        kind: &'static str,
        other_kind: &'static str,
        location: Location,
        other_location: Location,
        #[label("redeclared as a {other_kind} here")]
        span: SourceSpan,
    },

    #[error("Cyclic class hierarchy: {cycle}")]
    #[diagnostic(
        code(rbs::environment::cyclic_class_hierarchy),
        help("A class cannot inherit from itself, directly or through its superclasses")
    )]
    CyclicClassHierarchy {
        name: TypeName,
        /// Names along the cycle, `A < B < A`
        cycle: String,
        location: Location,
        #[label("`{name}` inherits from itself")]
        span: SourceSpan,
    },
}

impl EnvironmentError {
    /// Location of the declaration the error is reported against
    pub fn location(&self) -> Option<&Location> {
        match self {
            EnvironmentError::EmptyEntry { .. } => None,
            EnvironmentError::GenericParameterMismatch { other_location, .. } => Some(other_location),
            EnvironmentError::DuplicatedDeclaration { other_location, .. } => Some(other_location),
            EnvironmentError::CyclicClassHierarchy { location, .. } => Some(location),
        }
    }

    /// Attach the source of the offending file for rendering
    pub fn into_report(self) -> miette::Report {
        match self.location().map(Location::named_source) {
            Some(source) => miette::Report::new(self).with_source_code(source),
            None => miette::Report::new(self),
        }
    }
}

pub type EnvironmentResult<T> = Result<T, EnvironmentError>;
