//! Per-declaration diagnostics
//!
//! A diagnostic never stops extraction. The declaration or annotation it
//! refers to is left out of the result and the pass continues.

use std::fmt;

use miette::{Diagnostic, SourceSpan};
use rbs_parser::{Location, ParseError};
use thiserror::Error;

/// Closed set of diagnostic tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    NonConstantClassName,
    NonConstantModuleName,
    NonConstantSuperClassName,
    TopLevelMethodDefinition,
    NotImplementedYet,
    AnnotationSyntaxError,
    UnusedInlineAnnotation,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::NonConstantClassName => "NonConstantClassName",
            DiagnosticKind::NonConstantModuleName => "NonConstantModuleName",
            DiagnosticKind::NonConstantSuperClassName => "NonConstantSuperClassName",
            DiagnosticKind::TopLevelMethodDefinition => "TopLevelMethodDefinition",
            DiagnosticKind::NotImplementedYet => "NotImplementedYet",
            DiagnosticKind::AnnotationSyntaxError => "AnnotationSyntaxError",
            DiagnosticKind::UnusedInlineAnnotation => "UnusedInlineAnnotation",
        };
        write!(f, "{name}")
    }
}

#[derive(Error, Diagnostic, Debug, Clone)]
pub enum InlineDiagnostic {
    #[error("Class name is not a constant path: `{source_text}`")]
    #[diagnostic(
        code(rbs::inline::non_constant_class_name),
        help("Only `class Foo` and `class Foo::Bar` produce declarations")
    )]
    NonConstantClassName {
        source_text: String,
        location: Location,
        #[label("not a constant")]
        span: SourceSpan,
    },

    #[error("Module name is not a constant path: `{source_text}`")]
    #[diagnostic(
        code(rbs::inline::non_constant_module_name),
        help("Only `module Foo` and `module Foo::Bar` produce declarations")
    )]
    NonConstantModuleName {
        source_text: String,
        location: Location,
        #[label("not a constant")]
        span: SourceSpan,
    },

    #[error("Superclass is not a constant path: `{source_text}`")]
    #[diagnostic(
        code(rbs::inline::non_constant_super_class_name),
        help("The class is declared without a superclass")
    )]
    NonConstantSuperClassName {
        source_text: String,
        location: Location,
        #[label("not a constant")]
        span: SourceSpan,
    },

    #[error("Method `{name}` is defined outside of any class or module")]
    #[diagnostic(
        code(rbs::inline::top_level_method_definition),
        help("Move the definition into a class or module to declare it")
    )]
    TopLevelMethodDefinition {
        name: String,
        location: Location,
        #[label("top-level definition")]
        span: SourceSpan,
    },

    #[error("Not supported yet: {construct}")]
    #[diagnostic(code(rbs::inline::not_implemented_yet))]
    NotImplementedYet {
        construct: String,
        location: Location,
        #[label("skipped")]
        span: SourceSpan,
    },

    #[error("Syntax error in annotation: {message}")]
    #[diagnostic(code(rbs::inline::annotation_syntax_error))]
    AnnotationSyntaxError {
        message: String,
        location: Location,
        #[label("{message}")]
        span: SourceSpan,
    },

    #[error("Annotation is not used: {reason}")]
    #[diagnostic(code(rbs::inline::unused_inline_annotation), severity(Warning))]
    UnusedInlineAnnotation {
        reason: String,
        location: Location,
        #[label("ignored")]
        span: SourceSpan,
    },
}

impl InlineDiagnostic {
    pub fn non_constant_class_name(location: Location) -> Self {
        InlineDiagnostic::NonConstantClassName {
            source_text: location.source().to_string(),
            span: location.source_span(),
            location,
        }
    }

    pub fn non_constant_module_name(location: Location) -> Self {
        InlineDiagnostic::NonConstantModuleName {
            source_text: location.source().to_string(),
            span: location.source_span(),
            location,
        }
    }

    pub fn non_constant_super_class_name(location: Location) -> Self {
        InlineDiagnostic::NonConstantSuperClassName {
            source_text: location.source().to_string(),
            span: location.source_span(),
            location,
        }
    }

    pub fn top_level_method_definition(name: impl Into<String>, location: Location) -> Self {
        InlineDiagnostic::TopLevelMethodDefinition {
            name: name.into(),
            span: location.source_span(),
            location,
        }
    }

    pub fn not_implemented_yet(construct: impl Into<String>, location: Location) -> Self {
        InlineDiagnostic::NotImplementedYet {
            construct: construct.into(),
            span: location.source_span(),
            location,
        }
    }

    /// Syntax error in annotation text, labelled where the parser stopped
    pub fn annotation_syntax_error(error: &ParseError, location: Location) -> Self {
        InlineDiagnostic::AnnotationSyntaxError {
            message: error.message(),
            span: error.span().unwrap_or_else(|| location.source_span()),
            location,
        }
    }

    pub fn unused_inline_annotation(reason: impl Into<String>, location: Location) -> Self {
        InlineDiagnostic::UnusedInlineAnnotation {
            reason: reason.into(),
            span: location.source_span(),
            location,
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        match self {
            InlineDiagnostic::NonConstantClassName { .. } => DiagnosticKind::NonConstantClassName,
            InlineDiagnostic::NonConstantModuleName { .. } => DiagnosticKind::NonConstantModuleName,
            InlineDiagnostic::NonConstantSuperClassName { .. } => {
                DiagnosticKind::NonConstantSuperClassName
            }
            InlineDiagnostic::TopLevelMethodDefinition { .. } => {
                DiagnosticKind::TopLevelMethodDefinition
            }
            InlineDiagnostic::NotImplementedYet { .. } => DiagnosticKind::NotImplementedYet,
            InlineDiagnostic::AnnotationSyntaxError { .. } => DiagnosticKind::AnnotationSyntaxError,
            InlineDiagnostic::UnusedInlineAnnotation { .. } => DiagnosticKind::UnusedInlineAnnotation,
        }
    }

    pub fn location(&self) -> &Location {
        match self {
            InlineDiagnostic::NonConstantClassName { location, .. }
            | InlineDiagnostic::NonConstantModuleName { location, .. }
            | InlineDiagnostic::NonConstantSuperClassName { location, .. }
            | InlineDiagnostic::TopLevelMethodDefinition { location, .. }
            | InlineDiagnostic::NotImplementedYet { location, .. }
            | InlineDiagnostic::AnnotationSyntaxError { location, .. }
            | InlineDiagnostic::UnusedInlineAnnotation { location, .. } => location,
        }
    }

    /// `file:line:col: message`
    pub fn headline(&self) -> String {
        let location = self.location();
        format!(
            "{}:{}:{}: {}",
            location.name(),
            location.start_line(),
            location.start_column(),
            self
        )
    }
}
