//! Annotation comments
//!
//! Recognized forms:
//!
//! - `#: (A) -> B` method type, one per overload, continued by `#|` lines
//! - `# @rbs (A) -> B | (C) -> D` all overloads at once
//! - `# @rbs return: T`, `# @rbs name: T`, `# @rbs skip`, `# @rbs override`
//! - `# @rbs generic out T < Bound` on classes and modules
//! - trailing `#: T` assertion after a single-line definition
//!
//! Every payload is re-parsed from a child buffer of the Ruby file, so the
//! locations inside parsed types still point into the original file.

use std::ops::Range;
use std::sync::Arc;

use rbs_parser::{Buffer, Comment, Location, MethodType, RbsParser, Type, TypeParam};

use crate::comments::CommentLine;
use crate::diagnostics::InlineDiagnostic;
use crate::error::{ExtractResult, InlineError};

/// A type written in an annotation, with the location of its payload
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAnnotation {
    pub ty: Type,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    Return(TypeAnnotation),
    Param {
        name: String,
        annotation: TypeAnnotation,
    },
    Skip(Location),
    Override(Location),
    Generic {
        param: TypeParam,
        location: Location,
    },
    /// `# @rbs` followed by a method type list
    Overloads {
        method_types: Vec<MethodType>,
        location: Location,
    },
    /// `#:` method type, possibly continued over several lines
    ColonMethodType {
        method_types: Vec<MethodType>,
        location: Location,
    },
}

impl Annotation {
    pub fn location(&self) -> &Location {
        match self {
            Annotation::Return(annotation) | Annotation::Param { annotation, .. } => {
                &annotation.location
            }
            Annotation::Skip(location)
            | Annotation::Override(location)
            | Annotation::Generic { location, .. }
            | Annotation::Overloads { location, .. }
            | Annotation::ColonMethodType { location, .. } => location,
        }
    }
}

/// Everything found in the comment block above a definition
#[derive(Debug, Clone, Default)]
pub struct LeadingBlock {
    pub annotations: Vec<Annotation>,
    /// Plain documentation lines
    pub doc: Option<Comment>,
    pub diagnostics: Vec<InlineDiagnostic>,
}

impl LeadingBlock {
    pub fn is_skipped(&self) -> bool {
        self.annotations
            .iter()
            .any(|annotation| matches!(annotation, Annotation::Skip(_)))
    }

    pub fn is_override(&self) -> bool {
        self.annotations
            .iter()
            .any(|annotation| matches!(annotation, Annotation::Override(_)))
    }
}

#[derive(Debug, Clone)]
pub enum TrailingAnnotation {
    Absent,
    Assertion(TypeAnnotation),
    Invalid(InlineDiagnostic),
}

/// Build the single return annotation of a definition.
///
/// Precedence between leading and trailing annotations is decided by the
/// caller; receiving both is an internal error.
pub fn combine(
    leading: Option<TypeAnnotation>,
    trailing: Option<TypeAnnotation>,
) -> ExtractResult<Option<TypeAnnotation>> {
    match (leading, trailing) {
        (Some(_), Some(_)) => Err(InlineError::ConflictingAnnotations {
            annotation: "return",
        }),
        (leading, trailing) => Ok(leading.or(trailing)),
    }
}

enum LineKind {
    Colon(Range<usize>),
    Continuation(Range<usize>),
    Directive(Range<usize>),
    Doc(String),
}

pub struct AnnotationParser<'a> {
    buffer: &'a Arc<Buffer>,
    variables: &'a [String],
}

impl<'a> AnnotationParser<'a> {
    /// `variables` are the type parameters in scope, such as a class's generics
    pub fn new(buffer: &'a Arc<Buffer>, variables: &'a [String]) -> Self {
        Self { buffer, variables }
    }

    pub fn leading(&self, comments: &[&CommentLine]) -> ExtractResult<LeadingBlock> {
        let mut block = LeadingBlock::default();
        let mut colon: Option<Vec<Range<usize>>> = None;
        let mut doc_lines: Vec<String> = Vec::new();
        let mut doc_range: Option<Range<usize>> = None;

        for comment in comments {
            let kind = self.classify(comment);
            if !matches!(kind, LineKind::Continuation(_)) {
                if let Some(ranges) = colon.take() {
                    self.colon_method_type(ranges, &mut block)?;
                }
            }

            match kind {
                LineKind::Colon(range) => colon = Some(vec![range]),
                LineKind::Continuation(range) => match colon.as_mut() {
                    Some(ranges) => ranges.push(range),
                    None => block.diagnostics.push(InlineDiagnostic::unused_inline_annotation(
                        "`#|` continues no `#:` annotation",
                        self.location(range)?,
                    )),
                },
                LineKind::Directive(range) => self.directive(range, &mut block)?,
                LineKind::Doc(line) => {
                    let range = self.comment_range(comment);
                    doc_range = Some(match doc_range {
                        Some(existing) => existing.start..range.end,
                        None => range,
                    });
                    doc_lines.push(line);
                }
            }
        }

        if let Some(ranges) = colon.take() {
            self.colon_method_type(ranges, &mut block)?;
        }

        if let Some(range) = doc_range {
            block.doc = Some(Comment {
                string: doc_lines.join("\n").trim_end().to_string(),
                location: self.location(range)?,
            });
        }

        Ok(block)
    }

    /// Trailing `#: T` after a single-line definition
    pub fn trailing(&self, comment: &CommentLine) -> ExtractResult<TrailingAnnotation> {
        let LineKind::Colon(range) = self.classify(comment) else {
            return Ok(TrailingAnnotation::Absent);
        };
        match self.parse_type(range)? {
            Ok(annotation) => Ok(TrailingAnnotation::Assertion(annotation)),
            Err(diagnostic) => Ok(TrailingAnnotation::Invalid(diagnostic)),
        }
    }

    fn classify(&self, comment: &CommentLine) -> LineKind {
        let text = comment.text(self.buffer.content());
        let start = self.buffer.byte_to_char(comment.bytes.start);
        let end = self.buffer.byte_to_char(comment.bytes.end);
        let body = text.strip_prefix('#').unwrap_or(text);

        if body.starts_with(':') {
            return LineKind::Colon(start + 2..end);
        }
        if body.starts_with('|') {
            // The `|` stays in the payload and separates the overloads
            return LineKind::Continuation(start + 1..end);
        }

        let trimmed = body.trim_start();
        if let Some(rest) = trimmed.strip_prefix("@rbs") {
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                let skipped = body.chars().count() - trimmed.chars().count();
                return LineKind::Directive(start + 1 + skipped + 4..end);
            }
        }

        LineKind::Doc(body.strip_prefix(' ').unwrap_or(body).trim_end().to_string())
    }

    fn directive(&self, range: Range<usize>, block: &mut LeadingBlock) -> ExtractResult<()> {
        let (range, payload) = self.trim(range)?;

        if payload == "skip" {
            block.annotations.push(Annotation::Skip(self.location(range)?));
            return Ok(());
        }
        if payload == "override" {
            block.annotations.push(Annotation::Override(self.location(range)?));
            return Ok(());
        }

        if let Some(rest) = payload.strip_prefix("generic") {
            if rest.starts_with(char::is_whitespace) {
                let params_range = range.start + "generic".len()..range.end;
                return self.generic(params_range, block);
            }
        }

        if let Some(offset) = keyword_prefix(&payload) {
            let name = payload[..offset - 1].trim_end();
            let type_range = strip_description(&payload, range.start + offset..range.end);
            let annotation = match self.parse_type(type_range)? {
                Ok(annotation) => annotation,
                Err(diagnostic) => {
                    block.diagnostics.push(diagnostic);
                    return Ok(());
                }
            };
            block.annotations.push(if name == "return" {
                Annotation::Return(annotation)
            } else {
                Annotation::Param {
                    name: name.trim_start_matches(['*', '&']).to_string(),
                    annotation,
                }
            });
            return Ok(());
        }

        if payload.starts_with(['(', '[', '{', '?', '-', '^']) {
            let buffer = Buffer::child(self.buffer, vec![range.clone()])?;
            match RbsParser::parse_method_types(&buffer, 0..buffer.len(), self.variables) {
                Ok(method_types) => block.annotations.push(Annotation::Overloads {
                    method_types,
                    location: self.location(range)?,
                }),
                Err(error) => block.diagnostics.push(InlineDiagnostic::annotation_syntax_error(
                    &error,
                    self.location(range)?,
                )),
            }
            return Ok(());
        }

        let location = self.location(range)?;
        block.diagnostics.push(InlineDiagnostic::AnnotationSyntaxError {
            message: format!("unknown `@rbs` annotation `{payload}`"),
            span: location.source_span(),
            location,
        });
        Ok(())
    }

    fn generic(&self, range: Range<usize>, block: &mut LeadingBlock) -> ExtractResult<()> {
        let buffer = Buffer::child(self.buffer, vec![range.clone()])?;
        match RbsParser::parse_type_params(&buffer, 0..buffer.len(), &[]) {
            Ok(params) => {
                let location = self.location(range)?;
                block
                    .annotations
                    .extend(params.into_iter().map(|param| Annotation::Generic {
                        param,
                        location: location.clone(),
                    }));
            }
            Err(error) => block.diagnostics.push(InlineDiagnostic::annotation_syntax_error(
                &error,
                self.location(range)?,
            )),
        }
        Ok(())
    }

    fn colon_method_type(&self, ranges: Vec<Range<usize>>, block: &mut LeadingBlock) -> ExtractResult<()> {
        let covering = match (ranges.first(), ranges.last()) {
            (Some(first), Some(last)) => first.start..last.end,
            _ => return Ok(()),
        };
        let buffer = Buffer::child(self.buffer, ranges)?;

        match RbsParser::parse_method_types(&buffer, 0..buffer.len(), self.variables) {
            Ok(method_types) => block.annotations.push(Annotation::ColonMethodType {
                method_types,
                location: self.location(covering)?,
            }),
            Err(error) => block.diagnostics.push(InlineDiagnostic::annotation_syntax_error(
                &error,
                self.location(covering)?,
            )),
        }
        Ok(())
    }

    fn parse_type(&self, range: Range<usize>) -> ExtractResult<Result<TypeAnnotation, InlineDiagnostic>> {
        let (range, _) = self.trim(range)?;
        let location = self.location(range.clone())?;
        let buffer = Buffer::child(self.buffer, vec![range])?;

        Ok(
            match RbsParser::parse_type(&buffer, 0..buffer.len(), self.variables) {
                Ok(ty) => Ok(TypeAnnotation { ty, location }),
                Err(error) => Err(InlineDiagnostic::annotation_syntax_error(&error, location)),
            },
        )
    }

    /// Narrow `range` to its non-blank text
    fn trim(&self, range: Range<usize>) -> ExtractResult<(Range<usize>, String)> {
        let text = self.buffer.slice(range.start, range.end)?;
        let leading = text.chars().take_while(|c| c.is_whitespace()).count();
        let trimmed = text.trim();
        let start = range.start + leading;
        Ok((start..start + trimmed.chars().count(), trimmed.to_string()))
    }

    fn comment_range(&self, comment: &CommentLine) -> Range<usize> {
        self.buffer.byte_to_char(comment.bytes.start)..self.buffer.byte_to_char(comment.bytes.end)
    }

    fn location(&self, range: Range<usize>) -> ExtractResult<Location> {
        Ok(Location::new(self.buffer.clone(), range)?)
    }
}

/// Character offset just past the `:` of `name:`, `*rest:`, `&block:` or `return:`
fn keyword_prefix(payload: &str) -> Option<usize> {
    let sigils = payload.chars().take_while(|c| matches!(c, '*' | '&')).count();
    let rest = &payload[sigils..];

    let mut chars = rest.chars();
    let first = chars.next()?;
    if !(first.is_ascii_lowercase() || first == '_') {
        return None;
    }
    let ident = 1 + chars
        .clone()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .count();
    let after = &rest[ident..];
    let spaces = after.chars().take_while(|c| *c == ' ').count();

    after[spaces..]
        .starts_with(':')
        .then_some(sigils + ident + spaces + 1)
}

/// Drop a ` -- description` suffix from a type payload
fn strip_description(payload: &str, range: Range<usize>) -> Range<usize> {
    let type_offset = payload.chars().count() - (range.end - range.start);
    let type_text: String = payload.chars().skip(type_offset).collect();
    match type_text.find(" -- ") {
        Some(byte) => range.start..range.start + type_text[..byte].chars().count(),
        None => range,
    }
}
