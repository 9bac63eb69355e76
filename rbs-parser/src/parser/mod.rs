// RBS Parser
// Pest-based parser for signature declarations and annotation payloads

use std::ops::Range;
use std::sync::Arc;

use miette::SourceSpan;
use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;

use crate::ast::*;
use crate::error::*;
use crate::location::{Buffer, Location};

mod declarations;
mod types;

#[derive(Parser)]
#[grammar = "rbs.pest"]
pub struct RbsParser;

/// Text being parsed: a range of a buffer plus the type variables in scope
#[derive(Clone)]
pub(crate) struct Source<'a> {
    buffer: &'a Arc<Buffer>,
    /// Byte offset of the parsed text in the buffer content
    base: usize,
    text_len: usize,
    variables: Vec<String>,
}

impl<'a> Source<'a> {
    fn new(buffer: &'a Arc<Buffer>, range: &Range<usize>, variables: &[String]) -> ParseResult<(Self, &'a str)> {
        let text = buffer.slice(range.start, range.end)?;
        let base = buffer.char_to_byte(range.start)?;
        let source = Self {
            buffer,
            base,
            text_len: text.len(),
            variables: variables.to_vec(),
        };
        Ok((source, text))
    }

    /// Same text with additional type variables in scope
    pub(crate) fn with_variables(&self, names: &[String]) -> Self {
        let mut scoped = self.clone();
        scoped.variables.extend(names.iter().cloned());
        scoped
    }

    pub(crate) fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Character range of a pair in the buffer.
    ///
    /// Non-atomic rules end after the implicit whitespace that follows their
    /// last token; that whitespace is not part of the range.
    pub(crate) fn range(&self, pair: &Pair<Rule>) -> Range<usize> {
        let span = pair.as_span();
        let end = span.start() + pair.as_str().trim_end().len();
        self.char_pos(span.start())..self.char_pos(end)
    }

    pub(crate) fn char_pos(&self, byte: usize) -> usize {
        self.buffer.byte_to_char(self.base + byte.min(self.text_len))
    }

    pub(crate) fn location(&self, pair: &Pair<Rule>) -> ParseResult<Location> {
        Ok(Location::new(Arc::clone(self.buffer), self.range(pair))?)
    }

    pub(crate) fn location_at(&self, range: Range<usize>) -> ParseResult<Location> {
        Ok(Location::new(Arc::clone(self.buffer), range)?)
    }

    pub(crate) fn keyed_location<R, O>(&self, pair: &Pair<Rule>) -> ParseResult<Location<R, O>>
    where
        R: crate::location::ChildKey,
        O: crate::location::ChildKey,
    {
        Ok(Location::new(Arc::clone(self.buffer), self.range(pair))?)
    }

    pub(crate) fn span(&self, pair: &Pair<Rule>) -> SourceSpan {
        self.location(pair)
            .map(|location| location.source_span())
            .unwrap_or_else(|_| SourceSpan::new(0.into(), 0))
    }

    /// Byte offset in the top buffer for a byte offset of the parsed text
    fn top_byte(&self, byte: usize) -> usize {
        let top = self.buffer.top();
        self.buffer
            .absolute_position(self.char_pos(byte))
            .and_then(|absolute| top.char_to_byte(absolute))
            .unwrap_or(0)
    }
}

impl RbsParser {
    /// Parse a signature document of class and module declarations
    pub fn parse_signature(buffer: &Arc<Buffer>) -> ParseResult<Vec<Declaration>> {
        let (source, text) = Source::new(buffer, &(0..buffer.len()), &[])?;
        let document = Self::parse_rule(Rule::signature, &source, text)?;

        let mut declarations = Vec::new();
        for pair in document.into_inner() {
            match pair.as_rule() {
                Rule::class_decl => {
                    declarations.push(Declaration::Class(Self::parse_class_decl(&source, pair)?))
                }
                Rule::module_decl => {
                    declarations.push(Declaration::Module(Self::parse_module_decl(&source, pair)?))
                }
                Rule::EOI => {}
                _ => {
                    return Err(ParseError::unexpected_rule(
                        "class or module declaration",
                        pair.as_rule(),
                        source.span(&pair),
                    ))
                }
            }
        }

        Ok(declarations)
    }

    /// Parse a single type from `range` of `buffer`
    pub fn parse_type(
        buffer: &Arc<Buffer>,
        range: Range<usize>,
        variables: &[String],
    ) -> ParseResult<Type> {
        let (source, text) = Source::new(buffer, &range, variables)?;
        let annotation = Self::parse_rule(Rule::type_annotation, &source, text)?;
        let span = source.span(&annotation);
        let type_pair = Self::first_inner(annotation, "type", span)?;
        Self::parse_type_expr(&source, type_pair)
    }

    /// Parse one or more method types separated by `|`
    pub fn parse_method_types(
        buffer: &Arc<Buffer>,
        range: Range<usize>,
        variables: &[String],
    ) -> ParseResult<Vec<MethodType>> {
        let (source, text) = Source::new(buffer, &range, variables)?;
        let annotation = Self::parse_rule(Rule::method_types_annotation, &source, text)?;

        annotation
            .into_inner()
            .filter(|pair| pair.as_rule() == Rule::method_type)
            .map(|pair| Self::parse_method_type(&source, pair))
            .collect()
    }

    /// Parse a comma separated type parameter list without brackets
    pub fn parse_type_params(
        buffer: &Arc<Buffer>,
        range: Range<usize>,
        variables: &[String],
    ) -> ParseResult<Vec<TypeParam>> {
        let (source, text) = Source::new(buffer, &range, variables)?;
        let annotation = Self::parse_rule(Rule::type_params_annotation, &source, text)?;

        annotation
            .into_inner()
            .filter(|pair| pair.as_rule() == Rule::type_param)
            .map(|pair| Self::parse_type_param(&source, pair))
            .collect()
    }

    fn parse_rule<'i>(rule: Rule, source: &Source, text: &'i str) -> ParseResult<Pair<'i, Rule>> {
        let mut pairs = <Self as Parser<Rule>>::parse(rule, text).map_err(|error| {
            ParseError::from_pest_error(error, source.buffer.named_source(), |byte| {
                source.top_byte(byte)
            })
        })?;

        let whole = SourceSpan::new(source.top_byte(0).into(), 0);
        pairs
            .next()
            .ok_or_else(|| ParseError::missing_element(format!("{rule:?}"), whole))
    }

    /// First inner pair, or a missing element error
    pub(crate) fn first_inner<'i>(
        pair: Pair<'i, Rule>,
        expected: &str,
        span: SourceSpan,
    ) -> ParseResult<Pair<'i, Rule>> {
        pair.into_inner()
            .next()
            .ok_or_else(|| ParseError::missing_element(expected, span))
    }

    /// Next pair of `pairs` that matches `rule`
    pub(crate) fn expect_rule<'i>(
        pairs: &mut Pairs<'i, Rule>,
        rule: Rule,
        span: SourceSpan,
    ) -> ParseResult<Pair<'i, Rule>> {
        pairs
            .find(|pair| pair.as_rule() == rule)
            .ok_or_else(|| ParseError::missing_element(format!("{rule:?}"), span))
    }
}
