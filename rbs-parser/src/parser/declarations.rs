// Declaration parsing module
// Handles class and module declarations and their members

use std::ops::Range;

use pest::iterators::Pair;

use crate::ast::*;
use crate::error::*;
use crate::location::Location;
use crate::parser::{RbsParser, Rule, Source};

impl RbsParser {
    pub(crate) fn parse_class_decl(source: &Source, pair: Pair<Rule>) -> ParseResult<ClassDecl> {
        let span = source.span(&pair);
        let mut location: Location<ClassKey, ClassOptionalKey> = source.keyed_location(&pair)?;
        let mut inner = pair.into_inner();

        let keyword = Self::expect_rule(&mut inner, Rule::kw_class, span)?;
        location.add_required_child(ClassKey::Keyword, source.range(&keyword))?;

        let name_pair = Self::expect_rule(&mut inner, Rule::class_name, span)?;
        location.add_required_child(ClassKey::Name, source.range(&name_pair))?;
        let name = TypeName::parse(name_pair.as_str());

        let mut type_params = Vec::new();
        let mut type_params_range = None;
        let mut super_class = None;
        let mut lt_range = None;
        let mut members = Vec::new();

        for child in inner {
            match child.as_rule() {
                Rule::type_params => {
                    type_params_range = Some(source.range(&child));
                    type_params = Self::parse_type_param_list(source, child)?;
                }
                Rule::super_class => {
                    let scoped = source.with_variables(&type_param_names(&type_params));
                    let (lt, parsed) = Self::parse_super_class(&scoped, child)?;
                    lt_range = Some(lt);
                    super_class = Some(parsed);
                }
                Rule::kw_end => location.add_required_child(ClassKey::End, source.range(&child))?,
                _ => {
                    let scoped = source.with_variables(&type_param_names(&type_params));
                    members.push(Self::parse_member(&scoped, child)?);
                }
            }
        }

        location.add_optional_child(ClassOptionalKey::TypeParams, type_params_range)?;
        location.add_optional_child(ClassOptionalKey::Lt, lt_range)?;

        Ok(ClassDecl {
            name,
            type_params,
            super_class,
            members,
            comment: None,
            location,
        })
    }

    fn parse_super_class(
        source: &Source,
        pair: Pair<Rule>,
    ) -> ParseResult<(Range<usize>, SuperClass)> {
        let span = source.span(&pair);
        let end = source.range(&pair).end;
        let mut inner = pair.into_inner();

        let lt = Self::expect_rule(&mut inner, Rule::super_lt, span)?;
        let name_pair = Self::expect_rule(&mut inner, Rule::class_name, span)?;
        let name_range = source.range(&name_pair);
        let name = TypeName::parse(name_pair.as_str());
        let args = match inner.next() {
            Some(args_pair) => Self::parse_type_args(source, args_pair)?,
            None => Vec::new(),
        };

        let location = source.location_at(name_range.start..end)?;
        Ok((source.range(&lt), SuperClass { name, args, location }))
    }

    pub(crate) fn parse_module_decl(source: &Source, pair: Pair<Rule>) -> ParseResult<ModuleDecl> {
        let span = source.span(&pair);
        let mut location: Location<ModuleKey, ModuleOptionalKey> = source.keyed_location(&pair)?;
        let mut inner = pair.into_inner();

        let keyword = Self::expect_rule(&mut inner, Rule::kw_module, span)?;
        location.add_required_child(ModuleKey::Keyword, source.range(&keyword))?;

        let name_pair = Self::expect_rule(&mut inner, Rule::class_name, span)?;
        location.add_required_child(ModuleKey::Name, source.range(&name_pair))?;
        let name = TypeName::parse(name_pair.as_str());

        let mut type_params = Vec::new();
        let mut type_params_range = None;
        let mut self_types = Vec::new();
        let mut colon_range = None;
        let mut self_types_range: Option<Range<usize>> = None;
        let mut members = Vec::new();

        for child in inner {
            match child.as_rule() {
                Rule::type_params => {
                    type_params_range = Some(source.range(&child));
                    type_params = Self::parse_type_param_list(source, child)?;
                }
                Rule::module_self_types => {
                    let scoped = source.with_variables(&type_param_names(&type_params));
                    for self_pair in child.into_inner() {
                        match self_pair.as_rule() {
                            Rule::self_colon => colon_range = Some(source.range(&self_pair)),
                            Rule::module_self => {
                                let range = source.range(&self_pair);
                                self_types_range = Some(match self_types_range.take() {
                                    Some(previous) => previous.start..range.end,
                                    None => range,
                                });
                                let self_location = source.location(&self_pair)?;
                                let (name, args) = Self::parse_name_with_args(&scoped, self_pair)?;
                                self_types.push(ModuleSelf {
                                    name,
                                    args,
                                    location: self_location,
                                });
                            }
                            other => {
                                return Err(ParseError::unexpected_rule(
                                    "module self type",
                                    other,
                                    source.span(&self_pair),
                                ))
                            }
                        }
                    }
                }
                Rule::kw_end => location.add_required_child(ModuleKey::End, source.range(&child))?,
                _ => {
                    let scoped = source.with_variables(&type_param_names(&type_params));
                    members.push(Self::parse_member(&scoped, child)?);
                }
            }
        }

        location.add_optional_child(ModuleOptionalKey::TypeParams, type_params_range)?;
        location.add_optional_child(ModuleOptionalKey::Colon, colon_range)?;
        location.add_optional_child(ModuleOptionalKey::SelfTypes, self_types_range)?;

        Ok(ModuleDecl {
            name,
            type_params,
            self_types,
            members,
            comment: None,
            location,
        })
    }

    fn parse_member(source: &Source, pair: Pair<Rule>) -> ParseResult<Member> {
        match pair.as_rule() {
            Rule::class_decl => Ok(Member::Class(Self::parse_class_decl(source, pair)?)),
            Rule::module_decl => Ok(Member::Module(Self::parse_module_decl(source, pair)?)),
            Rule::method_member => Ok(Member::MethodDefinition(Self::parse_method_member(source, pair)?)),
            Rule::mixin_member => Ok(Member::Mixin(Self::parse_mixin_member(source, pair)?)),
            Rule::attribute_member => Ok(Member::Attribute(Self::parse_attribute_member(source, pair)?)),
            other => Err(ParseError::unexpected_rule("member", other, source.span(&pair))),
        }
    }

    fn parse_method_member(source: &Source, pair: Pair<Rule>) -> ParseResult<MethodDefinition> {
        let span = source.span(&pair);
        let mut location: Location<MethodKey, MethodOptionalKey> = source.keyed_location(&pair)?;
        let mut name = None;
        let mut kind = MethodKind::Instance;
        let mut kind_range = None;
        let mut visibility = None;
        let mut visibility_range = None;
        let mut overloads = Vec::new();
        let mut overloading = false;
        let mut overloading_range = None;

        for child in pair.into_inner() {
            match child.as_rule() {
                Rule::visibility => {
                    visibility_range = Some(source.range(&child));
                    visibility = Some(match child.as_str() {
                        "private" => Visibility::Private,
                        _ => Visibility::Public,
                    });
                }
                Rule::kw_def => location.add_required_child(MethodKey::Keyword, source.range(&child))?,
                Rule::method_kind => {
                    kind_range = Some(source.range(&child));
                    kind = match child.as_str() {
                        "self?." => MethodKind::SingletonInstance,
                        _ => MethodKind::Singleton,
                    };
                }
                Rule::method_name => {
                    location.add_required_child(MethodKey::Name, source.range(&child))?;
                    name = Some(child.as_str().trim_matches('`').to_string());
                }
                Rule::method_overloads => {
                    for overload in child.into_inner() {
                        match overload.as_rule() {
                            Rule::method_type => overloads.push(Self::parse_method_type(source, overload)?),
                            Rule::overloading => {
                                overloading = true;
                                overloading_range = Some(source.range(&overload));
                            }
                            other => {
                                return Err(ParseError::unexpected_rule(
                                    "method type",
                                    other,
                                    source.span(&overload),
                                ))
                            }
                        }
                    }
                }
                other => return Err(ParseError::unexpected_rule("method definition", other, span)),
            }
        }

        location.add_optional_child(MethodOptionalKey::Kind, kind_range)?;
        location.add_optional_child(MethodOptionalKey::Overloading, overloading_range)?;
        location.add_optional_child(MethodOptionalKey::Visibility, visibility_range)?;

        Ok(MethodDefinition {
            name: name.ok_or_else(|| ParseError::missing_element("method name", span))?,
            kind,
            overloads,
            overloading,
            visibility,
            comment: None,
            location,
        })
    }

    fn parse_mixin_member(source: &Source, pair: Pair<Rule>) -> ParseResult<Mixin> {
        let span = source.span(&pair);
        let mut location: Location<MixinKey, MixinOptionalKey> = source.keyed_location(&pair)?;
        let mut kind = MixinKind::Include;
        let mut name = None;
        let mut args = Vec::new();
        let mut args_range = None;

        for child in pair.into_inner() {
            match child.as_rule() {
                Rule::mixin_kind => {
                    kind = match child.as_str() {
                        "extend" => MixinKind::Extend,
                        "prepend" => MixinKind::Prepend,
                        _ => MixinKind::Include,
                    };
                }
                Rule::class_name | Rule::interface_name => {
                    location.add_required_child(MixinKey::Name, source.range(&child))?;
                    name = Some(TypeName::parse(child.as_str()));
                }
                Rule::type_args => {
                    args_range = Some(source.range(&child));
                    args = Self::parse_type_args(source, child)?;
                }
                other => return Err(ParseError::unexpected_rule("mixin", other, span)),
            }
        }
        location.add_optional_child(MixinOptionalKey::Args, args_range)?;

        Ok(Mixin {
            kind,
            name: name.ok_or_else(|| ParseError::missing_element("module name", span))?,
            args,
            location,
        })
    }

    fn parse_attribute_member(source: &Source, pair: Pair<Rule>) -> ParseResult<Attribute> {
        let span = source.span(&pair);
        let mut location: Location<AttributeKey, AttributeOptionalKey> = source.keyed_location(&pair)?;
        let mut inner = pair.into_inner();

        let keyword = Self::expect_rule(&mut inner, Rule::attribute_kind, span)?;
        location.add_required_child(AttributeKey::Keyword, source.range(&keyword))?;
        let kind = match keyword.as_str() {
            "attr_reader" => AttributeKind::Reader,
            "attr_writer" => AttributeKind::Writer,
            _ => AttributeKind::Accessor,
        };

        let name_pair = Self::expect_rule(&mut inner, Rule::attribute_name, span)?;
        location.add_required_child(AttributeKey::Name, source.range(&name_pair))?;

        let type_pair = Self::expect_rule(&mut inner, Rule::type_expr, span)?;
        location.add_optional_child(AttributeOptionalKey::Type, Some(source.range(&type_pair)))?;
        let ty = Self::parse_type_expr(source, type_pair)?;

        Ok(Attribute {
            kind,
            name: name_pair.as_str().to_string(),
            ty,
            location,
        })
    }
}
