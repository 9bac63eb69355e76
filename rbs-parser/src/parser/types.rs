// Type parsing module
// Handles types, method types, parameters, blocks and type parameters

use std::collections::HashMap;

use lazy_static::lazy_static;
use pest::iterators::Pair;

use crate::ast::*;
use crate::error::*;
use crate::location::Location;
use crate::parser::{RbsParser, Rule, Source};

lazy_static! {
    /// Keyword spelling of every base type
    static ref BASE_TYPES: HashMap<&'static str, BaseType> = {
        let mut table = HashMap::new();
        table.insert("bool", BaseType::Bool);
        table.insert("boolish", BaseType::Boolish);
        table.insert("void", BaseType::Void);
        table.insert("untyped", BaseType::Untyped);
        table.insert("nil", BaseType::Nil);
        table.insert("top", BaseType::Top);
        table.insert("bot", BaseType::Bottom);
        table.insert("self", BaseType::SelfType);
        table.insert("instance", BaseType::Instance);
        table.insert("class", BaseType::Class);
        table
    };
}

/// Parameters, block and return type shared by method and proc types
struct FunctionParts {
    function: Function,
    block: Option<Block>,
}

impl RbsParser {
    /// Parse any rule of the type hierarchy
    pub(crate) fn parse_type_expr(source: &Source, pair: Pair<Rule>) -> ParseResult<Type> {
        let span = source.span(&pair);

        match pair.as_rule() {
            Rule::type_expr | Rule::paren_type => {
                let inner = Self::first_inner(pair, "type", span)?;
                Self::parse_type_expr(source, inner)
            }
            Rule::union_type | Rule::intersection_type => {
                let rule = pair.as_rule();
                let mut types = pair
                    .into_inner()
                    .map(|inner| Self::parse_type_expr(source, inner))
                    .collect::<ParseResult<Vec<_>>>()?;

                if types.len() == 1 {
                    return types.pop().ok_or_else(|| ParseError::missing_element("type", span));
                }
                if rule == Rule::union_type {
                    Ok(Type::Union(types))
                } else {
                    Ok(Type::Intersection(types))
                }
            }
            Rule::optional_type => {
                let mut inner = pair.into_inner();
                let primary = inner
                    .next()
                    .ok_or_else(|| ParseError::missing_element("type", span))?;
                let mut ty = Self::parse_type_expr(source, primary)?;

                // Each trailing `?` wraps once more
                for mark in inner {
                    if mark.as_rule() == Rule::optional_mark {
                        ty = Type::Optional(Box::new(ty));
                    }
                }
                Ok(ty)
            }
            Rule::tuple_type => {
                let types = pair
                    .into_inner()
                    .map(|inner| Self::parse_type_expr(source, inner))
                    .collect::<ParseResult<Vec<_>>>()?;
                Ok(Type::Tuple(types))
            }
            Rule::proc_type => {
                let parts = Self::parse_function_parts(source, pair)?;
                Ok(Type::Proc {
                    function: Box::new(parts.function),
                    block: parts.block.map(Box::new),
                })
            }
            Rule::class_type | Rule::interface_type | Rule::alias_type => {
                let rule = pair.as_rule();
                let (name, args) = Self::parse_name_with_args(source, pair)?;

                Ok(match rule {
                    Rule::interface_type => Type::Interface { name, args },
                    Rule::alias_type => Type::Alias { name, args },
                    _ if args.is_empty()
                        && name.is_simple()
                        && source.variables().contains(&name.name) =>
                    {
                        Type::Variable(name.name)
                    }
                    _ => Type::ClassInstance { name, args },
                })
            }
            Rule::base_type => BASE_TYPES
                .get(pair.as_str())
                .map(|base| Type::Base(*base))
                .ok_or_else(|| ParseError::unexpected_rule("base type keyword", pair.as_rule(), span)),
            Rule::symbol_literal => {
                let symbol = pair.as_str().trim_start_matches(':');
                Ok(Type::Literal(Literal::Symbol(symbol.to_string())))
            }
            Rule::string_literal => {
                let text = pair.as_str();
                let unquoted = text.get(1..text.len().saturating_sub(1)).unwrap_or_default();
                Ok(Type::Literal(Literal::String(unquoted.to_string())))
            }
            Rule::integer_literal => {
                let digits = pair.as_str().replace('_', "");
                digits
                    .parse::<i64>()
                    .map(|value| Type::Literal(Literal::Integer(value)))
                    .map_err(|_| ParseError::InvalidInteger {
                        span,
                        found: pair.as_str().to_string(),
                    })
            }
            Rule::boolean_literal => Ok(Type::Literal(Literal::Bool(pair.as_str() == "true"))),
            _ => Err(ParseError::unexpected_rule("type", pair.as_rule(), span)),
        }
    }

    /// Parse `Name[Args]` of class, interface, alias, mixin and self types
    pub(crate) fn parse_name_with_args(
        source: &Source,
        pair: Pair<Rule>,
    ) -> ParseResult<(TypeName, Vec<Type>)> {
        let span = source.span(&pair);
        let mut inner = pair.into_inner();
        let name_pair = inner
            .next()
            .ok_or_else(|| ParseError::missing_element("type name", span))?;
        let name = TypeName::parse(name_pair.as_str());

        let args = match inner.next() {
            Some(args_pair) if args_pair.as_rule() == Rule::type_args => {
                Self::parse_type_args(source, args_pair)?
            }
            _ => Vec::new(),
        };

        Ok((name, args))
    }

    pub(crate) fn parse_type_args(source: &Source, pair: Pair<Rule>) -> ParseResult<Vec<Type>> {
        pair.into_inner()
            .map(|inner| Self::parse_type_expr(source, inner))
            .collect()
    }

    /// Parse a method type, bringing its own type parameters into scope
    pub(crate) fn parse_method_type(source: &Source, pair: Pair<Rule>) -> ParseResult<MethodType> {
        let location = source.location(&pair)?;

        let type_params = match pair.clone().into_inner().next() {
            Some(first) if first.as_rule() == Rule::type_params => Self::parse_type_param_list(source, first)?,
            _ => Vec::new(),
        };
        let scoped = source.with_variables(&type_param_names(&type_params));
        let parts = Self::parse_function_parts(&scoped, pair)?;

        Ok(MethodType {
            type_params,
            function: parts.function,
            block: parts.block,
            location: Some(location),
        })
    }

    fn parse_function_parts(source: &Source, pair: Pair<Rule>) -> ParseResult<FunctionParts> {
        let span = source.span(&pair);
        let mut params = None;
        let mut untyped = false;
        let mut block = None;
        let mut return_type = None;

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::type_params | Rule::optional_mark | Rule::arrow => {}
                Rule::untyped_params => untyped = true,
                Rule::params => params = Some(Self::parse_params(source, inner)?),
                Rule::block => block = Some(Self::parse_block(source, inner)?),
                Rule::optional_type => return_type = Some(Self::parse_type_expr(source, inner)?),
                other => return Err(ParseError::unexpected_rule("function part", other, source.span(&inner))),
            }
        }

        let return_type = return_type.ok_or_else(|| ParseError::missing_element("return type", span))?;
        let function = if untyped {
            Function::Untyped { return_type }
        } else {
            Function::Typed {
                params: params.unwrap_or_default(),
                return_type,
            }
        };

        Ok(FunctionParts { function, block })
    }

    fn parse_block(source: &Source, pair: Pair<Rule>) -> ParseResult<Block> {
        let required = !pair
            .clone()
            .into_inner()
            .any(|inner| inner.as_rule() == Rule::optional_mark);

        let parts = Self::parse_function_parts(source, pair)?;
        Ok(Block {
            function: parts.function,
            required,
        })
    }

    /// Parse a parenthesized parameter list, enforcing parameter order
    fn parse_params(source: &Source, pair: Pair<Rule>) -> ParseResult<Params> {
        let mut params = Params::default();
        let mut seen_optional = false;
        let mut seen_keywords = false;

        for param in pair.into_inner() {
            let span = source.span(&param);
            let rule = param.as_rule();

            match rule {
                Rule::required_param => {
                    if seen_keywords {
                        return Err(ParseError::ParameterOrder { span });
                    }
                    let parsed = Self::parse_positional(source, param)?;
                    if seen_optional || params.rest_positionals.is_some() {
                        params.trailing_positionals.push(parsed);
                    } else {
                        params.required_positionals.push(parsed);
                    }
                }
                Rule::optional_param => {
                    if seen_keywords
                        || params.rest_positionals.is_some()
                        || !params.trailing_positionals.is_empty()
                    {
                        return Err(ParseError::ParameterOrder { span });
                    }
                    seen_optional = true;
                    params.optional_positionals.push(Self::parse_positional(source, param)?);
                }
                Rule::rest_param => {
                    if seen_keywords || params.rest_positionals.is_some() {
                        return Err(ParseError::ParameterOrder { span });
                    }
                    params.rest_positionals = Some(Self::parse_positional(source, param)?);
                }
                Rule::keyword_param => {
                    if params.rest_keywords.is_some() {
                        return Err(ParseError::ParameterOrder { span });
                    }
                    seen_keywords = true;
                    let (optional, name, parsed) = Self::parse_keyword(source, param)?;
                    if params.required_keywords.contains_key(&name)
                        || params.optional_keywords.contains_key(&name)
                    {
                        return Err(ParseError::DuplicatedKeyword { span, name });
                    }
                    if optional {
                        params.optional_keywords.insert(name, parsed);
                    } else {
                        params.required_keywords.insert(name, parsed);
                    }
                }
                Rule::rest_keywords_param => {
                    if params.rest_keywords.is_some() {
                        return Err(ParseError::ParameterOrder { span });
                    }
                    seen_keywords = true;
                    params.rest_keywords = Some(Self::parse_positional(source, param)?);
                }
                other => return Err(ParseError::unexpected_rule("parameter", other, span)),
            }
        }

        Ok(params)
    }

    /// Parse `Type name?` of a positional or rest parameter
    fn parse_positional(source: &Source, pair: Pair<Rule>) -> ParseResult<FunctionParam> {
        let span = source.span(&pair);
        let mut inner = pair.into_inner();
        let type_pair = Self::expect_rule(&mut inner, Rule::type_expr, span)?;
        let ty = Self::parse_type_expr(source, type_pair)?;

        Ok(match inner.next() {
            Some(name) if name.as_rule() == Rule::var_name => FunctionParam::named(ty, name.as_str()),
            _ => FunctionParam::new(ty),
        })
    }

    fn parse_keyword(source: &Source, pair: Pair<Rule>) -> ParseResult<(bool, String, FunctionParam)> {
        let span = source.span(&pair);
        let mut optional = false;
        let mut name = None;
        let mut ty = None;
        let mut var_name = None;

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::optional_mark => optional = true,
                Rule::keyword_name => name = Some(inner.as_str().to_string()),
                Rule::type_expr => ty = Some(Self::parse_type_expr(source, inner)?),
                Rule::var_name => var_name = Some(inner.as_str().to_string()),
                other => return Err(ParseError::unexpected_rule("keyword parameter", other, span)),
            }
        }

        let name = name.ok_or_else(|| ParseError::missing_element("keyword name", span))?;
        let ty = ty.ok_or_else(|| ParseError::missing_element("keyword type", span))?;
        Ok((optional, name, FunctionParam { ty, name: var_name }))
    }

    /// Parse `[T, out U < Bound]`
    pub(crate) fn parse_type_param_list(source: &Source, pair: Pair<Rule>) -> ParseResult<Vec<TypeParam>> {
        pair.into_inner()
            .filter(|inner| inner.as_rule() == Rule::type_param)
            .map(|inner| Self::parse_type_param(source, inner))
            .collect()
    }

    pub(crate) fn parse_type_param(source: &Source, pair: Pair<Rule>) -> ParseResult<TypeParam> {
        let span = source.span(&pair);
        let mut location: Location<TypeParamKey, TypeParamOptionalKey> =
            source.keyed_location(&pair)?;
        let mut param = TypeParam::new("");
        let mut name_range = None;
        let mut variance_range = None;
        let mut unchecked_range = None;
        let mut bound_range = None;
        let mut default_range = None;

        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::unchecked => {
                    param.unchecked = true;
                    unchecked_range = Some(source.range(&inner));
                }
                Rule::variance => {
                    param.variance = match inner.as_str() {
                        "in" => Variance::Contravariant,
                        _ => Variance::Covariant,
                    };
                    variance_range = Some(source.range(&inner));
                }
                Rule::upper_ident => {
                    param.name = inner.as_str().to_string();
                    name_range = Some(source.range(&inner));
                }
                Rule::upper_bound => {
                    bound_range = Some(source.range(&inner));
                    let bound = Self::first_inner(inner, "upper bound", span)?;
                    param.upper_bound = Some(Self::parse_type_expr(source, bound)?);
                }
                Rule::default_type => {
                    default_range = Some(source.range(&inner));
                    let default = Self::first_inner(inner, "default type", span)?;
                    param.default_type = Some(Self::parse_type_expr(source, default)?);
                }
                other => return Err(ParseError::unexpected_rule("type parameter", other, span)),
            }
        }

        let name_range = name_range.ok_or_else(|| ParseError::missing_element("type parameter name", span))?;
        location.add_required_child(TypeParamKey::Name, name_range)?;
        location.add_optional_child(TypeParamOptionalKey::Variance, variance_range)?;
        location.add_optional_child(TypeParamOptionalKey::Unchecked, unchecked_range)?;
        location.add_optional_child(TypeParamOptionalKey::UpperBound, bound_range)?;
        location.add_optional_child(TypeParamOptionalKey::Default, default_range)?;
        param.location = Some(location);

        Ok(param)
    }
}
