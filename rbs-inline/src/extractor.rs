//! Single-pass extraction of declarations from a Ruby CST
//!
//! The extractor walks the tree once, keeping a stack of the classes and
//! modules it is inside. Classes and modules become declarations, method
//! definitions and a few well-known calls become members of the innermost
//! one. Anything it cannot express is reported as a diagnostic and skipped.

use std::ops::Range;
use std::sync::Arc;

use rbs_environment::ResolverContext;
use rbs_parser::{
    type_param_names, AttributeKey, AttributeKind, AttributeOptionalKey, Attribute, Block,
    Buffer, ClassDecl, ClassKey, ClassOptionalKey, Declaration, Function, FunctionParam, Location,
    Member, MethodDefinition, MethodKey, MethodKind, MethodOptionalKey, MethodType, Mixin,
    MixinKey, MixinKind, MixinOptionalKey, ModuleDecl, ModuleKey, ModuleOptionalKey, Params,
    RbsParser, SuperClass, Type, TypeParam, Visibility,
};
use tracing::{debug, warn};
use tree_sitter::{Node, Tree};

use crate::annotations::{combine, Annotation, AnnotationParser, LeadingBlock, TrailingAnnotation, TypeAnnotation};
use crate::comments::CommentIndex;
use crate::diagnostics::InlineDiagnostic;
use crate::error::{ExtractResult, InlineError};
use crate::node::{char_range, constant_path, literal_name, named_children, text, token_child, RubyNode};
use crate::options::ExtractOptions;
use crate::result::InlineResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NestingState {
    OutsideAnyModule,
    InsideModuleOrClass,
}

/// A class or module being built while its body is visited
#[derive(Debug)]
pub struct DeclarationFrame {
    /// Context the declaration itself appears in
    pub outer_context: ResolverContext,
    pub declaration: Declaration,
    /// Set by a bare `private` or `public` in the body
    pub visibility: Option<Visibility>,
    pub variables: Vec<String>,
    /// Output slot reserved for a declaration with no enclosing declaration
    slot: Option<usize>,
}

#[derive(Debug)]
pub enum ModuleFrame {
    Known(DeclarationFrame),
    /// A class or module whose name is not a constant path
    Unknown,
}

pub struct InlineExtractor<'a> {
    buffer: &'a Arc<Buffer>,
    source: &'a str,
    comments: CommentIndex,
    options: ExtractOptions,
    context: ResolverContext,
    stack: Vec<ModuleFrame>,
    /// Top-level results in the order their declarations start
    declarations: Vec<Option<(ResolverContext, Declaration)>>,
    diagnostics: Vec<InlineDiagnostic>,
}

impl<'a> InlineExtractor<'a> {
    pub fn new(buffer: &'a Arc<Buffer>, comments: CommentIndex, options: ExtractOptions) -> Self {
        Self {
            buffer,
            source: buffer.content(),
            comments,
            options,
            context: ResolverContext::top(),
            stack: Vec::new(),
            declarations: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Extract declarations from `tree`, the tree-sitter-ruby parse of `buffer`
    #[tracing::instrument(skip_all, fields(buffer = buffer.name()))]
    pub fn extract(buffer: &Arc<Buffer>, tree: Tree, options: ExtractOptions) -> ExtractResult<InlineResult> {
        let (declarations, diagnostics) = {
            let root = tree.root_node();
            let comments = CommentIndex::collect(root, buffer.content());
            let mut extractor = InlineExtractor::new(buffer, comments, options);
            extractor.visit_children(root)?;
            let declarations: Vec<_> = extractor.declarations.into_iter().flatten().collect();
            (declarations, extractor.diagnostics)
        };

        debug!(
            declarations = declarations.len(),
            diagnostics = diagnostics.len(),
            "Extraction finished"
        );

        Ok(InlineResult {
            buffer: buffer.clone(),
            tree,
            declarations,
            diagnostics,
        })
    }

    pub fn state(&self) -> NestingState {
        if self.stack.is_empty() {
            NestingState::OutsideAnyModule
        } else {
            NestingState::InsideModuleOrClass
        }
    }

    pub fn context(&self) -> &ResolverContext {
        &self.context
    }

    /// Push `frame` with `context`, visit the body, and pop the frame again.
    ///
    /// The previous context is restored whether or not `visit` fails.
    pub fn push_module_nesting(
        &mut self,
        frame: ModuleFrame,
        context: ResolverContext,
        visit: impl FnOnce(&mut Self) -> ExtractResult<()>,
    ) -> ExtractResult<ModuleFrame> {
        debug!(context = %context, "Entering module");
        let outer = std::mem::replace(&mut self.context, context);
        self.stack.push(frame);

        let result = visit(self);

        let frame = self.stack.pop();
        self.context = outer;
        debug!(context = %self.context, "Leaving module");

        result?;
        frame.ok_or(InlineError::NestingUnderflow)
    }

    fn report(&mut self, diagnostic: InlineDiagnostic) {
        if self
            .options
            .max_diagnostics
            .is_some_and(|max| self.diagnostics.len() >= max)
        {
            debug!(kind = %diagnostic.kind(), "Diagnostic limit reached, dropping");
            return;
        }
        warn!(kind = %diagnostic.kind(), "{}", diagnostic.headline());
        self.diagnostics.push(diagnostic);
    }

    fn visit(&mut self, node: Node<'_>) -> ExtractResult<()> {
        match RubyNode::classify(node) {
            RubyNode::Class(node) => self.visit_class(node),
            RubyNode::Module(node) => self.visit_module(node),
            RubyNode::SingletonClass(node) => {
                let location = self.location(node)?;
                self.report(InlineDiagnostic::not_implemented_yet("`class << self`", location));
                Ok(())
            }
            RubyNode::Method(node) => self.visit_method(node, None),
            RubyNode::SingletonMethod(node) => self.visit_method(node, None),
            RubyNode::Call(node) => self.visit_call(node),
            RubyNode::Identifier(node) => {
                self.visit_identifier(node);
                Ok(())
            }
            RubyNode::Other(node) => self.visit_children(node),
        }
    }

    fn visit_children(&mut self, node: Node<'_>) -> ExtractResult<()> {
        for child in named_children(node) {
            self.visit(child)?;
        }
        Ok(())
    }

    /// Body of a class or module: every named child but the header fields
    fn visit_body(&mut self, node: Node<'_>) -> ExtractResult<()> {
        let header: Vec<usize> = ["name", "superclass"]
            .iter()
            .filter_map(|field| node.child_by_field_name(field))
            .map(|child| child.id())
            .collect();

        for child in named_children(node) {
            if !header.contains(&child.id()) {
                self.visit(child)?;
            }
        }
        Ok(())
    }

    fn visit_class(&mut self, node: Node<'_>) -> ExtractResult<()> {
        let Some(name_node) = node.child_by_field_name("name") else {
            return self.visit_children(node);
        };
        let leading = self.leading_block(node, &[])?;
        if leading.is_skipped() {
            return Ok(());
        }

        let Some(name) = constant_path(name_node, self.source) else {
            let location = self.location(name_node)?;
            self.report(InlineDiagnostic::non_constant_class_name(location));
            return self.enter_unknown(node);
        };

        let type_params = self.declaration_type_params(&leading);
        let variables = type_param_names(&type_params);
        let (lt, super_class) = self.super_class(node, &variables)?;

        let mut location = Location::<ClassKey, ClassOptionalKey>::new(self.buffer.clone(), self.range(node))?
            .with_required(ClassKey::Keyword, self.token_range(node, "class"))?
            .with_required(ClassKey::Name, self.range(name_node))?
            .with_required(ClassKey::End, self.end_range(node))?
            .with_optional(ClassOptionalKey::Lt, lt)?;
        location.add_optional_child(ClassOptionalKey::TypeParams, self.generics_range(&leading))?;

        let declaration = Declaration::Class(ClassDecl {
            name,
            type_params,
            super_class,
            members: Vec::new(),
            comment: leading.doc,
            location,
        });
        self.enter_declaration(declaration, node)
    }

    fn visit_module(&mut self, node: Node<'_>) -> ExtractResult<()> {
        let Some(name_node) = node.child_by_field_name("name") else {
            return self.visit_children(node);
        };
        let leading = self.leading_block(node, &[])?;
        if leading.is_skipped() {
            return Ok(());
        }

        let Some(name) = constant_path(name_node, self.source) else {
            let location = self.location(name_node)?;
            self.report(InlineDiagnostic::non_constant_module_name(location));
            return self.enter_unknown(node);
        };

        let type_params = self.declaration_type_params(&leading);
        let location = Location::<ModuleKey, ModuleOptionalKey>::new(self.buffer.clone(), self.range(node))?
            .with_required(ModuleKey::Keyword, self.token_range(node, "module"))?
            .with_required(ModuleKey::Name, self.range(name_node))?
            .with_required(ModuleKey::End, self.end_range(node))?
            .with_optional(ModuleOptionalKey::TypeParams, self.generics_range(&leading))?
            .with_optional(ModuleOptionalKey::Colon, None)?
            .with_optional(ModuleOptionalKey::SelfTypes, None)?;

        let declaration = Declaration::Module(ModuleDecl {
            name,
            type_params,
            self_types: Vec::new(),
            members: Vec::new(),
            comment: leading.doc,
            location,
        });
        self.enter_declaration(declaration, node)
    }

    fn enter_declaration(&mut self, declaration: Declaration, node: Node<'_>) -> ExtractResult<()> {
        let absolute = declaration.name().with_prefix(&self.context.namespace());
        let inner = self.context.push_module(absolute);
        let slot = match self.stack.last() {
            Some(ModuleFrame::Known(_)) => None,
            _ => {
                self.declarations.push(None);
                Some(self.declarations.len() - 1)
            }
        };
        let frame = ModuleFrame::Known(DeclarationFrame {
            outer_context: self.context.clone(),
            variables: type_param_names(declaration.type_params()),
            declaration,
            visibility: None,
            slot,
        });

        let frame = self.push_module_nesting(frame, inner, |this| this.visit_body(node))?;
        if let ModuleFrame::Known(frame) = frame {
            self.finish_declaration(frame);
        }
        Ok(())
    }

    /// Visit the body of a class or module that produces no declaration
    fn enter_unknown(&mut self, node: Node<'_>) -> ExtractResult<()> {
        let inner = self.context.push_unknown();
        self.push_module_nesting(ModuleFrame::Unknown, inner, |this| this.visit_body(node))?;
        Ok(())
    }

    /// Attach a finished declaration to its enclosing declaration, or fill its output slot
    fn finish_declaration(&mut self, frame: DeclarationFrame) {
        match (frame.slot, self.stack.last_mut()) {
            (Some(index), _) => {
                if let Some(slot) = self.declarations.get_mut(index) {
                    *slot = Some((frame.outer_context, frame.declaration));
                }
            }
            (None, Some(ModuleFrame::Known(parent))) => {
                members_mut(&mut parent.declaration).push(Member::from(frame.declaration))
            }
            (None, _) => self.declarations.push(Some((frame.outer_context, frame.declaration))),
        }
    }

    fn current_frame(&mut self) -> Option<&mut DeclarationFrame> {
        match self.stack.last_mut() {
            Some(ModuleFrame::Known(frame)) => Some(frame),
            _ => None,
        }
    }

    fn push_member(&mut self, member: Member) {
        if let Some(frame) = self.current_frame() {
            members_mut(&mut frame.declaration).push(member);
        }
    }

    fn visit_identifier(&mut self, node: Node<'_>) {
        let visibility = match text(node, self.source) {
            "private" => Visibility::Private,
            "public" => Visibility::Public,
            _ => return,
        };
        let in_body = node
            .parent()
            .is_some_and(|parent| matches!(parent.kind(), "body_statement" | "class" | "module"));
        if !in_body {
            return;
        }
        if let Some(frame) = self.current_frame() {
            frame.visibility = Some(visibility);
        }
    }

    fn visit_call(&mut self, node: Node<'_>) -> ExtractResult<()> {
        let receiverless = node.child_by_field_name("receiver").is_none();
        let method = node.child_by_field_name("method").map(|method| text(method, self.source));
        let in_declaration = matches!(self.stack.last(), Some(ModuleFrame::Known(_)));

        match method {
            Some(name) if receiverless && in_declaration => match name {
                "include" => self.visit_mixin(node, MixinKind::Include),
                "extend" => self.visit_mixin(node, MixinKind::Extend),
                "prepend" => self.visit_mixin(node, MixinKind::Prepend),
                "attr_reader" => self.visit_attribute(node, AttributeKind::Reader),
                "attr_writer" => self.visit_attribute(node, AttributeKind::Writer),
                "attr_accessor" => self.visit_attribute(node, AttributeKind::Accessor),
                "private" => self.visit_visibility_call(node, Visibility::Private),
                "public" => self.visit_visibility_call(node, Visibility::Public),
                _ => self.visit_children(node),
            },
            _ => self.visit_children(node),
        }
    }

    /// `private def foo` applies to that definition only
    fn visit_visibility_call(&mut self, node: Node<'_>, visibility: Visibility) -> ExtractResult<()> {
        let keyword = node.child_by_field_name("method");
        let arguments = node
            .child_by_field_name("arguments")
            .map(named_children)
            .unwrap_or_default();

        for argument in arguments {
            match argument.kind() {
                "method" | "singleton_method" => {
                    let explicit = keyword.map(|keyword| (visibility, self.range(keyword)));
                    self.visit_method(argument, explicit)?;
                }
                _ => self.visit(argument)?,
            }
        }
        Ok(())
    }

    fn visit_method(&mut self, node: Node<'_>, explicit: Option<(Visibility, Range<usize>)>) -> ExtractResult<()> {
        let Some(name_node) = node.child_by_field_name("name") else {
            return Ok(());
        };
        let name = text(name_node, self.source).to_string();

        let (variables, default_visibility) = match self.stack.last() {
            None => {
                let location = self.location(node)?;
                self.report(InlineDiagnostic::top_level_method_definition(name, location));
                return Ok(());
            }
            Some(ModuleFrame::Unknown) => {
                debug!(method = %name, "Skipping method inside unknown module");
                return Ok(());
            }
            Some(ModuleFrame::Known(frame)) => (frame.variables.clone(), frame.visibility),
        };

        let kind = if node.kind() == "singleton_method" {
            let object = node.child_by_field_name("object");
            if object.map(|object| text(object, self.source)) != Some("self") {
                let location = self.location(node)?;
                self.report(InlineDiagnostic::not_implemented_yet(
                    "singleton method on an object other than `self`",
                    location,
                ));
                return Ok(());
            }
            MethodKind::Singleton
        } else {
            MethodKind::Instance
        };

        let leading = self.leading_block(node, &variables)?;
        if leading.is_skipped() {
            return Ok(());
        }
        let trailing = self.trailing_assertion(node, &variables)?;
        let overloading = leading.is_override();
        let overloads = self.method_overloads(node, leading.annotations, trailing, overloading)?;

        let kind_range = match kind {
            MethodKind::Instance => None,
            _ => node
                .child_by_field_name("object")
                .map(|object| char_range(self.buffer, object).start..char_range(self.buffer, name_node).start),
        };
        // A bare `private` section only covers instance methods
        let section_visibility = match kind {
            MethodKind::Instance => default_visibility,
            _ => None,
        };
        let visibility = explicit.as_ref().map(|(visibility, _)| *visibility).or(section_visibility);
        let location = Location::<MethodKey, MethodOptionalKey>::new(self.buffer.clone(), self.range(node))?
            .with_required(MethodKey::Keyword, self.token_range(node, "def"))?
            .with_required(MethodKey::Name, self.range(name_node))?
            .with_optional(MethodOptionalKey::Kind, kind_range)?
            .with_optional(MethodOptionalKey::Overloading, None)?
            .with_optional(
                MethodOptionalKey::Visibility,
                explicit.as_ref().map(|(_, range)| range.clone()),
            )?;

        self.push_member(Member::MethodDefinition(MethodDefinition {
            name,
            kind,
            overloads,
            overloading,
            visibility,
            comment: leading.doc,
            location,
        }));
        Ok(())
    }

    /// Decide the overloads of a method from its annotations
    fn method_overloads(
        &mut self,
        node: Node<'_>,
        annotations: Vec<Annotation>,
        trailing: Option<TypeAnnotation>,
        overloading: bool,
    ) -> ExtractResult<Vec<MethodType>> {
        let mut colon_types: Vec<(Vec<MethodType>, Location)> = Vec::new();
        let mut overload_list: Option<(Vec<MethodType>, Location)> = None;
        let mut doc_return: Option<TypeAnnotation> = None;
        let mut params: Vec<(String, TypeAnnotation)> = Vec::new();
        let mut ignored: Vec<(Location, &'static str)> = Vec::new();

        for annotation in annotations {
            match annotation {
                Annotation::ColonMethodType { method_types, location } => {
                    colon_types.push((method_types, location))
                }
                Annotation::Overloads { method_types, location } => {
                    if overload_list.is_some() {
                        ignored.push((location, "only one `@rbs` method type list is used"));
                    } else {
                        overload_list = Some((method_types, location));
                    }
                }
                Annotation::Return(annotation) => {
                    if doc_return.is_some() {
                        ignored.push((annotation.location, "the return type is already annotated"));
                    } else {
                        doc_return = Some(annotation);
                    }
                }
                Annotation::Param { name, annotation } => params.push((name, annotation)),
                Annotation::Generic { location, .. } => {
                    ignored.push((location, "`@rbs generic` applies to classes and modules"))
                }
                Annotation::Skip(_) | Annotation::Override(_) => {}
            }
        }

        let explicit = !colon_types.is_empty() || overload_list.is_some();
        if overloading || explicit {
            let reason = if overloading {
                "`@rbs override` keeps the inherited method types"
            } else {
                "method types are given explicitly"
            };
            if overloading {
                ignored.extend(colon_types.drain(..).map(|(_, location)| (location, reason)));
                ignored.extend(overload_list.take().map(|(_, location)| (location, reason)));
            } else if !colon_types.is_empty() {
                ignored.extend(
                    overload_list
                        .take()
                        .map(|(_, location)| (location, "`#:` method types take precedence")),
                );
            }
            ignored.extend(doc_return.take().map(|annotation| (annotation.location, reason)));
            ignored.extend(trailing.map(|annotation| (annotation.location, reason)));
            ignored.extend(params.drain(..).map(|(_, annotation)| (annotation.location, reason)));
            self.report_unused(ignored);

            let mut overloads: Vec<MethodType> = colon_types
                .into_iter()
                .flat_map(|(method_types, _)| method_types)
                .collect();
            if let Some((method_types, _)) = overload_list {
                overloads.extend(method_types);
            }
            return Ok(overloads);
        }

        // The leading `@rbs return:` wins over a trailing `#:`.
        let trailing = match (&doc_return, trailing) {
            (Some(_), Some(annotation)) => {
                ignored.push((annotation.location, "the return type is already given by `@rbs return`"));
                None
            }
            (_, trailing) => trailing,
        };
        self.report_unused(ignored);

        let return_annotation = combine(doc_return, trailing)?;
        if params.is_empty() && return_annotation.is_none() {
            return Ok(vec![MethodType::untyped()]);
        }
        Ok(vec![self.method_type_from_parameters(node, params, return_annotation)])
    }

    fn report_unused(&mut self, ignored: Vec<(Location, &'static str)>) {
        for (location, reason) in ignored {
            self.report(InlineDiagnostic::unused_inline_annotation(reason, location));
        }
    }

    /// Method type built from the Ruby parameter list and `@rbs name: T` annotations
    fn method_type_from_parameters(
        &mut self,
        node: Node<'_>,
        mut annotations: Vec<(String, TypeAnnotation)>,
        return_annotation: Option<TypeAnnotation>,
    ) -> MethodType {
        let return_type = return_annotation.map_or_else(Type::untyped, |annotation| annotation.ty);
        let mut params = Params::default();
        let mut block = None;
        let mut forwarded = false;

        let mut take = |name: &str| -> Type {
            match annotations.iter().position(|(annotated, _)| annotated == name) {
                Some(index) => annotations.remove(index).1.ty,
                None => Type::untyped(),
            }
        };

        let parameters = node
            .child_by_field_name("parameters")
            .map(named_children)
            .unwrap_or_default();

        for parameter in parameters {
            let name = parameter
                .child_by_field_name("name")
                .map(|name| text(name, self.source).to_string());

            match parameter.kind() {
                "identifier" => {
                    let name = text(parameter, self.source).to_string();
                    let param = FunctionParam::named(take(&name), name);
                    if params.optional_positionals.is_empty() && params.rest_positionals.is_none() {
                        params.required_positionals.push(param);
                    } else {
                        params.trailing_positionals.push(param);
                    }
                }
                "destructured_parameter" => params.required_positionals.push(FunctionParam::new(Type::untyped())),
                "optional_parameter" => {
                    if let Some(name) = name {
                        params.optional_positionals.push(FunctionParam::named(take(&name), name));
                    }
                }
                "splat_parameter" => {
                    params.rest_positionals = Some(match name {
                        Some(name) => FunctionParam::named(take(&name), name),
                        None => FunctionParam::new(Type::untyped()),
                    });
                }
                "keyword_parameter" => {
                    if let Some(name) = name {
                        let param = FunctionParam::new(take(&name));
                        if parameter.child_by_field_name("value").is_some() {
                            params.optional_keywords.insert(name, param);
                        } else {
                            params.required_keywords.insert(name, param);
                        }
                    }
                }
                "hash_splat_parameter" => {
                    params.rest_keywords = Some(match name {
                        Some(name) => FunctionParam::named(take(&name), name),
                        None => FunctionParam::new(Type::untyped()),
                    });
                }
                "block_parameter" => {
                    let ty = name.as_deref().map(&mut take).unwrap_or_else(Type::untyped);
                    block = Some(match ty {
                        Type::Proc { function, .. } => Block {
                            function: *function,
                            required: false,
                        },
                        _ => Block {
                            function: Function::untyped(),
                            required: false,
                        },
                    });
                }
                "forward_parameter" => forwarded = true,
                _ => {}
            }
        }

        for (name, annotation) in annotations {
            self.report(InlineDiagnostic::unused_inline_annotation(
                format!("the method has no parameter `{name}`"),
                annotation.location,
            ));
        }

        let function = if forwarded {
            Function::Untyped { return_type }
        } else {
            Function::Typed { params, return_type }
        };

        MethodType {
            type_params: Vec::new(),
            function,
            block,
            location: None,
        }
    }

    fn visit_mixin(&mut self, node: Node<'_>, kind: MixinKind) -> ExtractResult<()> {
        let arguments = node
            .child_by_field_name("arguments")
            .map(named_children)
            .unwrap_or_default();
        let variables = self.current_variables();
        let type_args = match arguments.as_slice() {
            [_] => self.trailing_type_args(node, &variables)?,
            _ => None,
        };

        for argument in arguments {
            let Some(name) = constant_path(argument, self.source) else {
                let location = self.location(argument)?;
                self.report(InlineDiagnostic::not_implemented_yet(
                    format!("`{kind}` of a non-constant expression"),
                    location,
                ));
                continue;
            };

            let (args, args_range) = match &type_args {
                Some((args, range)) => (args.clone(), Some(range.clone())),
                None => (Vec::new(), None),
            };
            let location = Location::<MixinKey, MixinOptionalKey>::new(self.buffer.clone(), self.range(node))?
                .with_required(MixinKey::Name, self.range(argument))?
                .with_optional(MixinOptionalKey::Args, args_range)?;

            self.push_member(Member::Mixin(Mixin {
                kind,
                name,
                args,
                location,
            }));
        }
        Ok(())
    }

    fn visit_attribute(&mut self, node: Node<'_>, kind: AttributeKind) -> ExtractResult<()> {
        let variables = self.current_variables();
        let leading = self.leading_block(node, &variables)?;
        if leading.is_skipped() {
            return Ok(());
        }
        for annotation in &leading.annotations {
            self.report(InlineDiagnostic::unused_inline_annotation(
                "attributes take their type from a trailing `#:` annotation",
                annotation.location().clone(),
            ));
        }

        let assertion = self.trailing_assertion(node, &variables)?;
        let (ty, type_range) = match assertion {
            Some(annotation) => (annotation.ty, Some(annotation.location.range())),
            None => (Type::untyped(), None),
        };
        let keyword = node.child_by_field_name("method").map(|method| self.range(method));

        let arguments = node
            .child_by_field_name("arguments")
            .map(named_children)
            .unwrap_or_default();

        for argument in arguments {
            let Some(name) = literal_name(argument, self.source) else {
                let location = self.location(argument)?;
                self.report(InlineDiagnostic::not_implemented_yet(
                    "attribute name that is not a symbol or string literal",
                    location,
                ));
                continue;
            };

            let mut location = Location::<AttributeKey, AttributeOptionalKey>::new(self.buffer.clone(), self.range(node))?
                .with_required(AttributeKey::Name, self.range(argument))?
                .with_optional(AttributeOptionalKey::Type, type_range.clone())?;
            if let Some(keyword) = &keyword {
                location.add_required_child(AttributeKey::Keyword, keyword.clone())?;
            }

            self.push_member(Member::Attribute(Attribute {
                kind,
                name,
                ty: ty.clone(),
                location,
            }));
        }
        Ok(())
    }

    /// `(lt range, superclass)` of a class node
    fn super_class(
        &mut self,
        node: Node<'_>,
        variables: &[String],
    ) -> ExtractResult<(Option<Range<usize>>, Option<SuperClass>)> {
        let Some(superclass) = node.child_by_field_name("superclass") else {
            return Ok((None, None));
        };
        let lt = token_child(superclass, "<").map(|token| self.range(token));
        let Some(expression) = named_children(superclass).into_iter().next() else {
            return Ok((lt, None));
        };

        let Some(name) = constant_path(expression, self.source) else {
            let location = self.location(expression)?;
            self.report(InlineDiagnostic::non_constant_super_class_name(location));
            return Ok((lt, None));
        };

        let args = self
            .trailing_type_args(superclass, variables)?
            .map(|(args, _)| args)
            .unwrap_or_default();

        Ok((
            lt,
            Some(SuperClass {
                name,
                args,
                location: self.location(expression)?,
            }),
        ))
    }

    fn declaration_type_params(&mut self, leading: &LeadingBlock) -> Vec<TypeParam> {
        let mut type_params = Vec::new();
        for annotation in &leading.annotations {
            match annotation {
                Annotation::Generic { param, .. } => type_params.push(param.clone()),
                Annotation::Skip(_) => {}
                other => self.report(InlineDiagnostic::unused_inline_annotation(
                    "only `@rbs generic` and `@rbs skip` apply to classes and modules",
                    other.location().clone(),
                )),
            }
        }
        type_params
    }

    fn generics_range(&self, leading: &LeadingBlock) -> Option<Range<usize>> {
        let mut ranges = leading.annotations.iter().filter_map(|annotation| match annotation {
            Annotation::Generic { location, .. } => Some(location.range()),
            _ => None,
        });
        let first = ranges.next()?;
        let end = ranges.last().map_or(first.end, |last| last.end);
        Some(first.start..end)
    }

    fn current_variables(&self) -> Vec<String> {
        match self.stack.last() {
            Some(ModuleFrame::Known(frame)) => frame.variables.clone(),
            _ => Vec::new(),
        }
    }

    /// Annotations in the comment block above `node`; syntax problems are reported here
    fn leading_block(&mut self, node: Node<'_>, variables: &[String]) -> ExtractResult<LeadingBlock> {
        let mut block = {
            let comments = self.comments.leading_block(node.start_position().row);
            AnnotationParser::new(self.buffer, variables).leading(&comments)?
        };
        for diagnostic in block.diagnostics.drain(..) {
            self.report(diagnostic);
        }
        Ok(block)
    }

    /// Trailing `#: T` of a single-line node
    fn trailing_assertion(&mut self, node: Node<'_>, variables: &[String]) -> ExtractResult<Option<TypeAnnotation>> {
        if !self.options.trailing_assertions || node.start_position().row != node.end_position().row {
            return Ok(None);
        }

        let trailing = match self.comments.trailing(node.end_position().row, node.end_byte()) {
            Some(comment) => AnnotationParser::new(self.buffer, variables).trailing(comment)?,
            None => return Ok(None),
        };

        match trailing {
            TrailingAnnotation::Absent => Ok(None),
            TrailingAnnotation::Assertion(annotation) => Ok(Some(annotation)),
            TrailingAnnotation::Invalid(diagnostic) => {
                self.report(diagnostic);
                Ok(None)
            }
        }
    }

    /// Trailing `#[A, B]` type arguments after a mixin or superclass
    fn trailing_type_args(
        &mut self,
        node: Node<'_>,
        variables: &[String],
    ) -> ExtractResult<Option<(Vec<Type>, Range<usize>)>> {
        let Some(comment) = self.comments.trailing(node.end_position().row, node.end_byte()) else {
            return Ok(None);
        };
        if !comment.text(self.source).starts_with("#[") {
            return Ok(None);
        }

        let start = self.buffer.byte_to_char(comment.bytes.start) + 1;
        let end = self.buffer.byte_to_char(comment.bytes.end);
        let child = Buffer::child(self.buffer, vec![start..end])?;

        match RbsParser::parse_type(&child, 0..child.len(), variables) {
            Ok(Type::Tuple(args)) => Ok(Some((args, start..end))),
            Ok(_) => Ok(None),
            Err(error) => {
                let location = Location::new(self.buffer.clone(), start..end)?;
                self.report(InlineDiagnostic::annotation_syntax_error(&error, location));
                Ok(None)
            }
        }
    }

    fn range(&self, node: Node<'_>) -> Range<usize> {
        char_range(self.buffer, node)
    }

    fn location(&self, node: Node<'_>) -> ExtractResult<Location> {
        Ok(crate::node::location(self.buffer, node)?)
    }

    /// Range of a keyword token, or the start of the node when the parser recovered without it
    fn token_range(&self, node: Node<'_>, kind: &str) -> Range<usize> {
        match token_child(node, kind) {
            Some(token) => self.range(token),
            None => {
                let start = self.range(node).start;
                start..start
            }
        }
    }

    fn end_range(&self, node: Node<'_>) -> Range<usize> {
        match token_child(node, "end") {
            Some(token) => self.range(token),
            None => {
                let end = self.range(node).end;
                end..end
            }
        }
    }
}

fn members_mut(declaration: &mut Declaration) -> &mut Vec<Member> {
    match declaration {
        Declaration::Class(class) => &mut class.members,
        Declaration::Module(module) => &mut module.members,
    }
}
