//! Output of an extraction pass

use std::sync::Arc;

use rbs_environment::ResolverContext;
use rbs_parser::{Buffer, Declaration, Member, MethodDefinition, TypeName};
use tree_sitter::Tree;

use crate::diagnostics::{DiagnosticKind, InlineDiagnostic};

/// Declarations and diagnostics of one Ruby file
#[derive(Debug, Clone)]
pub struct InlineResult {
    pub buffer: Arc<Buffer>,
    /// The tree-sitter parse the declarations were extracted from
    pub tree: Tree,
    /// Top-level declarations in document order, with the context each was found in
    pub declarations: Vec<(ResolverContext, Declaration)>,
    pub diagnostics: Vec<InlineDiagnostic>,
}

impl InlineResult {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &InlineDiagnostic> {
        self.diagnostics
            .iter()
            .filter(move |diagnostic| diagnostic.kind() == kind)
    }

    /// Every method definition, paired with the context of the module that owns it
    pub fn methods(&self) -> Vec<(ResolverContext, &MethodDefinition)> {
        let mut methods = Vec::new();
        for (context, declaration) in &self.declarations {
            collect_methods(context, declaration.name(), declaration.members(), &mut methods);
        }
        methods
    }

    /// Diagnostics as miette reports with the Ruby source attached
    pub fn reports(&self) -> Vec<miette::Report> {
        self.diagnostics
            .iter()
            .map(|diagnostic| {
                miette::Report::new(diagnostic.clone()).with_source_code(self.buffer.named_source())
            })
            .collect()
    }
}

fn collect_methods<'d>(
    context: &ResolverContext,
    name: &TypeName,
    members: &'d [Member],
    methods: &mut Vec<(ResolverContext, &'d MethodDefinition)>,
) {
    let inner = context.push_module(name.with_prefix(&context.namespace()));

    for member in members {
        match member {
            Member::MethodDefinition(method) => methods.push((inner.clone(), method)),
            Member::Class(class) => collect_methods(&inner, &class.name, &class.members, methods),
            Member::Module(module) => collect_methods(&inner, &module.name, &module.members, methods),
            Member::Mixin(_) | Member::Attribute(_) => {}
        }
    }
}
