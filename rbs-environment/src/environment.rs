//! The declaration environment
//!
//! Declarations from signature files and from inline annotations are merged
//! here under their absolute names. Validation runs once, after every source
//! has been inserted.

use indexmap::IndexMap;
use rbs_parser::{Declaration, TypeName};
use tracing::{debug, warn};

use crate::ancestry::SuperclassGraph;
use crate::class_entry::ClassEntry;
use crate::context::ResolverContext;
use crate::error::{EnvironmentError, EnvironmentResult};

/// Class and module entries keyed by absolute name, in first-seen order
#[derive(Debug, Clone, Default)]
pub struct Environment {
    class_decls: IndexMap<TypeName, ClassEntry>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a declaration found in `context`, then every class or module nested in it.
    pub fn insert_declaration(
        &mut self,
        context: &ResolverContext,
        declaration: Declaration,
    ) -> EnvironmentResult<()> {
        let name = declaration.name().with_prefix(&context.namespace());
        let nested: Vec<Declaration> = declaration
            .members()
            .iter()
            .filter_map(|member| member.as_declaration())
            .collect();

        let entry = self.class_decls.entry(name.clone()).or_insert_with(|| {
            debug!(name = %name, "Creating class entry");
            ClassEntry::new(name.clone())
        });

        if let Some((_, first)) = entry.declarations().first() {
            if first.is_module() != declaration.is_module() {
                let other_location = declaration.location();
                return Err(EnvironmentError::DuplicatedDeclaration {
                    name,
                    kind: first.kind_name(),
                    other_kind: declaration.kind_name(),
                    location: first.location(),
                    span: other_location.source_span(),
                    other_location,
                });
            }
        }

        entry.record(context.clone(), declaration);

        let inner = context.push_module(name);
        for declaration in nested {
            self.insert_declaration(&inner, declaration)?;
        }

        Ok(())
    }

    /// Insert a list of top-level declarations, such as a parsed signature file
    pub fn insert_declarations(
        &mut self,
        declarations: impl IntoIterator<Item = Declaration>,
    ) -> EnvironmentResult<()> {
        let top = ResolverContext::top();
        for declaration in declarations {
            self.insert_declaration(&top, declaration)?;
        }
        Ok(())
    }

    pub fn get(&self, name: &TypeName) -> Option<&ClassEntry> {
        self.class_decls.get(name)
    }

    pub fn contains(&self, name: &TypeName) -> bool {
        self.class_decls.contains_key(name)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&TypeName, &ClassEntry)> {
        self.class_decls.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &TypeName> {
        self.class_decls.keys()
    }

    pub fn len(&self) -> usize {
        self.class_decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.class_decls.is_empty()
    }

    /// Resolve a class or module name as seen from `context`
    pub fn resolve_type_name(&self, context: &ResolverContext, name: &TypeName) -> Option<TypeName> {
        context.resolve(name, |candidate| self.contains(candidate))
    }

    /// Absolute name of the superclass declared by the primary declaration of `name`.
    ///
    /// `None` for modules, for classes without a superclass, and when the
    /// superclass is not declared in this environment.
    pub fn superclass_of(&self, name: &TypeName) -> EnvironmentResult<Option<TypeName>> {
        let Some(entry) = self.get(name) else {
            return Ok(None);
        };
        let (context, declaration) = entry.primary()?;
        let Some(super_class) = declaration.super_class() else {
            return Ok(None);
        };

        let resolved = self.resolve_type_name(context, &super_class.name);
        if resolved.is_none() {
            warn!(class = %name, super_class = %super_class.name, "Superclass is not declared");
        }
        Ok(resolved)
    }

    /// Reject superclass cycles
    pub fn check_inheritance(&self) -> EnvironmentResult<()> {
        SuperclassGraph::build(self)?.check_acyclic(self)
    }

    /// Validate type parameters of every entry, then the class hierarchy
    #[tracing::instrument(skip(self), fields(entries = self.class_decls.len()))]
    pub fn validate(&self) -> EnvironmentResult<()> {
        for entry in self.class_decls.values() {
            entry.validate_type_params()?;
        }
        self.check_inheritance()?;
        debug!("Environment is consistent");
        Ok(())
    }
}
