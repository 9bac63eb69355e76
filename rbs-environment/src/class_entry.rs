//! Merged record of every declaration sharing one class or module name

use std::collections::HashMap;

use rbs_parser::{type_param_names, Declaration, Member, Type, TypeName, TypeParam};

use crate::context::ResolverContext;
use crate::error::{EnvironmentError, EnvironmentResult};

/// All declarations of one absolute name, in the order they were recorded
#[derive(Debug, Clone)]
pub struct ClassEntry {
    name: TypeName,
    declarations: Vec<(ResolverContext, Declaration)>,
}

impl ClassEntry {
    pub fn new(name: TypeName) -> Self {
        Self {
            name,
            declarations: Vec::new(),
        }
    }

    pub fn name(&self) -> &TypeName {
        &self.name
    }

    /// Append a declaration found in `context`
    pub fn record(&mut self, context: ResolverContext, declaration: Declaration) {
        self.declarations.push((context, declaration));
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn declarations(&self) -> &[(ResolverContext, Declaration)] {
        &self.declarations
    }

    pub fn is_module(&self) -> bool {
        self.declarations
            .first()
            .is_some_and(|(_, declaration)| declaration.is_module())
    }

    /// The first declaration with an explicit superclass, otherwise the first one
    pub fn primary(&self) -> EnvironmentResult<&(ResolverContext, Declaration)> {
        self.declarations
            .iter()
            .find(|(_, declaration)| declaration.super_class().is_some())
            .or_else(|| self.declarations.first())
            .ok_or_else(|| EnvironmentError::EmptyEntry {
                name: self.name.clone(),
            })
    }

    pub fn primary_declaration(&self) -> EnvironmentResult<&Declaration> {
        self.primary().map(|(_, declaration)| declaration)
    }

    pub fn type_params(&self) -> EnvironmentResult<&[TypeParam]> {
        self.primary_declaration().map(Declaration::type_params)
    }

    /// Check every declaration's type parameters against the first one's
    pub fn validate_type_params(&self) -> EnvironmentResult<()> {
        let Some(((_, reference), rest)) = self.declarations.split_first() else {
            return Err(EnvironmentError::EmptyEntry {
                name: self.name.clone(),
            });
        };

        for (_, declaration) in rest {
            if !compatible_type_params(reference.type_params(), declaration.type_params()) {
                let other_location = declaration.location();
                return Err(EnvironmentError::GenericParameterMismatch {
                    name: self.name.clone(),
                    location: reference.location(),
                    span: other_location.source_span(),
                    other_location,
                });
            }
        }

        Ok(())
    }

    /// Members of every declaration, each paired with the context inside its declaration
    pub fn members(&self) -> impl Iterator<Item = (ResolverContext, &Member)> + '_ {
        self.declarations.iter().flat_map(move |(context, declaration)| {
            let inner = context.push_module(self.name.clone());
            declaration
                .members()
                .iter()
                .map(move |member| (inner.clone(), member))
        })
    }
}

/// Same arity, and per position the same variance and upper bound once the
/// other list's parameter names are renamed to the reference names.
pub fn compatible_type_params(reference: &[TypeParam], other: &[TypeParam]) -> bool {
    if reference.len() != other.len() {
        return false;
    }

    let reference_names = type_param_names(reference);
    let other_names = type_param_names(other);
    let renaming: HashMap<String, Type> = other_names
        .iter()
        .cloned()
        .zip(reference_names.iter().cloned().map(Type::Variable))
        .collect();

    reference.iter().zip(other).all(|(expected, found)| {
        let expected_bound = expected
            .upper_bound
            .as_ref()
            .map(|bound| bound.resolve_variables(&reference_names));
        let found_bound = found
            .upper_bound
            .as_ref()
            .map(|bound| bound.resolve_variables(&other_names).substitute(&renaming));

        expected.variance == found.variance && expected_bound == found_bound
    })
}
