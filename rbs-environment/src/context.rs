//! Resolver contexts
//!
//! A context records where in the namespace tree a declaration was found: the
//! top level, or a chain of enclosing modules. Contexts are immutable values;
//! pushing returns a new context and leaves the parent usable.

use std::fmt;
use std::sync::Arc;

use rbs_parser::{Namespace, TypeName};

/// Module a context frame stands for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContextModule {
    /// Absolute name of the enclosing class or module
    Known(TypeName),
    /// An enclosing module whose name is not a constant path
    Unknown,
}

impl fmt::Display for ContextModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextModule::Known(name) => write!(f, "{name}"),
            ContextModule::Unknown => write!(f, "?"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct Frame {
    parent: ResolverContext,
    module: ContextModule,
}

/// Lexical nesting used to resolve relative type names
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ResolverContext(Option<Arc<Frame>>);

impl ResolverContext {
    /// The top-level context
    pub fn top() -> Self {
        Self(None)
    }

    pub fn is_top(&self) -> bool {
        self.0.is_none()
    }

    /// Nested context inside `module`
    pub fn push(&self, module: ContextModule) -> Self {
        Self(Some(Arc::new(Frame {
            parent: self.clone(),
            module,
        })))
    }

    pub fn push_module(&self, name: TypeName) -> Self {
        self.push(ContextModule::Known(name))
    }

    pub fn push_unknown(&self) -> Self {
        self.push(ContextModule::Unknown)
    }

    pub fn parent(&self) -> Option<&ResolverContext> {
        self.0.as_ref().map(|frame| &frame.parent)
    }

    /// Innermost module, `None` at the top level
    pub fn module(&self) -> Option<&ContextModule> {
        self.0.as_ref().map(|frame| &frame.module)
    }

    pub fn depth(&self) -> usize {
        self.modules().count()
    }

    /// Enclosing modules, innermost first
    pub fn modules(&self) -> impl Iterator<Item = &ContextModule> {
        let mut current = self;
        std::iter::from_fn(move || {
            let frame = current.0.as_ref()?;
            current = &frame.parent;
            Some(&frame.module)
        })
    }

    /// Whether any enclosing module is unknown
    pub fn has_unknown(&self) -> bool {
        self.modules()
            .any(|module| matches!(module, ContextModule::Unknown))
    }

    /// Namespace of the innermost known module, the root at top level
    pub fn namespace(&self) -> Namespace {
        self.modules()
            .find_map(|module| match module {
                ContextModule::Known(name) => Some(name.to_namespace().absolute()),
                ContextModule::Unknown => None,
            })
            .unwrap_or_else(Namespace::root)
    }

    /// Resolve `name` against the enclosing scopes, innermost first, then the top level.
    ///
    /// `exists` decides whether a candidate absolute name is declared. Absolute
    /// names resolve to themselves.
    pub fn resolve(&self, name: &TypeName, exists: impl Fn(&TypeName) -> bool) -> Option<TypeName> {
        if name.is_absolute() {
            return Some(name.clone());
        }

        for module in self.modules() {
            let ContextModule::Known(enclosing) = module else {
                continue;
            };
            let candidate = name.with_prefix(&enclosing.to_namespace().absolute());
            if exists(&candidate) {
                return Some(candidate);
            }
        }

        let candidate = name.absolute();
        exists(&candidate).then_some(candidate)
    }
}

impl fmt::Display for ResolverContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            None => write!(f, "nil"),
            Some(frame) => write!(f, "({}, {})", frame.parent, frame.module),
        }
    }
}
