// RBS AST Definitions
// Names, types, method types and declarations with keyed source locations

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;

use crate::child_keys;
use crate::location::Location;

/// A (possibly absolute) module path such as `::Foo::Bar::`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Namespace {
    pub path: Vec<String>,
    pub absolute: bool,
}

impl Namespace {
    pub fn new(path: Vec<String>, absolute: bool) -> Self {
        Self { path, absolute }
    }

    /// The absolute top-level namespace `::`
    pub fn root() -> Self {
        Self::new(Vec::new(), true)
    }

    /// The relative empty namespace
    pub fn empty() -> Self {
        Self::new(Vec::new(), false)
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.absolute && self.path.is_empty()
    }

    pub fn append(&self, component: impl Into<String>) -> Self {
        let mut path = self.path.clone();
        path.push(component.into());
        Self::new(path, self.absolute)
    }

    /// Namespace without its last component
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.path.split_last()?;
        Some(Self::new(rest.to_vec(), self.absolute))
    }

    /// Append `other` to `self`, unless `other` is already absolute
    pub fn join(&self, other: &Namespace) -> Self {
        if other.absolute {
            return other.clone();
        }
        let mut path = self.path.clone();
        path.extend(other.path.iter().cloned());
        Self::new(path, self.absolute)
    }

    pub fn absolute(&self) -> Self {
        Self::new(self.path.clone(), true)
    }

    pub fn relative(&self) -> Self {
        Self::new(self.path.clone(), false)
    }

    /// Type name naming the module this namespace stands for (`::A::B::` → `::A::B`)
    pub fn to_type_name(&self) -> Option<TypeName> {
        let parent = self.parent()?;
        let name = self.path.last()?.clone();
        Some(TypeName::new(parent, name))
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.absolute {
            write!(f, "::")?;
        }
        for component in &self.path {
            write!(f, "{component}::")?;
        }
        Ok(())
    }
}

/// What a type name refers to, judged from its spelling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeNameKind {
    Class,
    Interface,
    Alias,
}

/// Qualified name of a class, module, interface or alias
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeName {
    pub namespace: Namespace,
    pub name: String,
}

impl TypeName {
    pub fn new(namespace: Namespace, name: impl Into<String>) -> Self {
        Self {
            namespace,
            name: name.into(),
        }
    }

    /// Parse `A::B`, `::A::B` or `_Each`
    pub fn parse(text: &str) -> Self {
        let (absolute, rest) = match text.strip_prefix("::") {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let mut path: Vec<String> = rest.split("::").map(str::to_string).collect();
        let name = path.pop().unwrap_or_default();
        Self::new(Namespace::new(path, absolute), name)
    }

    pub fn is_absolute(&self) -> bool {
        self.namespace.absolute
    }

    pub fn absolute(&self) -> Self {
        Self::new(self.namespace.absolute(), self.name.clone())
    }

    pub fn relative(&self) -> Self {
        Self::new(self.namespace.relative(), self.name.clone())
    }

    /// Namespace of the members of this module (`::A::B` → `::A::B::`)
    pub fn to_namespace(&self) -> Namespace {
        self.namespace.append(self.name.clone())
    }

    /// Qualify a relative name with `prefix`; absolute names are returned unchanged
    pub fn with_prefix(&self, prefix: &Namespace) -> Self {
        if self.is_absolute() {
            return self.clone();
        }
        Self::new(prefix.join(&self.namespace), self.name.clone())
    }

    /// A bare name without namespace, like `T`
    pub fn is_simple(&self) -> bool {
        !self.is_absolute() && self.namespace.is_empty()
    }

    pub fn kind(&self) -> TypeNameKind {
        let mut chars = self.name.chars();
        match (chars.next(), chars.next()) {
            (Some('_'), Some(second)) if second.is_ascii_uppercase() => TypeNameKind::Interface,
            (Some(first), _) if first.is_ascii_uppercase() => TypeNameKind::Class,
            _ => TypeNameKind::Alias,
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.namespace, self.name)
    }
}

/// Keyword types of the signature language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Bool,
    Boolish,
    Void,
    Untyped,
    Nil,
    Top,
    Bottom,
    SelfType,
    Instance,
    Class,
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self {
            BaseType::Bool => "bool",
            BaseType::Boolish => "boolish",
            BaseType::Void => "void",
            BaseType::Untyped => "untyped",
            BaseType::Nil => "nil",
            BaseType::Top => "top",
            BaseType::Bottom => "bot",
            BaseType::SelfType => "self",
            BaseType::Instance => "instance",
            BaseType::Class => "class",
        };
        write!(f, "{keyword}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    Symbol(String),
    String(String),
    Integer(i64),
    Bool(bool),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Symbol(symbol) => write!(f, ":{symbol}"),
            Literal::String(string) => write!(f, "{string:?}"),
            Literal::Integer(integer) => write!(f, "{integer}"),
            Literal::Bool(boolean) => write!(f, "{boolean}"),
        }
    }
}

/// Signature-language type
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Base(BaseType),
    Variable(String),
    ClassInstance { name: TypeName, args: Vec<Type> },
    Interface { name: TypeName, args: Vec<Type> },
    Alias { name: TypeName, args: Vec<Type> },
    Literal(Literal),
    Optional(Box<Type>),
    Union(Vec<Type>),
    Intersection(Vec<Type>),
    Tuple(Vec<Type>),
    Proc {
        function: Box<Function>,
        block: Option<Box<Block>>,
    },
}

impl Type {
    pub fn untyped() -> Self {
        Type::Base(BaseType::Untyped)
    }

    pub fn class_instance(name: &str) -> Self {
        Type::ClassInstance {
            name: TypeName::parse(name),
            args: Vec::new(),
        }
    }

    /// Rebuild the type, replacing every subterm for which `replace` returns a value
    pub fn map_type(&self, replace: &mut dyn FnMut(&Type) -> Option<Type>) -> Type {
        if let Some(replacement) = replace(self) {
            return replacement;
        }

        match self {
            Type::Base(_) | Type::Variable(_) | Type::Literal(_) => self.clone(),
            Type::ClassInstance { name, args } => Type::ClassInstance {
                name: name.clone(),
                args: map_types(args, replace),
            },
            Type::Interface { name, args } => Type::Interface {
                name: name.clone(),
                args: map_types(args, replace),
            },
            Type::Alias { name, args } => Type::Alias {
                name: name.clone(),
                args: map_types(args, replace),
            },
            Type::Optional(inner) => Type::Optional(Box::new(inner.map_type(replace))),
            Type::Union(types) => Type::Union(map_types(types, replace)),
            Type::Intersection(types) => Type::Intersection(map_types(types, replace)),
            Type::Tuple(types) => Type::Tuple(map_types(types, replace)),
            Type::Proc { function, block } => Type::Proc {
                function: Box::new(function.map_type(replace)),
                block: block.as_ref().map(|block| Box::new(block.map_type(replace))),
            },
        }
    }

    /// Replace type variables by name
    pub fn substitute(&self, substitution: &HashMap<String, Type>) -> Type {
        self.map_type(&mut |ty: &Type| match ty {
            Type::Variable(name) => substitution.get(name).cloned(),
            _ => None,
        })
    }

    /// Turn bare class references that name one of `variables` into type variables
    pub fn resolve_variables(&self, variables: &[String]) -> Type {
        if variables.is_empty() {
            return self.clone();
        }
        self.map_type(&mut |ty: &Type| match ty {
            Type::ClassInstance { name, args }
                if args.is_empty() && name.is_simple() && variables.contains(&name.name) =>
            {
                Some(Type::Variable(name.name.clone()))
            }
            _ => None,
        })
    }

    fn needs_parens_in_optional(&self) -> bool {
        matches!(
            self,
            Type::Union(_) | Type::Intersection(_) | Type::Proc { .. }
        )
    }
}

fn map_types(types: &[Type], replace: &mut dyn FnMut(&Type) -> Option<Type>) -> Vec<Type> {
    types.iter().map(|ty| ty.map_type(replace)).collect()
}

fn map_params(
    params: &[FunctionParam],
    replace: &mut dyn FnMut(&Type) -> Option<Type>,
) -> Vec<FunctionParam> {
    params.iter().map(|param| param.map_type(replace)).collect()
}

fn map_keywords(
    params: &IndexMap<String, FunctionParam>,
    replace: &mut dyn FnMut(&Type) -> Option<Type>,
) -> IndexMap<String, FunctionParam> {
    params
        .iter()
        .map(|(name, param)| (name.clone(), param.map_type(replace)))
        .collect()
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[Type]) -> fmt::Result {
    if args.is_empty() {
        return Ok(());
    }
    write!(f, "[")?;
    write_joined(f, args, ", ")?;
    write!(f, "]")
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T], separator: &str) -> fmt::Result {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            write!(f, "{separator}")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Base(base) => write!(f, "{base}"),
            Type::Variable(name) => write!(f, "{name}"),
            Type::ClassInstance { name, args }
            | Type::Interface { name, args }
            | Type::Alias { name, args } => {
                write!(f, "{name}")?;
                write_args(f, args)
            }
            Type::Literal(literal) => write!(f, "{literal}"),
            Type::Optional(inner) if inner.needs_parens_in_optional() => write!(f, "({inner})?"),
            Type::Optional(inner) => write!(f, "{inner}?"),
            Type::Union(types) => write_joined(f, types, " | "),
            Type::Intersection(types) => {
                for (index, ty) in types.iter().enumerate() {
                    if index > 0 {
                        write!(f, " & ")?;
                    }
                    match ty {
                        Type::Union(_) => write!(f, "({ty})")?,
                        _ => write!(f, "{ty}")?,
                    }
                }
                Ok(())
            }
            Type::Tuple(types) => {
                write!(f, "[")?;
                write_joined(f, types, ", ")?;
                write!(f, "]")
            }
            Type::Proc { function, block } => {
                write!(f, "^")?;
                function.fmt_params(f)?;
                if let Some(block) = block {
                    write!(f, " {block}")?;
                }
                write!(f, " -> {}", function.return_type())
            }
        }
    }
}

/// A parameter of a function type
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionParam {
    pub ty: Type,
    pub name: Option<String>,
}

impl FunctionParam {
    pub fn new(ty: Type) -> Self {
        Self { ty, name: None }
    }

    pub fn named(ty: Type, name: impl Into<String>) -> Self {
        Self {
            ty,
            name: Some(name.into()),
        }
    }

    fn map_type(&self, replace: &mut dyn FnMut(&Type) -> Option<Type>) -> Self {
        Self {
            ty: self.ty.map_type(replace),
            name: self.name.clone(),
        }
    }
}

impl fmt::Display for FunctionParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} {}", self.ty, name),
            None => write!(f, "{}", self.ty),
        }
    }
}

/// Parameters of a typed function, in signature-language order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Params {
    pub required_positionals: Vec<FunctionParam>,
    pub optional_positionals: Vec<FunctionParam>,
    pub rest_positionals: Option<FunctionParam>,
    pub trailing_positionals: Vec<FunctionParam>,
    pub required_keywords: IndexMap<String, FunctionParam>,
    pub optional_keywords: IndexMap<String, FunctionParam>,
    pub rest_keywords: Option<FunctionParam>,
}

impl Params {
    pub fn is_empty(&self) -> bool {
        self.required_positionals.is_empty()
            && self.optional_positionals.is_empty()
            && self.rest_positionals.is_none()
            && self.trailing_positionals.is_empty()
            && self.required_keywords.is_empty()
            && self.optional_keywords.is_empty()
            && self.rest_keywords.is_none()
    }

    fn map_type(&self, replace: &mut dyn FnMut(&Type) -> Option<Type>) -> Self {
        Self {
            required_positionals: map_params(&self.required_positionals, replace),
            optional_positionals: map_params(&self.optional_positionals, replace),
            rest_positionals: self.rest_positionals.as_ref().map(|p| p.map_type(replace)),
            trailing_positionals: map_params(&self.trailing_positionals, replace),
            required_keywords: map_keywords(&self.required_keywords, replace),
            optional_keywords: map_keywords(&self.optional_keywords, replace),
            rest_keywords: self.rest_keywords.as_ref().map(|p| p.map_type(replace)),
        }
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        parts.extend(self.required_positionals.iter().map(|p| p.to_string()));
        parts.extend(self.optional_positionals.iter().map(|p| format!("?{p}")));
        if let Some(rest) = &self.rest_positionals {
            parts.push(format!("*{rest}"));
        }
        parts.extend(self.trailing_positionals.iter().map(|p| p.to_string()));
        parts.extend(
            self.required_keywords
                .iter()
                .map(|(name, p)| format!("{name}: {p}")),
        );
        parts.extend(
            self.optional_keywords
                .iter()
                .map(|(name, p)| format!("?{name}: {p}")),
        );
        if let Some(rest) = &self.rest_keywords {
            parts.push(format!("**{rest}"));
        }
        write!(f, "{}", parts.join(", "))
    }
}

/// Function part of a method or proc type
#[derive(Debug, Clone, PartialEq)]
pub enum Function {
    Typed { params: Params, return_type: Type },
    /// `(?) -> T`: parameters are not checked
    Untyped { return_type: Type },
}

impl Function {
    /// `(?) -> untyped`
    pub fn untyped() -> Self {
        Function::Untyped {
            return_type: Type::untyped(),
        }
    }

    pub fn return_type(&self) -> &Type {
        match self {
            Function::Typed { return_type, .. } | Function::Untyped { return_type } => return_type,
        }
    }

    pub fn params(&self) -> Option<&Params> {
        match self {
            Function::Typed { params, .. } => Some(params),
            Function::Untyped { .. } => None,
        }
    }

    pub fn with_return_type(self, return_type: Type) -> Self {
        match self {
            Function::Typed { params, .. } => Function::Typed {
                params,
                return_type,
            },
            Function::Untyped { .. } => Function::Untyped { return_type },
        }
    }

    pub fn map_type(&self, replace: &mut dyn FnMut(&Type) -> Option<Type>) -> Self {
        match self {
            Function::Typed {
                params,
                return_type,
            } => Function::Typed {
                params: params.map_type(replace),
                return_type: return_type.map_type(replace),
            },
            Function::Untyped { return_type } => Function::Untyped {
                return_type: return_type.map_type(replace),
            },
        }
    }

    fn fmt_params(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Typed { params, .. } => write!(f, "({params})"),
            Function::Untyped { .. } => write!(f, "(?)"),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_params(f)?;
        write!(f, " -> {}", self.return_type())
    }
}

/// Block accepted by a method or proc
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub function: Function,
    pub required: bool,
}

impl Block {
    fn map_type(&self, replace: &mut dyn FnMut(&Type) -> Option<Type>) -> Self {
        Self {
            function: self.function.map_type(replace),
            required: self.required,
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.required {
            write!(f, "?")?;
        }
        write!(f, "{{ {} }}", self.function)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Variance {
    #[default]
    Invariant,
    Covariant,
    Contravariant,
}

impl fmt::Display for Variance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variance::Invariant => write!(f, "invariant"),
            Variance::Covariant => write!(f, "out"),
            Variance::Contravariant => write!(f, "in"),
        }
    }
}

child_keys! {
    /// Required children of a type parameter location
    pub enum TypeParamKey {
        Name => "name",
    }
}

child_keys! {
    /// Optional children of a type parameter location
    pub enum TypeParamOptionalKey {
        Variance => "variance",
        Unchecked => "unchecked",
        UpperBound => "upper_bound",
        Default => "default",
    }
}

/// Generic parameter of a class, module or method
#[derive(Debug, Clone, PartialEq)]
pub struct TypeParam {
    pub name: String,
    pub variance: Variance,
    pub upper_bound: Option<Type>,
    pub default_type: Option<Type>,
    pub unchecked: bool,
    pub location: Option<Location<TypeParamKey, TypeParamOptionalKey>>,
}

impl TypeParam {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variance: Variance::Invariant,
            upper_bound: None,
            default_type: None,
            unchecked: false,
            location: None,
        }
    }

    pub fn with_variance(mut self, variance: Variance) -> Self {
        self.variance = variance;
        self
    }

    pub fn with_upper_bound(mut self, bound: Type) -> Self {
        self.upper_bound = Some(bound);
        self
    }
}

impl fmt::Display for TypeParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unchecked {
            write!(f, "unchecked ")?;
        }
        if self.variance != Variance::Invariant {
            write!(f, "{} ", self.variance)?;
        }
        write!(f, "{}", self.name)?;
        if let Some(bound) = &self.upper_bound {
            write!(f, " < {bound}")?;
        }
        if let Some(default) = &self.default_type {
            write!(f, " = {default}")?;
        }
        Ok(())
    }
}

/// Names of a type parameter list
pub fn type_param_names(params: &[TypeParam]) -> Vec<String> {
    params.iter().map(|param| param.name.clone()).collect()
}

/// One overload of a method
#[derive(Debug, Clone, PartialEq)]
pub struct MethodType {
    pub type_params: Vec<TypeParam>,
    pub function: Function,
    pub block: Option<Block>,
    pub location: Option<Location>,
}

impl MethodType {
    /// `(?) -> untyped` without a location
    pub fn untyped() -> Self {
        Self {
            type_params: Vec::new(),
            function: Function::untyped(),
            block: None,
            location: None,
        }
    }
}

impl fmt::Display for MethodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.type_params.is_empty() {
            write!(f, "[")?;
            write_joined(f, &self.type_params, ", ")?;
            write!(f, "] ")?;
        }
        self.function.fmt_params(f)?;
        if let Some(block) = &self.block {
            write!(f, " {block}")?;
        }
        write!(f, " -> {}", self.function.return_type())
    }
}

/// Comment attached to a declaration
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub string: String,
    pub location: Location,
}

child_keys! {
    pub enum ClassKey {
        Keyword => "keyword",
        Name => "name",
        End => "end",
    }
}

child_keys! {
    pub enum ClassOptionalKey {
        TypeParams => "type_params",
        Lt => "lt",
    }
}

child_keys! {
    pub enum ModuleKey {
        Keyword => "keyword",
        Name => "name",
        End => "end",
    }
}

child_keys! {
    pub enum ModuleOptionalKey {
        TypeParams => "type_params",
        Colon => "colon",
        SelfTypes => "self_types",
    }
}

child_keys! {
    pub enum MethodKey {
        Keyword => "keyword",
        Name => "name",
    }
}

child_keys! {
    pub enum MethodOptionalKey {
        Kind => "kind",
        Overloading => "overloading",
        Visibility => "visibility",
    }
}

child_keys! {
    pub enum MixinKey {
        Name => "name",
    }
}

child_keys! {
    pub enum MixinOptionalKey {
        Args => "args",
    }
}

child_keys! {
    pub enum AttributeKey {
        Keyword => "keyword",
        Name => "name",
    }
}

child_keys! {
    pub enum AttributeOptionalKey {
        Type => "type",
    }
}

/// `< Super[Args]` of a class declaration
#[derive(Debug, Clone, PartialEq)]
pub struct SuperClass {
    pub name: TypeName,
    pub args: Vec<Type>,
    pub location: Location,
}

/// `: _SelfType` of a module declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleSelf {
    pub name: TypeName,
    pub args: Vec<Type>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    pub name: TypeName,
    pub type_params: Vec<TypeParam>,
    pub super_class: Option<SuperClass>,
    pub members: Vec<Member>,
    pub comment: Option<Comment>,
    pub location: Location<ClassKey, ClassOptionalKey>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleDecl {
    pub name: TypeName,
    pub type_params: Vec<TypeParam>,
    pub self_types: Vec<ModuleSelf>,
    pub members: Vec<Member>,
    pub comment: Option<Comment>,
    pub location: Location<ModuleKey, ModuleOptionalKey>,
}

/// Top-level or nested declaration
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Class(ClassDecl),
    Module(ModuleDecl),
}

impl Declaration {
    pub fn name(&self) -> &TypeName {
        match self {
            Declaration::Class(class) => &class.name,
            Declaration::Module(module) => &module.name,
        }
    }

    pub fn type_params(&self) -> &[TypeParam] {
        match self {
            Declaration::Class(class) => &class.type_params,
            Declaration::Module(module) => &module.type_params,
        }
    }

    pub fn members(&self) -> &[Member] {
        match self {
            Declaration::Class(class) => &class.members,
            Declaration::Module(module) => &module.members,
        }
    }

    pub fn super_class(&self) -> Option<&SuperClass> {
        match self {
            Declaration::Class(class) => class.super_class.as_ref(),
            Declaration::Module(_) => None,
        }
    }

    pub fn comment(&self) -> Option<&Comment> {
        match self {
            Declaration::Class(class) => class.comment.as_ref(),
            Declaration::Module(module) => module.comment.as_ref(),
        }
    }

    /// Location of the whole declaration, without children
    pub fn location(&self) -> Location {
        match self {
            Declaration::Class(class) => class.location.plain(),
            Declaration::Module(module) => module.location.plain(),
        }
    }

    pub fn is_class(&self) -> bool {
        matches!(self, Declaration::Class(_))
    }

    pub fn is_module(&self) -> bool {
        matches!(self, Declaration::Module(_))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Declaration::Class(_) => "class",
            Declaration::Module(_) => "module",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Instance,
    /// `def self.foo`
    Singleton,
    /// `def self?.foo`
    SingletonInstance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDefinition {
    pub name: String,
    pub kind: MethodKind,
    pub overloads: Vec<MethodType>,
    /// Trailing `...`: the definition adds overloads to an existing method
    pub overloading: bool,
    pub visibility: Option<Visibility>,
    pub comment: Option<Comment>,
    pub location: Location<MethodKey, MethodOptionalKey>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixinKind {
    Include,
    Extend,
    Prepend,
}

impl fmt::Display for MixinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MixinKind::Include => write!(f, "include"),
            MixinKind::Extend => write!(f, "extend"),
            MixinKind::Prepend => write!(f, "prepend"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mixin {
    pub kind: MixinKind,
    pub name: TypeName,
    pub args: Vec<Type>,
    pub location: Location<MixinKey, MixinOptionalKey>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Reader,
    Writer,
    Accessor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub kind: AttributeKind,
    pub name: String,
    pub ty: Type,
    pub location: Location<AttributeKey, AttributeOptionalKey>,
}

/// Member of a class or module body
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    MethodDefinition(MethodDefinition),
    Mixin(Mixin),
    Attribute(Attribute),
    Class(ClassDecl),
    Module(ModuleDecl),
}

impl Member {
    /// The nested declaration, for class and module members
    pub fn as_declaration(&self) -> Option<Declaration> {
        match self {
            Member::Class(class) => Some(Declaration::Class(class.clone())),
            Member::Module(module) => Some(Declaration::Module(module.clone())),
            _ => None,
        }
    }

    pub fn location(&self) -> Location {
        match self {
            Member::MethodDefinition(method) => method.location.plain(),
            Member::Mixin(mixin) => mixin.location.plain(),
            Member::Attribute(attribute) => attribute.location.plain(),
            Member::Class(class) => class.location.plain(),
            Member::Module(module) => module.location.plain(),
        }
    }
}

impl From<Declaration> for Member {
    fn from(declaration: Declaration) -> Self {
        match declaration {
            Declaration::Class(class) => Member::Class(class),
            Declaration::Module(module) => Member::Module(module),
        }
    }
}
