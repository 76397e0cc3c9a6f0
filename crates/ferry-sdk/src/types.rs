//! Type definitions shared by every context
//!
//! A context's type universe is a table of [`TypeRef`]s. Each `TypeRef` is an
//! `Arc` handle whose identity is pointer identity: two contexts that both
//! define `app.Greeter` hold two distinct types that merely share a name.
//! Types in the `core` namespace are the exception; they exist once and are
//! visible from every context.
//!
//! Method tables are registered through the builders in this module instead
//! of being discovered at runtime.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use once_cell::sync::{Lazy, OnceCell};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::context::ContextId;
use crate::error::{BridgeError, BridgeResult};
use crate::exception::MaterializationStrategy;
use crate::object::{CallFrame, MethodBody};
use crate::value::Value;
use crate::Fault;

/// Root of the shared base namespace
pub const CORE_NAMESPACE: &str = "core";

/// Qualified names of the builtin core types
pub mod names {
    /// Boolean primitive
    pub const BOOL: &str = "core.Bool";
    /// 32-bit integer primitive
    pub const I32: &str = "core.I32";
    /// 64-bit integer primitive
    pub const I64: &str = "core.I64";
    /// 64-bit float primitive
    pub const F64: &str = "core.F64";
    /// String
    pub const STRING: &str = "core.String";
    /// Top type; every value conforms to it
    pub const ANY: &str = "core.Any";
    /// Type handles
    pub const TYPE: &str = "core.Type";
    /// Ordered sequences
    pub const LIST: &str = "core.List";
    /// Unique sets
    pub const SET: &str = "core.Set";
    /// Key/value maps
    pub const MAP: &str = "core.Map";
    /// Base exception type
    pub const ERROR: &str = "core.Error";
    /// Invalid argument exception
    pub const ARGUMENT_ERROR: &str = "core.ArgumentError";
    /// Invalid state exception
    pub const STATE_ERROR: &str = "core.StateError";
    /// Unsupported operation exception
    pub const UNSUPPORTED_ERROR: &str = "core.UnsupportedError";
}

/// Check if a qualified name belongs to the shared base namespace
pub fn is_core_name(name: &str) -> bool {
    name.strip_prefix(CORE_NAMESPACE)
        .is_some_and(|rest| rest.starts_with('.'))
}

// ============================================================================
// Kinds
// ============================================================================

/// Scalar primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Boolean
    Bool,
    /// 32-bit signed integer
    I32,
    /// 64-bit signed integer
    I64,
    /// 64-bit float
    F64,
    /// String
    String,
}

/// Non-scalar builtin core types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// Top type
    Any,
    /// Type handle
    Type,
    /// Ordered sequence
    List,
    /// Unique set
    Set,
    /// Key/value map
    Map,
}

/// Method visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    /// Forwardable across contexts
    #[default]
    Public,
    /// Reachable only through `invoke_any`
    Private,
}

/// Where a type was defined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    /// Shared base namespace, identical in every context
    Core,
    /// Defined by one context
    Context(ContextId),
}

// ============================================================================
// Methods
// ============================================================================

/// Method signature. Parameter and return types are qualified names,
/// resolved in whichever context the signature is read from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSig {
    name: String,
    params: Vec<String>,
    returns: String,
    visibility: Visibility,
}

impl MethodSig {
    /// Create a public method signature
    pub fn new<P, S>(name: impl Into<String>, params: P, returns: impl Into<String>) -> Self
    where
        P: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            params: params.into_iter().map(Into::into).collect(),
            returns: returns.into(),
            visibility: Visibility::Public,
        }
    }

    /// Mark the method private
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    /// Method name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Qualified parameter type names
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Qualified return type name
    pub fn returns(&self) -> &str {
        &self.returns
    }

    /// Visibility
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Check if the method is public
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Number of parameters
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Check name and parameter types, ignoring return type and visibility
    pub fn matches(&self, name: &str, params: &[String]) -> bool {
        self.name == name && self.params == params
    }
}

impl fmt::Display for MethodSig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}): {}", self.name, self.params.join(", "), self.returns)
    }
}

/// Concrete method: a signature plus its registered body
#[derive(Clone)]
pub struct Method {
    sig: MethodSig,
    body: MethodBody,
}

impl Method {
    /// Signature
    pub fn sig(&self) -> &MethodSig {
        &self.sig
    }

    /// Run the body
    pub fn run(&self, frame: &CallFrame<'_>) -> Result<Value, Fault> {
        (self.body)(frame)
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method").field("sig", &self.sig).finish_non_exhaustive()
    }
}

// ============================================================================
// Type definitions
// ============================================================================

/// Interface: method signatures only
#[derive(Debug, Clone, Default)]
pub struct InterfaceDef {
    extends: Vec<String>,
    methods: Vec<MethodSig>,
}

impl InterfaceDef {
    /// Start an interface declaration
    pub fn builder(name: impl Into<String>) -> InterfaceBuilder {
        InterfaceBuilder {
            name: name.into(),
            def: InterfaceDef::default(),
        }
    }

    /// Names of directly extended interfaces
    pub fn extends(&self) -> &[String] {
        &self.extends
    }

    /// Declared methods
    pub fn methods(&self) -> &[MethodSig] {
        &self.methods
    }
}

/// Builder for [`InterfaceDef`]
pub struct InterfaceBuilder {
    name: String,
    def: InterfaceDef,
}

impl InterfaceBuilder {
    /// Extend another interface
    pub fn extends(mut self, name: impl Into<String>) -> Self {
        self.def.extends.push(name.into());
        self
    }

    /// Declare a method
    pub fn method(mut self, sig: MethodSig) -> Self {
        self.def.methods.push(sig);
        self
    }
}

impl From<InterfaceBuilder> for TypeDecl {
    fn from(b: InterfaceBuilder) -> Self {
        TypeDecl {
            name: b.name,
            kind: TypeKind::Interface(b.def),
        }
    }
}

/// Class: implemented interfaces, declared fields and method bodies
#[derive(Debug, Clone, Default)]
pub struct ClassDef {
    superclass: Option<String>,
    interfaces: Vec<String>,
    fields: Vec<String>,
    methods: Vec<Method>,
}

impl ClassDef {
    /// Start a class declaration
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder {
            name: name.into(),
            def: ClassDef::default(),
        }
    }

    /// Superclass name
    pub fn superclass(&self) -> Option<&str> {
        self.superclass.as_deref()
    }

    /// Names of directly implemented interfaces
    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    /// Declared field names
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Methods declared on this class (not inherited ones)
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }
}

/// Builder for [`ClassDef`]
pub struct ClassBuilder {
    name: String,
    def: ClassDef,
}

impl ClassBuilder {
    /// Set the superclass
    pub fn extends(mut self, name: impl Into<String>) -> Self {
        self.def.superclass = Some(name.into());
        self
    }

    /// Implement an interface
    pub fn implements(mut self, name: impl Into<String>) -> Self {
        self.def.interfaces.push(name.into());
        self
    }

    /// Declare a field
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.def.fields.push(name.into());
        self
    }

    /// Register a method body
    pub fn method<F>(mut self, sig: MethodSig, body: F) -> Self
    where
        F: Fn(&CallFrame<'_>) -> Result<Value, Fault> + Send + Sync + 'static,
    {
        self.def.methods.push(Method {
            sig,
            body: Arc::new(body),
        });
        self
    }
}

impl From<ClassBuilder> for TypeDecl {
    fn from(b: ClassBuilder) -> Self {
        TypeDecl {
            name: b.name,
            kind: TypeKind::Class(b.def),
        }
    }
}

/// Enumerated type: ordered member names
#[derive(Debug, Clone, Default)]
pub struct EnumDef {
    members: Vec<String>,
    names: OnceCell<FxHashSet<String>>,
}

impl EnumDef {
    /// Start an enum declaration
    pub fn builder(name: impl Into<String>) -> EnumBuilder {
        EnumBuilder {
            name: name.into(),
            def: EnumDef::default(),
        }
    }

    /// Member names in ordinal order
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Member names as a set (computed once)
    pub fn member_names(&self) -> &FxHashSet<String> {
        self.names
            .get_or_init(|| self.members.iter().cloned().collect())
    }
}

/// Builder for [`EnumDef`]
pub struct EnumBuilder {
    name: String,
    def: EnumDef,
}

impl EnumBuilder {
    /// Append members
    pub fn members<I, S>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.def.members.extend(members.into_iter().map(Into::into));
        self
    }
}

impl From<EnumBuilder> for TypeDecl {
    fn from(b: EnumBuilder) -> Self {
        TypeDecl {
            name: b.name,
            kind: TypeKind::Enum(b.def),
        }
    }
}

/// Exception type: the constructor shapes it supports
#[derive(Debug, Clone, Default)]
pub struct ExceptionDef {
    parent: Option<String>,
    strategies: Vec<MaterializationStrategy>,
}

impl ExceptionDef {
    /// Start an exception declaration. Without explicit constructors the
    /// type supports all three shapes.
    pub fn builder(name: impl Into<String>) -> ExceptionBuilder {
        ExceptionBuilder {
            name: name.into(),
            def: ExceptionDef::default(),
        }
    }

    /// Parent exception type name
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Supported constructor shapes
    pub fn strategies(&self) -> &[MaterializationStrategy] {
        &self.strategies
    }

    /// Check if a constructor shape is available
    pub fn supports(&self, strategy: MaterializationStrategy) -> bool {
        self.strategies.contains(&strategy)
    }
}

/// Builder for [`ExceptionDef`]
pub struct ExceptionBuilder {
    name: String,
    def: ExceptionDef,
}

impl ExceptionBuilder {
    /// Set the parent exception type
    pub fn extends(mut self, name: impl Into<String>) -> Self {
        self.def.parent = Some(name.into());
        self
    }

    /// Declare an available constructor shape
    pub fn constructor(mut self, strategy: MaterializationStrategy) -> Self {
        if !self.def.strategies.contains(&strategy) {
            self.def.strategies.push(strategy);
        }
        self
    }
}

impl From<ExceptionBuilder> for TypeDecl {
    fn from(mut b: ExceptionBuilder) -> Self {
        if b.def.strategies.is_empty() {
            b.def.strategies = MaterializationStrategy::PREFERENCE.to_vec();
        }
        TypeDecl {
            name: b.name,
            kind: TypeKind::Exception(b.def),
        }
    }
}

/// Synthesized type of a bridge proxy
#[derive(Debug, Clone)]
pub struct ProxyDef {
    capability: TypeRef,
    methods: Vec<MethodSig>,
}

impl ProxyDef {
    /// Create a proxy type description
    pub fn new(capability: TypeRef, methods: Vec<MethodSig>) -> Self {
        Self {
            capability,
            methods,
        }
    }

    /// The implemented capability interface
    pub fn capability(&self) -> &TypeRef {
        &self.capability
    }

    /// Every method of the capability, inherited ones included
    pub fn methods(&self) -> &[MethodSig] {
        &self.methods
    }
}

/// Structural category of a type
#[derive(Debug, Clone)]
pub enum TypeKind {
    /// Scalar primitive
    Primitive(Primitive),
    /// Builtin core type
    Builtin(Builtin),
    /// Interface
    Interface(InterfaceDef),
    /// Class
    Class(ClassDef),
    /// Enum
    Enum(EnumDef),
    /// Exception
    Exception(ExceptionDef),
    /// Bridge proxy
    Proxy(ProxyDef),
}

impl TypeKind {
    /// Short kind name
    pub fn label(&self) -> &'static str {
        match self {
            TypeKind::Primitive(_) => "primitive",
            TypeKind::Builtin(_) => "builtin",
            TypeKind::Interface(_) => "interface",
            TypeKind::Class(_) => "class",
            TypeKind::Enum(_) => "enum",
            TypeKind::Exception(_) => "exception",
            TypeKind::Proxy(_) => "proxy",
        }
    }
}

/// A named type declaration not yet bound to a context
#[derive(Debug, Clone)]
pub struct TypeDecl {
    name: String,
    kind: TypeKind,
}

impl TypeDecl {
    /// Create a declaration directly from a kind
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Qualified name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn bind(self, origin: Origin) -> TypeRef {
        TypeRef(Arc::new(TypeDef {
            name: self.name,
            origin,
            kind: self.kind,
        }))
    }
}

/// A type as seen by one context
#[derive(Debug)]
pub struct TypeDef {
    name: String,
    origin: Origin,
    kind: TypeKind,
}

// ============================================================================
// TypeRef
// ============================================================================

/// Shared handle to a [`TypeDef`]. Equality is identity.
#[derive(Clone)]
pub struct TypeRef(Arc<TypeDef>);

impl TypeRef {
    /// Create a type in the shared base namespace, importable into any
    /// number of contexts without losing identity.
    pub fn shared(decl: impl Into<TypeDecl>) -> BridgeResult<TypeRef> {
        let decl = decl.into();
        if !is_core_name(&decl.name) {
            return Err(BridgeError::InvalidDefinition(format!(
                "shared type '{}' must live in the '{}' namespace",
                decl.name, CORE_NAMESPACE
            )));
        }
        if core_type(&decl.name).is_some() {
            return Err(BridgeError::InvalidDefinition(format!(
                "'{}' is a builtin core type",
                decl.name
            )));
        }
        Ok(decl.bind(Origin::Core))
    }

    /// Create an unregistered type owned by a context (used for synthesized
    /// proxy types)
    pub fn synthesized(name: impl Into<String>, owner: ContextId, kind: TypeKind) -> TypeRef {
        TypeDecl::new(name, kind).bind(Origin::Context(owner))
    }

    /// Qualified name
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Origin
    pub fn origin(&self) -> Origin {
        self.0.origin
    }

    /// Structural kind
    pub fn kind(&self) -> &TypeKind {
        &self.0.kind
    }

    /// Check if the type is shared by every context
    pub fn is_core(&self) -> bool {
        self.0.origin == Origin::Core
    }

    /// Check if the type is an interface
    pub fn is_interface(&self) -> bool {
        matches!(self.0.kind, TypeKind::Interface(_))
    }

    /// Primitive kind, if scalar
    pub fn primitive(&self) -> Option<Primitive> {
        match self.0.kind {
            TypeKind::Primitive(p) => Some(p),
            _ => None,
        }
    }

    /// Builtin kind, if any
    pub fn builtin(&self) -> Option<Builtin> {
        match self.0.kind {
            TypeKind::Builtin(b) => Some(b),
            _ => None,
        }
    }

    /// Interface definition
    pub fn as_interface(&self) -> Option<&InterfaceDef> {
        match &self.0.kind {
            TypeKind::Interface(def) => Some(def),
            _ => None,
        }
    }

    /// Class definition
    pub fn as_class(&self) -> Option<&ClassDef> {
        match &self.0.kind {
            TypeKind::Class(def) => Some(def),
            _ => None,
        }
    }

    /// Enum definition
    pub fn as_enum(&self) -> Option<&EnumDef> {
        match &self.0.kind {
            TypeKind::Enum(def) => Some(def),
            _ => None,
        }
    }

    /// Exception definition
    pub fn as_exception(&self) -> Option<&ExceptionDef> {
        match &self.0.kind {
            TypeKind::Exception(def) => Some(def),
            _ => None,
        }
    }

    /// Proxy definition
    pub fn as_proxy(&self) -> Option<&ProxyDef> {
        match &self.0.kind {
            TypeKind::Proxy(def) => Some(def),
            _ => None,
        }
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.0).hash(state);
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.origin {
            Origin::Core => write!(f, "TypeRef({})", self.0.name),
            Origin::Context(id) => write!(f, "TypeRef({}@{})", self.0.name, id.as_u64()),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

// ============================================================================
// Core registry
// ============================================================================

static CORE_TYPES: Lazy<FxHashMap<String, TypeRef>> = Lazy::new(|| {
    use MaterializationStrategy::*;

    let mut decls = vec![
        TypeDecl::new(names::BOOL, TypeKind::Primitive(Primitive::Bool)),
        TypeDecl::new(names::I32, TypeKind::Primitive(Primitive::I32)),
        TypeDecl::new(names::I64, TypeKind::Primitive(Primitive::I64)),
        TypeDecl::new(names::F64, TypeKind::Primitive(Primitive::F64)),
        TypeDecl::new(names::STRING, TypeKind::Primitive(Primitive::String)),
        TypeDecl::new(names::ANY, TypeKind::Builtin(Builtin::Any)),
        TypeDecl::new(names::TYPE, TypeKind::Builtin(Builtin::Type)),
        TypeDecl::new(names::LIST, TypeKind::Builtin(Builtin::List)),
        TypeDecl::new(names::SET, TypeKind::Builtin(Builtin::Set)),
        TypeDecl::new(names::MAP, TypeKind::Builtin(Builtin::Map)),
    ];
    decls.push(ExceptionDef::builder(names::ERROR).into());
    decls.push(ExceptionDef::builder(names::ARGUMENT_ERROR).extends(names::ERROR).into());
    decls.push(
        ExceptionDef::builder(names::STATE_ERROR)
            .extends(names::ERROR)
            .constructor(MessageArg)
            .constructor(NoArg)
            .into(),
    );
    decls.push(
        ExceptionDef::builder(names::UNSUPPORTED_ERROR)
            .extends(names::ERROR)
            .constructor(MessageArg)
            .constructor(NoArg)
            .into(),
    );

    decls
        .into_iter()
        .map(|decl| (decl.name.clone(), decl.bind(Origin::Core)))
        .collect()
});

/// Look up a builtin core type by qualified name
pub fn core_type(name: &str) -> Option<TypeRef> {
    CORE_TYPES.get(name).cloned()
}

/// Look up a builtin core type that is known to exist
pub(crate) fn builtin(name: &str) -> TypeRef {
    match CORE_TYPES.get(name) {
        Some(ty) => ty.clone(),
        None => unreachable!("builtin core type {name} is always registered"),
    }
}
