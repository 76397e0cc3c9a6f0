//! Contexts: isolated type universes
//!
//! Each [`Context`] owns a table of types keyed by qualified name. Two
//! contexts may define the same names; the types stay distinct. Names in the
//! `core` namespace resolve to the shared core types from any context.
//!
//! A context is assembled once with [`ContextBuilder`] and never changes
//! afterwards, so it can be shared freely behind an `Arc`.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::classify;
use crate::enums;
use crate::error::{BridgeError, BridgeResult};
use crate::exception::Exception;
use crate::types::{
    core_type, is_core_name, names, Method, MethodSig, Origin, TypeDecl, TypeKind, TypeRef,
};
use crate::value::{EnumValue, Value};

/// Unique identifier for a Context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

impl ContextId {
    /// Create a new unique context ID
    pub fn new() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        ContextId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Assembles the type table of a new context
pub struct ContextBuilder {
    name: String,
    decls: Vec<TypeDecl>,
    shared: Vec<TypeRef>,
}

impl ContextBuilder {
    /// Start a context with a display name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            decls: Vec::new(),
            shared: Vec::new(),
        }
    }

    /// Define a type owned by this context
    pub fn define(mut self, decl: impl Into<TypeDecl>) -> Self {
        self.decls.push(decl.into());
        self
    }

    /// Make a shared core type resolvable from this context
    pub fn share(mut self, ty: &TypeRef) -> Self {
        self.shared.push(ty.clone());
        self
    }

    /// Bind every declaration and check that all referenced names resolve
    pub fn build(self) -> BridgeResult<Arc<Context>> {
        let id = ContextId::new();
        let mut types: FxHashMap<String, TypeRef> = FxHashMap::default();

        for decl in self.decls {
            if is_core_name(decl.name()) {
                return Err(BridgeError::InvalidDefinition(format!(
                    "'{}' is in the core namespace; create it with TypeRef::shared",
                    decl.name()
                )));
            }
            let ty = decl.bind(Origin::Context(id));
            if types.insert(ty.name().to_string(), ty.clone()).is_some() {
                return Err(duplicate(&self.name, ty.name()));
            }
        }
        for ty in self.shared {
            if !ty.is_core() {
                return Err(BridgeError::InvalidDefinition(format!(
                    "'{}' belongs to another context and cannot be shared",
                    ty.name()
                )));
            }
            if core_type(ty.name()).is_some() {
                continue;
            }
            if let Some(existing) = types.insert(ty.name().to_string(), ty.clone()) {
                if existing != ty {
                    return Err(duplicate(&self.name, ty.name()));
                }
            }
        }

        let context = Context {
            id,
            name: self.name,
            types,
        };
        context.validate()?;
        Ok(Arc::new(context))
    }
}

fn duplicate(context: &str, name: &str) -> BridgeError {
    BridgeError::InvalidDefinition(format!(
        "type '{}' defined twice in context '{}'",
        name, context
    ))
}

// ============================================================================
// Context
// ============================================================================

/// An isolated type universe
pub struct Context {
    id: ContextId,
    name: String,
    types: FxHashMap<String, TypeRef>,
}

impl Context {
    /// Get the context ID
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve a type by qualified name
    pub fn resolve_type(&self, name: &str) -> BridgeResult<TypeRef> {
        self.lookup(name).ok_or_else(|| BridgeError::TypeResolution {
            name: name.to_string(),
            context: self.name.clone(),
        })
    }

    /// Resolve a type by qualified name, if present
    pub fn lookup(&self, name: &str) -> Option<TypeRef> {
        core_type(name).or_else(|| self.types.get(name).cloned())
    }

    /// Check if a type is shared by all contexts and passes through
    /// translation untouched
    pub fn is_core_type(&self, ty: &TypeRef) -> bool {
        ty.is_core()
    }

    /// Check if a type was defined by this context
    pub fn owns(&self, ty: &TypeRef) -> bool {
        ty.origin() == Origin::Context(self.id)
    }

    /// Types registered in this context (builtin core types excluded)
    pub fn types(&self) -> impl Iterator<Item = &TypeRef> {
        self.types.values()
    }

    /// A class followed by its superclasses
    pub fn superclass_chain(&self, class: &TypeRef) -> BridgeResult<Vec<TypeRef>> {
        let mut chain = vec![class.clone()];
        let mut current = class.clone();
        while let Some(parent) = current.as_class().and_then(|def| def.superclass()) {
            let parent = self.resolve_type(parent)?;
            if chain.contains(&parent) {
                return Err(BridgeError::InvalidDefinition(format!(
                    "inheritance cycle through '{}'",
                    parent.name()
                )));
            }
            chain.push(parent.clone());
            current = parent;
        }
        Ok(chain)
    }

    /// Every interface a type implements, inherited ones included.
    /// For an interface this is its super-interfaces.
    pub fn all_interfaces(&self, ty: &TypeRef) -> BridgeResult<Vec<TypeRef>> {
        let mut out = Vec::new();
        match ty.kind() {
            TypeKind::Class(_) => {
                for class in self.superclass_chain(ty)? {
                    if let Some(def) = class.as_class() {
                        for name in def.interfaces() {
                            let iface = self.resolve_type(name)?;
                            self.collect_interface(&iface, &mut out)?;
                        }
                    }
                }
            }
            TypeKind::Interface(def) => {
                for name in def.extends() {
                    let iface = self.resolve_type(name)?;
                    self.collect_interface(&iface, &mut out)?;
                }
            }
            TypeKind::Proxy(def) => self.collect_interface(def.capability(), &mut out)?,
            _ => {}
        }
        Ok(out)
    }

    fn collect_interface(&self, iface: &TypeRef, out: &mut Vec<TypeRef>) -> BridgeResult<()> {
        if out.contains(iface) {
            return Ok(());
        }
        out.push(iface.clone());
        if let Some(def) = iface.as_interface() {
            for name in def.extends() {
                let parent = self.resolve_type(name)?;
                self.collect_interface(&parent, out)?;
            }
        }
        Ok(())
    }

    /// The single non-core interface of a type, which is the capability an
    /// object is addressed through when no target interface is given
    pub fn single_capability(&self, ty: &TypeRef) -> BridgeResult<TypeRef> {
        let mut domain: Vec<TypeRef> = self
            .all_interfaces(ty)?
            .into_iter()
            .filter(|iface| !self.is_core_type(iface))
            .collect();
        if domain.len() != 1 {
            return Err(BridgeError::AmbiguousCapability {
                type_name: ty.name().to_string(),
                found: domain.iter().map(|t| t.name().to_string()).collect(),
            });
        }
        Ok(domain.remove(0))
    }

    /// Declared fields of a class, superclass fields first
    pub fn fields_of(&self, class: &TypeRef) -> BridgeResult<Vec<String>> {
        let mut fields = Vec::new();
        for ty in self.superclass_chain(class)?.iter().rev() {
            if let Some(def) = ty.as_class() {
                for field in def.fields() {
                    if !fields.contains(field) {
                        fields.push(field.clone());
                    }
                }
            }
        }
        Ok(fields)
    }

    /// Every callable signature of a type. Overrides hide the signatures
    /// they replace.
    pub fn methods_of(&self, ty: &TypeRef) -> BridgeResult<Vec<MethodSig>> {
        let mut out: Vec<MethodSig> = Vec::new();
        let push = |sig: &MethodSig, out: &mut Vec<MethodSig>| {
            if !out.iter().any(|s| s.matches(sig.name(), sig.params())) {
                out.push(sig.clone());
            }
        };
        match ty.kind() {
            TypeKind::Class(_) => {
                for class in self.superclass_chain(ty)? {
                    if let Some(def) = class.as_class() {
                        for method in def.methods() {
                            push(method.sig(), &mut out);
                        }
                    }
                }
            }
            TypeKind::Interface(def) => {
                for sig in def.methods() {
                    push(sig, &mut out);
                }
                for parent in self.all_interfaces(ty)? {
                    if let Some(def) = parent.as_interface() {
                        for sig in def.methods() {
                            push(sig, &mut out);
                        }
                    }
                }
            }
            TypeKind::Proxy(def) => {
                for sig in def.methods() {
                    push(sig, &mut out);
                }
            }
            _ => {}
        }
        Ok(out)
    }

    /// Find a signature by exact name and parameter types
    pub fn find_method(
        &self,
        ty: &TypeRef,
        name: &str,
        params: &[String],
        include_private: bool,
    ) -> BridgeResult<Option<MethodSig>> {
        Ok(self
            .methods_of(ty)?
            .into_iter()
            .find(|sig| sig.matches(name, params) && (include_private || sig.is_public())))
    }

    /// Find the registered body for a class method
    pub fn find_impl(&self, class: &TypeRef, name: &str, params: &[String]) -> Option<Method> {
        let chain = self.superclass_chain(class).ok()?;
        chain.iter().find_map(|ty| {
            ty.as_class()?
                .methods()
                .iter()
                .find(|m| m.sig().matches(name, params))
                .cloned()
        })
    }

    /// Select an overload by name, then parameter count, then argument
    /// conformance
    pub fn select_method(
        &self,
        ty: &TypeRef,
        name: &str,
        args: &[Value],
        include_private: bool,
    ) -> BridgeResult<MethodSig> {
        let candidates: Vec<MethodSig> = self
            .methods_of(ty)?
            .into_iter()
            .filter(|sig| sig.name() == name && (include_private || sig.is_public()))
            .collect();
        if candidates.is_empty() {
            return Err(BridgeError::MethodResolution {
                method: name.to_string(),
                type_name: ty.name().to_string(),
            });
        }

        let same_arity: Vec<&MethodSig> = candidates
            .iter()
            .filter(|sig| sig.arity() == args.len())
            .collect();
        if same_arity.is_empty() {
            let mut expected: Vec<usize> = candidates.iter().map(MethodSig::arity).collect();
            expected.sort_unstable();
            expected.dedup();
            return Err(BridgeError::ArityMismatch {
                method: name.to_string(),
                type_name: ty.name().to_string(),
                expected,
                got: args.len(),
            });
        }

        same_arity
            .into_iter()
            .find(|sig| {
                sig.params()
                    .iter()
                    .zip(args)
                    .all(|(param, arg)| self.conforms(arg, param))
            })
            .cloned()
            .ok_or_else(|| BridgeError::MethodResolution {
                method: name.to_string(),
                type_name: ty.name().to_string(),
            })
    }

    /// Check if a value may be passed where the named type is declared
    pub fn conforms(&self, value: &Value, type_name: &str) -> bool {
        if type_name == names::ANY {
            return true;
        }
        match value {
            Value::Null => self
                .lookup(type_name)
                .is_some_and(|ty| !classify::is_non_nullable(&ty)),
            Value::Object(obj) => obj
                .context()
                .is_assignable(obj.runtime_type(), type_name),
            other => other.runtime_type().name() == type_name,
        }
    }

    /// Check if a type is the named type or one of its supertypes
    pub fn is_assignable(&self, ty: &TypeRef, target: &str) -> bool {
        if target == names::ANY || ty.name() == target {
            return true;
        }
        let supertypes = match ty.kind() {
            TypeKind::Class(_) => self
                .superclass_chain(ty)
                .into_iter()
                .flatten()
                .chain(self.all_interfaces(ty).into_iter().flatten())
                .collect::<Vec<_>>(),
            TypeKind::Interface(_) | TypeKind::Proxy(_) => {
                self.all_interfaces(ty).unwrap_or_default()
            }
            TypeKind::Exception(_) => self.exception_chain(ty),
            _ => Vec::new(),
        };
        supertypes.iter().any(|t| t.name() == target)
    }

    fn exception_chain(&self, ty: &TypeRef) -> Vec<TypeRef> {
        let mut chain = Vec::new();
        let mut seen = FxHashSet::default();
        let mut current = ty.as_exception().and_then(|def| def.parent()).map(str::to_string);
        while let Some(name) = current {
            if !seen.insert(name.clone()) {
                break;
            }
            let Some(parent) = self.lookup(&name) else {
                break;
            };
            current = parent.as_exception().and_then(|def| def.parent()).map(str::to_string);
            chain.push(parent);
        }
        chain
    }

    /// Runtime types of argument values, re-resolved by name in this context
    pub fn arg_types(&self, args: &[Value]) -> BridgeResult<Vec<TypeRef>> {
        args.iter()
            .map(|arg| self.resolve_type(arg.runtime_type().name()))
            .collect()
    }

    /// Look up an enum member by type and member name
    pub fn enum_value(&self, type_name: &str, member: &str) -> BridgeResult<EnumValue> {
        let ty = self.resolve_type(type_name)?;
        enums::lookup_by_name(&ty, member)
    }

    /// Create an exception of the named type with a message
    pub fn exception(&self, type_name: &str, message: impl Into<String>) -> BridgeResult<Exception> {
        let ty = self.resolve_type(type_name)?;
        if ty.as_exception().is_none() {
            return Err(BridgeError::mismatch(
                format!("exception type '{}'", type_name),
                ty.kind().label(),
            ));
        }
        Ok(Exception::new(ty, Some(message.into())))
    }

    fn validate(&self) -> BridgeResult<()> {
        for ty in self.types.values() {
            match ty.kind() {
                TypeKind::Interface(def) => {
                    for name in def.extends() {
                        self.expect_kind(ty, name, "interface", |t| t.is_interface())?;
                    }
                    for sig in def.methods() {
                        self.validate_sig(sig)?;
                    }
                    // walking the hierarchy once surfaces unresolved ancestors
                    self.all_interfaces(ty)?;
                }
                TypeKind::Class(def) => {
                    if let Some(parent) = def.superclass() {
                        self.expect_kind(ty, parent, "class", |t| t.as_class().is_some())?;
                    }
                    for name in def.interfaces() {
                        self.expect_kind(ty, name, "interface", |t| t.is_interface())?;
                    }
                    for method in def.methods() {
                        self.validate_sig(method.sig())?;
                    }
                    self.superclass_chain(ty)?;
                }
                TypeKind::Exception(def) => {
                    if let Some(parent) = def.parent() {
                        self.expect_kind(ty, parent, "exception", |t| t.as_exception().is_some())?;
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn validate_sig(&self, sig: &MethodSig) -> BridgeResult<()> {
        for name in sig.params() {
            self.resolve_type(name)?;
        }
        self.resolve_type(sig.returns())?;
        Ok(())
    }

    fn expect_kind(
        &self,
        owner: &TypeRef,
        name: &str,
        kind: &str,
        check: impl Fn(&TypeRef) -> bool,
    ) -> BridgeResult<()> {
        let ty = self.resolve_type(name)?;
        if check(&ty) {
            Ok(())
        } else {
            Err(BridgeError::InvalidDefinition(format!(
                "'{}' refers to '{}', which is not an {}",
                owner.name(),
                name,
                kind
            )))
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.id.as_u64())
            .field("name", &self.name)
            .field("types", &self.types.len())
            .finish()
    }
}
