//! Proxy synthesis
//!
//! A [`BridgeProxy`] is an object of the guest context that implements one
//! guest capability interface and forwards every call to a delegate living
//! in the host context.
//!
//! Each capability method is matched against the delegate's public methods
//! once, when the proxy is built. A method that cannot be matched does not
//! prevent the proxy from being created; the failure is kept in the dispatch
//! table and returned when that method is called.
//!
//! ## Helpers
//!
//! ```rust,ignore
//! if let Some(proxy) = try_unwrap_proxy(&value) {
//!     // proxy.delegate() is the host object
//! }
//! let innermost = unwrap_proxy_deep(&value);
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use ferry_sdk::{
    BridgeError, BridgeResult, Context, Fault, Instance, MethodSig, ObjectRef, ProxyDef, TypeKind,
    TypeRef, Value,
};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::invoke;
use crate::options::BridgeOptions;

/// Suffix appended to the capability name to name a proxy type
pub const PROXY_SUFFIX: &str = "$Proxy";

/// Guest signature to the host signature it forwards to
pub(crate) type DispatchTable = FxHashMap<MethodSig, BridgeResult<MethodSig>>;

/// Guest-side object forwarding to a host-side delegate
pub struct BridgeProxy {
    ty: TypeRef,
    capability: TypeRef,
    delegate: ObjectRef,
    host: Arc<Context>,
    guest: Arc<Context>,
    options: BridgeOptions,
    dispatch: DispatchTable,
}

impl BridgeProxy {
    /// Guest capability interface
    pub fn capability(&self) -> &TypeRef {
        &self.capability
    }

    /// Host object calls are forwarded to
    pub fn delegate(&self) -> &ObjectRef {
        &self.delegate
    }

    /// Context the delegate lives in
    pub fn host(&self) -> &Arc<Context> {
        &self.host
    }

    /// Context the proxy lives in
    pub fn guest(&self) -> &Arc<Context> {
        &self.guest
    }

    /// Options the proxy was built with
    pub fn options(&self) -> &BridgeOptions {
        &self.options
    }

    /// Host method a guest signature is bound to
    pub fn binding(&self, method: &MethodSig) -> Option<&BridgeResult<MethodSig>> {
        self.dispatch.get(method)
    }
}

impl Instance for BridgeProxy {
    fn runtime_type(&self) -> &TypeRef {
        &self.ty
    }

    fn context(&self) -> &Arc<Context> {
        &self.guest
    }

    fn call(&self, method: &MethodSig, args: Vec<Value>) -> Result<Value, Fault> {
        invoke::forward(self, method, args)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl fmt::Debug for BridgeProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeProxy")
            .field("capability", &self.capability)
            .field("delegate", &self.delegate.runtime_type())
            .field("host", &self.host.name())
            .field("guest", &self.guest.name())
            .finish()
    }
}

// ============================================================================
// Synthesis
// ============================================================================

/// Create a proxy with default options.
///
/// `capability` is an interface of `guest`; `delegate` must live in `host`.
pub fn create_proxy(
    delegate: ObjectRef,
    capability: &TypeRef,
    host: &Arc<Context>,
    guest: &Arc<Context>,
) -> BridgeResult<ObjectRef> {
    create_proxy_with(delegate, capability, host, guest, &BridgeOptions::default())
}

/// Create a proxy
pub fn create_proxy_with(
    delegate: ObjectRef,
    capability: &TypeRef,
    host: &Arc<Context>,
    guest: &Arc<Context>,
    options: &BridgeOptions,
) -> BridgeResult<ObjectRef> {
    if !capability.is_interface() {
        return Err(BridgeError::UnsupportedCapability(
            capability.name().to_string(),
        ));
    }
    if delegate.context().id() != host.id() {
        return Err(BridgeError::ContextMismatch {
            type_name: delegate.runtime_type().name().to_string(),
            expected: host.name().to_string(),
            found: delegate.context().name().to_string(),
        });
    }
    host.resolve_type(capability.name())?;

    let methods = guest.methods_of(capability)?;
    let dispatch: DispatchTable = methods
        .iter()
        .map(|sig| (sig.clone(), bind_method(sig, &delegate, host)))
        .collect();

    debug!(
        capability = %capability.name(),
        delegate = %delegate.runtime_type().name(),
        host = %host.name(),
        guest = %guest.name(),
        methods = methods.len(),
        unbound = dispatch.values().filter(|binding| binding.is_err()).count(),
        "synthesized proxy"
    );

    let ty = TypeRef::synthesized(
        format!("{}{}", capability.name(), PROXY_SUFFIX),
        guest.id(),
        TypeKind::Proxy(ProxyDef::new(capability.clone(), methods)),
    );

    Ok(Arc::new(BridgeProxy {
        ty,
        capability: capability.clone(),
        delegate,
        host: host.clone(),
        guest: guest.clone(),
        options: options.clone(),
        dispatch,
    }))
}

/// Find the delegate's public method matching a guest signature: same name,
/// same parameter count, and parameter types naming the same types once
/// resolved in the host context
fn bind_method(sig: &MethodSig, delegate: &ObjectRef, host: &Context) -> BridgeResult<MethodSig> {
    let params = sig
        .params()
        .iter()
        .map(|param| host.resolve_type(param).map(|ty| ty.name().to_string()))
        .collect::<BridgeResult<Vec<String>>>()?;

    let owner = delegate.runtime_type();
    let candidates: Vec<MethodSig> = host
        .methods_of(owner)?
        .into_iter()
        .filter(|m| m.name() == sig.name() && m.is_public())
        .collect();
    if candidates.is_empty() {
        return Err(BridgeError::MethodResolution {
            method: sig.name().to_string(),
            type_name: owner.name().to_string(),
        });
    }
    if !candidates.iter().any(|m| m.arity() == sig.arity()) {
        let mut expected: Vec<usize> = candidates.iter().map(MethodSig::arity).collect();
        expected.sort_unstable();
        expected.dedup();
        return Err(BridgeError::ArityMismatch {
            method: sig.name().to_string(),
            type_name: owner.name().to_string(),
            expected,
            got: sig.arity(),
        });
    }
    candidates
        .into_iter()
        .find(|m| m.params() == params.as_slice())
        .ok_or_else(|| BridgeError::MethodResolution {
            method: sig.to_string(),
            type_name: owner.name().to_string(),
        })
}

// ============================================================================
// Helpers
// ============================================================================

/// Check if a value is a proxy and return it
pub fn try_unwrap_proxy(value: &Value) -> Option<&BridgeProxy> {
    value.as_object()?.as_any().downcast_ref::<BridgeProxy>()
}

/// Check if a value is a proxy
pub fn is_proxy(value: &Value) -> bool {
    try_unwrap_proxy(value).is_some()
}

/// Get the delegate behind a proxy, or the original value if not a proxy
pub fn unwrap_proxy_target(value: &Value) -> Value {
    match try_unwrap_proxy(value) {
        Some(proxy) => Value::Object(proxy.delegate().clone()),
        None => value.clone(),
    }
}

/// Unwrap nested proxies down to the innermost delegate
pub fn unwrap_proxy_deep(value: &Value) -> Value {
    let mut current = value.clone();
    while let Some(delegate) = try_unwrap_proxy(&current).map(|p| p.delegate().clone()) {
        current = Value::Object(delegate);
    }
    current
}
