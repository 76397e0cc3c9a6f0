//! Forwarding of intercepted calls
//!
//! One call on a proxy:
//! - look up the host method bound to the guest signature
//! - translate arguments guest to host, each against its host parameter type
//! - call the delegate
//! - translate the result host to guest, or materialize a thrown exception
//!   in the guest context
//!
//! Bridge errors raised anywhere along the way are returned unchanged.

use ferry_sdk::{BridgeError, Fault, Instance, MethodSig, Value};
use tracing::trace;

use crate::materialize::materialize;
use crate::proxy::BridgeProxy;
use crate::translate::translate_with;

pub(crate) fn forward(
    proxy: &BridgeProxy,
    method: &MethodSig,
    args: Vec<Value>,
) -> Result<Value, Fault> {
    let host_method = match proxy.binding(method) {
        Some(Ok(bound)) => bound,
        Some(Err(e)) => return Err(e.clone().into()),
        None => {
            return Err(BridgeError::MethodResolution {
                method: method.to_string(),
                type_name: proxy.runtime_type().name().to_string(),
            }
            .into())
        }
    };
    if args.len() != host_method.arity() {
        return Err(BridgeError::ArityMismatch {
            method: method.name().to_string(),
            type_name: proxy.runtime_type().name().to_string(),
            expected: vec![host_method.arity()],
            got: args.len(),
        }
        .into());
    }

    let host = proxy.host();
    let guest = proxy.guest();
    let options = proxy.options();

    trace!(
        method = %method,
        capability = %proxy.capability().name(),
        from = %guest.name(),
        to = %host.name(),
        "forwarding call"
    );

    let host_args = args
        .iter()
        .zip(host_method.params())
        .map(|(arg, param)| {
            let expected = host.lookup(param);
            translate_with(arg, guest, host, expected.as_ref(), options)
        })
        .collect::<Result<Vec<Value>, BridgeError>>()?;

    match proxy.delegate().call(host_method, host_args) {
        Ok(result) => Ok(translate_with(&result, host, guest, None, options)?),
        Err(Fault::Thrown(e)) => materialize(e, guest, options.exception_hook.as_ref()),
        Err(fault) => Err(fault),
    }
}
