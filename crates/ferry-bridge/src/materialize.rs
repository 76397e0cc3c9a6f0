//! Exception materialization
//!
//! A domain exception escaping the delegate belongs to the host context and
//! cannot be handed to guest code as is. The root cause of its chain is
//! rebuilt as the equally named exception type of the guest context, using
//! the first available constructor shape in
//! [`MaterializationStrategy::PREFERENCE`] order.

use ferry_sdk::{Context, Exception, Fault, MaterializationStrategy, Value};
use tracing::{debug, warn};

use crate::options::ExceptionHook;

/// Rebuild an escaped exception in `target` and deliver it.
///
/// With a hook, the hook's return value is the outcome. Without one, the
/// rebuilt exception is raised carrying the root cause's trace. If the root
/// cause cannot be rebuilt in `target`, `thrown` is raised unmodified.
pub fn materialize(
    thrown: Exception,
    target: &Context,
    hook: Option<&ExceptionHook>,
) -> Result<Value, Fault> {
    let root = thrown.root_cause();
    let Some((mut rebuilt, strategy)) = rebuild(root, target) else {
        warn!(
            exception = %root.type_name(),
            context = %target.name(),
            "cannot materialize exception, re-raising original"
        );
        return Err(Fault::Thrown(thrown));
    };

    debug!(
        exception = %rebuilt.type_name(),
        context = %target.name(),
        ?strategy,
        chain = thrown.chain_len(),
        "materialized exception"
    );

    match hook {
        Some(hook) => hook(rebuilt),
        None => {
            rebuilt.set_trace(root.trace().to_vec());
            Err(Fault::Thrown(rebuilt))
        }
    }
}

/// Construct the equivalent of `root` in `target`, or `None` when the type is
/// missing, is not an exception type, or declares no constructor
pub fn rebuild(root: &Exception, target: &Context) -> Option<(Exception, MaterializationStrategy)> {
    let ty = target.lookup(root.type_name())?;
    let def = ty.as_exception()?;
    let strategy = MaterializationStrategy::PREFERENCE
        .into_iter()
        .find(|strategy| def.supports(*strategy))?;

    let rebuilt = match strategy {
        MaterializationStrategy::CauseArg => {
            Exception::new(ty, Some(root.to_string())).with_cause(root.clone())
        }
        MaterializationStrategy::MessageArg => {
            Exception::new(ty, root.message().map(str::to_string))
        }
        MaterializationStrategy::NoArg => Exception::new(ty, None),
    };
    Some((rebuilt, strategy))
}
