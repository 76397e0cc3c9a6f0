//! Ferry Bridge - cross-context invocation
//!
//! Lets code in one context (the guest) use an object living in another
//! context (the host) through an interface both contexts define under the
//! same name. The guest receives a proxy implementing its own copy of the
//! interface; every call on it is forwarded to the host object with
//! arguments, results and exceptions translated across the boundary.
//!
//! # Components
//!
//! - [`translate`]: value translation between contexts
//! - [`materialize`]: rebuilding escaped exceptions in the caller's context
//! - [`create_proxy`]: proxy synthesis
//! - forwarding of intercepted calls (internal, driven by [`BridgeProxy`])
//!
//! # Example
//!
//! ```ignore
//! use ferry_bridge::create_proxy;
//! use ferry_sdk::{Instance, Object, Value};
//!
//! let delegate = Object::instantiate(&host, "app.GreeterImpl")?;
//! let greeter = guest.resolve_type("app.Greeter")?;
//! let proxy = create_proxy(delegate, &greeter, &host, &guest)?;
//! assert_eq!(proxy.invoke("greet", vec!["Ann".into()])?, Value::from("hi Ann"));
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

mod invoke;
pub mod materialize;
pub mod options;
pub mod proxy;
pub mod translate;

pub use materialize::{materialize, rebuild};
pub use options::{BridgeOptions, ExceptionHook, DEFAULT_MAX_DEPTH};
pub use proxy::{
    create_proxy, create_proxy_with, is_proxy, try_unwrap_proxy, unwrap_proxy_deep,
    unwrap_proxy_target, BridgeProxy, PROXY_SUFFIX,
};
pub use translate::{translate, translate_with};
