//! Exception Translation Tests
//!
//! Exceptions escaping a host delegate, as seen by guest callers:
//! - root cause extraction from causal chains
//! - constructor shape fallback
//! - re-raising when the type is unknown to the guest
//! - exception hooks and their propagation to nested proxies

mod common;

use std::sync::Arc;

use common::*;
use ferry_bridge::{create_proxy, create_proxy_with, BridgeOptions};
use ferry_sdk::{names, Context, Exception, Fault, Instance, ObjectRef, Value};
use parking_lot::Mutex;

fn failing_proxy(options: &BridgeOptions) -> (ObjectRef, Arc<Context>, Arc<Context>) {
    let (host, guest) = pair();
    let failing = guest.resolve_type(FAILING).unwrap();
    let proxy = create_proxy_with(
        host_object(&host, "app.FailingImpl"),
        &failing,
        &host,
        &guest,
        options,
    )
    .unwrap();
    (proxy, host, guest)
}

// ===== Materialization =====

#[test]
fn test_root_cause_surfaces_in_guest() {
    let (proxy, host, guest) = failing_proxy(&BridgeOptions::default());
    let fault = proxy.invoke("fail", vec![Value::from("user 7")]).unwrap_err();
    let e = fault.exception().expect("domain exception");

    assert_eq!(e.ty(), &guest.resolve_type(NOT_FOUND).unwrap());
    assert_eq!(e.message(), Some("app.NotFound: user 7"));

    // cause-arg construction wraps the host root
    let cause = e.cause().unwrap();
    assert_eq!(cause.ty(), &host.resolve_type(NOT_FOUND).unwrap());
    assert_eq!(cause.message(), Some("user 7"));

    // the root's trace, extended by the frames it unwound through
    let methods: Vec<&str> = e.trace().iter().map(|f| f.method.as_str()).collect();
    assert_eq!(methods, ["lookup", "fail"]);
    assert!(e.trace().iter().all(|f| f.context == "host"));
}

#[test]
fn test_message_arg_for_core_exception() {
    let (proxy, _host, _guest) = failing_proxy(&BridgeOptions::default());
    let fault = proxy.invoke("deny", vec![]).unwrap_err();
    let e = fault.exception().unwrap();

    assert_eq!(e.type_name(), names::UNSUPPORTED_ERROR);
    assert_eq!(e.message(), Some("read only"));
    assert!(e.cause().is_none());
    assert_eq!(e.trace()[0].method, "deny");
}

#[test]
fn test_unknown_type_reraised_unchanged() {
    let (proxy, host, _guest) = failing_proxy(&BridgeOptions::default());
    let fault = proxy.invoke("leak", vec![]).unwrap_err();
    let e = fault.exception().unwrap();

    assert_eq!(e.ty(), &host.resolve_type(HOST_ONLY).unwrap());
    assert_eq!(e.message(), Some("internal"));
}

// ===== Hooks =====

#[test]
fn test_hook_value_becomes_result() {
    let seen: Arc<Mutex<Vec<String>>> = Arc::default();
    let log = seen.clone();
    let options = BridgeOptions::with_hook(move |e: Exception| {
        log.lock().push(e.to_string());
        Ok(Value::from(false))
    });
    let (proxy, _host, _guest) = failing_proxy(&options);

    assert_eq!(
        proxy.invoke("fail", vec![Value::from("id 1")]).unwrap(),
        Value::from(false)
    );
    assert_eq!(
        seen.lock().as_slice(),
        &["app.NotFound: app.NotFound: id 1".to_string()]
    );
}

#[test]
fn test_hook_may_raise() {
    let options = BridgeOptions::with_hook(|e: Exception| Err(e.into()));
    let (proxy, _host, guest) = failing_proxy(&options);
    let fault = proxy.invoke("fail", vec![Value::from("id 2")]).unwrap_err();
    let e = fault.exception().unwrap();
    assert_eq!(e.ty(), &guest.resolve_type(NOT_FOUND).unwrap());
    // the hook receives the exception before the trace is copied
    assert!(e.trace().is_empty());
}

#[test]
fn test_hook_skipped_for_unknown_type() {
    let calls: Arc<Mutex<usize>> = Arc::default();
    let counter = calls.clone();
    let options = BridgeOptions::with_hook(move |_| {
        *counter.lock() += 1;
        Ok(Value::Null)
    });
    let (proxy, _host, _guest) = failing_proxy(&options);

    assert!(proxy.invoke("leak", vec![]).is_err());
    assert_eq!(*calls.lock(), 0);
}

#[test]
fn test_nested_proxy_hook_propagation() {
    let (host, guest) = pair();
    let palette = guest.resolve_type(PALETTE).unwrap();
    let hook = |_: Exception| -> Result<Value, Fault> { Ok(Value::from("handled")) };

    // default: the nested proxy has no hook
    let proxy = create_proxy_with(
        host_object(&host, "app.PaletteImpl"),
        &palette,
        &host,
        &guest,
        &BridgeOptions::with_hook(hook),
    )
    .unwrap();
    let failing = proxy.invoke("failing", vec![]).unwrap();
    let failing = failing.as_object().unwrap();
    assert!(failing.invoke("deny", vec![]).unwrap_err().exception().is_some());

    // propagating: the nested proxy reuses the hook
    let proxy = create_proxy_with(
        host_object(&host, "app.PaletteImpl"),
        &palette,
        &host,
        &guest,
        &BridgeOptions::with_hook(hook).propagating(),
    )
    .unwrap();
    let failing = proxy.invoke("failing", vec![]).unwrap();
    let failing = failing.as_object().unwrap();
    assert_eq!(failing.invoke("deny", vec![]).unwrap(), Value::from("handled"));
}

#[test]
fn test_bridge_errors_are_not_exceptions() {
    let (host, guest) = pair();
    let greeter = guest.resolve_type(GREETER).unwrap();
    let proxy = create_proxy(host_object(&host, "app.GreeterImpl"), &greeter, &host, &guest).unwrap();
    let fault = proxy.invoke("greet", vec![Value::from(1)]).unwrap_err();
    assert!(fault.exception().is_none());
    assert!(fault.bridge_error().is_some());
}
