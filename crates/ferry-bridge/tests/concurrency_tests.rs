//! Concurrent Call Tests
//!
//! A proxy holds no per-call state, so one proxy may serve many threads.

mod common;

use std::thread;

use common::*;
use ferry_bridge::create_proxy;
use ferry_sdk::{Instance, Value};
use parking_lot::Mutex;

const THREADS: usize = 8;
const CALLS: usize = 200;

#[test]
fn test_shared_proxy_across_threads() {
    let (host, guest) = pair();
    let greeter = guest.resolve_type(GREETER).unwrap();
    let proxy = create_proxy(host_object(&host, "app.GreeterImpl"), &greeter, &host, &guest).unwrap();
    let failures = Mutex::new(Vec::new());

    thread::scope(|s| {
        for t in 0..THREADS {
            let proxy = &proxy;
            let failures = &failures;
            s.spawn(move || {
                for i in 0..CALLS {
                    let name = format!("t{}-{}", t, i);
                    match proxy.invoke("greet", vec![Value::from(name.as_str())]) {
                        Ok(out) if out == Value::from(format!("hi {}", name)) => {}
                        other => failures.lock().push(format!("{}: {:?}", name, other)),
                    }
                }
            });
        }
    });

    assert!(failures.lock().is_empty(), "{:?}", failures.lock());
}

#[test]
fn test_exceptions_across_threads() {
    let (host, guest) = pair();
    let failing = guest.resolve_type(FAILING).unwrap();
    let proxy = create_proxy(host_object(&host, "app.FailingImpl"), &failing, &host, &guest).unwrap();
    let not_found = guest.resolve_type(NOT_FOUND).unwrap();
    let seen = Mutex::new(0usize);

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                for _ in 0..CALLS / 4 {
                    let fault = proxy.invoke("fail", vec![Value::from("x")]).unwrap_err();
                    assert_eq!(fault.exception().unwrap().ty(), &not_found);
                    *seen.lock() += 1;
                }
            });
        }
    });

    assert_eq!(*seen.lock(), THREADS * (CALLS / 4));
}

#[test]
fn test_nested_proxies_created_concurrently() {
    let (host, guest) = pair();
    let palette = guest.resolve_type(PALETTE).unwrap();
    let proxy = create_proxy(host_object(&host, "app.PaletteImpl"), &palette, &host, &guest).unwrap();

    thread::scope(|s| {
        for t in 0..THREADS {
            let proxy = &proxy;
            s.spawn(move || {
                let prefix = format!("p{}", t);
                let greeter = proxy.invoke("greeter", vec![Value::from(prefix.as_str())]).unwrap();
                let greeter = greeter.as_object().unwrap();
                assert_eq!(
                    greeter.invoke("greet", vec![Value::from("z")]).unwrap(),
                    Value::from(format!("{} z", prefix))
                );
            });
        }
    });
}
