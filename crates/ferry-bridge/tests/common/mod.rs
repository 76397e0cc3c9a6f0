//! Shared fixture: two contexts defining the same application types

#![allow(dead_code)]

use std::sync::Arc;

use ferry_sdk::{
    names, ClassBuilder, ClassDef, Context, ContextBuilder, EnumDef, EnumValue, Exception,
    ExceptionDef, Fault, Instance, InterfaceDef, MethodSig, Object, ObjectRef, TraceFrame, Value,
};

pub const GREETER: &str = "app.Greeter";
pub const CLOSER: &str = "app.Closer";
pub const PALETTE: &str = "app.Palette";
pub const FAILING: &str = "app.Failing";
pub const COLOR: &str = "app.Color";
pub const NOT_FOUND: &str = "app.NotFound";
pub const HOST_ONLY: &str = "app.HostOnly";

fn sig(name: &str, params: &[&str], returns: &str) -> MethodSig {
    MethodSig::new(name, params.iter().copied(), returns)
}

/// Context with every application type. `host_only` adds an exception type
/// the other side does not know.
pub fn universe(name: &str, host_only: bool) -> Arc<Context> {
    let mut builder = ContextBuilder::new(name)
        .define(EnumDef::builder(COLOR).members(["Red", "Green", "Blue"]))
        .define(ExceptionDef::builder(NOT_FOUND).extends(names::ERROR))
        .define(InterfaceDef::builder(GREETER).method(sig("greet", &[names::STRING], names::STRING)))
        .define(InterfaceDef::builder(CLOSER).method(sig("close", &[], names::ANY)))
        .define(
            InterfaceDef::builder(PALETTE)
                .method(sig("colors", &[], names::SET))
                .method(sig("favorite", &[], COLOR))
                .method(sig("describe", &[COLOR], names::STRING))
                .method(sig("greeter", &[names::STRING], GREETER))
                .method(sig("accept", &[GREETER, names::STRING], names::STRING))
                .method(sig("failing", &[], FAILING)),
        )
        .define(
            InterfaceDef::builder(FAILING)
                .method(sig("fail", &[names::STRING], names::ANY))
                .method(sig("deny", &[], names::ANY))
                .method(sig("leak", &[], names::ANY)),
        )
        .define(greeter_class())
        .define(
            ClassDef::builder("app.Both")
                .implements(GREETER)
                .implements(CLOSER)
                .method(sig("greet", &[names::STRING], names::STRING), |_| {
                    Ok(Value::from("both"))
                })
                .method(sig("close", &[], names::ANY), |_| Ok(Value::Null)),
        )
        .define(
            ClassDef::builder("app.Hidden")
                .implements(GREETER)
                .method(sig("greet", &[names::STRING], names::STRING).private(), |_| {
                    Ok(Value::from("secret"))
                }),
        )
        .define(palette_class())
        .define(failing_class());
    if host_only {
        builder = builder.define(ExceptionDef::builder(HOST_ONLY).extends(names::ERROR));
    }
    builder.build().expect("fixture context")
}

fn greeter_class() -> ClassBuilder {
    ClassDef::builder("app.GreeterImpl")
        .implements(GREETER)
        .field("prefix")
        .method(sig("greet", &[names::STRING], names::STRING), |f| {
            let prefix = f.this().field("prefix")?;
            let prefix = prefix.as_str().unwrap_or("hi");
            Ok(Value::from(format!("{} {}", prefix, f.arg_as::<String>(0)?)))
        })
}

fn palette_class() -> ClassBuilder {
    ClassDef::builder("app.PaletteImpl")
        .implements(PALETTE)
        .method(sig("colors", &[], names::SET), |f| {
            let ctx = f.context();
            let members = ["Red", "Green", "Blue"]
                .iter()
                .map(|m| ctx.enum_value(COLOR, m).map(Value::from))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::set(members))
        })
        .method(sig("favorite", &[], COLOR), |f| {
            Ok(f.context().enum_value(COLOR, "Green")?.into())
        })
        .method(sig("describe", &[COLOR], names::STRING), |f| {
            let color = f.arg_as::<EnumValue>(0)?;
            Ok(Value::from(format!(
                "{} #{}",
                color.name(),
                color.ordinal().unwrap_or_default()
            )))
        })
        .method(sig("greeter", &[names::STRING], GREETER), |f| {
            let greeter = Object::new(f.context(), "app.GreeterImpl")?
                .with_field("prefix", f.arg_as::<String>(0)?)?;
            Ok(greeter.into_value())
        })
        .method(sig("accept", &[GREETER, names::STRING], names::STRING), |f| {
            let greeter = f.arg_as::<ObjectRef>(0)?;
            greeter.invoke("greet", vec![f.arg(1)?.clone()])
        })
        .method(sig("failing", &[], FAILING), |f| {
            Ok(Object::new(f.context(), "app.FailingImpl")?.into_value())
        })
}

fn failing_class() -> ClassBuilder {
    ClassDef::builder("app.FailingImpl")
        .implements(FAILING)
        .method(sig("fail", &[names::STRING], names::ANY), |f| {
            let ctx = f.context();
            let root = ctx
                .exception(NOT_FOUND, f.arg_as::<String>(0)?)?
                .with_trace(vec![TraceFrame {
                    context: ctx.name().to_string(),
                    type_name: "app.Store".to_string(),
                    method: "lookup".to_string(),
                }]);
            let middle = ctx.exception(names::ERROR, "lookup failed")?.with_cause(root);
            let outer = ctx.exception(names::STATE_ERROR, "request failed")?.with_cause(middle);
            Err(Fault::Thrown(outer))
        })
        .method(sig("deny", &[], names::ANY), |f| {
            Err(f.raise(names::UNSUPPORTED_ERROR, "read only"))
        })
        .method(sig("leak", &[], names::ANY), |f| {
            let ctx = f.context();
            let e: Exception = match ctx.lookup(HOST_ONLY) {
                Some(_) => ctx.exception(HOST_ONLY, "internal")?,
                None => ctx.exception(names::ERROR, "internal")?,
            };
            Err(e.into())
        })
}

/// Host context (knows `app.HostOnly`) and guest context (does not)
pub fn pair() -> (Arc<Context>, Arc<Context>) {
    (universe("host", true), universe("guest", false))
}

/// Host object of the given class
pub fn host_object(host: &Arc<Context>, class: &str) -> ObjectRef {
    Object::instantiate(host, class).expect("fixture object")
}
