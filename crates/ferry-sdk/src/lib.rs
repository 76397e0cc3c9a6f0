//! Ferry SDK - object model for isolated contexts
//!
//! A [`Context`] is an isolated type universe. Types are declared through
//! builders ([`InterfaceDef::builder`], [`ClassDef::builder`], ...) and bound
//! to one context when it is built, so two contexts can each define
//! `app.Greeter` and still hold two distinct types. Objects are reached
//! through the [`Instance`] trait and exchange [`Value`]s.
//!
//! This crate contains no bridging logic; see `ferry-bridge` for that.
//!
//! # Example
//!
//! ```ignore
//! use ferry_sdk::{names, ClassDef, ContextBuilder, Instance, MethodSig, Object, Value};
//!
//! let ctx = ContextBuilder::new("host")
//!     .define(ClassDef::builder("app.Greeter").method(
//!         MethodSig::new("greet", [names::STRING], names::STRING),
//!         |f| Ok(Value::from(format!("hi {}", f.arg_as::<String>(0)?))),
//!     ))
//!     .build()?;
//!
//! let greeter = Object::instantiate(&ctx, "app.Greeter")?;
//! assert_eq!(greeter.invoke("greet", vec!["Ann".into()])?, Value::from("hi Ann"));
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod classify;
pub mod context;
pub mod enums;
pub mod error;
pub mod exception;
pub mod object;
pub mod types;
pub mod value;

pub use context::{Context, ContextBuilder, ContextId};
pub use error::{BridgeError, BridgeResult, Fault};
pub use exception::{Exception, MaterializationStrategy, TraceFrame};
pub use object::{CallFrame, Instance, MethodBody, Object, ObjectRef};
pub use types::{
    core_type, is_core_name, names, Builtin, ClassBuilder, ClassDef, EnumBuilder, EnumDef,
    ExceptionBuilder, ExceptionDef, InterfaceBuilder, InterfaceDef, Method, MethodSig, Origin,
    Primitive, ProxyDef, TypeDecl, TypeDef, TypeKind, TypeRef, Visibility, CORE_NAMESPACE,
};
pub use value::{EnumValue, FromValue, Value};
