//! Value translation between contexts
//!
//! Converts a value owned by a source context into the equivalent value of
//! a target context. Rules are applied in order:
//!
//! 1. null stays null
//! 2. sequences and sets become new collections of translated elements;
//!    maps are rejected
//! 3. enum members are looked up by name in the target's enum type
//! 4. objects of a non-core type are wrapped in a proxy
//! 5. type handles are re-resolved by name
//! 6. everything else (core scalars, core objects) passes through
//!
//! The source value is never mutated.

use std::sync::Arc;

use ferry_sdk::{names, BridgeError, BridgeResult, Context, ObjectRef, TypeRef, Value};

use crate::options::BridgeOptions;
use crate::proxy::create_proxy_with;

/// Translate a value with default options
pub fn translate(
    value: &Value,
    source: &Arc<Context>,
    target: &Arc<Context>,
    expected: Option<&TypeRef>,
) -> BridgeResult<Value> {
    translate_with(value, source, target, expected, &BridgeOptions::default())
}

/// Translate a value.
///
/// `expected` is a type of the target context. When it is a non-core
/// interface, an object is proxied against it; otherwise the object's single
/// non-core interface is used.
pub fn translate_with(
    value: &Value,
    source: &Arc<Context>,
    target: &Arc<Context>,
    expected: Option<&TypeRef>,
    options: &BridgeOptions,
) -> BridgeResult<Value> {
    translate_recursive(value, source, target, expected, options, 0)
}

fn translate_recursive(
    value: &Value,
    source: &Arc<Context>,
    target: &Arc<Context>,
    expected: Option<&TypeRef>,
    options: &BridgeOptions,
    depth: usize,
) -> BridgeResult<Value> {
    if depth >= options.max_depth {
        return Err(BridgeError::MaxDepthExceeded(options.max_depth));
    }

    match value {
        Value::Null => Ok(Value::Null),
        Value::List(items) => Ok(Value::List(translate_items(
            items, source, target, options, depth,
        )?)),
        Value::Set(items) => Ok(Value::set(translate_items(
            items, source, target, options, depth,
        )?)),
        Value::Map(_) => Err(BridgeError::UnsupportedCollectionKind(
            names::MAP.to_string(),
        )),
        Value::Enum(member) => target
            .enum_value(member.ty().name(), member.name())
            .map(Value::Enum),
        Value::Object(obj) if !source.is_core_type(obj.runtime_type()) => {
            proxy_object(obj, source, target, expected, options)
        }
        Value::Type(ty) => target.resolve_type(ty.name()).map(Value::Type),
        other => Ok(other.clone()),
    }
}

fn translate_items(
    items: &[Value],
    source: &Arc<Context>,
    target: &Arc<Context>,
    options: &BridgeOptions,
    depth: usize,
) -> BridgeResult<Vec<Value>> {
    items
        .iter()
        .map(|item| translate_recursive(item, source, target, None, options, depth + 1))
        .collect()
}

fn proxy_object(
    obj: &ObjectRef,
    source: &Arc<Context>,
    target: &Arc<Context>,
    expected: Option<&TypeRef>,
    options: &BridgeOptions,
) -> BridgeResult<Value> {
    let capability = match expected.filter(|ty| !ty.is_core() && ty.is_interface()) {
        Some(ty) => ty.clone(),
        None => {
            let own = source.single_capability(obj.runtime_type())?;
            target.resolve_type(own.name())?
        }
    };
    create_proxy_with(obj.clone(), &capability, source, target, &options.nested())
        .map(Value::Object)
}
