//! Values observed inside a context
//!
//! Scalars and collections are plain data. Enum values and type handles point
//! at a [`TypeRef`] of a specific context, and objects are shared
//! [`ObjectRef`] handles, so those three are what the bridge has to translate.

use std::fmt;
use std::sync::Arc;

use crate::error::{BridgeError, BridgeResult};
use crate::object::{Instance, ObjectRef};
use crate::types::{builtin, names, TypeRef};

/// A member of an enum type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EnumValue {
    ty: TypeRef,
    name: String,
}

impl EnumValue {
    pub(crate) fn new(ty: TypeRef, name: String) -> Self {
        Self { ty, name }
    }

    /// The enum type
    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    /// Member name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of the member in its declaration
    pub fn ordinal(&self) -> Option<usize> {
        self.ty
            .as_enum()
            .and_then(|def| def.members().iter().position(|m| *m == self.name))
    }
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A value inside a context
#[derive(Clone, Default)]
pub enum Value {
    /// Null
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// 32-bit signed integer
    I32(i32),
    /// 64-bit signed integer
    I64(i64),
    /// 64-bit float
    F64(f64),
    /// String
    Str(String),
    /// Ordered sequence
    List(Vec<Value>),
    /// Unique set; see [`Value::set`]
    Set(Vec<Value>),
    /// Key/value map
    Map(Vec<(Value, Value)>),
    /// Enum member
    Enum(EnumValue),
    /// Type handle
    Type(TypeRef),
    /// Object reference
    Object(ObjectRef),
}

impl Value {
    /// Build a set, dropping duplicate elements
    pub fn set<I>(items: I) -> Value
    where
        I: IntoIterator<Item = Value>,
    {
        let mut unique: Vec<Value> = Vec::new();
        for item in items {
            if !unique.contains(&item) {
                unique.push(item);
            }
        }
        Value::Set(unique)
    }

    /// Build a list
    pub fn list<I>(items: I) -> Value
    where
        I: IntoIterator<Item = Value>,
    {
        Value::List(items.into_iter().collect())
    }

    /// Wrap an object
    pub fn object<T: Instance + 'static>(obj: Arc<T>) -> Value {
        Value::Object(obj)
    }

    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if this value is a sequence, set or map
    pub fn is_collection(&self) -> bool {
        matches!(self, Value::List(_) | Value::Set(_) | Value::Map(_))
    }

    /// Get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as i32
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of a list or set
    pub fn as_items(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Set(items) => Some(items),
            _ => None,
        }
    }

    /// Get as enum member
    pub fn as_enum(&self) -> Option<&EnumValue> {
        match self {
            Value::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// Get as type handle
    pub fn as_type(&self) -> Option<&TypeRef> {
        match self {
            Value::Type(t) => Some(t),
            _ => None,
        }
    }

    /// Get as object
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Runtime type of the value. Null has the top type.
    pub fn runtime_type(&self) -> TypeRef {
        match self {
            Value::Null => builtin(names::ANY),
            Value::Bool(_) => builtin(names::BOOL),
            Value::I32(_) => builtin(names::I32),
            Value::I64(_) => builtin(names::I64),
            Value::F64(_) => builtin(names::F64),
            Value::Str(_) => builtin(names::STRING),
            Value::List(_) => builtin(names::LIST),
            Value::Set(_) => builtin(names::SET),
            Value::Map(_) => builtin(names::MAP),
            Value::Enum(e) => e.ty().clone(),
            Value::Type(_) => builtin(names::TYPE),
            Value::Object(o) => o.runtime_type().clone(),
        }
    }

    /// Get the type name as a string
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::F64(_) => "f64",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Set(_) => "set",
            Value::Map(_) => "map",
            Value::Enum(_) => "enum",
            Value::Type(_) => "type",
            Value::Object(_) => "object",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            // membership, ignoring order and duplicates
            (Value::Set(a), Value::Set(b)) => {
                a.iter().all(|item| b.contains(item)) && b.iter().all(|item| a.contains(item))
            }
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(b) => write!(f, "Bool({})", b),
            Value::I32(i) => write!(f, "I32({})", i),
            Value::I64(i) => write!(f, "I64({})", i),
            Value::F64(v) => write!(f, "F64({})", v),
            Value::Str(s) => write!(f, "Str({:?})", s),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Set(items) => f.debug_tuple("Set").field(items).finish(),
            Value::Map(entries) => f.debug_tuple("Map").field(entries).finish(),
            Value::Enum(e) => write!(f, "Enum({}::{})", e.ty().name(), e.name()),
            Value::Type(t) => write!(f, "Type({:?})", t),
            Value::Object(o) => write!(f, "Object({:?})", o.runtime_type()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::I32(i) => write!(f, "{}", i),
            Value::I64(i) => write!(f, "{}", i),
            Value::F64(v) => write!(f, "{}", v),
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::List(items) | Value::Set(items) => {
                let (open, close) = if matches!(self, Value::List(_)) {
                    ("[", "]")
                } else {
                    ("{", "}")
                };
                write!(f, "{}", open)?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "{}", close)
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Enum(e) => write!(f, "{}", e),
            Value::Type(t) => write!(f, "{}", t),
            Value::Object(o) => write!(f, "<{}>", o.runtime_type()),
        }
    }
}

// ============================================================================
// Conversions
// ============================================================================

/// Convert a [`Value`] into a Rust type.
///
/// Used by method bodies to read their arguments.
pub trait FromValue: Sized {
    /// Convert, returning a type mismatch if the shape is wrong
    fn from_value(value: &Value) -> BridgeResult<Self>;
}

macro_rules! scalar_conversions {
    ($($ty:ty => $variant:ident, $accessor:ident, $label:literal;)*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> BridgeResult<Self> {
                    value
                        .$accessor()
                        .ok_or_else(|| BridgeError::mismatch($label, value.type_name()))
                }
            }

            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )*
    };
}

scalar_conversions! {
    bool => Bool, as_bool, "boolean";
    i32 => I32, as_i32, "i32";
    i64 => I64, as_i64, "i64";
    f64 => F64, as_f64, "f64";
}

impl FromValue for String {
    fn from_value(value: &Value) -> BridgeResult<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| BridgeError::mismatch("string", value.type_name()))
    }
}

impl FromValue for EnumValue {
    fn from_value(value: &Value) -> BridgeResult<Self> {
        value
            .as_enum()
            .cloned()
            .ok_or_else(|| BridgeError::mismatch("enum", value.type_name()))
    }
}

impl FromValue for ObjectRef {
    fn from_value(value: &Value) -> BridgeResult<Self> {
        value
            .as_object()
            .cloned()
            .ok_or_else(|| BridgeError::mismatch("object", value.type_name()))
    }
}

impl FromValue for Vec<Value> {
    fn from_value(value: &Value) -> BridgeResult<Self> {
        value
            .as_items()
            .map(<[Value]>::to_vec)
            .ok_or_else(|| BridgeError::mismatch("list or set", value.type_name()))
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> BridgeResult<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<EnumValue> for Value {
    fn from(e: EnumValue) -> Self {
        Value::Enum(e)
    }
}

impl From<TypeRef> for Value {
    fn from(t: TypeRef) -> Self {
        Value::Type(t)
    }
}

impl From<ObjectRef> for Value {
    fn from(o: ObjectRef) -> Self {
        Value::Object(o)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
