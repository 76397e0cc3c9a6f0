//! Type classification predicates

use crate::types::{Primitive, TypeRef};

/// 32-bit integer
pub fn is_integer(ty: &TypeRef) -> bool {
    ty.primitive() == Some(Primitive::I32)
}

/// 64-bit integer
pub fn is_long(ty: &TypeRef) -> bool {
    ty.primitive() == Some(Primitive::I64)
}

/// Floating point
pub fn is_float(ty: &TypeRef) -> bool {
    ty.primitive() == Some(Primitive::F64)
}

/// Boolean
pub fn is_boolean(ty: &TypeRef) -> bool {
    ty.primitive() == Some(Primitive::Bool)
}

/// String-like
pub fn is_string(ty: &TypeRef) -> bool {
    ty.primitive() == Some(Primitive::String)
}

/// Check if null can never be passed where this type is declared
pub fn is_non_nullable(ty: &TypeRef) -> bool {
    is_integer(ty) || is_long(ty) || is_float(ty) || is_boolean(ty)
}

/// Scalar kind of a type, or `None` for anything that is not a scalar
pub fn scalar_kind(ty: &TypeRef) -> Option<Primitive> {
    ty.primitive()
}
