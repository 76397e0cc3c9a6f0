//! Enum helper
//!
//! Lookup of enum members by name or ordinal, cached member-name sets and
//! conversion between member names and [`EnumValue`]s.

use rand::Rng;
use rustc_hash::FxHashSet;

use crate::error::{BridgeError, BridgeResult};
use crate::types::{EnumDef, TypeRef};
use crate::value::{EnumValue, Value};

fn enum_def(ty: &TypeRef) -> BridgeResult<&EnumDef> {
    ty.as_enum()
        .ok_or_else(|| BridgeError::mismatch("enum type", ty.kind().label()))
}

/// Look up a member by name
pub fn lookup_by_name(ty: &TypeRef, name: &str) -> BridgeResult<EnumValue> {
    if !contains(ty, name)? {
        return Err(BridgeError::UnknownEnumValue {
            enum_type: ty.name().to_string(),
            name: name.to_string(),
        });
    }
    Ok(EnumValue::new(ty.clone(), name.to_string()))
}

/// Set of every member name of an enum type
pub fn all_member_names(ty: &TypeRef) -> BridgeResult<&FxHashSet<String>> {
    Ok(enum_def(ty)?.member_names())
}

/// Check if an enum type has a member with the given name
pub fn contains(ty: &TypeRef, name: &str) -> BridgeResult<bool> {
    Ok(all_member_names(ty)?.contains(name))
}

/// Look up a member by ordinal
pub fn from_ordinal(ty: &TypeRef, ordinal: usize) -> BridgeResult<EnumValue> {
    let def = enum_def(ty)?;
    match def.members().get(ordinal) {
        Some(name) => Ok(EnumValue::new(ty.clone(), name.clone())),
        None => Err(BridgeError::ArgumentError(format!(
            "ordinal {} out of range for enum {} with {} members",
            ordinal,
            ty.name(),
            def.members().len()
        ))),
    }
}

/// Pick a uniformly random member
pub fn random<R: Rng + ?Sized>(ty: &TypeRef, rng: &mut R) -> BridgeResult<EnumValue> {
    let len = enum_def(ty)?.members().len();
    if len == 0 {
        return Err(BridgeError::ArgumentError(format!(
            "enum {} has no members",
            ty.name()
        )));
    }
    from_ordinal(ty, rng.gen_range(0..len))
}

/// Convert member names to enum values. Fails on the first unknown name.
pub fn from_names<I, S>(ty: &TypeRef, names: I) -> BridgeResult<Vec<EnumValue>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| lookup_by_name(ty, name.as_ref()))
        .collect()
}

/// Member names of a sequence of enum values. Non-enum items are rejected.
pub fn to_names<'a, I>(values: I) -> BridgeResult<Vec<String>>
where
    I: IntoIterator<Item = &'a Value>,
{
    values
        .into_iter()
        .map(|value| match value {
            Value::Enum(e) => Ok(e.name().to_string()),
            other => Err(BridgeError::mismatch("enum value", other.type_name())),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextBuilder;
    use crate::types::{core_type, names, EnumDef};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn color() -> TypeRef {
        let ctx = ContextBuilder::new("palette")
            .define(EnumDef::builder("app.Color").members(["Red", "Green", "Blue"]))
            .build()
            .unwrap();
        ctx.resolve_type("app.Color").unwrap()
    }

    #[test]
    fn test_lookup_by_name() {
        let ty = color();
        let green = lookup_by_name(&ty, "Green").unwrap();
        assert_eq!(green.name(), "Green");
        assert_eq!(green.ordinal(), Some(1));

        let err = lookup_by_name(&ty, "Purple").unwrap_err();
        assert_eq!(
            err,
            BridgeError::UnknownEnumValue {
                enum_type: "app.Color".to_string(),
                name: "Purple".to_string(),
            }
        );
    }

    #[test]
    fn test_not_an_enum() {
        let string = core_type(names::STRING).unwrap();
        assert!(matches!(
            lookup_by_name(&string, "x"),
            Err(BridgeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_member_names() {
        let ty = color();
        let names = all_member_names(&ty).unwrap();
        assert_eq!(names.len(), 3);
        assert!(contains(&ty, "Blue").unwrap());
        assert!(!contains(&ty, "blue").unwrap());
    }

    #[test]
    fn test_from_ordinal() {
        let ty = color();
        assert_eq!(from_ordinal(&ty, 0).unwrap().name(), "Red");
        assert_eq!(from_ordinal(&ty, 2).unwrap().name(), "Blue");
        assert!(matches!(
            from_ordinal(&ty, 3),
            Err(BridgeError::ArgumentError(_))
        ));
    }

    #[test]
    fn test_random_stays_in_range() {
        let ty = color();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let value = random(&ty, &mut rng).unwrap();
            assert!(contains(&ty, value.name()).unwrap());
        }
    }

    #[test]
    fn test_random_empty_enum() {
        let ctx = ContextBuilder::new("empty")
            .define(EnumDef::builder("app.Nothing"))
            .build()
            .unwrap();
        let ty = ctx.resolve_type("app.Nothing").unwrap();
        assert!(random(&ty, &mut rand::thread_rng()).is_err());
    }

    #[test]
    fn test_names_conversion() {
        let ty = color();
        let values = from_names(&ty, ["Blue", "Red"]).unwrap();
        let as_values: Vec<Value> = values.into_iter().map(Value::from).collect();
        assert_eq!(to_names(&as_values).unwrap(), vec!["Blue", "Red"]);

        assert!(from_names(&ty, ["Red", "Pink"]).is_err());
        assert!(to_names(&[Value::from(1)]).is_err());
    }
}
