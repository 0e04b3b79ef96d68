//! Canonical, cycle-safe type serialization and the 32-bit fingerprint
//! derived from it.
//!
//! Classes and variants serialize by id, which is what breaks cycles: a
//! self-referential class renders as `class#7` instead of recursing. Struct
//! fields and interface methods are sorted so the rendering is canonical.
//! Equal fingerprints do not imply equal types; the matcher only uses them
//! as memoization keys and re-verifies on miss.

use sha2::{Digest, Sha256};

use super::{FunctionType, Type};

impl Type {
    pub fn serialize(&self) -> String {
        match self {
            Type::Basic(kind) => kind.name().to_string(),
            Type::LiteralInt(kind) => format!("lit({})", kind.name()),
            Type::Boolean => "bool".into(),
            Type::Void => "void".into(),
            Type::Null => "null".into(),
            Type::Unreachable => "unreachable".into(),
            Type::Unset => "unset".into(),
            Type::Nullable(inner) => format!("nullable({})", inner.serialize()),
            Type::Array { element, .. } => format!("array({})", element.serialize()),
            Type::Tuple(elements) => {
                let elements = elements
                    .iter()
                    .map(|e| e.serialize())
                    .collect::<Vec<_>>()
                    .join(",");
                format!("tuple({elements})")
            }
            Type::Struct(strukt) => {
                let mut fields = strukt
                    .fields
                    .iter()
                    .map(|f| format!("{}:{}", f.name, f.type_id.serialize()))
                    .collect::<Vec<_>>();
                fields.sort();
                format!("struct({})", fields.join(","))
            }
            Type::Function(function) => serialize_function(function),
            Type::Coroutine(function) => {
                format!("coroutine({})", serialize_function(function))
            }
            Type::Promise(inner) => format!("promise({})", inner.serialize()),
            Type::Interface(interface) => {
                let mut methods = interface
                    .all_methods()
                    .iter()
                    .map(|m| format!("{}:{}", m.name, serialize_function(&m.signature)))
                    .collect::<Vec<_>>();
                methods.sort();
                format!("interface({})", methods.join(","))
            }
            Type::Class(class) => format!("class#{}", class.borrow().id),
            Type::Variant(variant) => format!("variant#{}", variant.borrow().id),
            Type::VariantConstructor(constructor) => {
                let constructor = constructor.borrow();
                let parent = constructor
                    .parent_variant()
                    .map(|p| p.borrow().id)
                    .unwrap_or(usize::MAX);
                format!("ctor(variant#{parent},{})", constructor.name)
            }
            Type::Enum(e) => {
                let members = e
                    .members
                    .iter()
                    .map(|(name, value)| format!("{name}={value}"))
                    .collect::<Vec<_>>()
                    .join(",");
                format!("enum({};as:{};{members})", e.name, e.backing.name())
            }
            Type::StringEnum(string_enum) => {
                let mut values = string_enum.values.clone();
                values.sort();
                format!("strenum({})", values.join(","))
            }
            Type::Reference(reference) => {
                let target = reference.target.borrow().clone();
                match target {
                    Some(inner) => inner.serialize(),
                    None => format!("ref({})", reference.name),
                }
            }
            Type::Generic(generic) => format!("generic({})", generic.name),
            Type::Join(parts) => {
                let mut parts = parts.iter().map(|p| p.serialize()).collect::<Vec<_>>();
                parts.sort();
                format!("join({})", parts.join(","))
            }
            Type::Union(parts) => {
                let mut parts = parts.iter().map(|p| p.serialize()).collect::<Vec<_>>();
                parts.sort();
                format!("union({})", parts.join(","))
            }
            Type::MetaClass(class) => format!("meta(class#{})", class.borrow().id),
            Type::MetaVariant(variant) => format!("meta(variant#{})", variant.borrow().id),
            Type::MetaVariantConstructor(constructor) => {
                format!("meta({})", Type::VariantConstructor(constructor.clone()).serialize())
            }
            Type::FfiMethod(function) => format!("ffi({})", serialize_function(function)),
        }
    }

    /// 32-bit fingerprint of the canonical serialization.
    pub fn fingerprint(&self) -> u32 {
        let digest = Sha256::digest(self.serialize().as_bytes());
        u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
    }
}

fn serialize_function(function: &FunctionType) -> String {
    let params = function
        .parameters
        .iter()
        .map(|p| {
            if p.mutable {
                format!("mut {}", p.type_id.serialize())
            } else {
                p.type_id.serialize()
            }
        })
        .collect::<Vec<_>>()
        .join(",");
    format!("fn({params})->{}", function.return_type.serialize())
}

#[cfg(test)]
mod tests {
    use crate::typechecker::types::{BasicKind, StructField, StructType, Type};

    #[test]
    fn test_struct_serialization_is_canonical() {
        let a = Type::Struct(StructType {
            fields: vec![
                StructField {
                    name: "b".into(),
                    type_id: Type::Boolean,
                },
                StructField {
                    name: "a".into(),
                    type_id: Type::Basic(BasicKind::U8),
                },
            ],
        });
        let b = Type::Struct(StructType {
            fields: vec![
                StructField {
                    name: "a".into(),
                    type_id: Type::Basic(BasicKind::U8),
                },
                StructField {
                    name: "b".into(),
                    type_id: Type::Boolean,
                },
            ],
        });

        assert_eq!(a.serialize(), b.serialize());
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_fingerprint_distinguishes_kinds() {
        assert_ne!(
            Type::Basic(BasicKind::U8).fingerprint(),
            Type::Basic(BasicKind::U16).fingerprint()
        );
        assert_ne!(
            Type::nullable(Type::Boolean).fingerprint(),
            Type::Boolean.fingerprint()
        );
    }
}
