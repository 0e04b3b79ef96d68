//! Common-type unification for branch results, array elements and collected
//! returns.
//!
//! Starting from the first type, every subsequent one either fits the
//! current base, replaces it, or forces a common supertype; adopting a
//! supertype restarts the scan from the beginning.

use super::context::Context;
use super::matcher::{as_interface, match_types};
use super::types::{InterfaceType, StructField, StructType, Type};

pub fn find_compatible_types(ctx: &Context, types: &[Type]) -> Option<Type> {
    let mut candidates = types.iter();
    let mut base = candidates.next()?.clone();

    let mut index = 1;
    while index < types.len() {
        let current = &types[index];

        // A literal base settles to the first concrete numeric it meets.
        if matches!(base.dereference(), Type::LiteralInt(_))
            && matches!(current.dereference(), Type::Basic(_))
        {
            base = current.clone();
            index += 1;
            continue;
        }

        if match_types(ctx, &base, current, false).is_ok() {
            index += 1;
            continue;
        }
        if match_types(ctx, current, &base, false).is_ok() {
            base = current.clone();
            index += 1;
            continue;
        }

        match common_supertype(ctx, &base, current) {
            Some(supertype) => {
                base = supertype;
                index = 0;
            }
            None => return None,
        }
    }

    Some(base)
}

fn common_supertype(ctx: &Context, a: &Type, b: &Type) -> Option<Type> {
    let a = a.dereference();
    let b = b.dereference();

    // Two constructors of the same variant generalize to the variant.
    if let (Type::VariantConstructor(ca), Type::VariantConstructor(cb)) = (&a, &b) {
        let parent_a = ca.borrow().parent_variant()?;
        let parent_b = cb.borrow().parent_variant()?;
        if parent_a.borrow().id == parent_b.borrow().id {
            return Some(Type::Variant(parent_a));
        }
        return None;
    }

    // Two structs generalize to their field-name intersection, with each
    // shared field agreeing in both directions.
    if let (Type::Struct(sa), Type::Struct(sb)) = (&a, &b) {
        let mut fields = Vec::new();
        for field in &sa.fields {
            let Some(other) = sb.field(&field.name) else {
                continue;
            };
            if match_types(ctx, &field.type_id, &other.type_id, false).is_ok()
                && match_types(ctx, &other.type_id, &field.type_id, false).is_ok()
            {
                fields.push(StructField {
                    name: field.name.clone(),
                    type_id: field.type_id.clone(),
                });
            }
        }
        if fields.is_empty() {
            return None;
        }
        return Some(Type::Struct(StructType { fields }));
    }

    // Interfaces (and classes viewed as interfaces) generalize to their
    // method intersection.
    let interface_like = |t: &Type| {
        matches!(
            t,
            Type::Interface(_) | Type::Class(_) | Type::Join(_)
        )
    };
    if interface_like(&a) && interface_like(&b) && !(matches!(&a, Type::Class(_)) && matches!(&b, Type::Class(_))) {
        let ia = as_interface(&a)?;
        let ib = as_interface(&b)?;
        let methods_b = ib.all_methods();
        let methods = ia
            .all_methods()
            .into_iter()
            .filter(|m| {
                methods_b.iter().any(|other| {
                    other.name == m.name
                        && Type::Function(other.signature.clone())
                            == Type::Function(m.signature.clone())
                })
            })
            .collect::<Vec<_>>();
        if methods.is_empty() {
            return None;
        }
        return Some(Type::Interface(InterfaceType::new(None, methods, vec![])));
    }

    None
}

#[cfg(test)]
mod tests {
    use crate::typechecker::context::Context;
    use crate::typechecker::types::{BasicKind, StructField, StructType, Type};

    use super::find_compatible_types;

    #[test]
    fn test_identical_types_unify() {
        let ctx = Context::default();
        let result = find_compatible_types(&ctx, &[Type::Boolean, Type::Boolean]);
        assert_eq!(result, Some(Type::Boolean));
    }

    #[test]
    fn test_literal_settles_against_concrete() {
        let ctx = Context::default();
        let result = find_compatible_types(
            &ctx,
            &[
                Type::Basic(BasicKind::U32),
                Type::LiteralInt(BasicKind::I32),
            ],
        );
        assert_eq!(result, Some(Type::Basic(BasicKind::U32)));

        let reversed = find_compatible_types(
            &ctx,
            &[
                Type::LiteralInt(BasicKind::I32),
                Type::Basic(BasicKind::U32),
            ],
        );
        assert_eq!(reversed, Some(Type::Basic(BasicKind::U32)));
    }

    #[test]
    fn test_struct_intersection() {
        let ctx = Context::default();
        let left = Type::Struct(StructType {
            fields: vec![
                StructField {
                    name: "x".into(),
                    type_id: Type::Boolean,
                },
                StructField {
                    name: "y".into(),
                    type_id: Type::Basic(BasicKind::U8),
                },
            ],
        });
        let right = Type::Struct(StructType {
            fields: vec![
                StructField {
                    name: "x".into(),
                    type_id: Type::Boolean,
                },
                StructField {
                    name: "z".into(),
                    type_id: Type::Basic(BasicKind::U8),
                },
            ],
        });

        let result = find_compatible_types(&ctx, &[left, right]).unwrap();
        match result {
            Type::Struct(strukt) => {
                assert_eq!(strukt.fields.len(), 1);
                assert_eq!(strukt.fields[0].name, "x");
            }
            other => panic!("expected a struct, got {other:?}"),
        }
    }

    #[test]
    fn test_incompatible_types_fail() {
        let ctx = Context::default();
        assert_eq!(
            find_compatible_types(&ctx, &[Type::Boolean, Type::Void]),
            None
        );
    }
}
