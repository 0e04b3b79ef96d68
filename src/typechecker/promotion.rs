//! The fixed numeric promotion lattice for arithmetic between basic kinds.
//!
//! The table is data, not derivation: mixed-signedness pairs promote to a
//! signed kind wide enough for both sides, and any float operand drags the
//! result into floats. Comparison operators gate on the same table but
//! always yield `bool`; bitwise operators additionally reject floats.

use super::types::{BasicKind, Type};

use BasicKind::*;

/// Rows/columns indexed u8,u16,u32,u64,i8,i16,i32,i64,f32,f64.
const PROMOTION: [[BasicKind; 10]; 10] = [
    [U8, U16, U32, U64, I16, I16, I32, I64, F32, F64],
    [U16, U16, U32, U64, I16, I32, I32, I64, F32, F64],
    [U32, U32, U32, U64, I64, I64, I64, I64, F32, F64],
    [U64, U64, U64, U64, I64, I64, I64, I64, F64, F64],
    [I16, I16, I64, I64, I8, I16, I32, I64, F32, F64],
    [I16, I32, I64, I64, I16, I16, I32, I64, F32, F64],
    [I32, I32, I64, I64, I32, I32, I32, I64, F32, F64],
    [I64, I64, I64, I64, I64, I64, I64, I64, F64, F64],
    [F32, F32, F32, F64, F32, F32, F32, F64, F32, F64],
    [F64, F64, F64, F64, F64, F64, F64, F64, F64, F64],
];

fn index(kind: BasicKind) -> usize {
    BasicKind::ALL
        .iter()
        .position(|k| *k == kind)
        .expect("every basic kind is in the table")
}

pub fn promote(a: BasicKind, b: BasicKind) -> BasicKind {
    PROMOTION[index(a)][index(b)]
}

/// Promotion lifted to types: both sides must be numeric (basic or a
/// not-yet-settled integer literal).
pub fn promote_types(a: &Type, b: &Type) -> Option<BasicKind> {
    Some(promote(a.numeric_kind()?, b.numeric_kind()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_matches_spec_spot_checks() {
        assert_eq!(promote(U8, U8), U8);
        assert_eq!(promote(U8, I8), I16);
        assert_eq!(promote(I8, U8), I16);
        assert_eq!(promote(U32, I8), I64);
        assert_eq!(promote(U64, F32), F64);
        assert_eq!(promote(F32, U64), F64);
        assert_eq!(promote(I64, F32), F64);
        assert_eq!(promote(F32, F32), F32);
        assert_eq!(promote(U16, I16), I32);
    }

    #[test]
    fn test_same_family_promotion_is_widest() {
        for a in [U8, U16, U32, U64] {
            for b in [U8, U16, U32, U64] {
                let result = promote(a, b);
                assert!(result.is_unsigned());
                assert_eq!(result.bits(), a.bits().max(b.bits()));
            }
        }
        for a in [I8, I16, I32, I64] {
            for b in [I8, I16, I32, I64] {
                let result = promote(a, b);
                assert!(result.is_signed() && result.is_integer());
                assert_eq!(result.bits(), a.bits().max(b.bits()));
            }
        }
    }

    #[test]
    fn test_same_family_promotion_is_associative() {
        let families: [&[BasicKind]; 3] =
            [&[U8, U16, U32, U64], &[I8, I16, I32, I64], &[F32, F64]];
        for family in families {
            for &a in family {
                for &b in family {
                    for &c in family {
                        assert_eq!(
                            promote(promote(a, b), c),
                            promote(a, promote(b, c)),
                            "associativity broken for {a:?} {b:?} {c:?}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_promote_types_rejects_non_numerics() {
        assert_eq!(
            promote_types(&Type::Boolean, &Type::Basic(BasicKind::U8)),
            None
        );
        assert_eq!(
            promote_types(
                &Type::LiteralInt(BasicKind::I32),
                &Type::Basic(BasicKind::U8)
            ),
            Some(I32)
        );
    }
}
