use crate::ast::Literal;
use crate::typechecker::context::Context;
use crate::typechecker::error::{TypeCheckError, TypeMismatch};
use crate::typechecker::types::{BasicKind, Type};
use crate::typechecker::{confirm_hint, TypeCheckable, TypeInformation, TypeResult};

impl TypeCheckable for Literal<()> {
    type Typed = Literal<TypeInformation>;

    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        match self {
            Literal::Integer(value, _, position) => {
                let type_id = match hint.map(|h| h.dereference()) {
                    Some(Type::Basic(kind)) | Some(Type::LiteralInt(kind)) => {
                        fit_literal(value, kind, &position)?;
                        Type::Basic(kind)
                    }
                    // A nullable numeric hint settles the literal to its
                    // inner kind.
                    Some(Type::Nullable(inner)) => match inner.dereference() {
                        Type::Basic(kind) => {
                            fit_literal(value, kind, &position)?;
                            Type::Basic(kind)
                        }
                        _ => Type::LiteralInt(BasicKind::storage_for(value)),
                    },
                    // An enum hint types the literal as the enum itself,
                    // fit-checked against its backing kind.
                    Some(Type::Enum(enum_type)) => {
                        fit_literal(value, enum_type.backing, &position)?;
                        Type::Enum(enum_type)
                    }
                    _ => Type::LiteralInt(BasicKind::storage_for(value)),
                };
                confirm_hint(ctx, hint, &type_id, &position)?;
                Ok(Literal::Integer(
                    value,
                    TypeInformation::new(ctx, type_id, hint).constant(),
                    position,
                ))
            }
            Literal::Float(value, _, position) => {
                let type_id = match hint.map(|h| h.dereference()) {
                    Some(Type::Basic(BasicKind::F64)) => Type::Basic(BasicKind::F64),
                    _ => Type::Basic(BasicKind::F32),
                };
                confirm_hint(ctx, hint, &type_id, &position)?;
                Ok(Literal::Float(
                    value,
                    TypeInformation::new(ctx, type_id, hint).constant(),
                    position,
                ))
            }
            Literal::Double(value, _, position) => {
                let type_id = Type::Basic(BasicKind::F64);
                confirm_hint(ctx, hint, &type_id, &position)?;
                Ok(Literal::Double(
                    value,
                    TypeInformation::new(ctx, type_id, hint).constant(),
                    position,
                ))
            }
            Literal::Bool(value, _, position) => {
                confirm_hint(ctx, hint, &Type::Boolean, &position)?;
                Ok(Literal::Bool(
                    value,
                    TypeInformation::new(ctx, Type::Boolean, hint).constant(),
                    position,
                ))
            }
            Literal::Char(value, _, position) => {
                // Characters are byte-width code units; a wider integer hint
                // is honored when the scalar value fits.
                let type_id = match hint.map(|h| h.dereference()) {
                    Some(Type::Basic(kind)) if kind.is_integer() => {
                        fit_literal(value as i128, kind, &position)?;
                        Type::Basic(kind)
                    }
                    _ => {
                        fit_literal(value as i128, BasicKind::U8, &position)?;
                        Type::Basic(BasicKind::U8)
                    }
                };
                confirm_hint(ctx, hint, &type_id, &position)?;
                Ok(Literal::Char(
                    value,
                    TypeInformation::new(ctx, type_id, hint).constant(),
                    position,
                ))
            }
            Literal::Str(value, _, position) => {
                let type_id = ctx.string_type();
                confirm_hint(ctx, hint, &type_id, &position)?;
                Ok(Literal::Str(
                    value,
                    TypeInformation::new(ctx, type_id, hint).constant(),
                    position,
                ))
            }
            Literal::Null(_, position) => {
                confirm_hint(ctx, hint, &Type::Null, &position)?;
                Ok(Literal::Null(
                    TypeInformation::new(ctx, Type::Null, hint).constant(),
                    position,
                ))
            }
        }
    }
}

fn fit_literal(
    value: i128,
    kind: BasicKind,
    position: &crate::location::Location,
) -> TypeResult<()> {
    if kind.fits(value) {
        Ok(())
    } else {
        Err(TypeCheckError::TypeMismatch(
            TypeMismatch {
                expected: Type::Basic(kind),
                actual: Type::LiteralInt(BasicKind::storage_for(value)),
                detail: Some(format!("literal {value} does not fit into {kind}")),
            },
            position.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::Literal;
    use crate::location::Location;
    use crate::typechecker::context::Context;
    use crate::typechecker::types::{BasicKind, Type};
    use crate::typechecker::TypeCheckable;

    #[test]
    fn test_integer_literal_settles_under_hint() {
        let mut ctx = Context::default();
        let literal = Literal::Integer(255, (), Location::default());
        let checked = literal
            .check(&mut ctx, Some(&Type::Basic(BasicKind::U8)))
            .unwrap();
        assert_eq!(
            checked.get_info().type_id.borrow().clone(),
            Some(Type::Basic(BasicKind::U8))
        );
        assert!(checked.get_info().constant);
    }

    #[test]
    fn test_integer_literal_fit_is_checked() {
        let mut ctx = Context::default();
        let literal = Literal::Integer(256, (), Location::default());
        assert!(literal
            .check(&mut ctx, Some(&Type::Basic(BasicKind::U8)))
            .is_err());

        let negative = Literal::Integer(-1, (), Location::default());
        assert!(negative
            .check(&mut ctx, Some(&Type::Basic(BasicKind::U64)))
            .is_err());
    }

    #[test]
    fn test_integer_literal_without_hint_stays_literal() {
        let mut ctx = Context::default();
        let literal = Literal::Integer(7, (), Location::default());
        let checked = literal.check(&mut ctx, None).unwrap();
        assert_eq!(
            checked.get_info().type_id.borrow().clone(),
            Some(Type::LiteralInt(BasicKind::I32))
        );
    }

    #[test]
    fn test_float_defaults() {
        let mut ctx = Context::default();
        let float = Literal::Float(1.5, (), Location::default());
        let checked = float.check(&mut ctx, None).unwrap();
        assert_eq!(
            checked.get_info().type_id.borrow().clone(),
            Some(Type::Basic(BasicKind::F32))
        );

        let double = Literal::Double(1.5, (), Location::default());
        let checked = double.check(&mut ctx, None).unwrap();
        assert_eq!(
            checked.get_info().type_id.borrow().clone(),
            Some(Type::Basic(BasicKind::F64))
        );
    }

    #[test]
    fn test_string_literal_is_string_class() {
        let mut ctx = Context::default();
        let string = Literal::Str("hello".into(), (), Location::default());
        let checked = string.check(&mut ctx, None).unwrap();
        assert_eq!(
            checked.get_info().type_id.borrow().clone(),
            Some(ctx.string_type())
        );
    }

    #[test]
    fn test_null_literal_needs_nullable_hint() {
        let mut ctx = Context::default();
        let null = Literal::Null((), Location::default());
        let nullable = Type::nullable(Type::Basic(BasicKind::U32));
        assert!(null.clone().check(&mut ctx, Some(&nullable)).is_ok());
        assert!(null
            .check(&mut ctx, Some(&Type::Basic(BasicKind::U32)))
            .is_err());
    }
}
