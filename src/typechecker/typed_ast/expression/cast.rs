use crate::ast::{CastExpression, CastMode};
use crate::typechecker::context::Context;
use crate::typechecker::error::{TypeCheckError, TypeMismatch};
use crate::typechecker::matcher::{can_cast, match_types};
use crate::typechecker::types::Type;
use crate::typechecker::warning::TypeCheckWarning;
use crate::typechecker::{confirm_hint, TypeCheckable, TypeInformation, TypeResult};

impl TypeCheckable for CastExpression<()> {
    type Typed = CastExpression<TypeInformation>;

    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let CastExpression {
            expr,
            target,
            mode,
            position,
            ..
        } = self;

        let expr = expr.check(ctx, None)?;
        let source = expr.get_info().resolved_type();
        let target_type = Type::try_from((target.clone(), &*ctx))?;

        let type_id = match mode {
            CastMode::Regular => {
                if !can_cast(ctx, &target_type, &source) {
                    return Err(TypeCheckError::TypeMismatch(
                        TypeMismatch {
                            expected: target_type,
                            actual: source,
                            detail: Some("this cast is not valid".to_string()),
                        },
                        position,
                    ));
                }
                target_type
            }
            CastMode::Safe => {
                if match_types(ctx, &target_type, &source, false).is_ok() {
                    ctx.warn(TypeCheckWarning::UnnecessaryCast {
                        target: target_type.clone(),
                        position: position.clone(),
                    });
                }
                if target_type.is_nullable() {
                    target_type
                } else {
                    Type::nullable(target_type)
                }
            }
            CastMode::Force => {
                if !can_cast(ctx, &target_type, &source) {
                    ctx.warn(TypeCheckWarning::UnsafeCast {
                        from: source,
                        to: target_type.clone(),
                        position: position.clone(),
                    });
                }
                target_type
            }
        };

        confirm_hint(ctx, hint, &type_id, &position)?;
        Ok(CastExpression {
            expr,
            target,
            mode,
            info: TypeInformation::new(ctx, type_id, hint),
            position,
        })
    }
}

#[cfg(test)]
mod tests {
    type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

    use crate::ast::{CastExpression, CastMode, Expression, Literal, TypeName};
    use crate::location::Location;
    use crate::typechecker::context::Context;
    use crate::typechecker::types::{BasicKind, Type};
    use crate::typechecker::warning::TypeCheckWarning;
    use crate::typechecker::TypeCheckable;

    fn cast(mode: CastMode, target: &str) -> CastExpression<()> {
        CastExpression {
            expr: Expression::Literal(Literal::Integer(5, (), Location::default())),
            target: TypeName::named(target),
            mode,
            info: (),
            position: Location::default(),
        }
    }

    #[test]
    fn test_regular_numeric_cast() -> Result<()> {
        let mut ctx = Context::default();
        let checked = cast(CastMode::Regular, "u8").check(&mut ctx, None)?;
        assert_eq!(
            checked.info.type_id.borrow().clone(),
            Some(Type::Basic(BasicKind::U8))
        );
        Ok(())
    }

    #[test]
    fn test_safe_cast_wraps_nullable_and_warns() -> Result<()> {
        let mut ctx = Context::default();
        let checked = cast(CastMode::Safe, "u32").check(&mut ctx, None)?;
        assert_eq!(
            checked.info.type_id.borrow().clone(),
            Some(Type::nullable(Type::Basic(BasicKind::U32)))
        );
        assert!(matches!(
            ctx.take_warnings().as_slice(),
            [TypeCheckWarning::UnnecessaryCast { .. }]
        ));
        Ok(())
    }

    #[test]
    fn test_force_cast_warns_when_unverifiable() -> Result<()> {
        let mut ctx = Context::default();
        let checked = cast(CastMode::Force, "bool").check(&mut ctx, None)?;
        assert_eq!(checked.info.type_id.borrow().clone(), Some(Type::Boolean));
        assert!(matches!(
            ctx.take_warnings().as_slice(),
            [TypeCheckWarning::UnsafeCast { .. }]
        ));
        Ok(())
    }
}
