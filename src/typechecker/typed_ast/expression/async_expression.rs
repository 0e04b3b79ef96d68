use crate::ast::{AwaitExpression, SpawnExpression};
use crate::typechecker::context::Context;
use crate::typechecker::error::{TypeCheckError, TypeMismatch};
use crate::typechecker::types::Type;
use crate::typechecker::{confirm_hint, TypeCheckable, TypeInformation, TypeResult};

impl TypeCheckable for SpawnExpression<()> {
    type Typed = SpawnExpression<TypeInformation>;

    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let SpawnExpression {
            expr, position, ..
        } = self;

        // A promise hint flows into the spawned expression.
        let inner_hint = match hint.map(|h| h.dereference()) {
            Some(Type::Promise(inner)) => Some(*inner),
            _ => None,
        };
        let expr = expr.check(ctx, inner_hint.as_ref())?;
        let type_id = Type::Promise(Box::new(expr.get_info().resolved_type()));

        confirm_hint(ctx, hint, &type_id, &position)?;
        Ok(SpawnExpression {
            expr,
            info: TypeInformation::new(ctx, type_id, hint),
            position,
        })
    }
}

impl TypeCheckable for AwaitExpression<()> {
    type Typed = AwaitExpression<TypeInformation>;

    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let AwaitExpression {
            expr, position, ..
        } = self;

        let promise_hint = hint.map(|h| Type::Promise(Box::new(h.clone())));
        let expr = expr.check(ctx, promise_hint.as_ref())?;
        let operand = expr.get_info().resolved_type();

        let Type::Promise(inner) = operand.dereference() else {
            return Err(TypeCheckError::TypeMismatch(
                TypeMismatch {
                    expected: Type::Promise(Box::new(Type::Unset)),
                    actual: operand,
                    detail: Some("'await' operates on promises".to_string()),
                },
                position,
            ));
        };

        confirm_hint(ctx, hint, &inner, &position)?;
        Ok(AwaitExpression {
            expr,
            info: TypeInformation::new(ctx, *inner, hint),
            position,
        })
    }
}

#[cfg(test)]
mod tests {
    type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

    use crate::ast::{AwaitExpression, Expression, Literal, SpawnExpression};
    use crate::location::Location;
    use crate::typechecker::context::Context;
    use crate::typechecker::types::{BasicKind, Type};
    use crate::typechecker::TypeCheckable;

    #[test]
    fn test_spawn_wraps_in_promise() -> Result<()> {
        let mut ctx = Context::default();
        let spawn = SpawnExpression {
            expr: Expression::Literal(Literal::Bool(true, (), Location::default())),
            info: (),
            position: Location::default(),
        };

        let checked = spawn.check(&mut ctx, None)?;
        assert_eq!(
            checked.info.type_id.borrow().clone(),
            Some(Type::Promise(Box::new(Type::Boolean)))
        );
        Ok(())
    }

    #[test]
    fn test_await_unwraps_promise() -> Result<()> {
        let mut ctx = Context::default();
        let awaited = AwaitExpression {
            expr: Expression::Spawn(Box::new(SpawnExpression {
                expr: Expression::Literal(Literal::Integer(1, (), Location::default())),
                info: (),
                position: Location::default(),
            })),
            info: (),
            position: Location::default(),
        };

        let checked = awaited.check(&mut ctx, Some(&Type::Basic(BasicKind::U32)))?;
        assert_eq!(
            checked.info.type_id.borrow().clone(),
            Some(Type::Basic(BasicKind::U32))
        );
        Ok(())
    }

    #[test]
    fn test_await_rejects_non_promise() {
        let mut ctx = Context::default();
        let awaited = AwaitExpression {
            expr: Expression::Literal(Literal::Bool(true, (), Location::default())),
            info: (),
            position: Location::default(),
        };

        assert!(awaited.check(&mut ctx, None).is_err());
    }
}
