use crate::ast::{ThrowExpression, UnreachableExpression};
use crate::typechecker::context::Context;
use crate::typechecker::types::{BasicKind, Type};
use crate::typechecker::{confirm_hint, TypeCheckable, TypeInformation, TypeResult};

impl TypeCheckable for ThrowExpression<()> {
    type Typed = ThrowExpression<TypeInformation>;

    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let ThrowExpression {
            message,
            code,
            position,
            ..
        } = self;

        let string = ctx.string_type();
        let message = message.check(ctx, Some(&string))?;
        let code = match code {
            Some(code) => Some(code.check(ctx, Some(&Type::Basic(BasicKind::U32)))?),
            None => None,
        };

        // Throwing diverges; the result matches any hint.
        confirm_hint(ctx, hint, &Type::Unreachable, &position)?;
        Ok(ThrowExpression {
            message,
            code,
            info: TypeInformation::new(ctx, Type::Unreachable, hint),
            position,
        })
    }
}

impl TypeCheckable for UnreachableExpression<()> {
    type Typed = UnreachableExpression<TypeInformation>;

    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let UnreachableExpression { position, .. } = self;
        confirm_hint(ctx, hint, &Type::Unreachable, &position)?;
        Ok(UnreachableExpression {
            info: TypeInformation::new(ctx, Type::Unreachable, hint),
            position,
        })
    }
}
