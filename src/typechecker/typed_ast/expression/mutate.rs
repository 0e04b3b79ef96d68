use crate::ast::{Expression, MutateExpression};
use crate::typechecker::context::Context;
use crate::typechecker::warning::TypeCheckWarning;
use crate::typechecker::types::Type;
use crate::typechecker::{confirm_hint, TypeCheckable, TypeInformation, TypeResult};

impl TypeCheckable for MutateExpression<()> {
    type Typed = MutateExpression<TypeInformation>;

    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let MutateExpression {
            expr, position, ..
        } = self;

        let expr = expr.check(ctx, hint)?;

        if let Expression::Id(id) = &expr {
            if id.binding_mutability(ctx) == Some(true) {
                ctx.warn(TypeCheckWarning::RedundantMutate {
                    position: position.clone(),
                });
            }
        }

        let type_id = expr.get_info().resolved_type();
        confirm_hint(ctx, hint, &type_id, &position)?;
        Ok(MutateExpression {
            expr,
            info: TypeInformation::new(ctx, type_id, hint),
            position,
        })
    }
}
