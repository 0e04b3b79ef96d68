use crate::ast::{BreakStatement, ContinueStatement, YieldStatement};
use crate::typechecker::context::Context;
use crate::typechecker::error::{StructuralViolation, TypeCheckError};
use crate::typechecker::types::Type;
use crate::typechecker::{TypeCheckable, TypeInformation, TypeResult};

pub(super) fn check_break(ctx: &Context, statement: BreakStatement) -> TypeResult<BreakStatement> {
    if !ctx.within_loop {
        return Err(TypeCheckError::StructuralViolation(
            StructuralViolation::new("'break' is only valid inside a loop"),
            statement.position,
        ));
    }
    Ok(statement)
}

pub(super) fn check_continue(
    ctx: &Context,
    statement: ContinueStatement,
) -> TypeResult<ContinueStatement> {
    if !ctx.within_loop {
        return Err(TypeCheckError::StructuralViolation(
            StructuralViolation::new("'continue' is only valid inside a loop"),
            statement.position,
        ));
    }
    Ok(statement)
}

impl TypeCheckable for YieldStatement<()> {
    type Typed = YieldStatement<TypeInformation>;

    fn check(self, ctx: &mut Context, _hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let YieldStatement {
            value, position, ..
        } = self;

        if !ctx.within_coroutine {
            return Err(TypeCheckError::StructuralViolation(
                StructuralViolation::new(
                    "'yield' is only valid inside a coroutine-callable lambda",
                ),
                position,
            ));
        }

        let yield_hint = ctx.yield_hint.clone();
        let value = value.check(ctx, yield_hint.as_ref())?;
        let type_id = value.get_info().resolved_type();

        Ok(YieldStatement {
            value,
            info: TypeInformation::new(ctx, type_id, None),
            position,
        })
    }
}
