use crate::ast::{Expression, ReturnStatement};
use crate::typechecker::context::{CollectedReturn, Context};
use crate::typechecker::error::{StructuralViolation, TypeCheckError};
use crate::typechecker::types::Type;
use crate::typechecker::{TypeCheckable, TypeInformation, TypeResult};

use super::super::expression::check_tuple_construction;

impl TypeCheckable for ReturnStatement<()> {
    type Typed = ReturnStatement<TypeInformation>;

    fn check(self, ctx: &mut Context, _hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let ReturnStatement {
            value, position, ..
        } = self;

        let Some(return_context) = ctx.return_context.clone() else {
            return Err(TypeCheckError::StructuralViolation(
                StructuralViolation::new("'return' is only valid inside a function body"),
                position,
            ));
        };
        let declared = return_context.declared.clone();

        let value = match value {
            // Tuple construction is legal in return position.
            Some(Expression::Tuple(tuple)) => Some(Expression::Tuple(
                check_tuple_construction(ctx, tuple, declared.as_ref())?,
            )),
            Some(value) => Some(value.check(ctx, declared.as_ref())?),
            None => None,
        };

        let (type_id, hint_slot) = match &value {
            Some(value) => {
                let info = value.get_info();
                (info.resolved_type(), info.hint)
            }
            None => {
                let info = TypeInformation::new(ctx, Type::Void, None);
                (Type::Void, info.hint)
            }
        };

        return_context.collected.borrow_mut().push(CollectedReturn {
            type_id: type_id.clone(),
            position: position.clone(),
            hint_slot,
        });

        Ok(ReturnStatement {
            value,
            info: TypeInformation::new(ctx, type_id, None),
            position,
        })
    }
}
