use std::rc::Rc;

use crate::ast::This;
use crate::typechecker::context::Context;
use crate::typechecker::error::{StructuralViolation, TypeCheckError};
use crate::typechecker::types::Type;
use crate::typechecker::{confirm_hint, TypeCheckable, TypeInformation, TypeResult};

impl TypeCheckable for This<()> {
    type Typed = This<TypeInformation>;

    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let This { position, .. } = self;

        let Some(class) = &ctx.active_class else {
            return Err(TypeCheckError::StructuralViolation(
                StructuralViolation::new("'this' is only valid inside a class method"),
                position,
            ));
        };
        if ctx.in_static_method {
            return Err(TypeCheckError::StructuralViolation(
                StructuralViolation::new("'this' is not available in a static method"),
                position,
            ));
        }

        let type_id = Type::Class(Rc::clone(class));
        confirm_hint(ctx, hint, &type_id, &position)?;
        Ok(This {
            info: TypeInformation::new(ctx, type_id, hint),
            position,
        })
    }
}
