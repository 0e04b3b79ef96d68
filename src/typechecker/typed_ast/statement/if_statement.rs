use crate::ast::IfStatement;
use crate::typechecker::context::Context;
use crate::typechecker::types::Type;
use crate::typechecker::{TypeCheckable, TypeInformation, TypeResult};

impl TypeCheckable for IfStatement<()> {
    type Typed = IfStatement<TypeInformation>;

    fn check(self, ctx: &mut Context, _hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let IfStatement {
            condition,
            then_block,
            else_block,
            position,
            ..
        } = self;

        let condition = condition.check(ctx, Some(&Type::Boolean))?;
        let then_block = then_block.check(ctx, None)?;
        let else_block = match else_block {
            Some(block) => Some(block.check(ctx, None)?),
            None => None,
        };

        Ok(IfStatement {
            condition,
            then_block,
            else_block,
            info: TypeInformation::new(ctx, Type::Void, None),
            position,
        })
    }
}
