use crate::ast::Block;
use crate::typechecker::context::Context;
use crate::typechecker::types::Type;
use crate::typechecker::{TypeCheckable, TypeInformation, TypeResult};

impl TypeCheckable for Block<()> {
    type Typed = Block<TypeInformation>;

    fn check(self, ctx: &mut Context, _hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let Block {
            statements,
            position,
            ..
        } = self;

        let mut inner = ctx.clone();
        inner.scope.enter_scope();

        let mut checked = Vec::with_capacity(statements.len());
        for statement in statements {
            checked.push(statement.check(&mut inner, None)?);
        }

        Ok(Block {
            statements: checked,
            info: TypeInformation::new(ctx, Type::Void, None),
            position,
        })
    }
}
