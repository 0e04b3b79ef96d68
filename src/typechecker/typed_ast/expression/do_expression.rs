use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::{DoExpression, Statement};
use crate::typechecker::context::{Context, ReturnContext};
use crate::typechecker::error::{StructuralViolation, TypeCheckError, TypeMismatch};
use crate::typechecker::types::Type;
use crate::typechecker::unify::find_compatible_types;
use crate::typechecker::{confirm_hint, TypeCheckable, TypeInformation, TypeResult};

impl TypeCheckable for DoExpression<()> {
    type Typed = DoExpression<TypeInformation>;

    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let DoExpression {
            statements,
            position,
            ..
        } = self;

        if !matches!(statements.last(), Some(Statement::Return(_))) {
            return Err(TypeCheckError::StructuralViolation(
                StructuralViolation::new("the last statement of a do-expression must be 'return'"),
                position,
            ));
        }

        // Returns inside the block leave the do-expression, not the
        // enclosing function.
        let mut inner = ctx.clone();
        inner.scope.enter_scope();
        let return_context = ReturnContext {
            declared: hint.cloned(),
            collected: Rc::new(RefCell::new(vec![])),
        };
        inner.return_context = Some(return_context.clone());

        let mut checked = Vec::with_capacity(statements.len());
        for statement in statements {
            checked.push(statement.check(&mut inner, None)?);
        }

        let collected = return_context.collected.borrow().clone();
        let types = collected
            .iter()
            .map(|r| r.type_id.clone())
            .collect::<Vec<_>>();
        let Some(type_id) = find_compatible_types(ctx, &types) else {
            return Err(TypeCheckError::TypeMismatch(
                TypeMismatch {
                    expected: types.first().cloned().unwrap_or(Type::Void),
                    actual: types.last().cloned().unwrap_or(Type::Void),
                    detail: Some("do-expression returns disagree on a common type".to_string()),
                },
                position,
            ));
        };

        confirm_hint(ctx, hint, &type_id, &position)?;
        Ok(DoExpression {
            statements: checked,
            info: TypeInformation::new(ctx, type_id, hint),
            position,
        })
    }
}
