use crate::ast::IfElseExpression;
use crate::typechecker::context::Context;
use crate::typechecker::error::{StructuralViolation, TypeCheckError, TypeMismatch};
use crate::typechecker::types::Type;
use crate::typechecker::unify::find_compatible_types;
use crate::typechecker::{confirm_hint, TypeCheckable, TypeInformation, TypeResult};

impl TypeCheckable for IfElseExpression<()> {
    type Typed = IfElseExpression<TypeInformation>;

    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let IfElseExpression {
            conditions,
            branches,
            position,
            ..
        } = self;

        if branches.len() != conditions.len() + 1 {
            return Err(TypeCheckError::StructuralViolation(
                StructuralViolation::new(
                    "a conditional expression needs a trailing 'else' branch",
                ),
                position,
            ));
        }

        let mut checked_conditions = Vec::with_capacity(conditions.len());
        for condition in conditions {
            checked_conditions.push(condition.check(ctx, Some(&Type::Boolean))?);
        }

        let mut checked_branches = Vec::with_capacity(branches.len());
        let mut branch_types = Vec::with_capacity(branches.len());
        for branch in branches {
            let branch = branch.check(ctx, hint)?;
            branch_types.push(branch.get_info().resolved_type());
            checked_branches.push(branch);
        }

        let Some(type_id) = find_compatible_types(ctx, &branch_types) else {
            return Err(TypeCheckError::TypeMismatch(
                TypeMismatch {
                    expected: branch_types[0].clone(),
                    actual: branch_types[branch_types.len() - 1].clone(),
                    detail: Some("branches disagree on a common type".to_string()),
                },
                position,
            ));
        };

        confirm_hint(ctx, hint, &type_id, &position)?;
        Ok(IfElseExpression {
            conditions: checked_conditions,
            branches: checked_branches,
            branch_label: Some(ctx.next_branch_label()),
            info: TypeInformation::new(ctx, type_id, hint),
            position,
        })
    }
}

#[cfg(test)]
mod tests {
    type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

    use crate::ast::{Expression, IfElseExpression, Literal};
    use crate::location::Location;
    use crate::typechecker::context::Context;
    use crate::typechecker::types::{BasicKind, Type};
    use crate::typechecker::TypeCheckable;

    #[test]
    fn test_branches_unify_under_hint() -> Result<()> {
        let mut ctx = Context::default();
        let expression = IfElseExpression {
            conditions: vec![Expression::Literal(Literal::Bool(
                true,
                (),
                Location::default(),
            ))],
            branches: vec![
                Expression::Literal(Literal::Integer(1, (), Location::default())),
                Expression::Literal(Literal::Integer(2, (), Location::default())),
            ],
            branch_label: None,
            info: (),
            position: Location::default(),
        };

        let checked = expression.check(&mut ctx, Some(&Type::Basic(BasicKind::U32)))?;
        assert_eq!(
            checked.info.type_id.borrow().clone(),
            Some(Type::Basic(BasicKind::U32))
        );
        assert!(checked.branch_label.is_some());
        Ok(())
    }

    #[test]
    fn test_condition_must_be_bool() {
        let mut ctx = Context::default();
        let expression = IfElseExpression {
            conditions: vec![Expression::Literal(Literal::Str(
                "nope".into(),
                (),
                Location::default(),
            ))],
            branches: vec![
                Expression::Literal(Literal::Bool(true, (), Location::default())),
                Expression::Literal(Literal::Bool(false, (), Location::default())),
            ],
            branch_label: None,
            info: (),
            position: Location::default(),
        };

        assert!(expression.check(&mut ctx, None).is_err());
    }

    #[test]
    fn test_incompatible_branches_fail() {
        let mut ctx = Context::default();
        let expression = IfElseExpression {
            conditions: vec![Expression::Literal(Literal::Bool(
                true,
                (),
                Location::default(),
            ))],
            branches: vec![
                Expression::Literal(Literal::Bool(true, (), Location::default())),
                Expression::Literal(Literal::Str("str".into(), (), Location::default())),
            ],
            branch_label: None,
            info: (),
            position: Location::default(),
        };

        assert!(expression.check(&mut ctx, None).is_err());
    }
}
