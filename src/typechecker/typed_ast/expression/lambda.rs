use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::{Lambda, LambdaBody, LambdaParameter};
use crate::typechecker::context::{Context, ReturnContext};
use crate::typechecker::error::{StructuralViolation, TypeCheckError};
use crate::typechecker::functions::reconcile_return_type;
use crate::typechecker::types::{FunctionParameter, FunctionType, Type};
use crate::typechecker::warning::TypeCheckWarning;
use crate::typechecker::{confirm_hint, TypeCheckable, TypeInformation, TypeResult};

use super::construction::check_tuple_construction;

impl TypeCheckable for Lambda<()> {
    type Typed = Lambda<TypeInformation>;

    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let Lambda {
            parameters,
            return_type,
            body,
            is_coroutine,
            position,
            ..
        } = self;

        // A function-shaped hint supplies parameter and return types that
        // the lambda itself leaves off.
        let hint_signature = match hint.map(|h| h.dereference()) {
            Some(Type::Function(signature)) => Some(signature),
            Some(Type::Coroutine(signature)) if is_coroutine => Some(*signature),
            _ => None,
        };

        let mut resolved_parameters = Vec::with_capacity(parameters.len());
        let mut checked_parameters = Vec::with_capacity(parameters.len());
        for (index, parameter) in parameters.into_iter().enumerate() {
            let LambdaParameter {
                name,
                type_name,
                mutable,
                position: parameter_position,
            } = parameter;

            let type_id = match &type_name {
                Some(type_name) => Type::try_from((type_name.clone(), &*ctx))?,
                None => match hint_signature
                    .as_ref()
                    .and_then(|s| s.parameters.get(index))
                {
                    Some(hinted) => hinted.type_id.clone(),
                    None => {
                        return Err(TypeCheckError::StructuralViolation(
                            StructuralViolation::new(format!(
                                "can not infer the type of lambda parameter '{}'",
                                name.name
                            )),
                            parameter_position,
                        ))
                    }
                },
            };

            resolved_parameters.push(FunctionParameter {
                name: name.name.clone(),
                type_id: type_id.clone(),
                mutable,
            });
            checked_parameters.push(LambdaParameter {
                name: crate::ast::Id {
                    name: name.name,
                    type_args: vec![],
                    info: TypeInformation::new(ctx, type_id, None),
                    position: name.position,
                },
                type_name,
                mutable,
                position: parameter_position,
            });
        }

        let declared = match &return_type {
            Some(type_name) => Some(Type::try_from((type_name.clone(), &*ctx))?),
            None => hint_signature
                .as_ref()
                .map(|s| (*s.return_type).clone())
                .filter(|t| !matches!(t, Type::Unset)),
        };

        let mut inner = ctx.clone();
        inner.scope.enter_scope();
        inner.within_loop = false;
        inner.within_coroutine = is_coroutine;
        inner.yield_hint = if is_coroutine { declared.clone() } else { None };
        let return_context = ReturnContext {
            declared: declared.clone(),
            collected: Rc::new(RefCell::new(vec![])),
        };
        inner.return_context = Some(return_context.clone());

        let mut tracked = Vec::with_capacity(resolved_parameters.len());
        for (parameter, checked) in resolved_parameters.iter().zip(checked_parameters.iter()) {
            let stored = inner.scope.add_tracked_variable(
                &parameter.name,
                Rc::new(RefCell::new(Some(parameter.type_id.clone()))),
                parameter.mutable,
                checked.position.clone(),
            );
            tracked.push((parameter.name.clone(), checked.position.clone(), stored.used));
        }

        let checked_body = match body {
            LambdaBody::Expression(expression) => {
                if is_coroutine {
                    return Err(TypeCheckError::StructuralViolation(
                        StructuralViolation::new(
                            "coroutine-callable lambdas need a block body",
                        ),
                        position,
                    ));
                }
                let expression = match *expression {
                    crate::ast::Expression::Tuple(tuple) => crate::ast::Expression::Tuple(
                        check_tuple_construction(&mut inner, tuple, declared.as_ref())?,
                    ),
                    other => other.check(&mut inner, declared.as_ref())?,
                };
                LambdaBody::Expression(Box::new(expression))
            }
            LambdaBody::Block(statements) => {
                let mut checked = Vec::with_capacity(statements.len());
                for statement in statements {
                    checked.push(statement.check(&mut inner, None)?);
                }
                LambdaBody::Block(checked)
            }
        };

        let collected = return_context.collected.borrow().clone();
        if is_coroutine && !collected.is_empty() {
            return Err(TypeCheckError::StructuralViolation(
                StructuralViolation::new("coroutine-callable lambdas can not contain 'return'"),
                collected[0].position.clone(),
            ));
        }

        let body_for_reconcile = match &checked_body {
            LambdaBody::Expression(expression) => {
                crate::ast::FunctionBody::Expression(expression.clone())
            }
            LambdaBody::Block(_) => crate::ast::FunctionBody::Block(vec![]),
        };
        let declared_or_unset = declared.clone().unwrap_or(Type::Unset);
        let inferred_return = reconcile_return_type(
            &inner,
            &declared_or_unset,
            &body_for_reconcile,
            &collected,
            &position,
        )?;

        for (name, parameter_position, used) in tracked {
            if !used.get() {
                inner.warn(TypeCheckWarning::UnusedParameter {
                    name,
                    position: parameter_position,
                });
            }
        }

        let signature = FunctionType::new(resolved_parameters, inferred_return);
        let type_id = if is_coroutine {
            Type::Coroutine(Box::new(signature.clone()))
        } else {
            Type::Function(signature.clone())
        };

        let registered_name = ctx.register_lambda(signature, position.clone());

        confirm_hint(ctx, hint, &type_id, &position)?;
        Ok(Lambda {
            parameters: checked_parameters,
            return_type,
            body: checked_body,
            is_coroutine,
            registered_name: Some(registered_name),
            info: TypeInformation::new(ctx, type_id, hint),
            position,
        })
    }
}

#[cfg(test)]
mod tests {
    type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

    use crate::ast::{Expression, Id, Lambda, LambdaBody, LambdaParameter, TypeName};
    use crate::location::Location;
    use crate::typechecker::context::Context;
    use crate::typechecker::types::{BasicKind, FunctionParameter, Type};
    use crate::typechecker::TypeCheckable;

    #[test]
    fn test_annotated_lambda() -> Result<()> {
        let mut ctx = Context::default();
        let lambda = Lambda {
            parameters: vec![LambdaParameter {
                name: Id::new("x"),
                type_name: Some(TypeName::named("u32")),
                mutable: false,
                position: Location::default(),
            }],
            return_type: None,
            body: LambdaBody::Expression(Box::new(Expression::Id(Id::new("x")))),
            is_coroutine: false,
            registered_name: None,
            info: (),
            position: Location::default(),
        };

        let checked = lambda.check(&mut ctx, None)?;
        assert_eq!(
            checked.info.type_id.borrow().clone(),
            Some(Type::function(
                vec![FunctionParameter {
                    name: "x".into(),
                    type_id: Type::Basic(BasicKind::U32),
                    mutable: false,
                }],
                Type::Basic(BasicKind::U32),
            ))
        );
        assert_eq!(checked.registered_name.as_deref(), Some("lambda-0"));
        Ok(())
    }

    #[test]
    fn test_parameter_types_flow_from_hint() -> Result<()> {
        let mut ctx = Context::default();
        let lambda = Lambda {
            parameters: vec![LambdaParameter {
                name: Id::new("x"),
                type_name: None,
                mutable: false,
                position: Location::default(),
            }],
            return_type: None,
            body: LambdaBody::Expression(Box::new(Expression::Id(Id::new("x")))),
            is_coroutine: false,
            registered_name: None,
            info: (),
            position: Location::default(),
        };

        let hint = Type::function(
            vec![FunctionParameter {
                name: "x".into(),
                type_id: Type::Boolean,
                mutable: false,
            }],
            Type::Boolean,
        );
        let checked = lambda.check(&mut ctx, Some(&hint))?;
        assert_eq!(checked.info.type_id.borrow().clone(), Some(hint));
        Ok(())
    }

    #[test]
    fn test_unannotated_parameter_without_hint_fails() {
        let mut ctx = Context::default();
        let lambda = Lambda {
            parameters: vec![LambdaParameter {
                name: Id::new("x"),
                type_name: None,
                mutable: false,
                position: Location::default(),
            }],
            return_type: None,
            body: LambdaBody::Expression(Box::new(Expression::Id(Id::new("x")))),
            is_coroutine: false,
            registered_name: None,
            info: (),
            position: Location::default(),
        };

        assert!(lambda.check(&mut ctx, None).is_err());
    }
}
