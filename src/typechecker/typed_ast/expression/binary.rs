use crate::ast::{BinaryExpression, BinaryOperator, Expression, Postfix};
use crate::location::Location;
use crate::typechecker::context::Context;
use crate::typechecker::error::{
    ImmutableAssignment, InvalidAssignmentTarget, StructuralViolation, TypeCheckError,
    TypeMismatch,
};
use crate::typechecker::matcher::match_types;
use crate::typechecker::operators::{binary_overload_slot, resolve_operator_overload};
use crate::typechecker::promotion::promote_types;
use crate::typechecker::types::Type;
use crate::typechecker::{
    confirm_hint, TypeCheckable, TypeInformation, TypeResult, TypedConstruct,
};

impl TypeCheckable for BinaryExpression<()> {
    type Typed = BinaryExpression<TypeInformation>;

    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let BinaryExpression {
            left,
            right,
            operator,
            position,
            ..
        } = self;

        if operator == BinaryOperator::Assign {
            return check_assignment(ctx, left, right, position, hint);
        }
        if operator == BinaryOperator::NullCoalesce {
            return check_coalesce(ctx, left, right, position, hint);
        }

        let mut left = left.check(ctx, None)?;
        // A literal on the left settles against a numeric outer hint before
        // it becomes the right side's hint.
        if let Some(hint_type) = hint {
            if matches!(
                left.get_info().resolved_type(),
                Type::LiteralInt(_)
            ) && hint_type.dereference().is_numeric()
            {
                left.update_type(hint_type.clone())?;
            }
        }
        let left_type = left.get_info().resolved_type();

        // Classes and interfaces dispatch to their overload slot; there is
        // no numeric fallback for them.
        let slot = binary_overload_slot(operator);
        if matches!(left_type.dereference(), Type::Class(_) | Type::Interface(_)) {
            if let Some(slot) = slot {
                let mut right = right.clone().check(ctx, None)?;
                let right_type = right.get_info().resolved_type();
                let resolved = resolve_operator_overload(
                    ctx,
                    &left_type,
                    slot,
                    &[right_type],
                    hint,
                    &position,
                )?;
                if let Some((overload, return_type)) = resolved {
                    let parameter = overload.target.signature().parameters[0].type_id.clone();
                    right.update_type(parameter)?;
                    confirm_hint(ctx, hint, &return_type, &position)?;
                    return Ok(BinaryExpression {
                        left,
                        right,
                        operator,
                        overload: Some(overload),
                        info: TypeInformation::new(ctx, return_type, hint),
                        position,
                    });
                }
            }
        }

        // Numeric and logical handling. The left type flows into the right
        // side as a soft hint: it settles an unsettled literal but never
        // overrules a concrete operand (mixed kinds go through promotion).
        let mut right = right.check(ctx, None)?;
        if !operator.is_comparison()
            && matches!(right.get_info().resolved_type(), Type::LiteralInt(_))
            && left_type.dereference().is_numeric()
        {
            right.update_type(left_type.clone())?;
        }
        let right_type = right.get_info().resolved_type();

        let type_id = if operator.is_logical() {
            for (side, side_type) in [("left", &left_type), ("right", &right_type)] {
                let accepted = matches!(
                    side_type.dereference(),
                    Type::Boolean | Type::Basic(_) | Type::LiteralInt(_) | Type::Nullable(_)
                );
                if !accepted {
                    return Err(TypeCheckError::StructuralViolation(
                        StructuralViolation::new(format!(
                            "{side} operand of a logical operator must be bool, numeric or nullable, got '{side_type:?}'"
                        )),
                        position,
                    ));
                }
            }
            Type::Boolean
        } else if operator.is_comparison() {
            if matches!(operator, BinaryOperator::Equals | BinaryOperator::NotEquals) {
                equality_compatible(ctx, &left_type, &right_type, &position)?;
            } else {
                promote_or_fail(&left_type, &right_type, &position)?;
            }
            Type::Boolean
        } else if operator.is_bitwise() {
            let kind = promote_or_fail(&left_type, &right_type, &position)?;
            if kind.is_float() {
                return Err(TypeCheckError::StructuralViolation(
                    StructuralViolation::new("bitwise operators reject float operands"),
                    position,
                ));
            }
            Type::Basic(kind)
        } else {
            Type::Basic(promote_or_fail(&left_type, &right_type, &position)?)
        };

        confirm_hint(ctx, hint, &type_id, &position)?;
        Ok(BinaryExpression {
            left,
            right,
            operator,
            overload: None,
            info: TypeInformation::new(ctx, type_id, hint),
            position,
        })
    }
}

fn promote_or_fail(
    left: &Type,
    right: &Type,
    position: &Location,
) -> TypeResult<crate::typechecker::types::BasicKind> {
    promote_types(left, right).ok_or_else(|| {
        TypeCheckError::TypeMismatch(
            TypeMismatch {
                expected: left.clone(),
                actual: right.clone(),
                detail: Some("operands do not promote to a common numeric kind".to_string()),
            },
            position.clone(),
        )
    })
}

/// `==`/`!=` accept promotable numerics and otherwise any pair that is
/// assignable in one direction.
fn equality_compatible(
    ctx: &Context,
    left: &Type,
    right: &Type,
    position: &Location,
) -> TypeResult<()> {
    if promote_types(left, right).is_some() {
        return Ok(());
    }
    if match_types(ctx, left, right, false).is_ok() || match_types(ctx, right, left, false).is_ok()
    {
        return Ok(());
    }
    Err(TypeCheckError::TypeMismatch(
        TypeMismatch {
            expected: left.clone(),
            actual: right.clone(),
            detail: Some("these types can not be compared".to_string()),
        },
        position.clone(),
    ))
}

fn check_coalesce(
    ctx: &mut Context,
    left: Expression<()>,
    right: Expression<()>,
    position: Location,
    hint: Option<&Type>,
) -> TypeResult<BinaryExpression<TypeInformation>> {
    let mut inner = ctx.clone();
    inner.within_nullish_coalescing = true;
    let left = left.check(&mut inner, None)?;
    let left_type = left.get_info().resolved_type();

    let Some(inner_type) = left_type.nullable_inner() else {
        return Err(TypeCheckError::TypeMismatch(
            TypeMismatch {
                expected: Type::nullable(left_type.clone()),
                actual: left_type,
                detail: Some("left side of '??' must be nullable".to_string()),
            },
            position,
        ));
    };

    let right = right.check(ctx, Some(&inner_type))?;
    confirm_hint(ctx, hint, &inner_type, &position)?;
    Ok(BinaryExpression {
        left,
        right,
        operator: BinaryOperator::NullCoalesce,
        overload: None,
        info: TypeInformation::new(ctx, inner_type, hint),
        position,
    })
}

/// The base binding of an assignment target: the identifier at the root of
/// a member/index chain, or `None` when the chain roots in `this` or a
/// static (meta) access, which are always assignable.
fn base_binding<'a>(expr: &'a Expression<TypeInformation>) -> Result<Option<&'a str>, ()> {
    match expr {
        Expression::Id(id) => {
            if matches!(
                id.info.resolved_type(),
                Type::MetaClass(_) | Type::MetaVariant(_)
            ) {
                Ok(None)
            } else {
                Ok(Some(&id.name))
            }
        }
        Expression::This(_) => Ok(None),
        Expression::Postfix(Postfix::MemberAccess { expr, .. })
        | Expression::Postfix(Postfix::Index { expr, .. }) => base_binding(expr),
        _ => Err(()),
    }
}

fn expect_mutable_base(
    ctx: &Context,
    target: &Expression<TypeInformation>,
    position: &Location,
) -> TypeResult<()> {
    match base_binding(target) {
        Ok(Some(name)) => {
            let Some(variable) = ctx.scope.resolve_variable(name) else {
                return Ok(());
            };
            if variable.mutable {
                Ok(())
            } else {
                Err(TypeCheckError::ImmutableAssignment(
                    ImmutableAssignment {
                        name: name.to_string(),
                    },
                    position.clone(),
                ))
            }
        }
        Ok(None) => Ok(()),
        Err(()) => Err(TypeCheckError::InvalidAssignmentTarget(
            InvalidAssignmentTarget {
                detail: "not an assignable place".to_string(),
            },
            position.clone(),
        )),
    }
}

fn check_assignment(
    ctx: &mut Context,
    left: Expression<()>,
    right: Expression<()>,
    position: Location,
    hint: Option<&Type>,
) -> TypeResult<BinaryExpression<TypeInformation>> {
    match left {
        Expression::This(_) => Err(TypeCheckError::InvalidAssignmentTarget(
            InvalidAssignmentTarget {
                detail: "can not assign to 'this'".to_string(),
            },
            position,
        )),
        Expression::Id(_) | Expression::Postfix(Postfix::MemberAccess { .. }) => {
            let left = left.check(ctx, None)?;
            expect_mutable_base(ctx, &left, &position)?;
            let target_type = left.get_info().resolved_type();
            let right = right.check(ctx, Some(&target_type))?;

            confirm_hint(ctx, hint, &target_type, &position)?;
            Ok(BinaryExpression {
                left,
                right,
                operator: BinaryOperator::Assign,
                overload: None,
                info: TypeInformation::new(ctx, target_type, hint),
                position,
            })
        }
        Expression::Postfix(postfix @ Postfix::Index { .. }) => {
            check_index_assignment(ctx, postfix, right, position, hint)
        }
        Expression::Tuple(tuple) => {
            // Destructuring target: every element must name a mutable
            // variable.
            let mut element_types = Vec::with_capacity(tuple.elements.len());
            let mut checked_elements = Vec::with_capacity(tuple.elements.len());
            for element in tuple.elements {
                let id = match element {
                    Expression::Id(id) => id,
                    other => {
                        return Err(TypeCheckError::InvalidAssignmentTarget(
                            InvalidAssignmentTarget {
                                detail: "tuple destructuring targets must be plain variables"
                                    .to_string(),
                            },
                            other.position(),
                        ))
                    }
                };
                let id = id.check(ctx, None)?;
                if id.binding_mutability(ctx) != Some(true) {
                    return Err(TypeCheckError::ImmutableAssignment(
                        ImmutableAssignment {
                            name: id.name.clone(),
                        },
                        id.position.clone(),
                    ));
                }
                element_types.push(id.info.resolved_type());
                checked_elements.push(Expression::Id(id));
            }

            let target_type = Type::Tuple(element_types);
            let right = right.check(ctx, Some(&target_type))?;

            confirm_hint(ctx, hint, &target_type, &position)?;
            let left = Expression::Tuple(crate::ast::TupleConstruction {
                elements: checked_elements,
                info: TypeInformation::new(ctx, target_type.clone(), None),
                position: tuple.position,
            });
            Ok(BinaryExpression {
                left,
                right,
                operator: BinaryOperator::Assign,
                overload: None,
                info: TypeInformation::new(ctx, target_type, hint),
                position,
            })
        }
        other => Err(TypeCheckError::InvalidAssignmentTarget(
            InvalidAssignmentTarget {
                detail: format!("this {} is not assignable", describe(&other)),
            },
            position,
        )),
    }
}

fn describe(expr: &Expression<()>) -> &'static str {
    match expr {
        Expression::Literal(_) => "literal",
        Expression::Postfix(Postfix::Call { .. }) => "call result",
        Expression::New(_) => "construction",
        Expression::StructInit(_) | Expression::AnonStructInit(_) | Expression::Array(_) => {
            "construction"
        }
        _ => "expression",
    }
}

fn check_index_assignment(
    ctx: &mut Context,
    index_node: Postfix<()>,
    right: Expression<()>,
    position: Location,
    hint: Option<&Type>,
) -> TypeResult<BinaryExpression<TypeInformation>> {
    let Postfix::Index {
        expr,
        index,
        reverse,
        ..
    } = index_node
    else {
        unreachable!("caller matched an index node");
    };

    let object = expr.check(ctx, None)?;
    if object.get_info().constant {
        return Err(TypeCheckError::InvalidAssignmentTarget(
            InvalidAssignmentTarget {
                detail: "can not index-assign into a constant".to_string(),
            },
            position,
        ));
    }
    let object_type = object.get_info().resolved_type();

    match object_type.dereference() {
        Type::Array { element, .. } => {
            let index = super::postfix::check_array_index(ctx, *index)?;
            let right = right.check(ctx, Some(&element))?;
            let typed_left = Expression::Postfix(Postfix::Index {
                expr: Box::new(object),
                index: Box::new(index),
                reverse,
                overload: None,
                info: TypeInformation::new(ctx, (*element).clone(), None),
                position: position.clone(),
            });
            expect_mutable_base(ctx, &typed_left, &position)?;

            confirm_hint(ctx, hint, &element, &position)?;
            Ok(BinaryExpression {
                left: typed_left,
                right,
                operator: BinaryOperator::Assign,
                overload: None,
                info: TypeInformation::new(ctx, (*element).clone(), hint),
                position,
            })
        }
        Type::Class(_) | Type::Interface(_) => {
            let slot = if reverse {
                crate::typechecker::operators::REVERSE_INDEX_SET
            } else {
                crate::typechecker::operators::INDEX_SET
            };
            let index = index.check(ctx, None)?;
            let mut right = right.check(ctx, None)?;
            let resolved = resolve_operator_overload(
                ctx,
                &object_type,
                slot,
                &[
                    right.get_info().resolved_type(),
                    index.get_info().resolved_type(),
                ],
                None,
                &position,
            )?
            .expect("receiver is a class or interface");
            let (overload, return_type) = resolved;
            let signature = overload.target.signature();
            right.update_type(signature.parameters[0].type_id.clone())?;

            let typed_left = Expression::Postfix(Postfix::Index {
                expr: Box::new(object),
                index: Box::new(index),
                reverse,
                overload: Some(overload),
                info: TypeInformation::new(ctx, return_type.clone(), None),
                position: position.clone(),
            });

            confirm_hint(ctx, hint, &return_type, &position)?;
            Ok(BinaryExpression {
                left: typed_left,
                right,
                operator: BinaryOperator::Assign,
                overload: None,
                info: TypeInformation::new(ctx, return_type, hint),
                position,
            })
        }
        other => Err(TypeCheckError::TypeMismatch(
            TypeMismatch {
                expected: Type::array(Type::Unset),
                actual: other,
                detail: Some("only arrays and index overloads can be index-assigned".to_string()),
            },
            position,
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

    use crate::ast::{BinaryExpression, BinaryOperator, Expression, Id, Literal};
    use crate::location::Location;
    use crate::typechecker::context::Context;
    use crate::typechecker::types::{BasicKind, Type};
    use crate::typechecker::TypeCheckable;

    fn int(value: i128) -> Expression<()> {
        Expression::Literal(Literal::Integer(value, (), Location::default()))
    }

    #[test]
    fn test_promoted_addition_under_hint() -> Result<()> {
        let mut ctx = Context::default();
        let expression = BinaryExpression {
            left: int(255),
            right: int(300),
            operator: BinaryOperator::Add,
            overload: None,
            info: (),
            position: Location::default(),
        };

        let checked = expression.check(&mut ctx, Some(&Type::Basic(BasicKind::U16)))?;
        assert_eq!(
            checked.info.type_id.borrow().clone(),
            Some(Type::Basic(BasicKind::U16))
        );
        Ok(())
    }

    #[test]
    fn test_literal_fit_fails_through_binary_hint() {
        let mut ctx = Context::default();
        let expression = BinaryExpression {
            left: int(255),
            right: int(300),
            operator: BinaryOperator::Add,
            overload: None,
            info: (),
            position: Location::default(),
        };

        // 300 does not fit the u8 hint that arrives via the left operand.
        assert!(expression
            .check(&mut ctx, Some(&Type::Basic(BasicKind::U8)))
            .is_err());
    }

    #[test]
    fn test_comparison_yields_bool() -> Result<()> {
        let mut ctx = Context::default();
        let expression = BinaryExpression {
            left: int(1),
            right: int(2),
            operator: BinaryOperator::LessThan,
            overload: None,
            info: (),
            position: Location::default(),
        };

        let checked = expression.check(&mut ctx, None)?;
        assert_eq!(
            checked.info.type_id.borrow().clone(),
            Some(Type::Boolean)
        );
        Ok(())
    }

    #[test]
    fn test_bitwise_rejects_floats() {
        let mut ctx = Context::default();
        let expression = BinaryExpression {
            left: Expression::Literal(Literal::Float(1.0, (), Location::default())),
            right: Expression::Literal(Literal::Float(2.0, (), Location::default())),
            operator: BinaryOperator::BitAnd,
            overload: None,
            info: (),
            position: Location::default(),
        };

        assert!(expression.check(&mut ctx, None).is_err());
    }

    #[test]
    fn test_assignment_to_immutable_binding_fails() {
        let mut ctx = Context::default();
        ctx.scope.add_variable(
            "x",
            Rc::new(RefCell::new(Some(Type::Basic(BasicKind::U32)))),
            false,
            false,
            Location::default(),
        );

        let assignment = BinaryExpression {
            left: Expression::Id(Id::new("x")),
            right: int(1),
            operator: BinaryOperator::Assign,
            overload: None,
            info: (),
            position: Location::default(),
        };

        assert!(assignment.check(&mut ctx, None).is_err());
    }

    #[test]
    fn test_assignment_to_mutable_binding() -> Result<()> {
        let mut ctx = Context::default();
        ctx.scope.add_variable(
            "x",
            Rc::new(RefCell::new(Some(Type::Basic(BasicKind::U32)))),
            true,
            false,
            Location::default(),
        );

        let assignment = BinaryExpression {
            left: Expression::Id(Id::new("x")),
            right: int(7),
            operator: BinaryOperator::Assign,
            overload: None,
            info: (),
            position: Location::default(),
        };

        let checked = assignment.check(&mut ctx, None)?;
        assert_eq!(
            checked.info.type_id.borrow().clone(),
            Some(Type::Basic(BasicKind::U32))
        );
        Ok(())
    }

    #[test]
    fn test_coalesce_unwraps_nullable() -> Result<()> {
        let mut ctx = Context::default();
        ctx.scope.add_variable(
            "maybe",
            Rc::new(RefCell::new(Some(Type::nullable(Type::Basic(
                BasicKind::U32,
            ))))),
            false,
            false,
            Location::default(),
        );

        let expression = BinaryExpression {
            left: Expression::Id(Id::new("maybe")),
            right: int(0),
            operator: BinaryOperator::NullCoalesce,
            overload: None,
            info: (),
            position: Location::default(),
        };

        let checked = expression.check(&mut ctx, None)?;
        assert_eq!(
            checked.info.type_id.borrow().clone(),
            Some(Type::Basic(BasicKind::U32))
        );
        Ok(())
    }
}
