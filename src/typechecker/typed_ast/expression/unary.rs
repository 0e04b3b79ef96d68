use crate::ast::{Expression, Literal, UnaryExpression, UnaryOperator};
use crate::typechecker::context::Context;
use crate::typechecker::error::{
    ImmutableAssignment, StructuralViolation, TypeCheckError, TypeMismatch,
};
use crate::typechecker::operators::{resolve_operator_overload, unary_overload_slot};
use crate::typechecker::types::{BasicKind, Type};
use crate::typechecker::{confirm_hint, TypeCheckable, TypeInformation, TypeResult};

impl TypeCheckable for UnaryExpression<()> {
    type Typed = UnaryExpression<TypeInformation>;

    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let UnaryExpression {
            operator,
            expr,
            position,
            ..
        } = self;

        // `-literal` types as the negated literal itself, with the fit
        // check against the (possibly hinted) kind done on the negated
        // value.
        if operator == UnaryOperator::Minus {
            if let Expression::Literal(Literal::Integer(value, info, literal_position)) = expr {
                let negated =
                    Literal::Integer(-value, info, literal_position.clone()).check(ctx, hint)?;
                let type_id = negated.get_info().resolved_type();
                // The operand keeps its written value; only the type was
                // derived from the negated one.
                let expr = match negated {
                    Literal::Integer(_, info, _) => Expression::Literal(Literal::Integer(
                        value,
                        info,
                        literal_position,
                    )),
                    _ => unreachable!("an integer literal stays an integer literal"),
                };
                return Ok(UnaryExpression {
                    operator,
                    expr,
                    overload: None,
                    info: TypeInformation::new(ctx, type_id, hint).constant(),
                    position,
                });
            }
        }

        let expr = expr.check(ctx, None)?;
        let operand_type = expr.get_info().resolved_type();

        if let Some(slot) = unary_overload_slot(operator) {
            if matches!(
                operand_type.dereference(),
                Type::Class(_) | Type::Interface(_)
            ) {
                let (overload, return_type) =
                    resolve_operator_overload(ctx, &operand_type, slot, &[], hint, &position)?
                        .expect("receiver is a class or interface");
                confirm_hint(ctx, hint, &return_type, &position)?;
                return Ok(UnaryExpression {
                    operator,
                    expr,
                    overload: Some(overload),
                    info: TypeInformation::new(ctx, return_type, hint),
                    position,
                });
            }
        }

        let type_id = match operator {
            UnaryOperator::Minus => match operand_type.numeric_kind() {
                Some(kind) if kind.is_signed() || kind.is_float() => Type::Basic(kind),
                Some(kind) => {
                    // Negating an unsigned operand promotes into the signed
                    // family wide enough to hold it.
                    let signed = match kind {
                        BasicKind::U8 => BasicKind::I16,
                        BasicKind::U16 => BasicKind::I32,
                        _ => BasicKind::I64,
                    };
                    Type::Basic(signed)
                }
                None => {
                    return Err(mismatch(
                        Type::Basic(BasicKind::I64),
                        operand_type,
                        &position,
                    ))
                }
            },
            UnaryOperator::Not => {
                let accepted = matches!(
                    operand_type.dereference(),
                    Type::Boolean | Type::Basic(_) | Type::LiteralInt(_) | Type::Nullable(_)
                );
                if !accepted {
                    return Err(mismatch(Type::Boolean, operand_type, &position));
                }
                Type::Boolean
            }
            UnaryOperator::Denull => match operand_type.nullable_inner() {
                Some(inner) => inner,
                None => {
                    return Err(TypeCheckError::TypeMismatch(
                        TypeMismatch {
                            expected: Type::nullable(operand_type.clone()),
                            actual: operand_type,
                            detail: Some("'!!' requires a nullable operand".to_string()),
                        },
                        position,
                    ))
                }
            },
            UnaryOperator::BitNot => match operand_type.numeric_kind() {
                Some(kind) if kind.is_integer() => Type::Basic(kind),
                _ => {
                    return Err(TypeCheckError::StructuralViolation(
                        StructuralViolation::new("'~' is only defined on integers"),
                        position,
                    ))
                }
            },
            UnaryOperator::PreIncrement
            | UnaryOperator::PostIncrement
            | UnaryOperator::PreDecrement
            | UnaryOperator::PostDecrement => {
                let kind = match operand_type.numeric_kind() {
                    Some(kind) if kind.is_integer() => kind,
                    _ => {
                        return Err(TypeCheckError::StructuralViolation(
                            StructuralViolation::new(
                                "increment and decrement are only defined on integers",
                            ),
                            position,
                        ))
                    }
                };
                // The operand is written back, so it must be a mutable
                // binding.
                if let Expression::Id(id) = &expr {
                    if id.binding_mutability(ctx) == Some(false) {
                        return Err(TypeCheckError::ImmutableAssignment(
                            ImmutableAssignment {
                                name: id.name.clone(),
                            },
                            position,
                        ));
                    }
                }
                Type::Basic(kind)
            }
        };

        confirm_hint(ctx, hint, &type_id, &position)?;
        Ok(UnaryExpression {
            operator,
            expr,
            overload: None,
            info: TypeInformation::new(ctx, type_id, hint),
            position,
        })
    }
}

fn mismatch(
    expected: Type,
    actual: Type,
    position: &crate::location::Location,
) -> TypeCheckError {
    TypeCheckError::TypeMismatch(
        TypeMismatch {
            expected,
            actual,
            detail: None,
        },
        position.clone(),
    )
}

#[cfg(test)]
mod tests {
    type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

    use crate::ast::{Expression, Literal, UnaryExpression, UnaryOperator};
    use crate::location::Location;
    use crate::typechecker::context::Context;
    use crate::typechecker::types::{BasicKind, Type};
    use crate::typechecker::TypeCheckable;

    #[test]
    fn test_negated_literal_settles_under_hint() -> Result<()> {
        let mut ctx = Context::default();
        let expression = UnaryExpression {
            operator: UnaryOperator::Minus,
            expr: Expression::Literal(Literal::Integer(128, (), Location::default())),
            overload: None,
            info: (),
            position: Location::default(),
        };

        // -128 fits i8 even though 128 does not.
        let checked = expression.check(&mut ctx, Some(&Type::Basic(BasicKind::I8)))?;
        assert_eq!(
            checked.info.type_id.borrow().clone(),
            Some(Type::Basic(BasicKind::I8))
        );
        Ok(())
    }

    #[test]
    fn test_denull_requires_nullable() {
        let mut ctx = Context::default();
        let expression = UnaryExpression {
            operator: UnaryOperator::Denull,
            expr: Expression::Literal(Literal::Bool(true, (), Location::default())),
            overload: None,
            info: (),
            position: Location::default(),
        };

        assert!(expression.check(&mut ctx, None).is_err());
    }

    #[test]
    fn test_not_on_bool() -> Result<()> {
        let mut ctx = Context::default();
        let expression = UnaryExpression {
            operator: UnaryOperator::Not,
            expr: Expression::Literal(Literal::Bool(true, (), Location::default())),
            overload: None,
            info: (),
            position: Location::default(),
        };

        let checked = expression.check(&mut ctx, None)?;
        assert_eq!(checked.info.type_id.borrow().clone(), Some(Type::Boolean));
        Ok(())
    }
}
