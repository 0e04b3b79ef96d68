use crate::ast::{ArrayConstruction, ArrayElement, TupleConstruction};
use crate::typechecker::context::Context;
use crate::typechecker::error::{StructuralViolation, TypeCheckError, TypeMismatch};
use crate::typechecker::types::Type;
use crate::typechecker::unify::find_compatible_types;
use crate::typechecker::{confirm_hint, TypeCheckable, TypeInformation, TypeResult};

/// Tuples are not general expressions; only return positions (and
/// destructuring targets, handled by assignment) construct them. The
/// general dispatch therefore always rejects, and the return paths call
/// `check_tuple_construction` directly.
impl TypeCheckable for TupleConstruction<()> {
    type Typed = TupleConstruction<TypeInformation>;

    fn check(self, _ctx: &mut Context, _hint: Option<&Type>) -> TypeResult<Self::Typed> {
        Err(TypeCheckError::StructuralViolation(
            StructuralViolation::new(
                "tuples can only be constructed in return position or destructured",
            ),
            self.position,
        ))
    }
}

pub(crate) fn check_tuple_construction(
    ctx: &mut Context,
    tuple: TupleConstruction<()>,
    hint: Option<&Type>,
) -> TypeResult<TupleConstruction<TypeInformation>> {
    let TupleConstruction {
        elements, position, ..
    } = tuple;

    if elements.len() < 2 {
        return Err(TypeCheckError::StructuralViolation(
            StructuralViolation::new("tuples need at least two elements"),
            position,
        ));
    }

    let element_hints: Vec<Option<Type>> = match hint.map(|h| h.dereference()) {
        Some(Type::Tuple(types)) if types.len() == elements.len() => {
            types.into_iter().map(Some).collect()
        }
        _ => vec![None; elements.len()],
    };

    let mut checked = Vec::with_capacity(elements.len());
    let mut types = Vec::with_capacity(elements.len());
    for (element, element_hint) in elements.into_iter().zip(element_hints) {
        let element = element.check(ctx, element_hint.as_ref())?;
        let element_type = element.get_info().resolved_type();
        if matches!(element_type.dereference(), Type::Tuple(_)) {
            return Err(TypeCheckError::StructuralViolation(
                StructuralViolation::new("tuples can not nest inside tuples"),
                element.position(),
            ));
        }
        types.push(element_type);
        checked.push(element);
    }

    let type_id = Type::Tuple(types);
    confirm_hint(ctx, hint, &type_id, &position)?;
    Ok(TupleConstruction {
        elements: checked,
        info: TypeInformation::new(ctx, type_id, hint),
        position,
    })
}

impl TypeCheckable for ArrayConstruction<()> {
    type Typed = ArrayConstruction<TypeInformation>;

    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let ArrayConstruction {
            elements, position, ..
        } = self;

        let element_hint = match hint.map(|h| h.dereference()) {
            Some(Type::Array { element, .. }) => Some(*element),
            _ => None,
        };

        let mut checked = Vec::with_capacity(elements.len());
        let mut element_types = Vec::new();
        for element in elements {
            match element {
                ArrayElement::Single(expression) => {
                    let expression = expression.check(ctx, element_hint.as_ref())?;
                    element_types.push(expression.get_info().resolved_type());
                    checked.push(ArrayElement::Single(expression));
                }
                ArrayElement::Spread(expression) => {
                    let spread_hint = element_hint.clone().map(Type::array);
                    let expression = expression.check(ctx, spread_hint.as_ref())?;
                    let spread_type = expression.get_info().resolved_type();
                    let Type::Array { element, .. } = spread_type.dereference() else {
                        return Err(TypeCheckError::TypeMismatch(
                            TypeMismatch {
                                expected: Type::array(Type::Unset),
                                actual: spread_type,
                                detail: Some("spread elements must be arrays".to_string()),
                            },
                            expression.position(),
                        ));
                    };
                    element_types.push(*element);
                    checked.push(ArrayElement::Spread(expression));
                }
            }
        }

        let element_type = match (element_types.is_empty(), &element_hint) {
            (true, Some(hinted)) => hinted.clone(),
            (true, None) => {
                return Err(TypeCheckError::StructuralViolation(
                    StructuralViolation::new(
                        "the element type of an empty array can not be inferred here",
                    ),
                    position,
                ))
            }
            (false, _) => match find_compatible_types(ctx, &element_types) {
                Some(unified) => settle(unified),
                None => {
                    return Err(TypeCheckError::TypeMismatch(
                        TypeMismatch {
                            expected: element_types[0].clone(),
                            actual: element_types[element_types.len() - 1].clone(),
                            detail: Some(
                                "array elements disagree on a common type".to_string(),
                            ),
                        },
                        position,
                    ))
                }
            },
        };

        let type_id = Type::array(element_type);
        confirm_hint(ctx, hint, &type_id, &position)?;
        Ok(ArrayConstruction {
            elements: checked,
            info: TypeInformation::new(ctx, type_id, hint),
            position,
        })
    }
}

fn settle(type_id: Type) -> Type {
    match type_id {
        Type::LiteralInt(kind) => Type::Basic(kind),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

    use crate::ast::{ArrayConstruction, ArrayElement, Expression, Literal, TupleConstruction};
    use crate::location::Location;
    use crate::typechecker::context::Context;
    use crate::typechecker::types::{BasicKind, Type};
    use crate::typechecker::TypeCheckable;

    fn int(value: i128) -> Expression<()> {
        Expression::Literal(Literal::Integer(value, (), Location::default()))
    }

    #[test]
    fn test_array_elements_unify() -> Result<()> {
        let mut ctx = Context::default();
        let array = ArrayConstruction {
            elements: vec![ArrayElement::Single(int(1)), ArrayElement::Single(int(2))],
            info: (),
            position: Location::default(),
        };

        let hint = Type::array(Type::Basic(BasicKind::U8));
        let checked = array.check(&mut ctx, Some(&hint))?;
        assert_eq!(checked.info.type_id.borrow().clone(), Some(hint));
        Ok(())
    }

    #[test]
    fn test_empty_array_needs_hint() {
        let mut ctx = Context::default();
        let array = ArrayConstruction {
            elements: vec![],
            info: (),
            position: Location::default(),
        };
        assert!(array.check(&mut ctx, None).is_err());
    }

    #[test]
    fn test_tuple_in_expression_position_is_rejected() {
        let mut ctx = Context::default();
        let tuple = TupleConstruction {
            elements: vec![int(1), int(2)],
            info: (),
            position: Location::default(),
        };
        assert!(tuple.check(&mut ctx, None).is_err());
    }

    #[test]
    fn test_tuple_construction_in_return_position() -> Result<()> {
        let mut ctx = Context::default();
        let tuple = TupleConstruction {
            elements: vec![int(1), int(2)],
            info: (),
            position: Location::default(),
        };
        let hint = Type::Tuple(vec![
            Type::Basic(BasicKind::U8),
            Type::Basic(BasicKind::U16),
        ]);
        let checked = super::check_tuple_construction(&mut ctx, tuple, Some(&hint))?;
        assert_eq!(checked.info.type_id.borrow().clone(), Some(hint));
        Ok(())
    }
}
