use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::{MatchCase, MatchExpression, Pattern};
use crate::location::Location;
use crate::typechecker::context::Context;
use crate::typechecker::error::{
    ArityMismatch, StructuralViolation, TypeCheckError, TypeMismatch, UndefinedVariable,
};
use crate::typechecker::types::Type;
use crate::typechecker::unify::find_compatible_types;
use crate::typechecker::{confirm_hint, TypeCheckable, TypeInformation, TypeResult};

impl TypeCheckable for MatchExpression<()> {
    type Typed = MatchExpression<TypeInformation>;

    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let MatchExpression {
            expr,
            cases,
            position,
            ..
        } = self;

        let expr = expr.check(ctx, None)?;
        let discriminant = expr.get_info().resolved_type();

        let mut checked_cases = Vec::with_capacity(cases.len());
        let mut case_types = Vec::with_capacity(cases.len());
        for case in cases {
            let MatchCase {
                pattern,
                guard,
                body,
                position: case_position,
                ..
            } = case;

            // Pattern bindings live in a scope local to the case.
            let mut case_ctx = ctx.clone();
            case_ctx.scope.enter_scope();
            infer_pattern(&mut case_ctx, &pattern, &discriminant)?;

            let guard = match guard {
                Some(guard) => Some(guard.check(&mut case_ctx, Some(&Type::Boolean))?),
                None => None,
            };
            let body = body.check(&mut case_ctx, hint)?;
            let body_type = body.get_info().resolved_type();

            case_types.push(body_type.clone());
            checked_cases.push(MatchCase {
                pattern,
                guard,
                body,
                info: TypeInformation::new(&case_ctx, body_type, hint),
                position: case_position,
            });
        }

        if checked_cases.is_empty() {
            return Err(TypeCheckError::StructuralViolation(
                StructuralViolation::new("a match needs at least one case"),
                position,
            ));
        }

        let Some(type_id) = find_compatible_types(ctx, &case_types) else {
            return Err(TypeCheckError::TypeMismatch(
                TypeMismatch {
                    expected: case_types[0].clone(),
                    actual: case_types[case_types.len() - 1].clone(),
                    detail: Some("match cases disagree on a common type".to_string()),
                },
                position,
            ));
        };

        confirm_hint(ctx, hint, &type_id, &position)?;
        Ok(MatchExpression {
            expr,
            cases: checked_cases,
            info: TypeInformation::new(ctx, type_id, hint),
            position,
        })
    }
}

/// Type-directed pattern inference: validate the pattern's shape against the
/// discriminant type and bind pattern-local names into the case scope.
fn infer_pattern(ctx: &mut Context, pattern: &Pattern, discriminant: &Type) -> TypeResult<()> {
    match pattern {
        Pattern::Wildcard(_) => Ok(()),
        Pattern::Binding(name, position) => {
            ctx.scope.add_variable(
                name,
                Rc::new(RefCell::new(Some(discriminant.clone()))),
                false,
                false,
                position.clone(),
            );
            Ok(())
        }
        Pattern::Literal(literal) => {
            literal.clone().check(ctx, Some(discriminant))?;
            Ok(())
        }
        Pattern::Constructor {
            name,
            fields,
            position,
        } => {
            let constructor = match discriminant.dereference() {
                Type::Variant(variant) => variant.borrow().constructor(name),
                Type::VariantConstructor(constructor) => {
                    if constructor.borrow().name == *name {
                        Some(constructor)
                    } else {
                        constructor
                            .borrow()
                            .parent_variant()
                            .and_then(|v| v.borrow().constructor(name))
                    }
                }
                other => {
                    return Err(TypeCheckError::TypeMismatch(
                        TypeMismatch {
                            expected: other,
                            actual: Type::Unset,
                            detail: Some(format!(
                                "constructor pattern '{name}' needs a variant discriminant"
                            )),
                        },
                        position.clone(),
                    ))
                }
            };
            let Some(constructor) = constructor else {
                return Err(TypeCheckError::UndefinedVariable(
                    UndefinedVariable {
                        variable_name: name.clone(),
                    },
                    position.clone(),
                ));
            };

            let parameters = constructor.borrow().parameters.clone();
            if fields.len() != parameters.len() {
                return Err(TypeCheckError::ArityMismatch(
                    ArityMismatch {
                        name: name.clone(),
                        expected: parameters.len(),
                        actual: fields.len(),
                    },
                    position.clone(),
                ));
            }
            for (field, parameter) in fields.iter().zip(parameters.iter()) {
                infer_pattern(ctx, field, &parameter.type_id)?;
            }
            Ok(())
        }
        Pattern::Struct { fields, position } => {
            let Type::Struct(strukt) = discriminant.dereference() else {
                return Err(pattern_shape_error(
                    "a struct pattern needs a struct discriminant",
                    position,
                ));
            };
            for (name, field_pattern) in fields {
                let Some(field) = strukt.field(name) else {
                    return Err(TypeCheckError::UndefinedVariable(
                        UndefinedVariable {
                            variable_name: name.clone(),
                        },
                        position.clone(),
                    ));
                };
                infer_pattern(ctx, field_pattern, &field.type_id)?;
            }
            Ok(())
        }
        Pattern::Tuple(elements, position) => {
            let Type::Tuple(element_types) = discriminant.dereference() else {
                return Err(pattern_shape_error(
                    "a tuple pattern needs a tuple discriminant",
                    position,
                ));
            };
            if elements.len() != element_types.len() {
                return Err(TypeCheckError::ArityMismatch(
                    ArityMismatch {
                        name: "tuple pattern".to_string(),
                        expected: element_types.len(),
                        actual: elements.len(),
                    },
                    position.clone(),
                ));
            }
            for (element, element_type) in elements.iter().zip(element_types.iter()) {
                infer_pattern(ctx, element, element_type)?;
            }
            Ok(())
        }
    }
}

fn pattern_shape_error(detail: &str, position: &Location) -> TypeCheckError {
    TypeCheckError::StructuralViolation(StructuralViolation::new(detail), position.clone())
}
