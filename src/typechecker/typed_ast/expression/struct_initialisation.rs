use crate::ast::{
    AnonymousStructInitialisation, Id, StructFieldInitialisation, StructInitialisation,
};
use crate::typechecker::context::Context;
use crate::typechecker::error::{StructuralViolation, TypeCheckError, TypeMismatch};
use crate::typechecker::types::{StructField, StructType, Type};
use crate::typechecker::{confirm_hint, TypeCheckable, TypeInformation, TypeResult};

impl TypeCheckable for StructInitialisation<()> {
    type Typed = StructInitialisation<TypeInformation>;

    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let StructInitialisation {
            fields, position, ..
        } = self;

        let hint_struct = match hint.map(|h| h.dereference()) {
            Some(Type::Struct(strukt)) => Some(strukt),
            _ => None,
        };

        let mut checked_fields = Vec::with_capacity(fields.len());
        let mut field_types: Vec<StructField> = Vec::with_capacity(fields.len());
        for field in fields {
            let StructFieldInitialisation {
                name,
                value,
                position: field_position,
            } = field;

            if field_types.iter().any(|f| f.name == name.name) {
                return Err(TypeCheckError::StructuralViolation(
                    StructuralViolation::new(format!("duplicate struct field '{}'", name.name)),
                    field_position,
                ));
            }

            let field_hint = hint_struct
                .as_ref()
                .and_then(|s| s.field(&name.name))
                .map(|f| f.type_id.clone());
            let value = value.check(ctx, field_hint.as_ref())?;
            let value_type = settle(value.get_info().resolved_type());

            field_types.push(StructField {
                name: name.name.clone(),
                type_id: value_type.clone(),
            });
            checked_fields.push(StructFieldInitialisation {
                name: Id {
                    name: name.name,
                    type_args: vec![],
                    info: TypeInformation::new(ctx, value_type, None),
                    position: name.position,
                },
                value,
                position: field_position,
            });
        }

        let type_id = Type::Struct(StructType {
            fields: field_types,
        });
        confirm_hint(ctx, hint, &type_id, &position)?;
        Ok(StructInitialisation {
            fields: checked_fields,
            info: TypeInformation::new(ctx, type_id, hint),
            position,
        })
    }
}

impl TypeCheckable for AnonymousStructInitialisation<()> {
    type Typed = AnonymousStructInitialisation<TypeInformation>;

    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let AnonymousStructInitialisation {
            values, position, ..
        } = self;

        let Some(Type::Struct(strukt)) = hint.map(|h| h.dereference()) else {
            return Err(TypeCheckError::StructuralViolation(
                StructuralViolation::new(
                    "unnamed struct construction needs a struct type from context",
                ),
                position,
            ));
        };

        if strukt.fields.len() != values.len() {
            return Err(TypeCheckError::TypeMismatch(
                TypeMismatch {
                    expected: Type::Struct(strukt.clone()),
                    actual: Type::Unset,
                    detail: Some(format!(
                        "expected {} field value(s), got {}",
                        strukt.fields.len(),
                        values.len()
                    )),
                },
                position,
            ));
        }

        let mut checked = Vec::with_capacity(values.len());
        for (value, field) in values.into_iter().zip(strukt.fields.iter()) {
            checked.push(value.check(ctx, Some(&field.type_id))?);
        }

        let type_id = Type::Struct(strukt);
        confirm_hint(ctx, hint, &type_id, &position)?;
        Ok(AnonymousStructInitialisation {
            values: checked,
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

    use crate::ast::{
        AnonymousStructInitialisation, Expression, Id, Literal, StructFieldInitialisation,
        StructInitialisation,
    };
    use crate::location::Location;
    use crate::typechecker::context::Context;
    use crate::typechecker::types::{BasicKind, StructField, StructType, Type};
    use crate::typechecker::TypeCheckable;

    #[test]
    fn test_named_struct_synthesizes_type() -> Result<()> {
        let mut ctx = Context::default();
        let init = StructInitialisation {
            fields: vec![StructFieldInitialisation {
                name: Id::new("x"),
                value: Expression::Literal(Literal::Bool(true, (), Location::default())),
                position: Location::default(),
            }],
            info: (),
            position: Location::default(),
        };

        let checked = init.check(&mut ctx, None)?;
        assert_eq!(
            checked.info.type_id.borrow().clone(),
            Some(Type::Struct(StructType {
                fields: vec![StructField {
                    name: "x".into(),
                    type_id: Type::Boolean,
                }],
            }))
        );
        Ok(())
    }

    #[test]
    fn test_unnamed_struct_requires_hint() {
        let mut ctx = Context::default();
        let init = AnonymousStructInitialisation {
            values: vec![Expression::Literal(Literal::Integer(
                1,
                (),
                Location::default(),
            ))],
            info: (),
            position: Location::default(),
        };
        assert!(init.check(&mut ctx, None).is_err());
    }

    #[test]
    fn test_unnamed_struct_fills_fields_positionally() -> Result<()> {
        let mut ctx = Context::default();
        let init = AnonymousStructInitialisation {
            values: vec![
                Expression::Literal(Literal::Integer(1, (), Location::default())),
                Expression::Literal(Literal::Bool(true, (), Location::default())),
            ],
            info: (),
            position: Location::default(),
        };

        let hint = Type::Struct(StructType {
            fields: vec![
                StructField {
                    name: "a".into(),
                    type_id: Type::Basic(BasicKind::U8),
                },
                StructField {
                    name: "b".into(),
                    type_id: Type::Boolean,
                },
            ],
        });
        let checked = init.check(&mut ctx, Some(&hint))?;
        assert_eq!(checked.info.type_id.borrow().clone(), Some(hint));
        Ok(())
    }
}
