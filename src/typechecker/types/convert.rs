//! Conversion of parsed type annotations into semantic types, with the
//! structural rules that hold at resolve time: no nested nullables, tuple
//! arity of at least two and no directly nested tuples, no unions outside
//! constraints, arrays only over value types.

use crate::ast::{FunctionTypeParameter, TypeName};
use crate::typechecker::context::Context;
use crate::typechecker::error::{
    ArityMismatch, StructuralViolation, TypeCheckError, UndefinedType,
};
use crate::typechecker::scope::TypeSymbol;

use super::{
    BasicKind, FunctionParameter, FunctionType, StructField, StructType, Type,
};

impl TryFrom<(TypeName, &Context)> for Type {
    type Error = TypeCheckError;

    fn try_from((value, ctx): (TypeName, &Context)) -> Result<Self, Self::Error> {
        match value {
            TypeName::Named {
                name,
                type_args,
                position,
            } => {
                if let Some(kind) = BasicKind::from_name(&name) {
                    return Ok(Type::Basic(kind));
                }
                match name.as_str() {
                    "bool" => return Ok(Type::Boolean),
                    "void" => return Ok(Type::Void),
                    _ => {}
                }

                match ctx.scope.get_type_symbol(&name) {
                    Some(TypeSymbol::Type(type_id)) => {
                        if !type_args.is_empty() {
                            return Err(TypeCheckError::ArityMismatch(
                                ArityMismatch {
                                    name,
                                    expected: 0,
                                    actual: type_args.len(),
                                },
                                position,
                            ));
                        }
                        Ok(type_id)
                    }
                    Some(TypeSymbol::Variant(template)) => {
                        let mut args = Vec::with_capacity(type_args.len());
                        for arg in type_args {
                            args.push(Type::try_from((arg, ctx))?);
                        }
                        let variant = template.instantiate(ctx, &args, &position)?;
                        Ok(Type::Variant(variant))
                    }
                    None if name == "String" => Ok(ctx.string_type()),
                    None => Err(TypeCheckError::UndefinedType(
                        UndefinedType { type_name: name },
                        position,
                    )),
                }
            }
            TypeName::Nullable(inner, position) => {
                let inner = Type::try_from((*inner, ctx))?;
                if inner.is_nullable() {
                    return Err(TypeCheckError::StructuralViolation(
                        StructuralViolation::new("nullable types can not be nested"),
                        position,
                    ));
                }
                if matches!(inner.dereference(), Type::Null | Type::Void) {
                    return Err(TypeCheckError::StructuralViolation(
                        StructuralViolation::new(format!(
                            "'{inner:?}' can not be made nullable"
                        )),
                        position,
                    ));
                }
                Ok(Type::nullable(inner))
            }
            TypeName::Array {
                element,
                length,
                position,
            } => {
                let element = Type::try_from((*element, ctx))?;
                match element.dereference() {
                    Type::Union(_) | Type::Void | Type::FfiMethod(_) => {
                        Err(TypeCheckError::StructuralViolation(
                            StructuralViolation::new(format!(
                                "'{element:?}' is not a valid array element type"
                            )),
                            position,
                        ))
                    }
                    _ => Ok(Type::Array {
                        element: Box::new(element),
                        length,
                    }),
                }
            }
            TypeName::Tuple(elements, position) => {
                if elements.len() < 2 {
                    return Err(TypeCheckError::StructuralViolation(
                        StructuralViolation::new("tuples need at least two elements"),
                        position,
                    ));
                }
                let mut converted = Vec::with_capacity(elements.len());
                for element in elements {
                    let element = Type::try_from((element, ctx))?;
                    if matches!(element.dereference(), Type::Tuple(_)) {
                        return Err(TypeCheckError::StructuralViolation(
                            StructuralViolation::new("tuples can not nest inside tuples"),
                            position,
                        ));
                    }
                    converted.push(element);
                }
                Ok(Type::Tuple(converted))
            }
            TypeName::Function {
                params,
                return_type,
                ..
            } => {
                let mut parameters = Vec::with_capacity(params.len());
                for (index, param) in params.into_iter().enumerate() {
                    let FunctionTypeParameter {
                        name,
                        type_name,
                        mutable,
                    } = param;
                    parameters.push(FunctionParameter {
                        name: name.unwrap_or_else(|| format!("arg{index}")),
                        type_id: Type::try_from((type_name, ctx))?,
                        mutable,
                    });
                }
                Ok(Type::function(
                    parameters,
                    Type::try_from((*return_type, ctx))?,
                ))
            }
            TypeName::Struct { fields, position } => {
                let mut converted: Vec<StructField> = Vec::with_capacity(fields.len());
                for (name, type_name) in fields {
                    if converted.iter().any(|f| f.name == name) {
                        return Err(TypeCheckError::StructuralViolation(
                            StructuralViolation::new(format!(
                                "duplicate struct field '{name}'"
                            )),
                            position,
                        ));
                    }
                    converted.push(StructField {
                        name,
                        type_id: Type::try_from((type_name, ctx))?,
                    });
                }
                Ok(Type::Struct(StructType { fields: converted }))
            }
            TypeName::Coroutine(inner, position) => {
                let inner = Type::try_from((*inner, ctx))?;
                match inner.dereference() {
                    Type::Function(function) => Ok(Type::Coroutine(Box::new(function))),
                    other => Err(TypeCheckError::StructuralViolation(
                        StructuralViolation::new(format!(
                            "coroutines wrap function types, not '{other:?}'"
                        )),
                        position,
                    )),
                }
            }
            TypeName::Promise(inner, _) => {
                Ok(Type::Promise(Box::new(Type::try_from((*inner, ctx))?)))
            }
            TypeName::Join(parts, _) => {
                let mut converted = Vec::with_capacity(parts.len());
                for part in parts {
                    converted.push(Type::try_from((part, ctx))?);
                }
                Ok(Type::Join(converted))
            }
            TypeName::Union(parts, _) => {
                let mut converted = Vec::with_capacity(parts.len());
                for part in parts {
                    converted.push(Type::try_from((part, ctx))?);
                }
                Ok(Type::Union(converted))
            }
        }
    }
}

/// Lift a `FunctionType` out of parameters and a return annotation, the
/// shared path for function, method and FFI declarations.
pub fn signature_from_declaration(
    ctx: &Context,
    parameters: &[crate::ast::Parameter],
    return_type: &Option<TypeName>,
) -> Result<FunctionType, TypeCheckError> {
    let mut converted = Vec::with_capacity(parameters.len());
    for parameter in parameters {
        converted.push(FunctionParameter {
            name: parameter.name.clone(),
            type_id: Type::try_from((parameter.type_name.clone(), ctx))?,
            mutable: parameter.mutable,
        });
    }
    let return_type = match return_type {
        Some(type_name) => Type::try_from((type_name.clone(), ctx))?,
        None => Type::Unset,
    };
    Ok(FunctionType::new(converted, return_type))
}

#[cfg(test)]
mod tests {
    use crate::ast::TypeName;
    use crate::location::Location;
    use crate::typechecker::context::Context;
    use crate::typechecker::types::{BasicKind, Type};

    #[test]
    fn test_builtin_names() {
        let ctx = Context::default();
        assert_eq!(
            Type::try_from((TypeName::named("u32"), &ctx)),
            Ok(Type::Basic(BasicKind::U32))
        );
        assert_eq!(
            Type::try_from((TypeName::named("bool"), &ctx)),
            Ok(Type::Boolean)
        );
        assert_eq!(
            Type::try_from((TypeName::named("String"), &ctx)),
            Ok(ctx.string_type())
        );
        assert!(Type::try_from((TypeName::named("missing"), &ctx)).is_err());
    }

    #[test]
    fn test_nested_nullable_is_rejected() {
        let ctx = Context::default();
        let nested = TypeName::Nullable(
            Box::new(TypeName::Nullable(
                Box::new(TypeName::named("u32")),
                Location::default(),
            )),
            Location::default(),
        );
        assert!(Type::try_from((nested, &ctx)).is_err());
    }

    #[test]
    fn test_tuple_rules() {
        let ctx = Context::default();

        let too_short = TypeName::Tuple(vec![TypeName::named("u32")], Location::default());
        assert!(Type::try_from((too_short, &ctx)).is_err());

        let nested = TypeName::Tuple(
            vec![
                TypeName::named("u32"),
                TypeName::Tuple(
                    vec![TypeName::named("u8"), TypeName::named("u8")],
                    Location::default(),
                ),
            ],
            Location::default(),
        );
        assert!(Type::try_from((nested, &ctx)).is_err());
    }

    #[test]
    fn test_scoped_type_lookup() {
        let mut ctx = Context::default();
        ctx.scope.shadow_type("Foo", Type::array(Type::Boolean));
        assert_eq!(
            Type::try_from((TypeName::named("Foo"), &ctx)),
            Ok(Type::array(Type::Boolean))
        );
    }
}
