//! Clone-with-substitution: replace generic placeholders by concrete types.
//!
//! Substitution never mutates; it rebuilds the parts of a type that can
//! contain placeholders. Classes are non-generic and shared by identity;
//! generic variant instances are re-instantiated through their template so
//! that equal argument vectors keep yielding the same shared instance.

use std::collections::HashMap;

use crate::typechecker::context::Context;
use crate::typechecker::error::TypeCheckError;

use super::{FunctionParameter, FunctionType, StructField, StructType, Type};

impl Type {
    pub fn substitute(
        &self,
        map: &HashMap<String, Type>,
        ctx: &Context,
    ) -> Result<Type, TypeCheckError> {
        let substituted = match self {
            Type::Generic(generic) => match map.get(&generic.name) {
                Some(concrete) => concrete.clone(),
                None => self.clone(),
            },
            Type::Nullable(inner) => Type::nullable(inner.substitute(map, ctx)?),
            Type::Array { element, length } => Type::Array {
                element: Box::new(element.substitute(map, ctx)?),
                length: *length,
            },
            Type::Tuple(elements) => Type::Tuple(
                elements
                    .iter()
                    .map(|e| e.substitute(map, ctx))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Type::Struct(strukt) => {
                let mut fields = Vec::with_capacity(strukt.fields.len());
                for field in &strukt.fields {
                    fields.push(StructField {
                        name: field.name.clone(),
                        type_id: field.type_id.substitute(map, ctx)?,
                    });
                }
                Type::Struct(StructType { fields })
            }
            Type::Function(function) => Type::Function(substitute_function(function, map, ctx)?),
            Type::Coroutine(function) => {
                Type::Coroutine(Box::new(substitute_function(function, map, ctx)?))
            }
            Type::Promise(inner) => Type::Promise(Box::new(inner.substitute(map, ctx)?)),
            Type::Variant(variant) => {
                let (template, args) = {
                    let variant = variant.borrow();
                    (variant.template.clone(), variant.args.clone())
                };
                match template.and_then(|t| t.upgrade()) {
                    Some(template) => {
                        let args = args
                            .iter()
                            .map(|a| a.substitute(map, ctx))
                            .collect::<Result<Vec<_>, _>>()?;
                        let instance =
                            template.instantiate(ctx, &args, &variant.borrow().position)?;
                        Type::Variant(instance)
                    }
                    None => self.clone(),
                }
            }
            Type::Join(parts) => Type::Join(
                parts
                    .iter()
                    .map(|p| p.substitute(map, ctx))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Type::Union(parts) => Type::Union(
                parts
                    .iter()
                    .map(|p| p.substitute(map, ctx))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            // Nominal, alias and leaf types carry no placeholders.
            _ => self.clone(),
        };

        Ok(substituted)
    }
}

pub fn substitute_function(
    function: &FunctionType,
    map: &HashMap<String, Type>,
    ctx: &Context,
) -> Result<FunctionType, TypeCheckError> {
    let mut parameters = Vec::with_capacity(function.parameters.len());
    for parameter in &function.parameters {
        parameters.push(FunctionParameter {
            name: parameter.name.clone(),
            type_id: parameter.type_id.substitute(map, ctx)?,
            mutable: parameter.mutable,
        });
    }
    Ok(FunctionType::new(
        parameters,
        function.return_type.substitute(map, ctx)?,
    ))
}
