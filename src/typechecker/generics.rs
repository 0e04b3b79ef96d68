//! Constraint checking and substitution building for generic functions,
//! methods and variants.
//!
//! Substitutions are positional and first-order: explicit type arguments
//! substitute directly, otherwise each declared parameter type is walked
//! against the corresponding argument type to extract the placeholders.

use std::collections::HashMap;

use log::debug;

use crate::location::Location;

use super::context::Context;
use super::error::{
    ArityMismatch, GenericConstraintViolation, TypeCheckError, TypeMismatch,
};
use super::matcher::match_types;
use super::types::{GenericType, Type};

/// A constraint is a single type or a union of alternatives; the concrete
/// argument must match at least one alternative laxly.
pub fn check_constraint(
    ctx: &Context,
    generic_name: &str,
    constraint: &Type,
    concrete: &Type,
    position: &Location,
) -> Result<(), TypeCheckError> {
    let alternatives = match constraint.dereference() {
        Type::Union(alternatives) => alternatives,
        other => vec![other],
    };

    let satisfied = alternatives
        .iter()
        .any(|alternative| match_types(ctx, alternative, concrete, false).is_ok());

    if satisfied {
        Ok(())
    } else {
        Err(TypeCheckError::GenericConstraintViolation(
            GenericConstraintViolation {
                generic: generic_name.to_string(),
                argument: concrete.clone(),
                constraint: constraint.clone(),
            },
            position.clone(),
        ))
    }
}

/// Build the substitution map for a generic call site.
///
/// With explicit type arguments the mapping is positional. Without them,
/// every declared parameter type is walked against the matching argument
/// type; afterwards each declared generic must have been populated.
/// Constraints are checked either way.
pub fn build_substitution(
    ctx: &Context,
    name: &str,
    generics: &[GenericType],
    declared_parameters: &[Type],
    argument_types: &[Type],
    explicit: &[Type],
    position: &Location,
) -> Result<HashMap<String, Type>, TypeCheckError> {
    let mut map = HashMap::new();

    if !explicit.is_empty() {
        if explicit.len() != generics.len() {
            return Err(TypeCheckError::ArityMismatch(
                ArityMismatch {
                    name: name.to_string(),
                    expected: generics.len(),
                    actual: explicit.len(),
                },
                position.clone(),
            ));
        }
        for (generic, concrete) in generics.iter().zip(explicit.iter()) {
            map.insert(generic.name.clone(), concrete.clone());
        }
    } else {
        let generic_names = generics
            .iter()
            .map(|g| g.name.clone())
            .collect::<Vec<_>>();
        for (declared, actual) in declared_parameters.iter().zip(argument_types.iter()) {
            declared
                .extract_generics_against(actual, &generic_names, &mut map)
                .map_err(|e| {
                    TypeCheckError::TypeMismatch(
                        TypeMismatch {
                            expected: declared.clone(),
                            actual: actual.clone(),
                            detail: Some(e.message),
                        },
                        position.clone(),
                    )
                })?;
        }
        for generic in generics {
            if !map.contains_key(&generic.name) {
                return Err(TypeCheckError::TypeMismatch(
                    TypeMismatch {
                        expected: Type::Generic(generic.clone()),
                        actual: Type::Unset,
                        detail: Some(format!(
                            "could not infer a type for generic '{}' of '{name}'",
                            generic.name
                        )),
                    },
                    position.clone(),
                ));
            }
        }
    }

    for generic in generics {
        if let Some(constraint) = &generic.constraint {
            let concrete = map
                .get(&generic.name)
                .expect("every generic is populated by now");
            check_constraint(ctx, &generic.name, constraint, concrete, position)?;
        }
    }

    debug!("substitution for '{name}': {map:?}");
    Ok(map)
}

/// The positional type-argument vector of a substitution, in declaration
/// order; monomorph caches key on this.
pub fn argument_vector(generics: &[GenericType], map: &HashMap<String, Type>) -> Vec<Type> {
    generics
        .iter()
        .map(|g| {
            map.get(&g.name)
                .cloned()
                .expect("substitution covers all generics")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::location::Location;
    use crate::typechecker::context::Context;
    use crate::typechecker::types::{BasicKind, GenericType, Type};

    use super::*;

    fn generic(name: &str, constraint: Option<Type>) -> GenericType {
        GenericType {
            name: name.into(),
            constraint: constraint.map(Box::new),
        }
    }

    #[test]
    fn test_explicit_arguments_substitute_directly() {
        let ctx = Context::default();
        let generics = [generic("T", None)];
        let map = build_substitution(
            &ctx,
            "id",
            &generics,
            &[Type::Generic(generics[0].clone())],
            &[Type::Boolean],
            &[Type::Basic(BasicKind::U8)],
            &Location::default(),
        )
        .unwrap();
        assert_eq!(map.get("T"), Some(&Type::Basic(BasicKind::U8)));
    }

    #[test]
    fn test_extraction_fills_all_generics() {
        let ctx = Context::default();
        let generics = [generic("T", None)];
        let map = build_substitution(
            &ctx,
            "id",
            &generics,
            &[Type::Generic(generics[0].clone())],
            &[ctx.string_type()],
            &[],
            &Location::default(),
        )
        .unwrap();
        assert_eq!(map.get("T"), Some(&ctx.string_type()));
    }

    #[test]
    fn test_unpopulated_generic_is_an_error() {
        let ctx = Context::default();
        let generics = [generic("T", None)];
        let result = build_substitution(
            &ctx,
            "weird",
            &generics,
            &[Type::Boolean],
            &[Type::Boolean],
            &[],
            &Location::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_union_constraint() {
        let ctx = Context::default();
        let constraint = Type::Union(vec![
            Type::Basic(BasicKind::U32),
            Type::Basic(BasicKind::U64),
        ]);
        let generics = [generic("T", Some(constraint))];

        assert!(build_substitution(
            &ctx,
            "f",
            &generics,
            &[Type::Generic(generics[0].clone())],
            &[Type::Basic(BasicKind::U32)],
            &[],
            &Location::default(),
        )
        .is_ok());

        assert!(build_substitution(
            &ctx,
            "f",
            &generics,
            &[Type::Generic(generics[0].clone())],
            &[Type::Boolean],
            &[],
            &Location::default(),
        )
        .is_err());
    }
}
