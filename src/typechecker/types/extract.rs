//! Positional generics extraction: walk a declared (placeholder-carrying)
//! type against the concrete type of an argument and collect substitutions.
//!
//! The walk asserts structural shape as it descends; a mismatch reports what
//! shape was expected so the call site can surface it.

use std::collections::HashMap;

use super::{FunctionType, Type};

/// A shape failure during extraction, surfaced as a type-mismatch detail.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractionError {
    pub message: String,
}

impl ExtractionError {
    fn new(message: impl ToString) -> ExtractionError {
        ExtractionError {
            message: message.to_string(),
        }
    }
}

impl Type {
    /// Fill `out` with substitutions for every placeholder of
    /// `declared_generics` that occurs in `self`, reading the concrete types
    /// off `actual` position by position.
    pub fn extract_generics_against(
        &self,
        actual: &Type,
        declared_generics: &[String],
        out: &mut HashMap<String, Type>,
    ) -> Result<(), ExtractionError> {
        let declared = self.dereference();
        let actual = actual.dereference();

        match (&declared, &actual) {
            (Type::Generic(generic), _) => {
                if !declared_generics.contains(&generic.name) {
                    return Ok(());
                }
                let concrete = settle(&actual);
                if let Some(previous) = out.get(&generic.name) {
                    if *previous != concrete {
                        return Err(ExtractionError::new(format!(
                            "conflicting types for generic '{}': {previous:?} and {concrete:?}",
                            generic.name
                        )));
                    }
                    return Ok(());
                }
                out.insert(generic.name.clone(), concrete);
                Ok(())
            }
            (Type::Nullable(inner), Type::Nullable(actual_inner)) => {
                inner.extract_generics_against(actual_inner, declared_generics, out)
            }
            (Type::Nullable(_), Type::Null) => Ok(()),
            (Type::Nullable(inner), _) => {
                inner.extract_generics_against(&actual, declared_generics, out)
            }
            (Type::Array { element, .. }, Type::Array { element: actual_element, .. }) => {
                element.extract_generics_against(actual_element, declared_generics, out)
            }
            (Type::Array { .. }, _) => Err(ExtractionError::new(format!(
                "expected an array here, got {actual:?}"
            ))),
            (Type::Tuple(elements), Type::Tuple(actual_elements)) => {
                if elements.len() != actual_elements.len() {
                    return Err(ExtractionError::new(format!(
                        "expected a tuple of {} elements, got {}",
                        elements.len(),
                        actual_elements.len()
                    )));
                }
                for (element, actual_element) in elements.iter().zip(actual_elements.iter()) {
                    element.extract_generics_against(actual_element, declared_generics, out)?;
                }
                Ok(())
            }
            (Type::Tuple(_), _) => Err(ExtractionError::new(format!(
                "expected a tuple here, got {actual:?}"
            ))),
            (Type::Struct(strukt), Type::Struct(actual_struct)) => {
                for field in &strukt.fields {
                    let Some(actual_field) = actual_struct.field(&field.name) else {
                        return Err(ExtractionError::new(format!(
                            "expected a struct with field '{}' here",
                            field.name
                        )));
                    };
                    field.type_id.extract_generics_against(
                        &actual_field.type_id,
                        declared_generics,
                        out,
                    )?;
                }
                Ok(())
            }
            (Type::Struct(_), _) => Err(ExtractionError::new(format!(
                "expected a struct here, got {actual:?}"
            ))),
            (Type::Function(function), Type::Function(actual_function)) => {
                extract_function(function, actual_function, declared_generics, out)
            }
            (Type::Function(_), _) => Err(ExtractionError::new(format!(
                "expected a function here, got {actual:?}"
            ))),
            (Type::Coroutine(function), Type::Coroutine(actual_function)) => {
                extract_function(function, actual_function, declared_generics, out)
            }
            (Type::Promise(inner), Type::Promise(actual_inner)) => {
                inner.extract_generics_against(actual_inner, declared_generics, out)
            }
            (Type::Variant(declared_variant), Type::Variant(actual_variant)) => {
                let declared_args = declared_variant.borrow().args.clone();
                let actual_args = actual_variant.borrow().args.clone();
                if declared_args.len() == actual_args.len() {
                    for (declared_arg, actual_arg) in
                        declared_args.iter().zip(actual_args.iter())
                    {
                        declared_arg.extract_generics_against(
                            actual_arg,
                            declared_generics,
                            out,
                        )?;
                    }
                }
                Ok(())
            }
            (Type::Join(parts), _) => {
                for part in parts {
                    part.extract_generics_against(&actual, declared_generics, out)?;
                }
                Ok(())
            }
            // Leaf and nominal positions carry no placeholders; assignability
            // is checked separately by signature matching.
            _ => Ok(()),
        }
    }
}

fn extract_function(
    declared: &FunctionType,
    actual: &FunctionType,
    declared_generics: &[String],
    out: &mut HashMap<String, Type>,
) -> Result<(), ExtractionError> {
    if declared.parameters.len() != actual.parameters.len() {
        return Err(ExtractionError::new(format!(
            "expected a function of {} parameters, got {}",
            declared.parameters.len(),
            actual.parameters.len()
        )));
    }
    for (declared_parameter, actual_parameter) in
        declared.parameters.iter().zip(actual.parameters.iter())
    {
        declared_parameter.type_id.extract_generics_against(
            &actual_parameter.type_id,
            declared_generics,
            out,
        )?;
    }
    declared
        .return_type
        .extract_generics_against(&actual.return_type, declared_generics, out)
}

/// An extracted type must be usable as a value type: literal storage kinds
/// collapse to their basic kind.
fn settle(actual: &Type) -> Type {
    match actual {
        Type::LiteralInt(kind) => Type::Basic(*kind),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::typechecker::types::{BasicKind, Type};

    use super::*;

    fn generic(name: &str) -> Type {
        Type::Generic(crate::typechecker::types::GenericType {
            name: name.into(),
            constraint: None,
        })
    }

    #[test]
    fn test_extract_plain_generic() {
        let mut out = HashMap::new();
        generic("T")
            .extract_generics_against(
                &Type::Basic(BasicKind::U32),
                &["T".to_string()],
                &mut out,
            )
            .unwrap();
        assert_eq!(out.get("T"), Some(&Type::Basic(BasicKind::U32)));
    }

    #[test]
    fn test_extract_through_array() {
        let mut out = HashMap::new();
        Type::array(generic("T"))
            .extract_generics_against(
                &Type::array(Type::Boolean),
                &["T".to_string()],
                &mut out,
            )
            .unwrap();
        assert_eq!(out.get("T"), Some(&Type::Boolean));
    }

    #[test]
    fn test_extract_shape_mismatch() {
        let mut out = HashMap::new();
        let result = Type::array(generic("T")).extract_generics_against(
            &Type::Boolean,
            &["T".to_string()],
            &mut out,
        );
        assert!(result.is_err());
        assert!(result.unwrap_err().message.contains("expected an array"));
    }

    #[test]
    fn test_extract_conflict() {
        let mut out = HashMap::new();
        let declared = Type::Tuple(vec![generic("T"), generic("T")]);
        let actual = Type::Tuple(vec![Type::Boolean, Type::Basic(BasicKind::U8)]);
        let result =
            declared.extract_generics_against(&actual, &["T".to_string()], &mut out);
        assert!(result.is_err());
    }

    #[test]
    fn test_literal_settles_to_storage() {
        let mut out = HashMap::new();
        generic("T")
            .extract_generics_against(
                &Type::LiteralInt(BasicKind::I32),
                &["T".to_string()],
                &mut out,
            )
            .unwrap();
        assert_eq!(out.get("T"), Some(&Type::Basic(BasicKind::I32)));
    }
}
