//! Parsed type annotations.
//!
//! A `TypeName` is the syntactic form of a type as written in source. The
//! analyzer converts it into a semantic [`Type`](crate::typechecker::Type)
//! against the current context; see the `TryFrom` impl in
//! `typechecker::types`.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::location::Location;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionTypeParameter {
    pub name: Option<String>,
    pub type_name: TypeName,
    pub mutable: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeName {
    /// A name reference: a builtin (`u32`, `bool`, ...), a declared class,
    /// interface, variant, enum, alias or generic parameter, optionally with
    /// type arguments (`Opt<u32>`).
    Named {
        name: String,
        type_args: Vec<TypeName>,
        position: Location,
    },
    Nullable(Box<TypeName>, Location),
    Array {
        element: Box<TypeName>,
        length: Option<u64>,
        position: Location,
    },
    Tuple(Vec<TypeName>, Location),
    Function {
        params: Vec<FunctionTypeParameter>,
        return_type: Box<TypeName>,
        position: Location,
    },
    Struct {
        fields: Vec<(String, TypeName)>,
        position: Location,
    },
    Coroutine(Box<TypeName>, Location),
    Promise(Box<TypeName>, Location),
    /// Conjunction of interface-like types, only valid as a constraint or
    /// super-type position.
    Join(Vec<TypeName>, Location),
    /// Alternatives, only valid inside a generic constraint.
    Union(Vec<TypeName>, Location),
}

impl TypeName {
    pub fn named(name: impl ToString) -> TypeName {
        TypeName::Named {
            name: name.to_string(),
            type_args: vec![],
            position: Location::default(),
        }
    }

    pub fn position(&self) -> Location {
        match self {
            TypeName::Named { position, .. }
            | TypeName::Array { position, .. }
            | TypeName::Function { position, .. }
            | TypeName::Struct { position, .. } => position.clone(),
            TypeName::Nullable(_, position)
            | TypeName::Tuple(_, position)
            | TypeName::Coroutine(_, position)
            | TypeName::Promise(_, position)
            | TypeName::Join(_, position)
            | TypeName::Union(_, position) => position.clone(),
        }
    }
}

impl Display for TypeName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeName::Named {
                name, type_args, ..
            } => {
                write!(f, "{name}")?;
                if !type_args.is_empty() {
                    let args = type_args
                        .iter()
                        .map(|a| a.to_string())
                        .collect::<Vec<_>>()
                        .join(", ");
                    write!(f, "<{args}>")?;
                }
                Ok(())
            }
            TypeName::Nullable(inner, _) => write!(f, "{inner}?"),
            TypeName::Array { element, .. } => write!(f, "{element}[]"),
            TypeName::Tuple(elements, _) => {
                let elements = elements
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "({elements})")
            }
            TypeName::Function {
                params,
                return_type,
                ..
            } => {
                let params = params
                    .iter()
                    .map(|p| p.type_name.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "fn({params}) -> {return_type}")
            }
            TypeName::Struct { fields, .. } => {
                let fields = fields
                    .iter()
                    .map(|(name, ty)| format!("{name}: {ty}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{{{fields}}}")
            }
            TypeName::Coroutine(inner, _) => write!(f, "coroutine<{inner}>"),
            TypeName::Promise(inner, _) => write!(f, "promise<{inner}>"),
            TypeName::Join(parts, _) => {
                let parts = parts
                    .iter()
                    .map(|p| p.to_string())
                    .collect::<Vec<_>>()
                    .join(" & ");
                write!(f, "{parts}")
            }
            TypeName::Union(parts, _) => {
                let parts = parts
                    .iter()
                    .map(|p| p.to_string())
                    .collect::<Vec<_>>()
                    .join(" | ");
                write!(f, "{parts}")
            }
        }
    }
}
