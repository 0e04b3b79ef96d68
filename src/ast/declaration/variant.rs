use serde::{Deserialize, Serialize};

use crate::ast::{GenericParameter, TypeName};
use crate::location::Location;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantConstructorDeclaration {
    pub name: String,
    pub parameters: Vec<(String, TypeName)>,
    pub position: Location,
}

/// An algebraic data type: `variant Opt<T> { Some(v: T), None }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantDeclaration {
    pub name: String,
    pub generics: Vec<GenericParameter>,
    pub constructors: Vec<VariantConstructorDeclaration>,
    pub position: Location,
}
