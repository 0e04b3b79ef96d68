use serde::{Deserialize, Serialize};

use crate::ast::{Expression, Id};
use crate::location::Location;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructFieldInitialisation<I> {
    pub name: Id<I>,
    pub value: Expression<I>,
    pub position: Location,
}

/// Named struct construction: `{x: 1, y: 2}`. Either matches a struct hint
/// structurally or synthesizes a fresh struct type from its fields.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructInitialisation<I> {
    pub fields: Vec<StructFieldInitialisation<I>>,
    pub info: I,
    pub position: Location,
}

/// Unnamed struct construction: `{1, 2}`. Requires a struct hint of
/// matching arity; values are assigned to fields positionally.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnonymousStructInitialisation<I> {
    pub values: Vec<Expression<I>>,
    pub info: I,
    pub position: Location,
}
