use serde::{Deserialize, Serialize};

use crate::ast::{Expression, Statement, TypeName};
use crate::location::Location;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub type_name: TypeName,
    pub mutable: bool,
    pub position: Location,
}

/// A generic placeholder with an optional constraint (a single type or a
/// union of alternatives).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericParameter {
    pub name: String,
    pub constraint: Option<TypeName>,
    pub position: Location,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FunctionBody<I> {
    Block(Vec<Statement<I>>),
    /// Expression form: `fn f(x: u32) -> u32 = x + 1`
    Expression(Box<Expression<I>>),
}

/// A top-level (or namespace-level) function. `return_type` of `None` means
/// the return type is inferred from the body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration<I> {
    pub name: String,
    pub generics: Vec<GenericParameter>,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeName>,
    pub body: FunctionBody<I>,
    pub info: I,
    pub position: Location,
}
